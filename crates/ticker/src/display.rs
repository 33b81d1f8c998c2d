//! Where frames end up.

use std::io::{self, Write};

use matrix_font_core::{PANEL_SIZE, PixelStrip};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display output failed: {0}")]
    Io(#[from] io::Error),

    #[error("LED driver error: {0}")]
    Device(String),
}

/// A chain of 8x8 LED panels, or something pretending to be one.
pub trait MatrixDisplay {
    /// Width of the display in pixels.
    fn columns(&self) -> usize;

    fn rows(&self) -> usize {
        PANEL_SIZE
    }

    /// Brightness from 0 (dimmest) to 15.
    fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError>;

    /// Show the leftmost `columns()` columns of `frame`.
    fn show(&mut self, frame: &PixelStrip) -> Result<(), DisplayError>;
}

/// Draws frames as text, redrawing in place with ANSI cursor movement.
pub struct TerminalDisplay<W: Write> {
    out: W,
    panels: usize,
    lit: char,
    unlit: char,
    drawn: bool,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W, panels: usize) -> Self {
        Self {
            out,
            panels,
            lit: '#',
            unlit: '.',
            drawn: false,
        }
    }

    pub fn with_pixels(mut self, lit: char, unlit: char) -> Self {
        self.lit = lit;
        self.unlit = unlit;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MatrixDisplay for TerminalDisplay<W> {
    fn columns(&self) -> usize {
        self.panels * PANEL_SIZE
    }

    fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
        log::debug!("terminal display ignores brightness {level}");
        Ok(())
    }

    fn show(&mut self, frame: &PixelStrip) -> Result<(), DisplayError> {
        if self.drawn {
            write!(self.out, "\x1b[{}A", self.rows())?;
        }

        for y in 0..self.rows() {
            let line: String = (0..self.columns())
                .map(|x| if frame.pixel(x, y) { self.lit } else { self.unlit })
                .collect();
            writeln!(self.out, "{line}")?;
        }

        self.out.flush()?;
        self.drawn = true;
        Ok(())
    }
}

#[cfg(feature = "max7219")]
pub use hardware::{Max7219Display, Spidev};

#[cfg(feature = "max7219")]
mod hardware {
    use std::{
        fs::{File, OpenOptions},
        io::{self, Write},
        path::Path,
    };

    use embedded_hal::blocking::spi;
    use max7219::{MAX7219, connectors::Connector, connectors::SpiConnector};

    use super::{DisplayError, MatrixDisplay, PANEL_SIZE, PixelStrip};

    /// Panels a single MAX7219 chain can address.
    const MAX_PANELS: usize = 8;

    fn device_error(err: max7219::DataError) -> DisplayError {
        DisplayError::Device(format!("{err:?}"))
    }

    /// A Linux `spidev` character device used as a write-only SPI bus.
    ///
    /// Each write is one transfer with chip select held for its duration.
    /// Mode and clock come from the device defaults; the clock must be at
    /// most 10 MHz for the MAX7219.
    pub struct Spidev {
        file: File,
    }

    impl Spidev {
        pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
            let file = OpenOptions::new().write(true).open(path)?;
            Ok(Self { file })
        }
    }

    impl spi::Write<u8> for Spidev {
        type Error = io::Error;

        fn write(&mut self, words: &[u8]) -> Result<(), io::Error> {
            self.file.write_all(words)
        }
    }

    /// Cascaded MAX7219 panels in the FC16 layout, panel 0 leftmost.
    pub struct Max7219Display<C: Connector> {
        device: MAX7219<C>,
        panels: usize,
        reverse_order: bool,
    }

    impl Max7219Display<SpiConnector<Spidev>> {
        /// Drive `panels` panels through a `spidev` device such as
        /// `/dev/spidev0.0`.
        pub fn open(path: impl AsRef<Path>, panels: usize) -> Result<Self, DisplayError> {
            if !(1..=MAX_PANELS).contains(&panels) {
                return Err(DisplayError::Device(format!(
                    "a MAX7219 chain holds 1 to {MAX_PANELS} panels, not {panels}"
                )));
            }

            let path = path.as_ref();
            let bus = Spidev::open(path)?;
            log::info!("driving {panels} MAX7219 panels on {}", path.display());

            Self::new(MAX7219::from_spi(panels, bus).map_err(device_error)?, panels)
        }
    }

    impl<C: Connector> Max7219Display<C> {
        /// Power the chain up and blank every panel.
        pub fn new(mut device: MAX7219<C>, panels: usize) -> Result<Self, DisplayError> {
            device.power_on().map_err(device_error)?;
            for addr in 0..panels {
                device.clear_display(addr).map_err(device_error)?;
            }

            Ok(Self {
                device,
                panels,
                reverse_order: false,
            })
        }

        /// For chains wired with the last panel on the left.
        pub fn reverse_order(mut self, reverse: bool) -> Self {
            self.reverse_order = reverse;
            self
        }
    }

    impl<C: Connector> MatrixDisplay for Max7219Display<C> {
        fn columns(&self) -> usize {
            self.panels * PANEL_SIZE
        }

        fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
            for addr in 0..self.panels {
                self.device
                    .set_intensity(addr, level.min(0x0F))
                    .map_err(device_error)?;
            }
            Ok(())
        }

        fn show(&mut self, frame: &PixelStrip) -> Result<(), DisplayError> {
            for (panel, rows) in frame.panel_rows(self.panels).iter().enumerate() {
                let addr = if self.reverse_order {
                    self.panels - 1 - panel
                } else {
                    panel
                };
                self.device.write_raw(addr, rows).map_err(device_error)?;
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::{cell::RefCell, convert::Infallible, rc::Rc};

        /// Records every SPI transfer.
        #[derive(Clone, Default)]
        struct Bus(Rc<RefCell<Vec<Vec<u8>>>>);

        impl spi::Write<u8> for Bus {
            type Error = Infallible;

            fn write(&mut self, words: &[u8]) -> Result<(), Infallible> {
                self.0.borrow_mut().push(words.to_vec());
                Ok(())
            }
        }

        impl Bus {
            /// `(addr, register, data)` for every non-noop slot written so far.
            fn take(&self) -> Vec<(usize, u8, u8)> {
                self.0
                    .borrow_mut()
                    .drain(..)
                    .flat_map(|transfer| {
                        transfer
                            .chunks(2)
                            .enumerate()
                            .filter(|(_, slot)| slot[0] != 0)
                            .map(|(addr, slot)| (addr, slot[0], slot[1]))
                            .collect::<Vec<_>>()
                    })
                    .collect()
            }
        }

        fn display(panels: usize) -> (Max7219Display<SpiConnector<Bus>>, Bus) {
            let bus = Bus::default();
            let device = MAX7219::from_spi(panels, bus.clone()).unwrap();
            let display = Max7219Display::new(device, panels).unwrap();
            bus.take();
            (display, bus)
        }

        /// Digit register writes only, grouped as `(addr, rows)`.
        fn digits(writes: &[(usize, u8, u8)]) -> Vec<(usize, Vec<u8>)> {
            writes
                .iter()
                .filter(|&&(_, register, _)| (1..=8).contains(&register))
                .collect::<Vec<_>>()
                .chunks(8)
                .map(|chunk| (chunk[0].0, chunk.iter().map(|&&(_, _, data)| data).collect()))
                .collect()
        }

        fn frame() -> PixelStrip {
            let mut frame = PixelStrip::new(8);
            frame.push_column([true; 8]);
            frame.push_blank(8);
            frame.push_column([false, true, false, false, false, false, false, false]);
            frame
        }

        #[test]
        fn panels_go_to_matching_addresses() {
            let (mut display, bus) = display(2);
            let frame = frame();
            display.show(&frame).unwrap();

            let rows = frame.panel_rows(2);
            assert_eq!(
                digits(&bus.take()),
                [(0, rows[0].to_vec()), (1, rows[1].to_vec())]
            );
            assert_eq!(rows[0], [0x80; 8]);
            assert_eq!(rows[1][1], 0x40);
        }

        #[test]
        fn reversed_chain_swaps_addresses() {
            let (display, bus) = display(2);
            let mut display = display.reverse_order(true);
            let frame = frame();
            display.show(&frame).unwrap();

            let rows = frame.panel_rows(2);
            assert_eq!(
                digits(&bus.take()),
                [(1, rows[0].to_vec()), (0, rows[1].to_vec())]
            );
        }

        #[test]
        fn brightness_is_capped() {
            let (mut display, bus) = display(2);
            display.set_brightness(200).unwrap();
            assert_eq!(bus.take(), [(0, 0x0A, 0x0F), (1, 0x0A, 0x0F)]);
        }

        #[test]
        fn oversized_chain_is_rejected() {
            assert!(matches!(
                Max7219Display::open("/dev/null", 9),
                Err(DisplayError::Device(_))
            ));
        }
    }
}
