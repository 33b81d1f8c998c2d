use std::{
    io,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use matrix_font_bdf::ConvertOptions;
use matrix_font_core::{Fallback, GlyphRenderer, Renderer};
#[cfg(feature = "max7219")]
use matrix_ticker::display::Max7219Display;
use matrix_ticker::{
    Board, Config, MatrixDisplay, QuoteFile, TerminalDisplay, Ticker,
    config::load_names,
    logger::{self, LOG_ENV},
};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// More logging; repeat for trace output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a BDF font into a font container
    Convert {
        source: PathBuf,
        dest: PathBuf,

        /// Drop glyphs below U+0020
        #[arg(long)]
        skip_control: bool,

        /// Store glyphs upside down
        #[arg(long)]
        flip_vertical: bool,
    },

    /// Render text with a font container and print it
    Preview {
        #[arg(long)]
        font: PathBuf,

        /// Blank columns between glyphs
        #[arg(long, default_value_t = 1)]
        spacing: usize,

        /// Glyph drawn for characters the font lacks
        #[arg(long)]
        fallback: Option<char>,

        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Scroll quotes across the display
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Font container for names
    #[arg(long)]
    font: PathBuf,

    /// Font container for prices; defaults to the name font
    #[arg(long)]
    price_font: Option<PathBuf>,

    /// File of `SYMBOL PRICE [NAME]` lines kept current by another process
    #[arg(long)]
    quotes: PathBuf,

    /// File of `SYMBOL NAME` lines overriding the built-in names
    #[arg(long)]
    names: Option<PathBuf>,

    /// Symbols to show, in order
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    stocks: Vec<String>,

    /// Seconds between scroll steps
    #[arg(long, default_value_t = 0.05)]
    speed: f64,

    /// Number of chained 8x8 panels
    #[arg(long, default_value_t = 4)]
    panels: usize,

    /// LED intensity, 0 to 15
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=15))]
    brightness: u8,

    /// Seconds a fetched price is reused
    #[arg(long, default_value_t = 160)]
    cache_ttl: u64,

    /// Scroll through once and exit
    #[arg(long)]
    once: bool,

    /// Drive a MAX7219 chain on this spidev device instead of the terminal
    #[cfg(feature = "max7219")]
    #[arg(long)]
    spi_device: Option<PathBuf>,

    /// The chain is wired with its last panel on the left
    #[cfg(feature = "max7219")]
    #[arg(long, requires = "spi_device")]
    reverse_panels: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = logger::level(
        cli.verbose,
        cli.quiet,
        std::env::var(LOG_ENV).ok().as_deref(),
    );
    logger::init(level).context("failed to install logger")?;

    match cli.command {
        Command::Convert {
            source,
            dest,
            skip_control,
            flip_vertical,
        } => {
            let options = ConvertOptions {
                skip_control,
                flip_vertical,
            };
            let font = matrix_font_bdf::convert(&source, &dest, &options)?;
            println!(
                "{} -> {}: {} glyphs, {}x{}",
                source.display(),
                dest.display(),
                font.len(),
                font.width(),
                font.height()
            );
        }
        Command::Preview {
            font,
            spacing,
            fallback,
            text,
        } => {
            let font = matrix_font_core::load(&font)
                .with_context(|| format!("failed to load {}", font.display()))?;

            let mut renderer = GlyphRenderer::new(&font).with_spacing(spacing);
            if let Some(fallback) = fallback {
                let Ok(codepoint) = u16::try_from(u32::from(fallback)) else {
                    bail!("fallback {fallback:?} is outside the Basic Multilingual Plane");
                };
                renderer = renderer.with_fallback(Fallback::Glyph(codepoint));
            }

            print!("{}", renderer.render_text(&text.join(" ")));
        }
        Command::Run(args) => run(args)?,
    }

    Ok(())
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    if !args.speed.is_finite() || args.speed < 0.0 {
        bail!("--speed must be a non-negative number of seconds");
    }

    let name_font = matrix_font_core::load(&args.font)
        .with_context(|| format!("failed to load {}", args.font.display()))?;
    let price_font = match &args.price_font {
        Some(path) => Some(
            matrix_font_core::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
        ),
        None => None,
    };

    let mut config = Config {
        panels: args.panels,
        brightness: args.brightness,
        frame_delay: Duration::from_secs_f64(args.speed),
        cache_ttl: Duration::from_secs(args.cache_ttl),
        ..Config::default()
    };
    if !args.stocks.is_empty() {
        config.symbols = args.stocks;
    }
    if let Some(path) = &args.names {
        config.names.extend(load_names(path)?);
    }

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::Relaxed))
            .context("failed to install Ctrl-C handler")?;
    }

    let board = Board::new(
        &name_font,
        price_font.as_ref().unwrap_or(&name_font),
        config.layout,
    );
    let quotes = QuoteFile::new(args.quotes);

    log::info!(
        "scrolling {} symbols across {} panels",
        config.symbols.len(),
        config.panels
    );

    #[cfg(feature = "max7219")]
    if let Some(path) = &args.spi_device {
        let display = Max7219Display::open(path, config.panels)?.reverse_order(args.reverse_panels);
        return drive(board, quotes, display, config, args.once, &running);
    }

    let display = TerminalDisplay::new(io::stdout(), config.panels);
    drive(board, quotes, display, config, args.once, &running)
}

fn drive<D: MatrixDisplay>(
    board: Board<'_>,
    quotes: QuoteFile,
    display: D,
    config: Config,
    once: bool,
    running: &AtomicBool,
) -> anyhow::Result<()> {
    let mut ticker = Ticker::new(board, quotes, display, config)?;
    if once {
        ticker.cycle(running)?;
    } else {
        ticker.run(running)?;
    }

    Ok(())
}
