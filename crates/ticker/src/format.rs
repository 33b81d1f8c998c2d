//! Turning symbols and prices into display text.

use std::collections::HashMap;

/// Shown in place of a price that could not be fetched.
pub const PRICE_PLACEHOLDER: &str = "Err";

/// Words dropped from company names reported by the quote service.
const CORPORATE_WORDS: &[&str] = &[
    "corporation",
    "co",
    "holdings",
    "inc",
    "ltd",
    "corp",
    "motor",
    "group",
];

/// Format a price for display.
///
/// Tokyo Stock Exchange symbols (`.T`) show one decimal up to 3000 and whole
/// yen above that, matching the exchange's tick sizes. Everything else shows
/// two decimals.
pub fn format_price(symbol: &str, price: Option<f64>) -> String {
    let Some(price) = price else {
        return PRICE_PLACEHOLDER.to_owned();
    };

    if symbol.ends_with(".T") {
        if price <= 3000.0 {
            format!("{price:.1}")
        } else {
            format!("{}", price.trunc() as i64)
        }
    } else {
        format!("{price:.2}")
    }
}

/// Strip corporate suffixes such as "Inc." or "Corporation" from a company
/// name.
pub fn clean_name(name: &str) -> String {
    name.split_whitespace()
        .filter(|word| {
            let bare = word.trim_end_matches(['.', ',']);
            !CORPORATE_WORDS
                .iter()
                .any(|corporate| bare.eq_ignore_ascii_case(corporate))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pick the name to show for a symbol: a configured name first, then the
/// cleaned name from the quote service, then the symbol itself.
pub fn display_name(
    symbol: &str,
    names: &HashMap<String, String>,
    reported: Option<&str>,
) -> String {
    if let Some(name) = names.get(symbol) {
        return name.clone();
    }

    reported
        .map(clean_name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| symbol.to_owned())
}
