//! Price strings and manufacturer names found in supplier listings

use regex::Regex;
use std::sync::LazyLock;

static PRICE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\d.]+").expect("valid price regex"));

/// Longest leading float in a run of digits and dots: `"1.2.3"` reads as 1.2.
static FLOAT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+(?:\.\d*)?|\.\d+)").expect("valid float regex"));

/// Brands recognised in product names, checked in order.
pub const KNOWN_MANUFACTURERS: [&str; 6] =
    ["GAF", "Owens Corning", "CertainTeed", "IKO", "Tamko", "Atlas"];

pub const UNKNOWN_MANUFACTURER: &str = "Unknown";

/// Parses the first amount in a price string such as `"$1,234.56 /bundle"`.
///
/// Returns `None` when there is no number or the amount is not positive.
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != '$' && *c != ',').collect();
    let run = PRICE_RUN.find(&cleaned)?.as_str();
    let amount: f64 = FLOAT_PREFIX.find(run)?.as_str().parse().ok()?;

    (amount.is_finite() && amount > 0.0).then_some(amount)
}

/// Picks the manufacturer mentioned in a product name.
pub fn infer_manufacturer(product_name: &str) -> &'static str {
    KNOWN_MANUFACTURERS
        .iter()
        .find(|brand| product_name.contains(*brand))
        .copied()
        .unwrap_or(UNKNOWN_MANUFACTURER)
}
