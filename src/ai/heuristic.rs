//! Offline fallbacks used when no LLM key is configured or the call fails.

use regex::Regex;
use std::sync::LazyLock;

use super::{PriceDiscovery, PriceRange, ProductIdentification, QuoteLineItem, Specifications};
use crate::scraper::price::{infer_manufacturer, parse_price};

static QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(squares?|sq|rolls?|pieces?|pcs|bundles?|bdl|box(?:es)?|lf)\b")
        .expect("valid quantity regex")
});

static DOLLAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\s?(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)")
        .expect("valid dollar regex")
});

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?")
        .expect("valid number regex")
});

/// Per-unit prices used to estimate a range, matched by substring.
const BASE_PRICES: [(&str, f64); 5] = [
    ("shingles", 115.0),
    ("underlayment", 45.0),
    ("drip edge", 8.5),
    ("nails", 35.0),
    ("ice & water", 65.0),
];
const DEFAULT_BASE_PRICE: f64 = 50.0;

fn normalize_unit(token: &str) -> &'static str {
    match token.to_lowercase().as_str() {
        "sq" | "square" | "squares" => "Sq",
        "roll" | "rolls" => "Rolls",
        "bdl" | "bundle" | "bundles" => "Bdl",
        "box" | "boxes" => "Box",
        "lf" => "LF",
        _ => "Pcs",
    }
}

/// Parses one quote line such as `Duration Driftwood 40 sq @ $115.00`.
///
/// A line needs a quantity followed by a unit and at least one other number.
/// The unit price is the first dollar amount, or else the last number that
/// is not the quantity.
pub fn parse_line(line: &str) -> Option<QuoteLineItem> {
    let caps = QUANTITY_RE.captures(line)?;
    let qty_match = caps.get(1)?;
    let qty: f64 = qty_match.as_str().parse().ok()?;
    let unit = normalize_unit(caps.get(2)?.as_str());

    let price_text = match DOLLAR_RE.captures(line).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => NUMBER_RE
            .find_iter(line)
            .filter(|m| m.start() != qty_match.start())
            .last()?
            .as_str(),
    };

    let name = line
        .split(|c: char| c.is_ascii_digit())
        .next()
        .unwrap_or_default()
        .trim()
        .trim_end_matches(['-', ':', '$', '@'])
        .trim();

    Some(QuoteLineItem {
        name: if name.is_empty() {
            "Unknown Material".to_string()
        } else {
            name.to_string()
        },
        qty: if qty > 0.0 { qty } else { 1.0 },
        unit_price: parse_price(price_text).unwrap_or(0.0),
        unit: unit.to_string(),
    })
}

/// Every parseable line of `text`.
pub fn parse_quote_lines(text: &str) -> Vec<QuoteLineItem> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_line)
        .collect()
}

/// Identification from the name alone.
pub fn identify_by_name(name: &str) -> ProductIdentification {
    ProductIdentification {
        product_name: name.to_string(),
        manufacturer: infer_manufacturer(name).to_string(),
        sku: "UNKNOWN".to_string(),
        category: "Roofing Material".to_string(),
        specifications: Specifications::default(),
        confidence: 50,
        alternative_names: Vec::new(),
        confirmation_needed: true,
        warnings: vec!["Manufacturer inferred from the product name only".to_string()],
        source: "Heuristic".to_string(),
        manual_entry: false,
    }
}

/// Price range from the built-in base price table.
pub fn estimate_prices(material: &str) -> PriceDiscovery {
    let lower = material.to_lowercase();
    let average = BASE_PRICES
        .iter()
        .find(|(key, _)| lower.contains(key))
        .map_or(DEFAULT_BASE_PRICE, |(_, price)| *price);

    PriceDiscovery {
        price_range: PriceRange {
            low: average * 0.85,
            average,
            high: average * 1.25,
        },
        unit: "Each".to_string(),
        vendors: vec![
            "ABC Supply".to_string(),
            "Beacon Building Products".to_string(),
            "SRS Distribution".to_string(),
        ],
        market_conditions: "Prices stable in current market. Local availability good.".to_string(),
        alternatives: Vec::new(),
        source: "Estimate".to_string(),
    }
}
