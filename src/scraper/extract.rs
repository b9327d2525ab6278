//! Selector-based extraction of product listings from supplier HTML

use anyhow::{Result, anyhow};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::price::parse_price;
use crate::models::Listing;
use crate::traits::SiteSelectors;

/// `SiteSelectors` parsed once per scrape.
pub struct CompiledSelectors {
    product_container: Vec<Selector>,
    name: Vec<Selector>,
    price: Vec<Selector>,
    sku: Vec<Selector>,
    sku_attributes: Vec<String>,
    image: Vec<Selector>,
    link: Vec<Selector>,
}

fn compile(kind: &str, sources: &[String]) -> Result<Vec<Selector>> {
    sources
        .iter()
        .map(|s| {
            Selector::parse(s).map_err(|e| anyhow!("Failed to parse {kind} selector '{s}': {e:?}"))
        })
        .collect()
}

impl CompiledSelectors {
    pub fn compile(selectors: &SiteSelectors) -> Result<Self> {
        Ok(Self {
            product_container: compile("product", &selectors.product_container)?,
            name: compile("name", &selectors.name)?,
            price: compile("price", &selectors.price)?,
            sku: compile("sku", &selectors.sku)?,
            sku_attributes: selectors.sku_attributes.clone(),
            image: compile("image", &selectors.image)?,
            link: compile("link", &selectors.link)?,
        })
    }
}

/// Text of the first element matched by any alternative, if non-empty.
fn first_text(product: ElementRef, alternatives: &[Selector]) -> Option<String> {
    alternatives.iter().find_map(|selector| {
        product
            .select(selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .find(|text| !text.is_empty())
    })
}

/// First non-empty attribute among `attrs` on the first element matched by any alternative.
fn first_attr(product: ElementRef, alternatives: &[Selector], attrs: &[&str]) -> Option<String> {
    alternatives.iter().find_map(|selector| {
        product.select(selector).find_map(|el| {
            attrs
                .iter()
                .filter_map(|attr| el.value().attr(attr))
                .map(str::trim)
                .find(|value| !value.is_empty())
                .map(str::to_string)
        })
    })
}

fn find_sku(product: ElementRef, selectors: &CompiledSelectors) -> Option<String> {
    selectors
        .sku_attributes
        .iter()
        .filter_map(|attr| product.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| first_attr(product, &selectors.sku, &["data-sku"]))
        .or_else(|| first_text(product, &selectors.sku))
}

/// Resolves a possibly relative link against the supplier's base URL.
pub fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("{}{href}", base_url.trim_end_matches('/'))
    } else {
        format!("{}/{href}", base_url.trim_end_matches('/'))
    }
}

/// Extracts every listing with a name, SKU and parseable price.
///
/// Containers matched by several alternatives are only read once.
pub fn extract_listings(html: &str, selectors: &CompiledSelectors, base_url: &str) -> Vec<Listing> {
    let document = Html::parse_document(html);
    let mut seen = std::collections::HashSet::new();
    let mut listings = Vec::new();

    for container in &selectors.product_container {
        for product in document.select(container) {
            if !seen.insert(product.id()) {
                continue;
            }

            let Some(name) = first_text(product, &selectors.name) else {
                continue;
            };

            let Some(price_text) = first_text(product, &selectors.price) else {
                debug!("No price for '{}'", name);
                continue;
            };

            let Some(price) = parse_price(&price_text) else {
                debug!("Unparseable price '{}' for '{}'", price_text, name);
                continue;
            };

            let Some(sku) = find_sku(product, selectors) else {
                debug!("No SKU for '{}'", name);
                continue;
            };

            let image_url = first_attr(product, &selectors.image, &["data-src", "src"])
                .map(|src| absolute_url(base_url, &src));
            let url = first_attr(product, &selectors.link, &["href"])
                .map(|href| absolute_url(base_url, &href));

            listings.push(Listing {
                sku,
                name,
                price,
                image_url,
                url,
            });
        }
    }

    listings
}
