//! # LLM Assistance
//!
//! Thin client for an OpenAI-compatible chat completions endpoint, used to
//! parse pasted supplier quotes, suggest a product from a loose name and
//! estimate market prices for a material.
//!
//! ## Optional Integration
//!
//! The client works without an API key. Every operation has an offline
//! fallback in [`heuristic`], which is also used when the remote call fails.
//! Results carry a `source` field so callers can tell the two apart.
//!
//! ## Request Shape
//!
//! Every call sends a system prompt and a user prompt with
//! `response_format = {"type": "json_object"}` and reads the JSON document
//! out of `choices[0].message.content`.

pub mod heuristic;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::LlmSettings;

const QUOTE_PARSER_PROMPT: &str = "You are a specialized parser for roofing material quotes. \
Extract line items from unstructured email or quote text. Return a JSON object \
{\"items\": [...]} where each item has: name (material description), qty (number), \
unitPrice (price per unit), unit (e.g. \"Sq\", \"Rolls\", \"Pcs\", \"Bdl\", \"Box\"). \
If no items are found return {\"items\": []}.";

const IDENTIFY_PROMPT: &str =
    "You are helping identify roofing products. Be honest about uncertainty. When confidence is low, say so.";

const PRICING_PROMPT: &str = "You are an expert in roofing materials pricing and procurement.";

/// A line item read from a supplier quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLineItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub qty: f64,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedQuote {
    pub items: Vec<QuoteLineItem>,
    pub source: String,
}

/// What the user knows about a product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ProductQuery {
    fn sku(&self) -> Option<&str> {
        self.sku.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// True when there is neither a SKU nor a name to go on.
    pub fn is_empty(&self) -> bool {
        self.sku().is_none() && self.name().is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Specifications {
    pub unit: String,
    pub coverage: String,
    pub color: String,
}

/// A suggested product; always to be confirmed by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductIdentification {
    pub product_name: String,
    pub manufacturer: String,
    pub sku: String,
    pub category: String,
    pub specifications: Specifications,
    pub confidence: u8,
    pub alternative_names: Vec<String>,
    pub confirmation_needed: bool,
    pub warnings: Vec<String>,
    pub source: String,
    pub manual_entry: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceDiscoveryRequest {
    pub material: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
}

fn default_quantity() -> f64 {
    1.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceRange {
    pub low: f64,
    pub average: f64,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub name: String,
    #[serde(default)]
    pub price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceDiscovery {
    pub price_range: PriceRange,
    pub unit: String,
    pub vendors: Vec<String>,
    pub market_conditions: String,
    pub alternatives: Vec<Alternative>,
    pub source: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Chat completions client with offline fallbacks.
///
/// Without `api_key` every operation answers from [`heuristic`] and no
/// request is made.
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to create LLM HTTP client")?;

        if settings.api_key.is_none() {
            info!("No LLM API key configured, AI endpoints will use offline estimates");
        }

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends one chat completion and parses the reply as JSON.
    pub async fn complete_json(&self, system: &str, user: &str, temperature: f64) -> Result<Value> {
        let Some(api_key) = &self.api_key else {
            bail!("No LLM API key configured");
        };

        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": temperature,
            "response_format": { "type": "json_object" },
        });

        debug!("POST {} ({})", url, self.model);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("LLM request failed: {}", status);
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to decode chat completion")?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("Chat completion has no content")?;

        serde_json::from_str(&content).context("LLM reply is not valid JSON")
    }

    /// Extracts line items from pasted quote text.
    pub async fn parse_quote_text(&self, text: &str) -> ParsedQuote {
        if self.is_configured() {
            match self.complete_json(QUOTE_PARSER_PROMPT, text, 0.1).await.and_then(quote_items) {
                Ok(items) => {
                    return ParsedQuote {
                        items,
                        source: "AI".to_string(),
                    };
                }
                Err(e) => warn!("AI quote parsing failed, using line parser: {:#}", e),
            }
        }

        ParsedQuote {
            items: heuristic::parse_quote_lines(text),
            source: "Heuristic".to_string(),
        }
    }

    /// Suggests a product for a SKU or name.
    ///
    /// A SKU is taken as given. Fails when the query has neither.
    pub async fn identify_product(&self, query: &ProductQuery) -> Result<ProductIdentification> {
        if let Some(sku) = query.sku() {
            let name = query.name();
            return Ok(ProductIdentification {
                product_name: name.map_or_else(|| format!("Product {sku}"), str::to_string),
                manufacturer: crate::scraper::price::infer_manufacturer(name.unwrap_or_default()).to_string(),
                sku: sku.to_string(),
                category: "Roofing Material".to_string(),
                specifications: Specifications {
                    unit: "Each".to_string(),
                    ..Specifications::default()
                },
                confidence: 100,
                confirmation_needed: true,
                source: "SKU Lookup".to_string(),
                manual_entry: true,
                ..ProductIdentification::default()
            });
        }

        let Some(name) = query.name() else {
            bail!("Provide a product name or SKU");
        };

        if self.is_configured() {
            let mut prompt = format!(
                "Based on this information, suggest the most likely roofing product.\n\nProduct Name: {name}\n"
            );
            if let Some(description) = query.description.as_deref().filter(|d| !d.trim().is_empty()) {
                prompt.push_str(&format!("Description: {description}\n"));
            }
            prompt.push_str(
                "\nReturn JSON with your best guess: productName, manufacturer, sku (or \"UNKNOWN\"), \
                 category, specifications {unit, coverage, color}, confidence (0-100), \
                 alternativeNames, confirmationNeeded, warnings.",
            );

            let result = self
                .complete_json(IDENTIFY_PROMPT, &prompt, 0.3)
                .await
                .and_then(|value| serde_json::from_value::<ProductIdentification>(value).context("Unexpected identification shape"));

            match result {
                Ok(mut identification) => {
                    identification.confidence = identification.confidence.min(100);
                    identification.source = "AI Suggestion".to_string();
                    identification.manual_entry = false;
                    return Ok(identification);
                }
                Err(e) => warn!("AI product identification failed, inferring from name: {:#}", e),
            }
        }

        Ok(heuristic::identify_by_name(name))
    }

    /// Estimates the market price range of a material.
    pub async fn discover_prices(&self, request: &PriceDiscoveryRequest) -> PriceDiscovery {
        if self.is_configured() {
            let prompt = format!(
                "Provide realistic current market pricing for the following roofing material.\n\n\
                 Material: {}\nLocation: {}\nQuantity: {}\n\n\
                 Return JSON: {{\"priceRange\": {{\"low\": number, \"average\": number, \"high\": number}}, \
                 \"unit\": string, \"vendors\": [string], \"marketConditions\": string, \
                 \"alternatives\": [{{\"name\": string, \"price\": number}}]}}",
                request.material,
                request.location.as_deref().unwrap_or(crate::models::NATIONAL),
                request.quantity,
            );

            let result = self
                .complete_json(PRICING_PROMPT, &prompt, 0.3)
                .await
                .and_then(|value| serde_json::from_value::<PriceDiscovery>(value).context("Unexpected pricing shape"));

            match result {
                Ok(mut discovery) => {
                    discovery.source = "AI".to_string();
                    return discovery;
                }
                Err(e) => warn!("AI price discovery failed, using base prices: {:#}", e),
            }
        }

        heuristic::estimate_prices(&request.material)
    }
}

/// Line items from a reply shaped `{"items": [...]}`, `{"lineItems": [...]}` or a bare array.
fn quote_items(value: Value) -> Result<Vec<QuoteLineItem>> {
    let items = match value {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => map
            .remove("items")
            .or_else(|| map.remove("lineItems"))
            .context("LLM reply has no items")?,
        other => bail!("Unexpected LLM reply: {other}"),
    };

    serde_json::from_value(items).context("Unexpected line item shape")
}

impl Clone for LlmClient {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
        }
    }
}
