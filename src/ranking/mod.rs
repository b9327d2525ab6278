//! Job-aware vendor ranking
//!
//! Every offer gets seven bounded sub-scores. The job context decides how
//! much each one weighs; the final score is the weighted mean, so it stays
//! on the same 0-30 scale as the sub-scores regardless of the weights.
//!
//! | factor     | max | weighted up when            |
//! |------------|-----|-----------------------------|
//! | price      | 30  | tight budget                |
//! | delivery   | 25  | urgent job                  |
//! | reputation | 20  | premium quality preference  |
//! | distance   | 15  | urgent job                  |
//! | service    | 10  | commercial project          |
//! | preferred  | 10  | always 1.5                  |
//! | stock      | 10  | urgent job                  |

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Branch distance at which the distance score reaches zero, in miles.
pub const MAX_DISTANCE_MILES: f64 = 50.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Urgent,
    #[default]
    Normal,
    Flexible,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Budget {
    Tight,
    #[default]
    Moderate,
    Flexible,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreference {
    Economy,
    #[default]
    Standard,
    Premium,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    #[default]
    Residential,
    Commercial,
    Repair,
}

/// What the job needs, as far as ranking is concerned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobContext {
    pub urgency: Urgency,
    pub budget: Budget,
    pub quality_preference: QualityPreference,
    pub project_type: ProjectType,
    pub preferred_suppliers: Vec<String>,
    /// Units the job needs; without it only stock on hand counts as available
    pub quantity: Option<f64>,
    pub location: Option<String>,
}

/// One supplier's offer for a material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorOffer {
    pub supplier_name: String,
    pub total_cost: f64,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub estimated_delivery_days: f64,
    #[serde(default)]
    pub lead_time_days: f64,
    /// Positive review percentage, 0-100
    #[serde(default)]
    pub reputation: f64,
    /// Stars, 0-5
    #[serde(default)]
    pub service_rating: f64,
    #[serde(default)]
    pub branch_distance: f64,
    #[serde(default)]
    pub quantity_available: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Factor {
    pub score: f64,
    pub weight: f64,
    pub details: String,
}

impl Factor {
    fn weighted(&self) -> f64 {
        self.score * self.weight
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Factors {
    pub price: Factor,
    pub delivery: Factor,
    pub reputation: Factor,
    pub distance: Factor,
    pub service: Factor,
    pub preferred: Factor,
    pub stock: Factor,
}

impl Factors {
    pub fn entries(&self) -> [(&'static str, &Factor); 7] {
        [
            ("price", &self.price),
            ("delivery", &self.delivery),
            ("reputation", &self.reputation),
            ("distance", &self.distance),
            ("service", &self.service),
            ("preferred", &self.preferred),
            ("stock", &self.stock),
        ]
    }

    /// Weighted mean of the sub-scores.
    pub fn score(&self) -> f64 {
        let (total, weight) = self
            .entries()
            .iter()
            .fold((0.0, 0.0), |(total, weight), (_, f)| (total + f.weighted(), weight + f.weight));

        if weight > 0.0 { total / weight } else { 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationLevel {
    HighlyRecommended,
    Recommended,
    Acceptable,
    NotRecommended,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub level: RecommendationLevel,
    pub text: String,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedVendor {
    #[serde(flatten)]
    pub offer: VendorOffer,
    pub intelligence_score: f64,
    pub factors: Factors,
    pub recommendation: Recommendation,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn score_offer(offer: &VendorOffer, ctx: &JobContext, min_cost: f64, max_cost: f64, preferred: &HashSet<&str>) -> Factors {
    let urgent = ctx.urgency == Urgency::Urgent;

    let range = max_cost - min_cost;
    let position = (offer.total_cost - min_cost) / if range > 0.0 { range } else { 1.0 };
    let price = Factor {
        score: 30.0 * (1.0 - position),
        weight: match ctx.budget {
            Budget::Tight => 1.5,
            Budget::Flexible => 0.7,
            Budget::Moderate => 1.0,
        },
        details: format!(
            "Price rank: {}",
            if position < 0.2 {
                "Best"
            } else if position < 0.5 {
                "Competitive"
            } else {
                "Higher"
            }
        ),
    };

    let delivery = Factor {
        score: if urgent {
            if offer.in_stock {
                25.0
            } else {
                (25.0 - offer.estimated_delivery_days * 5.0).max(0.0)
            }
        } else {
            25.0 - offer.estimated_delivery_days * 2.0
        },
        weight: match ctx.urgency {
            Urgency::Urgent => 1.8,
            Urgency::Flexible => 0.6,
            Urgency::Normal => 1.0,
        },
        details: if offer.in_stock {
            format!("In stock ({}d delivery)", offer.estimated_delivery_days)
        } else {
            format!(
                "{}d lead time + {}d delivery",
                offer.lead_time_days, offer.estimated_delivery_days
            )
        },
    };

    let reputation = Factor {
        score: offer.reputation / 100.0 * 20.0,
        weight: match ctx.quality_preference {
            QualityPreference::Premium => 1.5,
            QualityPreference::Economy => 0.7,
            QualityPreference::Standard => 1.0,
        },
        details: format!(
            "{}% positive reviews, {:.1}\u{2605} rating",
            offer.reputation, offer.service_rating
        ),
    };

    let distance = Factor {
        score: (15.0 * (1.0 - offer.branch_distance / MAX_DISTANCE_MILES)).max(0.0),
        weight: if urgent { 1.3 } else { 1.0 },
        details: format!("{} mi from job site", offer.branch_distance),
    };

    let service = Factor {
        score: offer.service_rating / 5.0 * 10.0,
        weight: if ctx.project_type == ProjectType::Commercial { 1.4 } else { 1.0 },
        details: format!("{:.1}/5.0 service rating", offer.service_rating),
    };

    let is_preferred = preferred.contains(offer.supplier_name.as_str());
    let preferred = Factor {
        score: if is_preferred { 10.0 } else { 0.0 },
        weight: 1.5,
        details: if is_preferred {
            "Preferred supplier".to_string()
        } else {
            String::new()
        },
    };

    let stock = Factor {
        score: if offer.in_stock {
            10.0
        } else if ctx.quantity.is_some_and(|needed| offer.quantity_available >= needed) {
            7.0
        } else {
            3.0
        },
        weight: if urgent { 1.6 } else { 1.0 },
        details: if offer.in_stock {
            format!("{} units in stock", offer.quantity_available)
        } else {
            format!("Limited stock - {}d lead time", offer.lead_time_days)
        },
    };

    Factors {
        price,
        delivery,
        reputation,
        distance,
        service,
        preferred,
        stock,
    }
}

/// Details of the `count` strongest weighted factors that have any.
fn top_reasons(factors: &Factors, count: usize) -> Vec<String> {
    let mut entries: Vec<_> = factors
        .entries()
        .into_iter()
        .filter(|(_, f)| !f.details.is_empty())
        .collect();
    entries.sort_by(|a, b| b.1.weighted().total_cmp(&a.1.weighted()));

    entries
        .into_iter()
        .take(count)
        .map(|(_, f)| f.details.clone())
        .collect()
}

fn recommend(score: f64, factors: &Factors) -> Recommendation {
    let (level, text, reasons) = if score >= 85.0 {
        (RecommendationLevel::HighlyRecommended, "Excellent choice for this job", top_reasons(factors, 3))
    } else if score >= 70.0 {
        (RecommendationLevel::Recommended, "Good option for this job", top_reasons(factors, 2))
    } else if score >= 55.0 {
        (RecommendationLevel::Acceptable, "Acceptable but not optimal", top_reasons(factors, 1))
    } else {
        let weakest = factors
            .entries()
            .into_iter()
            .min_by(|a, b| a.1.score.total_cmp(&b.1.score))
            .map_or("price", |(name, _)| name);
        (
            RecommendationLevel::NotRecommended,
            "Not ideal for this job",
            vec![format!("Consider alternatives with better {weakest}")],
        )
    };

    Recommendation {
        level,
        text: text.to_string(),
        reasons,
    }
}

/// Scores every offer for the job and sorts best first.
pub fn rank_vendors(offers: &[VendorOffer], ctx: &JobContext) -> Vec<RankedVendor> {
    if offers.is_empty() {
        return Vec::new();
    }

    let min_cost = offers.iter().map(|o| o.total_cost).fold(f64::INFINITY, f64::min);
    let max_cost = offers.iter().map(|o| o.total_cost).fold(f64::NEG_INFINITY, f64::max);
    let preferred: HashSet<&str> = ctx.preferred_suppliers.iter().map(String::as_str).collect();

    let mut ranked: Vec<RankedVendor> = offers
        .iter()
        .map(|offer| {
            let factors = score_offer(offer, ctx, min_cost, max_cost, &preferred);
            let score = round1(factors.score());
            RankedVendor {
                offer: offer.clone(),
                intelligence_score: score,
                recommendation: recommend(score, &factors),
                factors,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.intelligence_score.total_cmp(&a.intelligence_score));
    ranked
}

/// Ranked options for one material of a quote.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialChoice {
    pub material: String,
    pub best_vendor: Option<RankedVendor>,
    pub alternative_vendors: Vec<RankedVendor>,
    pub all_options: Vec<RankedVendor>,
}

impl MaterialChoice {
    pub fn new(material: String, ranked: Vec<RankedVendor>) -> Self {
        Self {
            material,
            best_vendor: ranked.first().cloned(),
            alternative_vendors: ranked.iter().skip(1).take(2).cloned().collect(),
            all_options: ranked,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummary {
    pub total_items: usize,
    pub total_cost: f64,
    pub estimated_savings: f64,
    pub average_delivery_days: i64,
    pub suppliers_used: usize,
}

/// Totals over the best vendor of every material that has one.
pub fn summarize(choices: &[MaterialChoice]) -> QuoteSummary {
    let chosen: Vec<(&MaterialChoice, &RankedVendor)> = choices
        .iter()
        .filter_map(|c| c.best_vendor.as_ref().map(|best| (c, best)))
        .collect();

    if chosen.is_empty() {
        return QuoteSummary {
            total_items: choices.len(),
            ..QuoteSummary::default()
        };
    }

    let total_cost = chosen.iter().map(|(_, best)| best.offer.total_cost).sum();
    let estimated_savings = chosen
        .iter()
        .map(|(choice, best)| {
            let max_cost = choice
                .all_options
                .iter()
                .map(|v| v.offer.total_cost)
                .fold(best.offer.total_cost, f64::max);
            max_cost - best.offer.total_cost
        })
        .sum();
    let delivery_days: f64 = chosen
        .iter()
        .map(|(_, best)| best.offer.estimated_delivery_days)
        .sum();
    let suppliers: HashSet<&str> = chosen
        .iter()
        .map(|(_, best)| best.offer.supplier_name.as_str())
        .collect();

    QuoteSummary {
        total_items: choices.len(),
        total_cost,
        estimated_savings,
        average_delivery_days: (delivery_days / chosen.len() as f64).round() as i64,
        suppliers_used: suppliers.len(),
    }
}
