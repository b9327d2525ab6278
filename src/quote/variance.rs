//! Price variance between vendor quotes for the same scope

use serde::Serialize;
use std::collections::BTreeMap;

use super::{ScopeItem, VendorQuote};

/// Deviation from the average, in percent, above which a price is flagged.
pub const ALERT_THRESHOLD_PCT: f64 = 15.0;
/// Deviation above which a flagged price is `high` rather than `medium`.
pub const HIGH_THRESHOLD_PCT: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertKind {
    Variance,
    ZeroPrice,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VarianceAlert {
    pub vendor_id: String,
    pub vendor_name: String,
    pub item_id: String,
    pub item_name: String,
    pub price: f64,
    pub average: f64,
    /// Percent from the average, one decimal
    pub variance: f64,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: AlertKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VarianceReport {
    /// Average positive unit price per scope item
    pub averages: BTreeMap<String, f64>,
    /// Percent variance per vendor id, then per scope item
    pub variances: BTreeMap<String, BTreeMap<String, f64>>,
    pub alerts: Vec<VarianceAlert>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compares each vendor's unit price against the average of all positive prices.
///
/// Items no vendor prices are skipped. A zero price against a positive
/// average is a -100% variance and also raises a `critical` zero-price alert.
pub fn detect_variance(quotes: &[VendorQuote], scope: &[ScopeItem]) -> VarianceReport {
    let mut report = VarianceReport::default();
    if quotes.is_empty() || scope.is_empty() {
        return report;
    }

    for item in scope {
        let prices: Vec<f64> = quotes
            .iter()
            .filter_map(|q| q.line_items.iter().find(|li| li.id == item.id))
            .map(|li| li.unit_price)
            .filter(|price| *price > 0.0)
            .collect();

        if prices.is_empty() {
            continue;
        }

        let average = prices.iter().sum::<f64>() / prices.len() as f64;
        report.averages.insert(item.id.clone(), average);

        for quote in quotes {
            let Some(line) = quote.line_items.iter().find(|li| li.id == item.id) else {
                continue;
            };

            let variance = (line.unit_price - average) / average * 100.0;
            report
                .variances
                .entry(quote.vendor_id.clone())
                .or_default()
                .insert(item.id.clone(), variance);

            let mut flagged = Vec::with_capacity(2);
            if variance.abs() > HIGH_THRESHOLD_PCT {
                flagged.push((Severity::High, AlertKind::Variance));
            } else if variance.abs() > ALERT_THRESHOLD_PCT {
                flagged.push((Severity::Medium, AlertKind::Variance));
            }
            if line.unit_price == 0.0 {
                flagged.push((Severity::Critical, AlertKind::ZeroPrice));
            }

            for (severity, kind) in flagged {
                report.alerts.push(VarianceAlert {
                    vendor_id: quote.vendor_id.clone(),
                    vendor_name: quote.vendor_name.clone(),
                    item_id: item.id.clone(),
                    item_name: line.name.clone(),
                    price: line.unit_price,
                    average,
                    variance: round1(variance),
                    severity,
                    kind,
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{Vendor, compare_vendors, default_catalog};

    fn vendor(id: &str, price: f64) -> Vendor {
        Vendor {
            id: id.to_string(),
            name: id.to_uppercase(),
            pricing: [("OC-DUR-DRIFT".to_string(), price)].into_iter().collect(),
            ..Vendor::default()
        }
    }

    fn scope() -> Vec<ScopeItem> {
        vec![ScopeItem { id: "OC-DUR-DRIFT".to_string(), qty: 10.0 }]
    }

    #[test]
    fn flags_prices_far_from_average() {
        // Average 100: a is +40%, b is -20%, c and d are within 15%
        let vendors = vec![vendor("a", 140.0), vendor("b", 80.0), vendor("c", 90.0), vendor("d", 90.0)];
        let quotes = compare_vendors(&scope(), &vendors, &default_catalog());
        let report = detect_variance(&quotes, &scope());

        assert_eq!(report.averages["OC-DUR-DRIFT"], 100.0);
        assert_eq!(report.variances["a"]["OC-DUR-DRIFT"], 40.0);
        assert_eq!(report.alerts.len(), 2);

        let high = &report.alerts[0];
        assert_eq!(high.vendor_id, "a");
        assert_eq!(high.severity, Severity::High);
        assert_eq!(high.variance, 40.0);

        let medium = &report.alerts[1];
        assert_eq!(medium.vendor_id, "b");
        assert_eq!(medium.severity, Severity::Medium);
        assert_eq!(medium.variance, -20.0);
    }

    #[test]
    fn zero_price_raises_variance_and_critical_alerts() {
        let vendors = vec![vendor("a", 100.0), vendor("b", 0.0)];
        let quotes = compare_vendors(&scope(), &vendors, &default_catalog());
        let report = detect_variance(&quotes, &scope());

        let kinds: Vec<_> = report.alerts.iter().map(|a| (a.severity, a.kind)).collect();
        assert_eq!(
            kinds,
            vec![(Severity::High, AlertKind::Variance), (Severity::Critical, AlertKind::ZeroPrice)]
        );
        assert!(report.alerts.iter().all(|a| a.vendor_id == "b" && a.variance == -100.0));
    }

    #[test]
    fn unpriced_items_and_empty_inputs_are_skipped() {
        let vendors = vec![vendor("a", 0.0)];
        let quotes = compare_vendors(&scope(), &vendors, &default_catalog());
        assert_eq!(detect_variance(&quotes, &scope()), VarianceReport::default());
        assert_eq!(detect_variance(&[], &scope()), VarianceReport::default());
        assert_eq!(detect_variance(&quotes, &[]), VarianceReport::default());
    }
}
