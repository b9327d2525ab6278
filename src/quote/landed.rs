use serde::{Deserialize, Serialize};

use super::LineItem;

/// Cost of a vendor quote once tax and delivery charges are added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandedCost {
    pub subtotal: f64,
    pub tax: f64,
    pub delivery_fee: f64,
    pub pallet_fees: f64,
    pub grand_total: f64,
}

/// Subtotal of `lines` plus tax, delivery fee and per-pallet fees.
pub fn calculate_landed_cost(
    lines: &[LineItem],
    tax_rate: f64,
    delivery_fee: f64,
    pallet_fee: f64,
    pallet_count: u32,
) -> LandedCost {
    let subtotal: f64 = lines.iter().map(|line| line.unit_price * line.qty).sum();
    let tax = subtotal * tax_rate;
    let pallet_fees = pallet_fee * f64::from(pallet_count);

    LandedCost {
        subtotal,
        tax,
        delivery_fee,
        pallet_fees,
        grand_total: subtotal + tax + delivery_fee + pallet_fees,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(unit_price: f64, qty: f64) -> LineItem {
        LineItem {
            id: "x".to_string(),
            name: "x".to_string(),
            unit: "Sq".to_string(),
            qty,
            unit_price,
            line_total: unit_price * qty,
            missing_price: unit_price == 0.0,
        }
    }

    #[test]
    fn grand_total_is_sum_of_parts() {
        let lines = [line(115.0, 40.0), line(65.0, 4.0), line(0.0, 10.0)];
        let cost = calculate_landed_cost(&lines, 0.0725, 75.0, 25.0, 2);

        assert_eq!(cost.subtotal, 4860.0);
        assert!((cost.tax - 352.35).abs() < 1e-9);
        assert_eq!(cost.delivery_fee, 75.0);
        assert_eq!(cost.pallet_fees, 50.0);
        assert!((cost.grand_total - (4860.0 + 352.35 + 75.0 + 50.0)).abs() < 1e-9);
    }

    #[test]
    fn empty_quote_costs_only_fees() {
        let cost = calculate_landed_cost(&[], 0.08, 40.0, 25.0, 0);
        assert_eq!(cost.subtotal, 0.0);
        assert_eq!(cost.grand_total, 40.0);
    }
}
