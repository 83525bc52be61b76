//! Silver cost calculator: weight × price per gram, plus currency conversion.

use crate::domain::{Currency, WeightUnit};
use crate::error::AnalyticsError;

/// Lowest accepted price per gram (INR).
pub const MIN_PRICE_PER_GRAM: f64 = 1.0;

/// A priced quantity of silver.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub weight_grams: f64,
    pub price_per_gram: f64,
    pub total_inr: f64,
    pub currency: Currency,
    pub converted: f64,
}

pub fn to_grams(weight: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Grams => weight,
        WeightUnit::Kilograms => weight * 1000.0,
    }
}

/// Convert an INR amount with the fixed exchange-rate table.
pub fn convert_inr(amount_inr: f64, currency: Currency) -> f64 {
    amount_inr / currency.inr_rate()
}

pub fn quote(
    price_per_gram: f64,
    weight: f64,
    unit: WeightUnit,
    currency: Currency,
) -> Result<Quote, AnalyticsError> {
    if !(price_per_gram.is_finite() && price_per_gram >= MIN_PRICE_PER_GRAM) {
        return Err(AnalyticsError::InvalidInput(format!(
            "price per gram must be >= {MIN_PRICE_PER_GRAM} (got {price_per_gram})"
        )));
    }
    if !(weight.is_finite() && weight >= 0.0) {
        return Err(AnalyticsError::InvalidInput(format!(
            "weight must be >= 0 (got {weight})"
        )));
    }

    let weight_grams = to_grams(weight, unit);
    let total_inr = price_per_gram * weight_grams;
    Ok(Quote {
        weight_grams,
        price_per_gram,
        total_inr,
        currency,
        converted: convert_inr(total_inr, currency),
    })
}

/// Reference costs for 1 g, 10 g, 100 g and 1 kg.
pub fn quick_reference(price_per_gram: f64) -> [(&'static str, f64); 4] {
    [
        ("1 gram", price_per_gram),
        ("10 grams", price_per_gram * 10.0),
        ("100 grams", price_per_gram * 100.0),
        ("1 kg", price_per_gram * 1000.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kilograms_convert_to_grams() {
        assert_eq!(to_grams(1.5, WeightUnit::Kilograms), 1500.0);
        assert_eq!(to_grams(10.0, WeightUnit::Grams), 10.0);
    }

    #[test]
    fn quote_totals_and_converts() {
        let q = quote(171.0, 1.0, WeightUnit::Kilograms, Currency::Usd).unwrap();
        assert_eq!(q.weight_grams, 1000.0);
        assert_eq!(q.total_inr, 171_000.0);
        assert!((q.converted - 2000.0).abs() < 1e-9);

        let q = quote(100.0, 10.0, WeightUnit::Grams, Currency::Aed).unwrap();
        assert!((q.converted - 1000.0 / 23.28).abs() < 1e-9);
    }

    #[test]
    fn quote_rejects_bad_inputs() {
        assert!(quote(0.5, 1.0, WeightUnit::Grams, Currency::Eur).is_err());
        assert!(quote(100.0, -1.0, WeightUnit::Grams, Currency::Eur).is_err());
        assert!(quote(f64::NAN, 1.0, WeightUnit::Grams, Currency::Eur).is_err());
        assert!(quote(100.0, 0.0, WeightUnit::Grams, Currency::Gbp).is_ok());
    }

    #[test]
    fn quick_reference_scales() {
        let refs = quick_reference(186.43);
        assert_eq!(refs[0].0, "1 gram");
        assert!((refs[3].1 - 186_430.0).abs() < 1e-6);
    }
}
