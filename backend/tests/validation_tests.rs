//! Input validation boundary tests
//!
//! Tests the field rules enforced before any record is persisted:
//! - Surfaces, quantities and prices respect their sign constraints
//! - Recorded dates never sit in the future

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::validation;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// Helper to create a date from string
fn date(s: &str) -> NaiveDate {
    NaiveDate::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Test surface must be strictly positive
    #[test]
    fn test_superficie_boundaries() {
        assert!(validation::validate_superficie(dec("0.01")).is_ok());
        assert!(validation::validate_superficie(Decimal::ZERO).is_err());
        assert!(validation::validate_superficie(dec("-3.5")).is_err());
    }

    /// Test tree count may be zero but never negative
    #[test]
    fn test_nombre_arbres_boundaries() {
        assert!(validation::validate_nombre_arbres(0).is_ok());
        assert!(validation::validate_nombre_arbres(1200).is_ok());
        assert!(validation::validate_nombre_arbres(-1).is_err());
    }

    /// Test operation cost may be zero but never negative
    #[test]
    fn test_cout_boundaries() {
        assert!(validation::validate_cout(Decimal::ZERO).is_ok());
        assert!(validation::validate_cout(dec("2500.00")).is_ok());
        assert!(validation::validate_cout(dec("-0.01")).is_err());
    }

    /// Test harvested weight may be zero but never negative
    #[test]
    fn test_poids_total_boundaries() {
        assert!(validation::validate_poids_total(Decimal::ZERO).is_ok());
        assert!(validation::validate_poids_total(dec("480.25")).is_ok());
        assert!(validation::validate_poids_total(dec("-480.25")).is_err());
    }

    /// Test bunch count may be zero but never negative
    #[test]
    fn test_quantite_regimes_boundaries() {
        assert!(validation::validate_quantite_regimes(0).is_ok());
        assert!(validation::validate_quantite_regimes(-5).is_err());
    }

    /// Test sold quantity must be strictly positive
    #[test]
    fn test_quantite_vente_boundaries() {
        assert!(validation::validate_quantite_vente(dec("0.01")).is_ok());
        assert!(validation::validate_quantite_vente(Decimal::ZERO).is_err());
        assert!(validation::validate_quantite_vente(dec("-10")).is_err());
    }

    /// Test unit price must be strictly positive
    #[test]
    fn test_prix_unitaire_boundaries() {
        assert!(validation::validate_prix_unitaire(dec("0.01")).is_ok());
        assert!(validation::validate_prix_unitaire(Decimal::ZERO).is_err());
    }

    /// Test cash movement amount must be strictly positive
    #[test]
    fn test_montant_boundaries() {
        assert!(validation::validate_montant(dec("0.01")).is_ok());
        assert!(validation::validate_montant(Decimal::ZERO).is_err());
        assert!(validation::validate_montant(dec("-100")).is_err());
    }

    /// Test a record dated today is accepted
    #[test]
    fn test_date_today_accepted() {
        let today = date("2024-03-15");
        assert!(validation::validate_date_not_future(today, today).is_ok());
    }

    /// Test a record dated in the past is accepted
    #[test]
    fn test_date_past_accepted() {
        let today = date("2024-03-15");
        assert!(validation::validate_date_not_future(date("2020-01-01"), today).is_ok());
    }

    /// Test a record dated tomorrow is rejected
    #[test]
    fn test_date_tomorrow_rejected() {
        let today = date("2024-03-15");
        assert!(validation::validate_date_not_future(date("2024-03-16"), today).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for strictly positive decimals
    fn positive_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000000i64).prop_map(|n| Decimal::new(n, 2))
    }

    /// Strategy for strictly negative decimals
    fn negative_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000000i64).prop_map(|n| -Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any strictly positive surface passes, any negative one fails
        #[test]
        fn prop_superficie_sign(positive in positive_strategy(), negative in negative_strategy()) {
            prop_assert!(validation::validate_superficie(positive).is_ok());
            prop_assert!(validation::validate_superficie(negative).is_err());
        }

        /// Zero-or-positive rules accept zero and reject any negative value
        #[test]
        fn prop_zero_tolerant_rules(negative in negative_strategy()) {
            prop_assert!(validation::validate_cout(Decimal::ZERO).is_ok());
            prop_assert!(validation::validate_poids_total(Decimal::ZERO).is_ok());

            prop_assert!(validation::validate_cout(negative).is_err());
            prop_assert!(validation::validate_poids_total(negative).is_err());
        }

        /// Strictly positive rules reject zero and any negative value
        #[test]
        fn prop_strictly_positive_rules(negative in negative_strategy()) {
            prop_assert!(validation::validate_quantite_vente(Decimal::ZERO).is_err());
            prop_assert!(validation::validate_prix_unitaire(Decimal::ZERO).is_err());
            prop_assert!(validation::validate_montant(Decimal::ZERO).is_err());

            prop_assert!(validation::validate_quantite_vente(negative).is_err());
            prop_assert!(validation::validate_prix_unitaire(negative).is_err());
            prop_assert!(validation::validate_montant(negative).is_err());
        }

        /// A date is rejected exactly when it falls after the reference day
        #[test]
        fn prop_date_future_rule(offset in -3650i64..=3650i64) {
            let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
            let candidate = today + chrono::Duration::days(offset);

            let result = validation::validate_date_not_future(candidate, today);
            if offset > 0 {
                prop_assert!(result.is_err());
            } else {
                prop_assert!(result.is_ok());
            }
        }
    }
}
