//! Validation rules for plantation, harvest, sale and cash records
//!
//! Pure field-level checks shared by every write path of the backend.

use chrono::NaiveDate;
use rust_decimal::Decimal;

// ============================================================================
// Plantation validations
// ============================================================================

/// Validate cultivated area in hectares (strictly positive)
pub fn validate_superficie(superficie: Decimal) -> Result<(), &'static str> {
    if superficie <= Decimal::ZERO {
        return Err("Area must be greater than zero");
    }
    Ok(())
}

/// Validate tree count (zero allowed for a plot not yet planted)
pub fn validate_nombre_arbres(nombre_arbres: i32) -> Result<(), &'static str> {
    if nombre_arbres < 0 {
        return Err("Tree count cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Operation and harvest validations
// ============================================================================

/// Validate operation cost (zero allowed for unpaid work)
pub fn validate_cout(cout: Decimal) -> Result<(), &'static str> {
    if cout < Decimal::ZERO {
        return Err("Cost cannot be negative");
    }
    Ok(())
}

/// Validate harvested bunch count
pub fn validate_quantite_regimes(quantite: i32) -> Result<(), &'static str> {
    if quantite < 0 {
        return Err("Bunch count cannot be negative");
    }
    Ok(())
}

/// Validate harvested weight in kilograms
pub fn validate_poids_total(poids_total: Decimal) -> Result<(), &'static str> {
    if poids_total < Decimal::ZERO {
        return Err("Harvested weight cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Sale and cash validations
// ============================================================================

/// Validate sold quantity in kilograms (strictly positive)
pub fn validate_quantite_vente(quantite: Decimal) -> Result<(), &'static str> {
    if quantite <= Decimal::ZERO {
        return Err("Sold quantity must be greater than zero");
    }
    Ok(())
}

/// Validate unit price (strictly positive)
pub fn validate_prix_unitaire(prix_unitaire: Decimal) -> Result<(), &'static str> {
    if prix_unitaire <= Decimal::ZERO {
        return Err("Unit price must be greater than zero");
    }
    Ok(())
}

/// Validate cash movement amount (strictly positive; direction carries the sign)
pub fn validate_montant(montant: Decimal) -> Result<(), &'static str> {
    if montant <= Decimal::ZERO {
        return Err("Amount must be greater than zero");
    }
    Ok(())
}

// ============================================================================
// Date validations
// ============================================================================

/// Validate that a recorded date is not in the future relative to `today`
pub fn validate_date_not_future(date: NaiveDate, today: NaiveDate) -> Result<(), &'static str> {
    if date > today {
        return Err("Date cannot be in the future");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    // ========================================================================
    // Plantation validation tests
    // ========================================================================

    #[test]
    fn test_validate_superficie_valid() {
        assert!(validate_superficie(dec("0.01")).is_ok());
        assert!(validate_superficie(dec("150.5")).is_ok());
    }

    #[test]
    fn test_validate_superficie_invalid() {
        assert!(validate_superficie(Decimal::ZERO).is_err());
        assert!(validate_superficie(dec("-1")).is_err());
    }

    #[test]
    fn test_validate_nombre_arbres() {
        assert!(validate_nombre_arbres(0).is_ok());
        assert!(validate_nombre_arbres(1200).is_ok());
        assert!(validate_nombre_arbres(-1).is_err());
    }

    // ========================================================================
    // Operation and harvest validation tests
    // ========================================================================

    #[test]
    fn test_validate_cout() {
        assert!(validate_cout(Decimal::ZERO).is_ok());
        assert!(validate_cout(dec("25000")).is_ok());
        assert!(validate_cout(dec("-0.01")).is_err());
    }

    #[test]
    fn test_validate_quantite_regimes() {
        assert!(validate_quantite_regimes(0).is_ok());
        assert!(validate_quantite_regimes(85).is_ok());
        assert!(validate_quantite_regimes(-5).is_err());
    }

    #[test]
    fn test_validate_poids_total() {
        assert!(validate_poids_total(Decimal::ZERO).is_ok());
        assert!(validate_poids_total(dec("1250.75")).is_ok());
        assert!(validate_poids_total(dec("-10")).is_err());
    }

    // ========================================================================
    // Sale and cash validation tests
    // ========================================================================

    #[test]
    fn test_validate_quantite_vente() {
        assert!(validate_quantite_vente(dec("0.5")).is_ok());
        assert!(validate_quantite_vente(Decimal::ZERO).is_err());
        assert!(validate_quantite_vente(dec("-3")).is_err());
    }

    #[test]
    fn test_validate_prix_unitaire() {
        assert!(validate_prix_unitaire(dec("2.50")).is_ok());
        assert!(validate_prix_unitaire(Decimal::ZERO).is_err());
        assert!(validate_prix_unitaire(dec("-2.50")).is_err());
    }

    #[test]
    fn test_validate_montant() {
        assert!(validate_montant(dec("100")).is_ok());
        assert!(validate_montant(Decimal::ZERO).is_err());
        assert!(validate_montant(dec("-100")).is_err());
    }

    // ========================================================================
    // Date validation tests
    // ========================================================================

    #[test]
    fn test_validate_date_not_future() {
        let today = date("2024-06-15");
        assert!(validate_date_not_future(date("2024-06-14"), today).is_ok());
        assert!(validate_date_not_future(today, today).is_ok());
        assert!(validate_date_not_future(date("2024-06-16"), today).is_err());
    }

    mod property_tests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn prop_positive_superficie_accepted(n in 1i64..=10_000_000i64) {
                prop_assert!(validate_superficie(Decimal::new(n, 2)).is_ok());
            }

            #[test]
            fn prop_non_positive_quantite_vente_rejected(n in -10_000_000i64..=0i64) {
                prop_assert!(validate_quantite_vente(Decimal::new(n, 2)).is_err());
            }

            #[test]
            fn prop_non_negative_cout_accepted(n in 0i64..=10_000_000i64) {
                prop_assert!(validate_cout(Decimal::new(n, 2)).is_ok());
            }
        }
    }
}
