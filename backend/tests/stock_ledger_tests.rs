//! Harvest stock ledger tests
//!
//! Tests for the stock consistency rules applied on the sale paths:
//! - Remaining stock always equals harvested weight minus recorded sales
//! - A sale never takes the remaining stock below zero
//! - A harvest weight never drops below what was already sold
//! - Sale amounts are always recomputed from quantity and unit price

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::ledger;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Apply one sale against a harvest, the way the sale paths do: recompute
/// what was already sold, gate on availability, then derive the new stock.
fn try_sell(poids_total: Decimal, deja_vendu: Decimal, quantite: Decimal) -> Result<Decimal, &'static str> {
    let disponible = ledger::stock_restant(poids_total, deja_vendu);
    if quantite > disponible {
        return Err("insufficient stock");
    }
    Ok(ledger::stock_restant(poids_total, deja_vendu + quantite))
}

/// Apply a harvest weight change while sales exist against it.
fn try_reweigh(deja_vendu: Decimal, nouveau_poids: Decimal) -> Result<Decimal, &'static str> {
    if nouveau_poids < deja_vendu {
        return Err("weight below sold quantity");
    }
    Ok(ledger::stock_restant(nouveau_poids, deja_vendu))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Test a fresh harvest starts fully available
    #[test]
    fn test_new_harvest_fully_available() {
        let stock = ledger::stock_restant(dec("500.00"), Decimal::ZERO);
        assert_eq!(stock, dec("500.00"));
    }

    /// Test successive sales drain the stock down to zero
    #[test]
    fn test_successive_sales_drain_stock() {
        let poids = dec("500.00");

        let stock = try_sell(poids, Decimal::ZERO, dec("200.00")).unwrap();
        assert_eq!(stock, dec("300.00"));

        let stock = try_sell(poids, dec("200.00"), dec("300.00")).unwrap();
        assert_eq!(stock, Decimal::ZERO);

        // The harvest is exhausted, any further sale is rejected
        let result = try_sell(poids, dec("500.00"), dec("0.01"));
        assert_eq!(result, Err("insufficient stock"));
    }

    /// Test a sale exceeding the remaining stock is rejected
    #[test]
    fn test_sale_exceeding_stock_rejected() {
        let result = try_sell(dec("500.00"), dec("450.00"), dec("60.00"));
        assert_eq!(result, Err("insufficient stock"));
    }

    /// Test a sale of exactly the remaining stock is accepted
    #[test]
    fn test_sale_of_exact_remainder_accepted() {
        let stock = try_sell(dec("500.00"), dec("450.00"), dec("50.00")).unwrap();
        assert_eq!(stock, Decimal::ZERO);
    }

    /// Test lowering the harvest weight below the sold quantity is rejected
    #[test]
    fn test_reweigh_below_sold_rejected() {
        // 450 kg already sold, the weight cannot drop to 400 kg
        let result = try_reweigh(dec("450.00"), dec("400.00"));
        assert_eq!(result, Err("weight below sold quantity"));
    }

    /// Test raising the harvest weight releases more stock
    #[test]
    fn test_reweigh_upwards_releases_stock() {
        let stock = try_reweigh(dec("450.00"), dec("600.00")).unwrap();
        assert_eq!(stock, dec("150.00"));
    }

    /// Test lowering the weight to exactly the sold quantity leaves zero stock
    #[test]
    fn test_reweigh_to_exact_sold_quantity() {
        let stock = try_reweigh(dec("450.00"), dec("450.00")).unwrap();
        assert_eq!(stock, Decimal::ZERO);
    }

    /// Test deleting a sale returns its quantity to the stock
    #[test]
    fn test_deleting_sale_restores_stock() {
        let poids = dec("500.00");
        let deja_vendu = dec("200.00");
        assert_eq!(ledger::stock_restant(poids, deja_vendu), dec("300.00"));

        // Drop the 200 kg sale, the full weight becomes available again
        let apres_suppression = deja_vendu - dec("200.00");
        assert_eq!(ledger::stock_restant(poids, apres_suppression), dec("500.00"));
    }

    /// Test editing a sale settles against the stock without its own quantity
    #[test]
    fn test_editing_sale_excludes_own_quantity() {
        let poids = dec("500.00");
        // Two sales recorded: the edited one at 200 kg, another at 100 kg
        let autres_ventes = dec("100.00");

        // Growing the edited sale to 400 kg fits: 500 - 100 = 400 available
        let stock = try_sell(poids, autres_ventes, dec("400.00")).unwrap();
        assert_eq!(stock, Decimal::ZERO);

        // Growing it to 401 kg does not
        let result = try_sell(poids, autres_ventes, dec("401.00"));
        assert_eq!(result, Err("insufficient stock"));
    }

    /// Test a corrupted stored stock is detectable against the derived value
    #[test]
    fn test_stored_stock_drift_detected() {
        let poids = dec("500.00");
        let deja_vendu = dec("200.00");
        let derived = ledger::stock_restant(poids, deja_vendu);

        let stored = dec("320.00");
        assert_ne!(stored, derived);
    }

    /// Test sale amounts are recomputed, never taken from the caller
    #[test]
    fn test_montant_recomputed_from_parts() {
        let montant = ledger::montant_total(dec("150.50"), dec("3.00"));
        assert_eq!(montant, dec("451.50"));

        // Whatever total a client sends is irrelevant to this computation
        let claimed = dec("1.00");
        assert_ne!(montant, claimed);
    }

    /// Test amount rounding at two decimal places
    #[test]
    fn test_montant_rounding() {
        assert_eq!(ledger::montant_total(dec("3.333"), dec("3.00")), dec("10.00"));
        assert_eq!(ledger::montant_total(dec("0.10"), dec("0.15")), dec("0.02"));
    }

    /// Test the low-stock alert threshold comparison
    #[test]
    fn test_alert_threshold() {
        let seuil = dec("20");

        // 19% remaining triggers the alert
        let pourcentage = ledger::pourcentage_stock(dec("95.00"), dec("500.00"));
        assert_eq!(pourcentage, dec("19.00"));
        assert!(pourcentage < seuil);

        // 20% remaining does not
        let pourcentage = ledger::pourcentage_stock(dec("100.00"), dec("500.00"));
        assert!(!(pourcentage < seuil));
    }

    /// Test stock percentage of a weightless harvest is zero rather than a division error
    #[test]
    fn test_percentage_of_zero_weight_harvest() {
        assert_eq!(ledger::pourcentage_stock(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    /// Test per-tree yield
    #[test]
    fn test_yield_per_tree() {
        assert_eq!(ledger::rendement_par_arbre(dec("500.00"), 100), dec("5.00"));
        assert_eq!(ledger::rendement_par_arbre(dec("500.00"), 0), Decimal::ZERO);
    }

    /// Test average price per kilogram
    #[test]
    fn test_average_price_per_kg() {
        assert_eq!(ledger::prix_moyen_kg(dec("451.50"), dec("150.50")), dec("3.00"));
        assert_eq!(ledger::prix_moyen_kg(dec("100.00"), Decimal::ZERO), Decimal::ZERO);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for harvest weights (1.0 to 10000.0 kg)
    fn weight_strategy() -> impl Strategy<Value = Decimal> {
        (10i64..=100000i64).prop_map(|n| Decimal::new(n, 1))
    }

    /// Strategy for sale quantities (0.1 to 1000.0 kg)
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 1))
    }

    /// Strategy for unit prices (0.01 to 1000.00)
    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Stock conservation: after any accepted sequence of sales the
        /// remaining stock equals the weight minus the accepted quantities
        #[test]
        fn prop_stock_conservation(
            poids in weight_strategy(),
            quantites in prop::collection::vec(quantity_strategy(), 0..20)
        ) {
            let mut deja_vendu = Decimal::ZERO;

            for quantite in &quantites {
                if let Ok(stock) = try_sell(poids, deja_vendu, *quantite) {
                    deja_vendu += quantite;
                    prop_assert_eq!(stock, poids - deja_vendu);
                }
            }

            let stock_final = ledger::stock_restant(poids, deja_vendu);
            prop_assert_eq!(stock_final, poids - deja_vendu);
            prop_assert!(stock_final >= Decimal::ZERO);
        }

        /// A rejected sale leaves the ledger untouched
        #[test]
        fn prop_rejected_sale_changes_nothing(
            poids in weight_strategy(),
            deja_vendu in quantity_strategy()
        ) {
            prop_assume!(deja_vendu <= poids);

            let disponible = ledger::stock_restant(poids, deja_vendu);
            let trop = disponible + dec("0.01");

            prop_assert!(try_sell(poids, deja_vendu, trop).is_err());
            // Already-sold total is only advanced on acceptance
            prop_assert_eq!(ledger::stock_restant(poids, deja_vendu), disponible);
        }

        /// The weight floor mirrors the availability gate: a reweigh is
        /// accepted exactly when it keeps the derived stock non-negative
        #[test]
        fn prop_reweigh_floor(
            deja_vendu in quantity_strategy(),
            nouveau_poids in weight_strategy()
        ) {
            match try_reweigh(deja_vendu, nouveau_poids) {
                Ok(stock) => {
                    prop_assert!(nouveau_poids >= deja_vendu);
                    prop_assert_eq!(stock, nouveau_poids - deja_vendu);
                    prop_assert!(stock >= Decimal::ZERO);
                }
                Err(_) => prop_assert!(nouveau_poids < deja_vendu),
            }
        }

        /// Sale amounts are always quantity times unit price at 2 decimals
        #[test]
        fn prop_montant_recompute(
            quantite in quantity_strategy(),
            prix in price_strategy()
        ) {
            let montant = ledger::montant_total(quantite, prix);
            prop_assert_eq!(montant, (quantite * prix).round_dp(2));
            prop_assert!(montant >= Decimal::ZERO);
        }

        /// Stock percentage stays within 0..=100 for a consistent ledger
        #[test]
        fn prop_percentage_bounded(
            poids in weight_strategy(),
            deja_vendu in quantity_strategy()
        ) {
            prop_assume!(deja_vendu <= poids);

            let stock = ledger::stock_restant(poids, deja_vendu);
            let pourcentage = ledger::pourcentage_stock(stock, poids);

            prop_assert!(pourcentage >= Decimal::ZERO);
            prop_assert!(pourcentage <= Decimal::from(100));
        }
    }
}
