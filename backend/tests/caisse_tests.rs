//! Cash book tests
//!
//! Tests for the cash balance and the chart series:
//! - The balance nets total entries against total exits
//! - The balance is independent of movement order
//! - The series zero-fills the opposite column so both stay date-aligned

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{ledger, BilanCaisse, PointCaisse, TypeMouvement};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// Helper to create a date from string
fn date(s: &str) -> NaiveDate {
    NaiveDate::from_str(s).unwrap()
}

fn point(d: &str, kind: TypeMouvement, montant: &str) -> PointCaisse {
    PointCaisse {
        date: date(d),
        type_mouvement: kind,
        montant: dec(montant),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Test the balance nets entries against exits
    #[test]
    fn test_bilan_nets_entries_against_exits() {
        // Two entries of 1000 and 500, one exit of 300
        let bilan = BilanCaisse::new(dec("1500.00"), dec("300.00"));

        assert_eq!(bilan.total_entrees, dec("1500.00"));
        assert_eq!(bilan.total_sorties, dec("300.00"));
        assert_eq!(bilan.solde, dec("1200.00"));
    }

    /// Test an empty ledger balances to zero
    #[test]
    fn test_bilan_empty_ledger() {
        let bilan = BilanCaisse::new(Decimal::ZERO, Decimal::ZERO);
        assert_eq!(bilan.solde, Decimal::ZERO);
    }

    /// Test the balance goes negative when exits exceed entries
    #[test]
    fn test_bilan_negative_when_overspent() {
        let bilan = BilanCaisse::new(dec("200.00"), dec("350.75"));
        assert_eq!(bilan.solde, dec("-150.75"));
    }

    /// Test the series zero-fills the opposite column per movement
    #[test]
    fn test_serie_zero_fills_opposite_column() {
        let points = vec![
            point("2024-03-01", TypeMouvement::Entree, "1000"),
            point("2024-03-05", TypeMouvement::Sortie, "250"),
            point("2024-03-09", TypeMouvement::Entree, "400"),
        ];

        let serie = ledger::serie_caisse(&points);

        assert_eq!(
            serie.dates,
            vec![date("2024-03-01"), date("2024-03-05"), date("2024-03-09")]
        );
        assert_eq!(serie.entrees, vec![dec("1000"), Decimal::ZERO, dec("400")]);
        assert_eq!(serie.sorties, vec![Decimal::ZERO, dec("250"), Decimal::ZERO]);
    }

    /// Test same-day movements each keep their own position
    #[test]
    fn test_serie_same_day_movements() {
        let points = vec![
            point("2024-03-01", TypeMouvement::Entree, "100"),
            point("2024-03-01", TypeMouvement::Sortie, "40"),
        ];

        let serie = ledger::serie_caisse(&points);

        assert_eq!(serie.dates.len(), 2);
        assert_eq!(serie.entrees, vec![dec("100"), Decimal::ZERO]);
        assert_eq!(serie.sorties, vec![Decimal::ZERO, dec("40")]);
    }

    /// Test an empty series stays empty on all three vectors
    #[test]
    fn test_serie_empty() {
        let serie = ledger::serie_caisse(&[]);
        assert!(serie.dates.is_empty());
        assert!(serie.entrees.is_empty());
        assert!(serie.sorties.is_empty());
    }

    /// Test series totals reconcile with the balance over the same movements
    #[test]
    fn test_serie_reconciles_with_bilan() {
        let points = vec![
            point("2024-03-01", TypeMouvement::Entree, "1000"),
            point("2024-03-02", TypeMouvement::Entree, "500"),
            point("2024-03-03", TypeMouvement::Sortie, "300"),
        ];

        let serie = ledger::serie_caisse(&points);
        let total_entrees: Decimal = serie.entrees.iter().sum();
        let total_sorties: Decimal = serie.sorties.iter().sum();

        let bilan = BilanCaisse::new(total_entrees, total_sorties);
        assert_eq!(bilan.solde, dec("1200"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for movement amounts (0.01 to 10000.00)
    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=1000000i64).prop_map(|n| Decimal::new(n, 2))
    }

    /// Strategy for movement kinds
    fn kind_strategy() -> impl Strategy<Value = TypeMouvement> {
        prop_oneof![Just(TypeMouvement::Entree), Just(TypeMouvement::Sortie)]
    }

    /// Strategy for a list of movements on arbitrary days of one month
    fn movements_strategy() -> impl Strategy<Value = Vec<PointCaisse>> {
        prop::collection::vec((1u32..=28u32, kind_strategy(), amount_strategy()), 0..30).prop_map(
            |entries| {
                entries
                    .into_iter()
                    .map(|(day, kind, montant)| PointCaisse {
                        date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
                        type_mouvement: kind,
                        montant,
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The balance is exactly the entry total minus the exit total
        #[test]
        fn prop_bilan_is_entries_minus_exits(movements in movements_strategy()) {
            let total_entrees: Decimal = movements
                .iter()
                .filter(|m| m.type_mouvement == TypeMouvement::Entree)
                .map(|m| m.montant)
                .sum();
            let total_sorties: Decimal = movements
                .iter()
                .filter(|m| m.type_mouvement == TypeMouvement::Sortie)
                .map(|m| m.montant)
                .sum();

            let bilan = BilanCaisse::new(total_entrees, total_sorties);
            prop_assert_eq!(bilan.solde, total_entrees - total_sorties);
        }

        /// The balance does not depend on the order movements are summed in
        #[test]
        fn prop_bilan_order_independent(movements in movements_strategy()) {
            let solde_forward: Decimal = movements.iter().fold(Decimal::ZERO, |acc, m| {
                match m.type_mouvement {
                    TypeMouvement::Entree => acc + m.montant,
                    TypeMouvement::Sortie => acc - m.montant,
                }
            });
            let solde_backward: Decimal = movements.iter().rev().fold(Decimal::ZERO, |acc, m| {
                match m.type_mouvement {
                    TypeMouvement::Entree => acc + m.montant,
                    TypeMouvement::Sortie => acc - m.montant,
                }
            });

            prop_assert_eq!(solde_forward, solde_backward);
        }

        /// All three series vectors always have the same length
        #[test]
        fn prop_serie_vectors_aligned(movements in movements_strategy()) {
            let serie = ledger::serie_caisse(&movements);

            prop_assert_eq!(serie.dates.len(), movements.len());
            prop_assert_eq!(serie.entrees.len(), movements.len());
            prop_assert_eq!(serie.sorties.len(), movements.len());
        }

        /// Series column totals match the movement totals by kind
        #[test]
        fn prop_serie_totals_match_movements(movements in movements_strategy()) {
            let serie = ledger::serie_caisse(&movements);

            let entrees_series: Decimal = serie.entrees.iter().sum();
            let entrees_movements: Decimal = movements
                .iter()
                .filter(|m| m.type_mouvement == TypeMouvement::Entree)
                .map(|m| m.montant)
                .sum();
            prop_assert_eq!(entrees_series, entrees_movements);

            let sorties_series: Decimal = serie.sorties.iter().sum();
            let sorties_movements: Decimal = movements
                .iter()
                .filter(|m| m.type_mouvement == TypeMouvement::Sortie)
                .map(|m| m.montant)
                .sum();
            prop_assert_eq!(sorties_series, sorties_movements);
        }

        /// Each series position carries at most one non-zero column
        #[test]
        fn prop_serie_one_sided_points(movements in movements_strategy()) {
            let serie = ledger::serie_caisse(&movements);

            for i in 0..serie.dates.len() {
                let entree_nonzero = serie.entrees[i] != Decimal::ZERO;
                let sortie_nonzero = serie.sorties[i] != Decimal::ZERO;
                prop_assert!(!(entree_nonzero && sortie_nonzero));
            }
        }
    }
}
