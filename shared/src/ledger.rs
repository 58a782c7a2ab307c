//! Stock and cash ledger arithmetic
//!
//! Every derived figure exposed by the API (sale totals, remaining stock,
//! yields, cash series) is computed here from source records, so the same
//! rules apply in request handling, recomputation checks and tests.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::TypeMouvement;

// ============================================================================
// Stock and sales
// ============================================================================

/// Total amount of a sale, rounded to 2 decimal places.
///
/// This is the only way a sale amount is ever produced; amounts supplied by
/// clients are discarded and recomputed from quantity and unit price.
pub fn montant_total(quantite: Decimal, prix_unitaire: Decimal) -> Decimal {
    (quantite * prix_unitaire).round_dp(2)
}

/// Remaining stock of a harvest given the total quantity already sold.
///
/// Callers gate on availability before persisting; the subtraction itself
/// is unchecked so recomputation can surface a corrupted ledger.
pub fn stock_restant(poids_total: Decimal, total_vendu: Decimal) -> Decimal {
    poids_total - total_vendu
}

/// Remaining stock as a percentage of the harvested weight.
pub fn pourcentage_stock(stock_disponible: Decimal, poids_total: Decimal) -> Decimal {
    if poids_total <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (stock_disponible / poids_total * Decimal::from(100)).round_dp(2)
}

/// Average price per kilogram of a sale.
pub fn prix_moyen_kg(montant_total: Decimal, quantite: Decimal) -> Decimal {
    if quantite <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (montant_total / quantite).round_dp(2)
}

/// Harvested weight per tree for a plantation.
pub fn rendement_par_arbre(poids_total: Decimal, nombre_arbres: i32) -> Decimal {
    if nombre_arbres <= 0 {
        return Decimal::ZERO;
    }
    (poids_total / Decimal::from(nombre_arbres)).round_dp(2)
}

/// Average harvested weight across a plantation's recorded harvests.
pub fn rendement_moyen(total_poids: Decimal, nombre_productions: i64) -> Decimal {
    if nombre_productions <= 0 {
        return Decimal::ZERO;
    }
    (total_poids / Decimal::from(nombre_productions)).round_dp(2)
}

// ============================================================================
// Cash ledger
// ============================================================================

/// Cash balance derived from movement totals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BilanCaisse {
    pub total_entrees: Decimal,
    pub total_sorties: Decimal,
    pub solde: Decimal,
}

impl BilanCaisse {
    /// The balance is always inflows minus outflows and may be negative.
    pub fn new(total_entrees: Decimal, total_sorties: Decimal) -> Self {
        Self {
            total_entrees,
            total_sorties,
            solde: total_entrees - total_sorties,
        }
    }
}

/// One cash movement, as fed into the chart series
#[derive(Debug, Clone, PartialEq)]
pub struct PointCaisse {
    pub date: NaiveDate,
    pub type_mouvement: TypeMouvement,
    pub montant: Decimal,
}

/// Chart-ready cash series: two parallel vectors aligned on dates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerieCaisse {
    pub dates: Vec<NaiveDate>,
    pub entrees: Vec<Decimal>,
    pub sorties: Vec<Decimal>,
}

/// Build the chart series from movements ordered by ascending date.
///
/// Each movement contributes its amount to the vector matching its kind and
/// a zero to the other, so both series stay aligned with `dates`.
pub fn serie_caisse(points: &[PointCaisse]) -> SerieCaisse {
    let mut serie = SerieCaisse {
        dates: Vec::with_capacity(points.len()),
        entrees: Vec::with_capacity(points.len()),
        sorties: Vec::with_capacity(points.len()),
    };
    for point in points {
        serie.dates.push(point.date);
        match point.type_mouvement {
            TypeMouvement::Entree => {
                serie.entrees.push(point.montant);
                serie.sorties.push(Decimal::ZERO);
            }
            TypeMouvement::Sortie => {
                serie.entrees.push(Decimal::ZERO);
                serie.sorties.push(point.montant);
            }
        }
    }
    serie
}
