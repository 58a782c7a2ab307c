//! Reporting service for cross-entity analytics and data export
//! Provides the dashboard snapshot and CSV exports for sales and cash movements

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::AppResult;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Dashboard metrics
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub nombre_plantations: i64,
    pub nombre_arbres: i64,
    pub nombre_productions: i64,
    pub total_poids: Decimal,
    pub stock_total_disponible: Decimal,
    pub chiffre_affaires_total: Decimal,
    pub total_cout_operations: Decimal,
    pub solde_caisse: Decimal,
}

/// Sale export row
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct VenteExportRow {
    pub id: i64,
    pub date_vente: NaiveDate,
    pub client: String,
    pub plantation: String,
    pub quantite: Decimal,
    pub prix_unitaire: Decimal,
    pub montant_total: Decimal,
}

/// Cash movement export row
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct MouvementExportRow {
    pub id: i64,
    pub date: NaiveDate,
    pub type_mouvement: String,
    pub montant: Decimal,
    pub description: String,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get dashboard metrics
    pub async fn get_dashboard_metrics(&self) -> AppResult<DashboardMetrics> {
        // Plantation headcounts
        let plantation_counts: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(nombre_arbres), 0)
            FROM plantations
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        // Harvest volumes and remaining stock
        let production_totals: (i64, Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(poids_total), 0), COALESCE(SUM(stock_disponible), 0)
            FROM productions
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        // Revenue to date
        let chiffre_affaires_total: Decimal =
            sqlx::query_scalar("SELECT COALESCE(SUM(montant_total), 0) FROM ventes")
                .fetch_one(&self.db)
                .await?;

        // Field operation spend
        let total_cout_operations: Decimal =
            sqlx::query_scalar("SELECT COALESCE(SUM(cout), 0) FROM operations")
                .fetch_one(&self.db)
                .await?;

        // Net cash position
        let solde_caisse: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(montant) FILTER (WHERE type_mouvement = 'ENTREE'), 0)
                 - COALESCE(SUM(montant) FILTER (WHERE type_mouvement = 'SORTIE'), 0)
            FROM mouvements_caisse
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        Ok(DashboardMetrics {
            nombre_plantations: plantation_counts.0,
            nombre_arbres: plantation_counts.1,
            nombre_productions: production_totals.0,
            total_poids: production_totals.1,
            stock_total_disponible: production_totals.2,
            chiffre_affaires_total,
            total_cout_operations,
            solde_caisse,
        })
    }

    /// Export all sales as CSV, most recent first
    pub async fn export_ventes_csv(&self) -> AppResult<String> {
        let rows = sqlx::query_as::<_, VenteExportRow>(
            r#"
            SELECT v.id, v.date_vente, v.client, p.nom AS plantation,
                   v.quantite, v.prix_unitaire, v.montant_total
            FROM ventes v
            JOIN productions pr ON pr.id = v.production
            JOIN plantations p ON p.id = pr.plantation
            ORDER BY v.date_vente DESC, v.id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Self::export_to_csv(&rows)
    }

    /// Export all cash movements as CSV, most recent first
    pub async fn export_mouvements_csv(&self) -> AppResult<String> {
        let rows = sqlx::query_as::<_, MouvementExportRow>(
            r#"
            SELECT id, date, type_mouvement, montant, description
            FROM mouvements_caisse
            ORDER BY date DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Self::export_to_csv(&rows)
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record).map_err(|e| {
                crate::error::AppError::Internal(format!("CSV serialization error: {}", e))
            })?;
        }
        let csv_data = String::from_utf8(wtr.into_inner().map_err(|e| {
            crate::error::AppError::Internal(format!("CSV writer error: {}", e))
        })?)
        .map_err(|e| crate::error::AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_export_to_csv_headers_and_rows() {
        let rows = vec![
            MouvementExportRow {
                id: 1,
                date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
                type_mouvement: "ENTREE".to_string(),
                montant: Decimal::from_str("1500.00").unwrap(),
                description: "Vente de régimes".to_string(),
            },
            MouvementExportRow {
                id: 2,
                date: NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
                type_mouvement: "SORTIE".to_string(),
                montant: Decimal::from_str("300.50").unwrap(),
                description: "Achat d'engrais".to_string(),
            },
        ];

        let csv = ReportingService::export_to_csv(&rows).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "id,date,type_mouvement,montant,description"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,2024-03-10,ENTREE,1500.00,Vente de régimes"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2,2024-03-11,SORTIE,300.50,Achat d'engrais"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_export_to_csv_empty() {
        let rows: Vec<MouvementExportRow> = vec![];
        let csv = ReportingService::export_to_csv(&rows).unwrap();
        assert!(csv.is_empty());
    }
}
