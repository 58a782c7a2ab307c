//! Harvest batch service
//!
//! Each production row carries a derived `stock_disponible` kept consistent
//! with the sales history. Weight changes re-derive it inside a transaction
//! holding the production row lock, so they serialize with sale mutations.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use shared::{ledger, validation, Qualite};

use crate::error::{AppError, AppResult};

/// Production service for managing harvest batches
#[derive(Clone)]
pub struct ProductionService {
    db: PgPool,
}

/// Harvest batch record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Production {
    pub id: i64,
    pub plantation: i64,
    pub date_recolte: NaiveDate,
    pub quantite: i32,
    pub poids_total: Decimal,
    pub stock_disponible: Decimal,
    pub qualite: String,
}

/// Production with its plantation name and derived figures
#[derive(Debug, Clone, Serialize)]
pub struct ProductionWithDetails {
    #[serde(flatten)]
    pub production: Production,
    pub plantation_nom: String,
    pub qualite_display: String,
    pub pourcentage_stock: Decimal,
    pub rendement_par_arbre: Decimal,
}

/// Row for the joined list/detail query
#[derive(Debug, FromRow)]
struct ProductionDetailsRow {
    id: i64,
    plantation: i64,
    date_recolte: NaiveDate,
    quantite: i32,
    poids_total: Decimal,
    stock_disponible: Decimal,
    qualite: String,
    plantation_nom: String,
    nombre_arbres: i32,
}

impl From<ProductionDetailsRow> for ProductionWithDetails {
    fn from(row: ProductionDetailsRow) -> Self {
        let qualite_display = Qualite::from_str(&row.qualite)
            .map(|q| q.label().to_string())
            .unwrap_or_else(|| row.qualite.clone());
        let pourcentage_stock = ledger::pourcentage_stock(row.stock_disponible, row.poids_total);
        let rendement_par_arbre = ledger::rendement_par_arbre(row.poids_total, row.nombre_arbres);
        ProductionWithDetails {
            production: Production {
                id: row.id,
                plantation: row.plantation,
                date_recolte: row.date_recolte,
                quantite: row.quantite,
                poids_total: row.poids_total,
                stock_disponible: row.stock_disponible,
                qualite: row.qualite,
            },
            plantation_nom: row.plantation_nom,
            qualite_display,
            pourcentage_stock,
            rendement_par_arbre,
        }
    }
}

/// Input for creating a production
#[derive(Debug, Deserialize)]
pub struct CreateProductionInput {
    pub plantation: i64,
    pub date_recolte: NaiveDate,
    pub quantite: i32,
    pub poids_total: Decimal,
    pub qualite: Qualite,
}

/// Input for updating a production
#[derive(Debug, Deserialize)]
pub struct UpdateProductionInput {
    pub plantation: Option<i64>,
    pub date_recolte: Option<NaiveDate>,
    pub quantite: Option<i32>,
    pub poids_total: Option<Decimal>,
    pub qualite: Option<Qualite>,
}

/// Optional list filters
#[derive(Debug, Deserialize)]
pub struct ProductionFilter {
    pub plantation: Option<i64>,
    pub qualite: Option<Qualite>,
}

/// Production counts by quality grade
#[derive(Debug, Clone, Serialize)]
pub struct RepartitionQualite {
    #[serde(rename = "A")]
    pub a: i64,
    #[serde(rename = "B")]
    pub b: i64,
    #[serde(rename = "C")]
    pub c: i64,
    #[serde(rename = "D")]
    pub d: i64,
}

/// Remaining stock by quality grade
#[derive(Debug, Clone, Serialize)]
pub struct StockParQualite {
    #[serde(rename = "A")]
    pub a: Decimal,
    #[serde(rename = "B")]
    pub b: Decimal,
    #[serde(rename = "C")]
    pub c: Decimal,
    #[serde(rename = "D")]
    pub d: Decimal,
}

/// Global harvest statistics
#[derive(Debug, Serialize)]
pub struct ProductionStatistics {
    pub total_poids: Decimal,
    pub total_regimes: i64,
    pub stock_total_disponible: Decimal,
    pub moyenne_par_recolte: Decimal,
    pub repartition_qualite: RepartitionQualite,
    pub stock_par_qualite: StockParQualite,
}

/// A harvest batch whose remaining stock fell under the alert threshold
#[derive(Debug, Serialize)]
pub struct AlerteStock {
    pub production_id: i64,
    pub plantation_nom: String,
    pub date_recolte: NaiveDate,
    pub qualite: String,
    pub stock_disponible: Decimal,
    pub poids_total: Decimal,
    pub pourcentage: Decimal,
}

/// Row for the stock alert query
#[derive(Debug, FromRow)]
struct AlerteStockRow {
    production_id: i64,
    plantation_nom: String,
    date_recolte: NaiveDate,
    qualite: String,
    stock_disponible: Decimal,
    poids_total: Decimal,
}

impl ProductionService {
    /// Create a new ProductionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get productions, most recent harvest first, optionally filtered
    pub async fn get_productions(
        &self,
        filter: ProductionFilter,
    ) -> AppResult<Vec<ProductionWithDetails>> {
        let rows = sqlx::query_as::<_, ProductionDetailsRow>(
            r#"
            SELECT pr.id, pr.plantation, pr.date_recolte, pr.quantite, pr.poids_total,
                   pr.stock_disponible, pr.qualite,
                   p.nom AS plantation_nom, p.nombre_arbres
            FROM productions pr
            JOIN plantations p ON pr.plantation = p.id
            WHERE ($1::BIGINT IS NULL OR pr.plantation = $1)
              AND ($2::VARCHAR IS NULL OR pr.qualite = $2)
            ORDER BY pr.date_recolte DESC, pr.id DESC
            "#,
        )
        .bind(filter.plantation)
        .bind(filter.qualite.map(|q| q.as_str()))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(ProductionWithDetails::from).collect())
    }

    /// Get a production by ID
    pub async fn get_production(&self, production_id: i64) -> AppResult<ProductionWithDetails> {
        let row = sqlx::query_as::<_, ProductionDetailsRow>(
            r#"
            SELECT pr.id, pr.plantation, pr.date_recolte, pr.quantite, pr.poids_total,
                   pr.stock_disponible, pr.qualite,
                   p.nom AS plantation_nom, p.nombre_arbres
            FROM productions pr
            JOIN plantations p ON pr.plantation = p.id
            WHERE pr.id = $1
            "#,
        )
        .bind(production_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Production".to_string()))?;

        Ok(row.into())
    }

    /// Create a new production
    ///
    /// A fresh harvest starts with its full weight available for sale.
    pub async fn create_production(
        &self,
        input: CreateProductionInput,
    ) -> AppResult<ProductionWithDetails> {
        self.validate_fields(input.quantite, input.poids_total, input.date_recolte)?;

        // Validate plantation exists
        let plantation_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM plantations WHERE id = $1)")
                .bind(input.plantation)
                .fetch_one(&self.db)
                .await?;

        if !plantation_exists {
            return Err(AppError::NotFound("Plantation".to_string()));
        }

        let production_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO productions (plantation, date_recolte, quantite, poids_total, stock_disponible, qualite)
            VALUES ($1, $2, $3, $4, $4, $5)
            RETURNING id
            "#,
        )
        .bind(input.plantation)
        .bind(input.date_recolte)
        .bind(input.quantite)
        .bind(input.poids_total)
        .bind(input.qualite.as_str())
        .fetch_one(&self.db)
        .await?;

        self.get_production(production_id).await
    }

    /// Update a production
    ///
    /// The parent plantation is immutable. Weight changes re-derive the
    /// available stock from the sales history and are refused when the new
    /// weight falls below the quantity already sold.
    pub async fn update_production(
        &self,
        production_id: i64,
        input: UpdateProductionInput,
    ) -> AppResult<ProductionWithDetails> {
        let existing = sqlx::query_as::<_, Production>(
            "SELECT id, plantation, date_recolte, quantite, poids_total, stock_disponible, qualite FROM productions WHERE id = $1",
        )
        .bind(production_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Production".to_string()))?;

        if let Some(plantation) = input.plantation {
            if plantation != existing.plantation {
                return Err(AppError::Conflict {
                    resource: "production".to_string(),
                    message: "The plantation of a production cannot be changed".to_string(),
                    message_fr: "La plantation d'une récolte ne peut pas être modifiée"
                        .to_string(),
                });
            }
        }

        if let Some(quantite) = input.quantite {
            validation::validate_quantite_regimes(quantite).map_err(|msg| {
                AppError::Validation {
                    field: "quantite".to_string(),
                    message: msg.to_string(),
                    message_fr: "Le nombre de régimes ne peut pas être négatif".to_string(),
                }
            })?;
        }

        if let Some(poids_total) = input.poids_total {
            validation::validate_poids_total(poids_total).map_err(|msg| AppError::Validation {
                field: "poids_total".to_string(),
                message: msg.to_string(),
                message_fr: "Le poids total ne peut pas être négatif".to_string(),
            })?;
        }

        if let Some(date_recolte) = input.date_recolte {
            validation::validate_date_not_future(date_recolte, Utc::now().date_naive()).map_err(
                |msg| AppError::Validation {
                    field: "date_recolte".to_string(),
                    message: msg.to_string(),
                    message_fr: "La date de récolte ne peut pas être dans le futur".to_string(),
                },
            )?;
        }

        let date_recolte = input.date_recolte.unwrap_or(existing.date_recolte);
        let quantite = input.quantite.unwrap_or(existing.quantite);
        let poids_total = input.poids_total.unwrap_or(existing.poids_total);
        let qualite = input
            .qualite
            .map(|q| q.as_str().to_string())
            .unwrap_or(existing.qualite);

        // Serialize with sale mutations on the same batch
        let mut tx = self.db.begin().await?;

        let (stored_poids, stored_stock) = sqlx::query_as::<_, (Decimal, Decimal)>(
            "SELECT poids_total, stock_disponible FROM productions WHERE id = $1 FOR UPDATE",
        )
        .bind(production_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Production".to_string()))?;

        let deja_vendu = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(quantite), 0) FROM ventes WHERE production = $1",
        )
        .bind(production_id)
        .fetch_one(&mut *tx)
        .await?;

        let derived = ledger::stock_restant(stored_poids, deja_vendu);
        if derived != stored_stock {
            tracing::error!(
                "Stock invariant violated for production {}: stored stock {} but poids_total - ventes = {}",
                production_id,
                stored_stock,
                derived
            );
            return Err(AppError::StockInvariant(format!(
                "Production {}: stored stock {} does not match sales history ({})",
                production_id, stored_stock, derived
            )));
        }

        if poids_total < deja_vendu {
            return Err(AppError::Conflict {
                resource: "production".to_string(),
                message: format!(
                    "Harvest weight cannot drop below the {} kg already sold",
                    deja_vendu
                ),
                message_fr: format!(
                    "Le poids de la récolte ne peut pas descendre sous les {} kg déjà vendus",
                    deja_vendu
                ),
            });
        }

        let stock_disponible = ledger::stock_restant(poids_total, deja_vendu);

        sqlx::query(
            r#"
            UPDATE productions
            SET date_recolte = $1, quantite = $2, poids_total = $3,
                stock_disponible = $4, qualite = $5
            WHERE id = $6
            "#,
        )
        .bind(date_recolte)
        .bind(quantite)
        .bind(poids_total)
        .bind(stock_disponible)
        .bind(&qualite)
        .bind(production_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_production(production_id).await
    }

    /// Delete a production
    ///
    /// Refused while any sale still references it.
    pub async fn delete_production(&self, production_id: i64) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let exists =
            sqlx::query_scalar::<_, i64>("SELECT id FROM productions WHERE id = $1 FOR UPDATE")
                .bind(production_id)
                .fetch_optional(&mut *tx)
                .await?;

        if exists.is_none() {
            return Err(AppError::NotFound("Production".to_string()));
        }

        let vente_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ventes WHERE production = $1")
                .bind(production_id)
                .fetch_one(&mut *tx)
                .await?;

        if vente_count > 0 {
            return Err(AppError::Conflict {
                resource: "production".to_string(),
                message: format!(
                    "Cannot delete production: {} sales are linked to it",
                    vente_count
                ),
                message_fr: format!(
                    "Impossible de supprimer la récolte : {} ventes y sont liées",
                    vente_count
                ),
            });
        }

        sqlx::query("DELETE FROM productions WHERE id = $1")
            .bind(production_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Get global harvest statistics
    pub async fn get_statistics(&self) -> AppResult<ProductionStatistics> {
        let totals = sqlx::query_as::<_, (Decimal, i64, Decimal, Decimal)>(
            r#"
            SELECT COALESCE(SUM(poids_total), 0),
                   COALESCE(SUM(quantite), 0),
                   COALESCE(SUM(stock_disponible), 0),
                   COALESCE(AVG(poids_total), 0)
            FROM productions
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let repartition = sqlx::query_as::<_, (i64, i64, i64, i64)>(
            r#"
            SELECT COUNT(*) FILTER (WHERE qualite = 'A'),
                   COUNT(*) FILTER (WHERE qualite = 'B'),
                   COUNT(*) FILTER (WHERE qualite = 'C'),
                   COUNT(*) FILTER (WHERE qualite = 'D')
            FROM productions
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let stock = sqlx::query_as::<_, (Decimal, Decimal, Decimal, Decimal)>(
            r#"
            SELECT COALESCE(SUM(stock_disponible) FILTER (WHERE qualite = 'A'), 0),
                   COALESCE(SUM(stock_disponible) FILTER (WHERE qualite = 'B'), 0),
                   COALESCE(SUM(stock_disponible) FILTER (WHERE qualite = 'C'), 0),
                   COALESCE(SUM(stock_disponible) FILTER (WHERE qualite = 'D'), 0)
            FROM productions
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        Ok(ProductionStatistics {
            total_poids: totals.0,
            total_regimes: totals.1,
            stock_total_disponible: totals.2,
            moyenne_par_recolte: totals.3,
            repartition_qualite: RepartitionQualite {
                a: repartition.0,
                b: repartition.1,
                c: repartition.2,
                d: repartition.3,
            },
            stock_par_qualite: StockParQualite {
                a: stock.0,
                b: stock.1,
                c: stock.2,
                d: stock.3,
            },
        })
    }

    /// Get productions whose remaining stock is under `seuil` percent
    ///
    /// Exhausted batches (stock zero) are excluded; they need no alert.
    pub async fn get_stock_alerts(&self, seuil: Decimal) -> AppResult<Vec<AlerteStock>> {
        let rows = sqlx::query_as::<_, AlerteStockRow>(
            r#"
            SELECT pr.id AS production_id, p.nom AS plantation_nom, pr.date_recolte,
                   pr.qualite, pr.stock_disponible, pr.poids_total
            FROM productions pr
            JOIN plantations p ON pr.plantation = p.id
            WHERE pr.poids_total > 0
              AND pr.stock_disponible > 0
              AND pr.stock_disponible * 100 < pr.poids_total * $1
            ORDER BY pr.stock_disponible * 100 / pr.poids_total ASC
            "#,
        )
        .bind(seuil)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let pourcentage =
                    ledger::pourcentage_stock(row.stock_disponible, row.poids_total);
                AlerteStock {
                    production_id: row.production_id,
                    plantation_nom: row.plantation_nom,
                    date_recolte: row.date_recolte,
                    qualite: row.qualite,
                    stock_disponible: row.stock_disponible,
                    poids_total: row.poids_total,
                    pourcentage,
                }
            })
            .collect())
    }

    fn validate_fields(
        &self,
        quantite: i32,
        poids_total: Decimal,
        date_recolte: NaiveDate,
    ) -> AppResult<()> {
        validation::validate_quantite_regimes(quantite).map_err(|msg| AppError::Validation {
            field: "quantite".to_string(),
            message: msg.to_string(),
            message_fr: "Le nombre de régimes ne peut pas être négatif".to_string(),
        })?;

        validation::validate_poids_total(poids_total).map_err(|msg| AppError::Validation {
            field: "poids_total".to_string(),
            message: msg.to_string(),
            message_fr: "Le poids total ne peut pas être négatif".to_string(),
        })?;

        validation::validate_date_not_future(date_recolte, Utc::now().date_naive()).map_err(
            |msg| AppError::Validation {
                field: "date_recolte".to_string(),
                message: msg.to_string(),
                message_fr: "La date de récolte ne peut pas être dans le futur".to_string(),
            },
        )?;

        Ok(())
    }
}
