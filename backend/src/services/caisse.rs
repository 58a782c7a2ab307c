//! Cash book service
//!
//! Movements are plain append/edit/delete records; the balance is never
//! stored, it is recomputed from the ledger on every read so edits cannot
//! leave a stale figure behind.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use shared::{ledger, validation, BilanCaisse, Periode, PointCaisse, SerieCaisse, TypeMouvement};

use crate::error::{AppError, AppResult};

/// Cash book service for managing cash movements
#[derive(Clone)]
pub struct CaisseService {
    db: PgPool,
}

/// Cash movement record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MouvementCaisse {
    pub id: i64,
    pub date: NaiveDate,
    pub type_mouvement: String,
    pub montant: Decimal,
    pub description: String,
}

/// Cash movement with its display label
#[derive(Debug, Clone, Serialize)]
pub struct MouvementCaisseWithDisplay {
    #[serde(flatten)]
    pub mouvement: MouvementCaisse,
    pub type_mouvement_display: String,
}

impl From<MouvementCaisse> for MouvementCaisseWithDisplay {
    fn from(mouvement: MouvementCaisse) -> Self {
        let type_mouvement_display = TypeMouvement::from_str(&mouvement.type_mouvement)
            .map(|t| t.label().to_string())
            .unwrap_or_else(|| mouvement.type_mouvement.clone());
        MouvementCaisseWithDisplay {
            mouvement,
            type_mouvement_display,
        }
    }
}

/// Input for creating a cash movement
#[derive(Debug, Deserialize)]
pub struct CreateMouvementInput {
    pub date: NaiveDate,
    pub type_mouvement: TypeMouvement,
    pub montant: Decimal,
    pub description: String,
}

/// Input for updating a cash movement
#[derive(Debug, Deserialize)]
pub struct UpdateMouvementInput {
    pub date: Option<NaiveDate>,
    pub type_mouvement: Option<TypeMouvement>,
    pub montant: Option<Decimal>,
    pub description: Option<String>,
}

/// Optional list filter
#[derive(Debug, Deserialize)]
pub struct MouvementFilter {
    pub type_mouvement: Option<TypeMouvement>,
}

impl CaisseService {
    /// Create a new CaisseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get movements, most recent first, optionally filtered by kind
    pub async fn get_mouvements(
        &self,
        filter: MouvementFilter,
    ) -> AppResult<Vec<MouvementCaisseWithDisplay>> {
        let mouvements = sqlx::query_as::<_, MouvementCaisse>(
            r#"
            SELECT id, date, type_mouvement, montant, description
            FROM mouvements_caisse
            WHERE ($1::VARCHAR IS NULL OR type_mouvement = $1)
            ORDER BY date DESC, id DESC
            "#,
        )
        .bind(filter.type_mouvement.map(|t| t.as_str()))
        .fetch_all(&self.db)
        .await?;

        Ok(mouvements
            .into_iter()
            .map(MouvementCaisseWithDisplay::from)
            .collect())
    }

    /// Get a movement by ID
    pub async fn get_mouvement(&self, mouvement_id: i64) -> AppResult<MouvementCaisseWithDisplay> {
        let mouvement = sqlx::query_as::<_, MouvementCaisse>(
            "SELECT id, date, type_mouvement, montant, description FROM mouvements_caisse WHERE id = $1",
        )
        .bind(mouvement_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Mouvement".to_string()))?;

        Ok(mouvement.into())
    }

    /// Record a new cash movement
    pub async fn create_mouvement(
        &self,
        input: CreateMouvementInput,
    ) -> AppResult<MouvementCaisseWithDisplay> {
        self.validate_fields(input.montant, input.date, &input.description)?;

        let mouvement_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO mouvements_caisse (date, type_mouvement, montant, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(input.date)
        .bind(input.type_mouvement.as_str())
        .bind(input.montant)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        self.get_mouvement(mouvement_id).await
    }

    /// Update a cash movement
    pub async fn update_mouvement(
        &self,
        mouvement_id: i64,
        input: UpdateMouvementInput,
    ) -> AppResult<MouvementCaisseWithDisplay> {
        let existing = sqlx::query_as::<_, MouvementCaisse>(
            "SELECT id, date, type_mouvement, montant, description FROM mouvements_caisse WHERE id = $1",
        )
        .bind(mouvement_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Mouvement".to_string()))?;

        if let Some(montant) = input.montant {
            validation::validate_montant(montant).map_err(|msg| AppError::Validation {
                field: "montant".to_string(),
                message: msg.to_string(),
                message_fr: "Le montant doit être supérieur à 0".to_string(),
            })?;
        }

        if let Some(date) = input.date {
            validation::validate_date_not_future(date, Utc::now().date_naive()).map_err(|msg| {
                AppError::Validation {
                    field: "date".to_string(),
                    message: msg.to_string(),
                    message_fr: "La date ne peut pas être dans le futur".to_string(),
                }
            })?;
        }

        if let Some(ref description) = input.description {
            if description.trim().is_empty() {
                return Err(AppError::Validation {
                    field: "description".to_string(),
                    message: "Description cannot be empty".to_string(),
                    message_fr: "La description ne peut pas être vide".to_string(),
                });
            }
        }

        let date = input.date.unwrap_or(existing.date);
        let type_mouvement = input
            .type_mouvement
            .map(|t| t.as_str().to_string())
            .unwrap_or(existing.type_mouvement);
        let montant = input.montant.unwrap_or(existing.montant);
        let description = input.description.unwrap_or(existing.description);

        sqlx::query(
            r#"
            UPDATE mouvements_caisse
            SET date = $1, type_mouvement = $2, montant = $3, description = $4
            WHERE id = $5
            "#,
        )
        .bind(date)
        .bind(&type_mouvement)
        .bind(montant)
        .bind(&description)
        .bind(mouvement_id)
        .execute(&self.db)
        .await?;

        self.get_mouvement(mouvement_id).await
    }

    /// Delete a cash movement
    pub async fn delete_mouvement(&self, mouvement_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM mouvements_caisse WHERE id = $1")
            .bind(mouvement_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Mouvement".to_string()));
        }

        Ok(())
    }

    /// Cash balance over an optional inclusive date range
    pub async fn get_bilan(&self, periode: Periode) -> AppResult<BilanCaisse> {
        let (total_entrees, total_sorties) = sqlx::query_as::<_, (Decimal, Decimal)>(
            r#"
            SELECT COALESCE(SUM(montant) FILTER (WHERE type_mouvement = 'ENTREE'), 0),
                   COALESCE(SUM(montant) FILTER (WHERE type_mouvement = 'SORTIE'), 0)
            FROM mouvements_caisse
            WHERE ($1::DATE IS NULL OR date >= $1)
              AND ($2::DATE IS NULL OR date <= $2)
            "#,
        )
        .bind(periode.date_debut)
        .bind(periode.date_fin)
        .fetch_one(&self.db)
        .await?;

        Ok(BilanCaisse::new(total_entrees, total_sorties))
    }

    /// Chart series over the last `limit` movements, oldest first
    pub async fn get_serie(&self, limit: i64) -> AppResult<SerieCaisse> {
        let rows = sqlx::query_as::<_, (NaiveDate, String, Decimal)>(
            r#"
            SELECT date, type_mouvement, montant
            FROM mouvements_caisse
            ORDER BY date DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        let mut points = Vec::with_capacity(rows.len());
        for (date, kind, montant) in rows.into_iter().rev() {
            let type_mouvement = TypeMouvement::from_str(&kind).ok_or_else(|| {
                AppError::Internal(format!("Unknown movement kind in cash book: {}", kind))
            })?;
            points.push(PointCaisse {
                date,
                type_mouvement,
                montant,
            });
        }

        Ok(ledger::serie_caisse(&points))
    }

    fn validate_fields(
        &self,
        montant: Decimal,
        date: NaiveDate,
        description: &str,
    ) -> AppResult<()> {
        validation::validate_montant(montant).map_err(|msg| AppError::Validation {
            field: "montant".to_string(),
            message: msg.to_string(),
            message_fr: "Le montant doit être supérieur à 0".to_string(),
        })?;

        validation::validate_date_not_future(date, Utc::now().date_naive()).map_err(|msg| {
            AppError::Validation {
                field: "date".to_string(),
                message: msg.to_string(),
                message_fr: "La date ne peut pas être dans le futur".to_string(),
            }
        })?;

        if description.trim().is_empty() {
            return Err(AppError::Validation {
                field: "description".to_string(),
                message: "Description cannot be empty".to_string(),
                message_fr: "La description ne peut pas être vide".to_string(),
            });
        }

        Ok(())
    }
}
