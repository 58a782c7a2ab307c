//! Plantation management service for land units under cultivation

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use shared::{ledger, validation};

use crate::error::{AppError, AppResult};
use crate::services::production::RepartitionQualite;

/// Plantation service for managing cultivated plots
#[derive(Clone)]
pub struct PlantationService {
    db: PgPool,
}

/// Plantation record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Plantation {
    pub id: i64,
    pub nom: String,
    pub superficie: Decimal,
    pub date_plantation: NaiveDate,
    pub nombre_arbres: i32,
    pub localisation: String,
    pub description: Option<String>,
}

/// Plantation with its aggregate figures
#[derive(Debug, Clone, Serialize)]
pub struct PlantationWithStats {
    #[serde(flatten)]
    pub plantation: Plantation,
    pub nombre_operations: i64,
    pub nombre_productions: i64,
    pub rendement_moyen: Decimal,
}

/// Row for the list/detail query with aggregate subselects
#[derive(Debug, FromRow)]
struct PlantationStatsRow {
    id: i64,
    nom: String,
    superficie: Decimal,
    date_plantation: NaiveDate,
    nombre_arbres: i32,
    localisation: String,
    description: Option<String>,
    nombre_operations: i64,
    nombre_productions: i64,
    total_poids: Decimal,
}

impl From<PlantationStatsRow> for PlantationWithStats {
    fn from(row: PlantationStatsRow) -> Self {
        let rendement_moyen = ledger::rendement_moyen(row.total_poids, row.nombre_productions);
        PlantationWithStats {
            plantation: Plantation {
                id: row.id,
                nom: row.nom,
                superficie: row.superficie,
                date_plantation: row.date_plantation,
                nombre_arbres: row.nombre_arbres,
                localisation: row.localisation,
                description: row.description,
            },
            nombre_operations: row.nombre_operations,
            nombre_productions: row.nombre_productions,
            rendement_moyen,
        }
    }
}

/// Input for creating a plantation
#[derive(Debug, Deserialize)]
pub struct CreatePlantationInput {
    pub nom: String,
    pub superficie: Decimal,
    pub date_plantation: NaiveDate,
    pub nombre_arbres: i32,
    pub localisation: String,
    pub description: Option<String>,
}

/// Input for updating a plantation
#[derive(Debug, Deserialize)]
pub struct UpdatePlantationInput {
    pub nom: Option<String>,
    pub superficie: Option<Decimal>,
    pub date_plantation: Option<NaiveDate>,
    pub nombre_arbres: Option<i32>,
    pub localisation: Option<String>,
    pub description: Option<String>,
}

/// Per-plantation rollup of operations, harvests and revenue
#[derive(Debug, Serialize)]
pub struct PlantationStatistics {
    pub plantation_id: i64,
    pub nombre_operations: i64,
    pub nombre_productions: i64,
    pub total_cout_operations: Decimal,
    pub total_production: Decimal,
    pub rendement_moyen: Decimal,
    pub chiffre_affaires: Decimal,
    pub repartition_qualite: RepartitionQualite,
}

impl PlantationService {
    /// Create a new PlantationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all plantations, ordered by name
    pub async fn get_plantations(&self) -> AppResult<Vec<PlantationWithStats>> {
        let rows = sqlx::query_as::<_, PlantationStatsRow>(
            r#"
            SELECT p.id, p.nom, p.superficie, p.date_plantation, p.nombre_arbres,
                   p.localisation, p.description,
                   (SELECT COUNT(*) FROM operations o WHERE o.plantation = p.id) AS nombre_operations,
                   (SELECT COUNT(*) FROM productions pr WHERE pr.plantation = p.id) AS nombre_productions,
                   (SELECT COALESCE(SUM(pr.poids_total), 0) FROM productions pr WHERE pr.plantation = p.id) AS total_poids
            FROM plantations p
            ORDER BY p.nom ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(PlantationWithStats::from).collect())
    }

    /// Get a plantation by ID
    pub async fn get_plantation(&self, plantation_id: i64) -> AppResult<PlantationWithStats> {
        let row = sqlx::query_as::<_, PlantationStatsRow>(
            r#"
            SELECT p.id, p.nom, p.superficie, p.date_plantation, p.nombre_arbres,
                   p.localisation, p.description,
                   (SELECT COUNT(*) FROM operations o WHERE o.plantation = p.id) AS nombre_operations,
                   (SELECT COUNT(*) FROM productions pr WHERE pr.plantation = p.id) AS nombre_productions,
                   (SELECT COALESCE(SUM(pr.poids_total), 0) FROM productions pr WHERE pr.plantation = p.id) AS total_poids
            FROM plantations p
            WHERE p.id = $1
            "#,
        )
        .bind(plantation_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Plantation".to_string()))?;

        Ok(row.into())
    }

    /// Create a new plantation
    pub async fn create_plantation(
        &self,
        input: CreatePlantationInput,
    ) -> AppResult<PlantationWithStats> {
        // Validate input
        if input.nom.trim().is_empty() {
            return Err(AppError::Validation {
                field: "nom".to_string(),
                message: "Plantation name cannot be empty".to_string(),
                message_fr: "Le nom de la plantation ne peut pas être vide".to_string(),
            });
        }

        if input.localisation.trim().is_empty() {
            return Err(AppError::Validation {
                field: "localisation".to_string(),
                message: "Location cannot be empty".to_string(),
                message_fr: "La localisation ne peut pas être vide".to_string(),
            });
        }

        validation::validate_superficie(input.superficie).map_err(|msg| AppError::Validation {
            field: "superficie".to_string(),
            message: msg.to_string(),
            message_fr: "La superficie doit être supérieure à zéro".to_string(),
        })?;

        validation::validate_nombre_arbres(input.nombre_arbres).map_err(|msg| {
            AppError::Validation {
                field: "nombre_arbres".to_string(),
                message: msg.to_string(),
                message_fr: "Le nombre d'arbres ne peut pas être négatif".to_string(),
            }
        })?;

        validation::validate_date_not_future(input.date_plantation, Utc::now().date_naive())
            .map_err(|msg| AppError::Validation {
                field: "date_plantation".to_string(),
                message: msg.to_string(),
                message_fr: "La date de plantation ne peut pas être dans le futur".to_string(),
            })?;

        // Check for duplicate name
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM plantations WHERE LOWER(nom) = LOWER($1)",
        )
        .bind(&input.nom)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::Conflict {
                resource: "plantation".to_string(),
                message: "A plantation with this name already exists".to_string(),
                message_fr: "Une plantation avec ce nom existe déjà".to_string(),
            });
        }

        let plantation_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO plantations (nom, superficie, date_plantation, nombre_arbres, localisation, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&input.nom)
        .bind(input.superficie)
        .bind(input.date_plantation)
        .bind(input.nombre_arbres)
        .bind(&input.localisation)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        self.get_plantation(plantation_id).await
    }

    /// Update a plantation
    pub async fn update_plantation(
        &self,
        plantation_id: i64,
        input: UpdatePlantationInput,
    ) -> AppResult<PlantationWithStats> {
        // Check if plantation exists
        let existing = sqlx::query_as::<_, Plantation>(
            "SELECT id, nom, superficie, date_plantation, nombre_arbres, localisation, description FROM plantations WHERE id = $1",
        )
        .bind(plantation_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Plantation".to_string()))?;

        // Validate new name if provided
        if let Some(ref nom) = input.nom {
            if nom.trim().is_empty() {
                return Err(AppError::Validation {
                    field: "nom".to_string(),
                    message: "Plantation name cannot be empty".to_string(),
                    message_fr: "Le nom de la plantation ne peut pas être vide".to_string(),
                });
            }

            // Check for duplicate name
            let duplicate = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM plantations WHERE LOWER(nom) = LOWER($1) AND id != $2",
            )
            .bind(nom)
            .bind(plantation_id)
            .fetch_one(&self.db)
            .await?;

            if duplicate > 0 {
                return Err(AppError::Conflict {
                    resource: "plantation".to_string(),
                    message: "A plantation with this name already exists".to_string(),
                    message_fr: "Une plantation avec ce nom existe déjà".to_string(),
                });
            }
        }

        if let Some(ref localisation) = input.localisation {
            if localisation.trim().is_empty() {
                return Err(AppError::Validation {
                    field: "localisation".to_string(),
                    message: "Location cannot be empty".to_string(),
                    message_fr: "La localisation ne peut pas être vide".to_string(),
                });
            }
        }

        if let Some(superficie) = input.superficie {
            validation::validate_superficie(superficie).map_err(|msg| AppError::Validation {
                field: "superficie".to_string(),
                message: msg.to_string(),
                message_fr: "La superficie doit être supérieure à zéro".to_string(),
            })?;
        }

        if let Some(nombre_arbres) = input.nombre_arbres {
            validation::validate_nombre_arbres(nombre_arbres).map_err(|msg| {
                AppError::Validation {
                    field: "nombre_arbres".to_string(),
                    message: msg.to_string(),
                    message_fr: "Le nombre d'arbres ne peut pas être négatif".to_string(),
                }
            })?;
        }

        if let Some(date_plantation) = input.date_plantation {
            validation::validate_date_not_future(date_plantation, Utc::now().date_naive())
                .map_err(|msg| AppError::Validation {
                    field: "date_plantation".to_string(),
                    message: msg.to_string(),
                    message_fr: "La date de plantation ne peut pas être dans le futur".to_string(),
                })?;
        }

        // Merge and update
        let nom = input.nom.unwrap_or(existing.nom);
        let superficie = input.superficie.unwrap_or(existing.superficie);
        let date_plantation = input.date_plantation.unwrap_or(existing.date_plantation);
        let nombre_arbres = input.nombre_arbres.unwrap_or(existing.nombre_arbres);
        let localisation = input.localisation.unwrap_or(existing.localisation);
        let description = input.description.or(existing.description);

        sqlx::query(
            r#"
            UPDATE plantations
            SET nom = $1, superficie = $2, date_plantation = $3,
                nombre_arbres = $4, localisation = $5, description = $6
            WHERE id = $7
            "#,
        )
        .bind(&nom)
        .bind(superficie)
        .bind(date_plantation)
        .bind(nombre_arbres)
        .bind(&localisation)
        .bind(&description)
        .bind(plantation_id)
        .execute(&self.db)
        .await?;

        self.get_plantation(plantation_id).await
    }

    /// Delete a plantation
    ///
    /// Refused while any operation or harvest still references it.
    pub async fn delete_plantation(&self, plantation_id: i64) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM plantations WHERE id = $1")
            .bind(plantation_id)
            .fetch_one(&self.db)
            .await?;

        if exists == 0 {
            return Err(AppError::NotFound("Plantation".to_string()));
        }

        let operation_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM operations WHERE plantation = $1")
                .bind(plantation_id)
                .fetch_one(&self.db)
                .await?;

        if operation_count > 0 {
            return Err(AppError::Conflict {
                resource: "plantation".to_string(),
                message: format!(
                    "Cannot delete plantation: {} operations are linked to it",
                    operation_count
                ),
                message_fr: format!(
                    "Impossible de supprimer la plantation : {} opérations y sont liées",
                    operation_count
                ),
            });
        }

        let production_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM productions WHERE plantation = $1")
                .bind(plantation_id)
                .fetch_one(&self.db)
                .await?;

        if production_count > 0 {
            return Err(AppError::Conflict {
                resource: "plantation".to_string(),
                message: format!(
                    "Cannot delete plantation: {} harvests are linked to it",
                    production_count
                ),
                message_fr: format!(
                    "Impossible de supprimer la plantation : {} récoltes y sont liées",
                    production_count
                ),
            });
        }

        sqlx::query("DELETE FROM plantations WHERE id = $1")
            .bind(plantation_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Get the cost/production/revenue rollup for one plantation
    pub async fn get_plantation_statistics(
        &self,
        plantation_id: i64,
    ) -> AppResult<PlantationStatistics> {
        // Check if plantation exists (tree count feeds the yield figure)
        let plantation = sqlx::query_as::<_, Plantation>(
            "SELECT id, nom, superficie, date_plantation, nombre_arbres, localisation, description FROM plantations WHERE id = $1",
        )
        .bind(plantation_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Plantation".to_string()))?;

        let operation_stats = sqlx::query_as::<_, (i64, Decimal)>(
            "SELECT COUNT(*), COALESCE(SUM(cout), 0) FROM operations WHERE plantation = $1",
        )
        .bind(plantation_id)
        .fetch_one(&self.db)
        .await?;

        let production_stats = sqlx::query_as::<_, (i64, Decimal, Decimal)>(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(poids_total), 0),
                   COALESCE(AVG(poids_total), 0)
            FROM productions
            WHERE plantation = $1
            "#,
        )
        .bind(plantation_id)
        .fetch_one(&self.db)
        .await?;

        let chiffre_affaires = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(v.montant_total), 0)
            FROM ventes v
            JOIN productions p ON v.production = p.id
            WHERE p.plantation = $1
            "#,
        )
        .bind(plantation_id)
        .fetch_one(&self.db)
        .await?;

        let qualite_counts = sqlx::query_as::<_, (i64, i64, i64, i64)>(
            r#"
            SELECT COUNT(*) FILTER (WHERE qualite = 'A'),
                   COUNT(*) FILTER (WHERE qualite = 'B'),
                   COUNT(*) FILTER (WHERE qualite = 'C'),
                   COUNT(*) FILTER (WHERE qualite = 'D')
            FROM productions
            WHERE plantation = $1
            "#,
        )
        .bind(plantation_id)
        .fetch_one(&self.db)
        .await?;

        Ok(PlantationStatistics {
            plantation_id,
            nombre_operations: operation_stats.0,
            nombre_productions: production_stats.0,
            total_cout_operations: operation_stats.1,
            total_production: production_stats.1,
            rendement_moyen: ledger::rendement_par_arbre(
                production_stats.2,
                plantation.nombre_arbres,
            ),
            chiffre_affaires,
            repartition_qualite: RepartitionQualite {
                a: qualite_counts.0,
                b: qualite_counts.1,
                c: qualite_counts.2,
                d: qualite_counts.3,
            },
        })
    }
}
