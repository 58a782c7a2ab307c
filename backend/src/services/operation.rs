//! Field operation service for work carried out on plantations

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use shared::{validation, TypeOperation};

use crate::error::{AppError, AppResult};

/// Operation service for managing field work records
#[derive(Clone)]
pub struct OperationService {
    db: PgPool,
}

/// Field operation record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Operation {
    pub id: i64,
    pub plantation: i64,
    pub type_operation: String,
    pub date: NaiveDate,
    pub cout: Decimal,
    pub description: String,
}

/// Operation with its plantation name and display label
#[derive(Debug, Clone, Serialize)]
pub struct OperationWithPlantation {
    #[serde(flatten)]
    pub operation: Operation,
    pub plantation_nom: String,
    pub type_operation_display: String,
}

/// Row for the joined list/detail query
#[derive(Debug, FromRow)]
struct OperationDetailsRow {
    id: i64,
    plantation: i64,
    type_operation: String,
    date: NaiveDate,
    cout: Decimal,
    description: String,
    plantation_nom: String,
}

impl From<OperationDetailsRow> for OperationWithPlantation {
    fn from(row: OperationDetailsRow) -> Self {
        let type_operation_display = TypeOperation::from_str(&row.type_operation)
            .map(|t| t.label().to_string())
            .unwrap_or_else(|| row.type_operation.clone());
        OperationWithPlantation {
            operation: Operation {
                id: row.id,
                plantation: row.plantation,
                type_operation: row.type_operation,
                date: row.date,
                cout: row.cout,
                description: row.description,
            },
            plantation_nom: row.plantation_nom,
            type_operation_display,
        }
    }
}

/// Input for creating an operation
#[derive(Debug, Deserialize)]
pub struct CreateOperationInput {
    pub plantation: i64,
    pub type_operation: TypeOperation,
    pub date: NaiveDate,
    pub cout: Decimal,
    pub description: String,
}

/// Input for updating an operation
#[derive(Debug, Deserialize)]
pub struct UpdateOperationInput {
    pub plantation: Option<i64>,
    pub type_operation: Option<TypeOperation>,
    pub date: Option<NaiveDate>,
    pub cout: Option<Decimal>,
    pub description: Option<String>,
}

/// Optional list filters
#[derive(Debug, Deserialize)]
pub struct OperationFilter {
    pub plantation: Option<i64>,
    pub type_operation: Option<TypeOperation>,
}

impl OperationService {
    /// Create a new OperationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get operations, most recent first, optionally filtered
    pub async fn get_operations(
        &self,
        filter: OperationFilter,
    ) -> AppResult<Vec<OperationWithPlantation>> {
        let rows = sqlx::query_as::<_, OperationDetailsRow>(
            r#"
            SELECT o.id, o.plantation, o.type_operation, o.date, o.cout, o.description,
                   p.nom AS plantation_nom
            FROM operations o
            JOIN plantations p ON o.plantation = p.id
            WHERE ($1::BIGINT IS NULL OR o.plantation = $1)
              AND ($2::VARCHAR IS NULL OR o.type_operation = $2)
            ORDER BY o.date DESC, o.id DESC
            "#,
        )
        .bind(filter.plantation)
        .bind(filter.type_operation.map(|t| t.as_str()))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(OperationWithPlantation::from).collect())
    }

    /// Get an operation by ID
    pub async fn get_operation(&self, operation_id: i64) -> AppResult<OperationWithPlantation> {
        let row = sqlx::query_as::<_, OperationDetailsRow>(
            r#"
            SELECT o.id, o.plantation, o.type_operation, o.date, o.cout, o.description,
                   p.nom AS plantation_nom
            FROM operations o
            JOIN plantations p ON o.plantation = p.id
            WHERE o.id = $1
            "#,
        )
        .bind(operation_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Operation".to_string()))?;

        Ok(row.into())
    }

    /// Create a new operation
    pub async fn create_operation(
        &self,
        input: CreateOperationInput,
    ) -> AppResult<OperationWithPlantation> {
        self.validate_fields(input.cout, input.date, &input.description)?;

        // Validate plantation exists
        let plantation_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM plantations WHERE id = $1)")
                .bind(input.plantation)
                .fetch_one(&self.db)
                .await?;

        if !plantation_exists {
            return Err(AppError::NotFound("Plantation".to_string()));
        }

        let operation_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO operations (plantation, type_operation, date, cout, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(input.plantation)
        .bind(input.type_operation.as_str())
        .bind(input.date)
        .bind(input.cout)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        self.get_operation(operation_id).await
    }

    /// Update an operation
    ///
    /// The parent plantation is immutable once set.
    pub async fn update_operation(
        &self,
        operation_id: i64,
        input: UpdateOperationInput,
    ) -> AppResult<OperationWithPlantation> {
        let existing = sqlx::query_as::<_, Operation>(
            "SELECT id, plantation, type_operation, date, cout, description FROM operations WHERE id = $1",
        )
        .bind(operation_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Operation".to_string()))?;

        if let Some(plantation) = input.plantation {
            if plantation != existing.plantation {
                return Err(AppError::Conflict {
                    resource: "operation".to_string(),
                    message: "The plantation of an operation cannot be changed".to_string(),
                    message_fr: "La plantation d'une opération ne peut pas être modifiée"
                        .to_string(),
                });
            }
        }

        if let Some(cout) = input.cout {
            validation::validate_cout(cout).map_err(|msg| AppError::Validation {
                field: "cout".to_string(),
                message: msg.to_string(),
                message_fr: "Le coût ne peut pas être négatif".to_string(),
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

        let type_operation = input
            .type_operation
            .map(|t| t.as_str().to_string())
            .unwrap_or(existing.type_operation);
        let date = input.date.unwrap_or(existing.date);
        let cout = input.cout.unwrap_or(existing.cout);
        let description = input.description.unwrap_or(existing.description);

        sqlx::query(
            r#"
            UPDATE operations
            SET type_operation = $1, date = $2, cout = $3, description = $4
            WHERE id = $5
            "#,
        )
        .bind(&type_operation)
        .bind(date)
        .bind(cout)
        .bind(&description)
        .bind(operation_id)
        .execute(&self.db)
        .await?;

        self.get_operation(operation_id).await
    }

    /// Delete an operation
    pub async fn delete_operation(&self, operation_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM operations WHERE id = $1")
            .bind(operation_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Operation".to_string()));
        }

        Ok(())
    }

    fn validate_fields(
        &self,
        cout: Decimal,
        date: NaiveDate,
        description: &str,
    ) -> AppResult<()> {
        validation::validate_cout(cout).map_err(|msg| AppError::Validation {
            field: "cout".to_string(),
            message: msg.to_string(),
            message_fr: "Le coût ne peut pas être négatif".to_string(),
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
