//! Sale service
//!
//! Every sale mutation runs inside a transaction that locks the parent
//! production row, recomputes the sold total from the sales history, checks
//! availability and writes the sale and the derived stock together. The sale
//! amount is always recomputed from quantity and unit price; any amount the
//! caller supplies is discarded.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use shared::{ledger, validation, Periode};

use crate::error::{AppError, AppResult};

/// Sale service for managing harvest sales
#[derive(Clone)]
pub struct VenteService {
    db: PgPool,
}

/// Sale record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vente {
    pub id: i64,
    pub production: i64,
    pub date_vente: NaiveDate,
    pub client: String,
    pub quantite: Decimal,
    pub prix_unitaire: Decimal,
    pub montant_total: Decimal,
}

/// Sale with its production context
#[derive(Debug, Clone, Serialize)]
pub struct VenteWithDetails {
    #[serde(flatten)]
    pub vente: Vente,
    pub production_plantation_nom: String,
    pub prix_moyen_kg: Decimal,
    pub stock_restant: Decimal,
}

/// Row for the joined list/detail query
#[derive(Debug, FromRow)]
struct VenteDetailsRow {
    id: i64,
    production: i64,
    date_vente: NaiveDate,
    client: String,
    quantite: Decimal,
    prix_unitaire: Decimal,
    montant_total: Decimal,
    production_plantation_nom: String,
    stock_restant: Decimal,
}

impl From<VenteDetailsRow> for VenteWithDetails {
    fn from(row: VenteDetailsRow) -> Self {
        let prix_moyen_kg = ledger::prix_moyen_kg(row.montant_total, row.quantite);
        VenteWithDetails {
            vente: Vente {
                id: row.id,
                production: row.production,
                date_vente: row.date_vente,
                client: row.client,
                quantite: row.quantite,
                prix_unitaire: row.prix_unitaire,
                montant_total: row.montant_total,
            },
            production_plantation_nom: row.production_plantation_nom,
            prix_moyen_kg,
            stock_restant: row.stock_restant,
        }
    }
}

/// Input for creating a sale
///
/// `montant_total` is intentionally absent: the stored amount is derived,
/// so a client-sent amount is dropped at deserialization.
#[derive(Debug, Deserialize)]
pub struct CreateVenteInput {
    pub production: i64,
    pub date_vente: NaiveDate,
    pub client: String,
    pub quantite: Decimal,
    pub prix_unitaire: Decimal,
}

/// Input for updating a sale
#[derive(Debug, Deserialize)]
pub struct UpdateVenteInput {
    pub production: Option<i64>,
    pub date_vente: Option<NaiveDate>,
    pub client: Option<String>,
    pub quantite: Option<Decimal>,
    pub prix_unitaire: Option<Decimal>,
}

/// Optional list filters
#[derive(Debug, Deserialize)]
pub struct VenteFilter {
    pub plantation: Option<i64>,
    pub client: Option<String>,
}

/// Total revenue over a period
#[derive(Debug, Serialize)]
pub struct ChiffreAffaires {
    pub chiffre_affaires: Decimal,
}

/// Monthly revenue point
#[derive(Debug, Serialize, FromRow)]
pub struct EvolutionMensuelle {
    pub annee: i32,
    pub mois: i32,
    pub chiffre_affaires: Decimal,
    pub quantite_vendue: Decimal,
}

/// Aggregate per buyer
#[derive(Debug, Serialize, FromRow)]
pub struct TopClient {
    pub client: String,
    pub total_achats: Decimal,
    pub nombre_achats: i64,
    pub quantite_totale: Decimal,
}

/// Global sales statistics
#[derive(Debug, Serialize)]
pub struct VenteStatistics {
    pub chiffre_affaires_total: Decimal,
    pub prix_moyen_kg: Decimal,
    pub evolution_mensuelle: Vec<EvolutionMensuelle>,
    pub top_clients: Vec<TopClient>,
}

impl VenteService {
    /// Create a new VenteService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get sales, most recent first, optionally filtered
    pub async fn get_ventes(&self, filter: VenteFilter) -> AppResult<Vec<VenteWithDetails>> {
        let rows = sqlx::query_as::<_, VenteDetailsRow>(
            r#"
            SELECT v.id, v.production, v.date_vente, v.client, v.quantite,
                   v.prix_unitaire, v.montant_total,
                   p.nom AS production_plantation_nom,
                   pr.stock_disponible AS stock_restant
            FROM ventes v
            JOIN productions pr ON v.production = pr.id
            JOIN plantations p ON pr.plantation = p.id
            WHERE ($1::BIGINT IS NULL OR pr.plantation = $1)
              AND ($2::VARCHAR IS NULL OR v.client = $2)
            ORDER BY v.date_vente DESC, v.id DESC
            "#,
        )
        .bind(filter.plantation)
        .bind(filter.client)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(VenteWithDetails::from).collect())
    }

    /// Get a sale by ID
    pub async fn get_vente(&self, vente_id: i64) -> AppResult<VenteWithDetails> {
        let row = sqlx::query_as::<_, VenteDetailsRow>(
            r#"
            SELECT v.id, v.production, v.date_vente, v.client, v.quantite,
                   v.prix_unitaire, v.montant_total,
                   p.nom AS production_plantation_nom,
                   pr.stock_disponible AS stock_restant
            FROM ventes v
            JOIN productions pr ON v.production = pr.id
            JOIN plantations p ON pr.plantation = p.id
            WHERE v.id = $1
            "#,
        )
        .bind(vente_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vente".to_string()))?;

        Ok(row.into())
    }

    /// Create a new sale
    pub async fn create_vente(&self, input: CreateVenteInput) -> AppResult<VenteWithDetails> {
        self.validate_fields(&input.client, input.quantite, input.prix_unitaire, input.date_vente)?;

        let mut tx = self.db.begin().await?;

        // Lock the batch, then recompute the sold total from the sales history
        let (poids_total, stored_stock) = sqlx::query_as::<_, (Decimal, Decimal)>(
            "SELECT poids_total, stock_disponible FROM productions WHERE id = $1 FOR UPDATE",
        )
        .bind(input.production)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Production".to_string()))?;

        let deja_vendu = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(quantite), 0) FROM ventes WHERE production = $1",
        )
        .bind(input.production)
        .fetch_one(&mut *tx)
        .await?;

        let disponible = ledger::stock_restant(poids_total, deja_vendu);
        if disponible != stored_stock {
            tracing::error!(
                "Stock invariant violated for production {}: stored stock {} but poids_total - ventes = {}",
                input.production,
                stored_stock,
                disponible
            );
            return Err(AppError::StockInvariant(format!(
                "Production {}: stored stock {} does not match sales history ({})",
                input.production, stored_stock, disponible
            )));
        }

        if input.quantite > disponible {
            return Err(AppError::InsufficientStock {
                message: format!(
                    "Requested {} kg but only {} kg are available",
                    input.quantite, disponible
                ),
                message_fr: format!(
                    "La quantité vendue ne peut pas dépasser le stock disponible ({} kg)",
                    disponible
                ),
            });
        }

        let montant_total = ledger::montant_total(input.quantite, input.prix_unitaire);

        let vente_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO ventes (production, date_vente, client, quantite, prix_unitaire, montant_total)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(input.production)
        .bind(input.date_vente)
        .bind(&input.client)
        .bind(input.quantite)
        .bind(input.prix_unitaire)
        .bind(montant_total)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE productions SET stock_disponible = $1 WHERE id = $2")
            .bind(ledger::stock_restant(disponible, input.quantite))
            .bind(input.production)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_vente(vente_id).await
    }

    /// Update a sale
    ///
    /// The parent production is immutable. The old quantity is refunded to
    /// the batch before the new one is checked against availability.
    pub async fn update_vente(
        &self,
        vente_id: i64,
        input: UpdateVenteInput,
    ) -> AppResult<VenteWithDetails> {
        let existing = sqlx::query_as::<_, Vente>(
            "SELECT id, production, date_vente, client, quantite, prix_unitaire, montant_total FROM ventes WHERE id = $1",
        )
        .bind(vente_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vente".to_string()))?;

        if let Some(production) = input.production {
            if production != existing.production {
                return Err(AppError::Conflict {
                    resource: "vente".to_string(),
                    message: "The production of a sale cannot be changed".to_string(),
                    message_fr: "La récolte d'une vente ne peut pas être modifiée".to_string(),
                });
            }
        }

        if let Some(ref client) = input.client {
            if client.trim().is_empty() {
                return Err(AppError::Validation {
                    field: "client".to_string(),
                    message: "Client name cannot be empty".to_string(),
                    message_fr: "Le nom du client ne peut pas être vide".to_string(),
                });
            }
        }

        if let Some(quantite) = input.quantite {
            validation::validate_quantite_vente(quantite).map_err(|msg| AppError::Validation {
                field: "quantite".to_string(),
                message: msg.to_string(),
                message_fr: "La quantité vendue doit être supérieure à zéro".to_string(),
            })?;
        }

        if let Some(prix_unitaire) = input.prix_unitaire {
            validation::validate_prix_unitaire(prix_unitaire).map_err(|msg| {
                AppError::Validation {
                    field: "prix_unitaire".to_string(),
                    message: msg.to_string(),
                    message_fr: "Le prix unitaire doit être supérieur à zéro".to_string(),
                }
            })?;
        }

        if let Some(date_vente) = input.date_vente {
            validation::validate_date_not_future(date_vente, Utc::now().date_naive()).map_err(
                |msg| AppError::Validation {
                    field: "date_vente".to_string(),
                    message: msg.to_string(),
                    message_fr: "La date de vente ne peut pas être dans le futur".to_string(),
                },
            )?;
        }

        let date_vente = input.date_vente.unwrap_or(existing.date_vente);
        let client = input.client.unwrap_or(existing.client);
        let quantite = input.quantite.unwrap_or(existing.quantite);
        let prix_unitaire = input.prix_unitaire.unwrap_or(existing.prix_unitaire);

        let mut tx = self.db.begin().await?;

        let (poids_total, stored_stock) = sqlx::query_as::<_, (Decimal, Decimal)>(
            "SELECT poids_total, stock_disponible FROM productions WHERE id = $1 FOR UPDATE",
        )
        .bind(existing.production)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Production".to_string()))?;

        let vendu_autres = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(quantite), 0) FROM ventes WHERE production = $1 AND id != $2",
        )
        .bind(existing.production)
        .bind(vente_id)
        .fetch_one(&mut *tx)
        .await?;

        let derived = ledger::stock_restant(poids_total, vendu_autres + existing.quantite);
        if derived != stored_stock {
            tracing::error!(
                "Stock invariant violated for production {}: stored stock {} but poids_total - ventes = {}",
                existing.production,
                stored_stock,
                derived
            );
            return Err(AppError::StockInvariant(format!(
                "Production {}: stored stock {} does not match sales history ({})",
                existing.production, stored_stock, derived
            )));
        }

        // Refund the old quantity, then gate the new one
        let disponible = ledger::stock_restant(poids_total, vendu_autres);
        if quantite > disponible {
            return Err(AppError::InsufficientStock {
                message: format!(
                    "Requested {} kg but only {} kg are available",
                    quantite, disponible
                ),
                message_fr: format!(
                    "La quantité vendue ne peut pas dépasser le stock disponible ({} kg)",
                    disponible
                ),
            });
        }

        let montant_total = ledger::montant_total(quantite, prix_unitaire);

        sqlx::query(
            r#"
            UPDATE ventes
            SET date_vente = $1, client = $2, quantite = $3,
                prix_unitaire = $4, montant_total = $5
            WHERE id = $6
            "#,
        )
        .bind(date_vente)
        .bind(&client)
        .bind(quantite)
        .bind(prix_unitaire)
        .bind(montant_total)
        .bind(vente_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE productions SET stock_disponible = $1 WHERE id = $2")
            .bind(ledger::stock_restant(disponible, quantite))
            .bind(existing.production)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_vente(vente_id).await
    }

    /// Delete a sale, refunding its quantity to the batch
    pub async fn delete_vente(&self, vente_id: i64) -> AppResult<()> {
        let existing = sqlx::query_as::<_, Vente>(
            "SELECT id, production, date_vente, client, quantite, prix_unitaire, montant_total FROM ventes WHERE id = $1",
        )
        .bind(vente_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vente".to_string()))?;

        let mut tx = self.db.begin().await?;

        let (poids_total, stored_stock) = sqlx::query_as::<_, (Decimal, Decimal)>(
            "SELECT poids_total, stock_disponible FROM productions WHERE id = $1 FOR UPDATE",
        )
        .bind(existing.production)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Production".to_string()))?;

        let deja_vendu = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(quantite), 0) FROM ventes WHERE production = $1",
        )
        .bind(existing.production)
        .fetch_one(&mut *tx)
        .await?;

        let derived = ledger::stock_restant(poids_total, deja_vendu);
        if derived != stored_stock {
            tracing::error!(
                "Stock invariant violated for production {}: stored stock {} but poids_total - ventes = {}",
                existing.production,
                stored_stock,
                derived
            );
            return Err(AppError::StockInvariant(format!(
                "Production {}: stored stock {} does not match sales history ({})",
                existing.production, stored_stock, derived
            )));
        }

        sqlx::query("DELETE FROM ventes WHERE id = $1")
            .bind(vente_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE productions SET stock_disponible = $1 WHERE id = $2")
            .bind(ledger::stock_restant(poids_total, deja_vendu - existing.quantite))
            .bind(existing.production)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Total revenue over an optional inclusive date range
    pub async fn get_chiffre_affaires(&self, periode: Periode) -> AppResult<ChiffreAffaires> {
        let chiffre_affaires = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(montant_total), 0)
            FROM ventes
            WHERE ($1::DATE IS NULL OR date_vente >= $1)
              AND ($2::DATE IS NULL OR date_vente <= $2)
            "#,
        )
        .bind(periode.date_debut)
        .bind(periode.date_fin)
        .fetch_one(&self.db)
        .await?;

        Ok(ChiffreAffaires { chiffre_affaires })
    }

    /// Get global sales statistics
    pub async fn get_statistics(&self) -> AppResult<VenteStatistics> {
        let totals = sqlx::query_as::<_, (Decimal, Decimal)>(
            "SELECT COALESCE(SUM(montant_total), 0), COALESCE(SUM(quantite), 0) FROM ventes",
        )
        .fetch_one(&self.db)
        .await?;

        let evolution_mensuelle = sqlx::query_as::<_, EvolutionMensuelle>(
            r#"
            SELECT EXTRACT(YEAR FROM date_vente)::INT AS annee,
                   EXTRACT(MONTH FROM date_vente)::INT AS mois,
                   SUM(montant_total) AS chiffre_affaires,
                   SUM(quantite) AS quantite_vendue
            FROM ventes
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let top_clients = sqlx::query_as::<_, TopClient>(
            r#"
            SELECT client,
                   SUM(montant_total) AS total_achats,
                   COUNT(*) AS nombre_achats,
                   SUM(quantite) AS quantite_totale
            FROM ventes
            GROUP BY client
            ORDER BY total_achats DESC
            LIMIT 5
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(VenteStatistics {
            chiffre_affaires_total: totals.0,
            prix_moyen_kg: ledger::prix_moyen_kg(totals.0, totals.1),
            evolution_mensuelle,
            top_clients,
        })
    }

    fn validate_fields(
        &self,
        client: &str,
        quantite: Decimal,
        prix_unitaire: Decimal,
        date_vente: NaiveDate,
    ) -> AppResult<()> {
        if client.trim().is_empty() {
            return Err(AppError::Validation {
                field: "client".to_string(),
                message: "Client name cannot be empty".to_string(),
                message_fr: "Le nom du client ne peut pas être vide".to_string(),
            });
        }

        validation::validate_quantite_vente(quantite).map_err(|msg| AppError::Validation {
            field: "quantite".to_string(),
            message: msg.to_string(),
            message_fr: "La quantité vendue doit être supérieure à zéro".to_string(),
        })?;

        validation::validate_prix_unitaire(prix_unitaire).map_err(|msg| AppError::Validation {
            field: "prix_unitaire".to_string(),
            message: msg.to_string(),
            message_fr: "Le prix unitaire doit être supérieur à zéro".to_string(),
        })?;

        validation::validate_date_not_future(date_vente, Utc::now().date_naive()).map_err(
            |msg| AppError::Validation {
                field: "date_vente".to_string(),
                message: msg.to_string(),
                message_fr: "La date de vente ne peut pas être dans le futur".to_string(),
            },
        )?;

        Ok(())
    }
}
