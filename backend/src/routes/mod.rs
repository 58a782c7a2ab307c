//! Route definitions for the Palm Plantation Management Platform

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Plantation management
        .nest("/plantations", plantation_routes())
        // Field operations
        .nest("/operations", operation_routes())
        // Harvest productions and stock
        .nest("/productions", production_routes())
        // Sales
        .nest("/ventes", vente_routes())
        // Cash book
        .nest("/mouvements-caisse", caisse_routes())
        // Cross-entity reports and exports
        .nest("/reports", reporting_routes())
}

/// Plantation management routes
fn plantation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_plantations).post(handlers::create_plantation),
        )
        .route(
            "/:plantation_id",
            get(handlers::get_plantation)
                .put(handlers::update_plantation)
                .delete(handlers::delete_plantation),
        )
        .route(
            "/:plantation_id/statistiques",
            get(handlers::get_plantation_statistics),
        )
}

/// Field operation routes
fn operation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_operations).post(handlers::create_operation),
        )
        .route(
            "/:operation_id",
            get(handlers::get_operation)
                .put(handlers::update_operation)
                .delete(handlers::delete_operation),
        )
}

/// Harvest production routes
fn production_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_productions).post(handlers::create_production),
        )
        .route("/statistiques", get(handlers::get_production_statistics))
        .route("/alertes-stock", get(handlers::get_stock_alerts))
        .route(
            "/:production_id",
            get(handlers::get_production)
                .put(handlers::update_production)
                .delete(handlers::delete_production),
        )
}

/// Sale routes
fn vente_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_ventes).post(handlers::create_vente))
        .route("/chiffre-affaires", get(handlers::get_chiffre_affaires))
        .route("/statistiques", get(handlers::get_vente_statistics))
        .route(
            "/:vente_id",
            get(handlers::get_vente)
                .put(handlers::update_vente)
                .delete(handlers::delete_vente),
        )
}

/// Cash book routes
fn caisse_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_mouvements).post(handlers::create_mouvement),
        )
        .route("/bilan", get(handlers::get_bilan))
        .route("/serie", get(handlers::get_serie))
        .route(
            "/:mouvement_id",
            get(handlers::get_mouvement)
                .put(handlers::update_mouvement)
                .delete(handlers::delete_mouvement),
        )
}

/// Reporting routes
fn reporting_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/ventes/export", get(handlers::export_ventes))
        .route("/mouvements-caisse/export", get(handlers::export_mouvements))
}
