//! Business logic services for the Palm Plantation Management Platform

pub mod caisse;
pub mod operation;
pub mod plantation;
pub mod production;
pub mod reporting;
pub mod vente;

pub use caisse::CaisseService;
pub use operation::OperationService;
pub use plantation::PlantationService;
pub use production::ProductionService;
pub use reporting::ReportingService;
pub use vente::VenteService;
