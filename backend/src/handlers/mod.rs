//! HTTP handlers for the palm plantation management API

pub mod caisse;
pub mod health;
pub mod operation;
pub mod plantation;
pub mod production;
pub mod reporting;
pub mod vente;

pub use caisse::*;
pub use health::*;
pub use operation::*;
pub use plantation::*;
pub use production::*;
pub use reporting::*;
pub use vente::*;
