//! Shared types and domain rules for the Palm Plantation Management Platform
//!
//! This crate contains the pure, database-free part of the domain: the
//! operation/movement/quality enumerations, the stock and cash ledger
//! arithmetic, and the field validation rules used by the backend.

pub mod ledger;
pub mod types;
pub mod validation;

pub use ledger::*;
pub use types::*;
pub use validation::*;
