//! Orders

pub mod errors;
pub mod ledger;
pub mod models;
mod repository;
pub mod service;

pub use errors::{LedgerError, OrdersServiceError};
pub use ledger::*;
pub use repository::PgOrderLedger;
pub use service::*;
