//! Catalog
//!
//! Read-only view of the product catalog as checkout needs it.

pub mod errors;
pub mod gateway;
pub mod models;
mod repository;

pub use errors::CatalogError;
pub use gateway::*;
pub use repository::PgCatalogGateway;
