//! Carts

pub mod errors;
mod memory;
pub mod models;
mod repositories;
pub mod service;
pub mod store;

pub use errors::CartsServiceError;
pub use memory::MemoryCartStore;
pub use repositories::PgCartStore;
pub use service::*;
pub use store::*;
