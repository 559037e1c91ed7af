//! Promotions

mod errors;
pub mod models;
mod repository;
pub mod service;
pub mod store;

pub use errors::PromotionsServiceError;
pub use repository::PgPromotionStore;
pub use service::*;
pub use store::*;
