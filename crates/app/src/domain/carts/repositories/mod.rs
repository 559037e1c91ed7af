//! Cart Repositories

mod carts;

pub use carts::PgCartStore;
