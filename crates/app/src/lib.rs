//! Checkout services, storage and wiring.

pub mod codes;
pub mod context;
pub mod database;
pub mod domain;
pub mod errors;
pub mod memory;

#[cfg(test)]
mod test;

pub mod uuids;
