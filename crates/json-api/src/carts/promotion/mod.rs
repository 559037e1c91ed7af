//! Cart Promotion

pub(crate) mod handlers;
