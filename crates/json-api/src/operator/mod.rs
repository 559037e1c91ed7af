//! Operator access.

pub(crate) mod middleware;
