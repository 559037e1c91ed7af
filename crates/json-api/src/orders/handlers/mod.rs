//! Order Handlers

pub(crate) mod create;
pub(crate) mod find_by_number;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod list_all;
pub(crate) mod update_payment_status;
pub(crate) mod update_status;
