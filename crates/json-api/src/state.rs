//! State

use std::sync::Arc;

use checkout_app::context::AppContext;
use rusty_money::iso::{self, Currency};

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
    pub(crate) currency: &'static Currency,
    operator_token: Option<String>,
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("currency", &self.currency.iso_alpha_code)
            .finish_non_exhaustive()
    }
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext) -> Self {
        Self {
            app,
            currency: iso::KES,
            operator_token: None,
        }
    }

    #[must_use]
    pub(crate) fn with_currency(mut self, currency: &'static Currency) -> Self {
        self.currency = currency;
        self
    }

    #[must_use]
    pub(crate) fn with_operator_token(mut self, token: Option<String>) -> Self {
        self.operator_token = token.filter(|token| !token.trim().is_empty());
        self
    }

    /// Configured operator token; operator routes are refused without one.
    pub(crate) fn operator_token(&self) -> Option<&str> {
        self.operator_token.as_deref()
    }

    #[must_use]
    pub(crate) fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}
