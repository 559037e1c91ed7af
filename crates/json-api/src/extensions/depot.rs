//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};

use checkout_app::domain::{carts::models::CartOwner, identity::Actor};

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_actor(&mut self, actor: Actor);

    fn actor_or_401(&self) -> Result<&Actor, StatusError>;

    /// Cart owner for the current actor.
    fn owner_or_401(&self) -> Result<CartOwner, StatusError> {
        self.actor_or_401().map(|actor| CartOwner::from(actor.clone()))
    }
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_actor(&mut self, actor: Actor) {
        self.inject(actor);
    }

    fn actor_or_401(&self) -> Result<&Actor, StatusError> {
        self.obtain::<Actor>()
            .map_err(|_ignored| StatusError::unauthorized().brief("No shopper identity"))
    }
}
