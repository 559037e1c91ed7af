//! Identity middleware.

use salvo::prelude::*;
use tracing::Span;

use checkout_app::domain::identity::{IdentityError, IdentityProvider};

use crate::{extensions::*, identity::HeaderIdentity};

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let actor = match HeaderIdentity::new(req.headers()).current_actor() {
        Ok(actor) => actor,
        Err(IdentityError::Missing) => {
            res.render(
                StatusError::unauthorized().brief("Send an x-user-id or x-session-token header"),
            );

            return;
        }
        Err(error) => {
            res.render(StatusError::bad_request().brief(error.to_string()));

            return;
        }
    };

    Span::current().record("actor", tracing::field::display(&actor));

    depot.insert_actor(actor);

    ctrl.call_next(req, depot, res).await;
}
