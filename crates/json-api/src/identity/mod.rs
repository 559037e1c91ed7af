//! Shopper identity from request headers.

pub(crate) mod middleware;

use salvo::http::HeaderMap;

use checkout_app::domain::identity::{
    Actor, IdentityError, IdentityProvider, SessionToken, UserUuid,
};

/// Trusted header set by the upstream authentication proxy.
pub(crate) const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying a guest session token.
pub(crate) const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Reads the actor from request headers; a user id wins over a session token.
#[derive(Debug)]
pub(crate) struct HeaderIdentity<'a> {
    headers: &'a HeaderMap,
}

impl<'a> HeaderIdentity<'a> {
    pub(crate) fn new(headers: &'a HeaderMap) -> Self {
        Self { headers }
    }

    fn header(&self, name: &str) -> Option<&'a str> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

impl IdentityProvider for HeaderIdentity<'_> {
    fn current_actor(&self) -> Result<Actor, IdentityError> {
        if let Some(user) = self.header(USER_ID_HEADER) {
            return user
                .parse::<UserUuid>()
                .map(Actor::Authenticated)
                .map_err(IdentityError::InvalidUser);
        }

        let session = self
            .header(SESSION_TOKEN_HEADER)
            .ok_or(IdentityError::Missing)?;

        Ok(Actor::Anonymous(SessionToken::parse(session)?))
    }
}
