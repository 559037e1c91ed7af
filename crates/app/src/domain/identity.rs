//! Shopper identity
//!
//! Authentication happens elsewhere; this module only names who is acting.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::uuids::TypedUuid;

/// Marker for user identifiers.
#[derive(Debug)]
pub struct UserRecord;

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;

const MAX_SESSION_TOKEN_LENGTH: usize = 128;

/// Opaque token identifying an anonymous browsing session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionToken(String);

/// A session token that cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidSessionToken {
    #[error("session token is empty")]
    Empty,

    #[error("session token is too long")]
    TooLong,

    #[error("session token contains invalid characters")]
    InvalidCharacter,
}

impl SessionToken {
    /// Validates a raw session token.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSessionToken`] for blank, overlong or non-printable tokens.
    pub fn parse(raw: &str) -> Result<Self, InvalidSessionToken> {
        let raw = raw.trim();

        if raw.is_empty() {
            return Err(InvalidSessionToken::Empty);
        }

        if raw.len() > MAX_SESSION_TOKEN_LENGTH {
            return Err(InvalidSessionToken::TooLong);
        }

        if !raw.chars().all(|c| c.is_ascii_graphic()) {
            return Err(InvalidSessionToken::InvalidCharacter);
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionToken {
    type Error = InvalidSessionToken;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SessionToken> for String {
    fn from(token: SessionToken) -> Self {
        token.0
    }
}

/// Whoever is making the current request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Actor {
    /// A signed-in user.
    Authenticated(UserUuid),

    /// A guest identified only by a session.
    Anonymous(SessionToken),
}

impl Actor {
    /// The signed-in user, if any.
    pub fn user(&self) -> Option<UserUuid> {
        match self {
            Self::Authenticated(user) => Some(*user),
            Self::Anonymous(_) => None,
        }
    }
}

impl Display for Actor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticated(user) => write!(f, "user:{user}"),
            Self::Anonymous(_) => f.write_str("guest"),
        }
    }
}

/// Failure to establish who is acting.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no user or session supplied")]
    Missing,

    #[error("invalid user id")]
    InvalidUser(#[source] uuid::Error),

    #[error("invalid session token")]
    InvalidSession(#[from] InvalidSessionToken),
}

/// Source of the current [`Actor`].
pub trait IdentityProvider {
    /// Resolves the actor behind the current request.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when no usable identity is present.
    fn current_actor(&self) -> Result<Actor, IdentityError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_tokens_are_trimmed() {
        assert_eq!(
            SessionToken::parse(" abc-123 ").map(|t| t.as_str().to_string()),
            Ok("abc-123".to_string())
        );
    }

    #[test]
    fn blank_session_tokens_are_rejected() {
        assert_eq!(SessionToken::parse("  "), Err(InvalidSessionToken::Empty));
        assert_eq!(
            SessionToken::parse("a\u{7}b"),
            Err(InvalidSessionToken::InvalidCharacter)
        );
    }

    #[test]
    fn guest_display_does_not_leak_the_token() -> Result<(), InvalidSessionToken> {
        let actor = Actor::Anonymous(SessionToken::parse("secret")?);

        assert_eq!(actor.to_string(), "guest");
        assert_eq!(actor.user(), None);

        Ok(())
    }
}
