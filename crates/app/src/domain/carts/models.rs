//! Cart Models

use std::fmt::{self, Display, Formatter};

use checkout::PromotionCode;
use jiff::Timestamp;
use serde::Serialize;

use crate::{
    domain::{
        catalog::models::ProductUuid,
        identity::{Actor, SessionToken, UserUuid},
    },
    uuids::TypedUuid,
};

/// Marker for cart identifiers.
#[derive(Debug)]
pub struct CartRecord;

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Who a cart belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CartOwner {
    /// A signed-in user; the cart is durable.
    User(UserUuid),

    /// A guest session; the cart lives as long as the server process.
    Guest(SessionToken),
}

impl CartOwner {
    /// Stable storage key for the owner.
    pub fn key(&self) -> String {
        match self {
            Self::User(user) => format!("user:{user}"),
            Self::Guest(session) => format!("guest:{}", session.as_str()),
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest(_))
    }

    /// The owning user, if any.
    pub fn user(&self) -> Option<UserUuid> {
        match self {
            Self::User(user) => Some(*user),
            Self::Guest(_) => None,
        }
    }
}

impl From<Actor> for CartOwner {
    fn from(actor: Actor) -> Self {
        match actor {
            Actor::Authenticated(user) => Self::User(user),
            Actor::Anonymous(session) => Self::Guest(session),
        }
    }
}

impl Display for CartOwner {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(user) => write!(f, "user:{user}"),
            Self::Guest(_) => f.write_str("guest"),
        }
    }
}

/// One product and the quantity wanted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    pub added_at: Timestamp,
}

/// A shopper's cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    /// Absent until the first line is added.
    pub uuid: Option<CartUuid>,
    pub owner: CartOwner,
    pub lines: Vec<CartLine>,
    pub promotion_code: Option<PromotionCode>,
}

impl Cart {
    /// A cart with nothing in it.
    pub fn empty(owner: CartOwner) -> Self {
        Self {
            uuid: None,
            owner,
            lines: Vec::new(),
            promotion_code: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, product: ProductUuid) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_uuid == product)
    }
}
