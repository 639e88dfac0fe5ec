//! Domain model.
//!
//! # Responsibilities
//! - Define the entity shapes (User, Product, Order) and their JSON layout
//! - Define create drafts and partial-update patches per entity
//! - Provide the seed data every store starts from
//!
//! # Design Decisions
//! - Field names are camelCase on the wire to match the existing frontend
//! - Drafts carry no id/timestamps; patches are all-optional structs
//! - `Record` ties an entity to its draft/patch types so the store and the
//!   facade stay generic over entity kind

pub mod envelope;
pub mod order;
pub mod product;
pub mod user;

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use envelope::{Deleted, Envelope};
pub use order::{NewOrder, Order, OrderLineItem, OrderPatch, OrderStatus};
pub use product::{NewProduct, Product, ProductPatch};
pub use user::{NewUser, User, UserPatch};

/// Wall-clock timestamp, serialized as RFC 3339.
pub type Timestamp = DateTime<Utc>;

/// Entity kinds served by the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Product,
    Order,
}

impl EntityKind {
    /// Collection segment used in request paths (`/users`, `/products`, ...).
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Product => "products",
            EntityKind::Order => "orders",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Product => "product",
            EntityKind::Order => "order",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity the store can hold and the facade can serve.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Fields supplied by the caller on create.
    type Draft: Send + 'static;
    /// Partial update; `None` fields are preserved.
    type Patch: Send + 'static;

    const KIND: EntityKind;

    fn id(&self) -> u64;

    /// Build a fresh record with `createdAt == updatedAt == now`.
    fn from_draft(id: u64, draft: Self::Draft, now: Timestamp) -> Self;

    /// Merge a patch over this record. Timestamps are left alone.
    fn apply_patch(&mut self, patch: Self::Patch);

    fn updated_at(&self) -> Timestamp;

    fn set_updated_at(&mut self, at: Timestamp);

    /// Reject drafts the entity cannot hold.
    fn validate_draft(_draft: &Self::Draft) -> Result<(), String> {
        Ok(())
    }

    /// Reject patches the entity cannot hold.
    fn validate_patch(_patch: &Self::Patch) -> Result<(), String> {
        Ok(())
    }

    /// The mock dataset this entity starts with.
    fn seed() -> Vec<Self>;

    /// Bump `updatedAt` to `now`, never moving it backwards.
    fn touch(&mut self, now: Timestamp) {
        let at = now.max(self.updated_at());
        self.set_updated_at(at);
    }
}

/// Midnight UTC on the given date; used for seed timestamps.
pub(crate) fn seed_date(year: i32, month: u32, day: u32) -> Timestamp {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Prices must be finite and non-negative.
pub(crate) fn check_price(price: f64) -> Result<(), String> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(format!("price must be a non-negative amount, got {price}"))
    }
}

/// Round a money amount to whole cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
