//! Core types for the VTU dashboard.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod session;
pub mod slip;
pub mod snapshot;
pub mod wishlist;

pub use cart::CartSnapshot;
pub use id::*;
pub use price::{floor_to_cents, format_amount};
pub use product::{ProductCatalog, ProductRecord};
pub use session::{Account, Role, SessionShapeError, UserSession};
pub use slip::{SlipKind, SlipPayload};
pub use snapshot::{DEFAULT_SNAPSHOT_TTL_MS, Stamped};
pub use wishlist::WishlistSnapshot;
