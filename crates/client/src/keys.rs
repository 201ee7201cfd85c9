//! Persistent storage keys.

use vtu_dashboard_core::UserId;

/// Key holding the encrypted session blob.
pub const SESSION: &str = "user";

/// Prefix of per-user cart snapshot keys.
pub const CART_PREFIX: &str = "cartItems_storage_";

/// Prefix of per-user wishlist snapshot keys.
pub const WISHLIST_PREFIX: &str = "wishlistItems_storage_";

/// Cart snapshot key for a user (`cartItems_storage_<id>`).
#[must_use]
pub fn cart(user_id: &UserId) -> String {
    format!("{CART_PREFIX}{user_id}")
}

/// Wishlist snapshot key for a user (`wishlistItems_storage_<id>`).
#[must_use]
pub fn wishlist(user_id: &UserId) -> String {
    format!("{WISHLIST_PREFIX}{user_id}")
}
