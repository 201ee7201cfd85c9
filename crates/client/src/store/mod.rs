//! Client state store.
//!
//! Holds the signed-in user, the cart, the wishlist and the transient
//! verification slips for one dashboard instance (one browser tab, one CLI
//! invocation). Cart and wishlist are mirrored to per-user storage keys with
//! a timestamp and discarded once older than the snapshot TTL.
//!
//! # Lifecycle
//!
//! 1. [`ClientStateStore::new`] starts in the loading state.
//! 2. [`ClientStateStore::initialize`] restores the session from the `user`
//!    key (a corrupt blob is removed), then loads the user's snapshots.
//! 3. Mutators update state, write through to storage and notify
//!    subscribers.
//! 4. [`ClientStateStore::teardown`] clears everything held in memory.
//!
//! Storage failures never escape the store: they are logged and the
//! affected data is treated as absent.

mod view;

pub use view::{StateView, SubscriptionId};

use rust_decimal::Decimal;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use vtu_dashboard_core::{
    CartSnapshot, DEFAULT_SNAPSHOT_TTL_MS, ProductCatalog, ProductId, SlipKind, SlipPayload,
    Stamped, UserSession, WishlistSnapshot,
};

use crate::clock::{Clock, SystemClock};
use crate::codec::SessionCodec;
use crate::keys;
use crate::storage::KeyValueStorage;
use view::Listeners;

/// Errors returned by store operations that validate their input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A cart quantity below zero was requested.
    #[error("cart quantity cannot be negative (got {quantity})")]
    NegativeQuantity {
        /// The rejected quantity.
        quantity: i64,
    },

    /// A cart quantity above the supported maximum was requested.
    #[error("cart quantity is too large (got {quantity})")]
    QuantityTooLarge {
        /// The rejected quantity.
        quantity: i64,
    },
}

/// Result of [`ClientStateStore::add_to_cart`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum CartUpdate {
    /// The cart was updated; `quantity` is the product's new quantity.
    Applied { quantity: u32 },
    /// No user is signed in; nothing changed.
    SignInRequired,
}

/// Result of [`ClientStateStore::toggle_wishlist`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum WishlistUpdate {
    /// The product was added.
    Added,
    /// The product was removed.
    Removed,
    /// No user is signed in; nothing changed.
    SignInRequired,
}

impl WishlistUpdate {
    /// Whether the wishlist changed.
    #[must_use]
    pub const fn applied(self) -> bool {
        !matches!(self, Self::SignInRequired)
    }
}

/// Client-side session, cart, wishlist and slip state.
#[derive(Debug)]
pub struct ClientStateStore<S: KeyValueStorage, C: Clock = SystemClock> {
    storage: S,
    codec: SessionCodec,
    clock: C,
    snapshot_ttl_ms: i64,
    current_user: Option<UserSession>,
    auth_loading: bool,
    cart: CartSnapshot,
    wishlist: WishlistSnapshot,
    bvn_slip: Option<SlipPayload>,
    nin_slip: Option<SlipPayload>,
    listeners: Listeners,
}

impl<S: KeyValueStorage, C: Clock> ClientStateStore<S, C> {
    /// Create a store in the loading state. Call
    /// [`initialize`](Self::initialize) to restore the session.
    pub fn new(storage: S, codec: SessionCodec, clock: C) -> Self {
        Self {
            storage,
            codec,
            clock,
            snapshot_ttl_ms: DEFAULT_SNAPSHOT_TTL_MS,
            current_user: None,
            auth_loading: true,
            cart: CartSnapshot::new(),
            wishlist: WishlistSnapshot::new(),
            bvn_slip: None,
            nin_slip: None,
            listeners: Listeners::default(),
        }
    }

    /// Create a store and restore the session from storage.
    pub fn open(storage: S, codec: SessionCodec, clock: C) -> Self {
        let mut store = Self::new(storage, codec, clock);
        store.initialize();
        store
    }

    /// Override how long persisted cart and wishlist snapshots stay valid.
    ///
    /// On a store that has already initialized, the current user's
    /// snapshots are re-read under the new lifetime.
    #[must_use]
    pub fn with_snapshot_ttl(mut self, ttl_ms: i64) -> Self {
        self.snapshot_ttl_ms = ttl_ms;
        if !self.auth_loading {
            self.rehydrate();
            self.notify();
        }
        self
    }

    /// Restore the session from storage and load the user's snapshots.
    ///
    /// Runs once; later calls do nothing. The loading phase always ends,
    /// whether or not a valid session was found.
    #[instrument(skip(self))]
    pub fn initialize(&mut self) {
        if !self.auth_loading {
            return;
        }

        self.current_user = self.load_session();
        self.auth_loading = false;
        self.rehydrate();
        self.notify();
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Set the signed-in user and load their cart and wishlist.
    ///
    /// Performs no network or session persistence; call
    /// [`persist_session`](Self::persist_session) to store the session.
    #[instrument(skip_all, fields(user_id = %session.id, role = %session.role()))]
    pub fn sign_in(&mut self, session: UserSession) {
        tracing::info!("User signed in");
        self.current_user = Some(session);
        self.rehydrate();
        self.notify();
    }

    /// Encrypt the current session and store it under the session key.
    ///
    /// Returns `false` if no user is signed in or the blob could not be
    /// encoded or written.
    pub fn persist_session(&self) -> bool {
        let Some(session) = &self.current_user else {
            return false;
        };
        let Some(blob) = self.codec.encode_as(session) else {
            tracing::warn!(user_id = %session.id, "Failed to encode session");
            return false;
        };
        match self.storage.set_item(keys::SESSION, &blob) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist session");
                false
            }
        }
    }

    /// Sign out: clear the user, cart and wishlist and remove the stored
    /// session. The user's persisted snapshots are kept for their next
    /// sign-in.
    #[instrument(skip(self))]
    pub fn sign_out(&mut self) {
        if let Some(session) = &self.current_user {
            tracing::info!(user_id = %session.id, "User signed out");
        }
        self.current_user = None;
        self.remove_quietly(keys::SESSION);
        self.rehydrate();
        self.notify();
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn current_user(&self) -> Option<&UserSession> {
        self.current_user.as_ref()
    }

    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    /// Whether the initial session restore is still pending.
    #[must_use]
    pub const fn auth_loading(&self) -> bool {
        self.auth_loading
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add one unit of a product to the cart.
    ///
    /// Without a signed-in user nothing changes and `SignInRequired` is
    /// returned; redirecting to sign-in is the caller's job.
    pub fn add_to_cart(&mut self, id: &ProductId) -> CartUpdate {
        if !self.is_authenticated() {
            tracing::debug!(product_id = %id, "Add to cart requires sign-in");
            return CartUpdate::SignInRequired;
        }
        let quantity = self.cart.increment(id);
        self.persist_cart();
        self.notify();
        CartUpdate::Applied { quantity }
    }

    /// Set a product's quantity. Zero removes the product.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NegativeQuantity` for negative quantities and
    /// `StoreError::QuantityTooLarge` above `u32::MAX`; the cart is left
    /// unchanged in both cases.
    pub fn set_cart_quantity(&mut self, id: &ProductId, quantity: i64) -> Result<(), StoreError> {
        if quantity < 0 {
            return Err(StoreError::NegativeQuantity { quantity });
        }
        let quantity =
            u32::try_from(quantity).map_err(|_| StoreError::QuantityTooLarge { quantity })?;

        self.cart.set_quantity(id, quantity);
        self.persist_cart();
        self.notify();
        Ok(())
    }

    /// Remove a product from the cart. Returns `true` if it was present.
    pub fn remove_from_cart(&mut self, id: &ProductId) -> bool {
        let removed = self.cart.remove(id);
        if removed {
            self.persist_cart();
            self.notify();
        }
        removed
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.persist_cart();
        self.notify();
    }

    /// The cart.
    #[must_use]
    pub const fn cart(&self) -> &CartSnapshot {
        &self.cart
    }

    /// Total units in the cart.
    #[must_use]
    pub fn cart_count(&self) -> u64 {
        self.cart.count()
    }

    /// Cart total floored to cents; products the catalog can't price
    /// contribute nothing.
    #[must_use]
    pub fn cart_amount<P: ProductCatalog + ?Sized>(&self, catalog: &P) -> Decimal {
        self.cart.amount(catalog)
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Add the product to the wishlist, or remove it if already there.
    ///
    /// Without a signed-in user nothing changes and `SignInRequired` is
    /// returned.
    pub fn toggle_wishlist(&mut self, id: &ProductId) -> WishlistUpdate {
        if !self.is_authenticated() {
            tracing::debug!(product_id = %id, "Wishlist requires sign-in");
            return WishlistUpdate::SignInRequired;
        }
        let added = self.wishlist.toggle(id);
        self.persist_wishlist();
        self.notify();
        if added {
            WishlistUpdate::Added
        } else {
            WishlistUpdate::Removed
        }
    }

    /// The wishlist.
    #[must_use]
    pub const fn wishlist(&self) -> &WishlistSnapshot {
        &self.wishlist
    }

    /// Whether the product is wishlisted.
    #[must_use]
    pub fn is_in_wishlist(&self, id: &ProductId) -> bool {
        self.wishlist.contains(id)
    }

    /// Number of wishlisted products.
    #[must_use]
    pub fn wishlist_count(&self) -> usize {
        self.wishlist.len()
    }

    // =========================================================================
    // Verification slips
    // =========================================================================

    /// Hand a BVN verification result to the print preview.
    pub fn set_bvn_slip(&mut self, data: Value, slip_type: impl Into<String>) {
        let slip = SlipPayload::new(data, slip_type);
        tracing::debug!(kind = %SlipKind::Bvn, layout = %slip.layout, "Slip ready");
        self.bvn_slip = Some(slip);
        self.notify();
    }

    /// Drop the BVN slip.
    pub fn clear_bvn_slip(&mut self) {
        if self.bvn_slip.take().is_some() {
            self.notify();
        }
    }

    /// The pending BVN slip.
    #[must_use]
    pub const fn bvn_slip(&self) -> Option<&SlipPayload> {
        self.bvn_slip.as_ref()
    }

    /// Hand a NIN verification result to the print preview.
    pub fn set_nin_slip(&mut self, data: Value, layout: impl Into<String>) {
        let slip = SlipPayload::new(data, layout);
        tracing::debug!(kind = %SlipKind::Nin, layout = %slip.layout, "Slip ready");
        self.nin_slip = Some(slip);
        self.notify();
    }

    /// Drop the NIN slip.
    pub fn clear_nin_slip(&mut self) {
        if self.nin_slip.take().is_some() {
            self.notify();
        }
    }

    /// The pending NIN slip.
    #[must_use]
    pub const fn nin_slip(&self) -> Option<&SlipPayload> {
        self.nin_slip.as_ref()
    }

    /// The pending slip of the given kind.
    #[must_use]
    pub const fn slip(&self, kind: SlipKind) -> Option<&SlipPayload> {
        match kind {
            SlipKind::Bvn => self.bvn_slip.as_ref(),
            SlipKind::Nin => self.nin_slip.as_ref(),
        }
    }

    // =========================================================================
    // Views and subscriptions
    // =========================================================================

    /// Borrow the current state.
    #[must_use]
    pub const fn view(&self) -> StateView<'_> {
        StateView {
            current_user: self.current_user.as_ref(),
            auth_loading: self.auth_loading,
            cart: &self.cart,
            wishlist: &self.wishlist,
            bvn_slip: self.bvn_slip.as_ref(),
            nin_slip: self.nin_slip.as_ref(),
        }
    }

    /// Register a listener called with the new state after every change.
    pub fn subscribe(&mut self, listener: impl FnMut(&StateView<'_>) + 'static) -> SubscriptionId {
        self.listeners.add(Box::new(listener))
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Clear all in-memory state and listeners. Storage is not touched.
    pub fn teardown(&mut self) {
        self.current_user = None;
        self.auth_loading = false;
        self.cart.clear();
        self.wishlist.clear();
        self.bvn_slip = None;
        self.nin_slip = None;
        self.listeners.clear();
    }

    /// The storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    fn load_session(&self) -> Option<UserSession> {
        let blob = match self.storage.get_item(keys::SESSION) {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored session");
                return None;
            }
        };

        if let Some(session) = self.codec.decode_as::<UserSession>(&blob) {
            tracing::info!(user_id = %session.id, role = %session.role(), "Session restored");
            Some(session)
        } else {
            tracing::warn!("Stored session is corrupt, discarding");
            self.remove_quietly(keys::SESSION);
            None
        }
    }

    /// Re-derive cart and wishlist for the current user.
    fn rehydrate(&mut self) {
        let Some(user_id) = self.current_user.as_ref().map(|session| session.id.clone()) else {
            self.cart.clear();
            self.wishlist.clear();
            return;
        };

        self.cart = self
            .load_snapshot::<CartSnapshot>(&keys::cart(&user_id))
            .map(CartSnapshot::normalized)
            .unwrap_or_default();
        self.wishlist = self
            .load_snapshot::<WishlistSnapshot>(&keys::wishlist(&user_id))
            .map(WishlistSnapshot::normalized)
            .unwrap_or_default();

        tracing::debug!(
            user_id = %user_id,
            cart_items = self.cart.len(),
            wishlist_items = self.wishlist.len(),
            "Snapshots loaded"
        );
    }

    fn load_snapshot<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.storage.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read snapshot");
                return None;
            }
        };

        let stamped: Stamped<T> = match serde_json::from_str(&raw) {
            Ok(stamped) => stamped,
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding malformed snapshot");
                self.remove_quietly(key);
                return None;
            }
        };

        if stamped.is_expired(self.clock.now_ms(), self.snapshot_ttl_ms) {
            tracing::debug!(key, timestamp = stamped.timestamp, "Discarding expired snapshot");
            self.remove_quietly(key);
            return None;
        }

        Some(stamped.into_data())
    }

    fn persist_cart(&self) {
        if let Some(session) = &self.current_user {
            self.write_snapshot(&keys::cart(&session.id), &self.cart);
        }
    }

    fn persist_wishlist(&self) {
        if let Some(session) = &self.current_user {
            self.write_snapshot(&keys::wishlist(&session.id), &self.wishlist);
        }
    }

    fn write_snapshot<T: Serialize>(&self, key: &str, data: &T) {
        let stamped = Stamped::new(data, self.clock.now_ms());
        let result = serde_json::to_string(&stamped)
            .map_err(crate::storage::StorageError::from)
            .and_then(|raw| self.storage.set_item(key, &raw));
        if let Err(e) = result {
            tracing::warn!(key, error = %e, "Failed to persist snapshot");
        }
    }

    fn remove_quietly(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            tracing::warn!(key, error = %e, "Failed to remove storage key");
        }
    }

    fn notify(&mut self) {
        let view = StateView {
            current_user: self.current_user.as_ref(),
            auth_loading: self.auth_loading,
            cart: &self.cart,
            wishlist: &self.wishlist,
            bvn_slip: self.bvn_slip.as_ref(),
            nin_slip: self.nin_slip.as_ref(),
        };
        self.listeners.notify(&view);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use secrecy::SecretString;
    use serde_json::json;
    use vtu_dashboard_core::UserId;

    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStorage;

    const NOW: i64 = 1_760_600_000_000;
    const MINUTE_MS: i64 = 60 * 1000;
    const HOUR_MS: i64 = 60 * MINUTE_MS;

    fn codec() -> SessionCodec {
        SessionCodec::new(&SecretString::from("Qm7#tX2!vN9@kL4$pR8%wZ3^hJ6&bF1*")).unwrap()
    }

    fn pid(id: &str) -> ProductId {
        ProductId::parse(id).unwrap()
    }

    fn session(id: &str) -> UserSession {
        UserSession::user(UserId::parse(id).unwrap())
    }

    fn open_store(storage: &MemoryStorage, clock: &FixedClock) -> ClientStateStore<MemoryStorage, FixedClock> {
        ClientStateStore::open(storage.clone(), codec(), clock.clone())
    }

    fn signed_in_store(
        id: &str,
    ) -> (ClientStateStore<MemoryStorage, FixedClock>, MemoryStorage, FixedClock) {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(NOW);
        let mut store = open_store(&storage, &clock);
        store.sign_in(session(id));
        (store, storage, clock)
    }

    fn stored_snapshot(storage: &MemoryStorage, key: &str, data: &Value, timestamp: i64) {
        let raw = json!({"data": data, "timestamp": timestamp}).to_string();
        storage.set_item(key, &raw).unwrap();
    }

    // -------------------------------------------------------------------------
    // Initialization
    // -------------------------------------------------------------------------

    #[test]
    fn test_new_store_is_loading() {
        let store = ClientStateStore::new(MemoryStorage::new(), codec(), FixedClock::new(NOW));
        assert!(store.auth_loading());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_initialize_without_session() {
        let store = open_store(&MemoryStorage::new(), &FixedClock::new(NOW));
        assert!(!store.auth_loading());
        assert!(store.current_user().is_none());
    }

    #[test]
    fn test_initialize_restores_session() {
        let storage = MemoryStorage::new();
        let blob = codec().encode(&json!({"id": "u1", "role": "user"})).unwrap();
        storage.set_item(keys::SESSION, &blob).unwrap();

        let store = open_store(&storage, &FixedClock::new(NOW));
        assert!(!store.auth_loading());
        assert_eq!(store.current_user().unwrap().id.as_str(), "u1");
    }

    #[test]
    fn test_initialize_restores_session_with_both_id_keys() {
        let storage = MemoryStorage::new();
        let stored = json!({"_id": "65ab", "id": "65ab", "role": "user", "first_name": null});
        let blob = codec().encode(&stored).unwrap();
        storage.set_item(keys::SESSION, &blob).unwrap();

        let store = open_store(&storage, &FixedClock::new(NOW));
        assert_eq!(store.current_user().unwrap().id.as_str(), "65ab");
        assert!(storage.get_item(keys::SESSION).unwrap().is_some());

        assert!(store.persist_session());
        let blob = storage.get_item(keys::SESSION).unwrap().unwrap();
        assert_eq!(codec().decode(&blob), Some(stored));
    }

    #[test]
    fn test_initialize_discards_corrupt_session() {
        let storage = MemoryStorage::new();
        storage.set_item(keys::SESSION, "definitely-not-ciphertext").unwrap();

        let store = open_store(&storage, &FixedClock::new(NOW));
        assert!(!store.auth_loading());
        assert!(store.current_user().is_none());
        assert_eq!(storage.get_item(keys::SESSION).unwrap(), None);
    }

    #[test]
    fn test_initialize_discards_session_with_wrong_shape() {
        let storage = MemoryStorage::new();
        let blob = codec().encode(&json!({"id": "u1", "role": "superuser"})).unwrap();
        storage.set_item(keys::SESSION, &blob).unwrap();

        let store = open_store(&storage, &FixedClock::new(NOW));
        assert!(store.current_user().is_none());
        assert_eq!(storage.get_item(keys::SESSION).unwrap(), None);
    }

    #[test]
    fn test_initialize_with_unavailable_storage() {
        let store = open_store(&MemoryStorage::unavailable(), &FixedClock::new(NOW));
        assert!(!store.auth_loading());
        assert!(store.current_user().is_none());
    }

    #[test]
    fn test_initialize_runs_once() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(NOW);
        let mut store = open_store(&storage, &clock);

        let blob = codec().encode(&json!({"id": "late", "role": "user"})).unwrap();
        storage.set_item(keys::SESSION, &blob).unwrap();
        store.initialize();
        assert!(store.current_user().is_none());
    }

    #[test]
    fn test_initialize_loads_snapshots_for_restored_user() {
        let storage = MemoryStorage::new();
        let blob = codec().encode(&json!({"id": "u1", "role": "user"})).unwrap();
        storage.set_item(keys::SESSION, &blob).unwrap();
        stored_snapshot(&storage, "cartItems_storage_u1", &json!({"p1": 2}), NOW - HOUR_MS);
        stored_snapshot(&storage, "wishlistItems_storage_u1", &json!(["p2"]), NOW - HOUR_MS);

        let store = open_store(&storage, &FixedClock::new(NOW));
        assert_eq!(store.cart().quantity(&pid("p1")), 2);
        assert!(store.is_in_wishlist(&pid("p2")));
    }

    // -------------------------------------------------------------------------
    // Authentication
    // -------------------------------------------------------------------------

    #[test]
    fn test_persist_session_round_trips() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(NOW);
        let mut store = open_store(&storage, &clock);
        assert!(!store.persist_session());

        let mut original = session("u5");
        original.email = Some("u5@example.com".to_string());
        store.sign_in(original.clone());
        assert!(store.persist_session());

        let reopened = open_store(&storage, &clock);
        assert_eq!(reopened.current_user(), Some(&original));
    }

    #[test]
    fn test_sign_out_clears_state_and_session_key() {
        let (mut store, storage, _clock) = signed_in_store("u1");
        assert!(store.persist_session());
        let _ = store.add_to_cart(&pid("p1"));
        let _ = store.toggle_wishlist(&pid("p2"));

        store.sign_out();

        assert!(!store.is_authenticated());
        assert!(store.cart().is_empty());
        assert!(store.wishlist().is_empty());
        assert_eq!(storage.get_item(keys::SESSION).unwrap(), None);
        assert!(storage.get_item("cartItems_storage_u1").unwrap().is_some());
    }

    #[test]
    fn test_per_user_isolation() {
        let (mut store, _storage, _clock) = signed_in_store("alice");
        let _ = store.add_to_cart(&pid("x"));
        store.sign_out();

        store.sign_in(session("bob"));
        assert!(store.cart().is_empty());

        store.sign_out();
        store.sign_in(session("alice"));
        assert_eq!(store.cart().quantity(&pid("x")), 1);
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    #[test]
    fn test_add_to_cart_requires_sign_in() {
        let storage = MemoryStorage::new();
        let mut store = open_store(&storage, &FixedClock::new(NOW));

        assert_eq!(store.add_to_cart(&pid("p1")), CartUpdate::SignInRequired);
        assert!(store.cart().is_empty());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_add_to_cart_increments() {
        let (mut store, _storage, _clock) = signed_in_store("u1");
        assert_eq!(store.add_to_cart(&pid("p1")), CartUpdate::Applied { quantity: 1 });
        assert_eq!(store.add_to_cart(&pid("p1")), CartUpdate::Applied { quantity: 2 });
        assert_eq!(store.cart_count(), 2);
    }

    #[test]
    fn test_cart_writes_through_with_timestamp() {
        let (mut store, storage, _clock) = signed_in_store("u1");
        let _ = store.add_to_cart(&pid("p1"));

        let raw = storage.get_item("cartItems_storage_u1").unwrap().unwrap();
        let stored: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, json!({"data": {"p1": 1}, "timestamp": NOW}));
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let (mut store, _storage, _clock) = signed_in_store("u1");
        store.set_cart_quantity(&pid("p1"), 4).unwrap();
        assert_eq!(store.cart().quantity(&pid("p1")), 4);

        store.set_cart_quantity(&pid("p1"), 0).unwrap();
        assert!(!store.cart().contains(&pid("p1")));
    }

    #[test]
    fn test_set_quantity_rejects_negative() {
        let (mut store, _storage, _clock) = signed_in_store("u1");
        store.set_cart_quantity(&pid("p1"), 2).unwrap();

        let err = store.set_cart_quantity(&pid("p1"), -1).unwrap_err();
        assert_eq!(err, StoreError::NegativeQuantity { quantity: -1 });
        assert_eq!(store.cart().quantity(&pid("p1")), 2);
    }

    #[test]
    fn test_set_quantity_rejects_overflow() {
        let (mut store, _storage, _clock) = signed_in_store("u1");
        let too_large = i64::from(u32::MAX) + 1;
        assert_eq!(
            store.set_cart_quantity(&pid("p1"), too_large),
            Err(StoreError::QuantityTooLarge { quantity: too_large })
        );
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_set_quantity_without_user_skips_persistence() {
        let storage = MemoryStorage::new();
        let mut store = open_store(&storage, &FixedClock::new(NOW));
        store.set_cart_quantity(&pid("p1"), 3).unwrap();

        assert_eq!(store.cart().quantity(&pid("p1")), 3);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_cart_amount_truncates_to_cents() {
        let (mut store, _storage, _clock) = signed_in_store("u1");
        store.set_cart_quantity(&pid("a"), 3).unwrap();
        let catalog = HashMap::from([(pid("a"), Decimal::new(19_999, 3))]);

        assert_eq!(store.cart_amount(&catalog), Decimal::new(5_999, 2));
    }

    #[test]
    fn test_remove_and_clear_cart() {
        let (mut store, storage, _clock) = signed_in_store("u1");
        let _ = store.add_to_cart(&pid("a"));
        let _ = store.add_to_cart(&pid("b"));

        assert!(store.remove_from_cart(&pid("a")));
        assert!(!store.remove_from_cart(&pid("a")));

        store.clear_cart();
        assert_eq!(store.cart_count(), 0);
        let raw = storage.get_item("cartItems_storage_u1").unwrap().unwrap();
        assert!(raw.contains("\"data\":{}"));
    }

    #[test]
    fn test_quota_exceeded_keeps_memory_state() {
        let storage = MemoryStorage::with_quota(8);
        let clock = FixedClock::new(NOW);
        let mut store = open_store(&storage, &clock);
        store.sign_in(session("u1"));

        assert_eq!(store.add_to_cart(&pid("p1")), CartUpdate::Applied { quantity: 1 });
        assert_eq!(store.cart().quantity(&pid("p1")), 1);
        assert!(storage.is_empty());
    }

    // -------------------------------------------------------------------------
    // Expiry
    // -------------------------------------------------------------------------

    #[test]
    fn test_snapshot_just_past_expiry_is_discarded() {
        let (mut store, storage, _clock) = signed_in_store("u2");
        let key = "cartItems_storage_u1";
        stored_snapshot(&storage, key, &json!({"p1": 1}), NOW - 24 * HOUR_MS - 1);

        store.sign_in(session("u1"));
        assert!(store.cart().is_empty());
        assert_eq!(storage.get_item(key).unwrap(), None);
    }

    #[test]
    fn test_snapshot_within_window_is_kept() {
        let (mut store, storage, _clock) = signed_in_store("u2");
        stored_snapshot(
            &storage,
            "cartItems_storage_u1",
            &json!({"p1": 1}),
            NOW - (23 * HOUR_MS + 59 * MINUTE_MS),
        );

        store.sign_in(session("u1"));
        assert_eq!(store.cart().quantity(&pid("p1")), 1);
    }

    #[test]
    fn test_expired_wishlist_discarded_on_later_sign_in() {
        let (mut store, storage, clock) = signed_in_store("u1");
        let _ = store.toggle_wishlist(&pid("w1"));
        store.sign_out();

        clock.advance(24 * HOUR_MS);
        store.sign_in(session("u1"));
        assert!(store.wishlist().is_empty());
        assert_eq!(storage.get_item("wishlistItems_storage_u1").unwrap(), None);
    }

    #[test]
    fn test_custom_snapshot_ttl() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(NOW);
        stored_snapshot(&storage, "cartItems_storage_u1", &json!({"p1": 1}), NOW - 2 * HOUR_MS);

        let mut store = ClientStateStore::new(storage, codec(), clock).with_snapshot_ttl(HOUR_MS);
        store.initialize();
        store.sign_in(session("u1"));
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_snapshot_ttl_applies_to_restored_user() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(NOW);
        let blob = codec().encode(&json!({"id": "u1", "role": "user"})).unwrap();
        storage.set_item(keys::SESSION, &blob).unwrap();
        stored_snapshot(&storage, "cartItems_storage_u1", &json!({"p1": 1}), NOW - 2 * HOUR_MS);

        let store = open_store(&storage, &clock);
        assert_eq!(store.cart().quantity(&pid("p1")), 1);

        let store = store.with_snapshot_ttl(HOUR_MS);
        assert!(store.cart().is_empty());
        assert_eq!(storage.get_item("cartItems_storage_u1").unwrap(), None);
    }

    #[test]
    fn test_malformed_snapshot_discarded() {
        let (mut store, storage, _clock) = signed_in_store("u2");
        storage.set_item("cartItems_storage_u1", "{not json").unwrap();
        stored_snapshot(&storage, "wishlistItems_storage_u1", &json!({"wrong": "shape"}), NOW);

        store.sign_in(session("u1"));
        assert!(store.cart().is_empty());
        assert!(store.wishlist().is_empty());
        assert_eq!(storage.get_item("cartItems_storage_u1").unwrap(), None);
        assert_eq!(storage.get_item("wishlistItems_storage_u1").unwrap(), None);
    }

    #[test]
    fn test_loaded_snapshots_are_normalized() {
        let (mut store, storage, _clock) = signed_in_store("u2");
        stored_snapshot(&storage, "cartItems_storage_u1", &json!({"a": 0, "b": 2}), NOW);
        stored_snapshot(&storage, "wishlistItems_storage_u1", &json!(["x", "x", "y"]), NOW);

        store.sign_in(session("u1"));
        assert!(!store.cart().contains(&pid("a")));
        assert_eq!(store.cart_count(), 2);
        assert_eq!(store.wishlist_count(), 2);
    }

    // -------------------------------------------------------------------------
    // Wishlist
    // -------------------------------------------------------------------------

    #[test]
    fn test_toggle_wishlist_requires_sign_in() {
        let mut store = open_store(&MemoryStorage::new(), &FixedClock::new(NOW));
        let update = store.toggle_wishlist(&pid("p1"));
        assert_eq!(update, WishlistUpdate::SignInRequired);
        assert!(!update.applied());
        assert_eq!(store.wishlist_count(), 0);
    }

    #[test]
    fn test_toggle_wishlist_adds_and_removes() {
        let (mut store, storage, _clock) = signed_in_store("u1");
        assert_eq!(store.toggle_wishlist(&pid("p1")), WishlistUpdate::Added);
        assert!(store.is_in_wishlist(&pid("p1")));

        let raw = storage.get_item("wishlistItems_storage_u1").unwrap().unwrap();
        let stored: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored["data"], json!(["p1"]));

        assert_eq!(store.toggle_wishlist(&pid("p1")), WishlistUpdate::Removed);
        assert_eq!(store.wishlist_count(), 0);
    }

    // -------------------------------------------------------------------------
    // Slips
    // -------------------------------------------------------------------------

    #[test]
    fn test_slips_are_memory_only() {
        let (mut store, storage, _clock) = signed_in_store("u1");
        let keys_before = storage.keys().unwrap();

        store.set_bvn_slip(json!({"bvn": "22222222222"}), "basic");
        store.set_nin_slip(json!({"nin": "11111111111"}), "premium");
        assert_eq!(store.bvn_slip().unwrap().layout, "basic");
        assert_eq!(store.nin_slip().unwrap().data["nin"], "11111111111");
        assert_eq!(store.slip(SlipKind::Nin), store.nin_slip());
        assert_eq!(store.slip(SlipKind::Bvn).unwrap().layout, "basic");
        assert_eq!(storage.keys().unwrap(), keys_before);

        store.clear_bvn_slip();
        store.clear_nin_slip();
        assert!(store.bvn_slip().is_none());
        assert!(store.nin_slip().is_none());
    }

    // -------------------------------------------------------------------------
    // Subscriptions and teardown
    // -------------------------------------------------------------------------

    #[test]
    fn test_subscribers_see_each_change() {
        let (mut store, _storage, _clock) = signed_in_store("u1");
        let seen: Rc<RefCell<Vec<u64>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let id = store.subscribe(move |view| sink.borrow_mut().push(view.cart.count()));

        let _ = store.add_to_cart(&pid("a"));
        let _ = store.add_to_cart(&pid("a"));
        assert_eq!(*seen.borrow(), [1, 2]);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        let _ = store.add_to_cart(&pid("a"));
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_rejected_mutations_do_not_notify() {
        let mut store = open_store(&MemoryStorage::new(), &FixedClock::new(NOW));
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let _ = store.subscribe(move |_| *counter.borrow_mut() += 1);

        let _ = store.add_to_cart(&pid("a"));
        let _ = store.toggle_wishlist(&pid("a"));
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_view_reflects_state() {
        let (mut store, _storage, _clock) = signed_in_store("u1");
        let _ = store.toggle_wishlist(&pid("w"));
        let view = store.view();
        assert!(view.is_authenticated());
        assert!(!view.auth_loading);
        assert_eq!(view.wishlist.len(), 1);
    }

    #[test]
    fn test_teardown_clears_memory_only() {
        let (mut store, storage, _clock) = signed_in_store("u1");
        assert!(store.persist_session());
        let _ = store.add_to_cart(&pid("a"));
        store.set_nin_slip(json!({}), "standard");
        let _ = store.subscribe(|_| {});

        store.teardown();

        assert!(store.current_user().is_none());
        assert!(store.cart().is_empty());
        assert!(store.nin_slip().is_none());
        assert_eq!(store.subscriber_count(), 0);
        assert!(storage.get_item(keys::SESSION).unwrap().is_some());
    }
}
