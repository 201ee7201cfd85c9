//! VTU Dashboard Client - client-side session and state layer.
//!
//! Keeps the signed-in user, the shopping cart, the wishlist and the
//! BVN/NIN verification slips for one dashboard instance, and mirrors the
//! durable parts of that state to a key-value storage.
//!
//! # Modules
//!
//! - [`codec`] - Encrypts the session before it touches storage
//! - [`storage`] - `localStorage`-shaped key-value backends
//! - [`store`] - The state store: auth, cart, wishlist, slips, subscriptions
//! - [`config`] - Environment configuration
//! - [`clock`] - Injectable time source for snapshot expiry
//! - [`keys`] - Storage key layout
//!
//! # Example
//!
//! ```no_run
//! use vtu_dashboard_client::{
//!     ClientStateStore, DashboardConfig, FileStorage, SystemClock,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DashboardConfig::from_env()?;
//! let storage = FileStorage::new(&config.storage_path);
//! let mut store = ClientStateStore::new(storage, config.session_codec()?, SystemClock)
//!     .with_snapshot_ttl(config.snapshot_ttl_ms);
//! store.initialize();
//! println!("signed in: {}", store.is_authenticated());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod clock;
pub mod codec;
pub mod config;
pub mod keys;
pub mod storage;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{CodecError, SessionCodec};
pub use config::{ConfigError, DashboardConfig};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::{
    CartUpdate, ClientStateStore, StateView, StoreError, SubscriptionId, WishlistUpdate,
};
