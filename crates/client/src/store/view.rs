//! Read-only state views and change subscriptions.

use vtu_dashboard_core::{CartSnapshot, SlipPayload, UserSession, WishlistSnapshot};

/// Borrowed view of the store's state, as rendered by the UI.
#[derive(Debug, Clone, Copy)]
pub struct StateView<'a> {
    pub current_user: Option<&'a UserSession>,
    pub auth_loading: bool,
    pub cart: &'a CartSnapshot,
    pub wishlist: &'a WishlistSnapshot,
    pub bvn_slip: Option<&'a SlipPayload>,
    pub nin_slip: Option<&'a SlipPayload>,
}

impl StateView<'_> {
    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StateView<'_>)>;

/// Registered change listeners.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    pub(crate) fn notify(&mut self, view: &StateView<'_>) {
        for (_, listener) in &mut self.entries {
            listener(view);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
