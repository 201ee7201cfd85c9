//! Wishlist commands.

use std::io::Write;

use vtu_dashboard_client::{ClientStateStore, Clock, KeyValueStorage, WishlistUpdate};

use super::{CliError, product_id};

/// Add a product to the wishlist, or remove it if already there.
pub fn toggle<S: KeyValueStorage, C: Clock>(
    store: &mut ClientStateStore<S, C>,
    id: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let id = product_id(id)?;
    match store.toggle_wishlist(&id) {
        WishlistUpdate::Added => writeln!(out, "Added {id} to wishlist")?,
        WishlistUpdate::Removed => writeln!(out, "Removed {id} from wishlist")?,
        WishlistUpdate::SignInRequired => return Err(CliError::SignInRequired),
    }
    Ok(())
}

/// Print wishlisted products in the order they were added.
pub fn show<S: KeyValueStorage, C: Clock>(
    store: &ClientStateStore<S, C>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if store.wishlist().is_empty() {
        writeln!(out, "Wishlist is empty")?;
        return Ok(());
    }
    for id in store.wishlist().iter() {
        writeln!(out, "{id}")?;
    }
    Ok(())
}
