//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! vtu-cli cart add 66a1
//! vtu-cli cart set 66a1 3
//! vtu-cli cart remove 66a1
//! vtu-cli cart clear
//!
//! # Show lines and, with a product catalog, the cart total
//! vtu-cli cart show --catalog products.json
//! ```

use std::io::Write;
use std::path::Path;

use vtu_dashboard_client::{CartUpdate, ClientStateStore, Clock, KeyValueStorage};
use vtu_dashboard_core::{ProductRecord, format_amount};

use super::{CliError, product_id};

fn require_sign_in<S: KeyValueStorage, C: Clock>(
    store: &ClientStateStore<S, C>,
) -> Result<(), CliError> {
    if store.is_authenticated() {
        Ok(())
    } else {
        Err(CliError::SignInRequired)
    }
}

/// Add one unit of a product.
pub fn add<S: KeyValueStorage, C: Clock>(
    store: &mut ClientStateStore<S, C>,
    id: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let id = product_id(id)?;
    match store.add_to_cart(&id) {
        CartUpdate::Applied { quantity } => writeln!(out, "{id}: {quantity}")?,
        CartUpdate::SignInRequired => return Err(CliError::SignInRequired),
    }
    Ok(())
}

/// Set a product's quantity; zero removes it.
pub fn set<S: KeyValueStorage, C: Clock>(
    store: &mut ClientStateStore<S, C>,
    id: &str,
    quantity: i64,
    out: &mut impl Write,
) -> Result<(), CliError> {
    require_sign_in(store)?;
    let id = product_id(id)?;
    store.set_cart_quantity(&id, quantity)?;
    writeln!(out, "{id}: {}", store.cart().quantity(&id))?;
    Ok(())
}

/// Remove a product.
pub fn remove<S: KeyValueStorage, C: Clock>(
    store: &mut ClientStateStore<S, C>,
    id: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    require_sign_in(store)?;
    let id = product_id(id)?;
    if store.remove_from_cart(&id) {
        writeln!(out, "Removed {id}")?;
    } else {
        writeln!(out, "{id} is not in the cart")?;
    }
    Ok(())
}

/// Empty the cart.
pub fn clear<S: KeyValueStorage, C: Clock>(
    store: &mut ClientStateStore<S, C>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    require_sign_in(store)?;
    store.clear_cart();
    writeln!(out, "Cart cleared")?;
    Ok(())
}

/// Print cart lines, the item count and, given a catalog, the total.
pub fn show<S: KeyValueStorage, C: Clock>(
    store: &ClientStateStore<S, C>,
    catalog: Option<&[ProductRecord]>,
    currency_symbol: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if store.cart().is_empty() {
        writeln!(out, "Cart is empty")?;
        return Ok(());
    }

    for (id, quantity) in store.cart().iter() {
        let name = catalog
            .and_then(|products| products.iter().find(|product| product.id == *id))
            .and_then(|product| product.name.as_deref());
        match name {
            Some(name) => writeln!(out, "{id}  x{quantity}  {name}")?,
            None => writeln!(out, "{id}  x{quantity}")?,
        }
    }
    writeln!(out, "Items: {}", store.cart_count())?;
    if let Some(products) = catalog {
        writeln!(out, "Total: {}", format_amount(store.cart_amount(products), currency_symbol))?;
    }
    Ok(())
}

/// Load a catalog file: a JSON array of product records.
pub fn load_catalog(path: &Path) -> Result<Vec<ProductRecord>, CliError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
