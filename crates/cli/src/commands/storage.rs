//! Storage inspection commands.

use std::io::Write;

use vtu_dashboard_client::KeyValueStorage;

use super::CliError;

/// List every stored key.
pub fn keys(storage: &impl KeyValueStorage, out: &mut impl Write) -> Result<(), CliError> {
    let keys = storage.keys()?;
    if keys.is_empty() {
        writeln!(out, "Storage is empty")?;
    }
    for key in keys {
        writeln!(out, "{key}")?;
    }
    Ok(())
}

/// Remove every stored key, including the session.
pub fn clear(storage: &impl KeyValueStorage, out: &mut impl Write) -> Result<(), CliError> {
    let count = storage.keys()?.len();
    storage.clear()?;
    tracing::info!(count, "Storage cleared");
    writeln!(out, "Removed {count} keys")?;
    Ok(())
}
