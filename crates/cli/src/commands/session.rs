//! Session commands.
//!
//! # Usage
//!
//! ```bash
//! # Sign in with a session payload from a file (or `-` for stdin)
//! vtu-cli session sign-in session.json
//!
//! # Show the signed-in user
//! vtu-cli session show
//!
//! # Encrypt or decrypt a value with the configured secret
//! vtu-cli session encode '{"id": "u1", "role": "user"}'
//! vtu-cli session decode <blob>
//! ```

use std::io::{Read, Write};
use std::path::Path;

use serde_json::Value;
use vtu_dashboard_client::{ClientStateStore, Clock, KeyValueStorage, SessionCodec};
use vtu_dashboard_core::UserSession;

use super::CliError;

/// Encrypt a value. Input that isn't valid JSON is encrypted as a string.
pub fn encode(codec: &SessionCodec, input: &str, out: &mut impl Write) -> Result<(), CliError> {
    let value = serde_json::from_str(input).unwrap_or_else(|_| Value::String(input.to_owned()));
    let blob = codec.encode(&value).ok_or(CliError::Unencodable)?;
    writeln!(out, "{blob}")?;
    Ok(())
}

/// Decrypt a blob and print the value as JSON.
pub fn decode(codec: &SessionCodec, blob: &str, out: &mut impl Write) -> Result<(), CliError> {
    let value = codec.decode(blob).ok_or(CliError::Undecodable)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    Ok(())
}

/// Sign in with a session payload and persist it.
pub fn sign_in<S: KeyValueStorage, C: Clock>(
    store: &mut ClientStateStore<S, C>,
    payload: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let session: UserSession = serde_json::from_str(payload)?;
    store.sign_in(session);
    if !store.persist_session() {
        return Err(CliError::PersistFailed);
    }

    if let Some(session) = store.current_user() {
        writeln!(out, "Signed in as {} ({})", session.display_name(), session.role())?;
    }
    Ok(())
}

/// Print the signed-in user.
pub fn show<S: KeyValueStorage, C: Clock>(
    store: &ClientStateStore<S, C>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match store.current_user() {
        Some(session) => writeln!(out, "{}", serde_json::to_string_pretty(session)?)?,
        None => writeln!(out, "not signed in")?,
    }
    Ok(())
}

/// Sign out, keeping the user's saved cart and wishlist.
pub fn sign_out<S: KeyValueStorage, C: Clock>(
    store: &mut ClientStateStore<S, C>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let was_signed_in = store.is_authenticated();
    store.sign_out();
    if was_signed_in {
        writeln!(out, "Signed out")?;
    } else {
        writeln!(out, "not signed in")?;
    }
    Ok(())
}

/// Read a payload from a file, or from stdin when the path is `-`.
pub fn read_source(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}
