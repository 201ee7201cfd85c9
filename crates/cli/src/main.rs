//! VTU Dashboard CLI - inspect and drive the client state from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in with a session payload issued by the backend
//! vtu-cli session sign-in session.json
//!
//! # Fill the cart and show the total against a product catalog
//! vtu-cli cart add 66a1
//! vtu-cli cart set 66a2 3
//! vtu-cli cart show --catalog products.json
//!
//! # Toggle a wishlist entry
//! vtu-cli wishlist toggle 66a1
//!
//! # Look at what is persisted
//! vtu-cli storage keys
//! ```
//!
//! # Commands
//!
//! - `session` - Sign in/out, show the user, raw codec access
//! - `cart` - Add, set, remove, clear and show cart lines
//! - `wishlist` - Toggle and show wishlisted products
//! - `storage` - List or clear persisted keys
//!
//! State lives in the file named by `VTU_STORAGE_PATH` (or `--storage`);
//! `VTU_SESSION_SECRET` must be set.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vtu_dashboard_client::{
    ClientStateStore, DashboardConfig, FileStorage, SessionCodec, SystemClock,
};

mod commands;

use commands::CliError;

type Store = ClientStateStore<FileStorage, SystemClock>;

#[derive(Parser)]
#[command(name = "vtu-cli")]
#[command(author, version, about = "VTU dashboard client state tools")]
struct Cli {
    /// Storage file (overrides `VTU_STORAGE_PATH`)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the signed-in session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Inspect persisted storage
    Storage {
        #[command(subcommand)]
        action: StorageAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Encrypt a JSON value (non-JSON input is encrypted as a string)
    Encode {
        /// Value to encrypt
        value: String,
    },
    /// Decrypt a blob and print it as JSON
    Decode {
        /// Blob produced by `encode`
        blob: String,
    },
    /// Sign in with a session payload
    SignIn {
        /// JSON file with the session payload, or `-` for stdin
        source: PathBuf,
    },
    /// Show the signed-in user
    Show,
    /// Sign out, keeping the saved cart and wishlist
    SignOut,
}

#[derive(Subcommand)]
enum CartAction {
    /// Add one unit of a product
    Add {
        /// Product ID
        id: String,
    },
    /// Set a product's quantity (0 removes it)
    Set {
        /// Product ID
        id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product
    Remove {
        /// Product ID
        id: String,
    },
    /// Empty the cart
    Clear,
    /// Show cart lines and totals
    Show {
        /// JSON array of product records used to price the cart
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Add a product, or remove it if already wishlisted
    Toggle {
        /// Product ID
        id: String,
    },
    /// Show wishlisted products
    Show,
}

#[derive(Subcommand)]
enum StorageAction {
    /// List stored keys
    Keys,
    /// Remove every stored key
    Clear,
}

fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vtu_dashboard_client=info,vtu_cli=info".into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::debug!(error = ?e, "Command failed");
        let _ = writeln!(std::io::stderr(), "error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = DashboardConfig::from_env()?;
    if let Some(path) = cli.storage {
        config.storage_path = path;
    }
    let codec = config.session_codec()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Session { action } => match action {
            SessionAction::Encode { value } => commands::session::encode(&codec, &value, &mut out),
            SessionAction::Decode { blob } => commands::session::decode(&codec, &blob, &mut out),
            SessionAction::SignIn { source } => {
                let payload = commands::session::read_source(&source)?;
                let mut store = open_store(&config, codec);
                commands::session::sign_in(&mut store, &payload, &mut out)
            }
            SessionAction::Show => commands::session::show(&open_store(&config, codec), &mut out),
            SessionAction::SignOut => {
                commands::session::sign_out(&mut open_store(&config, codec), &mut out)
            }
        },
        Commands::Cart { action } => {
            let mut store = open_store(&config, codec);
            match action {
                CartAction::Add { id } => commands::cart::add(&mut store, &id, &mut out),
                CartAction::Set { id, quantity } => {
                    commands::cart::set(&mut store, &id, quantity, &mut out)
                }
                CartAction::Remove { id } => commands::cart::remove(&mut store, &id, &mut out),
                CartAction::Clear => commands::cart::clear(&mut store, &mut out),
                CartAction::Show { catalog } => {
                    let catalog = catalog
                        .as_deref()
                        .map(commands::cart::load_catalog)
                        .transpose()?;
                    commands::cart::show(
                        &store,
                        catalog.as_deref(),
                        &config.currency_symbol,
                        &mut out,
                    )
                }
            }
        }
        Commands::Wishlist { action } => {
            let mut store = open_store(&config, codec);
            match action {
                WishlistAction::Toggle { id } => {
                    commands::wishlist::toggle(&mut store, &id, &mut out)
                }
                WishlistAction::Show => commands::wishlist::show(&store, &mut out),
            }
        }
        Commands::Storage { action } => {
            let storage = FileStorage::new(&config.storage_path);
            match action {
                StorageAction::Keys => commands::storage::keys(&storage, &mut out),
                StorageAction::Clear => commands::storage::clear(&storage, &mut out),
            }
        }
    }
}

/// Open the file-backed store and restore the session.
fn open_store(config: &DashboardConfig, codec: SessionCodec) -> Store {
    let storage = FileStorage::new(&config.storage_path);
    let mut store =
        ClientStateStore::new(storage, codec, SystemClock).with_snapshot_ttl(config.snapshot_ttl_ms);
    store.initialize();
    store
}
