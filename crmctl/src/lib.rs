//! # crmctl: headless client core for the CRM admin console
//!
//! `crmctl` is the engine of a browser-style admin console for managing
//! customers, users and roles against a REST backend, minus the rendering.
//! It owns the pieces with real state and invariants and leaves markup and
//! styling to whatever shell embeds it.
//!
//! ## Core components
//!
//! The **list engine** ([`list`]) is a generic search/pagination/filter
//! controller over an in-memory collection produced by an async fetch
//! function. The backend serves whole collections; filtering (AND of
//! case-sensitive substring matches, or a custom hook) and page slicing
//! happen client-side. A generation counter resolves racing fetches so the
//! last issued request always wins.
//!
//! The **session** ([`auth`]) is the Anonymous/Authenticated state machine:
//! login resolves credentials through the user-lookup endpoint, verifies the
//! password (Argon2 PHC hashes, with trimmed plain comparison for legacy
//! records), persists token, user record and the role's permission set to
//! durable storage, and caches them until logout or expiry.
//!
//! The **navigation guard** ([`guard`]) runs before every transition: the
//! login page is always reachable (authenticated visitors bounce back to the
//! page they came from), everything else needs a session, and permission-
//! tagged routes need the tag in the session's set. The guard re-hydrates
//! from storage first so checks survive process restarts.
//!
//! The **transport** ([`transport`]) wraps a shared HTTP client: it attaches
//! the persisted bearer token, unwraps JSON payloads, normalises error
//! messages, and turns an HTTP 401 into a forced session teardown.
//!
//! ## Quick start
//!
//! ```no_run
//! use crmctl::auth::LoginForm;
//! use crmctl::{Config, Console};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut console = Console::new(Config::default())?;
//!
//!     console
//!         .login(&LoginForm {
//!             username: "admin".to_string(),
//!             password: "secret".to_string(),
//!         })
//!         .await?;
//!
//!     let customers = crmctl::api::endpoints::customers::list(console.transport()).await?;
//!     println!("{} customers", customers.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod console;
pub mod errors;
pub mod guard;
pub mod list;
pub mod notify;
pub mod routes;
pub mod storage;
pub mod telemetry;
pub mod transport;
pub mod types;

pub use config::Config;
pub use console::Console;
pub use errors::{Error, Result};
