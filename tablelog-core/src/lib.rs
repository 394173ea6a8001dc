//! # tablelog-core
//!
//! Core library for tablelog - a browser for exported tabletop session logs.
//!
//! This library provides:
//! - An HTML log parser producing ordered statements per file
//! - A per-directory metadata overlay (`modifier.json`) for user edits
//! - A keyed JSON document store with one cached copy per document
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! Data flows through two layers:
//! - **Source logs:** exported `.html` files on disk (never modified)
//! - **Overlay:** display names, dates, tags, bookmarks and tab settings,
//!   stored beside the logs and merged in on every read
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tablelog_core::{Config, LogLibrary};
//!
//! let config = Config::load().expect("failed to load config");
//! let mut library = LogLibrary::open(&config).expect("failed to open library");
//!
//! let view = library
//!     .parse_and_merge(Path::new("/logs/session.html"))
//!     .expect("failed to read log");
//! println!("{} statements", view.statements.len());
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use filter::MetadataFilter;
pub use ingest::{LogHtmlParser, ParsedLog, StatusChange};
pub use library::{FileId, LogLibrary};
pub use overlay::MetadataOverlay;
pub use store::DocumentStore;
pub use types::*;

// Public modules
pub mod classify;
pub mod color;
pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod ingest;
pub mod library;
pub mod logging;
pub mod overlay;
pub mod store;
pub mod types;
