#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geospatial dataset store for the valuation wizard.
//!
//! Downloads (or reads from disk) the five cadastral `GeoJSON`
//! collections, parses them into typed records and exposes keyed lookups
//! over them. The store is built once per session and is read-only
//! afterwards. Sources are defined in a TOML file embedded at compile
//! time.

pub mod fetch;
pub mod load;
pub mod parse;
pub mod progress;
pub mod registry;
pub mod store;

use avm_catastro_models::DatasetKind;
use thiserror::Error;

pub use store::{Collections, DatasetStore};

/// Errors that can occur while loading the dataset store.
#[derive(Debug, Error)]
pub enum CatastroError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `GeoJSON` structure was invalid.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Reading a local dataset file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A TOML source definition failed to parse.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A dataset parsed but its content is unusable.
    #[error("Malformed {dataset} dataset: {message}")]
    Malformed {
        /// Which collection was malformed.
        dataset: DatasetKind,
        /// Description of what went wrong.
        message: String,
    },

    /// A required collection was not supplied or is empty.
    #[error("Missing {0} dataset")]
    MissingDataset(DatasetKind),
}
