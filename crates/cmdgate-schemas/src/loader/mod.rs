//! Description file loading
//!
//! Reads service descriptions from YAML or JSON files and hands them over as
//! `serde_json::Value` documents for [`crate::description::Description`] to
//! build from.
//!
//! Copyright (c) 2025 Cmdgate Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod parser;

pub use error::{LoaderError, LoaderResult};
pub use parser::{DocumentParser, Format};
