//! # c3pa-core
//!
//! Core types for the c3pa evaluation toolkit, shared by the engine and the CLI.
//!
//! - **Records**: [`PredictionRecord`], [`PolicyId`], [`IdentityKey`]
//! - **Result sets**: [`ResultSet`], records grouped per model id
//! - **Taxonomy**: [`LabelTaxonomy`], the ordered CCPA/CPRA label list

pub mod error;
pub mod record;
pub mod taxonomy;

pub use error::{Error, Result};
pub use record::{FieldValue, IdentityKey, OpaqueValue, PolicyId, PredictionRecord, ResultSet};
pub use taxonomy::{LabelTaxonomy, C3PA_LABELS};
