//! The fixed label taxonomy.
//!
//! A [`LabelTaxonomy`] defines both the universe of labels that are scored and
//! the row order of every report. It is an ordinary immutable value: callers
//! pass it explicitly, so a two-label fixture and the full C3PA taxonomy can
//! be used side by side.

use crate::{Error, Result};
use std::collections::HashSet;

/// The 12 CCPA/CPRA disclosure categories, in report order.
pub const C3PA_LABELS: [&str; 12] = [
    "Updated Privacy Policy",
    "Categories of Personal Information Sold",
    "Categories of Personal Information Shared / Disclosed",
    "Categories of Personal Information Collected",
    "Description of Right to Delete",
    "Description of Right to Correct Information",
    "Description of Right to Know PI Collected",
    "Description of Right to Know PI sold / shared",
    "Description of Right to Opt-out of sale of PI",
    "Description of Right to Limit use of PI",
    "Description of Right to Non-discrimination on exercising rights",
    "Methods to exercise rights",
];

/// Ordered, duplicate-free list of label names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTaxonomy {
    labels: Vec<String>,
}

impl LabelTaxonomy {
    /// Build a taxonomy from label names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `labels` is empty or names a label
    /// twice.
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(Error::invalid_input("taxonomy must contain at least one label"));
        }
        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(Error::invalid_input(format!(
                    "duplicate label in taxonomy: {:?}",
                    label
                )));
            }
        }
        Ok(Self { labels })
    }

    /// The C3PA taxonomy ([`C3PA_LABELS`]).
    #[must_use]
    pub fn c3pa() -> Self {
        Self {
            labels: C3PA_LABELS.iter().map(|l| (*l).to_string()).collect(),
        }
    }

    /// Labels in order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Iterate labels in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a constructed taxonomy.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Row index of `label`, if it belongs to the taxonomy.
    #[must_use]
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Whether `label` belongs to the taxonomy.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.position(label).is_some()
    }
}

impl Default for LabelTaxonomy {
    fn default() -> Self {
        Self::c3pa()
    }
}
