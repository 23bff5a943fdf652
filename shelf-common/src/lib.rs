//! Common types and utilities shared across shelf crates.
//!
//! This crate defines the catalog [`Record`], the shared error type and the
//! observability helpers used throughout the workspace. It stays
//! dependency‑light so every crate can depend on it.
//!
//! # Overview
//!
//! - [`Record`]: one validated product listing
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`ShelfError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use shelf_common::Record;
//!
//! let record = Record::new("Asus VivoBook", "15.6\" laptop", 295.99, 3, 14).unwrap();
//! assert_eq!(record.rating, 3);
//! assert!(Record::new("", "no title", 1.0, 0, 0).is_err());
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Highest value a [`Record::rating`] may take.
pub const MAX_RATING: u8 = 5;

/// One product listing extracted from a catalog page.
///
/// Fields are public for reading and serialization; construct through
/// [`Record::new`] so the value ranges hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub rating: u8,
    #[serde(rename = "num_of_reviews")]
    pub review_count: u32,
}

impl Record {
    /// Build a record, rejecting values outside the catalog ranges.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        rating: u8,
        review_count: u32,
    ) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ShelfError::InvalidRecord("title is empty".into()));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(ShelfError::InvalidRecord(format!(
                "price {price} is not a non-negative number"
            )));
        }
        if rating > MAX_RATING {
            return Err(ShelfError::InvalidRecord(format!(
                "rating {rating} exceeds {MAX_RATING}"
            )));
        }

        Ok(Self {
            title,
            description: description.into(),
            price,
            rating,
            review_count,
        })
    }
}

/// Error types used across the shelf workspace.
#[derive(thiserror::Error, Debug)]
pub enum ShelfError {
    /// A record failed range validation.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// A CSS selector string could not be compiled.
    #[error("Invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },
}

/// Convenient alias for results that use [`ShelfError`].
pub type Result<T> = std::result::Result<T, ShelfError>;
