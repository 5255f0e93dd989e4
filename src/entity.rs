//! Catalog-item records as supplied by the entity source.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// One catalog item from a procurement record.
///
/// The pipeline never mutates an entity; everything downstream works on
/// freshly built distance matrices and label arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Free-text display name.
    pub name: String,
    /// Purchased unit quantity (non-negative).
    pub quantity: f64,
    /// Closing price for the whole position (non-negative).
    pub closing_price: f64,
    /// Category code the item was listed under.
    pub category_id: i64,
}

impl Entity {
    /// Create an entity.
    pub fn new(
        name: impl Into<String>,
        quantity: f64,
        closing_price: f64,
        category_id: i64,
    ) -> Self {
        Self {
            name: name.into(),
            quantity,
            closing_price,
            category_id,
        }
    }

    /// Closing price divided by quantity; `0.0` when the quantity is zero.
    ///
    /// This is the normalized basis for price comparison across items bought
    /// in different quantities.
    pub fn unit_price(&self) -> f64 {
        if self.quantity == 0.0 {
            0.0
        } else {
            self.closing_price / self.quantity
        }
    }
}

/// Drop entities that cannot take part in clustering or scoring.
///
/// An entity survives when it has a non-empty name, a positive closing price,
/// and a positive quantity. Each dropped entity is logged.
pub fn clean_invalid(items: &[Entity]) -> Vec<Entity> {
    let mut valid = Vec::with_capacity(items.len());
    for item in items {
        if !item.name.is_empty() && item.closing_price > 0.0 && item.quantity > 0.0 {
            valid.push(item.clone());
        } else {
            warn!(
                name = %display_name(item),
                "invalid item removed"
            );
        }
    }
    valid
}

/// Check that every entity carries the fields the pipeline relies on.
///
/// Returns [`Error::EmptyInput`] for an empty list and
/// [`Error::MalformedEntity`] for the first entity with a missing name or a
/// zero closing price.
pub fn validate(items: &[Entity]) -> Result<()> {
    if items.is_empty() {
        return Err(Error::EmptyInput);
    }
    for item in items {
        if item.name.is_empty() || item.closing_price == 0.0 {
            return Err(Error::MalformedEntity {
                name: display_name(item).to_string(),
            });
        }
    }
    Ok(())
}

fn display_name(item: &Entity) -> &str {
    if item.name.is_empty() {
        "<unnamed>"
    } else {
        &item.name
    }
}
