//! Quantities of ingredients and shop items.

use serde::{Deserialize, Serialize};

/// Measurement unit for a [`Quantity`].
///
/// Closed set; serialized by variant name (e.g. `"Gram"`, `"Ml"`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Number,
    Tsp,
    Tbsp,
    Cup,
    Oz,
    Lb,
    Gram,
    Kg,
    Ml,
    Litre,
    Pinch,
    Bunch,
    Pack,
    Tin,
}

/// An amount paired with its unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quantity {
    pub amount: u32,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(amount: u32, unit: Unit) -> Self {
        Self { amount, unit }
    }
}

impl Default for Quantity {
    /// One unspecified unit, e.g. "one onion".
    fn default() -> Self {
        Self {
            amount: 1,
            unit: Unit::Number,
        }
    }
}
