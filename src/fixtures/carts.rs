//! Cart Fixtures

use serde::Deserialize;

/// Wrapper for cart lines in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart lines in order
    pub items: Vec<CartLineFixture>,
}

/// Cart Line Fixture
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CartLineFixture {
    /// Product SKU
    pub product: String,

    /// Units
    pub quantity: u32,
}
