//! Jupiter Price Types
//!
//! `GET /price?ids=a,b` returns a map of mint to price entry; unknown mints map to `null`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceResponse {
    #[serde(default)]
    pub data: HashMap<String, Option<PriceEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEntry {
    pub id: String,
    /// USD price as a decimal string
    pub price: String,
}

impl PriceResponse {
    /// Parsed USD prices; mints without a usable price are left out
    pub fn into_prices(self) -> HashMap<String, f64> {
        self.data
            .into_iter()
            .filter_map(|(mint, entry)| {
                let price = entry?.price.parse::<f64>().ok()?;
                Some((mint, price))
            })
            .collect()
    }
}
