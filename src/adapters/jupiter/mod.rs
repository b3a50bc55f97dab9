//! Jupiter Adapter
//!
//! Implementation of the `SwapApi` port for the Jupiter DEX aggregator.
//! Handles quote fetching, swap transaction building and USD prices.

mod client;
mod price;
mod quote;
mod swap;

pub use client::{JupiterClient, JupiterConfig};
pub use price::{PriceEntry, PriceResponse};
pub use quote::{QuoteRequest, QuoteResponse};
pub use swap::{SwapRequest, SwapResponse};
