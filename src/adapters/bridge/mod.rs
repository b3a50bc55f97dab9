//! Bridge Adapter
//!
//! Destination-chain mint API client plus the simulated transfer/mint pair used outside
//! live mode.

mod mint_client;
mod simulated;

pub use mint_client::{HttpMintApi, MintApiConfig};
pub use simulated::{LoggingMintApi, SimulatedTransfer};
