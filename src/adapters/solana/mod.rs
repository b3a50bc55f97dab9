pub mod json_rpc;
pub mod rpc;
pub mod wallet;

pub use json_rpc::{JsonRpcConfig, JsonRpcLedger};
pub use rpc::{parse_commitment, SolanaClient};
pub use wallet::{WalletError, WalletManager};
