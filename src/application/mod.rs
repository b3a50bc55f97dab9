//! Application services
//!
//! Each service is an explicit object built from injected ports and configuration.

pub mod chain_reader;
pub mod distributor;
pub mod market;
pub mod portfolio;
pub mod swap_gateway;

pub use chain_reader::{ChainReader, SIGNATURE_PAGE_LIMIT};
pub use distributor::{CardConfig, CrossChainDistributor, DistributorConfig, PurchasePreview};
pub use market::TokenMarketAggregator;
pub use portfolio::{PortfolioValuator, DEFAULT_TRADE_WINDOW};
pub use swap_gateway::{SwapConfig, TradeGateway, TradeGatewayConfig};
