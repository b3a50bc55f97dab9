//! Cross-Chain Distributor
//!
//! Converts an OOF balance into the three destination cards:
//! validate, split, transfer the total to custody, then mint each card.
//!
//! The transfer gates everything downstream: if it fails no mint call is made. Once it has
//! succeeded the three mint calls run independently and a failing category is recorded as a
//! `CategoryFailure` next to the purchases that went through, so it can be reconciled on its own.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::distribution::{
    self, Allocation, BridgeRates, CardCategory, CategoryFailure, CrossChainPurchase,
    CrossChainPurchaseRequest, DistributionError, DistributionPolicy, PurchaseEstimate,
    PurchaseOutcome,
};
use crate::ports::ledger::TokenTransfer;
use crate::ports::mint::{CardMintMetadata, CardMintRequest, MintApi};

use super::chain_reader::ChainReader;

/// Destination card for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    pub category: CardCategory,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    /// Destination-chain token address
    pub destination_token: String,
}

impl CardConfig {
    /// Card used when none is configured for `category`
    pub fn default_for(category: CardCategory) -> Self {
        Self {
            category,
            name: category.label().to_string(),
            description: format!("{} card", category.label()),
            image: String::new(),
            destination_token: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DistributorConfig {
    /// Bridge custody owner receiving the transferred OOF
    pub custody_address: String,
    /// OOF mint on the source chain
    pub source_mint: String,
    pub source_decimals: u8,
    pub rates: BridgeRates,
    pub policy: DistributionPolicy,
    pub cards: Vec<CardConfig>,
}

impl DistributorConfig {
    pub fn card(&self, category: CardCategory) -> CardConfig {
        self.cards
            .iter()
            .find(|c| c.category == category)
            .cloned()
            .unwrap_or_else(|| CardConfig::default_for(category))
    }
}

/// What a request would do, without doing it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasePreview {
    pub estimate: PurchaseEstimate,
    pub allocations: Vec<Allocation>,
}

#[derive(Clone)]
pub struct CrossChainDistributor {
    reader: Arc<ChainReader>,
    transfer: Arc<dyn TokenTransfer>,
    mint_api: Arc<dyn MintApi>,
    config: DistributorConfig,
}

impl CrossChainDistributor {
    pub fn new(
        reader: Arc<ChainReader>,
        transfer: Arc<dyn TokenTransfer>,
        mint_api: Arc<dyn MintApi>,
        config: DistributorConfig,
    ) -> Self {
        Self {
            reader,
            transfer,
            mint_api,
            config,
        }
    }

    pub fn config(&self) -> &DistributorConfig {
        &self.config
    }

    pub fn estimate_purchase(&self, oof_amount: Decimal) -> Result<PurchaseEstimate, DistributionError> {
        distribution::estimate_purchase(oof_amount, &self.config.rates)
    }

    /// Estimate plus the split the distribution policy would produce
    pub fn preview(
        &self,
        request: &CrossChainPurchaseRequest,
    ) -> Result<PurchasePreview, String> {
        let dist = self
            .config
            .policy
            .apply(&request.distribution)
            .map_err(|e| e.to_string())?;
        Ok(PurchasePreview {
            estimate: self
                .estimate_purchase(request.oof_amount)
                .map_err(|e| e.to_string())?,
            allocations: distribution::split(request.oof_amount, &dist).map_err(|e| e.to_string())?,
        })
    }

    /// Run the whole workflow for one request
    pub async fn purchase(&self, request: &CrossChainPurchaseRequest) -> PurchaseOutcome {
        let wallet = request.wallet.as_str();

        let (allocations, base_units) = match self.validate(request).await {
            Ok(validated) => validated,
            Err(reason) => {
                tracing::warn!("Purchase for {} rejected: {}", wallet, reason);
                return PurchaseOutcome::Rejected { reason };
            }
        };

        tracing::info!(
            "Transferring {} OOF ({} base units) from {} to custody {}",
            request.oof_amount,
            base_units,
            wallet,
            self.config.custody_address
        );
        let transfer_signature = match self
            .transfer
            .transfer(
                wallet,
                &self.config.source_mint,
                &self.config.custody_address,
                base_units,
                self.config.source_decimals,
            )
            .await
        {
            Ok(signature) => signature,
            Err(e) => {
                tracing::warn!("Custody transfer for {} failed: {}", wallet, e);
                return PurchaseOutcome::Failed {
                    reason: format!("transfer to custody failed: {}", e),
                };
            }
        };

        let results = join_all(allocations.iter().map(|a| self.mint(a))).await;

        let mut purchases = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(purchase) => purchases.push(purchase),
                Err(failure) => failures.push(failure),
            }
        }

        tracing::info!(
            "Purchase for {} completed: {} minted, {} failed (transfer {})",
            wallet,
            purchases.len(),
            failures.len(),
            transfer_signature
        );

        PurchaseOutcome::Completed {
            transfer_signature,
            purchases,
            failures,
            simulated: self.transfer.is_simulated(),
        }
    }

    async fn validate(
        &self,
        request: &CrossChainPurchaseRequest,
    ) -> Result<(Vec<Allocation>, u64), String> {
        if request.oof_amount <= Decimal::ZERO {
            return Err(format!("amount must be positive, got {}", request.oof_amount));
        }
        let dist = self
            .config
            .policy
            .apply(&request.distribution)
            .map_err(|e| e.to_string())?;

        let allocations = distribution::split(request.oof_amount, &dist).map_err(|e| e.to_string())?;
        let base_units = distribution::to_base_units(request.oof_amount, self.config.source_decimals)
            .filter(|units| *units > 0)
            .ok_or_else(|| format!("amount {} is not transferable", request.oof_amount))?;

        // The custody transfer draws from the associated token account only
        let balance = self
            .reader
            .get_associated_token_balance(request.wallet.as_str(), &self.config.source_mint)
            .await;
        if let Some(reason) = balance.reason() {
            return Err(format!("balance unavailable: {}", reason));
        }
        let held = *balance.value();
        if held < base_units {
            return Err(format!(
                "insufficient balance in the associated token account: holds {} base units, needs {}",
                held, base_units
            ));
        }

        Ok((allocations, base_units))
    }

    async fn mint(&self, allocation: &Allocation) -> Result<CrossChainPurchase, CategoryFailure> {
        let card = self.config.card(allocation.category);
        let bridge_transaction_id = Uuid::new_v4().to_string();

        let fail = |reason: String| CategoryFailure {
            category: allocation.category,
            oof_amount: allocation.oof_amount,
            bridge_transaction_id: bridge_transaction_id.clone(),
            reason,
        };

        let estimated_tokens = self
            .config
            .rates
            .destination_tokens(allocation.oof_amount)
            .ok_or_else(|| fail("destination token quantity out of range".to_string()))?;

        let price_per_token = self
            .config
            .rates
            .price_per_token()
            .ok_or_else(|| fail("tokens per USD is zero".to_string()))?;

        let request = CardMintRequest {
            name: card.name.clone(),
            description: card.description.clone(),
            image: card.image.clone(),
            initial_supply: estimated_tokens,
            price_per_token,
            metadata: CardMintMetadata {
                oof_amount: allocation.oof_amount,
                bridge_transaction_id: bridge_transaction_id.clone(),
                created_at: Utc::now(),
            },
        };

        match self.mint_api.create_card_token(&request).await {
            Ok(receipt) => Ok(CrossChainPurchase {
                category: allocation.category,
                oof_amount: allocation.oof_amount,
                card_id: allocation.category.card_id().to_string(),
                destination_token: card.destination_token,
                estimated_tokens,
                bridge_transaction_id: bridge_transaction_id.clone(),
                mint_reference: receipt.reference,
            }),
            Err(e) => {
                tracing::warn!(
                    "Mint for {} (bridge tx {}) failed: {}",
                    allocation.category,
                    bridge_transaction_id,
                    e
                );
                Err(fail(e.to_string()))
            }
        }
    }
}
