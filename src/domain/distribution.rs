//! Cross-chain card distribution
//!
//! Splits an OOF amount across the three fixed card categories, estimates destination-token
//! quantities and models the per-request outcome of the transfer-then-mint workflow.
//! Amounts are `Decimal` so percentage splits are exact.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::address::WalletAddress;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Destination card bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardCategory {
    PaperHands,
    DustCollector,
    GainsMaster,
}

impl CardCategory {
    /// All categories in distribution order
    pub const ALL: [CardCategory; 3] = [
        CardCategory::PaperHands,
        CardCategory::DustCollector,
        CardCategory::GainsMaster,
    ];

    /// Stable card identifier
    pub fn card_id(&self) -> &'static str {
        match self {
            CardCategory::PaperHands => "paper-hands",
            CardCategory::DustCollector => "dust-collector",
            CardCategory::GainsMaster => "gains-master",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CardCategory::PaperHands => "Paper Hands",
            CardCategory::DustCollector => "Dust Collector",
            CardCategory::GainsMaster => "Gains Master",
        }
    }
}

impl fmt::Display for CardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Percentages per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDistribution {
    pub paper_hands: Decimal,
    pub dust_collector: Decimal,
    pub gains_master: Decimal,
}

impl Default for CardDistribution {
    fn default() -> Self {
        Self {
            paper_hands: dec!(40),
            dust_collector: dec!(35),
            gains_master: dec!(25),
        }
    }
}

impl CardDistribution {
    pub fn new(paper_hands: Decimal, dust_collector: Decimal, gains_master: Decimal) -> Self {
        Self {
            paper_hands,
            dust_collector,
            gains_master,
        }
    }

    pub fn percentage(&self, category: CardCategory) -> Decimal {
        match category {
            CardCategory::PaperHands => self.paper_hands,
            CardCategory::DustCollector => self.dust_collector,
            CardCategory::GainsMaster => self.gains_master,
        }
    }

    /// Sum of the percentages, `None` on overflow
    pub fn total(&self) -> Option<Decimal> {
        self.paper_hands
            .checked_add(self.dust_collector)?
            .checked_add(self.gains_master)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CardCategory, Decimal)> + '_ {
        CardCategory::ALL.into_iter().map(|c| (c, self.percentage(c)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistributionError {
    #[error("Percentage for {0} is negative: {1}")]
    Negative(CardCategory, Decimal),
    #[error("Percentages must sum to 100, got {0}")]
    DoesNotSumTo100(Decimal),
    #[error("All percentages are zero")]
    AllZero,
    #[error("Amount or percentage out of range")]
    Overflow,
}

fn checked_share(value: Decimal, numerator: Decimal, denominator: Decimal) -> Result<Decimal, DistributionError> {
    value
        .checked_mul(numerator)
        .and_then(|v| v.checked_div(denominator))
        .ok_or(DistributionError::Overflow)
}

/// What to do with percentages that do not sum to 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionPolicy {
    /// Reject the request
    #[default]
    Reject,
    /// Rescale the percentages so they sum to 100
    Normalize,
}

impl DistributionPolicy {
    /// Validate or normalize a distribution according to the policy
    pub fn apply(&self, distribution: &CardDistribution) -> Result<CardDistribution, DistributionError> {
        for (category, pct) in distribution.iter() {
            if pct.is_sign_negative() && !pct.is_zero() {
                return Err(DistributionError::Negative(category, pct));
            }
        }

        let total = distribution.total().ok_or(DistributionError::Overflow)?;
        if total == HUNDRED {
            return Ok(*distribution);
        }

        match self {
            DistributionPolicy::Reject => Err(DistributionError::DoesNotSumTo100(total)),
            DistributionPolicy::Normalize => {
                if total.is_zero() {
                    return Err(DistributionError::AllZero);
                }
                Ok(CardDistribution {
                    paper_hands: checked_share(distribution.paper_hands, HUNDRED, total)?,
                    dust_collector: checked_share(distribution.dust_collector, HUNDRED, total)?,
                    gains_master: checked_share(distribution.gains_master, HUNDRED, total)?,
                })
            }
        }
    }
}

/// OOF allocated to one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub category: CardCategory,
    pub percentage: Decimal,
    pub oof_amount: Decimal,
}

/// Split `total` into one allocation per category. Each category is computed independently.
pub fn split(total: Decimal, distribution: &CardDistribution) -> Result<Vec<Allocation>, DistributionError> {
    distribution
        .iter()
        .map(|(category, percentage)| {
            Ok(Allocation {
                category,
                percentage,
                oof_amount: checked_share(total, percentage, HUNDRED)?,
            })
        })
        .collect()
}

/// Exchange figures used for estimates and destination-token quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeRates {
    /// USD per OOF
    pub exchange_rate_usd: Decimal,
    /// Bridge fee in percent of the USD value
    pub bridge_fee_pct: Decimal,
    /// Destination tokens per USD
    pub tokens_per_usd: Decimal,
}

impl BridgeRates {
    /// Destination tokens for an allocation, before fees
    pub fn destination_tokens(&self, oof_amount: Decimal) -> Option<Decimal> {
        oof_amount
            .checked_mul(self.exchange_rate_usd)?
            .checked_mul(self.tokens_per_usd)
    }

    /// USD per destination token
    pub fn price_per_token(&self) -> Option<Decimal> {
        Decimal::ONE.checked_div(self.tokens_per_usd)
    }
}

/// Preview of a purchase before committing to the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseEstimate {
    pub oof_amount: Decimal,
    pub usd_value: Decimal,
    pub bridge_fee: Decimal,
    pub estimated_tokens: Decimal,
}

/// Pure fee/valuation helper
pub fn estimate_purchase(oof_amount: Decimal, rates: &BridgeRates) -> Result<PurchaseEstimate, DistributionError> {
    let usd_value = oof_amount
        .checked_mul(rates.exchange_rate_usd)
        .ok_or(DistributionError::Overflow)?;
    let bridge_fee = checked_share(usd_value, rates.bridge_fee_pct, HUNDRED)?;
    let estimated_tokens = usd_value
        .checked_sub(bridge_fee)
        .and_then(|net| net.checked_mul(rates.tokens_per_usd))
        .ok_or(DistributionError::Overflow)?;
    Ok(PurchaseEstimate {
        oof_amount,
        usd_value,
        bridge_fee,
        estimated_tokens,
    })
}

/// Convert a UI amount to base units, truncating sub-unit dust
pub fn to_base_units(amount: Decimal, decimals: u8) -> Option<u64> {
    let scale = Decimal::from(10u64.checked_pow(decimals as u32)?);
    amount.checked_mul(scale)?.trunc().to_u64()
}

/// A request to convert OOF into the three destination cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossChainPurchaseRequest {
    pub wallet: WalletAddress,
    pub oof_amount: Decimal,
    pub distribution: CardDistribution,
}

/// One category's purchase that was actually created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossChainPurchase {
    pub category: CardCategory,
    pub oof_amount: Decimal,
    pub card_id: String,
    pub destination_token: String,
    pub estimated_tokens: Decimal,
    pub bridge_transaction_id: String,
    /// Identifier returned by the mint API
    pub mint_reference: String,
}

/// One category whose mint call failed after the transfer succeeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFailure {
    pub category: CardCategory,
    pub oof_amount: Decimal,
    pub bridge_transaction_id: String,
    pub reason: String,
}

/// Per-category view of a completed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryStatus<'a> {
    Purchased(&'a CrossChainPurchase),
    Failed(&'a CategoryFailure),
    NotAttempted,
}

/// Terminal state of a cross-chain purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PurchaseOutcome {
    /// Validation failed; nothing was transferred
    Rejected { reason: String },
    /// The custody transfer failed; no mint call was made
    Failed { reason: String },
    /// Transfer succeeded; purchases holds the categories that minted
    Completed {
        transfer_signature: String,
        purchases: Vec<CrossChainPurchase>,
        failures: Vec<CategoryFailure>,
        simulated: bool,
    },
}

impl PurchaseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PurchaseOutcome::Completed { .. })
    }

    pub fn purchases(&self) -> &[CrossChainPurchase] {
        match self {
            PurchaseOutcome::Completed { purchases, .. } => purchases,
            _ => &[],
        }
    }

    pub fn failures(&self) -> &[CategoryFailure] {
        match self {
            PurchaseOutcome::Completed { failures, .. } => failures,
            _ => &[],
        }
    }

    /// Categories that need reconciliation
    pub fn failed_categories(&self) -> Vec<CardCategory> {
        self.failures().iter().map(|f| f.category).collect()
    }

    pub fn status(&self, category: CardCategory) -> CategoryStatus<'_> {
        if let Some(p) = self.purchases().iter().find(|p| p.category == category) {
            return CategoryStatus::Purchased(p);
        }
        if let Some(f) = self.failures().iter().find(|f| f.category == category) {
            return CategoryStatus::Failed(f);
        }
        CategoryStatus::NotAttempted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> BridgeRates {
        BridgeRates {
            exchange_rate_usd: dec!(0.01),
            bridge_fee_pct: dec!(3),
            tokens_per_usd: dec!(1000),
        }
    }

    #[test]
    fn test_split_40_35_25() {
        let allocations = split(dec!(1000), &CardDistribution::default()).unwrap();
        let amounts: Vec<Decimal> = allocations.iter().map(|a| a.oof_amount).collect();
        assert_eq!(amounts, vec![dec!(400), dec!(350), dec!(250)]);
        assert_eq!(amounts.iter().copied().sum::<Decimal>(), dec!(1000));
        assert_eq!(allocations[0].category, CardCategory::PaperHands);
        assert_eq!(allocations[2].category, CardCategory::GainsMaster);
    }

    #[test]
    fn test_split_does_not_reconcile_bad_percentages() {
        let d = CardDistribution::new(dec!(50), dec!(50), dec!(50));
        let total: Decimal = split(dec!(100), &d).unwrap().iter().map(|a| a.oof_amount).sum();
        assert_eq!(total, dec!(150));
    }

    #[test]
    fn test_reject_policy() {
        let bad = CardDistribution::new(dec!(40), dec!(40), dec!(40));
        assert_eq!(
            DistributionPolicy::Reject.apply(&bad),
            Err(DistributionError::DoesNotSumTo100(dec!(120)))
        );
        let ok = CardDistribution::default();
        assert_eq!(DistributionPolicy::Reject.apply(&ok), Ok(ok));
    }

    #[test]
    fn test_negative_percentage_rejected_by_both_policies() {
        let bad = CardDistribution::new(dec!(120), dec!(-10), dec!(-10));
        for policy in [DistributionPolicy::Reject, DistributionPolicy::Normalize] {
            assert!(matches!(
                policy.apply(&bad),
                Err(DistributionError::Negative(CardCategory::DustCollector, _))
            ));
        }
    }

    #[test]
    fn test_normalize_policy() {
        let d = CardDistribution::new(dec!(2), dec!(1), dec!(1));
        let normalized = DistributionPolicy::Normalize.apply(&d).unwrap();
        assert_eq!(normalized.paper_hands, dec!(50));
        assert_eq!(normalized.dust_collector, dec!(25));
        assert_eq!(normalized.gains_master, dec!(25));

        let zero = CardDistribution::new(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        assert_eq!(DistributionPolicy::Normalize.apply(&zero), Err(DistributionError::AllZero));
    }

    #[test]
    fn test_huge_percentages_error_instead_of_panicking() {
        let huge = CardDistribution::new(Decimal::from_i128_with_scale(10i128.pow(27), 0), dec!(1), dec!(1));
        assert_eq!(
            DistributionPolicy::Normalize.apply(&huge),
            Err(DistributionError::Overflow)
        );

        let unsummable = CardDistribution::new(Decimal::MAX, Decimal::MAX, Decimal::ZERO);
        assert_eq!(unsummable.total(), None);
        for policy in [DistributionPolicy::Reject, DistributionPolicy::Normalize] {
            assert_eq!(policy.apply(&unsummable), Err(DistributionError::Overflow));
        }
    }

    #[test]
    fn test_huge_amounts_error_instead_of_panicking() {
        assert_eq!(
            split(Decimal::MAX, &CardDistribution::default()),
            Err(DistributionError::Overflow)
        );
        assert_eq!(
            estimate_purchase(Decimal::MAX, &rates()),
            Err(DistributionError::Overflow)
        );
    }

    #[test]
    fn test_estimate_purchase() {
        let estimate = estimate_purchase(dec!(1000), &rates()).unwrap();
        assert_eq!(estimate.usd_value, dec!(10));
        assert_eq!(estimate.bridge_fee, dec!(0.3));
        assert_eq!(estimate.estimated_tokens, dec!(9700));
    }

    #[test]
    fn test_estimate_is_linear() {
        let r = rates();
        for a in [dec!(1), dec!(17.5), dec!(1000), dec!(123456.789)] {
            let single = estimate_purchase(a, &r).unwrap();
            let double = estimate_purchase(a * dec!(2), &r).unwrap();
            assert_eq!(double.usd_value, single.usd_value * dec!(2));
            assert_eq!(double.estimated_tokens, single.estimated_tokens * dec!(2));
        }
    }

    #[test]
    fn test_destination_tokens_and_price() {
        let r = rates();
        assert_eq!(r.destination_tokens(dec!(400)), Some(dec!(4000)));
        assert_eq!(r.destination_tokens(Decimal::MAX), None);
        assert_eq!(r.price_per_token(), Some(dec!(0.001)));

        let broken = BridgeRates { tokens_per_usd: Decimal::ZERO, ..r };
        assert_eq!(broken.price_per_token(), None);
    }

    #[test]
    fn test_to_base_units() {
        assert_eq!(to_base_units(dec!(1000), 6), Some(1_000_000_000));
        assert_eq!(to_base_units(dec!(0.0000015), 6), Some(1));
        assert_eq!(to_base_units(dec!(-1), 6), None);
        assert_eq!(to_base_units(dec!(1), 30), None);
    }

    #[test]
    fn test_outcome_status_lookup() {
        let outcome = PurchaseOutcome::Completed {
            transfer_signature: "sig".into(),
            purchases: vec![CrossChainPurchase {
                category: CardCategory::PaperHands,
                oof_amount: dec!(400),
                card_id: "paper-hands".into(),
                destination_token: "0xabc".into(),
                estimated_tokens: dec!(4000),
                bridge_transaction_id: "b1".into(),
                mint_reference: "m1".into(),
            }],
            failures: vec![CategoryFailure {
                category: CardCategory::GainsMaster,
                oof_amount: dec!(250),
                bridge_transaction_id: "b3".into(),
                reason: "timeout".into(),
            }],
            simulated: false,
        };

        assert!(outcome.is_success());
        assert!(matches!(outcome.status(CardCategory::PaperHands), CategoryStatus::Purchased(_)));
        assert!(matches!(outcome.status(CardCategory::GainsMaster), CategoryStatus::Failed(_)));
        assert_eq!(outcome.status(CardCategory::DustCollector), CategoryStatus::NotAttempted);
        assert_eq!(outcome.failed_categories(), vec![CardCategory::GainsMaster]);

        let rejected = PurchaseOutcome::Rejected { reason: "insufficient".into() };
        assert!(!rejected.is_success());
        assert!(rejected.purchases().is_empty());
    }
}
