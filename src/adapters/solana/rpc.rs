use async_trait::async_trait;
use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    transaction::Transaction,
};
use std::str::FromStr;
use std::sync::Arc;

use super::wallet::WalletManager;
use crate::ports::ledger::{LedgerError, TokenTransfer, TransactionSubmitter};

/// Parse a commitment level name, falling back to `confirmed`
pub fn parse_commitment(level: &str) -> CommitmentConfig {
    match level {
        "processed" => CommitmentConfig::processed(),
        "finalized" => CommitmentConfig::finalized(),
        _ => CommitmentConfig::confirmed(),
    }
}

fn parse_pubkey(value: &str) -> Result<Pubkey, LedgerError> {
    Pubkey::from_str(value).map_err(|e| LedgerError::InvalidAddress(format!("{}: {}", value, e)))
}

/// Signing side of the ledger: submits transactions with the configured wallet
///
/// Wraps the blocking RPC client; every call runs on the blocking thread pool.
#[derive(Clone)]
pub struct SolanaClient {
    client: Arc<RpcClient>,
    wallet: WalletManager,
}

impl SolanaClient {
    pub fn new(rpc_url: String, commitment: CommitmentConfig, wallet: WalletManager) -> Self {
        let client = Arc::new(RpcClient::new_with_commitment(rpc_url, commitment));
        Self { client, wallet }
    }

    pub fn wallet(&self) -> &WalletManager {
        &self.wallet
    }

    async fn latest_blockhash(&self) -> Result<solana_sdk::hash::Hash, LedgerError> {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            client
                .get_latest_blockhash()
                .map_err(|e| LedgerError::Rpc(e.to_string()))
        })
        .await
        .map_err(|e| LedgerError::Rpc(format!("Task join error: {}", e)))?
    }

    async fn send_and_confirm(&self, transaction: Transaction) -> Result<String, LedgerError> {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            client
                .send_and_confirm_transaction(&transaction)
                .map(|sig| sig.to_string())
                .map_err(|e| LedgerError::Transaction(e.to_string()))
        })
        .await
        .map_err(|e| LedgerError::Rpc(format!("Task join error: {}", e)))?
    }
}

#[async_trait]
impl TransactionSubmitter for SolanaClient {
    fn signer_address(&self) -> String {
        self.wallet.public_key()
    }

    async fn sign_and_submit(&self, transaction: Vec<u8>) -> Result<String, LedgerError> {
        let signed = self
            .wallet
            .sign_serialized(&transaction)
            .map_err(|e| LedgerError::Signing(e.to_string()))?;

        let client = Arc::clone(&self.client);
        let signature = tokio::task::spawn_blocking(move || {
            client
                .send_and_confirm_transaction(&signed)
                .map(|sig| sig.to_string())
                .map_err(|e| LedgerError::Transaction(e.to_string()))
        })
        .await
        .map_err(|e| LedgerError::Rpc(format!("Task join error: {}", e)))??;

        tracing::info!("Transaction confirmed: {}", signature);
        Ok(signature)
    }
}

#[async_trait]
impl TokenTransfer for SolanaClient {
    async fn transfer(
        &self,
        from: &str,
        mint: &str,
        destination_owner: &str,
        amount: u64,
        decimals: u8,
    ) -> Result<String, LedgerError> {
        let owner = parse_pubkey(from)?;
        let mint = parse_pubkey(mint)?;
        let destination_owner = parse_pubkey(destination_owner)?;

        if owner != self.wallet.pubkey() {
            return Err(LedgerError::Signing(format!(
                "source wallet {} does not match the configured keypair {}",
                owner,
                self.wallet.pubkey()
            )));
        }

        let token_program = spl_token::id();
        let source = spl_associated_token_account::get_associated_token_address(&owner, &mint);
        let destination =
            spl_associated_token_account::get_associated_token_address(&destination_owner, &mint);

        let instructions = vec![
            spl_associated_token_account::instruction::create_associated_token_account_idempotent(
                &owner,
                &destination_owner,
                &mint,
                &token_program,
            ),
            spl_token::instruction::transfer_checked(
                &token_program,
                &source,
                &mint,
                &destination,
                &owner,
                &[],
                amount,
                decimals,
            )
            .map_err(|e| LedgerError::Transaction(format!("Failed to build transfer: {}", e)))?,
        ];

        let blockhash = self.latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            &instructions,
            Some(&owner),
            &[self.wallet.keypair()],
            blockhash,
        );

        tracing::info!(
            "Transferring {} base units of {} from {} to {}",
            amount,
            mint,
            owner,
            destination_owner
        );
        self.send_and_confirm(transaction).await
    }
}
