//! Transaction building, signing, and confirmation monitoring.
//!
//! # Responsibilities
//! - Build transactions with estimated gas and a capped gas price
//! - Sign locally and broadcast the raw envelope
//! - Monitor confirmations

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{Ethereum, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ConfirmationStatus};
use crate::blockchain::wallet::Wallet;

/// Headroom added on top of `eth_estimateGas`, in percent.
const GAS_LIMIT_HEADROOM_PERCENT: u64 = 20;

/// Transaction builder bound to one client and one signing wallet.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    client: BlockchainClient,
    wallet: Wallet,
}

impl TxBuilder {
    pub fn new(client: BlockchainClient, wallet: Wallet) -> Self {
        Self { client, wallet }
    }

    /// Build a legacy transaction request with gas estimation.
    ///
    /// # Arguments
    /// * `to` - Destination address
    /// * `value` - Amount of native token to send
    /// * `data` - Call data (empty for simple transfers)
    pub async fn build(
        &self,
        to: Address,
        value: U256,
        data: Bytes,
    ) -> BlockchainResult<TransactionRequest> {
        let chain_nonce = self.client.get_transaction_count(self.wallet.address()).await?;
        self.wallet.set_nonce(chain_nonce);

        let gas_price = self.client.get_gas_price().await?;
        let gas_price_gwei = gas_price / 1_000_000_000;

        let config = self.client.config();
        if gas_price_gwei > config.max_gas_price_gwei as u128 {
            return Err(BlockchainError::GasPriceTooHigh {
                current_gwei: gas_price_gwei as u64,
                max_gwei: config.max_gas_price_gwei,
            });
        }
        let adjusted_gas_price = (gas_price as f64 * config.gas_price_multiplier) as u128;

        let call = TransactionRequest::default()
            .with_from(self.wallet.address())
            .with_to(to)
            .with_value(value)
            .with_input(data);
        let estimated = self.client.estimate_gas(&call).await?;
        let gas_limit = with_headroom(estimated);

        let nonce = self.wallet.get_and_increment_nonce();

        tracing::debug!(nonce, gas_limit, gas_price = adjusted_gas_price, "Transaction built");

        Ok(call
            .with_nonce(nonce)
            .with_gas_price(adjusted_gas_price)
            .with_chain_id(self.wallet.chain_id())
            .with_gas_limit(gas_limit))
    }

    /// Sign `tx` with the wallet and broadcast it.
    pub async fn send(&self, tx: TransactionRequest) -> BlockchainResult<TxHash> {
        let raw = sign_transaction(&self.wallet, tx).await?;
        let tx_hash = self.client.send_raw_transaction(raw).await?;
        tracing::info!(tx_hash = %tx_hash, "Transaction broadcast");
        Ok(tx_hash)
    }

    /// Wait for a transaction to reach the configured confirmation depth.
    ///
    /// # Arguments
    /// * `tx_hash` - Transaction hash to monitor
    /// * `timeout_secs` - Maximum time to wait for confirmation
    pub async fn wait_for_confirmation(
        &self,
        tx_hash: TxHash,
        timeout_secs: u64,
    ) -> BlockchainResult<ConfirmationStatus> {
        let required_confirmations = self.client.confirmation_blocks();
        let poll_interval = Duration::from_secs(2);

        let result = timeout(Duration::from_secs(timeout_secs), async {
            let mut ticker = interval(poll_interval);

            loop {
                ticker.tick().await;

                let receipt = match self.client.get_transaction_receipt(tx_hash).await? {
                    Some(r) => r,
                    None => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                };

                if !receipt.status() {
                    return Ok(ConfirmationStatus::Failed(
                        "Transaction reverted".to_string(),
                    ));
                }

                let current_block = self.client.get_block_number().await?;
                let tx_block = receipt.block_number.unwrap_or(current_block);
                // The inclusion block counts as the first confirmation.
                let confirmations = current_block.saturating_sub(tx_block) as u32 + 1;

                if confirmations >= required_confirmations {
                    return Ok(ConfirmationStatus::Confirmed {
                        block_number: tx_block,
                    });
                }

                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations,
                    required = required_confirmations,
                    "Waiting for confirmations"
                );
            }
        })
        .await;

        match result {
            Ok(status) => status,
            Err(_) => Err(BlockchainError::ConfirmationTimeout {
                timeout_secs,
                required: required_confirmations,
            }),
        }
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub fn client(&self) -> &BlockchainClient {
        &self.client
    }
}

fn with_headroom(estimated: u64) -> u64 {
    // Split the division so the multiply cannot overflow.
    let headroom = estimated / 100 * GAS_LIMIT_HEADROOM_PERCENT
        + estimated % 100 * GAS_LIMIT_HEADROOM_PERCENT / 100;
    estimated.saturating_add(headroom)
}

/// Sign a fully populated request into its EIP-2718 wire encoding.
pub async fn sign_transaction(wallet: &Wallet, tx: TransactionRequest) -> BlockchainResult<Bytes> {
    let envelope = <TransactionRequest as TransactionBuilder<Ethereum>>::build(
        tx,
        &wallet.ethereum_wallet(),
    )
    .await
    .map_err(|e| BlockchainError::Wallet(format!("Transaction signing failed: {}", e)))?;
    Ok(Bytes::from(envelope.encoded_2718()))
}
