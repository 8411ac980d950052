//! ERC-721 minting through `safeMint(address,string)`.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use crate::blockchain::{BlockchainError, ConfirmationStatus, TxBuilder};
use crate::minting::pipeline::NftMinter;
use crate::minting::types::{MintError, MintResult};

// OpenZeppelin ERC721URIStorage-style mint entry point.
sol! {
    function safeMint(address to, string uri);
}

/// Calldata for `safeMint(to, uri)`.
pub fn encode_safe_mint(to: Address, token_uri: &str) -> Bytes {
    safeMintCall {
        to,
        uri: token_uri.to_string(),
    }
    .abi_encode()
    .into()
}

/// Mints on an EVM contract with the local signer wallet.
#[derive(Debug, Clone)]
pub struct EvmNftMinter {
    tx: TxBuilder,
    contract: Address,
    confirmation_timeout_secs: u64,
}

impl EvmNftMinter {
    /// # Arguments
    /// * `tx` - Transaction builder bound to the RPC client and minter wallet
    /// * `contract` - ERC-721 contract exposing `safeMint(address,string)`
    /// * `confirmation_timeout_secs` - How long to wait for confirmations
    pub fn new(tx: TxBuilder, contract: Address, confirmation_timeout_secs: u64) -> Self {
        Self {
            tx,
            contract,
            confirmation_timeout_secs,
        }
    }

    pub fn contract(&self) -> Address {
        self.contract
    }
}

fn parse_recipient(recipient: &str) -> MintResult<Address> {
    recipient
        .trim()
        .parse()
        .map_err(|_| MintError::InvalidRecipient(recipient.to_string()))
}

#[async_trait]
impl NftMinter for EvmNftMinter {
    fn chain(&self) -> &'static str {
        "evm"
    }

    fn validate_recipient(&self, recipient: &str) -> MintResult<()> {
        parse_recipient(recipient).map(|_| ())
    }

    async fn mint(&self, recipient: &str, token_uri: &str) -> MintResult<String> {
        let to = parse_recipient(recipient)?;

        let minter = self.tx.address();
        if self.tx.client().get_balance(minter).await? == U256::ZERO {
            return Err(BlockchainError::InsufficientFunds {
                address: minter.to_checksum(None),
            }
            .into());
        }

        let request = self
            .tx
            .build(self.contract, U256::ZERO, encode_safe_mint(to, token_uri))
            .await?;
        let tx_hash = self.tx.send(request).await?;

        match self
            .tx
            .wait_for_confirmation(tx_hash, self.confirmation_timeout_secs)
            .await?
        {
            ConfirmationStatus::Confirmed { block_number } => {
                tracing::info!(
                    contract = %self.contract,
                    tx_hash = %tx_hash,
                    block_number,
                    "safeMint confirmed"
                );
                Ok(tx_hash.to_string())
            }
            ConfirmationStatus::Failed(reason) => Err(BlockchainError::Reverted(reason).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{BlockchainClient, BlockchainConfig, Wallet};

    #[test]
    fn test_safe_mint_calldata() {
        let to: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        let data = encode_safe_mint(to, "ipfs://bafy");

        assert_eq!(hex::encode(&data[..4]), "d204c45e");
        // selector, address word, string offset word, length word, one padded data word
        assert_eq!(data.len(), 4 + 32 * 4);
        assert_eq!(&data[16..36], to.as_slice());
        assert_eq!(data[4 + 32 * 2 + 31], "ipfs://bafy".len() as u8);
        assert_eq!(&data[4 + 32 * 3..4 + 32 * 3 + 11], b"ipfs://bafy");
    }

    #[tokio::test]
    async fn test_invalid_recipient_rejected_before_rpc() {
        let config = BlockchainConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let client = BlockchainClient::new(config).unwrap();
        let wallet = Wallet::from_private_key(
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            1,
        )
        .unwrap();
        let minter = EvmNftMinter::new(TxBuilder::new(client, wallet), Address::ZERO, 5);

        let err = minter.mint("cosmos1notevm", "ipfs://bafy").await.unwrap_err();
        assert!(matches!(err, MintError::InvalidRecipient(_)));

        assert!(matches!(
            minter.validate_recipient("not-an-address"),
            Err(MintError::InvalidRecipient(_))
        ));
        assert!(minter
            .validate_recipient(" 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266 ")
            .is_ok());
    }
}
