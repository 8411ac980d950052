//! Built-in session method handlers.

use alloy::primitives::Address;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::blockchain::Wallet;
use crate::sessions::types::{Session, SessionError, SessionRequest, SessionResult};

/// Handles one JSON-RPC method inside an approved session.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    /// Method name as sent by the dApp, e.g. `personal_sign`.
    fn method(&self) -> &str;

    /// Produce the JSON-RPC `result` for `request`.
    ///
    /// The session and chain have already been checked by the caller.
    async fn handle(&self, session: &Session, request: &SessionRequest) -> SessionResult<Value>;
}

/// `<namespace>_getAccounts`: the session's addresses on the requested chain.
#[derive(Debug, Clone)]
pub struct AccountsHandler {
    method: String,
}

impl AccountsHandler {
    pub fn new(namespace: &str) -> Self {
        Self {
            method: format!("{}_getAccounts", namespace),
        }
    }
}

#[async_trait]
impl MethodHandler for AccountsHandler {
    fn method(&self) -> &str {
        &self.method
    }

    async fn handle(&self, session: &Session, request: &SessionRequest) -> SessionResult<Value> {
        Ok(json!(session.accounts_for(&request.chain_id)))
    }
}

/// EVM `personal_sign` with the local signer.
///
/// Params are `[message, address]`. A `0x`-prefixed hex message is signed
/// as raw bytes, anything else as its UTF-8 encoding.
#[derive(Debug, Clone)]
pub struct PersonalSignHandler {
    wallet: Wallet,
}

impl PersonalSignHandler {
    pub fn new(wallet: Wallet) -> Self {
        Self { wallet }
    }
}

fn message_bytes(message: &str) -> Vec<u8> {
    message
        .strip_prefix("0x")
        .and_then(|body| hex::decode(body).ok())
        .unwrap_or_else(|| message.as_bytes().to_vec())
}

#[async_trait]
impl MethodHandler for PersonalSignHandler {
    fn method(&self) -> &str {
        "personal_sign"
    }

    async fn handle(&self, session: &Session, request: &SessionRequest) -> SessionResult<Value> {
        let params = request
            .params
            .as_array()
            .ok_or_else(|| SessionError::InvalidParams("expected [message, address]".to_string()))?;
        let (message, address) = match params.as_slice() {
            [Value::String(message), Value::String(address), ..] => (message, address),
            _ => {
                return Err(SessionError::InvalidParams(
                    "expected [message, address]".to_string(),
                ))
            }
        };

        let address: Address = address
            .parse()
            .map_err(|_| SessionError::InvalidParams(format!("'{}' is not an EVM address", address)))?;
        if address != self.wallet.address() {
            return Err(SessionError::InvalidParams(format!(
                "address {} is not held by this wallet",
                address
            )));
        }
        let approved = session
            .accounts_for(&request.chain_id)
            .iter()
            .any(|account| account.parse::<Address>().ok() == Some(address));
        if !approved {
            return Err(SessionError::InvalidParams(format!(
                "address {} is not approved on {}",
                address, request.chain_id
            )));
        }

        let signature = self
            .wallet
            .sign_message(&message_bytes(message))
            .await
            .map_err(|e| SessionError::Signing(e.to_string()))?;
        Ok(Value::String(format!("0x{}", hex::encode(signature.as_bytes()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::types::SessionNamespace;
    use alloy::primitives::Signature;
    use std::collections::BTreeMap;

    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn session() -> Session {
        let mut namespaces = BTreeMap::new();
        namespaces.insert(
            "eip155".to_string(),
            SessionNamespace {
                accounts: vec![format!("eip155:1:{}", TEST_ADDRESS.to_lowercase())],
                methods: vec!["personal_sign".to_string(), "eip155_getAccounts".to_string()],
                events: vec![],
            },
        );
        Session {
            topic: "topic".to_string(),
            proposer: "dapp".to_string(),
            namespaces,
            expires_at: u64::MAX,
        }
    }

    fn request(method: &str, params: Value) -> SessionRequest {
        SessionRequest {
            id: 1,
            topic: "topic".to_string(),
            chain_id: "eip155:1".to_string(),
            method: method.to_string(),
            params,
        }
    }

    #[test]
    fn test_message_bytes() {
        assert_eq!(message_bytes("0x68656c6c6f"), b"hello".to_vec());
        assert_eq!(message_bytes("hello"), b"hello".to_vec());
        // Not valid hex after the prefix: signed verbatim
        assert_eq!(message_bytes("0xzz"), b"0xzz".to_vec());
    }

    #[tokio::test]
    async fn test_accounts_handler() {
        let handler = AccountsHandler::new("eip155");
        assert_eq!(handler.method(), "eip155_getAccounts");

        let result = handler
            .handle(&session(), &request("eip155_getAccounts", Value::Null))
            .await
            .unwrap();
        assert_eq!(result, json!([TEST_ADDRESS.to_lowercase()]));
    }

    #[tokio::test]
    async fn test_personal_sign_recovers_wallet_address() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 1).unwrap();
        let handler = PersonalSignHandler::new(wallet.clone());

        let result = handler
            .handle(
                &session(),
                &request("personal_sign", json!(["0x68656c6c6f", TEST_ADDRESS])),
            )
            .await
            .unwrap();

        let signature_hex = result.as_str().unwrap();
        let bytes = hex::decode(signature_hex.trim_start_matches("0x")).unwrap();
        let signature = Signature::try_from(bytes.as_slice()).unwrap();
        let recovered = signature.recover_address_from_msg(b"hello".as_slice()).unwrap();
        assert_eq!(recovered, wallet.address());
    }

    #[tokio::test]
    async fn test_personal_sign_rejects_bad_params() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 1).unwrap();
        let handler = PersonalSignHandler::new(wallet);

        let err = handler
            .handle(&session(), &request("personal_sign", json!(["hello"])))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidParams(_)));

        let other = "0x0000000000000000000000000000000000000001";
        let err = handler
            .handle(&session(), &request("personal_sign", json!(["hello", other])))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not held by this wallet"));
    }
}
