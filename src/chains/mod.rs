//! Per-chain key normalization and address derivation.
//!
//! # Data Flow
//! ```text
//! raw input
//!     → ChainDeriver::normalize  (shape checks, chain secret decoding, mnemonic path)
//!     → NormalizedKey            (32-byte secret + detected format + scheme)
//!     → ChainDeriver::identity   (public key + address encoding)
//!     → DerivedIdentity
//! ```
//!
//! # Design Decisions
//! - Address-shaped and public-key-shaped inputs are rejected before decoding
//! - Derivation is pure; `derive` only adds logging and metrics around it
//! - Log events carry the chain and detected format, nothing else

pub mod cosmos;
pub mod evm;
pub mod identity;
pub mod stellar;
pub mod xrp;

pub use cosmos::CosmosDeriver;
pub use evm::EvmDeriver;
pub use identity::{DerivedIdentity, KeyScheme, NormalizedKey};
pub use stellar::StellarDeriver;
pub use xrp::XrpDeriver;

use crate::keys::KeyResult;
use crate::observability::metrics;

/// Turns caller-supplied private key input into a chain's public identity.
pub trait ChainDeriver: Send + Sync {
    /// Short chain family name used in logs and metrics.
    fn chain(&self) -> &'static str;

    /// Human-readable list of accepted input formats.
    fn accepted_formats(&self) -> &'static str;

    /// Decode the input into a canonical 32-byte secret.
    fn normalize(&self, input: &str) -> KeyResult<NormalizedKey>;

    /// Compute public key and address from a normalized secret.
    fn identity(&self, key: &NormalizedKey) -> KeyResult<DerivedIdentity>;

    /// Normalize and derive in one step.
    fn derive(&self, input: &str) -> KeyResult<DerivedIdentity> {
        let result = self.normalize(input).and_then(|key| self.identity(&key));

        match &result {
            Ok(identity) => {
                metrics::record_derivation(self.chain(), "success");
                tracing::debug!(
                    chain = self.chain(),
                    format = %identity.format(),
                    "Derived public identity"
                );
            }
            Err(_) => {
                metrics::record_derivation(self.chain(), "rejected");
                tracing::debug!(chain = self.chain(), "Rejected private key input");
            }
        }

        result
    }
}
