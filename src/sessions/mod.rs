//! Wallet-connection sessions.
//!
//! # Data Flow
//! ```text
//! relay event (Proposal | Request | Delete)
//!     → manager.rs (approve / dispatch / delete)
//!     → store.rs (SessionStore keyed by topic)
//!     → handlers.rs (MethodHandler per namespace + method)
//!     → SessionOutcome (Session, rejection or JSON-RPC 2.0 response)
//! ```
//!
//! # Design Decisions
//! - Session state lives only behind the `SessionStore` trait
//! - A session approves every method registered for its namespaces
//! - Expired sessions are removed when a request hits them, or by `prune_expired`
//! - The relay transport is out of scope; events arrive as plain values

pub mod handlers;
pub mod manager;
pub mod store;
pub mod types;

pub use handlers::{AccountsHandler, MethodHandler, PersonalSignHandler};
pub use manager::SessionManager;
pub use store::{InMemorySessionStore, SessionStore};
pub use types::{
    JsonRpcError, JsonRpcResponse, RequiredNamespace, Session, SessionError, SessionEvent,
    SessionNamespace, SessionOutcome, SessionProposal, SessionRequest, SessionResult,
};
