//! Outbound adapters implementing domain ports.
//!
//! - **http**: reqwest-backed `BloodBankGateway`
//! - **token_file**: `cap-std` file store for the session token
//!
//! Adapters are thin translators between domain types and wire or disk
//! representations. They contain no business logic.

pub mod http;
pub mod token_file;

pub use http::{DEFAULT_USER_AGENT, HttpGateway};
pub use token_file::FileTokenStore;
