//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod gateway;
mod token_store;

#[cfg(test)]
pub use gateway::MockBloodBankGateway;
pub use gateway::{BloodBankGateway, GatewayError};
#[cfg(test)]
pub use token_store::MockTokenStore;
pub use token_store::{InMemoryTokenStore, TokenStore, TokenStoreError};
