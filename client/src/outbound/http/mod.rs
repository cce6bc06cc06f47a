//! HTTP outbound adapter.
//!
//! This module provides the reqwest implementation of the
//! `BloodBankGateway` port.

mod dto;
mod gateway;

pub use gateway::{DEFAULT_USER_AGENT, HttpGateway};
