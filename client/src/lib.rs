//! Client library for the blood-bank coordination service.
//!
//! The crate follows a ports-and-adapters layout:
//! - [`domain`] owns validated records, pure filtering/matching/aggregation and
//!   the workflow services that drive the backend through ports.
//! - [`outbound`] implements those ports (reqwest gateway, token files).
//! - [`config`] and [`cli`] wire everything together for the `bloodbank`
//!   binary.

pub mod cli;
pub mod config;
pub mod domain;
pub mod outbound;
