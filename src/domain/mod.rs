//! Domain types and the pure payout rules.

pub mod address;
pub mod calculator;
pub mod config;
pub mod payment;
pub mod ports;
pub mod secret;
pub mod summary;
pub mod transaction;
