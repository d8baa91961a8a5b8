//! Application layer: validation of the payout files and orchestration of a
//! payout pass.
//!
//! [`manager::PaymentsManager`] walks the scholars one by one and hands each
//! planned transfer to a [`executor::PaymentExecutor`], which drives it to a
//! terminal state against whatever `ChainClient` it was given.

pub mod executor;
pub mod manager;
pub mod validator;
