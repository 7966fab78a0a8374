//! Product lot transfer ledger.
//!
//! Tracks ownership and quantity of tradable product lots in an embedded
//! key-value ledger: create, read, transfer, purchase (with lot splitting)
//! and delete, each operation atomic with respect to the ledger. A small
//! linear-program capability backs the unrelated solve operation.

pub mod command;
pub mod error;
pub mod lot;
pub mod service;
pub mod solver;
pub mod store;

pub use command::{Command, Dispatcher, Outcome};
pub use error::TransferError;
pub use lot::{Lot, LotDraft, LotKey, LotStatus};
pub use service::TransferService;
