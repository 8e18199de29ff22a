//! Core types for the Concord transaction layer
//!
//! This crate defines everything the transaction and storage crates share:
//! - The record address model (`Value`, `RecordKey`, `Key`)
//! - The record metadata model (`TransactionResult`, `TransactionState`)
//! - Logical operations (`Get`, `Scan`, `Put`, `Delete`)
//! - The conditional mutation model executed by storage (`Mutation`,
//!   `MutationCondition`)
//! - The `Storage` capability trait
//! - The error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod error;
pub mod mutation;
pub mod record;
pub mod traits;
pub mod types;

pub use api::{Delete, Get, Order, Put, Scan, ScanBound};
pub use error::{Error, Result};
pub use mutation::{ConditionalDelete, ConditionalPut, Mutation, MutationCondition};
pub use record::{TransactionResult, TransactionState};
pub use traits::Storage;
pub use types::{Key, RecordKey, Value};
