//! Storage backends for Concord
//!
//! This crate provides the reference `Storage` implementation: an
//! in-memory map with single-record atomic conditional writes, the exact
//! capability the commit protocol assumes of any real backend. It also
//! holds the record codec a persistent backend would use on the wire or on
//! disk.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod memory;

pub use memory::MemoryStorage;
