//! Record codec
//!
//! MessagePack encoding for stored records. A persistent backend stores
//! each record, metadata and before-image included, as one opaque value;
//! this is the encoding it would use. The in-memory backend keeps records
//! structured and only the tests exercise this directly, but the codec is
//! the contract any driver serializing records must match.

use concord_core::error::{Error, Result};
use concord_core::record::TransactionResult;

/// Encode a record to MessagePack bytes
pub fn encode_record(record: &TransactionResult) -> Result<Vec<u8>> {
    rmp_serde::to_vec(record).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode a record from MessagePack bytes
pub fn decode_record(bytes: &[u8]) -> Result<TransactionResult> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::Serialization(e.to_string()))
}
