//
// Copyright 2024 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Key derivation and the version-dispatched wire codec for stored TCB
//! records.
//!
//! A record is stored as a CBOR tuple whose arity depends on the document
//! version. The two shapes are not interchangeable: the decoder is told
//! which branch to use by the caller and never infers it from the payload
//! itself.

use ciborium::value::Value;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::tcb_info::{
    TcbInfo, TcbLevel, TcbType, TdxModule, TdxModuleIdentity, TDX_SCHEMA_MIN_VERSION,
};

/// Deterministic lookup key for one `(tcb_type, fmspc, version)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TcbKey([u8; 32]);

impl std::fmt::Display for TcbKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Derives the index key for a TCB info triple.
///
/// Stable across calls, so repeated upserts for one triple always land in
/// the same index slot; any differing component produces a different key.
pub(crate) fn derive_key(tcb_type: TcbType, fmspc: &str, version: u32) -> TcbKey {
    let mut hash = Sha256::new();
    hash.update([tcb_type as u8]);
    hash.update(fmspc.as_bytes());
    hash.update(version.to_be_bytes());
    TcbKey(hash.finalize().into())
}

const LEGACY_TUPLE_LEN: usize = 4;
const TDX_TUPLE_LEN: usize = 6;

/// Wire tuple for one stored record, dispatched on document version.
#[derive(Debug)]
pub(crate) enum WireRecord<'a> {
    /// `[info, levels, raw, signature]`
    Legacy {
        info: &'a TcbInfo,
        levels: &'a [TcbLevel],
        raw: &'a str,
        signature: &'a [u8],
    },
    /// `[info, module, identities, levels, raw, signature]`
    Tdx {
        info: &'a TcbInfo,
        module: &'a TdxModule,
        identities: &'a [TdxModuleIdentity],
        levels: &'a [TcbLevel],
        raw: &'a str,
        signature: &'a [u8],
    },
}

pub(crate) fn encode(record: &WireRecord<'_>) -> Result<Vec<u8>> {
    let tuple = match record {
        WireRecord::Legacy {
            info,
            levels,
            raw,
            signature,
        } => vec![
            serialized(info)?,
            serialized(levels)?,
            Value::Text(raw.to_string()),
            Value::Bytes(signature.to_vec()),
        ],
        WireRecord::Tdx {
            info,
            module,
            identities,
            levels,
            raw,
            signature,
        } => vec![
            serialized(info)?,
            serialized(module)?,
            serialized(identities)?,
            serialized(levels)?,
            Value::Text(raw.to_string()),
            Value::Bytes(signature.to_vec()),
        ],
    };
    let mut bytes = Vec::new();
    ciborium::into_writer(&Value::Array(tuple), &mut bytes)?;
    Ok(bytes)
}

fn serialized<T: serde::Serialize>(value: &T) -> Result<Value> {
    Value::serialized(value).map_err(|e| Error::Codec(e.to_string()))
}

/// Recovers the raw document and signature from a stored payload.
///
/// `version` must be the version the payload was stored under; it selects
/// the expected tuple shape. A payload that does not match that shape
/// indicates an index/registry inconsistency and is reported as
/// [`Error::MalformedShape`].
pub(crate) fn decode(bytes: &[u8], version: u32) -> Result<(String, Vec<u8>)> {
    let value: Value =
        ciborium::from_reader(bytes).map_err(|_| Error::MalformedShape { version })?;
    let tuple = value
        .into_array()
        .map_err(|_| Error::MalformedShape { version })?;
    let expected = if version >= TDX_SCHEMA_MIN_VERSION {
        TDX_TUPLE_LEN
    } else {
        LEGACY_TUPLE_LEN
    };
    if tuple.len() != expected {
        return Err(Error::MalformedShape { version });
    }

    // only the trailing (raw, signature) pair is re-exposed to readers
    let mut tail = tuple.into_iter().skip(expected - 2);
    let raw = tail
        .next()
        .and_then(|value| value.into_text().ok())
        .ok_or(Error::MalformedShape { version })?;
    let signature = tail
        .next()
        .and_then(|value| value.into_bytes().ok())
        .ok_or(Error::MalformedShape { version })?;
    Ok((raw, signature))
}
