//
// Copyright 2024 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Interface to the append-only attestation registry the cache submits to.

use std::time::SystemTime;

use crate::error::Result;
use crate::tcb_info::TDX_SCHEMA_MIN_VERSION;

/// Opaque identifier for bytes previously stored in an
/// [`AttestationRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle([u8; 32]);

impl Handle {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Identifies the wire schema a submission's payload conforms to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaId(pub [u8; 32]);

impl std::fmt::Display for SchemaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Schema identifiers the registry recognizes for TCB info submissions.
///
/// The TDX-capable document format is tagged separately from the one
/// preceding it so registry consumers can pick the matching decoder.
#[derive(Debug, Clone, Copy)]
pub struct SchemaIds {
    /// tags documents predating the TDX-capable format
    pub legacy: SchemaId,
    /// tags TDX-capable documents
    pub tdx: SchemaId,
}

impl SchemaIds {
    pub(crate) fn for_version(&self, version: u32) -> SchemaId {
        if version >= TDX_SCHEMA_MIN_VERSION {
            self.tdx
        } else {
            self.legacy
        }
    }
}

/// One content submission to the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub schema_id: SchemaId,
    pub payload: Vec<u8>,
    /// handle this submission supersedes, linking per-document history
    pub predecessor: Option<Handle>,
    pub expires_at: SystemTime,
}

/// Append-only, content-addressed attestation store.
///
/// Calls are synchronous and fail fast; retry policy, if any, belongs to
/// the implementation.
pub trait AttestationRegistry {
    fn submit(&self, request: SubmitRequest) -> Result<Handle>;

    /// `Err(Error::NotFound)` if `handle` references nothing.
    fn fetch(&self, handle: Handle) -> Result<Vec<u8>>;
}

impl<R: AttestationRegistry + ?Sized> AttestationRegistry for &R {
    fn submit(&self, request: SubmitRequest) -> Result<Handle> {
        (**self).submit(request)
    }

    fn fetch(&self, handle: Handle) -> Result<Vec<u8>> {
        (**self).fetch(handle)
    }
}
