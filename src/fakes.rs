//
// Copyright 2024 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Test-only collaborators and document builders for `TcbStore` tests.
//!
//! The fake signature scheme is `sign(raw, cert) = SHA-256(cert ||
//! SHA-256(raw))`; [`FakeVerifier`] accepts exactly those signatures.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::json;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::pki::{CaRole, CertAuthorityDirectory, SignatureVerifier};
use crate::registry::{AttestationRegistry, Handle, SchemaId, SchemaIds, SubmitRequest};
use crate::tcb_info::TcbInfoDocument;

pub(crate) const SIGNING_CERT: &[u8] = b"fake TCB signing certificate";
pub(crate) const ROOT_CERT: &[u8] = b"fake root certificate";
pub(crate) const TDX_MRSIGNER: &str =
    "000000000000000000000000000000000000000000000000000000000000dead";

pub(crate) fn schema_ids() -> SchemaIds {
    SchemaIds {
        legacy: SchemaId([0x22; 32]),
        tdx: SchemaId([0x33; 32]),
    }
}

/// Builds a TCB info JSON document in Intel's object format.
///
/// `id` is omitted from the document when `None`; TDX module data is
/// attached only for `id == Some("TDX")`.
pub(crate) fn tcb_info_json(
    id: Option<&str>,
    version: u32,
    fmspc: &str,
    issue_date: &str,
    next_update: &str,
) -> String {
    let mut doc = json!({
        "version": version,
        "issueDate": issue_date,
        "nextUpdate": next_update,
        "fmspc": fmspc,
        "tcbLevels": [
            {
                "tcb": { "sgxtcbcomponents": [{ "svn": 5 }], "pcesvn": 11 },
                "tcbDate": issue_date,
                "tcbStatus": "UpToDate",
                "advisoryIDs": ["INTEL-SA-00657"]
            }
        ],
    });
    if let Some(id) = id {
        doc["id"] = json!(id);
    }
    if id == Some("TDX") {
        doc["tdxModule"] = json!({
            "mrsigner": TDX_MRSIGNER,
            "attributes": "0000000000000000",
            "attributesMask": "ffffffffffffffff"
        });
        doc["tdxModuleIdentities"] = json!([
            {
                "id": "TDX_01",
                "mrsigner": TDX_MRSIGNER,
                "attributes": "0000000000000000",
                "attributesMask": "ffffffffffffffff",
                "tcbLevels": [
                    {
                        "tcb": { "isvsvn": 2 },
                        "tcbDate": issue_date,
                        "tcbStatus": "UpToDate"
                    }
                ]
            }
        ]);
    }
    doc.to_string()
}

pub(crate) fn fake_sign(raw: &str, cert: &[u8]) -> Vec<u8> {
    let digest = Sha256::digest(raw.as_bytes());
    let mut hash = Sha256::new();
    hash.update(cert);
    hash.update(digest);
    hash.finalize().to_vec()
}

/// Pairs `raw` with a signature the fake verifier accepts.
pub(crate) fn signed(raw: String) -> TcbInfoDocument {
    let signature = fake_sign(&raw, SIGNING_CERT);
    TcbInfoDocument { raw, signature }
}

pub(crate) struct FakeVerifier;

impl SignatureVerifier for FakeVerifier {
    fn verify(&self, digest: &[u8], signature: &[u8], signer_cert: &[u8]) -> bool {
        let mut hash = Sha256::new();
        hash.update(signer_cert);
        hash.update(digest);
        signature == hash.finalize().as_slice()
    }
}

/// In-memory registry that remembers every submission for assertions.
#[derive(Default)]
pub(crate) struct FakeRegistry {
    state: Mutex<FakeRegistryState>,
}

#[derive(Default)]
struct FakeRegistryState {
    stored: HashMap<Handle, Vec<u8>>,
    submissions: Vec<SubmitRequest>,
    next_serial: u64,
}

impl FakeRegistry {
    /// Stores certificate bytes directly, outside the submission log.
    pub fn insert_cert(&self, bytes: &[u8]) -> Handle {
        let mut state = self.state.lock().expect("not poisoned");
        let handle = state.next_handle();
        state.stored.insert(handle, bytes.to_vec());
        handle
    }

    pub fn submissions(&self) -> Vec<SubmitRequest> {
        self.state.lock().expect("not poisoned").submissions.clone()
    }
}

impl FakeRegistryState {
    fn next_handle(&mut self) -> Handle {
        self.next_serial += 1;
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&self.next_serial.to_be_bytes());
        Handle::new(bytes)
    }
}

impl AttestationRegistry for FakeRegistry {
    fn submit(&self, request: SubmitRequest) -> Result<Handle> {
        let mut state = self.state.lock().expect("not poisoned");
        let handle = state.next_handle();
        state.stored.insert(handle, request.payload.clone());
        state.submissions.push(request);
        Ok(handle)
    }

    fn fetch(&self, handle: Handle) -> Result<Vec<u8>> {
        self.state
            .lock()
            .expect("not poisoned")
            .stored
            .get(&handle)
            .cloned()
            .ok_or(Error::NotFound)
    }
}

#[derive(Default)]
pub(crate) struct FakeDirectory {
    certs: Mutex<HashMap<CaRole, Handle>>,
}

impl FakeDirectory {
    pub fn publish(&self, role: CaRole, handle: Handle) {
        self.certs
            .lock()
            .expect("not poisoned")
            .insert(role, handle);
    }
}

impl CertAuthorityDirectory for FakeDirectory {
    fn cert_handle(&self, role: CaRole) -> Option<Handle> {
        self.certs
            .lock()
            .expect("not poisoned")
            .get(&role)
            .copied()
    }
}
