//
// Copyright 2024 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

//! The validating cache composing parser, gates, codec and registry.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::SystemTime;

use crate::codec::{self, TcbKey, WireRecord};
use crate::error::{Error, Result};
use crate::pki::{CaRole, CertAuthorityDirectory, IssuerChain, SignatureVerifier};
use crate::registry::{AttestationRegistry, Handle, SchemaIds, SubmitRequest};
use crate::tcb_info::{TcbInfoDocument, TcbInfoParser, TcbType};
use crate::validator;

/// Validating cache in front of an append-only attestation registry.
///
/// A document is admitted only after its signature verifies against the
/// currently attested signing certificate and its validity window covers
/// the supplied evaluation time. Admitted documents live in the registry;
/// the store keeps just the handle of the latest document per
/// `(tcb_type, fmspc, version)` triple.
pub struct TcbStore<R, D, V, P> {
    registry: R,
    directory: D,
    verifier: V,
    parser: P,
    schema_ids: SchemaIds,
    // one slot per (tcb_type, fmspc, version) triple; slots are only ever
    // created or overwritten, never removed
    index: Mutex<HashMap<TcbKey, Handle>>,
}

impl<R, D, V, P> TcbStore<R, D, V, P>
where
    R: AttestationRegistry,
    D: CertAuthorityDirectory,
    V: SignatureVerifier,
    P: TcbInfoParser,
{
    pub fn new(registry: R, directory: D, verifier: V, parser: P, schema_ids: SchemaIds) -> Self {
        Self {
            registry,
            directory,
            verifier,
            parser,
            schema_ids,
            index: Mutex::new(HashMap::new()),
        }
    }

    /// Validates `doc` and publishes it as the active TCB info for its
    /// `(tcb_type, fmspc, version)` triple.
    ///
    /// `now` is read once; the freshness decision is made against this
    /// single timestamp. On success the previously active handle for the
    /// triple, if any, is linked as the submission's predecessor and the
    /// index slot moves to the new handle. Nothing is mutated on failure.
    pub fn upsert_fmspc_tcb(&self, doc: &TcbInfoDocument, now: SystemTime) -> Result<Handle> {
        validator::verify_signature(
            &self.directory,
            &self.registry,
            &self.verifier,
            &doc.raw,
            &doc.signature,
        )?;

        let info = self.parser.parse_basic(&doc.raw)?;
        let levels = self.parser.parse_levels(&doc.raw)?;
        let tdx = if info.has_tdx_module_data() {
            Some(self.parser.parse_tdx_modules(&doc.raw)?)
        } else {
            None
        };
        validator::verify_freshness(&info, now)?;

        let key = codec::derive_key(info.tcb_type, &info.fmspc, info.version);
        let record = match &tdx {
            None => WireRecord::Legacy {
                info: &info,
                levels: &levels,
                raw: &doc.raw,
                signature: &doc.signature,
            },
            Some((module, identities)) => WireRecord::Tdx {
                info: &info,
                module,
                identities,
                levels: &levels,
                raw: &doc.raw,
                signature: &doc.signature,
            },
        };
        let payload = codec::encode(&record)?;

        // Submitting under the index lock keeps upserts for one triple
        // totally ordered and keeps readers from observing a slot whose
        // submission has not yet completed.
        let mut index = self.index.lock().expect("not poisoned");
        let predecessor = index.get(&key).copied();
        let handle = self.registry.submit(SubmitRequest {
            schema_id: self.schema_ids.for_version(info.version),
            payload,
            predecessor,
            expires_at: info.next_update.into(),
        })?;
        index.insert(key, handle);
        log::info!(
            "stored {} TCB info v{} for fmspc {}",
            info.tcb_type,
            info.version,
            info.fmspc
        );
        Ok(handle)
    }

    /// Returns the active document for the triple, or `Ok(None)` if none
    /// has ever been published.
    pub fn tcb_info(
        &self,
        tcb_type: TcbType,
        fmspc: &str,
        version: u32,
    ) -> Result<Option<TcbInfoDocument>> {
        let key = codec::derive_key(tcb_type, fmspc, version);
        let handle = {
            let index = self.index.lock().expect("not poisoned");
            index.get(&key).copied()
        };
        let Some(handle) = handle else {
            return Ok(None);
        };
        let payload = self.registry.fetch(handle)?;
        let (raw, signature) = codec::decode(&payload, version)?;
        Ok(Some(TcbInfoDocument { raw, signature }))
    }

    /// Certificates anchoring TCB document signatures: the signing
    /// certificate and the root that issued it.
    pub fn tcb_issuer_chain(&self) -> Result<IssuerChain> {
        let signing = self.role_cert(CaRole::Signing)?;
        let root = self.role_cert(CaRole::Root)?;
        Ok(IssuerChain { signing, root })
    }

    fn role_cert(&self, role: CaRole) -> Result<Vec<u8>> {
        let handle = self.directory.cert_handle(role).ok_or(Error::NotFound)?;
        self.registry.fetch(handle)
    }
}
