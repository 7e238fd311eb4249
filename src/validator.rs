//
// Copyright 2024 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Admission gates a TCB info document must clear before it may be
//! indexed.

use std::time::SystemTime;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::expireable::Expireable;
use crate::pki::{CaRole, CertAuthorityDirectory, SignatureVerifier};
use crate::registry::AttestationRegistry;
use crate::tcb_info::TcbInfo;

/// Checks the document signature against the currently attested TCB
/// signing certificate.
///
/// Runs before anything derived from the document is trusted: an
/// unverified document must not influence key derivation or reach the
/// registry.
pub(crate) fn verify_signature<D, R, V>(
    directory: &D,
    registry: &R,
    verifier: &V,
    raw: &str,
    signature: &[u8],
) -> Result<()>
where
    D: CertAuthorityDirectory,
    R: AttestationRegistry,
    V: SignatureVerifier,
{
    let handle = directory
        .cert_handle(CaRole::Signing)
        .ok_or(Error::NotFound)?;
    let signing_cert = registry.fetch(handle)?;
    let digest = Sha256::digest(raw.as_bytes());
    if !verifier.verify(&digest, signature, &signing_cert) {
        return Err(Error::InvalidSignature);
    }
    Ok(())
}

/// Rejects documents whose validity window does not include `now`.
pub(crate) fn verify_freshness(info: &TcbInfo, now: SystemTime) -> Result<()> {
    if !info.valid_at(now) {
        return Err(Error::Expired);
    }
    Ok(())
}
