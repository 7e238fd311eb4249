//
// Copyright 2024 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Certificate-authority roles and the signature primitive the cache
//! depends on.
//!
//! Certificate bytes live in the attestation registry like every other
//! attested object; the directory only maps a role to the handle of the
//! certificate currently filling it.

use crate::registry::Handle;

/// Position in the TCB certificate hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaRole {
    /// issues TCB document signatures
    Signing,
    /// anchors trust for the signing certificate
    Root,
}

/// Maps a CA role to the currently attested certificate for that role.
pub trait CertAuthorityDirectory {
    /// `None` if no certificate has ever been published for `role`.
    fn cert_handle(&self, role: CaRole) -> Option<Handle>;
}

impl<D: CertAuthorityDirectory + ?Sized> CertAuthorityDirectory for &D {
    fn cert_handle(&self, role: CaRole) -> Option<Handle> {
        (**self).cert_handle(role)
    }
}

/// Verifies a digest against a signature with the supplied signer
/// certificate.
///
/// Implementations wrap an X.509/ASN.1 signature primitive. Verification
/// is a pure function; implementations hold no state.
pub trait SignatureVerifier {
    fn verify(&self, digest: &[u8], signature: &[u8], signer_cert: &[u8]) -> bool;
}

impl<V: SignatureVerifier + ?Sized> SignatureVerifier for &V {
    fn verify(&self, digest: &[u8], signature: &[u8], signer_cert: &[u8]) -> bool {
        (**self).verify(digest, signature, signer_cert)
    }
}

/// Raw certificates anchoring TCB document signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerChain {
    pub signing: Vec<u8>,
    pub root: Vec<u8>,
}
