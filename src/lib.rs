//
// Copyright 2024 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Validating cache for Intel TCB ("Trusted Computing Base") information.
//!
//! TCB info documents describe the security-patch state of a family of
//! hardware platforms. [`store::TcbStore`] admits signed documents after
//! checking their provenance and validity window, then forwards them to an
//! append-only attestation registry. An internal index maps each
//! `(technology, FMSPC, version)` triple to the handle of its active
//! document, so lookups are a single fetch.

pub mod error;
pub mod pki;
pub mod registry;
pub mod store;
pub mod tcb_info;

mod codec;
mod expireable;
mod validator;

#[cfg(test)]
mod fakes;
