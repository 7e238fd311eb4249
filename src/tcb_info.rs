//
// Copyright 2024 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Typed TCB info fields and the parser that extracts them from raw
//! documents.
//!
//! Intel publishes TCB info as signed JSON; the document format changed at
//! version 3, which added TDX module data alongside the SGX fields. The
//! parser is a trait so deployments with a different collateral source can
//! supply their own; [`JsonTcbInfoParser`] handles Intel's format.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// First document version whose wire shape carries TDX module data.
pub const TDX_SCHEMA_MIN_VERSION: u32 = 3;

/// Hardware technology a TCB info document describes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
#[repr(u8)]
pub enum TcbType {
    Sgx = 0,
    Tdx = 1,
}

/// Identity and validity window of one TCB info document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcbInfo {
    pub tcb_type: TcbType,
    pub fmspc: String,
    pub version: u32,
    pub issue_date: DateTime<Utc>,
    pub next_update: DateTime<Utc>,
}

impl TcbInfo {
    /// Whether this document's version carries TDX module data on the wire.
    pub fn has_tdx_module_data(&self) -> bool {
        self.version >= TDX_SCHEMA_MIN_VERSION
    }
}

/// One security-patch tier from a TCB info document.
///
/// The component map under `tcb` differs between technologies and document
/// versions; it is carried opaquely and round-tripped unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcbLevel {
    pub tcb: serde_json::Value,
    pub tcb_date: String,
    pub tcb_status: String,
    #[serde(rename = "advisoryIDs", default, skip_serializing_if = "Vec::is_empty")]
    pub advisory_ids: Vec<String>,
}

/// Measurement of the TDX SEAM module's signer, hex-encoded as published.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TdxModule {
    pub mrsigner: String,
    pub attributes: String,
    pub attributes_mask: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TdxModuleIdentity {
    pub id: String,
    pub mrsigner: String,
    pub attributes: String,
    pub attributes_mask: String,
    #[serde(default)]
    pub tcb_levels: Vec<TcbLevel>,
}

/// A raw TCB info document paired with its issuer signature.
///
/// This is what callers submit on the write path and what lookups return:
/// the registry, not this cache, is the source of truth for the structured
/// fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcbInfoDocument {
    pub raw: String,
    pub signature: Vec<u8>,
}

/// Extracts typed fields from a raw TCB info document.
pub trait TcbInfoParser {
    fn parse_basic(&self, raw: &str) -> Result<TcbInfo>;

    fn parse_levels(&self, raw: &str) -> Result<Vec<TcbLevel>>;

    /// Only meaningful for documents whose version carries TDX module data.
    fn parse_tdx_modules(&self, raw: &str) -> Result<(TdxModule, Vec<TdxModuleIdentity>)>;
}

impl<P: TcbInfoParser + ?Sized> TcbInfoParser for &P {
    fn parse_basic(&self, raw: &str) -> Result<TcbInfo> {
        (**self).parse_basic(raw)
    }

    fn parse_levels(&self, raw: &str) -> Result<Vec<TcbLevel>> {
        (**self).parse_levels(raw)
    }

    fn parse_tdx_modules(&self, raw: &str) -> Result<(TdxModule, Vec<TdxModuleIdentity>)> {
        (**self).parse_tdx_modules(raw)
    }
}

/// [`TcbInfoParser`] for Intel's TCB info JSON object format.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonTcbInfoParser;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTcbInfo {
    id: Option<String>,
    version: u32,
    issue_date: DateTime<Utc>,
    next_update: DateTime<Utc>,
    fmspc: String,
    #[serde(default)]
    tcb_levels: Vec<TcbLevel>,
    tdx_module: Option<TdxModule>,
    #[serde(default)]
    tdx_module_identities: Vec<TdxModuleIdentity>,
}

impl RawTcbInfo {
    fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    fn tcb_type(&self) -> Result<TcbType> {
        match &self.id {
            Some(id) => TcbType::from_str(id)
                .map_err(|_| Error::InvalidDocument(format!("unrecognized TCB id {id:?}"))),
            // documents predating the TDX-capable format are implicitly SGX
            None if self.version < TDX_SCHEMA_MIN_VERSION => Ok(TcbType::Sgx),
            None => Err(Error::InvalidDocument("missing TCB id".to_string())),
        }
    }
}

impl TcbInfoParser for JsonTcbInfoParser {
    fn parse_basic(&self, raw: &str) -> Result<TcbInfo> {
        let parsed = RawTcbInfo::parse(raw)?;
        Ok(TcbInfo {
            tcb_type: parsed.tcb_type()?,
            fmspc: parsed.fmspc,
            version: parsed.version,
            issue_date: parsed.issue_date,
            next_update: parsed.next_update,
        })
    }

    fn parse_levels(&self, raw: &str) -> Result<Vec<TcbLevel>> {
        Ok(RawTcbInfo::parse(raw)?.tcb_levels)
    }

    fn parse_tdx_modules(&self, raw: &str) -> Result<(TdxModule, Vec<TdxModuleIdentity>)> {
        let parsed = RawTcbInfo::parse(raw)?;
        // SGX documents in the TDX-capable format legitimately omit both
        Ok((
            parsed.tdx_module.unwrap_or_default(),
            parsed.tdx_module_identities,
        ))
    }
}
