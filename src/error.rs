//
// Copyright 2024 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

/// Error types for TCB info validation and storage.
#[derive(Debug, displaydoc::Display, PartialEq, Eq)]
pub enum Error {
    /// signature does not verify against the current TCB signing certificate
    InvalidSignature,
    /// document validity window does not include the evaluation time
    Expired,
    /// requested item is not present
    NotFound,
    /// stored payload does not match the wire shape for version {version}
    MalformedShape { version: u32 },
    /// TCB info document is malformed: {0}
    InvalidDocument(String),
    /// wire payload could not be encoded: {0}
    Codec(String),
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidDocument(err.to_string())
    }
}

impl From<ciborium::ser::Error<std::io::Error>> for Error {
    fn from(err: ciborium::ser::Error<std::io::Error>) -> Self {
        Error::Codec(err.to_string())
    }
}
