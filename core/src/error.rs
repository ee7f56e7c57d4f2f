// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! The errors that can be emitted while constructing, encoding or decoding
//! transactions.

/// An error that can occur while building a signing payload or encoding or
/// decoding an extrinsic.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExtrinsicError {
    /// The extension schema names a value which was not provided.
    #[error(
        "the chain expects a value for the '{0}' extension, but none was provided; \
         populate it before encoding"
    )]
    MissingExtensionValue(String),
    /// The era extension value was not provided as pre-encoded bytes.
    #[error(
        "the '{0}' extension must carry pre-encoded era bytes; \
         use Era to produce them rather than a dynamic value"
    )]
    EraFormat(String),
    /// The extrinsic version is not one we know how to encode or decode.
    #[error("unsupported extrinsic version byte: {0:#04x}")]
    UnsupportedVersion(u8),
    /// A value could not be encoded or decoded with the codec that the
    /// metadata declares for it.
    #[error("cannot encode/decode the '{identifier}' extension (type id {type_id}): {reason}")]
    Codec {
        /// Identifier of the failing extension.
        identifier: String,
        /// Type id the registry resolved for it.
        type_id: u32,
        /// What the codec reported.
        reason: String,
    },
    /// Signature bytes whose length does not fit the declared signature type.
    #[error("a {signature_type:?} signature cannot be {len} bytes long")]
    SignatureLength {
        /// The declared signature type.
        signature_type: crate::utils::SignatureType,
        /// The length of the bytes we were handed.
        len: usize,
    },
    /// The input bytes ended early, carried trailing garbage, or were
    /// otherwise not a well-formed extrinsic.
    #[error("cannot decode extrinsic: {0}")]
    Decode(String),
}

impl ExtrinsicError {
    pub(crate) fn codec(identifier: &str, type_id: u32, reason: impl core::fmt::Display) -> Self {
        ExtrinsicError::Codec {
            identifier: identifier.to_owned(),
            type_id,
            reason: reason.to_string(),
        }
    }
}
