// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! The signature envelope used on the wire by signed extrinsics, and the
//! signature scheme tag used to select its variant.

use crate::error::ExtrinsicError;
use codec::{Decode, Encode};

/// Signature container that can store known signature types. A simplified
/// version of Substrate's `sp_runtime::MultiSignature`.
///
/// The wire format is the variant index byte followed by the raw signature
/// bytes (64 for Ed25519/Sr25519, 65 for ECDSA).
#[derive(Clone, Eq, PartialEq, Debug, Encode, Decode)]
pub enum MultiSignature {
    /// An Ed25519 signature.
    Ed25519([u8; 64]),
    /// An Sr25519 signature.
    Sr25519([u8; 64]),
    /// An ECDSA/SECP256k1 signature.
    Ecdsa([u8; 65]),
}

/// The signature scheme a signature was produced with.
///
/// `Unknown` exists for callers that genuinely cannot know; it encodes as
/// Sr25519, which is what virtually all signing tooling produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureType {
    /// Ed25519.
    Ed25519,
    /// Sr25519 (schnorrkel).
    Sr25519,
    /// ECDSA over secp256k1.
    Ecdsa,
    /// Not stated by the caller; treated as Sr25519 on the wire.
    Unknown,
}

impl SignatureType {
    /// Guess the scheme from raw signature bytes: 65 bytes must be ECDSA,
    /// and for 64 byte signatures the high bit of the final byte
    /// distinguishes Sr25519 (set) from Ed25519 (clear).
    ///
    /// This reflects a convention used by signing tooling; prefer an explicit
    /// type whenever one is available.
    pub fn infer(signature: &[u8]) -> Self {
        match signature.len() {
            65 => SignatureType::Ecdsa,
            64 if signature[63] & 0x80 == 0 => SignatureType::Ed25519,
            64 => SignatureType::Sr25519,
            _ => SignatureType::Unknown,
        }
    }
}

impl MultiSignature {
    /// Wrap raw signature bytes in the variant matching the given scheme.
    /// Fails if the byte length cannot inhabit that variant.
    pub fn from_bytes(
        signature_type: SignatureType,
        signature: &[u8],
    ) -> Result<Self, ExtrinsicError> {
        let wrong_length = |_| ExtrinsicError::SignatureLength {
            signature_type,
            len: signature.len(),
        };
        match signature_type {
            SignatureType::Ed25519 => Ok(MultiSignature::Ed25519(
                signature.try_into().map_err(wrong_length)?,
            )),
            // Unknown defaults to the Sr25519 variant.
            SignatureType::Sr25519 | SignatureType::Unknown => Ok(MultiSignature::Sr25519(
                signature.try_into().map_err(wrong_length)?,
            )),
            SignatureType::Ecdsa => Ok(MultiSignature::Ecdsa(
                signature.try_into().map_err(wrong_length)?,
            )),
        }
    }
}
