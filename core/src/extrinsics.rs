// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! Encoding and decoding the extrinsic wire format.
//!
//! An extrinsic begins with a SCALE compact length, followed by a version
//! byte whose top two bits flag "signed" and (for version 5) "general", and
//! then a payload whose layout depends on those flags. Five version bytes are
//! valid on the wire: `0x04`/`0x84` (V4 bare/signed) and
//! `0x05`/`0x45`/`0x85` (V5 bare/general/signed).

use crate::chain_info::ChainInfo;
use crate::error::ExtrinsicError;
use crate::extensions::{ExtensionMap, decode_extra, encode_extra_to};
use crate::utils::{MultiAddress, MultiSignature, SignatureType, strip_compact_prefix};
use codec::{Compact, Decode, Encode};

/// Version byte bit 7: the extrinsic carries an address + signature envelope.
const SIGNED_MASK: u8 = 0b1000_0000;
/// Version byte bit 6 (V5 only): the extrinsic is in "general" form.
const GENERAL_MASK: u8 = 0b0100_0000;

/// Everything needed to encode a signed extrinsic.
#[derive(Debug, Clone)]
pub struct SignedData {
    /// The signer's address bytes; 32 or 20 bytes select the `Id` and
    /// `Address20` variants, anything else travels `Raw`.
    pub signer: Vec<u8>,
    /// The raw signature bytes (64 for Ed25519/Sr25519, 65 for ECDSA).
    pub signature: Vec<u8>,
    /// The scheme the signature was produced with.
    pub signature_type: SignatureType,
    /// The in-block extension values.
    pub extensions: ExtensionMap,
    /// The signing-payload-only extension values.
    pub additional_signed: ExtensionMap,
    /// The already SCALE encoded call bytes.
    pub call_data: Vec<u8>,
    /// The payload that was signed; carried for diagnostics, not encoded.
    pub signing_payload: Vec<u8>,
}

/// Encodes extrinsics at the format version detected from a [`ChainInfo`],
/// and decodes any extrinsic of either format generation.
#[derive(Debug, Clone)]
pub struct ExtrinsicEncoder<'info> {
    chain_info: &'info ChainInfo,
    version: u8,
}

impl<'info> ExtrinsicEncoder<'info> {
    /// Create an encoder for the given chain. The target format version is
    /// detected once, here, and fixed for the encoder's lifetime.
    pub fn new(chain_info: &'info ChainInfo) -> Self {
        let version = chain_info.detected_version();
        tracing::debug!(version, "encoding extrinsics at detected format version");
        ExtrinsicEncoder {
            chain_info,
            version,
        }
    }

    /// The extrinsic format version this encoder targets (4 or 5).
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Encode a bare (V5) or unsigned (V4) extrinsic: just the version byte
    /// and the call, length prefixed.
    pub fn encode_unsigned(&self, call_data: &[u8]) -> Vec<u8> {
        bare_bytes(self.version, call_data)
    }

    /// Encode a signed extrinsic from its parts. The address and signature
    /// envelopes are chosen from the signer length and signature type.
    pub fn encode(&self, data: &SignedData) -> Result<Vec<u8>, ExtrinsicError> {
        let address = MultiAddress::from_signer(&data.signer);
        let signature = MultiSignature::from_bytes(data.signature_type, &data.signature)?;
        signed_bytes(
            self.chain_info,
            self.version,
            &address,
            &signature,
            &data.extensions,
            &data.call_data,
        )
    }

    /// Encode a V5 "general" extrinsic: no signature envelope, but an
    /// extension version byte and the extension values up front. Fails unless
    /// the detected format version is 5.
    pub fn encode_general(
        &self,
        call_data: &[u8],
        extensions: &ExtensionMap,
        extension_version: u8,
    ) -> Result<Vec<u8>, ExtrinsicError> {
        if self.version != 5 {
            return Err(ExtrinsicError::UnsupportedVersion(self.version));
        }
        general_bytes(self.chain_info, extension_version, extensions, call_data)
    }

    /// Decode an extrinsic produced by any of the encoding modes. The result
    /// re-encodes to the input bytes exactly.
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedExtrinsic, ExtrinsicError> {
        let (len, rest) =
            strip_compact_prefix(bytes).map_err(|e| ExtrinsicError::Decode(e.to_string()))?;
        if len as usize != rest.len() {
            return Err(ExtrinsicError::Decode(format!(
                "length prefix says {len} bytes but {} follow it",
                rest.len()
            )));
        }
        let (&version_byte, mut cursor) = rest
            .split_first()
            .ok_or_else(|| ExtrinsicError::Decode("no version byte".into()))?;

        match version_byte {
            0x04 | 0x05 => Ok(DecodedExtrinsic::Bare {
                version: version_byte,
                call_data: cursor.to_vec(),
            }),
            0x84 | 0x85 => {
                let address = MultiAddress::decode(&mut cursor)
                    .map_err(|e| ExtrinsicError::Decode(format!("bad address: {e}")))?;
                let signature = MultiSignature::decode(&mut cursor)
                    .map_err(|e| ExtrinsicError::Decode(format!("bad signature: {e}")))?;
                let extensions = decode_extra(self.chain_info, &mut cursor)?;
                Ok(DecodedExtrinsic::Signed {
                    version: version_byte & !SIGNED_MASK,
                    address,
                    signature,
                    extensions,
                    call_data: cursor.to_vec(),
                })
            }
            0x45 => {
                let (&extension_version, mut cursor) = cursor
                    .split_first()
                    .ok_or_else(|| ExtrinsicError::Decode("no extension version byte".into()))?;
                let extensions = decode_extra(self.chain_info, &mut cursor)?;
                Ok(DecodedExtrinsic::General {
                    extension_version,
                    extensions,
                    call_data: cursor.to_vec(),
                })
            }
            other => Err(ExtrinsicError::UnsupportedVersion(other)),
        }
    }
}

/// An extrinsic taken apart by [`ExtrinsicEncoder::decode`].
#[derive(Debug, Clone)]
pub enum DecodedExtrinsic {
    /// A V4 unsigned or V5 bare extrinsic. `version` is the full version
    /// byte (`0x04` or `0x05`).
    Bare {
        /// The version byte.
        version: u8,
        /// The call bytes.
        call_data: Vec<u8>,
    },
    /// A V4 or V5 signed extrinsic. `version` is the version number with the
    /// signed bit stripped (4 or 5).
    Signed {
        /// The format version number (4 or 5).
        version: u8,
        /// The sender's address envelope.
        address: MultiAddress,
        /// The signature envelope.
        signature: MultiSignature,
        /// The in-block extension values.
        extensions: ExtensionMap,
        /// The call bytes.
        call_data: Vec<u8>,
    },
    /// A V5 general extrinsic.
    General {
        /// The transaction extension version byte.
        extension_version: u8,
        /// The in-block extension values.
        extensions: ExtensionMap,
        /// The call bytes.
        call_data: Vec<u8>,
    },
}

impl DecodedExtrinsic {
    /// Re-encode this extrinsic. For anything produced by
    /// [`ExtrinsicEncoder::decode`] this returns the original bytes.
    pub fn to_bytes(&self, chain_info: &ChainInfo) -> Result<Vec<u8>, ExtrinsicError> {
        match self {
            DecodedExtrinsic::Bare { version, call_data } => Ok(bare_bytes(*version, call_data)),
            DecodedExtrinsic::Signed {
                version,
                address,
                signature,
                extensions,
                call_data,
            } => signed_bytes(chain_info, *version, address, signature, extensions, call_data),
            DecodedExtrinsic::General {
                extension_version,
                extensions,
                call_data,
            } => general_bytes(chain_info, *extension_version, extensions, call_data),
        }
    }
}

fn bare_bytes(version: u8, call_data: &[u8]) -> Vec<u8> {
    let mut inner = Vec::with_capacity(call_data.len() + 1);
    inner.push(version);
    inner.extend_from_slice(call_data);
    length_prefixed(inner)
}

fn signed_bytes(
    chain_info: &ChainInfo,
    version: u8,
    address: &MultiAddress,
    signature: &MultiSignature,
    extensions: &ExtensionMap,
    call_data: &[u8],
) -> Result<Vec<u8>, ExtrinsicError> {
    let mut inner = Vec::new();
    inner.push(SIGNED_MASK | version);
    address.encode_to(&mut inner);
    signature.encode_to(&mut inner);
    encode_extra_to(chain_info, extensions, &mut inner)?;
    inner.extend_from_slice(call_data);
    Ok(length_prefixed(inner))
}

fn general_bytes(
    chain_info: &ChainInfo,
    extension_version: u8,
    extensions: &ExtensionMap,
    call_data: &[u8],
) -> Result<Vec<u8>, ExtrinsicError> {
    let mut inner = Vec::new();
    inner.push(GENERAL_MASK | 5);
    inner.push(extension_version);
    encode_extra_to(chain_info, extensions, &mut inner)?;
    inner.extend_from_slice(call_data);
    Ok(length_prefixed(inner))
}

fn length_prefixed(inner: Vec<u8>) -> Vec<u8> {
    let len =
        Compact(u32::try_from(inner.len()).expect("extrinsic size expected to be <4GB"));
    let mut encoded = Vec::with_capacity(inner.len() + 4);
    len.encode_to(&mut encoded);
    encoded.extend(inner);
    encoded
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::extensions::{ExtensionBuilder, StandardParams};
    use crate::testing::{
        kusama_like_chain_info, minimal_chain_info, v5_kusama_like_chain_info,
        v5_minimal_chain_info,
    };
    use crate::utils::H256;
    use assert_matches::assert_matches;

    fn signed_data(info: &ChainInfo, signer: Vec<u8>, signature: Vec<u8>) -> SignedData {
        let (extensions, additional_signed) = ExtensionBuilder::new(info)
            .set_standard(StandardParams {
                spec_version: 9122,
                transaction_version: 7,
                genesis_hash: H256([0xaa; 32]),
                block_hash: H256([0xbb; 32]),
                block_number: 100,
                nonce: 3,
                era_period: Some(64),
                tip: 1,
            })
            .into_maps();
        let call_data = vec![0x06, 0x00];
        let signing_payload = crate::signer_payload::signer_payload(
            info,
            &call_data,
            &extensions,
            &additional_signed,
        )
        .unwrap();
        SignedData {
            signature_type: SignatureType::infer(&signature),
            signer,
            signature,
            extensions,
            additional_signed,
            call_data,
            signing_payload,
        }
    }

    #[test]
    fn known_bare_encodings() {
        // V5 bare, two byte call.
        let v5_chain_info = v5_minimal_chain_info();
        let v5 = ExtrinsicEncoder::new(&v5_chain_info);
        assert_eq!(hex::encode(v5.encode_unsigned(&[0x00, 0x01])), "0c050001");
        // V5 bare, single byte call.
        assert_eq!(hex::encode(v5.encode_unsigned(&[0xff])), "0805ff");

        // V4 unsigned, two byte call.
        let v4_chain_info = minimal_chain_info();
        let v4 = ExtrinsicEncoder::new(&v4_chain_info);
        assert_eq!(hex::encode(v4.encode_unsigned(&[0x00, 0x01])), "0c040001");
        // V4 unsigned, empty call.
        assert_eq!(hex::encode(v4.encode_unsigned(&[])), "0404");
    }

    #[test]
    fn v5_signed_layout() {
        let info = v5_minimal_chain_info();
        let encoder = ExtrinsicEncoder::new(&info);
        assert_eq!(encoder.version(), 5);

        let signer: Vec<u8> = (0..32).collect();
        let data = SignedData {
            signer: signer.clone(),
            signature: vec![0u8; 64],
            signature_type: SignatureType::infer(&[0u8; 64]),
            extensions: ExtensionMap::new(),
            additional_signed: ExtensionMap::new(),
            call_data: Vec::new(),
            signing_payload: Vec::new(),
        };
        let bytes = encoder.encode(&data).unwrap();
        let (_, body) = strip_compact_prefix(&bytes).unwrap();

        assert_eq!(body[0], 0x85);
        assert_eq!(body[1], 0x00, "32 byte signer takes the Id variant");
        assert_eq!(&body[2..34], &signer[..]);
        assert_eq!(body[34], 0x00, "zero signature infers as Ed25519");
        assert_eq!(&body[35..99], &[0u8; 64]);
        assert_eq!(body.len(), 99);
    }

    #[test]
    fn general_mode_is_v5_only() {
        let v5 = v5_minimal_chain_info();
        let bytes = ExtrinsicEncoder::new(&v5)
            .encode_general(&[0x00, 0x01], &ExtensionMap::new(), 3)
            .unwrap();
        let (_, body) = strip_compact_prefix(&bytes).unwrap();
        assert_eq!(body[0], 0x45);
        assert_eq!(body[1], 3);
        assert_eq!(&body[2..], &[0x00, 0x01]);

        let v4 = minimal_chain_info();
        assert_matches!(
            ExtrinsicEncoder::new(&v4).encode_general(&[], &ExtensionMap::new(), 0),
            Err(ExtrinsicError::UnsupportedVersion(4))
        );
    }

    #[test]
    fn missing_extensions_fail_signed_encoding() {
        let info = v5_kusama_like_chain_info();
        let encoder = ExtrinsicEncoder::new(&info);
        let data = SignedData {
            signer: vec![1; 32],
            signature: vec![0; 64],
            signature_type: SignatureType::Sr25519,
            extensions: ExtensionMap::new(),
            additional_signed: ExtensionMap::new(),
            call_data: vec![0x00],
            signing_payload: Vec::new(),
        };
        assert_matches!(
            encoder.encode(&data),
            Err(ExtrinsicError::MissingExtensionValue(_))
        );
    }

    #[test]
    fn encoding_is_deterministic() {
        let info = kusama_like_chain_info();
        let encoder = ExtrinsicEncoder::new(&info);
        let data = signed_data(&info, vec![5; 32], vec![0x11; 64]);
        assert_eq!(encoder.encode(&data).unwrap(), encoder.encode(&data).unwrap());
    }

    #[test]
    fn signed_extrinsics_round_trip_v4() {
        let info = kusama_like_chain_info();
        let encoder = ExtrinsicEncoder::new(&info);
        let data = signed_data(&info, vec![5; 32], vec![0x11; 64]);

        let bytes = encoder.encode(&data).unwrap();
        let (_, body) = strip_compact_prefix(&bytes).unwrap();
        assert_eq!(body[0], 0x84);

        let decoded = encoder.decode(&bytes).unwrap();
        assert_matches!(
            &decoded,
            DecodedExtrinsic::Signed { version: 4, address: MultiAddress::Id(id), .. } if *id == [5u8; 32]
        );
        assert_eq!(decoded.to_bytes(&info).unwrap(), bytes);
    }

    #[test]
    fn signed_extrinsics_round_trip_v5() {
        let info = v5_kusama_like_chain_info();
        let encoder = ExtrinsicEncoder::new(&info);
        // A 65 byte signature takes the ECDSA variant.
        let data = signed_data(&info, vec![9; 20], vec![0x22; 65]);

        let bytes = encoder.encode(&data).unwrap();
        let decoded = encoder.decode(&bytes).unwrap();
        assert_matches!(
            &decoded,
            DecodedExtrinsic::Signed {
                version: 5,
                address: MultiAddress::Address20(_),
                signature: MultiSignature::Ecdsa(_),
                ..
            }
        );
        assert_eq!(decoded.to_bytes(&info).unwrap(), bytes);
    }

    #[test]
    fn general_extrinsics_round_trip() {
        let info = v5_kusama_like_chain_info();
        let encoder = ExtrinsicEncoder::new(&info);
        let (extensions, _) = ExtensionBuilder::new(&info)
            .set_standard(StandardParams {
                spec_version: 1,
                transaction_version: 1,
                genesis_hash: H256([0; 32]),
                block_hash: H256([0; 32]),
                block_number: 8,
                nonce: 42,
                era_period: Some(128),
                tip: 0,
            })
            .into_maps();

        let bytes = encoder
            .encode_general(&[0x0a, 0x01, 0x02], &extensions, 0)
            .unwrap();
        let decoded = encoder.decode(&bytes).unwrap();
        assert_matches!(&decoded, DecodedExtrinsic::General { extension_version: 0, .. });
        assert_eq!(decoded.to_bytes(&info).unwrap(), bytes);
    }

    #[test]
    fn bare_extrinsics_round_trip() {
        for info in [minimal_chain_info(), v5_minimal_chain_info()] {
            let encoder = ExtrinsicEncoder::new(&info);
            let bytes = encoder.encode_unsigned(&[0x01, 0x02, 0x03]);
            let decoded = encoder.decode(&bytes).unwrap();
            assert_matches!(
                &decoded,
                DecodedExtrinsic::Bare { call_data, .. } if call_data == &[0x01, 0x02, 0x03]
            );
            assert_eq!(decoded.to_bytes(&info).unwrap(), bytes);
        }
    }

    #[test]
    fn unknown_version_bytes_are_rejected() {
        let info = minimal_chain_info();
        let encoder = ExtrinsicEncoder::new(&info);
        for version_byte in [0x00u8, 0x03, 0x06, 0x44, 0x46, 0x83, 0xc5] {
            let bytes = length_prefixed(vec![version_byte, 0x00]);
            assert_matches!(
                encoder.decode(&bytes),
                Err(ExtrinsicError::UnsupportedVersion(v)) if v == version_byte
            );
        }
    }

    #[test]
    fn bad_length_prefixes_are_rejected() {
        let info = minimal_chain_info();
        let encoder = ExtrinsicEncoder::new(&info);

        // Prefix claims more bytes than are present.
        let mut bytes = Vec::new();
        Compact(10u32).encode_to(&mut bytes);
        bytes.extend_from_slice(&[0x04, 0x00]);
        assert_matches!(encoder.decode(&bytes), Err(ExtrinsicError::Decode(_)));

        // Empty input.
        assert_matches!(encoder.decode(&[]), Err(ExtrinsicError::Decode(_)));
    }
}
