// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! Construct, sign and encode transactions ("extrinsics") for Substrate
//! based chains, driven entirely by resolved chain metadata.
//!
//! The crate is deliberately transport free and pure: it consumes a
//! [`ChainInfo`] (produced by parsing runtime metadata elsewhere) and byte
//! slices, and produces bytes. The pieces compose in pipeline order:
//!
//! - [`chain_info`]: the consumed chain description: type registry,
//!   supported extrinsic format versions, and the ordered transaction
//!   extension schema. Format version detection lives here.
//! - [`extensions`]: populate one value per extension identifier, split into
//!   the in-block map and the signing-payload-only map.
//! - [`signer_payload`]: assemble the exact bytes a signer signs, hashing
//!   payloads over 256 bytes.
//! - [`extrinsics`]: assemble (and take apart) the final wire bytes for the
//!   V4 bare/signed and V5 bare/general/signed modes.
//! - [`utils`]: the era, address and signature envelope types.
//!
//! Signing itself is left to the caller: build the payload, sign it with
//! whatever keypair machinery you use, then hand the signature bytes to
//! [`extrinsics::ExtrinsicEncoder::encode`].

pub mod chain_info;
pub mod error;
pub mod extensions;
pub mod extrinsics;
pub mod signer_payload;
pub mod utils;

#[cfg(test)]
mod testing;

pub use chain_info::{ChainInfo, Extension, ExtrinsicInfo, MetadataGeneration, TypeRegistry};
pub use error::ExtrinsicError;
pub use extensions::{ExtensionBuilder, ExtensionMap, ExtensionValue, StandardParams};
pub use extrinsics::{DecodedExtrinsic, ExtrinsicEncoder, SignedData};
pub use signer_payload::signer_payload;
pub use utils::{Era, MultiAddress, MultiSignature, SignatureType};
