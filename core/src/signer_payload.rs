// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! Assembling the bytes that a signer actually signs.

use crate::chain_info::ChainInfo;
use crate::error::ExtrinsicError;
use crate::extensions::{ExtensionMap, encode_additional_to, encode_extra_to};
use crate::utils::blake2_256;

/// Build the signing payload for some call data and extension values:
/// `call_data ++ extra ++ additional`, in schema order, replaced by its
/// Blake2b-256 digest when the concatenation exceeds 256 bytes.
///
/// These are exactly the bytes a signer must sign and the bytes the node
/// reconstructs to verify the signature; any disagreement in extension
/// values or ordering shows up here first.
pub fn signer_payload(
    chain_info: &ChainInfo,
    call_data: &[u8],
    extensions: &ExtensionMap,
    additional_signed: &ExtensionMap,
) -> Result<Vec<u8>, ExtrinsicError> {
    let mut bytes = call_data.to_vec();
    encode_extra_to(chain_info, extensions, &mut bytes)?;
    encode_additional_to(chain_info, additional_signed, &mut bytes)?;

    if bytes.len() > 256 {
        Ok(blake2_256(&bytes).to_vec())
    } else {
        Ok(bytes)
    }
}
