// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! The address envelope used on the wire by signed extrinsics. A simplified
//! version of Substrate's `sp_runtime::MultiAddress`, with the variant index
//! layout preserved exactly.

use codec::{Decode, Encode};

/// A multi-format address wrapper for on-chain accounts.
///
/// The wire format is the variant index byte followed by the variant payload.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Encode, Decode)]
pub enum MultiAddress {
    /// It's an account ID (pubkey).
    Id([u8; 32]),
    /// It's an account index.
    Index(#[codec(compact)] u32),
    /// It's some arbitrary raw bytes.
    Raw(Vec<u8>),
    /// It's a 32 byte representation.
    Address32([u8; 32]),
    /// Its a 20 byte representation.
    Address20([u8; 20]),
}

impl MultiAddress {
    /// Pick the address variant for some signer bytes: 32 bytes are an
    /// account ID, 20 bytes a 20 byte address, and anything else is carried
    /// raw.
    pub fn from_signer(signer: &[u8]) -> Self {
        if let Ok(id) = <[u8; 32]>::try_from(signer) {
            MultiAddress::Id(id)
        } else if let Ok(addr) = <[u8; 20]>::try_from(signer) {
            MultiAddress::Address20(addr)
        } else {
            MultiAddress::Raw(signer.to_vec())
        }
    }
}
