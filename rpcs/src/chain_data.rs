// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! A one-shot, concurrent fetch of the chain facts needed to construct a
//! transaction.

use crate::client::{RpcClient, rpc_params};
use crate::{BlockHash, Error};
use serde::Deserialize;

/// The chain facts needed to populate the standard transaction extensions:
/// where the chain started, where its head is, which runtime it is running,
/// and the sender's nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainData<Hash> {
    /// The genesis hash.
    pub genesis_hash: Hash,
    /// The best block hash, used as the mortality checkpoint.
    pub block_hash: Hash,
    /// The best block number.
    pub block_number: u64,
    /// The runtime spec version.
    pub spec_version: u32,
    /// The runtime transaction version.
    pub transaction_version: u32,
    /// The account's next nonce.
    pub nonce: u64,
}

// The slice of `state_getRuntimeVersion` we care about.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuntimeVersion {
    spec_version: u32,
    transaction_version: u32,
}

// The slice of a `chain_getHeader` response we care about: the block number,
// which arrives as a hex string.
#[derive(Debug, Deserialize)]
struct HeaderNumber {
    number: String,
}

impl<Hash: BlockHash> ChainData<Hash> {
    /// Fetch everything in one round of concurrent requests. `account` is
    /// the sender's address in the chain's string format, as accepted by
    /// `system_accountNextIndex`.
    pub async fn fetch(client: &RpcClient, account: &str) -> Result<Self, Error> {
        let genesis_hash = client.request("chainSpec_v1_genesisHash", rpc_params![]);
        let block_hash = client.request("chain_getBlockHash", rpc_params![]);
        let header = client.request::<HeaderNumber>("chain_getHeader", rpc_params![]);
        let runtime_version =
            client.request::<RuntimeVersion>("state_getRuntimeVersion", rpc_params![]);
        let nonce = client.request("system_accountNextIndex", rpc_params![account]);

        let (genesis_hash, block_hash, header, runtime_version, nonce) =
            futures::try_join!(genesis_hash, block_hash, header, runtime_version, nonce)?;

        Ok(ChainData {
            genesis_hash,
            block_hash,
            block_number: parse_hex_number(&header.number)?,
            spec_version: runtime_version.spec_version,
            transaction_version: runtime_version.transaction_version,
            nonce,
        })
    }
}

/// Return the human readable chain name (`chainSpec_v1_chainName`).
pub async fn chain_name(client: &RpcClient) -> Result<String, Error> {
    client.request("chainSpec_v1_chainName", rpc_params![]).await
}

/// The properties most chain specifications declare. Fetched with
/// [`chain_properties`]; chains are free to put anything here, so every
/// field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainProperties {
    /// The SS58 address format prefix.
    pub ss58_format: Option<u16>,
    /// How many decimals one unit of the token has.
    pub token_decimals: Option<u32>,
    /// The token's ticker symbol.
    pub token_symbol: Option<String>,
}

/// Return the JSON payload found in the chain specification under the
/// `properties` key (`chainSpec_v1_properties`). No guarantee is offered
/// about the shape of this object, so the caller decides what to
/// deserialize it into; [`ChainProperties`] covers the common case.
pub async fn chain_properties<Props: serde::de::DeserializeOwned>(
    client: &RpcClient,
) -> Result<Props, Error> {
    client.request("chainSpec_v1_properties", rpc_params![]).await
}

fn parse_hex_number(number: &str) -> Result<u64, Error> {
    use serde::de::Error as _;
    u64::from_str_radix(number.trim_start_matches("0x"), 16).map_err(|e| {
        Error::Deserialization(serde_json::Error::custom(format!(
            "cannot parse block number '{number}': {e}"
        )))
    })
}
