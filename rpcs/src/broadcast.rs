// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! Broadcast transactions with `transaction_v1_broadcast` and watch their
//! progress.

use crate::client::{RpcClient, RpcSubscription, rpc_params};
use crate::utils::to_hex;
use crate::{BlockHash, Error};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::task::Poll;

/// Transaction progress events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[serde(tag = "event")]
pub enum TransactionStatus<Hash> {
    /// Transaction is part of the future queue.
    Validated,
    /// The transaction has been broadcast to other nodes.
    Broadcasted,
    /// Transaction has been included in block with given details.
    /// Null is returned if the transaction is no longer in any block
    /// of the best chain.
    BestChainBlockIncluded {
        /// Details of the block it's been seen in.
        block: Option<TransactionBlockDetails<Hash>>,
    },
    /// The transaction is in a block that's been finalized.
    Finalized {
        /// Details of the block it's been seen in.
        block: TransactionBlockDetails<Hash>,
    },
    /// Something went wrong in the node.
    Error {
        /// Human readable message; what went wrong.
        error: String,
    },
    /// Transaction is invalid (bad nonce, signature etc).
    Invalid {
        /// Human readable message; why was it invalid.
        error: String,
    },
    /// The transaction was dropped.
    Dropped {
        /// Human readable message; why was it dropped.
        error: String,
    },
}

/// Details of a block that a transaction is seen in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TransactionBlockDetails<Hash> {
    /// The block hash.
    pub hash: Hash,
    /// The index of the transaction in the block. Servers have sent this
    /// both as a number and as a string containing one.
    #[serde(deserialize_with = "number_or_string")]
    pub index: u64,
}

fn number_or_string<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// A transaction being broadcast to the network.
///
/// The operation is live until this is dropped (the RPC client then issues
/// `transaction_v1_stop` for us, exactly once) or until
/// [`stop_broadcast`] is called with the operation id.
pub struct TransactionBroadcast<Hash> {
    operation_id: String,
    sub: RpcSubscription<TransactionStatus<Hash>>,
}

impl<Hash: BlockHash> TransactionBroadcast<Hash> {
    /// Hex encode an extrinsic and broadcast it, returning a handle carrying
    /// the server-minted operation id and the stream of progress events.
    pub async fn broadcast(client: &RpcClient, extrinsic: &[u8]) -> Result<Self, Error> {
        let sub = client
            .subscribe(
                "transaction_v1_broadcast",
                rpc_params![to_hex(extrinsic)],
                "transaction_v1_stop",
            )
            .await?;
        let operation_id = sub
            .subscription_id()
            .ok_or_else(|| {
                Error::Client("the transaction_v1_broadcast subscription returned no id".into())
            })?
            .to_owned();
        tracing::debug!(operation = %operation_id, "transaction broadcast started");

        Ok(TransactionBroadcast { operation_id, sub })
    }

    /// The operation id correlating this broadcast on the server.
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Fetch the next progress event.
    pub async fn next_event(&mut self) -> Option<Result<TransactionStatus<Hash>, Error>> {
        StreamExt::next(self).await
    }
}

impl<Hash: BlockHash> Stream for TransactionBroadcast<Hash> {
    type Item = Result<TransactionStatus<Hash>, Error>;

    fn poll_next(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        self.get_mut().sub.poll_next_unpin(cx)
    }
}

/// Stop broadcasting the transaction with the given operation id.
///
/// Errors if the operation id does not correspond to an active broadcast on
/// this connection.
pub async fn stop_broadcast(client: &RpcClient, operation_id: &str) -> Result<(), Error> {
    client
        .request("transaction_v1_stop", rpc_params![operation_id])
        .await
}
