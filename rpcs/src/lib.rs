// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! Follow chain head state and submit transactions to Substrate based nodes
//! over JSON-RPC.
//!
//! The pieces, bottom up:
//!
//! - [`client`]: the transport seam. [`RpcClientT`] is the low level,
//!   object-safe capability (request + subscribe, with an unsubscribe method
//!   issued on stream cancellation); [`RpcClient`] is the typed wrapper used
//!   everywhere else. A default websocket implementation based on
//!   `jsonrpsee` sits behind the `jsonrpsee` feature, and a programmable
//!   [`client::MockRpcClient`] behind `mock-rpc-client`.
//! - [`chain_head`]: a long-lived [`ChainHeadSession`] over the
//!   `chainHead_v1_follow` subscription: a typed event stream, pinned block
//!   operations correlated by operation id, and an idempotent unfollow.
//! - [`broadcast`]: submit an encoded extrinsic with
//!   `transaction_v1_broadcast` and watch its progress.
//! - [`chain_data`]: one-shot concurrent fetch of the chain facts needed to
//!   build a transaction (genesis hash, checkpoint block, runtime versions,
//!   account nonce).
//!
//! Extrinsic construction itself lives in `subwire-core`; this crate only
//! moves bytes and JSON.

mod macros;

pub mod broadcast;
pub mod chain_data;
pub mod chain_head;
pub mod client;
pub mod utils;

// Expose the most common things at the top level:
pub use broadcast::TransactionBroadcast;
pub use chain_data::ChainData;
pub use chain_head::ChainHeadSession;
pub use client::{RpcClient, RpcClientT};
pub use utils::Bytes;

/// A trait which is applied to any type that is a valid block hash.
pub trait BlockHash: serde::de::DeserializeOwned + serde::Serialize {}
impl<T> BlockHash for T where T: serde::de::DeserializeOwned + serde::Serialize {}

/// This encapsulates any errors that could be emitted in this crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An error coming from the underlying RPC client or its transport.
    #[error("RPC error: client error: {0}")]
    Client(Box<dyn std::error::Error + Send + Sync + 'static>),
    /// The server answered with a JSON-RPC error object.
    #[error("RPC error: server returned an error: {0}")]
    Rpc(RpcErrorObject),
    /// Cannot deserialize the response.
    #[error("RPC error: cannot deserialize response: {0}")]
    Deserialization(serde_json::Error),
    /// The requested URL is insecure.
    #[error("RPC error: insecure URL: {0}")]
    InsecureUrl(String),
    /// An operation was issued against a chainHead session which has been
    /// unfollowed or stopped.
    #[error("the chainHead session is no longer active")]
    SessionInactive,
    /// The follow stream delivered an event whose tag we do not recognize.
    #[error("unrecognized chainHead event tag: {0}")]
    UnknownFollowEvent(String),
}

/// The `error` member of a JSON-RPC error response.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RpcErrorObject {
    /// The error code.
    pub code: i64,
    /// A short description of the error.
    pub message: String,
    /// Optional additional payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl std::fmt::Display for RpcErrorObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)?;
        if let Some(data) = &self.data {
            write!(f, ": {data}")?;
        }
        Ok(())
    }
}
