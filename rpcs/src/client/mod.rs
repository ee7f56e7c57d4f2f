// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! RPC types and client for interacting with a substrate node.
//!
//! The core pieces are:
//!
//! - [`RpcClientT`] is the underlying dynamic RPC implementation, providing
//!   the low level [`RpcClientT::request_raw`] and
//!   [`RpcClientT::subscribe_raw`] methods.
//! - [`RpcClient`] is the higher level wrapper around this, offering
//!   the [`RpcClient::request`] and [`RpcClient::subscribe`] methods.
//!
//! Implementations are exposed depending on which features are enabled:
//!
//! - **jsonrpsee**: a websocket RPC client based on `jsonrpsee`.
//! - **mock-rpc-client**: a programmable mock client for tests.

crate::macros::cfg_jsonrpsee! {
    mod jsonrpsee_impl;
    pub use jsonrpsee::core::client::Client as JsonrpseeRpcClient;
}

#[cfg(any(test, feature = "mock-rpc-client"))]
pub mod mock_rpc_client;
#[cfg(any(test, feature = "mock-rpc-client"))]
pub use mock_rpc_client::MockRpcClient;

mod rpc_client;
mod rpc_client_t;

pub use rpc_client::{RpcClient, RpcParams, RpcSubscription, rpc_params};
pub use rpc_client_t::{RawRpcFuture, RawRpcSubscription, RawValue, RpcClientT};
