// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

use crate::Error;
use futures::Stream;
use std::{future::Future, pin::Pin};

// Re-exporting for simplicity since it's used a bunch in the trait definition.
pub use serde_json::value::RawValue;

/// The low level JSON-RPC capability everything in this crate is built on.
/// Implementations of this can be used to instantiate an [`super::RpcClient`].
///
/// Methods take already-serialized parameters and hand back still-serialized
/// [`RawValue`]s, deferring deserialization to the caller; this keeps the
/// trait object safe and avoids re-serializing on the way through.
///
/// The `unsub` method name given to [`RpcClientT::subscribe_raw`] is the
/// cancellation hook: implementations must call it on the server when the
/// returned stream is dropped before the server ends it. Sessions leak
/// server side without this.
///
/// # Panics
///
/// Implementations are free to panic if the `RawValue`'s passed to
/// `request_raw` or `subscribe_raw` are not JSON arrays. Internally, we
/// ensure that this is always the case.
pub trait RpcClientT: Send + Sync + 'static {
    /// Make a raw request for which we expect a single response back from.
    /// The params will either be `None`, or an already-serialized JSON array
    /// of parameters.
    ///
    /// Prefer to use the interface provided on [`super::RpcClient`] where possible.
    fn request_raw<'a>(
        &'a self,
        method: &'a str,
        params: Option<Box<RawValue>>,
    ) -> RawRpcFuture<'a, Box<RawValue>>;

    /// Subscribe to some method, naming the method used to unsubscribe from
    /// it again. The params will either be `None`, or an already-serialized
    /// JSON array of parameters.
    ///
    /// Prefer to use the interface provided on [`super::RpcClient`] where possible.
    fn subscribe_raw<'a>(
        &'a self,
        sub: &'a str,
        params: Option<Box<RawValue>>,
        unsub: &'a str,
    ) -> RawRpcFuture<'a, RawRpcSubscription>;
}

/// A boxed future that is returned from the [`RpcClientT`] methods.
pub type RawRpcFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send + 'a>>;

/// The RPC subscription returned from [`RpcClientT`]'s `subscribe_raw` method.
pub struct RawRpcSubscription {
    /// The subscription stream.
    pub stream: Pin<Box<dyn Stream<Item = Result<Box<RawValue>, Error>> + Send + 'static>>,
    /// The ID associated with the subscription.
    pub id: Option<String>,
}

impl<T: RpcClientT> RpcClientT for std::sync::Arc<T> {
    fn request_raw<'a>(
        &'a self,
        method: &'a str,
        params: Option<Box<RawValue>>,
    ) -> RawRpcFuture<'a, Box<RawValue>> {
        (**self).request_raw(method, params)
    }

    fn subscribe_raw<'a>(
        &'a self,
        sub: &'a str,
        params: Option<Box<RawValue>>,
        unsub: &'a str,
    ) -> RawRpcFuture<'a, RawRpcSubscription> {
        (**self).subscribe_raw(sub, params, unsub)
    }
}
