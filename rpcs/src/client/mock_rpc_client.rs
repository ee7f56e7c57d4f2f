// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! This module exposes a [`MockRpcClient`], which responds to method and
//! subscription calls with programmed answers. Useful for testing.

use super::{RawRpcFuture, RawRpcSubscription, RpcClientT};
use crate::Error;
use futures::StreamExt;
use serde_json::value::RawValue;

type MethodHandler = Box<
    dyn Fn(&str, Option<Box<RawValue>>) -> Result<serde_json::Value, Error>
        + Send
        + Sync
        + 'static,
>;
type SubscriptionHandler = Box<
    dyn Fn(&str, Option<Box<RawValue>>, &str) -> Result<MockSubscription, Error>
        + Send
        + Sync
        + 'static,
>;

/// A canned subscription: an optional subscription id and the messages the
/// stream will yield before ending.
pub struct MockSubscription {
    /// The subscription id handed back to the caller.
    pub id: Option<String>,
    /// The messages the stream yields, in order.
    pub items: Vec<serde_json::Value>,
}

impl MockSubscription {
    /// A subscription with the given id and messages.
    pub fn new(id: impl Into<String>, items: Vec<serde_json::Value>) -> Self {
        MockSubscription {
            id: Some(id.into()),
            items,
        }
    }

    fn into_raw(self) -> RawRpcSubscription {
        let items = self
            .items
            .into_iter()
            .map(to_raw_value)
            .collect::<Vec<_>>();
        RawRpcSubscription {
            stream: futures::stream::iter(items).boxed(),
            id: self.id,
        }
    }
}

/// A mock RPC client that responds programmatically to requests.
pub struct MockRpcClient {
    method_handler: MethodHandler,
    subscription_handler: SubscriptionHandler,
}

impl MockRpcClient {
    /// Create a [`MockRpcClient`] from a function handling method calls and
    /// a function handling subscription calls. Handlers receive the method
    /// name and raw params; the subscription handler additionally receives
    /// the unsubscribe method name.
    pub fn from_handlers<M, S>(method_handler: M, subscription_handler: S) -> MockRpcClient
    where
        M: Fn(&str, Option<Box<RawValue>>) -> Result<serde_json::Value, Error>
            + Send
            + Sync
            + 'static,
        S: Fn(&str, Option<Box<RawValue>>, &str) -> Result<MockSubscription, Error>
            + Send
            + Sync
            + 'static,
    {
        MockRpcClient {
            method_handler: Box::new(method_handler),
            subscription_handler: Box::new(subscription_handler),
        }
    }
}

impl RpcClientT for MockRpcClient {
    fn request_raw<'a>(
        &'a self,
        method: &'a str,
        params: Option<Box<RawValue>>,
    ) -> RawRpcFuture<'a, Box<RawValue>> {
        let res = (self.method_handler)(method, params).and_then(to_raw_value);
        Box::pin(async move { res })
    }

    fn subscribe_raw<'a>(
        &'a self,
        sub: &'a str,
        params: Option<Box<RawValue>>,
        unsub: &'a str,
    ) -> RawRpcFuture<'a, RawRpcSubscription> {
        let res = (self.subscription_handler)(sub, params, unsub).map(MockSubscription::into_raw);
        Box::pin(async move { res })
    }
}

fn to_raw_value(val: serde_json::Value) -> Result<Box<RawValue>, Error> {
    let res = serde_json::to_string(&val).map_err(Error::Deserialization)?;
    RawValue::from_string(res).map_err(Error::Deserialization)
}
