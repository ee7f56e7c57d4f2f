// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! A session over the `chainHead_v1_follow` subscription. See
//! <https://paritytech.github.io/json-rpc-interface-spec/> for details of the
//! protocol driven here.

use crate::client::{RawValue, RpcClient, RpcSubscription, rpc_params};
use crate::utils::{Bytes, to_hex};
use crate::{BlockHash, Error};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Deserializer, Serialize};
use std::task::Poll;

/// This represents events generated by the `follow` method.
///
/// The block events are generated in the following order:
/// 1. Initialized - generated only once to signal the latest finalized block
/// 2. NewBlock - a new block was added.
/// 3. BestBlockChanged - indicate that the best block is now the one from this event. The block was
///    announced priorly with the `NewBlock` event.
/// 4. Finalized - State the finalized and pruned blocks.
///
/// The following events are related to operations:
/// - OperationBodyDone: The response of the `chainHead_body`
/// - OperationCallDone: The response of the `chainHead_call`
/// - OperationStorageItems: Items produced by the `chainHead_storage`
/// - OperationWaitingForContinue: Generated after OperationStorageItems and requires the user to
///   call `chainHead_continue`
/// - OperationStorageDone: The `chainHead_storage` method has produced all the results
/// - OperationInaccessible: The server was unable to provide the result, retries might succeed in
///   the future
/// - OperationError: The server encountered an error, retries will not succeed
///
/// The stop event indicates that the JSON-RPC server was unable to provide a consistent list of
/// the blocks at the head of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[serde(tag = "event")]
pub enum FollowEvent<Hash> {
    /// The latest finalized block.
    ///
    /// This event is generated only once.
    Initialized(Initialized<Hash>),
    /// A new non-finalized block was added.
    NewBlock(NewBlock<Hash>),
    /// The best block of the chain.
    BestBlockChanged(BestBlockChanged<Hash>),
    /// A list of finalized and pruned blocks.
    Finalized(Finalized<Hash>),
    /// The response of the `chainHead_body` method.
    OperationBodyDone(OperationBodyDone),
    /// The response of the `chainHead_call` method.
    OperationCallDone(OperationCallDone),
    /// Yield one or more items found in the storage.
    OperationStorageItems(OperationStorageItems),
    /// Ask the user to call `chainHead_continue` to produce more events
    /// regarding the operation id.
    OperationWaitingForContinue(OperationId),
    /// The responses of the `chainHead_storage` method have been produced.
    OperationStorageDone(OperationId),
    /// The RPC server was unable to provide the response of the following operation id.
    ///
    /// Repeating the same operation in the future might succeed.
    OperationInaccessible(OperationId),
    /// The RPC server encountered an error while processing an operation id.
    ///
    /// Repeating the same operation in the future will not succeed.
    OperationError(OperationError),
    /// The subscription is dropped and no further events
    /// will be generated.
    Stop,
}

// The event tags we know how to decode; anything else on the stream is
// surfaced as `Error::UnknownFollowEvent`.
const KNOWN_EVENTS: &[&str] = &[
    "initialized",
    "newBlock",
    "bestBlockChanged",
    "finalized",
    "operationBodyDone",
    "operationCallDone",
    "operationStorageItems",
    "operationWaitingForContinue",
    "operationStorageDone",
    "operationInaccessible",
    "operationError",
    "stop",
];

/// Contain information about the latest finalized block.
///
/// # Note
///
/// This is the first event generated by the `follow` subscription
/// and is submitted only once. Servers have reported the finalized
/// block both as a single `finalizedBlockHash` and as a list of
/// `finalizedBlockHashes`; both shapes are accepted here and collapsed
/// to one hash (the first of the list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Initialized<Hash> {
    /// The hash of the latest finalized block.
    pub finalized_block_hash: Hash,
    /// The runtime version of the finalized block.
    ///
    /// # Note
    ///
    /// This is present only if the `with_runtime` flag is set for
    /// the `follow` subscription.
    pub finalized_block_runtime: Option<RuntimeEvent>,
}

impl<'de, Hash: Deserialize<'de>> Deserialize<'de> for Initialized<Hash> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Custom struct that can deserialize both `finalizedBlockHash` and `finalizedBlockHashes`.
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct InitializedIR<Hash> {
            finalized_block_hashes: Option<Vec<Hash>>,
            finalized_block_hash: Option<Hash>,
            finalized_block_runtime: Option<RuntimeEvent>,
        }

        let ir = InitializedIR::deserialize(deserializer)?;
        let finalized_block_hash = ir
            .finalized_block_hash
            .or_else(|| ir.finalized_block_hashes.and_then(|h| h.into_iter().next()))
            .ok_or_else(|| serde::de::Error::custom("Missing finalized block hashes"))?;

        Ok(Initialized {
            finalized_block_hash,
            finalized_block_runtime: ir.finalized_block_runtime,
        })
    }
}

/// The runtime event generated if the `follow` subscription
/// has set the `with_runtime` flag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[serde(tag = "type")]
pub enum RuntimeEvent {
    /// The runtime version of this block.
    Valid(RuntimeVersionEvent),
    /// The runtime could not be obtained due to an error.
    Invalid(ErrorEvent),
}

/// The runtime specification of the current block.
///
/// This event is generated for:
///   - the first announced block by the follow subscription
///   - blocks that suffered a change in runtime compared with their parents
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeVersionEvent {
    /// Details about this runtime.
    pub spec: RuntimeSpec,
}

/// The runtime version information needed to build transactions against a
/// given block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSpec {
    /// Opaque string indicating the name of the chain.
    pub spec_name: String,

    /// Opaque string indicating the name of the implementation of the chain.
    pub impl_name: String,

    /// Opaque integer. The JSON-RPC client can assume that the Runtime API call to `Metadata_metadata`
    /// will always produce the same output as long as the specVersion is the same.
    pub spec_version: u32,

    /// Opaque integer. Whenever the runtime code changes in a backwards-compatible way, the implVersion
    /// is modified while the specVersion is left untouched.
    pub impl_version: u32,

    /// Opaque integer. Necessary when building the bytes of a transaction. Transactions that have been
    /// generated with a different `transaction_version` are incompatible.
    pub transaction_version: u32,
}

/// The operation could not be processed due to an error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    /// Reason of the error.
    pub error: String,
}

/// Indicate a new non-finalized block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlock<Hash> {
    /// The hash of the new block.
    pub block_hash: Hash,
    /// The parent hash of the new block.
    pub parent_block_hash: Hash,
    /// The runtime version of the new block.
    ///
    /// # Note
    ///
    /// This is present only if the `with_runtime` flag is set for
    /// the `follow` subscription.
    pub new_runtime: Option<RuntimeEvent>,
}

/// Indicate the block hash of the new best block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BestBlockChanged<Hash> {
    /// The block hash of the new best block.
    pub best_block_hash: Hash,
}

/// Indicate the finalized and pruned block hashes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finalized<Hash> {
    /// Block hashes that are finalized.
    pub finalized_block_hashes: Vec<Hash>,
    /// Block hashes that are pruned (removed).
    pub pruned_block_hashes: Vec<Hash>,
}

/// Indicate the operation id of the event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationId {
    /// The operation id of the event.
    pub operation_id: String,
}

/// The response of the `chainHead_body` method.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationBodyDone {
    /// The operation id of the event.
    pub operation_id: String,
    /// Array of hexadecimal-encoded scale-encoded extrinsics found in the block.
    pub value: Vec<Bytes>,
}

/// The response of the `chainHead_call` method.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationCallDone {
    /// The operation id of the event.
    pub operation_id: String,
    /// Hexadecimal-encoded output of the runtime function call.
    pub output: Bytes,
}

/// One batch of results from the `chainHead_storage` method; more batches
/// may follow until `operationStorageDone` is seen.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStorageItems {
    /// The operation id of the event.
    pub operation_id: String,
    /// The resulting items.
    pub items: Vec<StorageResult>,
}

/// Indicate a problem during the operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationError {
    /// The operation id of the event.
    pub operation_id: String,
    /// The reason of the error.
    pub error: String,
}

/// The storage result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageResult {
    /// The hex-encoded key of the result.
    pub key: Bytes,
    /// The result of the query.
    #[serde(flatten)]
    pub result: StorageResultType,
}

/// The type of the storage query result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageResultType {
    /// Fetch the value of the provided key.
    Value(Bytes),
    /// Fetch the hash of the value of the provided key.
    Hash(Bytes),
    /// Fetch the closest descendant merkle value.
    ClosestDescendantMerkleValue(Bytes),
}

/// The method response of `chainHead_body`, `chainHead_call` and `chainHead_storage`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[serde(tag = "result")]
pub enum MethodResponse {
    /// The method has started; results will arrive on the event stream,
    /// correlated by operation id.
    Started(MethodResponseStarted),
    /// The RPC server cannot handle the request at the moment.
    LimitReached,
}

/// The `started` result of a method.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodResponseStarted {
    /// The operation id of the response.
    pub operation_id: String,
    /// The number of items from the back of the `chainHead_storage` that have been discarded.
    pub discarded_items: Option<usize>,
}

/// The storage item received as parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageQuery<Key> {
    /// The provided key.
    pub key: Key,
    /// The type of the storage query.
    #[serde(rename = "type")]
    pub query_type: StorageQueryType,
}

/// The type of the storage query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageQueryType {
    /// Fetch the value of the provided key.
    Value,
    /// Fetch the hash of the value of the provided key.
    Hash,
    /// Fetch the closest descendant merkle value.
    ClosestDescendantMerkleValue,
    /// Fetch the values of all descendants of they provided key.
    DescendantsValues,
    /// Fetch the hashes of the values of all descendants of they provided key.
    DescendantsHashes,
}

/// A long-lived session over the `chainHead_v1_follow` subscription.
///
/// The session is the typed event stream (it implements [`Stream`], and
/// [`ChainHeadSession::next_event`] is a convenience over that) as well as
/// the handle through which pinned-block operations are issued. Operations
/// require the session to still be active; once [`ChainHeadSession::unfollow`]
/// has been called or a [`FollowEvent::Stop`] has been observed, they fail
/// with [`Error::SessionInactive`].
///
/// Dropping the session cancels the underlying subscription, which causes
/// the RPC client to issue `chainHead_v1_unfollow` for us.
pub struct ChainHeadSession<Hash> {
    client: RpcClient,
    sub_id: String,
    state: SessionState,
    sub: RpcSubscription<Box<RawValue>>,
    _marker: std::marker::PhantomData<fn() -> Hash>,
}

// Whether the session can still issue operations, and if not, why not: a
// server side stop still warrants one best-effort unfollow, an explicit
// unfollow does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Active,
    Stopped,
    Unfollowed,
}

impl<Hash: BlockHash> ChainHeadSession<Hash> {
    /// Open a session by subscribing to `chainHead_v1_follow`.
    ///
    /// With `with_runtime` set, the server reports runtime versions alongside
    /// the blocks that change them.
    pub async fn follow(client: &RpcClient, with_runtime: bool) -> Result<Self, Error> {
        let sub = client
            .subscribe(
                "chainHead_v1_follow",
                rpc_params![with_runtime],
                "chainHead_v1_unfollow",
            )
            .await?;
        let sub_id = sub
            .subscription_id()
            .ok_or_else(|| {
                Error::Client("the chainHead_v1_follow subscription returned no id".into())
            })?
            .to_owned();
        tracing::debug!(subscription = %sub_id, with_runtime, "chainHead follow session opened");

        Ok(ChainHeadSession {
            client: client.clone(),
            sub_id,
            state: SessionState::Active,
            sub,
            _marker: std::marker::PhantomData,
        })
    }

    /// The subscription ID for this session, as used in the
    /// `chainHead_v1_*` operation calls.
    pub fn subscription_id(&self) -> &str {
        &self.sub_id
    }

    /// Whether the session is still active. Flips to `false` exactly once,
    /// on the first successful [`ChainHeadSession::unfollow`] or on
    /// observing a [`FollowEvent::Stop`].
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// Fetch the next event in the stream.
    pub async fn next_event(&mut self) -> Option<Result<FollowEvent<Hash>, Error>> {
        StreamExt::next(self).await
    }

    /// Get a pinned block's header. `None` if the block is not pinned.
    pub async fn header(&self, block_hash: Hash) -> Result<Option<Bytes>, Error> {
        self.ensure_active()?;
        self.client
            .request("chainHead_v1_header", rpc_params![&self.sub_id, block_hash])
            .await
    }

    /// Start fetching a pinned block's body. The extrinsics arrive on the
    /// event stream as an [`FollowEvent::OperationBodyDone`].
    pub async fn body(&self, block_hash: Hash) -> Result<MethodResponse, Error> {
        self.ensure_active()?;
        self.client
            .request("chainHead_v1_body", rpc_params![&self.sub_id, block_hash])
            .await
    }

    /// Start a runtime call at a pinned block. The output arrives on the
    /// event stream as an [`FollowEvent::OperationCallDone`].
    pub async fn call(
        &self,
        block_hash: Hash,
        function: &str,
        call_parameters: &[u8],
    ) -> Result<MethodResponse, Error> {
        self.ensure_active()?;
        self.client
            .request(
                "chainHead_v1_call",
                rpc_params![&self.sub_id, block_hash, function, to_hex(call_parameters)],
            )
            .await
    }

    /// Start a storage query at a pinned block. Results arrive on the event
    /// stream in [`FollowEvent::OperationStorageItems`] batches, terminated
    /// by an [`FollowEvent::OperationStorageDone`].
    pub async fn storage(
        &self,
        block_hash: Hash,
        items: impl IntoIterator<Item = StorageQuery<&[u8]>>,
        child_trie: Option<&[u8]>,
    ) -> Result<MethodResponse, Error> {
        self.ensure_active()?;
        let items: Vec<StorageQuery<String>> = items
            .into_iter()
            .map(|item| StorageQuery {
                key: to_hex(item.key),
                query_type: item.query_type,
            })
            .collect();
        self.client
            .request(
                "chainHead_v1_storage",
                rpc_params![&self.sub_id, block_hash, items, child_trie.map(to_hex)],
            )
            .await
    }

    /// Resume a storage query which emitted an
    /// [`FollowEvent::OperationWaitingForContinue`].
    pub async fn continue_operation(&self, operation_id: &str) -> Result<(), Error> {
        self.ensure_active()?;
        self.client
            .request(
                "chainHead_v1_continue",
                rpc_params![&self.sub_id, operation_id],
            )
            .await
    }

    /// Interrupt an in-flight `body`/`call`/`storage` operation. Has no
    /// effect if the operation already finished.
    pub async fn stop_operation(&self, operation_id: &str) -> Result<(), Error> {
        self.ensure_active()?;
        self.client
            .request(
                "chainHead_v1_stopOperation",
                rpc_params![&self.sub_id, operation_id],
            )
            .await
    }

    /// Unpin blocks the server has been holding for us. Every block reported
    /// by `initialized` or `newBlock` must eventually be unpinned, or the
    /// server will stop the session.
    pub async fn unpin(&self, block_hashes: Vec<Hash>) -> Result<(), Error> {
        self.ensure_active()?;
        self.client
            .request("chainHead_v1_unpin", rpc_params![&self.sub_id, block_hashes])
            .await
    }

    /// Close the session. Idempotent: the first successful call flips the
    /// session inactive, later calls are silent no-ops. After this, all
    /// operations fail with [`Error::SessionInactive`].
    ///
    /// After a server side [`FollowEvent::Stop`] the unfollow request is
    /// still sent once, best-effort, with any failure swallowed; the
    /// server has likely forgotten the subscription already.
    pub async fn unfollow(&mut self) -> Result<(), Error> {
        match self.state {
            SessionState::Active => {
                self.client
                    .request::<()>("chainHead_v1_unfollow", rpc_params![&self.sub_id])
                    .await?;
                self.state = SessionState::Unfollowed;
                tracing::debug!(subscription = %self.sub_id, "chainHead follow session closed");
                Ok(())
            }
            SessionState::Stopped => {
                let res = self
                    .client
                    .request::<()>("chainHead_v1_unfollow", rpc_params![&self.sub_id])
                    .await;
                if let Err(e) = res {
                    tracing::debug!(subscription = %self.sub_id, error = %e, "unfollow after stop failed");
                }
                self.state = SessionState::Unfollowed;
                Ok(())
            }
            SessionState::Unfollowed => Ok(()),
        }
    }

    fn ensure_active(&self) -> Result<(), Error> {
        if self.state == SessionState::Active {
            Ok(())
        } else {
            Err(Error::SessionInactive)
        }
    }
}

impl<Hash: BlockHash> Stream for ChainHeadSession<Hash> {
    type Item = Result<FollowEvent<Hash>, Error>;

    fn poll_next(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.state != SessionState::Active {
            return Poll::Ready(None);
        }

        let res = futures::ready!(this.sub.poll_next_unpin(cx));
        let res = res.map(|r| r.and_then(|raw| parse_follow_event::<Hash>(&raw)));

        if let Some(Ok(FollowEvent::Stop)) = &res {
            // No more events will occur after this one, and the server has
            // already torn the subscription down on its side.
            this.state = SessionState::Stopped;
        }

        Poll::Ready(res)
    }
}

// Discriminate a raw subscription message on its `event` tag. Tags we have
// no type for become `Error::UnknownFollowEvent` rather than a plain
// deserialization error, since new event kinds are added to the protocol
// over time.
fn parse_follow_event<Hash: BlockHash>(raw: &RawValue) -> Result<FollowEvent<Hash>, Error> {
    match serde_json::from_str::<FollowEvent<Hash>>(raw.get()) {
        Ok(ev) => Ok(ev),
        Err(e) => {
            #[derive(Deserialize)]
            struct EventTag {
                event: String,
            }
            match serde_json::from_str::<EventTag>(raw.get()) {
                Ok(tag) if !KNOWN_EVENTS.contains(&tag.event.as_str()) => {
                    Err(Error::UnknownFollowEvent(tag.event))
                }
                _ => Err(Error::Deserialization(e)),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::client::mock_rpc_client::{MockRpcClient, MockSubscription};
    use assert_matches::assert_matches;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // A client whose follow subscription yields the given events and whose
    // method calls all succeed with null, counting unfollow calls.
    fn session_client(events: Vec<serde_json::Value>, unfollows: Arc<AtomicUsize>) -> RpcClient {
        RpcClient::new(MockRpcClient::from_handlers(
            move |method, _params| {
                if method == "chainHead_v1_unfollow" {
                    unfollows.fetch_add(1, Ordering::SeqCst);
                }
                Ok(json!(null))
            },
            move |sub, _params, unsub| {
                assert_eq!(sub, "chainHead_v1_follow");
                assert_eq!(unsub, "chainHead_v1_unfollow");
                Ok(MockSubscription::new("sub1", events.clone()))
            },
        ))
    }

    #[tokio::test]
    async fn follow_yields_a_typed_initialized_event() {
        let client = RpcClient::new(MockRpcClient::from_handlers(
            |_method, _params| Ok(json!(null)),
            |sub, params, unsub| {
                assert_eq!(sub, "chainHead_v1_follow");
                assert_eq!(unsub, "chainHead_v1_unfollow");
                assert_eq!(params.unwrap().get(), "[true]");
                Ok(MockSubscription::new(
                    "sub1",
                    vec![json!({"event": "initialized", "finalizedBlockHash": "0xabc123"})],
                ))
            },
        ));

        let mut session = ChainHeadSession::<String>::follow(&client, true).await.unwrap();
        assert_eq!(session.subscription_id(), "sub1");

        let event = session.next_event().await.unwrap().unwrap();
        assert_eq!(
            event,
            FollowEvent::Initialized(Initialized {
                finalized_block_hash: "0xabc123".to_owned(),
                finalized_block_runtime: None,
            })
        );
    }

    #[tokio::test]
    async fn a_stop_event_deactivates_the_session_and_ends_the_stream() {
        let unfollows = Arc::new(AtomicUsize::new(0));
        let client = session_client(vec![json!({"event": "stop"})], unfollows.clone());

        let mut session = ChainHeadSession::<String>::follow(&client, false).await.unwrap();
        assert!(session.is_active());

        assert_matches!(session.next_event().await, Some(Ok(FollowEvent::Stop)));
        assert!(!session.is_active());
        assert_matches!(session.next_event().await, None);

        // Every operation now fails without touching the transport.
        assert_matches!(
            session.header("0x1".to_owned()).await,
            Err(Error::SessionInactive)
        );
        // Unfollow after a stop is still sent once, best-effort, and any
        // failure is swallowed.
        session.unfollow().await.unwrap();
        assert_eq!(unfollows.load(Ordering::SeqCst), 1);
        session.unfollow().await.unwrap();
        assert_eq!(unfollows.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn a_failing_unfollow_after_stop_is_swallowed() {
        let client = RpcClient::new(MockRpcClient::from_handlers(
            |method, _params| {
                assert_eq!(method, "chainHead_v1_unfollow");
                Err(Error::Rpc(crate::RpcErrorObject {
                    code: -32602,
                    message: "unknown subscription".into(),
                    data: None,
                }))
            },
            |_sub, _params, _unsub| {
                Ok(MockSubscription::new("sub1", vec![json!({"event": "stop"})]))
            },
        ));

        let mut session = ChainHeadSession::<String>::follow(&client, false).await.unwrap();
        assert_matches!(session.next_event().await, Some(Ok(FollowEvent::Stop)));
        session.unfollow().await.unwrap();
    }

    #[tokio::test]
    async fn unfollow_is_idempotent_and_gates_operations() {
        let unfollows = Arc::new(AtomicUsize::new(0));
        let client = session_client(Vec::new(), unfollows.clone());

        let mut session = ChainHeadSession::<String>::follow(&client, false).await.unwrap();
        session.unfollow().await.unwrap();
        assert!(!session.is_active());
        assert_eq!(unfollows.load(Ordering::SeqCst), 1);

        // A second unfollow is a silent no-op.
        session.unfollow().await.unwrap();
        assert_eq!(unfollows.load(Ordering::SeqCst), 1);

        let hash = "0x1".to_owned();
        assert_matches!(session.header(hash.clone()).await, Err(Error::SessionInactive));
        assert_matches!(session.body(hash.clone()).await, Err(Error::SessionInactive));
        assert_matches!(
            session.call(hash.clone(), "Core_version", &[]).await,
            Err(Error::SessionInactive)
        );
        assert_matches!(
            session.storage(hash.clone(), Vec::new(), None).await,
            Err(Error::SessionInactive)
        );
        assert_matches!(session.unpin(vec![hash]).await, Err(Error::SessionInactive));
    }

    #[tokio::test]
    async fn unknown_event_tags_are_surfaced_by_name() {
        let unfollows = Arc::new(AtomicUsize::new(0));
        let client = session_client(
            vec![json!({"event": "somethingNovel", "surprise": true})],
            unfollows,
        );

        let mut session = ChainHeadSession::<String>::follow(&client, false).await.unwrap();
        assert_matches!(
            session.next_event().await,
            Some(Err(Error::UnknownFollowEvent(tag))) if tag == "somethingNovel"
        );
        // A malformed but known event is a plain deserialization error.
        // (Covered separately since the stream above has ended.)
    }

    #[tokio::test]
    async fn known_but_malformed_events_are_deserialization_errors() {
        let unfollows = Arc::new(AtomicUsize::new(0));
        let client = session_client(
            vec![json!({"event": "newBlock"})], // missing required fields
            unfollows,
        );

        let mut session = ChainHeadSession::<String>::follow(&client, false).await.unwrap();
        assert_matches!(
            session.next_event().await,
            Some(Err(Error::Deserialization(_)))
        );
    }

    #[tokio::test]
    async fn operations_use_the_session_subscription_id() {
        let client = RpcClient::new(MockRpcClient::from_handlers(
            |method, params| {
                let params: serde_json::Value =
                    serde_json::from_str(params.unwrap().get()).unwrap();
                assert_eq!(params[0], json!("sub1"), "{method} must pass the session id");
                match method {
                    "chainHead_v1_header" => Ok(json!("0x00010203")),
                    "chainHead_v1_body" => {
                        Ok(json!({"result": "started", "operationId": "op-body"}))
                    }
                    "chainHead_v1_call" => {
                        assert_eq!(params[2], json!("Core_version"));
                        assert_eq!(params[3], json!("0x0102"));
                        Ok(json!({"result": "started", "operationId": "op-call"}))
                    }
                    "chainHead_v1_storage" => {
                        assert_eq!(params[2], json!([{"key": "0xaabb", "type": "value"}]));
                        Ok(json!({"result": "limitReached"}))
                    }
                    "chainHead_v1_unpin" => {
                        assert_eq!(params[1], json!(["0x1", "0x2"]));
                        Ok(json!(null))
                    }
                    other => panic!("unexpected method {other}"),
                }
            },
            |_sub, _params, _unsub| Ok(MockSubscription::new("sub1", Vec::new())),
        ));

        let session = ChainHeadSession::<String>::follow(&client, false).await.unwrap();

        let header = session.header("0x1".to_owned()).await.unwrap();
        assert_eq!(header, Some(Bytes(vec![0x00, 0x01, 0x02, 0x03])));

        assert_matches!(
            session.body("0x1".to_owned()).await.unwrap(),
            MethodResponse::Started(MethodResponseStarted { operation_id, .. }) if operation_id == "op-body"
        );
        assert_matches!(
            session
                .call("0x1".to_owned(), "Core_version", &[0x01, 0x02])
                .await
                .unwrap(),
            MethodResponse::Started(_)
        );
        assert_matches!(
            session
                .storage(
                    "0x1".to_owned(),
                    vec![StorageQuery {
                        key: &[0xaa, 0xbb][..],
                        query_type: StorageQueryType::Value,
                    }],
                    None,
                )
                .await
                .unwrap(),
            MethodResponse::LimitReached
        );
        session
            .unpin(vec!["0x1".to_owned(), "0x2".to_owned()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn a_missing_header_is_none() {
        let client = RpcClient::new(MockRpcClient::from_handlers(
            |_method, _params| Ok(json!(null)),
            |_sub, _params, _unsub| Ok(MockSubscription::new("sub1", Vec::new())),
        ));
        let session = ChainHeadSession::<String>::follow(&client, false).await.unwrap();
        assert_eq!(session.header("0x1".to_owned()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn hashes_can_be_strongly_typed() {
        use primitive_types::H256;

        let hash_hex = format!("0x{}", hex::encode([0xab; 32]));
        let client = RpcClient::new(MockRpcClient::from_handlers(
            |_method, _params| Ok(json!(null)),
            move |_sub, _params, _unsub| {
                Ok(MockSubscription::new(
                    "sub1",
                    vec![json!({"event": "bestBlockChanged", "bestBlockHash": hash_hex.clone()})],
                ))
            },
        ));

        let mut session = ChainHeadSession::<H256>::follow(&client, false).await.unwrap();
        assert_matches!(
            session.next_event().await,
            Some(Ok(FollowEvent::BestBlockChanged(ev))) if ev.best_block_hash == H256([0xab; 32])
        );
    }

    #[test]
    fn initialized_accepts_both_wire_shapes() {
        // Latest format version.
        let event = json!({
            "finalizedBlockHashes": ["0x1", "0x2"],
        });
        let decoded: Initialized<String> = serde_json::from_value(event).unwrap();
        assert_eq!(decoded.finalized_block_hash, "0x1");

        // Old format.
        let event = json!({
            "finalizedBlockHash": "0x1",
        });
        let decoded: Initialized<String> = serde_json::from_value(event).unwrap();
        assert_eq!(decoded.finalized_block_hash, "0x1");

        // Wrong format.
        let event = json!({
            "finalizedBlockHash": ["0x1"],
        });
        let _ = serde_json::from_value::<Initialized<String>>(event).unwrap_err();
    }

    #[test]
    fn operation_events_carry_their_ids() {
        let ev: FollowEvent<String> = serde_json::from_value(json!({
            "event": "operationBodyDone",
            "operationId": "op1",
            "value": ["0x0405"],
        }))
        .unwrap();
        assert_matches!(
            ev,
            FollowEvent::OperationBodyDone(OperationBodyDone { operation_id, value })
                if operation_id == "op1" && value == vec![Bytes(vec![0x04, 0x05])]
        );

        let ev: FollowEvent<String> = serde_json::from_value(json!({
            "event": "operationStorageDone",
            "operationId": "op2",
        }))
        .unwrap();
        assert_matches!(
            ev,
            FollowEvent::OperationStorageDone(OperationId { operation_id }) if operation_id == "op2"
        );

        let ev: FollowEvent<String> = serde_json::from_value(json!({
            "event": "operationError",
            "operationId": "op3",
            "error": "boom",
        }))
        .unwrap();
        assert_matches!(
            ev,
            FollowEvent::OperationError(OperationError { error, .. }) if error == "boom"
        );
    }
}
