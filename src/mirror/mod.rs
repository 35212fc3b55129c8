//! Event-sourced replication of on-chain state.
//!
//! A [`StateMirror`] seeds a snapshot from one batched read, then advances it
//! block by block by folding chain logs through a [`Replica`]. Whenever the
//! incremental path cannot be trusted (a reorg, an out-of-order block, an
//! event that would drive a balance negative) the mirror falls back to a full
//! re-read at the requested height.
//!
//! Snapshots are published as `Arc`s and never mutated after publication.
//! A new head is swapped in only once it has been fully built, so dropping an
//! in-flight `seed`/`regenerate` leaves the previous head intact.

mod cache;
mod events;
mod vault;

pub use cache::StateCache;
pub use events::{parse_event, VaultEvent};
pub use vault::{SubscriptionFilter, VaultReplica};

use std::{fmt, sync::Arc};

use alloy::primitives::{Bytes, Log};
use tracing::{debug, error, info, warn};

use crate::{
    multicall::{ensure_batch_len, BatchCaller, BlockTag, Call},
    prelude::*,
    Error,
};

/// Domain half of a mirror: which reads build a state and how logs update it.
pub trait Replica: Send + Sync {
    type State: Clone + PartialEq + fmt::Debug + Send + Sync;

    /// Reads that fully determine the state at a block.
    fn generate_calls(&self) -> Vec<Call>;

    /// Build the state from the results of [`Replica::generate_calls`].
    fn generate_state(&self, outputs: &[Bytes]) -> Result<Self::State>;

    /// Apply one log. `Ok(None)` means the log does not affect the state.
    fn process_log(&self, state: &Self::State, log: &Log) -> Result<Option<Self::State>>;

    fn subscription_filter(&self) -> SubscriptionFilter;
}

/// Lifecycle of a mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorPhase {
    /// Nothing read yet.
    Uninitialized,
    /// Head comes straight from a seed read.
    Seeded,
    /// Head has been advanced by events or rebuilt by regeneration.
    Live,
}

impl fmt::Display for MirrorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MirrorPhase::Uninitialized => write!(f, "uninitialized"),
            MirrorPhase::Seeded => write!(f, "seeded"),
            MirrorPhase::Live => write!(f, "live"),
        }
    }
}

pub struct StateMirror<R: Replica> {
    replica: R,
    caller: Arc<dyn BatchCaller>,
    filter: SubscriptionFilter,
    phase: MirrorPhase,
    head: Option<(u64, Arc<R::State>)>,
    cache: StateCache<R::State>,
}

impl<R: Replica> StateMirror<R> {
    pub fn new(replica: R, caller: Arc<dyn BatchCaller>) -> Self {
        Self::with_cache(replica, caller, StateCache::default())
    }

    pub fn with_cache(replica: R, caller: Arc<dyn BatchCaller>, cache: StateCache<R::State>) -> Self {
        let filter = replica.subscription_filter();
        Self {
            replica,
            caller,
            filter,
            phase: MirrorPhase::Uninitialized,
            head: None,
            cache,
        }
    }

    pub fn replica(&self) -> &R {
        &self.replica
    }

    pub fn phase(&self) -> MirrorPhase {
        self.phase
    }

    /// Latest published block and state.
    pub fn head(&self) -> Option<(u64, Arc<R::State>)> {
        self.head.clone()
    }

    /// Cached state at `block`, without touching the chain.
    pub fn state(&self, block: u64) -> Option<Arc<R::State>> {
        self.cache.get(block)
    }

    pub fn subscription_filter(&self) -> &SubscriptionFilter {
        &self.filter
    }

    /// Read the full state at `block` without publishing it.
    async fn fetch(&self, block: u64) -> Result<R::State> {
        let calls = self.replica.generate_calls();
        let outputs = self
            .caller
            .aggregate(&calls, BlockTag::Number(block))
            .await?;
        ensure_batch_len("mirror state", calls.len(), &outputs)?;
        self.replica.generate_state(&outputs)
    }

    fn publish(&mut self, block: u64, state: Arc<R::State>, phase: MirrorPhase) {
        self.cache.insert(block, state.clone());
        self.head = Some((block, state));
        self.phase = phase;
    }

    /// Initial read at `block`.
    pub async fn seed(&mut self, block: u64) -> Result<Arc<R::State>> {
        let state = Arc::new(self.fetch(block).await?);
        self.publish(block, state.clone(), MirrorPhase::Seeded);
        info!(
            target: "handlefi::mirror",
            block = block,
            "State mirror seeded"
        );
        Ok(state)
    }

    /// Rebuild the state at `block` from a fresh read, discarding whatever
    /// the incremental path produced.
    pub async fn regenerate(&mut self, block: u64) -> Result<Arc<R::State>> {
        let state = Arc::new(self.fetch(block).await?);
        self.publish(block, state.clone(), MirrorPhase::Live);
        debug!(
            target: "handlefi::mirror",
            block = block,
            "State regenerated"
        );
        Ok(state)
    }

    /// Fold one log into `previous`.
    ///
    /// Malformed payloads are logged and skipped. Invariant violations are
    /// returned to the caller.
    pub fn apply_event(&self, previous: &Arc<R::State>, log: &Log) -> Result<Arc<R::State>> {
        match self.replica.process_log(previous, log) {
            Ok(Some(next)) => Ok(Arc::new(next)),
            Ok(None) => Ok(previous.clone()),
            Err(Error::EventParse(reason)) => {
                warn!(
                    target: "handlefi::mirror",
                    emitter = %log.address,
                    reason = %reason,
                    "Skipping malformed event"
                );
                Ok(previous.clone())
            }
            Err(e) => Err(e),
        }
    }

    /// Advance the head to `block` by applying its logs in delivery order.
    ///
    /// Logs outside the subscription filter are ignored. A block at or below
    /// the head, or a log that breaks a state invariant, triggers
    /// regeneration at `block`.
    pub async fn handle_block(&mut self, block: u64, logs: &[Log]) -> Result<Arc<R::State>> {
        let Some((head_block, head_state)) = self.head.clone() else {
            return Err(Error::NotSeeded);
        };

        if block <= head_block {
            let inconsistency = Error::RolloverInconsistency {
                head: head_block,
                received: block,
            };
            warn!(
                target: "handlefi::mirror",
                error = %inconsistency,
                "Regenerating after out-of-order block"
            );
            self.cache.truncate_after(block);
            return self.regenerate(block).await;
        }

        let matching: Vec<&Log> = logs.iter().filter(|log| self.filter.matches(log)).collect();
        let mut state = head_state;
        for log in &matching {
            match self.apply_event(&state, log) {
                Ok(next) => state = next,
                Err(e) if e.requires_regeneration() => {
                    error!(
                        target: "handlefi::mirror",
                        block = block,
                        error = %e,
                        "Mirror invariant violated, regenerating"
                    );
                    return self.regenerate(block).await;
                }
                Err(e) => return Err(e),
            }
        }

        self.publish(block, state.clone(), MirrorPhase::Live);
        debug!(
            target: "handlefi::mirror",
            block = block,
            logs = logs.len(),
            matched = matching.len(),
            "Block applied"
        );
        Ok(state)
    }

    /// Discard everything above `block` and rebuild at `block`.
    pub async fn rollback(&mut self, block: u64) -> Result<Arc<R::State>> {
        self.cache.truncate_after(block);
        if self.head.as_ref().is_some_and(|(head, _)| *head > block) {
            self.head = self.cache.latest();
        }
        warn!(
            target: "handlefi::mirror",
            block = block,
            "Rollback, regenerating"
        );
        self.regenerate(block).await
    }

    /// Cached state at `block`, or a fresh read.
    ///
    /// A read at or above the head becomes the new head. A read for an older
    /// height is cached without moving the head.
    pub async fn get_or_generate(&mut self, block: u64) -> Result<Arc<R::State>> {
        if let Some(state) = self.cache.get(block) {
            return Ok(state);
        }
        match self.head {
            Some((head, _)) if block < head => {
                let state = Arc::new(self.fetch(block).await?);
                self.cache.insert(block, state.clone());
                Ok(state)
            }
            _ => self.regenerate(block).await,
        }
    }
}
