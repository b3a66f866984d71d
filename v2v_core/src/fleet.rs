//! Fleet state store: latest known kinematic state per peer agent.
//!
//! The store is the exclusive owner of fleet entries. Consumers only ever
//! see read-only snapshots, and only of entries fresher than the staleness
//! window: eviction is lazy (filtered at read time), so no background
//! sweep is needed. A companion throttle bounds how often consumers
//! re-score the fleet without dropping any recorded update.

use crate::motion::KinematicState;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use tracing::debug;
use v2v_env::{AgentId, PeerStateRecord};

/// Maximum age of a peer's last-known state before it is excluded from
/// snapshots, in milliseconds.
pub const STALE_MS: i64 = 10_000;

/// Minimum interval between accepted snapshot requests, in milliseconds
/// (bounds fleet re-scoring to 5 Hz).
pub const UPDATE_INTERVAL_MS: i64 = 200;

/// One stored peer entry.
#[derive(Debug, Clone)]
struct FleetEntry {
    state: KinematicState,
    last_seen_ms: i64,
}

/// Latest kinematic state per peer, with staleness filtering and a
/// snapshot-rate limiter.
///
/// Methods take `&self` and lock internally: many agents may `upsert`
/// concurrently while consumers take snapshots. A snapshot is a consistent
/// point-in-time view (entries are replaced whole, never partially).
#[derive(Debug, Default)]
pub struct FleetStore {
    entries: RwLock<HashMap<AgentId, FleetEntry>>,

    /// Timestamp of the last accepted snapshot request. Owned here rather
    /// than as ambient global state so independent stores don't interfere.
    last_accepted_ms: Mutex<Option<i64>>,
}

impl FleetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entry for `agent_id`, marking it seen at `now_ms`.
    pub fn upsert(&self, agent_id: AgentId, state: KinematicState, now_ms: i64) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(
            agent_id,
            FleetEntry {
                state,
                last_seen_ms: now_ms,
            },
        );
    }

    /// Ingests one wire record from the fleet feed.
    ///
    /// Returns false when the record is invalid (non-finite fields); the
    /// record is then treated as absent and the previous entry, if any,
    /// is left untouched.
    pub fn ingest(&self, agent_id: AgentId, record: &PeerStateRecord, now_ms: i64) -> bool {
        match KinematicState::from_record(agent_id.clone(), record) {
            Some(state) => {
                self.upsert(agent_id, state, now_ms);
                true
            }
            None => false,
        }
    }

    /// Removes an agent's entry (explicit eviction on disconnect).
    pub fn remove(&self, agent_id: &AgentId) {
        self.entries.write().unwrap().remove(agent_id);
    }

    /// Returns the states of all peers seen within the staleness window.
    ///
    /// Entries with `now_ms - last_seen_ms >= STALE_MS` are never surfaced,
    /// even if not yet physically removed.
    pub fn snapshot(&self, now_ms: i64) -> HashMap<AgentId, KinematicState> {
        let entries = self.entries.read().unwrap();
        entries
            .iter()
            .filter(|(_, entry)| now_ms - entry.last_seen_ms < STALE_MS)
            .map(|(id, entry)| (id.clone(), entry.state.clone()))
            .collect()
    }

    /// Rate limiter for snapshot consumers.
    ///
    /// Returns true when fewer than [`UPDATE_INTERVAL_MS`] have elapsed
    /// since the last accepted request, meaning the caller should skip
    /// recomputation. Otherwise records `now_ms` as accepted and returns
    /// false. Upserts are recorded regardless; only re-scoring is bounded.
    pub fn throttle(&self, now_ms: i64) -> bool {
        let mut last = self.last_accepted_ms.lock().unwrap();
        if let Some(accepted) = *last {
            if now_ms - accepted < UPDATE_INTERVAL_MS {
                debug!(now_ms, accepted, "fleet snapshot throttled");
                return true;
            }
        }
        *last = Some(now_ms);
        false
    }

    /// Number of stored entries, including stale ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
