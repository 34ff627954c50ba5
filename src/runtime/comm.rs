// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Communication-qubit manager.
//!
//! Per node: a bounded free list of communication slots, handed out
//! lowest-position-first, with a FIFO queue of waiting protocols. A release
//! hands the slot directly to the longest-waiting protocol, so no protocol
//! can overtake an earlier waiter and occupancy never exceeds the declared
//! capacity.
//!
//! Slots retained permanently by a teledata relocation are *pinned*:
//! they stay in use for the rest of the run and stop counting as
//! releasable. A waiter that is blocked while the pool holds no releasable
//! slot is reported as a `DeadlockRisk` diagnostic (not an error): the
//! circuit structurally needs more concurrent communication qubits than the
//! node declares.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, warn};

use crate::network::{NetworkSpec, NodeId};
use crate::partition::ProtocolId;

/// A queued acquisition: which protocol wants a slot, and which node's
/// controller is suspended on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waiter {
    pub protocol: ProtocolId,
    /// Node whose controller is blocked (the protocol's initiator).
    pub initiator: NodeId,
    /// The protocol's comm ordinal this acquisition will bind.
    pub comm: u8,
}

/// Outcome of an acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// A slot was granted immediately.
    Granted(usize),
    /// The pool is exhausted; the waiter was queued FIFO.
    Queued,
}

/// A recorded deadlock-risk observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlockRisk {
    pub node: NodeId,
    pub protocol: ProtocolId,
}

#[derive(Debug)]
struct Pool {
    capacity: usize,
    free: Vec<usize>,
    waiters: VecDeque<Waiter>,
    pinned: HashSet<usize>,
    in_use: usize,
    max_in_use: usize,
    total_waits: u64,
}

impl Pool {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            free: (0..capacity).collect(),
            waiters: VecDeque::new(),
            pinned: HashSet::new(),
            in_use: 0,
            max_in_use: 0,
            total_waits: 0,
        }
    }

    fn releasable_held(&self) -> usize {
        self.in_use - self.pinned.len()
    }
}

/// Per-node bounded pools of communication slots.
#[derive(Debug)]
pub struct CommQubitManager {
    pools: Vec<Pool>,
    risks: Vec<DeadlockRisk>,
}

impl CommQubitManager {
    /// Create pools sized by each node's declared communication capacity.
    pub fn new(network: &NetworkSpec) -> Self {
        Self {
            pools: network.nodes().iter().map(|n| Pool::new(n.comm_slots)).collect(),
            risks: Vec::new(),
        }
    }

    /// Try to acquire a slot on `node` for `waiter`'s protocol. Queues the
    /// waiter FIFO when the pool is exhausted.
    pub fn acquire(&mut self, node: NodeId, waiter: Waiter) -> Acquire {
        let pool = &mut self.pools[node.0 as usize];
        if let Some(&slot) = pool.free.first() {
            pool.free.remove(0);
            pool.in_use += 1;
            pool.max_in_use = pool.max_in_use.max(pool.in_use);
            debug!(%node, slot, protocol = %waiter.protocol, "comm slot acquired");
            return Acquire::Granted(slot);
        }
        pool.total_waits += 1;
        if pool.releasable_held() == 0 {
            warn!(
                %node,
                protocol = %waiter.protocol,
                capacity = pool.capacity,
                "deadlock risk: protocol waiting while no in-flight \
                 protocol holds a releasable comm slot"
            );
            self.risks.push(DeadlockRisk {
                node,
                protocol: waiter.protocol,
            });
        }
        self.pools[node.0 as usize].waiters.push_back(waiter);
        Acquire::Queued
    }

    /// Return a slot to the pool. If protocols are waiting, the slot is
    /// handed directly to the longest-waiting one (returned to the caller
    /// for binding and resumption) and stays in use.
    pub fn release(&mut self, node: NodeId, slot: usize) -> Option<(Waiter, usize)> {
        let pool = &mut self.pools[node.0 as usize];
        if let Some(waiter) = pool.waiters.pop_front() {
            debug!(%node, slot, protocol = %waiter.protocol, "comm slot handed off");
            return Some((waiter, slot));
        }
        pool.in_use -= 1;
        pool.free.push(slot);
        pool.free.sort_unstable();
        debug!(%node, slot, "comm slot released");
        None
    }

    /// Mark a slot permanently retained (a relocated qubit's new home).
    pub fn pin(&mut self, node: NodeId, slot: usize) {
        let pool = &mut self.pools[node.0 as usize];
        pool.pinned.insert(slot);
        if !pool.waiters.is_empty() && pool.releasable_held() == 0 {
            for waiter in &pool.waiters {
                warn!(
                    %node,
                    protocol = %waiter.protocol,
                    "deadlock risk: pinned slot leaves waiting protocol \
                     with no releasable comm slot"
                );
                self.risks.push(DeadlockRisk {
                    node,
                    protocol: waiter.protocol,
                });
            }
        }
    }

    /// Declared capacity of a node's pool.
    pub fn capacity(&self, node: NodeId) -> usize {
        self.pools[node.0 as usize].capacity
    }

    /// Slots currently in use on a node.
    pub fn in_use(&self, node: NodeId) -> usize {
        self.pools[node.0 as usize].in_use
    }

    /// High-water mark of concurrent occupancy on a node.
    pub fn max_in_use(&self, node: NodeId) -> usize {
        self.pools[node.0 as usize].max_in_use
    }

    /// Number of acquisitions that had to wait on a node.
    pub fn total_waits(&self, node: NodeId) -> u64 {
        self.pools[node.0 as usize].total_waits
    }

    /// Deadlock-risk observations recorded so far.
    pub fn risks(&self) -> &[DeadlockRisk] {
        &self.risks
    }
}
