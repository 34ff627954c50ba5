// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Qubit-to-node allocation.
//!
//! An [`Allocation`] is a total, injective mapping from monolithic qubit ids
//! to `(node, memory position)` pairs, created once before partitioning and
//! read-only thereafter. Positions are absolute memory positions in the
//! node's layout (processing slots start after the communication pool).
//!
//! The default [`FirstComeFirstServed`] policy assigns qubits in first-use
//! order, filling each node's processing capacity before moving to the next
//! node in table order. Any [`AllocationPolicy`] with the same contract may
//! be substituted without changing downstream components.

use std::collections::HashMap;

use crate::circuit::{Circuit, QubitId};
use crate::error::{AllocationError, Result};
use crate::network::{NetworkSpec, NodeId};

/// A total, injective qubit → (node, position) mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Allocation {
    map: HashMap<QubitId, (NodeId, usize)>,
}

impl Allocation {
    /// Create an empty allocation (for manual construction).
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a qubit to a processing slot, given as a processing-slot
    /// ordinal on the node.
    ///
    /// # Errors
    ///
    /// - The qubit is already allocated
    /// - The slot ordinal is out of range
    /// - The slot is already taken
    pub fn assign(
        &mut self,
        qubit: QubitId,
        node: NodeId,
        slot: usize,
        network: &NetworkSpec,
    ) -> Result<()> {
        let spec = network.node(node);
        if slot >= spec.processing_slots {
            return Err(AllocationError::SlotOutOfRange { node, slot }.into());
        }
        let position = spec.processing_position(slot);
        if self.map.contains_key(&qubit) {
            return Err(AllocationError::DuplicateQubit { qubit }.into());
        }
        if self.map.values().any(|&(n, p)| n == node && p == position) {
            return Err(AllocationError::SlotInUse { node, slot }.into());
        }
        self.map.insert(qubit, (node, position));
        Ok(())
    }

    /// Look up a qubit's home.
    pub fn get(&self, qubit: QubitId) -> Option<(NodeId, usize)> {
        self.map.get(&qubit).copied()
    }

    /// Number of allocated qubits.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the allocation is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over `(qubit, node, position)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (QubitId, NodeId, usize)> + '_ {
        self.map.iter().map(|(&q, &(n, p))| (q, n, p))
    }
}

/// Strategy interface for qubit placement.
pub trait AllocationPolicy {
    /// Allocate every qubit in `qubits` (given in first-use order) to a
    /// processing slot, or fail with `CapacityExceeded`.
    fn allocate(&self, qubits: &[QubitId], network: &NetworkSpec) -> Result<Allocation>;
}

/// Default policy: fill each node's processing capacity in table order,
/// assigning qubits in first-use order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstComeFirstServed;

impl AllocationPolicy for FirstComeFirstServed {
    fn allocate(&self, qubits: &[QubitId], network: &NetworkSpec) -> Result<Allocation> {
        let available = network.total_processing_slots();
        if qubits.len() > available {
            return Err(AllocationError::CapacityExceeded {
                required: qubits.len(),
                available,
            }
            .into());
        }

        let mut allocation = Allocation::new();
        let mut node_iter = network.node_ids();
        let mut current = match node_iter.next() {
            Some(id) => id,
            None => {
                return Err(AllocationError::CapacityExceeded {
                    required: qubits.len(),
                    available: 0,
                }
                .into())
            }
        };
        let mut used = 0usize;

        for &qubit in qubits {
            while used >= network.node(current).processing_slots {
                current = match node_iter.next() {
                    Some(id) => id,
                    None => {
                        // Unreachable given the capacity check above, but
                        // surfaced as the same error rather than a panic.
                        return Err(AllocationError::CapacityExceeded {
                            required: qubits.len(),
                            available,
                        }
                        .into());
                    }
                };
                used = 0;
            }
            allocation.assign(qubit, current, used, network)?;
            used += 1;
        }

        Ok(allocation)
    }
}

/// Build an allocation from serialized placement records (a circuit file's
/// `allocation` section). Entries without an explicit slot take the node's
/// next free processing slot in record order.
pub fn allocation_from_records(
    records: &[crate::circuit::AllocationRecord],
    network: &NetworkSpec,
) -> Result<Allocation> {
    let mut allocation = Allocation::new();
    let mut next_free: Vec<usize> = vec![0; network.len()];
    for record in records {
        let node = network.lookup(&record.node).ok_or_else(|| {
            crate::error::Error::Config(format!("allocation names unknown node '{}'", record.node))
        })?;
        let slot = match record.slot {
            Some(slot) => slot,
            None => {
                // Skip over explicitly-taken ordinals.
                let taken: Vec<usize> = allocation
                    .iter()
                    .filter(|&(_, n, _)| n == node)
                    .map(|(_, _, p)| p - network.node(node).comm_slots)
                    .collect();
                let mut candidate = next_free[node.0 as usize];
                while taken.contains(&candidate) {
                    candidate += 1;
                }
                next_free[node.0 as usize] = candidate + 1;
                candidate
            }
        };
        allocation.assign(QubitId(record.qubit), node, slot, network)?;
    }
    Ok(allocation)
}

/// Allocate a circuit's qubits with the given policy.
pub fn allocate_circuit(
    circuit: &Circuit,
    network: &NetworkSpec,
    policy: &dyn AllocationPolicy,
) -> Result<Allocation> {
    policy.allocate(&circuit.qubit_usage(), network)
}
