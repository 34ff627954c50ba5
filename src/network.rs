// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Network topology types: nodes and their qubit pools.
//!
//! Each node owns two disjoint pools of memory positions:
//!
//! - *communication slots* at positions `0..comm_slots`, a bounded transient
//!   resource hosting ebit halves, and
//! - *processing slots* at positions `comm_slots..comm_slots + processing_slots`,
//!   assigned permanently to logical circuit qubits for a run.
//!
//! Communication slots come first so that processing-slot positions are
//! stable when the communication pool is resized.

use serde::{Deserialize, Serialize};

use crate::config::NetworkConfig;
use crate::error::{Error, Result};

/// Index of a node in the network's ordered node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u16);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Declared capacities of a single node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Node name, unique within the network.
    pub name: String,
    /// Number of processing slots (permanent qubit storage).
    pub processing_slots: usize,
    /// Number of communication slots (transient ebit storage).
    pub comm_slots: usize,
}

impl NodeSpec {
    /// Create a node spec.
    pub fn new(name: &str, processing_slots: usize, comm_slots: usize) -> Self {
        Self {
            name: name.to_string(),
            processing_slots,
            comm_slots,
        }
    }

    /// Total memory positions on this node.
    pub fn total_slots(&self) -> usize {
        self.processing_slots + self.comm_slots
    }

    /// Memory position of the `i`-th processing slot.
    pub fn processing_position(&self, i: usize) -> usize {
        self.comm_slots + i
    }

    /// Whether `position` lies in the communication pool.
    pub fn is_comm_position(&self, position: usize) -> bool {
        position < self.comm_slots
    }
}

/// An ordered table of nodes, resolved once from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSpec {
    nodes: Vec<NodeSpec>,
}

impl NetworkSpec {
    /// Build a network from an ordered list of node specs.
    pub fn new(nodes: Vec<NodeSpec>) -> Self {
        Self { nodes }
    }

    /// Build a network from configuration.
    pub fn from_config(config: &NetworkConfig) -> Result<Self> {
        if config.nodes.is_empty() {
            return Err(Error::Config("network has no nodes".into()));
        }
        let nodes = config
            .nodes
            .iter()
            .map(|n| NodeSpec::new(&n.name, n.processing_slots, n.comm_slots))
            .collect();
        Ok(Self { nodes })
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the network has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in table order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u16).map(NodeId)
    }

    /// Node spec by id.
    pub fn node(&self, id: NodeId) -> &NodeSpec {
        &self.nodes[id.0 as usize]
    }

    /// All node specs in table order.
    pub fn nodes(&self) -> &[NodeSpec] {
        &self.nodes
    }

    /// Node name by id.
    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0 as usize].name
    }

    /// Look up a node id by name.
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeId(i as u16))
    }

    /// Total processing capacity across all nodes.
    pub fn total_processing_slots(&self) -> usize {
        self.nodes.iter().map(|n| n.processing_slots).sum()
    }
}
