// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Circuit partitioning: allocation, remote-gate schemes, and the rewriter
//! that turns a monolithic circuit into per-node operation streams.

pub mod allocator;
pub mod partitioner;
pub mod scheme;

pub use allocator::{
    allocate_circuit, allocation_from_records, Allocation, AllocationPolicy, FirstComeFirstServed,
};
pub use partitioner::{partition, NodeOp, PartitionedCircuit, ProtocolMeta};
pub use scheme::{
    BitTag, PlacedStep, ProtocolId, RemoteGateContext, RemoteGateStep, ResourceCost,
    SchemeExpansion, SchemeKind, SchemeSelector, SlotRef, StepQubit,
};
