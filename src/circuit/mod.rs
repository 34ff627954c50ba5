// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Circuit model: gate kinds, operations, and the serialized wire form.

pub mod gate;
pub mod op;
pub mod wire;

pub use gate::GateKind;
pub use op::{Circuit, EmbeddedGate, EmbeddedOperand, Operation, QubitId};
pub use wire::{AllocationRecord, CircuitFile, OpRecord};
