// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Discrete-event runtime: the event queue, the communication-qubit
//! manager, protocol instances, and the orchestration controller.

pub mod comm;
pub mod controller;
pub mod event;
pub mod protocol;

pub use comm::{Acquire, CommQubitManager, DeadlockRisk, Waiter};
pub use controller::{
    run_circuit, BlockReason, CommStats, Diagnostic, MeasurementRecord, NodeState, Orchestrator,
    RunReport,
};
pub use event::{ClassicalMessage, Event, EventQueue, SimTime};
pub use protocol::{ProtocolInstance, ProtocolState};
