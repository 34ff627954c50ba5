// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities for execution-layer tests.

use ndarray::Array1;
use num_complex::Complex64;

use crate::backend::{QuantumBackend, StateVectorBackend};
use crate::circuit::{Circuit, GateKind};
use crate::config::TimingConfig;
use crate::error::BackendError;
use crate::network::{NetworkSpec, NodeId, NodeSpec};
use crate::partition::SchemeSelector;
use crate::runtime::{run_circuit, Orchestrator, RunReport};

/// A network of `n` identical nodes named `node_0`, `node_1`, ...
pub fn uniform_network(n: usize, processing_slots: usize, comm_slots: usize) -> NetworkSpec {
    NetworkSpec::new(
        (0..n)
            .map(|i| NodeSpec::new(&format!("node_{i}"), processing_slots, comm_slots))
            .collect(),
    )
}

/// The three-qubit GHZ preparation circuit with both entangling gates
/// remote under the given scheme.
pub fn ghz_circuit(scheme: &str) -> Circuit {
    let mut circuit = Circuit::new();
    circuit
        .init(&[0, 1, 2])
        .h(0)
        .remote_cnot(0, 1, scheme)
        .remote_cnot(0, 2, scheme);
    circuit
}

/// Allocate FCFS, partition with the default selector, and run on a seeded
/// state-vector backend. Panics on any error (test use only).
pub fn run_statevector(
    circuit: &Circuit,
    network: &NetworkSpec,
    seed: u64,
) -> (RunReport, Orchestrator<StateVectorBackend>) {
    run_circuit(
        circuit,
        network,
        &TimingConfig::default(),
        &SchemeSelector::default(),
        StateVectorBackend::new(seed),
    )
    .expect("pipeline run failed")
}

/// A normalized state vector over `num_qubits` qubits with the given
/// `(basis index, weight)` amplitudes.
pub fn ideal_state(num_qubits: usize, amplitudes: &[(usize, f64)]) -> Array1<Complex64> {
    let mut state = Array1::from_elem(1usize << num_qubits, Complex64::new(0.0, 0.0));
    for &(index, weight) in amplitudes {
        state[index] = Complex64::new(weight, 0.0);
    }
    let norm: f64 = state.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
    state.mapv_into(|a| a / norm)
}

/// Backend wrapper that records every call, for ordering assertions.
pub struct RecordingBackend {
    inner: StateVectorBackend,
    log: Vec<String>,
}

impl RecordingBackend {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StateVectorBackend::new(seed),
            log: Vec::new(),
        }
    }

    /// The recorded call log.
    pub fn log(&self) -> &[String] {
        &self.log
    }
}

impl QuantumBackend for RecordingBackend {
    fn register_node(&mut self, node: NodeId, total_slots: usize) -> Result<(), BackendError> {
        self.log.push(format!("register {node}"));
        self.inner.register_node(node, total_slots)
    }

    fn reset(&mut self, node: NodeId, slot: usize) -> Result<(), BackendError> {
        self.log.push("reset".to_string());
        self.inner.reset(node, slot)
    }

    fn apply_gate(
        &mut self,
        node: NodeId,
        kind: GateKind,
        slots: &[usize],
    ) -> Result<(), BackendError> {
        self.log.push(format!("gate {}", kind.tag()));
        self.inner.apply_gate(node, kind, slots)
    }

    fn measure(&mut self, node: NodeId, slot: usize) -> Result<bool, BackendError> {
        self.log.push("measure".to_string());
        self.inner.measure(node, slot)
    }

    fn create_entanglement(
        &mut self,
        a: (NodeId, usize),
        b: (NodeId, usize),
    ) -> Result<(), BackendError> {
        self.log.push("entangle".to_string());
        self.inner.create_entanglement(a, b)
    }
}

/// Backend whose entanglement source always fails, for abort-path tests.
pub struct FailingEntanglementBackend {
    inner: StateVectorBackend,
}

impl FailingEntanglementBackend {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StateVectorBackend::new(seed),
        }
    }
}

impl QuantumBackend for FailingEntanglementBackend {
    fn register_node(&mut self, node: NodeId, total_slots: usize) -> Result<(), BackendError> {
        self.inner.register_node(node, total_slots)
    }

    fn reset(&mut self, node: NodeId, slot: usize) -> Result<(), BackendError> {
        self.inner.reset(node, slot)
    }

    fn apply_gate(
        &mut self,
        node: NodeId,
        kind: GateKind,
        slots: &[usize],
    ) -> Result<(), BackendError> {
        self.inner.apply_gate(node, kind, slots)
    }

    fn measure(&mut self, node: NodeId, slot: usize) -> Result<bool, BackendError> {
        self.inner.measure(node, slot)
    }

    fn create_entanglement(
        &mut self,
        _a: (NodeId, usize),
        _b: (NodeId, usize),
    ) -> Result<(), BackendError> {
        Err(BackendError::EntanglementFailed(
            "mock source offline".to_string(),
        ))
    }
}
