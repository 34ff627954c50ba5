// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Reference noiseless state-vector backend.
//!
//! Keeps one joint state vector over every registered node's memory
//! positions, so cross-node entanglement is represented exactly. Intended
//! for protocol verification and small circuits; memory grows as `2^n` in
//! the total qubit count.
//!
//! Basis convention: the qubit with global index `g` owns bit `g` of the
//! basis-state index (little-endian).
//!
//! Measurement sampling uses a seeded RNG so that runs are reproducible.

use std::collections::HashMap;

use ndarray::Array1;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::r#trait::QuantumBackend;
use crate::circuit::GateKind;
use crate::error::BackendError;
use crate::network::NodeId;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Noiseless joint state-vector simulator.
pub struct StateVectorBackend {
    offsets: HashMap<NodeId, usize>,
    sizes: HashMap<NodeId, usize>,
    total_qubits: usize,
    state: Array1<Complex64>,
    rng: StdRng,
}

impl StateVectorBackend {
    /// Create an empty backend with a measurement-sampling seed.
    pub fn new(seed: u64) -> Self {
        Self {
            offsets: HashMap::new(),
            sizes: HashMap::new(),
            total_qubits: 0,
            state: Array1::from_elem(1, ONE),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Total number of registered qubits.
    pub fn num_qubits(&self) -> usize {
        self.total_qubits
    }

    /// Global qubit index of a node's memory position.
    pub fn global_index(&self, node: NodeId, slot: usize) -> Option<usize> {
        let offset = *self.offsets.get(&node)?;
        if slot >= self.sizes[&node] {
            return None;
        }
        Some(offset + slot)
    }

    /// The joint state vector.
    pub fn state_vector(&self) -> &Array1<Complex64> {
        &self.state
    }

    /// Overlap fidelity |⟨target|state⟩|² against a vector of the same
    /// dimension.
    pub fn fidelity(&self, target: &Array1<Complex64>) -> f64 {
        if target.len() != self.state.len() {
            return 0.0;
        }
        let inner: Complex64 = target
            .iter()
            .zip(self.state.iter())
            .map(|(t, s)| t.conj() * s)
            .sum();
        inner.norm_sqr()
    }

    fn resolve(&self, node: NodeId, slot: usize) -> Result<usize, BackendError> {
        let offset = self
            .offsets
            .get(&node)
            .copied()
            .ok_or(BackendError::UnknownNode(node))?;
        if slot >= self.sizes[&node] {
            return Err(BackendError::SlotOutOfRange { node, slot });
        }
        Ok(offset + slot)
    }

    fn apply_single(&mut self, g: usize, m: [[Complex64; 2]; 2]) {
        let mask = 1usize << g;
        for i in 0..self.state.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.state[i];
                let b = self.state[j];
                self.state[i] = m[0][0] * a + m[0][1] * b;
                self.state[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    fn apply_cnot(&mut self, control: usize, target: usize) {
        let cmask = 1usize << control;
        let tmask = 1usize << target;
        for i in 0..self.state.len() {
            if i & cmask != 0 && i & tmask == 0 {
                let j = i | tmask;
                self.state.swap(i, j);
            }
        }
    }

    fn apply_cz(&mut self, a: usize, b: usize) {
        let mask = (1usize << a) | (1usize << b);
        for i in 0..self.state.len() {
            if i & mask == mask {
                self.state[i] = -self.state[i];
            }
        }
    }

    fn apply_swap(&mut self, a: usize, b: usize) {
        let amask = 1usize << a;
        let bmask = 1usize << b;
        for i in 0..self.state.len() {
            if i & amask != 0 && i & bmask == 0 {
                let j = (i & !amask) | bmask;
                self.state.swap(i, j);
            }
        }
    }

    fn measure_global(&mut self, g: usize) -> bool {
        let mask = 1usize << g;
        let p_one: f64 = self
            .state
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, amp)| amp.norm_sqr())
            .sum();
        let outcome = self.rng.gen::<f64>() < p_one;
        let keep = if outcome { p_one } else { 1.0 - p_one };
        // Project onto the measured branch and renormalize.
        let norm = keep.sqrt().max(f64::MIN_POSITIVE);
        for (i, amp) in self.state.iter_mut().enumerate() {
            if (i & mask != 0) != outcome {
                *amp = ZERO;
            } else {
                *amp /= norm;
            }
        }
        outcome
    }

    fn reset_global(&mut self, g: usize) {
        if self.measure_global(g) {
            self.apply_single(g, pauli_x());
        }
    }
}

fn pauli_x() -> [[Complex64; 2]; 2] {
    [[ZERO, ONE], [ONE, ZERO]]
}

fn hadamard() -> [[Complex64; 2]; 2] {
    let h = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
    [[h, h], [h, -h]]
}

fn single_qubit_matrix(kind: GateKind) -> Option<[[Complex64; 2]; 2]> {
    let i = Complex64::new(0.0, 1.0);
    match kind {
        GateKind::H => Some(hadamard()),
        GateKind::X => Some(pauli_x()),
        GateKind::Y => Some([[ZERO, -i], [i, ZERO]]),
        GateKind::Z => Some([[ONE, ZERO], [ZERO, -ONE]]),
        GateKind::S => Some([[ONE, ZERO], [ZERO, i]]),
        GateKind::Sdg => Some([[ONE, ZERO], [ZERO, -i]]),
        GateKind::T => Some([[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, std::f64::consts::FRAC_PI_4)]]),
        GateKind::Tdg => Some([[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, -std::f64::consts::FRAC_PI_4)]]),
        GateKind::Rx(theta) => {
            let c = Complex64::new((theta / 2.0).cos(), 0.0);
            let s = Complex64::new(0.0, -(theta / 2.0).sin());
            Some([[c, s], [s, c]])
        }
        GateKind::Ry(theta) => {
            let c = Complex64::new((theta / 2.0).cos(), 0.0);
            let s = Complex64::new((theta / 2.0).sin(), 0.0);
            Some([[c, -s], [s, c]])
        }
        GateKind::Rz(theta) => Some([
            [Complex64::from_polar(1.0, -theta / 2.0), ZERO],
            [ZERO, Complex64::from_polar(1.0, theta / 2.0)],
        ]),
        GateKind::Cnot | GateKind::Cz | GateKind::Swap => None,
    }
}

impl QuantumBackend for StateVectorBackend {
    fn register_node(&mut self, node: NodeId, total_slots: usize) -> Result<(), BackendError> {
        if self.offsets.contains_key(&node) {
            return Err(BackendError::Failure(format!(
                "node {node} registered twice"
            )));
        }
        self.offsets.insert(node, self.total_qubits);
        self.sizes.insert(node, total_slots);
        self.total_qubits += total_slots;
        // Tensor the new qubits in as |0...0⟩: old amplitudes occupy the
        // low-index block, everything else is zero.
        let mut grown = Array1::from_elem(1usize << self.total_qubits, ZERO);
        for (i, amp) in self.state.iter().enumerate() {
            grown[i] = *amp;
        }
        self.state = grown;
        Ok(())
    }

    fn reset(&mut self, node: NodeId, slot: usize) -> Result<(), BackendError> {
        let g = self.resolve(node, slot)?;
        self.reset_global(g);
        Ok(())
    }

    fn apply_gate(
        &mut self,
        node: NodeId,
        kind: GateKind,
        slots: &[usize],
    ) -> Result<(), BackendError> {
        if slots.len() != kind.arity() {
            return Err(BackendError::Failure(format!(
                "gate {kind} expects {} operand(s), got {}",
                kind.arity(),
                slots.len()
            )));
        }
        match kind {
            GateKind::Cnot => {
                let c = self.resolve(node, slots[0])?;
                let t = self.resolve(node, slots[1])?;
                self.apply_cnot(c, t);
            }
            GateKind::Cz => {
                let a = self.resolve(node, slots[0])?;
                let b = self.resolve(node, slots[1])?;
                self.apply_cz(a, b);
            }
            GateKind::Swap => {
                let a = self.resolve(node, slots[0])?;
                let b = self.resolve(node, slots[1])?;
                self.apply_swap(a, b);
            }
            single => {
                let g = self.resolve(node, slots[0])?;
                let m = single_qubit_matrix(single)
                    .ok_or_else(|| BackendError::UnsupportedGate(single.to_string()))?;
                self.apply_single(g, m);
            }
        }
        Ok(())
    }

    fn measure(&mut self, node: NodeId, slot: usize) -> Result<bool, BackendError> {
        let g = self.resolve(node, slot)?;
        Ok(self.measure_global(g))
    }

    fn create_entanglement(
        &mut self,
        a: (NodeId, usize),
        b: (NodeId, usize),
    ) -> Result<(), BackendError> {
        let ga = self.resolve(a.0, a.1)?;
        let gb = self.resolve(b.0, b.1)?;
        if ga == gb {
            return Err(BackendError::EntanglementFailed(
                "entanglement endpoints coincide".into(),
            ));
        }
        // Fresh pair: the source overwrites whatever was left in the slots.
        self.reset_global(ga);
        self.reset_global(gb);
        self.apply_single(ga, hadamard());
        self.apply_cnot(ga, gb);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn backend_with(nodes: &[(u16, usize)]) -> StateVectorBackend {
        let mut b = StateVectorBackend::new(42);
        for &(id, slots) in nodes {
            b.register_node(NodeId(id), slots).unwrap();
        }
        b
    }

    fn amp(b: &StateVectorBackend, index: usize) -> Complex64 {
        b.state_vector()[index]
    }

    // =========================================================================
    // Registration and layout
    // =========================================================================

    #[test]
    fn test_register_offsets() {
        let b = backend_with(&[(0, 2), (1, 3)]);
        assert_eq!(b.num_qubits(), 5);
        assert_eq!(b.global_index(NodeId(0), 0), Some(0));
        assert_eq!(b.global_index(NodeId(1), 0), Some(2));
        assert_eq!(b.global_index(NodeId(1), 2), Some(4));
        assert_eq!(b.global_index(NodeId(1), 3), None);
        assert_eq!(b.global_index(NodeId(9), 0), None);
    }

    #[test]
    fn test_register_twice_fails() {
        let mut b = backend_with(&[(0, 1)]);
        assert!(b.register_node(NodeId(0), 1).is_err());
    }

    #[test]
    fn test_initial_state_all_zero() {
        let b = backend_with(&[(0, 2)]);
        assert!((amp(&b, 0).re - 1.0).abs() < EPS);
        for i in 1..4 {
            assert!(amp(&b, i).norm() < EPS);
        }
    }

    // =========================================================================
    // Gates
    // =========================================================================

    #[test]
    fn test_hadamard_superposition() {
        let mut b = backend_with(&[(0, 1)]);
        b.apply_gate(NodeId(0), GateKind::H, &[0]).unwrap();
        assert!((amp(&b, 0).re - std::f64::consts::FRAC_1_SQRT_2).abs() < EPS);
        assert!((amp(&b, 1).re - std::f64::consts::FRAC_1_SQRT_2).abs() < EPS);
    }

    #[test]
    fn test_x_flips() {
        let mut b = backend_with(&[(0, 1)]);
        b.apply_gate(NodeId(0), GateKind::X, &[0]).unwrap();
        assert!((amp(&b, 1).re - 1.0).abs() < EPS);
    }

    #[test]
    fn test_cnot_entangles() {
        let mut b = backend_with(&[(0, 2)]);
        b.apply_gate(NodeId(0), GateKind::H, &[0]).unwrap();
        b.apply_gate(NodeId(0), GateKind::Cnot, &[0, 1]).unwrap();
        // Bell state (|00⟩ + |11⟩)/√2
        assert!((amp(&b, 0b00).norm() - std::f64::consts::FRAC_1_SQRT_2).abs() < EPS);
        assert!((amp(&b, 0b11).norm() - std::f64::consts::FRAC_1_SQRT_2).abs() < EPS);
        assert!(amp(&b, 0b01).norm() < EPS);
        assert!(amp(&b, 0b10).norm() < EPS);
    }

    #[test]
    fn test_swap_moves_state() {
        let mut b = backend_with(&[(0, 2)]);
        b.apply_gate(NodeId(0), GateKind::X, &[0]).unwrap();
        b.apply_gate(NodeId(0), GateKind::Swap, &[0, 1]).unwrap();
        assert!((amp(&b, 0b10).norm() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_cz_phase() {
        let mut b = backend_with(&[(0, 2)]);
        b.apply_gate(NodeId(0), GateKind::X, &[0]).unwrap();
        b.apply_gate(NodeId(0), GateKind::X, &[1]).unwrap();
        b.apply_gate(NodeId(0), GateKind::Cz, &[0, 1]).unwrap();
        assert!((amp(&b, 0b11).re + 1.0).abs() < EPS);
    }

    #[test]
    fn test_arity_mismatch_rejected() {
        let mut b = backend_with(&[(0, 2)]);
        assert!(b.apply_gate(NodeId(0), GateKind::Cnot, &[0]).is_err());
        assert!(b.apply_gate(NodeId(0), GateKind::H, &[0, 1]).is_err());
    }

    #[test]
    fn test_slot_out_of_range() {
        let mut b = backend_with(&[(0, 1)]);
        let err = b.apply_gate(NodeId(0), GateKind::H, &[3]).unwrap_err();
        assert!(matches!(err, BackendError::SlotOutOfRange { .. }));
    }

    // =========================================================================
    // Measurement and reset
    // =========================================================================

    #[test]
    fn test_measure_deterministic_state() {
        let mut b = backend_with(&[(0, 1)]);
        assert!(!b.measure(NodeId(0), 0).unwrap());
        b.apply_gate(NodeId(0), GateKind::X, &[0]).unwrap();
        assert!(b.measure(NodeId(0), 0).unwrap());
    }

    #[test]
    fn test_measure_collapses() {
        let mut b = backend_with(&[(0, 2)]);
        b.apply_gate(NodeId(0), GateKind::H, &[0]).unwrap();
        b.apply_gate(NodeId(0), GateKind::Cnot, &[0, 1]).unwrap();
        let m0 = b.measure(NodeId(0), 0).unwrap();
        let m1 = b.measure(NodeId(0), 1).unwrap();
        // Bell-state measurements are perfectly correlated
        assert_eq!(m0, m1);
        // and the state is now a basis state with unit norm
        let total: f64 = b.state_vector().iter().map(|a| a.norm_sqr()).sum();
        assert!((total - 1.0).abs() < EPS);
    }

    #[test]
    fn test_seeded_runs_reproduce() {
        let run = |seed: u64| -> Vec<bool> {
            let mut b = StateVectorBackend::new(seed);
            b.register_node(NodeId(0), 3).unwrap();
            (0..3)
                .map(|s| {
                    b.apply_gate(NodeId(0), GateKind::H, &[s]).unwrap();
                    b.measure(NodeId(0), s).unwrap()
                })
                .collect()
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn test_reset_after_one() {
        let mut b = backend_with(&[(0, 1)]);
        b.apply_gate(NodeId(0), GateKind::X, &[0]).unwrap();
        b.reset(NodeId(0), 0).unwrap();
        assert!((amp(&b, 0).re - 1.0).abs() < EPS);
    }

    // =========================================================================
    // Entanglement
    // =========================================================================

    #[test]
    fn test_create_entanglement_cross_node() {
        let mut b = backend_with(&[(0, 1), (1, 1)]);
        b.create_entanglement((NodeId(0), 0), (NodeId(1), 0)).unwrap();
        assert!((amp(&b, 0b00).norm() - std::f64::consts::FRAC_1_SQRT_2).abs() < EPS);
        assert!((amp(&b, 0b11).norm() - std::f64::consts::FRAC_1_SQRT_2).abs() < EPS);
    }

    #[test]
    fn test_create_entanglement_overwrites_leftovers() {
        let mut b = backend_with(&[(0, 1), (1, 1)]);
        b.apply_gate(NodeId(0), GateKind::X, &[0]).unwrap();
        b.create_entanglement((NodeId(0), 0), (NodeId(1), 0)).unwrap();
        // leftover |1⟩ was re-initialized before entangling
        assert!((amp(&b, 0b00).norm() - std::f64::consts::FRAC_1_SQRT_2).abs() < EPS);
        assert!((amp(&b, 0b11).norm() - std::f64::consts::FRAC_1_SQRT_2).abs() < EPS);
    }

    #[test]
    fn test_entanglement_same_slot_rejected() {
        let mut b = backend_with(&[(0, 1)]);
        let err = b
            .create_entanglement((NodeId(0), 0), (NodeId(0), 0))
            .unwrap_err();
        assert!(matches!(err, BackendError::EntanglementFailed(_)));
    }

    // =========================================================================
    // Fidelity
    // =========================================================================

    #[test]
    fn test_fidelity_ghz() {
        let mut b = backend_with(&[(0, 3)]);
        b.apply_gate(NodeId(0), GateKind::H, &[0]).unwrap();
        b.apply_gate(NodeId(0), GateKind::Cnot, &[0, 1]).unwrap();
        b.apply_gate(NodeId(0), GateKind::Cnot, &[0, 2]).unwrap();
        let mut ideal = Array1::from_elem(8, ZERO);
        ideal[0] = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
        ideal[7] = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
        assert!((b.fidelity(&ideal) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_fidelity_dimension_mismatch() {
        let b = backend_with(&[(0, 1)]);
        let wrong = Array1::from_elem(8, ZERO);
        assert_eq!(b.fidelity(&wrong), 0.0);
    }
}
