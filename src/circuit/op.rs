// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Circuit model: operations over monolithic qubit identifiers.
//!
//! A [`Circuit`] is an ordered sequence of [`Operation`]s. Order is
//! per-qubit-significant: two operations touching the same qubit execute in
//! their relative sequence order; operations on disjoint qubits carry no
//! ordering constraint of their own.
//!
//! Qubit identifiers are opaque indices into the monolithic circuit. They
//! acquire a physical home (node, memory position) only through an
//! `Allocation`.

use serde::{Deserialize, Serialize};

use super::gate::GateKind;

/// Identifier of a logical qubit in the monolithic circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl std::fmt::Display for QubitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Operand of an embedded gate executed at the remote end of a scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddedOperand {
    /// The protocol's communication qubit on the executing node (the
    /// transported qubit for teledata, the cat copy for telegate).
    CommQubit,
    /// A named circuit qubit. Must resolve to the executing node.
    Qubit(QubitId),
}

/// One local gate of a remote-gate operation's embedded sequence.
///
/// The embedded sequence replaces the single target gate at the remote end,
/// allowing several local gates to ride on one entanglement round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedGate {
    pub kind: GateKind,
    pub operands: Vec<EmbeddedOperand>,
}

impl EmbeddedGate {
    pub fn new(kind: GateKind, operands: Vec<EmbeddedOperand>) -> Self {
        Self { kind, operands }
    }
}

/// A single circuit operation. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Initialize the given qubits to |0⟩.
    Init { qubits: Vec<QubitId> },
    /// A single-qubit gate.
    SingleQubit { kind: GateKind, qubit: QubitId },
    /// A two-qubit gate expected to be node-local. If the allocation places
    /// the operands on different nodes it is executed remotely with the
    /// scheme chosen by the selector.
    LocalTwoQubit {
        kind: GateKind,
        control: QubitId,
        target: QubitId,
    },
    /// Measure a qubit in the computational basis.
    Measure { qubit: QubitId },
    /// A two-qubit gate declared remote, with an optional per-operation
    /// scheme tag and an optional embedded local-gate sequence. Degrades to
    /// a plain local gate when both operands share a node.
    RemoteTwoQubit {
        kind: GateKind,
        control: QubitId,
        target: QubitId,
        /// Raw scheme tag (`"cat"`, `"1tp"`, `"2tp"`, `"tp_safe"`).
        /// Resolved and validated at partition time; `None` defers to the
        /// scheme selector.
        scheme: Option<String>,
        #[serde(default)]
        embedded: Vec<EmbeddedGate>,
    },
}

impl Operation {
    /// All qubits this operation touches, in operand order.
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            Operation::Init { qubits } => qubits.clone(),
            Operation::SingleQubit { qubit, .. } | Operation::Measure { qubit } => vec![*qubit],
            Operation::LocalTwoQubit {
                control, target, ..
            }
            | Operation::RemoteTwoQubit {
                control, target, ..
            } => vec![*control, *target],
        }
    }
}

/// An ordered sequence of operations over monolithic qubits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    ops: Vec<Operation>,
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation.
    pub fn push(&mut self, op: Operation) -> &mut Self {
        self.ops.push(op);
        self
    }

    /// Append an initialization of the given qubits.
    pub fn init(&mut self, qubits: &[u32]) -> &mut Self {
        self.push(Operation::Init {
            qubits: qubits.iter().copied().map(QubitId).collect(),
        })
    }

    /// Append a single-qubit gate.
    pub fn gate(&mut self, kind: GateKind, qubit: u32) -> &mut Self {
        self.push(Operation::SingleQubit {
            kind,
            qubit: QubitId(qubit),
        })
    }

    /// Append a Hadamard.
    pub fn h(&mut self, qubit: u32) -> &mut Self {
        self.gate(GateKind::H, qubit)
    }

    /// Append a two-qubit gate (locality decided by the allocation).
    pub fn two_qubit(&mut self, kind: GateKind, control: u32, target: u32) -> &mut Self {
        self.push(Operation::LocalTwoQubit {
            kind,
            control: QubitId(control),
            target: QubitId(target),
        })
    }

    /// Append a CNOT (locality decided by the allocation).
    pub fn cnot(&mut self, control: u32, target: u32) -> &mut Self {
        self.two_qubit(GateKind::Cnot, control, target)
    }

    /// Append a remote CNOT with an explicit scheme tag.
    pub fn remote_cnot(&mut self, control: u32, target: u32, scheme: &str) -> &mut Self {
        self.push(Operation::RemoteTwoQubit {
            kind: GateKind::Cnot,
            control: QubitId(control),
            target: QubitId(target),
            scheme: Some(scheme.to_string()),
            embedded: Vec::new(),
        })
    }

    /// Append a measurement.
    pub fn measure(&mut self, qubit: u32) -> &mut Self {
        self.push(Operation::Measure {
            qubit: QubitId(qubit),
        })
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the circuit has no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Operations in order.
    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }

    /// Iterate over `(index, operation)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Operation)> {
        self.ops.iter().enumerate()
    }

    /// Qubits in order of first use.
    pub fn qubit_usage(&self) -> Vec<QubitId> {
        let mut seen = std::collections::HashSet::new();
        let mut order = Vec::new();
        for op in &self.ops {
            for q in op.qubits() {
                if seen.insert(q) {
                    order.push(q);
                }
            }
        }
        order
    }
}
