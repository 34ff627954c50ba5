// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Gate kinds understood by the execution layer.
//!
//! The set is closed: remote-gate schemes are expressed entirely in terms of
//! these kinds plus measurements, so a backend that implements this enum can
//! execute any partitioned circuit. Rotation kinds carry their angle in
//! radians.

use serde::{Deserialize, Serialize};

/// A quantum gate kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gate", content = "angle", rename_all = "lowercase")]
pub enum GateKind {
    /// Hadamard
    H,
    /// Pauli X
    X,
    /// Pauli Y
    Y,
    /// Pauli Z
    Z,
    /// Phase gate (sqrt Z)
    S,
    /// Inverse phase gate
    Sdg,
    /// T gate (fourth root of Z)
    T,
    /// Inverse T gate
    Tdg,
    /// X rotation by an angle in radians
    Rx(f64),
    /// Y rotation by an angle in radians
    Ry(f64),
    /// Z rotation by an angle in radians
    Rz(f64),
    /// Controlled X
    #[serde(rename = "cx")]
    Cnot,
    /// Controlled Z
    Cz,
    /// Swap two qubits
    Swap,
}

impl GateKind {
    /// Number of qubit operands.
    pub fn arity(&self) -> usize {
        match self {
            GateKind::Cnot | GateKind::Cz | GateKind::Swap => 2,
            _ => 1,
        }
    }

    /// Whether this is a two-qubit gate.
    pub fn is_two_qubit(&self) -> bool {
        self.arity() == 2
    }

    /// Stable wire tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            GateKind::H => "h",
            GateKind::X => "x",
            GateKind::Y => "y",
            GateKind::Z => "z",
            GateKind::S => "s",
            GateKind::Sdg => "sdg",
            GateKind::T => "t",
            GateKind::Tdg => "tdg",
            GateKind::Rx(_) => "rx",
            GateKind::Ry(_) => "ry",
            GateKind::Rz(_) => "rz",
            GateKind::Cnot => "cx",
            GateKind::Cz => "cz",
            GateKind::Swap => "swap",
        }
    }

    /// Resolve a wire tag (with optional rotation angle) to a gate kind.
    ///
    /// Returns `None` for unknown tags, or for rotation tags without an
    /// angle and non-rotation tags with one.
    pub fn from_tag(tag: &str, angle: Option<f64>) -> Option<Self> {
        match (tag, angle) {
            ("h", None) => Some(GateKind::H),
            ("x", None) => Some(GateKind::X),
            ("y", None) => Some(GateKind::Y),
            ("z", None) => Some(GateKind::Z),
            ("s", None) => Some(GateKind::S),
            ("sdg", None) => Some(GateKind::Sdg),
            ("t", None) => Some(GateKind::T),
            ("tdg", None) => Some(GateKind::Tdg),
            ("rx", Some(a)) => Some(GateKind::Rx(a)),
            ("ry", Some(a)) => Some(GateKind::Ry(a)),
            ("rz", Some(a)) => Some(GateKind::Rz(a)),
            ("cx", None) => Some(GateKind::Cnot),
            ("cz", None) => Some(GateKind::Cz),
            ("swap", None) => Some(GateKind::Swap),
            _ => None,
        }
    }
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateKind::Rx(a) => write!(f, "rx({a})"),
            GateKind::Ry(a) => write!(f, "ry({a})"),
            GateKind::Rz(a) => write!(f, "rz({a})"),
            other => write!(f, "{}", other.tag()),
        }
    }
}
