// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Serialized circuit form.
//!
//! A circuit persists as an ordered list of fixed-shape operation records.
//! The record shape is the wire contract with the upstream front-end and
//! must remain stable:
//!
//! ```json
//! {
//!   "allocation": [ {"qubit": 0, "node": "alice", "slot": 0}, ... ],
//!   "ops": [
//!     {"kind": "init", "qubits": [0, 1, 2]},
//!     {"kind": "h", "qubits": [0]},
//!     {"kind": "cx", "qubits": [0, 1], "scheme": "cat"},
//!     {"kind": "measure", "qubits": [2]}
//!   ]
//! }
//! ```
//!
//! Rotation records carry an `angle` field; remote records may carry a
//! `scheme` tag and an `embedded` list whose operands are either a qubit id
//! or the string `"comm"` (the protocol's own communication qubit).
//!
//! Records carrying an explicit `comm_qubit` index are rejected:
//! communication-qubit selection is system-managed.

use serde::{Deserialize, Serialize};

use super::gate::GateKind;
use super::op::{Circuit, EmbeddedGate, EmbeddedOperand, Operation, QubitId};
use crate::error::{Result, ValidationError};

/// Record kinds that are not gate tags.
const KIND_INIT: &str = "init";
const KIND_MEASURE: &str = "measure";

/// One serialized operation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpRecord {
    /// Gate tag, `"init"`, or `"measure"`.
    pub kind: String,
    /// Rotation angle in radians, for `rx`/`ry`/`rz` records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    /// Qubit operands.
    pub qubits: Vec<u32>,
    /// Remote-gate scheme tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    /// Embedded local-gate sequence for remote gates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedded: Vec<EmbeddedRecord>,
    /// Explicit comm-qubit index. Always rejected; present in the record
    /// shape only so that legacy inputs fail with a precise error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comm_qubit: Option<i64>,
}

/// One embedded gate record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedRecord {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    pub operands: Vec<OperandRecord>,
}

/// Embedded-gate operand: a qubit id or the symbolic `"comm"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperandRecord {
    Qubit(u32),
    Symbol(String),
}

/// A serialized allocation entry (manual placement).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub qubit: u32,
    pub node: String,
    /// Processing-slot ordinal on the node; `None` takes the next free slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<usize>,
}

/// A complete circuit file: optional manual allocation plus operations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CircuitFile {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allocation: Vec<AllocationRecord>,
    pub ops: Vec<OpRecord>,
}

impl CircuitFile {
    /// Parse a circuit file from JSON.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a circuit file from YAML.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Decode all records into a circuit.
    pub fn decode(&self) -> Result<Circuit> {
        let mut circuit = Circuit::new();
        for (index, record) in self.ops.iter().enumerate() {
            circuit.push(decode_record(index, record)?);
        }
        Ok(circuit)
    }
}

/// Encode a circuit into wire records.
pub fn encode(circuit: &Circuit) -> Vec<OpRecord> {
    circuit.ops().iter().map(encode_record).collect()
}

fn encode_record(op: &Operation) -> OpRecord {
    let blank = |kind: String, qubits: Vec<u32>| OpRecord {
        kind,
        angle: None,
        qubits,
        scheme: None,
        embedded: Vec::new(),
        comm_qubit: None,
    };
    match op {
        Operation::Init { qubits } => blank(
            KIND_INIT.into(),
            qubits.iter().map(|q| q.0).collect(),
        ),
        Operation::Measure { qubit } => blank(KIND_MEASURE.into(), vec![qubit.0]),
        Operation::SingleQubit { kind, qubit } => {
            let mut r = blank(kind.tag().into(), vec![qubit.0]);
            r.angle = rotation_angle(kind);
            r
        }
        Operation::LocalTwoQubit {
            kind,
            control,
            target,
        } => blank(kind.tag().into(), vec![control.0, target.0]),
        Operation::RemoteTwoQubit {
            kind,
            control,
            target,
            scheme,
            embedded,
        } => {
            let mut r = blank(kind.tag().into(), vec![control.0, target.0]);
            r.scheme = scheme.clone();
            r.embedded = embedded
                .iter()
                .map(|g| EmbeddedRecord {
                    kind: g.kind.tag().into(),
                    angle: rotation_angle(&g.kind),
                    operands: g
                        .operands
                        .iter()
                        .map(|o| match o {
                            EmbeddedOperand::CommQubit => OperandRecord::Symbol("comm".into()),
                            EmbeddedOperand::Qubit(q) => OperandRecord::Qubit(q.0),
                        })
                        .collect(),
                })
                .collect();
            r
        }
    }
}

fn rotation_angle(kind: &GateKind) -> Option<f64> {
    match kind {
        GateKind::Rx(a) | GateKind::Ry(a) | GateKind::Rz(a) => Some(*a),
        _ => None,
    }
}

fn decode_record(index: usize, record: &OpRecord) -> Result<Operation> {
    if let Some(comm) = record.comm_qubit {
        return Err(ValidationError::CommQubitNotAddressable {
            op_index: index,
            index: comm,
        }
        .into());
    }

    match record.kind.as_str() {
        KIND_INIT => {
            if record.qubits.is_empty() {
                return Err(ValidationError::Field {
                    field: "qubits".into(),
                    message: format!("init record at operation {index} lists no qubits"),
                }
                .into());
            }
            Ok(Operation::Init {
                qubits: record.qubits.iter().copied().map(QubitId).collect(),
            })
        }
        KIND_MEASURE => {
            expect_arity(index, 1, record.qubits.len())?;
            Ok(Operation::Measure {
                qubit: QubitId(record.qubits[0]),
            })
        }
        tag => {
            let kind = GateKind::from_tag(tag, record.angle).ok_or(ValidationError::UnknownGate {
                op_index: index,
                tag: tag.to_string(),
            })?;
            expect_arity(index, kind.arity(), record.qubits.len())?;
            if kind.is_two_qubit() {
                let control = QubitId(record.qubits[0]);
                let target = QubitId(record.qubits[1]);
                if control == target {
                    return Err(ValidationError::DuplicateOperand {
                        op_index: index,
                        qubit: control,
                    }
                    .into());
                }
                if record.scheme.is_some() || !record.embedded.is_empty() {
                    Ok(Operation::RemoteTwoQubit {
                        kind,
                        control,
                        target,
                        scheme: record.scheme.clone(),
                        embedded: decode_embedded(index, &record.embedded)?,
                    })
                } else {
                    Ok(Operation::LocalTwoQubit {
                        kind,
                        control,
                        target,
                    })
                }
            } else {
                Ok(Operation::SingleQubit {
                    kind,
                    qubit: QubitId(record.qubits[0]),
                })
            }
        }
    }
}

fn decode_embedded(index: usize, records: &[EmbeddedRecord]) -> Result<Vec<EmbeddedGate>> {
    let mut gates = Vec::with_capacity(records.len());
    for record in records {
        let kind =
            GateKind::from_tag(&record.kind, record.angle).ok_or(ValidationError::UnknownGate {
                op_index: index,
                tag: record.kind.clone(),
            })?;
        expect_arity(index, kind.arity(), record.operands.len())?;
        let operands = record
            .operands
            .iter()
            .map(|o| match o {
                OperandRecord::Qubit(q) => Ok(EmbeddedOperand::Qubit(QubitId(*q))),
                OperandRecord::Symbol(s) if s == "comm" => Ok(EmbeddedOperand::CommQubit),
                OperandRecord::Symbol(s) => Err(ValidationError::Field {
                    field: "operands".into(),
                    message: format!(
                        "unknown embedded operand '{s}' at operation {index} (expected \
                         a qubit id or \"comm\")"
                    ),
                }),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        gates.push(EmbeddedGate::new(kind, operands));
    }
    Ok(gates)
}

fn expect_arity(op_index: usize, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(ValidationError::Arity {
            op_index,
            expected,
            got,
        }
        .into());
    }
    Ok(())
}
