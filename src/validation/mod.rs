// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Structural validation for circuits.
//!
//! Wire-shape checks (unknown tags, arity of records, explicit comm-qubit
//! indices) happen at decode time in `circuit::wire`; these functions check
//! properties of an assembled [`Circuit`] before allocation.

use crate::circuit::{Circuit, Operation};
use crate::error::{Result, ValidationError};

/// Validate a circuit's structure.
///
/// Checks that two-qubit operations use distinct operands, that embedded
/// sequences match their gates' arities, and that initializations are
/// non-empty.
pub fn validate_circuit(circuit: &Circuit) -> Result<()> {
    for (op_index, op) in circuit.iter() {
        match op {
            Operation::Init { qubits } => {
                if qubits.is_empty() {
                    return Err(ValidationError::Field {
                        field: "qubits".into(),
                        message: format!("init at operation {op_index} lists no qubits"),
                    }
                    .into());
                }
            }
            Operation::LocalTwoQubit {
                control, target, ..
            } => {
                if control == target {
                    return Err(ValidationError::DuplicateOperand {
                        op_index,
                        qubit: *control,
                    }
                    .into());
                }
            }
            Operation::RemoteTwoQubit {
                control,
                target,
                embedded,
                ..
            } => {
                if control == target {
                    return Err(ValidationError::DuplicateOperand {
                        op_index,
                        qubit: *control,
                    }
                    .into());
                }
                for gate in embedded {
                    if gate.operands.len() != gate.kind.arity() {
                        return Err(ValidationError::Arity {
                            op_index,
                            expected: gate.kind.arity(),
                            got: gate.operands.len(),
                        }
                        .into());
                    }
                }
            }
            Operation::SingleQubit { .. } | Operation::Measure { .. } => {}
        }
    }
    Ok(())
}
