// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the distributed execution layer.

use std::fmt;

use crate::circuit::QubitId;
use crate::network::NodeId;

/// Result type alias for execution-layer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Execution-layer error types.
#[derive(Debug)]
pub enum Error {
    /// Configuration error
    Config(String),
    /// Allocation error
    Allocation(AllocationError),
    /// Partition error
    Partition(PartitionError),
    /// Execution error
    Execution(ExecutionError),
    /// Backend error
    Backend(BackendError),
    /// Validation error
    Validation(ValidationError),
    /// IO error
    Io(std::io::Error),
    /// Serialization error
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Allocation(e) => write!(f, "Allocation error: {}", e),
            Error::Partition(e) => write!(f, "Partition error: {}", e),
            Error::Execution(e) => write!(f, "Execution error: {}", e),
            Error::Backend(e) => write!(f, "Backend error: {}", e),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Allocation(e) => Some(e),
            Error::Partition(e) => Some(e),
            Error::Execution(e) => Some(e),
            Error::Backend(e) => Some(e),
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<AllocationError> for Error {
    fn from(e: AllocationError) -> Self {
        Error::Allocation(e)
    }
}

impl From<PartitionError> for Error {
    fn from(e: PartitionError) -> Self {
        Error::Partition(e)
    }
}

impl From<ExecutionError> for Error {
    fn from(e: ExecutionError) -> Self {
        Error::Execution(e)
    }
}

impl From<BackendError> for Error {
    fn from(e: BackendError) -> Self {
        Error::Backend(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Errors raised while mapping qubits to nodes.
#[derive(Debug)]
pub enum AllocationError {
    /// The circuit needs more processing slots than the network declares.
    CapacityExceeded { required: usize, available: usize },
    /// A qubit was assigned twice in a manual allocation.
    DuplicateQubit { qubit: QubitId },
    /// A processing slot was assigned twice in a manual allocation.
    SlotInUse { node: NodeId, slot: usize },
    /// A manual allocation references a slot outside the node's capacity.
    SlotOutOfRange { node: NodeId, slot: usize },
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationError::CapacityExceeded {
                required,
                available,
            } => write!(
                f,
                "Capacity exceeded: circuit needs {} processing slots, network has {}",
                required, available
            ),
            AllocationError::DuplicateQubit { qubit } => {
                write!(f, "Qubit {} allocated more than once", qubit)
            }
            AllocationError::SlotInUse { node, slot } => {
                write!(f, "Processing slot {} on {} already in use", slot, node)
            }
            AllocationError::SlotOutOfRange { node, slot } => {
                write!(f, "Processing slot {} out of range on {}", slot, node)
            }
        }
    }
}

impl std::error::Error for AllocationError {}

/// Errors raised while rewriting a circuit into per-node streams.
#[derive(Debug)]
pub enum PartitionError {
    /// A remote gate requested an unknown scheme tag.
    UnsupportedScheme { op_index: usize, tag: String },
    /// An operation references a qubit absent from the allocation.
    UnresolvedQubit { op_index: usize, qubit: QubitId },
    /// An embedded gate references a qubit that is not local to the node
    /// executing the embedded sequence.
    EmbeddedGateNotLocal {
        op_index: usize,
        qubit: QubitId,
        node: NodeId,
    },
}

impl fmt::Display for PartitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionError::UnsupportedScheme { op_index, tag } => {
                write!(f, "Unsupported scheme '{}' at operation {}", tag, op_index)
            }
            PartitionError::UnresolvedQubit { op_index, qubit } => {
                write!(
                    f,
                    "Operation {} references qubit {} absent from the allocation",
                    op_index, qubit
                )
            }
            PartitionError::EmbeddedGateNotLocal {
                op_index,
                qubit,
                node,
            } => write!(
                f,
                "Embedded gate at operation {} references qubit {} not local to {}",
                op_index, qubit, node
            ),
        }
    }
}

impl std::error::Error for PartitionError {}

/// Errors raised while driving a partitioned circuit.
#[derive(Debug)]
pub enum ExecutionError {
    /// A protocol instance reached a terminal failure; the run is aborted.
    ProtocolAborted {
        protocol: u32,
        op_index: usize,
        node: NodeId,
        reason: BackendError,
    },
    /// The event queue drained while nodes were still blocked.
    Stalled { nodes: Vec<String> },
    /// An internal protocol invariant was violated (malformed stream).
    ProtocolViolation(String),
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::ProtocolAborted {
                protocol,
                op_index,
                node,
                reason,
            } => write!(
                f,
                "Protocol {} (operation {}) aborted on {}: {}",
                protocol, op_index, node, reason
            ),
            ExecutionError::Stalled { nodes } => {
                write!(f, "Run stalled with blocked nodes: {}", nodes.join(", "))
            }
            ExecutionError::ProtocolViolation(msg) => {
                write!(f, "Protocol violation: {}", msg)
            }
        }
    }
}

impl std::error::Error for ExecutionError {}

/// Errors reported by a quantum backend.
#[derive(Debug)]
pub enum BackendError {
    /// A node was not registered with the backend.
    UnknownNode(NodeId),
    /// A memory position is outside the node's registered range.
    SlotOutOfRange { node: NodeId, slot: usize },
    /// The backend does not implement the requested gate.
    UnsupportedGate(String),
    /// Entanglement generation failed unrecoverably.
    EntanglementFailed(String),
    /// Any other backend failure.
    Failure(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::UnknownNode(node) => write!(f, "Unknown node: {}", node),
            BackendError::SlotOutOfRange { node, slot } => {
                write!(f, "Slot {} out of range on {}", slot, node)
            }
            BackendError::UnsupportedGate(kind) => write!(f, "Unsupported gate: {}", kind),
            BackendError::EntanglementFailed(msg) => {
                write!(f, "Entanglement generation failed: {}", msg)
            }
            BackendError::Failure(msg) => write!(f, "Backend failure: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

/// Validation errors for circuits and wire records.
#[derive(Debug)]
pub enum ValidationError {
    /// Field validation failed
    Field { field: String, message: String },
    /// A wire record names a gate tag the execution layer does not know.
    UnknownGate { op_index: usize, tag: String },
    /// An operation's operand count does not match the gate's arity.
    Arity {
        op_index: usize,
        expected: usize,
        got: usize,
    },
    /// A wire record supplies an explicit communication-qubit index.
    /// Communication-qubit selection is always system-managed.
    CommQubitNotAddressable { op_index: usize, index: i64 },
    /// A two-qubit operation uses the same qubit twice.
    DuplicateOperand { op_index: usize, qubit: QubitId },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Field { field, message } => {
                write!(f, "Field '{}': {}", field, message)
            }
            ValidationError::UnknownGate { op_index, tag } => {
                write!(f, "Unknown gate '{}' at operation {}", tag, op_index)
            }
            ValidationError::Arity {
                op_index,
                expected,
                got,
            } => write!(
                f,
                "Operation {} expects {} qubit(s), got {}",
                op_index, expected, got
            ),
            ValidationError::CommQubitNotAddressable { op_index, index } => write!(
                f,
                "Operation {} supplies comm-qubit index {}; \
                 comm-qubit selection is system-managed",
                op_index, index
            ),
            ValidationError::DuplicateOperand { op_index, qubit } => {
                write!(
                    f,
                    "Operation {} uses qubit {} for both operands",
                    op_index, qubit
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    // =========================================================================
    // Error Display tests
    // =========================================================================

    #[test]
    fn test_error_display_config() {
        let e = Error::Config("missing nodes".into());
        assert_eq!(e.to_string(), "Configuration error: missing nodes");
    }

    #[test]
    fn test_error_display_allocation() {
        let e = Error::Allocation(AllocationError::CapacityExceeded {
            required: 5,
            available: 3,
        });
        assert_eq!(
            e.to_string(),
            "Allocation error: Capacity exceeded: circuit needs 5 processing slots, network has 3"
        );
    }

    #[test]
    fn test_error_display_partition() {
        let e = Error::Partition(PartitionError::UnsupportedScheme {
            op_index: 2,
            tag: "warp".into(),
        });
        assert_eq!(
            e.to_string(),
            "Partition error: Unsupported scheme 'warp' at operation 2"
        );
    }

    #[test]
    fn test_error_display_execution() {
        let e = Error::Execution(ExecutionError::Stalled {
            nodes: vec!["alice".into(), "bob".into()],
        });
        assert_eq!(
            e.to_string(),
            "Execution error: Run stalled with blocked nodes: alice, bob"
        );
    }

    #[test]
    fn test_error_display_backend() {
        let e = Error::Backend(BackendError::EntanglementFailed("source offline".into()));
        assert_eq!(
            e.to_string(),
            "Backend error: Entanglement generation failed: source offline"
        );
    }

    #[test]
    fn test_error_display_validation() {
        let e = Error::Validation(ValidationError::CommQubitNotAddressable {
            op_index: 4,
            index: -1,
        });
        assert_eq!(
            e.to_string(),
            "Validation error: Operation 4 supplies comm-qubit index -1; \
             comm-qubit selection is system-managed"
        );
    }

    // =========================================================================
    // Sub-error Display tests
    // =========================================================================

    #[test]
    fn test_partition_error_display_unresolved_qubit() {
        let e = PartitionError::UnresolvedQubit {
            op_index: 7,
            qubit: QubitId(99),
        };
        assert_eq!(
            e.to_string(),
            "Operation 7 references qubit q99 absent from the allocation"
        );
    }

    #[test]
    fn test_partition_error_display_embedded_not_local() {
        let e = PartitionError::EmbeddedGateNotLocal {
            op_index: 3,
            qubit: QubitId(1),
            node: NodeId(0),
        };
        assert_eq!(
            e.to_string(),
            "Embedded gate at operation 3 references qubit q1 not local to node#0"
        );
    }

    #[test]
    fn test_execution_error_display_aborted() {
        let e = ExecutionError::ProtocolAborted {
            protocol: 1,
            op_index: 5,
            node: NodeId(2),
            reason: BackendError::Failure("boom".into()),
        };
        assert_eq!(
            e.to_string(),
            "Protocol 1 (operation 5) aborted on node#2: Backend failure: boom"
        );
    }

    #[test]
    fn test_allocation_error_display_duplicate() {
        let e = AllocationError::DuplicateQubit { qubit: QubitId(3) };
        assert_eq!(e.to_string(), "Qubit q3 allocated more than once");
    }

    #[test]
    fn test_backend_error_display_slot() {
        let e = BackendError::SlotOutOfRange {
            node: NodeId(1),
            slot: 9,
        };
        assert_eq!(e.to_string(), "Slot 9 out of range on node#1");
    }

    #[test]
    fn test_validation_error_display_arity() {
        let e = ValidationError::Arity {
            op_index: 0,
            expected: 2,
            got: 1,
        };
        assert_eq!(e.to_string(), "Operation 0 expects 2 qubit(s), got 1");
    }

    // =========================================================================
    // Error::source() and From impls
    // =========================================================================

    #[test]
    fn test_error_source_layers() {
        let e = Error::Partition(PartitionError::UnresolvedQubit {
            op_index: 0,
            qubit: QubitId(0),
        });
        assert!(e.source().is_some());
        assert!(Error::Config("x".into()).source().is_none());
        assert!(Error::Serialization("x".into()).source().is_none());
    }

    #[test]
    fn test_from_sub_errors() {
        let e: Error = AllocationError::DuplicateQubit { qubit: QubitId(0) }.into();
        assert!(matches!(e, Error::Allocation(_)));

        let e: Error = BackendError::Failure("x".into()).into();
        assert!(matches!(e, Error::Backend(_)));

        let e: Error = ValidationError::Field {
            field: "a".into(),
            message: "b".into(),
        }
        .into();
        assert!(matches!(e, Error::Validation(_)));
    }

    #[test]
    fn test_from_serde_errors() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("{{{{").unwrap_err();
        let e: Error = yaml_err.into();
        assert!(matches!(e, Error::Serialization(_)));

        let json_err = serde_json::from_str::<serde_json::Value>("{bad}").unwrap_err();
        let e: Error = json_err.into();
        assert!(matches!(e, Error::Serialization(_)));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
    }
}
