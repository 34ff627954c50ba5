// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Circuit partitioning: monolithic operations to per-node streams.
//!
//! The partitioner walks the circuit in order, resolving every qubit through
//! the allocation (and through the relocation table once teledata schemes
//! move qubits), and emits one operation stream per node. Remote two-qubit
//! gates are replaced by their scheme's primitive step expansion.
//!
//! Partitioning is a pure function of `(circuit, allocation, selector)`:
//! protocol ids are assigned in operation order, so repeated runs produce
//! identical streams.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::circuit::{Circuit, EmbeddedOperand, GateKind, Operation, QubitId};
use crate::error::{PartitionError, Result};
use crate::network::{NetworkSpec, NodeId};
use crate::partition::allocator::Allocation;
use crate::partition::scheme::{
    ProtocolId, RemoteGateContext, RemoteGateStep, SchemeExpansion, SchemeKind, SchemeSelector,
    SlotRef, StepQubit,
};

/// One element of a node's operation stream.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOp {
    /// Initialize local slots to |0⟩.
    Init { slots: Vec<SlotRef> },
    /// A local gate on one or two slots.
    Gate { kind: GateKind, slots: Vec<SlotRef> },
    /// A circuit-level measurement (outcome recorded in the run report).
    Measure { qubit: QubitId, slot: SlotRef },
    /// One primitive step of a remote-gate protocol.
    Remote {
        protocol: ProtocolId,
        step: RemoteGateStep,
    },
}

/// Metadata for one protocol instance emitted by the partitioner.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolMeta {
    pub id: ProtocolId,
    pub scheme: SchemeKind,
    /// Index of the originating operation in the input circuit.
    pub op_index: usize,
    /// Initiating (control-side) node.
    pub node_a: NodeId,
    /// Target-side node.
    pub node_b: NodeId,
    /// Number of stream steps per node.
    pub steps_per_node: BTreeMap<NodeId, usize>,
    /// Ebits this protocol consumes.
    pub ebits: u8,
}

/// Per-node operation streams plus protocol metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionedCircuit {
    streams: Vec<Vec<NodeOp>>,
    protocols: Vec<ProtocolMeta>,
    final_locations: HashMap<QubitId, (NodeId, SlotRef)>,
}

impl PartitionedCircuit {
    /// Number of node streams (one per network node).
    pub fn num_nodes(&self) -> usize {
        self.streams.len()
    }

    /// Stream for one node.
    pub fn stream(&self, node: NodeId) -> &[NodeOp] {
        &self.streams[node.0 as usize]
    }

    /// All streams, indexed by node id.
    pub fn streams(&self) -> &[Vec<NodeOp>] {
        &self.streams
    }

    /// Protocol metadata in id order.
    pub fn protocols(&self) -> &[ProtocolMeta] {
        &self.protocols
    }

    /// Metadata for one protocol.
    pub fn protocol(&self, id: ProtocolId) -> &ProtocolMeta {
        &self.protocols[id.0 as usize]
    }

    /// Where each qubit lives after the whole stream has executed.
    pub fn final_locations(&self) -> &HashMap<QubitId, (NodeId, SlotRef)> {
        &self.final_locations
    }
}

/// Rewrite a circuit into per-node operation streams.
///
/// `network` sizes the stream table and provides slot layouts; `allocation`
/// gives every qubit its initial home; `selector` chooses schemes for remote
/// gates without a per-operation tag.
///
/// # Errors
///
/// - `UnsupportedScheme` for an unknown per-operation scheme tag
/// - `UnresolvedQubit` when an operation references a qubit absent from the
///   allocation
/// - `EmbeddedGateNotLocal` when an embedded gate operand does not live on
///   the target node
pub fn partition(
    circuit: &Circuit,
    allocation: &Allocation,
    selector: &SchemeSelector,
    network: &NetworkSpec,
) -> Result<PartitionedCircuit> {
    let mut state = Partitioner {
        streams: vec![Vec::new(); network.len()],
        protocols: Vec::new(),
        locations: allocation
            .iter()
            .map(|(q, n, p)| (q, (n, SlotRef::Fixed(p))))
            .collect(),
    };

    for (op_index, op) in circuit.iter() {
        state.rewrite(op_index, op, selector)?;
    }

    debug!(
        ops = circuit.len(),
        protocols = state.protocols.len(),
        "partitioned circuit"
    );

    Ok(PartitionedCircuit {
        streams: state.streams,
        protocols: state.protocols,
        final_locations: state.locations,
    })
}

struct Partitioner {
    streams: Vec<Vec<NodeOp>>,
    protocols: Vec<ProtocolMeta>,
    locations: HashMap<QubitId, (NodeId, SlotRef)>,
}

impl Partitioner {
    fn resolve(&self, op_index: usize, qubit: QubitId) -> Result<(NodeId, SlotRef)> {
        self.locations
            .get(&qubit)
            .copied()
            .ok_or_else(|| PartitionError::UnresolvedQubit { op_index, qubit }.into())
    }

    fn push(&mut self, node: NodeId, op: NodeOp) {
        self.streams[node.0 as usize].push(op);
    }

    fn rewrite(&mut self, op_index: usize, op: &Operation, selector: &SchemeSelector) -> Result<()> {
        match op {
            Operation::Init { qubits } => {
                let mut by_node: BTreeMap<NodeId, Vec<SlotRef>> = BTreeMap::new();
                for &q in qubits {
                    let (node, slot) = self.resolve(op_index, q)?;
                    by_node.entry(node).or_default().push(slot);
                }
                for (node, slots) in by_node {
                    self.push(node, NodeOp::Init { slots });
                }
                Ok(())
            }
            Operation::SingleQubit { kind, qubit } => {
                let (node, slot) = self.resolve(op_index, *qubit)?;
                self.push(
                    node,
                    NodeOp::Gate {
                        kind: *kind,
                        slots: vec![slot],
                    },
                );
                Ok(())
            }
            Operation::Measure { qubit } => {
                let (node, slot) = self.resolve(op_index, *qubit)?;
                self.push(
                    node,
                    NodeOp::Measure {
                        qubit: *qubit,
                        slot,
                    },
                );
                Ok(())
            }
            Operation::LocalTwoQubit {
                kind,
                control,
                target,
            } => self.rewrite_two_qubit(
                op_index, *kind, *control, *target, None, &[], selector,
            ),
            Operation::RemoteTwoQubit {
                kind,
                control,
                target,
                scheme,
                embedded,
            } => self.rewrite_two_qubit(
                op_index,
                *kind,
                *control,
                *target,
                scheme.as_deref(),
                embedded,
                selector,
            ),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn rewrite_two_qubit(
        &mut self,
        op_index: usize,
        kind: GateKind,
        control: QubitId,
        target: QubitId,
        scheme_tag: Option<&str>,
        embedded: &[crate::circuit::EmbeddedGate],
        selector: &SchemeSelector,
    ) -> Result<()> {
        let (node_a, slot_a) = self.resolve(op_index, control)?;
        let (node_b, slot_b) = self.resolve(op_index, target)?;

        if node_a == node_b {
            // Same node: the gate (or the embedded sequence, with the
            // transported-qubit stand-in resolved to the control) runs
            // locally.
            if embedded.is_empty() {
                self.push(
                    node_a,
                    NodeOp::Gate {
                        kind,
                        slots: vec![slot_a, slot_b],
                    },
                );
            } else {
                for gate in embedded {
                    let slots = gate
                        .operands
                        .iter()
                        .map(|operand| match operand {
                            EmbeddedOperand::CommQubit => Ok(slot_a),
                            EmbeddedOperand::Qubit(q) => {
                                let (node, slot) = self.resolve(op_index, *q)?;
                                if node != node_a {
                                    return Err(PartitionError::EmbeddedGateNotLocal {
                                        op_index,
                                        qubit: *q,
                                        node: node_a,
                                    }
                                    .into());
                                }
                                Ok(slot)
                            }
                        })
                        .collect::<Result<Vec<_>>>()?;
                    self.push(node_a, NodeOp::Gate { kind: gate.kind, slots });
                }
            }
            return Ok(());
        }

        let scheme = match scheme_tag {
            Some(tag) => SchemeKind::from_tag(tag).ok_or(PartitionError::UnsupportedScheme {
                op_index,
                tag: tag.to_string(),
            })?,
            None => selector.resolve(op_index),
        };

        let protocol = ProtocolId(self.protocols.len() as u32);

        // Resolve the embedded sequence against the target node.
        let embedded_steps = if embedded.is_empty() {
            vec![(kind, vec![StepQubit::Comm(0), StepQubit::Data(slot_b)])]
        } else {
            let mut steps = Vec::with_capacity(embedded.len());
            for gate in embedded {
                let qubits = gate
                    .operands
                    .iter()
                    .map(|operand| match operand {
                        EmbeddedOperand::CommQubit => Ok(StepQubit::Comm(0)),
                        EmbeddedOperand::Qubit(q) => {
                            let (node, slot) = self.resolve(op_index, *q)?;
                            if node != node_b {
                                return Err(PartitionError::EmbeddedGateNotLocal {
                                    op_index,
                                    qubit: *q,
                                    node: node_b,
                                }
                                .into());
                            }
                            Ok(StepQubit::Data(slot))
                        }
                    })
                    .collect::<Result<Vec<_>>>()?;
                steps.push((gate.kind, qubits));
            }
            steps
        };

        let ctx = RemoteGateContext {
            protocol,
            node_a,
            a: slot_a,
            qubit_a: control,
            node_b,
            b: slot_b,
            qubit_b: target,
            embedded: embedded_steps,
        };
        let SchemeExpansion {
            steps,
            relocations,
            ebits,
        } = scheme.expand(&ctx);

        let mut steps_per_node: BTreeMap<NodeId, usize> = BTreeMap::new();
        for placed in steps {
            *steps_per_node.entry(placed.node).or_insert(0) += 1;
            self.push(
                placed.node,
                NodeOp::Remote {
                    protocol,
                    step: placed.step,
                },
            );
        }

        for (qubit, node, comm) in relocations {
            debug!(%qubit, %node, %protocol, comm, "qubit relocated");
            self.locations
                .insert(qubit, (node, SlotRef::Bound(protocol, comm)));
        }

        self.protocols.push(ProtocolMeta {
            id: protocol,
            scheme,
            op_index,
            node_a,
            node_b,
            steps_per_node,
            ebits,
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::network::NodeSpec;
    use crate::partition::allocator::{allocate_circuit, FirstComeFirstServed};

    fn network() -> NetworkSpec {
        NetworkSpec::new(vec![
            NodeSpec::new("alice", 2, 1),
            NodeSpec::new("bob", 2, 1),
            NodeSpec::new("carol", 1, 1),
        ])
    }

    fn partitioned(circuit: &Circuit) -> PartitionedCircuit {
        let net = network();
        let alloc = allocate_circuit(circuit, &net, &FirstComeFirstServed).unwrap();
        partition(circuit, &alloc, &SchemeSelector::default(), &net).unwrap()
    }

    // =========================================================================
    // Local rewriting
    // =========================================================================

    #[test]
    fn test_local_ops_stay_local() {
        let mut c = Circuit::new();
        c.init(&[0, 1]).h(0).cnot(0, 1).measure(1);
        let p = partitioned(&c);
        // qubits 0 and 1 both fit on alice (2 processing slots at 1, 2)
        assert_eq!(p.stream(NodeId(0)).len(), 4);
        assert!(p.stream(NodeId(1)).is_empty());
        assert!(p.protocols().is_empty());
        assert_eq!(
            p.stream(NodeId(0))[2],
            NodeOp::Gate {
                kind: GateKind::Cnot,
                slots: vec![SlotRef::Fixed(1), SlotRef::Fixed(2)],
            }
        );
    }

    #[test]
    fn test_init_groups_by_node_in_order() {
        let mut c = Circuit::new();
        c.init(&[0, 1, 2, 3]);
        let p = partitioned(&c);
        assert_eq!(
            p.stream(NodeId(0))[0],
            NodeOp::Init {
                slots: vec![SlotRef::Fixed(1), SlotRef::Fixed(2)],
            }
        );
        assert_eq!(
            p.stream(NodeId(1))[0],
            NodeOp::Init {
                slots: vec![SlotRef::Fixed(1), SlotRef::Fixed(2)],
            }
        );
    }

    // =========================================================================
    // Remote rewriting
    // =========================================================================

    #[test]
    fn test_cross_node_gate_expands() {
        let mut c = Circuit::new();
        // qubits 0,1 on alice; 2,3 on bob
        c.init(&[0, 1, 2, 3]).cnot(0, 2);
        let p = partitioned(&c);
        assert_eq!(p.protocols().len(), 1);
        let meta = &p.protocols()[0];
        assert_eq!(meta.scheme, SchemeKind::Cat);
        assert_eq!(meta.op_index, 1);
        assert_eq!(meta.node_a, NodeId(0));
        assert_eq!(meta.node_b, NodeId(1));
        assert!(p
            .stream(NodeId(0))
            .iter()
            .any(|op| matches!(op, NodeOp::Remote { .. })));
        assert!(p
            .stream(NodeId(1))
            .iter()
            .any(|op| matches!(op, NodeOp::Remote { .. })));
    }

    #[test]
    fn test_step_counts_match_streams() {
        let mut c = Circuit::new();
        c.init(&[0, 1, 2, 3]).remote_cnot(0, 2, "tp_safe");
        let p = partitioned(&c);
        let meta = &p.protocols()[0];
        for (&node, &count) in &meta.steps_per_node {
            let in_stream = p
                .stream(node)
                .iter()
                .filter(|op| matches!(op, NodeOp::Remote { .. }))
                .count();
            assert_eq!(in_stream, count);
        }
    }

    #[test]
    fn test_op_level_scheme_overrides_selector() {
        let mut c = Circuit::new();
        c.init(&[0, 1, 2, 3]).remote_cnot(0, 2, "1tp");
        let net = network();
        let alloc = allocate_circuit(&c, &net, &FirstComeFirstServed).unwrap();
        let p = partition(
            &c,
            &alloc,
            &SchemeSelector::Uniform(SchemeKind::TpSafe),
            &net,
        )
        .unwrap();
        assert_eq!(p.protocols()[0].scheme, SchemeKind::OneTp);
    }

    #[test]
    fn test_remote_op_on_same_node_degrades_to_local() {
        let mut c = Circuit::new();
        c.init(&[0, 1]).remote_cnot(0, 1, "cat");
        let p = partitioned(&c);
        assert!(p.protocols().is_empty());
        assert!(p
            .stream(NodeId(0))
            .iter()
            .any(|op| matches!(op, NodeOp::Gate { kind: GateKind::Cnot, .. })));
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    #[test]
    fn test_per_qubit_order_preserved() {
        let mut c = Circuit::new();
        c.init(&[0, 1, 2, 3]).h(0).cnot(0, 2).h(0).measure(0);
        let p = partitioned(&c);
        let stream = p.stream(NodeId(0));
        let h1 = stream
            .iter()
            .position(|op| matches!(op, NodeOp::Gate { kind: GateKind::H, .. }))
            .unwrap();
        let first_remote = stream
            .iter()
            .position(|op| matches!(op, NodeOp::Remote { .. }))
            .unwrap();
        let last_remote = stream
            .iter()
            .rposition(|op| matches!(op, NodeOp::Remote { .. }))
            .unwrap();
        let h2 = stream
            .iter()
            .rposition(|op| matches!(op, NodeOp::Gate { kind: GateKind::H, .. }))
            .unwrap();
        let measure = stream
            .iter()
            .position(|op| matches!(op, NodeOp::Measure { .. }))
            .unwrap();
        assert!(h1 < first_remote);
        assert!(last_remote < h2);
        assert!(h2 < measure);
    }

    #[test]
    fn test_partition_is_deterministic() {
        let mut c = Circuit::new();
        c.init(&[0, 1, 2, 3, 4])
            .h(0)
            .remote_cnot(0, 2, "cat")
            .remote_cnot(2, 4, "tp_safe")
            .measure(4);
        let net = network();
        let alloc = allocate_circuit(&c, &net, &FirstComeFirstServed).unwrap();
        let sel = SchemeSelector::default();
        let p1 = partition(&c, &alloc, &sel, &net).unwrap();
        let p2 = partition(&c, &alloc, &sel, &net).unwrap();
        assert_eq!(p1, p2);
    }

    // =========================================================================
    // Relocation
    // =========================================================================

    #[test]
    fn test_one_tp_rewrites_later_references() {
        let mut c = Circuit::new();
        // qubit 0 on alice, qubit 2 on bob; after the 1tp gate qubit 0
        // lives in bob's retained comm slot
        c.init(&[0, 1, 2, 3]).remote_cnot(0, 2, "1tp").h(0).measure(0);
        let p = partitioned(&c);
        let (node, slot) = p.final_locations()[&QubitId(0)];
        assert_eq!(node, NodeId(1));
        assert_eq!(slot, SlotRef::Bound(ProtocolId(0), 0));
        // the trailing H and measure land on bob's stream against the bound slot
        let bob = p.stream(NodeId(1));
        assert!(bob.iter().any(|op| matches!(
            op,
            NodeOp::Gate {
                kind: GateKind::H,
                slots,
            } if slots == &vec![SlotRef::Bound(ProtocolId(0), 0)]
        )));
        assert!(bob.iter().any(|op| matches!(
            op,
            NodeOp::Measure {
                qubit: QubitId(0),
                slot: SlotRef::Bound(ProtocolId(0), 0),
            }
        )));
    }

    #[test]
    fn test_tp_safe_leaves_locations_unchanged() {
        let mut c = Circuit::new();
        c.init(&[0, 1, 2, 3]).remote_cnot(0, 2, "tp_safe");
        let p = partitioned(&c);
        let (node, slot) = p.final_locations()[&QubitId(0)];
        assert_eq!(node, NodeId(0));
        assert_eq!(slot, SlotRef::Fixed(1));
    }

    #[test]
    fn test_two_tp_swaps_homes() {
        let mut c = Circuit::new();
        c.init(&[0, 1, 2, 3]).remote_cnot(0, 2, "2tp");
        let p = partitioned(&c);
        assert_eq!(
            p.final_locations()[&QubitId(0)],
            (NodeId(1), SlotRef::Bound(ProtocolId(0), 0))
        );
        assert_eq!(
            p.final_locations()[&QubitId(2)],
            (NodeId(0), SlotRef::Bound(ProtocolId(0), 1))
        );
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn test_unresolved_qubit() {
        let mut c = Circuit::new();
        c.init(&[0, 1]).h(99);
        let net = network();
        let mut alloc = Allocation::new();
        alloc.assign(QubitId(0), NodeId(0), 0, &net).unwrap();
        alloc.assign(QubitId(1), NodeId(0), 1, &net).unwrap();
        let err = partition(&c, &alloc, &SchemeSelector::default(), &net).unwrap_err();
        match err {
            Error::Partition(PartitionError::UnresolvedQubit { op_index, qubit }) => {
                assert_eq!(op_index, 1);
                assert_eq!(qubit, QubitId(99));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unsupported_scheme() {
        let mut c = Circuit::new();
        c.init(&[0, 1, 2, 3]).remote_cnot(0, 2, "tp_risky");
        let net = network();
        let alloc = allocate_circuit(&c, &net, &FirstComeFirstServed).unwrap();
        let err = partition(&c, &alloc, &SchemeSelector::default(), &net).unwrap_err();
        match err {
            Error::Partition(PartitionError::UnsupportedScheme { op_index, tag }) => {
                assert_eq!(op_index, 1);
                assert_eq!(tag, "tp_risky");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_embedded_gate_not_local() {
        use crate::circuit::{EmbeddedGate, Operation};
        let mut c = Circuit::new();
        c.init(&[0, 1, 2, 3]);
        // embedded gate references qubit 1 (alice) but executes on bob
        c.push(Operation::RemoteTwoQubit {
            kind: GateKind::Cnot,
            control: QubitId(0),
            target: QubitId(2),
            scheme: Some("cat".into()),
            embedded: vec![EmbeddedGate::new(
                GateKind::Cnot,
                vec![
                    EmbeddedOperand::CommQubit,
                    EmbeddedOperand::Qubit(QubitId(1)),
                ],
            )],
        });
        let net = network();
        let alloc = allocate_circuit(&c, &net, &FirstComeFirstServed).unwrap();
        let err = partition(&c, &alloc, &SchemeSelector::default(), &net).unwrap_err();
        assert!(matches!(
            err,
            Error::Partition(PartitionError::EmbeddedGateNotLocal {
                op_index: 1,
                qubit: QubitId(1),
                ..
            })
        ));
    }
}
