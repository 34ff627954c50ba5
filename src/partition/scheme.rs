// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Remote-gate schemes and their primitive step sequences.
//!
//! Each scheme is a pure function from a remote two-qubit gate to an ordered
//! list of node-placed primitive steps. Cross-node dependencies are declared
//! by classical-bit tag pairing (an await fires only after the matching
//! send) and by the entanglement rendezvous; per-node order is the list
//! order.
//!
//! Scheme names arrive as wire tags and are resolved here exactly once;
//! everything downstream works on the closed [`SchemeKind`] enum.
//!
//! Protocol conventions shared by all schemes:
//!
//! - The node hosting the control operand (`qubit_a`) initiates round 1;
//!   round 2 of the two-ebit schemes is initiated by the target node.
//! - `RequestEntanglement` is executed by the initiator and reserves the
//!   protocol's next communication slot on *both* endpoints (own side
//!   first), then waits for the entanglement source.
//! - Embedded local gates execute on the target node after the correction
//!   step, in place of the single target gate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::circuit::{GateKind, QubitId};
use crate::network::NodeId;

/// Identifier of a protocol instance within one partitioned circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProtocolId(pub u32);

impl std::fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Tag pairing a classical bit between its measurement, send, await, and
/// any conditional correction, within one protocol instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitTag(pub u8);

/// Reference to a data-qubit memory position on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotRef {
    /// A fixed memory position (a processing slot from the allocation).
    Fixed(usize),
    /// The communication slot retained by an earlier teledata protocol:
    /// `(protocol, comm ordinal)`. Resolved through the run's binding table.
    Bound(ProtocolId, u8),
}

/// A qubit operand of a protocol step, local to the executing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepQubit {
    /// A data qubit.
    Data(SlotRef),
    /// This protocol's `i`-th communication slot on the executing node.
    Comm(u8),
}

/// One primitive action of a remote-gate protocol, local to the node whose
/// stream carries it (except `RequestEntanglement`, which reserves slots on
/// both endpoints).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RemoteGateStep {
    /// Reserve the protocol's `comm`-th communication slot on the executing
    /// node and on `peer`, then wait for the entanglement source to deposit
    /// an ebit across the two slots.
    RequestEntanglement { peer: NodeId, comm: u8 },
    /// Apply a local gate. With a condition tag, the gate fires only when
    /// the recorded classical bit is 1.
    LocalGate {
        kind: GateKind,
        qubits: Vec<StepQubit>,
        condition: Option<BitTag>,
    },
    /// Measure a local qubit, recording the outcome under `tag`.
    LocalMeasure { qubit: StepQubit, tag: BitTag },
    /// Send the recorded bit `tag` to `to`.
    SendClassicalBit { to: NodeId, tag: BitTag },
    /// Wait for the bit `tag` from `from` and record it.
    AwaitClassicalBit { from: NodeId, tag: BitTag },
    /// Re-initialize a measured qubit to |0⟩.
    Reset { qubit: StepQubit },
    /// Return the protocol's `comm`-th slot on the executing node to the
    /// pool. The slot is re-initialized on release.
    ReleaseCommQubit { comm: u8 },
}

/// A step placed on a node's stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedStep {
    pub node: NodeId,
    pub step: RemoteGateStep,
}

/// Result of expanding one remote gate.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemeExpansion {
    /// Steps in dependency order.
    pub steps: Vec<PlacedStep>,
    /// Qubits whose home is now `(node, Bound(protocol, comm))`.
    pub relocations: Vec<(QubitId, NodeId, u8)>,
    /// Ebits consumed.
    pub ebits: u8,
}

/// Worst-case resource footprint of one remote gate (all measurement
/// outcomes 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCost {
    pub epr_pairs: u8,
    pub cnots: u8,
    pub single_qubit_gates: u8,
    pub measurements: u8,
    pub classical_messages: u8,
}

/// The closed family of remote-gate schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeKind {
    /// Telegate: cat-entangle the control onto the target node, apply the
    /// gate there, disentangle. Both qubits stay in place.
    Cat,
    /// Teledata, one teleportation: the control qubit moves to the target
    /// node and stays there.
    OneTp,
    /// Teledata, two teleportations: the control moves to the target node,
    /// then the target qubit makes the symmetric return trip.
    TwoTp,
    /// Measurement-safe teledata: teleport, apply, teleport back into the
    /// original slot. No relocation, one extra ebit.
    TpSafe,
}

impl SchemeKind {
    /// Resolve a wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "cat" => Some(SchemeKind::Cat),
            "1tp" => Some(SchemeKind::OneTp),
            "2tp" => Some(SchemeKind::TwoTp),
            "tp_safe" => Some(SchemeKind::TpSafe),
            _ => None,
        }
    }

    /// Stable wire tag.
    pub fn tag(&self) -> &'static str {
        match self {
            SchemeKind::Cat => "cat",
            SchemeKind::OneTp => "1tp",
            SchemeKind::TwoTp => "2tp",
            SchemeKind::TpSafe => "tp_safe",
        }
    }

    /// Worst-case resource footprint of one remote gate under this scheme.
    pub fn resource_cost(&self) -> ResourceCost {
        match self {
            SchemeKind::Cat | SchemeKind::OneTp => ResourceCost {
                epr_pairs: 1,
                cnots: 2,
                single_qubit_gates: 3,
                measurements: 2,
                classical_messages: 2,
            },
            SchemeKind::TwoTp | SchemeKind::TpSafe => ResourceCost {
                epr_pairs: 2,
                cnots: 3,
                single_qubit_gates: 6,
                measurements: 4,
                classical_messages: 4,
            },
        }
    }

    /// Expand a remote gate into its primitive step sequence.
    pub fn expand(&self, ctx: &RemoteGateContext) -> SchemeExpansion {
        match self {
            SchemeKind::Cat => expand_cat(ctx),
            SchemeKind::OneTp => expand_one_tp(ctx),
            SchemeKind::TwoTp => expand_two_tp(ctx),
            SchemeKind::TpSafe => expand_tp_safe(ctx),
        }
    }
}

impl std::fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Scheme choice for remote gates without a per-operation tag.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemeSelector {
    /// One scheme for every remote gate.
    Uniform(SchemeKind),
    /// Per-operation overrides (keyed by operation index) over a default.
    PerOperation {
        overrides: HashMap<usize, SchemeKind>,
        default: SchemeKind,
    },
}

impl SchemeSelector {
    /// Scheme for the operation at `op_index`.
    pub fn resolve(&self, op_index: usize) -> SchemeKind {
        match self {
            SchemeSelector::Uniform(kind) => *kind,
            SchemeSelector::PerOperation { overrides, default } => {
                overrides.get(&op_index).copied().unwrap_or(*default)
            }
        }
    }
}

impl Default for SchemeSelector {
    fn default() -> Self {
        SchemeSelector::Uniform(SchemeKind::Cat)
    }
}

/// Inputs to a scheme expansion, with all qubit references already resolved
/// to node-local slots.
#[derive(Debug, Clone)]
pub struct RemoteGateContext {
    pub protocol: ProtocolId,
    /// Control-side node and the control qubit's slot there.
    pub node_a: NodeId,
    pub a: SlotRef,
    /// Control qubit id (for relocation bookkeeping).
    pub qubit_a: QubitId,
    /// Target-side node and the target qubit's slot there.
    pub node_b: NodeId,
    pub b: SlotRef,
    /// Target qubit id (for relocation bookkeeping).
    pub qubit_b: QubitId,
    /// Local gates executed on `node_b` in place of the single target gate.
    pub embedded: Vec<(GateKind, Vec<StepQubit>)>,
}

const X_BIT: BitTag = BitTag(0);
const Z_BIT: BitTag = BitTag(1);
const X_BIT_RETURN: BitTag = BitTag(2);
const Z_BIT_RETURN: BitTag = BitTag(3);

fn gate(kind: GateKind, qubits: Vec<StepQubit>) -> RemoteGateStep {
    RemoteGateStep::LocalGate {
        kind,
        qubits,
        condition: None,
    }
}

fn correction(kind: GateKind, qubit: StepQubit, tag: BitTag) -> RemoteGateStep {
    RemoteGateStep::LocalGate {
        kind,
        qubits: vec![qubit],
        condition: Some(tag),
    }
}

/// Telegate ("cat"): cat-entangle the control onto the target node's comm
/// qubit, run the embedded gates there, then disentangle.
fn expand_cat(ctx: &RemoteGateContext) -> SchemeExpansion {
    let (na, nb) = (ctx.node_a, ctx.node_b);
    let mut steps = vec![
        PlacedStep {
            node: na,
            step: RemoteGateStep::RequestEntanglement { peer: nb, comm: 0 },
        },
        // Entangle the control with the shared pair and collapse our half.
        PlacedStep {
            node: na,
            step: gate(
                GateKind::Cnot,
                vec![StepQubit::Data(ctx.a), StepQubit::Comm(0)],
            ),
        },
        PlacedStep {
            node: na,
            step: RemoteGateStep::LocalMeasure {
                qubit: StepQubit::Comm(0),
                tag: X_BIT,
            },
        },
        PlacedStep {
            node: na,
            step: RemoteGateStep::SendClassicalBit { to: nb, tag: X_BIT },
        },
        PlacedStep {
            node: nb,
            step: RemoteGateStep::AwaitClassicalBit { from: na, tag: X_BIT },
        },
        PlacedStep {
            node: nb,
            step: correction(GateKind::X, StepQubit::Comm(0), X_BIT),
        },
    ];
    // The comm qubit now mirrors the control; run the target-side gates.
    for (kind, qubits) in &ctx.embedded {
        steps.push(PlacedStep {
            node: nb,
            step: gate(*kind, qubits.clone()),
        });
    }
    // Disentangle and feed the phase correction back.
    steps.extend([
        PlacedStep {
            node: nb,
            step: gate(GateKind::H, vec![StepQubit::Comm(0)]),
        },
        PlacedStep {
            node: nb,
            step: RemoteGateStep::LocalMeasure {
                qubit: StepQubit::Comm(0),
                tag: Z_BIT,
            },
        },
        PlacedStep {
            node: nb,
            step: RemoteGateStep::SendClassicalBit { to: na, tag: Z_BIT },
        },
        PlacedStep {
            node: nb,
            step: RemoteGateStep::ReleaseCommQubit { comm: 0 },
        },
        PlacedStep {
            node: na,
            step: RemoteGateStep::AwaitClassicalBit { from: nb, tag: Z_BIT },
        },
        PlacedStep {
            node: na,
            step: correction(GateKind::Z, StepQubit::Data(ctx.a), Z_BIT),
        },
        PlacedStep {
            node: na,
            step: RemoteGateStep::ReleaseCommQubit { comm: 0 },
        },
    ]);
    SchemeExpansion {
        steps,
        relocations: Vec::new(),
        ebits: 1,
    }
}

/// One teleportation hop of `source` (on `from`) into the `comm`-th slot of
/// the protocol on `to`, as seen from the sending side. The receiving side
/// corrections are appended by the caller.
fn bell_measure(
    steps: &mut Vec<PlacedStep>,
    from: NodeId,
    to: NodeId,
    source: StepQubit,
    comm: u8,
    x_tag: BitTag,
    z_tag: BitTag,
) {
    steps.extend([
        PlacedStep {
            node: from,
            step: gate(GateKind::Cnot, vec![source, StepQubit::Comm(comm)]),
        },
        PlacedStep {
            node: from,
            step: gate(GateKind::H, vec![source]),
        },
        PlacedStep {
            node: from,
            step: RemoteGateStep::LocalMeasure {
                qubit: StepQubit::Comm(comm),
                tag: x_tag,
            },
        },
        PlacedStep {
            node: from,
            step: RemoteGateStep::LocalMeasure {
                qubit: source,
                tag: z_tag,
            },
        },
        PlacedStep {
            node: from,
            step: RemoteGateStep::Reset { qubit: source },
        },
        PlacedStep {
            node: from,
            step: RemoteGateStep::SendClassicalBit { to, tag: x_tag },
        },
        PlacedStep {
            node: from,
            step: RemoteGateStep::SendClassicalBit { to, tag: z_tag },
        },
        PlacedStep {
            node: from,
            step: RemoteGateStep::ReleaseCommQubit { comm },
        },
    ]);
}

/// Receiving-side Pauli frame for one teleportation hop.
fn teleport_corrections(
    steps: &mut Vec<PlacedStep>,
    at: NodeId,
    from: NodeId,
    comm: u8,
    x_tag: BitTag,
    z_tag: BitTag,
) {
    steps.extend([
        PlacedStep {
            node: at,
            step: RemoteGateStep::AwaitClassicalBit { from, tag: x_tag },
        },
        PlacedStep {
            node: at,
            step: RemoteGateStep::AwaitClassicalBit { from, tag: z_tag },
        },
        PlacedStep {
            node: at,
            step: correction(GateKind::X, StepQubit::Comm(comm), x_tag),
        },
        PlacedStep {
            node: at,
            step: correction(GateKind::Z, StepQubit::Comm(comm), z_tag),
        },
    ]);
}

/// Round 1 shared by all teledata schemes: teleport the control to the
/// target node and run the target-side gates there.
fn teledata_round_one(ctx: &RemoteGateContext) -> Vec<PlacedStep> {
    let (na, nb) = (ctx.node_a, ctx.node_b);
    let mut steps = vec![PlacedStep {
        node: na,
        step: RemoteGateStep::RequestEntanglement { peer: nb, comm: 0 },
    }];
    bell_measure(
        &mut steps,
        na,
        nb,
        StepQubit::Data(ctx.a),
        0,
        X_BIT,
        Z_BIT,
    );
    teleport_corrections(&mut steps, nb, na, 0, X_BIT, Z_BIT);
    for (kind, qubits) in &ctx.embedded {
        steps.push(PlacedStep {
            node: nb,
            step: gate(*kind, qubits.clone()),
        });
    }
    steps
}

/// Teledata "1tp": one hop, the control stays on the target node in the
/// retained comm slot.
fn expand_one_tp(ctx: &RemoteGateContext) -> SchemeExpansion {
    SchemeExpansion {
        steps: teledata_round_one(ctx),
        relocations: vec![(ctx.qubit_a, ctx.node_b, 0)],
        ebits: 1,
    }
}

/// Teledata "2tp": round 1, then the symmetric return trip of the target
/// qubit to the control node. Both qubits relocate, one per node.
fn expand_two_tp(ctx: &RemoteGateContext) -> SchemeExpansion {
    let (na, nb) = (ctx.node_a, ctx.node_b);
    let mut steps = teledata_round_one(ctx);
    steps.push(PlacedStep {
        node: nb,
        step: RemoteGateStep::RequestEntanglement { peer: na, comm: 1 },
    });
    bell_measure(
        &mut steps,
        nb,
        na,
        StepQubit::Data(ctx.b),
        1,
        X_BIT_RETURN,
        Z_BIT_RETURN,
    );
    teleport_corrections(&mut steps, na, nb, 1, X_BIT_RETURN, Z_BIT_RETURN);
    SchemeExpansion {
        steps,
        relocations: vec![(ctx.qubit_a, nb, 0), (ctx.qubit_b, na, 1)],
        ebits: 2,
    }
}

/// Measurement-safe teledata "tp_safe": round 1, then teleport the
/// transported state back and swap it into the control's original slot.
fn expand_tp_safe(ctx: &RemoteGateContext) -> SchemeExpansion {
    let (na, nb) = (ctx.node_a, ctx.node_b);
    let mut steps = teledata_round_one(ctx);
    steps.push(PlacedStep {
        node: nb,
        step: RemoteGateStep::RequestEntanglement { peer: na, comm: 1 },
    });
    bell_measure(
        &mut steps,
        nb,
        na,
        StepQubit::Comm(0),
        1,
        X_BIT_RETURN,
        Z_BIT_RETURN,
    );
    // bell_measure released comm 1; the transported state's old home is
    // comm 0, measured out and released here.
    steps.push(PlacedStep {
        node: nb,
        step: RemoteGateStep::ReleaseCommQubit { comm: 0 },
    });
    teleport_corrections(&mut steps, na, nb, 1, X_BIT_RETURN, Z_BIT_RETURN);
    steps.extend([
        PlacedStep {
            node: na,
            step: gate(
                GateKind::Swap,
                vec![StepQubit::Comm(1), StepQubit::Data(ctx.a)],
            ),
        },
        PlacedStep {
            node: na,
            step: RemoteGateStep::ReleaseCommQubit { comm: 1 },
        },
    ]);
    SchemeExpansion {
        steps,
        relocations: Vec::new(),
        ebits: 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> RemoteGateContext {
        RemoteGateContext {
            protocol: ProtocolId(0),
            node_a: NodeId(0),
            a: SlotRef::Fixed(1),
            qubit_a: QubitId(0),
            node_b: NodeId(1),
            b: SlotRef::Fixed(1),
            qubit_b: QubitId(1),
            embedded: vec![(
                GateKind::Cnot,
                vec![StepQubit::Comm(0), StepQubit::Data(SlotRef::Fixed(1))],
            )],
        }
    }

    fn release_count(expansion: &SchemeExpansion) -> usize {
        expansion
            .steps
            .iter()
            .filter(|s| matches!(s.step, RemoteGateStep::ReleaseCommQubit { .. }))
            .count()
    }

    fn request_count(expansion: &SchemeExpansion) -> usize {
        expansion
            .steps
            .iter()
            .filter(|s| matches!(s.step, RemoteGateStep::RequestEntanglement { .. }))
            .count()
    }

    fn sends_match_awaits(expansion: &SchemeExpansion) -> bool {
        let sends: Vec<(NodeId, BitTag)> = expansion
            .steps
            .iter()
            .filter_map(|s| match s.step {
                RemoteGateStep::SendClassicalBit { to, tag } => Some((to, tag)),
                _ => None,
            })
            .collect();
        let awaits: Vec<(NodeId, BitTag)> = expansion
            .steps
            .iter()
            .filter_map(|s| match s.step {
                RemoteGateStep::AwaitClassicalBit { tag, .. } => Some((s.node, tag)),
                _ => None,
            })
            .collect();
        sends.len() == awaits.len() && sends.iter().all(|pair| awaits.contains(pair))
    }

    // =========================================================================
    // Tag resolution
    // =========================================================================

    #[test]
    fn test_from_tag() {
        assert_eq!(SchemeKind::from_tag("cat"), Some(SchemeKind::Cat));
        assert_eq!(SchemeKind::from_tag("1tp"), Some(SchemeKind::OneTp));
        assert_eq!(SchemeKind::from_tag("2tp"), Some(SchemeKind::TwoTp));
        assert_eq!(SchemeKind::from_tag("tp_safe"), Some(SchemeKind::TpSafe));
        assert_eq!(SchemeKind::from_tag("tp_risky"), None);
    }

    #[test]
    fn test_tag_round_trip() {
        for kind in [
            SchemeKind::Cat,
            SchemeKind::OneTp,
            SchemeKind::TwoTp,
            SchemeKind::TpSafe,
        ] {
            assert_eq!(SchemeKind::from_tag(kind.tag()), Some(kind));
        }
    }

    // =========================================================================
    // Expansion shapes
    // =========================================================================

    #[test]
    fn test_cat_shape() {
        let e = SchemeKind::Cat.expand(&context());
        assert_eq!(e.ebits, 1);
        assert!(e.relocations.is_empty());
        assert_eq!(request_count(&e), 1);
        assert_eq!(release_count(&e), 2);
        assert!(sends_match_awaits(&e));
        // first step is the initiator's entanglement request
        assert_eq!(e.steps[0].node, NodeId(0));
        assert!(matches!(
            e.steps[0].step,
            RemoteGateStep::RequestEntanglement { peer: NodeId(1), comm: 0 }
        ));
        // both qubits stay put
        assert!(e
            .steps
            .iter()
            .all(|s| !matches!(s.step, RemoteGateStep::Reset { .. })));
    }

    #[test]
    fn test_cat_embedded_between_correction_and_disentangle() {
        let e = SchemeKind::Cat.expand(&context());
        let correction_idx = e
            .steps
            .iter()
            .position(|s| {
                matches!(
                    s.step,
                    RemoteGateStep::LocalGate {
                        kind: GateKind::X,
                        condition: Some(_),
                        ..
                    }
                )
            })
            .unwrap();
        let embedded_idx = e
            .steps
            .iter()
            .position(|s| {
                matches!(
                    &s.step,
                    RemoteGateStep::LocalGate {
                        kind: GateKind::Cnot,
                        condition: None,
                        ..
                    }
                ) && s.node == NodeId(1)
            })
            .unwrap();
        let disentangle_idx = e
            .steps
            .iter()
            .position(|s| {
                matches!(
                    s.step,
                    RemoteGateStep::LocalGate {
                        kind: GateKind::H,
                        ..
                    }
                ) && s.node == NodeId(1)
            })
            .unwrap();
        assert!(correction_idx < embedded_idx);
        assert!(embedded_idx < disentangle_idx);
    }

    #[test]
    fn test_one_tp_relocates_control() {
        let e = SchemeKind::OneTp.expand(&context());
        assert_eq!(e.ebits, 1);
        assert_eq!(e.relocations, vec![(QubitId(0), NodeId(1), 0)]);
        // only the sender releases; the target keeps the transported state
        assert_eq!(release_count(&e), 1);
        assert!(sends_match_awaits(&e));
        // the abandoned source slot is re-initialized
        assert!(e
            .steps
            .iter()
            .any(|s| matches!(s.step, RemoteGateStep::Reset { .. }) && s.node == NodeId(0)));
    }

    #[test]
    fn test_two_tp_symmetric_relocations() {
        let e = SchemeKind::TwoTp.expand(&context());
        assert_eq!(e.ebits, 2);
        assert_eq!(
            e.relocations,
            vec![(QubitId(0), NodeId(1), 0), (QubitId(1), NodeId(0), 1)]
        );
        assert_eq!(request_count(&e), 2);
        // round 2 is initiated by the target node
        let second_request = e
            .steps
            .iter()
            .filter(|s| matches!(s.step, RemoteGateStep::RequestEntanglement { .. }))
            .nth(1)
            .unwrap();
        assert_eq!(second_request.node, NodeId(1));
        assert!(sends_match_awaits(&e));
    }

    #[test]
    fn test_tp_safe_no_relocation_and_swap_back() {
        let e = SchemeKind::TpSafe.expand(&context());
        assert_eq!(e.ebits, 2);
        assert!(e.relocations.is_empty());
        assert_eq!(request_count(&e), 2);
        // every comm slot is eventually released: 1 on A round 1, both of
        // B's, and A's round-2 slot after the swap back
        assert_eq!(release_count(&e), 4);
        assert!(sends_match_awaits(&e));
        // final data movement swaps into the original control slot
        let swap = e
            .steps
            .iter()
            .rev()
            .find(|s| {
                matches!(
                    s.step,
                    RemoteGateStep::LocalGate {
                        kind: GateKind::Swap,
                        ..
                    }
                )
            })
            .unwrap();
        assert_eq!(swap.node, NodeId(0));
        match &swap.step {
            RemoteGateStep::LocalGate { qubits, .. } => {
                assert_eq!(qubits[1], StepQubit::Data(SlotRef::Fixed(1)));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_per_node_step_order_is_causal() {
        // On each node, an await for a tag never precedes a send of a tag
        // that causally depends on it within the same node's substream.
        for kind in [
            SchemeKind::Cat,
            SchemeKind::OneTp,
            SchemeKind::TwoTp,
            SchemeKind::TpSafe,
        ] {
            let e = kind.expand(&context());
            for node in [NodeId(0), NodeId(1)] {
                let mut seen = Vec::new();
                for s in e.steps.iter().filter(|s| s.node == node) {
                    match s.step {
                        RemoteGateStep::LocalMeasure { tag, .. }
                        | RemoteGateStep::AwaitClassicalBit { tag, .. } => seen.push(tag),
                        RemoteGateStep::SendClassicalBit { tag, .. } => {
                            assert!(seen.contains(&tag), "{kind}: send of unrecorded bit");
                        }
                        RemoteGateStep::LocalGate {
                            condition: Some(tag),
                            ..
                        } => {
                            assert!(
                                seen.contains(&tag),
                                "{kind}: correction before its bit is known"
                            );
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    // =========================================================================
    // Resource costs
    // =========================================================================

    #[test]
    fn test_resource_costs_match_table() {
        let cat = SchemeKind::Cat.resource_cost();
        assert_eq!(cat.epr_pairs, 1);
        assert_eq!(cat.classical_messages, 2);

        let tp_safe = SchemeKind::TpSafe.resource_cost();
        assert_eq!(tp_safe.epr_pairs, 2);
        assert_eq!(tp_safe.measurements, 4);

        assert_eq!(
            SchemeKind::TwoTp.resource_cost(),
            SchemeKind::TpSafe.resource_cost()
        );
    }

    // =========================================================================
    // Selector
    // =========================================================================

    #[test]
    fn test_selector_uniform() {
        let sel = SchemeSelector::Uniform(SchemeKind::OneTp);
        assert_eq!(sel.resolve(0), SchemeKind::OneTp);
        assert_eq!(sel.resolve(99), SchemeKind::OneTp);
    }

    #[test]
    fn test_selector_per_operation() {
        let mut overrides = HashMap::new();
        overrides.insert(3, SchemeKind::TpSafe);
        let sel = SchemeSelector::PerOperation {
            overrides,
            default: SchemeKind::Cat,
        };
        assert_eq!(sel.resolve(3), SchemeKind::TpSafe);
        assert_eq!(sel.resolve(4), SchemeKind::Cat);
    }
}
