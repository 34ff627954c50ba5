// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Orchestration controller.
//!
//! One [`Orchestrator`] owns the whole simulation for a single run: the
//! event queue, every node's state machine, the communication-qubit pools,
//! the classical mailboxes, and the backend. Each node cycles
//! `Idle → Executing(op) → Idle` through its stream in order; the suspension
//! states (`Blocked`) are left only by events, never by polling.
//!
//! An operation's effects (backend calls, protocol bookkeeping) apply when
//! its completion event fires, after the operation has occupied its
//! configured duration on the simulated clock.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::comm::{Acquire, CommQubitManager, Waiter};
use super::event::{ClassicalMessage, Event, EventQueue, SimTime};
use super::protocol::{ProtocolInstance, ProtocolState, RequestProgress};
use crate::backend::QuantumBackend;
use crate::config::TimingConfig;
use crate::error::{BackendError, Error, ExecutionError, Result};
use crate::network::{NetworkSpec, NodeId};
use crate::partition::{
    BitTag, NodeOp, PartitionedCircuit, ProtocolId, ProtocolMeta, RemoteGateStep, SlotRef,
    StepQubit,
};

/// Why a node's state machine is suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// Waiting for a communication slot (queued in a pool).
    CommSlot,
    /// Waiting for the entanglement source.
    Entanglement,
    /// Waiting for a classical bit.
    ClassicalBit { protocol: ProtocolId, tag: BitTag },
}

/// Node state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Idle,
    Executing,
    Blocked(BlockReason),
    Done,
}

#[derive(Debug)]
struct NodeController {
    pc: usize,
    state: NodeState,
}

/// One circuit-level measurement outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRecord {
    pub qubit: u32,
    pub node: String,
    pub slot: usize,
    pub time: SimTime,
    pub outcome: bool,
}

/// Communication-pool statistics for one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommStats {
    pub node: String,
    pub capacity: usize,
    pub max_in_use: usize,
    pub total_waits: u64,
}

/// A diagnostic surfaced to the operator (not an error).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: &'static str,
    pub node: String,
    pub protocol: u32,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Simulated duration of the whole run, in ticks.
    pub duration: SimTime,
    /// Ebits generated by the entanglement source.
    pub ebits_generated: u64,
    /// Circuit-level measurement outcomes, in completion order.
    pub measurements: Vec<MeasurementRecord>,
    /// Per-node communication-pool statistics.
    pub comm: Vec<CommStats>,
    /// Deadlock-risk observations.
    pub diagnostics: Vec<Diagnostic>,
}

/// Drives per-node operation streams to completion over a discrete-event
/// clock. Single use: one orchestrator per run.
pub struct Orchestrator<B: QuantumBackend> {
    network: NetworkSpec,
    timing: TimingConfig,
    backend: B,
    queue: EventQueue,
    nodes: Vec<NodeController>,
    comm: CommQubitManager,
    mailboxes: Vec<HashMap<(ProtocolId, BitTag), bool>>,
    instances: HashMap<ProtocolId, ProtocolInstance>,
    bindings: HashMap<(NodeId, ProtocolId, u8), usize>,
    streams: Vec<Vec<NodeOp>>,
    metas: Vec<ProtocolMeta>,
    measurements: Vec<MeasurementRecord>,
    ebits: u64,
    halted: bool,
    failure: Option<Error>,
    used: bool,
}

impl<B: QuantumBackend> Orchestrator<B> {
    /// Create an orchestrator for one run.
    pub fn new(network: NetworkSpec, timing: TimingConfig, backend: B) -> Self {
        let node_count = network.len();
        Self {
            comm: CommQubitManager::new(&network),
            network,
            timing,
            backend,
            queue: EventQueue::new(),
            nodes: (0..node_count)
                .map(|_| NodeController {
                    pc: 0,
                    state: NodeState::Idle,
                })
                .collect(),
            mailboxes: vec![HashMap::new(); node_count],
            instances: HashMap::new(),
            bindings: HashMap::new(),
            streams: Vec::new(),
            metas: Vec::new(),
            measurements: Vec::new(),
            ebits: 0,
            halted: false,
            failure: None,
            used: false,
        }
    }

    /// The backend, for post-run inspection.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Deadlock-risk observations recorded so far (also included in the
    /// report on success).
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.comm
            .risks()
            .iter()
            .map(|r| Diagnostic {
                kind: "deadlock_risk",
                node: self.network.name(r.node).to_string(),
                protocol: r.protocol.0,
            })
            .collect()
    }

    /// Execute the partitioned circuit to completion.
    ///
    /// Returns the run report once every node's stream is exhausted and
    /// every protocol instance completed.
    ///
    /// # Errors
    ///
    /// - `ExecutionError::ProtocolAborted` when a protocol reaches a
    ///   terminal failure (further dequeuing halts; in-flight instances
    ///   drain)
    /// - `ExecutionError::Stalled` when the event queue drains with nodes
    ///   still blocked
    /// - `Error::Backend` for a backend failure outside any protocol
    pub fn run(&mut self, partitioned: &PartitionedCircuit) -> Result<RunReport> {
        if self.used {
            return Err(
                ExecutionError::ProtocolViolation("orchestrator already ran".into()).into(),
            );
        }
        self.used = true;

        for id in self.network.node_ids() {
            self.backend
                .register_node(id, self.network.node(id).total_slots())?;
        }
        self.streams = partitioned.streams().to_vec();
        self.metas = partitioned.protocols().to_vec();

        info!(
            nodes = self.network.len(),
            protocols = self.metas.len(),
            "run started"
        );

        let node_ids: Vec<_> = self.network.node_ids().collect();
        for id in node_ids {
            self.advance(id)?;
        }
        while let Some(event) = self.queue.pop() {
            self.dispatch(event)?;
        }

        if let Some(err) = self.failure.take() {
            return Err(err);
        }

        let blocked: Vec<String> = self
            .network
            .node_ids()
            .filter(|&id| self.nodes[id.0 as usize].state != NodeState::Done)
            .map(|id| self.network.name(id).to_string())
            .collect();
        if !blocked.is_empty() {
            warn!(nodes = ?blocked, "run stalled");
            return Err(ExecutionError::Stalled { nodes: blocked }.into());
        }

        let report = RunReport {
            duration: self.queue.now(),
            ebits_generated: self.ebits,
            measurements: self.measurements.clone(),
            comm: self
                .network
                .node_ids()
                .map(|id| CommStats {
                    node: self.network.name(id).to_string(),
                    capacity: self.comm.capacity(id),
                    max_in_use: self.comm.max_in_use(id),
                    total_waits: self.comm.total_waits(id),
                })
                .collect(),
            diagnostics: self.diagnostics(),
        };
        info!(
            duration = report.duration,
            ebits = report.ebits_generated,
            "run completed"
        );
        Ok(report)
    }

    // =========================================================================
    // Node advancement
    // =========================================================================

    /// Try to start the next operation on an idle node.
    fn advance(&mut self, node: NodeId) -> Result<()> {
        let i = node.0 as usize;
        if self.nodes[i].state != NodeState::Idle {
            return Ok(());
        }
        if self.nodes[i].pc >= self.streams[i].len() {
            self.nodes[i].state = NodeState::Done;
            debug!(node = %self.network.name(node), "stream exhausted");
            return Ok(());
        }
        let op = self.streams[i][self.nodes[i].pc].clone();
        if self.halted && !self.op_in_flight(&op) {
            // Aborted run: only already-in-flight protocols may drain.
            return Ok(());
        }
        self.begin_op(node, op)
    }

    fn op_in_flight(&self, op: &NodeOp) -> bool {
        match op {
            NodeOp::Remote { protocol, .. } => self
                .instances
                .get(protocol)
                .map(|inst| inst.state == ProtocolState::InFlight)
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Start one operation: either schedule its completion or suspend.
    fn begin_op(&mut self, node: NodeId, op: NodeOp) -> Result<()> {
        let i = node.0 as usize;
        match &op {
            NodeOp::Init { .. } | NodeOp::Gate { .. } | NodeOp::Measure { .. } => {
                self.nodes[i].state = NodeState::Executing;
                let duration = self.op_duration(&op);
                self.queue.schedule(duration, Event::OpFinished { node });
            }
            NodeOp::Remote { protocol, step } => {
                let protocol = *protocol;
                self.mark_in_flight(protocol);
                match step {
                    RemoteGateStep::RequestEntanglement { peer, comm } => {
                        let request = RequestProgress {
                            initiator: node,
                            peer: *peer,
                            comm: *comm,
                            remaining: [node, *peer].into(),
                        };
                        self.instance_mut(protocol)?.request = Some(request);
                        self.continue_acquisitions(protocol)?;
                    }
                    RemoteGateStep::AwaitClassicalBit { from, tag } => {
                        let key = (protocol, *tag);
                        if let Some(bit) = self.mailboxes[i].remove(&key) {
                            self.instance_mut(protocol)?.record_bit(*tag, bit);
                            self.nodes[i].state = NodeState::Executing;
                            self.queue.schedule(0, Event::OpFinished { node });
                        } else {
                            debug!(
                                node = %self.network.name(node),
                                %protocol,
                                tag = tag.0,
                                from = %self.network.name(*from),
                                "waiting for classical bit"
                            );
                            self.nodes[i].state = NodeState::Blocked(BlockReason::ClassicalBit {
                                protocol,
                                tag: *tag,
                            });
                        }
                    }
                    _ => {
                        self.nodes[i].state = NodeState::Executing;
                        let duration = self.op_duration(&op);
                        self.queue.schedule(duration, Event::OpFinished { node });
                    }
                }
            }
        }
        Ok(())
    }

    fn op_duration(&self, op: &NodeOp) -> u64 {
        let gate_ticks = |arity: usize| {
            if arity == 2 {
                self.timing.two_qubit_gate
            } else {
                self.timing.single_qubit_gate
            }
        };
        match op {
            NodeOp::Init { .. } => self.timing.single_qubit_gate,
            NodeOp::Gate { kind, .. } => gate_ticks(kind.arity()),
            NodeOp::Measure { .. } => self.timing.measurement,
            NodeOp::Remote { step, .. } => match step {
                RemoteGateStep::LocalGate { kind, .. } => gate_ticks(kind.arity()),
                RemoteGateStep::LocalMeasure { .. } => self.timing.measurement,
                RemoteGateStep::Reset { .. } => self.timing.single_qubit_gate,
                RemoteGateStep::SendClassicalBit { .. }
                | RemoteGateStep::AwaitClassicalBit { .. }
                | RemoteGateStep::ReleaseCommQubit { .. }
                | RemoteGateStep::RequestEntanglement { .. } => 0,
            },
        }
    }

    // =========================================================================
    // Event dispatch
    // =========================================================================

    fn dispatch(&mut self, event: Event) -> Result<()> {
        match event {
            Event::OpFinished { node } => self.finish_op(node),
            Event::EntanglementReady { protocol } => self.entanglement_ready(protocol),
            Event::MessageArrival { to, message } => self.message_arrival(to, message),
            Event::CommGranted {
                protocol,
                pool,
                slot,
            } => self.comm_granted(protocol, pool, slot),
        }
    }

    fn entanglement_ready(&mut self, protocol: ProtocolId) -> Result<()> {
        let request = match self.instance_mut(protocol)?.request.take() {
            Some(r) => r,
            None => {
                // Aborted while the source was running; nothing to deliver.
                return Ok(());
            }
        };
        let a_slot = self.binding(request.initiator, protocol, request.comm)?;
        let b_slot = self.binding(request.peer, protocol, request.comm)?;
        match self
            .backend
            .create_entanglement((request.initiator, a_slot), (request.peer, b_slot))
        {
            Ok(()) => {
                self.ebits += 1;
                debug!(
                    %protocol,
                    a = %self.network.name(request.initiator),
                    b = %self.network.name(request.peer),
                    "ebit delivered"
                );
                self.finish_step(request.initiator, protocol)
            }
            Err(e) => {
                self.abort_protocol(protocol, request.initiator, e);
                Ok(())
            }
        }
    }

    fn message_arrival(&mut self, to: NodeId, message: ClassicalMessage) -> Result<()> {
        let i = to.0 as usize;
        let key = (message.protocol, message.tag);
        self.mailboxes[i].insert(key, message.bit);
        if self.nodes[i].state
            == NodeState::Blocked(BlockReason::ClassicalBit {
                protocol: message.protocol,
                tag: message.tag,
            })
        {
            self.mailboxes[i].remove(&key);
            self.instance_mut(message.protocol)?
                .record_bit(message.tag, message.bit);
            self.nodes[i].state = NodeState::Executing;
            self.queue.schedule(0, Event::OpFinished { node: to });
        }
        Ok(())
    }

    fn comm_granted(&mut self, protocol: ProtocolId, pool: NodeId, slot: usize) -> Result<()> {
        let (comm, aborted) = {
            let inst = self.instance_mut(protocol)?;
            match (&inst.request, inst.state) {
                (_, ProtocolState::Aborted) => (0, true),
                (Some(req), _) => (req.comm, false),
                (None, _) => {
                    return Err(ExecutionError::ProtocolViolation(format!(
                        "comm slot granted to {protocol} with no request in progress"
                    ))
                    .into())
                }
            }
        };
        if aborted {
            // The protocol died while queued; pass the slot along.
            self.process_release(pool, slot);
            return Ok(());
        }
        self.bindings.insert((pool, protocol, comm), slot);
        self.instance_mut(protocol)?.add_hold(pool, comm, slot);
        self.continue_acquisitions(protocol)
    }

    /// Work through the in-flight request's outstanding acquisitions; when
    /// all slots are bound, start the entanglement source.
    fn continue_acquisitions(&mut self, protocol: ProtocolId) -> Result<()> {
        loop {
            let (initiator, comm, next) = {
                let inst = self.instance_mut(protocol)?;
                let req = inst.request.as_mut().ok_or_else(|| {
                    ExecutionError::ProtocolViolation(format!(
                        "{protocol} has no entanglement request in progress"
                    ))
                })?;
                (req.initiator, req.comm, req.remaining.pop_front())
            };
            let target = match next {
                None => {
                    self.nodes[initiator.0 as usize].state =
                        NodeState::Blocked(BlockReason::Entanglement);
                    self.queue.schedule(
                        self.timing.entanglement_generation,
                        Event::EntanglementReady { protocol },
                    );
                    return Ok(());
                }
                Some(t) => t,
            };
            match self.comm.acquire(
                target,
                Waiter {
                    protocol,
                    initiator,
                    comm,
                },
            ) {
                Acquire::Granted(slot) => {
                    self.bindings.insert((target, protocol, comm), slot);
                    self.instance_mut(protocol)?.add_hold(target, comm, slot);
                }
                Acquire::Queued => {
                    self.nodes[initiator.0 as usize].state =
                        NodeState::Blocked(BlockReason::CommSlot);
                    return Ok(());
                }
            }
        }
    }

    // =========================================================================
    // Operation completion
    // =========================================================================

    /// Apply the current operation's effects and move on.
    fn finish_op(&mut self, node: NodeId) -> Result<()> {
        let i = node.0 as usize;
        let op = self.streams[i][self.nodes[i].pc].clone();
        match op {
            NodeOp::Init { slots } => {
                for slot_ref in &slots {
                    let slot = self.resolve_slot(node, slot_ref)?;
                    self.backend.reset(node, slot)?;
                }
            }
            NodeOp::Gate { kind, slots } => {
                let resolved = slots
                    .iter()
                    .map(|s| self.resolve_slot(node, s))
                    .collect::<Result<Vec<_>>>()?;
                self.backend.apply_gate(node, kind, &resolved)?;
            }
            NodeOp::Measure { qubit, slot } => {
                let resolved = self.resolve_slot(node, &slot)?;
                let outcome = self.backend.measure(node, resolved)?;
                debug!(
                    node = %self.network.name(node),
                    %qubit,
                    slot = resolved,
                    outcome,
                    "measured"
                );
                self.measurements.push(MeasurementRecord {
                    qubit: qubit.0,
                    node: self.network.name(node).to_string(),
                    slot: resolved,
                    time: self.queue.now(),
                    outcome,
                });
            }
            NodeOp::Remote { protocol, step } => {
                let proceeded = self.finish_remote_step(node, protocol, &step)?;
                if !proceeded {
                    // The step aborted its protocol; the node parks.
                    return Ok(());
                }
                return self.finish_step(node, protocol);
            }
        }
        self.nodes[i].pc += 1;
        self.nodes[i].state = NodeState::Idle;
        self.advance(node)
    }

    /// Advance past a completed protocol step, updating instance state.
    fn finish_step(&mut self, node: NodeId, protocol: ProtocolId) -> Result<()> {
        let i = node.0 as usize;
        let completed = {
            let inst = self.instance_mut(protocol)?;
            inst.step_finished(node) && inst.state == ProtocolState::InFlight
        };
        if completed {
            self.complete_protocol(protocol)?;
        }
        self.nodes[i].pc += 1;
        self.nodes[i].state = NodeState::Idle;
        self.advance(node)
    }

    /// Apply one protocol step's effect. Returns false when the step
    /// aborted its protocol (backend failure).
    fn finish_remote_step(
        &mut self,
        node: NodeId,
        protocol: ProtocolId,
        step: &RemoteGateStep,
    ) -> Result<bool> {
        match step {
            RemoteGateStep::RequestEntanglement { .. } => {
                // The ebit was delivered by the EntanglementReady event.
            }
            RemoteGateStep::LocalGate {
                kind,
                qubits,
                condition,
            } => {
                if let Some(tag) = condition {
                    if !self.instance_bit(protocol, *tag)? {
                        return Ok(true);
                    }
                }
                let resolved = qubits
                    .iter()
                    .map(|q| self.resolve_step_qubit(node, protocol, q))
                    .collect::<Result<Vec<_>>>()?;
                if let Err(e) = self.backend.apply_gate(node, *kind, &resolved) {
                    self.abort_protocol(protocol, node, e);
                    return Ok(false);
                }
            }
            RemoteGateStep::LocalMeasure { qubit, tag } => {
                let resolved = self.resolve_step_qubit(node, protocol, qubit)?;
                match self.backend.measure(node, resolved) {
                    Ok(bit) => self.instance_mut(protocol)?.record_bit(*tag, bit),
                    Err(e) => {
                        self.abort_protocol(protocol, node, e);
                        return Ok(false);
                    }
                }
            }
            RemoteGateStep::SendClassicalBit { to, tag } => {
                let bit = self.instance_bit(protocol, *tag)?;
                self.queue.schedule(
                    self.timing.classical_latency,
                    Event::MessageArrival {
                        to: *to,
                        message: ClassicalMessage {
                            from: node,
                            protocol,
                            tag: *tag,
                            bit,
                        },
                    },
                );
            }
            RemoteGateStep::AwaitClassicalBit { .. } => {
                // The bit was recorded when it was consumed.
            }
            RemoteGateStep::Reset { qubit } => {
                let resolved = self.resolve_step_qubit(node, protocol, qubit)?;
                if let Err(e) = self.backend.reset(node, resolved) {
                    self.abort_protocol(protocol, node, e);
                    return Ok(false);
                }
            }
            RemoteGateStep::ReleaseCommQubit { comm } => {
                let slot = self
                    .instance_mut(protocol)?
                    .take_hold(node, *comm)
                    .ok_or_else(|| {
                        ExecutionError::ProtocolViolation(format!(
                            "{protocol} releases comm slot {comm} on {node} without holding it"
                        ))
                    })?;
                self.bindings.remove(&(node, protocol, *comm));
                if let Err(e) = self.backend.reset(node, slot) {
                    self.abort_protocol(protocol, node, e);
                    return Ok(false);
                }
                self.process_release(node, slot);
            }
        }
        Ok(true)
    }

    // =========================================================================
    // Protocol lifecycle
    // =========================================================================

    fn mark_in_flight(&mut self, protocol: ProtocolId) {
        let meta = &self.metas[protocol.0 as usize];
        let inst = self
            .instances
            .entry(protocol)
            .or_insert_with(|| ProtocolInstance::new(meta));
        if inst.state == ProtocolState::Pending {
            inst.state = ProtocolState::InFlight;
            debug!(%protocol, scheme = %inst.scheme, "protocol in flight");
        }
    }

    fn complete_protocol(&mut self, protocol: ProtocolId) -> Result<()> {
        let retained = {
            let inst = self.instance_mut(protocol)?;
            inst.state = ProtocolState::Completed;
            inst.drain_holds()
        };
        // Slots still held at completion are a relocated qubit's new home:
        // they leave the transient pool for the rest of the run.
        for (node, _comm, slot) in retained {
            self.comm.pin(node, slot);
        }
        info!(%protocol, "protocol completed");
        Ok(())
    }

    fn abort_protocol(&mut self, protocol: ProtocolId, node: NodeId, reason: BackendError) {
        warn!(%protocol, node = %self.network.name(node), %reason, "protocol aborted");
        let (op_index, holds) = match self.instances.get_mut(&protocol) {
            Some(inst) => {
                inst.state = ProtocolState::Aborted;
                inst.request = None;
                (inst.op_index, inst.drain_holds())
            }
            None => (0, Vec::new()),
        };
        for (n, comm, slot) in holds {
            self.bindings.remove(&(n, protocol, comm));
            self.process_release(n, slot);
        }
        self.halted = true;
        if self.failure.is_none() {
            self.failure = Some(
                ExecutionError::ProtocolAborted {
                    protocol: protocol.0,
                    op_index,
                    node,
                    reason,
                }
                .into(),
            );
        }
    }

    fn process_release(&mut self, pool: NodeId, slot: usize) {
        if let Some((waiter, granted)) = self.comm.release(pool, slot) {
            self.queue.schedule(
                0,
                Event::CommGranted {
                    protocol: waiter.protocol,
                    pool,
                    slot: granted,
                },
            );
        }
    }

    // =========================================================================
    // Resolution helpers
    // =========================================================================

    fn instance_mut(&mut self, protocol: ProtocolId) -> Result<&mut ProtocolInstance> {
        self.instances.get_mut(&protocol).ok_or_else(|| {
            ExecutionError::ProtocolViolation(format!("unknown protocol {protocol}")).into()
        })
    }

    fn instance_bit(&self, protocol: ProtocolId, tag: BitTag) -> Result<bool> {
        self.instances
            .get(&protocol)
            .and_then(|inst| inst.bit(tag))
            .ok_or_else(|| {
                ExecutionError::ProtocolViolation(format!(
                    "classical bit {} of {protocol} used before it was recorded",
                    tag.0
                ))
                .into()
            })
    }

    fn binding(&self, node: NodeId, protocol: ProtocolId, comm: u8) -> Result<usize> {
        self.bindings
            .get(&(node, protocol, comm))
            .copied()
            .ok_or_else(|| {
                ExecutionError::ProtocolViolation(format!(
                    "no comm slot bound for {protocol} ordinal {comm} on {node}"
                ))
                .into()
            })
    }

    fn resolve_slot(&self, node: NodeId, slot: &SlotRef) -> Result<usize> {
        match slot {
            SlotRef::Fixed(position) => Ok(*position),
            SlotRef::Bound(protocol, comm) => self.binding(node, *protocol, *comm),
        }
    }

    fn resolve_step_qubit(
        &self,
        node: NodeId,
        protocol: ProtocolId,
        qubit: &StepQubit,
    ) -> Result<usize> {
        match qubit {
            StepQubit::Data(slot) => self.resolve_slot(node, slot),
            StepQubit::Comm(comm) => self.binding(node, protocol, *comm),
        }
    }
}

/// Convenience: allocate FCFS, partition, and run a circuit on a backend.
pub fn run_circuit<B: QuantumBackend>(
    circuit: &crate::circuit::Circuit,
    network: &NetworkSpec,
    timing: &TimingConfig,
    selector: &crate::partition::SchemeSelector,
    backend: B,
) -> Result<(RunReport, Orchestrator<B>)> {
    let allocation =
        crate::partition::allocate_circuit(circuit, network, &crate::partition::FirstComeFirstServed)?;
    let partitioned = crate::partition::partition(circuit, &allocation, selector, network)?;
    let mut orchestrator = Orchestrator::new(network.clone(), timing.clone(), backend);
    let report = orchestrator.run(&partitioned)?;
    Ok((report, orchestrator))
}
