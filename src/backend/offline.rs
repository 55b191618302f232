use std::collections::HashMap;

use crate::backend::{AudioBackend, BackendError, NodeId, NodeKind, Param, Waveform};

/*
Offline Automation Timelines
============================

This backend implements the full AudioBackend capability without touching an
audio device. Instead of rendering samples it records every scheduled event
per (node, parameter) and can evaluate the resulting trajectory at any point
in time. The clock only moves when `advance` is called, which makes every
scheduling decision of the engine observable and exactly reproducible.

Evaluation rules, per parameter timeline:

  SetValue(v, t)            step: the value is v from t onward.

  LinearRamp(v, t)          straight line from the previous event's value
                            (the "anchor") to v, arriving exactly at t.

  SetTarget(v*, t0, tau)    exponential relaxation from the anchor value
                            toward v*, starting at t0:

                                value(t) = v* + (v0 - v*) * e^(-(t - t0)/tau)

                            The curve approaches v* asymptotically and never
                            reaches it in finite time. A SetTarget stays in
                            effect until the next event supersedes it.

Cancellation holds the value current at the cancel point: pending events at
or after the cancel time are dropped and a step pinning the live value is
recorded in their place. A half-elapsed ramp therefore never snaps back to
its origin, which is what makes retriggered envelopes continuous.

Events are kept sorted by time; equal times preserve insertion order, so a
ramp ending at t and a relaxation starting at t compose the way the engine
issued them.
*/

/// A single recorded automation event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationEvent {
    SetValue { value: f32, time: f64 },
    LinearRamp { value: f32, time: f64 },
    SetTarget { target: f32, start: f64, time_constant: f64 },
}

impl AutomationEvent {
    /// The time at which the event becomes effective.
    pub fn time(&self) -> f64 {
        match self {
            AutomationEvent::SetValue { time, .. } => *time,
            AutomationEvent::LinearRamp { time, .. } => *time,
            AutomationEvent::SetTarget { start, .. } => *start,
        }
    }
}

/// Recorded trajectory of one parameter.
#[derive(Debug, Clone)]
pub struct Timeline {
    initial: f32,
    events: Vec<AutomationEvent>,
}

impl Timeline {
    fn new(initial: f32) -> Self {
        Self {
            initial,
            events: Vec::new(),
        }
    }

    fn push(&mut self, event: AutomationEvent) {
        let at = self
            .events
            .partition_point(|existing| existing.time() <= event.time());
        self.events.insert(at, event);
    }

    /// Drop pending events at or after `from`, holding the value that was
    /// current at the cancel point.
    fn cancel_from(&mut self, from: f64) {
        if self.events.iter().all(|e| e.time() < from) {
            return;
        }
        let held = self.value_at(from);
        self.events.retain(|e| e.time() < from);
        self.push(AutomationEvent::SetValue {
            value: held,
            time: from,
        });
    }

    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    /// Evaluate the trajectory at time `t`.
    pub fn value_at(&self, t: f64) -> f32 {
        let mut anchor_value = self.initial;
        let mut anchor_time = 0.0_f64;

        let mut i = 0;
        while i < self.events.len() {
            match self.events[i] {
                AutomationEvent::SetValue { value, time } => {
                    if time > t {
                        break;
                    }
                    anchor_value = value;
                    anchor_time = time;
                }
                AutomationEvent::LinearRamp { value, time } => {
                    if time <= t {
                        anchor_value = value;
                        anchor_time = time;
                    } else {
                        let span = time - anchor_time;
                        if span <= 0.0 {
                            return value;
                        }
                        let progress = ((t - anchor_time) / span).clamp(0.0, 1.0);
                        return anchor_value + (value - anchor_value) * progress as f32;
                    }
                }
                AutomationEvent::SetTarget {
                    target,
                    start,
                    time_constant,
                } => {
                    if start > t {
                        break;
                    }
                    // In effect until the next event takes over.
                    match self.events.get(i + 1) {
                        Some(next) if next.time() <= t => {
                            anchor_value = relax(anchor_value, target, start, time_constant,
                                next.time());
                            anchor_time = next.time();
                        }
                        _ => return relax(anchor_value, target, start, time_constant, t),
                    }
                }
            }
            i += 1;
        }

        anchor_value
    }
}

/// Exponential approach toward `target` with the given time constant.
fn relax(from: f32, target: f32, start: f64, time_constant: f64, t: f64) -> f32 {
    if time_constant <= 0.0 {
        return target;
    }
    let elapsed = (t - start).max(0.0);
    target + (from - target) * (-elapsed / time_constant).exp() as f32
}

#[derive(Debug)]
struct NodeState {
    kind: NodeKind,
    waveform: Option<Waveform>,
    lowpass: bool,
    started: bool,
    impulse_response: Option<String>,
}

/// Reference [`AudioBackend`] that records automation instead of rendering.
///
/// The clock starts at zero and only moves through [`advance`](Self::advance).
#[derive(Debug, Default)]
pub struct OfflineBackend {
    now: f64,
    nodes: Vec<NodeState>,
    connections: Vec<(NodeId, NodeId)>,
    destination_feeds: Vec<NodeId>,
    timelines: HashMap<(NodeId, Param), Timeline>,
}

impl OfflineBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward. Scheduled automation "renders" implicitly;
    /// there is nothing to flush.
    pub fn advance(&mut self, seconds: f64) {
        debug_assert!(seconds >= 0.0);
        self.now += seconds;
    }

    /// Trajectory recorded for one parameter, if any event or read ever
    /// touched it.
    pub fn timeline(&self, node: NodeId, param: Param) -> Option<&Timeline> {
        self.timelines.get(&(node, param))
    }

    /// Evaluate a parameter at an arbitrary time, not just "now".
    pub fn value_at(&self, node: NodeId, param: Param, t: f64) -> f32 {
        match self.timelines.get(&(node, param)) {
            Some(timeline) => timeline.value_at(t),
            None => self.default_value(node, param),
        }
    }

    pub fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.get(node.0).map(|n| n.kind)
    }

    pub fn waveform_of(&self, node: NodeId) -> Option<Waveform> {
        self.nodes.get(node.0).and_then(|n| n.waveform)
    }

    pub fn is_lowpass(&self, node: NodeId) -> bool {
        self.nodes.get(node.0).is_some_and(|n| n.lowpass)
    }

    pub fn is_started(&self, node: NodeId) -> bool {
        self.nodes.get(node.0).is_some_and(|n| n.started)
    }

    pub fn impulse_response_of(&self, node: NodeId) -> Option<&str> {
        self.nodes
            .get(node.0)
            .and_then(|n| n.impulse_response.as_deref())
    }

    pub fn is_connected(&self, source: NodeId, dest: NodeId) -> bool {
        self.connections.contains(&(source, dest))
    }

    pub fn feeds_destination(&self, source: NodeId) -> bool {
        self.destination_feeds.contains(&source)
    }

    fn check(&self, node: NodeId) -> Result<&NodeState, BackendError> {
        self.nodes.get(node.0).ok_or(BackendError::UnknownNode(node))
    }

    /// Node defaults when no automation has touched a parameter yet.
    fn default_value(&self, node: NodeId, param: Param) -> f32 {
        let kind = match self.nodes.get(node.0) {
            Some(state) => state.kind,
            None => return 0.0,
        };
        match (kind, param) {
            (NodeKind::Oscillator, Param::Frequency) => 440.0,
            (NodeKind::Filter, Param::Frequency) => 350.0,
            (NodeKind::Filter, Param::Q) => 0.0,
            (NodeKind::Gain, Param::Gain) => 1.0,
            _ => 0.0,
        }
    }

    fn timeline_mut(&mut self, node: NodeId, param: Param) -> &mut Timeline {
        let initial = self.default_value(node, param);
        self.timelines
            .entry((node, param))
            .or_insert_with(|| Timeline::new(initial))
    }
}

impl AudioBackend for OfflineBackend {
    fn current_time(&self) -> f64 {
        self.now
    }

    fn create_node(&mut self, kind: NodeKind) -> Result<NodeId, BackendError> {
        self.nodes.push(NodeState {
            kind,
            waveform: None,
            lowpass: false,
            started: false,
            impulse_response: None,
        });
        Ok(NodeId(self.nodes.len() - 1))
    }

    fn connect(&mut self, source: NodeId, dest: NodeId) -> Result<(), BackendError> {
        self.check(source)?;
        self.check(dest)?;
        self.connections.push((source, dest));
        Ok(())
    }

    fn connect_to_destination(&mut self, source: NodeId) -> Result<(), BackendError> {
        self.check(source)?;
        self.destination_feeds.push(source);
        Ok(())
    }

    fn start_oscillator(&mut self, node: NodeId) -> Result<(), BackendError> {
        let kind = self.check(node)?.kind;
        if kind != NodeKind::Oscillator {
            return Err(BackendError::UnsupportedOperation {
                kind,
                operation: "start_oscillator",
            });
        }
        self.nodes[node.0].started = true;
        Ok(())
    }

    fn set_lowpass(&mut self, node: NodeId) -> Result<(), BackendError> {
        let kind = self.check(node)?.kind;
        if kind != NodeKind::Filter {
            return Err(BackendError::UnsupportedOperation {
                kind,
                operation: "set_lowpass",
            });
        }
        self.nodes[node.0].lowpass = true;
        Ok(())
    }

    fn request_impulse_response(
        &mut self,
        node: NodeId,
        asset: &str,
    ) -> Result<(), BackendError> {
        let kind = self.check(node)?.kind;
        if kind != NodeKind::Convolver {
            return Err(BackendError::UnsupportedOperation {
                kind,
                operation: "request_impulse_response",
            });
        }
        // The load is modeled as pending forever: the wet path stays silent,
        // matching a fetch that never resolves.
        self.nodes[node.0].impulse_response = Some(asset.to_owned());
        Ok(())
    }

    fn set_waveform(&mut self, node: NodeId, waveform: Waveform) {
        if let Some(state) = self.nodes.get_mut(node.0) {
            state.waveform = Some(waveform);
        }
    }

    fn value_of(&self, node: NodeId, param: Param) -> f32 {
        self.value_at(node, param, self.now)
    }

    fn set_value_at(&mut self, node: NodeId, param: Param, value: f32, time: f64) {
        self.timeline_mut(node, param)
            .push(AutomationEvent::SetValue { value, time });
    }

    fn linear_ramp_to(&mut self, node: NodeId, param: Param, value: f32, time: f64) {
        self.timeline_mut(node, param)
            .push(AutomationEvent::LinearRamp { value, time });
    }

    fn set_target_at(
        &mut self,
        node: NodeId,
        param: Param,
        target: f32,
        start_time: f64,
        time_constant: f64,
    ) {
        self.timeline_mut(node, param).push(AutomationEvent::SetTarget {
            target,
            start: start_time,
            time_constant,
        });
    }

    fn cancel_scheduled(&mut self, node: NodeId, param: Param, from_time: f64) {
        self.timeline_mut(node, param).cancel_from(from_time);
    }
}
