//! Boundary between the control engine and the host audio system.
//!
//! The engine never generates or processes samples itself. It builds a node
//! graph and issues declarative, timestamped automation instructions against
//! the backend's own clock; the backend renders on its real-time thread.
//! Everything the engine needs from a host is captured by [`AudioBackend`],
//! so the same orchestration logic drives a production audio stack or the
//! in-repo [`offline::OfflineBackend`] used by tests and tooling.

/// Offline automation-timeline backend for tests and diagnostics.
pub mod offline;

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque handle to a node owned by the backend.
///
/// Handles are only meaningful to the backend that issued them. The engine
/// owns its handles for its whole lifetime; nodes are never shared across
/// engine instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// The node roles the engine knows how to wire together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Periodic tone source. Runs continuously once started.
    Oscillator,
    /// Low-pass filter stage with automatable cutoff and Q.
    Filter,
    /// Convolution reverb fed by an impulse-response asset.
    Convolver,
    /// Scalar gain with an automatable coefficient.
    Gain,
    /// Dynamics compressor guarding the output. No automated params.
    Compressor,
}

/// Automatable parameter of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    /// Oscillator pitch or filter cutoff, in Hz.
    Frequency,
    /// Filter resonance (quality factor).
    Q,
    /// Gain coefficient.
    Gain,
}

/// Oscillator waveshape. Applied immediately, never enveloped.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// Failures surfaced during graph construction.
///
/// Automation calls are fire-and-forget and have no error path; only the
/// one-time construction of the signal graph can fail, and when it does the
/// engine propagates the failure as a hard initialization error.
#[derive(Debug)]
pub enum BackendError {
    /// The host has no usable audio capability at all.
    AudioUnavailable,
    /// A handle was used against a backend that never issued it.
    UnknownNode(NodeId),
    /// The requested wiring or setting does not apply to this node kind.
    UnsupportedOperation {
        kind: NodeKind,
        operation: &'static str,
    },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::AudioUnavailable => write!(f, "no audio backend available"),
            BackendError::UnknownNode(id) => write!(f, "unknown node handle {id:?}"),
            BackendError::UnsupportedOperation { kind, operation } => {
                write!(f, "{kind:?} node does not support {operation}")
            }
        }
    }
}

impl std::error::Error for BackendError {}

/// Capability the engine orchestrates: node creation, wiring, and per-param
/// automation against a monotonically increasing clock.
///
/// Automation semantics follow the classic audio-param model:
///
/// - [`set_value_at`](AudioBackend::set_value_at) — step to a value at a time.
/// - [`linear_ramp_to`](AudioBackend::linear_ramp_to) — ramp linearly from the
///   previous event's value to the given value, arriving at the given time.
/// - [`set_target_at`](AudioBackend::set_target_at) — from the start time,
///   relax exponentially toward the target with the given time constant. The
///   curve approaches but never reaches the target; callers that need exact
///   convergence must follow up with a step.
/// - [`cancel_scheduled`](AudioBackend::cancel_scheduled) — drop pending
///   events at or after a time. Already-rendered history is never touched,
///   and the parameter holds its value as of the cancel point.
///
/// Events against a single parameter are totally ordered by scheduling order.
pub trait AudioBackend: Send {
    /// Current value of the backend's render clock, in seconds. Sampled
    /// fresh at every trigger; never moves backwards.
    fn current_time(&self) -> f64;

    fn create_node(&mut self, kind: NodeKind) -> Result<NodeId, BackendError>;

    /// Route `source`'s output into `dest`. Fan-out (one source into several
    /// destinations) is allowed; the topology is fixed after construction.
    fn connect(&mut self, source: NodeId, dest: NodeId) -> Result<(), BackendError>;

    /// Route `source` into the backend's final output.
    fn connect_to_destination(&mut self, source: NodeId) -> Result<(), BackendError>;

    /// Begin continuous oscillation. The node keeps running until the
    /// backend itself is torn down.
    fn start_oscillator(&mut self, node: NodeId) -> Result<(), BackendError>;

    /// Switch a filter node into low-pass mode.
    fn set_lowpass(&mut self, node: NodeId) -> Result<(), BackendError>;

    /// Begin an asynchronous load of an impulse-response asset into a
    /// convolver node. Completion (or failure) is independent of this call
    /// returning; until a buffer lands, the convolver outputs silence.
    fn request_impulse_response(&mut self, node: NodeId, asset: &str)
        -> Result<(), BackendError>;

    /// Push a new waveshape to an oscillator. Takes effect on the next
    /// generated sample.
    fn set_waveform(&mut self, node: NodeId, waveform: Waveform);

    /// Instantaneous value of a parameter at the current clock time,
    /// including the effect of any in-flight automation.
    fn value_of(&self, node: NodeId, param: Param) -> f32;

    fn set_value_at(&mut self, node: NodeId, param: Param, value: f32, time: f64);

    fn linear_ramp_to(&mut self, node: NodeId, param: Param, value: f32, time: f64);

    fn set_target_at(
        &mut self,
        node: NodeId,
        param: Param,
        target: f32,
        start_time: f64,
        time_constant: f64,
    );

    fn cancel_scheduled(&mut self, node: NodeId, param: Param, from_time: f64);
}
