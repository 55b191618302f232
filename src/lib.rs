pub mod backend; // Audio-processing-node capability + offline reference backend
pub mod engine; // Signal graph, parameter store, envelope scheduling
pub mod notes; // Equal-temperament pitch math

/// Ceiling of the filter envelope sweep: the peak cutoff is interpolated
/// between the configured cutoff and this value.
pub const MAX_CUTOFF_HZ: f32 = 15_000.0;

pub(crate) const AMP_ATTACK_FLOOR: f32 = 0.01;

pub use backend::{AudioBackend, BackendError, NodeId, NodeKind, Param, Waveform};
pub use engine::{settings::SynthSettings, SynthEngine};
