//! The monophonic synthesizer engine.
//!
//! One [`SynthEngine`] instance owns a fixed signal graph built once at
//! construction and a [`SynthSettings`] record mutated by the control
//! surface. Triggering a note schedules coordinated filter-cutoff and
//! output-amplitude envelopes against the backend's clock; everything else
//! is plain state until the next trigger reads it.

/// Lock-free control messaging between a UI thread and the engine.
#[cfg(feature = "rtrb")]
pub mod control;
/// Timestamped envelope scheduling.
pub mod envelope;
/// Equal-power dry/wet crossfade law.
pub mod reverb;
/// The per-instance parameter store.
pub mod settings;

use tracing::{debug, trace};

use crate::backend::{AudioBackend, BackendError, NodeId, NodeKind, Param, Waveform};
use crate::AMP_ATTACK_FLOOR;

use self::envelope::{filter_peak, EnvelopeShape};
use self::reverb::crossfade_gains;
use self::settings::SynthSettings;

/// Impulse-response asset fed to the convolver. Loaded asynchronously at
/// construction; until the load resolves the wet path passes silence.
pub const IMPULSE_RESPONSE_ASSET: &str = "reverb-impulse-1.wav";

/// A monophonic subtractive synthesizer driving an abstract audio backend.
///
/// The signal graph is wired exactly once and never re-routed:
///
/// ```text
/// Oscillator → Filter 1 → Filter 2 ─┬─→ Convolver → Wet Gain ─┬─→ Volume → Compressor → Out
///                                   └─→ Dry Gain ─────────────┘
/// ```
///
/// The two filter stages are identical cascaded low-pass nodes; the 2-pole
/// cascade gives a steeper roll-off than a single stage. Only one note
/// sounds at a time — a new trigger supersedes the previous envelopes.
pub struct SynthEngine<B: AudioBackend> {
    backend: B,
    settings: SynthSettings,
    oscillator: NodeId,
    filter1: NodeId,
    filter2: NodeId,
    convolver: NodeId,
    wet_gain: NodeId,
    dry_gain: NodeId,
    volume: NodeId,
    compressor: NodeId,
}

impl<B: AudioBackend> SynthEngine<B> {
    /// Build the signal graph and start continuous oscillation.
    ///
    /// Fails only if the backend cannot allocate or wire nodes; a missing
    /// audio capability is a hard initialization error, never degraded.
    pub fn new(backend: B) -> Result<Self, BackendError> {
        Self::with_settings(backend, SynthSettings::default())
    }

    pub fn with_settings(mut backend: B, settings: SynthSettings) -> Result<Self, BackendError> {
        let oscillator = backend.create_node(NodeKind::Oscillator)?;
        let filter1 = backend.create_node(NodeKind::Filter)?;
        let filter2 = backend.create_node(NodeKind::Filter)?;
        let convolver = backend.create_node(NodeKind::Convolver)?;
        let wet_gain = backend.create_node(NodeKind::Gain)?;
        let dry_gain = backend.create_node(NodeKind::Gain)?;
        let volume = backend.create_node(NodeKind::Gain)?;
        let compressor = backend.create_node(NodeKind::Compressor)?;

        backend.connect(oscillator, filter1)?;
        backend.connect(filter1, filter2)?;
        backend.connect(filter2, convolver)?;
        backend.connect(filter2, dry_gain)?;
        backend.connect(convolver, wet_gain)?;
        backend.connect(wet_gain, volume)?;
        backend.connect(dry_gain, volume)?;
        backend.connect(volume, compressor)?;
        backend.connect_to_destination(compressor)?;

        let now = backend.current_time();

        backend.set_waveform(oscillator, settings.oscillator.waveform);
        backend.set_value_at(oscillator, Param::Frequency, 440.0, now);
        backend.start_oscillator(oscillator)?;

        // Low-pass with Q pinned to 0; cutoff stays at the node default
        // until the first trigger.
        for filter in [filter1, filter2] {
            backend.set_lowpass(filter)?;
            backend.set_value_at(filter, Param::Q, 0.0, now);
        }

        // Silence until the first note: an immediate, non-ramped zero.
        backend.set_value_at(volume, Param::Gain, 0.0, now);

        // Fire-and-forget; a failed load leaves the wet path silent.
        backend.request_impulse_response(convolver, IMPULSE_RESPONSE_ASSET)?;

        let mut engine = Self {
            backend,
            settings,
            oscillator,
            filter1,
            filter2,
            convolver,
            wet_gain,
            dry_gain,
            volume,
            compressor,
        };
        engine.apply_reverb_gains();

        debug!(waveform = ?engine.settings.oscillator.waveform, "signal graph built");
        Ok(engine)
    }

    /// Target sustain amplitude of the amp envelope.
    pub fn set_level(&mut self, value: f32) {
        self.settings.master.level = value;
    }

    /// Oscillator waveshape. Pushed to the node immediately; waveform has no
    /// envelope, it takes effect on the next generated sample.
    pub fn set_wave_form(&mut self, waveform: Waveform) {
        self.settings.oscillator.waveform = waveform;
        self.backend.set_waveform(self.oscillator, waveform);
    }

    /// Dry/wet blend position. Recomputes both crossfade gains immediately.
    pub fn set_reverb(&mut self, value: f32) {
        self.settings.reverb.level = value;
        self.apply_reverb_gains();
    }

    /// Amplitude attack. The raw control value is floored by addition: the
    /// stored attack is `value + 0.01`, shifting the whole range rather than
    /// clamping its bottom.
    pub fn set_amp_attack(&mut self, value: f32) {
        self.settings.amp.attack = value + AMP_ATTACK_FLOOR;
    }

    pub fn set_amp_release(&mut self, value: f32) {
        self.settings.amp.release = value;
    }

    pub fn set_filter_cutoff(&mut self, value: f32) {
        self.settings.filter.cutoff = value;
    }

    pub fn set_filter_resonance(&mut self, value: f32) {
        self.settings.filter.resonance = value;
    }

    pub fn set_filter_envelope(&mut self, value: f32) {
        self.settings.filter.envelope = value;
    }

    pub fn set_filter_attack(&mut self, value: f32) {
        self.settings.filter.attack = value;
    }

    pub fn set_filter_release(&mut self, value: f32) {
        self.settings.filter.release = value;
    }

    /// Trigger a note. Sets pitch instantaneously (no glide) and fires the
    /// filter and amplitude envelopes. Any envelope still in flight from a
    /// previous trigger is cancelled and re-anchored at its live value.
    ///
    /// The frequency is passed through uninterpreted; validating it is the
    /// caller's business.
    pub fn play_tone(&mut self, frequency: f32) {
        let now = self.backend.current_time();
        trace!(frequency, now, "tone triggered");

        self.backend
            .set_value_at(self.oscillator, Param::Frequency, frequency, now);

        self.trigger_filter_envelope(now);
        self.trigger_amp_envelope(now);
    }

    fn trigger_filter_envelope(&mut self, now: f64) {
        let filter = self.settings.filter;
        let shape = EnvelopeShape {
            peak: filter_peak(filter.cutoff, filter.envelope),
            rest: filter.cutoff,
            attack: filter.attack,
            release: filter.release,
        };

        // Both stages receive the identical schedule in lock-step.
        for node in [self.filter1, self.filter2] {
            self.backend
                .set_value_at(node, Param::Q, filter.resonance, now);
            shape.schedule(&mut self.backend, node, Param::Frequency, now);
        }
    }

    fn trigger_amp_envelope(&mut self, now: f64) {
        let shape = EnvelopeShape {
            peak: self.settings.master.level,
            rest: 0.0,
            attack: self.settings.amp.attack,
            release: self.settings.amp.release,
        };
        shape.schedule(&mut self.backend, self.volume, Param::Gain, now);
    }

    fn apply_reverb_gains(&mut self) {
        let gains = crossfade_gains(self.settings.reverb.level);
        let now = self.backend.current_time();
        self.backend
            .set_value_at(self.dry_gain, Param::Gain, gains.dry, now);
        self.backend
            .set_value_at(self.wet_gain, Param::Gain, gains.wet, now);
    }

    pub fn settings(&self) -> &SynthSettings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn oscillator_node(&self) -> NodeId {
        self.oscillator
    }

    pub fn filter_nodes(&self) -> (NodeId, NodeId) {
        (self.filter1, self.filter2)
    }

    pub fn convolver_node(&self) -> NodeId {
        self.convolver
    }

    pub fn reverb_gain_nodes(&self) -> (NodeId, NodeId) {
        (self.dry_gain, self.wet_gain)
    }

    pub fn volume_node(&self) -> NodeId {
        self.volume
    }

    pub fn compressor_node(&self) -> NodeId {
        self.compressor
    }
}
