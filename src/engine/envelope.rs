use crate::backend::{AudioBackend, NodeId, Param};
use crate::MAX_CUTOFF_HZ;

/*
Scheduled Envelopes
===================

Unlike a sample-by-sample envelope generator, these envelopes are issued as a
batch of timestamped automation events against the backend's clock and then
left alone. One trigger produces, per target parameter:

  Value
  peak ┤        ╱╲
       │       ╱  ╲ _
       │      ╱      ╲ ‾ - _
  rest ┤─────╱               ‾──●──────
       └─────┬───────┬──────────┬─→ Time
            now   now + A    now + A + R

  1. cancel pending events from `now`, holding the live value
  2. re-anchor: step to the live value at `now`
  3. linear ramp to `peak`, arriving at `now + attack`
  4. exponential relaxation toward `rest` from `now + attack`,
     time constant `release / 10`
  5. step exactly to `rest` at `now + attack + release`

The linear attack gives a perceptually even rise. The release uses an
exponential relaxation because natural decays are fast-then-slow; the /10
divisor maps the user-facing "release seconds" knob onto the time-constant
scale. The final step exists because an exponential approach never reaches
its target in finite time, and the next trigger must start from a fully
settled value — no residual audio, no half-open filter.

Steps 1–2 are what make retriggering continuous: a new trigger mid-flight
anchors at the value the parameter actually has at that instant, never the
value it started from, and every stale future event is gone.
*/

/// One-shot attack/relax/settle trajectory for a single parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeShape {
    /// Value reached at the end of the attack ramp.
    pub peak: f32,
    /// Value the parameter settles back to.
    pub rest: f32,
    /// Attack duration, seconds.
    pub attack: f32,
    /// Release duration, seconds. Scaled by 1/10 into the relaxation's
    /// time constant; also sets the hard settle point.
    pub release: f32,
}

impl EnvelopeShape {
    /// Issue the full event sequence against `param` of `node`, starting at
    /// `now`. Fire-and-forget: the backend renders it on its own clock.
    pub fn schedule<B: AudioBackend>(&self, backend: &mut B, node: NodeId, param: Param, now: f64) {
        backend.cancel_scheduled(node, param, now);
        let live = backend.value_of(node, param);
        backend.set_value_at(node, param, live, now);

        let attack_end = now + self.attack as f64;
        backend.linear_ramp_to(node, param, self.peak, attack_end);
        backend.set_target_at(
            node,
            param,
            self.rest,
            attack_end,
            (self.release / 10.0) as f64,
        );
        backend.set_value_at(node, param, self.rest, attack_end + self.release as f64);
    }
}

/// Peak cutoff for the filter envelope: the configured cutoff plus the
/// enveloped fraction of the headroom up to [`MAX_CUTOFF_HZ`].
pub fn filter_peak(cutoff: f32, envelope_amount: f32) -> f32 {
    cutoff + (MAX_CUTOFF_HZ - cutoff) * envelope_amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::offline::OfflineBackend;
    use crate::backend::NodeKind;

    #[test]
    fn filter_peak_interpolates_the_headroom() {
        assert_eq!(filter_peak(350.0, 0.25), 4012.5);
        assert_eq!(filter_peak(350.0, 0.0), 350.0);
        assert_eq!(filter_peak(350.0, 1.0), MAX_CUTOFF_HZ);
        assert_eq!(filter_peak(MAX_CUTOFF_HZ, 0.7), MAX_CUTOFF_HZ);
    }

    #[test]
    fn schedule_settles_exactly_at_attack_plus_release() {
        let mut backend = OfflineBackend::new();
        let gain = backend.create_node(NodeKind::Gain).unwrap();
        backend.set_value_at(gain, Param::Gain, 0.0, 0.0);

        let shape = EnvelopeShape {
            peak: 0.8,
            rest: 0.0,
            attack: 0.1,
            release: 1.5,
        };
        shape.schedule(&mut backend, gain, Param::Gain, 0.0);

        // Mid-attack: on the linear ramp.
        let mid = backend.value_at(gain, Param::Gain, 0.05);
        assert!((mid - 0.4).abs() < 1e-4);

        // Peak at the end of the attack.
        let peak = backend.value_at(gain, Param::Gain, 0.1);
        assert!((peak - 0.8).abs() < 1e-4);

        // Relaxing, but not yet settled, just before the pin.
        let near_end = backend.value_at(gain, Param::Gain, 1.59);
        assert!(near_end > 0.0);

        // Exactly the rest value at attack + release. Not merely close.
        assert_eq!(backend.value_at(gain, Param::Gain, 1.6), 0.0);
        assert_eq!(backend.value_at(gain, Param::Gain, 10.0), 0.0);
    }

    #[test]
    fn relaxation_time_constant_is_release_over_ten() {
        let mut backend = OfflineBackend::new();
        let gain = backend.create_node(NodeKind::Gain).unwrap();
        backend.set_value_at(gain, Param::Gain, 0.0, 0.0);

        let shape = EnvelopeShape {
            peak: 1.0,
            rest: 0.0,
            attack: 0.0,
            release: 1.0,
        };
        shape.schedule(&mut backend, gain, Param::Gain, 0.0);

        // One time constant (release / 10 = 0.1 s) after the peak the value
        // should have fallen to 1/e.
        let expected = (-1.0_f64).exp() as f32;
        let actual = backend.value_at(gain, Param::Gain, 0.1);
        assert!((actual - expected).abs() < 1e-4);
    }

    #[test]
    fn retrigger_anchors_at_the_live_value() {
        let mut backend = OfflineBackend::new();
        let gain = backend.create_node(NodeKind::Gain).unwrap();
        backend.set_value_at(gain, Param::Gain, 0.0, 0.0);

        let shape = EnvelopeShape {
            peak: 1.0,
            rest: 0.0,
            attack: 1.0,
            release: 1.0,
        };
        shape.schedule(&mut backend, gain, Param::Gain, 0.0);

        // Halfway up the attack ramp.
        backend.advance(0.5);
        let live = backend.value_of(gain, Param::Gain);
        assert!((live - 0.5).abs() < 1e-4);

        shape.schedule(&mut backend, gain, Param::Gain, 0.5);

        // No discontinuity at the retrigger point.
        assert!((backend.value_at(gain, Param::Gain, 0.5) - live).abs() < 1e-4);
        // The new attack rises from the held value, not from zero or one.
        let after = backend.value_at(gain, Param::Gain, 1.0);
        assert!((after - 0.75).abs() < 1e-4);
    }
}
