//! End-to-end checks of the engine's scheduling behavior against the
//! offline backend: graph construction, envelope timing, retriggering, and
//! the reverb crossfade.

use monovox::backend::offline::{AutomationEvent, OfflineBackend};
use monovox::{AudioBackend, NodeKind, Param, SynthEngine, Waveform, MAX_CUTOFF_HZ};

fn engine() -> SynthEngine<OfflineBackend> {
    SynthEngine::new(OfflineBackend::new()).expect("offline backend always constructs")
}

#[test]
fn graph_is_wired_in_the_fixed_topology() {
    let engine = engine();
    let backend = engine.backend();

    let osc = engine.oscillator_node();
    let (f1, f2) = engine.filter_nodes();
    let convolver = engine.convolver_node();
    let (dry, wet) = engine.reverb_gain_nodes();
    let volume = engine.volume_node();
    let compressor = engine.compressor_node();

    assert_eq!(backend.node_kind(osc), Some(NodeKind::Oscillator));
    assert_eq!(backend.node_kind(compressor), Some(NodeKind::Compressor));

    assert!(backend.is_connected(osc, f1));
    assert!(backend.is_connected(f1, f2));
    assert!(backend.is_connected(f2, convolver));
    assert!(backend.is_connected(f2, dry));
    assert!(backend.is_connected(convolver, wet));
    assert!(backend.is_connected(wet, volume));
    assert!(backend.is_connected(dry, volume));
    assert!(backend.is_connected(volume, compressor));
    assert!(backend.feeds_destination(compressor));

    assert!(backend.is_started(osc));
    assert!(backend.is_lowpass(f1));
    assert!(backend.is_lowpass(f2));
    assert!(backend.impulse_response_of(convolver).is_some());
}

#[test]
fn engine_is_silent_before_the_first_note() {
    let engine = engine();
    let volume = engine.volume_node();

    assert_eq!(engine.backend().value_of(volume, Param::Gain), 0.0);
    // Oscillator idles at concert pitch until the first trigger.
    let osc = engine.oscillator_node();
    assert_eq!(engine.backend().value_of(osc, Param::Frequency), 440.0);
    // Stock patch pushes its waveform at construction.
    assert_eq!(engine.backend().waveform_of(osc), Some(Waveform::Square));
}

#[test]
fn reverb_extremes_map_to_pure_dry_and_pure_wet() {
    let mut engine = engine();
    let (dry, wet) = engine.reverb_gain_nodes();

    engine.set_reverb(0.0);
    assert!((engine.backend().value_of(dry, Param::Gain) - 1.0).abs() < 1e-6);
    assert!(engine.backend().value_of(wet, Param::Gain).abs() < 1e-6);

    engine.set_reverb(1.0);
    assert!(engine.backend().value_of(dry, Param::Gain).abs() < 1e-6);
    assert!((engine.backend().value_of(wet, Param::Gain) - 1.0).abs() < 1e-6);
}

#[test]
fn reverb_blend_keeps_power_constant() {
    let mut engine = engine();
    let (dry, wet) = engine.reverb_gain_nodes();

    for step in 0..=20 {
        let level = step as f32 / 20.0;
        engine.set_reverb(level);

        let d = engine.backend().value_of(dry, Param::Gain);
        let w = engine.backend().value_of(wet, Param::Gain);
        assert!(
            (d * d + w * w - 1.0).abs() < 1e-5,
            "dry²+wet² should be 1 at level {level}"
        );
    }
}

#[test]
fn filter_envelope_sweeps_to_the_computed_peak() {
    let mut engine = engine();
    engine.set_filter_cutoff(350.0);
    engine.set_filter_envelope(0.25);

    engine.play_tone(440.0);

    let (f1, f2) = engine.filter_nodes();
    for node in [f1, f2] {
        let timeline = engine
            .backend()
            .timeline(node, Param::Frequency)
            .expect("filter envelope scheduled");

        // peak = 350 + (15000 - 350) * 0.25 = 4012.5, exactly.
        let ramp_target = timeline.events().iter().find_map(|e| match e {
            AutomationEvent::LinearRamp { value, .. } => Some(*value),
            _ => None,
        });
        assert_eq!(ramp_target, Some(4012.5));
    }
}

#[test]
fn full_envelope_amount_sweeps_to_the_cutoff_ceiling() {
    let mut engine = engine();
    engine.set_filter_cutoff(2_000.0);
    engine.set_filter_envelope(1.0);
    engine.play_tone(110.0);

    let (f1, _) = engine.filter_nodes();
    let attack = engine.settings().filter.attack as f64;
    let peak = engine.backend().value_at(f1, Param::Frequency, attack);
    assert!((peak - MAX_CUTOFF_HZ).abs() < 0.5);
}

#[test]
fn both_filter_stages_receive_identical_schedules() {
    let mut engine = engine();
    engine.play_tone(330.0);

    let (f1, f2) = engine.filter_nodes();
    let backend = engine.backend();
    let events1 = backend.timeline(f1, Param::Frequency).unwrap().events();
    let events2 = backend.timeline(f2, Param::Frequency).unwrap().events();
    assert_eq!(events1, events2);

    // Resonance is applied instantaneously, not enveloped.
    assert_eq!(
        backend.value_of(f1, Param::Q),
        engine.settings().filter.resonance
    );
}

#[test]
fn amp_envelope_converges_exactly_to_silence() {
    let mut engine = engine();
    engine.set_level(0.8);
    engine.play_tone(440.0);

    let volume = engine.volume_node();
    let attack = engine.settings().amp.attack as f64;
    let release = engine.settings().amp.release as f64;
    let backend = engine.backend();

    // Peak of master.level at the end of the attack.
    let peak = backend.value_at(volume, Param::Gain, attack);
    assert!((peak - 0.8).abs() < 1e-4);

    // Still audible mid-release...
    let mid = backend.value_at(volume, Param::Gain, attack + release * 0.1);
    assert!(mid > 0.0 && mid < 0.8);

    // ...but exactly zero at attack + release. The trailing pin, not the
    // asymptote, guarantees this.
    assert_eq!(backend.value_at(volume, Param::Gain, attack + release), 0.0);
}

#[test]
fn filter_envelope_converges_exactly_to_the_cutoff() {
    let mut engine = engine();
    engine.set_filter_cutoff(500.0);
    engine.play_tone(440.0);

    let (f1, _) = engine.filter_nodes();
    let attack = engine.settings().filter.attack as f64;
    let release = engine.settings().filter.release as f64;

    let settled = engine
        .backend()
        .value_at(f1, Param::Frequency, attack + release);
    assert_eq!(settled, 500.0);
}

#[test]
fn retrigger_mid_attack_is_continuous_and_cancels_the_old_envelope() {
    let mut engine = engine();
    engine.set_level(1.0);
    engine.play_tone(440.0);

    // Halfway up the amp attack (stock attack is 0.1 s).
    let half_attack = engine.settings().amp.attack as f64 / 2.0;
    engine.backend_mut().advance(half_attack);

    let volume = engine.volume_node();
    let live = engine.backend().value_of(volume, Param::Gain);
    assert!(live > 0.0 && live < 1.0, "should be mid-attack");

    let retrigger_time = engine.backend().current_time();
    engine.play_tone(220.0);

    // Re-anchored at the live value: no jump at the retrigger point.
    let after = engine
        .backend()
        .value_at(volume, Param::Gain, retrigger_time);
    assert!((after - live).abs() < 1e-4);

    // Every event now pending stems from the second trigger: the first
    // trigger's ramp ended inside the new envelope's window and is gone.
    let timeline = engine.backend().timeline(volume, Param::Gain).unwrap();
    let pending: Vec<_> = timeline
        .events()
        .iter()
        .filter(|e| e.time() > retrigger_time)
        .collect();
    let new_attack_end = retrigger_time + engine.settings().amp.attack as f64;
    for event in &pending {
        assert!(
            event.time() >= new_attack_end - 1e-9,
            "stale event at {} survived the retrigger",
            event.time()
        );
    }

    // The second note's pitch took effect instantaneously.
    let osc = engine.oscillator_node();
    assert_eq!(engine.backend().value_of(osc, Param::Frequency), 220.0);
}

#[test]
fn retrigger_after_full_decay_starts_from_silence() {
    let mut engine = engine();
    engine.play_tone(440.0);

    let attack = engine.settings().amp.attack as f64;
    let release = engine.settings().amp.release as f64;
    engine.backend_mut().advance(attack + release + 1.0);

    let volume = engine.volume_node();
    assert_eq!(engine.backend().value_of(volume, Param::Gain), 0.0);

    engine.play_tone(440.0);
    let now = engine.backend().current_time();
    assert_eq!(engine.backend().value_at(volume, Param::Gain, now), 0.0);
}

#[test]
fn second_engine_instance_owns_its_own_nodes() {
    // Instances never share state; two engines schedule independently.
    let mut a = engine();
    let mut b = engine();

    a.play_tone(440.0);
    b.set_reverb(1.0);

    let vol_a = a.volume_node();
    let vol_b = b.volume_node();
    assert!(a.backend().timeline(vol_a, Param::Gain).unwrap().events().len() > 1);

    // b never played a note; its volume holds the construction-time zero.
    assert_eq!(b.backend().value_of(vol_b, Param::Gain), 0.0);
}
