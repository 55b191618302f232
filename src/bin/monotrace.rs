//! monotrace - print the parameter trajectories a note trigger schedules
//!
//! Run with: cargo run --bin monotrace

use monovox::backend::offline::OfflineBackend;
use monovox::{AudioBackend, Param, SynthEngine, Waveform};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let mut engine = SynthEngine::new(OfflineBackend::new())?;
    engine.set_wave_form(Waveform::Sawtooth);
    engine.set_filter_cutoff(350.0);
    engine.set_filter_envelope(0.25);
    engine.set_reverb(0.3);

    println!("=== monovox envelope trace ===\n");
    let settings = engine.settings();
    println!("amp     attack {:.2}s  release {:.2}s", settings.amp.attack, settings.amp.release);
    println!(
        "filter  cutoff {:.0}Hz  envelope {:.2}  attack {:.2}s  release {:.2}s\n",
        settings.filter.cutoff,
        settings.filter.envelope,
        settings.filter.attack,
        settings.filter.release
    );

    engine.play_tone(440.0);

    let volume = engine.volume_node();
    let (filter, _) = engine.filter_nodes();

    println!("{:>8}  {:>12}  {:>12}", "time", "volume gain", "cutoff Hz");
    for step in 0..=40 {
        let t = step as f64 * 0.05;
        let gain = engine.backend().value_at(volume, Param::Gain, t);
        let cutoff = engine.backend().value_at(filter, Param::Frequency, t);
        println!("{t:>7.2}s  {gain:>12.4}  {cutoff:>12.1}");
    }

    // Retrigger mid-attack to show the continuity re-anchor.
    engine.backend_mut().advance(0.05);
    let live = engine.backend().value_of(volume, Param::Gain);
    engine.play_tone(220.0);
    println!("\nretriggered at 0.05s: held volume gain {live:.4}, new pitch 220 Hz");

    Ok(())
}
