use std::f32::consts::FRAC_PI_2;

/*
Equal-Power Dry/Wet Crossfade
=============================

A single "reverb amount" control drives two gain coefficients, one on the dry
path and one on the wet (convolved) path. A naive linear crossfade

    dry = 1 - level
    wet = level

dips in perceived loudness around the midpoint because amplitudes add but
loudness tracks power (amplitude squared). The cosine law fixes this:

    dry = cos(level * pi/2)
    wet = cos((1 - level) * pi/2)

For every blend position dry^2 + wet^2 == 1, so total signal power is
constant across the sweep.

Both coefficients are applied as instantaneous gain values with no smoothing.
Rapid successive calls during a live knob drag each produce a fresh jump;
responsiveness wins over click-free adversarial automation here.
*/

/// Gain coefficients for a dry/wet blend position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossfadeGains {
    pub dry: f32,
    pub wet: f32,
}

/// Equal-power crossfade law. `level` 0 is fully dry, 1 fully wet.
pub fn crossfade_gains(level: f32) -> CrossfadeGains {
    CrossfadeGains {
        dry: (level * FRAC_PI_2).cos(),
        wet: ((1.0 - level) * FRAC_PI_2).cos(),
    }
}
