#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::backend::Waveform;

/*
Parameter Store
===============

One mutable record per engine instance holding every synthesis parameter the
control surface can touch. Setters on the engine mutate this record; the
envelope scheduler reads it fresh on every trigger.

Declared ranges (enforced by the controlling UI, NOT re-validated here):

  master.level        0.0 .. 1.0     sustain amplitude target
  amp.attack          0.01 .. 10 s   stored value is raw control + 0.01
  amp.release         0.1 .. 10 s
  filter.cutoff       20 .. 15000 Hz
  filter.resonance    0 .. 10        Q factor
  filter.envelope     0.0 .. 1.0     fraction of headroom swept on attack
  filter.attack       0.01 .. 10 s
  filter.release      0.01 .. 10 s
  reverb.level        0.0 .. 1.0     0 = fully dry, 1 = fully wet

Out-of-range or malformed input is accepted silently; downstream audio
behavior for such values is undefined. That contract keeps every setter a
plain store with no error path.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct MasterSettings {
    pub level: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct OscillatorSettings {
    pub waveform: Waveform,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct AmpSettings {
    pub attack: f32,
    pub release: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct FilterSettings {
    pub cutoff: f32,
    pub resonance: f32,
    pub envelope: f32,
    pub attack: f32,
    pub release: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct ReverbSettings {
    pub level: f32,
}

/// Full parameter snapshot for one engine instance.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct SynthSettings {
    pub master: MasterSettings,
    pub oscillator: OscillatorSettings,
    pub amp: AmpSettings,
    pub filter: FilterSettings,
    pub reverb: ReverbSettings,
}

impl Default for SynthSettings {
    fn default() -> Self {
        Self {
            master: MasterSettings { level: 1.0 },
            oscillator: OscillatorSettings {
                waveform: Waveform::Square,
            },
            amp: AmpSettings {
                attack: 0.1,
                release: 1.5,
            },
            filter: FilterSettings {
                cutoff: 350.0,
                resonance: 0.0,
                envelope: 0.25,
                attack: 0.1,
                release: 0.5,
            },
            reverb: ReverbSettings { level: 0.25 },
        }
    }
}
