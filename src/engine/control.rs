use rtrb::{Consumer, Producer, RingBuffer};

use crate::backend::{AudioBackend, Waveform};
use crate::engine::SynthEngine;

/*
Control Messaging
=================

The engine has exactly one logical writer: the UI thread turning knob drags
and key presses into setter calls. When that thread is not the thread that
owns the engine, messages cross over a lock-free SPSC ring buffer instead of
a mutex — a full queue drops the message (the next knob sample supersedes it
anyway), and the reader never blocks.

Semantics match direct setter calls: last write wins on the parameter store,
and envelopes already scheduled are unaffected until the next PlayTone.
*/

/// One inbound control-surface action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlMessage {
    SetLevel(f32),
    SetWaveForm(Waveform),
    SetReverb(f32),
    SetAmpAttack(f32),
    SetAmpRelease(f32),
    SetFilterCutoff(f32),
    SetFilterResonance(f32),
    SetFilterEnvelope(f32),
    SetFilterAttack(f32),
    SetFilterRelease(f32),
    PlayTone(f32),
}

const CONTROL_QUEUE_SIZE: usize = 256;

/// Producer side handed to the control surface.
pub struct ControlHandle {
    tx: Producer<ControlMessage>,
}

/// Consumer side pumped by whoever owns the engine.
pub struct ControlQueue {
    rx: Consumer<ControlMessage>,
}

/// Create a connected handle/queue pair.
pub fn control_channel() -> (ControlHandle, ControlQueue) {
    let (tx, rx) = RingBuffer::<ControlMessage>::new(CONTROL_QUEUE_SIZE);
    (ControlHandle { tx }, ControlQueue { rx })
}

impl ControlHandle {
    /// Push a message; silently dropped if the queue is full.
    pub fn send(&mut self, message: ControlMessage) {
        let _ = self.tx.push(message);
    }

    pub fn play_tone(&mut self, frequency: f32) {
        self.send(ControlMessage::PlayTone(frequency));
    }
}

impl<B: AudioBackend> SynthEngine<B> {
    /// Apply one control message to the engine.
    pub fn apply(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::SetLevel(v) => self.set_level(v),
            ControlMessage::SetWaveForm(w) => self.set_wave_form(w),
            ControlMessage::SetReverb(v) => self.set_reverb(v),
            ControlMessage::SetAmpAttack(v) => self.set_amp_attack(v),
            ControlMessage::SetAmpRelease(v) => self.set_amp_release(v),
            ControlMessage::SetFilterCutoff(v) => self.set_filter_cutoff(v),
            ControlMessage::SetFilterResonance(v) => self.set_filter_resonance(v),
            ControlMessage::SetFilterEnvelope(v) => self.set_filter_envelope(v),
            ControlMessage::SetFilterAttack(v) => self.set_filter_attack(v),
            ControlMessage::SetFilterRelease(v) => self.set_filter_release(v),
            ControlMessage::PlayTone(f) => self.play_tone(f),
        }
    }

    /// Drain every pending message in arrival order.
    pub fn pump(&mut self, queue: &mut ControlQueue) {
        while let Ok(message) = queue.rx.pop() {
            self.apply(message);
        }
    }
}
