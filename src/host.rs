use std::collections::VecDeque;

use crate::timer::Timers;

pub const KEY_COUNT: usize = 0x10;

/// Everything the machine asks of its environment while executing.
///
/// `await_key` may block for as long as it likes; implementations should
/// also zero both timers for the duration of the wait so a blocked program
/// does not come back to a stale countdown.
pub trait Host {
    fn clear(&mut self);

    /// Report the new value of one pixel after a sprite XOR.
    fn plot(&mut self, x: u8, y: u8, set: bool);

    fn get_delay_timer(&mut self) -> u8;

    fn set_delay_timer(&mut self, value: u8);

    fn set_sound_timer(&mut self, value: u8);

    /// Non-blocking; `key` is always below `KEY_COUNT`.
    fn check_key(&mut self, key: u8) -> bool;

    /// Block until a key is pressed and return it (`0..KEY_COUNT`).
    fn await_key(&mut self) -> u8;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Clear,
    Plot { x: u8, y: u8, set: bool },
    SetDelay(u8),
    SetSound(u8),
    AwaitKey(u8),
}

/// Headless host that writes down every call, for deterministic runs.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub events: Vec<HostEvent>,
    pub keys: [bool; KEY_COUNT],
    pub timers: Timers,
    pending_keys: VecDeque<u8>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_keydown(&mut self, key: usize, down: bool) {
        if key < KEY_COUNT {
            self.keys[key] = down;
        }
    }

    /// Queue a key for the next `await_key`. With nothing queued,
    /// `await_key` answers key 0.
    pub fn push_key(&mut self, key: u8) {
        self.pending_keys.push_back(key);
    }

    pub fn plots(&self) -> impl Iterator<Item = (u8, u8, bool)> + '_ {
        self.events.iter().filter_map(|e| match *e {
            HostEvent::Plot { x, y, set } => Some((x, y, set)),
            _ => None,
        })
    }
}

impl Host for RecordingHost {
    fn clear(&mut self) {
        self.events.push(HostEvent::Clear);
    }

    fn plot(&mut self, x: u8, y: u8, set: bool) {
        self.events.push(HostEvent::Plot { x, y, set });
    }

    fn get_delay_timer(&mut self) -> u8 {
        self.timers.delay
    }

    fn set_delay_timer(&mut self, value: u8) {
        self.timers.delay = value;
        self.events.push(HostEvent::SetDelay(value));
    }

    fn set_sound_timer(&mut self, value: u8) {
        self.timers.sound = value;
        self.events.push(HostEvent::SetSound(value));
    }

    fn check_key(&mut self, key: u8) -> bool {
        self.keys[key as usize]
    }

    fn await_key(&mut self) -> u8 {
        self.timers.reset();
        let key = self.pending_keys.pop_front().unwrap_or(0);
        self.events.push(HostEvent::AwaitKey(key));
        key
    }
}
