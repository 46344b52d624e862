// The delay and sound timers count down at 60hz, on a clock of their own.
// The machine never touches them directly: a front end owns a `Timers` and
// hands the values over through the `Host` calls.

pub const TIMER_HZ: f64 = 60.0;
pub const TICK_DURATION: f64 = 1.0 / TIMER_HZ;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
    elapsed: f64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for `delta_s` seconds of wall-clock time, decrementing both
    /// timers once per whole tick that has passed. Returns the tick count.
    pub fn advance(&mut self, delta_s: f64) -> u32 {
        self.elapsed += delta_s;

        let mut ticks = 0;
        while self.elapsed >= TICK_DURATION {
            self.tick();
            self.elapsed -= TICK_DURATION;
            ticks += 1;
        }
        ticks
    }

    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.delay = 0;
        self.sound = 0;
    }

    pub fn is_tone_on(&self) -> bool {
        self.sound != 0
    }
}
