use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::error::{Fault, FrontendError};
use crate::host::Host;
use crate::machine::Machine;
use crate::timer::{Timers, TICK_DURATION, TIMER_HZ};

pub const DEFAULT_FREQ: u32 = 540;

/// A host that also owns the timers, the input devices and the screen, and
/// can be driven frame by frame.
pub trait Frontend: Host {
    fn timers(&mut self) -> &mut Timers;

    /// Poll input and present the display. Called once per 60hz frame;
    /// returns `false` once the user has asked to stop.
    fn frame(&mut self) -> Result<bool, FrontendError>;

    /// Something was drawn since the last frame, so the current batch of
    /// instructions should end early and show it.
    fn frame_ready(&self) -> bool {
        false
    }

    /// The user asked to stop from inside a host call, e.g. while the
    /// machine was blocked waiting for a key.
    fn quit_requested(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Halted(Fault),
    Quit,
}

/// Instructions executed between two timer frames at `freq` instructions
/// per second.
pub fn steps_per_frame(freq: u32) -> u32 {
    ((freq as f64 / TIMER_HZ).round() as u32).max(1)
}

/// Drive `machine` until it halts or the user quits. Instructions run in
/// batches; the timers advance by the wall-clock time between frames, so
/// their rate does not depend on how many instructions ran.
pub fn run<F: Frontend>(
    machine: &mut Machine,
    frontend: &mut F,
    freq: u32,
) -> Result<Outcome, FrontendError> {
    let batch = steps_per_frame(freq);
    let frame_duration = Duration::from_secs_f64(TICK_DURATION);
    let mut last_frame = Instant::now();
    debug!("running {} instructions per frame", batch);

    loop {
        for _ in 0..batch {
            if let Err(fault) = machine.step(frontend) {
                debug!("halted at {:04x}: {}", machine.pc(), fault);
                return Ok(Outcome::Halted(fault));
            }
            if frontend.quit_requested() {
                info!("quit while waiting for input");
                return Ok(Outcome::Quit);
            }
            if frontend.frame_ready() {
                break;
            }
        }

        let elapsed = last_frame.elapsed();
        if elapsed > frame_duration * 2 {
            debug!("frame overran by {:?}", elapsed - frame_duration);
        }
        thread::sleep(frame_duration.saturating_sub(elapsed));

        let delta_s = last_frame.elapsed().as_secs_f64();
        last_frame = Instant::now();
        frontend.timers().advance(delta_s);

        if !frontend.frame()? {
            info!("quit requested");
            return Ok(Outcome::Quit);
        }
    }
}
