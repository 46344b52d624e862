//! A CHIP-8 virtual machine.
//!
//! The [`Machine`] owns memory, registers, the call stack and the display,
//! and executes one instruction per [`Machine::step`]. Everything outside
//! the machine (drawing, keys, the two 60hz timers) is reached through the
//! [`Host`] trait, so a machine can run headless under [`RecordingHost`] or
//! on screen under one of the front ends, driven by [`runner::run`].

pub mod error;
pub mod host;
pub mod keymap;
pub mod machine;
pub mod runner;
pub mod terminal;
pub mod timer;
#[cfg(feature = "sdl")]
pub mod window;

pub use error::{Fault, FrontendError, LoadError};
pub use host::{Host, HostEvent, RecordingHost};
pub use machine::{Dump, Machine, Quirks, Status};
