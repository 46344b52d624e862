use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use log::{debug, warn};

use crate::error::FrontendError;
use crate::host::{Host, KEY_COUNT};
use crate::keymap::Keymap;
use crate::runner::Frontend;
use crate::timer::Timers;

/// Terminals only report key presses, never releases, so a press counts as
/// the key being held down for this many frames.
const HOLD_FRAMES: u8 = 3;

const BELL: char = '\x07';

/// Front end drawing into the terminal, one character cell per pixel.
pub struct TerminalFrontend {
    out: Stdout,
    keymap: Keymap,
    held: [u8; KEY_COUNT],
    timers: Timers,
    dirty: bool,
    quit: bool,
    // first write failure inside a host call, reported on the next frame
    fault: Option<io::Error>,
}

impl TerminalFrontend {
    pub fn new(keymap: Keymap) -> Result<Self, FrontendError> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;

        Ok(Self {
            out,
            keymap,
            held: [0; KEY_COUNT],
            timers: Timers::new(),
            dirty: false,
            quit: false,
            fault: None,
        })
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            if self.fault.is_none() {
                self.fault = Some(e);
            }
        }
    }

    /// Escape and ctrl-c ask to quit; anything else is looked up in the keymap.
    fn map_key(&mut self, key: KeyEvent) -> Option<u8> {
        match key.code {
            KeyCode::Esc => {
                self.quit = true;
                None
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit = true;
                None
            }
            KeyCode::Char(c) => {
                let mapped = self.keymap.key_for(c);
                if mapped.is_none() {
                    debug!("can't map {:?} to a keypad key", c);
                }
                mapped
            }
            _ => None,
        }
    }

    fn poll_keys(&mut self) -> io::Result<()> {
        for held in self.held.iter_mut() {
            *held = held.saturating_sub(1);
        }
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if let Some(k) = self.map_key(key) {
                    self.held[k as usize] = HOLD_FRAMES;
                }
            }
        }
        Ok(())
    }
}

impl Drop for TerminalFrontend {
    fn drop(&mut self) {
        if let Err(e) = execute!(self.out, Show, LeaveAlternateScreen) {
            warn!("could not restore the screen: {}", e);
        }
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("could not leave raw mode: {}", e);
        }
    }
}

impl Host for TerminalFrontend {
    fn clear(&mut self) {
        let result = queue!(self.out, Clear(ClearType::All));
        self.record(result);
        self.dirty = true;
    }

    fn plot(&mut self, x: u8, y: u8, set: bool) {
        let cell = if set { '#' } else { ' ' };
        let result = queue!(self.out, MoveTo(x as u16, y as u16), Print(cell));
        self.record(result);
        self.dirty = true;
    }

    fn get_delay_timer(&mut self) -> u8 {
        self.timers.delay
    }

    fn set_delay_timer(&mut self, value: u8) {
        self.timers.delay = value;
    }

    fn set_sound_timer(&mut self, value: u8) {
        self.timers.sound = value;
    }

    fn check_key(&mut self, key: u8) -> bool {
        self.held[key as usize] > 0
    }

    fn await_key(&mut self) -> u8 {
        self.held = [0; KEY_COUNT];
        self.timers.reset();

        let result = self.out.flush();
        self.record(result);

        loop {
            match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(k) = self.map_key(key) {
                        return k;
                    }
                    if self.quit {
                        return 0;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    self.record(Err(e));
                    self.quit = true;
                    return 0;
                }
            }
        }
    }
}

impl Frontend for TerminalFrontend {
    fn timers(&mut self) -> &mut Timers {
        &mut self.timers
    }

    fn frame(&mut self) -> Result<bool, FrontendError> {
        if let Some(e) = self.fault.take() {
            return Err(e.into());
        }

        self.poll_keys()?;
        if self.timers.is_tone_on() {
            queue!(self.out, Print(BELL))?;
        }
        self.out.flush()?;
        self.dirty = false;

        Ok(!self.quit)
    }

    fn frame_ready(&self) -> bool {
        self.dirty
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}
