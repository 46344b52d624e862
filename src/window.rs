use sdl2::event::Event;
use sdl2::keyboard::{Keycode, Scancode};
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::Canvas;
use sdl2::video::Window;
use sdl2::{EventPump, Sdl};

use crate::error::FrontendError;
use crate::host::{Host, KEY_COUNT};
use crate::keymap::Keymap;
use crate::machine::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::runner::Frontend;
use crate::timer::Timers;

fn sdl_error(e: impl ToString) -> FrontendError {
    FrontendError::Sdl(e.to_string())
}

/// Front end drawing into an SDL window, with real key up/down state.
pub struct WindowFrontend {
    _sdl_context: Sdl,
    canvas: Canvas<Window>,
    event_pump: EventPump,
    scancodes: [Option<Scancode>; KEY_COUNT],
    keyboard: [bool; KEY_COUNT],
    pixels: [[bool; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
    timers: Timers,
    width: u32,
    height: u32,
    dirty: bool,
    quit: bool,
}

impl WindowFrontend {
    pub fn new(keymap: Keymap, width: u32, height: u32) -> Result<Self, FrontendError> {
        let sdl_context = sdl2::init().map_err(sdl_error)?;
        let video_subsystem = sdl_context.video().map_err(sdl_error)?;

        let window = video_subsystem
            .window("CHIP-8", width, height)
            .position_centered()
            .build()
            .map_err(sdl_error)?;

        let mut canvas = window
            .into_canvas()
            .accelerated()
            .build()
            .map_err(sdl_error)?;
        canvas.set_draw_color(Color::RGB(0, 0, 0));
        canvas.clear();
        canvas.present();

        let event_pump = sdl_context.event_pump().map_err(sdl_error)?;

        let mut scancodes = [None; KEY_COUNT];
        for (key, c) in keymap.chars().iter().enumerate() {
            scancodes[key] = Scancode::from_name(&c.to_string());
        }

        Ok(Self {
            _sdl_context: sdl_context,
            canvas,
            event_pump,
            scancodes,
            keyboard: [false; KEY_COUNT],
            pixels: [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            timers: Timers::new(),
            width,
            height,
            dirty: false,
            quit: false,
        })
    }

    fn key_for(&self, scancode: Scancode) -> Option<u8> {
        self.scancodes
            .iter()
            .position(|s| *s == Some(scancode))
            .map(|k| k as u8)
    }

    fn present(&mut self) -> Result<(), FrontendError> {
        self.canvas.set_draw_color(Color::RGB(0, 0, 0));
        self.canvas.clear();

        let spot_width: u32 = self.width / DISPLAY_WIDTH as u32;
        let spot_height: u32 = self.height / DISPLAY_HEIGHT as u32;
        for (y, row) in self.pixels.iter().enumerate() {
            for (x, set) in row.iter().enumerate() {
                if *set {
                    self.canvas.set_draw_color(Color::GREEN);
                } else {
                    self.canvas.set_draw_color(Color::BLACK);
                }
                let spot = Rect::new(
                    x as i32 * spot_width as i32, y as i32 * spot_height as i32,
                    spot_width, spot_height);
                self.canvas.fill_rect(spot).map_err(sdl_error)?;
            }
        }

        self.canvas.present();
        Ok(())
    }
}

impl Host for WindowFrontend {
    fn clear(&mut self) {
        self.pixels = [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        self.dirty = true;
    }

    fn plot(&mut self, x: u8, y: u8, set: bool) {
        self.pixels[y as usize][x as usize] = set;
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
        self.keyboard[key as usize]
    }

    fn await_key(&mut self) -> u8 {
        self.keyboard = [false; KEY_COUNT];
        self.timers.reset();
        if self.present().is_err() {
            self.quit = true;
            return 0;
        }

        loop {
            match self.event_pump.wait_event() {
                Event::Quit { .. }
                | Event::KeyDown { keycode: Some(Keycode::Escape), .. } => {
                    self.quit = true;
                    return 0;
                }
                Event::KeyDown { scancode: Some(scancode), .. } => {
                    if let Some(k) = self.key_for(scancode) {
                        return k;
                    }
                }
                _ => {}
            }
        }
    }
}

impl Frontend for WindowFrontend {
    fn timers(&mut self) -> &mut Timers {
        &mut self.timers
    }

    fn frame(&mut self) -> Result<bool, FrontendError> {
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit {..} |
                Event::KeyDown { keycode: Some(Keycode::Escape), .. } => {
                    self.quit = true
                },
                _ => {}
            }
        }

        let keyboard_state = self.event_pump.keyboard_state();
        for (k, scancode) in self.scancodes.iter().enumerate() {
            self.keyboard[k] = scancode.map_or(false, |s| keyboard_state.is_scancode_pressed(s));
        }

        self.present()?;
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
