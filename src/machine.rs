// Implementation of Chip8 based on:
// - RCA COSMAC VIP CDP18S711 Instruction Manual
// - https://github.com/mattmikolay/chip-8/wiki/CHIP%E2%80%908-Instruction-Set
// - http://devernay.free.fr/hacks/chip8/C8TECH10.HTM

use std::fmt;

use crate::error::{Fault, LoadError};
use crate::host::{Host, KEY_COUNT};

pub const MEMORY_SIZE: usize = 0x1000;
pub const PROGRAM_START: u16 = 0x200;
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const STACK_SIZE: usize = 16;
pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;
pub const GLYPH_SIZE: u16 = 5;

const FLAG: usize = 0xf;

pub const FONT: [u8; 0x10 * GLYPH_SIZE as usize] = [
    0xf0, 0x90, 0x90, 0x90, 0xf0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xf0, 0x10, 0xf0, 0x80, 0xf0, // 2
    0xf0, 0x10, 0xf0, 0x10, 0xf0, // 3
    0x90, 0x90, 0xf0, 0x10, 0x10, // 4
    0xf0, 0x80, 0xf0, 0x10, 0xf0, // 5
    0xf0, 0x80, 0xf0, 0x90, 0xf0, // 6
    0xf0, 0x10, 0x20, 0x40, 0x40, // 7
    0xf0, 0x90, 0xf0, 0x90, 0xf0, // 8
    0xf0, 0x90, 0xf0, 0x10, 0xf0, // 9
    0xf0, 0x90, 0xf0, 0x90, 0x90, // A
    0xe0, 0x90, 0xe0, 0x90, 0xe0, // B
    0xf0, 0x80, 0x80, 0x80, 0xf0, // C
    0xe0, 0x90, 0x90, 0x90, 0xe0, // D
    0xf0, 0x80, 0xf0, 0x80, 0xf0, // E
    0xf0, 0x80, 0xf0, 0x80, 0x80, // F
];

/// Instruction variants that differ between interpreter lineages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    /// `8xy6`/`8xyE` shift `V[y]` into `V[x]` (COSMAC) instead of shifting
    /// `V[x]` in place (S-CHIP).
    pub shift_reads_vy: bool,
    /// `Fx55`/`Fx65` leave `I` pointing past the last byte touched.
    pub load_store_advances_index: bool,
}

impl Default for Quirks {
    fn default() -> Self {
        Self {
            shift_reads_vy: true,
            load_store_advances_index: true,
        }
    }
}

impl Quirks {
    pub fn s_chip() -> Self {
        Self {
            shift_reads_vy: false,
            load_store_advances_index: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Halted(Fault),
}

pub struct Machine {
    pc: u16,
    memory: [u8; MEMORY_SIZE],
    stack: [u16; STACK_SIZE],
    sp: usize,
    v: [u8; 16],
    i: u16,
    display: [[bool; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
    status: Status,

    quirks: Quirks,
    get_random: fn() -> u8,
}

impl Machine {
    pub fn new(get_random: fn() -> u8) -> Self {
        Self::with_quirks(Quirks::default(), get_random)
    }

    pub fn with_quirks(quirks: Quirks, get_random: fn() -> u8) -> Self {
        let mut memory = [0x00; MEMORY_SIZE];
        memory[..FONT.len()].copy_from_slice(&FONT);

        Self {
            pc: PROGRAM_START,
            memory,
            stack: [0x0000; STACK_SIZE],
            sp: 0,
            v: [0x00; 16],
            i: 0x0000,
            display: [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            status: Status::Running,

            quirks,
            get_random,
        }
    }

    pub fn from_rom(rom: &[u8], get_random: fn() -> u8) -> Result<Self, LoadError> {
        let mut machine = Self::new(get_random);
        machine.load(rom)?;
        Ok(machine)
    }

    /// Copy a program verbatim into memory at `PROGRAM_START`.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        if rom.len() > MAX_PROGRAM_SIZE {
            return Err(LoadError::TooLarge {
                size: rom.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        let start = PROGRAM_START as usize;
        self.memory[start..start + rom.len()].copy_from_slice(rom);
        Ok(())
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.v
    }

    pub fn sp(&self) -> usize {
        self.sp
    }

    /// Return addresses currently on the stack, oldest first.
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp]
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    pub fn get_display_spot(&self, x: usize, y: usize) -> bool {
        x < DISPLAY_WIDTH && y < DISPLAY_HEIGHT && self.display[y][x]
    }

    /// Run one fetch/decode/execute cycle. A fault halts the machine for
    /// good and is returned to the caller; the program counter is left on
    /// the instruction that raised it.
    ///
    /// # Panics
    ///
    /// If the machine has already halted.
    pub fn step(&mut self, host: &mut impl Host) -> Result<(), Fault> {
        assert!(
            self.status == Status::Running,
            "step called on a halted machine"
        );

        let result = match self.fetch() {
            Ok(ir) => self.execute(ir, host).map_err(|fault| {
                self.pc -= 2;
                fault
            }),
            Err(fault) => Err(fault),
        };
        if let Err(fault) = result {
            self.status = Status::Halted(fault);
        }
        result
    }

    fn fetch(&mut self) -> Result<u16, Fault> {
        if self.pc < PROGRAM_START {
            return Err(Fault::PcUnderflow);
        }
        if self.pc as usize >= MEMORY_SIZE - 1 {
            return Err(Fault::PcOverflow);
        }

        let pc = self.pc as usize;
        let ir = u16::from_be_bytes([self.memory[pc], self.memory[pc + 1]]);
        self.pc += 2;
        Ok(ir)
    }

    // Every check that can fail runs before the instruction mutates anything.
    fn execute(&mut self, ir: u16, host: &mut impl Host) -> Result<(), Fault> {
        let x: usize = ((ir & 0x0f00) >> 8) as usize;
        let y: usize = ((ir & 0x00f0) >> 4) as usize;
        let k: u8 = (ir & 0x00ff) as u8;
        let addr: u16 = ir & 0x0fff;
        let n: u8 = (ir & 0x000f) as u8;

        match ir >> 12 {
            0x0 => match addr {
                0x0e0 => {
                    self.display = [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
                    host.clear();
                }
                0x0ee => {
                    if self.sp == 0 {
                        return Err(Fault::StackUnderflow);
                    }
                    self.sp -= 1;
                    self.pc = self.stack[self.sp];
                }
                _ => return Err(Fault::IllegalInstruction),
            },
            0x1 => {
                // only the tightest loop is caught, a jump onto itself
                if addr == self.pc - 2 {
                    return Err(Fault::InfiniteLoop);
                }
                self.pc = addr;
            }
            0x2 => {
                if self.sp == STACK_SIZE {
                    return Err(Fault::StackOverflow);
                }
                self.stack[self.sp] = self.pc;
                self.sp += 1;
                self.pc = addr;
            }
            0x3 => {
                if self.v[x] == k {
                    self.skip();
                }
            }
            0x4 => {
                if self.v[x] != k {
                    self.skip();
                }
            }
            0x5 if n == 0x0 => {
                if self.v[x] == self.v[y] {
                    self.skip();
                }
            }
            0x6 => {
                self.v[x] = k;
            }
            0x7 => {
                // no carry flag here, unlike 8xy4
                self.v[x] = self.v[x].wrapping_add(k);
            }
            0x8 => self.alu(n, x, y)?,
            0x9 if n == 0x0 => {
                if self.v[x] != self.v[y] {
                    self.skip();
                }
            }
            0xa => {
                self.i = addr;
            }
            0xb => {
                self.pc = addr + self.v[0] as u16;
            }
            0xc => {
                self.v[x] = (self.get_random)() & k;
            }
            0xd => self.draw(x, y, n, host)?,
            0xe => {
                let key = self.v[x];
                if k != 0x9e && k != 0xa1 {
                    return Err(Fault::IllegalInstruction);
                }
                if key as usize >= KEY_COUNT {
                    return Err(Fault::BadKey);
                }
                if host.check_key(key) == (k == 0x9e) {
                    self.skip();
                }
            }
            0xf => self.misc(k, x, host)?,
            _ => return Err(Fault::IllegalInstruction),
        }
        Ok(())
    }

    fn skip(&mut self) {
        self.pc += 2;
    }

    fn alu(&mut self, op: u8, x: usize, y: usize) -> Result<(), Fault> {
        match op {
            0x0 => {
                self.v[x] = self.v[y];
            }
            0x1 => {
                self.v[x] |= self.v[y];
                self.v[FLAG] = 0;
            }
            0x2 => {
                self.v[x] &= self.v[y];
                self.v[FLAG] = 0;
            }
            0x3 => {
                self.v[x] ^= self.v[y];
                self.v[FLAG] = 0;
            }
            0x4 => {
                let (v, o) = self.v[x].overflowing_add(self.v[y]);
                self.v[x] = v;
                self.v[FLAG] = o as u8;
            }
            0x5 => {
                let (v, o) = self.v[x].overflowing_sub(self.v[y]);
                self.v[x] = v;
                self.v[FLAG] = !o as u8;
            }
            0x6 => {
                let src = self.shift_source(x, y);
                self.v[x] = src >> 1;
                self.v[FLAG] = src & 0x1;
            }
            0x7 => {
                let (v, o) = self.v[y].overflowing_sub(self.v[x]);
                self.v[x] = v;
                self.v[FLAG] = !o as u8;
            }
            0xe => {
                let src = self.shift_source(x, y);
                self.v[x] = src << 1;
                self.v[FLAG] = (src & 0x80) >> 7;
            }
            _ => return Err(Fault::IllegalInstruction),
        }
        Ok(())
    }

    fn shift_source(&self, x: usize, y: usize) -> u8 {
        if self.quirks.shift_reads_vy {
            self.v[y]
        } else {
            self.v[x]
        }
    }

    fn draw(&mut self, x: usize, y: usize, n: u8, host: &mut impl Host) -> Result<(), Fault> {
        // the origin is read with V[F] already cleared
        let origin = |r: usize| if r == FLAG { 0 } else { self.v[r] as usize };

        // the origin wraps around the screen, the sprite itself is clipped
        let x0 = origin(x) % DISPLAY_WIDTH;
        let y0 = origin(y) % DISPLAY_HEIGHT;

        // rows clipped at the bottom edge are never read from memory
        let start = self.i as usize;
        let rows = (n as usize).min(DISPLAY_HEIGHT - y0);
        if rows > 0 && start + rows > MEMORY_SIZE {
            return Err(Fault::IndexOverflow);
        }

        self.v[FLAG] = 0;

        for row in 0..rows {
            let py = y0 + row;
            let bits = self.memory[start + row];
            for col in 0..8 {
                let px = x0 + col;
                if px >= DISPLAY_WIDTH {
                    break;
                }
                if bits & (0x80 >> col) != 0 {
                    let set = !self.display[py][px];
                    self.display[py][px] = set;
                    host.plot(px as u8, py as u8, set);
                    if !set {
                        self.v[FLAG] = 1;
                    }
                }
            }
        }
        Ok(())
    }

    fn misc(&mut self, op: u8, x: usize, host: &mut impl Host) -> Result<(), Fault> {
        match op {
            0x07 => {
                self.v[x] = host.get_delay_timer();
            }
            0x0a => {
                let key = host.await_key();
                if key as usize >= KEY_COUNT {
                    return Err(Fault::BadKey);
                }
                self.v[x] = key;
            }
            0x15 => {
                host.set_delay_timer(self.v[x]);
            }
            0x18 => {
                host.set_sound_timer(self.v[x]);
            }
            0x1e => {
                self.i = self.i.wrapping_add(self.v[x] as u16);
            }
            0x29 => {
                if self.v[x] as usize >= KEY_COUNT {
                    return Err(Fault::IllegalDigit);
                }
                self.i = self.v[x] as u16 * GLYPH_SIZE;
            }
            0x33 => {
                let i = self.i as usize;
                if i + 2 >= MEMORY_SIZE {
                    return Err(Fault::IndexOverflow);
                }
                self.memory[i] = self.v[x] / 100;
                self.memory[i + 1] = (self.v[x] / 10) % 10;
                self.memory[i + 2] = self.v[x] % 10;
            }
            0x55 => {
                let i = self.check_window(x)?;
                self.memory[i..=i + x].copy_from_slice(&self.v[..=x]);
                self.advance_index(x);
            }
            0x65 => {
                let i = self.check_window(x)?;
                self.v[..=x].copy_from_slice(&self.memory[i..=i + x]);
                self.advance_index(x);
            }
            _ => return Err(Fault::IllegalInstruction),
        }
        Ok(())
    }

    // The whole register window has to fit before a single byte moves.
    fn check_window(&self, x: usize) -> Result<usize, Fault> {
        let i = self.i as usize;
        if i + x >= MEMORY_SIZE {
            return Err(Fault::IndexOverflow);
        }
        Ok(i)
    }

    fn advance_index(&mut self, x: usize) {
        if self.quirks.load_store_advances_index {
            self.i += x as u16 + 1;
        }
    }

    /// Snapshot of the machine for a human to read after a halt.
    pub fn dump(&self) -> Dump {
        let fault = match self.status {
            Status::Running => None,
            Status::Halted(fault) => Some(fault),
        };
        let pc = self.pc as usize;
        let instruction = match fault {
            Some(f) if f.is_fetch_fault() => None,
            _ if pc + 1 < MEMORY_SIZE => {
                Some(u16::from_be_bytes([self.memory[pc], self.memory[pc + 1]]))
            }
            _ => None,
        };

        Dump {
            fault,
            pc: self.pc,
            index: self.i,
            sp: self.sp,
            instruction,
            stack: self.stack().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dump {
    pub fault: Option<Fault>,
    pub pc: u16,
    pub index: u16,
    pub sp: usize,
    pub instruction: Option<u16>,
    pub stack: Vec<u16>,
}

impl fmt::Display for Dump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(fault) = self.fault {
            writeln!(f, "Runtime error: {} ({})", fault.tag(), fault)?;
        }
        write!(f, "PC = {:04x}, I = {:04x}, SP = {:x}", self.pc, self.index, self.sp)?;
        if let Some(ir) = self.instruction {
            write!(f, "\nInstruction: {:04x}", ir)?;
        }
        for (n, addr) in self.stack.iter().enumerate() {
            write!(f, "\n\tSTACK[{}]: {:04x}", n, addr)?;
        }
        Ok(())
    }
}
