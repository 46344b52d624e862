use thiserror::Error;

/// Every condition that halts a machine. None of them are recoverable, the
/// machine stays halted until it is dropped.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("program counter below the program area")]
    PcUnderflow,
    #[error("program counter past the end of memory")]
    PcOverflow,
    #[error("call stack overflow")]
    StackOverflow,
    #[error("return with an empty call stack")]
    StackUnderflow,
    #[error("jump to itself (infinite loop)")]
    InfiniteLoop,
    #[error("illegal instruction")]
    IllegalInstruction,
    #[error("font glyph out of range")]
    IllegalDigit,
    #[error("index register access past the end of memory")]
    IndexOverflow,
    #[error("key out of range")]
    BadKey,
}

impl Fault {
    /// Short upper-case tag, the form the dump prints.
    pub fn tag(&self) -> &'static str {
        match self {
            Fault::PcUnderflow => "PC_UNDERFLOW",
            Fault::PcOverflow => "PC_OVERFLOW",
            Fault::StackOverflow => "STACK_OVERFLOW",
            Fault::StackUnderflow => "STACK_UNDERFLOW",
            Fault::InfiniteLoop => "INFINITE_LOOP",
            Fault::IllegalInstruction => "ILLEGAL_INSTRUCTION",
            Fault::IllegalDigit => "ILLEGAL_DIGIT",
            Fault::IndexOverflow => "INDEX_OVERFLOW",
            Fault::BadKey => "BAD_KEY",
        }
    }

    /// Faults raised before the fetch leave the program counter where it was
    /// and have no instruction to show.
    pub fn is_fetch_fault(&self) -> bool {
        matches!(self, Fault::PcUnderflow | Fault::PcOverflow)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("program is {size} bytes, at most {max} fit above the interpreter area")]
    TooLarge { size: usize, max: usize },
}

/// Failures of a front end (terminal or window), as opposed to faults of
/// the machine it hosts.
#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("terminal i/o failed")]
    Io(#[from] std::io::Error),
    #[error("sdl: {0}")]
    Sdl(String),
}
