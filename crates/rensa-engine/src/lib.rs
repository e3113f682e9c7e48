pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Reason a player command was rejected.
///
/// A rejected command never changes the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum CommandError {
    #[display("command rejected while session is {state}")]
    NotAccepting { state: SessionState },
    #[display("invalid move direction ({dx}, {dy})")]
    InvalidDirection { dx: i32, dy: i32 },
    #[display("invalid rotation direction {direction}")]
    InvalidRotation { direction: i32 },
    #[display("pair blocked")]
    Blocked,
}

/// Invalid configuration supplied at a session boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("palette size must be between 1 and {max}, got {size}")]
    PaletteSize { size: u8, max: usize },
    #[display("sessions support {min} to {max} colors, got {size}")]
    UnsupportedPaletteSize { size: u8, min: u8, max: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PaletteChangeError {
    #[display("{_0}")]
    Config(ConfigError),
    #[display("{_0}")]
    Command(CommandError),
}
