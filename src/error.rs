//! Structured errors returned by [`crate::emulate`] and [`crate::PioEmulatorBuilder`].

/// Configuration errors detected before any cycle is produced.
///
/// Modeled after `camrbuss-rp-hal`'s `pio::BuildError`: a small, closed enum of
/// the ways a build-time configuration can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EmulatorError {
    /// `pull_threshold` was outside `1..=32`.
    #[error("invalid pull_threshold: {0} (must be in 1..=32)")]
    InvalidPullThreshold(u8),
    /// `push_threshold` was outside `1..=32`.
    #[error("invalid push_threshold: {0} (must be in 1..=32)")]
    InvalidPushThreshold(u8),
    /// `opcodes` was empty; there is no program to execute.
    #[error("opcodes must not be empty")]
    EmptyProgram,
    /// `side_set_count` was outside `0..=5`.
    #[error("invalid side_set_count: {0} (must be in 0..=5)")]
    InvalidSideSetCount(u8),
    /// `wrap_target` or `wrap_top` fell outside the program's address range.
    #[error("wrap range [{wrap_target}, {wrap_top}] is outside the program (len {program_len})")]
    InvalidWrapRange {
        wrap_target: u8,
        wrap_top: u8,
        program_len: usize,
    },
}
