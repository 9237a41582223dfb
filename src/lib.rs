//! Cycle-accurate software emulator for the RP2040 PIO state machine.
//!
//! Given an assembled PIO program (16-bit opcodes, produced by an external
//! assembler such as the `pio` crate), a configuration, and an optional
//! initial state, [`emulate`] returns a lazy sequence of `(State, State)`
//! pairs (the state immediately before and immediately after each executed
//! clock cycle). Intended for firmware authors unit-testing PIO programs off
//! a physical RP2040 by inspecting pin waveforms, register values, and FIFO
//! effects.
//!
//! ```
//! use rp2040_pio_emulator::{emulate, EmulatorConfig};
//!
//! // set pins, 1 ; jmp 0
//! let opcodes = [0xE001u16, 0x0000u16];
//! let run = emulate(
//!     &opcodes,
//!     EmulatorConfig::default(),
//!     |_opcode, state| state.clock >= 4,
//!     None,
//!     None,
//! )
//! .expect("valid configuration");
//!
//! for (before, after) in run {
//!     assert_eq!(after.clock, before.clock + 1);
//! }
//! ```

mod builder;
mod conditions;
mod decoder;
mod emulate;
mod error;
mod instruction;
mod primitive_ops;
mod shift_register;
mod state;
mod step;

pub use emulate::{emulate, EmulatorConfig, InputSource, PioEmulatorBuilder};
pub use error::EmulatorError;
pub use instruction::Instruction;
pub use shift_register::ShiftRegister;
pub use state::{State, FIFO_CAPACITY};

pub use emulate::Emulation;
