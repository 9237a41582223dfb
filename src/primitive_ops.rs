//! Pure read/write operations against [`State`] fields.
//!
//! Every write helper returns a new `State` built with struct-update syntax;
//! none of them mutate their argument.

use crate::shift_register::ShiftRegister;
use crate::state::State;

/// Reads the contents of the Input Shift Register.
pub fn read_from_isr(state: &State) -> u32 {
    state.input_shift_register.contents()
}

/// Reads the contents of the Output Shift Register.
pub fn read_from_osr(state: &State) -> u32 {
    state.output_shift_register.contents()
}

/// Reads the current GPIO pin values.
pub fn read_from_pins(state: &State) -> u32 {
    state.pin_values
}

/// Reads the X scratch register.
pub fn read_from_x(state: &State) -> u32 {
    state.x_register
}

/// Reads the Y scratch register.
pub fn read_from_y(state: &State) -> u32 {
    state.y_register
}

/// Shifts `bit_count` bits, sourced from `data`, into the Input Shift Register
/// using `shift` (either [`ShiftRegister::shift_left`] or
/// [`ShiftRegister::shift_right`] depending on the configured ISR direction).
pub fn shift_into_isr(
    state: &State,
    data: u32,
    bit_count: u8,
    shift: impl Fn(&ShiftRegister, u8, u32) -> (ShiftRegister, u32),
) -> State {
    let (new_isr, _) = shift(&state.input_shift_register, bit_count, data);

    State {
        input_shift_register: new_isr,
        ..state.clone()
    }
}

/// Shifts `bit_count` bits out of the Output Shift Register using `shift`,
/// returning the updated state and the bits that were shifted out.
pub fn shift_from_osr(
    state: &State,
    bit_count: u8,
    shift: impl Fn(&ShiftRegister, u8, u32) -> (ShiftRegister, u32),
) -> (State, u32) {
    let (new_osr, shift_result) = shift(&state.output_shift_register, bit_count, 0);

    (
        State {
            output_shift_register: new_osr,
            ..state.clone()
        },
        shift_result,
    )
}

/// Copies `value` into the Input Shift Register, resetting its counter to 0.
pub fn write_to_isr(state: &State, value: u32) -> State {
    write_to_isr_with_count(state, value, 0)
}

/// Copies `value` into the Input Shift Register with an explicit counter.
///
/// `OUT ISR` is the one instruction that leaves the ISR counter at the
/// shifted bit count rather than resetting it to zero; every other write
/// to the ISR uses [`write_to_isr`], which delegates here with `count: 0`.
pub fn write_to_isr_with_count(state: &State, value: u32, count: u8) -> State {
    State {
        input_shift_register: ShiftRegister::new(value, count),
        ..state.clone()
    }
}

/// Copies `value` into the Output Shift Register, resetting its counter to 0.
pub fn write_to_osr(state: &State, value: u32) -> State {
    State {
        output_shift_register: ShiftRegister::new(value, 0),
        ..state.clone()
    }
}

/// Copies `value` into the pin direction register.
pub fn write_to_pin_directions(state: &State, value: u32) -> State {
    State {
        pin_directions: value,
        ..state.clone()
    }
}

/// Copies `value` into the pin value register.
pub fn write_to_pins(state: &State, value: u32) -> State {
    State {
        pin_values: value,
        ..state.clone()
    }
}

/// Copies `value`, masked to 5 bits, into the program counter.
pub fn write_to_program_counter(state: &State, value: u32) -> State {
    State {
        program_counter: (value & 0x1F) as u8,
        ..state.clone()
    }
}

/// Copies `value` into the X scratch register.
pub fn write_to_x(state: &State, value: u32) -> State {
    State {
        x_register: value,
        ..state.clone()
    }
}

/// Copies `value` into the Y scratch register.
pub fn write_to_y(state: &State, value: u32) -> State {
    State {
        y_register: value,
        ..state.clone()
    }
}

/// Discards `value`, returning the state unchanged. Used for `NULL` writes.
pub fn write_to_null(state: &State, _value: u32) -> State {
    state.clone()
}
