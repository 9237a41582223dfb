//! Maps a decoded [`Instruction`] to an executable [`Emulation`].
//!
//! Grounded on `original_source/pioemu/instruction_decoder.py`'s
//! `create_emulation`/`_decode_*` methods: each instruction family resolves a
//! condition, an effect, and a program-counter-advance policy from small
//! lookup tables over [`crate::conditions`] and [`crate::primitive_ops`].

use crate::conditions;
use crate::instruction::{Common, Condition, Effect, Emulation, Instruction, PcAdvance};
use crate::primitive_ops as ops;
use crate::shift_register::ShiftRegister;
use crate::state::State;

/// Which direction an ISR/OSR shift operation moves bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftDirection {
    Left,
    Right,
}

impl ShiftDirection {
    fn apply(self, register: &ShiftRegister, bit_count: u8, data_in: u32) -> (ShiftRegister, u32) {
        match self {
            ShiftDirection::Left => register.shift_left(bit_count, data_in),
            ShiftDirection::Right => register.shift_right(bit_count, data_in),
        }
    }
}

/// Builds an [`Emulation`] from a decoded [`Instruction`], resolving the
/// configured shift directions and `jmp_pin`.
///
/// Returns `None` for any reserved source/destination/operation slot the
/// decoder did not already reject (MOV/SET reserved fields, JMP conditions
/// with no entry, though all eight JMP condition indices are valid).
pub fn build(
    instruction: Instruction,
    shift_isr: ShiftDirection,
    shift_osr: ShiftDirection,
    jmp_pin: u8,
) -> Option<Emulation> {
    match instruction {
        Instruction::Jmp {
            common,
            target_address,
            condition,
        } => build_jmp(common, target_address, condition, jmp_pin, instruction),
        Instruction::Wait {
            common,
            index,
            polarity,
            ..
        } => build_wait(common, index, polarity, instruction),
        Instruction::In {
            common,
            source,
            bit_count,
        } => build_in(common, source, bit_count, shift_isr, instruction),
        Instruction::Out {
            common,
            destination,
            bit_count,
        } => build_out(common, destination, bit_count, shift_osr, instruction),
        Instruction::Push {
            common,
            if_full,
            block,
        } => build_push(common, if_full, block, instruction),
        Instruction::Pull {
            common,
            if_empty,
            block,
        } => build_pull(common, if_empty, block, instruction),
        Instruction::Mov {
            common,
            destination,
            operation,
            source,
        } => build_mov(common, destination, operation, source, instruction),
        Instruction::Set {
            common,
            destination,
            data,
        } => build_set(common, destination, data, instruction),
    }
}

fn always_condition() -> Condition {
    Box::new(conditions::always)
}

fn build_jmp(
    _common: Common,
    target_address: u8,
    condition_index: u8,
    jmp_pin: u8,
    instruction: Instruction,
) -> Option<Emulation> {
    let condition: Condition = match condition_index {
        0 => Box::new(conditions::always),
        1 => Box::new(conditions::x_register_equals_zero),
        2 => Box::new(conditions::x_register_not_equal_to_zero),
        3 => Box::new(conditions::y_register_equals_zero),
        4 => Box::new(conditions::y_register_not_equal_to_zero),
        5 => Box::new(conditions::x_register_not_equal_to_y_register),
        6 => Box::new(move |state: &State| conditions::gpio_high(jmp_pin, state)),
        7 => Box::new(|state: &State| !conditions::output_shift_register_empty(state)),
        _ => return None,
    };

    let effect: Effect = Box::new(move |state: &State| {
        Some(ops::write_to_program_counter(state, target_address as u32))
    });

    Some(Emulation {
        condition,
        effect,
        pc_policy: PcAdvance::WhenConditionNotMet,
        instruction,
    })
}

fn build_wait(_common: Common, index: u8, polarity: bool, instruction: Instruction) -> Option<Emulation> {
    let predicate = move |state: &State| {
        if polarity {
            conditions::gpio_high(index, state)
        } else {
            conditions::gpio_low(index, state)
        }
    };

    let effect: Effect = Box::new(move |state: &State| {
        if predicate(state) {
            Some(state.clone())
        } else {
            None
        }
    });

    Some(Emulation {
        condition: always_condition(),
        effect,
        pc_policy: PcAdvance::Always,
        instruction,
    })
}

fn build_in(
    _common: Common,
    source: u8,
    bit_count: u8,
    shift_isr: ShiftDirection,
    instruction: Instruction,
) -> Option<Emulation> {
    let read: fn(&State) -> u32 = match source {
        0 => ops::read_from_pins,
        1 => ops::read_from_x,
        2 => ops::read_from_y,
        3 => |_state: &State| 0, // NULL
        6 => ops::read_from_isr,
        7 => ops::read_from_osr,
        _ => return None, // 4, 5 reserved; already rejected by the decoder.
    };

    let effect: Effect = Box::new(move |state: &State| {
        let data = read(state);
        Some(ops::shift_into_isr(state, data, bit_count, |reg, n, d| {
            shift_isr.apply(reg, n, d)
        }))
    });

    Some(Emulation {
        condition: always_condition(),
        effect,
        pc_policy: PcAdvance::Always,
        instruction,
    })
}

fn build_out(
    _common: Common,
    destination: u8,
    bit_count: u8,
    shift_osr: ShiftDirection,
    instruction: Instruction,
) -> Option<Emulation> {
    if destination == 7 {
        return None; // reserved
    }

    let pc_policy = if destination == 5 {
        PcAdvance::Never
    } else {
        PcAdvance::Always
    };

    let effect: Effect = Box::new(move |state: &State| {
        let (shifted_state, shift_result) =
            ops::shift_from_osr(state, bit_count, |reg, n, d| shift_osr.apply(reg, n, d));

        let result = match destination {
            0 => ops::write_to_pins(&shifted_state, shift_result),
            1 => ops::write_to_x(&shifted_state, shift_result),
            2 => ops::write_to_y(&shifted_state, shift_result),
            3 => ops::write_to_null(&shifted_state, shift_result),
            4 => ops::write_to_pin_directions(&shifted_state, shift_result),
            5 => ops::write_to_program_counter(&shifted_state, shift_result),
            // OUT ISR is the one write that sets the ISR counter to bit_count
            // rather than resetting it to zero; a documented silicon quirk.
            6 => ops::write_to_isr_with_count(&shifted_state, shift_result, bit_count),
            _ => unreachable!("destination 7 rejected above"),
        };

        Some(result)
    });

    Some(Emulation {
        condition: always_condition(),
        effect,
        pc_policy,
        instruction,
    })
}

fn build_push(_common: Common, if_full: bool, block: bool, instruction: Instruction) -> Option<Emulation> {
    let condition: Condition = if if_full {
        Box::new(conditions::input_shift_register_full)
    } else {
        Box::new(conditions::always)
    };

    let effect: Effect = Box::new(move |state: &State| {
        if conditions::receive_fifo_full(state) {
            if block {
                return None; // stall
            }
            return Some(State {
                input_shift_register: ShiftRegister::new(0, 0),
                ..state.clone()
            });
        }

        let mut receive_fifo = state.receive_fifo.clone();
        receive_fifo.push_back(state.input_shift_register.contents());

        Some(State {
            receive_fifo,
            input_shift_register: ShiftRegister::new(0, 0),
            ..state.clone()
        })
    });

    Some(Emulation {
        condition,
        effect,
        pc_policy: PcAdvance::Always,
        instruction,
    })
}

fn build_pull(_common: Common, if_empty: bool, block: bool, instruction: Instruction) -> Option<Emulation> {
    let condition: Condition = if if_empty {
        Box::new(conditions::output_shift_register_empty)
    } else {
        Box::new(conditions::always)
    };

    let effect: Effect = Box::new(move |state: &State| {
        if conditions::transmit_fifo_empty(state) {
            if block {
                return None; // stall
            }
            return Some(State {
                output_shift_register: ShiftRegister::new(state.x_register, 0),
                ..state.clone()
            });
        }

        let mut transmit_fifo = state.transmit_fifo.clone();
        let value = transmit_fifo
            .pop_front()
            .expect("transmit_fifo_empty already checked");

        Some(State {
            transmit_fifo,
            output_shift_register: ShiftRegister::new(value, 0),
            ..state.clone()
        })
    });

    Some(Emulation {
        condition,
        effect,
        pc_policy: PcAdvance::Always,
        instruction,
    })
}

fn build_mov(
    _common: Common,
    destination: u8,
    operation: u8,
    source: u8,
    instruction: Instruction,
) -> Option<Emulation> {
    let read: fn(&State) -> u32 = match source {
        0 => ops::read_from_pins,
        1 => ops::read_from_x,
        2 => ops::read_from_y,
        3 => |_state: &State| 0, // NULL
        6 => ops::read_from_isr,
        7 => ops::read_from_osr,
        _ => return None, // 4, 5 reserved.
    };

    // Bit-reverse (op 2) and the reserved op 3 have no emulation here; only
    // plain copy and bitwise invert are implemented.
    if operation > 1 {
        return None;
    }
    let invert = operation == 1;

    if destination == 3 {
        return None; // reserved
    }

    let pc_policy = if destination == 5 {
        PcAdvance::Never
    } else {
        PcAdvance::Always
    };

    let effect: Effect = Box::new(move |state: &State| {
        let raw = read(state);
        let value = if invert { !raw } else { raw };

        let result = match destination {
            0 => ops::write_to_pins(state, value),
            1 => ops::write_to_x(state, value),
            2 => ops::write_to_y(state, value),
            4 => ops::write_to_pin_directions(state, value),
            5 => ops::write_to_program_counter(state, value),
            6 => ops::write_to_isr(state, value),
            7 => ops::write_to_osr(state, value),
            _ => unreachable!("destination 3 rejected above"),
        };

        Some(result)
    });

    Some(Emulation {
        condition: always_condition(),
        effect,
        pc_policy,
        instruction,
    })
}

fn build_set(_common: Common, destination: u8, data: u8, instruction: Instruction) -> Option<Emulation> {
    let value = data as u32;

    let effect: Effect = match destination {
        0 => Box::new(move |state: &State| Some(ops::write_to_pins(state, value))),
        1 => Box::new(move |state: &State| Some(ops::write_to_x(state, value))),
        2 => Box::new(move |state: &State| Some(ops::write_to_y(state, value))),
        4 => Box::new(move |state: &State| Some(ops::write_to_pin_directions(state, value))),
        _ => return None, // 3, 5, 6, 7 reserved.
    };

    Some(Emulation {
        condition: always_condition(),
        effect,
        pc_policy: PcAdvance::Always,
        instruction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder;
    use std::collections::VecDeque;

    fn decode_and_build(opcode: u16, side_set_count: u8) -> Emulation {
        let instruction = decoder::decode(opcode, side_set_count).expect("decodes");
        build(instruction, ShiftDirection::Right, ShiftDirection::Right, 0).expect("builds")
    }

    #[test]
    fn jmp_always_writes_target_and_never_advances_via_policy() {
        let emulation = decode_and_build(0x0000, 0); // jmp 0 always
        assert_eq!(emulation.pc_policy, PcAdvance::WhenConditionNotMet);
        assert!((emulation.condition)(&State::default()));
    }

    #[test]
    fn pull_blocking_stalls_on_empty_fifo() {
        let emulation = decode_and_build(0x80A0, 0);
        let state = State::default();
        assert!((emulation.effect)(&state).is_none());
    }

    #[test]
    fn pull_nonblocking_copies_x_register_when_fifo_empty() {
        let emulation = decode_and_build(0x8080, 0);
        let state = State {
            x_register: 0x2222_2222,
            ..State::default()
        };
        let result = (emulation.effect)(&state).expect("non-blocking pull never stalls");
        assert_eq!(result.output_shift_register.contents(), 0x2222_2222);
    }

    #[test]
    fn push_blocking_stalls_on_full_fifo() {
        let emulation = decode_and_build(0x8020, 0);
        let mut state = State::default();
        state.receive_fifo = VecDeque::from(vec![1, 2, 3, 4]);
        assert!((emulation.effect)(&state).is_none());
    }

    #[test]
    fn out_to_isr_sets_counter_to_bit_count() {
        // OUT ISR, 8
        let opcode = (3u16 << 13) | (6 << 5) | 8;
        let emulation = decode_and_build(opcode, 0);
        let state = State {
            output_shift_register: ShiftRegister::new(0xFF, 0),
            ..State::default()
        };
        let result = (emulation.effect)(&state).expect("out never stalls");
        assert_eq!(result.input_shift_register.counter(), 8);
    }

    #[test]
    fn out_to_program_counter_never_advances_via_policy() {
        // OUT PC, 5
        let opcode = (3u16 << 13) | (5 << 5) | 5;
        let emulation = decode_and_build(opcode, 0);
        assert_eq!(emulation.pc_policy, PcAdvance::Never);
    }

    #[test]
    fn mov_reserved_operation_is_undecodable() {
        let instruction = Instruction::Mov {
            common: Common {
                opcode: 0,
                delay_cycles: 0,
                side_set_value: 0,
            },
            destination: 0,
            operation: 2,
            source: 0,
        };

        assert!(build(instruction, ShiftDirection::Right, ShiftDirection::Right, 0).is_none());
    }

    #[test]
    fn mov_to_pindirs_writes_the_direction_mask() {
        // MOV PINDIRS, X: family=5, destination=4 (PINDIRS), operation=0, source=1 (X)
        let opcode = (5u16 << 13) | (4 << 5) | 1;
        let emulation = decode_and_build(opcode, 0);
        let state = State {
            x_register: 0b101,
            ..State::default()
        };
        let result = (emulation.effect)(&state).expect("mov never stalls");
        assert_eq!(result.pin_directions, 0b101);
    }
}
