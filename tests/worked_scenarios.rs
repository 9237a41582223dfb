//! End-to-end scenarios, one per spec.md §8 worked example.

use rp2040_pio_emulator::{emulate, EmulatorConfig, State};

#[test]
fn blink_style_clock_data() {
    // set pins, 1 ; jmp 0
    let opcodes = [0xE001u16, 0x0000u16];

    let run = emulate(
        &opcodes,
        EmulatorConfig::default(),
        |_, state| state.clock >= 4,
        None,
        None,
    )
    .expect("valid configuration");

    let mut pin_trace = Vec::new();
    let mut pc_trace = Vec::new();
    for (_, after) in run {
        pin_trace.push(after.pin_values);
        pc_trace.push(after.program_counter);
    }

    assert_eq!(pin_trace, vec![1, 1, 1, 1]);
    assert_eq!(pc_trace, vec![1, 0, 1, 0]);
}

#[test]
fn jmp_x_dec_post_decrement_loop() {
    // set x, 3 ; jmp x-- 1 ; set pins, 0
    let opcodes = [0xE023u16, 0x0041u16, 0xE000u16];

    let run = emulate(
        &opcodes,
        EmulatorConfig {
            wrap_target: 0,
            wrap_top: Some(2),
            ..Default::default()
        },
        |_, state| state.clock >= 5,
        None,
        None,
    )
    .expect("valid configuration");

    let mut x_trace = Vec::new();
    let mut final_pc = 0;
    for (_, after) in run {
        x_trace.push(after.x_register);
        final_pc = after.program_counter;
    }

    assert_eq!(x_trace, vec![3, 2, 1, 0, 0xFFFF_FFFF]);
    assert_eq!(final_pc, 2);
}

#[test]
fn output_shift_right() {
    // out pins, 8
    let opcodes = [0x6008u16];
    let initial_state = State {
        output_shift_register: rp2040_pio_emulator::ShiftRegister::new(0x1FF, 0),
        ..Default::default()
    };

    let run = emulate(
        &opcodes,
        EmulatorConfig::default(),
        |_, state| state.clock >= 1,
        None,
        Some(initial_state),
    )
    .expect("valid configuration");

    let (_, after) = run.into_iter().next().expect("one cycle");
    assert_eq!(after.pin_values, 0xFF);
    assert_eq!(
        after.output_shift_register,
        rp2040_pio_emulator::ShiftRegister::new(0x001, 8)
    );
}

#[test]
fn pull_blocking_with_empty_fifo_stalls() {
    // pull block ifempty
    let opcodes = [0x80A0u16];

    let run = emulate(
        &opcodes,
        EmulatorConfig::default(),
        |_, state| state.clock >= 3,
        None,
        None,
    )
    .expect("valid configuration");

    for (_, after) in run {
        assert_eq!(after.program_counter, 0);
    }
}

#[test]
fn side_set_overlay() {
    // nop side 7
    let opcodes = [0xBC42u16];

    let run = emulate(
        &opcodes,
        EmulatorConfig {
            side_set_base: 5,
            side_set_count: 3,
            ..Default::default()
        },
        |_, state| state.clock >= 1,
        None,
        None,
    )
    .expect("valid configuration");

    let (_, after) = run.into_iter().next().expect("one cycle");
    assert_eq!(after.pin_values, 0xE0);
}

#[test]
fn auto_push_to_full_fifo_stalls() {
    // in null, 32
    let opcodes = [0x4060u16];
    let mut initial_state = State::default();
    initial_state.receive_fifo = vec![1, 2, 3, 4].into();

    let run = emulate(
        &opcodes,
        EmulatorConfig {
            auto_push: true,
            push_threshold: 32,
            ..Default::default()
        },
        |_, state| state.clock >= 1,
        None,
        Some(initial_state),
    )
    .expect("valid configuration");

    let (_, after) = run.into_iter().next().expect("one cycle");
    assert_eq!(after.program_counter, 0);
    assert_eq!(after.receive_fifo.len(), 4);
}
