//! Public entry point: [`emulate`], the [`Emulation`] iterator, and the
//! ambient [`PioEmulatorBuilder`] config surface.

use crate::builder::ShiftDirection;
use crate::error::EmulatorError;
use crate::state::State;
use crate::step::{self, StepConfig, StepOutcome};

/// Where the emulator samples GPIO input from before each cycle.
///
/// The two closure shapes are named variants rather than a single `Fn` type
/// the emulator tries to disambiguate at runtime. There is no signature
/// inspection over closures, so the caller picks the shape explicitly.
pub enum InputSource<'a> {
    /// Samples the full [`State`] before each cycle.
    State(Box<dyn FnMut(&State) -> u32 + 'a>),
    /// Samples only the clock, the legacy pre-`State` signature.
    Clock(Box<dyn FnMut(u64) -> u32 + 'a>),
}

impl<'a> InputSource<'a> {
    /// Wraps a `(State) -> u32` closure.
    pub fn from_state(f: impl FnMut(&State) -> u32 + 'a) -> Self {
        InputSource::State(Box::new(f))
    }

    /// Wraps the legacy `(clock) -> u32` closure shape.
    pub fn from_clock(f: impl FnMut(u64) -> u32 + 'a) -> Self {
        InputSource::Clock(Box::new(f))
    }

    fn sample(&mut self, state: &State) -> u32 {
        match self {
            InputSource::State(f) => f(state),
            InputSource::Clock(f) => f(state.clock),
        }
    }
}

/// Configuration for one `emulate()` run.
///
/// `wrap_top` is `None` by default (the struct can't see `opcodes.len()` at
/// `Default::default()` time) and is resolved to `opcodes.len() - 1` inside
/// [`emulate`].
#[derive(Debug, Clone, Copy)]
pub struct EmulatorConfig {
    pub auto_pull: bool,
    pub auto_push: bool,
    pub pull_threshold: u8,
    pub push_threshold: u8,
    pub shift_isr_right: bool,
    pub shift_osr_right: bool,
    pub side_set_base: u8,
    pub side_set_count: u8,
    pub jmp_pin: u8,
    pub wrap_target: u8,
    pub wrap_top: Option<u8>,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            auto_pull: false,
            auto_push: false,
            pull_threshold: 32,
            push_threshold: 32,
            shift_isr_right: true,
            shift_osr_right: true,
            side_set_base: 0,
            side_set_count: 0,
            jmp_pin: 0,
            wrap_target: 0,
            wrap_top: None,
        }
    }
}

/// Validates `config` against `opcodes`, returning the resolved [`StepConfig`].
fn validate(opcodes: &[u16], config: &EmulatorConfig) -> Result<StepConfig, EmulatorError> {
    if opcodes.is_empty() {
        return Err(EmulatorError::EmptyProgram);
    }

    if config.pull_threshold < 1 || config.pull_threshold > 32 {
        return Err(EmulatorError::InvalidPullThreshold(config.pull_threshold));
    }

    if config.push_threshold < 1 || config.push_threshold > 32 {
        return Err(EmulatorError::InvalidPushThreshold(config.push_threshold));
    }

    if config.side_set_count > 5 {
        return Err(EmulatorError::InvalidSideSetCount(config.side_set_count));
    }

    let wrap_top = config.wrap_top.unwrap_or((opcodes.len() - 1) as u8);
    if wrap_top as usize >= opcodes.len() || config.wrap_target > wrap_top {
        return Err(EmulatorError::InvalidWrapRange {
            wrap_target: config.wrap_target,
            wrap_top,
            program_len: opcodes.len(),
        });
    }

    Ok(StepConfig {
        auto_pull: config.auto_pull,
        auto_push: config.auto_push,
        pull_threshold: config.pull_threshold,
        push_threshold: config.push_threshold,
        shift_isr: direction(config.shift_isr_right),
        shift_osr: direction(config.shift_osr_right),
        side_set_base: config.side_set_base,
        side_set_count: config.side_set_count,
        jmp_pin: config.jmp_pin,
        wrap_target: config.wrap_target,
        wrap_top,
    })
}

fn direction(shift_right: bool) -> ShiftDirection {
    if shift_right {
        ShiftDirection::Right
    } else {
        ShiftDirection::Left
    }
}

/// A lazily-driven run of the emulator: each call to [`Iterator::next`]
/// performs exactly one clock cycle.
///
/// Iteration ends (yields `None`) once `stop_when` is satisfied or the
/// opcode at the current program counter is undecodable. There is no
/// distinct error type for the latter: ending the sequence is the whole
/// contract.
pub struct Emulation<'prog, 'input, F>
where
    F: FnMut(u16, &State) -> bool,
{
    opcodes: &'prog [u16],
    config: StepConfig,
    stop_when: F,
    input_source: Option<InputSource<'input>>,
    current_state: State,
    finished: bool,
}

impl<'prog, 'input, F> Iterator for Emulation<'prog, 'input, F>
where
    F: FnMut(u16, &State) -> bool,
{
    type Item = (State, State);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let opcode_at_pc = self.opcodes[self.current_state.program_counter as usize];
        if (self.stop_when)(opcode_at_pc, &self.current_state) {
            self.finished = true;
            return None;
        }

        let input = self
            .input_source
            .as_mut()
            .map(|source| source.sample(&self.current_state));

        let before = self.current_state.clone();
        match step::step(self.opcodes, &self.current_state, input, &self.config) {
            StepOutcome::Advanced { new_state } => {
                self.current_state = new_state.clone();
                Some((before, new_state))
            }
            StepOutcome::Undecodable => {
                log::warn!(
                    "emulate: opcode {:#06x} at pc {} did not decode; sequence ending",
                    opcode_at_pc,
                    self.current_state.program_counter
                );
                self.finished = true;
                None
            }
        }
    }
}

/// Runs the emulator over `opcodes`, returning a lazy sequence of
/// (state-before, state-after) pairs.
///
/// Validates `config` synchronously (invalid configuration fails before any
/// cycle is produced) before constructing the iterator. `stop_when` is
/// evaluated before each cycle, against the opcode at (and the value of)
/// the *current* program counter.
pub fn emulate<'prog, 'input, F>(
    opcodes: &'prog [u16],
    config: EmulatorConfig,
    stop_when: F,
    input_source: Option<InputSource<'input>>,
    initial_state: Option<State>,
) -> Result<Emulation<'prog, 'input, F>, EmulatorError>
where
    F: FnMut(u16, &State) -> bool,
{
    let step_config = validate(opcodes, &config)?;

    Ok(Emulation {
        opcodes,
        config: step_config,
        stop_when,
        input_source,
        current_state: initial_state.unwrap_or_default(),
        finished: false,
    })
}

/// Chained-setter configuration surface: build up an [`EmulatorConfig`]
/// imperatively, then call [`PioEmulatorBuilder::run`] to validate it and
/// start an [`Emulation`].
#[derive(Debug, Default)]
pub struct PioEmulatorBuilder {
    config: EmulatorConfig,
}

impl PioEmulatorBuilder {
    /// Starts from [`EmulatorConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto_pull(&mut self, enabled: bool) -> &mut Self {
        self.config.auto_pull = enabled;
        self
    }

    pub fn auto_push(&mut self, enabled: bool) -> &mut Self {
        self.config.auto_push = enabled;
        self
    }

    pub fn pull_threshold(&mut self, threshold: u8) -> &mut Self {
        self.config.pull_threshold = threshold;
        self
    }

    pub fn push_threshold(&mut self, threshold: u8) -> &mut Self {
        self.config.push_threshold = threshold;
        self
    }

    pub fn shift_isr_right(&mut self, right: bool) -> &mut Self {
        self.config.shift_isr_right = right;
        self
    }

    pub fn shift_osr_right(&mut self, right: bool) -> &mut Self {
        self.config.shift_osr_right = right;
        self
    }

    /// Sets the side-set base pin and bit count in one call.
    pub fn side_set(&mut self, base: u8, count: u8) -> &mut Self {
        self.config.side_set_base = base;
        self.config.side_set_count = count;
        self
    }

    pub fn jmp_pin(&mut self, pin: u8) -> &mut Self {
        self.config.jmp_pin = pin;
        self
    }

    /// Sets the wrap range. The program will jump from `top` back to
    /// `target` instead of incrementing the program counter past it.
    pub fn wrap(&mut self, target: u8, top: u8) -> &mut Self {
        self.config.wrap_target = target;
        self.config.wrap_top = Some(top);
        self
    }

    /// Validates the accumulated configuration and starts an [`Emulation`]
    /// over `opcodes`.
    pub fn run<'prog, 'input, F>(
        &self,
        opcodes: &'prog [u16],
        stop_when: F,
        input_source: Option<InputSource<'input>>,
        initial_state: Option<State>,
    ) -> Result<Emulation<'prog, 'input, F>, EmulatorError>
    where
        F: FnMut(u16, &State) -> bool,
    {
        emulate(opcodes, self.config, stop_when, input_source, initial_state)
    }
}
