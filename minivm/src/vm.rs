// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use log::{debug, info, trace, warn};
use static_assertions::assert_impl_all;

use crate::{
    access, alu,
    arch::{InstructionAddress, Word},
    config::Config,
    control,
    extended::{ExtendedHandler, ExtendedTable},
    fault::{Fault, StopReason},
    interrupt::{self, VectorTable},
    op::Op,
    state::MachineState,
};

/// Holds what outlives a single run: configuration, the vector table each
/// run starts from, and the extended opcode handlers.
#[derive(Default)]
pub struct Engine {
    config: Config,
    vectors: VectorTable,
    extended: ExtendedTable,
}

assert_impl_all!(Engine: Send);
assert_impl_all!(MachineState: Send);

/// The observable result of [`Engine::execute`].
pub struct Execution {
    pub state: MachineState,
    pub reason: StopReason,
    pub steps: u64,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            vectors: VectorTable::default(),
            extended: ExtendedTable::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Routines installed here are copied into every new machine.
    pub fn vectors_mut(&mut self) -> &mut VectorTable {
        &mut self.vectors
    }

    pub fn register_extended(
        &mut self,
        code: u8,
        handler: impl ExtendedHandler + 'static,
    ) -> Option<Box<dyn ExtendedHandler>> {
        self.extended.register(code, handler)
    }

    /// Creates a fresh machine over `program` without running it.
    pub fn machine<'a>(&'a mut self, program: &'a [Word]) -> Machine<'a> {
        info!(
            "machine starting: {} instructions, {}-byte segment",
            program.len(),
            self.config.segment_size
        );
        Machine {
            program,
            state: MachineState::new(&self.config, self.vectors.clone()),
            extended: &mut self.extended,
            steps: 0,
        }
    }

    /// Runs `program` on a fresh machine until it halts or takes a fault it
    /// cannot handle.
    pub fn execute(&mut self, program: &[Word]) -> Execution {
        self.machine(program).run()
    }
}

/// One machine running one program.
pub struct Machine<'a> {
    program: &'a [Word],
    state: MachineState,
    extended: &'a mut ExtendedTable,
    steps: u64,
}

impl<'a> Machine<'a> {
    pub fn state(&self) -> &MachineState {
        &self.state
    }

    /// Instructions executed or attempted so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_terminated(&self) -> bool {
        self.state.is_terminated()
    }

    pub fn run(mut self) -> Execution {
        let reason = loop {
            if let Some(reason) = self.state.stop_reason() {
                break reason;
            }
            self.step();
        };
        Execution {
            state: self.state,
            reason,
            steps: self.steps,
        }
    }

    /// Runs at most `limit` more instructions, returning the stop reason if
    /// the machine stopped.
    pub fn run_for(&mut self, limit: u64) -> Option<StopReason> {
        for _ in 0..limit {
            if self.is_terminated() {
                break;
            }
            self.step();
        }
        self.state.stop_reason()
    }

    /// Fetches, decodes and executes one instruction, delivering any fault
    /// it raises. Does nothing once the machine has stopped.
    pub fn step(&mut self) {
        if self.is_terminated() {
            return;
        }
        self.steps += 1;

        if let Err(fault) = self.execute_next() {
            self.deliver(fault);
        }

        if let Some(reason) = self.state.stop_reason() {
            self.report(reason);
        }
    }

    fn execute_next(&mut self) -> Result<(), Fault> {
        let pc = self.state.pc();
        let op = self.fetch(pc)?;
        trace!("{pc:>6}: {} {op:?}", op.mnemonic());

        let state = &mut self.state;
        match op {
            Op::Interrupt(number) => {
                interrupt::interrupt(state, number);
                Ok(())
            }
            Op::Add(binary) => alu::add(state, binary),
            Op::Sub(binary) => alu::sub(state, binary),
            Op::Mul(binary) => alu::mul(state, binary),
            Op::Div(binary) => alu::div(state, binary),
            Op::And(binary) => alu::and(state, binary),
            Op::Or(binary) => alu::or(state, binary),
            Op::Xor(binary) => alu::xor(state, binary),
            Op::Load(access) => access::load(state, access),
            Op::Store(access) => access::store(state, access),
            Op::Compare(binary) => control::compare(state, binary),
            Op::Branch(branch) => control::branch(state, branch),
            Op::Move(mov) => control::mov(state, mov),
            Op::Assign(assign) => control::assign(state, assign),
            Op::Extended(extended) => self.extended.dispatch(state, extended),
        }
    }

    fn fetch(&self, pc: InstructionAddress) -> Result<Op, Fault> {
        let word = usize::try_from(pc)
            .ok()
            .and_then(|index| self.program.get(index))
            .ok_or(Fault::ProgramCounterOutOfBounds { pc })?;
        Ok(Op::decode_packed(*word)?)
    }

    /// Takes `fault` through its vector. An unset vector, or one pointing
    /// outside the program, stops the machine instead.
    fn deliver(&mut self, fault: Fault) {
        let vector = fault.interrupt().number();
        match self.state.vectors().get(vector) {
            Some(target) if self.contains(target) => {
                debug!("{fault}; entering handler {vector} at {target}");
                self.state.record_fault(fault);
                self.state.jump(target);
            }
            _ => self.state.stop(StopReason::Fault(fault)),
        }
    }

    fn contains(&self, address: InstructionAddress) -> bool {
        usize::try_from(address).is_ok_and(|index| index < self.program.len())
    }

    fn report(&self, reason: StopReason) {
        match reason {
            StopReason::Halted => {
                info!("machine halted after {} steps", self.steps)
            }
            StopReason::Fault(fault) => warn!(
                "machine stopped at {} after {} steps: {fault}",
                self.state.pc(),
                self.steps
            ),
            StopReason::UnhandledInterrupt(number) => warn!(
                "machine stopped at {}: interrupt {number} has no routine",
                self.state.pc()
            ),
        }
    }
}
