// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use crate::{
    arch::{InstructionAddress, Value},
    config::{Config, ReservedPolicy},
    fault::{Fault, StopReason},
    interrupt::VectorTable,
    memory::Segment,
    op::Operand,
    register::RegisterFile,
};

/// Everything one run of the machine mutates.
pub struct MachineState {
    registers: RegisterFile,
    memory: Segment,
    vectors: VectorTable,
    last_fault: Option<Fault>,
    stop: Option<StopReason>,
}

impl MachineState {
    pub fn new(config: &Config, vectors: VectorTable) -> Self {
        Self {
            registers: RegisterFile::new(Segment::BASE, config.reserved),
            memory: Segment::new(config.segment_size),
            vectors,
            last_fault: None,
            stop: None,
        }
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    pub fn memory(&self) -> &Segment {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Segment {
        &mut self.memory
    }

    pub fn vectors(&self) -> &VectorTable {
        &self.vectors
    }

    pub fn vectors_mut(&mut self) -> &mut VectorTable {
        &mut self.vectors
    }

    pub fn reserved_policy(&self) -> ReservedPolicy {
        self.registers.reserved_policy()
    }

    pub fn pc(&self) -> InstructionAddress {
        self.registers.pc()
    }

    /// Falls through to the next instruction.
    pub fn advance(&mut self) {
        self.jump(self.pc().wrapping_add(1));
    }

    /// Sets `pc`. The target is validated when it is fetched.
    pub fn jump(&mut self, target: InstructionAddress) {
        self.registers.set_pc(target);
    }

    /// Resolves an operand to a register value or the zero-extended
    /// immediate.
    pub fn operand(&self, operand: Operand) -> Result<Value, Fault> {
        match operand {
            Operand::Register(index) => self.registers.read(index),
            Operand::Immediate(v) => Ok(v as Value),
        }
    }

    /// The most recent fault that was delivered to a handler.
    pub fn last_fault(&self) -> Option<Fault> {
        self.last_fault
    }

    pub(crate) fn record_fault(&mut self, fault: Fault) {
        self.last_fault = Some(fault);
    }

    pub fn stop(&mut self, reason: StopReason) {
        self.stop.get_or_insert(reason);
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop
    }

    pub fn is_terminated(&self) -> bool {
        self.stop.is_some()
    }
}
