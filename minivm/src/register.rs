// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use crate::{
    arch::{RegisterIndex, Value, REGISTER_COUNT},
    config::ReservedPolicy,
    fault::Fault,
};

/// Symbolic names for the sixteen register slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    /// Reads as zero. As an operand field it selects the immediate instead.
    Nul = 0b0000,
    R1 = 0b0001,
    R2 = 0b0010,
    R3 = 0b0011,
    R4 = 0b0100,
    R5 = 0b0101,
    R6 = 0b0110,
    R7 = 0b0111,
    Base = 0b1000,
    Stack = 0b1001,
    Zero = 0b1010,
    Ones = 0b1011,
    Reserved12 = 0b1100,
    Reserved13 = 0b1101,
    Flags = 0b1110,
    Pc = 0b1111,
}

impl Register {
    pub const ALL: [Register; REGISTER_COUNT] = [
        Self::Nul,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
        Self::Base,
        Self::Stack,
        Self::Zero,
        Self::Ones,
        Self::Reserved12,
        Self::Reserved13,
        Self::Flags,
        Self::Pc,
    ];

    pub const fn index(self) -> RegisterIndex {
        self as RegisterIndex
    }

    pub fn from_index(index: RegisterIndex) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    const fn policy(self) -> Policy {
        POLICIES[self as usize]
    }
}

/// Bit positions within the `flags` register.
pub mod flags {
    /// Set by `add`/`sub` when the unsigned result wrapped.
    pub const OVERFLOW: u32 = 0;
    /// Set by `compare` when both sides are equal.
    pub const ZERO: u32 = 1;
    /// Set by `compare` when the left side is smaller (signed).
    pub const NEGATIVE: u32 = 2;
}

/// How instructions may touch a register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Policy {
    ReadWrite,
    /// Always reads as the constant; writes are discarded.
    Constant(Value),
    /// Readable; instruction writes are discarded, the machine writes it
    /// through dedicated paths.
    ReadOnly,
    /// Governed by [`ReservedPolicy`].
    Reserved,
}

const POLICIES: [Policy; REGISTER_COUNT] = [
    Policy::Constant(0),
    Policy::ReadWrite,
    Policy::ReadWrite,
    Policy::ReadWrite,
    Policy::ReadWrite,
    Policy::ReadWrite,
    Policy::ReadWrite,
    Policy::ReadWrite,
    Policy::ReadWrite,
    Policy::ReadWrite,
    Policy::Constant(0),
    Policy::Constant(Value::MAX),
    Policy::Reserved,
    Policy::Reserved,
    Policy::ReadOnly,
    Policy::ReadOnly,
];

pub struct RegisterFile {
    values: [Value; REGISTER_COUNT],
    reserved: ReservedPolicy,
}

impl RegisterFile {
    /// All registers zero except `ones`, and `base`/`stack` pointing at
    /// `segment_base`.
    pub fn new(segment_base: Value, reserved: ReservedPolicy) -> Self {
        let mut values = [0; REGISTER_COUNT];
        for register in Register::ALL {
            if let Policy::Constant(constant) = register.policy() {
                values[register as usize] = constant;
            }
        }
        values[Register::Base as usize] = segment_base;
        values[Register::Stack as usize] = segment_base;
        Self { values, reserved }
    }

    /// Reads a register on behalf of an instruction.
    pub fn read(&self, index: RegisterIndex) -> Result<Value, Fault> {
        let register = Self::resolve(index)?;
        match register.policy() {
            Policy::Constant(constant) => Ok(constant),
            Policy::Reserved if self.reserved == ReservedPolicy::Strict => {
                Err(Fault::ReservedRegister(index))
            }
            _ => Ok(self.values[index as usize]),
        }
    }

    /// Writes a register on behalf of an instruction. Writes to constant and
    /// read-only registers are silently discarded.
    pub fn write(
        &mut self,
        index: RegisterIndex,
        value: Value,
    ) -> Result<(), Fault> {
        let register = Self::resolve(index)?;
        match register.policy() {
            Policy::ReadWrite => self.values[index as usize] = value,
            Policy::Reserved => match self.reserved {
                ReservedPolicy::Strict => {
                    return Err(Fault::ReservedRegister(index));
                }
                ReservedPolicy::Permissive => {
                    self.values[index as usize] = value
                }
            },
            Policy::Constant(_) | Policy::ReadOnly => {}
        }
        Ok(())
    }

    /// The raw slot contents, bypassing every policy.
    pub fn get(&self, register: Register) -> Value {
        self.values[register as usize]
    }

    pub fn reserved_policy(&self) -> ReservedPolicy {
        self.reserved
    }

    pub fn pc(&self) -> Value {
        self.get(Register::Pc)
    }

    pub(crate) fn set_pc(&mut self, pc: Value) {
        self.values[Register::Pc as usize] = pc;
    }

    pub fn flag(&self, bit: u32) -> bool {
        self.get(Register::Flags) & (1 << bit) != 0
    }

    pub(crate) fn set_flag(&mut self, bit: u32, on: bool) {
        let flags = &mut self.values[Register::Flags as usize];
        if on {
            *flags |= 1 << bit;
        } else {
            *flags &= !(1 << bit);
        }
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    fn resolve(index: RegisterIndex) -> Result<Register, Fault> {
        Register::from_index(index).ok_or(Fault::NoSuchRegister(index))
    }
}
