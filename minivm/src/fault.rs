// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use thiserror::Error;

use crate::{
    arch::{InstructionAddress, InterruptNumber, RegisterIndex, Value},
    interrupt::Interrupt,
    op::DecodeError,
};

/// A condition that forces control through the vector table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("segmentation fault: instruction {pc} is past the end of the program")]
    ProgramCounterOutOfBounds { pc: InstructionAddress },
    #[error("segmentation fault: {width}-byte access at offset {offset:#x} exceeds the {size}-byte segment")]
    MemoryOutOfBounds {
        offset: Value,
        width: usize,
        size: usize,
    },
    #[error("illegal operation: division by zero")]
    DivisionByZero,
    #[error("illegal operation: {0}")]
    Undecodable(#[from] DecodeError),
    #[error("illegal operation: register {0} is reserved")]
    ReservedRegister(RegisterIndex),
    #[error("illegal operation: register {0} does not exist")]
    NoSuchRegister(RegisterIndex),
    #[error("illegal operation: branch condition {0} is undefined")]
    UndefinedCondition(u8),
}

impl Fault {
    /// The vector this fault is delivered through.
    pub const fn interrupt(&self) -> Interrupt {
        match self {
            Self::ProgramCounterOutOfBounds { .. }
            | Self::MemoryOutOfBounds { .. } => Interrupt::SegmentationFault,
            Self::DivisionByZero
            | Self::Undecodable(_)
            | Self::ReservedRegister(_)
            | Self::NoSuchRegister(_)
            | Self::UndefinedCondition(_) => Interrupt::IllegalOperation,
        }
    }
}

/// Why a machine stopped running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `interrupt 0`, or an extended handler asking to halt.
    Halted,
    /// A fault whose vector was unset or pointed outside the program.
    Fault(Fault),
    /// An explicit `interrupt n` whose vector was unset.
    UnhandledInterrupt(InterruptNumber),
}

impl StopReason {
    pub fn is_halt(&self) -> bool {
        matches!(self, Self::Halted)
    }

    pub fn fault(&self) -> Option<Fault> {
        match self {
            Self::Fault(fault) => Some(*fault),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faults_map_to_their_vectors() {
        assert_eq!(
            Interrupt::SegmentationFault,
            Fault::ProgramCounterOutOfBounds { pc: 0 }.interrupt()
        );
        assert_eq!(
            Interrupt::SegmentationFault,
            Fault::MemoryOutOfBounds {
                offset: 8,
                width: 8,
                size: 8
            }
            .interrupt()
        );
        assert_eq!(
            Interrupt::IllegalOperation,
            Fault::DivisionByZero.interrupt()
        );
        assert_eq!(
            Interrupt::IllegalOperation,
            Fault::from(DecodeError::InvalidWidth(7)).interrupt()
        );
    }

    #[test]
    fn messages_name_the_fault_class() {
        assert_eq!(
            "illegal operation: division by zero",
            Fault::DivisionByZero.to_string()
        );
        assert_eq!(
            "segmentation fault: instruction 3 is past the end of the program",
            Fault::ProgramCounterOutOfBounds { pc: 3 }.to_string()
        );
    }
}
