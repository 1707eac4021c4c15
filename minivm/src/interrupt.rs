// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use log::debug;
use thiserror::Error;

use crate::{
    arch::{InstructionAddress, InterruptNumber, VECTOR_COUNT},
    fault::StopReason,
    state::MachineState,
};

/// Interrupt numbers with a fixed meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Interrupt {
    Halt = 0,
    IllegalOperation = 1,
    SegmentationFault = 2,
}

impl Interrupt {
    pub const fn number(self) -> InterruptNumber {
        self as InterruptNumber
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VectorError {
    #[error("interrupt {0} is out of range")]
    OutOfRange(InterruptNumber),
    #[error("interrupt 0 always halts and cannot be routed")]
    HaltIsFixed,
    #[error("address 0 marks a vector as unset")]
    ZeroTarget,
}

/// Maps interrupt numbers to the address of their routine. A zero entry is
/// unset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VectorTable {
    routines: [InstructionAddress; VECTOR_COUNT],
}

impl VectorTable {
    pub fn install(
        &mut self,
        number: InterruptNumber,
        target: InstructionAddress,
    ) -> Result<(), VectorError> {
        if number == Interrupt::Halt.number() {
            return Err(VectorError::HaltIsFixed);
        }
        if target == 0 {
            return Err(VectorError::ZeroTarget);
        }
        let slot = self
            .routines
            .get_mut(number as usize)
            .ok_or(VectorError::OutOfRange(number))?;
        *slot = target;
        Ok(())
    }

    /// Unsets a vector, returning its previous target.
    pub fn remove(
        &mut self,
        number: InterruptNumber,
    ) -> Option<InstructionAddress> {
        let slot = self.routines.get_mut(number as usize)?;
        let previous = std::mem::take(slot);
        (previous != 0).then_some(previous)
    }

    pub fn get(&self, number: InterruptNumber) -> Option<InstructionAddress> {
        self.routines
            .get(number as usize)
            .copied()
            .filter(|&target| target != 0)
    }
}

/// `interrupt d`: halts for `d = 0`, otherwise jumps to the routine for `d`
/// without saving a return address.
///
/// A vector that was never installed does not send `pc` to address 0: the
/// machine stops with [`StopReason::UnhandledInterrupt`] and `pc` stays on
/// the `interrupt` instruction.
pub fn interrupt(state: &mut MachineState, number: InterruptNumber) {
    if number == Interrupt::Halt.number() {
        state.stop(StopReason::Halted);
        return;
    }
    match state.vectors().get(number) {
        Some(target) => {
            debug!("interrupt {number} -> routine at {target}");
            state.jump(target);
        }
        None => state.stop(StopReason::UnhandledInterrupt(number)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn machine(vectors: VectorTable) -> MachineState {
        MachineState::new(&Config::default().with_segment_size(16), vectors)
    }

    #[test]
    fn install_rejects_halt_and_out_of_range() {
        let mut vectors = VectorTable::default();
        assert_eq!(Err(VectorError::HaltIsFixed), vectors.install(0, 4));
        assert_eq!(Err(VectorError::OutOfRange(16)), vectors.install(16, 4));
        assert_eq!(Err(VectorError::ZeroTarget), vectors.install(3, 0));
        assert_eq!(None, vectors.get(3));

        vectors.install(3, 4).expect("vector 3 is routable");
        assert_eq!(Some(4), vectors.get(3));
        assert_eq!(Some(4), vectors.remove(3));
        assert_eq!(None, vectors.get(3));
    }

    #[test]
    fn halt_stops_without_moving_pc() {
        let mut state = machine(VectorTable::default());
        interrupt(&mut state, 0);
        assert_eq!(Some(StopReason::Halted), state.stop_reason());
        assert_eq!(0, state.pc());
    }

    #[test]
    fn jumps_to_installed_routine() {
        let mut vectors = VectorTable::default();
        vectors.install(5, 12).unwrap();
        let mut state = machine(vectors);
        interrupt(&mut state, 5);
        assert_eq!(12, state.pc());
        assert!(!state.is_terminated());
    }

    #[test]
    fn unset_vector_stops_the_machine() {
        let mut state = machine(VectorTable::default());
        interrupt(&mut state, 7);
        assert_eq!(
            Some(StopReason::UnhandledInterrupt(7)),
            state.stop_reason()
        );
        assert_eq!(0, state.pc());
    }
}
