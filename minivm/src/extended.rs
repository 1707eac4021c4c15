// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use log::trace;

use crate::{
    arch::{InstructionAddress, EXTENDED_OPCODE_COUNT},
    fault::{Fault, StopReason},
    op::Extended,
    state::MachineState,
};

/// What the machine does after an extended handler returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Fall through to the next instruction.
    Next,
    Jump(InstructionAddress),
    Halt,
}

/// Behavior bound to one code in the extended opcode space. Any
/// `FnMut(&mut MachineState, Extended) -> Result<Flow, Fault>` qualifies.
pub trait ExtendedHandler: Send {
    fn execute(
        &mut self,
        state: &mut MachineState,
        extended: Extended,
    ) -> Result<Flow, Fault>;
}

impl<F> ExtendedHandler for F
where
    F: FnMut(&mut MachineState, Extended) -> Result<Flow, Fault> + Send,
{
    fn execute(
        &mut self,
        state: &mut MachineState,
        extended: Extended,
    ) -> Result<Flow, Fault> {
        self(state, extended)
    }
}

/// The secondary opcode space behind primary opcode `0b1111`. Empty until
/// handlers are registered; unregistered codes are no-ops.
pub struct ExtendedTable {
    handlers: Vec<Option<Box<dyn ExtendedHandler>>>,
}

impl Default for ExtendedTable {
    fn default() -> Self {
        Self {
            handlers: (0..EXTENDED_OPCODE_COUNT).map(|_| None).collect(),
        }
    }
}

impl ExtendedTable {
    /// Binds `handler` to `code`, returning whatever was bound before.
    pub fn register(
        &mut self,
        code: u8,
        handler: impl ExtendedHandler + 'static,
    ) -> Option<Box<dyn ExtendedHandler>> {
        self.handlers[code as usize].replace(Box::new(handler))
    }

    pub fn unregister(&mut self, code: u8) -> Option<Box<dyn ExtendedHandler>> {
        self.handlers[code as usize].take()
    }

    pub fn is_registered(&self, code: u8) -> bool {
        self.handlers[code as usize].is_some()
    }

    pub fn dispatch(
        &mut self,
        state: &mut MachineState,
        extended: Extended,
    ) -> Result<(), Fault> {
        let Some(handler) = self.handlers[extended.code as usize].as_mut()
        else {
            trace!("extended opcode {:#04x} has no handler", extended.code);
            state.advance();
            return Ok(());
        };

        match handler.execute(state, extended)? {
            Flow::Next => state.advance(),
            Flow::Jump(target) => state.jump(target),
            Flow::Halt => state.stop(StopReason::Halted),
        }
        Ok(())
    }
}
