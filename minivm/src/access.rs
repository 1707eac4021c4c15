// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use crate::{fault::Fault, op::Access, state::MachineState};

/// `load w x, y`: reads `w` bytes at the address in `y` into `x`.
pub fn load(state: &mut MachineState, access: Access) -> Result<(), Fault> {
    let address = state.operand(access.address)?;
    let value = state.memory().read(address, access.width)?;
    state.registers_mut().write(access.register, value)?;
    state.advance();
    Ok(())
}

/// `store w x, y`: writes the low `w` bytes of `x` at the address in `y`.
pub fn store(state: &mut MachineState, access: Access) -> Result<(), Fault> {
    let address = state.operand(access.address)?;
    let value = state.registers().read(access.register)?;
    state.memory_mut().write(address, access.width, value)?;
    state.advance();
    Ok(())
}
