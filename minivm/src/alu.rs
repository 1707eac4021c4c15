// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use paste::paste;

use crate::{
    arch::Value,
    fault::Fault,
    op::Binary,
    register::flags,
    state::MachineState,
};

fn operands(
    state: &MachineState,
    binary: Binary,
) -> Result<(Value, Value), Fault> {
    let lhs = state.registers().read(binary.lhs)?;
    let rhs = state.operand(binary.rhs)?;
    Ok((lhs, rhs))
}

fn finish(
    state: &mut MachineState,
    dst: u8,
    result: Value,
) -> Result<(), Fault> {
    state.registers_mut().write(dst, result)?;
    state.advance();
    Ok(())
}

/// Ops that record unsigned wraparound in the overflow flag, built on
/// `overflowing_<op>`.
macro_rules! overflowing_ops {
    ($($name:ident),* $(,)?) => {
        paste! {
            $(
                pub fn $name(
                    state: &mut MachineState,
                    binary: Binary,
                ) -> Result<(), Fault> {
                    let (lhs, rhs) = operands(state, binary)?;
                    let (result, wrapped) = lhs.[<overflowing_ $name>](rhs);
                    state.registers_mut().write(binary.dst, result)?;
                    state
                        .registers_mut()
                        .set_flag(flags::OVERFLOW, wrapped);
                    state.advance();
                    Ok(())
                }
            )*
        }
    };
}

/// Ops that leave `flags` alone.
macro_rules! plain_ops {
    ($($name:ident => |$lhs:ident, $rhs:ident| $result:expr),* $(,)?) => {
        $(
            pub fn $name(
                state: &mut MachineState,
                binary: Binary,
            ) -> Result<(), Fault> {
                let ($lhs, $rhs) = operands(state, binary)?;
                finish(state, binary.dst, $result)
            }
        )*
    };
}

overflowing_ops!(add, sub);

plain_ops! {
    mul => |lhs, rhs| lhs.wrapping_mul(rhs),
    and => |lhs, rhs| lhs & rhs,
    or => |lhs, rhs| lhs | rhs,
    xor => |lhs, rhs| lhs ^ rhs,
}

/// Unsigned division; a zero divisor faults before anything is written.
pub fn div(state: &mut MachineState, binary: Binary) -> Result<(), Fault> {
    let (lhs, rhs) = operands(state, binary)?;
    let quotient = lhs.checked_div(rhs).ok_or(Fault::DivisionByZero)?;
    finish(state, binary.dst, quotient)
}
