// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use std::cmp::Ordering;

use num_traits::{AsPrimitive, PrimInt, Unsigned};

use crate::{
    arch::{InstructionOffset, SignedValue, Value, IMM_BITS},
    config::ReservedPolicy,
    fault::Fault,
    op::{
        Assign, Binary, Branch, Condition, DecodeError, Immediate, Move,
        Operand, ShiftDirection,
    },
    register::flags,
    state::MachineState,
};

/// `compare d, x, y`: writes -1, 0 or 1 (signed comparison) and sets the
/// zero and negative flags to match.
pub fn compare(state: &mut MachineState, binary: Binary) -> Result<(), Fault> {
    let lhs = state.registers().read(binary.lhs)? as SignedValue;
    let rhs = state.operand(binary.rhs)? as SignedValue;
    let ordering = lhs.cmp(&rhs);
    let result: SignedValue = match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    };

    let registers = state.registers_mut();
    registers.write(binary.dst, result as Value)?;
    registers.set_flag(flags::ZERO, ordering == Ordering::Equal);
    registers.set_flag(flags::NEGATIVE, ordering == Ordering::Less);
    state.advance();
    Ok(())
}

pub fn branch(state: &mut MachineState, branch: Branch) -> Result<(), Fault> {
    if !condition_holds(state, branch.condition)? {
        state.advance();
        return Ok(());
    }

    let target = match branch.target {
        Operand::Register(index) => state.registers().read(index)?,
        Operand::Immediate(offset) => state
            .pc()
            .wrapping_add_signed(make_instruction_offset(offset)),
    };
    state.jump(target);
    Ok(())
}

fn condition_holds(
    state: &MachineState,
    condition: Condition,
) -> Result<bool, Fault> {
    let registers = state.registers();
    Ok(match condition {
        Condition::Always => true,
        Condition::Zero => registers.flag(flags::ZERO),
        Condition::NotZero => !registers.flag(flags::ZERO),
        Condition::Overflow => registers.flag(flags::OVERFLOW),
        Condition::NoOverflow => !registers.flag(flags::OVERFLOW),
        Condition::Negative => registers.flag(flags::NEGATIVE),
        Condition::NotNegative => !registers.flag(flags::NEGATIVE),
        Condition::Undefined(selector) => match state.reserved_policy() {
            ReservedPolicy::Strict => {
                return Err(Fault::UndefinedCondition(selector))
            }
            ReservedPolicy::Permissive => false,
        },
    })
}

/// `move d, x [, shift]`
pub fn mov(state: &mut MachineState, mov: Move) -> Result<(), Fault> {
    let value = state.operand(mov.src)?;
    let amount = mov.shift.amount as u32;
    let shifted = match mov.shift.direction {
        ShiftDirection::Left => value << amount,
        ShiftDirection::Right => value >> amount,
    };
    state.registers_mut().write(mov.dst, shifted)?;
    state.advance();
    Ok(())
}

/// `assign d, v, [x..=y]`: overwrites only the bits in the range, fitting
/// `v` to the range width.
pub fn assign(state: &mut MachineState, assign: Assign) -> Result<(), Fault> {
    if assign.start > assign.end {
        return Err(DecodeError::InvertedBitRange {
            start: assign.start,
            end: assign.end,
        }
        .into());
    }
    let range = assign.bit_range();
    let (start, end) = (*range.start(), *range.end());
    let width = end - start + 1;
    let mask =
        Value::MAX.checked_shr(Value::BITS - width).unwrap_or(0) << start;

    let old = state.registers().read(assign.dst)?;
    let new = (old & !mask) | (((assign.value as Value) << start) & mask);
    state.registers_mut().write(assign.dst, new)?;
    state.advance();
    Ok(())
}

/// Reads an immediate as a signed offset between instructions.
fn make_instruction_offset(offset: Immediate) -> InstructionOffset {
    sign_extend(offset, IMM_BITS as u32)
}

/// Reads the low `bits` of `raw` as a two's complement integer by parking
/// its sign bit at the top of a [`Value`] and shifting back arithmetically.
fn sign_extend<T>(raw: T, bits: u32) -> InstructionOffset
where
    T: PrimInt + Unsigned + AsPrimitive<Value>,
{
    let unused = Value::BITS - bits;
    let parked: Value = raw.as_() << unused;
    (parked as InstructionOffset) >> unused
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        interrupt::VectorTable,
        op::Shift,
        register::Register,
    };

    fn machine(reserved: ReservedPolicy) -> MachineState {
        MachineState::new(
            &Config::default()
                .with_segment_size(0)
                .with_reserved_policy(reserved),
            VectorTable::default(),
        )
    }

    fn assign_nibbles(
        state: &mut MachineState,
        start: u8,
        end: u8,
        value: Immediate,
    ) -> Result<(), Fault> {
        assign(
            state,
            Assign {
                dst: Register::R1.index(),
                start,
                end,
                value,
            },
        )
    }

    #[test]
    fn sign_extension() {
        assert_eq!(-1, make_instruction_offset(0xffff));
        assert_eq!(-3, make_instruction_offset(0xfffd));
        assert_eq!(0x7fff, make_instruction_offset(0x7fff));
        assert_eq!(-0x8000, make_instruction_offset(0x8000));

        assert_eq!(-8, sign_extend(0b1000u8, 4));
        assert_eq!(7, sign_extend(0b0111u8, 4));
    }

    #[test]
    fn compare_writes_tristate_and_flags() {
        let mut state = machine(ReservedPolicy::Strict);
        let compare_with = |state: &mut MachineState, rhs: Operand| {
            compare(
                state,
                Binary {
                    dst: Register::R1.index(),
                    lhs: Register::R2.index(),
                    rhs,
                },
            )
            .unwrap();
            state.registers().get(Register::R1)
        };

        state.registers_mut().write(Register::R2.index(), 5).unwrap();
        assert_eq!(1, compare_with(&mut state, Operand::Immediate(4)));
        assert!(!state.registers().flag(flags::ZERO));
        assert!(!state.registers().flag(flags::NEGATIVE));

        assert_eq!(0, compare_with(&mut state, Operand::Immediate(5)));
        assert!(state.registers().flag(flags::ZERO));

        assert_eq!(
            Value::MAX,
            compare_with(&mut state, Operand::Immediate(6))
        );
        assert!(state.registers().flag(flags::NEGATIVE));

        // all-ones is -1 when compared signed
        let ones = Operand::Register(Register::Ones.index());
        assert_eq!(1, compare_with(&mut state, ones));
    }

    #[test]
    fn branch_relative_and_absolute() {
        let mut state = machine(ReservedPolicy::Strict);
        state.jump(10);
        branch(
            &mut state,
            Branch {
                condition: Condition::Always,
                target: Operand::Immediate((-1i16) as u16),
            },
        )
        .unwrap();
        assert_eq!(9, state.pc());

        state.registers_mut().write(Register::R3.index(), 2).unwrap();
        branch(
            &mut state,
            Branch {
                condition: Condition::Always,
                target: Operand::Register(Register::R3.index()),
            },
        )
        .unwrap();
        assert_eq!(2, state.pc());
    }

    #[test]
    fn untaken_branch_falls_through() {
        let mut state = machine(ReservedPolicy::Strict);
        let untaken =
            [Condition::Zero, Condition::Overflow, Condition::Negative];
        for condition in untaken {
            let pc = state.pc();
            branch(
                &mut state,
                Branch {
                    condition,
                    target: Operand::Immediate(100),
                },
            )
            .unwrap();
            assert_eq!(pc + 1, state.pc());
        }

        let pc = state.pc();
        branch(
            &mut state,
            Branch {
                condition: Condition::NotZero,
                target: Operand::Immediate(100),
            },
        )
        .unwrap();
        assert_eq!(pc + 100, state.pc());
    }

    #[test]
    fn every_condition_reads_its_flag() {
        // condition, flag it reads, taken when that flag is set
        let cases = [
            (Condition::Zero, flags::ZERO, true),
            (Condition::NotZero, flags::ZERO, false),
            (Condition::Overflow, flags::OVERFLOW, true),
            (Condition::NoOverflow, flags::OVERFLOW, false),
            (Condition::Negative, flags::NEGATIVE, true),
            (Condition::NotNegative, flags::NEGATIVE, false),
        ];

        let branch_from_20 = |condition, bit, on| {
            let mut state = machine(ReservedPolicy::Strict);
            state.jump(20);
            state.registers_mut().set_flag(bit, on);
            branch(
                &mut state,
                Branch {
                    condition,
                    target: Operand::Immediate(5),
                },
            )
            .expect("defined conditions never fault");
            state.pc()
        };

        for (condition, bit, taken_when_set) in cases {
            for on in [true, false] {
                let expected = if on == taken_when_set { 25 } else { 21 };
                assert_eq!(
                    expected,
                    branch_from_20(condition, bit, on),
                    "{condition:?} with flag {bit} = {on}"
                );
            }
        }

        for bit in [flags::ZERO, flags::OVERFLOW, flags::NEGATIVE] {
            for on in [true, false] {
                assert_eq!(25, branch_from_20(Condition::Always, bit, on));
            }
        }
    }

    #[test]
    fn undefined_condition_depends_on_policy() {
        let undefined = Branch {
            condition: Condition::Undefined(9),
            target: Operand::Immediate(4),
        };

        let mut strict = machine(ReservedPolicy::Strict);
        assert_eq!(
            Err(Fault::UndefinedCondition(9)),
            branch(&mut strict, undefined)
        );
        assert_eq!(0, strict.pc());

        let mut permissive = machine(ReservedPolicy::Permissive);
        branch(&mut permissive, undefined).unwrap();
        assert_eq!(1, permissive.pc());
    }

    #[test]
    fn move_with_shifts() {
        let mut state = machine(ReservedPolicy::Strict);
        let run = |state: &mut MachineState, src, direction, amount| {
            mov(
                state,
                Move {
                    dst: Register::R1.index(),
                    src,
                    shift: Shift { direction, amount },
                },
            )
            .unwrap();
            state.registers().get(Register::R1)
        };

        assert_eq!(
            0x50,
            run(&mut state, Operand::Immediate(0x5), ShiftDirection::Left, 4)
        );
        assert_eq!(
            0x01,
            run(&mut state, Operand::Immediate(0x80), ShiftDirection::Right, 7)
        );
        assert_eq!(
            Value::MAX >> 3,
            run(
                &mut state,
                Operand::Register(Register::Ones.index()),
                ShiftDirection::Right,
                3
            )
        );
        assert_eq!(
            0x1234,
            run(&mut state, Operand::Immediate(0x1234), ShiftDirection::Left, 0)
        );
        assert_eq!(4, state.pc());
    }

    #[test]
    fn assign_composes_bit_ranges() {
        let mut state = machine(ReservedPolicy::Strict);
        assign_nibbles(&mut state, 0, 3, 0xabcd).unwrap();
        assert_eq!(0xabcd, state.registers().get(Register::R1));

        assign_nibbles(&mut state, 4, 7, 0x1234).unwrap();
        assert_eq!(0x1234_abcd, state.registers().get(Register::R1));

        assign_nibbles(&mut state, 12, 15, 0xfeed).unwrap();
        assert_eq!(0xfeed_0000_1234_abcd, state.registers().get(Register::R1));
    }

    #[test]
    fn assign_fits_value_to_range_width() {
        let mut state = machine(ReservedPolicy::Strict);
        state.registers_mut().write(Register::R1.index(), Value::MAX).unwrap();

        // narrower range truncates
        assign_nibbles(&mut state, 1, 1, 0xabc5).unwrap();
        assert_eq!(0xffff_ffff_ffff_ff5f, state.registers().get(Register::R1));

        // wider range zero-extends
        assign_nibbles(&mut state, 0, 15, 0x00ff).unwrap();
        assert_eq!(0xff, state.registers().get(Register::R1));
    }

    #[test]
    fn inverted_assign_range_faults() {
        let mut state = machine(ReservedPolicy::Strict);
        assert_eq!(
            Err(Fault::Undecodable(DecodeError::InvertedBitRange {
                start: 2,
                end: 1
            })),
            assign_nibbles(&mut state, 2, 1, 0xf)
        );
        assert_eq!(0, state.registers().get(Register::R1));
    }

    #[test]
    fn assign_to_reserved_register_in_strict_mode_faults() {
        let mut state = machine(ReservedPolicy::Strict);
        let result = assign(
            &mut state,
            Assign {
                dst: Register::Reserved13.index(),
                start: 0,
                end: 3,
                value: 1,
            },
        );
        assert_eq!(Err(Fault::ReservedRegister(13)), result);
    }
}
