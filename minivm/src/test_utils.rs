// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

//! Terse constructors for hand-written test programs.

use crate::{
    arch::InterruptNumber,
    op::{
        Access, Assign, Binary, Branch, Condition, Extended, Immediate, Move,
        Op, Operand, Shift, Width,
    },
    register::Register,
};

pub fn reg(register: Register) -> Operand {
    Operand::Register(register.index())
}

pub fn imm(value: Immediate) -> Operand {
    Operand::Immediate(value)
}

/// A signed relative branch offset.
pub fn rel(offset: i16) -> Operand {
    Operand::Immediate(offset as Immediate)
}

fn binary(dst: Register, lhs: Register, rhs: Operand) -> Binary {
    Binary {
        dst: dst.index(),
        lhs: lhs.index(),
        rhs,
    }
}

pub fn add(dst: Register, lhs: Register, rhs: Operand) -> Op {
    Op::Add(binary(dst, lhs, rhs))
}

pub fn sub(dst: Register, lhs: Register, rhs: Operand) -> Op {
    Op::Sub(binary(dst, lhs, rhs))
}

pub fn div(dst: Register, lhs: Register, rhs: Operand) -> Op {
    Op::Div(binary(dst, lhs, rhs))
}

pub fn compare(dst: Register, lhs: Register, rhs: Operand) -> Op {
    Op::Compare(binary(dst, lhs, rhs))
}

pub fn load(width: Width, dst: Register, address: Operand) -> Op {
    Op::Load(Access {
        width,
        register: dst.index(),
        address,
    })
}

pub fn store(width: Width, src: Register, address: Operand) -> Op {
    Op::Store(Access {
        width,
        register: src.index(),
        address,
    })
}

pub fn branch(condition: Condition, target: Operand) -> Op {
    Op::Branch(Branch { condition, target })
}

pub fn mov(dst: Register, src: Operand) -> Op {
    Op::Move(Move {
        dst: dst.index(),
        src,
        shift: Shift::NONE,
    })
}

/// Assigns `value` to the low 16 bits of `dst`.
pub fn assign_low(dst: Register, value: Immediate) -> Op {
    Op::Assign(Assign {
        dst: dst.index(),
        start: 0,
        end: 3,
        value,
    })
}

pub fn interrupt(number: InterruptNumber) -> Op {
    Op::Interrupt(number)
}

pub fn halt() -> Op {
    Op::Interrupt(0)
}

pub fn extended(code: u8, d: u8, v: Immediate) -> Op {
    Op::Extended(Extended { code, d, v })
}
