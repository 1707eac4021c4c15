// Copyright (C) 2024 Ethan Uppal. All rights reserved.

use std::ops::RangeInclusive;

use enum_tags::enum_tags;
use thiserror::Error;

use crate::{
    arch::{
        InterruptNumber, RegisterIndex, Word, FIELD_BITS, IMM_BITS,
        OPCODE_BITS,
    },
    coding::CodeAsWord,
    decode, encode,
    register::Register,
};

/// Smallest sized integer type that can fit an op code.
pub type RawOpCode = u8;

/// Smallest sized integer type that can fit an immediate value.
pub type Immediate = u16;

/// Opcode `0b1000` is left unassigned in the primary space.
pub const UNASSIGNED_OPCODE: RawOpCode = 0b1000;

//  +---------------------------------------------------------------+
//  | Every `Op` is one `Word`, fields from least significant bit:  |
//  |   opcode[0..4] d[4..8] x[8..12] y[12..16] v[16..32]           |
//  | An operand field equal to `nul` (0) selects `v` instead.      |
//  +---------------------------------------------------------------+

/// The five raw fields of an instruction word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fields {
    pub opcode: RawOpCode,
    pub d: u8,
    pub x: u8,
    pub y: u8,
    pub v: Immediate,
}

impl Fields {
    pub fn pack(&self) -> Word {
        encode!(Word;
            [..OPCODE_BITS..] = self.opcode,
            [..FIELD_BITS..] = self.d,
            [..FIELD_BITS..] = self.x,
            [..FIELD_BITS..] = self.y,
            [..IMM_BITS..] = self.v
        )
    }

    pub fn unpack(word: Word) -> Self {
        decode!(word; Word;
            @(
                opcode: u8 = [..OPCODE_BITS..],
                d: u8 = [..FIELD_BITS..],
                x: u8 = [..FIELD_BITS..],
                y: u8 = [..FIELD_BITS..],
                v: u16 = [..IMM_BITS..]
            ) => Self { opcode, d, x, y, v }
        )
    }
}

/// Either a register or, when the field names `nul`, the immediate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Register(RegisterIndex),
    Immediate(Immediate),
}

impl Operand {
    fn from_fields(index: u8, v: Immediate) -> Self {
        if index == Register::Nul.index() {
            Self::Immediate(v)
        } else {
            Self::Register(index)
        }
    }

    fn to_fields(self) -> (u8, Immediate) {
        match self {
            Self::Register(index) => (index, 0),
            Self::Immediate(v) => (Register::Nul.index(), v),
        }
    }
}

/// Operands of the ALU ops and `compare`: `d = x OP y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binary {
    pub dst: RegisterIndex,
    pub lhs: RegisterIndex,
    pub rhs: Operand,
}

/// Access width selected by the `d` field of `load` and `store`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Width {
    Byte = 0,
    Half = 1,
    Word = 2,
    Double = 3,
}

impl Width {
    pub const fn bytes(self) -> usize {
        1 << self as u8
    }

    fn from_selector(selector: u8) -> Result<Self, DecodeError> {
        match selector {
            0 => Ok(Self::Byte),
            1 => Ok(Self::Half),
            2 => Ok(Self::Word),
            3 => Ok(Self::Double),
            other => Err(DecodeError::InvalidWidth(other)),
        }
    }
}

/// Operands of `load` (into `register`) and `store` (from `register`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Access {
    pub width: Width,
    pub register: RegisterIndex,
    pub address: Operand,
}

/// Branch condition selected by the `d` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    Always,
    Zero,
    NotZero,
    Overflow,
    NoOverflow,
    Negative,
    NotNegative,
    /// Selectors 7 through 15.
    Undefined(u8),
}

impl Condition {
    fn from_selector(selector: u8) -> Self {
        match selector {
            0 => Self::Always,
            1 => Self::Zero,
            2 => Self::NotZero,
            3 => Self::Overflow,
            4 => Self::NoOverflow,
            5 => Self::Negative,
            6 => Self::NotNegative,
            other => Self::Undefined(other),
        }
    }

    fn selector(self) -> u8 {
        match self {
            Self::Always => 0,
            Self::Zero => 1,
            Self::NotZero => 2,
            Self::Overflow => 3,
            Self::NoOverflow => 4,
            Self::Negative => 5,
            Self::NotNegative => 6,
            Self::Undefined(selector) => selector,
        }
    }
}

/// `Branch { target: Register(r), .. }` jumps to the absolute address held
/// in `r`; `Branch { target: Immediate(v), .. }` jumps by `v`, read as a
/// signed 16-bit offset from the branch itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Branch {
    pub condition: Condition,
    pub target: Operand,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftDirection {
    Left,
    Right,
}

/// Shift applied by `move`, packed in the `y` field as `[dir:1][amount:3]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shift {
    pub direction: ShiftDirection,
    pub amount: u8,
}

impl Shift {
    const RIGHT_BIT: u8 = 0b1000;
    const AMOUNT_MASK: u8 = 0b0111;

    pub const NONE: Shift = Shift {
        direction: ShiftDirection::Left,
        amount: 0,
    };

    fn from_field(y: u8) -> Self {
        let direction = if y & Self::RIGHT_BIT != 0 {
            ShiftDirection::Right
        } else {
            ShiftDirection::Left
        };
        Self {
            direction,
            amount: y & Self::AMOUNT_MASK,
        }
    }

    fn to_field(self) -> u8 {
        let direction = match self.direction {
            ShiftDirection::Left => 0,
            ShiftDirection::Right => Self::RIGHT_BIT,
        };
        direction | (self.amount & Self::AMOUNT_MASK)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    pub dst: RegisterIndex,
    pub src: Operand,
    pub shift: Shift,
}

/// Writes `value` into bits `4 * start ..= 4 * end + 3` of `dst`. The range
/// is addressed in nibbles because `x` and `y` are only four bits wide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Assign {
    pub dst: RegisterIndex,
    pub start: u8,
    pub end: u8,
    pub value: Immediate,
}

impl Assign {
    pub fn bit_range(&self) -> RangeInclusive<u32> {
        (self.start as u32 * 4)..=(self.end as u32 * 4 + 3)
    }
}

/// An instruction in the secondary opcode space, with `d` and `v` passed
/// through to the handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extended {
    pub code: u8,
    pub d: u8,
    pub v: Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("opcode {0:#06b} is not assigned")]
    UnknownOpcode(RawOpCode),
    #[error("access width selector {0} is not one of 0..=3")]
    InvalidWidth(u8),
    #[error("bit range starts at nibble {start} but ends at nibble {end}")]
    InvertedBitRange { start: u8, end: u8 },
}

/// A decoded VM operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
#[enum_tags(public, repr(RawOpCode))]
pub enum Op {
    /// `Self::Interrupt(0)` halts; any other number jumps through the vector
    /// table.
    Interrupt(InterruptNumber) = 0b0000,
    Add(Binary) = 0b0001,
    Sub(Binary) = 0b0010,
    Mul(Binary) = 0b0011,
    Div(Binary) = 0b0100,
    And(Binary) = 0b0101,
    Or(Binary) = 0b0110,
    Xor(Binary) = 0b0111,
    Load(Access) = 0b1001,
    Store(Access) = 0b1010,
    /// Writes -1, 0 or 1 and sets the zero and negative flags.
    Compare(Binary) = 0b1011,
    Branch(Branch) = 0b1100,
    Move(Move) = 0b1101,
    Assign(Assign) = 0b1110,
    Extended(Extended) = 0b1111,
}

impl Op {
    pub const fn opcode(&self) -> RawOpCode {
        self.tag()
    }

    /// Encodes this operation as a [`Word`].
    pub fn encode_packed(&self) -> Word {
        let opcode = self.opcode();
        let fields = match *self {
            Self::Interrupt(number) => Fields {
                opcode,
                d: number,
                ..Fields::default()
            },
            Self::Add(binary)
            | Self::Sub(binary)
            | Self::Mul(binary)
            | Self::Div(binary)
            | Self::And(binary)
            | Self::Or(binary)
            | Self::Xor(binary)
            | Self::Compare(binary) => {
                let (y, v) = binary.rhs.to_fields();
                Fields {
                    opcode,
                    d: binary.dst,
                    x: binary.lhs,
                    y,
                    v,
                }
            }
            Self::Load(access) | Self::Store(access) => {
                let (y, v) = access.address.to_fields();
                Fields {
                    opcode,
                    d: access.width as u8,
                    x: access.register,
                    y,
                    v,
                }
            }
            Self::Branch(branch) => {
                let (y, v) = branch.target.to_fields();
                Fields {
                    opcode,
                    d: branch.condition.selector(),
                    x: 0,
                    y,
                    v,
                }
            }
            Self::Move(mov) => {
                let (x, v) = mov.src.to_fields();
                Fields {
                    opcode,
                    d: mov.dst,
                    x,
                    y: mov.shift.to_field(),
                    v,
                }
            }
            Self::Assign(assign) => Fields {
                opcode,
                d: assign.dst,
                x: assign.start,
                y: assign.end,
                v: assign.value,
            },
            Self::Extended(extended) => Fields {
                opcode,
                d: extended.d,
                x: extended.code >> FIELD_BITS,
                y: extended.code & 0b1111,
                v: extended.v,
            },
        };
        fields.pack()
    }

    /// Decodes this operation from a [`Word`].
    pub fn decode_packed(word: Word) -> Result<Self, DecodeError> {
        let Fields { opcode, d, x, y, v } = Fields::unpack(word);
        let binary = || Binary {
            dst: d,
            lhs: x,
            rhs: Operand::from_fields(y, v),
        };
        let access = || -> Result<Access, DecodeError> {
            Ok(Access {
                width: Width::from_selector(d)?,
                register: x,
                address: Operand::from_fields(y, v),
            })
        };

        Ok(match opcode {
            Self::INTERRUPT_TAG => Self::Interrupt(d),
            Self::ADD_TAG => Self::Add(binary()),
            Self::SUB_TAG => Self::Sub(binary()),
            Self::MUL_TAG => Self::Mul(binary()),
            Self::DIV_TAG => Self::Div(binary()),
            Self::AND_TAG => Self::And(binary()),
            Self::OR_TAG => Self::Or(binary()),
            Self::XOR_TAG => Self::Xor(binary()),
            Self::LOAD_TAG => Self::Load(access()?),
            Self::STORE_TAG => Self::Store(access()?),
            Self::COMPARE_TAG => Self::Compare(binary()),
            Self::BRANCH_TAG => Self::Branch(Branch {
                condition: Condition::from_selector(d),
                target: Operand::from_fields(y, v),
            }),
            Self::MOVE_TAG => Self::Move(Move {
                dst: d,
                src: Operand::from_fields(x, v),
                shift: Shift::from_field(y),
            }),
            Self::ASSIGN_TAG => {
                if x > y {
                    return Err(DecodeError::InvertedBitRange {
                        start: x,
                        end: y,
                    });
                }
                Self::Assign(Assign {
                    dst: d,
                    start: x,
                    end: y,
                    value: v,
                })
            }
            Self::EXTENDED_TAG => Self::Extended(Extended {
                code: (x << FIELD_BITS) | y,
                d,
                v,
            }),
            other => return Err(DecodeError::UnknownOpcode(other)),
        })
    }
}
