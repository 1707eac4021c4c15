// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use static_assertions::{const_assert, const_assert_eq};

/// An encoded instruction.
pub type Word = u32;

/// Contents of one register.
pub type Value = u64;

/// A register read as two's complement, for `compare`.
pub type SignedValue = i64;

/// Index of an instruction within the program; the value held by `pc`.
pub type InstructionAddress = u64;

/// Signed distance between two instructions.
pub type InstructionOffset = i64;

/// Smallest sized integer type that can fit a register index.
pub type RegisterIndex = u8;

/// Smallest sized integer type that can fit an interrupt number.
pub type InterruptNumber = u8;

/// Bits for the primary opcode.
pub const OPCODE_BITS: usize = 4;

/// Bits for each of the `d`, `x` and `y` fields.
pub const FIELD_BITS: usize = 4;
const_assert!(FIELD_BITS <= RegisterIndex::BITS as usize);

/// Bits for the immediate `v` field.
pub const IMM_BITS: usize = 16;

// opcode | d | x | y | v fills a word exactly, never variable-length
const_assert_eq!(
    OPCODE_BITS + 3 * FIELD_BITS + IMM_BITS,
    Word::BITS as usize
);

pub const REGISTER_COUNT: usize = 16;
const_assert_eq!(REGISTER_COUNT, 1 << FIELD_BITS);

pub const VECTOR_COUNT: usize = 16;
const_assert_eq!(VECTOR_COUNT, 1 << FIELD_BITS);

/// Extended opcodes are `x` and `y` glued together.
pub const EXTENDED_OPCODE_COUNT: usize = 1 << (2 * FIELD_BITS);
const_assert_eq!(EXTENDED_OPCODE_COUNT, 256);

pub const DEFAULT_SEGMENT_SIZE: usize = 8 * 1024 * 1024;
