// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use crate::{
    arch::Word,
    op::{DecodeError, Op},
};

pub type EncodedProgram = Vec<Word>;
pub type DecodedProgram = Vec<Op>;

pub fn encode_program(program: &[Op]) -> EncodedProgram {
    program.iter().map(Op::encode_packed).collect()
}

/// Decodes every word, failing on the first one that is not an [`Op`].
pub fn decode_program(program: &[Word]) -> Result<DecodedProgram, DecodeError> {
    program.iter().map(|&word| Op::decode_packed(word)).collect()
}
