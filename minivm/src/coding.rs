// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use crate::arch::Word;

/// Iteratively packs fields into a [`Word`], least significant field first.
#[macro_export]
macro_rules! encode {
    (
        $T:ty;
        $([..$($width:literal)?$($width2:ident)?..] = $int:expr),*
    ) => {
        {
            let mut offset = 0;
            let mut result: $T = 0;
            $(
                let encoded_int: $T = $int.encode_as_word();
                let mask: $T = (((1 as $T) << $($width)* $($width2)*) - 1) as $T;
                result |= ((encoded_int & mask) << offset);
                offset += $($width)* $($width2)*;
            )*
            let _ = offset;
            result
        }
    };
}

/// Types that occupy one field of an instruction word.
pub trait CodeAsWord {
    /// Encodes `self` into a `Word`. Higher bits are chopped off by the
    /// field mask in [`encode!`], so a `0b1_0000u8` in a 4-bit field encodes
    /// as `0b0000`.
    fn encode_as_word(&self) -> Word;

    // Decodes `self` from a `Word` whose high bits are already masked off.
    fn decode_from_word(encoded: Word) -> Self;
}

impl CodeAsWord for u8 {
    fn encode_as_word(&self) -> Word {
        *self as Word
    }

    fn decode_from_word(encoded: Word) -> Self {
        encoded as u8
    }
}

impl CodeAsWord for u16 {
    fn encode_as_word(&self) -> Word {
        *self as Word
    }

    fn decode_from_word(encoded: Word) -> Self {
        encoded as u16
    }
}

/// Unpacks a [`Word`] into typed fields, least significant field first.
#[macro_export]
macro_rules! decode {
    (
        $encoded:expr; $TEnc:ty;
        @($($out:ident: $T:ty =
            [..$($width:literal)?$($width2:ident)?..]),*)
        => $block:expr
    ) => {{
        let encoded: $TEnc = $encoded;
        let mut __offset = 0;
        $(
            let op_width = $($width)*$($width2)* as $TEnc;
            let mask = (1 as $TEnc).checked_shl(op_width).unwrap_or(0).wrapping_sub(1);
            let $out = <$T>::decode_from_word((encoded >> __offset) & mask);
            __offset += op_width;
        )*
        let _ = __offset;
        $block
    }};
}
