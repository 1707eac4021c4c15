// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use crate::{arch::Value, fault::Fault, op::Width};

/// The machine's only addressable memory, used as its stack. Addresses are
/// offsets from the start of the segment.
pub struct Segment {
    bytes: Box<[u8]>,
}

impl Segment {
    /// Offset of the first byte; where `base` and `stack` start out.
    pub const BASE: Value = 0;

    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size].into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Reads `width` bytes at `offset`, little-endian, zero-extended.
    pub fn read(&self, offset: Value, width: Width) -> Result<Value, Fault> {
        let bytes = &self.bytes[self.span(offset, width)?];
        let mut buffer = [0; 8];
        buffer[..bytes.len()].copy_from_slice(bytes);
        Ok(Value::from_le_bytes(buffer))
    }

    /// Writes the low `width` bytes of `value` at `offset`, little-endian.
    /// Nothing is written if any byte would fall outside the segment.
    pub fn write(
        &mut self,
        offset: Value,
        width: Width,
        value: Value,
    ) -> Result<(), Fault> {
        let span = self.span(offset, width)?;
        self.bytes[span].copy_from_slice(&value.to_le_bytes()[..width.bytes()]);
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    fn span(
        &self,
        offset: Value,
        width: Width,
    ) -> Result<std::ops::Range<usize>, Fault> {
        let out_of_bounds = Fault::MemoryOutOfBounds {
            offset,
            width: width.bytes(),
            size: self.len(),
        };
        let start = usize::try_from(offset).map_err(|_| out_of_bounds)?;
        let end = start
            .checked_add(width.bytes())
            .filter(|&end| end <= self.len())
            .ok_or(out_of_bounds)?;
        Ok(start..end)
    }
}
