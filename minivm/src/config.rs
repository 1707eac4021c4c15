// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use crate::arch::DEFAULT_SEGMENT_SIZE;

/// What to do with registers 12 and 13 and with branch conditions 7
/// through 15, none of which have an assigned meaning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReservedPolicy {
    /// Any use raises an illegal operation.
    #[default]
    Strict,
    /// Registers 12 and 13 behave as general purpose; undefined conditions
    /// are never taken.
    Permissive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Size in bytes of the memory segment given to each machine.
    pub segment_size: usize,
    pub reserved: ReservedPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            segment_size: DEFAULT_SEGMENT_SIZE,
            reserved: ReservedPolicy::default(),
        }
    }
}

impl Config {
    pub fn with_segment_size(mut self, segment_size: usize) -> Self {
        self.segment_size = segment_size;
        self
    }

    pub fn with_reserved_policy(mut self, reserved: ReservedPolicy) -> Self {
        self.reserved = reserved;
        self
    }
}
