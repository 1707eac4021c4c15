// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

#![forbid(unsafe_code)]

pub mod access;
pub mod alu;
pub mod arch;
pub mod coding;
pub mod config;
pub mod control;
pub mod extended;
pub mod fault;
pub mod interrupt;
pub mod memory;
pub mod op;
pub mod program;
pub mod register;
pub mod state;
pub mod vm;

#[cfg(test)]
mod test_utils;

pub use config::{Config, ReservedPolicy};
pub use extended::{ExtendedHandler, Flow};
pub use fault::{Fault, StopReason};
pub use op::Op;
pub use vm::{Engine, Execution, Machine};
