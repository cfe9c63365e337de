// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node template sets.

pub mod calculator;

pub use calculator::create_calculator_registry;
