// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Record handling, value generators and the masking engine.

pub mod aliases;
pub mod engine;
pub mod generators;
pub mod normalizer;
pub mod records;
pub mod strategy;
pub mod summary;

pub use engine::{MalformedRowPolicy, MaskOptions, MaskingEngine, RecordTarget};
pub use records::{DEFAULT_DELIMITER, SentinelMode, parse_delimiter};
pub use strategy::StrategyRegistry;
