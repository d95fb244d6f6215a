//! # framewatch-types
//!
//! Core types for in-process frame telemetry. This crate defines the shared
//! vocabulary between whatever samples the host's performance counters and
//! the framewatch aggregation and rule engine.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature to read and write frames
//! - **Closed metric set**: Every metric belongs to exactly one overlay module
//! - **Ergonomic builders**: Fluent API for constructing frame samples
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `serde`: JSON/TOML/etc. serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use framewatch_types::{FrameSample, MetricId, ModuleKind};
//!
//! let frame = FrameSample::builder()
//!     .delta_ms(16.6)
//!     .fps(|f| f.current(60.2).min(48.0).avg(59.1))
//!     .value(MetricId::DevAllocs, 4096.0)
//!     .build();
//!
//! assert_eq!(frame.get(MetricId::Fps), Some(60.2));
//! assert_eq!(MetricId::DevAllocs.module(), ModuleKind::Dev);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod frame;
mod metric;
mod module;

pub use frame::*;
pub use metric::*;
pub use module::*;
