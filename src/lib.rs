//! # framewatch
//!
//! The core of a frame-driven telemetry overlay.
//!
//! Every host frame the overlay takes one [`FrameSample`] of raw counters,
//! folds it into rolling per-metric series ready for graphing, classifies
//! the headline values into severity bands, and evaluates user-defined debug
//! packets that log, capture screenshots or run callbacks when their
//! conditions hold. Drawing and counter acquisition belong to the host.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Overlay                             │
//! │                                                              │
//! │  FrameSample ─▶ MetricStore ─┬─▶ GraphSet (MetricSeries)     │
//! │       ▲                      ├─▶ ThresholdClassifier         │
//! │       │                      └─▶ DebugEngine ─▶ ActionSink   │
//! │  ┌────┴────┐                                                 │
//! │  │ source  │◀── FileSource | ChannelSource                   │
//! │  └─────────┘                                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`data`]**: Rolling series, the allocation average, thresholds, packed
//!   module presets and graph state
//! - **[`debugger`]**: Debug packets and the engine that evaluates them
//! - **[`source`]**: Where readings come from ([`MetricSource`], [`FrameSource`])
//! - **[`sink`]**: Where fired actions go ([`ActionSink`])
//! - **[`config`]**: TOML/environment configuration
//! - **[`overlay`]**: The per-frame orchestrator
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Replay a recording of JSON-lines frames
//! framewatch --file frames.jsonl --config overlay.toml
//! ```
//!
//! ### Driving an overlay from a host loop
//!
//! ```
//! use std::time::Duration;
//! use framewatch::{
//!     Comparator, DebugCondition, DebugPacket, MessageLevel, Overlay, OverlayConfig, TracingSink,
//! };
//! use framewatch_types::{FrameSample, MetricId, Severity};
//!
//! let mut overlay = Overlay::new(&OverlayConfig::default()).unwrap();
//! overlay.debugger_mut().add_packet(
//!     DebugPacket::new(1)
//!         .initial_delay(Duration::ZERO)
//!         .condition(DebugCondition::new(MetricId::Fps, Comparator::LessThan, 20.0))
//!         .log(MessageLevel::Warning, "FPS dropped to {0}"),
//! );
//!
//! let mut sink = TracingSink::default();
//! let frame = FrameSample::builder().delta_ms(66.0).value(MetricId::Fps, 15.0).build();
//! let report = overlay.tick(&frame, &mut sink);
//!
//! assert_eq!(report.fps, Some(Severity::Critical));
//! assert_eq!(report.fired.len(), 1);
//! ```
//!
//! ### Feeding frames through a channel
//!
//! ```
//! use framewatch::{ChannelSource, FrameSource, Overlay, OverlayConfig, TracingSink};
//! use framewatch_types::{FrameSample, MetricId};
//!
//! # tokio_test::block_on(async {
//! let (tx, mut source) = ChannelSource::create("render thread");
//!
//! tokio::spawn(async move {
//!     let frame = FrameSample::builder().delta_ms(16.6).value(MetricId::Fps, 60.0).build();
//!     let _ = tx.send(frame);
//! })
//! .await
//! .unwrap();
//!
//! let mut overlay = Overlay::new(&OverlayConfig::default()).unwrap();
//! let mut sink = TracingSink::default();
//! let mut ticked = 0;
//! while let Some(frame) = source.poll() {
//!     overlay.tick(&frame, &mut sink);
//!     ticked += 1;
//! }
//! assert_eq!(ticked, 1);
//! # });
//! ```

pub mod config;
pub mod data;
pub mod debugger;
pub mod error;
pub mod overlay;
pub mod sink;
pub mod source;

pub use config::OverlayConfig;
pub use data::{
    GraphMode, MetricSeries, ModulePreset, PeakPolicy, PresetCycle, RollingAverage,
    ThresholdClassifier,
};
pub use debugger::{
    Action, Comparator, DebugCondition, DebugEngine, DebugPacket, EvaluationPolicy, FiredPacket,
    MessageLevel,
};
pub use error::{Error, Result};
pub use overlay::{Overlay, TickReport};
pub use sink::{ActionSink, CallbackHandle, CallbackRegistry, TracingSink};
pub use source::{ChannelSource, FileSource, FrameSource, MetricSource, MetricStore};

pub use framewatch_types::{FrameSample, MetricId, ModuleKind, ModuleState, Severity};
