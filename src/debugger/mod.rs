//! Condition-triggered debug actions.
//!
//! A [`DebugPacket`] binds a list of [`DebugCondition`]s to a list of
//! [`Action`]s. The [`DebugEngine`] advances each packet's timer every tick,
//! evaluates the packets whose delay has passed, and sends the actions of
//! satisfied packets to an [`ActionSink`](crate::ActionSink).
//!
//! ```text
//!            initial/repeat delay elapsed
//!   Dormant ─────────────────────────────▶ Checkable
//!      ▲                                       │ conditions hold
//!      │ repeat                                ▼
//!      └──────────────────────────────────── Fired ──▶ removed (execute_once)
//! ```

mod condition;
mod engine;
mod packet;

pub use condition::{approximately, Comparator, DebugCondition};
pub use engine::{format_message, DebugEngine, FiredPacket};
pub use packet::{Action, DebugPacket, EvaluationPolicy, MessageLevel, PacketState, DEFAULT_DELAY};
