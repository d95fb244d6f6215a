//! Debug packets: conditions, actions and the timer that gates them.

use std::time::Duration;

use serde::Deserialize;

use super::condition::DebugCondition;
use crate::sink::CallbackHandle;

/// Default wait before a packet is first checked, and between repeats.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// How a packet's conditions combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationPolicy {
    /// Every condition must hold. No conditions at all counts as holding.
    #[default]
    All,
    /// At least one condition must hold. No conditions never holds.
    Any,
}

/// Severity of a packet's log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    #[default]
    Log,
    Warning,
    Error,
}

/// Something a packet does when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Log `template` with `{0}` replaced by the last resolved value.
    Log { level: MessageLevel, template: String },
    /// Capture the screen to `{file_stem}_{timestamp}.png`.
    Screenshot { file_stem: String },
    /// Ask the host to pause.
    Break,
    /// Run a registered callback.
    Invoke(CallbackHandle),
}

/// Where a packet is in its timer cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketState {
    /// Waiting out the initial or repeat delay.
    Dormant,
    /// Evaluated every tick until it fires.
    Checkable,
}

/// A rule binding conditions to actions.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugPacket {
    /// Optional identifier used to look packets up; not unique.
    pub id: u32,
    /// Inactive packets are skipped entirely, timers included.
    pub active: bool,
    pub conditions: Vec<DebugCondition>,
    pub policy: EvaluationPolicy,
    /// Remove the packet after it fires once.
    pub execute_once: bool,
    pub initial_delay: Duration,
    pub repeat_delay: Duration,
    pub actions: Vec<Action>,
    state: PacketState,
    fired_before: bool,
    elapsed: Duration,
}

impl Default for DebugPacket {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DebugPacket {
    /// An active, one-shot packet with no conditions or actions and 2 s delays.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            active: true,
            conditions: Vec::new(),
            policy: EvaluationPolicy::All,
            execute_once: true,
            initial_delay: DEFAULT_DELAY,
            repeat_delay: DEFAULT_DELAY,
            actions: Vec::new(),
            state: PacketState::Dormant,
            fired_before: false,
            elapsed: Duration::ZERO,
        }
    }

    pub fn condition(mut self, condition: DebugCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn policy(mut self, policy: EvaluationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn execute_once(mut self, execute_once: bool) -> Self {
        self.execute_once = execute_once;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn repeat_delay(mut self, delay: Duration) -> Self {
        self.repeat_delay = delay;
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn log(self, level: MessageLevel, template: impl Into<String>) -> Self {
        self.action(Action::Log {
            level,
            template: template.into(),
        })
    }

    pub fn screenshot(self, file_stem: impl Into<String>) -> Self {
        self.action(Action::Screenshot {
            file_stem: file_stem.into(),
        })
    }

    pub fn debug_break(self) -> Self {
        self.action(Action::Break)
    }

    pub fn callback(self, handle: CallbackHandle) -> Self {
        self.action(Action::Invoke(handle))
    }

    /// Attach a callback to an existing packet.
    pub fn add_callback(&mut self, handle: CallbackHandle) {
        self.actions.push(Action::Invoke(handle));
    }

    pub fn state(&self) -> PacketState {
        self.state
    }

    pub fn has_fired(&self) -> bool {
        self.fired_before
    }

    /// Time accumulated toward the current delay.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Advance the timer by one frame and return the resulting state.
    ///
    /// A dormant packet becomes checkable once its accumulated time reaches
    /// the initial delay (before the first fire) or the repeat delay (after),
    /// at which point the accumulator restarts from zero.
    pub fn advance(&mut self, dt: Duration) -> PacketState {
        if self.state == PacketState::Dormant {
            self.elapsed = self.elapsed.saturating_add(dt);
            let delay = if self.fired_before {
                self.repeat_delay
            } else {
                self.initial_delay
            };
            if self.elapsed >= delay {
                tracing::trace!(packet = self.id, "Packet checkable");
                self.state = PacketState::Checkable;
                self.elapsed = Duration::ZERO;
            }
        }
        self.state
    }

    /// Record that the packet fired; it goes back to waiting out the repeat delay.
    pub fn mark_fired(&mut self) {
        self.state = PacketState::Dormant;
        self.fired_before = true;
    }

    /// Callback handles attached to this packet, in order.
    pub fn callbacks(&self) -> impl Iterator<Item = CallbackHandle> + '_ {
        self.actions.iter().filter_map(|a| match a {
            Action::Invoke(handle) => Some(*handle),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn defaults() {
        let packet = DebugPacket::new(7);
        assert_eq!(packet.id, 7);
        assert!(packet.active);
        assert!(packet.execute_once);
        assert_eq!(packet.policy, EvaluationPolicy::All);
        assert_eq!(packet.initial_delay, Duration::from_secs(2));
        assert_eq!(packet.repeat_delay, Duration::from_secs(2));
        assert_eq!(packet.state(), PacketState::Dormant);
    }

    #[test]
    fn becomes_checkable_after_initial_delay() {
        let mut packet = DebugPacket::new(1).initial_delay(ms(2000));
        assert_eq!(packet.advance(ms(1000)), PacketState::Dormant);
        assert_eq!(packet.advance(ms(1100)), PacketState::Checkable);
        assert_eq!(packet.elapsed(), Duration::ZERO);
        // stays checkable without further time
        assert_eq!(packet.advance(ms(0)), PacketState::Checkable);
    }

    #[test]
    fn repeat_delay_applies_after_fire() {
        let mut packet = DebugPacket::new(1)
            .initial_delay(ms(100))
            .repeat_delay(ms(500));
        packet.advance(ms(100));
        packet.mark_fired();
        assert!(packet.has_fired());
        assert_eq!(packet.advance(ms(400)), PacketState::Dormant);
        assert_eq!(packet.advance(ms(100)), PacketState::Checkable);
    }

    #[test]
    fn zero_delay_is_checkable_immediately() {
        let mut packet = DebugPacket::new(1).initial_delay(Duration::ZERO);
        assert_eq!(packet.advance(Duration::ZERO), PacketState::Checkable);
    }

    #[test]
    fn builder_collects_actions() {
        let packet = DebugPacket::new(3)
            .log(MessageLevel::Warning, "fps {0}")
            .screenshot("low_fps")
            .debug_break()
            .callback(CallbackHandle(4));
        assert_eq!(packet.actions.len(), 4);
        assert_eq!(packet.callbacks().collect::<Vec<_>>(), vec![CallbackHandle(4)]);
    }
}
