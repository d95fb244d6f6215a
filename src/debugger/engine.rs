//! The rule engine: advances packet timers, evaluates conditions, dispatches actions.

use std::collections::HashSet;
use std::time::Duration;

use chrono::Local;
use framewatch_types::{MetricId, ModuleKind};

use super::condition::DebugCondition;
use super::packet::{Action, DebugPacket, EvaluationPolicy, PacketState};
use crate::sink::{screenshot_file_name, ActionSink, CallbackHandle};
use crate::source::MetricSource;

/// A packet that fired during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiredPacket {
    pub id: u32,
    /// The value substituted into the packet's message.
    pub value: f64,
}

/// Owns the packet list and evaluates it once per tick.
#[derive(Debug, Default)]
pub struct DebugEngine {
    packets: Vec<DebugPacket>,
    warned: HashSet<(ModuleKind, MetricId)>,
}

impl DebugEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_packets(packets: Vec<DebugPacket>) -> Self {
        Self {
            packets,
            warned: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn packets(&self) -> &[DebugPacket] {
        &self.packets
    }

    pub fn add_packet(&mut self, packet: DebugPacket) {
        tracing::debug!(packet = packet.id, "Adding debug packet");
        self.packets.push(packet);
    }

    /// Swap out the whole packet list. An empty list clears it.
    pub fn replace_packets(&mut self, packets: Vec<DebugPacket>) {
        tracing::debug!(count = packets.len(), "Replacing debug packets");
        self.packets = packets;
    }

    pub fn clear(&mut self) {
        self.packets.clear();
    }

    /// First packet with `id`.
    pub fn packet(&self, id: u32) -> Option<&DebugPacket> {
        self.packets.iter().find(|p| p.id == id)
    }

    pub fn packet_mut(&mut self, id: u32) -> Option<&mut DebugPacket> {
        self.packets.iter_mut().find(|p| p.id == id)
    }

    /// Every packet with `id`, in list order.
    pub fn packets_with_id(&self, id: u32) -> impl Iterator<Item = &DebugPacket> {
        self.packets.iter().filter(move |p| p.id == id)
    }

    /// Remove the first packet with `id`. Returns it if there was one.
    pub fn remove_first_with_id(&mut self, id: u32) -> Option<DebugPacket> {
        let index = self.packets.iter().position(|p| p.id == id)?;
        Some(self.packets.remove(index))
    }

    /// Remove every packet with `id` and return how many went.
    pub fn remove_all_with_id(&mut self, id: u32) -> usize {
        let before = self.packets.len();
        self.packets.retain(|p| p.id != id);
        before - self.packets.len()
    }

    /// Attach a callback to the first packet with `id`. Returns whether one was found.
    pub fn add_callback_to_first(&mut self, id: u32, handle: CallbackHandle) -> bool {
        match self.packet_mut(id) {
            Some(packet) => {
                packet.add_callback(handle);
                true
            }
            None => false,
        }
    }

    /// Attach a callback to every packet with `id` and return how many got it.
    pub fn add_callback_to_all(&mut self, id: u32, handle: CallbackHandle) -> usize {
        let mut count = 0;
        for packet in self.packets.iter_mut().filter(|p| p.id == id) {
            packet.add_callback(handle);
            count += 1;
        }
        count
    }

    /// Forget which unavailable metrics were already warned about.
    pub fn clear_warnings(&mut self) {
        self.warned.clear();
    }

    /// Run one tick.
    ///
    /// Every active packet advances its timer by `dt`; checkable packets are
    /// evaluated against `source` and, when satisfied, fire their actions
    /// into `sink`. One-shot packets that fired are removed after all packets
    /// have been processed.
    pub fn tick(
        &mut self,
        dt: Duration,
        source: &dyn MetricSource,
        sink: &mut dyn ActionSink,
    ) -> Vec<FiredPacket> {
        let mut fired = Vec::new();
        let mut spent = vec![false; self.packets.len()];

        for (index, packet) in self.packets.iter_mut().enumerate() {
            if !packet.active {
                continue;
            }
            if packet.advance(dt) != PacketState::Checkable {
                continue;
            }

            let mut lookup = |condition: &DebugCondition| {
                resolve(source, &mut self.warned, condition.metric)
            };
            let Some(value) = evaluate(packet, &mut lookup) else {
                continue;
            };

            tracing::debug!(packet = packet.id, value, "Debug packet fired");
            dispatch(packet, value, sink);
            packet.mark_fired();
            fired.push(FiredPacket {
                id: packet.id,
                value,
            });
            spent[index] = packet.execute_once;
        }

        if spent.iter().any(|s| *s) {
            let mut flags = spent.into_iter();
            self.packets.retain(|_| !flags.next().unwrap_or(false));
        }
        fired
    }
}

/// Evaluate a checkable packet. Returns the value to report if it fires.
fn evaluate(
    packet: &DebugPacket,
    resolve: &mut dyn FnMut(&DebugCondition) -> Option<f64>,
) -> Option<f64> {
    match packet.policy {
        EvaluationPolicy::All => {
            let mut met = 0;
            let mut last = 0.0;
            for condition in &packet.conditions {
                if let Some(value) = resolve(condition).filter(|v| condition.is_met_by(*v)) {
                    met += 1;
                    last = value;
                }
            }
            (met >= packet.conditions.len()).then_some(last)
        }
        EvaluationPolicy::Any => packet
            .conditions
            .iter()
            .find_map(|condition| resolve(condition).filter(|v| condition.is_met_by(*v))),
    }
}

/// Current value of `metric`, or `None` with a one-time warning.
fn resolve(
    source: &dyn MetricSource,
    warned: &mut HashSet<(ModuleKind, MetricId)>,
    metric: MetricId,
) -> Option<f64> {
    let module = metric.module();
    if !source.is_active(module) {
        if warned.insert((module, metric)) {
            tracing::warn!(
                module = %module,
                metric = %metric,
                "Module not active, cannot read metric. Enable it or set it to background"
            );
        }
        return None;
    }
    match source.value(metric) {
        Some(value) if value.is_finite() => Some(value),
        _ => {
            if warned.insert((module, metric)) {
                tracing::warn!(module = %module, metric = %metric, "No reading available for metric");
            }
            None
        }
    }
}

fn dispatch(packet: &DebugPacket, value: f64, sink: &mut dyn ActionSink) {
    for action in &packet.actions {
        match action {
            Action::Break => sink.debug_break(),
            Action::Log { level, template } => {
                if !template.is_empty() {
                    sink.log(*level, &format_message(template, value));
                }
            }
            Action::Screenshot { file_stem } => {
                sink.capture_screenshot(&screenshot_file_name(file_stem, Local::now()));
            }
            Action::Invoke(_) => {}
        }
    }

    let callbacks: Vec<CallbackHandle> = packet.callbacks().collect();
    if !callbacks.is_empty() {
        sink.invoke_callbacks(&callbacks);
    }
}

/// Substitute the reported value for `{0}` (or `{value}`) in a message template.
pub fn format_message(template: &str, value: f64) -> String {
    let value = value.to_string();
    template.replace("{0}", &value).replace("{value}", &value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugger::{Comparator, MessageLevel};
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingSink {
        logs: Vec<(MessageLevel, String)>,
        screenshots: Vec<String>,
        callbacks: Vec<CallbackHandle>,
        breaks: usize,
    }

    impl ActionSink for RecordingSink {
        fn log(&mut self, level: MessageLevel, message: &str) {
            self.logs.push((level, message.to_string()));
        }

        fn capture_screenshot(&mut self, file_name: &str) {
            self.screenshots.push(file_name.to_string());
        }

        fn invoke_callbacks(&mut self, callbacks: &[CallbackHandle]) {
            self.callbacks.extend_from_slice(callbacks);
        }

        fn debug_break(&mut self) {
            self.breaks += 1;
        }
    }

    struct FakeSource {
        values: HashMap<MetricId, f64>,
        inactive: Vec<ModuleKind>,
    }

    impl FakeSource {
        fn new(values: &[(MetricId, f64)]) -> Self {
            Self {
                values: values.iter().copied().collect(),
                inactive: Vec::new(),
            }
        }
    }

    impl MetricSource for FakeSource {
        fn value(&self, metric: MetricId) -> Option<f64> {
            self.values.get(&metric).copied()
        }

        fn is_active(&self, module: ModuleKind) -> bool {
            !self.inactive.contains(&module)
        }
    }

    fn constant(value: Option<f64>) -> impl Fn(MetricId) -> Option<f64> {
        move |_| value
    }

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn cond(metric: MetricId, comparator: Comparator, value: f64) -> DebugCondition {
        DebugCondition::new(metric, comparator, value)
    }

    #[test]
    fn all_policy_waits_for_delay_and_every_condition() {
        let packet = DebugPacket::new(1)
            .condition(cond(MetricId::Fps, Comparator::LessThan, 30.0))
            .condition(cond(MetricId::RamAllocated, Comparator::GreaterThan, 500.0));
        let mut engine = DebugEngine::with_packets(vec![packet]);
        let mut sink = RecordingSink::default();
        let source = FakeSource::new(&[(MetricId::Fps, 20.0), (MetricId::RamAllocated, 100.0)]);

        // t = 1s: still dormant
        assert!(engine.tick(secs(1.0), &source, &mut sink).is_empty());
        assert_eq!(engine.packets()[0].state(), PacketState::Dormant);

        // t = 2.1s: checkable, but only one condition holds
        assert!(engine.tick(secs(1.1), &source, &mut sink).is_empty());
        assert_eq!(engine.packets()[0].state(), PacketState::Checkable);
        assert_eq!(engine.len(), 1);

        // both hold: fires and is removed
        let source = FakeSource::new(&[(MetricId::Fps, 20.0), (MetricId::RamAllocated, 900.0)]);
        let fired = engine.tick(secs(0.016), &source, &mut sink);
        assert_eq!(fired, vec![FiredPacket { id: 1, value: 900.0 }]);
        assert!(engine.is_empty());
    }

    #[test]
    fn empty_all_fires_once_checkable() {
        let mut engine = DebugEngine::with_packets(vec![DebugPacket::new(5)
            .initial_delay(Duration::ZERO)
            .log(MessageLevel::Log, "value {0}")]);
        let mut sink = RecordingSink::default();
        let fired = engine.tick(Duration::ZERO, &constant(None), &mut sink);
        assert_eq!(fired, vec![FiredPacket { id: 5, value: 0.0 }]);
        assert_eq!(sink.logs, vec![(MessageLevel::Log, "value 0".to_string())]);
    }

    #[test]
    fn empty_any_never_fires() {
        let mut engine = DebugEngine::with_packets(vec![DebugPacket::new(5)
            .policy(EvaluationPolicy::Any)
            .initial_delay(Duration::ZERO)]);
        let mut sink = RecordingSink::default();
        for _ in 0..5 {
            assert!(engine.tick(secs(1.0), &constant(Some(1.0)), &mut sink).is_empty());
        }
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn any_policy_reports_first_met_value() {
        let packet = DebugPacket::new(2)
            .policy(EvaluationPolicy::Any)
            .initial_delay(Duration::ZERO)
            .condition(cond(MetricId::Fps, Comparator::LessThan, 10.0))
            .condition(cond(MetricId::FpsAvg, Comparator::LessThan, 50.0))
            .condition(cond(MetricId::FpsMin, Comparator::LessThan, 50.0))
            .log(MessageLevel::Warning, "fps dropped to {0}");
        let mut engine = DebugEngine::with_packets(vec![packet]);
        let mut sink = RecordingSink::default();
        let source = FakeSource::new(&[
            (MetricId::Fps, 40.0),
            (MetricId::FpsAvg, 45.0),
            (MetricId::FpsMin, 12.0),
        ]);

        let fired = engine.tick(secs(0.1), &source, &mut sink);
        assert_eq!(fired[0].value, 45.0);
        assert_eq!(sink.logs[0], (MessageLevel::Warning, "fps dropped to 45".to_string()));
    }

    #[test]
    fn repeating_packet_respects_repeat_delay() {
        let packet = DebugPacket::new(3)
            .execute_once(false)
            .initial_delay(Duration::ZERO)
            .repeat_delay(secs(1.0))
            .condition(cond(MetricId::Fps, Comparator::GreaterOrEqual, 0.0));
        let mut engine = DebugEngine::with_packets(vec![packet]);
        let mut sink = RecordingSink::default();
        let source = FakeSource::new(&[(MetricId::Fps, 60.0)]);

        let mut fire_times = Vec::new();
        let mut now = 0.0;
        for _ in 0..40 {
            now += 0.1;
            if !engine.tick(secs(0.1), &source, &mut sink).is_empty() {
                fire_times.push(now);
            }
        }

        assert!(fire_times.len() >= 3);
        for pair in fire_times.windows(2) {
            assert!(pair[1] - pair[0] >= 1.0 - 1e-9);
        }
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn one_shot_fires_at_most_once() {
        let packet = DebugPacket::new(4)
            .initial_delay(Duration::ZERO)
            .condition(cond(MetricId::Fps, Comparator::GreaterThan, 0.0));
        let mut engine = DebugEngine::with_packets(vec![packet]);
        let mut sink = RecordingSink::default();
        let source = FakeSource::new(&[(MetricId::Fps, 60.0)]);

        let total: usize = (0..10)
            .map(|_| engine.tick(secs(3.0), &source, &mut sink).len())
            .sum();
        assert_eq!(total, 1);
        assert!(engine.packet(4).is_none());
    }

    #[test]
    fn inactive_module_makes_condition_unmet() {
        let packet = DebugPacket::new(6)
            .initial_delay(Duration::ZERO)
            .condition(cond(MetricId::AudioDb, Comparator::GreaterThan, -80.0));
        let mut engine = DebugEngine::with_packets(vec![packet]);
        let mut sink = RecordingSink::default();
        let mut source = FakeSource::new(&[(MetricId::AudioDb, -10.0)]);
        source.inactive.push(ModuleKind::Audio);

        for _ in 0..3 {
            assert!(engine.tick(secs(0.1), &source, &mut sink).is_empty());
        }
        // warned once for the pair, not every tick
        assert_eq!(engine.warned.len(), 1);
        assert!(engine.warned.contains(&(ModuleKind::Audio, MetricId::AudioDb)));

        source.inactive.clear();
        assert_eq!(engine.tick(secs(0.1), &source, &mut sink).len(), 1);
    }

    #[test]
    fn non_finite_reading_is_unavailable() {
        let packet = DebugPacket::new(6)
            .initial_delay(Duration::ZERO)
            .condition(cond(MetricId::Fps, Comparator::LessThan, 1.0e9));
        let mut engine = DebugEngine::with_packets(vec![packet]);
        let mut sink = RecordingSink::default();
        let source = FakeSource::new(&[(MetricId::Fps, f64::NAN)]);
        assert!(engine.tick(secs(0.1), &source, &mut sink).is_empty());
    }

    #[test]
    fn inactive_packet_is_skipped_entirely() {
        let packet = DebugPacket::new(7)
            .active(false)
            .initial_delay(secs(1.0));
        let mut engine = DebugEngine::with_packets(vec![packet]);
        let mut sink = RecordingSink::default();
        engine.tick(secs(5.0), &constant(None), &mut sink);
        assert_eq!(engine.packets()[0].elapsed(), Duration::ZERO);
        assert_eq!(engine.packets()[0].state(), PacketState::Dormant);
    }

    #[test]
    fn dispatch_runs_every_action() {
        let packet = DebugPacket::new(8)
            .initial_delay(Duration::ZERO)
            .debug_break()
            .log(MessageLevel::Error, "")
            .log(MessageLevel::Error, "allocs {0} KB")
            .screenshot("alloc spike")
            .callback(CallbackHandle(1))
            .callback(CallbackHandle(2))
            .condition(cond(MetricId::DevAllocsAvg, Comparator::GreaterThan, 50.0));
        let mut engine = DebugEngine::with_packets(vec![packet]);
        let mut sink = RecordingSink::default();
        let source = FakeSource::new(&[(MetricId::DevAllocsAvg, 64.0)]);

        engine.tick(secs(0.1), &source, &mut sink);
        assert_eq!(sink.breaks, 1);
        assert_eq!(sink.logs, vec![(MessageLevel::Error, "allocs 64 KB".to_string())]);
        assert_eq!(sink.screenshots.len(), 1);
        assert!(sink.screenshots[0].starts_with("alloc_spike_"));
        assert!(sink.screenshots[0].ends_with(".png"));
        assert!(!sink.screenshots[0].contains(':'));
        assert_eq!(sink.callbacks, vec![CallbackHandle(1), CallbackHandle(2)]);
    }

    #[test]
    fn removal_happens_after_all_packets_are_processed() {
        let make = |id| {
            DebugPacket::new(id)
                .initial_delay(Duration::ZERO)
                .condition(cond(MetricId::Fps, Comparator::GreaterThan, 0.0))
        };
        let mut engine = DebugEngine::with_packets(vec![
            make(1),
            make(2).execute_once(false),
            make(3),
        ]);
        let mut sink = RecordingSink::default();
        let fired = engine.tick(secs(0.1), &constant(Some(60.0)), &mut sink);
        assert_eq!(fired.iter().map(|f| f.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(engine.packets().iter().map(|p| p.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn registry_operations() {
        let mut engine = DebugEngine::new();
        engine.add_packet(DebugPacket::new(1));
        engine.add_packet(DebugPacket::new(2));
        engine.add_packet(DebugPacket::new(1).execute_once(false));

        assert_eq!(engine.packets_with_id(1).count(), 2);
        assert!(engine.packet(1).unwrap().execute_once);

        assert!(engine.add_callback_to_first(1, CallbackHandle(9)));
        assert!(!engine.add_callback_to_first(42, CallbackHandle(9)));
        assert_eq!(engine.add_callback_to_all(1, CallbackHandle(10)), 2);
        assert_eq!(engine.packet(1).unwrap().callbacks().count(), 2);

        let removed = engine.remove_first_with_id(1).unwrap();
        assert!(removed.execute_once);
        assert_eq!(engine.packets_with_id(1).count(), 1);
        assert!(engine.remove_first_with_id(42).is_none());

        engine.add_packet(DebugPacket::new(1));
        assert_eq!(engine.remove_all_with_id(1), 2);
        assert_eq!(engine.len(), 1);

        engine.replace_packets(Vec::new());
        assert!(engine.is_empty());
    }

    #[test]
    fn message_formatting() {
        assert_eq!(format_message("fps {0}", 29.5), "fps 29.5");
        assert_eq!(format_message("{value}/{0}", 3.0), "3/3");
        assert_eq!(format_message("no placeholder", 1.0), "no placeholder");
    }
}
