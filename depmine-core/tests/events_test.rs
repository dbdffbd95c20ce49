//! Tests for the event dispatcher.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use depmine_core::events::{
    DiscoveryEventHandler, EventDispatcher, PhaseStartedEvent, RuleDiscoveredEvent,
};

#[derive(Default)]
struct CountingHandler {
    phases: AtomicUsize,
    rules: AtomicUsize,
}

impl DiscoveryEventHandler for CountingHandler {
    fn on_phase_started(&self, _event: &PhaseStartedEvent) {
        self.phases.fetch_add(1, Ordering::SeqCst);
    }

    fn on_rule_discovered(&self, _event: &RuleDiscoveredEvent) {
        self.rules.fetch_add(1, Ordering::SeqCst);
    }
}

struct PanickingHandler;

impl DiscoveryEventHandler for PanickingHandler {
    fn on_rule_discovered(&self, _event: &RuleDiscoveredEvent) {
        panic!("handler blew up");
    }
}

#[test]
fn test_dispatch_reaches_all_handlers() {
    let mut dispatcher = EventDispatcher::new();
    let handler = Arc::new(CountingHandler::default());
    dispatcher.register(handler.clone());
    assert_eq!(dispatcher.handler_count(), 1);

    dispatcher.emit_phase_started(&PhaseStartedEvent {
        kind: "tgd".to_string(),
        node_count: 3,
        edge_count: 2,
    });
    dispatcher.emit_rule_discovered(&RuleDiscoveredEvent {
        kind: "tgd".to_string(),
        display: "a ⊆ b".to_string(),
        support: 1.0,
        confidence: 1.0,
    });

    assert_eq!(handler.phases.load(Ordering::SeqCst), 1);
    assert_eq!(handler.rules.load(Ordering::SeqCst), 1);
}

#[test]
fn test_panicking_handler_does_not_block_others() {
    let mut dispatcher = EventDispatcher::new();
    let counter = Arc::new(CountingHandler::default());
    dispatcher.register(Arc::new(PanickingHandler));
    dispatcher.register(counter.clone());

    dispatcher.emit_rule_discovered(&RuleDiscoveredEvent {
        kind: "fd".to_string(),
        display: "T: x → y".to_string(),
        support: 0.5,
        confidence: 1.0,
    });

    assert_eq!(counter.rules.load(Ordering::SeqCst), 1);
}

#[test]
fn test_empty_dispatcher_is_noop() {
    let dispatcher = EventDispatcher::new();
    assert_eq!(dispatcher.handler_count(), 0);
    dispatcher.emit_phase_started(&PhaseStartedEvent {
        kind: "horn".to_string(),
        node_count: 0,
        edge_count: 0,
    });
}
