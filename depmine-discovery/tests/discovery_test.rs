//! End-to-end discovery tests over in-memory SQLite fixtures.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use depmine_core::config::DiscoveryConfig;
use depmine_core::events::{
    DiscoveryEventHandler, PhaseCompleteEvent, PhaseStartedEvent, RuleDiscoveredEvent,
};
use depmine_core::traits::{Cancellable, CancellationToken, RelationalStore};
use depmine_core::types::kind::{CompatibilityMode, DependencyKind};
use depmine_storage::SqliteStore;
use depmine_discovery::strategy::HornStrategy;
use depmine_discovery::traversal::budget_admit;
use depmine_discovery::{
    AttributeMapper, CandidateRule, Checkpoint, DfsTraversal, DiscoverySession, JoinablePair,
    Oracle, OracleConfig, Rule, RuleStrategy, SearchBudgets, TraversalGuide,
};

/// One table where x functionally determines y (and y determines x).
fn fd_store() -> Arc<dyn RelationalStore> {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .connection()
        .execute_batch(
            "CREATE TABLE t (x INTEGER, y TEXT);
             INSERT INTO t VALUES (1, 'a'), (1, 'a'), (2, 'b'), (3, 'c');",
        )
        .unwrap();
    Arc::new(store)
}

/// Foreign-key shape: every orders.customer_id exists in customers.id,
/// customer 3 has no orders.
fn fk_store() -> Arc<dyn RelationalStore> {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .connection()
        .execute_batch(
            "CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT);
             CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER, total REAL);
             INSERT INTO customers VALUES (1, 'ada'), (2, 'grace'), (3, 'edsger');
             INSERT INTO orders VALUES (10, 1, 9.5), (11, 1, 12.0), (12, 2, 3.25);",
        )
        .unwrap();
    Arc::new(store)
}

/// dept determines mgr only approximately: dept 'b' has two managers.
fn egd_store() -> Arc<dyn RelationalStore> {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .connection()
        .execute_batch(
            "CREATE TABLE emp (dept TEXT, mgr TEXT);
             INSERT INTO emp VALUES
                 ('a', 'x'), ('a', 'x'), ('b', 'y'), ('b', 'y'), ('b', 'z');",
        )
        .unwrap();
    Arc::new(store)
}

fn find_rule<'a>(rules: &'a [Rule], display: &str) -> Option<&'a Rule> {
    rules.iter().find(|r| r.display() == display)
}

#[test]
fn fd_phase_finds_x_determines_y() {
    let mut session = DiscoverySession::new(fd_store(), DiscoveryConfig::default()).unwrap();
    let report = session.run_phase(DependencyKind::Fd, None).unwrap();

    let rule = find_rule(&report.rules, "t: x \u{2192} y").expect("x determines y");
    assert!((rule.support() - 0.75).abs() < 1e-9);
    assert!((rule.confidence() - 1.0).abs() < 1e-9);

    // The reversed path re-derives both rules; dedup drops them.
    assert_eq!(report.rules.len(), 2);
    assert_eq!(report.duplicates, 2);
    assert!(find_rule(&report.rules, "t: y \u{2192} x").is_some());
}

#[test]
fn tgd_phase_finds_the_inclusion_with_full_confidence() {
    let mut config = DiscoveryConfig::default();
    config.max_occurrence = 1;
    let mut session = DiscoverySession::new(fk_store(), config).unwrap();
    let report = session.run_phase(DependencyKind::Tgd, None).unwrap();

    assert_eq!(report.rules.len(), 1);
    let rule = &report.rules[0];
    assert_eq!(rule.display(), "orders.customer_id \u{2286} customers.id");
    assert!((rule.support() - 1.0).abs() < 1e-9);
    assert!((rule.confidence() - 1.0).abs() < 1e-9);
    match rule {
        Rule::Tgd(tgd) => assert!(tgd.inclusion),
        other => panic!("expected a tgd, got {other:?}"),
    }
}

#[test]
fn tgd_inclusion_ignores_null_anchors() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .connection()
        .execute_batch(
            "CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT);
             CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER, total REAL);
             INSERT INTO customers VALUES (1, 'ada'), (2, 'grace'), (3, 'edsger');
             INSERT INTO orders VALUES
                 (10, 1, 9.5), (11, 1, 12.0), (12, 2, 3.25), (13, NULL, 1.0);",
        )
        .unwrap();
    let mut config = DiscoveryConfig::default();
    config.max_occurrence = 1;
    let mut session =
        DiscoverySession::new(Arc::new(store) as Arc<dyn RelationalStore>, config).unwrap();
    let report = session.run_phase(DependencyKind::Tgd, None).unwrap();

    // NULLs do not break containment; they only lower support.
    let rule = find_rule(&report.rules, "orders.customer_id \u{2286} customers.id")
        .expect("containment still holds");
    assert!((rule.support() - 0.75).abs() < 1e-9);
    assert!((rule.confidence() - 1.0).abs() < 1e-9);
}

#[test]
fn egd_phase_measures_violations() {
    let mut session = DiscoverySession::new(egd_store(), DiscoveryConfig::default()).unwrap();
    let report = session.run_phase(DependencyKind::Egd, None).unwrap();

    assert_eq!(report.rules.len(), 2);

    // dept 'b' maps to two managers: 4 of 8 same-dept pairs disagree.
    let approx = find_rule(
        &report.rules,
        "emp#0.dept = emp#1.dept \u{21d2} emp#0.mgr = emp#1.mgr",
    )
    .expect("approximate dependency");
    assert!((approx.confidence() - 0.5).abs() < 1e-9);
    assert!((approx.support() - 4.0 / 25.0).abs() < 1e-9);

    // Same manager always means same department here.
    let exact = find_rule(
        &report.rules,
        "emp#0.mgr = emp#1.mgr \u{21d2} emp#0.dept = emp#1.dept",
    )
    .expect("exact dependency");
    assert!((exact.confidence() - 1.0).abs() < 1e-9);
}

#[test]
fn horn_phase_emits_rules_with_bounded_metrics() {
    let mut config = DiscoveryConfig::default();
    config.max_table = 2;
    let mut session = DiscoverySession::new(fk_store(), config).unwrap();
    let report = session.run_phase(DependencyKind::Horn, None).unwrap();

    assert!(!report.rules.is_empty());
    assert!(report.stats.candidates > 0);
    for rule in &report.rules {
        assert!((0.0..=1.0).contains(&rule.support()), "{}", rule.display());
        assert!(
            (0.0..=1.0).contains(&rule.confidence()),
            "{}",
            rule.display()
        );
        assert!(matches!(rule, Rule::Horn(_)));
    }
}

#[test]
fn occurrence_budget_of_one_stops_fd_search() {
    let mut config = DiscoveryConfig::default();
    config.max_table = 1;
    let mut session = DiscoverySession::new(fd_store(), config).unwrap();
    let report = session.run_phase(DependencyKind::Fd, None).unwrap();

    // Every FD pair binds two occurrences of its table.
    assert_eq!(report.stats.candidates, 0);
    assert!(report.rules.is_empty());
}

#[test]
fn all_algorithms_discover_the_same_rule_set() {
    let mut hashes: Vec<BTreeSet<u64>> = Vec::new();
    for algorithm in ["dfs", "bfs", "astar"] {
        let mut config = DiscoveryConfig::default();
        config.algorithm = algorithm.to_string();
        let mut session = DiscoverySession::new(fd_store(), config).unwrap();
        let report = session.run_phase(DependencyKind::Fd, None).unwrap();
        hashes.push(report.rules.iter().map(Rule::structural_hash).collect());
    }
    assert_eq!(hashes[0], hashes[1]);
    assert_eq!(hashes[1], hashes[2]);
}

#[test]
fn run_covers_multiple_phases() {
    let mut session = DiscoverySession::new(fk_store(), DiscoveryConfig::default()).unwrap();
    let result = session.run(&[DependencyKind::Fd, DependencyKind::Tgd], None);

    assert!(result.is_clean());
    assert_eq!(result.data.len(), 2);
    assert_eq!(result.data[0].kind, DependencyKind::Fd);
    assert_eq!(result.data[1].kind, DependencyKind::Tgd);
}

#[test]
fn cancellation_stops_the_run_with_partial_results() {
    let token = CancellationToken::new();
    token.cancel();
    let mut session = DiscoverySession::new(fd_store(), DiscoveryConfig::default()).unwrap();
    let result = session.run(&[DependencyKind::Fd, DependencyKind::Egd], Some(&token));

    assert_eq!(result.data.len(), 1);
    assert!(result.data[0].cancelled);
    assert!(result.data[0].rules.is_empty());
    assert_eq!(result.error_count(), 1);
}

#[test]
fn cancellation_is_honored_when_no_split_is_accepted() {
    let token = CancellationToken::new();
    token.cancel();
    let mut config = DiscoveryConfig::default();
    // A floor of 1.0 rejects every split of this fixture, so the phase
    // would otherwise walk all candidates without yielding once.
    config.low_quality_floor = 1.0;
    let mut session = DiscoverySession::new(fd_store(), config).unwrap();
    let result = session.run(&[DependencyKind::Fd, DependencyKind::Egd], Some(&token));

    assert_eq!(result.data.len(), 1);
    assert!(result.data[0].cancelled);
    assert_eq!(result.data[0].stats.candidates, 0);
    assert!(result.data[0].rules.is_empty());
    assert_eq!(result.error_count(), 1);
}

/// Two tables joinable only through their `a` columns; binding z costs
/// four variables per occurrence, binding w only two.
fn wide_store() -> Arc<dyn RelationalStore> {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .connection()
        .execute_batch(
            "CREATE TABLE w (a INTEGER, b INTEGER);
             CREATE TABLE z (a INTEGER, c INTEGER, d INTEGER, e INTEGER);
             INSERT INTO w VALUES (1, 10), (2, 20);
             INSERT INTO z VALUES (1, 5, 6, 7), (2, 8, 9, 30);",
        )
        .unwrap();
    Arc::new(store)
}

#[test]
fn tightening_the_variable_budget_only_removes_candidates() {
    struct BudgetOnly {
        mapper: Arc<AttributeMapper>,
    }

    impl TraversalGuide for BudgetOnly {
        fn feasible(&self, _path: &CandidateRule) -> bool {
            true
        }

        fn admit(&self, path: &CandidateRule, next: JoinablePair, budgets: &SearchBudgets) -> bool {
            budget_admit(&self.mapper, path, next, budgets)
        }
    }

    let store = wide_store();
    let oracle = Oracle::new(
        CompatibilityMode::ValueOverlap,
        OracleConfig::from_config(&DiscoveryConfig::default()),
    );
    let space = HornStrategy.init(store.as_ref(), &oracle, 2, false).unwrap();

    let collect = |max_vars: usize| -> Vec<CandidateRule> {
        let guide = BudgetOnly {
            mapper: Arc::clone(&space.mapper),
        };
        let budgets = SearchBudgets {
            max_table: 3,
            max_vars,
        };
        DfsTraversal::new(Arc::clone(&space.graph), guide, budgets, None).collect()
    };

    let loose = collect(8);
    let tight = collect(4);

    // The tight run keeps the cheap w self-joins but loses everything that
    // binds a z occurrence; nothing new may appear.
    assert!(!tight.is_empty());
    assert!(tight.len() < loose.len());
    for candidate in &tight {
        assert!(loose.contains(candidate), "{candidate:?}");
    }
}

#[test]
fn checkpoint_resume_suppresses_rediscovery() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("depmine.checkpoint.json");
    let mut config = DiscoveryConfig::default();
    config.checkpoint_path = Some(path.clone());

    let mut first = DiscoverySession::new(fd_store(), config.clone()).unwrap();
    let report = first.run_phase(DependencyKind::Fd, None).unwrap();
    assert_eq!(report.rules.len(), 2);
    assert!(path.exists());

    let checkpoint = Checkpoint::load(&path).unwrap();
    assert_eq!(checkpoint.rule_count, 2);
    assert_eq!(checkpoint.discovered_hashes.len(), 2);

    let mut second = DiscoverySession::new(fd_store(), config).unwrap();
    let resumed = second.run_phase(DependencyKind::Fd, None).unwrap();
    assert!(resumed.rules.is_empty());
    assert_eq!(resumed.duplicates, 4);
}

#[test]
fn dedup_disabled_keeps_structural_duplicates() {
    let mut config = DiscoveryConfig::default();
    config.dedup_enabled = false;
    let mut session = DiscoverySession::new(fd_store(), config).unwrap();
    let report = session.run_phase(DependencyKind::Fd, None).unwrap();

    assert_eq!(report.rules.len(), 4);
    assert_eq!(report.duplicates, 0);
}

#[derive(Default)]
struct CountingHandler {
    started: AtomicU64,
    rules: AtomicU64,
    completed: AtomicU64,
}

impl DiscoveryEventHandler for CountingHandler {
    fn on_phase_started(&self, _event: &PhaseStartedEvent) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn on_rule_discovered(&self, _event: &RuleDiscoveredEvent) {
        self.rules.fetch_add(1, Ordering::SeqCst);
    }

    fn on_phase_complete(&self, _event: &PhaseCompleteEvent) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn lifecycle_events_reach_registered_handlers() {
    let handler = Arc::new(CountingHandler::default());
    let mut session = DiscoverySession::new(fd_store(), DiscoveryConfig::default()).unwrap();
    session.register_handler(handler.clone());
    let report = session.run_phase(DependencyKind::Fd, None).unwrap();

    assert_eq!(handler.started.load(Ordering::SeqCst), 1);
    assert_eq!(handler.completed.load(Ordering::SeqCst), 1);
    assert_eq!(
        handler.rules.load(Ordering::SeqCst),
        report.rules.len() as u64
    );
}

#[test]
fn parallel_phases_produce_clean_reports() {
    let factory = || -> Result<Arc<dyn RelationalStore>, depmine_core::errors::StorageError> {
        let store = SqliteStore::open_in_memory()?;
        store
            .connection()
            .execute_batch(
                "CREATE TABLE t (x INTEGER, y TEXT);
                 INSERT INTO t VALUES (1, 'a'), (1, 'a'), (2, 'b'), (3, 'c');",
            )
            .map_err(|e| depmine_core::errors::StorageError::Sqlite {
                message: e.to_string(),
            })?;
        Ok(Arc::new(store))
    };
    let kinds = [DependencyKind::Fd, DependencyKind::Egd];
    let result = DiscoverySession::run_parallel(factory, &DiscoveryConfig::default(), &kinds);

    assert!(result.is_clean());
    assert_eq!(result.data.len(), 2);
    let seen: BTreeSet<&str> = result.data.iter().map(|r| r.kind.as_str()).collect();
    assert_eq!(seen, BTreeSet::from(["fd", "egd"]));
}

#[test]
fn rule_stream_is_lazy_and_countable() {
    let session = DiscoverySession::new(fd_store(), DiscoveryConfig::default()).unwrap();
    let mut stream = session.discover_stream(DependencyKind::Fd).unwrap();

    let first = stream.next().expect("at least one rule");
    assert!(first.confidence() > 0.0);
    // The raw stream skips dedup: reversed paths re-emit both rules.
    let rest: Vec<Rule> = stream.by_ref().collect();
    assert_eq!(rest.len(), 3);
    assert_eq!(stream.stats().rules_emitted, 4);
    assert!(stream.stats().candidates >= 4);
}
