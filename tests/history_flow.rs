use std::collections::HashSet;

use coaster_ranking::config::settings::{HistorySettings, PairingSettings};
use coaster_ranking::history::{HistoryLedger, Side};
use coaster_ranking::pairing::{pair_key, select_pair, total_pairs, RandomSource, RngSource};
use coaster_ranking::rating::Glicko2;
use coaster_ranking::stats::StatsStore;

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("coaster-{i:02}")).collect()
}

/// Battle until the selector gives up, the left item always winning.
fn play_out(
    items: &[String],
    ledger: &mut HistoryLedger,
    stats: &mut StatsStore,
    engine: &Glicko2,
    rng: &mut dyn RandomSource,
) -> usize {
    let tuning = PairingSettings::default();
    let mut played = 0;
    while let Some((left, right)) = select_pair(items, stats, ledger.completed(), &tuning, rng) {
        let (left, right) = (left.clone(), right.clone());
        ledger.record_battle(stats, engine, &left, &right, Side::Left).unwrap();
        played += 1;
        assert!(played <= total_pairs(items.len()), "selector repeated a pair");
    }
    played
}

#[test]
fn every_pair_is_offered_exactly_once() {
    let items = names(6);
    let engine = Glicko2::default();
    let mut stats = StatsStore::initialize(items.iter().map(String::as_str));
    let mut ledger = HistoryLedger::new(&HistorySettings::default());
    let mut rng = RngSource::seeded(2024);

    let played = play_out(&items, &mut ledger, &mut stats, &engine, &mut rng);

    assert_eq!(played, 15);
    let keys: HashSet<&str> = ledger.entries().iter().map(|e| e.pair_key.as_str()).collect();
    assert_eq!(keys.len(), 15);
    assert!(ledger.completed().is_exhausted(&items));

    let battles: u32 = stats.iter().map(|(_, s)| s.battles).sum();
    assert_eq!(battles, 30);
    assert!(stats.iter().all(|(_, s)| s.is_consistent()));
}

#[test]
fn new_item_reopens_the_pair_space() {
    let mut items = names(3);
    let engine = Glicko2::default();
    let mut stats = StatsStore::initialize(items.iter().map(String::as_str));
    let mut ledger = HistoryLedger::new(&HistorySettings::default());
    let mut rng = RngSource::seeded(5);

    assert_eq!(play_out(&items, &mut ledger, &mut stats, &engine, &mut rng), 3);

    items.push("newcomer".to_string());
    let played = play_out(&items, &mut ledger, &mut stats, &engine, &mut rng);
    assert_eq!(played, 3);
    assert_eq!(stats.get("newcomer").unwrap().battles, 3);
}

#[test]
fn delete_then_undo_restores_every_position() {
    let items = names(5);
    let engine = Glicko2::default();
    let mut stats = StatsStore::initialize(items.iter().map(String::as_str));
    let mut ledger = HistoryLedger::new(&HistorySettings::default());
    let mut rng = RngSource::seeded(99);
    play_out(&items, &mut ledger, &mut stats, &engine, &mut rng);

    let entries = ledger.entries().to_vec();
    let completed = ledger.completed().clone();

    for index in 0..entries.len() {
        let removed = ledger.delete(index).unwrap();
        assert!(!ledger.completed().contains_key(&removed.pair_key));
        assert!(ledger.undo());

        assert_eq!(ledger.entries(), entries.as_slice());
        assert_eq!(ledger.completed(), &completed);
    }
}

#[test]
fn deleted_pair_can_be_offered_again() {
    let items = names(3);
    let engine = Glicko2::default();
    let mut stats = StatsStore::initialize(items.iter().map(String::as_str));
    let mut ledger = HistoryLedger::new(&HistorySettings::default());
    let mut rng = RngSource::seeded(1);
    play_out(&items, &mut ledger, &mut stats, &engine, &mut rng);

    let removed = ledger.delete(1).unwrap();
    let tuning = PairingSettings::default();
    let (left, right) = select_pair(&items, &stats, ledger.completed(), &tuning, &mut rng).unwrap();
    assert_eq!(pair_key(left, right), removed.pair_key);
}

#[test]
fn wizard_is_idempotent_after_switches() {
    let items = names(5);
    let engine = Glicko2::default();
    let mut stats = StatsStore::initialize(items.iter().map(String::as_str));
    let mut ledger = HistoryLedger::new(&HistorySettings::default());
    let mut rng = RngSource::seeded(31);
    play_out(&items, &mut ledger, &mut stats, &engine, &mut rng);

    ledger.switch_winner(2, &mut stats, &engine).unwrap();
    ledger.switch_winner(7, &mut stats, &engine).unwrap();

    let first = ledger.recompute_all(&mut stats, &engine, 50).unwrap();
    assert!(first.converged);

    let entries = ledger.entries().to_vec();
    let snapshot: Vec<_> = stats.iter().map(|(name, s)| (name.to_string(), *s)).collect();

    let second = ledger.recompute_all(&mut stats, &engine, 50).unwrap();
    assert_eq!(second.total_changes, 0);
    assert!(second.converged);
    assert_eq!(ledger.entries(), entries.as_slice());
    assert_eq!(stats.iter().map(|(name, s)| (name.to_string(), *s)).collect::<Vec<_>>(), snapshot);
}

#[test]
fn seeded_selection_sequences_match() {
    let items = names(20);
    let stats = StatsStore::initialize(items.iter().map(String::as_str));
    let ledger = HistoryLedger::new(&HistorySettings::default());
    let tuning = PairingSettings::default();

    let draw = |seed: u64| {
        let mut rng = RngSource::seeded(seed);
        (0..10)
            .map(|_| {
                select_pair(&items, &stats, ledger.completed(), &tuning, &mut rng)
                    .map(|(a, b)| (a.clone(), b.clone()))
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(draw(77), draw(77));
}
