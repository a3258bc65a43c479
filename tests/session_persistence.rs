use anyhow::{anyhow, Result};

use coaster_ranking::cache::JsonFileStore;
use coaster_ranking::config::settings::{AppConfig, PairingSettings};
use coaster_ranking::database::SqliteStore;
use coaster_ranking::domain::{Item, ItemCatalog};
use coaster_ranking::history::Side;
use coaster_ranking::pairing::{RngSource, SequenceSource};
use coaster_ranking::services::Session;
use coaster_ranking::storage::{keys, save_json, ExportDocument, MemoryStore, PersistenceStore};

fn catalog() -> ItemCatalog {
    let mut retired = Item::new("Colossos");
    retired.operational = false;
    ItemCatalog::from_items(vec![
        Item::new("Taron"),
        Item::new("Anubis"),
        Item::new("Zadra"),
        Item::new("Baron 1898"),
        retired,
    ])
}

fn config(user: &str) -> AppConfig {
    let mut config = AppConfig::new();
    config.storage.user = user.to_string();
    config
}

fn open_json(dir: &std::path::Path, user: &str) -> Session {
    let store = JsonFileStore::new(dir).unwrap();
    Session::open(&config(user), &catalog(), Box::new(store)).unwrap()
}

fn open_memory(user: &str) -> Session {
    Session::open(&config(user), &catalog(), Box::new(MemoryStore::new())).unwrap()
}

/// Reads work, every write fails.
struct ReadOnlyStore;

impl PersistenceStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &[u8]) -> Result<()> {
        Err(anyhow!("disk is read-only"))
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Err(anyhow!("disk is read-only"))
    }
}

#[test]
fn only_operational_items_take_part() {
    let session = open_memory("ana");

    assert_eq!(session.items().len(), 4);
    assert!(session.stats().get("Colossos").is_none());
    assert_eq!(session.summary().possible_pairs, 6);
}

#[test]
fn battle_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = SequenceSource::new(vec![0.1, 0.6, 0.3, 0.8]);

    let pending = {
        let mut session = open_json(dir.path(), "ana");
        session.next_battle(&mut rng).unwrap()
    };

    let mut session = open_json(dir.path(), "ana");
    assert_eq!(session.current_battle(), Some(&pending));
    assert_eq!(session.next_battle(&mut rng), Some(pending.clone()));

    let record = session.resolve(Side::Right).unwrap();
    assert_eq!(record.winner, pending.right);
    assert!(session.current_battle().is_none());
    assert!(session.resolve(Side::Left).is_err());

    let reopened = open_json(dir.path(), "ana");
    assert_eq!(reopened.total_battles(), 1);
    assert_eq!(reopened.ledger().len(), 1);
    assert!(reopened.ledger().completed().contains(&pending.left, &pending.right));
    assert_eq!(reopened.stats().get(&pending.right).unwrap().wins, 1);
    assert!(reopened.current_battle().is_none());
}

#[test]
fn users_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = RngSource::seeded(8);

    let mut ana = open_json(dir.path(), "ana");
    ana.simulate(3, &mut rng);

    let bob = open_json(dir.path(), "bob");
    assert_eq!(bob.total_battles(), 0);
    assert!(bob.ledger().is_empty());
}

#[test]
fn simulation_stops_when_pairs_run_out() {
    let mut session = open_memory("ana");
    let mut rng = RngSource::seeded(12);

    let report = session.simulate(100, &mut rng);

    assert_eq!(report.resolved, 6);
    assert_eq!(report.failed, 0);
    assert!(report.exhausted);
    assert!(session.next_battle(&mut rng).is_none());

    let summary = session.summary();
    assert_eq!(summary.completed_pairs, 6);
    assert_eq!(summary.completion_percent, 100.0);
    assert_eq!(summary.total_battles, 6);
    assert_eq!(summary.average_battles_per_item, 3.0);
}

#[test]
fn delete_undo_and_switch_persist_in_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("ranking.db");
    let db = db.to_str().unwrap();
    let open = || {
        let store = SqliteStore::open(db).unwrap();
        Session::open(&config("ana"), &catalog(), Box::new(store)).unwrap()
    };

    {
        let mut session = open();
        session.simulate(4, &mut RngSource::seeded(3));
        session.delete(1).unwrap();
    }
    {
        let mut session = open();
        assert_eq!(session.ledger().len(), 3);
        assert!(session.undo());
        assert!(!session.undo());
        session.switch_winner(0).unwrap();
    }

    let session = open();
    assert_eq!(session.ledger().len(), 4);
    assert_eq!(session.ledger().undo_depth(), 0);
    let entry = session.ledger().get(0).unwrap();
    let winner = session.stats().get(&entry.winner).unwrap();
    assert_eq!(winner.rating, entry.snapshot(entry.winner_side()).rating_after);
}

#[test]
fn failed_writes_become_warnings() {
    let mut session = Session::open(&config("ana"), &catalog(), Box::new(ReadOnlyStore)).unwrap();
    let mut rng = SequenceSource::new(vec![0.2, 0.4]);

    session.next_battle(&mut rng).unwrap();
    session.resolve(Side::Left).unwrap();

    let warnings = session.take_warnings();
    assert!(!warnings.is_empty());
    assert!(warnings.iter().all(|w| w.contains("disk is read-only")));
    assert!(warnings.iter().any(|w| w.contains(&keys::history("ana"))));
    assert_eq!(session.ledger().len(), 1);
    assert!(session.take_warnings().is_empty());
}

#[test]
fn export_import_round_trip() {
    let mut source = open_memory("ana");
    source.simulate(5, &mut RngSource::seeded(21));
    source.tune(Some(3.0), None).unwrap();

    let json = source.export_document().to_json().unwrap();
    let document = ExportDocument::from_json(&json).unwrap();

    let mut target = open_memory("bob");
    target.import_document(document);

    assert_eq!(target.total_battles(), 5);
    assert_eq!(target.ledger().len(), 5);
    assert_eq!(target.ledger().completed(), source.ledger().completed());
    assert_eq!(target.tuning().exploration_power, 3.0);

    let winners =
        |s: &Session| s.ledger().entries().iter().map(|e| e.winner.clone()).collect::<Vec<_>>();
    assert_eq!(winners(&target), winners(&source));

    for (imported, original) in target.ranking().iter().zip(source.ranking().iter()) {
        assert_eq!(imported.name, original.name);
        assert!((imported.displayed_rating - original.displayed_rating).abs() < 1e-9);
    }
}

#[test]
fn reset_clears_everything() {
    let mut session = open_memory("ana");
    session.simulate(3, &mut RngSource::seeded(4));
    session.delete(0).unwrap();

    session.reset();

    assert_eq!(session.total_battles(), 0);
    assert!(session.ledger().is_empty());
    assert_eq!(session.ledger().undo_depth(), 0);
    assert!(session.ledger().completed().is_empty());
    assert!(session.stats().iter().all(|(_, s)| s.battles == 0 && s.rating == 1500.0));
}

#[test]
fn tune_rejects_bad_values() {
    let mut session = open_memory("ana");

    assert!(session.tune(Some(-1.0), None).is_err());
    assert!(session.tune(None, Some(f64::NAN)).is_err());
    assert_eq!(session.tuning().exploration_power, 2.0);

    session.tune(None, Some(0.5)).unwrap();
    assert_eq!(session.tuning().proximity_power, 0.5);
}

#[test]
fn legacy_elo_stats_are_migrated_on_open() {
    let store = MemoryStore::new();
    let legacy = r#"[{"name": "Taron", "stats": {"elo": 1620.0, "battles": 2, "wins": 2}}]"#;
    store.set(&keys::stats("ana"), legacy.as_bytes()).unwrap();

    let session = Session::open(&config("ana"), &catalog(), Box::new(store)).unwrap();
    let taron = session.stats().get("Taron").unwrap();

    assert_eq!(taron.rating, 1620.0);
    assert_eq!(taron.rd, 350.0);
    assert_eq!(taron.wins, 2);
    assert_eq!(session.stats().len(), 4);
}

#[test]
fn pending_pair_completed_by_undo_is_not_recorded_twice() {
    let catalog = ItemCatalog::from_items(vec![Item::new("A"), Item::new("B"), Item::new("C")]);
    let store = Box::new(MemoryStore::new());
    let mut session = Session::open(&config("ana"), &catalog, store).unwrap();
    let mut rng = RngSource::seeded(17);
    assert_eq!(session.simulate(3, &mut rng).resolved, 3);

    let removed = session.delete(0).unwrap();
    let pending = session.next_battle(&mut rng).unwrap();
    assert_eq!(coaster_ranking::pairing::pair_key(&pending.left, &pending.right), removed.pair_key);
    assert!(session.undo());

    assert!(session.resolve(Side::Left).is_err());
    assert_eq!(session.ledger().len(), 3);
    let entries = session.ledger().entries();
    assert_eq!(entries.iter().filter(|e| e.pair_key == removed.pair_key).count(), 1);
    assert!(session.current_battle().is_none());
    assert!(session.next_battle(&mut rng).is_none());
}

#[test]
fn configured_base_rating_reaches_the_selector() {
    let mut config = config("ana");
    config.rating.base_rating = 1200.0;
    let store = MemoryStore::new();
    save_json(&store, &keys::pairing("ana"), &PairingSettings::default()).unwrap();

    let session = Session::open(&config, &catalog(), Box::new(store)).unwrap();

    assert_eq!(session.tuning().base_rating, 1200.0);
    assert!(session.ranking().iter().all(|row| row.displayed_rating == 1200.0));
}
