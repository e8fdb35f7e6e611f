use std::fs;

use collator_core::{BatchState, ComputeItem};
use collator_engine::{fib, ArtifactStore, ComputeStage};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn fib_base_cases_and_known_values() {
    assert_eq!(fib(0).to_string(), "0");
    assert_eq!(fib(1).to_string(), "1");
    assert_eq!(fib(10).to_string(), "55");
    assert_eq!(fib(20).to_string(), "6765");
}

#[test]
fn fib_exceeds_fixed_width_integers() {
    // fib(100) does not fit in u64; exact decimal expansion required.
    assert_eq!(fib(100).to_string(), "354224848179261915075");
    // fib(1000) has 209 decimal digits.
    assert_eq!(fib(1000).to_string().len(), 209);
}

#[test]
fn run_persists_one_artifact_per_distinct_ordinal() {
    stage_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let store = ArtifactStore::new(temp.path().to_path_buf());

    let items: Vec<ComputeItem> = [0u64, 1, 10, 20, 100]
        .into_iter()
        .map(ComputeItem::new)
        .collect();
    let outcome = ComputeStage::new(4).run(&store, items).unwrap();

    assert_eq!(outcome.submitted(), 5);
    assert_eq!(outcome.succeeded(), 5);
    assert_eq!(outcome.state(), BatchState::AllSucceeded);

    assert_eq!(fs::read_to_string(temp.path().join("0.txt")).unwrap(), "0");
    assert_eq!(fs::read_to_string(temp.path().join("1.txt")).unwrap(), "1");
    assert_eq!(fs::read_to_string(temp.path().join("10.txt")).unwrap(), "55");
    assert_eq!(fs::read_to_string(temp.path().join("20.txt")).unwrap(), "6765");
    assert_eq!(
        fs::read_to_string(temp.path().join("100.txt")).unwrap(),
        "354224848179261915075"
    );
}

#[test]
fn rerun_overwrites_with_the_same_value() {
    let temp = TempDir::new().unwrap();
    let store = ArtifactStore::new(temp.path().to_path_buf());
    let stage = ComputeStage::new(2);

    stage.run(&store, vec![ComputeItem::new(10)]).unwrap();
    let first = fs::read_to_string(temp.path().join("10.txt")).unwrap();

    stage.run(&store, vec![ComputeItem::new(10)]).unwrap();
    let second = fs::read_to_string(temp.path().join("10.txt")).unwrap();

    assert_eq!(first, second);
    assert_eq!(second, "55");
}

#[test]
fn empty_input_is_a_valid_no_op() {
    let temp = TempDir::new().unwrap();
    let store = ArtifactStore::new(temp.path().to_path_buf());

    let outcome = ComputeStage::new(0).run(&store, Vec::new()).unwrap();

    assert_eq!(outcome.submitted(), 0);
    assert_eq!(outcome.state(), BatchState::AllSucceeded);
    assert!(store.list_names().unwrap().is_empty());
}

#[test]
fn one_bad_item_does_not_lose_the_batch() {
    stage_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let store = ArtifactStore::new(temp.path().to_path_buf());

    // A directory squatting on the artifact path makes the write for that
    // ordinal fail while its siblings proceed.
    fs::create_dir_all(temp.path().join("7.txt")).unwrap();

    let items: Vec<ComputeItem> = [5u64, 7, 8].into_iter().map(ComputeItem::new).collect();
    let outcome = ComputeStage::new(3).run(&store, items).unwrap();

    assert_eq!(outcome.submitted(), 3);
    assert_eq!(outcome.succeeded(), 2);
    assert_eq!(outcome.failures().len(), 1);
    assert_eq!(outcome.failures()[0].key, "7");
    assert_eq!(outcome.state(), BatchState::PartiallyFailed);

    assert_eq!(fs::read_to_string(temp.path().join("5.txt")).unwrap(), "5");
    assert_eq!(fs::read_to_string(temp.path().join("8.txt")).unwrap(), "21");
}
