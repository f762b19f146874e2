//! Tests for PuzzleService against on-disk puzzles

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use balance::application::ApplicationError;
use balance::config::Settings;
use balance::domain::DomainError;
use balance::infrastructure::traits::RealFileSystem;
use balance::infrastructure::ServiceContainer;
use balance::util::testing;

fn container() -> ServiceContainer {
    testing::init_test_setup();
    ServiceContainer::with_deps(Settings::default(), Arc::new(RealFileSystem))
}

fn fixture(name: &str) -> PathBuf {
    Path::new("tests/resources/puzzles").join(name)
}

#[test]
fn given_puzzle_with_missing_pan_when_loading_then_pan_is_inferred_and_tree_balances() {
    // Arrange
    let container = container();

    // Act
    let puzzle = container.puzzle.load(&fixture("missing.txt")).unwrap();
    let report = container.puzzle.report(&puzzle);

    // Assert
    let resolution = puzzle.resolution.as_ref().expect("missing pan resolved");
    assert_eq!(resolution.beam, "B2");
    assert_eq!(resolution.distance, 1.0);
    assert_eq!(resolution.mass, 8.0);
    assert!(report.balanced);
}

#[test]
fn given_loaded_puzzle_when_inspecting_then_layout_is_already_sized() {
    let container = container();
    let puzzle = container.puzzle.load(&fixture("balanced.txt")).unwrap();
    let root = puzzle.tree.node(puzzle.tree.root().unwrap()).unwrap();
    assert_eq!(root.layout_scale, 80.0);
}

#[rstest]
#[case::balanced("balanced.txt", true, 3)]
#[case::root_unbalanced("unbalanced.txt", false, 1)]
#[case::child_unbalanced("child_unbalanced.txt", false, 2)]
fn given_puzzle_when_reporting_then_entries_follow_balance_walk(
    #[case] file: &str,
    #[case] balanced: bool,
    #[case] visited: usize,
) {
    // Arrange
    let container = container();
    let puzzle = container.puzzle.load(&fixture(file)).unwrap();

    // Act
    let report = container.puzzle.report(&puzzle);

    // Assert
    assert_eq!(report.balanced, balanced);
    assert_eq!(report.entries.len(), visited);
    assert_eq!(report.entries[0].name, "B");
}

#[test]
fn given_child_unbalanced_when_reporting_then_first_failure_is_child() {
    let container = container();
    let puzzle = container.puzzle.load(&fixture("child_unbalanced.txt")).unwrap();
    let report = container.puzzle.report(&puzzle);

    let failure = report.first_failure().expect("one beam fails");
    assert_eq!(failure.name, "B1");
    assert_eq!(failure.left, -4.0);
    assert_eq!(failure.right, 2.0);
}

#[test]
fn given_two_unknowns_when_loading_then_multiple_unknown_weights() {
    let container = container();
    let err = container.puzzle.load(&fixture("two_unknowns.txt")).unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::MultipleUnknownWeights { count: 2, .. })
    ));
}

#[test]
fn given_missing_file_when_loading_then_error_names_the_path() {
    let container = container();
    let err = container
        .puzzle
        .load(Path::new("tests/resources/puzzles/does-not-exist.txt"))
        .unwrap_err();
    assert!(matches!(err, ApplicationError::PuzzleNotFound(_)));
    assert!(err.to_string().contains("does-not-exist.txt"));
}

#[test]
fn given_puzzle_in_temp_dir_when_rendering_then_tree_shows_scaled_offsets() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("p.txt");
    std::fs::write(&path, "B -10 5 5 -1\n").unwrap();
    let container = container();

    // Act
    let puzzle = container.puzzle.load(&path).unwrap();
    let rendered = container.puzzle.render(&puzzle).to_string();

    // Assert
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "B (scale 20)");
    assert!(lines[1].ends_with("w=5 @ d=-10 (x=-200)"));
    assert!(lines[2].ends_with("w=10 @ d=5 (x=100)"));
}
