//! Integration tests for loading and rendering solution files through the service layer.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use solview::application::services::SolutionService;
use solview::application::ApplicationError;
use solview::domain::DomainError;
use solview::infrastructure::traits::RealFileSystem;
use solview::util::testing;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/resources/solutions")
        .join(name)
}

fn service() -> SolutionService {
    testing::init_test_setup();
    SolutionService::new(Arc::new(RealFileSystem))
}

#[test]
fn given_tiny_solution_when_rendering_depth_one_then_three_boards() {
    let service = service();
    let tree = service.load(&fixture("tiny.txt")).unwrap();

    let page = service.render_page(&tree, 1, 60).unwrap();

    assert_eq!(page.matches("<table").count(), 3);
    assert!(page.contains(r#"<p id="node">Result: draw</p>"#));
    assert!(page.contains(r##"<a href="#node-0">1</a><br>(X wins)"##));
    assert!(page.contains(r##"<a href="#node-4">1</a><br>(O wins)"##));
    assert!(page.contains(r#"<p id="node-0">Result: X wins</p>"#));
    assert!(page.contains(r#"<p id="node-4">Result: O wins</p>"#));
    // Root shows 7 blank cells, each child board 8
    assert_eq!(page.matches("&nbsp;").count(), 7 + 8 + 8);
}

#[test]
fn given_depth_zero_when_rendering_then_only_root_board_with_summaries() {
    let service = service();
    let tree = service.load(&fixture("tiny.txt")).unwrap();

    let page = service.render_page(&tree, 0, 60).unwrap();

    assert_eq!(page.matches("<table").count(), 1);
    assert!(page.contains(r##"<a href="#node-0">1</a><br>(X wins)"##));
    assert!(!page.contains(r#"<p id="node-0">"#));
}

#[rstest]
#[case(0, 1)]
#[case(1, 3)]
#[case(2, 5)]
#[case(3, 6)]
#[case(10, 6)]
fn given_deeper_tree_when_rendering_then_block_count_bounded_by_depth(
    #[case] max_depth: usize,
    #[case] expected: usize,
) {
    let service = service();
    let tree = service.load(&fixture("deeper.txt")).unwrap();

    let page = service.render_page(&tree, max_depth, 60).unwrap();

    assert_eq!(page.matches("<table").count(), expected);
}

#[test]
fn given_malformed_header_when_loading_then_format_error_on_line_one() {
    let result = service().load(&fixture("malformed_header.txt"));
    assert!(
        matches!(
            result,
            Err(ApplicationError::Domain(DomainError::Format { line: 1, .. }))
        ),
        "got {result:?}"
    );
}

#[test]
fn given_truncated_file_when_loading_then_unexpected_end_of_input() {
    let result = service().load(&fixture("truncated.txt"));
    assert!(
        matches!(
            result,
            Err(ApplicationError::Domain(
                DomainError::UnexpectedEndOfInput { .. }
            ))
        ),
        "got {result:?}"
    );
}

#[test]
fn given_missing_file_when_loading_then_input_not_found() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.txt");

    let result = service().load(&missing);

    match result {
        Err(ApplicationError::InputNotFound(path)) => assert_eq!(path, missing),
        other => panic!("expected InputNotFound, got {other:?}"),
    }
}

#[test]
fn given_three_mark_types_when_rendering_then_unsupported_before_any_block() {
    let service = service();
    let tree = service.load(&fixture("three_marks.txt")).unwrap();

    let result = service.render_page(&tree, 5, 60);

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::UnsupportedMarkTypes(3)))
    ));
}

#[test]
fn given_path_revisiting_cell_when_rendering_then_integrity_error_and_no_page() {
    let service = service();
    let tree = service.load(&fixture("revisit.txt")).unwrap();

    // Depth zero never reaches the inconsistent node
    assert!(service.render_page(&tree, 0, 60).is_ok());

    let result = service.render_page(&tree, 2, 60);
    match result {
        Err(ApplicationError::Domain(DomainError::DataIntegrity { path, .. })) => {
            assert_eq!(path, vec![4])
        }
        other => panic!("expected DataIntegrity, got {other:?}"),
    }
}

#[test]
fn given_loaded_tree_when_formatted_then_reads_back_identically() {
    let dir = TempDir::new().unwrap();
    let service = service();
    let tree = service.load(&fixture("deeper.txt")).unwrap();

    let text = service.canonical_text(&tree);
    let copy = dir.path().join("copy.txt");
    fs::write(&copy, &text).unwrap();
    let reread = service.load(&copy).unwrap();

    assert_eq!(service.canonical_text(&reread), text);
    assert_eq!(reread.stats(), tree.stats());
    assert_eq!(
        service.render_page(&reread, 3, 60).unwrap(),
        service.render_page(&tree, 3, 60).unwrap()
    );
}
