mod common;
use common::*;

#[test]
fn test_inner_join_example() {
    let (stdout, stderr, exit_code) = run_join_texts(&[], NAMES, SCORES);
    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert_eq!(stdout, "1 Alice 90\n2 Bob 85\n3 Carol 95\n");
    assert!(stderr.is_empty());
}

#[test]
fn test_unpaired_left() {
    let (stdout, _, exit_code) = run_join_texts(&["-a", "1"], NAMES, SCORES);
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "1 Alice 90\n2 Bob 85\n3 Carol 95\n4 David\n");
}

#[test]
fn test_unpaired_right() {
    let (stdout, _, exit_code) = run_join_texts(&["-a", "2"], "1 Alice\n", "1 90\n2 85\n");
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "1 Alice 90\n2 85\n");
}

#[test]
fn test_outer_join() {
    let (stdout, _, exit_code) = run_join_texts(&["--outer"], "a 1\nb 2\n", "b x\nc y\n");
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "b 2 x\na 1\nc y\n");

    let (repeated, _, _) = run_join_texts(&["-a", "1", "-a", "2"], "a 1\nb 2\n", "b x\nc y\n");
    assert_eq!(repeated, stdout);
}

#[test]
fn test_immediate_unpaired_mode() {
    let (stdout, _, exit_code) = run_join_texts(
        &["-a", "1", "--unpaired-mode", "immediate"],
        "a 1\nb 2\nc 3\n",
        "c x\na y\n",
    );
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "a 1 y\nb 2\nc 3 x\n");
}

#[test]
fn test_many_to_many() {
    let (stdout, _, _) = run_join_texts(&[], "k a\nk b\n", "k 1\nk 2\n");
    assert_eq!(stdout, "k a 1\nk a 2\nk b 1\nk b 2\n");
}

#[test]
fn test_ignore_case() {
    let (stdout, _, _) = run_join_texts(&[], "Apple red\n", "APPLE 3\n");
    assert_eq!(stdout, "");

    let (stdout, _, _) = run_join_texts(&["-i"], "Apple red\n", "APPLE 3\n");
    assert_eq!(stdout, "Apple red 3\n");
}

#[test]
fn test_custom_join_fields() {
    let (stdout, _, exit_code) = run_join_texts(
        &["-1", "2", "-2", "1"],
        "Alice 1 admin\nBob 2 user\n",
        "2 bob@example.com\n1 alice@example.com\n",
    );
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "1 Alice admin alice@example.com\n2 Bob user bob@example.com\n");

    let (stdout, _, _) = run_join_texts(&["-j", "2"], "x k 1\n", "y k 2\n");
    assert_eq!(stdout, "k x 1 y 2\n");
}

#[test]
fn test_whitespace_is_normalized() {
    let (stdout, _, _) = run_join_texts(&["-a", "1"], "  1 \t Alice   Smith\n\n   \n9  Zed\n", "1\t90\n");
    assert_eq!(stdout, "1 Alice Smith 90\n9 Zed\n");
}

#[test]
fn test_missing_field_empty_key_and_placeholder() {
    let (stdout, _, _) = run_join_texts(&["-j", "3"], "a b\n", "c\n");
    assert_eq!(stdout, " a b c\n");

    let (stdout, _, _) = run_join_texts(&["-j", "3", "-e", "NULL", "-a", "1"], "a b\nq r s\n", "c\n");
    assert_eq!(stdout, "NULL a b c\nq r s\n");
}

#[test]
fn test_missing_field_exclude() {
    let (stdout, _, exit_code) = run_join_texts(
        &["-j", "2", "--missing-field", "exclude", "--outer"],
        "a\nb k\n",
        "c\nd k\n",
    );
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "k b d\n");
}

#[test]
fn test_duplicate_lines_are_reported_individually() {
    let (stdout, _, _) = run_join_texts(&["-a", "2"], "a x\n", "b 1\nb 1\na 2\n");
    assert_eq!(stdout, "a x 2\nb 1\nb 1\n");
}

#[test]
fn test_check_order_is_accepted() {
    let (stdout, stderr, exit_code) =
        run_join_texts(&["--check-order", "-v"], "b 1\na 2\n", "a x\nb y\n");
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "b 1 y\na 2 x\n");
    assert!(stderr.contains("join: --check-order has no effect"));

    let (_, stderr, _) = run_join_texts(&["--check-order", "--nocheck-order", "-v"], "a 1\n", "a 2\n");
    assert!(!stderr.contains("--check-order has no effect"));
}

#[test]
fn test_verbose_and_quiet() {
    let (_, stderr, _) = run_join_texts(&["-v"], NAMES, SCORES);
    assert!(stderr.contains("join: read 4 lines from file 1"));
    assert!(stderr.contains("join: file 2: 3 records, 3 distinct keys on field 1"));
    assert!(stderr.contains("join: wrote 3 rows"));

    let (stdout, stderr, _) = run_join_texts(&["-v", "-q", "-s"], NAMES, SCORES);
    assert_eq!(stdout, "1 Alice 90\n2 Bob 85\n3 Carol 95\n");
    assert!(stderr.is_empty(), "stderr: {}", stderr);
}

#[test]
fn test_stats_table() {
    let (_, stderr, exit_code) = run_join_texts(&["-s"], NAMES, SCORES);
    assert_eq!(exit_code, 0);
    assert!(stderr.starts_with("join: Lines read: 4 + 3;"), "stderr: {}", stderr);
    assert!(stderr.contains("Rows: 3 joined, 0 unpaired (file 1), 0 unpaired (file 2)"));
}

#[test]
fn test_stats_json() {
    let (_, stderr, exit_code) = run_join_texts(&["--stats=json", "--outer"], NAMES, SCORES);
    assert_eq!(exit_code, 0);
    let stats: serde_json::Value = serde_json::from_str(stderr.trim()).unwrap();
    assert_eq!(stats["left_lines"], 4);
    assert_eq!(stats["joined_rows"], 3);
    assert_eq!(stats["unpaired_left"], 1);
    assert_eq!(stats["unpaired_right"], 0);
    assert!(stats["processing_time_ms"].is_u64());
}

#[test]
fn test_output_file() {
    let files = JoinFiles::new(NAMES, SCORES);
    let out_path = files.path("joined.txt");
    let (stdout, _, exit_code) = run_fieldjoin(&[
        "--output-file",
        out_path.to_str().unwrap(),
        files.left_str(),
        files.right_str(),
    ]);
    assert_eq!(exit_code, 0);
    assert!(stdout.is_empty());
    assert_eq!(
        std::fs::read_to_string(&out_path).unwrap(),
        "1 Alice 90\n2 Bob 85\n3 Carol 95\n"
    );
}

#[test]
fn test_empty_inputs() {
    let (stdout, _, exit_code) = run_join_texts(&["--outer"], "", "");
    assert_eq!(exit_code, 0);
    assert!(stdout.is_empty());

    let (stdout, _, _) = run_join_texts(&["--outer"], "", "1 x\n");
    assert_eq!(stdout, "1 x\n");
}
