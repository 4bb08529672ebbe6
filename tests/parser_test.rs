//! Tests for the manifest parser

use rstest::rstest;

use staticfs_gen::domain::{parse_manifest, EntryKind};

#[test]
fn given_three_line_manifest_when_parsing_then_preserves_order() {
    let manifest = "/bin/ls:func cmd_ls\n/bin/cat:func cmd_cat\n/sbin/ls:func cmd_ls\n";

    let decls = parse_manifest(manifest).unwrap();

    let rendered: Vec<String> = decls.iter().map(|d| d.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "/bin/ls:func cmd_ls",
            "/bin/cat:func cmd_cat",
            "/sbin/ls:func cmd_ls"
        ]
    );
    assert!(decls.iter().all(|d| d.kind == EntryKind::Func));
}

#[test]
fn given_tokens_spread_over_lines_when_parsing_then_whitespace_is_insignificant() {
    let manifest = "  /dev/null\n\t:\n  func\n\n  cmd_null   /dev/zero : func cmd_zero";

    let decls = parse_manifest(manifest).unwrap();

    assert_eq!(decls.len(), 2);
    assert_eq!(decls[0].components, vec!["dev", "null"]);
    assert_eq!(decls[0].handler, "cmd_null");
    assert_eq!(decls[1].path(), "/dev/zero");
    assert_eq!(decls[1].handler, "cmd_zero");
}

#[test]
fn given_dashes_and_digits_when_parsing_then_component_accepted() {
    let decls = parse_manifest("/net/if-0/eth_1:func cmd_eth1").unwrap();
    assert_eq!(decls[0].components, vec!["net", "if-0", "eth_1"]);
}

#[test]
fn given_single_component_path_when_parsing_then_accepted() {
    let decls = parse_manifest("/reboot:func cmd_reboot").unwrap();
    assert_eq!(decls[0].components, vec!["reboot"]);
}

#[rstest]
#[case::missing_colon("/bin/ls func cmd_ls", "':' after path", 1, 9)]
#[case::missing_slash("bin/ls:func cmd_ls", "'/' starting a path", 1, 1)]
#[case::empty_component("/bin//ls:func cmd_ls", "path component", 1, 6)]
#[case::trailing_slash("/bin/:func cmd_ls", "path component", 1, 6)]
#[case::digit_first_component("/1bin/ls:func cmd_ls", "path component", 1, 2)]
#[case::unknown_kind("/bin/ls:file cmd_ls", "entry kind ('func')", 1, 9)]
#[case::glued_kind("/bin/ls:funccmd_ls", "entry kind ('func')", 1, 9)]
#[case::missing_handler("/bin/ls:func", "whitespace after 'func'", 1, 13)]
#[case::dash_in_handler("/bin/ls:func cmd-ls", "'/' starting a path", 1, 17)]
#[case::space_in_path("/bin /ls:func cmd_ls", "':' after path", 1, 6)]
#[case::second_line("/a:func f\n/b:func 2g", "handler name", 2, 9)]
fn given_malformed_manifest_when_parsing_then_reports_position(
    #[case] manifest: &str,
    #[case] expected: &str,
    #[case] line: usize,
    #[case] column: usize,
) {
    let err = parse_manifest(manifest).unwrap_err();

    assert_eq!(err.expected, expected, "error: {err}");
    assert_eq!((err.line, err.column), (line, column), "error: {err}");
}

#[test]
fn given_valid_prefix_then_garbage_when_parsing_then_whole_manifest_rejected() {
    let result = parse_manifest("/bin/ls:func cmd_ls\n/bin/cat:func cmd_cat\n???\n");
    assert!(result.is_err());
}
