use super::*;

#[test]
fn generic_parser_records_nonzero_exit_as_error() {
    let parser = GenericLogParser;
    let ctx = ParseInput {
        exit_code: Some(1),
        log: "boom",
        tool_args: vec![],
        output_tar: None,
    };
    let out = parser.parse(&ctx);
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.infos, vec!["boom".to_string()]);
    assert!(out.findings.is_empty());
}

#[test]
fn generic_parser_clean_on_zero_exit_and_empty_log() {
    let parser = GenericLogParser;
    let ctx = ParseInput {
        exit_code: Some(0),
        log: "   ",
        tool_args: vec![],
        output_tar: None,
    };
    let out = parser.parse(&ctx);
    assert!(out.is_clean());
    assert!(out.infos.is_empty());
}
