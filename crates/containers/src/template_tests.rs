use super::*;

fn ctx() -> TemplateContext {
    TemplateContext {
        filename: "A.sol".into(),
        timeout: "500".into(),
        bin: "/sb/bin/slither".into(),
        main: "A".into(),
        args: "--json -".into(),
    }
}

#[test]
fn render_substitutes_known_placeholders() {
    let rendered = render("slither", "$BIN $FILENAME $ARGS", &ctx()).unwrap();
    assert_eq!(rendered, "/sb/bin/slither A.sol --json -");
}

#[test]
fn render_leaves_literal_dollar_without_identifier_alone() {
    let rendered = render("slither", "cost: $ usd", &ctx()).unwrap();
    assert_eq!(rendered, "cost: $ usd");
}

#[test]
fn render_errors_on_unknown_placeholder() {
    let err = render("slither", "$BOGUS", &ctx()).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownPlaceholder(tool, key) if tool == "slither" && key == "BOGUS"));
}

#[test]
fn render_handles_adjacent_placeholders() {
    let rendered = render("mythril", "$BIN$FILENAME", &ctx()).unwrap();
    assert_eq!(rendered, "/sb/bin/slitherA.sol");
}

#[test]
fn split_argv_splits_on_whitespace() {
    assert_eq!(
        split_argv("slither A.sol --json -"),
        vec!["slither", "A.sol", "--json", "-"]
    );
}

#[test]
fn split_argv_respects_quotes() {
    assert_eq!(
        split_argv(r#"mythril --solc-args "--base-path foo""#),
        vec!["mythril", "--solc-args", "--base-path foo"]
    );
}
