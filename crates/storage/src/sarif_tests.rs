use super::*;
use sbx_core::{Category, Finding, Location};

#[test]
fn converts_findings_into_sarif_results() {
    let output = ParsedOutput {
        parser: "echidna".into(),
        parser_version: "1".into(),
        tool_args: vec![],
        findings: vec![Finding {
            category: Category::Reentrancy,
            description: "reentrancy in withdraw".into(),
            location: Some(Location {
                file: Some("A.sol".into()),
                line_start: Some(10),
                line_end: None,
            }),
        }],
        infos: vec![],
        errors: vec![],
        fails: vec![],
    };

    let sarif = to_sarif("echidna", &output);
    assert_eq!(sarif["version"], "2.1.0");
    let results = sarif["runs"][0]["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["ruleId"], "reentrancy");
    assert_eq!(
        results[0]["locations"][0]["physicalLocation"]["artifactLocation"]["uri"],
        "A.sol"
    );
}

#[test]
fn empty_findings_produce_empty_results() {
    let output = ParsedOutput::default();
    let sarif = to_sarif("slither", &output);
    assert!(sarif["runs"][0]["results"].as_array().unwrap().is_empty());
}
