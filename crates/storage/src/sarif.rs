//! Minimal SARIF 2.1.0 conversion for a tool's normalized findings.

use sbx_core::ParsedOutput;
use serde_json::{json, Value};

const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const SARIF_VERSION: &str = "2.1.0";

/// Converts one tool's parsed output into a single-run SARIF log.
pub fn to_sarif(tool_name: &str, output: &ParsedOutput) -> Value {
    let results: Vec<Value> = output
        .findings
        .iter()
        .map(|finding| {
            let mut result = json!({
                "ruleId": finding.category.as_key(),
                "level": "warning",
                "message": { "text": finding.description },
            });
            if let Some(location) = &finding.location {
                let mut region = json!({});
                if let Some(start) = location.line_start {
                    region["startLine"] = json!(start);
                }
                if let Some(end) = location.line_end {
                    region["endLine"] = json!(end);
                }
                result["locations"] = json!([{
                    "physicalLocation": {
                        "artifactLocation": { "uri": location.file.clone().unwrap_or_default() },
                        "region": region,
                    }
                }]);
            }
            result
        })
        .collect();

    json!({
        "$schema": SARIF_SCHEMA,
        "version": SARIF_VERSION,
        "runs": [{
            "tool": {
                "driver": {
                    "name": tool_name,
                    "rules": [],
                }
            },
            "results": results,
        }]
    })
}

#[cfg(test)]
#[path = "sarif_tests.rs"]
mod tests;
