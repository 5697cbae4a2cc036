//! Parser for the Echidna property-based fuzzer's JSON report.
//!
//! Echidna writes one `echidna.json` file inside the container's output tar:
//! an array of test results, each with a `status` (`"failed"`, `"passed"`,
//! or `"error"`) and a free-form `message` that may carry a `/sb/<file>#<line>`
//! location the way the original analyzer's echidna parser extracted one via
//! regex.

use crate::parser::{extract_tar_entry, ParseInput, Parser};
use sbx_core::{Category, Finding, Location, ParsedOutput};
use serde::Deserialize;

const OUTPUT_PATH: &str = "echidna.json";

#[derive(Debug, Deserialize)]
struct EchidnaTest {
    name: String,
    status: String,
    #[serde(default)]
    message: String,
}

pub struct EchidnaParser;

impl Parser for EchidnaParser {
    fn id(&self) -> &str {
        "echidna"
    }

    fn parse(&self, ctx: &ParseInput<'_>) -> ParsedOutput {
        let mut out = ParsedOutput {
            parser: self.id().to_string(),
            parser_version: "1".to_string(),
            tool_args: ctx.tool_args.clone(),
            ..Default::default()
        };

        let Some(tar_bytes) = ctx.output_tar else {
            out.fails.push("no output tar produced".to_string());
            return out;
        };

        let Some(raw) = extract_tar_entry(tar_bytes, OUTPUT_PATH) else {
            out.fails.push(format!("{OUTPUT_PATH} not found in output"));
            return out;
        };

        let tests: Vec<EchidnaTest> = match serde_json::from_slice(&raw) {
            Ok(tests) => tests,
            Err(e) => {
                out.errors.push(format!("failed to parse {OUTPUT_PATH}: {e}"));
                return out;
            }
        };

        for test in tests {
            if test.status != "failed" {
                continue;
            }
            let (category, description) = classify(&test.name, &test.message);
            out.findings.push(Finding {
                category,
                description,
                location: extract_location(&test.message),
            });
        }

        if ctx.exit_code.map(|c| c != 0).unwrap_or(false) && out.findings.is_empty() {
            out.errors
                .push(format!("echidna exited with code {:?}", ctx.exit_code));
        }

        out
    }
}

fn classify(name: &str, message: &str) -> (Category, String) {
    let haystack = format!("{name} {message}").to_ascii_lowercase();
    let category = if haystack.contains("overflow") {
        Category::Overflow
    } else if haystack.contains("underflow") {
        Category::Underflow
    } else if haystack.contains("reentran") {
        Category::Reentrancy
    } else if haystack.contains("assertion") {
        Category::AssertViolation
    } else {
        Category::Other
    };
    (category, format!("{name}: {message}"))
}

/// Extracts a `/sb/<file>#<line>` location reference from a message, the
/// same shape the original echidna parser's location regex matched.
fn extract_location(message: &str) -> Option<Location> {
    let idx = message.find("/sb/")?;
    let rest = &message[idx + 4..];
    let hash_idx = rest.find('#')?;
    let file = &rest[..hash_idx];
    let after_hash = &rest[hash_idx + 1..];
    let line_str: String = after_hash
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    let line = line_str.split('-').next()?.parse::<u32>().ok();
    Some(Location {
        file: Some(file.to_string()),
        line_start: line,
        line_end: line,
    })
}

#[cfg(test)]
#[path = "echidna_tests.rs"]
mod tests;
