//! Fallback parser used when a tool names a `parser` id with no specific
//! implementation registered. Reports no findings, only the raw log.

use crate::parser::{ParseInput, Parser};
use sbx_core::ParsedOutput;

pub struct GenericLogParser;

impl Parser for GenericLogParser {
    fn id(&self) -> &str {
        "generic"
    }

    fn parse(&self, ctx: &ParseInput<'_>) -> ParsedOutput {
        let mut out = ParsedOutput {
            parser: self.id().to_string(),
            parser_version: "1".to_string(),
            tool_args: ctx.tool_args.clone(),
            ..Default::default()
        };
        if ctx.exit_code != Some(0) {
            out.errors.push(format!(
                "tool exited with code {:?}",
                ctx.exit_code
            ));
        }
        if !ctx.log.trim().is_empty() {
            out.infos.push(ctx.log.trim().to_string());
        }
        out
    }
}

#[cfg(test)]
#[path = "generic_tests.rs"]
mod tests;
