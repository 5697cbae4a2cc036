//! Renders a tool's `command`/`entrypoint` template by substituting
//! `$FILENAME`, `$TIMEOUT`, `$BIN`, `$MAIN`, `$ARGS` placeholders.

use sbx_core::ConfigError;
use std::collections::HashMap;

/// Values available for substitution into a tool's command/entrypoint template.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    pub filename: String,
    pub timeout: String,
    pub bin: String,
    pub main: String,
    pub args: String,
}

impl TemplateContext {
    fn as_map(&self) -> HashMap<&'static str, &str> {
        HashMap::from([
            ("FILENAME", self.filename.as_str()),
            ("TIMEOUT", self.timeout.as_str()),
            ("BIN", self.bin.as_str()),
            ("MAIN", self.main.as_str()),
            ("ARGS", self.args.as_str()),
        ])
    }
}

/// Renders `template`, replacing every `$KEY` with its value from `ctx`.
///
/// Unlike `std::string::Template`, an unknown `$KEY` is a hard error rather
/// than being left untouched, matching the original tool config's strict
/// substitution contract.
pub fn render(tool_id: &str, template: &str, ctx: &TemplateContext) -> Result<String, ConfigError> {
    let values = ctx.as_map();
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let mut key = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                key.push(next);
                chars.next();
            } else {
                break;
            }
        }
        if key.is_empty() {
            out.push('$');
            continue;
        }
        match values.get(key.as_str()) {
            Some(value) => out.push_str(value),
            None => {
                return Err(ConfigError::UnknownPlaceholder(
                    tool_id.to_string(),
                    key,
                ))
            }
        }
    }
    Ok(out)
}

/// Splits a rendered template string into argv the way a shell word-split would,
/// respecting single/double-quoted segments.
pub fn split_argv(rendered: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in rendered.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            None => current.push(c),
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
