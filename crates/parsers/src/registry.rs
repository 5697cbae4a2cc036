//! Maps a tool's configured `parser` id to a [`Parser`] implementation.

use crate::echidna::EchidnaParser;
use crate::generic::GenericLogParser;
use crate::parser::Parser;
use std::collections::HashMap;

/// Holds one [`Parser`] per known parser id. Looking up an id with no
/// registered parser falls back to [`GenericLogParser`], which only reports
/// the tool's raw log as an `info` entry — unknown parser ids are not fatal.
pub struct ParserRegistry {
    parsers: HashMap<String, Box<dyn Parser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        let mut parsers: HashMap<String, Box<dyn Parser>> = HashMap::new();
        parsers.insert("echidna".to_string(), Box::new(EchidnaParser));
        Self { parsers }
    }

    pub fn register(&mut self, parser: Box<dyn Parser>) {
        self.parsers.insert(parser.id().to_string(), parser);
    }

    pub fn get(&self, id: &str) -> &dyn Parser {
        self.parsers
            .get(id)
            .map(|p| p.as_ref())
            .unwrap_or(&GENERIC)
    }
}

static GENERIC: GenericLogParser = GenericLogParser;

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
