//! Parsed tool output: findings, their categories, and the parser contract envelope.

use serde::{Deserialize, Serialize};

/// Closed set of vulnerability/weakness categories a parser can assign to a finding.
///
/// This enum is closed deliberately: the router keys off it to pick the next
/// tool, so an "unknown" category would silently break routing. Parsers that
/// encounter a tool-specific label with no mapping here should fall back to
/// [`Category::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Reentrancy,
    UnlockedEther,
    FrontRunning,
    Suicidal,
    Prodigal,
    GreedyContract,
    ArbitrarySend,
    Overflow,
    Underflow,
    UninitializedStorage,
    UninitializedStoragePointer,
    LowLevelCall,
    Delegatecall,
    Selfdestruct,
    AssertViolation,
    WriteToArbitraryStorage,
    BlockDependence,
    WeakRandomness,
    VariableShadowing,
    DeprecatedFunction,
    UnusedStateVariable,
    StrictBalanceEquality,
    ArbitraryJump,
    DosGasLimit,
    Leak,
    OutdatedCompiler,
    VersionPragma,
    Other,
}

impl Category {
    /// Machine-stable string used in artifact files and the routing table, matching
    /// the snake_case keys the original analyzer used for its category vocabulary.
    pub fn as_key(&self) -> &'static str {
        match self {
            Category::Reentrancy => "reentrancy",
            Category::UnlockedEther => "unlocked_ether",
            Category::FrontRunning => "front_running",
            Category::Suicidal => "suicidal",
            Category::Prodigal => "prodigal",
            Category::GreedyContract => "greedy_contract",
            Category::ArbitrarySend => "arbitrary_send",
            Category::Overflow => "overflow",
            Category::Underflow => "underflow",
            Category::UninitializedStorage => "uninitialized_storage",
            Category::UninitializedStoragePointer => "uninitialized_storage_pointer",
            Category::LowLevelCall => "low_level_call",
            Category::Delegatecall => "delegatecall",
            Category::Selfdestruct => "selfdestruct",
            Category::AssertViolation => "assert_violation",
            Category::WriteToArbitraryStorage => "write_to_arbitrary_storage",
            Category::BlockDependence => "block_dependence",
            Category::WeakRandomness => "weak_randomness",
            Category::VariableShadowing => "variable_shadowing",
            Category::DeprecatedFunction => "deprecated_function",
            Category::UnusedStateVariable => "unused_state_variable",
            Category::StrictBalanceEquality => "strict_balance_equality",
            Category::ArbitraryJump => "arbitrary_jump",
            Category::DosGasLimit => "dos_gas_limit",
            Category::Leak => "leak",
            Category::OutdatedCompiler => "outdated_compiler",
            Category::VersionPragma => "version_pragma",
            Category::Other => "other",
        }
    }

    pub fn from_key(key: &str) -> Self {
        match key {
            "reentrancy" => Category::Reentrancy,
            "unlocked_ether" => Category::UnlockedEther,
            "front_running" => Category::FrontRunning,
            "suicidal" => Category::Suicidal,
            "prodigal" => Category::Prodigal,
            "greedy_contract" => Category::GreedyContract,
            "arbitrary_send" => Category::ArbitrarySend,
            "overflow" => Category::Overflow,
            "underflow" => Category::Underflow,
            "uninitialized_storage" => Category::UninitializedStorage,
            "uninitialized_storage_pointer" => Category::UninitializedStoragePointer,
            "low_level_call" => Category::LowLevelCall,
            "delegatecall" => Category::Delegatecall,
            "selfdestruct" => Category::Selfdestruct,
            "assert_violation" => Category::AssertViolation,
            "write_to_arbitrary_storage" => Category::WriteToArbitraryStorage,
            "block_dependence" => Category::BlockDependence,
            "weak_randomness" => Category::WeakRandomness,
            "variable_shadowing" => Category::VariableShadowing,
            "deprecated_function" => Category::DeprecatedFunction,
            "unused_state_variable" => Category::UnusedStateVariable,
            "strict_balance_equality" => Category::StrictBalanceEquality,
            "arbitrary_jump" => Category::ArbitraryJump,
            "dos_gas_limit" => Category::DosGasLimit,
            "leak" => Category::Leak,
            "outdated_compiler" => Category::OutdatedCompiler,
            "version_pragma" => Category::VersionPragma,
            _ => Category::Other,
        }
    }
}

/// Source location of a finding, when the tool reported one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_start: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_end: Option<u32>,
}

/// A single reported finding, normalized into the closed category vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub category: Category,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// The full envelope a [`crate::parser::Parser`] (defined in the `parsers` crate)
/// produces from a tool's raw log/output, persisted as `result.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedOutput {
    pub parser: String,
    pub parser_version: String,
    pub tool_args: Vec<String>,
    pub findings: Vec<Finding>,
    pub infos: Vec<String>,
    pub errors: Vec<String>,
    pub fails: Vec<String>,
}

impl ParsedOutput {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.fails.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.findings.iter().map(|f| f.category)
    }
}

#[cfg(test)]
#[path = "finding_tests.rs"]
mod tests;
