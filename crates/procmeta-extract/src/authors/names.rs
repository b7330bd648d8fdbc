//! Splitting an author string into name parts by an ordered rule list.

use procmeta_core::config::ExtractionConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonName {
    pub first: String,
    pub middle: String,
    pub last: String,
    pub suffix: String,
}

/// Fixed suffix and particle tables consulted by the rules.
#[derive(Debug, Clone)]
pub struct NameTables {
    suffixes: Vec<String>,
    prefixes: Vec<String>,
}

impl Default for NameTables {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

impl NameTables {
    pub fn new(suffixes: Vec<String>, prefixes: Vec<String>) -> Self {
        Self { suffixes, prefixes }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.name_suffixes.clone(), config.name_prefixes.clone())
    }

    fn is_suffix(&self, token: &str) -> bool {
        self.suffixes.iter().any(|s| s == token)
    }

    fn is_prefix(&self, token: &str) -> bool {
        self.prefixes.iter().any(|p| p == token)
    }
}

/// Name-assignment rules, evaluated in [`NameRule::PRECEDENCE`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    /// `First [Middle…] Last Suffix`
    Suffix,
    /// `First Particle Rest…`: everything after the first token is the last name.
    Prefix,
    /// `First [Middle…] Last`
    Default,
}

impl NameRule {
    pub const PRECEDENCE: [NameRule; 3] = [NameRule::Suffix, NameRule::Prefix, NameRule::Default];

    /// Apply this rule to whitespace tokens, or `None` when it does not fire.
    pub fn apply(self, tokens: &[&str], tables: &NameTables) -> Option<PersonName> {
        let n = tokens.len();
        match self {
            NameRule::Suffix if n >= 3 && tables.is_suffix(tokens[n - 1]) => Some(PersonName {
                first: tokens[0].to_string(),
                middle: tokens[1..n - 2].join(" "),
                last: tokens[n - 2].to_string(),
                suffix: tokens[n - 1].to_string(),
            }),
            NameRule::Prefix if n >= 3 && tables.is_prefix(tokens[1]) => Some(PersonName {
                first: tokens[0].to_string(),
                last: tokens[1..].join(" "),
                ..Default::default()
            }),
            NameRule::Default if n >= 2 => Some(PersonName {
                first: tokens[0].to_string(),
                middle: tokens[1..n - 1].join(" "),
                last: tokens[n - 1].to_string(),
                suffix: String::new(),
            }),
            _ => None,
        }
    }
}

/// Split a full name; `None` when fewer than two tokens are present.
pub fn split_name(raw: &str, tables: &NameTables) -> Option<PersonName> {
    let tokens = raw.split_whitespace().collect::<Vec<_>>();
    NameRule::PRECEDENCE
        .iter()
        .find_map(|rule| rule.apply(&tokens, tables))
}
