//! Identifier normalization: free-form country/capital names → alpha-2 codes.

use std::collections::HashMap;

use crate::capitals::{normalize_code, CapitalRepository, CapitalSummary};

/// Lookup table from folded identifiers to upper-case alpha-2 codes.
///
/// Keys are matched case-insensitively, ignoring surrounding whitespace,
/// repeated inner whitespace, and common Latin diacritics.
#[derive(Debug, Clone, Default)]
pub struct IdentifierNormalizer {
    table: HashMap<String, String>,
}

impl IdentifierNormalizer {
    /// Table over country names and capital names of a roster.
    pub fn from_roster(roster: &[CapitalSummary]) -> Self {
        let mut normalizer = Self::default();
        for capital in roster {
            normalizer.add_alias(&capital.country_name, &capital.country_code);
            normalizer.add_alias(&capital.name, &capital.country_code);
        }
        normalizer
    }

    /// Roster table plus the alpha-3 codes known to the repository.
    pub fn from_repository(repository: &CapitalRepository) -> Self {
        let mut normalizer = Self::from_roster(repository.list_all());
        for entry in repository.entries() {
            if let Some(cca3) = &entry.cca3 {
                normalizer.add_alias(cca3, &entry.cca2);
            }
        }
        normalizer
    }

    /// Map an extra identifier to a code. The first mapping for a key wins.
    pub fn add_alias(&mut self, identifier: &str, code: &str) {
        let key = fold_key(identifier);
        if key.is_empty() {
            return;
        }
        self.table
            .entry(key)
            .or_insert_with(|| code.to_ascii_uppercase());
    }

    /// Resolve an identifier to a two-letter code.
    ///
    /// Anything shaped like an alpha-2 code is passed through upper-cased,
    /// known or not, so the resolver reports unknown codes itself.
    pub fn resolve(&self, identifier: &str) -> Option<String> {
        if let Some(code) = normalize_code(identifier) {
            return Some(code);
        }
        self.table.get(&fold_key(identifier)).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.table.len()
    }
}

fn fold_key(identifier: &str) -> String {
    identifier
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .map(fold_char)
        .collect::<String>()
        .to_lowercase()
}

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ç' | 'Ç' => 'c',
        'ñ' | 'Ñ' => 'n',
        other => other,
    }
}
