// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

use crate::error::{MaskError, Result};

const FIRST_NAMES: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/resources/wordlists/first_names.txt"
));
const LAST_NAMES: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/resources/wordlists/last_names.txt"
));
const ORG_NAMES: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/resources/wordlists/org_names.txt"
));
const ORG_STRUCTURE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/resources/wordlists/org_structure.txt"
));

/// Names of the lists a profile may override.
pub const LIST_NAMES: [&str; 4] = ["first_names", "last_names", "org_names", "org_structure"];

/// Source vocabularies for the name and organisation strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordLists {
    pub first_names: Vec<String>,
    pub last_names: Vec<String>,
    pub org_names: Vec<String>,
    pub org_structure: Vec<String>,
}

impl WordLists {
    pub fn embedded() -> Self {
        Self {
            first_names: split_list(FIRST_NAMES),
            last_names: split_list(LAST_NAMES),
            org_names: split_list(ORG_NAMES),
            org_structure: split_list(ORG_STRUCTURE),
        }
    }

    /// Swap in a profile-supplied list. Empty lists would leave a strategy
    /// with nothing to pick from, so they are refused.
    pub fn replace(&mut self, name: &str, words: Vec<String>) -> Result<()> {
        if words.is_empty() {
            return Err(MaskError::configuration(format!(
                "word list '{name}' is empty"
            )));
        }
        let slot = match name {
            "first_names" => &mut self.first_names,
            "last_names" => &mut self.last_names,
            "org_names" => &mut self.org_names,
            "org_structure" => &mut self.org_structure,
            other => {
                return Err(MaskError::configuration(format!(
                    "unknown word list '{other}' (expected one of {})",
                    LIST_NAMES.join(", ")
                )));
            }
        };
        *slot = words;
        Ok(())
    }
}

/// One entry per line; blank lines and `#` comments are ignored.
fn split_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
