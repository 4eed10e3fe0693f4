//! Parsed output of the Redis `INFO` command
//!
//! ```text
//! # Server
//! redis_version:7.2.4
//! # Memory
//! used_memory:1048576
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

pub type Section = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InfoError {
    #[error("Got invalid Redis INFO string")]
    Empty,

    #[error("Got invalid Redis INFO line: {0}")]
    InvalidLine(String),

    #[error("There is no '{0}' Redis INFO section")]
    MissingSection(String),
}

/// `INFO` output grouped by section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedisInfo {
    sections: BTreeMap<String, Section>,
}

impl RedisInfo {
    /// Parse the bulk string returned by `INFO`
    pub fn parse(text: &str) -> Result<Self, InfoError> {
        let mut sections = BTreeMap::new();
        let mut current: Option<(String, Section)> = None;
        let mut seen_line = false;

        for line in text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)) {
            if line.trim().is_empty() {
                continue;
            }
            seen_line = true;

            if let Some(header) = line.strip_prefix('#') {
                if let Some((name, section)) = current.take() {
                    sections.insert(name, section);
                }
                current = Some((header.trim().to_string(), Section::new()));
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                return Err(InfoError::InvalidLine(line.to_string()));
            };
            // Keys before the first header land in an unnamed section
            let (_, section) = current.get_or_insert_with(|| (String::new(), Section::new()));
            section.insert(key.to_string(), value.to_string());
        }

        if !seen_line {
            return Err(InfoError::Empty);
        }

        if let Some((name, section)) = current {
            sections.insert(name, section);
        }

        Ok(Self { sections })
    }

    /// Section by name, empty when absent
    pub fn section(&self, name: &str) -> Section {
        self.sections.get(name).cloned().unwrap_or_default()
    }

    pub fn require_section(&self, name: &str) -> Result<&Section, InfoError> {
        self.sections
            .get(name)
            .ok_or_else(|| InfoError::MissingSection(name.to_string()))
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections.get(section)?.get(key).map(String::as_str)
    }

    /// Values for `keys` in `section`, `None` for absent keys
    pub fn section_properties<'a>(
        &self,
        section: &str,
        keys: &[&'a str],
    ) -> BTreeMap<&'a str, Option<String>> {
        keys.iter()
            .map(|key| (*key, self.get(section, key).map(str::to_string)))
            .collect()
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}
