// src/services/sensitive_words.rs
// DOCUMENTATION: Sensitive word list used to reject memo content
// PURPOSE: Load the base64-encoded word list and match text against it

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs;
use std::path::Path;

/// Lowercased sensitive words
/// DOCUMENTATION: The file stores one base64 word per line so the raw list never sits in plain text
#[derive(Debug, Clone, Default)]
pub struct SensitiveWords {
    words: Vec<String>,
}

impl SensitiveWords {
    /// Load the list from disk; a missing or unreadable file yields an empty list
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => {
                let list = Self::parse(&raw);
                log::info!(
                    "Loaded {} sensitive words from {}",
                    list.len(),
                    path.display()
                );
                list
            }
            Err(e) => {
                log::warn!(
                    "Sensitive word file {} not loaded: {} - filtering disabled",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Decode one base64 word per line, skipping blank and undecodable lines
    pub fn parse(raw: &str) -> Self {
        Self::from_words(
            raw.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .filter_map(|line| String::from_utf8(STANDARD.decode(line).ok()?).ok()),
        )
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        words.sort();
        words.dedup();
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// First listed word contained in `text`, compared case-insensitively
    pub fn find_in(&self, text: &str) -> Option<&str> {
        if self.words.is_empty() {
            return None;
        }
        let lowered = text.to_lowercase();
        self.words
            .iter()
            .find(|w| lowered.contains(w.as_str()))
            .map(String::as_str)
    }
}
