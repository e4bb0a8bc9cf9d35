//! CSSOM Style Sheets
//!
//! The rule list of a `<style>` element. Rules are kept as serialized text
//! (`cssText`); edits through [`StyleSheet::insert_rule`] and
//! [`StyleSheet::delete_rule`] are invisible to mutation observers.

use crate::{DomError, DomResult};

/// Style sheet attached to a `<style>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSheet {
    rules: Vec<String>,
    /// False for sheets whose rules must not be read (cross-origin)
    origin_clean: bool,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            origin_clean: true,
        }
    }
}

impl StyleSheet {
    /// Parse a sheet from style text
    pub fn parse(text: &str) -> Self {
        Self {
            rules: split_rules(text),
            origin_clean: true,
        }
    }

    /// Re-parse after the owner's text changed. Origin flag is kept.
    pub fn replace_text(&mut self, text: &str) {
        self.rules = split_rules(text);
    }

    /// Rule texts; fails for cross-origin sheets
    pub fn css_rules(&self) -> DomResult<&[String]> {
        if !self.origin_clean {
            return Err(DomError::Security);
        }
        Ok(&self.rules)
    }

    /// Insert a rule at `index`, returning the index
    pub fn insert_rule(&mut self, rule: &str, index: usize) -> DomResult<usize> {
        if !self.origin_clean {
            return Err(DomError::Security);
        }
        if index > self.rules.len() {
            return Err(DomError::IndexSize(index));
        }
        self.rules.insert(index, rule.trim().to_string());
        Ok(index)
    }

    /// Delete the rule at `index`
    pub fn delete_rule(&mut self, index: usize) -> DomResult<()> {
        if !self.origin_clean {
            return Err(DomError::Security);
        }
        if index >= self.rules.len() {
            return Err(DomError::IndexSize(index));
        }
        self.rules.remove(index);
        Ok(())
    }

    /// Mark the sheet as cross-origin
    pub fn set_origin_clean(&mut self, clean: bool) {
        self.origin_clean = clean;
    }

    pub fn is_origin_clean(&self) -> bool {
        self.origin_clean
    }
}

/// Split style text into top-level rule texts.
fn split_rules(text: &str) -> Vec<String> {
    let mut rules = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, ch) in text.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let rule = text[start..=i].trim();
                    if !rule.is_empty() {
                        rules.push(rule.to_string());
                    }
                    start = i + 1;
                }
            }
            ';' if depth == 0 => {
                // at-rules without a block (@import, @charset)
                let rule = text[start..=i].trim();
                if !rule.is_empty() {
                    rules.push(rule.to_string());
                }
                start = i + 1;
            }
            _ => {}
        }
    }

    rules
}
