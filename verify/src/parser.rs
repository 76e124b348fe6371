//! Rule string parsing.
//!
//! A rule string is a `|`-separated list of rules, each either a bare name
//! (`required`) or a name with a single parameter (`min:3`). There is no
//! escaping: a parameter is cut at its first `:`, and `|` can never appear
//! inside one.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::error::{Result, VerifyError};

pub const RULE_SEPARATOR: char = '|';
pub const PARAM_SEPARATOR: char = ':';

/// One parsed rule: a name and an optional parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleDescriptor {
    pub name: String,
    pub param: Option<String>,
}

impl RuleDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param: None,
        }
    }

    pub fn with_param(name: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param: Some(param.into()),
        }
    }

    pub fn param(&self) -> Option<&str> {
        self.param.as_deref()
    }
}

impl fmt::Display for RuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.param {
            Some(param) => write!(f, "{}{PARAM_SEPARATOR}{param}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Join descriptors back into a rule string.
pub fn join(rules: &[RuleDescriptor]) -> String {
    rules
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("|")
}

/// Split a rule string into ordered descriptors.
pub fn parse(rules: &str) -> Result<Vec<RuleDescriptor>> {
    if rules.trim().is_empty() {
        return Err(VerifyError::config(rules, "no rules given"));
    }

    rules
        .split(RULE_SEPARATOR)
        .map(|segment| parse_segment(rules, segment.trim()))
        .collect()
}

fn parse_segment(rules: &str, segment: &str) -> Result<RuleDescriptor> {
    let mut parts = segment.split(PARAM_SEPARATOR);
    let name = parts.next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(VerifyError::config(rules, "empty rule"));
    }

    let param = parts
        .next()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string);
    if parts.next().is_some() {
        log::warn!("rule '{segment}': parameter truncated at '{PARAM_SEPARATOR}'");
    }

    Ok(RuleDescriptor {
        name: name.to_string(),
        param,
    })
}

/// Memoized [`parse`], shared by every field bound through one binder.
///
/// Only successful parses are cached.
#[derive(Clone, Default)]
pub struct RuleCache {
    parsed: Arc<RwLock<HashMap<String, Arc<[RuleDescriptor]>>>>,
}

impl RuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, rules: &str) -> Result<Arc<[RuleDescriptor]>> {
        if let Some(hit) = self.parsed.read().ok().and_then(|p| p.get(rules).cloned()) {
            return Ok(hit);
        }

        let parsed: Arc<[RuleDescriptor]> = parse(rules)?.into();
        if let Ok(mut cache) = self.parsed.write() {
            cache.insert(rules.to_string(), Arc::clone(&parsed));
        }
        Ok(parsed)
    }

    pub fn len(&self) -> usize {
        self.parsed.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for RuleCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleCache")
            .field("entries", &self.len())
            .finish()
    }
}
