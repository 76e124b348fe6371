//! Built-in string rules.
//!
//! Format rules (`email`, `number`, `integer`, `gt`, `lt`, `pattern`) accept
//! an empty value; pair them with `required` to reject it. Length rules
//! count characters, not bytes.

use std::collections::HashMap;
use std::sync::RwLock;

use regex::Regex;

use super::RuleRegistry;

pub(super) fn install(registry: &mut RuleRegistry) {
    registry
        .register("required", |v, _| !v.trim().is_empty())
        .set_message("required", |cx| format!("{} is required", cx.label()));

    registry
        .register("email", |v, _| {
            v.is_empty() || email_address::EmailAddress::is_valid(v)
        })
        .set_message("email", |cx| {
            format!("{} must be a valid email address", cx.label())
        });

    registry
        .register("min", |v, p| {
            count_param("min", p).is_some_and(|min| v.chars().count() >= min)
        })
        .set_message("min", |cx| {
            format!(
                "{} must be at least {} characters",
                cx.label(),
                cx.param.unwrap_or_default()
            )
        });

    registry
        .register("max", |v, p| {
            count_param("max", p).is_some_and(|max| v.chars().count() <= max)
        })
        .set_message("max", |cx| {
            format!(
                "{} must be at most {} characters",
                cx.label(),
                cx.param.unwrap_or_default()
            )
        });

    registry
        .register("length", |v, p| {
            count_param("length", p).is_some_and(|len| v.chars().count() == len)
        })
        .set_message("length", |cx| {
            format!(
                "{} must be exactly {} characters",
                cx.label(),
                cx.param.unwrap_or_default()
            )
        });

    registry
        .register("number", |v, _| v.is_empty() || v.trim().parse::<f64>().is_ok())
        .set_message("number", |cx| format!("{} must be a number", cx.label()));

    registry
        .register("integer", |v, _| v.is_empty() || v.trim().parse::<i64>().is_ok())
        .set_message("integer", |cx| format!("{} must be a whole number", cx.label()));

    registry
        .register("gt", |v, p| compare("gt", v, p, |n, bound| n > bound))
        .set_message("gt", |cx| {
            format!(
                "{} must be greater than {}",
                cx.label(),
                cx.param.unwrap_or_default()
            )
        });

    registry
        .register("lt", |v, p| compare("lt", v, p, |n, bound| n < bound))
        .set_message("lt", |cx| {
            format!(
                "{} must be less than {}",
                cx.label(),
                cx.param.unwrap_or_default()
            )
        });

    let patterns = PatternCache::default();
    registry
        .register("pattern", move |v, p| v.is_empty() || patterns.is_match(p, v))
        .set_message("pattern", |cx| format!("{} has an invalid format", cx.label()));

    registry
        .register("contains", |v, p| p.is_some_and(|s| v.contains(s)))
        .set_message("contains", |cx| {
            format!(
                "{} must contain \"{}\"",
                cx.label(),
                cx.param.unwrap_or_default()
            )
        });

    registry
        .register("equals", |v, p| p.is_some_and(|s| v == s))
        .set_message("equals", |cx| {
            format!(
                "{} must equal \"{}\"",
                cx.label(),
                cx.param.unwrap_or_default()
            )
        });
}

fn count_param(rule: &str, param: Option<&str>) -> Option<usize> {
    let parsed = param.and_then(|p| p.parse().ok());
    if parsed.is_none() {
        log::warn!("rule '{rule}' needs a non-negative integer parameter, got {param:?}");
    }
    parsed
}

fn compare(rule: &str, value: &str, param: Option<&str>, op: fn(f64, f64) -> bool) -> bool {
    let Some(bound) = param.and_then(|p| p.parse::<f64>().ok()) else {
        log::warn!("rule '{rule}' needs a numeric parameter, got {param:?}");
        return false;
    };
    if value.is_empty() {
        return true;
    }
    value
        .trim()
        .parse::<f64>()
        .is_ok_and(|n| op(n, bound))
}

/// Compiled `pattern` regexes, keyed by source. Invalid sources are
/// remembered too so the warning is logged once.
#[derive(Default)]
struct PatternCache {
    compiled: RwLock<HashMap<String, Option<Regex>>>,
}

impl PatternCache {
    fn is_match(&self, pattern: Option<&str>, value: &str) -> bool {
        let Some(pattern) = pattern else {
            log::warn!("rule 'pattern' needs a regex parameter");
            return false;
        };

        if let Some(hit) = self.compiled.read().ok().and_then(|c| c.get(pattern).cloned()) {
            return hit.is_some_and(|re| re.is_match(value));
        }

        let compiled = match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                log::warn!("rule 'pattern': invalid regex '{pattern}': {e}");
                None
            }
        };
        let matched = compiled.as_ref().is_some_and(|re| re.is_match(value));
        if let Ok(mut cache) = self.compiled.write() {
            cache.insert(pattern.to_string(), compiled);
        }
        matched
    }
}
