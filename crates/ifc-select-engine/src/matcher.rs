// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Primitive comparison functions and glob compilation
//!
//! Everything here is side-effect-free. String matching is
//! case-insensitive throughout; numeric equality absorbs floating-point
//! noise from upstream unit conversion with an absolute tolerance.

use ifc_select_model::{ComparisonOperator, PropertyValue};
use regex::Regex;
use tracing::debug;

/// Absolute tolerance for numeric equality
pub const NUMERIC_TOLERANCE: f64 = 1e-4;

/// Whether a pattern carries glob wildcards
pub fn has_wildcards(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Compile a glob pattern to an anchored, case-insensitive regex
///
/// `*` matches any run of characters, `?` any single character; all other
/// regex metacharacters are escaped literally. Pure and idempotent: the
/// same pattern always compiles to the same regex.
pub fn compile_glob(pattern: &str) -> Regex {
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push_str("(?i)^");
    for c in pattern.chars() {
        match c {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            _ => source.push_str(&regex::escape(&c.to_string())),
        }
    }
    source.push('$');
    // Escaped literal input cannot fail to compile
    Regex::new(&source).unwrap_or_else(|_| Regex::new("$^").unwrap())
}

/// Match a subject against a pattern
///
/// Glob match when the pattern carries wildcards, otherwise
/// case-insensitive equality.
pub fn match_pattern(subject: &str, pattern: &str) -> bool {
    if has_wildcards(pattern) {
        compile_glob(pattern).is_match(subject)
    } else {
        subject.to_lowercase() == pattern.to_lowercase()
    }
}

/// Evaluate a string operator
///
/// A missing subject satisfies only `notEquals`/`notExists`; every other
/// operator returns false for it.
pub fn eval_string_op(subject: Option<&str>, op: ComparisonOperator, value: &str) -> bool {
    let subject = match subject {
        Some(s) => s,
        None => return op.accepts_missing(),
    };

    match op {
        ComparisonOperator::Equals => match_pattern(subject, value),
        ComparisonOperator::NotEquals => !match_pattern(subject, value),
        ComparisonOperator::Contains => {
            if has_wildcards(value) {
                compile_glob(&format!("*{value}*")).is_match(subject)
            } else {
                subject.to_lowercase().contains(&value.to_lowercase())
            }
        }
        ComparisonOperator::StartsWith => {
            if has_wildcards(value) {
                compile_glob(&format!("{value}*")).is_match(subject)
            } else {
                subject.to_lowercase().starts_with(&value.to_lowercase())
            }
        }
        ComparisonOperator::EndsWith => {
            if has_wildcards(value) {
                compile_glob(&format!("*{value}")).is_match(subject)
            } else {
                subject.to_lowercase().ends_with(&value.to_lowercase())
            }
        }
        ComparisonOperator::Matches => match Regex::new(&format!("(?i){value}")) {
            Ok(re) => re.is_match(subject),
            Err(err) => {
                debug!(pattern = value, %err, "invalid regex in matches operator");
                false
            }
        },
        ComparisonOperator::Exists => true,
        ComparisonOperator::NotExists => false,
        // Numeric operators over strings: try to parse both sides
        _ => match (subject.parse::<f64>().ok(), value.parse::<f64>().ok()) {
            (subject_num, Some(value_num)) => eval_numeric_op(subject_num, op, value_num, None),
            _ => op.accepts_missing(),
        },
    }
}

/// Evaluate a numeric operator
///
/// `equals`/`notEquals` use the absolute [`NUMERIC_TOLERANCE`]; `between`
/// is inclusive and requires both bounds. A missing or NaN subject
/// satisfies only `notEquals`.
pub fn eval_numeric_op(
    subject: Option<f64>,
    op: ComparisonOperator,
    value: f64,
    value_to: Option<f64>,
) -> bool {
    let subject = match subject {
        Some(n) if !n.is_nan() => n,
        _ => return op.accepts_missing(),
    };

    match op {
        ComparisonOperator::Equals => (subject - value).abs() <= NUMERIC_TOLERANCE,
        ComparisonOperator::NotEquals => (subject - value).abs() > NUMERIC_TOLERANCE,
        ComparisonOperator::GreaterThan => subject > value,
        ComparisonOperator::GreaterThanOrEqual => subject >= value,
        ComparisonOperator::LessThan => subject < value,
        ComparisonOperator::LessThanOrEqual => subject <= value,
        ComparisonOperator::Between => match value_to {
            Some(hi) => subject >= value && subject <= hi,
            None => false,
        },
        ComparisonOperator::Exists => true,
        ComparisonOperator::NotExists => false,
        // String operators over numbers: compare the decimal forms
        _ => eval_string_op(Some(&subject.to_string()), op, &value.to_string()),
    }
}

/// Coerce a string to a boolean
///
/// Recognizes `true`/`TRUE`/`1` and `false`/`FALSE`/`0`; anything else is
/// not a boolean.
pub fn coerce_bool(s: &str) -> Option<bool> {
    match s {
        "1" => Some(true),
        "0" => Some(false),
        _ if s.eq_ignore_ascii_case("true") => Some(true),
        _ if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Coerce a property value to a boolean
pub fn value_as_bool(value: &PropertyValue) -> Option<bool> {
    match value {
        PropertyValue::Boolean(b) => Some(*b),
        PropertyValue::Text(s) => coerce_bool(s),
        PropertyValue::Number(n) => match *n {
            n if n == 1.0 => Some(true),
            n if n == 0.0 => Some(false),
            _ => None,
        },
        PropertyValue::Null => None,
    }
}

/// General operator dispatch
///
/// `exists`/`notExists` short-circuit before type-specific routing. When
/// both sides are numeric, the numeric path is taken; a boolean subject is
/// compared as a boolean; otherwise both sides are stringified and handed
/// to the string path.
pub fn eval_op(
    subject: Option<&PropertyValue>,
    op: ComparisonOperator,
    value: Option<&PropertyValue>,
    value_to: Option<f64>,
) -> bool {
    let present = subject.map(|v| !v.is_null()).unwrap_or(false);
    match op {
        ComparisonOperator::Exists => return present,
        ComparisonOperator::NotExists => return !present,
        _ => {}
    }

    let subject = match subject {
        Some(v) if !v.is_null() => v,
        _ => return op.accepts_missing(),
    };

    // Numeric path: both operands numeric (the comparison value may arrive
    // as a numeric string from a hand-written document)
    let value_num = value.and_then(|v| match v {
        PropertyValue::Number(n) => Some(*n),
        PropertyValue::Text(s) => s.parse::<f64>().ok(),
        _ => None,
    });
    if let (Some(subject_num), Some(value_num)) = (subject.as_number(), value_num) {
        return eval_numeric_op(Some(subject_num), op, value_num, value_to);
    }

    // Boolean path: boolean subject compared by equality
    if let Some(subject_bool) = subject.as_bool() {
        let value_bool = value.and_then(value_as_bool);
        return match (op, value_bool) {
            (ComparisonOperator::Equals, Some(b)) => subject_bool == b,
            (ComparisonOperator::NotEquals, Some(b)) => subject_bool != b,
            _ => false,
        };
    }

    // String path
    let value_text = value.map(|v| v.to_string()).unwrap_or_default();
    eval_string_op(Some(&subject.to_string()), op, &value_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ComparisonOperator as Op;

    #[test]
    fn glob_compilation() {
        assert!(compile_glob("Pset_*").is_match("Pset_WallCommon"));
        assert!(compile_glob("W?ll").is_match("Wall"));
        assert!(!compile_glob("W?ll").is_match("Waall"));
        // metacharacters are literal
        assert!(compile_glob("a.b").is_match("a.b"));
        assert!(!compile_glob("a.b").is_match("axb"));
    }

    #[test]
    fn glob_is_idempotent() {
        assert_eq!(
            compile_glob("Pset_*").as_str(),
            compile_glob("Pset_*").as_str()
        );
    }

    #[test]
    fn pattern_match_case_insensitive() {
        assert!(match_pattern("IfcWall", "IFCWALL"));
        assert!(match_pattern("IfcWallStandardCase", "ifcwall*"));
        assert!(!match_pattern("IfcSlab", "IfcWall"));
    }

    #[test]
    fn string_operators() {
        assert!(eval_string_op(Some("Basic Wall"), Op::Contains, "wall"));
        assert!(eval_string_op(Some("Basic Wall"), Op::StartsWith, "basic"));
        assert!(eval_string_op(Some("Basic Wall"), Op::EndsWith, "WALL"));
        // equals delegates to pattern matching, so wildcards work
        assert!(eval_string_op(Some("Basic Wall"), Op::Equals, "Basic*"));
        // wildcarded comparison values get wrapped before delegating
        assert!(eval_string_op(Some("Basic Wall 200"), Op::Contains, "W*ll"));
        assert!(eval_string_op(Some("W-01"), Op::Matches, r"^w-\d+$"));
    }

    #[test]
    fn invalid_regex_is_false_not_error() {
        assert!(!eval_string_op(Some("anything"), Op::Matches, "[unclosed"));
    }

    #[test]
    fn missing_subject_satisfies_only_negations() {
        assert!(eval_string_op(None, Op::NotEquals, "x"));
        assert!(eval_string_op(None, Op::NotExists, "x"));
        assert!(!eval_string_op(None, Op::Equals, "x"));
        assert!(!eval_string_op(None, Op::Contains, "x"));
        assert!(eval_numeric_op(None, Op::NotEquals, 1.0, None));
        assert!(!eval_numeric_op(None, Op::LessThan, 1.0, None));
        assert!(eval_numeric_op(Some(f64::NAN), Op::NotEquals, 1.0, None));
    }

    #[test]
    fn numeric_tolerance_boundary() {
        // within 1e-4 absolute difference values are equal
        assert!(eval_numeric_op(Some(30.00001), Op::Equals, 30.0, None));
        assert!(eval_numeric_op(Some(30.0001), Op::Equals, 30.0, None));
        assert!(!eval_numeric_op(Some(30.00011), Op::Equals, 30.0, None));
        assert!(eval_numeric_op(Some(30.00011), Op::NotEquals, 30.0, None));
    }

    #[test]
    fn between_is_inclusive_and_needs_both_bounds() {
        assert!(eval_numeric_op(Some(2.0), Op::Between, 2.0, Some(3.0)));
        assert!(eval_numeric_op(Some(3.0), Op::Between, 2.0, Some(3.0)));
        assert!(!eval_numeric_op(Some(3.5), Op::Between, 2.0, Some(3.0)));
        assert!(!eval_numeric_op(Some(2.5), Op::Between, 2.0, None));
    }

    #[test]
    fn bool_coercion() {
        assert_eq!(coerce_bool("true"), Some(true));
        assert_eq!(coerce_bool("TRUE"), Some(true));
        assert_eq!(coerce_bool("1"), Some(true));
        assert_eq!(coerce_bool("false"), Some(false));
        assert_eq!(coerce_bool("0"), Some(false));
        assert_eq!(coerce_bool("yes"), None);
    }

    #[test]
    fn general_dispatch() {
        let b = PropertyValue::Boolean(true);
        let t = PropertyValue::Text("TRUE".into());
        assert!(eval_op(Some(&b), Op::Equals, Some(&t), None));

        let n = PropertyValue::Number(200.0);
        let v = PropertyValue::Number(150.0);
        assert!(eval_op(Some(&n), Op::GreaterThan, Some(&v), None));
        // numeric string comparison value routes to the numeric path
        let v = PropertyValue::Text("150".into());
        assert!(eval_op(Some(&n), Op::GreaterThan, Some(&v), None));

        let s = PropertyValue::Text("Concrete".into());
        let v = PropertyValue::Text("conc*".into());
        assert!(eval_op(Some(&s), Op::Equals, Some(&v), None));
    }

    #[test]
    fn existence_short_circuits() {
        let n = PropertyValue::Number(1.0);
        assert!(eval_op(Some(&n), Op::Exists, None, None));
        assert!(!eval_op(Some(&n), Op::NotExists, None, None));
        assert!(!eval_op(None, Op::Exists, None, None));
        assert!(eval_op(None, Op::NotExists, None, None));
        // explicit null counts as missing
        let null = PropertyValue::Null;
        assert!(!eval_op(Some(&null), Op::Exists, None, None));
        assert!(eval_op(Some(&null), Op::NotExists, None, None));
    }
}
