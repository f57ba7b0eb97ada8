use crate::domain::query::{resolve_attribute, AttributeQuery};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const COLORS: &[&str] = &[
    "black", "white", "red", "blue", "green", "silver", "gray", "grey", "yellow", "brown",
    "orange", "purple", "pink",
];

const MAKES: &[&str] = &[
    "toyota",
    "honda",
    "ford",
    "chevrolet",
    "bmw",
    "audi",
    "mercedes",
    "tesla",
    "volkswagen",
    "hyundai",
    "kia",
    "nissan",
];

const CONDITIONS: &[&str] = &["excellent", "good", "fair", "poor"];

/// Classifies a bare extracted word against the known vocabularies, e.g.
/// "green" is a color and "toyota" is a make. Used by rules whose pattern
/// captures a value with no attribute name, like "how many green vehicles".
fn classify_value(value: &str) -> Option<(&'static str, String)> {
    if COLORS.contains(&value) {
        return Some(("color", value.to_string()));
    }
    if MAKES.contains(&value) {
        return Some(("make", value.to_string()));
    }
    if CONDITIONS.contains(&value) {
        return Some(("condition", value.to_string()));
    }
    match value {
        "electric" | "hybrid" | "diesel" | "gasoline" => Some(("fuel_type", value.to_string())),
        "gas" => Some(("fuel_type", "gasoline".to_string())),
        _ => {
            if looks_like_year(value) {
                Some(("year", value.to_string()))
            } else {
                None
            }
        }
    }
}

fn looks_like_year(value: &str) -> bool {
    value.len() == 4 && value.parse::<u16>().map_or(false, |y| (1900..2100).contains(&y))
}

/// Rejects candidates whose value cannot hold for the attribute, so a typo
/// year like "202o" becomes NotDetected instead of a bogus query.
fn validate_candidate(attribute: &str, value: &str) -> bool {
    match attribute {
        "year" => looks_like_year(value),
        "price" => value.parse::<f64>().is_ok(),
        _ => !value.is_empty(),
    }
}

/// One detection rule: a pattern plus an extractor producing a candidate
/// `(attribute_name, attribute_value)` pair. Rules are tried in table order
/// and the first rule whose extraction and resolution both succeed wins, so
/// narrower patterns must come before the general ones that would
/// mis-extract them.
pub struct Rule {
    pub name: &'static str,
    pattern: Regex,
    extract: fn(&Captures) -> Option<(String, String)>,
}

fn extract_classified(caps: &Captures) -> Option<(String, String)> {
    let value = caps.name("value")?.as_str();
    classify_value(value).map(|(attr, v)| (attr.to_string(), v))
}

fn extract_year(caps: &Captures) -> Option<(String, String)> {
    let value = caps.name("value")?.as_str();
    Some(("year".to_string(), value.to_string()))
}

fn extract_condition(caps: &Captures) -> Option<(String, String)> {
    let value = caps.name("value")?.as_str();
    Some(("condition".to_string(), value.to_string()))
}

fn extract_named_attribute(caps: &Captures) -> Option<(String, String)> {
    let attr = caps.name("attr")?.as_str();
    let value = caps.name("value")?.as_str();
    let canonical = resolve_attribute(attr)?;
    Some((canonical.to_string(), value.to_string()))
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule {
            name: "bare_value_count",
            pattern: Regex::new(
                r"(?:how many|count of|count the|number of|show all|find all)\s+(?P<value>[a-z0-9-]+)\s+(?:vehicles|cars)\b",
            )
            .unwrap(),
            extract: extract_classified,
        },
        Rule {
            name: "count_of_value",
            pattern: Regex::new(r"count of\s+(?P<value>[a-z0-9-]+)\b").unwrap(),
            extract: extract_classified,
        },
        Rule {
            name: "year_of_manufacture",
            pattern: Regex::new(r"\b(?:from|in|made in)\s+(?P<value>\d{4})\b").unwrap(),
            extract: extract_year,
        },
        Rule {
            name: "condition_phrase",
            pattern: Regex::new(r"(?P<value>excellent|good|fair|poor|like new)\s+condition\b")
                .unwrap(),
            extract: extract_condition,
        },
        Rule {
            name: "named_attribute_equals",
            pattern: Regex::new(r"with\s+(?P<attr>[a-z_]+)\s+(?:is|=|of)\s+(?P<value>[a-z0-9-]+)\b")
                .unwrap(),
            extract: extract_named_attribute,
        },
        Rule {
            name: "vehicles_that_are",
            pattern: Regex::new(r"(?:vehicles|cars)\s+that are\s+(?P<value>[a-z0-9-]+)\b").unwrap(),
            extract: extract_classified,
        },
    ]
});

/// Classifies free text as an attribute-count request. Deterministic and
/// case-insensitive; extracted values come back lower-cased. Returns `None`
/// when no rule yields a valid candidate.
pub fn detect(text: &str) -> Option<AttributeQuery> {
    let normalized = text.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    for rule in RULES.iter() {
        let Some(caps) = rule.pattern.captures(&normalized) else {
            continue;
        };
        let Some((attribute_name, attribute_value)) = (rule.extract)(&caps) else {
            continue;
        };
        if !validate_candidate(&attribute_name, &attribute_value) {
            continue;
        }
        tracing::debug!(rule = rule.name, %attribute_name, %attribute_value, "attribute query detected");
        return Some(AttributeQuery {
            attribute_name,
            attribute_value,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(attr: &str, value: &str) -> AttributeQuery {
        AttributeQuery {
            attribute_name: attr.to_string(),
            attribute_value: value.to_string(),
        }
    }

    #[test]
    fn detects_color_count() {
        assert_eq!(
            detect("how many green vehicles do we have?"),
            Some(q("color", "green"))
        );
    }

    #[test]
    fn detects_make_via_count_of() {
        assert_eq!(
            detect("count of toyota vehicles"),
            Some(q("make", "toyota"))
        );
    }

    #[test]
    fn detection_is_case_insensitive_and_idempotent() {
        let upper = detect("How many GREEN vehicles do we have?");
        let lower = detect("how many green vehicles do we have?");
        assert_eq!(upper, lower);
        assert_eq!(upper, Some(q("color", "green")));
    }

    #[test]
    fn detects_year_queries() {
        assert_eq!(
            detect("how many vehicles from 2022"),
            Some(q("year", "2022"))
        );
        assert_eq!(detect("cars made in 2020"), Some(q("year", "2020")));
    }

    #[test]
    fn detects_fuel_type_with_alias() {
        assert_eq!(
            detect("how many electric vehicles are there"),
            Some(q("fuel_type", "electric"))
        );
        assert_eq!(detect("number of gas cars"), Some(q("fuel_type", "gasoline")));
    }

    #[test]
    fn detects_condition_phrase() {
        assert_eq!(
            detect("how many excellent condition vehicles"),
            Some(q("condition", "excellent"))
        );
    }

    #[test]
    fn general_rule_resolves_attribute_synonyms() {
        assert_eq!(
            detect("how many vehicles with brand is honda"),
            Some(q("make", "honda"))
        );
        assert_eq!(
            detect("vehicles with color = red"),
            Some(q("color", "red"))
        );
    }

    #[test]
    fn specific_rule_wins_over_general_rule() {
        // "green" must classify as a color value, not be mis-read as an
        // attribute name by a later rule.
        assert_eq!(
            detect("how many green vehicles with color is blue"),
            Some(q("color", "green"))
        );
    }

    #[test]
    fn invalid_year_is_not_detected() {
        assert_eq!(detect("how many vehicles with year is 202o"), None);
        assert_eq!(detect("vehicles from 20222 onwards"), None);
    }

    #[test]
    fn unrelated_text_is_not_detected() {
        assert_eq!(detect("what's the weather today"), None);
        assert_eq!(detect(""), None);
        assert_eq!(detect("tell me about financing options"), None);
    }

    #[test]
    fn unknown_attribute_name_falls_through() {
        assert_eq!(detect("how many vehicles with horsepower is 300"), None);
    }
}
