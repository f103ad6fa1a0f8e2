//! Property-based tests for sanitation
//!
//! Random trees mixing RichText elements, HTML leftovers and unknown
//! attributes must always come out of the sanitizer conforming to the
//! grammar, and a second pass must find nothing left to repair.

mod common;

use common::{richtext, sanitize, violations};
use proptest::prelude::*;
use richtext::validators::ContentValidator;
use richtext::{SchemaRegistry, Strictness};

const ELEMENTS: &[&str] = &[
    "p", "ul", "ol", "li", "span", "em", "strong", "a", "pre", "blockquote", "table", "tbody",
    "tr", "td", "sub", "h1", "b", "div", "font",
];

const ATTRIBUTES: &[&str] = &[
    r#" class="x""#,
    r#" lang="en""#,
    r#" lang="in valid""#,
    r#" dir="rtl""#,
    r#" dir="up""#,
    r#" colspan="2""#,
    r#" colspan="two""#,
    r#" xlink:href="u""#,
    r#" xlink:type="extended""#,
    r#" xml:space="preserve""#,
    r#" bogus="1""#,
];

/// Generate character data without markup characters
fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["[a-z]{1,6}", " ", "[a-z ]{0,8}"]
}

/// Generate a node serialized as markup
fn node_strategy() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        text_strategy(),
        Just("<br/>".to_string()),
        Just(r#"<img alt="x" width="10%"/>"#.to_string()),
        Just("<!-- c -->".to_string()),
    ];
    leaf.prop_recursive(5, 48, 4, |inner| {
        (
            prop::sample::select(ELEMENTS),
            prop::option::of(prop::sample::select(ATTRIBUTES)),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(name, attribute, children)| {
                format!(
                    "<{}{}>{}</{}>",
                    name,
                    attribute.unwrap_or_default(),
                    children.concat(),
                    name
                )
            })
    })
}

/// Generate the content of a RichText document element
fn content_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(node_strategy(), 0..5).prop_map(|nodes| nodes.concat())
}

fn enabled_strictness() -> impl Strategy<Value = Strictness> {
    prop::sample::select(vec![Strictness::Strict, Strictness::Loose, Strictness::Legacy])
}

fn validator_strategy() -> impl Strategy<Value = ContentValidator> {
    prop_oneof![
        Just(ContentValidator::Any),
        Just(ContentValidator::Text),
        Just(ContentValidator::Uri),
        Just(ContentValidator::NameToken),
        Just(ContentValidator::Number),
        Just(ContentValidator::Length),
        Just(ContentValidator::enumeration(["ltr", "rtl"])),
    ]
}

fn value_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["[ -~]{0,8}", "[0-9]{1,4}%?", "-?[0-9]{1,4}", "ltr|rtl", "[a-z:._-]{1,6}"]
}

#[cfg(test)]
mod proptest_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn test_sanitation_conforms(content in content_strategy(), strictness in enabled_strictness()) {
            let schema = SchemaRegistry::richtext();
            let mut doc = richtext(&content);
            let (result, _) = sanitize(&schema, &mut doc, strictness);

            prop_assert!(result.is_ok(), "Failed to sanitize: {}", content);
            let found = violations(&schema, &doc);
            prop_assert!(found.is_empty(), "{:?} in {}", found, doc.to_xml());
        }

        #[test]
        fn test_sanitation_is_idempotent(content in content_strategy(), strictness in enabled_strictness()) {
            let schema = SchemaRegistry::richtext();
            let mut doc = richtext(&content);
            let (first, _) = sanitize(&schema, &mut doc, strictness);
            prop_assert!(first.is_ok());
            let once = doc.to_xml();

            let (second, listener) = sanitize(&schema, &mut doc, strictness);
            prop_assert!(second.is_ok());
            prop_assert!(listener.is_clean(), "{:?} after {}", listener.events(), once);
            prop_assert_eq!(doc.to_xml(), once);
        }

        #[test]
        fn test_none_never_changes_anything(content in content_strategy()) {
            let schema = SchemaRegistry::richtext();
            let mut doc = richtext(&content);
            let before = doc.to_xml();
            let (result, listener) = sanitize(&schema, &mut doc, Strictness::None);

            prop_assert!(result.is_ok());
            prop_assert!(listener.is_clean());
            prop_assert_eq!(listener.runs(), 0);
            prop_assert_eq!(doc.to_xml(), before);
        }

        #[test]
        fn test_validators_are_monotonic(validator in validator_strategy(), value in value_strategy()) {
            let levels = [Strictness::Strict, Strictness::Loose, Strictness::Legacy, Strictness::None];
            for pair in levels.windows(2) {
                if validator.is_valid(&value, pair[0]) {
                    prop_assert!(
                        validator.is_valid(&value, pair[1]),
                        "{:?} accepts {:?} under {} but not under {}",
                        validator, value, pair[0], pair[1]
                    );
                }
            }
        }
    }
}
