//! Property tests: parser totality, round-trip convergence and argument
//! monotonicity

use ftl_core::runtime::{Arguments, Bundle};
use ftl_core::syntax::{
    Entry, Expression, InlineExpression, Message, Pattern, PatternElement, Resource, parse,
    serialize,
};
use proptest::prelude::*;

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,8}"
}

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z ,.!?']{0,15}"
}

fn string_literal() -> impl Strategy<Value = String> {
    "[a-z{}\"\\\\ ]{0,6}".prop_map(|value| {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("{{ \"{escaped}\" }}")
    })
}

fn number_literal() -> impl Strategy<Value = String> {
    "-?[0-9]{1,3}(\\.[0-9]{1,2})?".prop_map(|number| format!("{{ {number} }}"))
}

fn select() -> impl Strategy<Value = String> {
    (
        identifier(),
        prop::collection::vec(("[a-z]{1,5}", text()), 1..4),
        any::<prop::sample::Index>(),
    )
        .prop_map(|(selector, variants, default)| {
            let default = default.index(variants.len());
            let mut out = format!("{{ ${selector} ->\n");
            for (idx, (key, value)) in variants.iter().enumerate() {
                let marker = if idx == default { "   *" } else { "    " };
                out.push_str(&format!("{marker}[{key}] {value}\n"));
            }
            out.push('}');
            out
        })
}

fn element() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => text(),
        2 => identifier().prop_map(|name| format!("{{ ${name} }}")),
        1 => string_literal(),
        1 => number_literal(),
        1 => text().prop_map(|line| format!("\n    {line}")),
        1 => (" {1,4}", text()).prop_map(|(extra, line)| format!("\n\n    {extra}{line}")),
        1 => select(),
    ]
}

/// One line of raw text, possibly indented, possibly starting with a
/// character that is special at the start of a line.
fn raw_line() -> impl Strategy<Value = String> {
    (" {0,4}", "[a-z{}.*\\[][a-z {}.*\\[]{0,8}[a-z]")
        .prop_map(|(lead, body)| format!("{lead}{body}"))
}

/// Multiline text as built in code: blank lines and indented lines in any
/// order between a first and a last line with content.
fn raw_text() -> impl Strategy<Value = String> {
    (
        raw_line(),
        prop::collection::vec(prop_oneof![Just(String::new()), raw_line()], 0..4),
        prop::option::of(raw_line()),
    )
        .prop_map(|(first, middle, last)| {
            let mut lines = vec![first];
            if let Some(last) = last {
                lines.extend(middle);
                lines.push(last);
            }
            lines.join("\n")
        })
}

fn flatten(pattern: &Pattern) -> Option<String> {
    pattern
        .elements
        .iter()
        .map(|element| match element {
            PatternElement::TextElement { value } => Some(value.clone()),
            PatternElement::Placeable {
                expression: Expression::Inline(InlineExpression::StringLiteral { value }),
            } => Some(value.clone()),
            _ => None,
        })
        .collect()
}

fn pattern() -> impl Strategy<Value = String> {
    (
        prop_oneof![text(), identifier().prop_map(|name| format!("{{ ${name} }}"))],
        prop::collection::vec(element(), 0..5),
    )
        .prop_map(|(first, rest)| {
            let mut out = first;
            for element in rest {
                // Keep adjacent placeables and text apart.
                out.push(' ');
                out.push_str(&element);
            }
            out
        })
}

fn entry() -> impl Strategy<Value = String> {
    (
        prop::option::of("[a-zA-Z ]{0,20}"),
        any::<bool>(),
        identifier(),
        pattern(),
        prop::option::of((identifier(), pattern())),
    )
        .prop_map(|(comment, is_term, id, value, attribute)| {
            let mut out = String::new();
            if let Some(comment) = comment {
                out.push_str(&format!("# {comment}\n"));
            }
            let sigil = if is_term { "-" } else { "" };
            out.push_str(&format!("{sigil}{id} = {value}\n"));
            if let Some((name, value)) = attribute {
                out.push_str(&format!("    .{name} = {value}\n"));
            }
            out
        })
}

fn resource() -> impl Strategy<Value = String> {
    prop::collection::vec(entry(), 1..6).prop_map(|entries| entries.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn parse_never_panics(source in any::<String>()) {
        let _ = parse(&source);
    }

    #[test]
    fn parse_never_panics_on_ftl_like_input(source in "[a-z{}$\\-\\[\\]*.=# \n\"\\\\(),:0-9]{0,200}") {
        let resource = parse(&source);
        let mut bundle = Bundle::new("en".parse().unwrap());
        let _ = bundle.add_resource(&resource);
        for message in resource.messages() {
            let _ = bundle.format_message(&message.id.name, None, None);
        }
    }

    #[test]
    fn generated_resources_parse_cleanly(source in resource()) {
        let resource = parse(&source);
        prop_assert!(!resource.has_junk(), "junk in {:?}: {:?}", source, resource);
    }

    #[test]
    fn serialization_converges(source in resource()) {
        let resource = parse(&source);
        let first = serialize(&resource).unwrap();
        let reparsed = parse(&first);
        prop_assert_eq!(&reparsed, &resource, "serialized as {:?}", first);
        let second = serialize(&reparsed).unwrap();
        prop_assert_eq!(second, first);
    }

    #[test]
    fn text_survives_serialization(text in raw_text()) {
        let resource = Resource::new(vec![Entry::Message(Message::new("key", Some(Pattern::text(text.clone()))))]);
        let output = serialize(&resource).unwrap();
        let reparsed = parse(&output);
        prop_assert!(!reparsed.has_junk(), "junk in {:?}", output);
        let value = reparsed.get_message("key").and_then(|message| message.value.as_ref());
        prop_assert_eq!(value.and_then(flatten), Some(text), "serialized as {:?}", output);
    }

    #[test]
    fn unused_arguments_never_change_output(
        n in -1_000i64..1_000,
        extra in prop::collection::hash_map("[a-z]{1,8}", any::<i32>(), 0..5),
    ) {
        let mut bundle = Bundle::new("en-US".parse().unwrap());
        bundle
            .add_resource(&parse("items = { $n ->\n    [one] One item\n   *[other] { $n } items\n}\n"))
            .unwrap();

        let base = Arguments::new().set("n", n);
        let mut extended = base.clone();
        for (key, value) in extra {
            if key != "n" {
                extended.insert(key, value);
            }
        }
        prop_assert_eq!(
            bundle.format_message("items", Some(&base), None),
            bundle.format_message("items", Some(&extended), None)
        );
    }
}
