//! End-to-end resolution tests through `Bundle`

use ftl_core::runtime::{
    Arguments, Arity, Bundle, FunctionErrorCause, ResolverError, ResolverOptions, Value,
};
use ftl_core::syntax::parse;
use rayon::prelude::*;

fn bundle(source: &str) -> Bundle {
    bundle_with(source, ResolverOptions::default())
}

fn bundle_with(source: &str, options: ResolverOptions) -> Bundle {
    let resource = parse(source);
    assert!(!resource.has_junk(), "unexpected junk: {resource:?}");
    let mut bundle = Bundle::with_options("en-US".parse().unwrap(), options);
    bundle.add_resource(&resource).unwrap();
    bundle
}

const ITEMS: &str = "items = { $n ->\n    [one] One item\n   *[other] { $n } items\n}\n";

#[test]
fn test_greeting_with_and_without_arguments() {
    let bundle = bundle("greet = Hello, { $name }!\n");

    let args = Arguments::new().set("name", "Ana");
    assert_eq!(
        bundle.format_message("greet", Some(&args), None),
        ("Hello, Ana!".to_string(), vec![])
    );

    let (text, errors) = bundle.format_message("greet", Some(&Arguments::new()), None);
    assert_eq!(text, "Hello, {$name}!");
    assert_eq!(errors, vec![ResolverError::UnknownVariable { name: "name".into() }]);
}

#[test]
fn test_plural_selection() {
    let bundle = bundle(ITEMS);
    let format = |n: i64| {
        let args = Arguments::new().set("n", n);
        bundle.format_message("items", Some(&args), None)
    };
    assert_eq!(format(1), ("One item".to_string(), vec![]));
    assert_eq!(format(5), ("5 items".to_string(), vec![]));
    assert_eq!(format(0), ("0 items".to_string(), vec![]));
}

#[test]
fn test_exact_match_beats_plural_category() {
    let bundle = bundle(
        "msg = { 1 ->\n    [1] exactly one\n    [one] one-ish\n   *[other] other\n}\n",
    );
    assert_eq!(bundle.format_message("msg", None, None).0, "exactly one");
}

#[test]
fn test_string_selector() {
    let bundle = bundle(
        "pronoun = { $gender ->\n    [male] He\n    [female] She\n   *[other] They\n}\n",
    );
    let format = |gender: &str| {
        let args = Arguments::new().set("gender", gender);
        bundle.format_message("pronoun", Some(&args), None).0
    };
    assert_eq!(format("female"), "She");
    assert_eq!(format("unknown"), "They");
}

#[test]
fn test_missing_selector_variable_uses_default() {
    let bundle = bundle(ITEMS);
    let (text, errors) = bundle.format_message("items", None, None);
    assert_eq!(text, "{$n} items");
    assert_eq!(
        errors,
        vec![
            ResolverError::UnknownVariable { name: "n".into() },
            ResolverError::UnknownVariable { name: "n".into() },
        ]
    );
}

#[test]
fn test_self_reference_at_any_depth_limit() {
    for max_depth in [1, 2, 10, 100] {
        let bundle = bundle_with(
            "msg = { msg }\n",
            ResolverOptions {
                max_depth,
                use_isolating: false,
            },
        );
        let (text, errors) = bundle.format_message("msg", None, None);
        assert_eq!(text, "{msg}", "max_depth {max_depth}");
        assert!(
            errors
                .iter()
                .any(|error| matches!(error, ResolverError::Cyclic { .. })),
            "max_depth {max_depth}: {errors:?}"
        );
    }
}

#[test]
fn test_indirect_cycle_reports_chain() {
    let bundle = bundle("a = A { b }\nb = B { c }\nc = C { a }\n");
    let (text, errors) = bundle.format_message("a", None, None);
    assert_eq!(text, "A B C {a}");
    assert_eq!(
        errors,
        vec![ResolverError::Cyclic {
            key: "a".into(),
            chain: vec!["a".into(), "b".into(), "c".into(), "a".into()],
        }]
    );
}

#[test]
fn test_long_reference_chain_exceeds_depth() {
    let mut source = String::new();
    for idx in 0..149 {
        source.push_str(&format!("m{idx} = {{ m{} }}\n", idx + 1));
    }
    source.push_str("m149 = end\n");
    let bundle = bundle(&source);

    let (text, errors) = bundle.format_message("m0", None, None);
    assert_eq!(text, "{m100}");
    assert_eq!(
        errors,
        vec![ResolverError::DepthExceeded {
            key: "m100".into(),
            max_depth: 100,
        }]
    );

    let (text, errors) = bundle.format_message("m60", None, None);
    assert_eq!(text, "end");
    assert!(errors.is_empty());
}

#[test]
fn test_references_and_attributes() {
    let bundle = bundle(
        "-brand = Firefox\n    .gender = masculine\nlogin = Log in\n    .title = Sign in to { -brand }\nhelp = { login.title } now\nupdate = { -brand.gender ->\n    [masculine] { -brand } was updated\n   *[other] Updated\n}\n",
    );
    assert_eq!(bundle.format_message("help", None, None).0, "Sign in to Firefox now");
    assert_eq!(bundle.format_message("update", None, None).0, "Firefox was updated");
}

#[test]
fn test_unresolvable_references() {
    let bundle = bundle(
        "attrs-only =\n    .title = T\nmsg = { nope } { -gone } { attrs-only } { attrs-only.missing }\n",
    );
    let (text, errors) = bundle.format_message("msg", None, None);
    assert_eq!(text, "{nope} {-gone} {attrs-only} {attrs-only.missing}");
    assert_eq!(
        errors,
        vec![
            ResolverError::UnknownMessage { id: "nope".into() },
            ResolverError::UnknownTerm { id: "gone".into() },
            ResolverError::NoValue {
                id: "attrs-only".into()
            },
            ResolverError::UnknownAttribute {
                id: "attrs-only".into(),
                attribute: "missing".into()
            },
        ]
    );
}

#[test]
fn test_parameterized_terms() {
    let bundle = bundle(
        "-brand = { $case ->\n   *[nom] Firefox\n    [gen] Firefoxa\n}\nabout = O { -brand(case: \"gen\") }\nplain = { -brand }\n",
    );
    assert_eq!(bundle.format_message("about", None, None), ("O Firefoxa".to_string(), vec![]));

    // The caller's arguments do not leak into the term.
    let args = Arguments::new().set("case", "gen");
    let (text, errors) = bundle.format_message("plain", Some(&args), None);
    assert_eq!(text, "Firefox");
    assert_eq!(errors, vec![ResolverError::UnknownVariable { name: "case".into() }]);
}

#[test]
fn test_number_function() {
    let bundle = bundle(
        "fixed = { NUMBER($n, minimumFractionDigits: 2) }\nround = { NUMBER($n, maximumFractionDigits: 2) }\nplace = { NUMBER($pos, type: \"ordinal\") ->\n    [one] {$pos}st\n    [two] {$pos}nd\n    [few] {$pos}rd\n   *[other] {$pos}th\n}\n",
    );
    let args = Arguments::new().set("n", 3);
    assert_eq!(bundle.format_message("fixed", Some(&args), None).0, "3.00");
    let args = Arguments::new().set("n", 3.14159);
    assert_eq!(bundle.format_message("round", Some(&args), None).0, "3.14");

    let place = |pos: u32| {
        let args = Arguments::new().set("pos", pos);
        bundle.format_message("place", Some(&args), None).0
    };
    assert_eq!(place(1), "1st");
    assert_eq!(place(2), "2nd");
    assert_eq!(place(23), "23rd");
    assert_eq!(place(11), "11th");
}

#[test]
fn test_function_failures() {
    let bundle = bundle("unknown = a { NOPE($x) } b\narity = { NUMBER() }\n");
    let args = Arguments::new().set("x", 1);

    let (text, errors) = bundle.format_message("unknown", Some(&args), None);
    assert_eq!(text, "a {NOPE()} b");
    assert!(matches!(
        errors.as_slice(),
        [ResolverError::Function(error)] if error.cause == FunctionErrorCause::Unknown
    ));

    let (text, errors) = bundle.format_message("arity", None, None);
    assert_eq!(text, "{NUMBER()}");
    assert!(matches!(
        errors.as_slice(),
        [ResolverError::Function(error)] if matches!(error.cause, FunctionErrorCause::Arity { got: 0, .. })
    ));
}

#[test]
fn test_custom_functions() {
    let mut bundle = bundle("shout = { UPPER($text) }\nlocale = { LOCALE() }\n");
    bundle.add_function("UPPER", Arity::Exactly(1), |args, _| {
        Ok(Value::String(args[0].to_string().to_uppercase()))
    });
    bundle
        .functions_mut()
        .register_locale_aware("LOCALE", Arity::Exactly(0), |args, _| {
            Ok(args.last().cloned().unwrap_or_default())
        });

    let args = Arguments::new().set("text", "hey");
    assert_eq!(bundle.format_message("shout", Some(&args), None).0, "HEY");
    assert_eq!(bundle.format_message("locale", None, None).0, "en-US");
}

#[test]
fn test_bidi_isolation() {
    let mut bundle = bundle("greet = Hello, { $name }!\nonly = { $name }\n");
    bundle.set_use_isolating(true);
    let args = Arguments::new().set("name", "Ana");
    assert_eq!(
        bundle.format_message("greet", Some(&args), None).0,
        "Hello, \u{2068}Ana\u{2069}!"
    );
    assert_eq!(bundle.format_message("only", Some(&args), None).0, "Ana");
}

#[test]
fn test_absent_value_displays_empty() {
    let bundle = bundle("v = [{ $x }]\n");
    let args = Arguments::new().set("x", None::<&str>);
    assert_eq!(bundle.format_message("v", Some(&args), None), ("[]".to_string(), vec![]));
}

#[test]
fn test_unused_arguments_do_not_change_output() {
    let bundle = bundle(ITEMS);
    let base = Arguments::new().set("n", 3);
    let extended = base.clone().set("unused", "x").set("other", 42);
    assert_eq!(
        bundle.format_message("items", Some(&base), None),
        bundle.format_message("items", Some(&extended), None)
    );
}

#[test]
fn test_concurrent_formatting() {
    let bundle = bundle(&format!("{ITEMS}greet = Hello, {{ $name }}!\n"));

    let results: Vec<String> = (0..1_000i64)
        .into_par_iter()
        .map(|n| {
            let args = Arguments::new().set("n", n).set("name", format!("user{n}"));
            let (items, errors) = bundle.format_message("items", Some(&args), None);
            assert!(errors.is_empty());
            let (greet, _) = bundle.format_message("greet", Some(&args), None);
            format!("{items}|{greet}")
        })
        .collect();

    for (n, result) in results.iter().enumerate() {
        let items = if n == 1 { "One item".to_string() } else { format!("{n} items") };
        assert_eq!(result, &format!("{items}|Hello, user{n}!"));
    }
}
