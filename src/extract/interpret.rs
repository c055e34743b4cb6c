//! Maps recognized calls onto structured translation entries.
//!
//! The interpreter is where a scanned call either becomes a
//! [`TranslationEntry`] or dies: arity shortfalls, non-literal values in
//! required positions, and empty singular text all drop the call whole.
//! Nothing is ever guessed at or partially emitted.

use crate::catalog::{SourceRef, TranslationEntry};
use crate::config::ExtractorConfig;
use crate::extract::literal::decode;
use crate::extract::scanner::{RawArg, RawCallMatch};

/// Interpret one recognized call. `None` means the call is skipped.
///
/// Positions named by the role's layout must hold string literals, with one
/// exception: the domain position also accepts a bare identifier listed in
/// `domain_constants`, whose name passes through verbatim for the
/// surrounding tool to resolve. Arguments beyond the layout (the count
/// argument of plural forms, for instance) are ignored.
pub fn interpret(
    found: &RawCallMatch,
    config: &ExtractorConfig,
    file: &str,
) -> Option<TranslationEntry> {
    let role = *config.functions.get(&found.name)?;
    if found.args.len() < role.required_args() {
        return None;
    }
    let layout = role.layout();

    let domain = match layout.domain {
        Some(pos) => Some(domain_text(&found.args[pos], config)?),
        None => None,
    };
    let context = match layout.context {
        Some(pos) => Some(literal_text(&found.args[pos])?),
        None => None,
    };
    let singular = literal_text(&found.args[layout.singular])?;
    if singular.is_empty() {
        return None;
    }
    let plural = match layout.plural {
        Some(pos) => Some(literal_text(&found.args[pos])?),
        None => None,
    };

    Some(TranslationEntry {
        domain,
        context,
        singular,
        plural,
        reference: SourceRef::new(file, found.line),
        comment: found.comment.clone(),
    })
}

fn literal_text(arg: &RawArg) -> Option<String> {
    match arg {
        RawArg::Literal(raw) => Some(decode(raw)),
        _ => None,
    }
}

fn domain_text(arg: &RawArg, config: &ExtractorConfig) -> Option<String> {
    match arg {
        RawArg::Literal(raw) => Some(decode(raw)),
        RawArg::Ident(name) if config.domain_constants.contains(name) => Some(name.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ExtractorConfig;
    use crate::extract::interpret::*;

    fn call(name: &str, args: Vec<RawArg>) -> RawCallMatch {
        RawCallMatch {
            name: name.to_string(),
            line: 7,
            args,
            comment: None,
        }
    }

    fn lit(raw: &str) -> RawArg {
        RawArg::Literal(raw.to_string())
    }

    #[test]
    fn test_simple_role() {
        let config = ExtractorConfig::default();
        let entry = interpret(&call("gettext", vec![lit("'Hello'")]), &config, "a.php").unwrap();
        assert_eq!(entry.singular, "Hello");
        assert_eq!(entry.domain, None);
        assert_eq!(entry.context, None);
        assert_eq!(entry.plural, None);
        assert_eq!(entry.reference, SourceRef::new("a.php", 7));
    }

    #[test]
    fn test_marker_role_extracts_like_simple() {
        let config = ExtractorConfig::default();
        let entry = interpret(&call("noop__", vec![lit("'Marked'")]), &config, "a.php").unwrap();
        assert_eq!(entry.singular, "Marked");
        assert_eq!(entry.plural, None);
    }

    #[test]
    fn test_full_layout_with_surplus_argument() {
        let config = ExtractorConfig::default();
        let entry = interpret(
            &call(
                "dnpgettext",
                vec![
                    lit("'app'"),
                    lit("'ctx'"),
                    lit("'one item'"),
                    lit("'%d items'"),
                    RawArg::Other, // $n - outside the layout, ignored
                ],
            ),
            &config,
            "a.php",
        )
        .unwrap();
        assert_eq!(entry.domain.as_deref(), Some("app"));
        assert_eq!(entry.context.as_deref(), Some("ctx"));
        assert_eq!(entry.singular, "one item");
        assert_eq!(entry.plural.as_deref(), Some("%d items"));
    }

    #[test]
    fn test_non_literal_required_position_rejected() {
        let config = ExtractorConfig::default();
        // ngettext needs positions 0 and 1 both literal
        let rejected = interpret(
            &call("ngettext", vec![RawArg::Other, lit("'two'")]),
            &config,
            "a.php",
        );
        assert!(rejected.is_none());

        let rejected = interpret(
            &call("ngettext", vec![lit("'one'"), RawArg::Other]),
            &config,
            "a.php",
        );
        assert!(rejected.is_none());
    }

    #[test]
    fn test_too_few_arguments_rejected() {
        let config = ExtractorConfig::default();
        assert!(interpret(&call("ngettext", vec![lit("'one'")]), &config, "a.php").is_none());
        assert!(interpret(&call("gettext", vec![]), &config, "a.php").is_none());
    }

    #[test]
    fn test_empty_singular_rejected() {
        let config = ExtractorConfig::default();
        assert!(interpret(&call("gettext", vec![lit("''")]), &config, "a.php").is_none());
    }

    #[test]
    fn test_unknown_function_rejected() {
        let config = ExtractorConfig::default();
        assert!(interpret(&call("translate", vec![lit("'x'")]), &config, "a.php").is_none());
    }

    #[test]
    fn test_domain_constant_passes_through() {
        let mut config = ExtractorConfig::default();
        config.domain_constants.insert("APP_DOMAIN".to_string());

        let entry = interpret(
            &call(
                "dgettext",
                vec![RawArg::Ident("APP_DOMAIN".to_string()), lit("'msg'")],
            ),
            &config,
            "a.php",
        )
        .unwrap();
        assert_eq!(entry.domain.as_deref(), Some("APP_DOMAIN"));
        assert_eq!(entry.singular, "msg");
    }

    #[test]
    fn test_unconfigured_constant_rejected() {
        let config = ExtractorConfig::default();
        let rejected = interpret(
            &call(
                "dgettext",
                vec![RawArg::Ident("APP_DOMAIN".to_string()), lit("'msg'")],
            ),
            &config,
            "a.php",
        );
        assert!(rejected.is_none());
    }

    #[test]
    fn test_constant_outside_domain_position_rejected() {
        let mut config = ExtractorConfig::default();
        config.domain_constants.insert("MSG".to_string());

        let rejected = interpret(
            &call("gettext", vec![RawArg::Ident("MSG".to_string())]),
            &config,
            "a.php",
        );
        assert!(rejected.is_none());
    }

    #[test]
    fn test_arguments_are_decoded() {
        let config = ExtractorConfig::default();
        let entry = interpret(
            &call("gettext", vec![lit(r#""line1\nline2""#)]),
            &config,
            "a.php",
        )
        .unwrap();
        assert_eq!(entry.singular, "line1\nline2");
    }

    #[test]
    fn test_comment_carried_into_entry() {
        let config = ExtractorConfig::default();
        let mut c = call("gettext", vec![lit("'x'")]);
        c.comment = Some("translators: note".to_string());
        let entry = interpret(&c, &config, "a.php").unwrap();
        assert_eq!(entry.comment.as_deref(), Some("translators: note"));
    }
}
