//! Call-site scanner.
//!
//! [`CallScanner`] walks the token stream once and yields a
//! [`RawCallMatch`] for every call to a configured function name. Matching
//! is on the trailing identifier, so `\__(...)`, `Ns\__(...)`,
//! `Cls::__(...)` and `$t->__(...)` all trigger.
//!
//! Open calls form a stack: a recognized call appearing inside another's
//! argument list produces its own match (and completes, and is emitted,
//! first) while counting as a non-literal argument of the enclosing call.
//! Commas split arguments only at the call's own nesting depth, so a comma
//! inside a nested call or array literal never splits an argument.
//!
//! A capture left open at end of input - unterminated literal, unbalanced
//! parentheses - is abandoned silently; the pass itself never aborts.

use std::collections::VecDeque;
use std::iter::Peekable;

use crate::config::{CommentMode, ExtractorConfig};
use crate::extract::lexer::{Lexer, StrKind, Token, TokenKind};

/// One argument position of a recognized call.
///
/// Only string-literal tokens are statically meaningful. Bare identifiers
/// are kept by name so the interpreter can accept configured domain
/// constants; everything else is opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawArg {
    /// A constant string literal, raw token text including quotes.
    Literal(String),
    /// A lone identifier (constant reference, keyword, ...).
    Ident(String),
    /// Any other expression: variable, concatenation, nested call, ...
    Other,
}

/// One recognized call site, as captured during the scan pass.
///
/// Created and consumed within a single pass; the interpreter turns it into
/// a catalog entry or drops it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCallMatch {
    /// The matched function name (the trailing identifier).
    pub name: String,
    /// 1-based line of the call site.
    pub line: usize,
    /// Top-level arguments, in call order.
    pub args: Vec<RawArg>,
    /// The nearest preceding comment block, when comment capture is on and
    /// the block touches the call's line.
    pub comment: Option<String>,
}

/// Accumulates classification for one argument position.
///
/// Keeps the first part verbatim; any second part demotes the whole
/// argument to [`RawArg::Other`] - a multi-token argument (concatenation,
/// arithmetic, nested call) can never be a plain literal.
#[derive(Default)]
struct ArgBuilder {
    parts: usize,
    first: Option<RawArg>,
}

impl ArgBuilder {
    fn note(&mut self, make: impl FnOnce() -> RawArg) {
        if self.parts == 0 {
            self.first = Some(make());
        }
        self.parts += 1;
    }

    fn take(&mut self) -> Option<RawArg> {
        let arg = match self.parts {
            0 => None,
            1 => self.first.take(),
            _ => Some(RawArg::Other),
        };
        self.parts = 0;
        self.first = None;
        arg
    }
}

struct OpenCall<'a> {
    name: &'a str,
    line: usize,
    comment: Option<String>,
    args: Vec<RawArg>,
    current: ArgBuilder,
    /// Bracket depth inside this call's argument list; commas split
    /// arguments only at depth zero.
    depth: usize,
}

struct CommentBlock {
    text: String,
    last_line: usize,
}

/// Lazy scanner over one source text. Re-invoke on the same text to restart.
pub struct CallScanner<'a> {
    tokens: Peekable<Lexer<'a>>,
    config: &'a ExtractorConfig,
    stack: Vec<OpenCall<'a>>,
    ready: VecDeque<RawCallMatch>,
    last_comment: Option<CommentBlock>,
}

impl<'a> CallScanner<'a> {
    pub fn new(source: &'a str, config: &'a ExtractorConfig) -> Self {
        Self {
            tokens: Lexer::new(source).peekable(),
            config,
            stack: Vec::new(),
            ready: VecDeque::new(),
            last_comment: None,
        }
    }

    fn process(&mut self, token: Token<'a>) {
        match token.kind {
            TokenKind::Ident(name) => {
                let opens_call = self.config.functions.contains_key(name)
                    && matches!(
                        self.tokens.peek(),
                        Some(Token {
                            kind: TokenKind::OpenParen,
                            ..
                        })
                    );
                if opens_call {
                    self.tokens.next();
                    // the nested call is a non-literal argument of its parent
                    if let Some(parent) = self.stack.last_mut() {
                        parent.current.note(|| RawArg::Other);
                    }
                    let comment = self.comment_for_call(token.line);
                    self.stack.push(OpenCall {
                        name,
                        line: token.line,
                        comment,
                        args: Vec::new(),
                        current: ArgBuilder::default(),
                        depth: 0,
                    });
                } else if let Some(call) = self.stack.last_mut() {
                    call.current.note(|| RawArg::Ident(name.to_string()));
                }
            }
            TokenKind::Str { raw, kind } => {
                if let Some(call) = self.stack.last_mut() {
                    match kind {
                        StrKind::Constant => call.current.note(|| RawArg::Literal(raw.to_string())),
                        StrKind::Interpolated => call.current.note(|| RawArg::Other),
                    }
                }
            }
            TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::OpenBrace => {
                if let Some(call) = self.stack.last_mut() {
                    call.depth += 1;
                    call.current.note(|| RawArg::Other);
                }
            }
            TokenKind::CloseBracket | TokenKind::CloseBrace => {
                if let Some(call) = self.stack.last_mut() {
                    call.depth = call.depth.saturating_sub(1);
                    call.current.note(|| RawArg::Other);
                }
            }
            TokenKind::CloseParen => match self.stack.last_mut() {
                Some(call) if call.depth == 0 => {
                    let mut call = self.stack.pop().expect("non-empty stack");
                    if let Some(arg) = call.current.take() {
                        call.args.push(arg);
                    }
                    self.ready.push_back(RawCallMatch {
                        name: call.name.to_string(),
                        line: call.line,
                        args: call.args,
                        comment: call.comment,
                    });
                }
                Some(call) => {
                    call.depth -= 1;
                    call.current.note(|| RawArg::Other);
                }
                None => {}
            },
            TokenKind::Comma => match self.stack.last_mut() {
                Some(call) if call.depth == 0 => {
                    if let Some(arg) = call.current.take() {
                        call.args.push(arg);
                    }
                }
                Some(call) => call.current.note(|| RawArg::Other),
                None => {}
            },
            TokenKind::Comment { raw, last_line } => {
                self.record_comment(raw, token.line, last_line);
            }
            TokenKind::Other => {
                if let Some(call) = self.stack.last_mut() {
                    call.current.note(|| RawArg::Other);
                }
            }
        }
    }

    /// Fold a comment into the running block. Comments on adjacent lines
    /// merge; a gap (blank line or code line) starts a fresh block.
    fn record_comment(&mut self, raw: &str, first_line: usize, last_line: usize) {
        if self.config.extract_comments == CommentMode::Off {
            return;
        }
        let text = normalize_comment(raw);
        match &mut self.last_comment {
            Some(block) if block.last_line + 1 >= first_line => {
                if !block.text.is_empty() && !text.is_empty() {
                    block.text.push('\n');
                }
                block.text.push_str(&text);
                block.last_line = last_line;
            }
            _ => {
                self.last_comment = Some(CommentBlock { text, last_line });
            }
        }
    }

    /// The comment to attach to a call starting on `line`, if any.
    ///
    /// A block attaches only when it touches the call: its last line is the
    /// call's line or the line directly above. Blank or code lines in
    /// between leave the call uncommented.
    fn comment_for_call(&self, line: usize) -> Option<String> {
        let block = self.last_comment.as_ref()?;
        if block.last_line + 1 < line {
            return None;
        }
        match &self.config.extract_comments {
            CommentMode::Off => None,
            CommentMode::All => Some(block.text.clone()),
            CommentMode::Prefix(prefix) => {
                if block.text.starts_with(prefix.as_str()) {
                    Some(block.text.clone())
                } else {
                    None
                }
            }
        }
    }
}

impl Iterator for CallScanner<'_> {
    type Item = RawCallMatch;

    fn next(&mut self) -> Option<RawCallMatch> {
        loop {
            if let Some(found) = self.ready.pop_front() {
                return Some(found);
            }
            // end of input: captures still open are abandoned silently
            let token = self.tokens.next()?;
            self.process(token);
        }
    }
}

/// Strip comment delimiters and decoration, keeping the text.
fn normalize_comment(raw: &str) -> String {
    if let Some(body) = raw.strip_prefix("/*") {
        let body = body.strip_suffix("*/").unwrap_or(body);
        let text: Vec<&str> = body
            .lines()
            .map(|l| l.trim().trim_start_matches('*').trim())
            .collect();
        text.join("\n").trim().to_string()
    } else if let Some(body) = raw.strip_prefix("//") {
        body.trim().to_string()
    } else {
        raw.trim_start_matches('#').trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{CommentMode, ExtractorConfig};
    use crate::extract::scanner::*;

    fn scan_all(source: &str, config: &ExtractorConfig) -> Vec<RawCallMatch> {
        CallScanner::new(source, config).collect()
    }

    fn scan_default(source: &str) -> Vec<RawCallMatch> {
        scan_all(source, &ExtractorConfig::default())
    }

    #[test]
    fn test_simple_match() {
        let found = scan_default("<?php gettext('Hello');");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "gettext");
        assert_eq!(found[0].line, 1);
        assert_eq!(found[0].args, vec![RawArg::Literal("'Hello'".to_string())]);
        assert_eq!(found[0].comment, None);
    }

    #[test]
    fn test_unconfigured_name_never_matches() {
        let found = scan_default("<?php translate('Hello'); t('x');");
        assert!(found.is_empty());
    }

    #[test]
    fn test_identifier_without_paren_is_not_a_call() {
        let found = scan_default("<?php $fn = 'gettext'; gettext;");
        assert!(found.is_empty());
    }

    #[test]
    fn test_multiple_args_split_on_commas() {
        let found = scan_default("<?php ngettext('one', 'many', $n);");
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].args,
            vec![
                RawArg::Literal("'one'".to_string()),
                RawArg::Literal("'many'".to_string()),
                RawArg::Other,
            ]
        );
    }

    #[test]
    fn test_comma_inside_array_does_not_split() {
        let found = scan_default("<?php __('msg', ['a' => 1, 'b' => 2]);");
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].args,
            vec![RawArg::Literal("'msg'".to_string()), RawArg::Other]
        );
    }

    #[test]
    fn test_comma_inside_nested_call_does_not_split() {
        let found = scan_default("<?php __('msg', sprintf('%s-%s', $a, $b));");
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].args,
            vec![RawArg::Literal("'msg'".to_string()), RawArg::Other]
        );
    }

    #[test]
    fn test_nested_recognized_calls_both_match() {
        let found = scan_default("<?php __('outer', __('inner'));");
        assert_eq!(found.len(), 2);
        // inner completes first
        assert_eq!(found[0].args, vec![RawArg::Literal("'inner'".to_string())]);
        assert_eq!(
            found[1].args,
            vec![RawArg::Literal("'outer'".to_string()), RawArg::Other]
        );
    }

    #[test]
    fn test_concatenation_is_one_opaque_argument() {
        let found = scan_default("<?php __('a' . 'b');");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].args, vec![RawArg::Other]);
    }

    #[test]
    fn test_interpolated_argument_is_opaque() {
        let found = scan_default(r#"<?php __("hello $name");"#);
        assert_eq!(found[0].args, vec![RawArg::Other]);
    }

    #[test]
    fn test_heredoc_argument_is_opaque() {
        let found = scan_default("<?php __(<<<EOT\ntext\nEOT);");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].args, vec![RawArg::Other]);
    }

    #[test]
    fn test_bare_identifier_argument_kept_by_name() {
        let found = scan_default("<?php dgettext(APP_DOMAIN, 'msg');");
        assert_eq!(
            found[0].args,
            vec![
                RawArg::Ident("APP_DOMAIN".to_string()),
                RawArg::Literal("'msg'".to_string()),
            ]
        );
    }

    #[test]
    fn test_qualified_names_match_on_trailing_identifier() {
        let found = scan_default(
            "<?php \\gettext('a'); I18n\\gettext('b'); Po::gettext('c'); $t->gettext('d');",
        );
        assert_eq!(found.len(), 4);
        for m in &found {
            assert_eq!(m.name, "gettext");
        }
    }

    #[test]
    fn test_multiline_call_keeps_start_line() {
        let found = scan_default("<?php\n__(\n    'spread',\n    $n\n);");
        assert_eq!(found[0].line, 2);
    }

    #[test]
    fn test_calls_in_html_are_not_matched() {
        let found = scan_default("gettext('html'); <?php gettext('php'); ?> gettext('again');");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].args, vec![RawArg::Literal("'php'".to_string())]);
    }

    #[test]
    fn test_unbalanced_call_at_eof_abandoned() {
        let found = scan_default("<?php __('closed'); __('open'");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].args, vec![RawArg::Literal("'closed'".to_string())]);
    }

    #[test]
    fn test_unterminated_literal_abandons_call() {
        let found = scan_default("<?php __('closed'); __('never ends");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_empty_argument_list() {
        let found = scan_default("<?php gettext();");
        assert_eq!(found.len(), 1);
        assert!(found[0].args.is_empty());
    }

    #[test]
    fn test_trailing_comma() {
        let found = scan_default("<?php __('a',);");
        assert_eq!(found[0].args, vec![RawArg::Literal("'a'".to_string())]);
    }

    fn config_all_comments() -> ExtractorConfig {
        ExtractorConfig {
            extract_comments: CommentMode::All,
            ..ExtractorConfig::default()
        }
    }

    #[test]
    fn test_comment_off_by_default() {
        let found = scan_default("<?php // note\n__('x');");
        assert_eq!(found[0].comment, None);
    }

    #[test]
    fn test_comment_attached_when_adjacent() {
        let config = config_all_comments();
        let found = scan_all("<?php\n// greeting shown at login\n__('Welcome');", &config);
        assert_eq!(
            found[0].comment.as_deref(),
            Some("greeting shown at login")
        );
    }

    #[test]
    fn test_block_comment_attached_and_normalized() {
        let config = config_all_comments();
        let found = scan_all(
            "<?php\n/*\n * line one\n * line two\n */\n__('x');",
            &config,
        );
        assert_eq!(found[0].comment.as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn test_comment_same_line_attached() {
        let config = config_all_comments();
        let found = scan_all("<?php /* inline */ __('x');", &config);
        assert_eq!(found[0].comment.as_deref(), Some("inline"));
    }

    #[test]
    fn test_comment_separated_by_blank_line_not_attached() {
        let config = config_all_comments();
        let found = scan_all("<?php\n// far away\n\n__('x');", &config);
        assert_eq!(found[0].comment, None);
    }

    #[test]
    fn test_comment_separated_by_statement_not_attached() {
        let config = config_all_comments();
        let found = scan_all("<?php\n// about something else\n$x = 1;\n__('x');", &config);
        assert_eq!(found[0].comment, None);
    }

    #[test]
    fn test_consecutive_comments_merge_into_block() {
        let config = config_all_comments();
        let found = scan_all("<?php\n// first\n// second\n__('x');", &config);
        assert_eq!(found[0].comment.as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn test_prefix_mode_requires_marker() {
        let config = ExtractorConfig {
            extract_comments: CommentMode::Prefix("translators:".to_string()),
            ..ExtractorConfig::default()
        };
        let found = scan_all(
            "<?php\n// translators: greeting\n__('a');\n// plain note\n__('b');",
            &config,
        );
        assert_eq!(found[0].comment.as_deref(), Some("translators: greeting"));
        assert_eq!(found[1].comment, None);
    }

    #[test]
    fn test_prefix_mode_ignores_comment_past_statement() {
        let config = ExtractorConfig {
            extract_comments: CommentMode::Prefix("translators:".to_string()),
            ..ExtractorConfig::default()
        };
        let found = scan_all(
            "<?php\n// translators: not for this one\n$x = 1;\n__('a');",
            &config,
        );
        assert_eq!(found[0].comment, None);
    }

    #[test]
    fn test_empty_prefix_behaves_like_all() {
        let config = ExtractorConfig {
            extract_comments: CommentMode::Prefix(String::new()),
            ..ExtractorConfig::default()
        };
        let found = scan_all("<?php\n// anything\n__('x');", &config);
        assert_eq!(found[0].comment.as_deref(), Some("anything"));
    }

    #[test]
    fn test_normalize_comment_forms() {
        assert_eq!(normalize_comment("// text"), "text");
        assert_eq!(normalize_comment("# text"), "text");
        assert_eq!(normalize_comment("/* text */"), "text");
        assert_eq!(normalize_comment("/** doc */"), "doc");
        assert_eq!(normalize_comment("/*\n * a\n * b\n */"), "a\nb");
    }
}
