//! Phpot - gettext string extractor for PHP source code.
//!
//! Phpot scans PHP source text for calls to the gettext family of translation
//! functions (`gettext`/`__`, `ngettext`, `pgettext`, `dgettext`, ... and
//! their no-op marker variants), decodes the string-literal arguments into
//! their runtime values, and pushes the results into one or more translation
//! catalog sinks.
//!
//! The crate is one extractor inside a larger extraction toolchain: file
//! discovery, catalog write-back and the command-line surface live with the
//! caller. Phpot takes already-resolved paths or source text plus an
//! [`config::ExtractorConfig`] and produces [`catalog::TranslationEntry`]
//! values.
//!
//! ## Module Structure
//!
//! - `catalog`: Translation entries, the catalog sink boundary, and an
//!   in-memory catalog with reference merging
//! - `config`: Configuration value, defaults, and `.phpotrc.json` loading
//! - `extract`: The extraction pipeline (lexer, call scanner, literal
//!   decoder, call interpreter, entry points)

pub mod catalog;
pub mod config;
pub mod extract;
