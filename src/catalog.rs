//! Translation entries and catalog sinks.
//!
//! The extraction pipeline produces [`TranslationEntry`] values and hands
//! them to caller-supplied [`CatalogSink`]s. The sink owns the merge policy;
//! the bundled in-memory [`Catalog`] merges entries sharing the same
//! (domain, context, singular) key by accumulating references and comments,
//! which is what a PO-style template expects.

use std::collections::HashMap;
use std::fmt;

/// A source-code position a translation string was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceRef {
    /// Path of the scanned file, as supplied by the caller.
    pub file: String,
    /// Line number (1-indexed) of the call site.
    pub line: usize,
}

impl SourceRef {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One decoded translation string, as produced by the call interpreter.
///
/// `singular` is never empty on an emitted entry. Ownership transfers to
/// the catalog sink on [`CatalogSink::add`]; the extraction core holds no
/// entry after emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationEntry {
    /// Catalog domain (`dgettext` family), if the call names one.
    pub domain: Option<String>,
    /// Disambiguating context (`pgettext` family), if the call names one.
    pub context: Option<String>,
    /// The singular source string. Never empty.
    pub singular: String,
    /// The plural source string (`ngettext` family), if the call names one.
    pub plural: Option<String>,
    /// Where the call was found.
    pub reference: SourceRef,
    /// Extracted comment preceding the call, when comment capture is on.
    pub comment: Option<String>,
}

/// Destination for extracted entries.
///
/// Merge and deduplication policy across entries with an identical
/// singular+context+domain is the sink's responsibility, not the
/// extractor's. Implementations must accept entries in any order.
pub trait CatalogSink {
    fn add(&mut self, entry: TranslationEntry);
}

/// Plain collection sink: keeps every entry, no merging.
impl CatalogSink for Vec<TranslationEntry> {
    fn add(&mut self, entry: TranslationEntry) {
        self.push(entry);
    }
}

/// A merged entry held by [`Catalog`].
///
/// Multiple occurrences of the same string collapse into one entry carrying
/// every source reference and every distinct extracted comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub domain: Option<String>,
    pub context: Option<String>,
    pub singular: String,
    /// First plural seen wins; later occurrences without one leave it set.
    pub plural: Option<String>,
    pub references: Vec<SourceRef>,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EntryKey {
    domain: Option<String>,
    context: Option<String>,
    singular: String,
}

/// In-memory translation catalog with reference merging.
///
/// Entries keep insertion order, so output is stable across runs scanning
/// the same input in the same order.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<EntryKey, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All merged entries, in first-seen order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Look up a merged entry by its identity key.
    pub fn get(
        &self,
        domain: Option<&str>,
        context: Option<&str>,
        singular: &str,
    ) -> Option<&CatalogEntry> {
        let key = EntryKey {
            domain: domain.map(str::to_string),
            context: context.map(str::to_string),
            singular: singular.to_string(),
        };
        self.index.get(&key).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Absorb every entry of another catalog into this one.
    pub fn merge(&mut self, other: Catalog) {
        for entry in other.entries {
            let plural = entry.plural;
            let mut references = entry.references.into_iter();
            let mut comments = entry.comments.into_iter();
            let first_ref = match references.next() {
                Some(r) => r,
                None => continue,
            };
            self.add(TranslationEntry {
                domain: entry.domain.clone(),
                context: entry.context.clone(),
                singular: entry.singular.clone(),
                plural,
                reference: first_ref,
                comment: comments.next(),
            });
            let key = EntryKey {
                domain: entry.domain,
                context: entry.context,
                singular: entry.singular,
            };
            let idx = self.index[&key];
            let merged = &mut self.entries[idx];
            for r in references {
                if !merged.references.contains(&r) {
                    merged.references.push(r);
                }
            }
            for c in comments {
                if !merged.comments.contains(&c) {
                    merged.comments.push(c);
                }
            }
        }
    }
}

impl CatalogSink for Catalog {
    fn add(&mut self, entry: TranslationEntry) {
        let key = EntryKey {
            domain: entry.domain.clone(),
            context: entry.context.clone(),
            singular: entry.singular.clone(),
        };
        match self.index.get(&key) {
            Some(&i) => {
                let existing = &mut self.entries[i];
                if !existing.references.contains(&entry.reference) {
                    existing.references.push(entry.reference);
                }
                if existing.plural.is_none() {
                    existing.plural = entry.plural;
                }
                if let Some(comment) = entry.comment {
                    if !existing.comments.contains(&comment) {
                        existing.comments.push(comment);
                    }
                }
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(CatalogEntry {
                    domain: entry.domain,
                    context: entry.context,
                    singular: entry.singular,
                    plural: entry.plural,
                    references: vec![entry.reference],
                    comments: entry.comment.into_iter().collect(),
                });
            }
        }
    }
}
