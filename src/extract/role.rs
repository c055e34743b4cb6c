//! Function role classification and argument layouts.
//!
//! Every recognized translation function maps to a [`FunctionRole`], which
//! carries a fixed [`ArgLayout`] describing what each argument position
//! means. Arity checking is structural: a call is only interpreted when it
//! supplies every position the layout names.

use std::fmt;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// The argument-shape classification of a recognized translation function.
///
/// Multiple source-level function names may alias the same role (e.g. `__`
/// aliases `gettext`, both `Simple`). The role decides how many string
/// arguments the call takes and what each of them means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FunctionRole {
    /// `gettext($msgid)` - singular only.
    Simple,
    /// `ngettext($msgid, $plural, $n)` - singular and plural.
    Plural,
    /// `pgettext($context, $msgid)` - disambiguating context plus singular.
    Context,
    /// `dgettext($domain, $msgid)` - catalog domain plus singular.
    Domain,
    /// `dngettext($domain, $msgid, $plural, $n)`.
    DomainPlural,
    /// `dpgettext($domain, $context, $msgid)`.
    DomainContext,
    /// `npgettext($context, $msgid, $plural, $n)`.
    ContextPlural,
    /// `dnpgettext($domain, $context, $msgid, $plural, $n)`.
    DomainContextPlural,
    /// `noop($msgid)` - marks a literal for extraction without translating
    /// it at runtime. Extracted exactly like `Simple`.
    Marker,
}

/// Zero-indexed argument positions for one role.
///
/// `singular` is always present; the optional positions are absent for roles
/// that do not take them. Positions named here are required and must hold
/// string literals; positions beyond the layout (the count argument of the
/// plural forms, for instance) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgLayout {
    pub domain: Option<usize>,
    pub context: Option<usize>,
    pub singular: usize,
    pub plural: Option<usize>,
}

impl FunctionRole {
    /// The argument layout for this role.
    pub fn layout(self) -> ArgLayout {
        use FunctionRole::*;
        let (domain, context, singular, plural) = match self {
            Simple | Marker => (None, None, 0, None),
            Plural => (None, None, 0, Some(1)),
            Context => (None, Some(0), 1, None),
            Domain => (Some(0), None, 1, None),
            DomainPlural => (Some(0), None, 1, Some(2)),
            DomainContext => (Some(0), Some(1), 2, None),
            ContextPlural => (None, Some(0), 1, Some(2)),
            DomainContextPlural => (Some(0), Some(1), 2, Some(3)),
        };
        ArgLayout {
            domain,
            context,
            singular,
            plural,
        }
    }

    /// Minimum number of call arguments this role requires.
    ///
    /// Every layout position is required; the highest position determines
    /// the arity floor. Calls with fewer arguments are dropped, never
    /// guessed at.
    pub fn required_args(self) -> usize {
        let layout = self.layout();
        layout.plural.unwrap_or(layout.singular) + 1
    }

    /// Parse a role from its configuration name (kebab-case).
    ///
    /// An unknown role name is a configuration error and the one condition
    /// that surfaces as a hard failure instead of a skipped call.
    pub fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "simple" => Self::Simple,
            "plural" => Self::Plural,
            "context" => Self::Context,
            "domain" => Self::Domain,
            "domain-plural" => Self::DomainPlural,
            "domain-context" => Self::DomainContext,
            "context-plural" => Self::ContextPlural,
            "domain-context-plural" => Self::DomainContextPlural,
            "marker" => Self::Marker,
            other => bail!("Unknown function role: \"{}\"", other),
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Plural => "plural",
            Self::Context => "context",
            Self::Domain => "domain",
            Self::DomainPlural => "domain-plural",
            Self::DomainContext => "domain-context",
            Self::ContextPlural => "context-plural",
            Self::DomainContextPlural => "domain-context-plural",
            Self::Marker => "marker",
        }
    }
}

impl fmt::Display for FunctionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
