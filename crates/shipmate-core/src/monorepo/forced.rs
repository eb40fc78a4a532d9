//! Forced-publish overrides
//!
//! A forced spec names packages that must be released whether or not
//! anything changed. It is pure name matching and never looks at git.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{PatternError, Result};

/// Pattern that selects every package
pub const ALL_PACKAGES: &str = "*";

/// Caller-supplied forced-publish spec
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForcedSpec {
    /// Nothing is forced
    #[default]
    None,
    /// Every package is forced
    All,
    /// Packages whose names match any of these globs
    Patterns(Vec<String>),
}

impl ForcedSpec {
    /// Build a spec from a list of patterns. `*` anywhere in the list, or a
    /// comma-separated entry containing it, forces everything.
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .flat_map(|p| {
                p.as_ref()
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .collect();

        if patterns.is_empty() {
            Self::None
        } else if patterns.iter().any(|p| p == ALL_PACKAGES) {
            Self::All
        } else {
            Self::Patterns(patterns)
        }
    }

    /// `true` forces everything, `false` forces nothing
    pub fn from_flag(force: bool) -> Self {
        if force {
            Self::All
        } else {
            Self::None
        }
    }

    /// Whether this spec forces every package
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Compiled forced-publish matcher
#[derive(Debug, Clone)]
pub struct ForcedPackages {
    all: bool,
    set: GlobSet,
}

impl ForcedPackages {
    /// Compile a forced spec. Malformed globs fail here, before any git work.
    pub fn compile(spec: &ForcedSpec) -> Result<Self> {
        let set = match spec {
            ForcedSpec::Patterns(patterns) => name_set("force_publish", patterns)?,
            ForcedSpec::None | ForcedSpec::All => GlobSet::empty(),
        };

        Ok(Self {
            all: spec.is_all(),
            set,
        })
    }

    /// Whether every package is forced
    pub fn is_all(&self) -> bool {
        self.all
    }

    /// Whether a package name is forced
    pub fn matches(&self, name: &str) -> bool {
        self.all || self.set.is_match(name)
    }
}

/// Compile package-name globs. `*` stays inside one `/`-separated segment,
/// so `@scope/*` matches `@scope/a` but neither `@scope/a/b` nor `other/a`.
pub(crate) fn name_set<S: AsRef<str>>(option: &'static str, patterns: &[S]) -> Result<GlobSet> {
    let invalid = |pattern: &str, reason: String| PatternError::InvalidGlob {
        option,
        pattern: pattern.to_string(),
        reason,
    };

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| invalid(pattern, e.kind().to_string()))?;
        builder.add(glob);
    }

    Ok(builder.build().map_err(|e| invalid("", e.to_string()))?)
}
