//! Target formats and top-level build requests

use crate::error::{Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output format produced by the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Pdf,
    Png,
    Tex,
}

/// Static pairing of a target with the extension of its outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSpec {
    pub target: Target,
    pub extension: &'static str,
}

/// Every target the converter knows about
pub const TARGET_TABLE: &[TargetSpec] = &[
    TargetSpec {
        target: Target::Pdf,
        extension: "pdf",
    },
    TargetSpec {
        target: Target::Png,
        extension: "png",
    },
    TargetSpec {
        target: Target::Tex,
        extension: "tex",
    },
];

impl Target {
    /// All targets in table order
    pub fn all() -> impl Iterator<Item = Target> {
        TARGET_TABLE.iter().map(|spec| spec.target)
    }

    /// Table entry for this target
    pub fn spec(self) -> &'static TargetSpec {
        // TARGET_TABLE is laid out in declaration order
        &TARGET_TABLE[self as usize]
    }

    /// Extension of the outputs, without the leading dot
    pub fn extension(self) -> &'static str {
        self.spec().extension
    }

    /// Lowercase name used on the command line and in config files
    pub fn name(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Tex => "tex",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        Target::all().find(|t| t.name() == name).ok_or_else(|| {
            let expected: Vec<&str> = Target::all().map(Target::name).collect();
            ValidationError::unknown_target(s, &expected).into()
        })
    }
}

/// What a single invocation was asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildRequest {
    /// Build the configured default target groups
    All,
    /// Build one target group
    Group(Target),
    /// Remove generated outputs
    Clean,
}

impl BuildRequest {
    /// Target groups this request builds, in the order they run
    ///
    /// `All` expands to `defaults`; `Clean` builds nothing.
    pub fn targets(self, defaults: &[Target]) -> Vec<Target> {
        match self {
            Self::All => {
                let mut targets = Vec::with_capacity(defaults.len());
                for target in defaults {
                    if !targets.contains(target) {
                        targets.push(*target);
                    }
                }
                targets
            }
            Self::Group(target) => vec![target],
            Self::Clean => Vec::new(),
        }
    }
}

impl FromStr for BuildRequest {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "clean" => Ok(Self::Clean),
            other => other.parse::<Target>().map(Self::Group).map_err(|_| {
                ValidationError::unknown_target(s, &["all", "pdf", "png", "tex", "clean"]).into()
            }),
        }
    }
}
