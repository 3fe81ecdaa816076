// src/framework/mod.rs

//! Target framework monikers and nearest-compatible selection
//!
//! Manifests group their dependencies per target framework. A caller asks
//! for one framework (`net8.0`, say) and the group used is the one whose
//! framework is the closest compatible match, following the usual
//! precedence: exact match, then the same family at the highest version not
//! above the request, then compatible families (`netcoreapp` for modern
//! `net`, then `netstandard`), and finally the framework-agnostic group.

use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;

/// Framework family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrameworkFamily {
    /// Unified `net5.0` and later
    Net,
    /// `netcoreapp1.0` to `netcoreapp3.1`
    NetCoreApp,
    /// `netstandard1.0` to `netstandard2.1`
    NetStandard,
    /// Classic desktop framework (`net45`, `net472`, ...)
    NetFramework,
    /// Applies to every framework
    Any,
}

/// A parsed target framework moniker
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetFramework {
    pub family: FrameworkFamily,
    /// Version as (major, minor, build)
    pub version: (u32, u32, u32),
    /// Platform suffix of `net5.0+` monikers (`windows` in `net6.0-windows`)
    pub platform: Option<String>,
}

impl TargetFramework {
    /// The framework-agnostic moniker
    pub fn any() -> Self {
        Self {
            family: FrameworkFamily::Any,
            version: (0, 0, 0),
            platform: None,
        }
    }

    pub fn new(family: FrameworkFamily, major: u32, minor: u32) -> Self {
        Self {
            family,
            version: (major, minor, 0),
            platform: None,
        }
    }

    pub fn is_any(&self) -> bool {
        self.family == FrameworkFamily::Any
    }

    /// Parse a short (`net8.0`, `netstandard2.0`, `net472`) or long
    /// (`.NETStandard2.0`, `.NETCoreApp,Version=v3.1`) moniker
    ///
    /// Empty text and `any` map to the framework-agnostic moniker.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();

        if lower.is_empty() || lower == "any" || lower == "agnostic" {
            return Ok(Self::any());
        }

        // ".NETStandard,Version=v2.0" → ".netstandard2.0"
        let compact = lower.replace(",version=v", "").replace(",version=", "");

        let (family, rest) = if let Some(rest) = compact.strip_prefix(".netstandard") {
            (FrameworkFamily::NetStandard, rest)
        } else if let Some(rest) = compact.strip_prefix("netstandard") {
            (FrameworkFamily::NetStandard, rest)
        } else if let Some(rest) = compact.strip_prefix(".netcoreapp") {
            (FrameworkFamily::NetCoreApp, rest)
        } else if let Some(rest) = compact.strip_prefix("netcoreapp") {
            (FrameworkFamily::NetCoreApp, rest)
        } else if let Some(rest) = compact.strip_prefix(".netframework") {
            (FrameworkFamily::NetFramework, rest)
        } else if let Some(rest) = compact.strip_prefix("net") {
            // "net472" is desktop, "net8.0" is unified
            if rest.contains('.') {
                let major = rest
                    .split('.')
                    .next()
                    .and_then(|m| m.parse::<u32>().ok())
                    .unwrap_or(0);
                if major >= 5 {
                    (FrameworkFamily::Net, rest)
                } else {
                    (FrameworkFamily::NetFramework, rest)
                }
            } else {
                (FrameworkFamily::NetFramework, rest)
            }
        } else {
            return Err(Error::ParseError(format!(
                "Unrecognized target framework '{}'",
                trimmed
            )));
        };

        let (version_text, platform) = match rest.split_once('-') {
            Some((v, p)) if family == FrameworkFamily::Net && !p.is_empty() => {
                (v, Some(p.to_string()))
            }
            Some(_) => {
                return Err(Error::ParseError(format!(
                    "Unexpected platform suffix in target framework '{}'",
                    trimmed
                )));
            }
            None => (rest, None),
        };

        let version = if version_text.contains('.') {
            parse_dotted(version_text)
        } else {
            parse_compact(version_text)
        }
        .ok_or_else(|| {
            Error::ParseError(format!(
                "Invalid version in target framework '{}'",
                trimmed
            ))
        })?;

        // ".NETCoreApp5.0" and later name the unified framework
        let family = match family {
            FrameworkFamily::NetCoreApp if version.0 >= 5 => FrameworkFamily::Net,
            other => other,
        };

        Ok(Self {
            family,
            version,
            platform,
        })
    }

    /// Short moniker form
    pub fn short_name(&self) -> String {
        let (major, minor, build) = self.version;
        match self.family {
            FrameworkFamily::Any => "any".to_string(),
            FrameworkFamily::Net => match &self.platform {
                Some(platform) => format!("net{}.{}-{}", major, minor, platform),
                None => format!("net{}.{}", major, minor),
            },
            FrameworkFamily::NetCoreApp => format!("netcoreapp{}.{}", major, minor),
            FrameworkFamily::NetStandard => format!("netstandard{}.{}", major, minor),
            FrameworkFamily::NetFramework => {
                if build > 0 {
                    format!("net{}{}{}", major, minor, build)
                } else {
                    format!("net{}{}", major, minor)
                }
            }
        }
    }

    /// Whether assets built for `candidate` can be used by `self`
    pub fn is_compatible_with(&self, candidate: &TargetFramework) -> bool {
        use FrameworkFamily::*;

        if candidate.is_any() {
            return true;
        }
        if self.is_any() {
            return false;
        }

        let v = self.version;
        let c = candidate.version;

        match (self.family, candidate.family) {
            (Net, Net) => {
                c <= v
                    && match (&candidate.platform, &self.platform) {
                        (None, _) => true,
                        (Some(cp), Some(sp)) => cp == sp,
                        (Some(_), None) => false,
                    }
            }
            (Net, NetCoreApp) => c <= (3, 1, 0),
            (Net, NetStandard) => c <= (2, 1, 0),
            (NetCoreApp, NetCoreApp) => c <= v,
            (NetCoreApp, NetStandard) => {
                if v >= (3, 0, 0) {
                    c <= (2, 1, 0)
                } else if v >= (2, 0, 0) {
                    c <= (2, 0, 0)
                } else {
                    c <= (1, 6, 0)
                }
            }
            (NetStandard, NetStandard) => c <= v,
            (NetFramework, NetFramework) => c <= v,
            (NetFramework, NetStandard) => {
                if v >= (4, 6, 1) {
                    c <= (2, 0, 0)
                } else if v >= (4, 6, 0) {
                    c <= (1, 3, 0)
                } else if v >= (4, 5, 0) {
                    c <= (1, 1, 0)
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Rank of a compatible candidate's family relative to `self`; lower is nearer
    fn family_rank(&self, candidate: &TargetFramework) -> u8 {
        use FrameworkFamily::*;
        match (self.family, candidate.family) {
            (_, Any) => 3,
            (a, b) if a == b => 0,
            (Net, NetCoreApp) => 1,
            _ => 2,
        }
    }
}

fn parse_dotted(text: &str) -> Option<(u32, u32, u32)> {
    let mut parts = text.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = match parts.next() {
        Some(p) => p.parse().ok()?,
        None => 0,
    };
    let build = match parts.next() {
        Some(p) => p.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    Some((major, minor, build))
}

/// Compact desktop form: "472" → 4.7.2, "45" → 4.5
fn parse_compact(text: &str) -> Option<(u32, u32, u32)> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let digits: Vec<u32> = text.chars().filter_map(|c| c.to_digit(10)).collect();
    match digits.as_slice() {
        [major] => Some((*major, 0, 0)),
        [major, minor] => Some((*major, *minor, 0)),
        [major, minor, build] => Some((*major, *minor, *build)),
        _ => None,
    }
}

impl fmt::Display for TargetFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl std::str::FromStr for TargetFramework {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Chooses the nearest compatible framework among candidates
pub trait FrameworkOracle: Send + Sync {
    /// Index of the nearest candidate compatible with `requested`, if any
    fn nearest(&self, requested: &TargetFramework, candidates: &[TargetFramework])
        -> Option<usize>;
}

/// Default compatibility rules
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameworkReducer;

impl FrameworkOracle for FrameworkReducer {
    fn nearest(
        &self,
        requested: &TargetFramework,
        candidates: &[TargetFramework],
    ) -> Option<usize> {
        if let Some(exact) = candidates.iter().position(|c| c == requested) {
            return Some(exact);
        }

        candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| requested.is_compatible_with(c))
            .min_by(|(_, a), (_, b)| {
                // Nearer family first, then the highest version within it,
                // then a platform-specific match over a generic one
                requested
                    .family_rank(a)
                    .cmp(&requested.family_rank(b))
                    .then_with(|| b.version.cmp(&a.version))
                    .then_with(|| match (&a.platform, &b.platform) {
                        (Some(_), None) => Ordering::Less,
                        (None, Some(_)) => Ordering::Greater,
                        _ => Ordering::Equal,
                    })
            })
            .map(|(i, _)| i)
    }
}
