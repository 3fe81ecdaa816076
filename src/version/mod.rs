// src/version/mod.rs

//! Package versions and version ranges
//!
//! Versions follow the package index convention of up to four numeric
//! components (`major.minor.patch.revision`) with an optional prerelease
//! label and build metadata. Ranges use interval notation:
//!
//! - `1.0` → `>= 1.0`
//! - `[1.0]` → exactly 1.0
//! - `[1.0,2.0)` → `>= 1.0` and `< 2.0`
//! - `(,2.0]` → `<= 2.0`

use crate::error::{Error, Result};
use semver::Prerelease;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A parsed package version
///
/// Build metadata is kept for display but ignored by equality, hashing and
/// ordering.
#[derive(Debug, Clone)]
pub struct PackageVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub revision: u64,
    pub pre: Prerelease,
    pub metadata: Option<String>,
}

impl PackageVersion {
    /// Create a release version with a zero revision
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            revision: 0,
            pre: Prerelease::EMPTY,
            metadata: None,
        }
    }

    /// Parse a version string
    ///
    /// Format: major[.minor[.patch[.revision]]][-prerelease][+metadata]
    /// Examples:
    /// - "12.0.3" → 12.0.3
    /// - "4.0" → 4.0.0
    /// - "1.0.0.1" → 1.0.0.1
    /// - "2.0.0-beta.1+sha.5114f85" → 2.0.0-beta.1
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::ParseError("Empty version string".to_string()));
        }

        let (rest, metadata) = match s.split_once('+') {
            Some((r, m)) if !m.is_empty() => (r, Some(m.to_string())),
            Some(_) => {
                return Err(Error::ParseError(format!(
                    "Empty build metadata in version '{}'",
                    s
                )));
            }
            None => (s, None),
        };

        let (numbers, pre) = match rest.split_once('-') {
            Some((n, p)) => {
                let pre = Prerelease::new(p).map_err(|e| {
                    Error::ParseError(format!("Invalid prerelease label in '{}': {}", s, e))
                })?;
                if pre.is_empty() {
                    return Err(Error::ParseError(format!(
                        "Empty prerelease label in version '{}'",
                        s
                    )));
                }
                (n, pre)
            }
            None => (rest, Prerelease::EMPTY),
        };

        let parts: Vec<&str> = numbers.split('.').collect();
        if parts.len() > 4 {
            return Err(Error::ParseError(format!(
                "Too many version components in '{}'",
                s
            )));
        }

        let mut components = [0u64; 4];
        for (slot, part) in components.iter_mut().zip(&parts) {
            *slot = part.parse::<u64>().map_err(|e| {
                Error::ParseError(format!("Invalid version component '{}' in '{}': {}", part, s, e))
            })?;
        }

        Ok(Self {
            major: components[0],
            minor: components[1],
            patch: components[2],
            revision: components[3],
            pre,
            metadata,
        })
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    /// Canonical form used for identity comparison and index URLs
    ///
    /// Always three numeric components, a fourth only when non-zero, the
    /// prerelease label when present, and never build metadata.
    pub fn normalized(&self) -> String {
        let mut out = format!("{}.{}.{}", self.major, self.minor, self.patch);
        if self.revision > 0 {
            out.push_str(&format!(".{}", self.revision));
        }
        if !self.pre.is_empty() {
            out.push('-');
            out.push_str(self.pre.as_str());
        }
        out
    }

    fn numeric(&self) -> (u64, u64, u64, u64) {
        (self.major, self.minor, self.patch, self.revision)
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized())
    }
}

impl std::str::FromStr for PackageVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageVersion {}

impl Hash for PackageVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.numeric().hash(state);
        self.pre.as_str().to_ascii_lowercase().hash(state);
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.numeric().cmp(&other.numeric()) {
            Ordering::Equal => {}
            ord => return ord,
        }
        // Labels compare case-insensitively; semver puts a release above any prerelease
        let lhs = Prerelease::new(&self.pre.as_str().to_ascii_lowercase())
            .unwrap_or_else(|_| self.pre.clone());
        let rhs = Prerelease::new(&other.pre.as_str().to_ascii_lowercase())
            .unwrap_or_else(|_| other.pre.clone());
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A version interval a dependency accepts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionRange {
    min: Option<PackageVersion>,
    min_inclusive: bool,
    max: Option<PackageVersion>,
    max_inclusive: bool,
}

impl VersionRange {
    /// Any version is acceptable
    pub fn any() -> Self {
        Self {
            min: None,
            min_inclusive: false,
            max: None,
            max_inclusive: false,
        }
    }

    /// The common minimum-bound range (`>= version`)
    pub fn at_least(version: PackageVersion) -> Self {
        Self {
            min: Some(version),
            min_inclusive: true,
            max: None,
            max_inclusive: false,
        }
    }

    /// Exactly one version (`[version]`)
    pub fn exact(version: PackageVersion) -> Self {
        Self {
            min: Some(version.clone()),
            min_inclusive: true,
            max: Some(version),
            max_inclusive: true,
        }
    }

    /// Parse a range in interval notation
    ///
    /// A bare version is a minimum bound. An empty string or `*` accepts
    /// anything.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "*" {
            return Ok(Self::any());
        }

        let min_inclusive = match s.chars().next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Ok(Self::at_least(PackageVersion::parse(s)?)),
        };

        let max_inclusive = match s.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => {
                return Err(Error::ParseError(format!(
                    "Unterminated version range '{}'",
                    s
                )));
            }
        };

        let inner = s[1..s.len() - 1].trim();

        let Some((lower, upper)) = inner.split_once(',') else {
            // "[1.0]" is the only valid single-version interval
            if !(min_inclusive && max_inclusive) || inner.is_empty() {
                return Err(Error::ParseError(format!(
                    "Single-version range must use square brackets: '{}'",
                    s
                )));
            }
            return Ok(Self::exact(PackageVersion::parse(inner)?));
        };

        if upper.contains(',') {
            return Err(Error::ParseError(format!(
                "Too many bounds in version range '{}'",
                s
            )));
        }

        let parse_bound = |text: &str| -> Result<Option<PackageVersion>> {
            let text = text.trim();
            if text.is_empty() {
                Ok(None)
            } else {
                PackageVersion::parse(text).map(Some)
            }
        };

        let min = parse_bound(lower)?;
        let max = parse_bound(upper)?;

        if let (Some(lo), Some(hi)) = (&min, &max) {
            let empty = match lo.cmp(hi) {
                Ordering::Greater => true,
                Ordering::Equal => !(min_inclusive && max_inclusive),
                Ordering::Less => false,
            };
            if empty {
                return Err(Error::ParseError(format!(
                    "Version range '{}' can never be satisfied",
                    s
                )));
            }
        }

        Ok(Self {
            min_inclusive: min.is_some() && min_inclusive,
            max_inclusive: max.is_some() && max_inclusive,
            min,
            max,
        })
    }

    /// Lower bound of the range, if any
    pub fn min_version(&self) -> Option<&PackageVersion> {
        self.min.as_ref()
    }

    pub fn max_version(&self) -> Option<&PackageVersion> {
        self.max.as_ref()
    }

    pub fn is_min_inclusive(&self) -> bool {
        self.min_inclusive
    }

    pub fn is_max_inclusive(&self) -> bool {
        self.max_inclusive
    }

    /// Check if a version falls inside this range
    pub fn satisfies(&self, version: &PackageVersion) -> bool {
        let above_min = match &self.min {
            None => true,
            Some(min) if self.min_inclusive => version >= min,
            Some(min) => version > min,
        };
        let below_max = match &self.max {
            None => true,
            Some(max) if self.max_inclusive => version <= max,
            Some(max) => version < max,
        };
        above_min && below_max
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.min, &self.max) {
            (None, None) => write!(f, "*"),
            (Some(min), None) if self.min_inclusive => write!(f, ">= {}", min),
            (Some(min), Some(max)) if min == max => write!(f, "= {}", min),
            (min, max) => {
                write!(f, "{}", if self.min_inclusive { '[' } else { '(' })?;
                if let Some(min) = min {
                    write!(f, "{}", min)?;
                }
                write!(f, ", ")?;
                if let Some(max) = max {
                    write!(f, "{}", max)?;
                }
                write!(f, "{}", if self.max_inclusive { ']' } else { ')' })
            }
        }
    }
}
