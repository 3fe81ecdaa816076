// src/model.rs

//! Core data model: identities, dependency edges and records

use crate::framework::TargetFramework;
use crate::version::{PackageVersion, VersionRange};
use std::fmt;

/// Kind of library an identity refers to
///
/// Only packages from the remote index are handled here; the tag exists so
/// identities can be mixed with other library kinds by the graph walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LibraryKind {
    #[default]
    Package,
}

impl fmt::Display for LibraryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryKind::Package => write!(f, "package"),
        }
    }
}

/// A concrete package at a concrete version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LibraryIdentity {
    name: String,
    version: PackageVersion,
    kind: LibraryKind,
}

impl LibraryIdentity {
    pub fn new(name: impl Into<String>, version: PackageVersion) -> Self {
        Self {
            name: name.into(),
            version,
            kind: LibraryKind::Package,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &PackageVersion {
        &self.version
    }

    pub fn kind(&self) -> LibraryKind {
        self.kind
    }
}

impl fmt::Display for LibraryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// A requested package name together with the versions it accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRange {
    pub name: String,
    pub range: VersionRange,
}

impl LibraryRange {
    pub fn new(name: impl Into<String>, range: VersionRange) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }
}

impl fmt::Display for LibraryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.range)
    }
}

/// One outgoing dependency of a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub name: String,
    pub range: VersionRange,
}

impl DependencyEdge {
    pub fn new(name: impl Into<String>, range: VersionRange) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }

    /// The edge as a range the walker can feed back into identity lookup
    pub fn to_library_range(&self) -> LibraryRange {
        LibraryRange::new(self.name.clone(), self.range.clone())
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.range)
    }
}

/// The discovered dependency set of one package version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    pub identity: LibraryIdentity,
    pub resolved: bool,
    pub target_framework: TargetFramework,
    pub dependencies: Vec<DependencyEdge>,
}

impl DependencyRecord {
    /// A resolved record with no outgoing edges
    pub fn leaf(identity: LibraryIdentity, target_framework: TargetFramework) -> Self {
        Self {
            identity,
            resolved: true,
            target_framework,
            dependencies: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    pub fn version(&self) -> &PackageVersion {
        self.identity.version()
    }
}

/// License terms a user must accept before a package is installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseObligation {
    pub package: String,
    pub license: Option<String>,
    pub license_url: Option<String>,
    pub authors: Option<String>,
}

impl fmt::Display for LicenseObligation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.package)?;
        if let Some(ref license) = self.license {
            write!(f, " ({})", license)?;
        }
        if let Some(ref authors) = self.authors {
            write!(f, " by {}", authors)?;
        }
        if let Some(ref url) = self.license_url {
            write!(f, " <{}>", url)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_kind_is_package() {
        let id = LibraryIdentity::new("PackageA", PackageVersion::new(1, 0, 0));
        assert_eq!(id.kind(), LibraryKind::Package);
        assert_eq!(id.to_string(), "PackageA 1.0.0");
    }

    #[test]
    fn test_leaf_record_is_resolved() {
        let id = LibraryIdentity::new("Leaf", PackageVersion::new(2, 1, 0));
        let record = DependencyRecord::leaf(id, TargetFramework::any());
        assert!(record.resolved);
        assert!(record.dependencies.is_empty());
        assert_eq!(record.name(), "Leaf");
    }

    #[test]
    fn test_obligation_display() {
        let ob = LicenseObligation {
            package: "Contoso.Lib".to_string(),
            license: Some("MIT".to_string()),
            license_url: Some("https://licenses.nuget.org/MIT".to_string()),
            authors: Some("Contoso".to_string()),
        };
        assert_eq!(
            ob.to_string(),
            "Contoso.Lib (MIT) by Contoso <https://licenses.nuget.org/MIT>"
        );
    }
}
