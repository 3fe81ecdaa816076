// src/manifest/mod.rs

//! Package manifest reading
//!
//! Only the fields needed for dependency discovery and license prompts are
//! read: identity, authors, license data and the dependency groups. Element
//! names are matched without their XML namespace, since manifests in the
//! wild use several schema revisions.

use crate::error::{Error, Result};
use crate::framework::TargetFramework;
use crate::version::{PackageVersion, VersionRange};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

/// Base URL for expression licenses
const LICENSE_EXPRESSION_BASE: &str = "https://licenses.nuget.org/";

/// One declared dependency inside a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDependency {
    pub id: String,
    pub range: VersionRange,
}

/// Dependencies declared for one target framework
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGroup {
    pub target_framework: TargetFramework,
    pub dependencies: Vec<ManifestDependency>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseKind {
    /// SPDX license expression (`MIT`, `MIT OR Apache-2.0`)
    Expression,
    /// Path to a license file inside the package
    File,
}

/// The `<license>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseMetadata {
    pub kind: LicenseKind,
    pub value: String,
    pub version: Option<String>,
}

impl LicenseMetadata {
    /// URL at which the license text can be read
    ///
    /// Only expression licenses have one; file licenses live inside the
    /// package archive.
    pub fn license_url(&self) -> Option<String> {
        match self.kind {
            LicenseKind::Expression => url::Url::parse(LICENSE_EXPRESSION_BASE)
                .and_then(|base| base.join(&self.value))
                .map(|u| u.to_string())
                .ok(),
            LicenseKind::File => None,
        }
    }
}

/// The subset of a package manifest this crate consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub id: String,
    pub version: PackageVersion,
    pub authors: Option<String>,
    pub require_license_acceptance: bool,
    pub license: Option<LicenseMetadata>,
    pub license_url: Option<String>,
    pub dependency_groups: Vec<DependencyGroup>,
}

impl Manifest {
    /// Parse a manifest document from raw bytes
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::ParseError(format!("Manifest is not valid UTF-8: {}", e)))?;
        Self::parse_str(text)
    }

    /// Parse a manifest document
    pub fn parse_str(xml: &str) -> Result<Self> {
        let xml = xml.trim_start_matches('\u{feff}');
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<String> = Vec::new();
        let mut capture: Option<(String, String)> = None;
        let mut partial = PartialManifest::default();
        let mut current_group: Option<DependencyGroup> = None;
        let mut flat_dependencies: Vec<ManifestDependency> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    let name = local_name(e);
                    partial.open(&stack, &name, e, &mut current_group, &mut flat_dependencies)?;
                    if stack.last().map(String::as_str) == Some("metadata")
                        && is_text_field(&name)
                    {
                        capture = Some((name.clone(), String::new()));
                    }
                    stack.push(name);
                }
                Ok(Event::Empty(ref e)) => {
                    let name = local_name(e);
                    partial.open(&stack, &name, e, &mut current_group, &mut flat_dependencies)?;
                    if name == "group" {
                        // <group targetFramework="..."/> declares no dependencies
                        if let Some(group) = current_group.take() {
                            partial.groups.push(group);
                        }
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if let Some((_, buf)) = capture.as_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::ParseError(format!("Bad manifest text: {}", e)))?;
                        buf.push_str(&text);
                    }
                }
                Ok(Event::CData(ref e)) => {
                    if let Some((_, buf)) = capture.as_mut() {
                        buf.push_str(&String::from_utf8_lossy(e));
                    }
                }
                Ok(Event::End(_)) => {
                    let Some(name) = stack.pop() else {
                        return Err(Error::ParseError("Unbalanced manifest element".to_string()));
                    };
                    if name == "group" {
                        if let Some(group) = current_group.take() {
                            partial.groups.push(group);
                        }
                    }
                    if capture.as_ref().is_some_and(|(field, _)| *field == name) {
                        if let Some((field, value)) = capture.take() {
                            partial.set_field(&field, value.trim().to_string());
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(Error::ParseError(format!(
                        "Manifest XML error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
            }
        }

        if !flat_dependencies.is_empty() {
            partial.groups.push(DependencyGroup {
                target_framework: TargetFramework::any(),
                dependencies: flat_dependencies,
            });
        }

        partial.finish()
    }

    /// Frameworks of the declared dependency groups, in document order
    pub fn group_frameworks(&self) -> Vec<TargetFramework> {
        self.dependency_groups
            .iter()
            .map(|g| g.target_framework.clone())
            .collect()
    }

    /// Direct license URL, falling back to the license metadata's own URL
    pub fn effective_license_url(&self) -> Option<String> {
        self.license_url
            .clone()
            .filter(|u| !u.is_empty())
            .or_else(|| self.license.as_ref().and_then(LicenseMetadata::license_url))
    }
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn is_text_field(name: &str) -> bool {
    matches!(
        name,
        "id" | "version" | "authors" | "requireLicenseAcceptance" | "license" | "licenseUrl"
    )
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr =
            attr.map_err(|e| Error::ParseError(format!("Bad manifest attribute: {}", e)))?;
        if attr.key.local_name().as_ref() == key.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|e| Error::ParseError(format!("Bad attribute value: {}", e)))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[derive(Default)]
struct PartialManifest {
    id: Option<String>,
    version: Option<String>,
    authors: Option<String>,
    require_license_acceptance: bool,
    license_kind: Option<LicenseKind>,
    license_version: Option<String>,
    license_value: Option<String>,
    license_url: Option<String>,
    groups: Vec<DependencyGroup>,
}

impl PartialManifest {
    fn open(
        &mut self,
        stack: &[String],
        name: &str,
        e: &BytesStart<'_>,
        current_group: &mut Option<DependencyGroup>,
        flat: &mut Vec<ManifestDependency>,
    ) -> Result<()> {
        let parent = stack.last().map(String::as_str);
        match (parent, name) {
            (Some("metadata"), "license") => {
                let kind = match attribute(e, "type")?.as_deref() {
                    Some("file") => LicenseKind::File,
                    _ => LicenseKind::Expression,
                };
                self.license_kind = Some(kind);
                self.license_version = attribute(e, "version")?;
            }
            (Some("dependencies"), "group") => {
                let target_framework = match attribute(e, "targetFramework")? {
                    Some(tfm) => TargetFramework::parse(&tfm),
                    None => Ok(TargetFramework::any()),
                };
                // Groups for frameworks we cannot model are dropped whole
                *current_group = match target_framework {
                    Ok(target_framework) => Some(DependencyGroup {
                        target_framework,
                        dependencies: Vec::new(),
                    }),
                    Err(e) => {
                        debug!("Skipping dependency group: {}", e);
                        None
                    }
                };
            }
            (Some("group"), "dependency") => {
                if let Some(group) = current_group.as_mut() {
                    group.dependencies.push(parse_dependency(e)?);
                }
            }
            (Some("dependencies"), "dependency") => flat.push(parse_dependency(e)?),
            _ => {}
        }
        Ok(())
    }

    fn set_field(&mut self, field: &str, value: String) {
        match field {
            "id" => self.id = Some(value),
            "version" => self.version = Some(value),
            "authors" => self.authors = Some(value).filter(|v| !v.is_empty()),
            "requireLicenseAcceptance" => {
                self.require_license_acceptance = value.eq_ignore_ascii_case("true")
            }
            "license" => self.license_value = Some(value).filter(|v| !v.is_empty()),
            "licenseUrl" => self.license_url = Some(value).filter(|v| !v.is_empty()),
            _ => {}
        }
    }

    fn finish(self) -> Result<Manifest> {
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::ParseError("Manifest has no package id".to_string()))?;
        let version_text = self
            .version
            .ok_or_else(|| Error::ParseError(format!("Manifest for {} has no version", id)))?;
        let version = PackageVersion::parse(&version_text)?;

        let license = match (self.license_kind, self.license_value) {
            (Some(kind), Some(value)) => Some(LicenseMetadata {
                kind,
                value,
                version: self.license_version,
            }),
            _ => None,
        };

        debug!(
            "Parsed manifest {} {} ({} dependency groups)",
            id,
            version,
            self.groups.len()
        );

        Ok(Manifest {
            id,
            version,
            authors: self.authors,
            require_license_acceptance: self.require_license_acceptance,
            license,
            license_url: self.license_url,
            dependency_groups: self.groups,
        })
    }
}

fn parse_dependency(e: &BytesStart<'_>) -> Result<ManifestDependency> {
    let id = attribute(e, "id")?
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::ParseError("Dependency without an id".to_string()))?;
    let range = match attribute(e, "version")? {
        Some(text) => VersionRange::parse(&text)?,
        None => VersionRange::any(),
    };
    Ok(ManifestDependency { id, range })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUPED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="http://schemas.microsoft.com/packaging/2013/05/nuspec.xsd">
  <metadata minClientVersion="2.12">
    <id>Newtonsoft.Json</id>
    <version>13.0.1</version>
    <authors>James Newton-King</authors>
    <requireLicenseAcceptance>false</requireLicenseAcceptance>
    <license type="expression">MIT</license>
    <licenseUrl>https://licenses.nuget.org/MIT</licenseUrl>
    <dependencies>
      <group targetFramework=".NETFramework2.0" />
      <group targetFramework=".NETStandard1.0">
        <dependency id="Microsoft.CSharp" version="4.3.0" exclude="Build,Analyzers" />
        <dependency id="System.Runtime" version="[4.3.0, 5.0.0)" />
      </group>
      <group targetFramework=".NETStandard2.0" />
    </dependencies>
  </metadata>
</package>"#;

    #[test]
    fn test_parse_grouped_manifest() {
        let m = Manifest::parse_str(GROUPED).unwrap();
        assert_eq!(m.id, "Newtonsoft.Json");
        assert_eq!(m.version.to_string(), "13.0.1");
        assert_eq!(m.authors.as_deref(), Some("James Newton-King"));
        assert!(!m.require_license_acceptance);
        assert_eq!(m.dependency_groups.len(), 3);

        let ns10 = &m.dependency_groups[1];
        assert_eq!(ns10.target_framework.to_string(), "netstandard1.0");
        assert_eq!(ns10.dependencies.len(), 2);
        assert_eq!(ns10.dependencies[0].id, "Microsoft.CSharp");
        assert_eq!(ns10.dependencies[0].range.to_string(), ">= 4.3.0");
        assert_eq!(ns10.dependencies[1].range.to_string(), "[4.3.0, 5.0.0)");

        assert!(m.dependency_groups[0].dependencies.is_empty());
        assert!(m.dependency_groups[2].dependencies.is_empty());
    }

    #[test]
    fn test_parse_flat_dependencies_become_any_group() {
        let xml = r#"<package><metadata>
            <id>Legacy</id><version>1.0</version>
            <dependencies>
              <dependency id="Other" version="2.0" />
            </dependencies>
        </metadata></package>"#;
        let m = Manifest::parse_str(xml).unwrap();
        assert_eq!(m.dependency_groups.len(), 1);
        assert!(m.dependency_groups[0].target_framework.is_any());
        assert_eq!(m.dependency_groups[0].dependencies[0].id, "Other");
    }

    #[test]
    fn test_license_acceptance_and_url_fallback() {
        let xml = r#"<package><metadata>
            <id>Licensed</id><version>1.0.0</version>
            <authors>Contoso</authors>
            <requireLicenseAcceptance>True</requireLicenseAcceptance>
            <license type="expression" version="1.0.0">MIT OR Apache-2.0</license>
        </metadata></package>"#;
        let m = Manifest::parse_str(xml).unwrap();
        assert!(m.require_license_acceptance);
        let license = m.license.as_ref().unwrap();
        assert_eq!(license.kind, LicenseKind::Expression);
        assert_eq!(license.version.as_deref(), Some("1.0.0"));
        assert_eq!(
            m.effective_license_url().as_deref(),
            Some("https://licenses.nuget.org/MIT%20OR%20Apache-2.0")
        );
    }

    #[test]
    fn test_file_license_has_no_url() {
        let xml = r#"<package><metadata>
            <id>FileLicensed</id><version>1.0.0</version>
            <license type="file">LICENSE.txt</license>
        </metadata></package>"#;
        let m = Manifest::parse_str(xml).unwrap();
        assert_eq!(m.license.as_ref().unwrap().kind, LicenseKind::File);
        assert!(m.effective_license_url().is_none());
    }

    #[test]
    fn test_direct_license_url_wins() {
        let xml = r#"<package><metadata>
            <id>Both</id><version>1.0.0</version>
            <license type="expression">MIT</license>
            <licenseUrl>https://example.com/license</licenseUrl>
        </metadata></package>"#;
        let m = Manifest::parse_str(xml).unwrap();
        assert_eq!(
            m.effective_license_url().as_deref(),
            Some("https://example.com/license")
        );
    }

    #[test]
    fn test_missing_id_is_error() {
        let xml = r#"<package><metadata><version>1.0.0</version></metadata></package>"#;
        assert!(matches!(
            Manifest::parse_str(xml),
            Err(Error::ParseError(_))
        ));
    }

    #[test]
    fn test_malformed_xml_is_error() {
        assert!(Manifest::parse_str("<package><metadata><id>x</metadata>").is_err());
        assert!(Manifest::parse(&[0xff, 0xfe, 0x00]).is_err());
    }

    #[test]
    fn test_dependency_without_version_accepts_any() {
        let xml = r#"<package><metadata>
            <id>A</id><version>1.0.0</version>
            <dependencies><group><dependency id="B" /></group></dependencies>
        </metadata></package>"#;
        let m = Manifest::parse_str(xml).unwrap();
        let group = &m.dependency_groups[0];
        assert!(group.target_framework.is_any());
        assert!(group.dependencies[0].range.min_version().is_none());
    }

    #[test]
    fn test_unknown_framework_group_is_skipped() {
        let xml = r#"<package><metadata>
            <id>A</id><version>1.0.0</version>
            <dependencies>
              <group targetFramework="MonoAndroid10"><dependency id="Droid" /></group>
              <group targetFramework=".NETStandard2.0"><dependency id="B" version="1.0" /></group>
            </dependencies>
        </metadata></package>"#;
        let m = Manifest::parse_str(xml).unwrap();
        assert_eq!(m.dependency_groups.len(), 1);
        assert_eq!(m.dependency_groups[0].dependencies[0].id, "B");
    }

    #[test]
    fn test_skipped_group_contents_are_not_validated() {
        let xml = r#"<package><metadata>
            <id>A</id><version>1.0.0</version>
            <dependencies>
              <group targetFramework="Xamarin.iOS10"><dependency id="Bad" version="[oops" /></group>
              <group targetFramework="netstandard2.0" />
            </dependencies>
        </metadata></package>"#;
        let m = Manifest::parse_str(xml).unwrap();
        assert_eq!(m.dependency_groups.len(), 1);
        assert!(m.dependency_groups[0].dependencies.is_empty());
    }
}
