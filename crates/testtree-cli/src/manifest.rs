//! Discovery manifests: a TOML stand-in for what an assembly scanner finds.
//!
//! ```toml
//! project = "Sample.Tests"
//! target = "net8.0"
//!
//! [[assembly]]
//! path = "bin/Sample.Tests.dll"
//!
//! [[assembly.suite]]
//! type = "Sample.When_adding"
//! subject = "Calculator"
//! tags = ["slow"]
//! cases = ["should_add", { name = "should_overflow", ignored = true }]
//!
//! [[assembly.suite.grouping]]
//! field = "behaves_like_a_calculator"
//! cases = ["should_not_throw"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use testtree_types::{CategorySource, TypeName};

#[derive(Clone, Debug, Deserialize)]
pub struct Manifest {
    pub project: String,
    pub target: String,
    #[serde(default, rename = "assembly")]
    pub assemblies: Vec<AssemblyManifest>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AssemblyManifest {
    pub path: PathBuf,
    #[serde(default, rename = "suite")]
    pub suites: Vec<SuiteManifest>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SuiteManifest {
    #[serde(rename = "type")]
    pub type_name: TypeName,
    pub subject: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_source")]
    pub source: CategorySource,
    #[serde(default)]
    pub ignored: bool,
    #[serde(default)]
    pub explicit: bool,
    #[serde(default)]
    pub cases: Vec<CaseManifest>,
    #[serde(default, rename = "grouping")]
    pub groupings: Vec<GroupingManifest>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GroupingManifest {
    pub field: String,
    #[serde(default)]
    pub ignored: bool,
    #[serde(default)]
    pub cases: Vec<CaseManifest>,
}

/// A case is either a bare member name or a table with flags.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum CaseManifest {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        ignored: bool,
    },
}

impl CaseManifest {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Detailed { name, .. } => name,
        }
    }

    pub fn ignored(&self) -> bool {
        match self {
            Self::Name(_) => false,
            Self::Detailed { ignored, .. } => *ignored,
        }
    }
}

fn default_source() -> CategorySource {
    CategorySource::Attribute
}

impl Manifest {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading manifest {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing manifest {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r#"
project = "Sample.Tests"
target = "net8.0"

[[assembly]]
path = "bin/Sample.Tests.dll"

[[assembly.suite]]
type = "Sample.When_adding"
subject = "Calculator"
tags = ["slow"]
cases = ["should_add", { name = "should_overflow", ignored = true }]

[[assembly.suite.grouping]]
field = "behaves_like_a_calculator"
cases = ["should_not_throw"]
"#;

    #[test]
    fn parses_nested_manifest() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        assert_eq!(manifest.project, "Sample.Tests");
        assert_eq!(manifest.assemblies.len(), 1);

        let suite = &manifest.assemblies[0].suites[0];
        assert_eq!(suite.type_name.short_name(), "When_adding");
        assert_eq!(suite.source, CategorySource::Attribute);
        assert!(!suite.explicit);
        assert_eq!(suite.cases.len(), 2);
        assert!(!suite.cases[0].ignored());
        assert!(suite.cases[1].ignored());
        assert_eq!(suite.cases[1].name(), "should_overflow");
        assert_eq!(suite.groupings[0].cases[0].name(), "should_not_throw");
    }

    #[test]
    fn rejects_invalid_type_name() {
        let text = r#"
project = "P"
target = "net8.0"
[[assembly]]
path = "a.dll"
[[assembly.suite]]
type = "Bad Name"
"#;
        assert!(Manifest::parse(text).is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let manifest = Manifest::load(file.path()).unwrap();
        assert_eq!(manifest.target, "net8.0");
    }

    #[test]
    fn load_missing_file_mentions_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Manifest::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("missing.toml"));
    }
}
