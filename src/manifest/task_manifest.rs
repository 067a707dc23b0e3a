use std::{borrow::Cow, path::Path};

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::debug;

use crate::ext::BestEffortPathExt;

const CACHES_SECTION: &str = "caches";
const CIPD_PACKAGES_SECTION: &str = "cipd_packages";

/// A named cache mounted into the task's working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub name: String,
    pub path: String,
}

/// A CIPD package installed into the task's working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipdPackage {
    pub package: String,
    pub version: String,
    pub path: String,
}

/// Filesystem claims declared by a single task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskManifest {
    pub caches: Vec<CacheEntry>,
    pub cipd_packages: Vec<CipdPackage>,
}

impl TaskManifest {
    pub async fn from_path(path: &Path) -> Result<Self, ManifestError> {
        debug!("Reading manifest file: {}", path.best_effort_path_display());
        let bytes = fs::read(path).await.context(ReadSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        debug!("Successfully read manifest file: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        contents.as_str().try_into()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty() && self.cipd_packages.is_empty()
    }
}

impl TryFrom<&str> for TaskManifest {
    type Error = ManifestError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let document = documents.first().context(MalformedManifestSnafu)?;
        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;

        let caches = parse_section(top_level, CACHES_SECTION, |entry| {
            Ok(CacheEntry {
                name: string_field(entry, "name")?,
                path: string_field(entry, "path")?,
            })
        })?;
        let cipd_packages = parse_section(top_level, CIPD_PACKAGES_SECTION, |entry| {
            Ok(CipdPackage {
                package: string_field(entry, "package")?,
                version: string_field(entry, "version")?,
                path: string_field(entry, "path")?,
            })
        })?;

        debug!(
            "Parsed manifest with {} caches and {} cipd packages",
            caches.len(),
            cipd_packages.len()
        );
        Ok(TaskManifest {
            caches,
            cipd_packages,
        })
    }
}

fn key<'y>(name: &'static str) -> Yaml<'y> {
    Yaml::Value(Scalar::String(Cow::Borrowed(name)))
}

/// Parses every entry of an optional list section. A missing or null
/// section is treated as empty.
fn parse_section<'y, T>(
    top_level: &LinkedHashMap<Yaml<'y>, Yaml<'y>>,
    section: &'static str,
    parse_entry: impl Fn(&LinkedHashMap<Yaml<'y>, Yaml<'y>>) -> Result<T, &'static str>,
) -> Result<Vec<T>, ManifestError> {
    let entries = match top_level.get(&key(section)) {
        None | Some(Yaml::Value(Scalar::Null)) => return Ok(Vec::new()),
        Some(value) => value.as_sequence().context(SectionNotListSnafu { section })?,
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let entry = entry
                .as_mapping()
                .context(EntryNotMapSnafu { section, index })?;
            parse_entry(entry).map_err(|field| ManifestError::MissingField {
                section: section.to_string(),
                index,
                field: field.to_string(),
            })
        })
        .collect()
}

fn string_field<'y>(
    entry: &LinkedHashMap<Yaml<'y>, Yaml<'y>>,
    field: &'static str,
) -> Result<String, &'static str> {
    entry
        .get(&key(field))
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .ok_or(field)
}

#[derive(Debug, Snafu)]
pub enum ManifestError {
    #[snafu(display("Failed to read the manifest file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Manifest file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the manifest"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted manifest"))]
    MalformedManifest,
    #[snafu(display("Top level of the manifest should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Section '{}' should be a list", section))]
    SectionNotList { section: String },
    #[snafu(display("Entry {} of section '{}' should be a map", index, section))]
    EntryNotMap { section: String, index: usize },
    #[snafu(display(
        "Entry {} of section '{}' is missing string field '{}'",
        index,
        section,
        field
    ))]
    MissingField {
        section: String,
        index: usize,
        field: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[compio::test]
    async fn manifest_returns_error_on_nonexistent_file() {
        let result = TaskManifest::from_path(Path::new("nonexistent.yaml")).await;
        assert!(matches!(result, Err(ManifestError::ReadError { .. })));
    }

    #[compio::test]
    async fn manifest_reads_from_file() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        write!(
            file,
            "caches:\n  - name: git\n    path: cache/git\ncipd_packages:\n  - package: infra/git\n    version: latest\n    path: bin\n"
        )
        .expect("Failed to write to temp file");

        let manifest = TaskManifest::from_path(file.path())
            .await
            .expect("Failed to read manifest");
        assert_eq!(
            manifest,
            TaskManifest {
                caches: vec![CacheEntry {
                    name: "git".into(),
                    path: "cache/git".into()
                }],
                cipd_packages: vec![CipdPackage {
                    package: "infra/git".into(),
                    version: "latest".into(),
                    path: "bin".into(),
                }],
            }
        );
    }

    #[compio::test]
    async fn manifest_rejects_invalid_utf8() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(&[0xff, 0xfe, 0x00])
            .expect("Failed to write to temp file");

        let result = TaskManifest::from_path(file.path()).await;
        assert!(matches!(result, Err(ManifestError::EncodingError { .. })));
    }

    #[test]
    fn manifest_returns_error_on_invalid_yaml() {
        let result: Result<TaskManifest, _> = "invalid: yaml: content: [unclosed".try_into();
        assert!(matches!(result, Err(ManifestError::ParseError { .. })));
    }

    #[test]
    fn manifest_returns_error_on_empty_file() {
        let result: Result<TaskManifest, _> = "".try_into();
        assert!(matches!(result, Err(ManifestError::MalformedManifest)));
    }

    #[rstest]
    #[case("- item1\n- item2")]
    #[case("just a string")]
    fn manifest_returns_error_when_top_level_is_not_map(#[case] contents: &str) {
        let result: Result<TaskManifest, _> = contents.try_into();
        assert!(matches!(result, Err(ManifestError::TopLevelNotMap)));
    }

    #[rstest]
    #[case("other: value")]
    #[case("caches:\ncipd_packages:")]
    #[case("caches: []\ncipd_packages: []")]
    fn manifest_handles_missing_or_empty_sections(#[case] contents: &str) {
        let manifest: TaskManifest = contents.try_into().expect("Failed to parse manifest");
        assert!(manifest.is_empty());
    }

    #[test]
    fn manifest_returns_error_when_section_is_not_list() {
        let result: Result<TaskManifest, _> = "caches:\n  name: git".try_into();
        assert!(matches!(
            result,
            Err(ManifestError::SectionNotList { section }) if section == "caches"
        ));
    }

    #[test]
    fn manifest_returns_error_when_entry_is_not_map() {
        let result: Result<TaskManifest, _> =
            "cipd_packages:\n  - package: a\n    version: b\n    path: c\n  - just text".try_into();
        assert!(matches!(
            result,
            Err(ManifestError::EntryNotMap { section, index: 1 }) if section == "cipd_packages"
        ));
    }

    #[rstest]
    #[case("caches:\n  - path: a", "caches", "name")]
    #[case("caches:\n  - name: a", "caches", "path")]
    #[case("caches:\n  - name: 12\n    path: a", "caches", "name")]
    #[case(
        "cipd_packages:\n  - package: a\n    path: b",
        "cipd_packages",
        "version"
    )]
    fn manifest_reports_missing_fields(
        #[case] contents: &str,
        #[case] expected_section: &str,
        #[case] expected_field: &str,
    ) {
        let result: Result<TaskManifest, _> = contents.try_into();
        match result {
            Err(ManifestError::MissingField {
                section,
                index,
                field,
            }) => {
                assert_eq!(section, expected_section);
                assert_eq!(index, 0);
                assert_eq!(field, expected_field);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn manifest_keeps_declaration_order() {
        let manifest: TaskManifest = r#"
caches:
  - name: b
    path: second
  - name: a
    path: first
"#
        .try_into()
        .expect("Failed to parse manifest");
        let names: Vec<_> = manifest.caches.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn manifest_accepts_unicode_and_templates() {
        let manifest: TaskManifest = r#"
cipd_packages:
  - package: "infra/tools/${platform}"
    version: "git_revision:deadbeef"
    path: "тест/bin"
"#
        .try_into()
        .expect("Failed to parse manifest");
        assert_eq!(manifest.cipd_packages[0].package, "infra/tools/${platform}");
        assert_eq!(manifest.cipd_packages[0].path, "тест/bin");
    }
}
