//! Discovery of API entries through the repository metadata descriptor.

use crate::config::{DOCUMENTATION_FILE, METADATA_FILES};
use crate::error::{CertifyError, Result};
use crate::model::{ApiEntry, Protocol};
use serde_yaml_ng::Value;
use std::path::{Path, PathBuf};

/// APIs and markdown files found in a repository root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    pub root_folder: PathBuf,
    /// Accepted entries, in metadata order
    pub apis: Vec<ApiEntry>,
    /// Markdown files looked up at the root
    pub markdowns: Vec<PathBuf>,
    /// Why entries were dropped or nothing was found
    pub diagnostics: Vec<String>,
}

impl RepositoryDescriptor {
    /// Discover APIs under `root` with the default documentation file name
    pub fn discover(root: &Path) -> Result<Self> {
        Self::discover_with(root, DOCUMENTATION_FILE)
    }

    /// Discover APIs under `root`, probing `markdown_file` for documentation.
    ///
    /// A missing descriptor yields zero APIs; an unparsable one is an error.
    pub fn discover_with(root: &Path, markdown_file: &str) -> Result<Self> {
        tracing::info!("Parsing repository at {}", root.display());
        let mut descriptor = Self {
            root_folder: root.to_path_buf(),
            ..Self::default()
        };

        match find_metadata(root) {
            Some(path) => {
                let metadata = load_metadata(&path)?;
                descriptor.collect_apis(&metadata, &path);
            }
            None => descriptor.note(format!(
                "No metadata descriptor ({}) found in {}",
                METADATA_FILES.join(" or "),
                root.display()
            )),
        }

        let readme = root.join(markdown_file);
        if readme.is_file() {
            tracing::debug!("Found markdown file {}", readme.display());
            descriptor.markdowns.push(readme);
        }

        if descriptor.apis.is_empty() {
            tracing::warn!("No valid APIs remain after discovery");
        } else {
            tracing::info!(
                "Discovered {} API(s): {}",
                descriptor.apis.len(),
                descriptor
                    .apis
                    .iter()
                    .map(|a| format!("{}/{}", a.display_name(), a.protocol))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        Ok(descriptor)
    }

    /// Documentation file to score, if one was found
    #[must_use]
    pub fn documentation_file(&self) -> Option<&Path> {
        self.markdowns.first().map(PathBuf::as_path)
    }

    fn note(&mut self, message: String) {
        tracing::warn!("{message}");
        self.diagnostics.push(message);
    }

    fn collect_apis(&mut self, metadata: &Value, path: &Path) {
        let Some(entries) = metadata.get("apis").and_then(Value::as_sequence) else {
            self.note(format!(
                "'apis' field missing or not a list in {}",
                path.display()
            ));
            return;
        };

        for (index, value) in entries.iter().enumerate() {
            match parse_entry(value, index) {
                Ok(entry) => self.apis.push(entry),
                Err(reason) => self.note(reason),
            }
        }
    }
}

fn find_metadata(root: &Path) -> Option<PathBuf> {
    METADATA_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

fn load_metadata(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| CertifyError::io(path, e))?;
    let value: Value = serde_yaml_ng::from_str(&content)
        .map_err(|e| CertifyError::metadata_parse(path, e.to_string()))?;
    // An empty document parses as null
    Ok(if value.is_null() {
        Value::Mapping(serde_yaml_ng::Mapping::new())
    } else {
        value
    })
}

/// Render a scalar YAML value as text (`version: 1.0` is a float)
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_entry(value: &Value, index: usize) -> std::result::Result<ApiEntry, String> {
    let label = || format!("Entry {}", index + 1);

    if !value.is_mapping() {
        return Err(format!("Skipping {}: not a mapping", label()));
    }

    let field = |key: &str| value.get(key).and_then(scalar_text);
    let name = field("name").unwrap_or_default();
    let shown = if name.is_empty() { label() } else { name.clone() };

    let protocol = match value.get("api-spec-type") {
        Some(Value::String(tag)) => Protocol::from_tag(tag).ok_or_else(|| {
            format!("Skipping API entry '{shown}': unsupported 'api-spec-type' ({tag})")
        })?,
        Some(other) => {
            return Err(format!(
                "Skipping API entry '{shown}': invalid 'api-spec-type' ({other:?})"
            ))
        }
        None => {
            return Err(format!(
                "Skipping API entry '{shown}': missing 'api-spec-type'"
            ))
        }
    };

    Ok(ApiEntry {
        name,
        version: field("version"),
        protocol,
        definition_path: field("definition-path").filter(|p| !p.is_empty()),
        definition_file: field("definition-file").filter(|f| !f.is_empty()),
    })
}
