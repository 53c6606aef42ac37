use serde::{Deserialize, Serialize};
use std::path::Path;

/// A `(group, module)` pair naming a dependency to keep out of weaving.
/// Matched as a path fragment, so `com.squareup.okhttp3` + `okhttp` hits any
/// artifact resolved out of that module's cache directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludeRule {
    pub group: String,
    pub module: String,
}

impl ExcludeRule {
    pub fn path_fragment(&self) -> String {
        Path::new(&self.group)
            .join(&self.module)
            .to_string_lossy()
            .into_owned()
    }
}

/// True when any rule's fragment occurs in the artifact's absolute path.
/// First match wins; an empty rule list excludes nothing.
pub fn is_excluded(artifact_path: &Path, rules: &[ExcludeRule]) -> bool {
    let haystack = artifact_path.to_string_lossy();
    rules
        .iter()
        .any(|rule| haystack.contains(rule.path_fragment().as_str()))
}
