use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::artifact::ArtifactKind;

/// Hands out collision-free output slots for the transform's products: the
/// woven `main` directory and the verbatim copies of excluded artifacts.
/// Content type (class bytecode) and scope (full project closure) are fixed
/// for this step, so a slot is addressed by `(name, kind)` alone.
pub trait OutputProvider {
    fn content_location(&self, name: &str, kind: ArtifactKind) -> PathBuf;

    /// Remove every previously produced output. The step always starts from
    /// a clean slate; a stale slot would alias freshly woven bytecode.
    fn clean(&self) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct DirOutputProvider {
    root: PathBuf,
}

impl DirOutputProvider {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl OutputProvider for DirOutputProvider {
    fn content_location(&self, name: &str, kind: ArtifactKind) -> PathBuf {
        match kind {
            ArtifactKind::Directory => self.root.join(name),
            ArtifactKind::Archive => self.root.join(format!("{name}.jar")),
        }
    }

    fn clean(&self) -> Result<()> {
        if self.root.exists() {
            std::fs::remove_dir_all(&self.root)
                .with_context(|| format!("Failed to clean output directory: {}", self.root.display()))?;
        }
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create output directory: {}", self.root.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_root(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "aspect_weave_test_{}_{}_{}",
            std::process::id(),
            nanos,
            name
        ))
    }

    #[test]
    fn slots_are_distinct_per_name_and_kind() {
        let provider = DirOutputProvider::new(PathBuf::from("/out"));
        let main = provider.content_location("main", ArtifactKind::Directory);
        let copy = provider.content_location("okhttp-abc123", ArtifactKind::Archive);
        assert_eq!(main, PathBuf::from("/out/main"));
        assert_eq!(copy, PathBuf::from("/out/okhttp-abc123.jar"));
        assert_ne!(
            provider.content_location("main", ArtifactKind::Directory),
            provider.content_location("main", ArtifactKind::Archive)
        );
    }

    #[test]
    fn clean_drops_stale_outputs_and_recreates_root() -> Result<()> {
        let root = temp_root("clean");
        std::fs::create_dir_all(root.join("main"))?;
        std::fs::write(root.join("main/Stale.class"), b"old")?;

        let provider = DirOutputProvider::new(root.clone());
        provider.clean()?;

        assert!(root.exists());
        assert!(!root.join("main").exists());

        let _ = std::fs::remove_dir_all(root);
        Ok(())
    }
}
