use anyhow::{Context, Result};
use ignore::WalkBuilder;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::artifact::{Artifact, ArtifactKind};
use crate::exclude::{ExcludeRule, is_excluded};
use crate::output::OutputProvider;

/// An excluded primary artifact together with the output slot its verbatim
/// copy landed in.
#[derive(Debug, Clone)]
pub struct ExcludedCopy {
    pub artifact: Artifact,
    pub copied_to: PathBuf,
}

/// Result of classification: every primary artifact is in exactly one of
/// `to_weave` or `classpath_only`; referenced-only artifacts are always in
/// `classpath_only`.
#[derive(Debug, Clone, Default)]
pub struct RoutedArtifacts {
    pub to_weave: Vec<Artifact>,
    pub classpath_only: Vec<Artifact>,
    pub excluded: Vec<ExcludedCopy>,
}

/// Partition primary and referenced-only artifacts, copying excluded
/// primaries verbatim into their output slots. Iteration order is the
/// caller's supply order, so repeated runs route identically.
pub fn route(
    primary: &[Artifact],
    referenced: &[Artifact],
    rules: &[ExcludeRule],
    outputs: &dyn OutputProvider,
) -> Result<RoutedArtifacts> {
    let mut routed = RoutedArtifacts::default();

    for artifact in referenced {
        routed.classpath_only.push(artifact.clone());
    }

    for artifact in primary {
        if !is_excluded(&artifact.path, rules) {
            routed.to_weave.push(artifact.clone());
            continue;
        }

        let copied_to = outputs.content_location(&copy_slot_name(artifact), artifact.kind);
        copy_artifact(artifact, &copied_to)?;
        tracing::debug!(
            "excluded from weaving: {} -> {}",
            artifact.path.display(),
            copied_to.display()
        );
        routed.classpath_only.push(artifact.clone());
        routed.excluded.push(ExcludedCopy {
            artifact: artifact.clone(),
            copied_to,
        });
    }

    if !rules.is_empty() && routed.excluded.is_empty() {
        tracing::debug!("exclude rules are configured but matched no artifact");
    }

    Ok(routed)
}

/// Deterministic collision-free slot name for a verbatim artifact copy.
pub(crate) fn copy_slot_name(artifact: &Artifact) -> String {
    format!("{}-{}", artifact.name, path_hash(&artifact.path))
}

fn path_hash(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}

pub(crate) fn copy_artifact(artifact: &Artifact, dest: &Path) -> Result<()> {
    match artifact.kind {
        ArtifactKind::Archive => {
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            std::fs::copy(&artifact.path, dest).with_context(|| {
                format!(
                    "Failed to copy excluded archive: {} -> {}",
                    artifact.path.display(),
                    dest.display()
                )
            })?;
        }
        ArtifactKind::Directory => copy_dir_recursive(&artifact.path, dest)?,
    }
    Ok(())
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create directory: {}", dest.display()))?;

    for entry in WalkBuilder::new(src)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build()
    {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src)?;
        if rel.as_os_str().is_empty() {
            continue;
        }
        let target = dest.join(rel);
        if entry.path().is_dir() {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create directory: {}", target.display()))?;
        } else {
            std::fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "Failed to copy excluded file: {} -> {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::DirOutputProvider;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
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

    fn rule(group: &str, module: &str) -> ExcludeRule {
        ExcludeRule {
            group: group.to_string(),
            module: module.to_string(),
        }
    }

    fn jar_artifact(path: &Path) -> Result<Artifact> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, b"stub jar bytes")?;
        Artifact::from_path(path)
    }

    #[test]
    fn no_matching_rules_routes_all_primaries_to_weave() -> Result<()> {
        let base = temp_dir("route_none");
        let outputs = DirOutputProvider::new(base.join("out"));
        outputs.clean()?;

        let a = jar_artifact(&base.join("app/classes/app.jar"))?;
        let b = jar_artifact(&base.join("lib/util.jar"))?;
        let referenced = jar_artifact(&base.join("ref/android-support.jar"))?;

        let routed = route(
            &[a.clone(), b.clone()],
            &[referenced.clone()],
            &[rule("com.example", "absent")],
            &outputs,
        )?;

        assert_eq!(routed.to_weave.len(), 2);
        assert!(routed.excluded.is_empty());
        assert_eq!(routed.classpath_only.len(), 1);
        assert_eq!(routed.classpath_only[0].path, referenced.path);

        let _ = std::fs::remove_dir_all(base);
        Ok(())
    }

    #[test]
    fn matching_primary_is_copied_and_kept_on_classpath() -> Result<()> {
        let base = temp_dir("route_excluded");
        let outputs = DirOutputProvider::new(base.join("out"));
        outputs.clean()?;

        let kept = jar_artifact(&base.join("caches/org.example/app/1.0/app.jar"))?;
        let dropped = jar_artifact(&base.join("caches/com.squareup.okhttp3/okhttp/4.12.0/okhttp.jar"))?;

        let routed = route(
            &[kept.clone(), dropped.clone()],
            &[],
            &[rule("com.squareup.okhttp3", "okhttp")],
            &outputs,
        )?;

        assert_eq!(routed.to_weave.len(), 1);
        assert_eq!(routed.to_weave[0].path, kept.path);
        assert_eq!(routed.classpath_only.len(), 1);
        assert_eq!(routed.classpath_only[0].path, dropped.path);
        assert_eq!(routed.excluded.len(), 1);

        let copy = &routed.excluded[0].copied_to;
        assert!(copy.exists());
        assert_eq!(std::fs::read(copy)?, std::fs::read(&dropped.path)?);

        let _ = std::fs::remove_dir_all(base);
        Ok(())
    }

    #[test]
    fn excluded_directory_is_copied_recursively() -> Result<()> {
        let base = temp_dir("route_dir_copy");
        let outputs = DirOutputProvider::new(base.join("out"));
        outputs.clean()?;

        let dir = base.join("caches/com.squareup.okhttp3/okhttp/classes");
        std::fs::create_dir_all(dir.join("okhttp3/internal"))?;
        std::fs::write(dir.join("okhttp3/OkHttpClient.class"), b"a")?;
        std::fs::write(dir.join("okhttp3/internal/Util.class"), b"b")?;
        let artifact = Artifact::from_path(&dir)?;

        let routed = route(
            &[artifact],
            &[],
            &[rule("com.squareup.okhttp3", "okhttp")],
            &outputs,
        )?;

        let copy = &routed.excluded[0].copied_to;
        assert!(copy.join("okhttp3/OkHttpClient.class").exists());
        assert!(copy.join("okhttp3/internal/Util.class").exists());

        let _ = std::fs::remove_dir_all(base);
        Ok(())
    }

    #[test]
    fn copy_slot_names_are_deterministic_and_collision_free() -> Result<()> {
        let base = temp_dir("route_naming");
        let outputs = DirOutputProvider::new(base.join("out"));

        let first = jar_artifact(&base.join("one/com.squareup.okhttp3/okhttp/okhttp.jar"))?;
        let second = jar_artifact(&base.join("two/com.squareup.okhttp3/okhttp/okhttp.jar"))?;
        let rules = [rule("com.squareup.okhttp3", "okhttp")];

        outputs.clean()?;
        let run_a = route(&[first.clone(), second.clone()], &[], &rules, &outputs)?;
        outputs.clean()?;
        let run_b = route(&[first, second], &[], &rules, &outputs)?;

        let names_a: Vec<_> = run_a.excluded.iter().map(|e| e.copied_to.clone()).collect();
        let names_b: Vec<_> = run_b.excluded.iter().map(|e| e.copied_to.clone()).collect();
        assert_eq!(names_a, names_b);
        assert_ne!(names_a[0], names_a[1]);

        let _ = std::fs::remove_dir_all(base);
        Ok(())
    }
}
