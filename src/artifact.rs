use anyhow::{Context, Result, bail};
use ignore::WalkBuilder;
use memmap2::Mmap;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use zip::ZipArchive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Directory,
    Archive,
}

/// One compiled input to the weave step: a directory of classes or an
/// archive. Read-only for the duration of a run.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,
    pub name: String,
    pub kind: ArtifactKind,
}

impl Artifact {
    pub fn from_path(path: &Path) -> Result<Self> {
        let path = std::path::absolute(path)
            .with_context(|| format!("Failed to resolve artifact path: {}", path.display()))?;
        let meta = std::fs::metadata(&path)
            .with_context(|| format!("Failed to stat artifact: {}", path.display()))?;

        if meta.is_dir() {
            let name = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("classes")
                .to_string();
            return Ok(Self {
                path,
                name,
                kind: ArtifactKind::Directory,
            });
        }

        let is_archive = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("jar") || e.eq_ignore_ascii_case("zip"));
        if !is_archive {
            bail!("Unsupported artifact (expected directory or jar): {}", path.display());
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("archive")
            .to_string();
        Ok(Self {
            path,
            name,
            kind: ArtifactKind::Archive,
        })
    }
}

/// Find every jar under `base_path`, sorted so discovery order is stable
/// across runs.
pub fn scan_archives(base_path: &Path) -> Result<Vec<PathBuf>> {
    let (tx, rx) = mpsc::channel();

    let walker = WalkBuilder::new(base_path)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build_parallel();

    walker.run(|| {
        let tx = tx.clone();
        Box::new(move |entry| {
            if let Ok(entry) = entry {
                let path = entry.path();
                if path.extension().is_some_and(|e| e == "jar") {
                    let _ = tx.send(path.to_path_buf());
                }
            }
            ignore::WalkState::Continue
        })
    });

    drop(tx);
    let mut jars: Vec<PathBuf> = rx.iter().collect();
    jars.sort();
    Ok(jars)
}

/// Count `.class` entries in an artifact, for the pre-weave summary log.
pub fn class_count(artifact: &Artifact) -> Result<usize> {
    match artifact.kind {
        ArtifactKind::Archive => archive_class_count(&artifact.path),
        ArtifactKind::Directory => directory_class_count(&artifact.path),
    }
}

fn archive_class_count(jar_path: &Path) -> Result<usize> {
    let file = File::open(jar_path)
        .with_context(|| format!("Failed to open jar: {}", jar_path.display()))?;
    // SAFETY: The file is opened read-only and remains valid for the lifetime of the mmap.
    // The mmap is dropped before the file, ensuring memory safety.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to mmap jar: {}", jar_path.display()))?;
    let archive = ZipArchive::new(Cursor::new(&mmap[..]))
        .with_context(|| format!("Failed to read zip structure: {}", jar_path.display()))?;

    let count = archive
        .file_names()
        .filter(|name| name.ends_with(".class"))
        .count();
    Ok(count)
}

fn directory_class_count(dir: &Path) -> Result<usize> {
    let mut count = 0usize;
    for entry in WalkBuilder::new(dir)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build()
    {
        let entry = entry?;
        if entry.path().extension().is_some_and(|e| e == "class") {
            count += 1;
        }
    }
    Ok(count)
}
