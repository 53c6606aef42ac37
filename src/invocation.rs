use std::path::{Path, PathBuf};

use crate::config::WeaveConfig;
use crate::router::RoutedArtifacts;

/// Separator for in-string path lists, matching what the JVM-side tool
/// expects on the platform.
pub const PATH_LIST_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// The fully assembled weaver argument set. `inpath` holds only
/// non-excluded primary artifacts; `classpath` holds referenced-only and
/// excluded artifacts plus, conditionally, the Java runtime library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSpec {
    pub source_level: String,
    pub target_level: String,
    pub encoding: String,
    pub inpath: String,
    pub classpath: String,
    pub bootclasspath: String,
    pub output_dir: PathBuf,
}

impl InvocationSpec {
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-source".to_string(),
            self.source_level.clone(),
            "-target".to_string(),
            self.target_level.clone(),
            "-showWeaveInfo".to_string(),
            "-encoding".to_string(),
            self.encoding.clone(),
            "-inpath".to_string(),
            self.inpath.clone(),
            "-d".to_string(),
            self.output_dir.to_string_lossy().into_owned(),
            "-bootclasspath".to_string(),
            self.bootclasspath.clone(),
        ];
        // An empty -classpath would hand the tool an empty-string option.
        if !self.classpath.is_empty() {
            args.push("-classpath".to_string());
            args.push(self.classpath.clone());
        }
        args
    }
}

/// Derive the weaver invocation from the routed artifact sets. Path lists
/// keep the supply order of their artifacts, so identical inputs produce
/// byte-identical strings.
pub fn build_invocation(
    routed: &RoutedArtifacts,
    config: &WeaveConfig,
    java_runtime: Option<&Path>,
    output_dir: PathBuf,
) -> InvocationSpec {
    let inpath = join_paths(routed.to_weave.iter().map(|a| a.path.as_path()));

    let mut classpath_entries: Vec<String> = routed
        .classpath_only
        .iter()
        .map(|a| a.path.to_string_lossy().into_owned())
        .collect();
    if config.java_runtime_required {
        match java_runtime {
            Some(rt) => classpath_entries.push(rt.to_string_lossy().into_owned()),
            None => tracing::error!(
                "java runtime classpath entry is required but could not be resolved; \
                 weaving without it"
            ),
        }
    }
    let classpath = classpath_entries.join(&PATH_LIST_SEPARATOR.to_string());

    let bootclasspath = join_paths(config.bootclasspath.iter().map(PathBuf::as_path));

    InvocationSpec {
        source_level: config.source_level.clone(),
        target_level: config.target_level.clone(),
        encoding: config.encoding.clone(),
        inpath,
        classpath,
        bootclasspath,
        output_dir,
    }
}

fn join_paths<'a>(paths: impl Iterator<Item = &'a Path>) -> String {
    paths
        .map(|p| p.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(&PATH_LIST_SEPARATOR.to_string())
}
