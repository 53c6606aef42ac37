use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::exclude::ExcludeRule;

/// Resolved configuration for one transform run. Loaded once, never mutated
/// afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeaveConfig {
    pub enabled: bool,
    pub verbose: bool,
    pub java_runtime_required: bool,
    pub source_level: String,
    pub target_level: String,
    pub encoding: String,
    pub excludes: Vec<ExcludeRule>,
    pub bootclasspath: Vec<PathBuf>,
}

impl Default for WeaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            verbose: false,
            java_runtime_required: false,
            source_level: "1.8".to_string(),
            target_level: "1.8".to_string(),
            encoding: "UTF-8".to_string(),
            excludes: Vec::new(),
            bootclasspath: Vec::new(),
        }
    }
}

impl WeaveConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

pub fn resolve_ajc_path(cli_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(p) = cli_override {
        return Ok(p);
    }

    if let Ok(p) = env::var("ASPECTJ_TOOLS_JAR") {
        return Ok(PathBuf::from(p));
    }

    let default_path = aspect_weave_home()?.join("tools").join("aspectjtools.jar");
    if default_path.exists() {
        return Ok(default_path);
    }

    install_ajc_if_missing(&default_path)?;
    Ok(default_path)
}

/// Locate the Java runtime library to append to the weaver classpath.
/// Returns None when no candidate exists; the caller logs and proceeds.
pub fn resolve_java_runtime() -> Option<PathBuf> {
    if let Ok(p) = env::var("ASPECT_WEAVE_JAVA_RT") {
        let path = PathBuf::from(p);
        return path.exists().then_some(path);
    }

    let java_home = env::var("JAVA_HOME").ok()?;
    let home = Path::new(&java_home);
    // rt.jar up to JDK 8, jrt-fs.jar from JDK 9 on.
    for candidate in ["jre/lib/rt.jar", "lib/rt.jar", "lib/jrt-fs.jar"] {
        let path = home.join(candidate);
        if path.exists() {
            return Some(path);
        }
    }
    None
}

fn aspect_weave_home() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(dirs::cache_dir)
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow::anyhow!("Failed to resolve data directory"))?;
    Ok(base.join("aspect-weave"))
}

fn install_ajc_if_missing(target_path: &Path) -> Result<()> {
    if target_path.exists() {
        return Ok(());
    }

    let url =
        "https://repo1.maven.org/maven2/org/aspectj/aspectjtools/1.9.22.1/aspectjtools-1.9.22.1.jar";
    if let Some(parent) = target_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    tracing::info!(
        "aspectjtools.jar not found, downloading to {}",
        target_path.display()
    );
    let status = std::process::Command::new("curl")
        .args([
            "-L",
            "--fail",
            "--silent",
            "--show-error",
            "-o",
            target_path
                .to_str()
                .context("aspectjtools.jar target path is not valid UTF-8")?,
            url,
        ])
        .status()
        .context(
            "Failed to execute curl (ensure curl is installed, or use --ajc to specify aspectjtools.jar)",
        )?;

    if !status.success() {
        if cfg!(windows) {
            let ps_status = std::process::Command::new("powershell")
                .args([
                    "-NoProfile",
                    "-ExecutionPolicy",
                    "Bypass",
                    "-Command",
                    &format!(
                        "Invoke-WebRequest -Uri '{url}' -OutFile '{}'",
                        target_path.display()
                    ),
                ])
                .status();

            if let Ok(s) = ps_status
                && s.success()
            {
                return Ok(());
            }
        }

        anyhow::bail!("Failed to download aspectjtools. You can use --ajc to specify a local jar");
    }

    Ok(())
}
