use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;

use crate::diagnostic::{Diagnostic, Severity, parse_messages};
use crate::invocation::InvocationSpec;

fn java_command(args: &[String]) -> Result<std::process::Output> {
    let java_bin = std::env::var("ASPECT_WEAVE_JAVA").unwrap_or_else(|_| "java".to_string());

    #[cfg(windows)]
    {
        let lower = java_bin.to_ascii_lowercase();
        if lower.ends_with(".cmd") || lower.ends_with(".bat") {
            return Command::new("cmd")
                .arg("/C")
                .arg(&java_bin)
                .args(args)
                .output()
                .context("Failed to execute java (ensure JRE/JDK is installed)");
        }
    }

    Command::new(&java_bin)
        .args(args)
        .output()
        .context("Failed to execute java (ensure JRE/JDK is installed)")
}

/// The weaving compiler behind an interface: one synchronous run mapping an
/// invocation to its message stream. Lets tests substitute a fake.
pub trait Weaver {
    fn weave(&self, spec: &InvocationSpec) -> Result<Vec<Diagnostic>>;
}

#[derive(Debug, Clone)]
pub struct Ajc {
    tools_jar: PathBuf,
}

impl Ajc {
    pub fn new(tools_jar: PathBuf) -> Self {
        Self { tools_jar }
    }
}

impl Weaver for Ajc {
    /// Blocks for the tool's full run; no timeout, no retry. Every emitted
    /// message is captured unfiltered; severity policy lives downstream.
    fn weave(&self, spec: &InvocationSpec) -> Result<Vec<Diagnostic>> {
        let mut args = vec![
            "-jar".to_string(),
            self.tools_jar
                .to_str()
                .context("aspectjtools.jar path is not valid UTF-8")?
                .to_string(),
        ];
        args.extend(spec.to_args());

        let output = java_command(&args)?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut messages = parse_messages(&stdout);
        messages.extend(parse_messages(&stderr));

        // A crash that never produced an error message must still surface
        // through the diagnostic channel.
        if !output.status.success()
            && !messages.iter().any(|m| m.severity >= Severity::Error)
        {
            let text = format!("weaver exited with {}", output.status);
            let cause = stderr.trim();
            messages.push(if cause.is_empty() {
                Diagnostic::new(Severity::Error, text)
            } else {
                Diagnostic::with_cause(Severity::Error, text, cause)
            });
        }

        Ok(messages)
    }
}
