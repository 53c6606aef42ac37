//! The transform pipeline: clean prior outputs, classify artifacts, copy
//! excluded ones verbatim, assemble and run the weaver invocation, route its
//! diagnostics into a pass/fail outcome.
//!
//! One run is single-threaded and synchronous; the weaver call is the sole
//! blocking point. Weaving is always full and from scratch: aspect and
//! ordinary bytecode are cross-woven, so a partial re-weave cannot be proven
//! correct. Concurrent runs against one output directory are the caller's
//! problem to serialize.

use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Instant;

use crate::ajc::Weaver;
use crate::artifact::{self, Artifact, ArtifactKind};
use crate::config::{WeaveConfig, resolve_java_runtime};
use crate::invocation::build_invocation;
use crate::output::OutputProvider;
use crate::report::{DiagnosticCounts, RunOutcome, route_diagnostics};
use crate::router;

/// Name of the woven-output slot downstream steps read from.
pub const MAIN_SLOT: &str = "main";

#[derive(Debug, Serialize)]
pub struct WeaveReport {
    pub woven_artifacts: usize,
    pub excluded_artifacts: usize,
    pub referenced_artifacts: usize,
    pub woven_classes: usize,
    pub diagnostics: DiagnosticCounts,
    pub output_dir: String,
    pub duration_ms: u64,
    pub skipped: bool,
}

pub struct WeaveTransform<'a> {
    config: WeaveConfig,
    weaver: &'a dyn Weaver,
    outputs: &'a dyn OutputProvider,
}

impl<'a> WeaveTransform<'a> {
    pub fn new(
        config: WeaveConfig,
        weaver: &'a dyn Weaver,
        outputs: &'a dyn OutputProvider,
    ) -> Self {
        Self {
            config,
            weaver,
            outputs,
        }
    }

    /// Run one full transform over the primary and referenced-only inputs.
    /// Returns the run summary, or the first fatal condition as an error.
    pub fn run(&self, primary: &[Artifact], referenced: &[Artifact]) -> Result<WeaveReport> {
        let start = Instant::now();
        self.outputs.clean()?;

        if !self.config.enabled {
            return self.pass_through(primary, referenced, start);
        }

        let routed = router::route(primary, referenced, &self.config.excludes, self.outputs)?;

        let main_dir = self
            .outputs
            .content_location(MAIN_SLOT, ArtifactKind::Directory);
        std::fs::create_dir_all(&main_dir)
            .with_context(|| format!("Failed to create output directory: {}", main_dir.display()))?;

        if routed.to_weave.is_empty() {
            tracing::info!(
                "nothing to weave; {} artifact(s) kept as classpath context",
                routed.classpath_only.len()
            );
            return Ok(WeaveReport {
                woven_artifacts: 0,
                excluded_artifacts: routed.excluded.len(),
                referenced_artifacts: referenced.len(),
                woven_classes: 0,
                diagnostics: DiagnosticCounts::default(),
                output_dir: main_dir.to_string_lossy().into_owned(),
                duration_ms: start.elapsed().as_millis() as u64,
                skipped: false,
            });
        }

        let woven_classes: usize = routed
            .to_weave
            .iter()
            .map(|a| artifact::class_count(a).unwrap_or(0))
            .sum();
        tracing::info!(
            "weaving {} classes from {} artifact(s), {} on classpath only",
            woven_classes,
            routed.to_weave.len(),
            routed.classpath_only.len()
        );

        let java_runtime = if self.config.java_runtime_required {
            resolve_java_runtime()
        } else {
            None
        };
        let spec = build_invocation(&routed, &self.config, java_runtime.as_deref(), main_dir.clone());

        let messages = self.weaver.weave(&spec)?;

        match route_diagnostics(&messages, self.config.verbose) {
            RunOutcome::Success(diagnostics) => Ok(WeaveReport {
                woven_artifacts: routed.to_weave.len(),
                excluded_artifacts: routed.excluded.len(),
                referenced_artifacts: referenced.len(),
                woven_classes,
                diagnostics,
                output_dir: main_dir.to_string_lossy().into_owned(),
                duration_ms: start.elapsed().as_millis() as u64,
                skipped: false,
            }),
            RunOutcome::Aborted { message, cause, .. } => {
                let error = match cause {
                    Some(cause) => anyhow::anyhow!("{cause}").context(message),
                    None => anyhow::anyhow!("{message}"),
                };
                Err(error.context("aspect weaving aborted"))
            }
        }
    }

    /// Disabled step: the slot contract still holds, so every primary
    /// artifact is forwarded verbatim to its own output location.
    fn pass_through(
        &self,
        primary: &[Artifact],
        referenced: &[Artifact],
        start: Instant,
    ) -> Result<WeaveReport> {
        tracing::info!(
            "aspect weaving disabled; forwarding {} artifact(s) verbatim",
            primary.len()
        );
        for artifact in primary {
            let dest = self
                .outputs
                .content_location(&router::copy_slot_name(artifact), artifact.kind);
            router::copy_artifact(artifact, &dest)?;
        }

        Ok(WeaveReport {
            woven_artifacts: 0,
            excluded_artifacts: 0,
            referenced_artifacts: referenced.len(),
            woven_classes: 0,
            diagnostics: DiagnosticCounts::default(),
            output_dir: String::new(),
            duration_ms: start.elapsed().as_millis() as u64,
            skipped: true,
        })
    }
}
