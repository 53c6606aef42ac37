use serde::Serialize;

use crate::diagnostic::{Diagnostic, Severity};

/// Per-severity tallies for the run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticCounts {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub debugs: usize,
    pub weave_infos: usize,
}

impl DiagnosticCounts {
    fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Info => self.infos += 1,
            Severity::Debug => self.debugs += 1,
            Severity::WeaveInfo => self.weave_infos += 1,
        }
    }
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    Success(DiagnosticCounts),
    Aborted {
        message: String,
        cause: Option<String>,
        counts: DiagnosticCounts,
    },
}

/// Dispatch the weaver's messages to the log, in emission order, and decide
/// the run's outcome.
///
/// First error wins, but everything is logged: an error marks the run
/// failed while the remaining messages are still drained so the operator
/// sees full context. With `verbose` set, severity handling is skipped
/// entirely and every message is surfaced at info visibility, trading
/// precision for completeness.
pub fn route_diagnostics(messages: &[Diagnostic], verbose: bool) -> RunOutcome {
    let mut counts = DiagnosticCounts::default();
    let mut first_error: Option<&Diagnostic> = None;

    for message in messages {
        counts.record(message.severity);

        if verbose {
            tracing::info!("{}", message.text);
            continue;
        }

        match message.severity {
            s if s >= Severity::Error => {
                match &message.cause {
                    Some(cause) => tracing::error!("{} (caused by: {})", message.text, cause),
                    None => tracing::error!("{}", message.text),
                }
                if first_error.is_none() {
                    first_error = Some(message);
                }
            }
            Severity::Warning => tracing::warn!("{}", message.text),
            Severity::Info | Severity::Debug => tracing::info!("{}", message.text),
            _ => tracing::trace!("{}", message.text),
        }
    }

    match first_error {
        Some(error) => RunOutcome::Aborted {
            message: error.text.clone(),
            cause: error.cause.clone(),
            counts,
        },
        None => RunOutcome::Success(counts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(severity: Severity, text: &str) -> Diagnostic {
        Diagnostic::new(severity, text)
    }

    #[test]
    fn error_aborts_with_first_error_as_root_cause_after_draining_all() {
        let messages = vec![
            message(Severity::Error, "can't determine superclass"),
            message(Severity::Warning, "unmatched pointcut"),
            message(Severity::Warning, "advice not applied"),
            message(Severity::Debug, "weaver state reset"),
        ];

        match route_diagnostics(&messages, false) {
            RunOutcome::Aborted { message, counts, .. } => {
                assert_eq!(message, "can't determine superclass");
                // Every message was drained, not just the fatal one.
                assert_eq!(counts.errors, 1);
                assert_eq!(counts.warnings, 2);
                assert_eq!(counts.debugs, 1);
            }
            RunOutcome::Success(_) => panic!("error must abort the run"),
        }
    }

    #[test]
    fn first_of_several_errors_is_the_reported_one() {
        let messages = vec![
            Diagnostic::with_cause(Severity::Error, "first failure", "root cause"),
            message(Severity::Error, "second failure"),
        ];

        match route_diagnostics(&messages, false) {
            RunOutcome::Aborted { message, cause, counts } => {
                assert_eq!(message, "first failure");
                assert_eq!(cause.as_deref(), Some("root cause"));
                assert_eq!(counts.errors, 2);
            }
            RunOutcome::Success(_) => panic!("errors must abort the run"),
        }
    }

    #[test]
    fn warnings_and_below_do_not_abort() {
        let messages = vec![
            message(Severity::WeaveInfo, "join point woven"),
            message(Severity::Debug, "cache miss"),
            message(Severity::Info, "weaving 12 classes"),
            message(Severity::Warning, "advice not applied"),
        ];

        match route_diagnostics(&messages, false) {
            RunOutcome::Success(counts) => {
                assert_eq!(counts.warnings, 1);
                assert_eq!(counts.infos, 1);
                assert_eq!(counts.debugs, 1);
                assert_eq!(counts.weave_infos, 1);
                assert_eq!(counts.errors, 0);
            }
            RunOutcome::Aborted { .. } => panic!("no error was emitted"),
        }
    }

    #[test]
    fn verbose_mode_skips_severity_handling() {
        let messages = vec![
            message(Severity::Error, "would normally abort"),
            message(Severity::WeaveInfo, "join point woven"),
        ];

        match route_diagnostics(&messages, true) {
            RunOutcome::Success(counts) => assert_eq!(counts.errors, 1),
            RunOutcome::Aborted { .. } => panic!("verbose mode is a debug override"),
        }
    }

    #[test]
    fn empty_message_list_is_a_success() {
        match route_diagnostics(&[], false) {
            RunOutcome::Success(counts) => assert_eq!(counts, DiagnosticCounts::default()),
            RunOutcome::Aborted { .. } => panic!("nothing to abort on"),
        }
    }
}
