use std::fmt;

/// Message levels the weaver emits, weakest first. `WeaveInfo` is the
/// join-point chatter produced by `-showWeaveInfo` and sits below `Debug`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    WeaveInfo,
    Debug,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "abort" | "fail" | "error" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "info" | "note" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "weaveinfo" => Some(Self::WeaveInfo),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WeaveInfo => "weaveinfo",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub text: String,
    pub cause: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
            cause: None,
        }
    }

    pub fn with_cause(severity: Severity, text: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
            cause: Some(cause.into()),
        }
    }
}

/// Parse the weaver's console stream into diagnostics, in emission order.
///
/// Recognizes both the bracketed form the compiler uses for located
/// messages (`Foo.java:12 [error] ...`) and bare kind prefixes
/// (`weaveinfo Join point ...`). Lines carrying no kind prefix are folded
/// into the preceding message; leading unprefixed lines (version banner)
/// become weaveinfo messages of their own.
pub fn parse_messages(output: &str) -> Vec<Diagnostic> {
    let normalized = output.replace("\r\n", "\n");
    let mut messages: Vec<Diagnostic> = Vec::new();

    for line in normalized.lines() {
        let trimmed = line.trim_end();
        if trimmed.trim().is_empty() {
            continue;
        }

        if let Some((severity, text)) = split_severity(trimmed) {
            messages.push(Diagnostic::new(severity, text));
        } else if let Some(last) = messages.last_mut() {
            last.text.push('\n');
            last.text.push_str(trimmed.trim_start());
        } else {
            messages.push(Diagnostic::new(Severity::WeaveInfo, trimmed.trim()));
        }
    }

    messages
}

fn split_severity(line: &str) -> Option<(Severity, String)> {
    let trimmed = line.trim_start();

    if let Some(open) = trimmed.find('[')
        && let Some(close) = trimmed[open..].find(']')
        && let Some(severity) = Severity::from_token(&trimmed[open + 1..open + close])
    {
        let locus = trimmed[..open].trim();
        let rest = trimmed[open + close + 1..].trim();
        let text = match (locus.is_empty(), rest.is_empty()) {
            (true, _) => rest.to_string(),
            (false, true) => locus.to_string(),
            (false, false) => format!("{locus}: {rest}"),
        };
        return Some((severity, text));
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let head = parts.next()?.trim_end_matches(':');
    let severity = Severity::from_token(head)?;
    Some((severity, parts.next().unwrap_or("").trim().to_string()))
}
