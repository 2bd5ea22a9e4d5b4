use serde::Serialize;
use std::fmt;
use time::OffsetDateTime;

/// Non-fatal event reported on the store's diagnostic channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub at: OffsetDateTime,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Payload key without a descriptor; the rest of the object was built.
    UnknownField { object: u8, field: String },
    ReadFailure {
        object: u8,
        reason: String,
        /// Previous subtree kept as stale
        carried_over: bool,
    },
    WriteFailure {
        object: u8,
        offset: u8,
        field: String,
        requested: i64,
        reason: String,
    },
}

impl Diagnostic {
    pub fn now(kind: DiagnosticKind) -> Self {
        Self {
            at: OffsetDateTime::now_utc(),
            kind,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::UnknownField { object, field } => {
                write!(f, "T{object}: unknown field {field}")
            }
            DiagnosticKind::ReadFailure {
                object,
                reason,
                carried_over,
            } => {
                write!(f, "T{object}: read failed: {reason}")?;
                if *carried_over {
                    write!(f, " (showing previous values)")?;
                }
                Ok(())
            }
            DiagnosticKind::WriteFailure {
                object,
                offset,
                field,
                requested,
                reason,
            } => write!(
                f,
                "T{object}.{field}: write of {requested} at offset {offset} failed: {reason}"
            ),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}
