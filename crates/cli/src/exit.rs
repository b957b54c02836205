//! Mapping of failures to process exit codes

use std::process::ExitCode;
use tenderhub_workflow::{ErrorKind, WorkflowError};

pub fn code_for(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::InvalidUser => 2,
        ErrorKind::Forbidden => 3,
        ErrorKind::NotFound => 4,
        ErrorKind::NoVersion => 5,
        ErrorKind::Finalized => 6,
        ErrorKind::QuorumNotReached => 7,
    }
}

/// Print the failure and pick the exit code.
///
/// Workflow refusals get their own codes; anything else is internal and
/// logged with its full chain.
pub fn report(err: &anyhow::Error) -> ExitCode {
    let kind = err
        .downcast_ref::<WorkflowError>()
        .map(WorkflowError::kind)
        .unwrap_or(ErrorKind::Internal);

    if kind == ErrorKind::Internal {
        tracing::error!(error = %format!("{:#}", err), "Command failed");
    }
    eprintln!(
        "{}",
        serde_json::json!({ "error": kind.as_str(), "reason": err.to_string() })
    );
    ExitCode::from(code_for(kind))
}
