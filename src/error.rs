use thiserror::Error;

/// Errors surfaced by the public boolean-operation API.
///
/// Most geometric degeneracies described in the crate's design notes are
/// absorbed internally (logged, not returned) — this enum only covers the
/// two classes that genuinely stop the operation from producing a result:
/// a structural precondition violated up front, and the tracer's bounded
/// iteration budget being exhausted.
#[derive(Debug, Error)]
pub enum BooleanOpError {
	#[error("open path operands are only supported by subtract/intersect against a closed operand")]
	UnsupportedOpenPath,

	#[error("boolean operation failed to terminate within the tracer's iteration budget")]
	TracerDidNotTerminate,
}

pub type Result<T> = std::result::Result<T, BooleanOpError>;
