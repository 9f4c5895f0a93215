//! Interval evaluation tree error types
//!
//! Error codes:
//! - AERO_IET_MISSING_BINDING (REJECT)
//! - AERO_IET_BINDING_MISMATCH (REJECT)

use std::fmt;

use super::node::{EvalOp, InputParamId};

/// Severity levels for evaluation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The evaluation is rejected; the cached recipe itself stays valid
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IetErrorCode {
    /// An Eval node references a slot with no bound value
    AeroIetMissingBinding,
    /// The bound value has the wrong shape for the operator
    AeroIetBindingMismatch,
}

impl IetErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            IetErrorCode::AeroIetMissingBinding => "AERO_IET_MISSING_BINDING",
            IetErrorCode::AeroIetBindingMismatch => "AERO_IET_BINDING_MISMATCH",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for IetErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error raised while evaluating a tree against parameter bindings.
#[derive(Debug, Clone)]
pub struct IetError {
    code: IetErrorCode,
    message: String,
    param: Option<InputParamId>,
}

impl IetError {
    pub fn missing_binding(param: InputParamId) -> Self {
        Self {
            code: IetErrorCode::AeroIetMissingBinding,
            message: format!("No value bound to input parameter #{}", param),
            param: Some(param),
        }
    }

    pub fn binding_mismatch(op: EvalOp, param: InputParamId, expected: &str) -> Self {
        Self {
            code: IetErrorCode::AeroIetBindingMismatch,
            message: format!(
                "Input parameter #{} bound for {} must be {}",
                param, op, expected
            ),
            param: Some(param),
        }
    }

    pub fn code(&self) -> IetErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The slot that failed, if known
    pub fn param(&self) -> Option<InputParamId> {
        self.param
    }
}

impl fmt::Display for IetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for IetError {}

pub type IetResult<T> = Result<T, IetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            IetErrorCode::AeroIetMissingBinding.code(),
            "AERO_IET_MISSING_BINDING"
        );
        assert_eq!(
            IetErrorCode::AeroIetBindingMismatch.code(),
            "AERO_IET_BINDING_MISMATCH"
        );
    }

    #[test]
    fn test_display_names_slot() {
        let err = IetError::missing_binding(3);
        let display = err.to_string();
        assert!(display.starts_with("[REJECT] AERO_IET_MISSING_BINDING"));
        assert!(display.contains("#3"));
        assert_eq!(err.param(), Some(3));
    }
}
