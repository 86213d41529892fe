use crate::DType;
use thiserror::Error;

/// Errors raised while planning or executing a reduction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    /// A precondition on the operator's configuration did not hold
    #[error("Configuration error in operation '{operation}': {reason}")]
    Configuration { operation: String, reason: String },

    #[error("Invalid axis {axis} in operation '{operation}' for tensor with {ndim} dimensions")]
    InvalidAxis {
        operation: String,
        axis: i64,
        ndim: usize,
    },

    #[error("Invalid argument in operation '{operation}': {reason}")]
    InvalidArgument { operation: String, reason: String },

    #[error("Invalid shape in operation '{operation}': {reason}")]
    InvalidShape {
        operation: String,
        reason: String,
        shape: Option<Vec<usize>>,
    },

    #[error("Data type mismatch in operation '{operation}': expected {expected}, got {got}")]
    DTypeMismatch {
        operation: String,
        expected: DType,
        got: DType,
    },

    #[error("Memory allocation failed in operation '{operation}': {details}")]
    AllocationError {
        operation: String,
        details: String,
        requested_bytes: Option<usize>,
        available_bytes: Option<usize>,
    },

    #[error("Operation '{operation}' not supported: {reason}")]
    UnsupportedOperation { operation: String, reason: String },
}

impl TensorError {
    /// Create a configuration error, the equivalent of a failed `require_true!`
    pub fn configuration(operation: &str, reason: &str) -> Self {
        Self::Configuration {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_axis(operation: &str, axis: i64, ndim: usize) -> Self {
        Self::InvalidAxis {
            operation: operation.to_string(),
            axis,
            ndim,
        }
    }

    /// Create an invalid argument error with operation context
    pub fn invalid_argument_op(operation: &str, reason: &str) -> Self {
        Self::InvalidArgument {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid shape error carrying the offending dimensions
    pub fn invalid_shape(operation: &str, reason: &str, shape: Option<&[usize]>) -> Self {
        Self::InvalidShape {
            operation: operation.to_string(),
            reason: reason.to_string(),
            shape: shape.map(|s| s.to_vec()),
        }
    }

    pub fn dtype_mismatch(operation: &str, expected: DType, got: DType) -> Self {
        Self::DTypeMismatch {
            operation: operation.to_string(),
            expected,
            got,
        }
    }

    /// Create an allocation error with memory information
    pub fn allocation_error(
        operation: &str,
        details: &str,
        requested: Option<usize>,
        available: Option<usize>,
    ) -> Self {
        Self::AllocationError {
            operation: operation.to_string(),
            details: details.to_string(),
            requested_bytes: requested,
            available_bytes: available,
        }
    }

    pub fn unsupported_operation(operation: &str, reason: &str) -> Self {
        Self::UnsupportedOperation {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Get the operation name for this error
    pub fn operation(&self) -> &str {
        match self {
            Self::Configuration { operation, .. } => operation,
            Self::InvalidAxis { operation, .. } => operation,
            Self::InvalidArgument { operation, .. } => operation,
            Self::InvalidShape { operation, .. } => operation,
            Self::DTypeMismatch { operation, .. } => operation,
            Self::AllocationError { operation, .. } => operation,
            Self::UnsupportedOperation { operation, .. } => operation,
        }
    }

    /// True for errors caused by the caller's arguments rather than by resources
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::InvalidAxis { .. } | Self::InvalidArgument { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TensorError>;

/// Return a configuration error from the enclosing function unless `$cond` holds.
#[macro_export]
macro_rules! require_true {
    ($cond:expr, $op:expr, $msg:expr) => {
        if !($cond) {
            return Err($crate::TensorError::configuration($op, $msg));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(flag: bool) -> Result<u8> {
        require_true!(flag, "check", "Some dimensions required for reduction!");
        Ok(1)
    }

    #[test]
    fn test_require_true() {
        assert_eq!(check(true).unwrap(), 1);
        let err = check(false).unwrap_err();
        assert_eq!(err.operation(), "check");
        assert!(err.is_precondition());
        assert!(err
            .to_string()
            .contains("Some dimensions required for reduction!"));
    }

    #[test]
    fn test_allocation_error_is_not_precondition() {
        let err = TensorError::allocation_error("alloc", "limit reached", Some(64), Some(8));
        assert!(!err.is_precondition());
        assert_eq!(err.operation(), "alloc");
    }
}
