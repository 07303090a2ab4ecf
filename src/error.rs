/// Application-level error carried up to `main` (message + process exit code).
///
/// Exit codes:
/// - 2: invalid input, configuration or I/O
/// - 3: insufficient data
/// - 4: numeric or internal failure
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failure of a conformance test.
///
/// `EmptySample` fails a whole evaluation call; every other variant is scoped
/// to the single family being evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum TestError {
    /// The sample has zero elements.
    EmptySample,
    /// The family token is not one of the supported families.
    UnsupportedFamily(String),
    /// The sample does not meet a structural requirement of the family.
    PreconditionViolation(String),
    /// Parameter estimation did not converge or produced unusable values.
    FitFailure(String),
}

impl TestError {
    /// Stable name of the error kind (used in serialized error entries).
    pub fn kind(&self) -> &'static str {
        match self {
            TestError::EmptySample => "EmptySample",
            TestError::UnsupportedFamily(_) => "UnsupportedFamily",
            TestError::PreconditionViolation(_) => "PreconditionViolation",
            TestError::FitFailure(_) => "FitFailure",
        }
    }

    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        TestError::PreconditionViolation(message.into())
    }

    pub(crate) fn fit(message: impl Into<String>) -> Self {
        TestError::FitFailure(message.into())
    }
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::EmptySample => write!(f, "EmptySample: sample has no values"),
            TestError::UnsupportedFamily(token) => {
                write!(f, "UnsupportedFamily: unknown distribution family '{token}'")
            }
            TestError::PreconditionViolation(msg) => write!(f, "PreconditionViolation: {msg}"),
            TestError::FitFailure(msg) => write!(f, "FitFailure: {msg}"),
        }
    }
}

impl std::error::Error for TestError {}

impl From<TestError> for AppError {
    fn from(err: TestError) -> Self {
        let exit_code = match err {
            TestError::EmptySample => 3,
            TestError::UnsupportedFamily(_) | TestError::PreconditionViolation(_) => 2,
            TestError::FitFailure(_) => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_prefixed_with_kind() {
        let err = TestError::UnsupportedFamily("not_a_family".to_string());
        assert_eq!(err.kind(), "UnsupportedFamily");
        assert!(err.to_string().starts_with("UnsupportedFamily:"));
        assert!(err.to_string().contains("not_a_family"));
    }

    #[test]
    fn empty_sample_maps_to_insufficient_data_exit_code() {
        let app: AppError = TestError::EmptySample.into();
        assert_eq!(app.exit_code(), 3);
    }
}
