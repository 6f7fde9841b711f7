//! Error types for the registration wizard.

use crate::flow::Step;

/// Top-level error type for the wizard.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] FieldErrors),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("Employee registration error: {0}")]
    Employee(#[from] EmployeeError),
}

impl Error {
    /// Flow-level message suitable for showing to the person filling the form.
    ///
    /// Every variant is recoverable by retrying the same step, so none of
    /// these messages asks the user to restart.
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(e) => format!("The wizard is misconfigured: {e}"),
            Self::Validation(errors) => errors.to_string(),
            Self::Lookup(LookupError::Identity(_)) => {
                "Could not validate the company ID. Please try again.".to_string()
            }
            Self::Lookup(LookupError::Email(_)) => {
                "Could not validate the email. Please try again.".to_string()
            }
            Self::Submission(SubmissionError::Registration(_)) => {
                "Registration failed. Please try again.".to_string()
            }
            Self::Submission(SubmissionError::Password(_)) => {
                "Could not create the password. Please try again.".to_string()
            }
            Self::Flow(e) => e.to_string(),
            Self::Employee(EmployeeError::AlreadyRegistered { email }) => {
                format!("The email {email} is already registered.")
            }
            Self::Employee(EmployeeError::Lookup(_)) => {
                "Could not validate the employee emails. Please try again.".to_string()
            }
            Self::Employee(EmployeeError::Submission(_)) => {
                "Could not register the employees. Please try again.".to_string()
            }
        }
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Form field name, e.g. `"postal_code"`.
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All field failures of one form submission.
///
/// Blocks only the step that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether any failure was reported for `field`.
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Ok(())` when nothing was pushed, otherwise the collected errors.
    pub fn into_result(self) -> std::result::Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// Failure reported by a remote collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A remote existence check failed. The step is not advanced.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("identity lookup failed: {0}")]
    Identity(#[source] ServiceError),

    #[error("email lookup failed: {0}")]
    Email(#[source] ServiceError),
}

/// A terminal call failed. State is left as it was before the attempt.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("registration submission failed: {0}")]
    Registration(#[source] ServiceError),

    #[error("password creation failed: {0}")]
    Password(#[source] ServiceError),
}

/// Employee batch registration failed. Nothing is sent unless every email
/// check passes.
#[derive(Debug, thiserror::Error)]
pub enum EmployeeError {
    #[error("employee email {email} is already registered")]
    AlreadyRegistered { email: String },

    #[error("employee email check failed: {0}")]
    Lookup(#[source] ServiceError),

    #[error("employee registration failed: {0}")]
    Submission(#[source] ServiceError),
}

/// Misuse of the flow controller.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Step {step} cannot accept a {input} result")]
    UnexpectedInput { step: Step, input: &'static str },

    #[error("There is no step before {step}")]
    NoPreviousStep { step: Step },

    #[error("Registration is already complete")]
    AlreadyComplete,

    #[error("The company was already registered; only the password can be retried at {step}")]
    RegistrationSent { step: Step },
}

/// Result type alias for the wizard.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_collects_and_displays() {
        let mut errors = FieldErrors::new();
        assert!(errors.is_empty());
        errors.push("email", "Email is required");
        errors.push("phone", "Invalid phone");

        assert_eq!(errors.len(), 2);
        assert!(errors.has("email"));
        assert!(!errors.has("name"));
        assert_eq!(
            errors.to_string(),
            "email: Email is required; phone: Invalid phone"
        );
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn empty_field_errors_is_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn user_message_hides_transport_details() {
        let err: Error =
            LookupError::Email(ServiceError::Network("connection refused".into())).into();
        let msg = err.user_message();
        assert!(msg.contains("email"));
        assert!(!msg.contains("connection refused"));

        let err: Error = SubmissionError::Registration(ServiceError::Rejected {
            status: 422,
            body: "bad".into(),
        })
        .into();
        assert_eq!(err.user_message(), "Registration failed. Please try again.");

        let err: Error = EmployeeError::AlreadyRegistered {
            email: "carla@acme.com.br".into(),
        }
        .into();
        assert_eq!(
            err.user_message(),
            "The email carla@acme.com.br is already registered."
        );
    }

    #[test]
    fn flow_error_names_the_step() {
        let err = FlowError::NoPreviousStep {
            step: Step::IdentityLookup,
        };
        assert_eq!(err.to_string(), "There is no step before identity_lookup");

        let err = FlowError::RegistrationSent {
            step: Step::PasswordCreation,
        };
        assert!(err.to_string().ends_with("at password_creation"));
    }
}
