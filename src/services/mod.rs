//! Remote collaborators consumed by the flow controller and the employee
//! registration.
//!
//! Callers only see these traits; `ApiClient` is the HTTP-backed
//! implementation used by the binary.

pub mod http;
pub mod payload;

pub use http::ApiClient;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::employees::Employee;
use crate::error::ServiceError;
use crate::flow::{CompanyRecord, ContactRecord};

/// Reports whether a company with the given tax ID is already registered.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    async fn exists(&self, identity_id: &str) -> Result<bool, ServiceError>;
}

/// Reports whether an email is already known, as a contact or an account.
#[async_trait]
pub trait EmailLookup: Send + Sync {
    async fn exists(&self, email: &str) -> Result<bool, ServiceError>;
}

/// Sends the finished registration.
#[async_trait]
pub trait RegistrationSubmitter: Send + Sync {
    async fn submit(
        &self,
        company: &CompanyRecord,
        contacts: &[ContactRecord],
    ) -> Result<(), ServiceError>;
}

/// Creates the account password for an email.
#[async_trait]
pub trait PasswordService: Send + Sync {
    async fn create(&self, email: &str, password: &SecretString) -> Result<(), ServiceError>;
}

/// Checks and registers employees.
#[async_trait]
pub trait EmployeeRegistrar: Send + Sync {
    /// Whether an employee with this email is already on file.
    async fn email_exists(&self, email: &str) -> Result<bool, ServiceError>;

    /// Register a whole batch in one call.
    async fn register(&self, employees: &[Employee]) -> Result<(), ServiceError>;
}
