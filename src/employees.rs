//! Employee registration: a batch of staff members checked one by one and
//! then sent together.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EmployeeError, FieldErrors, Result};
use crate::services::EmployeeRegistrar;

/// One validated staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub sector: String,
    pub role: String,
    pub birthday: NaiveDate,
}

/// Summary of a registered batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeReceipt {
    pub employees: usize,
    pub submitted_at: DateTime<Utc>,
}

/// Checks and registers employee batches.
#[derive(Clone)]
pub struct EmployeeRegistration {
    registrar: Arc<dyn EmployeeRegistrar>,
}

impl EmployeeRegistration {
    pub fn new(registrar: Arc<dyn EmployeeRegistrar>) -> Self {
        Self { registrar }
    }

    /// Check every email in order, stopping at the first one already on
    /// file, then send the whole batch in one call.
    pub async fn register(&self, employees: &[Employee]) -> Result<EmployeeReceipt> {
        if employees.is_empty() {
            let mut errors = FieldErrors::new();
            errors.push("employees", "At least one employee is required");
            return Err(errors.into());
        }

        for employee in employees {
            let exists = self
                .registrar
                .email_exists(&employee.email)
                .await
                .map_err(|e| {
                    tracing::warn!(email = %employee.email, error = %e, "Employee email check failed");
                    EmployeeError::Lookup(e)
                })?;
            if exists {
                tracing::info!(email = %employee.email, "Employee email already registered");
                return Err(EmployeeError::AlreadyRegistered {
                    email: employee.email.clone(),
                }
                .into());
            }
        }

        self.registrar.register(employees).await.map_err(|e| {
            tracing::warn!(count = employees.len(), error = %e, "Employee registration failed");
            EmployeeError::Submission(e)
        })?;
        tracing::info!(count = employees.len(), "Employees registered");

        Ok(EmployeeReceipt {
            employees: employees.len(),
            submitted_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::{Error, ServiceError};

    #[derive(Default)]
    struct Registry {
        known: Vec<&'static str>,
        reject_batch: bool,
        checked: Mutex<Vec<String>>,
        batches: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl EmployeeRegistrar for Registry {
        async fn email_exists(&self, email: &str) -> std::result::Result<bool, ServiceError> {
            self.checked.lock().unwrap().push(email.to_string());
            Ok(self.known.contains(&email))
        }

        async fn register(&self, employees: &[Employee]) -> std::result::Result<(), ServiceError> {
            if self.reject_batch {
                return Err(ServiceError::Rejected {
                    status: 400,
                    body: "bad batch".into(),
                });
            }
            self.batches.lock().unwrap().push(employees.len());
            Ok(())
        }
    }

    fn employee(email: &str) -> Employee {
        Employee {
            email: email.to_string(),
            name: "Carla Mendes".to_string(),
            phone: "+5511987654321".to_string(),
            sector: "financeiro".to_string(),
            role: "analista".to_string(),
            birthday: NaiveDate::from_ymd_opt(1990, 3, 25).unwrap(),
        }
    }

    #[tokio::test]
    async fn registers_batch_in_one_call() {
        let registry = Arc::new(Registry::default());
        let registration = EmployeeRegistration::new(registry.clone());

        let receipt = registration
            .register(&[employee("carla@acme.com.br"), employee("davi@acme.com.br")])
            .await
            .unwrap();

        assert_eq!(receipt.employees, 2);
        assert_eq!(registry.checked.lock().unwrap().len(), 2);
        assert_eq!(*registry.batches.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn stops_at_first_known_email() {
        let registry = Arc::new(Registry {
            known: vec!["davi@acme.com.br"],
            ..Default::default()
        });
        let registration = EmployeeRegistration::new(registry.clone());

        let err = registration
            .register(&[
                employee("carla@acme.com.br"),
                employee("davi@acme.com.br"),
                employee("elis@acme.com.br"),
            ])
            .await
            .unwrap_err();

        match err {
            Error::Employee(EmployeeError::AlreadyRegistered { email }) => {
                assert_eq!(email, "davi@acme.com.br")
            }
            other => panic!("expected duplicate, got {other:?}"),
        }
        assert_eq!(
            *registry.checked.lock().unwrap(),
            vec!["carla@acme.com.br", "davi@acme.com.br"]
        );
        assert!(registry.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_batch_is_a_field_error() {
        let registration = EmployeeRegistration::new(Arc::new(Registry::default()));
        let err = registration.register(&[]).await.unwrap_err();
        let Error::Validation(errors) = err else {
            panic!("expected field errors");
        };
        assert!(errors.has("employees"));
    }

    #[tokio::test]
    async fn rejected_batch_is_a_submission_error() {
        let registration = EmployeeRegistration::new(Arc::new(Registry {
            reject_batch: true,
            ..Default::default()
        }));
        let err = registration
            .register(&[employee("carla@acme.com.br")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Employee(EmployeeError::Submission(_))));
        assert_eq!(
            err.user_message(),
            "Could not register the employees. Please try again."
        );
    }
}
