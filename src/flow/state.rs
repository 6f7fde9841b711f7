//! Session state owned by the flow controller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::model::{CompanyDetails, CompanyRecord, Contact, ContactRecord};
use super::step::Step;
use super::transition::StepResult;

/// Everything submitted so far. Fields stay `None` until their step runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Accumulated {
    /// Tax ID, digits only.
    pub tax_id: Option<String>,
    pub identity_exists: Option<bool>,
    pub company: Option<CompanyDetails>,
    pub email: Option<String>,
    pub email_exists: Option<bool>,
    pub add_more: Option<bool>,
    pub wants_account: Option<bool>,
}

/// In-memory state of one registration session.
///
/// Lives for the duration of the wizard and is dropped afterwards; nothing
/// is persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationState {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    current_step: Step,
    accumulated: Accumulated,
    contacts: Vec<Contact>,
}

impl Default for RegistrationState {
    fn default() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            current_step: Step::default(),
            accumulated: Accumulated::default(),
            contacts: Vec::new(),
        }
    }
}

impl RegistrationState {
    /// Fresh session positioned on the identity lookup.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn current_step(&self) -> Step {
        self.current_step
    }

    pub fn accumulated(&self) -> &Accumulated {
        &self.accumulated
    }

    /// Contacts in the order they were entered.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub(crate) fn set_step(&mut self, step: Step) {
        self.current_step = step;
    }

    /// Fold a step result into the accumulated data.
    ///
    /// Scalar fields are overwritten; contacts are appended, never replaced.
    /// Passwords are not retained.
    pub fn merge(&mut self, result: &StepResult) {
        let acc = &mut self.accumulated;
        match result {
            StepResult::IdentityChecked { tax_id, exists } => {
                acc.tax_id = Some(tax_id.clone());
                acc.identity_exists = Some(*exists);
            }
            StepResult::NationalData(details) => {
                acc.company = Some(details.clone());
            }
            StepResult::EmailChecked { email, exists } => {
                acc.email = Some(email.clone());
                acc.email_exists = Some(*exists);
            }
            StepResult::ContactAdded(contact) => {
                self.contacts.push(contact.clone());
            }
            StepResult::AddMore(add_more) => {
                acc.add_more = Some(*add_more);
            }
            StepResult::AccountDecision(wants_account) => {
                acc.wants_account = Some(*wants_account);
            }
            StepResult::PasswordChosen(_) => {}
        }
    }

    /// Company record for submission.
    pub fn company_record(&self) -> CompanyRecord {
        CompanyRecord {
            company_id: self.accumulated.tax_id.clone().unwrap_or_default(),
            details: self.accumulated.company.clone(),
        }
    }

    /// Contact records for submission, in entry order.
    pub fn contact_records(&self) -> Vec<ContactRecord> {
        let fallback = self.accumulated.email.as_deref();
        self.contacts
            .iter()
            .map(|c| ContactRecord::from_contact(c, fallback))
            .collect()
    }
}
