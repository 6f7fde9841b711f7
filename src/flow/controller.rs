//! RegistrationFlow: owns the session state, runs lookups and terminal
//! submissions, and applies the transition table.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use uuid::Uuid;

use crate::error::{FlowError, LookupError, Result, SubmissionError};
use crate::forms::StepInput;
use crate::services::{
    ApiClient, EmailLookup, IdentityLookup, PasswordService, RegistrationSubmitter,
};

use super::state::RegistrationState;
use super::step::Step;
use super::transition::{self, StepResult, Transition};

/// Collaborators the flow calls out to.
#[derive(Clone)]
pub struct FlowServices {
    pub identity: Arc<dyn IdentityLookup>,
    pub email: Arc<dyn EmailLookup>,
    pub submitter: Arc<dyn RegistrationSubmitter>,
    pub password: Arc<dyn PasswordService>,
}

impl FlowServices {
    /// Use one API client for every role.
    pub fn from_client(client: Arc<ApiClient>) -> Self {
        Self {
            identity: client.clone(),
            email: client.clone(),
            submitter: client.clone(),
            password: client,
        }
    }
}

/// Summary of a finished registration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Receipt {
    pub session_id: Uuid,
    pub company_id: String,
    pub contacts: usize,
    pub account_created: bool,
    pub submitted_at: DateTime<Utc>,
}

/// What happened to an accepted step submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The flow moved on to another form.
    Advanced { from: Step, to: Step },
    /// The registration was submitted; the flow is complete.
    Completed(Receipt),
}

/// Drives one registration session.
///
/// Submissions take `&mut self`, so a session never has more than one step
/// request in flight.
pub struct RegistrationFlow {
    services: FlowServices,
    state: RegistrationState,
    /// Set once the registration call succeeded, so a password retry does
    /// not register the company twice.
    registration_submitted: bool,
    receipt: Option<Receipt>,
}

impl RegistrationFlow {
    pub fn new(services: FlowServices) -> Self {
        let state = RegistrationState::new();
        tracing::info!(session_id = %state.session_id(), "Registration session started");
        Self {
            services,
            state,
            registration_submitted: false,
            receipt: None,
        }
    }

    pub fn state(&self) -> &RegistrationState {
        &self.state
    }

    pub fn current_step(&self) -> Step {
        self.state.current_step()
    }

    pub fn is_complete(&self) -> bool {
        self.current_step().is_terminal()
    }

    pub fn receipt(&self) -> Option<&Receipt> {
        self.receipt.as_ref()
    }

    /// Email captured by the email step, for forms that display it.
    pub fn captured_email(&self) -> Option<&str> {
        self.state.accumulated().email.as_deref()
    }

    /// Validate raw input for the current step, run its lookup if it has
    /// one, then apply the result.
    ///
    /// Field or lookup failures leave the step and the accumulated data
    /// untouched.
    pub async fn submit(&mut self, input: StepInput) -> Result<StepOutcome> {
        let step = self.current_step();
        if step.is_terminal() {
            return Err(FlowError::AlreadyComplete.into());
        }
        if input.step() != step {
            return Err(FlowError::UnexpectedInput {
                step,
                input: input.kind(),
            }
            .into());
        }

        let result = match input {
            StepInput::Identity(form) => {
                let tax_id = form.validate()?;
                let exists = self.services.identity.exists(&tax_id).await.map_err(|e| {
                    tracing::warn!(session_id = %self.state.session_id(), error = %e, "Identity lookup failed");
                    LookupError::Identity(e)
                })?;
                StepResult::IdentityChecked { tax_id, exists }
            }
            StepInput::NationalData(form) => StepResult::NationalData(form.validate()?),
            StepInput::Email(form) => {
                let email = form.validate()?;
                let exists = self.services.email.exists(&email).await.map_err(|e| {
                    tracing::warn!(session_id = %self.state.session_id(), error = %e, "Email lookup failed");
                    LookupError::Email(e)
                })?;
                StepResult::EmailChecked { email, exists }
            }
            StepInput::Contact(form) => StepResult::ContactAdded(form.validate()?),
            StepInput::ContactPlus(form) => StepResult::ContactAdded(form.validate()?),
            StepInput::AddMoreContact(add_more) => StepResult::AddMore(add_more),
            StepInput::IdentityAccount(wants_account) => StepResult::AccountDecision(wants_account),
            StepInput::Password(form) => StepResult::PasswordChosen(form.validate()?),
        };

        self.apply(result).await
    }

    /// Apply an already-resolved step result.
    ///
    /// Non-terminal transitions merge and move on. Terminal transitions call
    /// the submission collaborators first and only commit once they succeed.
    pub async fn apply(&mut self, result: StepResult) -> Result<StepOutcome> {
        let from = self.current_step();
        if self.registration_submitted && !matches!(result, StepResult::PasswordChosen(_)) {
            return Err(FlowError::RegistrationSent { step: from }.into());
        }
        let transition = transition::advance(from, &result)?;
        let session_id = self.state.session_id();

        match transition {
            Transition::Next(to) => {
                self.state.merge(&result);
                self.state.set_step(to);
                tracing::info!(
                    session_id = %session_id,
                    step = %from,
                    result = result.kind(),
                    next = %to,
                    "Step completed"
                );
                Ok(StepOutcome::Advanced { from, to })
            }
            Transition::Submit => {
                let mut candidate = self.state.clone();
                candidate.merge(&result);
                self.submit_registration(&candidate).await?;
                Ok(self.finish(candidate, false))
            }
            Transition::SubmitWithPassword => {
                let StepResult::PasswordChosen(password) = &result else {
                    return Err(FlowError::UnexpectedInput {
                        step: from,
                        input: result.kind(),
                    }
                    .into());
                };
                let mut candidate = self.state.clone();
                candidate.merge(&result);
                self.submit_registration(&candidate).await?;
                self.create_password(&candidate, password).await?;
                Ok(self.finish(candidate, true))
            }
        }
    }

    /// Step back to the previous form. Accumulated data is kept.
    ///
    /// Refused once the registration call has gone through.
    pub fn back(&mut self) -> std::result::Result<Step, FlowError> {
        let from = self.current_step();
        if self.registration_submitted {
            return Err(FlowError::RegistrationSent { step: from });
        }
        let to = transition::back(from, &self.state).ok_or(FlowError::NoPreviousStep { step: from })?;
        self.state.set_step(to);
        tracing::info!(session_id = %self.state.session_id(), step = %from, next = %to, "Navigated back");
        Ok(to)
    }

    async fn submit_registration(&mut self, candidate: &RegistrationState) -> Result<()> {
        if self.registration_submitted {
            tracing::debug!(session_id = %candidate.session_id(), "Registration already submitted; skipping");
            return Ok(());
        }
        let company = candidate.company_record();
        let contacts = candidate.contact_records();
        tracing::info!(
            session_id = %candidate.session_id(),
            company_id = %company.company_id,
            contacts = contacts.len(),
            "Submitting registration"
        );
        self.services
            .submitter
            .submit(&company, &contacts)
            .await
            .map_err(|e| {
                tracing::warn!(session_id = %candidate.session_id(), error = %e, "Registration submission failed");
                SubmissionError::Registration(e)
            })?;
        self.registration_submitted = true;
        Ok(())
    }

    async fn create_password(
        &self,
        candidate: &RegistrationState,
        password: &SecretString,
    ) -> Result<()> {
        let email = candidate.accumulated().email.clone().unwrap_or_default();
        self.services
            .password
            .create(&email, password)
            .await
            .map_err(|e| {
                tracing::warn!(session_id = %candidate.session_id(), error = %e, "Password creation failed");
                SubmissionError::Password(e)
            })?;
        tracing::info!(session_id = %candidate.session_id(), "Account password created");
        Ok(())
    }

    fn finish(&mut self, mut candidate: RegistrationState, account_created: bool) -> StepOutcome {
        let from = candidate.current_step();
        candidate.set_step(Step::Complete);
        let receipt = Receipt {
            session_id: candidate.session_id(),
            company_id: candidate.company_record().company_id,
            contacts: candidate.contacts().len(),
            account_created,
            submitted_at: Utc::now(),
        };
        tracing::info!(
            session_id = %receipt.session_id,
            started_at = %candidate.started_at(),
            step = %from,
            contacts = receipt.contacts,
            account_created,
            "Registration complete"
        );
        self.state = candidate;
        self.receipt = Some(receipt.clone());
        StepOutcome::Completed(receipt)
    }
}
