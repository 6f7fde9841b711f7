//! Transition table: pure functions from (step, result) to the next step.

use secrecy::SecretString;

use crate::error::FlowError;

use super::model::{CompanyDetails, Contact};
use super::state::RegistrationState;
use super::step::Step;

/// Partial data a step form hands to the controller.
///
/// The variant, together with the existence flags it carries, selects the
/// branch taken by [`advance`].
#[derive(Debug)]
pub enum StepResult {
    /// Tax ID (digits only) and whether a company with it already exists.
    IdentityChecked { tax_id: String, exists: bool },
    NationalData(CompanyDetails),
    /// Email and whether it matched an existing contact or account.
    EmailChecked { email: String, exists: bool },
    ContactAdded(Contact),
    AddMore(bool),
    AccountDecision(bool),
    PasswordChosen(SecretString),
}

impl StepResult {
    /// Short name used in logs and flow errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IdentityChecked { .. } => "identity_checked",
            Self::NationalData(_) => "national_data",
            Self::EmailChecked { .. } => "email_checked",
            Self::ContactAdded(_) => "contact_added",
            Self::AddMore(_) => "add_more",
            Self::AccountDecision(_) => "account_decision",
            Self::PasswordChosen(_) => "password_chosen",
        }
    }
}

/// What the controller does after accepting a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Show another form.
    Next(Step),
    /// Submit the accumulated registration and finish.
    Submit,
    /// Submit the accumulated registration, then create the account password.
    SubmitWithPassword,
}

impl Transition {
    /// The step the flow lands on once this transition succeeds.
    pub fn target(&self) -> Step {
        match self {
            Self::Next(step) => *step,
            Self::Submit | Self::SubmitWithPassword => Step::Complete,
        }
    }
}

/// Decide where a result submitted at `step` leads.
///
/// Total over every step/result pair the forms can produce; any other pair
/// is a [`FlowError::UnexpectedInput`].
pub fn advance(step: Step, result: &StepResult) -> Result<Transition, FlowError> {
    use Step::*;
    use StepResult as R;

    let transition = match (step, result) {
        (IdentityLookup, R::IdentityChecked { exists: true, .. }) => Transition::Next(EmailLookup),
        (IdentityLookup, R::IdentityChecked { exists: false, .. }) => {
            Transition::Next(NationalData)
        }
        (NationalData, R::NationalData(_)) => Transition::Next(EmailLookup),
        (EmailLookup, R::EmailChecked { exists: true, .. }) => Transition::Next(AddMoreContact),
        (EmailLookup, R::EmailChecked { exists: false, .. }) => Transition::Next(ContactEntry),
        (ContactEntry | ContactEntryPlus, R::ContactAdded(_)) => Transition::Next(AddMoreContact),
        (AddMoreContact, R::AddMore(true)) => Transition::Next(ContactEntryPlus),
        (AddMoreContact, R::AddMore(false)) => Transition::Next(IdentityAccountDecision),
        (IdentityAccountDecision, R::AccountDecision(true)) => Transition::Next(PasswordCreation),
        (IdentityAccountDecision, R::AccountDecision(false)) => Transition::Submit,
        (PasswordCreation, R::PasswordChosen(_)) => Transition::SubmitWithPassword,
        (Complete, _) => return Err(FlowError::AlreadyComplete),
        (step, result) => {
            return Err(FlowError::UnexpectedInput {
                step,
                input: result.kind(),
            });
        }
    };
    Ok(transition)
}

/// The step shown when navigating backwards from `step`, or `None` at
/// either end of the flow.
///
/// Data already merged into `state` stays where it is.
pub fn back(step: Step, state: &RegistrationState) -> Option<Step> {
    use Step::*;

    let identity_exists = state.accumulated().identity_exists == Some(true);
    let previous = match step {
        IdentityLookup | Complete => return None,
        NationalData => IdentityLookup,
        EmailLookup => {
            if identity_exists {
                IdentityLookup
            } else {
                NationalData
            }
        }
        ContactEntry => {
            if identity_exists {
                EmailLookup
            } else {
                NationalData
            }
        }
        ContactEntryPlus => AddMoreContact,
        AddMoreContact => match state.contacts().last() {
            Some(last) if last.has_email() => ContactEntryPlus,
            Some(_) => ContactEntry,
            None => EmailLookup,
        },
        IdentityAccountDecision => AddMoreContact,
        PasswordCreation => IdentityAccountDecision,
    };
    Some(previous)
}
