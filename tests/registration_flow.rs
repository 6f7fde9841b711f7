//! End-to-end flow scenarios against recording stub collaborators.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use partner_signup::error::{Error, FlowError, LookupError, ServiceError, SubmissionError};
use partner_signup::flow::{
    CompanyRecord, ContactRecord, FlowServices, RegistrationFlow, Step, StepOutcome, StepResult,
};
use partner_signup::forms::{
    ContactForm, ContactPlusForm, EmailForm, IdentityForm, NationalDataForm, PasswordForm,
    StepInput,
};
use partner_signup::services::{
    EmailLookup, IdentityLookup, PasswordService, RegistrationSubmitter,
};

/// A collaborator call, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Identity(String),
    Email(String),
    Submit {
        company: CompanyRecord,
        contacts: Vec<ContactRecord>,
    },
    Password {
        email: String,
        password: String,
    },
}

/// Stub collaborators with scripted answers and failures.
#[derive(Default)]
struct Recorder {
    identity_exists: bool,
    email_exists: bool,
    identity_failures: Mutex<u32>,
    email_failures: Mutex<u32>,
    submit_failures: Mutex<u32>,
    password_failures: Mutex<u32>,
    calls: Mutex<Vec<Call>>,
}

impl Recorder {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn submissions(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Submit { .. }))
            .collect()
    }

    fn passwords(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Password { .. }))
            .collect()
    }

    /// Consume one scripted failure, if any are left.
    fn take_failure(counter: &Mutex<u32>) -> bool {
        let mut left = counter.lock().unwrap();
        if *left > 0 {
            *left -= 1;
            true
        } else {
            false
        }
    }
}

#[async_trait]
impl IdentityLookup for Recorder {
    async fn exists(&self, identity_id: &str) -> Result<bool, ServiceError> {
        if Self::take_failure(&self.identity_failures) {
            return Err(ServiceError::Network("connection reset".into()));
        }
        self.calls
            .lock()
            .unwrap()
            .push(Call::Identity(identity_id.to_string()));
        Ok(self.identity_exists)
    }
}

#[async_trait]
impl EmailLookup for Recorder {
    async fn exists(&self, email: &str) -> Result<bool, ServiceError> {
        if Self::take_failure(&self.email_failures) {
            return Err(ServiceError::Rejected {
                status: 500,
                body: "internal error".into(),
            });
        }
        self.calls.lock().unwrap().push(Call::Email(email.to_string()));
        Ok(self.email_exists)
    }
}

#[async_trait]
impl RegistrationSubmitter for Recorder {
    async fn submit(
        &self,
        company: &CompanyRecord,
        contacts: &[ContactRecord],
    ) -> Result<(), ServiceError> {
        if Self::take_failure(&self.submit_failures) {
            return Err(ServiceError::Rejected {
                status: 422,
                body: "companyID already registered".into(),
            });
        }
        self.calls.lock().unwrap().push(Call::Submit {
            company: company.clone(),
            contacts: contacts.to_vec(),
        });
        Ok(())
    }
}

#[async_trait]
impl PasswordService for Recorder {
    async fn create(&self, email: &str, password: &SecretString) -> Result<(), ServiceError> {
        if Self::take_failure(&self.password_failures) {
            return Err(ServiceError::Network("timed out".into()));
        }
        self.calls.lock().unwrap().push(Call::Password {
            email: email.to_string(),
            password: password.expose_secret().to_string(),
        });
        Ok(())
    }
}

fn start(recorder: Recorder) -> (RegistrationFlow, Arc<Recorder>) {
    let recorder = Arc::new(recorder);
    let services = FlowServices {
        identity: recorder.clone(),
        email: recorder.clone(),
        submitter: recorder.clone(),
        password: recorder.clone(),
    };
    (RegistrationFlow::new(services), recorder)
}

fn identity_form() -> StepInput {
    StepInput::Identity(IdentityForm {
        tax_id: "11.222.333/0001-81".into(),
    })
}

fn national_data_form() -> StepInput {
    StepInput::NationalData(NationalDataForm {
        trade_name: "Acme".into(),
        legal_name: "Acme Industria Ltda".into(),
        tax_classification: "simples".into(),
        country: "Brasil".into(),
        postal_code: "01001-000".into(),
        street: "Praca da Se".into(),
        district: "Se".into(),
        number: "1".into(),
        segment: "textil".into(),
        subsegment: "subtextil".into(),
    })
}

fn email_form(email: &str) -> StepInput {
    StepInput::Email(EmailForm {
        email: email.into(),
    })
}

fn contact_form(name: &str) -> ContactForm {
    ContactForm {
        name: name.into(),
        phone: "(11) 98765-4321".into(),
        sector: "comercial".into(),
        role: "analista".into(),
    }
}

fn contact_plus_form(name: &str, email: &str) -> StepInput {
    StepInput::ContactPlus(ContactPlusForm {
        email: email.into(),
        contact: contact_form(name),
    })
}

async fn expect_step(flow: &mut RegistrationFlow, input: StepInput, expected: Step) {
    let outcome = flow.submit(input).await.unwrap();
    match outcome {
        StepOutcome::Advanced { to, .. } => assert_eq!(to, expected),
        StepOutcome::Completed(_) => assert_eq!(Step::Complete, expected),
    }
    assert_eq!(flow.current_step(), expected);
}

#[tokio::test]
async fn new_company_single_contact_no_account() {
    let (mut flow, recorder) = start(Recorder::default());

    expect_step(&mut flow, identity_form(), Step::NationalData).await;
    expect_step(&mut flow, national_data_form(), Step::EmailLookup).await;
    expect_step(&mut flow, email_form("ana@acme.com.br"), Step::ContactEntry).await;
    expect_step(
        &mut flow,
        StepInput::Contact(contact_form("Ana Souza")),
        Step::AddMoreContact,
    )
    .await;
    expect_step(
        &mut flow,
        StepInput::AddMoreContact(false),
        Step::IdentityAccountDecision,
    )
    .await;
    expect_step(&mut flow, StepInput::IdentityAccount(false), Step::Complete).await;

    let submissions = recorder.submissions();
    assert_eq!(submissions.len(), 1);
    let Call::Submit { company, contacts } = &submissions[0] else {
        unreachable!()
    };
    assert_eq!(company.company_id, "11222333000181");
    assert_eq!(
        company.details.as_ref().map(|d| d.legal_name.as_str()),
        Some("Acme Industria Ltda")
    );
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].name, "Ana Souza");
    // The contact form does not ask for email; the checked email is used.
    assert_eq!(contacts[0].email, "ana@acme.com.br");

    assert!(recorder.passwords().is_empty());

    let receipt = flow.receipt().unwrap();
    assert_eq!(receipt.contacts, 1);
    assert!(!receipt.account_created);
}

#[tokio::test]
async fn known_email_extra_contact_and_account() {
    let (mut flow, recorder) = start(Recorder {
        identity_exists: true,
        email_exists: true,
        ..Default::default()
    });

    expect_step(&mut flow, identity_form(), Step::EmailLookup).await;
    expect_step(&mut flow, email_form("owner@acme.com.br"), Step::AddMoreContact).await;
    expect_step(&mut flow, StepInput::AddMoreContact(true), Step::ContactEntryPlus).await;
    expect_step(
        &mut flow,
        contact_plus_form("Bruno Dias", "bruno@acme.com.br"),
        Step::AddMoreContact,
    )
    .await;
    expect_step(
        &mut flow,
        StepInput::AddMoreContact(false),
        Step::IdentityAccountDecision,
    )
    .await;
    expect_step(
        &mut flow,
        StepInput::IdentityAccount(true),
        Step::PasswordCreation,
    )
    .await;
    expect_step(
        &mut flow,
        StepInput::Password(PasswordForm::new("segredo1", "segredo1")),
        Step::Complete,
    )
    .await;

    let terminal_calls: Vec<Call> = recorder
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Submit { .. } | Call::Password { .. }))
        .collect();
    assert_eq!(terminal_calls.len(), 2);

    let Call::Submit { company, contacts } = &terminal_calls[0] else {
        panic!("submission must come first, got {:?}", terminal_calls[0]);
    };
    assert_eq!(company.company_id, "11222333000181");
    assert!(company.details.is_none());
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].email, "bruno@acme.com.br");

    assert_eq!(
        terminal_calls[1],
        Call::Password {
            email: "owner@acme.com.br".into(),
            password: "segredo1".into(),
        }
    );
    assert!(flow.receipt().unwrap().account_created);
}

#[tokio::test]
async fn lookups_run_once_per_lookup_step() {
    let (mut flow, recorder) = start(Recorder::default());
    flow.submit(identity_form()).await.unwrap();
    flow.submit(national_data_form()).await.unwrap();
    flow.submit(email_form("ana@acme.com.br")).await.unwrap();

    assert_eq!(
        recorder.calls(),
        vec![
            Call::Identity("11222333000181".into()),
            Call::Email("ana@acme.com.br".into()),
        ]
    );
}

#[tokio::test]
async fn email_lookup_error_leaves_step_and_email_unset() {
    let (mut flow, recorder) = start(Recorder {
        identity_exists: true,
        email_failures: Mutex::new(1),
        ..Default::default()
    });
    flow.submit(identity_form()).await.unwrap();

    let err = flow.submit(email_form("ana@acme.com.br")).await.unwrap_err();
    assert!(matches!(err, Error::Lookup(LookupError::Email(_))));
    assert_eq!(flow.current_step(), Step::EmailLookup);
    assert!(flow.state().accumulated().email.is_none());
    assert!(flow.state().accumulated().email_exists.is_none());

    // Retrying the same step succeeds once the service recovers.
    expect_step(&mut flow, email_form("ana@acme.com.br"), Step::ContactEntry).await;
    assert_eq!(recorder.calls().len(), 2);
}

#[tokio::test]
async fn identity_lookup_error_keeps_initial_step() {
    let (mut flow, _) = start(Recorder {
        identity_failures: Mutex::new(1),
        ..Default::default()
    });
    let err = flow.submit(identity_form()).await.unwrap_err();
    assert!(matches!(err, Error::Lookup(LookupError::Identity(_))));
    assert_eq!(flow.current_step(), Step::IdentityLookup);
    assert!(flow.state().accumulated().tax_id.is_none());
}

#[tokio::test]
async fn submission_failure_leaves_state_and_can_be_retried() {
    let (mut flow, recorder) = start(Recorder {
        identity_exists: true,
        email_exists: true,
        submit_failures: Mutex::new(1),
        ..Default::default()
    });
    flow.apply(StepResult::IdentityChecked {
        tax_id: "11222333000181".into(),
        exists: true,
    })
    .await
    .unwrap();
    flow.submit(email_form("owner@acme.com.br")).await.unwrap();
    flow.submit(StepInput::AddMoreContact(false)).await.unwrap();

    let err = flow
        .submit(StepInput::IdentityAccount(false))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Submission(SubmissionError::Registration(_))
    ));
    assert_eq!(err.user_message(), "Registration failed. Please try again.");
    assert_eq!(flow.current_step(), Step::IdentityAccountDecision);
    assert!(flow.state().accumulated().wants_account.is_none());
    assert!(flow.receipt().is_none());
    assert!(recorder.submissions().is_empty());

    expect_step(&mut flow, StepInput::IdentityAccount(false), Step::Complete).await;
    assert_eq!(recorder.submissions().len(), 1);
}

#[tokio::test]
async fn password_retry_does_not_resubmit_registration() {
    let (mut flow, recorder) = start(Recorder {
        identity_exists: true,
        email_exists: true,
        password_failures: Mutex::new(1),
        ..Default::default()
    });
    flow.submit(identity_form()).await.unwrap();
    flow.submit(email_form("owner@acme.com.br")).await.unwrap();
    flow.submit(StepInput::AddMoreContact(false)).await.unwrap();
    flow.submit(StepInput::IdentityAccount(true)).await.unwrap();

    let err = flow
        .submit(StepInput::Password(PasswordForm::new("segredo1", "segredo1")))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Submission(SubmissionError::Password(_))));
    assert_eq!(flow.current_step(), Step::PasswordCreation);

    expect_step(
        &mut flow,
        StepInput::Password(PasswordForm::new("segredo1", "segredo1")),
        Step::Complete,
    )
    .await;
    assert_eq!(recorder.submissions().len(), 1);
    assert_eq!(recorder.passwords().len(), 1);
}

#[tokio::test]
async fn mismatched_password_blocks_only_that_step() {
    let (mut flow, recorder) = start(Recorder {
        identity_exists: true,
        email_exists: true,
        ..Default::default()
    });
    flow.submit(identity_form()).await.unwrap();
    flow.submit(email_form("owner@acme.com.br")).await.unwrap();
    flow.submit(StepInput::AddMoreContact(false)).await.unwrap();
    flow.submit(StepInput::IdentityAccount(true)).await.unwrap();

    let err = flow
        .submit(StepInput::Password(PasswordForm::new("segredo1", "segredo2")))
        .await
        .unwrap_err();
    let Error::Validation(errors) = err else {
        panic!("expected field errors");
    };
    assert!(errors.has("confirmation"));
    assert_eq!(flow.current_step(), Step::PasswordCreation);
    assert!(recorder.submissions().is_empty());
}

#[tokio::test]
async fn back_from_add_more_returns_to_the_form_that_added_last_contact() {
    let (mut flow, _) = start(Recorder::default());
    flow.submit(identity_form()).await.unwrap();
    flow.submit(national_data_form()).await.unwrap();
    flow.submit(email_form("ana@acme.com.br")).await.unwrap();
    flow.submit(StepInput::Contact(contact_form("Ana Souza")))
        .await
        .unwrap();

    assert_eq!(flow.back().unwrap(), Step::ContactEntry);
    // ContactEntry goes back to NationalData because the company was new.
    assert_eq!(flow.back().unwrap(), Step::NationalData);

    flow.submit(national_data_form()).await.unwrap();
    flow.submit(email_form("ana@acme.com.br")).await.unwrap();
    flow.submit(StepInput::Contact(contact_form("Ana Souza")))
        .await
        .unwrap();
    flow.submit(StepInput::AddMoreContact(true)).await.unwrap();
    flow.submit(contact_plus_form("Bruno Dias", "bruno@acme.com.br"))
        .await
        .unwrap();

    assert_eq!(flow.current_step(), Step::AddMoreContact);
    assert_eq!(flow.back().unwrap(), Step::ContactEntryPlus);
}

#[tokio::test]
async fn contacts_never_shrink_even_across_back_navigation() {
    let (mut flow, recorder) = start(Recorder {
        identity_exists: true,
        ..Default::default()
    });
    let mut seen = 0;
    let mut check = |flow: &RegistrationFlow| {
        let len = flow.state().contacts().len();
        assert!(len >= seen, "contacts shrank from {seen} to {len}");
        seen = len;
    };

    flow.submit(identity_form()).await.unwrap();
    check(&flow);
    flow.submit(email_form("ana@acme.com.br")).await.unwrap();
    check(&flow);
    flow.submit(StepInput::Contact(contact_form("Ana Souza")))
        .await
        .unwrap();
    check(&flow);

    // Going back and re-entering the contact appends a second one; merges
    // are not undone by back navigation.
    flow.back().unwrap();
    check(&flow);
    flow.submit(StepInput::Contact(contact_form("Ana Souza")))
        .await
        .unwrap();
    check(&flow);
    assert_eq!(flow.state().contacts().len(), 2);

    flow.submit(StepInput::AddMoreContact(false)).await.unwrap();
    flow.submit(StepInput::IdentityAccount(false)).await.unwrap();
    check(&flow);

    let Call::Submit { contacts, .. } = &recorder.submissions()[0] else {
        unreachable!()
    };
    assert_eq!(contacts.len(), 2);
}

#[tokio::test]
async fn sent_registration_cannot_be_edited_before_password_retry() {
    let (mut flow, recorder) = start(Recorder {
        identity_exists: true,
        email_exists: true,
        password_failures: Mutex::new(1),
        ..Default::default()
    });
    flow.submit(identity_form()).await.unwrap();
    flow.submit(email_form("owner@acme.com.br")).await.unwrap();
    flow.submit(StepInput::AddMoreContact(true)).await.unwrap();
    flow.submit(contact_plus_form("Ana Souza", "ana@acme.com.br"))
        .await
        .unwrap();
    flow.submit(StepInput::AddMoreContact(false)).await.unwrap();
    flow.submit(StepInput::IdentityAccount(true)).await.unwrap();
    flow.submit(StepInput::Password(PasswordForm::new("segredo1", "segredo1")))
        .await
        .unwrap_err();
    assert_eq!(recorder.submissions().len(), 1);

    // Going back to add a contact or change the company is refused.
    let err = flow.back().unwrap_err();
    assert!(matches!(
        err,
        FlowError::RegistrationSent {
            step: Step::PasswordCreation
        }
    ));
    assert_eq!(flow.current_step(), Step::PasswordCreation);

    let err = flow
        .apply(StepResult::AccountDecision(false))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Flow(FlowError::RegistrationSent { .. })));

    let outcome = flow
        .submit(StepInput::Password(PasswordForm::new("segredo1", "segredo1")))
        .await
        .unwrap();
    let StepOutcome::Completed(receipt) = outcome else {
        panic!("expected completion");
    };

    let Call::Submit { contacts, .. } = &recorder.submissions()[0] else {
        unreachable!()
    };
    assert_eq!(receipt.contacts, contacts.len());
    assert_eq!(recorder.submissions().len(), 1);
    assert_eq!(recorder.passwords().len(), 1);
}
