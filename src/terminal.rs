//! Terminal driver with plain stdin/stdout prompts for each wizard step.
//!
//! Every prompt accepts `:back` to return to the previous step and `:quit`
//! to abandon the session. End of input counts as `:quit`.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use crate::employees::{Employee, EmployeeReceipt, EmployeeRegistration};
use crate::error::{EmployeeError, Error};
use crate::flow::{Receipt, RegistrationFlow, Step, StepOutcome};
use crate::forms::{
    ContactForm, ContactPlusForm, EmailForm, EmployeeForm, IdentityForm, NationalDataForm,
    PasswordForm, ROLES, SECTORS, StepInput,
};

const BACK: &str = ":back";
const QUIT: &str = ":quit";

/// A typed answer or a navigation command.
#[derive(Debug)]
enum Reply<T> {
    Answer(T),
    Back,
    Quit,
}

/// Unwrap an answer, returning early from the enclosing function on
/// `:back` / `:quit`.
macro_rules! answer {
    ($reply:expr) => {
        match $reply {
            Reply::Answer(value) => value,
            Reply::Back => return Ok(Reply::Back),
            Reply::Quit => return Ok(Reply::Quit),
        }
    };
}

/// Which registration the user picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationType {
    NationalClient,
    Employee,
}

impl RegistrationType {
    fn parse(answer: &str) -> Option<Self> {
        match answer.to_lowercase().as_str() {
            "1" | "national" | "national client" | "cliente nacional" => {
                Some(Self::NationalClient)
            }
            "2" | "employee" | "colaborador" => Some(Self::Employee),
            _ => None,
        }
    }
}

/// How a terminal session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Completed(Receipt),
    EmployeesRegistered(EmployeeReceipt),
    Abandoned,
}

/// Line-based prompt loop over any async reader/writer pair.
pub struct TerminalWizard<R, W> {
    lines: Lines<R>,
    out: W,
}

impl<R, W> TerminalWizard<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
        }
    }

    /// Consume the wizard and return the writer (for inspecting output).
    pub fn into_writer(self) -> W {
        self.out
    }

    async fn say(&mut self, text: &str) -> std::io::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await
    }

    async fn ask(&mut self, label: &str) -> std::io::Result<Reply<String>> {
        self.out.write_all(format!("{label}: ").as_bytes()).await?;
        self.out.flush().await?;
        let Some(line) = self.lines.next_line().await? else {
            return Ok(Reply::Quit);
        };
        let line = line.trim().to_string();
        Ok(match line.as_str() {
            BACK => Reply::Back,
            QUIT => Reply::Quit,
            _ => Reply::Answer(line),
        })
    }

    async fn ask_yes_no(&mut self, label: &str) -> std::io::Result<Reply<bool>> {
        loop {
            let reply = answer!(self.ask(&format!("{label} [y/n]")).await?);
            match reply.to_lowercase().as_str() {
                "y" | "yes" | "s" | "sim" => return Ok(Reply::Answer(true)),
                "n" | "no" | "nao" | "não" => return Ok(Reply::Answer(false)),
                _ => self.say("  ! Please answer y or n").await?,
            }
        }
    }

    /// Ask which registration to run. `None` when the user quits.
    pub async fn choose_type(&mut self) -> std::io::Result<Option<RegistrationType>> {
        self.say("Partner registration").await?;
        self.say("  1) National client\n  2) Employee").await?;
        loop {
            match self.ask("Registration type").await? {
                Reply::Answer(answer) => match RegistrationType::parse(&answer) {
                    Some(kind) => return Ok(Some(kind)),
                    None => self.say("  ! Please choose 1 or 2").await?,
                },
                Reply::Back => self.say("  ! There is nothing before this choice").await?,
                Reply::Quit => return Ok(None),
            }
        }
    }

    /// Ask the user to accept the terms of use. Anything but yes declines.
    pub async fn accept_terms(&mut self) -> std::io::Result<bool> {
        match self.ask_yes_no("I have read and accept the terms of use").await? {
            Reply::Answer(true) => Ok(true),
            _ => {
                self.say("You must accept the terms of use to register.").await?;
                Ok(false)
            }
        }
    }

    /// Run the wizard until it completes or the user quits.
    pub async fn run(&mut self, flow: &mut RegistrationFlow) -> anyhow::Result<SessionEnd> {
        loop {
            if let Some(receipt) = flow.receipt() {
                let receipt = receipt.clone();
                self.say("Registration completed successfully!").await?;
                return Ok(SessionEnd::Completed(receipt));
            }

            let step = flow.current_step();
            self.say(&format!("\n== {} ==", step.title())).await?;

            let reply = self.read_input(step, flow.captured_email()).await?;
            match reply {
                Reply::Quit => {
                    self.say("Registration abandoned.").await?;
                    return Ok(SessionEnd::Abandoned);
                }
                Reply::Back => {
                    if let Err(e) = flow.back() {
                        self.say(&format!("  ! {e}")).await?;
                    }
                }
                Reply::Answer(input) => match flow.submit(input).await {
                    Ok(StepOutcome::Advanced { .. } | StepOutcome::Completed(_)) => {}
                    Err(Error::Validation(errors)) => {
                        for e in errors.iter() {
                            self.say(&format!("  ! {e}")).await?;
                        }
                    }
                    Err(e) => self.say(&format!("  ! {}", e.user_message())).await?,
                },
            }
        }
    }

    /// Collect employees until the user stops adding, then register the
    /// batch. A duplicate email is dropped from the list and entry resumes.
    pub async fn run_employees(
        &mut self,
        registration: &EmployeeRegistration,
    ) -> anyhow::Result<SessionEnd> {
        let mut employees: Vec<Employee> = Vec::new();
        loop {
            self.say(&format!("\n== Employee {} ==", employees.len() + 1))
                .await?;
            match self.read_employee().await? {
                Reply::Quit => {
                    self.say("Registration abandoned.").await?;
                    return Ok(SessionEnd::Abandoned);
                }
                Reply::Back if employees.is_empty() => {
                    self.say("  ! There is no entry before the first employee")
                        .await?;
                    continue;
                }
                Reply::Back => {}
                Reply::Answer(form) => match form.validate() {
                    Ok(employee) => employees.push(employee),
                    Err(errors) => {
                        for e in errors.iter() {
                            self.say(&format!("  ! {e}")).await?;
                        }
                        continue;
                    }
                },
            }

            match self.ask_yes_no("Add another employee?").await? {
                Reply::Answer(true) => continue,
                Reply::Answer(false) => {}
                Reply::Back => {
                    employees.pop();
                    continue;
                }
                Reply::Quit => {
                    self.say("Registration abandoned.").await?;
                    return Ok(SessionEnd::Abandoned);
                }
            }

            match registration.register(&employees).await {
                Ok(receipt) => {
                    self.say("Employees registered successfully!").await?;
                    return Ok(SessionEnd::EmployeesRegistered(receipt));
                }
                Err(e) => {
                    self.say(&format!("  ! {}", e.user_message())).await?;
                    if let Error::Employee(EmployeeError::AlreadyRegistered { email }) = &e {
                        employees.retain(|employee| &employee.email != email);
                        self.say(&format!("  Removed {email} from the list.")).await?;
                    }
                }
            }
        }
    }

    async fn read_employee(&mut self) -> std::io::Result<Reply<EmployeeForm>> {
        let email = answer!(self.ask("Email").await?);
        let name = answer!(self.ask("Full name").await?);
        let phone = answer!(self.ask("Phone (+5511987654321)").await?);
        let sector = answer!(self.ask(&format!("Sector ({})", SECTORS.join("/"))).await?);
        let role = answer!(self.ask(&format!("Role ({})", ROLES.join("/"))).await?);
        let birthday = answer!(self.ask("Birthday (DD/MM/YYYY)").await?);
        Ok(Reply::Answer(EmployeeForm {
            email,
            name,
            phone,
            sector,
            role,
            birthday,
        }))
    }

    async fn read_input(
        &mut self,
        step: Step,
        email: Option<&str>,
    ) -> std::io::Result<Reply<StepInput>> {
        let input = match step {
            Step::IdentityLookup => StepInput::Identity(IdentityForm {
                tax_id: answer!(self.ask("CNPJ (00.000.000/0000-00)").await?),
            }),
            Step::NationalData => {
                let mut form = NationalDataForm::default();
                form.trade_name = answer!(self.ask("Company name").await?);
                form.legal_name = answer!(self.ask("Legal name").await?);
                form.tax_classification = answer!(self.ask("Tax classification").await?);
                form.country = answer!(self.ask("Country").await?);
                form.postal_code = answer!(self.ask("Postal code (CEP)").await?);
                form.street = answer!(self.ask("Street").await?);
                form.district = answer!(self.ask("District").await?);
                form.number = answer!(self.ask("Number").await?);
                form.segment = answer!(self.ask("Segment").await?);
                form.subsegment = answer!(self.ask("Subsegment").await?);
                StepInput::NationalData(form)
            }
            Step::EmailLookup => StepInput::Email(EmailForm {
                email: answer!(self.ask("Email").await?),
            }),
            Step::ContactEntry => {
                if let Some(email) = email {
                    self.say(&format!("Contact for {email}")).await?;
                }
                StepInput::Contact(answer!(self.read_contact().await?))
            }
            Step::ContactEntryPlus => {
                let email = answer!(self.ask("Email").await?);
                let contact = answer!(self.read_contact().await?);
                StepInput::ContactPlus(ContactPlusForm { email, contact })
            }
            Step::AddMoreContact => StepInput::AddMoreContact(answer!(
                self.ask_yes_no("Add another contact?").await?
            )),
            Step::IdentityAccountDecision => {
                let label = match email {
                    Some(email) => format!("Create an account for {email}?"),
                    None => "Create an account?".to_string(),
                };
                StepInput::IdentityAccount(answer!(self.ask_yes_no(&label).await?))
            }
            Step::PasswordCreation => {
                if let Some(email) = email {
                    self.say(&format!("Account for {email}")).await?;
                }
                let password = answer!(self.ask("Password").await?);
                let confirmation = answer!(self.ask("Confirm password").await?);
                StepInput::Password(PasswordForm::new(password, confirmation))
            }
            Step::Complete => return Ok(Reply::Quit),
        };
        Ok(Reply::Answer(input))
    }

    async fn read_contact(&mut self) -> std::io::Result<Reply<ContactForm>> {
        let name = answer!(self.ask("Full name").await?);
        let phone = answer!(self.ask("Phone").await?);
        let sector = answer!(self.ask(&format!("Sector ({})", SECTORS.join("/"))).await?);
        let role = answer!(self.ask(&format!("Role ({})", ROLES.join("/"))).await?);
        Ok(Reply::Answer(ContactForm {
            name,
            phone,
            sector,
            role,
        }))
    }
}
