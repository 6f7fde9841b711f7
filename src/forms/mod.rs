//! Step forms: raw user input for each step and its validation.
//!
//! A form only checks its own fields. Remote existence checks are left to
//! the flow controller, which owns the lookup collaborators.

pub mod validators;

use secrecy::{ExposeSecret, SecretString};

use crate::employees::Employee;
use crate::error::FieldErrors;
use crate::flow::{CompanyDetails, Contact, Step};

use validators::{MIN_PASSWORD_LEN, check_email, check_phone, digits_only, require};

/// Sectors offered by the contact forms.
pub const SECTORS: [&str; 3] = ["comercial", "diretoria", "financeiro"];

/// Roles offered by the contact forms.
pub const ROLES: [&str; 3] = ["analista", "assistente", "diretor"];

/// Tax ID entry.
#[derive(Debug, Clone, Default)]
pub struct IdentityForm {
    pub tax_id: String,
}

impl IdentityForm {
    /// Validate and return the tax ID reduced to digits.
    pub fn validate(&self) -> Result<String, FieldErrors> {
        let mut errors = FieldErrors::new();
        if require(&mut errors, "tax_id", &self.tax_id, "CNPJ") {
            if !validators::is_cnpj_format(&self.tax_id) {
                errors.push("tax_id", "Invalid CNPJ format");
            } else if !validators::is_valid_cnpj(&self.tax_id) {
                errors.push("tax_id", "Invalid CNPJ");
            }
        }
        errors.into_result()?;
        Ok(digits_only(&self.tax_id))
    }
}

/// Company data entry, shown when the tax ID is not yet registered.
#[derive(Debug, Clone, Default)]
pub struct NationalDataForm {
    pub trade_name: String,
    pub legal_name: String,
    pub tax_classification: String,
    pub country: String,
    pub postal_code: String,
    pub street: String,
    pub district: String,
    pub number: String,
    pub segment: String,
    pub subsegment: String,
}

impl NationalDataForm {
    pub fn validate(&self) -> Result<CompanyDetails, FieldErrors> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "trade_name", &self.trade_name, "Company name");
        require(&mut errors, "legal_name", &self.legal_name, "Legal name");
        require(
            &mut errors,
            "tax_classification",
            &self.tax_classification,
            "Tax classification",
        );
        require(&mut errors, "country", &self.country, "Country");
        if require(&mut errors, "postal_code", &self.postal_code, "Postal code")
            && !validators::is_valid_postal_code(&self.postal_code)
        {
            errors.push("postal_code", "Invalid postal code");
        }
        require(&mut errors, "street", &self.street, "Street");
        require(&mut errors, "district", &self.district, "District");
        require(&mut errors, "number", &self.number, "Number");
        require(&mut errors, "segment", &self.segment, "Segment");
        require(&mut errors, "subsegment", &self.subsegment, "Subsegment");
        errors.into_result()?;

        Ok(CompanyDetails {
            trade_name: self.trade_name.trim().to_string(),
            legal_name: self.legal_name.trim().to_string(),
            tax_classification: self.tax_classification.trim().to_string(),
            country: self.country.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
            street: self.street.trim().to_string(),
            district: self.district.trim().to_string(),
            number: self.number.trim().to_string(),
            segment: self.segment.trim().to_string(),
            subsegment: self.subsegment.trim().to_string(),
        })
    }
}

/// Email entry, checked against existing contacts and accounts.
#[derive(Debug, Clone, Default)]
pub struct EmailForm {
    pub email: String,
}

impl EmailForm {
    pub fn validate(&self) -> Result<String, FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, "email", &self.email);
        errors.into_result()?;
        Ok(self.email.trim().to_string())
    }
}

/// Contact entry for the person whose email was just checked.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub phone: String,
    pub sector: String,
    pub role: String,
}

impl ContactForm {
    /// Validate into a contact without its own email.
    pub fn validate(&self) -> Result<Contact, FieldErrors> {
        let mut errors = FieldErrors::new();
        self.check(&mut errors);
        errors.into_result()?;
        Ok(self.to_contact(None))
    }

    fn check(&self, errors: &mut FieldErrors) {
        require(errors, "name", &self.name, "Full name");
        check_phone(errors, "phone", &self.phone);
        require(errors, "sector", &self.sector, "Sector");
        require(errors, "role", &self.role, "Role");
    }

    fn to_contact(&self, email: Option<String>) -> Contact {
        Contact {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            sector: self.sector.trim().to_string(),
            role: self.role.trim().to_string(),
            email,
        }
    }
}

/// Additional contact entry, which asks for the contact's own email.
#[derive(Debug, Clone, Default)]
pub struct ContactPlusForm {
    pub email: String,
    pub contact: ContactForm,
}

impl ContactPlusForm {
    pub fn validate(&self) -> Result<Contact, FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, "email", &self.email);
        self.contact.check(&mut errors);
        errors.into_result()?;
        Ok(self.contact.to_contact(Some(self.email.trim().to_string())))
    }
}

/// Password and its confirmation.
#[derive(Debug)]
pub struct PasswordForm {
    pub password: SecretString,
    pub confirmation: SecretString,
}

impl PasswordForm {
    pub fn new(password: impl Into<String>, confirmation: impl Into<String>) -> Self {
        Self {
            password: SecretString::from(password.into()),
            confirmation: SecretString::from(confirmation.into()),
        }
    }

    /// Validate and hand back the password.
    pub fn validate(self) -> Result<SecretString, FieldErrors> {
        let mut errors = FieldErrors::new();
        let password = self.password.expose_secret();
        if password != self.confirmation.expose_secret() {
            errors.push("confirmation", "Passwords do not match");
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
        errors.into_result()?;
        Ok(self.password)
    }
}

/// One employee entry. Phones are international (`+5511987654321`) and the
/// birthday is typed as `DD/MM/YYYY` or `YYYY-MM-DD`.
#[derive(Debug, Clone, Default)]
pub struct EmployeeForm {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub sector: String,
    pub role: String,
    pub birthday: String,
}

impl EmployeeForm {
    pub fn validate(&self) -> Result<Employee, FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, "email", &self.email);
        require(&mut errors, "name", &self.name, "Full name");
        if require(&mut errors, "phone", &self.phone, "Phone")
            && !validators::is_valid_international_phone(&self.phone)
        {
            errors.push("phone", "Invalid phone number");
        }
        require(&mut errors, "sector", &self.sector, "Sector");
        require(&mut errors, "role", &self.role, "Role");
        let birthday = validators::parse_date(&self.birthday);
        if require(&mut errors, "birthday", &self.birthday, "Birthday") && birthday.is_none() {
            errors.push("birthday", "Invalid date");
        }

        match birthday {
            Some(birthday) if errors.is_empty() => Ok(Employee {
                email: self.email.trim().to_string(),
                name: self.name.trim().to_string(),
                phone: self.phone.trim().to_string(),
                sector: self.sector.trim().to_string(),
                role: self.role.trim().to_string(),
                birthday,
            }),
            _ => Err(errors),
        }
    }
}

/// Raw input for whichever step is current.
#[derive(Debug)]
pub enum StepInput {
    Identity(IdentityForm),
    NationalData(NationalDataForm),
    Email(EmailForm),
    Contact(ContactForm),
    ContactPlus(ContactPlusForm),
    AddMoreContact(bool),
    IdentityAccount(bool),
    Password(PasswordForm),
}

impl StepInput {
    /// The step this input belongs to.
    pub fn step(&self) -> Step {
        match self {
            Self::Identity(_) => Step::IdentityLookup,
            Self::NationalData(_) => Step::NationalData,
            Self::Email(_) => Step::EmailLookup,
            Self::Contact(_) => Step::ContactEntry,
            Self::ContactPlus(_) => Step::ContactEntryPlus,
            Self::AddMoreContact(_) => Step::AddMoreContact,
            Self::IdentityAccount(_) => Step::IdentityAccountDecision,
            Self::Password(_) => Step::PasswordCreation,
        }
    }

    /// Short name used in logs and flow errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Identity(_) => "identity_form",
            Self::NationalData(_) => "national_data_form",
            Self::Email(_) => "email_form",
            Self::Contact(_) => "contact_form",
            Self::ContactPlus(_) => "contact_plus_form",
            Self::AddMoreContact(_) => "add_more_contact",
            Self::IdentityAccount(_) => "identity_account",
            Self::Password(_) => "password_form",
        }
    }
}
