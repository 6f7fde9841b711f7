//! Registration data models collected by the step forms.

use serde::{Deserialize, Serialize};

/// A person to be registered as a contact of the company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone: String,
    pub sector: String,
    pub role: String,
    /// Only set when the contact came from the "plus" contact form, which
    /// asks for the email explicitly. Back-navigation relies on this to
    /// know which form produced the contact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Contact {
    /// Whether the contact carries its own, non-blank email.
    pub fn has_email(&self) -> bool {
        self.email
            .as_deref()
            .is_some_and(|email| !email.trim().is_empty())
    }
}

/// Company data entered when the tax ID is not yet registered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDetails {
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

impl CompanyDetails {
    /// Single-line postal address, or `None` unless street, number,
    /// district and postal code are all filled in.
    pub fn address_line(&self) -> Option<String> {
        let parts = [&self.street, &self.number, &self.district, &self.postal_code];
        if parts.iter().any(|p| p.trim().is_empty()) {
            return None;
        }
        Some(format!(
            "{}, {} - {}, CEP {}",
            self.street, self.number, self.district, self.postal_code
        ))
    }
}

/// Normalized company record handed to the submission collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRecord {
    /// Tax ID, digits only.
    pub company_id: String,
    /// `None` when the company already existed and data entry was skipped.
    pub details: Option<CompanyDetails>,
}

/// Normalized contact record handed to the submission collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub sector: String,
    pub role: String,
}

impl ContactRecord {
    /// Build a record, falling back to `fallback_email` (the email captured
    /// by the email step) for contacts entered without their own.
    pub fn from_contact(contact: &Contact, fallback_email: Option<&str>) -> Self {
        let email = match contact.email.as_deref() {
            Some(email) if !email.trim().is_empty() => email.to_string(),
            _ => fallback_email.unwrap_or_default().to_string(),
        };
        Self {
            name: contact.name.clone(),
            email,
            phone: contact.phone.clone(),
            sector: contact.sector.clone(),
            role: contact.role.clone(),
        }
    }
}
