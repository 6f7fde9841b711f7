//! Wizard steps, one named stage per form.

use serde::{Deserialize, Serialize};

/// The steps of the national-client registration flow.
///
/// Branches rather than progressing linearly: IdentityLookup →
/// {NationalData, EmailLookup} → {ContactEntry, AddMoreContact} →
/// {ContactEntryPlus, IdentityAccountDecision} → {PasswordCreation, Complete}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    IdentityLookup,
    NationalData,
    EmailLookup,
    ContactEntry,
    ContactEntryPlus,
    AddMoreContact,
    IdentityAccountDecision,
    PasswordCreation,
    Complete,
}

impl Step {
    /// Every step, in the order a first-time registration meets them.
    pub const ALL: [Step; 9] = [
        Step::IdentityLookup,
        Step::NationalData,
        Step::EmailLookup,
        Step::ContactEntry,
        Step::ContactEntryPlus,
        Step::AddMoreContact,
        Step::IdentityAccountDecision,
        Step::PasswordCreation,
        Step::Complete,
    ];

    /// Whether this step is terminal (nothing left to collect).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Short heading shown above the step's form.
    pub fn title(&self) -> &'static str {
        match self {
            Self::IdentityLookup => "Company ID (CNPJ)",
            Self::NationalData => "Company data",
            Self::EmailLookup => "Email",
            Self::ContactEntry => "Contact data",
            Self::ContactEntryPlus => "Additional contact",
            Self::AddMoreContact => "Add more contacts?",
            Self::IdentityAccountDecision => "Create your account?",
            Self::PasswordCreation => "Create password",
            Self::Complete => "Registration complete",
        }
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::IdentityLookup
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::IdentityLookup => "identity_lookup",
            Self::NationalData => "national_data",
            Self::EmailLookup => "email_lookup",
            Self::ContactEntry => "contact_entry",
            Self::ContactEntryPlus => "contact_entry_plus",
            Self::AddMoreContact => "add_more_contact",
            Self::IdentityAccountDecision => "identity_account_decision",
            Self::PasswordCreation => "password_creation",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity_lookup() {
        assert_eq!(Step::default(), Step::IdentityLookup);
    }

    #[test]
    fn only_complete_is_terminal() {
        for step in Step::ALL {
            assert_eq!(step.is_terminal(), step == Step::Complete, "{step}");
        }
    }

    #[test]
    fn display_matches_serde() {
        for step in Step::ALL {
            let display = format!("{step}");
            let json = serde_json::to_string(&step).unwrap();
            // JSON wraps in quotes
            assert_eq!(
                format!("\"{display}\""),
                json,
                "Display and serde should match for {step:?}"
            );
        }
    }
}
