//! Field-level validation rules shared by the step forms.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::FieldErrors;

/// Minimum password length accepted by the account step.
pub const MIN_PASSWORD_LEN: usize = 6;

static CNPJ_MASKED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}$").expect("valid regex"));

static CNPJ_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{14}$").expect("valid regex"));

static POSTAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}-?\d{3}$").expect("valid regex"));

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(?\d{2}\)?\s?\d{4,5}-?\d{4}$").expect("valid regex"));

/// E.164-style number: optional `+`, no leading zero, up to 15 digits.
static INTL_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").expect("valid regex"));

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Push a "required" error when `value` is blank. Returns whether the value
/// was present, so callers can skip format checks on empty input.
pub fn require(errors: &mut FieldErrors, field: &'static str, value: &str, label: &str) -> bool {
    if value.trim().is_empty() {
        errors.push(field, format!("{label} is required"));
        false
    } else {
        true
    }
}

/// Strip everything but ASCII digits.
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Whether `value` is typed as a CNPJ: masked `NN.NNN.NNN/NNNN-NN` or 14
/// bare digits.
pub fn is_cnpj_format(value: &str) -> bool {
    let value = value.trim();
    CNPJ_MASKED.is_match(value) || CNPJ_DIGITS.is_match(value)
}

/// Whether the 14 digits of `value` form a valid CNPJ: not a repeated digit
/// and both mod-11 check digits correct.
pub fn is_valid_cnpj(value: &str) -> bool {
    let digits: Vec<u32> = digits_only(value)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();
    if digits.len() != 14 {
        return false;
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    const FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
    const SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

    let check_digit = |body: &[u32], weights: &[u32]| -> u32 {
        let sum: u32 = body.iter().zip(weights).map(|(d, w)| d * w).sum();
        match sum % 11 {
            r if r < 2 => 0,
            r => 11 - r,
        }
    };

    check_digit(&digits[..12], &FIRST_WEIGHTS) == digits[12]
        && check_digit(&digits[..13], &SECOND_WEIGHTS) == digits[13]
}

pub fn is_valid_postal_code(value: &str) -> bool {
    POSTAL_CODE.is_match(value.trim())
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE.is_match(value.trim())
}

pub fn is_valid_international_phone(value: &str) -> bool {
    INTL_PHONE.is_match(value.trim())
}

/// Parse a calendar date typed as `DD/MM/YYYY` or `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value.trim())
}

/// Required + format check for an email field.
pub fn check_email(errors: &mut FieldErrors, field: &'static str, value: &str) {
    if require(errors, field, value, "Email") && !is_valid_email(value) {
        errors.push(field, "Invalid email format");
    }
}

/// Required + format check for a phone field.
pub fn check_phone(errors: &mut FieldErrors, field: &'static str, value: &str) {
    if require(errors, field, value, "Phone") && !is_valid_phone(value) {
        errors.push(field, "Invalid phone number");
    }
}
