//! JSON payloads exchanged with the registration API.

use serde::{Deserialize, Serialize};

use chrono::NaiveDate;

use crate::employees::Employee;
use crate::flow::{CompanyRecord, ContactRecord};

/// Identifier type sent with every company lookup and creation.
pub const TYPE_ID_CNPJ: &str = "CNPJ";

/// Company registration type for the national-client flow.
pub const COMPANY_TYPE_NATIONAL: &str = "nacional";

/// Company body for `POST /companies`. Key casing follows the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub country: String,
    #[serde(rename = "companyName")]
    pub company_name: String,
    #[serde(rename = "socialNameCompany")]
    pub social_name_company: String,
    #[serde(rename = "companyID")]
    pub company_id: String,
    #[serde(rename = "typeID")]
    pub type_id: String,
    #[serde(rename = "socialClass")]
    pub social_class: String,
    #[serde(rename = "Segment")]
    pub segment: String,
    #[serde(rename = "SubSegment")]
    pub sub_segment: Vec<String>,
    pub website: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<&CompanyRecord> for CompanyInfo {
    fn from(record: &CompanyRecord) -> Self {
        let details = record.details.clone().unwrap_or_default();
        let address = details.address_line().unwrap_or_default();
        let sub_segment = if details.subsegment.is_empty() {
            Vec::new()
        } else {
            vec![details.subsegment.clone()]
        };
        Self {
            country: details.country,
            // The API's "companyName" is the legal name; the trade name goes
            // in "socialNameCompany".
            company_name: details.legal_name,
            social_name_company: details.trade_name,
            company_id: record.company_id.clone(),
            type_id: TYPE_ID_CNPJ.to_string(),
            social_class: details.tax_classification,
            segment: details.segment,
            sub_segment,
            website: String::new(),
            state: String::new(),
            city: String::new(),
            address,
            kind: COMPANY_TYPE_NATIONAL.to_string(),
        }
    }
}

/// Contact body for `POST /contacts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub sector: String,
    #[serde(rename = "companyID")]
    pub company_id: String,
}

impl ContactInfo {
    pub fn new(record: &ContactRecord, company_id: &str) -> Self {
        Self {
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            role: record.role.clone(),
            sector: record.sector.clone(),
            company_id: company_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyEnvelope<'a> {
    pub company_info: &'a CompanyInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactEnvelope<'a> {
    pub contact_info: &'a ContactInfo,
}

/// Body for the password endpoint.
#[derive(Debug, Serialize)]
pub struct PasswordBody<'a> {
    pub email: &'a str,
    pub senha: &'a str,
}

/// Response of `GET /companies/exists`.
#[derive(Debug, Deserialize)]
pub struct CompanyExistsResponse {
    pub exists: bool,
}

/// Response of `GET /contacts/check-email/{email}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailCheckResponse {
    #[serde(default)]
    pub contact_exists: bool,
    #[serde(default)]
    pub user_exists: bool,
}

impl EmailCheckResponse {
    pub fn exists(&self) -> bool {
        self.contact_exists || self.user_exists
    }
}

/// One employee in the `POST /employees` batch. Key names follow the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeInfo {
    pub email: String,
    pub name: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "setor")]
    pub sector: String,
    #[serde(rename = "cargo")]
    pub role: String,
    #[serde(rename = "dataAniversario")]
    pub birthday: NaiveDate,
}

impl From<&Employee> for EmployeeInfo {
    fn from(employee: &Employee) -> Self {
        Self {
            email: employee.email.clone(),
            name: employee.name.clone(),
            phone: employee.phone.clone(),
            sector: employee.sector.clone(),
            role: employee.role.clone(),
            birthday: employee.birthday,
        }
    }
}

/// Body for `POST /employees`.
#[derive(Debug, Serialize)]
pub struct EmployeeBatch<'a> {
    pub colaboradores: &'a [EmployeeInfo],
}

/// Response of `GET /employees/exists`.
#[derive(Debug, Deserialize)]
pub struct EmployeeExistsResponse {
    pub exists: bool,
}
