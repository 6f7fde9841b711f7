//! HTTP-backed collaborators talking to the registration API.

use async_trait::async_trait;
use reqwest::{Response, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::employees::Employee;
use crate::error::ServiceError;
use crate::flow::{CompanyRecord, ContactRecord};
use crate::forms::validators::digits_only;

use super::payload::{
    CompanyEnvelope, CompanyExistsResponse, CompanyInfo, ContactEnvelope, ContactInfo,
    EmailCheckResponse, EmployeeBatch, EmployeeExistsResponse, EmployeeInfo, PasswordBody,
    TYPE_ID_CNPJ,
};
use super::{
    EmailLookup, EmployeeRegistrar, IdentityLookup, PasswordService, RegistrationSubmitter,
};

/// Registration API client. One instance serves every collaborator role.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiConfig,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `{api_url}/seg1/seg2/...`, with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.config.api_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                ServiceError::Network(format!("{} cannot hold a path", self.config.api_url))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: Url,
        body: &T,
    ) -> Result<(), ServiceError> {
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        ensure_success(resp).await?;
        Ok(())
    }
}

fn transport(e: reqwest::Error) -> ServiceError {
    ServiceError::Network(e.to_string())
}

async fn ensure_success(resp: Response) -> Result<Response, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ServiceError::Rejected {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ServiceError> {
    let resp = ensure_success(resp).await?;
    resp.json::<T>()
        .await
        .map_err(|e| ServiceError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl IdentityLookup for ApiClient {
    async fn exists(&self, identity_id: &str) -> Result<bool, ServiceError> {
        let company_id = digits_only(identity_id);
        let url = self.endpoint(&["companies", "exists"])?;
        tracing::debug!(company_id = %company_id, "Checking company ID");

        let resp = self
            .client
            .get(url)
            .query(&[("companyID", company_id.as_str()), ("typeID", TYPE_ID_CNPJ)])
            .send()
            .await
            .map_err(transport)?;
        let body: CompanyExistsResponse = decode(resp).await?;
        Ok(body.exists)
    }
}

#[async_trait]
impl EmailLookup for ApiClient {
    async fn exists(&self, email: &str) -> Result<bool, ServiceError> {
        let url = self.endpoint(&["contacts", "check-email", email])?;
        tracing::debug!(email = %email, "Checking email");

        let resp = self.client.get(url).send().await.map_err(transport)?;
        let body: EmailCheckResponse = decode(resp).await?;
        Ok(body.exists())
    }
}

#[async_trait]
impl RegistrationSubmitter for ApiClient {
    /// Creates the company, then each contact in order. Stops at the first
    /// failure; nothing already created is rolled back.
    async fn submit(
        &self,
        company: &CompanyRecord,
        contacts: &[ContactRecord],
    ) -> Result<(), ServiceError> {
        let company_info = CompanyInfo::from(company);
        self.post_json(
            self.endpoint(&["companies"])?,
            &CompanyEnvelope {
                company_info: &company_info,
            },
        )
        .await?;
        tracing::info!(company_id = %company.company_id, "Company created");

        let contacts_url = self.endpoint(&["contacts"])?;
        for record in contacts {
            let contact_info = ContactInfo::new(record, &company.company_id);
            self.post_json(
                contacts_url.clone(),
                &ContactEnvelope {
                    contact_info: &contact_info,
                },
            )
            .await?;
        }
        tracing::info!(count = contacts.len(), "Contacts created");
        Ok(())
    }
}

#[async_trait]
impl PasswordService for ApiClient {
    async fn create(&self, email: &str, password: &SecretString) -> Result<(), ServiceError> {
        let body = PasswordBody {
            email,
            senha: password.expose_secret(),
        };
        self.post_json(self.config.password_url.clone(), &body)
            .await
    }
}

#[async_trait]
impl EmployeeRegistrar for ApiClient {
    /// The email is trimmed and lowercased before the check.
    async fn email_exists(&self, email: &str) -> Result<bool, ServiceError> {
        let email = email.trim().to_lowercase();
        let url = self.endpoint(&["employees", "exists"])?;
        tracing::debug!(email = %email, "Checking employee email");

        let resp = self
            .client
            .get(url)
            .query(&[("email", email.as_str())])
            .send()
            .await
            .map_err(transport)?;
        let body: EmployeeExistsResponse = decode(resp).await?;
        Ok(body.exists)
    }

    async fn register(&self, employees: &[Employee]) -> Result<(), ServiceError> {
        let infos: Vec<EmployeeInfo> = employees.iter().map(EmployeeInfo::from).collect();
        self.post_json(
            self.endpoint(&["employees"])?,
            &EmployeeBatch {
                colaboradores: &infos,
            },
        )
        .await
    }
}
