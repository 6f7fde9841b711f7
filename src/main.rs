use std::sync::Arc;

use partner_signup::config::ApiConfig;
use partner_signup::employees::EmployeeRegistration;
use partner_signup::flow::{FlowServices, RegistrationFlow};
use partner_signup::services::ApiClient;
use partner_signup::terminal::{RegistrationType, SessionEnd, TerminalWizard};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they do not interleave with the prompts
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let client = Arc::new(ApiClient::new(ApiConfig::from_env()?));

    eprintln!("Partner Signup v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", client.config().api_url);
    eprintln!("   Password endpoint: {}", client.config().password_url);
    eprintln!("   Type :back to return to the previous step, :quit to exit.\n");

    let mut wizard = TerminalWizard::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    let Some(kind) = wizard.choose_type().await? else {
        return Ok(());
    };
    if !wizard.accept_terms().await? {
        return Ok(());
    }

    let end = match kind {
        RegistrationType::NationalClient => {
            let mut flow = RegistrationFlow::new(FlowServices::from_client(client));
            wizard.run(&mut flow).await?
        }
        RegistrationType::Employee => {
            wizard
                .run_employees(&EmployeeRegistration::new(client))
                .await?
        }
    };

    match end {
        SessionEnd::Completed(receipt) => {
            tracing::info!(
                session_id = %receipt.session_id,
                company_id = %receipt.company_id,
                contacts = receipt.contacts,
                "Session finished"
            );
        }
        SessionEnd::EmployeesRegistered(receipt) => {
            tracing::info!(employees = receipt.employees, "Session finished");
        }
        SessionEnd::Abandoned => {
            tracing::info!(registration = ?kind, "Session abandoned");
        }
    }

    Ok(())
}
