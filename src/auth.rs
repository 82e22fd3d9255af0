// ABOUTME: Credential resolution with an explicit precedence list
// ABOUTME: Credentials → --token flag → BAZQUX_TOKEN env var → interactive prompt

use crate::api::{truncate_str, DEFAULT_API_BASE, USER_AGENT};
use crate::{Error, Result};
use reqwest::blocking::Client;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::{debug, info};

pub const TOKEN_ENV_VAR: &str = "BAZQUX_TOKEN";

const CLIENT_LOGIN: &str = "/accounts/ClientLogin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOrigin {
    Flag,
    Environment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Credentials { email: String, password: String },
    Token { token: String, origin: TokenOrigin },
    Prompt,
}

/// Ordered credential sources; the first entry wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    pub sources: Vec<CredentialSource>,
}

impl AuthConfig {
    pub fn from_sources(
        email: Option<String>,
        password: Option<String>,
        token: Option<String>,
        env_token: Option<String>,
        allow_prompt: bool,
    ) -> Self {
        let mut sources = Vec::new();

        if let (Some(email), Some(password)) = (email, password) {
            sources.push(CredentialSource::Credentials { email, password });
        }
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            sources.push(CredentialSource::Token {
                token,
                origin: TokenOrigin::Flag,
            });
        }
        if let Some(token) = env_token.filter(|t| !t.is_empty()) {
            sources.push(CredentialSource::Token {
                token,
                origin: TokenOrigin::Environment,
            });
        }
        if allow_prompt {
            sources.push(CredentialSource::Prompt);
        }

        AuthConfig { sources }
    }
}

/// Asks the user for an email and password.
pub trait CredentialPrompt {
    fn credentials(&mut self) -> Result<(String, String)>;
}

pub struct StdinPrompt;

impl StdinPrompt {
    fn ask(label: &str) -> Result<String> {
        print!("{}: ", label);
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl CredentialPrompt for StdinPrompt {
    fn credentials(&mut self) -> Result<(String, String)> {
        println!("Please provide your BazQux credentials.");
        let email = Self::ask("Email")?;
        let password = Self::ask("Password")?;
        Ok((email, password))
    }
}

/// Extracts the `Auth=` value from a ClientLogin response body.
pub fn parse_login_response(body: &str) -> Result<String> {
    body.lines()
        .find_map(|line| line.trim().strip_prefix("Auth="))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::Auth("No authentication token found in the response".into()))
}

pub struct Authenticator {
    client: Client,
    base_url: String,
}

impl Authenticator {
    pub fn new(base_url: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;
        let base_url = base_url.unwrap_or_else(|| DEFAULT_API_BASE.into());

        Ok(Authenticator {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn client_login(&self, email: &str, password: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, CLIENT_LOGIN);
        debug!(url = %url, email, "POST");

        let response = self
            .client
            .post(&url)
            .form(&[("Email", email), ("Passwd", password)])
            .send()
            .map_err(|e| Error::Auth(format!("login request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| Error::Auth(format!("login response unreadable: {}", e)))?;
        if !status.is_success() {
            return Err(Error::Auth(format!(
                "login rejected with status {}: {}",
                status.as_u16(),
                truncate_str(body.trim(), 100)
            )));
        }

        parse_login_response(&body)
    }

    /// Produces a bearer token from the first configured source.
    pub fn resolve(&self, config: &AuthConfig, prompt: &mut dyn CredentialPrompt) -> Result<String> {
        let source = config.sources.first().ok_or_else(|| {
            Error::Auth(format!(
                "No credentials available. Provide --email/--password, --token, or {}",
                TOKEN_ENV_VAR
            ))
        })?;

        match source {
            CredentialSource::Credentials { email, password } => {
                println!("Authenticating with email: {}", email);
                self.client_login(email, password)
            }
            CredentialSource::Token { token, origin } => {
                info!(?origin, "using supplied token");
                Ok(token.clone())
            }
            CredentialSource::Prompt => {
                let (email, password) = prompt.credentials()?;
                self.client_login(&email, &password)
            }
        }
    }
}
