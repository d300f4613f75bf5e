use std::net::IpAddr;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
    pub superadmin: Option<SuperadminConfig>,
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

/// Credentials for the process-wide superadmin seeded at startup.
#[derive(Clone)]
pub struct SuperadminConfig {
    pub email: String,
    pub password: String,
}

const MIN_JWT_SECRET_LEN: usize = 32;

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(format!(
                "JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} bytes"
            ));
        }

        let host: IpAddr = env_or("GATEKEEPER_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid GATEKEEPER_HOST: {e}"))?;

        let port: u16 = env_or("GATEKEEPER_PORT", "9000")
            .parse()
            .map_err(|e| format!("Invalid GATEKEEPER_PORT: {e}"))?;

        let base_url = env_or("GATEKEEPER_BASE_URL", &format!("http://{host}:{port}"));

        let log_level = env_or("GATEKEEPER_LOG_LEVEL", "info");

        let smtp = match (
            std::env::var("GATEKEEPER_SMTP_HOST").ok(),
            std::env::var("GATEKEEPER_SMTP_PORT").ok(),
            std::env::var("GATEKEEPER_SMTP_USER").ok(),
            std::env::var("GATEKEEPER_SMTP_PASS").ok(),
            std::env::var("GATEKEEPER_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid GATEKEEPER_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        let superadmin = match (
            std::env::var("SUPERADMIN_EMAIL").ok(),
            std::env::var("SUPERADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(SuperadminConfig { email, password })
            }
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            base_url,
            log_level,
            smtp,
            superadmin,
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"<redacted>")
            .field("jwt_secret", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("log_level", &self.log_level)
            .field("smtp", &self.smtp)
            .field("superadmin", &self.superadmin)
            .finish()
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .field("from", &self.from)
            .finish()
    }
}

impl std::fmt::Debug for SuperadminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuperadminConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
