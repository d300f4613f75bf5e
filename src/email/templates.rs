use askama::Template;
use chrono::{DateTime, Utc};

use crate::services::accounts::RESET_TOKEN_TTL_HOURS;
use crate::services::invites::INVITE_TTL_DAYS;

// Askama escapes every interpolated value in `.html` templates.

#[derive(Template)]
#[template(path = "email/invite.html")]
struct InviteTemplate<'a> {
    tenant_name: &'a str,
    role: &'a str,
    accept_url: &'a str,
    ttl_days: i64,
}

#[derive(Template)]
#[template(path = "email/invite_reminder.html")]
struct InviteReminderTemplate<'a> {
    tenant_name: &'a str,
    role: &'a str,
    expires: String,
}

#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetTemplate<'a> {
    reset_url: &'a str,
    ttl_hours: i64,
}

pub fn render_invite(tenant_name: &str, role: &str, accept_url: &str) -> Result<String, String> {
    InviteTemplate {
        tenant_name,
        role,
        accept_url,
        ttl_days: INVITE_TTL_DAYS,
    }
    .render()
    .map_err(|e| format!("Failed to render invite email: {e}"))
}

pub fn render_invite_reminder(
    tenant_name: &str,
    role: &str,
    expires_at: DateTime<Utc>,
) -> Result<String, String> {
    InviteReminderTemplate {
        tenant_name,
        role,
        expires: expires_at.format("%Y-%m-%d %H:%M UTC").to_string(),
    }
    .render()
    .map_err(|e| format!("Failed to render reminder email: {e}"))
}

pub fn render_password_reset(reset_url: &str) -> Result<String, String> {
    PasswordResetTemplate {
        reset_url,
        ttl_hours: RESET_TOKEN_TTL_HOURS,
    }
    .render()
    .map_err(|e| format!("Failed to render reset email: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOSTILE: &str = r#"<a href="https://evil.test">Click</a>"#;

    #[test]
    fn invite_escapes_tenant_and_role() {
        let html = render_invite(HOSTILE, "<b>admin</b>", "https://app.test/invites/accept").unwrap();
        assert!(!html.contains("<a href=\"https://evil.test\">"));
        assert!(!html.contains("<b>admin</b>"));
        assert!(html.contains("&lt;a href="));
        assert!(html.contains("&lt;b&gt;admin&lt;/b&gt;"));
    }

    #[test]
    fn reminder_escapes_tenant_name() {
        let html = render_invite_reminder(HOSTILE, "member", Utc::now()).unwrap();
        assert!(!html.contains("<a href=\"https://evil.test\">"));
        assert!(html.contains("&lt;a href="));
    }

    #[test]
    fn invite_keeps_plain_values_readable() {
        let html = render_invite("Acme", "member", "https://app.test/accept").unwrap();
        assert!(html.contains("You've been invited to Acme"));
        assert!(html.contains("<strong>member</strong>"));
        assert!(html.contains("href=\"https://app.test/accept\""));
        assert!(html.contains("expires in 7 days"));
    }

    #[test]
    fn reset_links_to_the_given_url() {
        let html = render_password_reset("https://app.test/reset").unwrap();
        assert!(html.contains("href=\"https://app.test/reset\""));
    }
}
