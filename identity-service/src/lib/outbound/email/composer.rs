use auth::TokenLifetimes;

use crate::domain::user::models::EmailTemplate;

/// Rendered subject and bodies of a transactional email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Renders the verify and reset emails.
#[derive(Debug, Clone)]
pub struct EmailComposer {
    app_name: String,
    verify_minutes: i64,
    reset_minutes: i64,
}

impl EmailComposer {
    pub fn new(app_name: impl Into<String>, lifetimes: &TokenLifetimes) -> Self {
        Self {
            app_name: app_name.into(),
            verify_minutes: lifetimes.verify_email.num_minutes(),
            reset_minutes: lifetimes.reset_password.num_minutes(),
        }
    }

    pub fn compose(&self, template: EmailTemplate, link: &str) -> ComposedEmail {
        match template {
            EmailTemplate::Verify => self.render(
                format!("Verify your email - {}", self.app_name),
                format!("Thanks for signing up on {}.", self.app_name),
                format!(
                    "Please click the link below to verify your email address (valid for {} minutes):",
                    self.verify_minutes
                ),
                link,
            ),
            EmailTemplate::Reset => self.render(
                format!("Reset your password - {}", self.app_name),
                format!(
                    "We received a request to reset your password on {}.",
                    self.app_name
                ),
                format!(
                    "Please click the link below to choose a new password (valid for {} minutes):",
                    self.reset_minutes
                ),
                link,
            ),
        }
    }

    fn render(&self, subject: String, intro: String, action: String, link: &str) -> ComposedEmail {
        let text = format!(
            "Hi,\n\n{}\n\n{}\n{}\n\nIf you did not request this, you can ignore this email.\n\nRegards,\n{}\n",
            intro, action, link, self.app_name
        );

        let link = escape_html(link);
        let html = format!(
            "<p>Hi,</p>\n<p>{}</p>\n<p>{}</p>\n<p><a href=\"{}\">{}</a></p>\n\
             <p>If you did not request this, you can ignore this email.</p>\n\
             <p>Regards,<br/>{}</p>\n",
            escape_html(&intro),
            escape_html(&action),
            link,
            link,
            escape_html(&self.app_name)
        );

        ComposedEmail {
            subject,
            text,
            html,
        }
    }
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
