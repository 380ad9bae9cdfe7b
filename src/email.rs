//! Outbound mail. Every send here is best-effort: callers log failures and
//! surface them as a `warning` string in an otherwise-successful response;
//! a failed email never rolls back the order or registration behind it.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use thiserror::Error;

use crate::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("mailer is not configured")]
    Disabled,

    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    #[error("failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("invalid email address: {0}")]
    InvalidAddress(String),
}

#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: String,
}

impl Mailer {
    /// Build the SMTP transport, or a disabled mailer when no SMTP settings
    /// are present in the environment.
    pub fn from_config(config: Option<&SmtpConfig>) -> Result<Self, SmtpError> {
        let Some(config) = config else {
            tracing::info!("SMTP not configured; outbound email disabled");
            return Ok(Self::disabled());
        };

        let credentials =
            Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport: Some(transport),
            from_address: config.from_address.clone(),
        })
    }

    pub fn disabled() -> Self {
        Self {
            transport: None,
            from_address: String::new(),
        }
    }

    pub async fn send_welcome(&self, to: &str, name: &str) -> Result<(), EmailError> {
        let text = format!(
            "Hi {name},\n\nThank you for signing up to Yaqeen Clothing! You can now shop \
             the latest collections and view your orders from your profile."
        );
        let html = render_html(
            &format!("Hi {name}"),
            "Thank you for signing up to Yaqeen Clothing",
            None,
            "We're excited to have you with us. You can now shop the latest collections \
             and view your orders from your profile.",
        );
        self.send(to, "Welcome to Yaqeen Clothing", &text, &html).await
    }

    pub async fn send_order_confirmation(
        &self,
        to: &str,
        order_number: &str,
        total_price: i64,
    ) -> Result<(), EmailError> {
        let text = format!(
            "Thank you for your order!\n\nOrder number: {order_number}\nTotal: {total_price}\n\n\
             We'll let you know when it ships."
        );
        let html = render_html(
            "Thank you for your order!",
            &format!("Order {order_number} has been received."),
            Some(order_number),
            "We'll let you know when it ships.",
        );
        self.send(to, &format!("Order Confirmation {order_number}"), &text, &html)
            .await
    }

    pub async fn send_otp(&self, to: &str, name: &str, code: &str) -> Result<(), EmailError> {
        let text = format!("Your OTP is: {code}");
        let html = render_html(
            &format!("Hi {name}"),
            "You requested a password reset. Please use the OTP below:",
            Some(code),
            "This OTP is valid for 15 minutes. If you did not request this, please \
             ignore this email.",
        );
        self.send(to, "Your Password Reset OTP", &text, &html).await
    }

    pub async fn send_password_changed(&self, to: &str, name: &str) -> Result<(), EmailError> {
        let text = format!(
            "Hi {name}, your password was successfully changed. If this wasn't you, \
             please contact us."
        );
        let html = render_html(
            &format!("Hi {name}"),
            "Your password has been successfully changed.",
            None,
            "If this wasn't you, please contact us right away.",
        );
        self.send(to, "Password Successfully Changed", &text, &html)
            .await
    }

    pub async fn send_contact_notification(
        &self,
        to: &str,
        sender_name: &str,
        sender_email: &str,
        sender_phone: &str,
        body: &str,
    ) -> Result<(), EmailError> {
        let text = format!(
            "New message from {sender_name}\nPhone: {sender_phone}\nEmail: {sender_email}\n\n{body}"
        );
        let html = render_html(
            &format!("New message from {sender_name}"),
            &format!("Phone: {sender_phone} / Email: {sender_email}"),
            None,
            body,
        );
        self.send(to, &format!("New Message from {sender_name}"), &text, &html)
            .await
    }

    async fn send(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let Some(transport) = self.transport.as_ref() else {
            return Err(EmailError::Disabled);
        };

        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        transport.send(email).await?;
        tracing::info!(to = %to, subject = %subject, "email sent");
        Ok(())
    }
}

fn render_html(title: &str, subtitle: &str, special: Option<&str>, body: &str) -> String {
    let special = special
        .map(|s| format!("<p style=\"font-size:24px;letter-spacing:4px\"><strong>{s}</strong></p>"))
        .unwrap_or_default();
    format!(
        "<div style=\"font-family:sans-serif;max-width:480px;margin:0 auto\">\
         <h2>{title}</h2><p>{subtitle}</p>{special}<p>{body}</p>\
         <p style=\"color:#888\">Yaqeen Clothing</p></div>"
    )
}
