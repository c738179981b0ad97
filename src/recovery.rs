//! Multi-step password recovery.
//!
//! Three form-encoded calls, each allowed only in its own step:
//! `forgot-password {email}` → `verify-otp {email, otp}` →
//! `reset-password {email, otp, newPassword}`. The email and OTP from the
//! earlier steps are carried forward.

use reqwest::Method;

use crate::error::{ApiError, ValidationError};
use crate::pipeline::{ApiClient, Payload};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryStep {
    RequestOtp,
    VerifyOtp,
    ResetPassword,
    Complete,
}

#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("{action} is not available at step {current:?}")]
    OutOfOrder { action: &'static str, current: RecoveryStep },
    #[error("{fallback} ({source})")]
    Api {
        fallback: &'static str,
        #[source]
        source: ApiError,
    },
}

impl RecoveryError {
    /// Message for display: server text when available, else the step's fallback.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::OutOfOrder { .. } => self.to_string(),
            Self::Api { fallback, source } => source.user_message(fallback),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PasswordRecovery {
    api: ApiClient,
    step: RecoveryStep,
    email: String,
    otp: String,
}

impl PasswordRecovery {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api, step: RecoveryStep::RequestOtp, email: String::new(), otp: String::new() }
    }

    /// Resume at `step` with values collected earlier (e.g. across CLI runs).
    #[must_use]
    pub fn resume(api: ApiClient, step: RecoveryStep, email: &str, otp: &str) -> Self {
        Self { api, step, email: email.trim().to_owned(), otp: otp.trim().to_owned() }
    }

    #[must_use]
    pub fn step(&self) -> RecoveryStep {
        self.step
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Step 1: ask the backend to email an OTP.
    ///
    /// # Errors
    ///
    /// Out-of-order calls, a blank email, or a failed request.
    pub async fn request_otp(&mut self, email: &str) -> Result<String, RecoveryError> {
        const FALLBACK: &str = "Failed to send OTP.";
        self.expect_step(RecoveryStep::RequestOtp, "requesting an OTP")?;
        let email = required(email, "email", FALLBACK)?;

        let message = self
            .post("/auth/forgot-password", vec![("email", email.clone())], FALLBACK)
            .await?
            .unwrap_or_else(|| format!("OTP sent to {email}."));

        self.email = email;
        self.step = RecoveryStep::VerifyOtp;
        Ok(message)
    }

    /// Step 2: check the OTP the user received.
    ///
    /// # Errors
    ///
    /// Out-of-order calls, a blank OTP, or a failed request.
    pub async fn verify_otp(&mut self, otp: &str) -> Result<String, RecoveryError> {
        const FALLBACK: &str = "Invalid OTP.";
        self.expect_step(RecoveryStep::VerifyOtp, "verifying an OTP")?;
        let otp = required(otp, "otp", FALLBACK)?;

        let fields = vec![("email", self.email.clone()), ("otp", otp.clone())];
        let message = self
            .post("/auth/verify-otp", fields, FALLBACK)
            .await?
            .unwrap_or_else(|| "OTP verified successfully.".to_owned());

        self.otp = otp;
        self.step = RecoveryStep::ResetPassword;
        Ok(message)
    }

    /// Step 3: set the new password.
    ///
    /// # Errors
    ///
    /// Out-of-order calls, a blank password, or a failed request.
    pub async fn reset_password(&mut self, new_password: &str) -> Result<String, RecoveryError> {
        const FALLBACK: &str = "Failed to reset password.";
        self.expect_step(RecoveryStep::ResetPassword, "resetting the password")?;
        let new_password = required(new_password, "new password", FALLBACK)?;

        let fields = vec![("email", self.email.clone()), ("otp", self.otp.clone()), ("newPassword", new_password)];
        let message = self
            .post("/auth/reset-password", fields, FALLBACK)
            .await?
            .unwrap_or_else(|| "Password reset successfully!".to_owned());

        self.step = RecoveryStep::Complete;
        tracing::info!(email = %self.email, "password reset completed");
        Ok(message)
    }

    /// Go back one step. The first and last steps stay where they are.
    pub fn back(&mut self) -> RecoveryStep {
        self.step = match self.step {
            RecoveryStep::VerifyOtp => RecoveryStep::RequestOtp,
            RecoveryStep::ResetPassword => RecoveryStep::VerifyOtp,
            other => other,
        };
        self.step
    }

    fn expect_step(&self, expected: RecoveryStep, action: &'static str) -> Result<(), RecoveryError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(RecoveryError::OutOfOrder { action, current: self.step })
        }
    }

    /// POST form fields, returning the server's `message` on success.
    async fn post(
        &self,
        path: &str,
        fields: Vec<(&'static str, String)>,
        fallback: &'static str,
    ) -> Result<Option<String>, RecoveryError> {
        let to_error = |source: ApiError| RecoveryError::Api { fallback, source };
        let response = self
            .api
            .send(Method::POST, path, &[], Payload::Form(fields))
            .await
            .map_err(to_error)?;
        let message = response.message().map(ToOwned::to_owned);
        response.into_result().map_err(to_error)?;
        Ok(message)
    }
}

fn required(value: &str, field: &'static str, fallback: &'static str) -> Result<String, RecoveryError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RecoveryError::Api { fallback, source: ValidationError::Required(field).into() });
    }
    Ok(value.to_owned())
}

#[cfg(test)]
#[path = "recovery_test.rs"]
mod tests;
