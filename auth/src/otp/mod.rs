//! One-time code lifecycle.
//!
//! # State Machine
//!
//! Each `(purpose, email)` pair moves through:
//!
//! ```text
//!            request_code            verify_code (match)
//!   NONE ───────────────▶ PENDING ───────────────────▶ VERIFIED
//!     ▲                     │  │
//!     │      TTL (900 s)    │  │ request_code again: code replaced
//!     └─────────────────────┘  └──▶ PENDING
//! ```
//!
//! An expired code is indistinguishable from one that was never issued.
//! A wrong code leaves the pending code in place so the user can retry.
//!
//! # Flow
//!
//! ```text
//! 1. Client posts email         → request_*_code   → code emailed, expiresAt returned
//! 2. Client posts email + code  → verify_*_code    → account created/updated, token issued
//! ```

pub mod accounts;
pub mod code;

use crate::config::OtpConfig;
use crate::environment::AuthEnvironment;
use crate::error::{AuthError, Result};
use crate::providers::{
    AccountRepository, CodeStore, ConsumeOutcome, EmailProvider, GoogleIdentityVerifier,
    StoreOutcome, TokenIssuer,
};
use crate::state::{Account, AuthProvider, AuthSession, CodeIssued, OtpPurpose};
use crate::utils::{full_name, is_valid_code, is_valid_email, normalize_email, redact_email};
use code::{code_key, generate_code, hash_code};

/// Drives registration, login and guest verification by one-time code.
///
/// Shared across request handlers behind an `Arc`.
pub struct OtpManager<K, E, U, T, G>
where
    K: CodeStore,
    E: EmailProvider,
    U: AccountRepository,
    T: TokenIssuer,
    G: GoogleIdentityVerifier,
{
    env: AuthEnvironment<K, E, U, T, G>,
    config: OtpConfig,
}

/// Registration details submitted alongside the code.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    /// Given name.
    pub first_name: &'a str,
    /// Family name.
    pub last_name: &'a str,
    /// Optional phone number.
    pub phone: Option<&'a str>,
}

impl<K, E, U, T, G> OtpManager<K, E, U, T, G>
where
    K: CodeStore,
    E: EmailProvider,
    U: AccountRepository,
    T: TokenIssuer,
    G: GoogleIdentityVerifier,
{
    /// Create a manager over `env`.
    #[must_use]
    pub const fn new(env: AuthEnvironment<K, E, U, T, G>, config: OtpConfig) -> Self {
        Self { env, config }
    }

    /// Injected dependencies.
    #[must_use]
    pub const fn environment(&self) -> &AuthEnvironment<K, E, U, T, G> {
        &self.env
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &OtpConfig {
        &self.config
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Registration
    // ═══════════════════════════════════════════════════════════════════════

    /// Email a registration code.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidEmail` if the email is malformed
    /// - `AuthError::AlreadyRegistered` if a full account uses this email
    pub async fn request_registration_code(&self, email: &str) -> Result<CodeIssued> {
        self.request_code(OtpPurpose::Register, email).await
    }

    /// Complete registration.
    ///
    /// Upgrades an existing guest account in place, otherwise creates a new
    /// verified account.
    ///
    /// # Errors
    ///
    /// - `AuthError::OtpExpiredOrInvalid` if no code is pending
    /// - `AuthError::OtpInvalid` if the code is wrong (the pending code survives)
    /// - `AuthError::AlreadyRegistered` if a full account appeared meanwhile
    pub async fn verify_registration_code(
        &self,
        email: &str,
        code: &str,
        registration: Registration<'_>,
    ) -> Result<AuthSession> {
        let email = Self::validated_email(email)?;
        self.consume_code(OtpPurpose::Register, &email, code).await?;

        let now = self.env.clock.now();
        let name = full_name(registration.first_name, registration.last_name);
        let phone = registration.phone.map(str::to_string);

        let account = match self.env.accounts.find_by_email(&email).await? {
            Some(account) if !account.is_guest => return Err(AuthError::AlreadyRegistered),
            Some(mut guest) => {
                guest.promote(name.clone(), phone, now);
                let account = self.env.accounts.update(&guest).await?;
                tracing::info!(
                    account_id = %account.id,
                    email = %redact_email(&email),
                    "Guest account upgraded by registration"
                );
                account
            }
            None => {
                let mut account = Account::new(email.clone(), AuthProvider::Email, now);
                account.name = Some(name.clone());
                account.phone = phone;
                account.is_email_verified = true;
                account.last_login_at = Some(now);
                let account = self.env.accounts.create(&account).await?;
                tracing::info!(
                    account_id = %account.id,
                    email = %redact_email(&email),
                    "Account registered"
                );
                account
            }
        };

        let session = self.session_for(account)?;
        self.send_welcome(&email, &name).await;
        Ok(session)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Login
    // ═══════════════════════════════════════════════════════════════════════

    /// Email a sign-in code.
    ///
    /// Always answers with an expiry. For an unknown email nothing is stored
    /// or sent, so the response does not reveal whether an account exists.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidEmail` if the email is malformed
    pub async fn request_login_code(&self, email: &str) -> Result<CodeIssued> {
        self.request_code(OtpPurpose::Login, email).await
    }

    /// Complete sign-in.
    ///
    /// # Errors
    ///
    /// - `AuthError::OtpExpiredOrInvalid` if no code is pending
    /// - `AuthError::OtpInvalid` if the code is wrong
    /// - `AuthError::UserNotFound` if the account no longer exists
    pub async fn verify_login_code(&self, email: &str, code: &str) -> Result<AuthSession> {
        let email = Self::validated_email(email)?;
        self.consume_code(OtpPurpose::Login, &email, code).await?;

        let Some(mut account) = self.env.accounts.find_by_email(&email).await? else {
            return Err(AuthError::UserNotFound);
        };

        let now = self.env.clock.now();
        account.last_login_at = Some(now);
        account.updated_at = now;
        let account = self.env.accounts.update(&account).await?;

        tracing::info!(account_id = %account.id, "Signed in with one-time code");
        self.session_for(account)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Guest
    // ═══════════════════════════════════════════════════════════════════════

    /// Email a guest checkout code.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidEmail` if the email is malformed
    /// - `AuthError::AlreadyRegistered` if a full account uses this email
    pub async fn request_guest_code(&self, email: &str) -> Result<CodeIssued> {
        self.request_code(OtpPurpose::Guest, email).await
    }

    /// Verify a guest email, creating the guest account on first use.
    ///
    /// # Errors
    ///
    /// - `AuthError::OtpExpiredOrInvalid` if no code is pending
    /// - `AuthError::OtpInvalid` if the code is wrong
    /// - `AuthError::AlreadyRegistered` if a full account uses this email
    pub async fn verify_guest_code(&self, email: &str, code: &str) -> Result<AuthSession> {
        let email = Self::validated_email(email)?;
        self.consume_code(OtpPurpose::Guest, &email, code).await?;

        let now = self.env.clock.now();
        let account = match self.env.accounts.find_by_email(&email).await? {
            Some(account) if !account.is_guest => return Err(AuthError::AlreadyRegistered),
            Some(mut guest) => {
                guest.last_login_at = Some(now);
                guest.updated_at = now;
                self.env.accounts.update(&guest).await?
            }
            None => {
                let mut guest = Account::new(email.clone(), AuthProvider::Otp, now);
                guest.is_guest = true;
                guest.is_email_verified = true;
                guest.last_login_at = Some(now);
                let guest = self.env.accounts.create(&guest).await?;
                tracing::info!(
                    account_id = %guest.id,
                    email = %redact_email(&email),
                    "Guest account created"
                );
                guest
            }
        };

        self.session_for(account)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Shared steps
    // ═══════════════════════════════════════════════════════════════════════

    /// Issue and email a code for `purpose`.
    ///
    /// Storage failures never block issuance: if neither tier accepts the
    /// code it is still emailed, and verifying it reports an expired code.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidEmail` if the email is malformed
    /// - `AuthError::AlreadyRegistered` for register/guest when a full account exists
    pub async fn request_code(&self, purpose: OtpPurpose, email: &str) -> Result<CodeIssued> {
        let email = Self::validated_email(email)?;
        let existing = self.env.accounts.find_by_email(&email).await?;
        let expires_at = self.env.clock.now() + self.config.code_ttl;

        match purpose {
            OtpPurpose::Register | OtpPurpose::Guest => {
                if existing.as_ref().is_some_and(|account| !account.is_guest) {
                    return Err(AuthError::AlreadyRegistered);
                }
            }
            OtpPurpose::Login => {
                if existing.is_none() {
                    tracing::debug!(
                        email = %redact_email(&email),
                        "Login code requested for unknown email"
                    );
                    return Ok(CodeIssued { expires_at });
                }
            }
        }

        let code = generate_code();
        let outcome = self
            .env
            .codes
            .put(
                &code_key(purpose, &email),
                &hash_code(&code),
                self.config.code_ttl_secs(),
            )
            .await;

        match outcome {
            StoreOutcome::Stored => {}
            StoreOutcome::FellBackToLocal => tracing::warn!(
                purpose = %purpose,
                "Code stored in local fallback tier only"
            ),
            StoreOutcome::Failed => tracing::error!(
                purpose = %purpose,
                email = %redact_email(&email),
                "Code could not be stored in either tier; verification will fail until re-requested"
            ),
        }

        if let Err(e) = self
            .env
            .email
            .send_otp(&email, purpose, &code, expires_at)
            .await
        {
            tracing::warn!(
                error = %e,
                purpose = %purpose,
                email = %redact_email(&email),
                "Failed to send one-time code email"
            );
        }

        tracing::info!(
            purpose = %purpose,
            email = %redact_email(&email),
            expires_at = %expires_at,
            "One-time code issued"
        );
        Ok(CodeIssued { expires_at })
    }

    /// Consume the pending code for `(purpose, email)`.
    async fn consume_code(&self, purpose: OtpPurpose, email: &str, code: &str) -> Result<()> {
        if !is_valid_code(code) {
            return Err(AuthError::InvalidInput(
                "code must be exactly 6 digits".to_string(),
            ));
        }

        match self
            .env
            .codes
            .consume(&code_key(purpose, email), &hash_code(code))
            .await
        {
            ConsumeOutcome::Consumed => Ok(()),
            ConsumeOutcome::Mismatch => {
                tracing::info!(
                    purpose = %purpose,
                    email = %redact_email(email),
                    "One-time code mismatch"
                );
                Err(AuthError::OtpInvalid)
            }
            ConsumeOutcome::Absent => Err(AuthError::OtpExpiredOrInvalid),
        }
    }

    fn session_for(&self, account: Account) -> Result<AuthSession> {
        let token = self.env.tokens.issue(account.id)?;
        Ok(AuthSession { account, token })
    }

    async fn send_welcome(&self, email: &str, name: &str) {
        if let Err(e) = self.env.email.send_welcome(email, name).await {
            tracing::warn!(
                error = %e,
                email = %redact_email(email),
                "Failed to send welcome email"
            );
        }
    }

    fn validated_email(email: &str) -> Result<String> {
        let email = normalize_email(email);
        if is_valid_email(&email) {
            Ok(email)
        } else {
            Err(AuthError::InvalidEmail)
        }
    }
}
