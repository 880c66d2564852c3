//! Account upgrades and session checks that complete the code flows.

use super::{OtpManager, Registration};
use crate::error::{AuthError, Result};
use crate::providers::{
    AccountRepository, CodeStore, EmailProvider, GoogleIdentityVerifier, TokenIssuer,
};
use crate::state::{Account, AuthProvider, AuthSession};
use crate::utils::{full_name, redact_email};

impl<K, E, U, T, G> OtpManager<K, E, U, T, G>
where
    K: CodeStore,
    E: EmailProvider,
    U: AccountRepository,
    T: TokenIssuer,
    G: GoogleIdentityVerifier,
{
    /// Turn a verified guest into a full account, keeping its id.
    ///
    /// # Errors
    ///
    /// - `AuthError::NotFound` if no account uses this email
    /// - `AuthError::AlreadyRegistered` if the account is not a guest
    pub async fn upgrade_guest(
        &self,
        email: &str,
        registration: Registration<'_>,
    ) -> Result<AuthSession> {
        let email = Self::validated_email(email)?;

        let Some(mut account) = self.env.accounts.find_by_email(&email).await? else {
            return Err(AuthError::NotFound);
        };
        if !account.is_guest {
            return Err(AuthError::AlreadyRegistered);
        }

        let name = full_name(registration.first_name, registration.last_name);
        account.promote(
            name.clone(),
            registration.phone.map(str::to_string),
            self.env.clock.now(),
        );
        let account = self.env.accounts.update(&account).await?;

        tracing::info!(account_id = %account.id, "Guest account upgraded");
        let session = self.session_for(account)?;
        self.send_welcome(&email, &name).await;
        Ok(session)
    }

    /// Sign in (or sign up) with a Google ID token.
    ///
    /// Links the Google identity to the account with the same email, creating
    /// it when absent. A guest account becomes a full account.
    ///
    /// # Errors
    ///
    /// - `AuthError::ProviderNotConfigured` if no Google client ID was configured
    /// - `AuthError::GoogleTokenInvalid` if Google rejects the token or the
    ///   email is unverified
    pub async fn google_auth(&self, id_token: &str) -> Result<AuthSession> {
        let Some(google) = self.env.google.as_ref() else {
            return Err(AuthError::ProviderNotConfigured("google".to_string()));
        };

        let identity = google.verify(id_token).await?;
        if !identity.email_verified {
            return Err(AuthError::GoogleTokenInvalid(
                "email not verified".to_string(),
            ));
        }

        let email = Self::validated_email(&identity.email)?;
        let now = self.env.clock.now();

        let account = match self.env.accounts.find_by_email(&email).await? {
            Some(mut account) => {
                account.is_guest = false;
                account.is_email_verified = true;
                account.auth_provider = AuthProvider::Google;
                account.google_id = Some(identity.sub);
                if identity.picture.is_some() {
                    account.avatar_url = identity.picture;
                }
                if account.name.is_none() {
                    account.name = identity.name;
                }
                account.last_login_at = Some(now);
                account.updated_at = now;
                self.env.accounts.update(&account).await?
            }
            None => {
                let mut account = Account::new(email.clone(), AuthProvider::Google, now);
                account.name = identity.name;
                account.is_email_verified = true;
                account.google_id = Some(identity.sub);
                account.avatar_url = identity.picture;
                account.last_login_at = Some(now);
                self.env.accounts.create(&account).await?
            }
        };

        tracing::info!(
            account_id = %account.id,
            email = %redact_email(&email),
            "Signed in with Google"
        );
        self.session_for(account)
    }

    /// Resolve a session token to its account.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidToken` if the token is forged, expired, or names
    ///   an account that no longer exists
    /// - `AuthError::CredentialsChanged` if credentials were reset after the
    ///   token was issued
    pub async fn authenticate(&self, token: &str) -> Result<Account> {
        let claims = self.env.tokens.verify(token)?;
        let user_id = claims.user_id()?;

        let Some(account) = self.env.accounts.find_by_id(user_id).await? else {
            return Err(AuthError::InvalidToken);
        };

        if account.credentials_changed_after(claims.iat) {
            tracing::info!(account_id = %account.id, "Session predates credential change");
            return Err(AuthError::CredentialsChanged);
        }

        Ok(account)
    }
}
