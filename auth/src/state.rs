//! Account and one-time code types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub uuid::Uuid);

impl UserId {
    /// Generate a new random `UserId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// How an account last proved ownership of its email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthProvider {
    /// Registered through the email code flow.
    Email,
    /// Signed in with Google.
    Google,
    /// Guest verified by one-time code.
    Otp,
}

impl AuthProvider {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Google => "GOOGLE",
            Self::Otp => "OTP",
        }
    }

    /// Parse the storage representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "EMAIL" => Some(Self::Email),
            "GOOGLE" => Some(Self::Google),
            "OTP" => Some(Self::Otp),
            _ => None,
        }
    }
}

/// Account lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Normal account.
    #[default]
    Active,
    /// Deactivated by the owner.
    Inactive,
    /// Blocked by an operator.
    Suspended,
}

impl AccountStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Suspended => "SUSPENDED",
        }
    }

    /// Parse the storage representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            "SUSPENDED" => Some(Self::Suspended),
            _ => None,
        }
    }
}

/// A user account.
///
/// The email is unique and stored normalised. A guest account may be
/// upgraded in place (same id); a full account is never downgraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account ID.
    pub id: UserId,

    /// Normalised (lower-case) email.
    pub email: String,

    /// Display name, `"First Last"`.
    pub name: Option<String>,

    /// Phone number as entered.
    pub phone: Option<String>,

    /// Guest accounts exist only to attach bookings to a verified email.
    pub is_guest: bool,

    /// Whether email ownership has been proven.
    pub is_email_verified: bool,

    /// Provider used to establish the account.
    pub auth_provider: AuthProvider,

    /// Lifecycle status.
    pub status: AccountStatus,

    /// Google subject identifier, once linked.
    pub google_id: Option<String>,

    /// Profile picture URL.
    pub avatar_url: Option<String>,

    /// Last successful sign-in.
    pub last_login_at: Option<DateTime<Utc>>,

    /// Last credential reset. Tokens issued before this instant are rejected.
    #[serde(skip_serializing)]
    pub credentials_changed_at: Option<DateTime<Utc>>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// A fresh account with default flags; callers set the rest.
    #[must_use]
    pub fn new(email: String, auth_provider: AuthProvider, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            email,
            name: None,
            phone: None,
            is_guest: false,
            is_email_verified: false,
            auth_provider,
            status: AccountStatus::Active,
            google_id: None,
            avatar_url: None,
            last_login_at: None,
            credentials_changed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// `true` if credentials were reset after `issued_at`.
    ///
    /// Token `iat` has second precision, so the comparison truncates the
    /// reset timestamp to whole seconds.
    #[must_use]
    pub fn credentials_changed_after(&self, issued_at: i64) -> bool {
        self.credentials_changed_at
            .is_some_and(|changed| changed.timestamp() > issued_at)
    }

    /// Promote to a full, verified account.
    pub fn promote(&mut self, name: String, phone: Option<String>, now: DateTime<Utc>) {
        self.name = Some(name);
        if phone.is_some() {
            self.phone = phone;
        }
        self.is_guest = false;
        self.is_email_verified = true;
        self.last_login_at = Some(now);
        self.updated_at = now;
    }
}

/// Which flow a one-time code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpPurpose {
    /// Creating a full account (or upgrading a guest).
    Register,
    /// Signing in to an existing account.
    Login,
    /// Verifying an email for guest checkout.
    Guest,
}

impl OtpPurpose {
    /// Lower-case name used in cache keys and log fields.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Login => "login",
            Self::Guest => "guest",
        }
    }

    /// Human-readable label for emails.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Register => "registration",
            Self::Login => "sign-in",
            Self::Guest => "guest checkout",
        }
    }
}

impl std::fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response to a code request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeIssued {
    /// When the code (real or not) stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// A signed-in account and its session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// The account.
    pub account: Account,

    /// Signed session token.
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_core::environment::Clock;
    use wayfarer_testing::test_clock;

    #[test]
    fn test_user_id_generation() {
        let id1 = UserId::new();
        let id2 = UserId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_enum_storage_round_trip() {
        for provider in [AuthProvider::Email, AuthProvider::Google, AuthProvider::Otp] {
            assert_eq!(AuthProvider::parse(provider.as_str()), Some(provider));
        }
        assert_eq!(AccountStatus::parse("SUSPENDED"), Some(AccountStatus::Suspended));
        assert_eq!(AccountStatus::parse("deleted"), None);
    }

    #[test]
    fn test_promote_keeps_identity() {
        let now = test_clock().now();
        let mut account = Account::new("jane@example.com".into(), AuthProvider::Otp, now);
        account.is_guest = true;
        let id = account.id;

        account.promote("Jane Doe".into(), None, now);

        assert_eq!(account.id, id);
        assert!(!account.is_guest);
        assert!(account.is_email_verified);
        assert_eq!(account.name.as_deref(), Some("Jane Doe"));
        assert_eq!(account.last_login_at, Some(now));
    }

    #[test]
    fn test_credentials_changed_after() {
        let now = test_clock().now();
        let mut account = Account::new("a@b.co".into(), AuthProvider::Email, now);
        assert!(!account.credentials_changed_after(now.timestamp()));

        account.credentials_changed_at = Some(now);
        assert!(!account.credentials_changed_after(now.timestamp()));
        assert!(account.credentials_changed_after(now.timestamp() - 1));
    }

    #[test]
    fn test_account_serializes_camel_case() {
        let account = Account::new("a@b.co".into(), AuthProvider::Google, test_clock().now());
        let json = serde_json::to_value(&account).unwrap_or_default();
        assert_eq!(json["authProvider"], "GOOGLE");
        assert_eq!(json["isGuest"], false);
        assert!(json.get("credentialsChangedAt").is_none());
    }
}
