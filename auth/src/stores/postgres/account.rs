//! PostgreSQL account repository implementation.
//!
//! # Example
//!
//! ```no_run
//! use wayfarer_auth::stores::postgres::PostgresAccountRepository;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/wayfarer").await?;
//! let repo = PostgresAccountRepository::new(pool);
//! repo.migrate().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::providers::AccountRepository;
use crate::state::{Account, AccountStatus, AuthProvider, UserId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

const SELECT_COLUMNS: &str = r"
    SELECT id, email, name, phone, is_guest, is_email_verified, auth_provider,
           status, google_id, avatar_url, last_login_at, credentials_changed_at,
           created_at, updated_at
    FROM accounts
";

/// PostgreSQL account repository.
#[derive(Clone, Debug)]
pub struct PostgresAccountRepository {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresAccountRepository {
    /// Create a new PostgreSQL account repository.
    ///
    /// # Arguments
    ///
    /// * `pool` - PostgreSQL connection pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Cheap connectivity check for readiness probes.
    ///
    /// # Errors
    ///
    /// Returns error if the database is unreachable.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Ping failed: {e}")))?;
        Ok(())
    }
}

/// Row shape of the `accounts` table.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: uuid::Uuid,
    email: String,
    name: Option<String>,
    phone: Option<String>,
    is_guest: bool,
    is_email_verified: bool,
    auth_provider: String,
    status: String,
    google_id: Option<String>,
    avatar_url: Option<String>,
    last_login_at: Option<DateTime<Utc>>,
    credentials_changed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AuthError;

    fn try_from(row: AccountRow) -> Result<Self> {
        let auth_provider = AuthProvider::parse(&row.auth_provider).ok_or_else(|| {
            AuthError::DatabaseError(format!("Unknown auth provider: {}", row.auth_provider))
        })?;
        let status = AccountStatus::parse(&row.status).ok_or_else(|| {
            AuthError::DatabaseError(format!("Unknown account status: {}", row.status))
        })?;

        Ok(Self {
            id: UserId(row.id),
            email: row.email,
            name: row.name,
            phone: row.phone,
            is_guest: row.is_guest,
            is_email_verified: row.is_email_verified,
            auth_provider,
            status,
            google_id: row.google_id,
            avatar_url: row.avatar_url,
            last_login_at: row.last_login_at,
            credentials_changed_at: row.credentials_changed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl AccountRepository for PostgresAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let sql = format!("{SELECT_COLUMNS} WHERE email = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to get account: {e}")))?;

        row.map(Account::try_from).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Account>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to get account: {e}")))?;

        row.map(Account::try_from).transpose()
    }

    async fn create(&self, account: &Account) -> Result<Account> {
        sqlx::query(
            r"
            INSERT INTO accounts
                (id, email, name, phone, is_guest, is_email_verified, auth_provider,
                 status, google_id, avatar_url, last_login_at, credentials_changed_at,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ",
        )
        .bind(account.id.0)
        .bind(&account.email)
        .bind(&account.name)
        .bind(&account.phone)
        .bind(account.is_guest)
        .bind(account.is_email_verified)
        .bind(account.auth_provider.as_str())
        .bind(account.status.as_str())
        .bind(&account.google_id)
        .bind(&account.avatar_url)
        .bind(account.last_login_at)
        .bind(account.credentials_changed_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // Duplicate email
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AuthError::AlreadyRegistered;
                }
            }
            AuthError::DatabaseError(format!("Failed to create account: {e}"))
        })?;

        tracing::info!(account_id = %account.id, "Created account");
        Ok(account.clone())
    }

    async fn update(&self, account: &Account) -> Result<Account> {
        let result = sqlx::query(
            r"
            UPDATE accounts
            SET email = $2, name = $3, phone = $4, is_guest = $5, is_email_verified = $6,
                auth_provider = $7, status = $8, google_id = $9, avatar_url = $10,
                last_login_at = $11, credentials_changed_at = $12, updated_at = $13
            WHERE id = $1
            ",
        )
        .bind(account.id.0)
        .bind(&account.email)
        .bind(&account.name)
        .bind(&account.phone)
        .bind(account.is_guest)
        .bind(account.is_email_verified)
        .bind(account.auth_provider.as_str())
        .bind(account.status.as_str())
        .bind(&account.google_id)
        .bind(&account.avatar_url)
        .bind(account.last_login_at)
        .bind(account.credentials_changed_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Failed to update account: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound);
        }

        Ok(account.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_core::environment::Clock;
    use wayfarer_testing::test_clock;

    #[test]
    fn test_row_conversion_rejects_unknown_provider() {
        let now = test_clock().now();
        let row = AccountRow {
            id: uuid::Uuid::new_v4(),
            email: "jane@example.com".into(),
            name: None,
            phone: None,
            is_guest: true,
            is_email_verified: true,
            auth_provider: "FACEBOOK".into(),
            status: "ACTIVE".into(),
            google_id: None,
            avatar_url: None,
            last_login_at: None,
            credentials_changed_at: None,
            created_at: now,
            updated_at: now,
        };

        assert!(matches!(Account::try_from(row), Err(AuthError::DatabaseError(_))));
    }

    #[tokio::test]
    #[ignore] // Requires PostgreSQL at DATABASE_URL
    #[allow(clippy::unwrap_used)] // Test code
    async fn test_account_round_trip() {
        let url = std::env::var("DATABASE_URL").unwrap();
        let repo = PostgresAccountRepository::new(PgPool::connect(&url).await.unwrap());
        repo.migrate().await.unwrap();

        let email = format!("{}@example.com", uuid::Uuid::new_v4());
        let mut account = Account::new(email.clone(), AuthProvider::Otp, Utc::now());
        account.is_guest = true;
        repo.create(&account).await.unwrap();

        assert!(matches!(repo.create(&account).await, Err(AuthError::AlreadyRegistered)));

        account.promote("Jane Doe".into(), None, Utc::now());
        repo.update(&account).await.unwrap();

        let loaded = repo.find_by_email(&email).await.unwrap().unwrap();
        assert_eq!(loaded.id, account.id);
        assert!(!loaded.is_guest);
        assert_eq!(loaded.name.as_deref(), Some("Jane Doe"));
    }
}
