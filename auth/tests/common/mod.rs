//! Shared fixture for the integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use chrono::{DateTime, Utc};
use std::sync::Arc;
use wayfarer_auth::config::{CodeStoreConfig, OtpConfig, TokenConfig};
use wayfarer_auth::mocks::{
    MockAccountRepository, MockEmailProvider, MockGoogleVerifier, MockSharedTier,
};
use wayfarer_auth::providers::JwtTokenIssuer;
use wayfarer_auth::stores::{LocalCodeTier, TieredCodeStore};
use wayfarer_auth::{AuthEnvironment, AuthSession, OtpManager, OtpPurpose, Registration};
use wayfarer_core::environment::Clock;
use wayfarer_testing::{ManualClock, test_clock};

/// Manager wired entirely with in-memory collaborators.
pub type TestManager = OtpManager<
    TieredCodeStore<MockSharedTier>,
    MockEmailProvider,
    MockAccountRepository,
    JwtTokenIssuer,
    MockGoogleVerifier,
>;

/// Manager plus handles on every collaborator.
pub struct Harness {
    /// The system under test.
    pub manager: Arc<TestManager>,
    /// Outbox.
    pub email: MockEmailProvider,
    /// Account table.
    pub accounts: MockAccountRepository,
    /// Shared cache stand-in.
    pub shared: MockSharedTier,
    /// Process-local fallback tier.
    pub local: Arc<LocalCodeTier>,
    /// Clock shared by every component.
    pub clock: ManualClock,
}

/// Default registration details.
pub const JANE: Registration<'static> = Registration {
    first_name: "Jane",
    last_name: "Doe",
    phone: None,
};

/// Well-formed code that is never generated (codes start at 100000).
pub const WRONG_CODE: &str = "012345";

impl Harness {
    /// Healthy cache, no Google client.
    pub fn new() -> Self {
        Self::build(false, None, None)
    }

    /// Cache that fails every operation.
    pub fn with_failing_cache() -> Self {
        Self::build(true, None, None)
    }

    /// Failing cache and a fallback tier that holds at most `max_entries` codes.
    pub fn with_failing_cache_and_local_cap(max_entries: usize) -> Self {
        Self::build(true, None, Some(max_entries))
    }

    /// Healthy cache and the given Google verifier.
    pub fn with_google(google: MockGoogleVerifier) -> Self {
        Self::build(false, Some(google), None)
    }

    fn build(
        failing: bool,
        google: Option<MockGoogleVerifier>,
        local_cap: Option<usize>,
    ) -> Self {
        wayfarer_testing::init_test_tracing();

        let clock = ManualClock::new(test_clock().now());
        let shared_clock: Arc<dyn Clock> = Arc::new(clock.clone());

        let shared = if failing {
            MockSharedTier::always_failing(Arc::clone(&shared_clock))
        } else {
            MockSharedTier::new(Arc::clone(&shared_clock))
        };
        let config = CodeStoreConfig::default();
        let local = Arc::new(LocalCodeTier::new(
            Arc::clone(&shared_clock),
            local_cap.unwrap_or(config.local_max_entries),
        ));
        let codes = TieredCodeStore::new(shared.clone(), Arc::clone(&local), &config);

        let email = MockEmailProvider::new();
        let accounts = MockAccountRepository::new();
        let tokens = JwtTokenIssuer::new(
            &TokenConfig::new("integration-test-secret-0123456789abcdef".to_string()),
            Arc::clone(&shared_clock),
        );

        let env = AuthEnvironment::new(
            codes,
            email.clone(),
            accounts.clone(),
            tokens,
            google,
            shared_clock,
        );

        Self {
            manager: Arc::new(OtpManager::new(env, OtpConfig::default())),
            email,
            accounts,
            shared,
            local,
            clock,
        }
    }

    /// Current test time.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The last code emailed to `email` for `purpose`.
    pub fn code(&self, email: &str, purpose: OtpPurpose) -> String {
        self.email
            .last_code(email, purpose)
            .expect("a code should have been emailed")
    }

    /// Register `email` as Jane Doe.
    pub async fn register(&self, email: &str) -> AuthSession {
        self.manager.request_registration_code(email).await.unwrap();
        let code = self.code(email, OtpPurpose::Register);
        self.manager
            .verify_registration_code(email, &code, JANE)
            .await
            .unwrap()
    }

    /// Verify `email` as a guest.
    pub async fn guest(&self, email: &str) -> AuthSession {
        self.manager.request_guest_code(email).await.unwrap();
        let code = self.code(email, OtpPurpose::Guest);
        self.manager.verify_guest_code(email, &code).await.unwrap()
    }
}
