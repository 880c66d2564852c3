//! Racing verifications of the same code.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{Harness, JANE};
use std::sync::Arc;
use wayfarer_auth::{AuthError, OtpPurpose};

const EMAIL: &str = "race@example.com";

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_verifications_consume_once() {
    let h = Harness::new();
    h.manager.request_registration_code(EMAIL).await.unwrap();
    let code = h.code(EMAIL, OtpPurpose::Register);

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&h.manager);
            let code = code.clone();
            tokio::spawn(async move { manager.verify_registration_code(EMAIL, &code, JANE).await })
        })
        .collect();

    let mut successes = 0;
    for handle in attempts {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert_eq!(e, AuthError::OtpExpiredOrInvalid),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(h.accounts.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_verifications_consume_once_during_outage() {
    let h = Harness::with_failing_cache();
    h.manager.request_guest_code(EMAIL).await.unwrap();
    let code = h.code(EMAIL, OtpPurpose::Guest);

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&h.manager);
            let code = code.clone();
            tokio::spawn(async move { manager.verify_guest_code(EMAIL, &code).await })
        })
        .collect();

    let mut successes = 0;
    for handle in attempts {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
}
