//! Authentication providers.
//!
//! This module defines traits for every external dependency used by the
//! OTP manager, plus the concrete implementations that need nothing beyond
//! an HTTP client or a secret.
//!
//! # Architecture
//!
//! Providers are **interfaces**. [`crate::otp::OtpManager`] depends only on
//! these traits; the server wires concrete implementations in at startup and
//! tests use the in-memory versions from [`crate::mocks`].
//!
//! ```text
//! ┌──────────────────┐     ┌───────────────────────┐
//! │ OtpManager       │────▶│ CodeStore             │──▶ shared tier (Redis)
//! │                  │     │                       │──▶ local tier (fallback)
//! │                  │────▶│ AccountRepository     │──▶ PostgreSQL
//! │                  │────▶│ EmailProvider         │──▶ SMTP / console
//! │                  │────▶│ TokenIssuer           │──▶ HS256 JWT
//! │                  │────▶│ GoogleIdentityVerifier│──▶ Google tokeninfo
//! └──────────────────┘     └───────────────────────┘
//! ```

pub mod account;
pub mod code_store;
pub mod console_email;
pub mod email;
pub mod google;
pub mod jwt;
pub mod smtp_email;
pub mod token;

pub use account::AccountRepository;
pub use code_store::{CodeStore, ConsumeOutcome, SharedCodeTier, StoreOutcome};
pub use console_email::ConsoleEmailProvider;
pub use email::EmailProvider;
pub use google::{GoogleIdentity, GoogleIdentityVerifier, GoogleTokenInfoVerifier};
pub use jwt::JwtTokenIssuer;
pub use smtp_email::SmtpEmailProvider;
pub use token::{TokenClaims, TokenIssuer};
