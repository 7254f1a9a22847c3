// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Logging setup and redaction of secrets for log output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "gig_guide=info,warn";

/// Initialize the global tracing subscriber.
///
/// The filter comes from `RUST_LOG`, falling back to `gig_guide=info,warn`.
pub fn init_logging() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()?;

    Ok(())
}

/// Redact an API key for logging.
/// Shows the first four characters, hides the rest: "ew0g***"
pub fn redact_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        // Too short to reveal anything
        return "***".to_string();
    }
    format!("{}***", visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_secret() {
        assert_eq!(redact_secret("ew0gICJhbGciOiAiSFMyNTYiLA"), "ew0g***");
    }

    #[test]
    fn test_redact_short_secret() {
        assert_eq!(redact_secret("abc"), "***");
        assert_eq!(redact_secret("12345678"), "***");
    }

    #[test]
    fn test_redact_empty_secret() {
        assert_eq!(redact_secret(""), "***");
    }
}
