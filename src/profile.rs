use std::error::Error;

use async_trait::async_trait;
use tracing::{info, warn};

pub const DEFAULT_PROFILE: &str = "default";

/// Read-only credential check, kept behind a trait so the prompt flow can be
/// tested without touching AWS.
#[async_trait]
pub trait IdentityCheck {
    async fn check(&self, profile: &str) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// Real check: load shared config scoped to the profile and ask STS who we
/// are. Fails on missing profiles, expired credentials and the like.
pub struct StsIdentityCheck;

#[async_trait]
impl IdentityCheck for StsIdentityCheck {
    async fn check(&self, profile: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        let config = aws_config::from_env().profile_name(profile).load().await;
        let resp = aws_sdk_sts::Client::new(&config)
            .get_caller_identity()
            .send()
            .await?;

        Ok(resp.arn().unwrap_or_default().to_string())
    }
}

/// Empty and whitespace-only input mean the default profile. Runs before any
/// validation.
pub fn normalize(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        DEFAULT_PROFILE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Validate a profile against the identity check, falling back to the
/// default profile on failure. The fallback is loud on purpose: a failed
/// check usually means misconfigured credentials, not a missing profile.
pub async fn resolve(input: &str, checker: &impl IdentityCheck) -> String {
    let profile = normalize(input);

    match checker.check(&profile).await {
        Ok(arn) => {
            info!(profile, arn, "credentials ok");
            profile
        }
        Err(e) => {
            warn!(
                profile,
                error = %e,
                "profile failed the credential check, falling back to \"{DEFAULT_PROFILE}\""
            );
            DEFAULT_PROFILE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct ScriptedCheck {
        accept: &'static [&'static str],
    }

    #[async_trait]
    impl IdentityCheck for ScriptedCheck {
        async fn check(&self, profile: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
            if self.accept.contains(&profile) {
                Ok(format!("arn:aws:iam::123456789012:user/{profile}"))
            } else {
                Err(anyhow!("could not load credentials").into())
            }
        }
    }

    #[test]
    fn empty_input_normalizes_to_default() {
        assert_eq!(normalize(""), "default");
        assert_eq!(normalize("   "), "default");
        assert_eq!(normalize("\n"), "default");
        assert_eq!(normalize(" deployer "), "deployer");
    }

    #[tokio::test]
    async fn valid_profile_is_kept() {
        let checker = ScriptedCheck {
            accept: &["deployer"],
        };
        assert_eq!(resolve("deployer", &checker).await, "deployer");
    }

    #[tokio::test]
    async fn failing_check_falls_back_to_default() {
        let checker = ScriptedCheck { accept: &[] };
        assert_eq!(resolve("no-such-profile", &checker).await, "default");
    }

    #[tokio::test]
    async fn empty_input_resolves_before_the_check_runs() {
        // the check only accepts "default", so passing the empty string
        // through proves normalization happened first
        let checker = ScriptedCheck {
            accept: &["default"],
        };
        assert_eq!(resolve("", &checker).await, "default");
    }
}
