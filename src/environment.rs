use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use clap::ValueEnum;

/// Default region, used for every environment except `int` and for the
/// direct (freeform bucket) variant.
pub const DEFAULT_REGION: &str = "ap-south-1";

/// The closed set of deployment environments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Dev,
    Qa,
    Qa2,
    Uat,
    Int,
    Int2,
    Production,
}

impl Environment {
    pub const ALL: [Environment; 7] = [
        Environment::Dev,
        Environment::Qa,
        Environment::Qa2,
        Environment::Uat,
        Environment::Int,
        Environment::Int2,
        Environment::Production,
    ];

    /// Lowercase label, used as menu entry and as the stack's
    /// Environment parameter override.
    pub fn label(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Qa => "qa",
            Environment::Qa2 => "qa2",
            Environment::Uat => "uat",
            Environment::Int => "int",
            Environment::Int2 => "int2",
            Environment::Production => "production",
        }
    }

    /// Region and artifact bucket are a pure function of the environment.
    pub fn target(&self) -> DeploymentTarget {
        let (region, bucket) = match self {
            // int lives in a different account and region, production has a
            // legacy bucket name that predates the templated scheme
            Environment::Int => ("us-east-1".to_string(), "cfn-templates-v2-int".to_string()),
            Environment::Production => (
                DEFAULT_REGION.to_string(),
                "cfn-oneaboveall-templates-production".to_string(),
            ),
            env => (
                DEFAULT_REGION.to_string(),
                format!("cfn-templates-v2-{}-{}", DEFAULT_REGION, env.label()),
            ),
        };

        DeploymentTarget {
            environment: Some(*self),
            region,
            bucket,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Environment::ALL
            .into_iter()
            .find(|env| env.label() == s)
            .ok_or_else(|| anyhow!("unknown environment: {s}"))
    }
}

/// Everything the pipeline needs to know about where a deploy goes.
/// Produced once by the resolver and passed by value, never read back from
/// the process environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub environment: Option<Environment>,
    pub region: String,
    pub bucket: String,
}

impl DeploymentTarget {
    /// Freeform variant: bucket taken verbatim from the operator, fixed
    /// region, no environment tag.
    pub fn direct(bucket: String) -> DeploymentTarget {
        DeploymentTarget {
            environment: None,
            region: DEFAULT_REGION.to_string(),
            bucket,
        }
    }
}
