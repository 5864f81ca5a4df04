use std::error::Error;
use std::fmt;
use std::fs;
use std::process::Command;

use async_trait::async_trait;
use tracing::info;

use crate::environment::{DeploymentTarget, Environment};

pub const STACK_NAME: &str = "EC2-Instance-Rotation";
pub const DEFAULT_TEMPLATE: &str = "template.yaml";

/// Where `sam build` leaves the built template.
pub const BUILT_TEMPLATE: &str = ".aws-sam/build/template.yaml";
/// Packaged-template temp artifact, removed after every run.
pub const PACKAGED_TEMPLATE: &str = "packaged.yaml";

/// A SAM step exited non-zero. Carries the child's exit code so the process
/// can exit with it.
#[derive(Debug)]
pub struct StepFailed {
    pub step: String,
    pub code: Option<i32>,
}

impl fmt::Display for StepFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "sam {} exited with code {}", self.step, code),
            None => write!(f, "sam {} was killed by a signal", self.step),
        }
    }
}

impl Error for StepFailed {}

#[async_trait]
pub trait SamCli {
    async fn build(&mut self, template: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    async fn package(
        &mut self,
        bucket: &str,
        region: &str,
        profile: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    async fn deploy(
        &mut self,
        bucket: &str,
        region: &str,
        profile: &str,
        environment: Option<Environment>,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

#[async_trait]
impl<'a, T> SamCli for &'a mut T
where
    T: SamCli + Send,
{
    async fn build(&mut self, template: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        (**self).build(template).await
    }

    async fn package(
        &mut self,
        bucket: &str,
        region: &str,
        profile: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        (**self).package(bucket, region, profile).await
    }

    async fn deploy(
        &mut self,
        bucket: &str,
        region: &str,
        profile: &str,
        environment: Option<Environment>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        (**self).deploy(bucket, region, profile, environment).await
    }
}

/// The real thing: spawns the external `sam` binary with stdio inherited so
/// the operator sees its output directly. Sequencing only, no output
/// inspection.
pub struct Sam;

impl Sam {
    fn invoke(&self, args: &[&str]) -> Result<(), Box<dyn Error + Send + Sync>> {
        info!("running: sam {}", args.join(" "));

        let status = Command::new("sam").args(args).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(StepFailed {
                step: args[0].to_string(),
                code: status.code(),
            }
            .into())
        }
    }
}

#[async_trait]
impl SamCli for Sam {
    async fn build(&mut self, template: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.invoke(&["build", "--template", template])
    }

    async fn package(
        &mut self,
        bucket: &str,
        region: &str,
        profile: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.invoke(&[
            "package",
            "--template-file",
            BUILT_TEMPLATE,
            "--output-template-file",
            PACKAGED_TEMPLATE,
            "--s3-bucket",
            bucket,
            "--region",
            region,
            "--profile",
            profile,
        ])
    }

    async fn deploy(
        &mut self,
        bucket: &str,
        region: &str,
        profile: &str,
        environment: Option<Environment>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let override_arg = environment.map(|env| format!("Environment={env}"));

        let mut args = vec![
            "deploy",
            "--template-file",
            PACKAGED_TEMPLATE,
            "--stack-name",
            STACK_NAME,
            "--capabilities",
            "CAPABILITY_IAM",
            "CAPABILITY_AUTO_EXPAND",
            "--s3-bucket",
            bucket,
            "--region",
            region,
            "--profile",
            profile,
        ];
        if let Some(override_arg) = &override_arg {
            args.push("--parameter-overrides");
            args.push(override_arg);
        }

        self.invoke(&args)
    }
}

/// build -> package -> deploy, then drop the packaged template. The cleanup
/// runs no matter how the steps went, matching the rest of the run being
/// best-effort about the temp artifact.
pub async fn run(
    mut sam: impl SamCli + Send,
    target: DeploymentTarget,
    profile: &str,
    template: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!(
        region = target.region,
        bucket = target.bucket,
        environment = ?target.environment,
        profile,
        "deploying {STACK_NAME}"
    );

    let result = steps(&mut sam, &target, profile, template).await;
    let _ = fs::remove_file(PACKAGED_TEMPLATE);

    result
}

async fn steps(
    sam: &mut (impl SamCli + Send),
    target: &DeploymentTarget,
    profile: &str,
    template: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    sam.build(template).await?;
    sam.package(&target.bucket, &target.region, profile).await?;
    sam.deploy(
        &target.bucket,
        &target.region,
        profile,
        target.environment,
    )
    .await?;

    Ok(())
}

/// Scripted stand-in for tests: records every step and can be told to fail
/// a given step with a given exit code.
pub struct TestSam {
    pub invocations: Vec<String>,
    pub fail_on: Option<(&'static str, i32)>,
}

impl TestSam {
    pub fn new() -> TestSam {
        TestSam {
            invocations: Vec::new(),
            fail_on: None,
        }
    }

    fn record(&mut self, line: String, step: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.invocations.push(line);
        match self.fail_on {
            Some((failing, code)) if failing == step => Err(StepFailed {
                step: step.to_string(),
                code: Some(code),
            }
            .into()),
            _ => Ok(()),
        }
    }
}

impl Default for TestSam {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SamCli for TestSam {
    async fn build(&mut self, template: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.record(format!("build {template}"), "build")
    }

    async fn package(
        &mut self,
        bucket: &str,
        region: &str,
        profile: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.record(format!("package {bucket} {region} {profile}"), "package")
    }

    async fn deploy(
        &mut self,
        bucket: &str,
        region: &str,
        profile: &str,
        environment: Option<Environment>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let tag = environment.map_or_else(|| "-".to_string(), |env| env.to_string());
        self.record(format!("deploy {bucket} {region} {profile} {tag}"), "deploy")
    }
}
