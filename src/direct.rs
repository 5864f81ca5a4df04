use std::error::Error;
use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rd::environment::DeploymentTarget;
use rd::pipeline;
use rd::pipeline::StepFailed;
use rd::profile;
use rd::prompt;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
/// Deployer for the EC2-Instance-Rotation stack with a freeform artifact
/// bucket (no environment menu, no credential check)
struct Cli {
    /// AWS profile (prompted for when omitted)
    #[clap(long, value_parser)]
    profile: Option<String>,

    /// Artifact bucket (prompted for when omitted)
    #[clap(long, value_parser)]
    bucket: Option<String>,

    /// SAM template to build
    #[clap(long, value_parser, default_value = pipeline::DEFAULT_TEMPLATE)]
    template: String,
}

async fn run() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let profile_input = match cli.profile {
        Some(profile) => profile,
        None => prompt::profile()?,
    };
    let profile = profile::normalize(&profile_input);

    // bucket goes downstream verbatim, empty included
    let bucket = match cli.bucket {
        Some(bucket) => bucket,
        None => prompt::bucket()?,
    };

    let target = DeploymentTarget::direct(bucket);
    info!(bucket = target.bucket, region = target.region, profile);

    pipeline::run(pipeline::Sam, target, &profile, &cli.template).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut filter = EnvFilter::new("info,aws_config=warn");
    if let Ok(var) = std::env::var("RUST_LOG") {
        filter = filter.add_directive(var.parse()?);
    }
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_env_filter(filter)
        .init();

    if let Err(e) = run().await {
        error!(%e, "deploy failed");
        let code = e
            .downcast_ref::<StepFailed>()
            .and_then(|failed| failed.code)
            .unwrap_or(1);
        process::exit(code);
    }

    Ok(())
}
