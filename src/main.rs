use std::error::Error;
use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rd::environment::Environment;
use rd::pipeline;
use rd::pipeline::StepFailed;
use rd::profile;
use rd::prompt;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
/// Menu-driven deployer for the EC2-Instance-Rotation stack
struct Cli {
    /// AWS profile (prompted for when omitted)
    #[clap(long, value_parser)]
    profile: Option<String>,

    /// Deployment environment (prompted for when omitted)
    #[clap(long, value_enum)]
    environment: Option<Environment>,

    /// SAM template to build
    #[clap(long, value_parser, default_value = pipeline::DEFAULT_TEMPLATE)]
    template: String,

    /// Skip the credential check on the chosen profile
    #[clap(long)]
    skip_validate: bool,
}

async fn run() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let profile_input = match cli.profile {
        Some(profile) => profile,
        None => prompt::profile()?,
    };

    let profile = if cli.skip_validate {
        profile::normalize(&profile_input)
    } else {
        profile::resolve(&profile_input, &profile::StsIdentityCheck).await
    };

    let environment = match cli.environment {
        Some(environment) => environment,
        None => prompt::environment()?,
    };

    info!(%environment, profile, "resolved deployment target");

    pipeline::run(
        pipeline::Sam,
        environment.target(),
        &profile,
        &cli.template,
    )
    .await
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
        // exit with whatever the failing SAM step returned
        let code = e
            .downcast_ref::<StepFailed>()
            .and_then(|failed| failed.code)
            .unwrap_or(1);
        process::exit(code);
    }

    Ok(())
}
