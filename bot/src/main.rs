use anyhow::{bail, Context};
use bot::credentials::SystemClock;
use bot::{run_from_settings, HttpClient, RunSettings};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,bot=info")),
        )
        .init();
    let settings = RunSettings::from_env();
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build runtime")?;
    let _guard = rt.enter();
    rt.block_on(run_bot(settings))
}

async fn run_bot(settings: RunSettings) -> anyhow::Result<()> {
    let summary = run_from_settings(
        &settings,
        HttpClient::new(),
        StdRng::from_entropy(),
        SystemClock,
    )
    .await?;
    println!("{summary}");
    if summary.failed_users > 0 {
        bail!(
            "{} of {} users failed",
            summary.failed_users,
            summary.config.number_of_users
        );
    }
    Ok(())
}
