use capella_cloud::{WaitConfig, WaitError, WaitOutcome, WaitTarget};
use clap::ValueEnum;
use colored::Colorize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    /// Created or updated and healthy
    Ready,
    /// Deleted
    Absent,
}

impl From<TargetArg> for WaitTarget {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Ready => WaitTarget::Ready,
            TargetArg::Absent => WaitTarget::Absent,
        }
    }
}

pub async fn handle(
    cancel: &CancellationToken,
    kind: &str,
    id: &str,
    target: TargetArg,
    timeout: Option<u64>,
    interval: Option<u64>,
) -> anyhow::Result<()> {
    let (kind, id) = super::parse_target(kind, id)?;
    let (monitor, config) = super::connect()?;

    let wait_config = WaitConfig::new(
        timeout.map(Duration::from_secs).unwrap_or(config.wait.timeout()),
        interval
            .map(Duration::from_secs)
            .unwrap_or(config.wait.poll_interval()),
    )
    .with_initial_delay(config.wait.initial_delay());

    let target = WaitTarget::from(target);
    println!(
        "{} {} {} to become {}...",
        "Waiting for".blue(),
        kind,
        id.to_string().cyan(),
        target
    );

    match monitor.wait_for(cancel, kind, &id, target, &wait_config).await {
        Ok(WaitOutcome::Ready(snapshot)) => {
            println!(
                "{} {} is {} ({})",
                "✓".green(),
                kind,
                super::paint(snapshot.lifecycle),
                snapshot.state
            );
            Ok(())
        }
        Ok(WaitOutcome::Absent) => {
            println!("{} {} is gone", "✓".green(), kind);
            Ok(())
        }
        Err(WaitError::Timeout {
            waited, last_state, ..
        }) => {
            let last = last_state.unwrap_or_else(|| "never seen".to_string());
            anyhow::bail!(
                "{} did not become {} within {}s (last state: {})",
                kind,
                target,
                waited.as_secs(),
                last
            )
        }
        Err(e) => Err(e.into()),
    }
}
