use capella_cloud::StatusSnapshot;
use colored::Colorize;
use tokio_util::sync::CancellationToken;

pub async fn handle(cancel: &CancellationToken, kind: &str, id: &str) -> anyhow::Result<()> {
    let (kind, id) = super::parse_target(kind, id)?;
    let (monitor, _) = super::connect()?;

    let snapshot = match monitor.fetch_status(cancel, kind, &id).await {
        Ok(snapshot) => snapshot,
        Err(e) if e.is_not_found() => StatusSnapshot::absent(),
        Err(e) => return Err(e.into()),
    };

    println!("{} {}", kind.to_string().cyan().bold(), id);
    println!("  lifecycle: {}", super::paint(snapshot.lifecycle));
    println!("  state:     {}", snapshot.state);
    Ok(())
}
