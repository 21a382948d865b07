use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use client_core::{BoardChange, BoardClient, DisplayCell, StationCatalog};
use shared::domain::Status;
use tracing::warn;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    server_url: String,
    /// Seconds between forced re-renders so age labels keep ticking.
    #[arg(long, default_value_t = 30)]
    refresh_secs: u64,
}

fn floor_catalog() -> StationCatalog {
    StationCatalog::from_groups([
        ("Loop 1", vec!["A&T", "Body", "Paint", "Final"]),
        ("Loop 2", vec!["FIT/NULL", "Trim", "Chassis", "Inspect"]),
    ])
}

fn status_glyph(status: Status) -> &'static str {
    match status {
        Status::Red => "RED",
        Status::Yellow => "YELLOW",
        Status::Green => "green",
    }
}

fn render(cells: &[DisplayCell]) {
    let mut current_group = None;
    println!();
    for cell in cells {
        if current_group != Some(&cell.key.group) {
            println!("== {} ==", cell.key.group);
            current_group = Some(&cell.key.group);
        }
        let remark = cell.remark.as_deref().unwrap_or("");
        let age = cell.age.as_deref().unwrap_or("");
        println!(
            "  {:<12} {:<6} {:<22} {}",
            cell.key.station.as_str(),
            status_glyph(cell.status),
            remark,
            age
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let client = BoardClient::new(floor_catalog());
    client
        .connect(&args.server_url)
        .await
        .context("board has no data: startup snapshot failed")?;

    let mut changes = client.subscribe_changes();
    let mut ticker = tokio::time::interval(Duration::from_secs(args.refresh_secs.max(1)));

    render(&client.project(Utc::now()).await);
    loop {
        tokio::select! {
            change = changes.recv() => match change {
                Ok(BoardChange::PushError(message)) => warn!(%message, "push channel error"),
                Ok(_) => render(&client.project(Utc::now()).await),
                Err(err) => {
                    warn!(error = %err, "change stream ended");
                    break;
                }
            },
            _ = ticker.tick() => render(&client.project(Utc::now()).await),
        }
    }

    client.shutdown().await;
    Ok(())
}
