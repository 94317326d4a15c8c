// Snapshot CLI
//
// Opens a URL, optionally waits for text to appear, and prints the
// accessibility snapshot of the page.
//
// Usage: kodegen-snapshot <url> [text]

use anyhow::{Context, Result};
use kodegen_tools_snapshot::tools::{TakeSnapshotArgs, WaitForArgs};
use kodegen_tools_snapshot::{PageSession, TakeSnapshotTool, WaitForTool, load_yaml_config};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let mut args = std::env::args().skip(1);
    let url = args.next().context("usage: kodegen-snapshot <url> [text]")?;
    let text = args.next();

    let config = load_yaml_config()?;
    let session = Arc::new(PageSession::new());
    session.launch(&config.browser).await?;

    let result = run(&session, &config, &url, text).await;
    session.shutdown().await;

    println!("{}", result?);
    Ok(())
}

async fn run(
    session: &Arc<PageSession>,
    config: &kodegen_tools_snapshot::Config,
    url: &str,
    text: Option<String>,
) -> Result<String> {
    session
        .navigate(url, Duration::from_millis(config.wait.default_timeout_ms))
        .await?;

    let response = match text {
        Some(text) => {
            log::info!("Waiting for \"{}\" on {}", text, url);
            let tool = WaitForTool::new(
                session.clone(),
                config.wait.clone(),
                session.cancellation_token(),
            );

            // Ctrl-C tears the session down and cancels the wait
            let cancel = session.cancellation_token();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            });

            tool.run(WaitForArgs { text, timeout: None }).await?
        }
        None => {
            log::info!("Taking snapshot of {}", url);
            TakeSnapshotTool::new(session.clone())
                .run(TakeSnapshotArgs::default())
                .await?
        }
    };

    Ok(response.render().await?)
}
