use std::io::Stdout;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use wordbuilder::config::{self, Settings};
use wordbuilder::render::TextRenderer;
use wordbuilder::{client, telemetry};

fn main() -> anyhow::Result<()> {
    // The local UTC offset can only be read while the process is single-threaded.
    let renderer = TextRenderer::stdout();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve(renderer))
}

async fn serve(renderer: TextRenderer<Stdout>) -> anyhow::Result<()> {
    telemetry::init(config::log_file().as_deref())?;

    let settings = Settings::from_env();
    tracing::info!(server = %settings.server, "starting");

    let (tx, rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    client::run(&settings, rx, renderer).await?;
    Ok(())
}
