// ABOUTME: Binary entry point for the nodeflow CLI
// ABOUTME: Parses arguments and hands off to the application runner

use anyhow::Result;
use nodeflow::cli::App;

#[tokio::main]
async fn main() -> Result<()> {
    let args = nodeflow::cli::Args::parse_args();
    let mut app = App::new();

    app.run(args).await?;

    Ok(())
}
