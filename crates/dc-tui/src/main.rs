use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dc_rest_client::RestClient;
use dc_tui::{App, TuiResult};

#[derive(Parser, Debug)]
#[command(
    name = "dc-tui",
    about = "Terminal client for the DataChat analysis service",
    version
)]
struct Args {
    /// Base URL of the analysis server
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    server: String,

    /// Also accept PDF files when staging uploads
    #[arg(long)]
    allow_pdf: bool,

    /// Files to stage on startup
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Logs go to stderr so they never corrupt the alternate screen.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(args: Args) -> TuiResult<()> {
    let client = Arc::new(RestClient::from_url(&args.server)?);
    let mut app = App::new(client, args.allow_pdf)?;
    app.stage_initial(&args.files);
    app.run().await
}
