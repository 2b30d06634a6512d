use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cinemate-server")]
#[command(about = "Movie browsing relay for TMDB and OpenRouter", long_about = None)]
struct Args {
    /// YAML config file. Without it, defaults plus environment credentials are used.
    #[arg(short, long)]
    config: Option<String>,
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let default_filter = if args.debug {
        "cinemate=debug,tower_http=debug"
    } else {
        "cinemate=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = cinemate::run(args.config.as_deref(), args.debug).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
