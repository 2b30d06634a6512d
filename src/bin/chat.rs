use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinemate::upstream::build_http_client_with;
use cinemate::widgets::{ChatRelay, ChatSession, HttpRelay, ListKind, MovieListState, GRID_COLUMNS};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ListArg {
    Trending,
    TopRated,
}

impl From<ListArg> for ListKind {
    fn from(arg: ListArg) -> Self {
        match arg {
            ListArg::Trending => ListKind::Trending,
            ListArg::TopRated => ListKind::TopRated,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "cinemate-chat")]
#[command(about = "Terminal client for a cinemate relay", long_about = None)]
struct Args {
    /// Base URL of the relay server.
    #[arg(short, long, default_value = "http://localhost:3000")]
    relay: String,
    /// Print a movie list and exit instead of chatting.
    #[arg(short, long, value_enum)]
    list: Option<ListArg>,
    /// Image base URL used for poster links.
    #[arg(long, default_value = "https://image.tmdb.org/t/p/w500")]
    images: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinemate=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let http = match build_http_client_with(Duration::from_secs(60), Duration::from_secs(10)) {
        Ok(http) => http,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let relay = HttpRelay::new(&args.relay, http);

    if let Some(list) = args.list {
        let mut state = MovieListState::new(list.into());
        state.load(&relay).await;
        print_list(&state, &args.images);
        return;
    }

    let mut session = ChatSession::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Ask a question (Ctrl-D to quit)");
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        };

        session.set_input(line);
        let Some(request) = session.begin_submit() else {
            continue;
        };
        if let Some(typing) = session.typing_indicator() {
            println!("{}", typing);
        }
        let outcome = relay.post_chat(&request).await;
        let reply = session.finish(outcome);
        println!("> {}\n", reply.text);
    }
}

fn print_list(state: &MovieListState, image_base_url: &str) {
    println!("{}\n", state.kind.heading());
    for row in state.rows(image_base_url, GRID_COLUMNS) {
        for card in row {
            println!("[{}] {}", card.id, card.title);
            println!("    {}", card.overview_preview);
            if let Some(url) = card.poster_url {
                println!("    {}", url);
            }
        }
        println!();
    }
}
