use clap::{Parser, Subcommand};

use sera::core::config::Config;

#[derive(Parser)]
#[command(name = "sera")]
#[command(about = "A terminal chat client and relay service for the Gemini API")]
#[command(
    long_about = "Sera is a small chat front-end for the Gemini API. The default \
invocation runs a full-screen terminal chat client that talks to the relay \
service; `sera serve` runs the relay itself.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY    Gemini credential (required by `serve`)\n\
  PORT              Relay listening port (default 5000)\n\
  SERA_API_URL      Relay base URL for the client (default http://localhost:5000)\n\
  SERA_MODEL        Gemini model (default gemini-2.5-flash)\n\
  SERA_LOG          Tracing filter for `serve` (default info)\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message (or leave the intro screen)\n\
  Up/Down           Scroll through chat history\n\
  Ctrl+C            Quit"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the relay HTTP service
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Some(Command::Serve) => {
            init_tracing(&config);
            tracing::info!(version = env!("CARGO_PKG_VERSION"), "sera relay starting");
            sera::relay::serve(config).await
        }
        // The chat client owns the terminal, so no global subscriber is
        // installed; client-side failures surface in the transcript.
        None => sera::ui::chat_loop::run(config).await,
    }
}

fn init_tracing(config: &Config) {
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match config.log_filter.parse::<tracing_subscriber::EnvFilter>() {
            Ok(filter) => filter,
            Err(e) => {
                eprintln!(
                    "WARN: SERA_LOG='{}' is not a valid tracing filter ({}); falling back to 'info'",
                    config.log_filter, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}
