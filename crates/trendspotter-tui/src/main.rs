use anyhow::Result;
use clap::{Parser, Subcommand};
use trendspotter_core::{ChatClient, ChatView, Config};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "trendspotter")]
#[command(version, about = "Chat with the TrendSpotter assistant from your terminal")]
struct Cli {
    /// Chat endpoint URL (overrides the config file)
    #[arg(long, env = "TRENDSPOTTER_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Remember the resolved endpoint in the config file
    #[arg(long)]
    save_endpoint: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message and print the reply
    Send {
        /// Message text
        #[arg(required = true)]
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = match cli.command {
        Some(Commands::Send { .. }) => {
            logging::init_stderr(cli.debug)?;
            None
        }
        None => Some(logging::init_file(cli.debug)?),
    };

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable config");
        Config::new()
    });
    let endpoint = config.resolve_endpoint(cli.endpoint.as_deref());
    if cli.save_endpoint {
        Config::save_endpoint(&endpoint)?;
    }
    let client = ChatClient::new(&endpoint);

    match cli.command {
        Some(Commands::Send { text }) => send_once(&client, &text.join(" ")).await,
        None => {
            if let Some(path) = log_path {
                tracing::info!(%endpoint, log = %path.display(), "starting chat view");
            }
            run_chat(client).await
        }
    }
}

/// One submit/resolve cycle through the same state machine as the chat view.
async fn send_once(client: &ChatClient, text: &str) -> Result<()> {
    let mut view = ChatView::new();
    view.input_mut().set(text);

    let outbound = match view.submit() {
        Ok(outbound) => outbound,
        Err(reason) => {
            tracing::debug!(%reason, "nothing to send");
            return Ok(());
        }
    };

    let result = client.send(&outbound.messages).await;
    view.resolve(outbound.ticket, result);

    if let Some(reply) = view.messages().last() {
        println!("{}", reply.content);
    }
    Ok(())
}

async fn run_chat(client: ChatClient) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(client, events.sender());

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_loop(
    terminal: &mut tui::Tui,
    app: &mut App,
    events: &mut tui::EventHandler,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}
