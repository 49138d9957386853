// ABOUTME: Main entry point for the banana-slides program.
// ABOUTME: Provides CLI interface for presenting, downloading and serving slideshows.

use anyhow::Context;
use banana_slides::{Config, ServerConfig, SlideshowController, StubServer, TerminalSurface};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the slideshow server
    #[arg(long, global = true)]
    server: Option<String>,

    /// Milliseconds each slide stays on screen
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a slideshow for a topic and play it
    Present(PresentArgs),

    /// Read topics from standard input and play each one
    Interactive(DownloadArgs),

    /// Serve a fixture deck locally for development
    Serve(ServeArgs),
}

#[derive(Args)]
struct PresentArgs {
    /// Topic to explain
    #[arg(short, long)]
    topic: String,

    /// Download the archive once the presentation completes
    #[arg(short, long)]
    download: bool,

    #[command(flatten)]
    output: DownloadArgs,
}

#[derive(Args)]
struct DownloadArgs {
    /// Directory downloaded archives are saved to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[derive(Args)]
struct ServeArgs {
    /// JSON file with the slides to return from /generate
    #[arg(long)]
    deck: PathBuf,

    /// Port to listen on
    #[arg(short, long, default_value_t = 5000)]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(server) = &cli.server {
        config.server_url = server.clone();
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.slide_delay_ms = delay_ms;
    }

    let result = match cli.command {
        Some(Commands::Present(args)) => present(config, args),
        Some(Commands::Interactive(args)) => interactive(config, args).map(|()| true),
        Some(Commands::Serve(args)) => serve(args).map(|()| true),
        None => {
            println!("No command specified. Use --help for usage information.");
            Ok(true)
        }
    };

    match result {
        Ok(true) => Ok(()),
        // The surface has already reported it
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn build_controller(mut config: Config, output: DownloadArgs) -> anyhow::Result<SlideshowController> {
    if let Some(dir) = output.output_dir {
        config.download_dir = dir;
    }
    SlideshowController::from_config(&config, Arc::new(TerminalSurface::new()))
        .context("Failed to set up the slideshow client")
}

/// Returns `false` when generating or downloading failed. Those failures
/// are shown by the controller's surface, so they are not repeated here.
fn present(config: Config, args: PresentArgs) -> anyhow::Result<bool> {
    let controller = build_controller(config, args.output)?;

    match controller.generate(&args.topic) {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(true),
        Err(_) => return Ok(false),
    }
    controller.wait_for_presentation();

    if args.download {
        match controller.download() {
            Ok(path) => println!("Saved {}", path.display()),
            Err(_) => return Ok(false),
        }
    }
    Ok(true)
}

fn interactive(config: Config, args: DownloadArgs) -> anyhow::Result<()> {
    let controller = build_controller(config, args)?;
    println!("Enter a topic to generate a slideshow, :download to save the last one, :quit to exit.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        // Failures are already on screen; the user can simply try again
        match line.trim() {
            ":quit" | ":q" => break,
            ":download" => {
                if let Ok(path) = controller.download() {
                    println!("Saved {}", path.display());
                }
            }
            topic => {
                if let Ok(Some(_)) = controller.generate(topic) {
                    controller.wait_for_presentation();
                }
            }
        }
    }
    Ok(())
}

fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let deck = banana_slides::server::load_deck(&args.deck)
        .with_context(|| format!("Failed to load deck from {:?}", args.deck))?;
    let slide_count = deck.len();

    let server = StubServer::start(ServerConfig {
        host: args.host,
        port: args.port,
        deck,
    })?;
    println!(
        "Serving {} slides on {} (Press Ctrl+C to stop)",
        slide_count,
        server.url()
    );
    server.join();
    Ok(())
}
