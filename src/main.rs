//! instrumentify: instrumental versions of a Spotify playlist.
//!
//! Subcommands:
//! - `login`: start the PKCE flow and print the authorize URL
//! - `callback --code`: exchange the redirect code for an access token
//! - `run --playlist`: resolve, process and archive a playlist

use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use tracing_subscriber::EnvFilter;

use instrumentify::auth::{
    authorize_url, code_challenge, exchange_code, generate_code_verifier, TokenStore,
    VERIFIER_LEN,
};
use instrumentify::cli::{Cli, Command, RunArgs};
use instrumentify::config::AppConfig;
use instrumentify::http::HttpClients;
use instrumentify::models::{ModelSelector, OrtInvoker};
use instrumentify::pipeline::{
    archive_collected, BatchPipeline, HttpFetcher, ProcessingContext, ResultCollector,
};
use instrumentify::playlist::{parse_playlist_id, SpotifyPlaylistSource};
use instrumentify::resolver::SourceResolver;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("instrumentify=debug,info")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::from_env();
    if let Some(problem) = config.validate() {
        bail!("Invalid configuration: {}", problem);
    }

    let clients = HttpClients::from_config(&config)?;
    let store = TokenStore::new(config.effective_state_path());

    match cli.command {
        Command::Login => login(&config, &store),
        Command::Callback { code } => callback(&clients.api, &config, &store, &code).await,
        Command::Run(args) => run_playlist(clients, config, &store, &args).await,
    }
}

/// Persists a fresh verifier and prints the authorize URL.
fn login(config: &AppConfig, store: &TokenStore) -> Result<()> {
    let verifier = generate_code_verifier(VERIFIER_LEN);
    let url = authorize_url(config, &code_challenge(&verifier))?;
    store.save_verifier(&verifier)?;

    eprintln!("Open this URL to log in with Spotify:");
    println!("{}", url);
    eprintln!();
    eprintln!("Then run: instrumentify callback --code <code from the redirect URL>");
    Ok(())
}

async fn callback(
    http: &reqwest::Client,
    config: &AppConfig,
    store: &TokenStore,
    code: &str,
) -> Result<()> {
    let verifier = store
        .load_verifier()?
        .ok_or_else(|| anyhow!("No pending login. Run `instrumentify login` first"))?;
    let token = exchange_code(http, config, code, &verifier).await?;
    store.save_token(&token)?;
    eprintln!("Logged in. Token stored in {}", store.dir().display());
    Ok(())
}

async fn run_playlist(
    clients: HttpClients,
    mut config: AppConfig,
    store: &TokenStore,
    args: &RunArgs,
) -> Result<()> {
    if let Some(dir) = &args.model_dir {
        config.model_path = Some(dir.clone());
    }

    let playlist_id = parse_playlist_id(&args.playlist)?;
    let token = match &args.token {
        Some(token) => token.clone(),
        None => store.require_token()?,
    };

    let tracks = SpotifyPlaylistSource::new(clients.api.clone())
        .list_tracks(&playlist_id, Some(&token))
        .await?;
    if tracks.is_empty() {
        eprintln!("Playlist {} has no tracks.", playlist_id);
        return Ok(());
    }

    let selector = ModelSelector::from_config(&config);
    let choice = args.quality.choice();
    eprintln!("=== instrumentify ===");
    eprintln!("Playlist: {} ({} tracks)", playlist_id, tracks.len());
    eprintln!(
        "Quality: {} -> {} (GPU: {}, cores: {})",
        choice,
        selector.select(choice),
        selector.signals().gpu_descriptor,
        selector.signals().logical_cores
    );
    eprintln!("Model directory: {}", config.effective_model_path().display());
    eprintln!();

    let context = Arc::new(ProcessingContext {
        fetcher: Arc::new(HttpFetcher::new(clients.transfer.clone())),
        invoker: Arc::new(OrtInvoker::new(clients.transfer, config.effective_model_path())),
        selector,
        collector: ResultCollector::new(),
    });
    let resolver = Arc::new(SourceResolver::from_config(&config, clients.api));
    let pipeline = BatchPipeline::new(resolver, context);

    let total = tracks.len();
    let mut resolved_count = 0;
    let tasks = pipeline
        .process_playlist_with(tracks, |_, _| {
            resolved_count += 1;
            eprintln!("Resolving sources: {}/{}", resolved_count, total);
        })
        .await;

    eprintln!();
    for task in &tasks {
        match &task.source().source_url {
            Some(url) => println!("{:>3}. {}  [{}]", task.index() + 1, task.track(), url),
            None => println!("{:>3}. {}  No legal source found", task.index() + 1, task.track()),
        }
    }
    eprintln!();

    let selected: Vec<_> = tasks
        .iter()
        .filter(|task| task.is_processable() && args.process.includes(task.index()))
        .cloned()
        .collect();

    if !selected.is_empty() {
        eprintln!("Processing {} track(s)...", selected.len());
        let start_time = Instant::now();
        let outcomes = pipeline.trigger_many(&selected, choice).await;

        for (index, outcome) in &outcomes {
            if let Err(e) = outcome {
                eprintln!("  {:>3}. {}: {}", index + 1, tasks[*index].track(), e);
            }
        }
        let succeeded = outcomes.iter().filter(|(_, r)| r.is_ok()).count();
        eprintln!(
            "Processed {}/{} in {:.2}s",
            succeeded,
            outcomes.len(),
            start_time.elapsed().as_secs_f32()
        );
        eprintln!();
    }

    match archive_collected(pipeline.collector()).await? {
        Some(archive) => {
            let output_path = args.output_path();
            std::fs::write(&output_path, &archive)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            eprintln!("Saved archive to: {}", output_path.display());
        }
        None => eprintln!("No processed tracks to archive."),
    }

    Ok(())
}
