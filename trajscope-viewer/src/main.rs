use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use trajscope_viewer::loader::FsLoader;
use trajscope_viewer::{
    repl, Controls, JsonRenderer, RenderTarget, Session, SessionOptions, ViewerConfig,
};

#[derive(Parser, Debug)]
#[command(name = "trajscope")]
#[command(about = "Project model trajectories onto singular vectors and emit 3D line plots")]
#[command(version)]
struct Args {
    /// JSON config file (data directory, model list, defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding <model>/trajectories.json and <model>/singular_vectors.json
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Model id to load (defaults to the first configured model)
    #[arg(short, long)]
    model: Option<String>,

    /// Time slice, 0-based
    #[arg(short, long)]
    time: Option<usize>,

    /// Basis selection, 1-based, e.g. "1,2,3" or "last-3,last-2,last-1"
    #[arg(short, long)]
    bases: Option<String>,

    /// Drop the final step of every trajectory
    #[arg(long)]
    exclude_last_step: bool,

    /// Write figure JSON to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the configured models and exit
    #[arg(long)]
    list_models: bool,

    /// Read commands from stdin after loading
    #[arg(short, long)]
    interactive: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    trajscope_viewer::tracing::init_with_filter(&args.log_level);

    let mut config = match &args.config {
        Some(path) => ViewerConfig::from_file(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(bases) = &args.bases {
        config.default_selection = bases.clone();
    }
    if let Some(time) = args.time {
        config.default_time_index = time;
    }

    let registry = config.registry()?;
    if args.list_models {
        for model in registry.iter() {
            println!("{}\t{}", model.id, model.name);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let model_id = args
        .model
        .clone()
        .unwrap_or_else(|| registry.default_model().id.clone());

    let renderer = match &args.output {
        Some(path) => JsonRenderer::new(RenderTarget::File(path.clone())),
        None => JsonRenderer::stdout(),
    };

    let mut controls = Controls::from_config(&config);
    controls.exclude_last_step = args.exclude_last_step;

    info!("Initializing trajscope viewer");
    info!("  Version: {}", env!("CARGO_PKG_VERSION"));
    info!("  Data: {}", config.data_dir.display());

    let (session, mut notices) = Session::new(
        Arc::new(FsLoader::new(&config.data_dir)),
        Arc::new(renderer),
        registry,
        controls,
        SessionOptions {
            plot_on_load: args.interactive,
        },
    );

    // Notices are the user-facing channel; logs carry the details. Session
    // failures are reported there once and `run` only maps them to an exit code.
    let printer = tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            eprintln!("{}", notice);
        }
    });

    let outcome = run(&session, &model_id, &args, config.default_time_index).await;

    drop(session);
    printer.await?;
    outcome
}

async fn run(
    session: &Session,
    model_id: &str,
    args: &Args,
    time_index: usize,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if !args.interactive {
        return Ok(match session.plot_once(model_id, time_index).await {
            Some(figure) => {
                info!(traces = figure.data.len(), "Figure written");
                ExitCode::SUCCESS
            }
            None => ExitCode::FAILURE,
        });
    }

    let Ok(load) = session.select_model(model_id) else {
        return Ok(ExitCode::FAILURE);
    };
    load.await?;
    if session.model().is_none() {
        return Ok(ExitCode::FAILURE);
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    repl::run(session, stdin, &mut std::io::stderr()).await?;

    info!("Viewer shutdown complete");
    Ok(ExitCode::SUCCESS)
}
