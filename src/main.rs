use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use taglens::predictor::{ImageClassifierConfig, ModelProvider};
use taglens::server::{AppState, create_router};
use taglens::utils::{init_tracing, load_image};

#[derive(Parser)]
#[command(name = "taglens", about = "Image classification demo service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web application.
    Serve(ServeArgs),
    /// Classify a single image file and print the predictions.
    Classify(ClassifyArgs),
}

/// Model artifact options shared by both commands.
#[derive(Args)]
struct ModelArgs {
    /// Path to the ONNX model file.
    #[arg(long, default_value = "models/mobilenet_v2.onnx")]
    model_path: PathBuf,

    /// Path to the label table, one label per line in class order.
    #[arg(long, default_value = "models/imagenet_labels.txt")]
    labels_path: PathBuf,

    /// Number of predictions to return.
    #[arg(long, default_value_t = 3)]
    topk: usize,

    /// Expected SHA-256 of the model file, hex-encoded.
    #[arg(long)]
    model_sha256: Option<String>,

    /// Apply a softmax to the raw model output (for logits-only exports).
    #[arg(long)]
    apply_softmax: bool,

    /// Number of pooled ONNX sessions for concurrent requests.
    #[arg(long, default_value_t = 1)]
    session_pool_size: usize,
}

#[derive(Args)]
struct ServeArgs {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    #[command(flatten)]
    model: ModelArgs,
}

#[derive(Args)]
struct ClassifyArgs {
    /// Path to the image to classify.
    image: PathBuf,

    #[command(flatten)]
    model: ModelArgs,
}

impl ModelArgs {
    fn to_config(&self) -> ImageClassifierConfig {
        let mut config = ImageClassifierConfig::new();
        config.common = config
            .common
            .model_path(&self.model_path)
            .labels_path(&self.labels_path)
            .session_pool_size(self.session_pool_size);
        if let Some(digest) = &self.model_sha256 {
            config.common = config.common.model_sha256(digest);
        }
        config.topk = Some(self.topk);
        config.apply_softmax = Some(self.apply_softmax);
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Classify(args) => classify(args),
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let provider = ModelProvider::new(args.model.to_config());

    // Model load failures are fatal: without weights there is nothing to serve.
    let classifier = provider
        .get()
        .context("failed to load the classification model")?;

    let state = AppState::new(classifier);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", args.host, args.port))?;

    info!("starting server on http://{addr}");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

fn classify(args: ClassifyArgs) -> anyhow::Result<()> {
    let provider = ModelProvider::new(args.model.to_config());
    let classifier = provider
        .get()
        .context("failed to load the classification model")?;

    let image = load_image(&args.image)
        .with_context(|| format!("failed to read image {}", args.image.display()))?;
    let result = classifier
        .classify_image(image)
        .context("classification failed")?;

    for prediction in result.predictions() {
        println!("{}: {:.2}%", prediction.label, prediction.confidence * 100.0);
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("received SIGTERM, shutting down");
        }
    }
}
