use clap::Parser;
use dotenv::dotenv;
use ecobuild_inference::{
    InferenceConfig, InferenceError, InferenceService, ModelInfo, PredictionResult,
    simulate_prediction,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Classify one scanned image with a trained material model
#[derive(Parser, Debug)]
#[command(name = "predict-cli", version)]
struct Args {
    /// Image to classify
    #[arg(long)]
    image: PathBuf,

    /// Trained model directory (defaults to INFERENCE_MODEL_DIR)
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Print a simulated prediction without running the worker
    #[arg(long)]
    simulate: bool,

    /// Worker time limit in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Prediction worker script
    #[arg(long)]
    script: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to encode result: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<PredictionResult, InferenceError> {
    if args.simulate {
        return Ok(simulate_prediction());
    }

    let mut config = InferenceConfig::from_env();
    if let Some(script) = args.script {
        config = config.with_worker_script(script);
    }
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let service = InferenceService::new(config);
    let model = match &args.model_dir {
        Some(dir) => ModelInfo::locate(dir.clone()).await,
        None => service.active_model().await,
    };

    // Dropping the prediction kills the worker.
    tokio::select! {
        result = service.predict_or_simulate(&args.image, model.as_ref()) => result,
        _ = tokio::signal::ctrl_c() => Err(InferenceError::Cancelled),
    }
}
