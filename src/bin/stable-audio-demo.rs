//! Stable Audio web demo.
//!
//! Starts loading the model in the background and serves the web UI right
//! away. Until the model is ready the status box reports loading and
//! generation requests are turned away.
//!
//! # Usage
//!
//! ```sh
//! stable-audio-demo                        # http://0.0.0.0:8000
//! stable-audio-demo --port 9000 --output-dir /tmp/clips
//! RUST_LOG=debug stable-audio-demo
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use stable_audio_demo::{
    artifact::ArtifactStore,
    config::DEFAULT_MODEL_ID,
    gate::GenerationGate,
    loader::{LoaderConfig, ModelLoader},
    model::hub::HubModelSource,
    runtime::ModelRuntime,
    server,
};

#[derive(Parser, Debug)]
#[command(
    name = "stable-audio-demo",
    about = "Text-to-audio web demo with background model loading"
)]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Hugging Face model repository to load.
    #[arg(long, default_value = DEFAULT_MODEL_ID)]
    model: String,

    /// Directory for generated audio files.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// CUDA device ordinal (0 = first GPU).
    #[arg(long, default_value_t = 0)]
    device: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let store = ArtifactStore::new(&args.output_dir)?;
    let runtime = Arc::new(ModelRuntime::new());

    let config = LoaderConfig {
        model_id: args.model,
        cuda_device: args.device,
    };
    // Never joined: the process serves until killed, ready or not.
    let _loader = ModelLoader::new(runtime.clone(), Arc::new(HubModelSource), config).start()?;

    let gate = GenerationGate::new(runtime, store);
    server::serve(SocketAddr::new(args.host, args.port), gate).await
}
