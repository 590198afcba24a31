use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use toolchat::application::{
    SessionSettings, DEFAULT_MAX_TOKENS, DEFAULT_MAX_TOOL_ROUNDS, DEFAULT_TEMPERATURE,
};
use toolchat::connector::adapter::{
    HfDatasetSource, DEFAULT_HF_DATASET, DEFAULT_HF_DATASET_FILE, DEFAULT_SEED,
};
use toolchat::{Commands, Container, ContainerConfig, Router};

#[derive(Parser)]
#[command(name = "toolchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Chat-completions endpoint including /v1 [env: TOOLCHAT_BASE_URL]
    #[arg(long, global = true, visible_alias = "vllm-base-url")]
    base_url: Option<String>,

    /// Model name sent with every request [env: TOOLCHAT_MODEL]
    #[arg(long, global = true, visible_alias = "vllm-model")]
    model: Option<String>,

    /// Bearer token for the endpoint [env: TOOLCHAT_API_KEY]
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// JSON file with users, orders and products; sparse collections are
    /// topped up from the generated sample data
    #[arg(long, global = true)]
    data_file: Option<String>,

    /// Mine a Hugging Face dataset of agent trajectories for extra tools and
    /// records (defaults to Salesforce/APIGen-MT-5k when given without a value)
    #[arg(long, global = true, num_args = 0..=1, default_missing_value = DEFAULT_HF_DATASET)]
    hf_dataset: Option<String>,

    /// File inside the --hf-dataset repository
    #[arg(long, global = true, default_value = DEFAULT_HF_DATASET_FILE)]
    hf_dataset_file: String,

    /// Seed for the generated sample data
    #[arg(long, global = true, default_value_t = DEFAULT_SEED)]
    seed: u64,

    #[arg(long, global = true, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    #[arg(long, global = true, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Tool-result round trips allowed per user turn
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_TOOL_ROUNDS)]
    max_tool_rounds: usize,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = ContainerConfig {
        base_url: cli.base_url,
        model: cli.model,
        api_key: cli.api_key,
        data_file: cli.data_file.as_deref().map(|p| PathBuf::from(expand_tilde(p))),
        hf_dataset: cli
            .hf_dataset
            .map(|repo| HfDatasetSource::new(repo).with_filename(cli.hf_dataset_file)),
        seed: cli.seed,
        settings: SessionSettings {
            temperature: cli.temperature,
            max_tokens: cli.max_tokens,
            max_tool_rounds: cli.max_tool_rounds,
            ..SessionSettings::default()
        },
    };

    let container = Container::new(config).await?;
    let router = Router::new(&container);

    let output = router.route(cli.command).await?;
    println!("{}", output);

    Ok(())
}

fn expand_tilde(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            if path == "~" {
                return home.to_string_lossy().to_string();
            }
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
