use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Start the browser chat front-end
    Serve {
        /// Interface to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value = "8501")]
        port: u16,
    },

    /// Chat with the retail agent in the terminal
    Chat,

    /// Test the connection to the inference endpoint
    Check,

    /// List the tools declared to the model
    Tools {
        /// Print the raw function schemas as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show mock database statistics and sample records
    Data {
        /// Sample records shown per collection
        #[arg(long, default_value = "5")]
        limit: usize,

        /// Write the full dataset to this JSON file (loadable with --data-file)
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Print command lines for the external serving and benchmark tools
    Recipe {
        #[command(subcommand)]
        recipe: RecipeCommand,
    },
}

#[derive(Subcommand)]
pub enum RecipeCommand {
    /// Inference server invocation (vLLM)
    Serve {
        /// Base model path or hub id
        model: String,

        #[arg(long, default_value = "qwen3-14b")]
        served_model_name: String,

        #[arg(long, default_value = "1")]
        tensor_parallel_size: u32,

        #[arg(long, default_value = "8082")]
        port: u16,

        #[arg(long, default_value = "hermes")]
        tool_call_parser: String,

        /// LoRA adapter to mount, as name=path
        #[arg(long)]
        lora: Option<String>,

        /// Fraction of GPU memory the server may use (0.0-1.0)
        #[arg(long)]
        gpu_memory_utilization: Option<f64>,
    },

    /// Benchmark harness invocation (tau2)
    Bench {
        #[arg(long, default_value = "retail")]
        domain: String,

        #[arg(long, default_value = "qwen3-14b-ft-with-thinking")]
        agent_model: String,

        #[arg(long, default_value = "hosted_vllm")]
        agent_provider: String,

        #[arg(long, default_value = "0.0")]
        agent_temperature: f64,

        #[arg(long, default_value = "http://localhost:8082/v1")]
        agent_api_base: String,

        #[arg(long, default_value = "gpt-4.1")]
        user_model: String,

        #[arg(long, default_value = "openai")]
        user_provider: String,

        #[arg(long)]
        user_temperature: Option<f64>,

        #[arg(long, default_value = "4")]
        num_trials: u32,

        #[arg(long, default_value = "10")]
        max_concurrency: u32,

        /// Failed simulations tolerated before the run aborts
        #[arg(long, default_value = "100")]
        max_errors: u32,

        /// Restrict the run to these task ids
        #[arg(long, num_args = 1..)]
        task_ids: Vec<String>,

        /// Split the task ids into one command per chunk of this size
        #[arg(long)]
        chunk_size: Option<usize>,
    },
}
