use anyhow::Result;

use crate::application::{BenchRecipe, LoraAdapter, ServeRecipe, BENCH_ENV_VARS};
use crate::cli::RecipeCommand;

pub struct RecipeController;

impl RecipeController {
    pub fn new() -> Self {
        Self
    }

    pub async fn render(&self, command: RecipeCommand) -> Result<String> {
        match command {
            RecipeCommand::Serve {
                model,
                served_model_name,
                tensor_parallel_size,
                port,
                tool_call_parser,
                lora,
                gpu_memory_utilization,
            } => {
                let lora = lora.map(|s| s.parse::<LoraAdapter>()).transpose()?;
                let recipe = ServeRecipe {
                    model,
                    served_model_name,
                    tensor_parallel_size,
                    port,
                    tool_call_parser,
                    lora,
                    gpu_memory_utilization,
                };
                Ok(self.format_serve(&recipe))
            }
            RecipeCommand::Bench {
                domain,
                agent_model,
                agent_provider,
                agent_temperature,
                agent_api_base,
                user_model,
                user_provider,
                user_temperature,
                num_trials,
                max_concurrency,
                max_errors,
                task_ids,
                chunk_size,
            } => {
                let agent_api_base = Some(agent_api_base).filter(|s| !s.trim().is_empty());
                let recipe = BenchRecipe {
                    domain,
                    agent_provider,
                    agent_model,
                    agent_temperature,
                    agent_api_base,
                    user_provider,
                    user_model,
                    user_temperature,
                    num_trials,
                    max_concurrency,
                    max_errors,
                    task_ids,
                };
                Ok(self.format_bench(&recipe, chunk_size))
            }
        }
    }

    fn format_serve(&self, recipe: &ServeRecipe) -> String {
        format!(
            "{}\n\n# then point the chat front-end at it:\ntoolchat serve --base-url {} --model {}",
            recipe.render(),
            recipe.base_url(),
            recipe.client_model()
        )
    }

    fn format_bench(&self, recipe: &BenchRecipe, chunk_size: Option<usize>) -> String {
        let mut output = String::from("# environment read by the harness (not checked here)\n");
        for (name, purpose) in BENCH_ENV_VARS {
            output.push_str(&format!("# export {}=...  ({})\n", name, purpose));
        }

        let commands = match chunk_size {
            Some(size) => recipe.render_chunks(size),
            None => vec![recipe.render()],
        };
        output.push('\n');
        output.push_str(&commands.join("\n\n"));
        output
    }
}

impl Default for RecipeController {
    fn default() -> Self {
        Self::new()
    }
}
