//! Command lines for the external tools this demo depends on.
//!
//! Nothing here runs them; the recipes only render the invocation so it can
//! be copied into a shell.

use std::str::FromStr;

use serde_json::{json, Map, Value};

use crate::domain::DomainError;

/// Environment variables read by the benchmark harness. Their values are
/// never checked here.
pub const BENCH_ENV_VARS: &[(&str, &str)] = &[
    ("TAU2_DATA_DIR", "directory holding the benchmark domains and tasks"),
    ("OPENAI_API_KEY", "key for the user-simulator model provider"),
    ("HOSTED_VLLM_API_KEY", "key for the agent endpoint (any value for a local server)"),
];

/// A LoRA adapter mounted by the inference server, given as `name=path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoraAdapter {
    pub name: String,
    pub path: String,
}

impl FromStr for LoraAdapter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => Ok(Self {
                name: name.trim().to_string(),
                path: path.trim().to_string(),
            }),
            _ => Err(DomainError::invalid_input(format!(
                "LoRA adapter must look like name=path, got '{}'",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServeRecipe {
    pub model: String,
    pub served_model_name: String,
    pub tensor_parallel_size: u32,
    pub port: u16,
    pub tool_call_parser: String,
    pub lora: Option<LoraAdapter>,
    pub gpu_memory_utilization: Option<f64>,
}

impl ServeRecipe {
    fn groups(&self) -> Vec<Vec<String>> {
        let mut groups = vec![
            words(&["vllm", "serve", &self.model]),
            words(&["--tensor-parallel-size", &self.tensor_parallel_size.to_string()]),
            words(&["--port", &self.port.to_string()]),
            words(&["--enable-auto-tool-choice"]),
            words(&["--tool-call-parser", &self.tool_call_parser]),
            words(&["--served-model-name", &self.served_model_name]),
        ];

        if let Some(lora) = &self.lora {
            groups.push(words(&["--enable-lora"]));
            groups.push(words(&[
                "--lora-modules",
                &format!("{}={}", lora.name, lora.path),
            ]));
        }
        if let Some(fraction) = self.gpu_memory_utilization {
            groups.push(words(&["--gpu-memory-utilization", &fraction.to_string()]));
        }

        groups
    }

    pub fn argv(&self) -> Vec<String> {
        self.groups().concat()
    }

    pub fn render(&self) -> String {
        render_groups(&self.groups())
    }

    /// Base URL the chat front-end should use against this server.
    pub fn base_url(&self) -> String {
        format!("http://localhost:{}/v1", self.port)
    }

    /// Model name clients must request: the adapter when one is mounted.
    pub fn client_model(&self) -> &str {
        self.lora
            .as_ref()
            .map(|l| l.name.as_str())
            .unwrap_or(&self.served_model_name)
    }
}

#[derive(Debug, Clone)]
pub struct BenchRecipe {
    pub domain: String,
    pub agent_provider: String,
    pub agent_model: String,
    pub agent_temperature: f64,
    pub agent_api_base: Option<String>,
    pub user_provider: String,
    pub user_model: String,
    pub user_temperature: Option<f64>,
    pub num_trials: u32,
    pub max_concurrency: u32,
    pub max_errors: u32,
    pub task_ids: Vec<String>,
}

impl BenchRecipe {
    fn groups(&self, task_ids: &[String]) -> Vec<Vec<String>> {
        let mut groups = vec![
            words(&["tau2", "run"]),
            words(&["--domain", &self.domain]),
            words(&["--agent-llm", &qualified(&self.agent_provider, &self.agent_model)]),
            words(&["--agent-llm-args", &self.agent_args().to_string()]),
            words(&["--user-llm", &qualified(&self.user_provider, &self.user_model)]),
        ];

        if let Some(temperature) = self.user_temperature {
            groups.push(words(&[
                "--user-llm-args",
                &json!({ "temperature": temperature }).to_string(),
            ]));
        }

        groups.push(words(&["--num-trials", &self.num_trials.to_string()]));
        groups.push(words(&["--max-concurrency", &self.max_concurrency.to_string()]));
        groups.push(words(&["--max-errors", &self.max_errors.to_string()]));

        if !task_ids.is_empty() {
            let mut group = words(&["--task-ids"]);
            group.extend(task_ids.iter().cloned());
            groups.push(group);
        }

        groups
    }

    fn agent_args(&self) -> Value {
        let mut args = Map::new();
        args.insert("temperature".to_string(), json!(self.agent_temperature));
        if let Some(base) = &self.agent_api_base {
            args.insert("api_base".to_string(), json!(base));
        }
        Value::Object(args)
    }

    pub fn argv(&self) -> Vec<String> {
        self.groups(&self.task_ids).concat()
    }

    pub fn render(&self) -> String {
        render_groups(&self.groups(&self.task_ids))
    }

    /// One command per chunk of task ids, for running a long task list in
    /// pieces. Without task ids (or with a zero chunk size) this is the single
    /// full command.
    pub fn render_chunks(&self, chunk_size: usize) -> Vec<String> {
        if self.task_ids.is_empty() || chunk_size == 0 {
            return vec![self.render()];
        }
        self.task_ids
            .chunks(chunk_size)
            .map(|chunk| render_groups(&self.groups(chunk)))
            .collect()
    }
}

fn qualified(provider: &str, model: &str) -> String {
    if provider.is_empty() {
        model.to_string()
    } else {
        format!("{}/{}", provider, model)
    }
}

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn render_groups(groups: &[Vec<String>]) -> String {
    groups
        .iter()
        .map(|group| {
            group
                .iter()
                .map(|w| shell_quote(w))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join(" \\\n    ")
}

/// POSIX single-quoting, skipped for words made only of safe characters.
/// A leading `#` would start a comment, so such words are always quoted.
pub fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && !word.starts_with('#')
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./=:,@%+#".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serve() -> ServeRecipe {
        ServeRecipe {
            model: "Qwen/Qwen3-14B".to_string(),
            served_model_name: "qwen3-14b".to_string(),
            tensor_parallel_size: 2,
            port: 8082,
            tool_call_parser: "hermes".to_string(),
            lora: None,
            gpu_memory_utilization: None,
        }
    }

    fn bench() -> BenchRecipe {
        BenchRecipe {
            domain: "retail".to_string(),
            agent_provider: "hosted_vllm".to_string(),
            agent_model: "qwen3-14b-ft-with-thinking".to_string(),
            agent_temperature: 0.0,
            agent_api_base: Some("http://localhost:8082/v1".to_string()),
            user_provider: "openai".to_string(),
            user_model: "gpt-4.1".to_string(),
            user_temperature: None,
            num_trials: 4,
            max_concurrency: 8,
            max_errors: 50,
            task_ids: Vec::new(),
        }
    }

    #[test]
    fn serve_without_lora() {
        let argv = serve().argv();
        assert_eq!(&argv[..3], &["vllm", "serve", "Qwen/Qwen3-14B"]);
        assert!(argv.contains(&"--enable-auto-tool-choice".to_string()));
        assert!(!argv.contains(&"--enable-lora".to_string()));
        assert_eq!(serve().client_model(), "qwen3-14b");
        assert_eq!(serve().base_url(), "http://localhost:8082/v1");
    }

    #[test]
    fn serve_with_lora_mounts_adapter() {
        let mut recipe = serve();
        recipe.lora = Some("ft=/models/lora".parse().unwrap());
        recipe.gpu_memory_utilization = Some(0.9);
        let rendered = recipe.render();
        assert!(rendered.contains("--enable-lora"));
        assert!(rendered.contains("--lora-modules ft=/models/lora"));
        assert!(rendered.contains("--gpu-memory-utilization 0.9"));
        assert_eq!(recipe.client_model(), "ft");
    }

    #[test]
    fn lora_requires_name_and_path() {
        assert!("ft".parse::<LoraAdapter>().is_err());
        assert!("=path".parse::<LoraAdapter>().is_err());
    }

    #[test]
    fn bench_quotes_json_args() {
        let rendered = bench().render();
        assert!(rendered.contains("--agent-llm hosted_vllm/qwen3-14b-ft-with-thinking"));
        assert!(rendered
            .contains(r#"--agent-llm-args '{"api_base":"http://localhost:8082/v1","temperature":0.0}'"#));
        assert!(rendered.contains("--user-llm openai/gpt-4.1"));
        assert!(!rendered.contains("--task-ids"));
    }

    #[test]
    fn bench_chunks_task_ids() {
        let mut recipe = bench();
        recipe.task_ids = (0..5).map(|i| i.to_string()).collect();
        let chunks = recipe.render_chunks(2);
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].ends_with("--task-ids 0 1"));
        assert!(chunks[2].ends_with("--task-ids 4"));
    }

    #[test]
    fn leading_hash_is_quoted() {
        assert_eq!(shell_quote("#1"), "'#1'");
        assert_eq!(shell_quote("task#1"), "task#1");

        let mut recipe = bench();
        recipe.task_ids = vec!["#1".to_string(), "2".to_string()];
        assert!(recipe.render().ends_with("--task-ids '#1' 2"));
    }

    #[test]
    fn quoting_handles_single_quotes() {
        assert_eq!(shell_quote("plain-word"), "plain-word");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }
}
