use anyhow::Result;

use crate::domain::ToolDefinition;

use super::super::Container;

pub struct ToolsController<'a> {
    container: &'a Container,
}

impl<'a> ToolsController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn list(&self, json: bool) -> Result<String> {
        let catalog = self.container.catalog();

        if json {
            return Ok(serde_json::to_string_pretty(catalog.tools())?);
        }

        Ok(self.format_tools(catalog.tools()))
    }

    fn format_tools(&self, tools: &[ToolDefinition]) -> String {
        let mut output = format!("Available tools ({}):\n", tools.len());

        for tool in tools {
            output.push_str(&format!("\n  {}\n    {}\n", tool.name(), tool.description()));

            let parameters = tool.parameters();
            if parameters.is_empty() {
                output.push_str("    (no parameters)\n");
            }
            for param in parameters {
                let required = if param.required { ", required" } else { "" };
                output.push_str(&format!(
                    "    - {} ({}{}): {}\n",
                    param.name, param.kind, required, param.description
                ));
            }
        }

        output.trim_end().to_string()
    }
}
