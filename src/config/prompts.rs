//! Prompt templates for orgsearch.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub concepts: ConceptPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for STEM concept extraction.
///
/// Whatever the wording, the model must answer with a JSON object holding a
/// single `"concepts"` key mapped to a comma-separated string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConceptPrompts {
    pub system: String,
}

impl Default for ConceptPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an AI assistant that specializes in identifying the key STEM concepts required to solve a given problem. When provided with a STEM-related question, your task is to analyze the problem and return a structured JSON response containing a list of fundamental concepts necessary for solving it.

Follow these guidelines:

- Extract and list **all** relevant concepts that contribute to solving the problem.
- Concepts should be **fundamental principles**, **laws**, **theorems**, **formulas**, or **methods**.
- Format your response as a JSON object with a **single key** `"concepts"`, mapping to a **comma-separated string** of concepts.
- Keep the list **concise yet comprehensive**, avoiding redundancy.

**Example Input:**
"A car accelerates uniformly from rest at a rate of 3 m/s² for 5 seconds. What is its final velocity?"

**Example Output:**
```json
{
  "concepts": "Kinematic Equations, Acceleration, Initial Velocity, Final Velocity, Time, Uniform Acceleration Formula"
}
```"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&Path>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let concepts_path = dir.join("concepts.toml");
            if concepts_path.exists() {
                let content = std::fs::read_to_string(&concepts_path)?;
                prompts.concepts = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// The concept-extraction system prompt with custom variables applied.
    pub fn concept_system(&self) -> String {
        Self::render(&self.concepts.system, &self.variables)
    }
}
