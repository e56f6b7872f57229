//! Prompt templates for Cronista.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub qa: QaPrompts,
}


/// Prompt for answering a question from retrieved context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaPrompts {
    pub template: String,
}

impl Default for QaPrompts {
    fn default() -> Self {
        Self {
            template: r#"Eres un historiador experto que responde exclusivamente en español. Responde de manera clara y precisa usando solo la información contenida en el contexto.

Contexto:
{{context}}

Pregunta:
{{question}}

Respuesta:"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from defaults, with optional custom directory overrides.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let qa_path = custom_path.join("qa.toml");
            if qa_path.exists() {
                let content = std::fs::read_to_string(&qa_path)?;
                prompts.qa = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_prompt_has_placeholders() {
        let prompts = Prompts::default();
        assert!(prompts.qa.template.contains("{{context}}"));
        assert!(prompts.qa.template.contains("{{question}}"));
        assert!(prompts.qa.template.contains("historiador"));
    }

    #[test]
    fn test_render_template() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "X\n\nY".to_string());
        vars.insert("question".to_string(), "¿Qué pasó?".to_string());

        let rendered = Prompts::render(&Prompts::default().qa.template, &vars);
        assert!(rendered.contains("Contexto:\nX\n\nY"));
        assert!(rendered.contains("Pregunta:\n¿Qué pasó?"));
        assert!(!rendered.contains("{{"));
    }
}
