/// Templates module for embedded YAML templates and `{token}` substitution
use std::collections::BTreeMap;

/// Get the default sdksync.yaml template content
/// The template is embedded at compile time using include_str! macro
pub fn get_config_template() -> &'static str {
    include_str!("../../templates/sdksync.yaml")
}

/// Replaces `{token}` placeholders in template text
#[derive(Debug, Clone, Default)]
pub struct TemplateProcessor {
    replacements: BTreeMap<String, String>,
}

impl TemplateProcessor {
    /// Create a new template processor without replacements
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a replacement for `{token}`
    pub fn with_token(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.replacements.insert(token.into(), value.into());
        self
    }

    /// Process template with the registered replacements.
    /// Unknown placeholders are left untouched.
    pub fn process(&self, template: &str) -> String {
        self.replacements
            .iter()
            .fold(template.to_string(), |content, (token, value)| {
                content.replace(&format!("{{{}}}", token), value)
            })
    }
}
