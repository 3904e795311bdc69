use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{CodeGenerator, GeneratorError};
use crate::common::templates::TemplateProcessor;
use crate::domain::entities::{GeneratorConfig, Module};

/// Runs an external code generator against a module's specification.
///
/// Before the generator runs, the package skeleton is prepared: `src/`, the generator
/// configuration file and the package template files with module tokens substituted.
#[derive(Debug, Clone, Default)]
pub struct CommandGenerator;

impl CommandGenerator {
    pub fn new() -> Self {
        Self
    }

    fn package_tokens(module: &Module, namespace: &str) -> TemplateProcessor {
        TemplateProcessor::new()
            .with_token("package", module.id.as_str())
            .with_token("namespace", namespace)
            .with_token("escapedNamespace", escape_namespace(namespace))
            .with_token("version", module.raw_version.as_str())
            .with_token("packagistVersion", module.normalized_version().as_str())
            .with_token("description", module.description())
    }

    fn write_config_file(
        &self,
        module: &Module,
        config: &GeneratorConfig,
        namespace: &str,
    ) -> Result<PathBuf, GeneratorError> {
        let source_dir = module.working_dir.join("src");
        fs::create_dir_all(&source_dir).map_err(|e| GeneratorError::io(&source_dir, e))?;

        let config_path = module.working_dir.join(&config.config_file);
        let contents = TemplateProcessor::new()
            .with_token("sourceDir", source_dir.display().to_string())
            .with_token("namespace", namespace)
            .with_token("escapedNamespace", escape_namespace(namespace))
            .process(&config.config_template);

        fs::write(&config_path, contents).map_err(|e| GeneratorError::io(&config_path, e))?;
        Ok(config_path)
    }

    fn copy_template_files(
        &self,
        template_dir: &Path,
        out_dir: &Path,
        tokens: &TemplateProcessor,
    ) -> Result<usize, GeneratorError> {
        let mut copied = 0;
        for entry in WalkDir::new(template_dir).min_depth(1) {
            let entry = entry.map_err(|e| GeneratorError::Template(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(template_dir)
                .map_err(|e| GeneratorError::Template(e.to_string()))?;
            let target = out_dir.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| GeneratorError::io(parent, e))?;
            }

            let bytes = fs::read(entry.path()).map_err(|e| GeneratorError::io(entry.path(), e))?;
            let contents = match String::from_utf8(bytes) {
                Ok(text) => tokens.process(&text).into_bytes(),
                Err(binary) => binary.into_bytes(),
            };
            fs::write(&target, contents).map_err(|e| GeneratorError::io(&target, e))?;
            copied += 1;
        }
        Ok(copied)
    }

    async fn run_command(&self, argv: &[String]) -> Result<(), GeneratorError> {
        let (program, args) = argv.split_first().ok_or(GeneratorError::EmptyCommand)?;
        let command_line = argv.join(" ");
        debug!(command = %command_line, "running generator command");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| GeneratorError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(GeneratorError::CommandFailed {
                command: command_line,
                exit_code: output.status.code().unwrap_or(-1),
                output: detail,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl CodeGenerator for CommandGenerator {
    async fn generate(&self, module: &Module, config: &GeneratorConfig) -> Result<(), GeneratorError> {
        let namespace = module.id.namespace(&config.top_namespace);
        let config_path = self.write_config_file(module, config, &namespace)?;

        match config.template_dir.as_deref() {
            Some(template_dir) if template_dir.is_dir() => {
                let tokens = Self::package_tokens(module, &namespace);
                let copied = self.copy_template_files(template_dir, &module.working_dir, &tokens)?;
                debug!(module = %module.id, copied, "package templates copied");
            }
            Some(template_dir) => {
                warn!(path = %template_dir.display(), "template directory not found, skipping");
            }
            None => {}
        }

        let command_tokens = TemplateProcessor::new()
            .with_token("spec", module.spec_path.display().to_string())
            .with_token("config", config_path.display().to_string())
            .with_token("dir", module.working_dir.display().to_string())
            .with_token("module", module.id.as_str());

        let render = |argv: &[String]| -> Vec<String> {
            argv.iter().map(|arg| command_tokens.process(arg)).collect()
        };

        self.run_command(&render(&config.command)).await?;
        for post_command in &config.post_commands {
            self.run_command(&render(post_command)).await?;
        }

        info!(module = %module.id, namespace = %namespace, "package generated");
        Ok(())
    }
}

/// Namespace with every backslash doubled, for embedding in JSON and PHP strings
fn escape_namespace(namespace: &str) -> String {
    namespace.replace('\\', "\\\\")
}
