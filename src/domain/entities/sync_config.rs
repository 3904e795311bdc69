use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::domain::value_objects::{BranchName, ModuleId, RemoteUrl, RemoteUrlError};

/// Author recorded on generated commits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CommitAuthor {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(email)]
    pub email: String,
}

impl Default for CommitAuthor {
    fn default() -> Self {
        Self {
            name: "sdksync".to_string(),
            email: "sdksync@users.noreply.github.com".to_string(),
        }
    }
}

/// Settings handed to the code generator on every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Namespace root, module parts are appended
    pub top_namespace: String,

    /// Package template files; skipped when absent
    pub template_dir: Option<PathBuf>,

    /// Generator configuration file written into the package
    #[validate(length(min = 1))]
    pub config_file: String,

    /// Content of `config_file`; `{sourceDir}` `{namespace}` `{escapedNamespace}` are substituted
    pub config_template: String,

    /// Program and arguments; `{spec}` `{config}` `{dir}` `{module}` are substituted
    #[validate(length(min = 1))]
    pub command: Vec<String>,

    /// Commands run in order after a successful generation
    pub post_commands: Vec<Vec<String>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            top_namespace: "Ebay".to_string(),
            template_dir: Some(PathBuf::from("templates/package")),
            config_file: ".config.openapi-generator.php".to_string(),
            config_template: [
                "<?php",
                "",
                "use OpenAPI\\CodeGenerator\\Config;",
                "",
                "return [",
                "Config::OPTION_ROOT_SOURCE_DIR => '{sourceDir}',",
                "Config::OPTION_NAMESPACE_ROOT => '{namespace}',",
                "];",
                "",
            ]
            .join("\n"),
            command: vec![
                "vendor/bin/openapi-generator".to_string(),
                "generate".to_string(),
                "--input={spec}".to_string(),
                "--config={config}".to_string(),
            ],
            post_commands: vec![vec![
                "composer".to_string(),
                "-d".to_string(),
                "{dir}".to_string(),
                "update".to_string(),
            ]],
        }
    }
}

/// Contents of `sdksync.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SyncConfig {
    #[validate(length(min = 1))]
    pub organization: String,

    pub repo_prefix: String,

    pub module_suffix: String,

    #[validate(length(min = 1))]
    pub remote_base: String,

    pub spec_dir: PathBuf,

    pub work_dir: PathBuf,

    pub default_branch: String,

    /// `{date}` expands to the commit time
    #[validate(length(min = 1))]
    pub commit_message: String,

    #[validate(nested)]
    pub commit_author: CommitAuthor,

    #[validate(nested)]
    pub generator: GeneratorConfig,

    /// Module identifier to specification download URL
    pub downloads: BTreeMap<String, String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            organization: "bricre".to_string(),
            repo_prefix: "ebay-sdk".to_string(),
            module_suffix: "-api-model".to_string(),
            remote_base: "https://github.com".to_string(),
            spec_dir: PathBuf::from("var/temp/ebay"),
            work_dir: PathBuf::from("var/generated"),
            default_branch: "master".to_string(),
            commit_message: "Generated against OpenAPI on {date}".to_string(),
            commit_author: CommitAuthor::default(),
            generator: GeneratorConfig::default(),
            downloads: BTreeMap::new(),
        }
    }
}

impl SyncConfig {
    /// Resolve relative directories against `base`
    pub fn rooted_at(mut self, base: &Path) -> Self {
        if self.spec_dir.is_relative() {
            self.spec_dir = base.join(&self.spec_dir);
        }
        if self.work_dir.is_relative() {
            self.work_dir = base.join(&self.work_dir);
        }
        if let Some(template_dir) = self.generator.template_dir.take() {
            self.generator.template_dir = Some(if template_dir.is_relative() {
                base.join(template_dir)
            } else {
                template_dir
            });
        }
        self
    }

    pub fn default_branch(&self) -> Result<BranchName, crate::domain::value_objects::BranchNameError> {
        BranchName::new(&self.default_branch)
    }

    /// Working copy of `module`
    pub fn working_dir(&self, module: &ModuleId) -> PathBuf {
        self.work_dir.join(module.as_str())
    }

    /// Remote repository of `module`
    pub fn remote_url(&self, module: &ModuleId) -> Result<RemoteUrl, RemoteUrlError> {
        RemoteUrl::for_module(
            &self.remote_base,
            &self.organization,
            &self.repo_prefix,
            module,
            &self.module_suffix,
        )
    }

    /// Commit message with `{date}` expanded
    pub fn render_commit_message(&self, date: &chrono::DateTime<chrono::Utc>) -> String {
        self.commit_message
            .replace("{date}", &date.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    }
}
