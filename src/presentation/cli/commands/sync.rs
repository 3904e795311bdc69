use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use super::load_settings;
use crate::common::error::SdkSyncError;
use crate::common::result::{ResultExt, SdkSyncResult};
use crate::application::use_cases::sync_module::{ModuleSyncOutcome, PublishDecision};
use crate::application::use_cases::sync_modules::{
    SyncModulesConfig, SyncModulesReport, SyncModulesUseCase,
};
use crate::infrastructure::filesystem::GitCredentials;
use crate::infrastructure::generator::CommandGenerator;
use crate::infrastructure::scm::GitScm;

/// Handler for the sync command
pub struct SyncCommand {
    pub config_path: PathBuf,
    pub branch: Option<String>,
    pub module: Option<String>,
    pub jobs: usize,
    pub verbose: bool,
}

impl SyncCommand {
    pub fn new(
        config_path: PathBuf,
        branch: Option<String>,
        module: Option<String>,
        jobs: usize,
        verbose: bool,
    ) -> Self {
        Self {
            config_path,
            branch,
            module,
            jobs,
            verbose,
        }
    }

    pub async fn execute(&self) -> SdkSyncResult<()> {
        let settings = load_settings(&self.config_path)?;

        let scm = GitScm::new();
        scm.check_availability().await.map_sdk_err(|e| {
            SdkSyncError::git_error_with_source("git is required to publish modules", e)
        })?;

        let mut config = SyncModulesConfig::default().with_jobs(self.jobs);
        if let Some(branch) = &self.branch {
            config = config.with_branch(branch);
        }
        if let Some(module) = &self.module {
            config = config.with_module(module);
        }

        let use_case = SyncModulesUseCase::new(
            config,
            settings,
            Arc::new(scm),
            Arc::new(CommandGenerator::new()),
        )
        .with_credentials(GitCredentials::from_env());

        println!("{} Synchronizing modules...", "::".blue().bold());

        let report = use_case.execute().await?;
        self.print_report(&report);

        if report.has_failures() {
            return Err(SdkSyncError::modules_failed(
                report.failure_count(),
                report.total_count(),
            ));
        }

        println!(
            "{} Synchronization completed! ({} modules)",
            "✓".green().bold(),
            report.success_count()
        );
        Ok(())
    }

    fn print_report(&self, report: &SyncModulesReport) {
        for module in &report.modules {
            match &module.result {
                Ok(outcome) => println!(
                    "  {} {} {}",
                    "✓".green(),
                    module.module.to_string().cyan().bold(),
                    describe(outcome, self.verbose)
                ),
                Err(e) => println!(
                    "  {} {} {}",
                    "✗".red(),
                    module.module.to_string().cyan().bold(),
                    e.to_string().red()
                ),
            }
        }
    }
}

fn describe(outcome: &ModuleSyncOutcome, verbose: bool) -> String {
    let decision = match outcome.decision {
        PublishDecision::NewBranch => format!("new branch {}", outcome.branch),
        PublishDecision::Commit => format!("committed to {}", outcome.branch),
        PublishDecision::NoChange => format!("{} unchanged", outcome.branch),
    };

    let tag = if outcome.tag.replaced {
        format!("tag {} replaced", outcome.version)
    } else {
        format!("tag {} created", outcome.version)
    };

    if verbose {
        format!("{}, {} at {}", decision, tag, outcome.tag.revision)
    } else {
        format!("{}, {}", decision, tag)
    }
}
