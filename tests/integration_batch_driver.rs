//! Integration tests of the multi-module batch driver

mod common;

use common::fake_git::FakeGit;
use common::test_fixtures::{FileGenerator, SyncFixture};
use sdksync::application::use_cases::{
    PublishDecision, SyncModuleError, SyncModulesConfig, SyncModulesError, SyncModulesUseCase,
};
use sdksync::infrastructure::filesystem::GitCredentials;
use std::sync::Arc;

const MODULES: [&str; 3] = ["buy-browse", "sell-feed", "sell-inventory"];

fn prepared(fixture: &SyncFixture) -> (Arc<FakeGit>, Arc<FileGenerator>) {
    let git = Arc::new(FakeGit::new());
    let generator = Arc::new(FileGenerator::new());
    for name in MODULES {
        fixture.write_spec(name, "v1.0.0");
        git.create_remote(&fixture.remote_key(name));
        generator.set_files(name, &[("src/Client.php", name)]);
    }
    (git, generator)
}

#[tokio::test]
async fn test_failure_of_one_module_does_not_stop_the_batch() {
    let fixture = SyncFixture::new();
    let (git, generator) = prepared(&fixture);
    generator.fail_for("sell-feed");

    let report = SyncModulesUseCase::new(
        SyncModulesConfig::default(),
        fixture.settings(),
        git.clone(),
        generator.clone(),
    )
    .execute()
    .await
    .unwrap();

    assert_eq!(report.total_count(), 3);
    assert_eq!(report.success_count(), 2);
    assert_eq!(report.failure_count(), 1);
    assert!(report.has_failures());

    let order: Vec<&str> = report.modules.iter().map(|m| m.module.as_str()).collect();
    assert_eq!(order, MODULES.to_vec());
    assert_eq!(generator.calls(), MODULES.to_vec());

    let failed: Vec<&SyncModuleError> = report.failed().collect();
    assert_eq!(failed[0].module().as_str(), "sell-feed");
    assert!(matches!(failed[0], SyncModuleError::GenerationFailed { .. }));

    for name in ["buy-browse", "sell-inventory"] {
        let url = fixture.remote_key(name);
        let head = git.remote_branch(&url, "master").expect("branch published");
        assert_eq!(git.remote_tag(&url, "1.0.0"), Some(head));
    }
    assert_eq!(git.remote_branch(&fixture.remote_key("sell-feed"), "master"), None);
}

#[tokio::test]
async fn test_single_module_selection() {
    let fixture = SyncFixture::new();
    let (git, generator) = prepared(&fixture);

    let report = SyncModulesUseCase::new(
        SyncModulesConfig::default().with_module("sell-inventory").with_branch("develop"),
        fixture.settings(),
        git.clone(),
        generator.clone(),
    )
    .execute()
    .await
    .unwrap();

    assert_eq!(report.total_count(), 1);
    let outcome = report.succeeded().next().unwrap();
    assert_eq!(outcome.module.as_str(), "sell-inventory");
    assert_eq!(outcome.branch.as_str(), "develop");
    assert_eq!(outcome.decision, PublishDecision::NewBranch);
    assert_eq!(generator.calls(), vec!["sell-inventory".to_string()]);
}

#[tokio::test]
async fn test_unknown_module_lists_choices_before_touching_git() {
    let fixture = SyncFixture::new();
    let (git, generator) = prepared(&fixture);

    let error = SyncModulesUseCase::new(
        SyncModulesConfig::default().with_module("sell-nothing"),
        fixture.settings(),
        git.clone(),
        generator.clone(),
    )
    .execute()
    .await
    .unwrap_err();

    assert!(matches!(error, SyncModulesError::UnknownModule(_)));
    assert_eq!(
        error.to_string(),
        "Unknown module 'sell-nothing', available modules are: buy-browse , sell-feed , sell-inventory"
    );
    assert!(git.calls().is_empty());
    assert!(generator.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_branch_is_rejected() {
    let fixture = SyncFixture::new();
    let (git, generator) = prepared(&fixture);

    let error = SyncModulesUseCase::new(
        SyncModulesConfig::default().with_branch("bad branch"),
        fixture.settings(),
        git.clone(),
        generator,
    )
    .execute()
    .await
    .unwrap_err();

    assert!(matches!(error, SyncModulesError::InvalidBranch(_)));
    assert!(git.calls().is_empty());
}

#[tokio::test]
async fn test_parallel_jobs_keep_catalog_order() {
    let fixture = SyncFixture::new();
    let (git, generator) = prepared(&fixture);

    let report = SyncModulesUseCase::new(
        SyncModulesConfig::default().with_jobs(3),
        fixture.settings(),
        git.clone(),
        generator,
    )
    .execute()
    .await
    .unwrap();

    assert!(!report.has_failures());
    let order: Vec<&str> = report.modules.iter().map(|m| m.module.as_str()).collect();
    assert_eq!(order, MODULES.to_vec());
}

#[tokio::test]
async fn test_module_without_version_fails_alone() {
    let fixture = SyncFixture::new();
    let (git, generator) = prepared(&fixture);
    std::fs::write(
        fixture.settings.spec_dir.join("buy-browse.json"),
        r#"{"info": {"title": "Browse API"}}"#,
    )
    .unwrap();

    let report = SyncModulesUseCase::new(
        SyncModulesConfig::default(),
        fixture.settings(),
        git.clone(),
        generator.clone(),
    )
    .execute()
    .await
    .unwrap();

    assert_eq!(report.failure_count(), 1);
    let failed = report.failed().next().unwrap();
    assert_eq!(failed.module().as_str(), "buy-browse");
    assert!(matches!(failed, SyncModuleError::InvalidInput { .. }));
    assert_eq!(generator.calls(), vec!["sell-feed".to_string(), "sell-inventory".to_string()]);
}

#[tokio::test]
async fn test_credentials_are_embedded_in_push_url() {
    let fixture = SyncFixture::new();
    let git = Arc::new(FakeGit::new());
    let generator = Arc::new(FileGenerator::new());
    fixture.write_spec("sell-feed", "1.0.0");
    generator.set_files("sell-feed", &[("src/Client.php", "feed")]);

    let credentials = fixture
        .remote("sell-feed")
        .with_credentials("bot", "s3cret")
        .unwrap();
    git.create_remote(credentials.as_git_arg());

    let report = SyncModulesUseCase::new(
        SyncModulesConfig::default(),
        fixture.settings(),
        git.clone(),
        generator,
    )
    .with_credentials(Some(GitCredentials {
        username: "bot".to_string(),
        token: "s3cret".to_string(),
    }))
    .execute()
    .await
    .unwrap();

    assert!(!report.has_failures());
    assert!(git.remote_branch(credentials.as_git_arg(), "master").is_some());
    assert_eq!(git.calls_to("ls-remote"), vec![credentials.as_git_arg().to_string()]);
}
