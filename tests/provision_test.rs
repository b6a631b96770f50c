//! Integration tests for sequencing real steps against a fake host.

mod common;

use common::FakeHost;
use erpstack::config::ProvisionConfig;
use erpstack::environment::EnvironmentLabel;
use erpstack::runner::{FailurePhase, RunResult, Sequencer, StepOutcome};
use erpstack::steps::{
    EnsureDatabaseRole, EnsureSystemAccount, ServiceManaged, Step, StepContext,
    WriteTemplatedFile,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ACCOUNT: &str = "svcuser";

struct Paths {
    config: PathBuf,
    unit: PathBuf,
}

fn setup() -> (TempDir, ProvisionConfig, Paths) {
    let temp = TempDir::new().unwrap();
    let paths = Paths {
        config: temp.path().join("erp.conf"),
        unit: temp.path().join("erp.service"),
    };
    let config = ProvisionConfig {
        user: ACCOUNT.to_string(),
        install_dir: temp.path().join("opt/erp"),
        config_path: paths.config.clone(),
        unit_dir: temp.path().to_path_buf(),
        ..Default::default()
    };
    (temp, config, paths)
}

fn scenario(paths: &Paths, password: &str) -> Vec<Box<dyn Step>> {
    vec![
        Box::new(EnsureSystemAccount::new(ACCOUNT, "/opt/erp")),
        Box::new(EnsureDatabaseRole::new(ACCOUNT)),
        Box::new(WriteTemplatedFile::config_file(
            &paths.config,
            Some(password.to_string()),
        )),
        Box::new(WriteTemplatedFile::service_unit(&paths.unit)),
    ]
}

fn run(
    config: &ProvisionConfig,
    host: &FakeHost,
    label: EnvironmentLabel,
    steps: &[Box<dyn Step>],
) -> RunResult {
    Sequencer::new(StepContext::new(config, host), label).run(steps)
}

fn backups(dir: &Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".bak"))
        .count()
}

#[test]
fn clean_host_applies_every_step() {
    let (_temp, config, paths) = setup();
    let host = FakeHost::new();

    let result = run(
        &config,
        &host,
        EnvironmentLabel::Standard,
        &scenario(&paths, "s3cret"),
    );

    assert!(result.success());
    assert_eq!(result.outcomes(), vec![&StepOutcome::Applied; 4]);
    assert!(host.has_user(ACCOUNT));
    assert!(host.has_role(ACCOUNT));

    let app_config = fs::read_to_string(&paths.config).unwrap();
    assert!(app_config.contains("db_user = svcuser"));
    assert!(app_config.contains("admin_passwd = s3cret"));
    let unit = fs::read_to_string(&paths.unit).unwrap();
    assert!(unit.contains("User=svcuser"));
}

#[test]
fn rerun_skips_every_step_and_changes_nothing() {
    let (temp, config, paths) = setup();
    let host = FakeHost::new();
    let steps = scenario(&paths, "s3cret");

    run(&config, &host, EnvironmentLabel::Standard, &steps);
    let config_before = fs::read_to_string(&paths.config).unwrap();
    let unit_before = fs::read_to_string(&paths.unit).unwrap();

    let second = run(&config, &host, EnvironmentLabel::Standard, &steps);

    assert_eq!(
        second.outcomes(),
        vec![&StepOutcome::SkippedAlreadySatisfied; 4]
    );
    assert_eq!(fs::read_to_string(&paths.config).unwrap(), config_before);
    assert_eq!(fs::read_to_string(&paths.unit).unwrap(), unit_before);
    assert_eq!(host.count("useradd"), 1);
    assert_eq!(
        host.commands()
            .iter()
            .filter(|c| c.contains("createuser"))
            .count(),
        1
    );
    assert_eq!(backups(temp.path()), 0);
}

#[test]
fn satisfied_precondition_never_runs_action() {
    let (_temp, config, paths) = setup();
    let host = FakeHost::new().with_user(ACCOUNT);

    let result = run(
        &config,
        &host,
        EnvironmentLabel::Standard,
        &scenario(&paths, "s3cret"),
    );

    assert_eq!(result.records[0].outcome, StepOutcome::SkippedAlreadySatisfied);
    assert_eq!(result.records[1].outcome, StepOutcome::Applied);
    assert_eq!(host.count("useradd"), 0);
}

#[test]
fn failing_action_halts_remaining_steps() {
    let (_temp, config, paths) = setup();
    let host = FakeHost::new().failing_on("createuser");

    let result = run(
        &config,
        &host,
        EnvironmentLabel::Standard,
        &scenario(&paths, "s3cret"),
    );

    assert!(!result.success());
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].outcome, StepOutcome::Applied);
    match &result.records[1].outcome {
        StepOutcome::Failed(failure) => {
            assert_eq!(failure.phase, FailurePhase::Action);
            assert!(failure.message.contains("createuser"));
        }
        other => panic!("unexpected outcome: {}", other),
    }
    assert!(!paths.config.exists());
    assert!(!paths.unit.exists());
}

#[test]
fn unanswerable_precondition_fails_the_run() {
    let (_temp, config, paths) = setup();
    let host = FakeHost::new().failing_on("pg_roles");

    let result = run(
        &config,
        &host,
        EnvironmentLabel::Standard,
        &scenario(&paths, "s3cret"),
    );

    let failure = result.failure().unwrap();
    assert_eq!(failure.name, "ensure-database-role");
    assert!(matches!(
        &failure.outcome,
        StepOutcome::Failed(f) if f.phase == FailurePhase::Precondition
    ));
    assert!(result.clone().into_result().is_err());
    assert!(!host.commands().iter().any(|c| c.contains("createuser")));
}

#[test]
fn container_hosts_omit_service_unit() {
    let (_temp, config, paths) = setup();
    let host = FakeHost::new();
    let steps: Vec<Box<dyn Step>> = vec![
        Box::new(EnsureSystemAccount::new(ACCOUNT, "/opt/erp")),
        Box::new(WriteTemplatedFile::config_file(
            &paths.config,
            Some("s3cret".to_string()),
        )),
        Box::new(ServiceManaged(WriteTemplatedFile::service_unit(&paths.unit))),
    ];

    let result = run(&config, &host, EnvironmentLabel::ContainerHosted, &steps);

    assert!(result.success());
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.not_applicable, vec!["write-service-unit"]);
    assert!(paths.config.exists());
    assert!(!paths.unit.exists());
}

#[test]
fn changed_password_rewrites_config_with_backup() {
    let (temp, config, paths) = setup();
    let host = FakeHost::new();

    run(
        &config,
        &host,
        EnvironmentLabel::Standard,
        &scenario(&paths, "first"),
    );
    let second = run(
        &config,
        &host,
        EnvironmentLabel::Standard,
        &scenario(&paths, "second"),
    );

    assert_eq!(second.records[2].outcome, StepOutcome::Applied);
    assert_eq!(second.records[3].outcome, StepOutcome::SkippedAlreadySatisfied);
    assert!(fs::read_to_string(&paths.config)
        .unwrap()
        .contains("admin_passwd = second"));
    assert_eq!(backups(temp.path()), 1);
}

#[test]
fn generated_password_is_kept_on_rerun() {
    let (_temp, config, paths) = setup();
    let host = FakeHost::new();
    let steps: Vec<Box<dyn Step>> = vec![Box::new(WriteTemplatedFile::config_file(
        &paths.config,
        None,
    ))];

    run(&config, &host, EnvironmentLabel::Standard, &steps);
    let first = fs::read_to_string(&paths.config).unwrap();
    let second = run(&config, &host, EnvironmentLabel::Standard, &steps);

    assert_eq!(
        second.outcomes(),
        vec![&StepOutcome::SkippedAlreadySatisfied]
    );
    assert_eq!(fs::read_to_string(&paths.config).unwrap(), first);
}

#[test]
fn plan_reports_without_applying() {
    let (_temp, config, paths) = setup();
    let host = FakeHost::new().with_role(ACCOUNT);
    let steps = scenario(&paths, "s3cret");

    let planned = Sequencer::new(StepContext::new(&config, &host), EnvironmentLabel::Standard)
        .plan(&steps);

    let satisfied: Vec<_> = planned.iter().map(|p| p.satisfied.clone()).collect();
    assert_eq!(satisfied, vec![Ok(false), Ok(true), Ok(false), Ok(false)]);
    assert_eq!(host.count("useradd"), 0);
    assert!(!paths.config.exists());
}
