mod common;

use std::time::Duration;

use common::router;
use freertr::{CommandRequest, Error};
use freertr::commands::{MatchPolicy, run};
use freertr::error::{CommandError, DriverError};

fn quick(request: CommandRequest) -> CommandRequest {
    request.retries(3).interval(Duration::ZERO)
}

#[tokio::test]
async fn test_outputs_in_request_order() {
    let mut runner = router();
    let request = CommandRequest::new(["show platform", "show vrf routing"]);

    let outcome = run(&mut runner, &request).await.unwrap();

    assert_eq!(outcome.stdout.len(), 2);
    assert!(outcome.stdout[0].starts_with("freeRouter"));
    assert_eq!(outcome.stdout_lines[1][0], "name   rd    interfaces");
    assert!(outcome.warnings.is_empty());
}

#[tokio::test]
async fn test_conditions_never_met_stop_after_retries() {
    let mut runner = router();
    let request = quick(CommandRequest::new(["show platform"]).wait_for([
        "result[0] contains juniper",
        "result[0] contains cisco",
    ]));

    let err = run(&mut runner, &request).await.unwrap_err();

    match err {
        Error::Command(CommandError::ConditionsNotMet { failed }) => {
            assert_eq!(failed, vec!["result[0] contains juniper", "result[0] contains cisco"]);
        }
        other => panic!("unexpected: {:?}", other),
    }
    assert_eq!(runner.count("show platform"), 3);
}

#[tokio::test]
async fn test_all_policy_reports_only_unmet() {
    let mut runner = router();
    let request = quick(CommandRequest::new(["show platform"]).wait_for([
        "result[0] contains rare",
        "result[0] contains cisco",
    ]));

    match run(&mut runner, &request).await.unwrap_err() {
        Error::Command(CommandError::ConditionsNotMet { failed }) => {
            assert_eq!(failed, vec!["result[0] contains cisco"]);
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn test_any_policy_satisfied_by_one() {
    let mut runner = router();
    let request = quick(
        CommandRequest::new(["show platform"])
            .wait_for(["result[0] contains rare", "result[0] contains cisco"])
            .match_policy(MatchPolicy::Any),
    );

    let outcome = run(&mut runner, &request).await.unwrap();

    assert_eq!(outcome.stdout.len(), 1);
    assert_eq!(runner.count("show platform"), 1);
}

#[tokio::test]
async fn test_config_command_rejected_before_sending() {
    let mut runner = router();
    let request = CommandRequest::new(["show platform", "configure terminal"]);

    let err = run(&mut runner, &request).await.unwrap_err();

    assert!(matches!(err, Error::Command(CommandError::ConfigModeNotAllowed { .. })));
    assert!(runner.calls.is_empty());
}

#[tokio::test]
async fn test_invalid_conditional_sends_nothing() {
    let mut runner = router();
    let request = CommandRequest::new(["show platform"]).wait_for(["result[0] resembles x"]);

    let err = run(&mut runner, &request).await.unwrap_err();

    assert!(matches!(err, Error::Command(CommandError::InvalidConditional { .. })));
    assert!(runner.calls.is_empty());
}

#[tokio::test]
async fn test_dry_run_drops_non_show() {
    let mut runner = router();
    let request = CommandRequest::new(["show platform", "clear counters"]).dry_run(true);

    let outcome = run(&mut runner, &request).await.unwrap();

    assert_eq!(runner.sent(), vec!["show platform"]);
    assert_eq!(outcome.warnings.len(), 1);
}

#[tokio::test]
async fn test_device_failure_aborts() {
    let mut runner = router().with_failure("show bogus", "% bad command");
    let request = CommandRequest::new(["show bogus", "show platform"]);

    let err = run(&mut runner, &request).await.unwrap_err();

    assert!(matches!(err, Error::Driver(DriverError::CommandFailed { .. })));
    assert_eq!(runner.count("show platform"), 0);
}
