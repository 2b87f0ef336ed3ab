//! Project bindings against a fake platform

mod common;

use common::{in_minutes, Answer, FakeApi, TestEnv};
use impt_cli::error::CliError;
use impt_cli::project::{CreateOptions, ProjectManager, UpdateOptions};
use serde_json::json;

const PROJECT_FILE: &str = ".impt.project";

fn logged_in(api: FakeApi, answers: Vec<Answer>) -> TestEnv {
    let env = TestEnv::new(api, answers);
    env.write_global_auth(json!({
        "acc-a": { "accessToken": "tok-a", "expiresAt": in_minutes(60), "isDefault": true },
        "acc-b": { "accessToken": "tok-b", "expiresAt": in_minutes(60), "accounts": ["acc-shared"] }
    }));
    env
}

#[tokio::test]
async fn test_create_first_binding_becomes_default() {
    let env = logged_in(FakeApi::default(), vec![]);
    std::fs::write(env.local_path("device.nut"), "// device").unwrap();
    let ctx = env.context();

    let summary = ProjectManager::new(&ctx)
        .create(CreateOptions {
            device_group: "dg-1".into(),
            device_file: Some("device.nut".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(summary.is_default);
    let stored = env.read_json(env.local_path(PROJECT_FILE));
    let binding = &stored["deviceGroups"]["dg-1"];
    assert_eq!(binding["deviceFile"], json!("device.nut"));
    assert_eq!(binding["accountID"], json!("acc-a"));
    assert_eq!(binding["endpoint"], json!(ctx.settings.api.endpoint));
    assert_eq!(binding["isDefault"], json!(true));
    assert_eq!(env.api.calls(), vec!["get_device_group:dg-1".to_string()]);
}

#[tokio::test]
async fn test_create_second_binding_keeps_default() {
    let env = logged_in(FakeApi::default(), vec![]);
    let ctx = env.context();
    let manager = ProjectManager::new(&ctx);

    manager
        .create(CreateOptions {
            device_group: "dg-1".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let second = manager
        .create(CreateOptions {
            device_group: "dg-2".into(),
            account: Some("acc-b".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(!second.is_default);
    assert_eq!(second.account_id.as_deref(), Some("acc-b"));
    let stored = env.read_json(env.local_path(PROJECT_FILE));
    assert_eq!(stored["deviceGroups"]["dg-1"]["isDefault"], json!(true));
}

#[tokio::test]
async fn test_create_with_missing_device_file() {
    let env = logged_in(FakeApi::default(), vec![]);
    let ctx = env.context();

    let result = ProjectManager::new(&ctx)
        .create(CreateOptions {
            device_group: "dg-1".into(),
            device_file: Some("missing.nut".into()),
            ..Default::default()
        })
        .await;

    match result {
        Err(CliError::EntityNotFound { kind, name }) => {
            assert_eq!(kind, "Device file");
            assert_eq!(name, "missing.nut");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(!env.local_path(PROJECT_FILE).exists());
}

#[tokio::test]
async fn test_create_unknown_device_group() {
    let api = FakeApi {
        missing_groups: vec!["dg-x".into()],
        ..Default::default()
    };
    let env = logged_in(api, vec![]);
    let ctx = env.context();

    let result = ProjectManager::new(&ctx)
        .create(CreateOptions {
            device_group: "dg-x".into(),
            ..Default::default()
        })
        .await;

    assert!(matches!(result, Err(CliError::EntityNotFound { .. })));
}

#[tokio::test]
async fn test_create_without_login() {
    let env = TestEnv::new(FakeApi::default(), vec![]);
    let ctx = env.context();

    let result = ProjectManager::new(&ctx)
        .create(CreateOptions {
            device_group: "dg-1".into(),
            ..Default::default()
        })
        .await;

    assert!(matches!(result, Err(CliError::NoConfig { .. })));
}

#[tokio::test]
async fn test_update_is_local_only() {
    let env = logged_in(FakeApi::default(), vec![]);
    std::fs::write(env.local_path("agent.nut"), "// agent").unwrap();
    env.write_json(
        env.local_path(PROJECT_FILE),
        json!({ "deviceGroups": { "dg-1": { "isDefault": true }, "dg-2": {} } }),
    );
    let ctx = env.context();

    let summary = ProjectManager::new(&ctx)
        .update(UpdateOptions {
            device_group: Some("dg-2".into()),
            agent_file: Some("agent.nut".into()),
            make_default: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(summary.agent_file.as_deref(), Some("agent.nut"));
    assert!(summary.is_default);
    assert!(env.api.calls().is_empty());
    let stored = env.read_json(env.local_path(PROJECT_FILE));
    assert!(stored["deviceGroups"]["dg-1"].get("isDefault").is_none());
}

#[tokio::test]
async fn test_info_reports_outdated_device_group() {
    let api = FakeApi {
        missing_groups: vec!["dg-1".into()],
        ..Default::default()
    };
    let env = logged_in(api, vec![]);
    env.write_json(
        env.local_path(PROJECT_FILE),
        json!({ "deviceGroups": { "dg-1": { "isDefault": true, "accountID": "acc-a" } } }),
    );
    let ctx = env.context();

    let info = ProjectManager::new(&ctx).info(None).await.unwrap();

    assert!(info.outdated.is_some());
    assert!(info.name.is_none());
    assert_eq!(info.binding.device_group_id, "dg-1");
}

#[tokio::test]
async fn test_info_all_skips_and_uses_shared_accounts() {
    let api = FakeApi {
        broken_groups: vec!["dg-3".into()],
        ..Default::default()
    };
    let env = logged_in(api, vec![]);
    env.write_json(
        env.local_path(PROJECT_FILE),
        json!({
            "builder": { "NAME": "value" },
            "deviceGroups": {
                "dg-1": { "isDefault": true, "accountID": "acc-a" },
                "dg-2": { "accountID": "acc-shared" },
                "dg-3": {},
                "dg-4": { "skip": true }
            }
        }),
    );
    let ctx = env.context();

    let mut seen = Vec::new();
    let result = ProjectManager::new(&ctx)
        .info_all(|id, result| {
            seen.push((id.to_string(), result.is_ok()));
            if let Ok(info) = result {
                assert_eq!(info.builder_variables, vec!["NAME".to_string()]);
            }
        })
        .await;

    assert!(matches!(
        result,
        Err(CliError::PartialFailure {
            succeeded: 2,
            failed: 1
        })
    ));
    assert_eq!(
        seen,
        vec![
            ("dg-1".to_string(), true),
            ("dg-2".to_string(), true),
            ("dg-3".to_string(), false),
        ]
    );
    assert_eq!(env.api.count("get_device_group:dg-4"), 0);
}

#[tokio::test]
async fn test_info_all_does_not_carry_shared_account_over() {
    let env = TestEnv::new(FakeApi::default(), vec![]);
    env.write_global_auth(json!({
        "acc-a": { "accessToken": "tok-a", "expiresAt": in_minutes(60) },
        "acc-b": { "accessToken": "tok-b", "expiresAt": in_minutes(60), "accounts": ["acc-shared"] }
    }));
    env.write_json(
        env.local_path(PROJECT_FILE),
        json!({
            "deviceGroups": {
                "dg-1": { "isDefault": true, "accountID": "acc-shared" },
                "dg-2": {}
            }
        }),
    );
    let ctx = env.context();

    let mut seen = Vec::new();
    let result = ProjectManager::new(&ctx)
        .info_all(|id, result| {
            let no_config = matches!(result, Err(CliError::NoConfig { .. }));
            seen.push((id.to_string(), result.is_ok(), no_config));
        })
        .await;

    assert!(matches!(
        result,
        Err(CliError::PartialFailure {
            succeeded: 1,
            failed: 1
        })
    ));
    assert_eq!(
        seen,
        vec![
            ("dg-1".to_string(), true, false),
            ("dg-2".to_string(), false, true),
        ]
    );
    assert_eq!(env.api.count("get_device_group:dg-2"), 0);
}

#[tokio::test]
async fn test_select_and_list() {
    let env = logged_in(FakeApi::default(), vec![]);
    env.write_json(
        env.local_path(PROJECT_FILE),
        json!({ "deviceGroups": { "dg-1": { "isDefault": true }, "dg-2": {} } }),
    );
    let ctx = env.context();
    let manager = ProjectManager::new(&ctx);

    manager.select("dg-2").await.unwrap();
    let bindings = manager.list().await.unwrap();

    let defaults: Vec<_> = bindings
        .iter()
        .filter(|b| b.is_default)
        .map(|b| b.device_group_id.as_str())
        .collect();
    assert_eq!(defaults, vec!["dg-2"]);
    assert!(matches!(
        manager.select("dg-9").await,
        Err(CliError::EntityNotFound { .. })
    ));
}

#[tokio::test]
async fn test_delete_last_binding_removes_file() {
    let env = logged_in(FakeApi::default(), vec![Answer::Confirm(true)]);
    env.write_json(
        env.local_path(PROJECT_FILE),
        json!({ "deviceGroups": { "dg-1": { "isDefault": true } } }),
    );
    let ctx = env.context();

    let removed = ProjectManager::new(&ctx)
        .delete(None, false, false)
        .await
        .unwrap();

    assert_eq!(removed, vec!["dg-1".to_string()]);
    assert!(!env.local_path(PROJECT_FILE).exists());
}

#[tokio::test]
async fn test_delete_default_promotes_next_binding() {
    let env = logged_in(FakeApi::default(), vec![]);
    env.write_json(
        env.local_path(PROJECT_FILE),
        json!({ "deviceGroups": { "dg-1": { "isDefault": true }, "dg-2": {} } }),
    );
    let ctx = env.context();

    ProjectManager::new(&ctx)
        .delete(Some("dg-1"), false, true)
        .await
        .unwrap();

    let stored = env.read_json(env.local_path(PROJECT_FILE));
    assert!(stored["deviceGroups"].get("dg-1").is_none());
    assert_eq!(stored["deviceGroups"]["dg-2"]["isDefault"], json!(true));
}

#[tokio::test]
async fn test_delete_declined() {
    let env = logged_in(FakeApi::default(), vec![Answer::Confirm(false)]);
    env.write_json(
        env.local_path(PROJECT_FILE),
        json!({ "deviceGroups": { "dg-1": { "isDefault": true } } }),
    );
    let ctx = env.context();

    let result = ProjectManager::new(&ctx).delete(None, true, false).await;

    assert!(matches!(result, Err(CliError::Cancelled)));
    assert!(env.local_path(PROJECT_FILE).exists());
}
