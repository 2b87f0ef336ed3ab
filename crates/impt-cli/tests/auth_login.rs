//! Login flows against a fake platform

mod common;

use common::{Answer, FakeApi, TestEnv};
use impt_cli::auth::{AuthLocation, AuthManager, LoginOptions};
use impt_cli::error::CliError;
use serde_json::json;

#[tokio::test]
async fn test_login_key_takes_precedence_over_user() {
    let env = TestEnv::new(FakeApi::default(), vec![]);
    let ctx = env.context();

    let outcome = AuthManager::new(&ctx)
        .login(LoginOptions {
            login_key: Some("key1".into()),
            user: Some("alice".into()),
            password: Some("secret".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(outcome.account_id, "acc-key1");
    assert_eq!(outcome.location, AuthLocation::Global);
    assert!(outcome.is_default);
    assert_eq!(env.api.count("login:"), 0);
    assert_eq!(env.api.count("get_access_token:key1"), 1);
    assert!(env.prompter.prompts().is_empty());

    let stored = env.global_auth();
    assert_eq!(stored["acc-key1"]["loginKey"], json!("key1"));
    assert_eq!(stored["acc-key1"]["userName"], json!("key1"));
    assert_eq!(stored["acc-key1"]["isDefault"], json!(true));
}

#[tokio::test]
async fn test_interactive_method_choice() {
    let env = TestEnv::new(
        FakeApi::default(),
        vec![
            Answer::Select(0),
            Answer::Text("alice".into()),
            Answer::Text("secret".into()),
        ],
    );
    let ctx = env.context();

    let outcome = AuthManager::new(&ctx)
        .login(LoginOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome.account_id, "acc-alice");
    assert_eq!(env.api.calls()[0], "login:alice:secret");
    assert_eq!(env.prompter.prompts().len(), 3);
    assert_eq!(
        env.global_auth()["acc-alice"]["refreshToken"],
        json!("refresh-alice")
    );
}

#[tokio::test]
async fn test_login_key_chosen_interactively() {
    let env = TestEnv::new(
        FakeApi::default(),
        vec![Answer::Select(1), Answer::Text("key9".into())],
    );
    let ctx = env.context();

    let outcome = AuthManager::new(&ctx)
        .login(LoginOptions {
            local: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(outcome.account_id, "acc-key9");
    assert_eq!(outcome.location, AuthLocation::Local);
    assert!(env.local_path(".impt.auth").exists());
    assert!(!env.global_auth_path().exists());
}

#[tokio::test]
async fn test_otp_prompted_once_and_retried_once() {
    let api = FakeApi {
        otp_login_token: Some(Some("lt-1".into())),
        ..Default::default()
    };
    let env = TestEnv::new(api, vec![Answer::Text("123456".into())]);
    let ctx = env.context();

    let outcome = AuthManager::new(&ctx)
        .login(LoginOptions {
            user: Some("alice".into()),
            password: Some("secret".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(outcome.account_id, "acc-otp");
    assert_eq!(
        env.api.calls(),
        vec![
            "login:alice:secret".to_string(),
            "login_with_otp:123456:lt-1".to_string(),
            "get_account:me".to_string(),
        ]
    );
    assert_eq!(env.prompter.prompts(), vec!["One-time password".to_string()]);
}

#[tokio::test]
async fn test_otp_without_login_token_is_format_error() {
    let api = FakeApi {
        otp_login_token: Some(None),
        ..Default::default()
    };
    let env = TestEnv::new(api, vec![]);
    let ctx = env.context();

    let result = AuthManager::new(&ctx)
        .login(LoginOptions {
            user: Some("alice".into()),
            password: Some("secret".into()),
            ..Default::default()
        })
        .await;

    assert!(matches!(result, Err(CliError::UnexpectedResponseFormat(_))));
    assert_eq!(env.api.count("login_with_otp"), 0);
    assert!(!env.global_auth_path().exists());
}

#[tokio::test]
async fn test_existing_file_cancel() {
    let env = TestEnv::new(FakeApi::default(), vec![Answer::Select(0)]);
    env.write_global_auth(json!({
        "acc-a": { "accessToken": "t", "expiresAt": common::in_minutes(60), "isDefault": true }
    }));
    let ctx = env.context();

    let result = AuthManager::new(&ctx)
        .login(LoginOptions {
            login_key: Some("key1".into()),
            ..Default::default()
        })
        .await;

    assert!(matches!(result, Err(CliError::Cancelled)));
    assert!(env.api.calls().is_empty());
    assert!(env.global_auth().get("acc-key1").is_none());
}

#[tokio::test]
async fn test_existing_file_add_account() {
    let env = TestEnv::new(FakeApi::default(), vec![Answer::Select(1)]);
    env.write_global_auth(json!({
        "acc-a": { "accessToken": "t", "expiresAt": common::in_minutes(60), "isDefault": true }
    }));
    let ctx = env.context();

    let outcome = AuthManager::new(&ctx)
        .login(LoginOptions {
            login_key: Some("key1".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(!outcome.is_default);
    let stored = env.global_auth();
    assert_eq!(stored["acc-a"]["isDefault"], json!(true));
    assert!(stored["acc-key1"].get("isDefault").is_none());
}

#[tokio::test]
async fn test_existing_file_add_account_as_default() {
    let env = TestEnv::new(FakeApi::default(), vec![Answer::Select(2)]);
    env.write_global_auth(json!({
        "acc-a": { "accessToken": "t", "expiresAt": common::in_minutes(60), "isDefault": true }
    }));
    let ctx = env.context();

    AuthManager::new(&ctx)
        .login(LoginOptions {
            login_key: Some("key1".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let stored = env.global_auth();
    assert!(stored["acc-a"].get("isDefault").is_none());
    assert_eq!(stored["acc-key1"]["isDefault"], json!(true));
}

#[tokio::test]
async fn test_confirmed_skips_question() {
    let env = TestEnv::new(FakeApi::default(), vec![]);
    env.write_global_auth(json!({
        "acc-a": { "accessToken": "t", "expiresAt": common::in_minutes(60), "isDefault": true }
    }));
    let ctx = env.context();

    AuthManager::new(&ctx)
        .login(LoginOptions {
            login_key: Some("key1".into()),
            confirmed: true,
            make_default: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(env.prompter.prompts().is_empty());
    assert_eq!(env.global_auth()["acc-key1"]["isDefault"], json!(true));
}

#[tokio::test]
async fn test_temp_login_does_not_store_long_lived_credentials() {
    let env = TestEnv::new(FakeApi::default(), vec![]);
    let ctx = env.context();

    AuthManager::new(&ctx)
        .login(LoginOptions {
            user: Some("alice".into()),
            password: Some("secret".into()),
            temp: true,
            ..Default::default()
        })
        .await
        .unwrap();

    let record = &env.global_auth()["acc-alice"];
    assert_eq!(record["accessToken"], json!("tok-alice"));
    assert!(record.get("refreshToken").is_none());
    assert!(record.get("loginKey").is_none());
}

#[tokio::test]
async fn test_login_records_custom_endpoint() {
    let env = TestEnv::new(FakeApi::default(), vec![]);
    let ctx = env.context();

    AuthManager::new(&ctx)
        .login(LoginOptions {
            login_key: Some("key1".into()),
            endpoint: Some("https://private.example/v5".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(
        env.connector.endpoints.lock().unwrap().as_slice(),
        ["https://private.example/v5".to_string()]
    );
    assert_eq!(
        env.global_auth()["acc-key1"]["endpoint"],
        json!("https://private.example/v5")
    );
}
