// tests/credentials_test.rs
//
// These tests mutate process environment variables and run serially.
use std::env;
use std::fs;

use git_promote::config::{CredentialSource, CredentialsConfig};
use git_promote::credentials::{
    CredentialChain, CredentialProvider, EnvTokenProvider, TokenFileProvider, DEFAULT_TOKEN_FILE,
    SECRET_NAME_ENV, TOKEN_ENV, TOKEN_PATH_ENV,
};
use git_promote::PromoteError;
use secrecy::ExposeSecret;
use serial_test::serial;
use tempfile::TempDir;

fn clear_env() {
    env::remove_var(TOKEN_ENV);
    env::remove_var(TOKEN_PATH_ENV);
    env::remove_var(SECRET_NAME_ENV);
}

#[test]
#[serial]
fn test_env_token_wins_over_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let token_file = dir.path().join("token");
    fs::write(&token_file, "ghp_from_file\n").unwrap();
    env::set_var(TOKEN_ENV, "ghp_from_env");
    env::set_var(TOKEN_PATH_ENV, &token_file);

    let token = CredentialChain::from_config(&CredentialsConfig::default(), dir.path())
        .resolve()
        .unwrap();

    assert_eq!(token.expose_secret(), "ghp_from_env");
    clear_env();
}

#[test]
#[serial]
fn test_file_token_when_env_empty() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let token_file = dir.path().join("token");
    fs::write(&token_file, "  ghp_from_file\n").unwrap();
    env::set_var(TOKEN_ENV, "");
    env::set_var(TOKEN_PATH_ENV, &token_file);

    let token = CredentialChain::from_config(&CredentialsConfig::default(), dir.path())
        .resolve()
        .unwrap();

    assert_eq!(token.expose_secret(), "ghp_from_file");
    clear_env();
}

#[test]
#[serial]
fn test_configured_source_is_exclusive() {
    clear_env();
    env::set_var(TOKEN_ENV, "ghp_from_env");
    let dir = TempDir::new().unwrap();
    let config = CredentialsConfig {
        source: Some(CredentialSource::File),
        token_path: Some(dir.path().join("absent")),
        secret_name: None,
    };

    let err = CredentialChain::from_config(&config, dir.path()).resolve().unwrap_err();

    assert!(matches!(err, PromoteError::Credentials(_)));
    clear_env();
}

#[test]
#[serial]
fn test_no_token_anywhere() {
    clear_env();
    let dir = TempDir::new().unwrap();
    env::set_var(TOKEN_PATH_ENV, dir.path().join("absent"));

    let err = CredentialChain::from_config(&CredentialsConfig::default(), dir.path())
        .resolve()
        .unwrap_err();

    assert!(err.to_string().contains(TOKEN_ENV));
    clear_env();
}

#[test]
#[serial]
fn test_relative_token_path_resolves_in_checkout() {
    clear_env();
    let checkout = TempDir::new().unwrap();
    fs::create_dir(checkout.path().join("secrets")).unwrap();
    fs::write(checkout.path().join("secrets/gh"), "ghp_in_checkout\n").unwrap();
    env::set_var(TOKEN_PATH_ENV, "secrets/gh");

    let token = CredentialChain::from_config(&CredentialsConfig::default(), checkout.path())
        .resolve()
        .unwrap();

    assert_eq!(token.expose_secret(), "ghp_in_checkout");
    clear_env();
}

#[test]
#[serial]
fn test_default_token_file_in_checkout() {
    clear_env();
    let checkout = TempDir::new().unwrap();
    fs::write(checkout.path().join(DEFAULT_TOKEN_FILE), "ghp_default\n").unwrap();

    let token = CredentialChain::from_config(&CredentialsConfig::default(), checkout.path())
        .resolve()
        .unwrap();

    assert_eq!(token.expose_secret(), "ghp_default");
}

#[test]
#[serial]
fn test_custom_env_provider() {
    env::set_var("PROMOTE_TEST_TOKEN", "ghp_custom");
    let provider = EnvTokenProvider::new("PROMOTE_TEST_TOKEN");

    let token = provider.token().unwrap().unwrap();
    assert_eq!(token.expose_secret(), "ghp_custom");
    env::remove_var("PROMOTE_TEST_TOKEN");
}

#[test]
fn test_missing_token_file_offers_nothing() {
    let dir = TempDir::new().unwrap();
    let provider = TokenFileProvider::new(dir.path().join("absent"));
    assert!(provider.token().unwrap().is_none());
}
