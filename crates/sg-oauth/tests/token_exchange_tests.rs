//! Tests for the token exchange call against a mocked provider endpoint

use serde_json::json;
use sg_oauth::TokenExchanger;
use sg_secrets::{KeychainStorage, MockKeychain, Token};
use sg_types::AuthError;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> (Token, Token) {
    let keychain = Arc::new(MockKeychain::new());
    keychain.store("fb_app_id", "tester", "12345").unwrap();
    keychain
        .store("fb_app_secret", "tester", "s3cr3t")
        .unwrap();

    (
        Token::new(keychain.clone(), "fb_app_id", "tester"),
        Token::new(keychain, "fb_app_secret", "tester"),
    )
}

#[tokio::test]
async fn test_exchange_returns_token_response_mapping() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v12.0/oauth/access_token"))
        .and(query_param("client_id", "12345"))
        .and(query_param("client_secret", "s3cr3t"))
        .and(query_param("code", "spam"))
        .and(query_param(
            "redirect_uri",
            "http://127.0.0.1:5002/facebook_login",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "EAAtoken",
            "token_type": "bearer",
            "expires_in": 5183944
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (app_id, app_secret) = credentials();
    let exchanger = TokenExchanger::new();

    let mapping = exchanger
        .get_access_token(
            &format!("{}/v12.0/oauth/access_token", server.uri()),
            &app_id,
            "http://127.0.0.1:5002/facebook_login",
            &app_secret,
            "spam",
        )
        .await
        .unwrap();

    // The response mapping is passed through unmodified.
    assert_eq!(mapping["access_token"], "EAAtoken");
    assert_eq!(mapping["token_type"], "bearer");
    assert_eq!(mapping["expires_in"], 5183944);
    assert_eq!(mapping.len(), 3);
}

#[tokio::test]
async fn test_exchange_propagates_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v12.0/oauth/access_token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "Invalid verification code format." }
            })),
        )
        .mount(&server)
        .await;

    let (app_id, app_secret) = credentials();
    let exchanger = TokenExchanger::new();

    let err = exchanger
        .get_access_token(
            &format!("{}/v12.0/oauth/access_token", server.uri()),
            &app_id,
            "http://127.0.0.1:5002/facebook_login",
            &app_secret,
            "bad-code",
        )
        .await
        .unwrap_err();

    match err {
        AuthError::OAuthBrowser(message) => {
            assert!(message.contains("400"));
            assert!(message.contains("Invalid verification code"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_exchange_rejects_malformed_json_as_serialization_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v12.0/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let (app_id, app_secret) = credentials();
    let exchanger = TokenExchanger::new();

    let err = exchanger
        .get_access_token(
            &format!("{}/v12.0/oauth/access_token", server.uri()),
            &app_id,
            "http://127.0.0.1:5002/facebook_login",
            &app_secret,
            "spam",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Serialization(_)));
}

#[tokio::test]
async fn test_exchange_requires_provisioned_credentials() {
    let keychain = Arc::new(MockKeychain::new());
    let app_id = Token::new(keychain.clone(), "fb_app_id", "tester");
    let app_secret = Token::new(keychain, "fb_app_secret", "tester");

    let exchanger = TokenExchanger::new();
    let err = exchanger
        .get_access_token(
            "http://127.0.0.1:1/unused",
            &app_id,
            "http://127.0.0.1:5002/facebook_login",
            &app_secret,
            "spam",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::SecretDoesNotExist { .. }));
}
