//! Login, refresh and logout through the running gateway.

use bank_gateway::directory::Identity;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::Response;
use serde_json::json;

mod common;

fn set_cookies(res: &Response) -> Vec<String> {
    res.headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

fn cookie_value<'a>(cookies: &'a [String], name: &str) -> &'a str {
    let prefix = format!("{}=", name);
    let cookie = cookies
        .iter()
        .find(|c| c.starts_with(&prefix))
        .unwrap_or_else(|| panic!("no {} cookie in {:?}", name, cookies));
    cookie[prefix.len()..].split(';').next().unwrap()
}

#[tokio::test]
async fn test_login_sets_session_cookies() {
    let config = common::test_config();
    let cipher = common::cipher(&config);
    let tokens = common::token_manager(&config);
    let gateway = common::spawn_gateway(config).await;

    let res = common::client()
        .post(gateway.url("/api/auth/login"))
        .json(&json!({ "subject": "alice", "password": common::PASSWORD }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let cookies = set_cookies(&res);
    assert_eq!(cookies.len(), 2);
    for cookie in &cookies {
        assert!(cookie.contains("HttpOnly"), "{}", cookie);
        assert!(cookie.contains("Secure"), "{}", cookie);
        assert!(cookie.contains("Path=/"), "{}", cookie);
        assert!(cookie.contains("SameSite=Lax"), "{}", cookie);
    }
    assert!(cookie_value(&cookies, "ACCESS_TOKEN").len() > 20);
    let access = cookie_value(&cookies, "ACCESS_TOKEN").to_string();
    assert!(tokens.is_valid(&access, "alice").unwrap());

    let envelope = res.text().await.unwrap();
    let identity: Identity = serde_json::from_str(&cipher.try_decrypt(&envelope).unwrap()).unwrap();
    assert_eq!(identity.subject, "alice");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    let gateway = common::spawn_gateway(common::test_config()).await;

    let res = common::client()
        .post(gateway.url("/api/auth/login"))
        .json(&json!({ "subject": "alice", "password": "guess" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 401);
    assert!(set_cookies(&res).is_empty());
}

#[tokio::test]
async fn test_access_cookie_token_opens_profile_and_refresh_rotates() {
    let gateway = common::spawn_gateway(common::test_config()).await;
    let client = common::client();

    let login = client
        .post(gateway.url("/api/auth/login"))
        .json(&json!({ "subject": "alice", "password": common::PASSWORD }))
        .send()
        .await
        .unwrap();
    let cookies = set_cookies(&login);
    let access = cookie_value(&cookies, "ACCESS_TOKEN").to_string();
    let refresh = cookie_value(&cookies, "REFRESH_TOKEN").to_string();

    let profile = client
        .get(gateway.url("/api/user/profile"))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(profile.status(), 200);

    let refreshed = client
        .post(gateway.url("/api/auth/refresh"))
        .header(COOKIE, format!("REFRESH_TOKEN={}", refresh))
        .send()
        .await
        .unwrap();
    assert_eq!(refreshed.status(), 200);
    assert_eq!(set_cookies(&refreshed).len(), 2);
}

#[tokio::test]
async fn test_refresh_without_cookie_is_unauthorized() {
    let gateway = common::spawn_gateway(common::test_config()).await;

    let res = common::client()
        .post(gateway.url("/api/auth/refresh"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 401);
}

#[tokio::test]
async fn test_logout_expires_cookies() {
    let gateway = common::spawn_gateway(common::test_config()).await;

    let res = common::client()
        .post(gateway.url("/api/auth/logout"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 204);
    let cookies = set_cookies(&res);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
    assert_eq!(cookie_value(&cookies, "ACCESS_TOKEN"), "");
}

#[tokio::test]
async fn test_send_verification_sets_readable_cookie() {
    let gateway = common::spawn_gateway(common::test_config()).await;

    let res = common::client()
        .post(gateway.url("/api/auth/login/send-verification"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 202);
    let cookies = set_cookies(&res);
    let code = cookie_value(&cookies, "VERIFICATION_CODE");
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
    assert!(!cookies[0].contains("HttpOnly"));
}
