use chrono::Duration;
use serde_json::json;

use cabinet_server::principal::{Principal, PrincipalKind};
use cabinet_server::utils::jwt;

use crate::common::{ADMIN_PASSWORD, ADMIN_USERNAME, JWT_SECRET, TestApp, routes};

mod admin_login {
    use super::*;

    #[tokio::test]
    async fn seeded_admin_can_log_in() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::ADMIN_LOGIN,
                &json!({"username": ADMIN_USERNAME, "password": ADMIN_PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["token"].is_string());
        assert!(res.body["admin"]["id"].is_number());
        assert_eq!(res.body["admin"]["username"], ADMIN_USERNAME);

        let claims = jwt::verify(&res.token(), JWT_SECRET).unwrap();
        assert!(claims.kind.is_none(), "admin tokens carry no type claim");
        assert!(claims.exp - claims.iat <= 12 * 3600);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::ADMIN_LOGIN,
                &json!({"username": ADMIN_USERNAME, "password": "nope"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_admin_is_rejected_with_the_same_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::ADMIN_LOGIN,
                &json!({"username": "ghost", "password": ADMIN_PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn missing_fields_are_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::ADMIN_LOGIN, &json!({"username": ADMIN_USERNAME}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn user_credentials_do_not_grant_admin_login() {
        let app = TestApp::spawn().await;
        app.register_user("carol", "secret1").await;

        let res = app
            .post_without_token(
                routes::ADMIN_LOGIN,
                &json!({"username": "carol", "password": "secret1"}),
            )
            .await;

        assert_eq!(res.status, 401);
    }
}

mod registration {
    use super::*;

    #[tokio::test]
    async fn new_user_starts_pending() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "alice", "email": "alice@example.com", "password": "secret1"}),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["message"].is_string());
        assert_eq!(res.body["user"]["username"], "alice");
        assert_eq!(res.body["user"]["email"], "alice@example.com");
        assert_eq!(res.body["user"]["status"], "pending");
        assert!(res.body["user"]["password"].is_null());
        assert!(res.body["user"]["id"].as_str().unwrap().parse::<uuid::Uuid>().is_ok());
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let app = TestApp::spawn().await;
        app.register_user("alice", "secret1").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "alice", "email": "other@example.com", "password": "secret1"}),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "DUPLICATE_USERNAME");
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let app = TestApp::spawn().await;
        app.register_user("alice", "secret1").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "alice2", "email": "alice@example.com", "password": "secret1"}),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "DUPLICATE_EMAIL");
    }

    #[tokio::test]
    async fn invalid_input_is_rejected() {
        let app = TestApp::spawn().await;

        for body in [
            json!({"username": "al", "email": "al@example.com", "password": "secret1"}),
            json!({"username": "alice", "email": "not-an-email", "password": "secret1"}),
            json!({"username": "alice", "email": "alice@example.com", "password": "12345"}),
            json!({"username": "alice"}),
        ] {
            let res = app.post_without_token(routes::REGISTER, &body).await;
            assert_eq!(res.status, 400, "{body} should be rejected");
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
    }
}

mod user_login {
    use super::*;

    #[tokio::test]
    async fn pending_user_can_log_in() {
        let app = TestApp::spawn().await;
        app.register_user("dave", "secret1").await;

        let res = app.user_login("dave", "secret1").await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["user"]["status"], "pending");
        let claims = jwt::verify(&res.token(), JWT_SECRET).unwrap();
        assert_eq!(claims.kind, Some(PrincipalKind::User));
        assert_eq!(claims.username, "dave");
    }

    #[tokio::test]
    async fn approved_user_can_log_in() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let id = app.register_user("erin", "secret1").await;
        let res = app
            .post_with_token(&routes::approve_user(&id), &json!({}), &admin)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app.user_login("erin", "secret1").await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["user"]["status"], "approved");
    }

    #[tokio::test]
    async fn rejected_user_is_refused_regardless_of_password() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let id = app.register_user("frank", "secret1").await;
        app.post_with_token(&routes::reject_user(&id), &json!({}), &admin)
            .await;

        for password in ["secret1", "wrong-password"] {
            let res = app.user_login("frank", password).await;
            assert_eq!(res.status, 403);
            assert_eq!(res.body["code"], "ACCOUNT_REJECTED");
        }
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let app = TestApp::spawn().await;
        app.register_user("gina", "secret1").await;

        let res = app.user_login("gina", "secret2").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }
}

mod tokens {
    use super::*;

    #[tokio::test]
    async fn missing_token_is_reported() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::USERS).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn malformed_token_is_invalid() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::USERS, "garbage").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_invalid() {
        let app = TestApp::spawn().await;
        let principal = Principal {
            id: "1".into(),
            username: ADMIN_USERNAME.into(),
            kind: PrincipalKind::Admin,
        };
        let token = jwt::sign(&principal, jwt::ADMIN_TOKEN_TTL, "someone-else").unwrap();

        let res = app.get_with_token(routes::USERS, &token).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn expired_token_is_reported() {
        let app = TestApp::spawn().await;
        let principal = Principal {
            id: "1".into(),
            username: ADMIN_USERNAME.into(),
            kind: PrincipalKind::Admin,
        };
        let token = jwt::sign(&principal, Duration::hours(-1), JWT_SECRET).unwrap();

        let res = app.get_with_token(routes::USERS, &token).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_EXPIRED");
    }
}
