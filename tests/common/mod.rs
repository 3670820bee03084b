#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use axum_test::{TestResponse, TestServer};
use contacts_api::{
    api::AppServer,
    auth::config::{AuthConfig, PasswordConfig},
    config::{AppConfig, AvatarConfig, MailConfig, ServerConfig, StorageConfig},
    mail::MemoryMailer,
    storage::StorageBackends,
};
use serde_json::{json, Value};
use tempfile::TempDir;

pub const SECRET: &str = "kX9#mQ2$vL7@pR4!wZ8&nB5^hJ3*tY6%";
pub const PASSWORD: &str = "hunter22";
pub const BASE_URL: &str = "http://contacts.test";

pub struct TestApp {
    pub server: TestServer,
    pub mailer: Arc<MemoryMailer>,
    pub public_dir: PathBuf,
    _dir: TempDir,
}

pub fn test_config(dir: &TempDir) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_allow_origin: "*".to_string(),
        },
        auth: AuthConfig {
            jwt_secret: SECRET.to_string(),
            token_expiry: 3600,
            password: PasswordConfig {
                min_length: 6,
                bcrypt_cost: 4,
            },
        },
        storage: StorageConfig {
            database_url: "memory".to_string(),
            max_connections: 1,
        },
        mail: MailConfig {
            sendgrid_api_key: None,
            from: "no-reply@contacts.test".to_string(),
            base_url: BASE_URL.to_string(),
        },
        avatars: AvatarConfig {
            public_dir: dir.path().join("public"),
            tmp_dir: dir.path().join("tmp"),
            size: 250,
        },
    }
}

pub fn spawn_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let public_dir = config.avatars.public_dir.clone();
    let mailer = Arc::new(MemoryMailer::new());

    let app = AppServer::with_parts(config, StorageBackends::memory(), mailer.clone()).unwrap();
    let server = TestServer::new(app.create_router()).unwrap();

    TestApp {
        server,
        mailer,
        public_dir,
        _dir: dir,
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

impl TestApp {
    pub async fn register(&self, email: &str) -> TestResponse {
        self.server
            .post("/users/register")
            .json(&json!({ "email": email, "password": PASSWORD }))
            .await
    }

    /// Verification token from the most recent letter sent to `email`
    pub fn verify_token_for(&self, email: &str) -> String {
        let letter = self.mailer.last_to(email).expect("no letter sent");
        let start = letter.html.find("/users/verify/").expect("no verify link") + "/users/verify/".len();
        let rest = &letter.html[start..];
        let end = rest.find('"').expect("unterminated link");
        rest[..end].to_string()
    }

    pub async fn login(&self, email: &str) -> TestResponse {
        self.server
            .post("/users/login")
            .json(&json!({ "email": email, "password": PASSWORD }))
            .await
    }

    /// Register, verify and log in, returning the session token
    pub async fn signed_in(&self, email: &str) -> String {
        self.register(email).await.assert_status(axum::http::StatusCode::CREATED);

        let token = self.verify_token_for(email);
        self.server
            .get(&format!("/users/verify/{token}"))
            .await
            .assert_status_ok();

        let body: Value = self.login(email).await.json();
        body["token"].as_str().unwrap().to_string()
    }
}
