//! Common test utilities
//!
//! Spins up the full HTTP surface against in-memory repository fakes, so the
//! integration tests exercise routing, extraction, auth, and error mapping
//! without a live database.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;

use jsonwebtoken::{encode, EncodingKey, Header};
use tokio::net::TcpListener;

use tracklog_api::{build_router, AppState, AuthConfig, AuthState, Claims};
use tracklog_db::PaginationConfig;

use fixtures::{
    FailingProbe, FakeActivityRepository, FakeLocationRepository, FakeProbe,
    FakeReferenceRepository, FakeSpatialRepository, FakeUnifiedRepository, SharedReferences,
};

/// A running test server
pub struct TestApp {
    pub address: String,
}

pub struct TestAppBuilder {
    auth: AuthConfig,
    failing_probe: bool,
}

impl TestAppBuilder {
    pub fn with_auth(mut self, secret: &str) -> Self {
        self.auth = AuthConfig {
            enabled: true,
            secret: secret.to_string(),
        };
        self
    }

    pub fn with_failing_probe(mut self) -> Self {
        self.failing_probe = true;
        self
    }

    pub async fn spawn(self) -> TestApp {
        let references = SharedReferences::seeded();

        let probe: Arc<dyn tracklog_db::ReadinessProbe> = if self.failing_probe {
            Arc::new(FailingProbe)
        } else {
            Arc::new(FakeProbe)
        };

        let state = AppState::new(
            Arc::new(FakeLocationRepository::seeded()),
            Arc::new(FakeActivityRepository::seeded()),
            Arc::new(FakeReferenceRepository::new(references.clone())),
            Arc::new(FakeSpatialRepository::new(references)),
            Arc::new(FakeUnifiedRepository::seeded()),
            probe,
            PaginationConfig::default(),
        );

        let auth = AuthState::new(&self.auth).expect("auth state");
        let app = build_router(state, auth);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let address = listener.local_addr().expect("local address");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("test server failed");
        });

        TestApp {
            address: format!("http://{address}"),
        }
    }
}

impl TestApp {
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder {
            auth: AuthConfig::default(),
            failing_probe: false,
        }
    }

    /// Spawn with auth disabled and a healthy probe
    pub async fn spawn() -> Self {
        Self::builder().spawn().await
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }

    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .expect("http client")
    }
}

/// Mint a bearer token the auth middleware will accept
pub fn bearer_token(secret: &str, subject: &str) -> String {
    let claims = Claims {
        sub: subject.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token")
}
