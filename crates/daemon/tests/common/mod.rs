#![allow(dead_code)]

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use ::common::crypto::SigningKey;
use ::common::testkit;
use medseal_daemon::http_server;
use medseal_daemon::{ServiceConfig, ServiceState};

pub const MAX_UPLOAD_BYTES: usize = 256 * 1024;
const BOUNDARY: &str = "medseal-test-boundary";

/// A daemon wired to a scratch directory, driven in-process
pub struct TestDaemon {
    pub router: Router,
    pub state: ServiceState,
    pub config: ServiceConfig,
    pub dir: TempDir,
}

impl TestDaemon {
    pub async fn start(auto_send_on_upload: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig {
            api_port: 0,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            sqlite_path: Some(dir.path().join("db.sqlite")),
            uploads_dir: dir.path().join("uploads"),
            outbox_dir: dir.path().join("outbox"),
            signing_key: SigningKey::from_pem(testkit::CLINIC_ED25519_PRIVATE).unwrap(),
            mail_from: None,
            auto_send_on_upload,
            log_level: tracing::Level::INFO,
            log_dir: None,
        };

        let state = ServiceState::from_config(&config).await.unwrap();
        let http_config = http_server::Config::new(SocketAddr::from(([127, 0, 0, 1], 0)));
        let router = http_server::router(&http_config, state.clone());

        Self {
            router,
            state,
            config,
            dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method(Method::GET)
                .uri(uri)
                .header(header::ACCEPT, "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn upload(
        &self,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> Response<Body> {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v0/records")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(multipart_body(fields, file)))
                .unwrap(),
        )
        .await
    }

    pub async fn publish(&self, uid: &str, email: &str, key_type: &str, pem: &str) -> Response<Body> {
        self.post_json(
            "/api/v0/keys",
            serde_json::json!({
                "uid": uid,
                "email": email,
                "role": "PATIENT",
                "key_type": key_type,
                "public_key_pem": pem,
            }),
        )
        .await
    }

    /// Every delivery directory written to the outbox so far
    pub fn outbox_entries(&self) -> Vec<std::path::PathBuf> {
        match std::fs::read_dir(&self.config.outbox_dir) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }
}

pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/pdf\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn record_fields<'a>(patient_uid: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("patient_uid", patient_uid),
        ("uploader_email", "Dr.Who@Clinic.org"),
        ("record_type", "LAB"),
        ("note", "fasting panel"),
    ]
}
