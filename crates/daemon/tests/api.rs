mod common;

use axum::http::{header, StatusCode};

use ::common::crypto::{RecipientPrivateKey, VerifyingKey};
use ::common::package::{open_bytes, DetachedSignature};
use ::common::testkit;
use ::common::transport::SENDER_KEY_FILE_NAME;
use medseal_daemon::outbox::MESSAGE_FILE_NAME;

use common::{body_bytes, body_json, record_fields, TestDaemon, MAX_UPLOAD_BYTES};

const REPORT: &[u8] = b"%PDF-1.4 lipid panel, fasting, all values in range";

async fn upload_report(daemon: &TestDaemon, patient_uid: &str) -> serde_json::Value {
    let response = daemon
        .upload(&record_fields(patient_uid), Some(("lipids 2025.pdf", REPORT)))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_status_endpoints() {
    let daemon = TestDaemon::start(false).await;

    assert_eq!(daemon.get("/_status/livez").await.status(), StatusCode::OK);

    let ready = daemon.get("/_status/readyz").await;
    assert_eq!(ready.status(), StatusCode::OK);
    assert_eq!(body_json(ready).await["status"], "ok");

    let version = daemon.get("/_status/version").await;
    assert_eq!(version.status(), StatusCode::OK);
    assert_eq!(
        body_json(version).await["version"],
        env!("CARGO_PKG_VERSION")
    );
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let daemon = TestDaemon::start(false).await;

    let response = daemon.get("/api/v0/nothing-here").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not found");
}

#[tokio::test]
async fn test_publish_and_download_key() {
    let daemon = TestDaemon::start(false).await;

    let response = daemon
        .publish("alice", "Alice@Example.com", "RSA", testkit::ALICE_RSA_PUBLIC)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let key = body_json(response).await;
    assert_eq!(key["uid"], "alice");
    assert_eq!(key["email"], "alice@example.com");
    assert_eq!(key["key_type"], "RSA");

    let id = key["id"].as_str().unwrap();
    let pem = daemon.get(&format!("/api/v0/keys/{}/pem", id)).await;
    assert_eq!(pem.status(), StatusCode::OK);
    assert_eq!(
        pem.headers()[header::CONTENT_TYPE],
        "application/x-pem-file"
    );
    assert_eq!(
        pem.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"alice_RSA_public.pem\""
    );
    let body = String::from_utf8(body_bytes(pem).await).unwrap();
    assert_eq!(body, key["public_key_pem"].as_str().unwrap());

    let missing = daemon
        .get(&format!("/api/v0/keys/{}/pem", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(missing).await["error"], "Key not found");
}

#[tokio::test]
async fn test_publish_rejects_bad_requests() {
    let daemon = TestDaemon::start(false).await;

    let not_a_key = daemon
        .publish("alice", "alice@example.com", "RSA", "hello")
        .await;
    assert_eq!(not_a_key.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(not_a_key).await["error"].is_string());

    let oversized = format!(
        "-----BEGIN PUBLIC KEY-----\n{}\n-----END PUBLIC KEY-----",
        "A".repeat(30_000)
    );
    let too_large = daemon
        .publish("alice", "alice@example.com", "RSA", &oversized)
        .await;
    assert_eq!(too_large.status(), StatusCode::BAD_REQUEST);

    let missing = daemon
        .post_json(
            "/api/v0/keys",
            serde_json::json!({"uid": "alice", "public_key_pem": testkit::ALICE_RSA_PUBLIC}),
        )
        .await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(missing).await["error"],
        "uid, email, role, key_type are required"
    );
}

#[tokio::test]
async fn test_publish_conflict_on_taken_email() {
    let daemon = TestDaemon::start(false).await;

    let first = daemon
        .publish("alice", "alice@example.com", "RSA", testkit::ALICE_RSA_PUBLIC)
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = daemon
        .publish("mallory", "ALICE@example.com", "RSA", testkit::BOB_RSA_PUBLIC)
        .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_publish_never_replaces_a_uid() {
    let daemon = TestDaemon::start(false).await;

    let first = daemon
        .publish("p-0042", "alice@example.com", "RSA", testkit::ALICE_RSA_PUBLIC)
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let takeover = daemon
        .publish("p-0042", "mallory@evil.example", "RSA", testkit::BOB_RSA_PUBLIC)
        .await;
    assert_eq!(takeover.status(), StatusCode::CONFLICT);

    let listed = daemon
        .post_json("/api/v0/keys/list", serde_json::json!({"uid": "p-0042"}))
        .await;
    let keys = body_json(listed).await["keys"].as_array().unwrap().clone();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0]["email"], "alice@example.com");
    assert_eq!(
        keys[0]["public_key_pem"],
        testkit::ALICE_RSA_PUBLIC.trim()
    );
}

#[tokio::test]
async fn test_list_keys() {
    let daemon = TestDaemon::start(false).await;

    let empty_query = daemon
        .post_json("/api/v0/keys/list", serde_json::json!({}))
        .await;
    assert_eq!(empty_query.status(), StatusCode::BAD_REQUEST);

    daemon
        .publish("alice", "alice@example.com", "RSA", testkit::ALICE_RSA_PUBLIC)
        .await;
    daemon
        .publish("bob", "bob@example.com", "RSA", testkit::BOB_RSA_PUBLIC)
        .await;

    let by_uid = daemon
        .post_json("/api/v0/keys/list", serde_json::json!({"uid": "alice"}))
        .await;
    assert_eq!(by_uid.status(), StatusCode::OK);
    let keys = body_json(by_uid).await["keys"].as_array().unwrap().clone();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0]["email"], "alice@example.com");

    let by_email = daemon
        .post_json(
            "/api/v0/keys/list",
            serde_json::json!({"email": " BOB@example.com "}),
        )
        .await;
    let keys = body_json(by_email).await["keys"].as_array().unwrap().clone();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0]["uid"], "bob");
}

#[tokio::test]
async fn test_upload_and_fetch_record() {
    let daemon = TestDaemon::start(false).await;

    let uploaded = upload_report(&daemon, "alice").await;
    assert!(uploaded.get("auto_send").is_none());
    let record = &uploaded["record"];
    assert_eq!(record["patient_uid"], "alice");
    assert_eq!(record["uploader_email"], "dr.who@clinic.org");
    assert_eq!(record["original_file_name"], "lipids 2025.pdf");
    assert_eq!(record["size_bytes"], REPORT.len());
    assert_eq!(record["is_encrypted"], false);
    assert!(record["stored_file_name"]
        .as_str()
        .unwrap()
        .ends_with("_lipids_2025.pdf"));

    let id = record["id"].as_str().unwrap();

    let fetched = daemon.get(&format!("/api/v0/records/{}", id)).await;
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(body_json(fetched).await["id"], record["id"]);

    let listed = daemon
        .post_json(
            "/api/v0/records/list",
            serde_json::json!({"patient_uid": "alice"}),
        )
        .await;
    let records = body_json(listed).await["records"].as_array().unwrap().clone();
    assert_eq!(records.len(), 1);

    let download = daemon
        .get(&format!("/api/v0/records/{}/download", id))
        .await;
    assert_eq!(download.status(), StatusCode::OK);
    assert_eq!(
        download.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"lipids 2025.pdf\""
    );
    assert_eq!(body_bytes(download).await, REPORT);
}

#[tokio::test]
async fn test_record_not_found() {
    let daemon = TestDaemon::start(false).await;
    let id = uuid::Uuid::new_v4();

    let response = daemon.get(&format!("/api/v0/records/{}", id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = daemon
        .get(&format!("/api/v0/records/{}/download", id))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_with_file_removed() {
    let daemon = TestDaemon::start(false).await;

    let uploaded = upload_report(&daemon, "alice").await;
    let stored = uploaded["record"]["stored_file_name"].as_str().unwrap();
    std::fs::remove_file(daemon.config.uploads_dir.join(stored)).unwrap();

    let id = uploaded["record"]["id"].as_str().unwrap();
    let response = daemon
        .get(&format!("/api/v0/records/{}/download", id))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["error"],
        "Uploaded file missing on server"
    );
}

#[tokio::test]
async fn test_upload_requires_fields_and_file() {
    let daemon = TestDaemon::start(false).await;

    let no_file = daemon.upload(&record_fields("alice"), None).await;
    assert_eq!(no_file.status(), StatusCode::BAD_REQUEST);

    let no_patient = daemon
        .upload(
            &[("uploader_email", "a@b.c"), ("record_type", "LAB")],
            Some(("x.pdf", REPORT)),
        )
        .await;
    assert_eq!(no_patient.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_over_limit() {
    let daemon = TestDaemon::start(false).await;

    let oversized = vec![0u8; MAX_UPLOAD_BYTES + 1];
    let response = daemon
        .upload(&record_fields("alice"), Some(("big.bin", &oversized)))
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(daemon
        .config
        .uploads_dir
        .read_dir()
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(true));
}

#[tokio::test]
async fn test_share_delivers_openable_package() {
    let daemon = TestDaemon::start(false).await;
    daemon
        .publish("alice", "alice@example.com", "RSA", testkit::ALICE_RSA_PUBLIC)
        .await;
    let uploaded = upload_report(&daemon, "alice").await;
    let id = uploaded["record"]["id"].as_str().unwrap().to_string();

    let response = daemon
        .post_json(
            "/api/v0/share",
            serde_json::json!({
                "record_id": id,
                "recipient": "ALICE@example.com",
                "recipient_email": "alice@example.com",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let shared = body_json(response).await;
    let delivery_id = shared["delivery_id"].as_str().unwrap();
    let signature_b64 = shared["signature_b64"].as_str().unwrap();

    let dir = daemon.config.outbox_dir.join(delivery_id);
    let stem = format!("record_{}", id);
    let package = std::fs::read(dir.join(format!("{}.package.json", stem))).unwrap();
    let written_signature =
        std::fs::read_to_string(dir.join(format!("{}.signature.b64.txt", stem))).unwrap();
    assert_eq!(written_signature, signature_b64);

    let sender_pem = std::fs::read_to_string(dir.join(SENDER_KEY_FILE_NAME)).unwrap();
    let sender = VerifyingKey::from_pem(&sender_pem).unwrap();
    assert_eq!(
        sender,
        VerifyingKey::from_pem(testkit::CLINIC_ED25519_PUBLIC).unwrap()
    );

    let plaintext = open_bytes(
        &package,
        &DetachedSignature::from_base64(signature_b64).unwrap(),
        &sender,
        &RecipientPrivateKey::from_pem(testkit::ALICE_RSA_PRIVATE).unwrap(),
    )
    .unwrap();
    assert_eq!(plaintext.as_slice(), REPORT);

    let message = std::fs::read_to_string(dir.join(MESSAGE_FILE_NAME)).unwrap();
    assert!(message.contains("To: alice@example.com\n"));
    assert!(message.contains("Subject: MedSeal: encrypted record (LAB) for patient alice\n"));

    let record = body_json(daemon.get(&format!("/api/v0/records/{}", id)).await).await;
    assert_eq!(record["is_encrypted"], true);
    assert_eq!(record["signature_b64"], signature_b64);
}

#[tokio::test]
async fn test_share_failures() {
    let daemon = TestDaemon::start(false).await;
    let uploaded = upload_report(&daemon, "alice").await;
    let id = uploaded["record"]["id"].as_str().unwrap();

    let unknown_recipient = daemon
        .post_json(
            "/api/v0/share",
            serde_json::json!({
                "record_id": id,
                "recipient": "nobody",
                "recipient_email": "nobody@example.com",
            }),
        )
        .await;
    assert_eq!(unknown_recipient.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(unknown_recipient).await["error"],
        "Recipient RSA public key not found"
    );

    daemon
        .publish("alice", "alice@example.com", "RSA", testkit::ALICE_RSA_PUBLIC)
        .await;
    let unknown_record = daemon
        .post_json(
            "/api/v0/share",
            serde_json::json!({
                "record_id": uuid::Uuid::new_v4(),
                "recipient": "alice",
                "recipient_email": "alice@example.com",
            }),
        )
        .await;
    assert_eq!(unknown_record.status(), StatusCode::NOT_FOUND);

    let missing_email = daemon
        .post_json(
            "/api/v0/share",
            serde_json::json!({"record_id": id, "recipient": "alice"}),
        )
        .await;
    assert_eq!(missing_email.status(), StatusCode::BAD_REQUEST);

    assert!(daemon.outbox_entries().is_empty());
    let record = body_json(daemon.get(&format!("/api/v0/records/{}", id)).await).await;
    assert_eq!(record["is_encrypted"], false);
}

#[tokio::test]
async fn test_auto_send_on_upload() {
    let daemon = TestDaemon::start(true).await;
    daemon
        .publish("alice", "alice@example.com", "RSA", testkit::ALICE_RSA_PUBLIC)
        .await;

    let sent = upload_report(&daemon, "alice").await;
    assert_eq!(sent["auto_send"]["sent"], true);
    assert!(sent["auto_send"]["delivery_id"].is_string());
    assert_eq!(sent["record"]["is_encrypted"], true);
    assert_eq!(daemon.outbox_entries().len(), 1);

    // No key for this patient: the upload still succeeds
    let skipped = upload_report(&daemon, "carol").await;
    assert_eq!(skipped["auto_send"]["sent"], false);
    assert_eq!(
        skipped["auto_send"]["reason"],
        "patient RSA public key not found"
    );
    assert_eq!(skipped["record"]["is_encrypted"], false);
    assert_eq!(daemon.outbox_entries().len(), 1);
}

#[tokio::test]
async fn test_share_to_unusable_key_is_rejected() {
    let daemon = TestDaemon::start(false).await;

    // Passes the textual gate, but is Ed25519 material under an RSA label
    let published = daemon
        .publish("alice", "alice@example.com", "RSA", testkit::CLINIC_ED25519_PUBLIC)
        .await;
    assert_eq!(published.status(), StatusCode::CREATED);

    let uploaded = upload_report(&daemon, "alice").await;
    let response = daemon
        .post_json(
            "/api/v0/share",
            serde_json::json!({
                "record_id": uploaded["record"]["id"],
                "recipient": "alice",
                "recipient_email": "alice@example.com",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(daemon.outbox_entries().is_empty());
}

#[tokio::test]
async fn test_share_succeeds_when_marking_fails() {
    let daemon = TestDaemon::start(false).await;
    daemon
        .publish("alice", "alice@example.com", "RSA", testkit::ALICE_RSA_PUBLIC)
        .await;
    let uploaded = upload_report(&daemon, "alice").await;

    sqlx::query(
        "CREATE TRIGGER records_read_only BEFORE UPDATE ON records \
         BEGIN SELECT RAISE(ABORT, 'records are read-only'); END",
    )
    .execute(&**daemon.state.database())
    .await
    .unwrap();

    let response = daemon
        .post_json(
            "/api/v0/share",
            serde_json::json!({
                "record_id": uploaded["record"]["id"],
                "recipient": "alice",
                "recipient_email": "alice@example.com",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let shared = body_json(response).await;
    assert!(shared["delivery_id"].is_string());
    assert_eq!(daemon.outbox_entries().len(), 1);

    let id = uploaded["record"]["id"].as_str().unwrap();
    let record = body_json(daemon.get(&format!("/api/v0/records/{}", id)).await).await;
    assert_eq!(record["is_encrypted"], false);
}
