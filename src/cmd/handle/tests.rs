// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{delivery_from_args, handle_delivery, read_body, read_payload};
use crate::cli::handle::HandleArgs;
use crate::config::Config;
use crate::webhook::{SignatureAlgorithm, sign};
use std::path::PathBuf;

fn args(event: &str) -> HandleArgs {
    HandleArgs {
        event: Some(event.to_string()),
        delivery: Some("delivery-1".to_string()),
        signature: None,
        signature_256: None,
        payload: PathBuf::from("-"),
    }
}

fn config_with_secret(base_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.workspace.base_dir = base_dir.to_path_buf();
    config.github.webhook_secret = Some("s3cret".to_string());
    config
}

#[tokio::test]
async fn test_read_payload_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("payload.json");
    std::fs::write(&path, b"{\"zen\":\"hi\"}").unwrap();

    let body = read_payload(&path, false).await.unwrap();
    assert_eq!(body, b"{\"zen\":\"hi\"}");
}

#[tokio::test]
async fn test_read_payload_missing_file() {
    let err = read_payload(&PathBuf::from("/nonexistent/payload.json"), false)
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("failed to read payload from"));
}

#[tokio::test]
async fn test_read_body_from_stream() {
    let (mut writer, reader) = tokio::io::duplex(8);
    let payload = br#"{"ref":"refs/heads/main","zen":"streamed in chunks"}"#;

    let feeder = tokio::spawn(async move {
        tokio::io::AsyncWriteExt::write_all(&mut writer, payload)
            .await
            .unwrap();
    });
    let body = read_body(reader).await.unwrap();
    feeder.await.unwrap();

    assert_eq!(body, payload);
    assert!(read_body(&b""[..]).await.unwrap().is_empty());
}

#[test]
fn test_delivery_from_args() {
    let mut a = args("push");
    a.signature_256 = Some("sha256=00".to_string());
    let delivery = delivery_from_args(&a, b"{}".to_vec());

    assert_eq!(delivery.event.as_deref(), Some("push"));
    assert_eq!(delivery.delivery_id.as_deref(), Some("delivery-1"));
    assert_eq!(delivery.signature_256.as_deref(), Some("sha256=00"));
    assert!(delivery.signature.is_none());
    assert_eq!(delivery.body, b"{}");
}

#[tokio::test]
async fn test_handle_ping_delivery() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_secret(dir.path());
    let body = br#"{"zen":"Keep it logically awesome."}"#.to_vec();

    let mut a = args("ping");
    a.signature_256 = sign(SignatureAlgorithm::Sha256, "s3cret", &body);
    let response = handle_delivery(&config, &delivery_from_args(&a, body))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "Pong!");
}

#[tokio::test]
async fn test_handle_without_secret_is_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_with_secret(dir.path());
    config.github.webhook_secret = None;

    let response = handle_delivery(&config, &delivery_from_args(&args("ping"), Vec::new()))
        .await
        .unwrap();

    assert_eq!(response.status, 401);
    assert!(!response.is_success());
}

#[tokio::test]
async fn test_handle_invalid_body() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_secret(dir.path());
    let body = b"not json".to_vec();

    let mut a = args("push");
    a.signature = sign(SignatureAlgorithm::Sha1, "s3cret", &body);
    let response = handle_delivery(&config, &delivery_from_args(&a, body))
        .await
        .unwrap();

    assert_eq!(response.status, 400);
    assert_eq!(response.body, "Invalid body");
}
