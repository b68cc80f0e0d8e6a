//! Tests for blob SAS signing.

use std::collections::HashMap;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{TimeDelta, TimeZone};
use hmac::Mac;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::{BlobName, SasPolicy};

const ACCOUNT_KEY_BYTES: &[u8] = b"trailshare-unit-test-account-key";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid instant")
}

fn config(endpoint: Option<&str>) -> BlobStorageConfig {
    BlobStorageConfig {
        account_name: "trailacct".to_owned(),
        account_key: Zeroizing::new(STANDARD.encode(ACCOUNT_KEY_BYTES)),
        container: DEFAULT_CONTAINER.to_owned(),
        endpoint: endpoint.map(|raw| Url::parse(raw).expect("valid endpoint")),
    }
}

#[fixture]
fn signer() -> AzureBlobSasSigner {
    AzureBlobSasSigner::new(config(None)).expect("valid signer")
}

fn query_map(url: &Url) -> HashMap<String, String> {
    url.query_pairs().into_owned().collect()
}

fn expected_signature(string_to_sign: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(ACCOUNT_KEY_BYTES).expect("hmac key");
    mac.update(string_to_sign.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

#[rstest]
fn upload_url_carries_write_scope_and_verifiable_signature(signer: AzureBlobSasSigner) {
    let request = SasPolicy::default().upload_request(
        BlobName::existing("1714564800000_ridge.jpg"),
        Some("image/jpeg".to_owned()),
        now(),
    );

    let signed = signer.sign(&request).expect("signed url");
    let query = query_map(&signed.url);

    assert_eq!(
        signed.blob_url.as_str(),
        "https://trailacct.blob.core.windows.net/media/1714564800000_ridge.jpg"
    );
    assert!(signed.url.as_str().starts_with(signed.blob_url.as_str()));
    assert_eq!(query.get("sp").map(String::as_str), Some("cw"));
    assert_eq!(query.get("st").map(String::as_str), Some("2024-05-01T11:59:00Z"));
    assert_eq!(query.get("se").map(String::as_str), Some("2024-05-01T12:10:00Z"));
    assert_eq!(query.get("sr").map(String::as_str), Some("b"));
    assert_eq!(query.get("spr").map(String::as_str), Some("https"));
    assert_eq!(query.get("sv").map(String::as_str), Some(SAS_VERSION));
    assert_eq!(query.get("rsct").map(String::as_str), Some("image/jpeg"));
    assert_eq!(signed.expires_at, now() + TimeDelta::minutes(10));

    let string_to_sign = [
        "cw",
        "2024-05-01T11:59:00Z",
        "2024-05-01T12:10:00Z",
        "/blob/trailacct/media/1714564800000_ridge.jpg",
        "",
        "",
        "https",
        "2022-11-02",
        "b",
        "",
        "",
        "",
        "",
        "",
        "",
        "image/jpeg",
    ]
    .join("\n");
    assert_eq!(
        query.get("sig").map(String::as_str),
        Some(expected_signature(&string_to_sign).as_str())
    );
}

#[rstest]
fn read_url_is_read_only_without_content_type(signer: AzureBlobSasSigner) {
    let request = SasPolicy::default().read_request(BlobName::existing("a.jpg"), now());

    let signed = signer.sign(&request).expect("signed url");
    let query = query_map(&signed.url);

    assert_eq!(query.get("sp").map(String::as_str), Some("r"));
    assert_eq!(query.get("se").map(String::as_str), Some("2024-05-01T12:15:00Z"));
    assert!(!query.contains_key("rsct"));
}

#[rstest]
fn custom_endpoint_keeps_its_path_and_allows_http() {
    let signer = AzureBlobSasSigner::new(config(Some("http://127.0.0.1:10000/devstoreaccount1")))
        .expect("valid signer");
    let request = SasPolicy::default().read_request(BlobName::existing("a.jpg"), now());

    let signed = signer.sign(&request).expect("signed url");

    assert_eq!(
        signed.blob_url.as_str(),
        "http://127.0.0.1:10000/devstoreaccount1/media/a.jpg"
    );
    assert_eq!(
        query_map(&signed.url).get("spr").map(String::as_str),
        Some("https,http")
    );
}

#[rstest]
#[case::not_base64("not base64 !!")]
#[case::empty("")]
fn invalid_account_keys_are_rejected(#[case] key: &str) {
    let mut bad = config(None);
    bad.account_key = Zeroizing::new(key.to_owned());

    let result = AzureBlobSasSigner::new(bad);

    assert!(matches!(result, Err(BlobUrlSignerError::InvalidKey { .. })));
}

#[rstest]
fn debug_output_redacts_account_key() {
    let rendered = format!("{:?}", config(None));
    assert!(rendered.contains("<redacted>"));
    assert!(!rendered.contains(&STANDARD.encode(ACCOUNT_KEY_BYTES)));
}
