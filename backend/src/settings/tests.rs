//! Unit tests for startup configuration parsing.

use std::collections::HashMap;
use std::ffi::OsString;

use env_lock::lock_env;
use mockable::MockEnv;
use rstest::rstest;

use super::*;

fn mock_env(vars: &[(&str, &str)]) -> MockEnv {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
        .collect();
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

fn expect_error(result: Result<AppSettings, SettingsError>) -> SettingsError {
    match result {
        Ok(settings) => panic!("expected settings to fail, got {settings:?}"),
        Err(error) => error,
    }
}

#[rstest]
fn empty_environment_disables_every_integration() {
    let settings = AppSettings::from_env(&mock_env(&[])).expect("defaults are valid");

    assert_eq!(settings.bind_addr, "0.0.0.0:8080".parse().expect("addr"));
    assert!(settings.database_url.is_none());
    assert!(settings.blob.is_none());
    assert!(settings.vision.is_none());
    assert!(settings.content_safety.is_none());
}

#[rstest]
fn complete_environment_is_accepted() {
    let env = mock_env(&[
        (BIND_ADDR_ENV, "127.0.0.1:9000"),
        (DATABASE_URL_ENV, "postgres://app@db/trailshare"),
        (BLOB_ACCOUNT_NAME_ENV, "trailshare"),
        (BLOB_ACCOUNT_KEY_ENV, "a2V5"),
        (BLOB_CONTAINER_NAME_ENV, "photos"),
        (BLOB_ENDPOINT_ENV, "http://127.0.0.1:10000/devstoreaccount1"),
        (VISION_ENDPOINT_ENV, "https://vision.example/"),
        (VISION_KEY_ENV, "vision-key"),
        (CONTENT_SAFETY_ENDPOINT_ENV, "https://safety.example"),
        (CONTENT_SAFETY_KEY_ENV, "safety-key"),
    ]);

    let settings = AppSettings::from_env(&env).expect("valid settings");

    assert_eq!(settings.bind_addr.port(), 9000);
    assert_eq!(
        settings.database_url.as_deref().map(String::as_str),
        Some("postgres://app@db/trailshare")
    );
    let blob = settings.blob.expect("blob configured");
    assert_eq!(blob.container, "photos");
    assert_eq!(
        blob.endpoint.as_ref().map(Url::as_str),
        Some("http://127.0.0.1:10000/devstoreaccount1")
    );
    let vision = settings.vision.expect("vision configured");
    assert_eq!(vision.endpoint.as_str(), "https://vision.example/");
    assert_eq!(vision.key.as_str(), "vision-key");
    assert!(settings.content_safety.is_some());
}

#[rstest]
fn blob_container_defaults_to_media() {
    let env = mock_env(&[
        (BLOB_ACCOUNT_NAME_ENV, "trailshare"),
        (BLOB_ACCOUNT_KEY_ENV, "a2V5"),
    ]);

    let blob = AppSettings::from_env(&env)
        .expect("valid settings")
        .blob
        .expect("blob configured");

    assert_eq!(blob.container, "media");
    assert!(blob.endpoint.is_none());
}

#[rstest]
#[case::vision_key_only(VISION_KEY_ENV, VISION_KEY_ENV, VISION_ENDPOINT_ENV)]
#[case::vision_endpoint_only(VISION_ENDPOINT_ENV, VISION_ENDPOINT_ENV, VISION_KEY_ENV)]
#[case::safety_endpoint_only(
    CONTENT_SAFETY_ENDPOINT_ENV,
    CONTENT_SAFETY_ENDPOINT_ENV,
    CONTENT_SAFETY_KEY_ENV
)]
#[case::blob_name_only(BLOB_ACCOUNT_NAME_ENV, BLOB_ACCOUNT_NAME_ENV, BLOB_ACCOUNT_KEY_ENV)]
fn half_configured_pairs_are_rejected(
    #[case] set: &str,
    #[case] present: &'static str,
    #[case] missing: &'static str,
) {
    let err = expect_error(AppSettings::from_env(&mock_env(&[(
        set,
        "https://only-one.example",
    )])));

    assert_eq!(err, SettingsError::IncompletePair { present, missing });
}

#[rstest]
fn blank_values_count_as_unset() {
    let env = mock_env(&[(VISION_ENDPOINT_ENV, "   "), (VISION_KEY_ENV, "")]);

    let settings = AppSettings::from_env(&env).expect("blank pair is absent");

    assert!(settings.vision.is_none());
}

#[rstest]
#[case::bind_addr(&[(BIND_ADDR_ENV, "localhost")], BIND_ADDR_ENV)]
#[case::endpoint_scheme(
    &[(VISION_ENDPOINT_ENV, "ftp://vision.example"), (VISION_KEY_ENV, "k")],
    VISION_ENDPOINT_ENV
)]
#[case::endpoint_syntax(
    &[(VISION_ENDPOINT_ENV, "not a url"), (VISION_KEY_ENV, "k")],
    VISION_ENDPOINT_ENV
)]
#[case::blob_endpoint(
    &[
        (BLOB_ACCOUNT_NAME_ENV, "trailshare"),
        (BLOB_ACCOUNT_KEY_ENV, "a2V5"),
        (BLOB_ENDPOINT_ENV, "blob.example"),
    ],
    BLOB_ENDPOINT_ENV
)]
fn unparsable_values_are_rejected(#[case] vars: &[(&str, &str)], #[case] expected: &str) {
    let err = expect_error(AppSettings::from_env(&mock_env(vars)));

    match err {
        SettingsError::InvalidValue { name, .. } => assert_eq!(name, expected),
        other => panic!("expected an invalid value, got {other:?}"),
    }
}

#[rstest]
fn credentials_are_redacted_in_debug_output() {
    let env = mock_env(&[
        (VISION_ENDPOINT_ENV, "https://vision.example"),
        (VISION_KEY_ENV, "s3cret"),
        (DATABASE_URL_ENV, "postgres://app:hunter2@db/trails"),
    ]);

    let settings = AppSettings::from_env(&env).expect("valid settings");
    let rendered = format!("{settings:?}");

    assert!(!rendered.contains("s3cret"));
    assert!(!rendered.contains("hunter2"));
}

#[rstest]
fn tuning_defaults_match_domain_defaults() {
    let tuning = TuningSettings::default();

    assert_eq!(tuning.moderation_policy().expect("policy").threshold(), 2);
    assert_eq!(tuning.sas_policy().expect("policy"), SasPolicy::default());
    assert_eq!(tuning.trail_limits().expect("limits"), TrailLimits::default());
    assert_eq!(
        tuning.outbound_timeout().expect("timeout"),
        Duration::from_secs(15)
    );
}

#[rstest]
#[case::zero_threshold(TuningSettings { moderation_threshold: Some(0), ..TuningSettings::default() })]
#[case::zero_upload_window(TuningSettings { upload_sas_minutes: Some(0), ..TuningSettings::default() })]
#[case::negative_read_window(TuningSettings { read_sas_minutes: Some(-5), ..TuningSettings::default() })]
#[case::delete_permission(TuningSettings { upload_permissions: Some("cwd".to_owned()), ..TuningSettings::default() })]
#[case::read_only_upload(TuningSettings { upload_permissions: Some("r".to_owned()), ..TuningSettings::default() })]
#[case::zero_image_path(TuningSettings { image_path_max_len: Some(0), ..TuningSettings::default() })]
#[case::zero_timeout(TuningSettings { outbound_timeout_seconds: Some(0), ..TuningSettings::default() })]
fn unusable_tuning_is_rejected(#[case] tuning: TuningSettings) {
    let settings = AppSettings::from_env(&mock_env(&[])).expect("defaults are valid");

    assert!(matches!(
        settings.with_tuning(tuning),
        Err(SettingsError::InvalidValue { .. })
    ));
}

#[rstest]
fn tuning_loads_from_prefixed_environment() {
    let _guard = lock_env([
        ("TRAILSHARE_MODERATION_THRESHOLD", Some("4".to_owned())),
        ("TRAILSHARE_UPLOAD_SAS_MINUTES", Some("5".to_owned())),
        ("TRAILSHARE_READ_SAS_MINUTES", None::<String>),
        ("TRAILSHARE_UPLOAD_PERMISSIONS", Some("w".to_owned())),
        ("TRAILSHARE_IMAGE_PATH_MAX_LEN", None::<String>),
        ("TRAILSHARE_OUTBOUND_TIMEOUT_SECONDS", Some("3".to_owned())),
    ]);

    let tuning = TuningSettings::load_from_iter([OsString::from("trailshare")])
        .expect("tuning should load");

    assert_eq!(tuning.moderation_policy().expect("policy").threshold(), 4);
    assert_eq!(
        tuning.sas_policy().expect("policy").upload_permissions().to_string(),
        "w"
    );
    assert_eq!(
        tuning.outbound_timeout().expect("timeout"),
        Duration::from_secs(3)
    );
    assert!(tuning.read_sas_minutes.is_none());
}
