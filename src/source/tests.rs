use crate::SecretInjectError;
use crate::source::dotenv::{DotEnvConfig, DotEnvSource};
use crate::source::env::{EnvConfig, EnvSource};
use crate::source::keyring::KeyringSource;
use crate::source::{SecretSource, StaticSource, macros, path_to_env_key, sources};
use std::convert::TryFrom;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use url::Url;

#[test]
fn test_create_from_string_with_plain_names() {
    let source = Box::<dyn SecretSource>::try_from("env").unwrap();
    assert_eq!(source.name(), "env");

    let source = Box::<dyn SecretSource>::try_from("keyring").unwrap();
    assert_eq!(source.name(), "keyring");

    let source = Box::<dyn SecretSource>::try_from("dotenv").unwrap();
    assert_eq!(source.name(), "dotenv");
}

#[test]
fn test_create_from_string_with_full_uris() {
    let source = Box::<dyn SecretSource>::try_from("env://APP_").unwrap();
    assert_eq!(source.name(), "env");

    let source = Box::<dyn SecretSource>::try_from("dotenv://config/.env.prod").unwrap();
    assert_eq!(source.name(), "dotenv");

    let source = Box::<dyn SecretSource>::try_from("keyring://").unwrap();
    assert_eq!(source.name(), "keyring");
}

#[test]
fn test_unknown_source() {
    match Box::<dyn SecretSource>::try_from("vault://secret") {
        Err(SecretInjectError::SourceNotFound(scheme)) => assert_eq!(scheme, "vault"),
        Err(e) => panic!("Expected SourceNotFound error, got {}", e),
        Ok(_) => panic!("Expected SourceNotFound error"),
    }
}

#[test]
fn test_registry_lists_builtin_sources() {
    let names: Vec<&str> = sources().iter().map(|info| info.name).collect();
    for name in ["env", "dotenv", "keyring"] {
        assert!(names.contains(&name), "{name} missing from {names:?}");
    }

    let env = sources().into_iter().find(|info| info.name == "env").unwrap();
    assert_eq!(
        env.display_with_examples(),
        "env: Process environment variables (e.g., env://, env://APP_)"
    );
}

#[test]
fn test_registry_lookup_by_scheme() {
    let registration = macros::lookup("dotenv").unwrap();
    assert_eq!(registration.scheme, "dotenv");
    assert_eq!(registration.info().name, "dotenv");
    assert!(macros::lookup("vault").is_none());
}

#[test]
fn test_path_to_env_key() {
    assert_eq!(path_to_env_key("company/app/db/pass"), "COMPANY_APP_DB_PASS");
    assert_eq!(path_to_env_key("app/db-pass:v2"), "APP_DB_PASS_V2");
    assert_eq!(path_to_env_key("already_FINE"), "ALREADY_FINE");
}

#[test]
fn test_dotenv_config_paths() {
    let cases = [
        ("dotenv://", ".env"),
        ("dotenv://.env.production", ".env.production"),
        ("dotenv://config/.env.prod", "config/.env.prod"),
        ("dotenv:///etc/app/.env", "/etc/app/.env"),
    ];
    for (uri, expected) in cases {
        let url = Url::parse(uri).unwrap();
        let config = DotEnvConfig::try_from(&url).unwrap();
        assert_eq!(config.path, PathBuf::from(expected), "{uri}");
    }
}

#[test]
fn test_env_config_prefix() {
    let config = EnvConfig::try_from(&Url::parse("env://").unwrap()).unwrap();
    assert_eq!(config.prefix, None);

    let config = EnvConfig::try_from(&Url::parse("env://APP_").unwrap()).unwrap();
    assert_eq!(config.prefix.as_deref(), Some("APP_"));

    assert!(EnvConfig::try_from(&Url::parse("dotenv://").unwrap()).is_err());
}

#[test]
fn test_env_source_reads_mapped_key() {
    unsafe {
        std::env::set_var("SRCTEST_SERVICE_DB_PASS", "from-env");
        std::env::set_var("PFX_SRCTEST_SERVICE_API_KEY", "prefixed");
    }

    let source = EnvSource::new(EnvConfig::default());
    let value = source.get_with_data("srctest/service/db-pass").unwrap();
    assert_eq!(value.as_bytes(), b"from-env");

    let source = EnvSource::new(EnvConfig {
        prefix: Some("PFX_".to_string()),
    });
    assert_eq!(
        source.key_for("srctest/service/api_key"),
        "PFX_SRCTEST_SERVICE_API_KEY"
    );
    let value = source.get_with_data("srctest/service/api_key").unwrap();
    assert_eq!(value.as_bytes(), b"prefixed");

    unsafe {
        std::env::remove_var("SRCTEST_SERVICE_DB_PASS");
        std::env::remove_var("PFX_SRCTEST_SERVICE_API_KEY");
    }
}

#[test]
fn test_env_source_missing_secret() {
    let source = EnvSource::new(EnvConfig::default());
    match source.get_with_data("srctest/definitely/not/set") {
        Err(SecretInjectError::SecretNotFound(path)) => {
            assert_eq!(path, "srctest/definitely/not/set")
        }
        other => panic!("Expected SecretNotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_dotenv_source() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(".env");
    fs::write(&path, "COMPANY_APP_DB_PASS=hunter2\nOTHER=x\n").unwrap();

    let source = DotEnvSource::new(DotEnvConfig { path: path.clone() });
    let value = source.get_with_data("company/app/db/pass").unwrap();
    assert_eq!(value.as_bytes(), b"hunter2");

    assert!(matches!(
        source.get_with_data("company/app/missing"),
        Err(SecretInjectError::SecretNotFound(_))
    ));

    let uri = format!("dotenv://{}", path.display());
    let source = Box::<dyn SecretSource>::try_from(uri.as_str()).unwrap();
    assert_eq!(
        source.get_with_data("company/app/db/pass").unwrap().as_bytes(),
        b"hunter2"
    );
}

#[test]
fn test_dotenv_file_is_read_once() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(".env");
    fs::write(&path, "APP_A=1\nAPP_B=2\n").unwrap();

    let source = DotEnvSource::new(DotEnvConfig { path: path.clone() });
    assert_eq!(source.get_with_data("app/a").unwrap().as_bytes(), b"1");

    fs::remove_file(&path).unwrap();
    assert_eq!(source.get_with_data("app/b").unwrap().as_bytes(), b"2");
}

#[test]
fn test_dotenv_source_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let source = DotEnvSource::new(DotEnvConfig {
        path: temp_dir.path().join("nope.env"),
    });
    assert!(matches!(
        source.get_with_data("any/path"),
        Err(SecretInjectError::SecretNotFound(_))
    ));
}

#[test]
fn test_keyring_service_name() {
    assert_eq!(
        KeyringSource::service_for("company/app/db/pass"),
        "secretinject/company/app/db/pass"
    );
}

#[test]
fn test_static_source() {
    let source = StaticSource::new().with_secret("a/b", "1");
    assert_eq!(source.get_with_data("a/b").unwrap().as_bytes(), b"1");
    assert!(source.get_with_data("a/c").is_err());

    let source: StaticSource = [("x/y", "2"), ("x/z", "3")].into_iter().collect();
    assert_eq!(source.get_with_data("x/z").unwrap().as_bytes(), b"3");
}
