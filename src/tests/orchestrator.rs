use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use k8s_openapi::api::core::v1::Secret;
use pretty_assertions::assert_eq;

use super::*;
use crate::clients::KubeBackend;
use crate::error::{Resource, SetupError};
use crate::orchestrator::{Orchestrator, RunOutcome};
use crate::provision::session::{MockLauncher, MockWebSession};
use crate::provision::{Artifactory, Snapshots, Sonarqube};
use crate::store::MockConfigStore;

const ARTIFACTORY_SECRET: &[(&str, &str)] = &[
    ("ARTIFACTORY_URL", "http://artifactory.tools:8082"),
    ("ARTIFACTORY_USER", "admin"),
    ("ARTIFACTORY_PASSWORD", "password"),
];

/// Store that serves the given secret and records what gets written.
fn store_for(
    secret_data: &'static [(&'static str, &'static str)],
    public_url_key: &'static str,
) -> (MockConfigStore, Arc<Mutex<Vec<Secret>>>) {
    let written = Arc::new(Mutex::new(Vec::new()));
    let mut store = MockConfigStore::new();
    store
        .expect_secret()
        .returning(move |name, _| Ok(secret(name, secret_data)));
    store
        .expect_config_map()
        .returning(move |name, _| Ok(config_map(name, &[(public_url_key, "https://public.example.com")])));
    let w = written.clone();
    store.expect_replace_secret().returning(move |_, _, s| {
        w.lock().unwrap().push(s.clone());
        Ok(())
    });
    (store, written)
}

#[tokio::test]
async fn partial_wizard_still_persists_new_password() {
    let (store, written) = store_for(ARTIFACTORY_SECRET, "ARTIFACTORY_URL");
    let rec = Recorder::default();
    let launcher = launcher_with(scripted_session(&rec, Some(".base-url-wrapper input")));
    let settings = fast_settings();
    let snapshots = Snapshots::disabled();

    let orchestrator = Orchestrator {
        store: &store,
        launcher: &launcher,
        settings: &settings,
        snapshots: &snapshots,
    };
    let outcome = orchestrator
        .run(&Artifactory, "tools", KubeBackend::InCluster)
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::Updated);
    assert_eq!(rec.closed(), 1);
    // in-cluster: the wizard talks to the url from the secret
    assert_eq!(rec.visited()[0], "http://artifactory.tools:8082/ui/login");

    let new_password = rec.typed()[2].clone();
    let written = written.lock().unwrap();
    assert_eq!(written.len(), 1);
    let data = string_data(&written[0]);
    assert_eq!(data["ARTIFACTORY_PASSWORD"], new_password);
    assert_eq!(data["ARTIFACTORY_URL"], "http://artifactory.tools:8082");
    // never got as far as the profile page
    assert!(!data.contains_key("ARTIFACTORY_ENCRYPT"));
}

#[tokio::test]
async fn complete_wizard_persists_everything() {
    let (store, written) = store_for(ARTIFACTORY_SECRET, "ARTIFACTORY_URL");
    let rec = Recorder::default();
    let launcher = launcher_with(scripted_session(&rec, None));
    let settings = fast_settings();
    let snapshots = Snapshots::disabled();

    let outcome = Orchestrator {
        store: &store,
        launcher: &launcher,
        settings: &settings,
        snapshots: &snapshots,
    }
    .run(&Artifactory, "tools", KubeBackend::Default)
    .await
    .unwrap();

    assert_eq!(outcome, RunOutcome::Updated);
    assert_eq!(rec.visited()[0], "https://public.example.com/ui/login");
    let data = string_data(&written.lock().unwrap()[0]);
    assert_eq!(data["ARTIFACTORY_ENCRYPT"], ENCRYPTED);
}

#[tokio::test]
async fn nothing_to_update_when_login_fails() {
    let (store, written) = store_for(
        &[("SONARQUBE_USER", "admin"), ("SONARQUBE_PASSWORD", "admin")],
        "SONARQUBE_URL",
    );
    let mut session = MockWebSession::new();
    session
        .expect_goto()
        .times(2)
        .returning(|_| Err(anyhow!("net::ERR_NAME_NOT_RESOLVED")));
    session.expect_close().times(1).returning(|| Ok(()));
    let launcher = launcher_with(session);
    let settings = fast_settings();
    let snapshots = Snapshots::disabled();

    let outcome = Orchestrator {
        store: &store,
        launcher: &launcher,
        settings: &settings,
        snapshots: &snapshots,
    }
    .run(&Sonarqube, "tools", KubeBackend::Default)
    .await
    .unwrap();

    assert_eq!(outcome, RunOutcome::NothingToUpdate);
    assert!(written.lock().unwrap().is_empty());
}

#[tokio::test]
async fn nothing_to_update_when_browser_does_not_start() {
    let (store, written) = store_for(
        &[("SONARQUBE_USER", "admin"), ("SONARQUBE_PASSWORD", "admin")],
        "SONARQUBE_URL",
    );
    let mut launcher = MockLauncher::new();
    launcher
        .expect_launch()
        .times(1)
        .returning(|| Err(anyhow!("could not find chrome")));
    let settings = fast_settings();
    let snapshots = Snapshots::disabled();

    let outcome = Orchestrator {
        store: &store,
        launcher: &launcher,
        settings: &settings,
        snapshots: &snapshots,
    }
    .run(&Sonarqube, "tools", KubeBackend::Default)
    .await
    .unwrap();

    assert_eq!(outcome, RunOutcome::NothingToUpdate);
    assert!(written.lock().unwrap().is_empty());
}

#[tokio::test]
async fn lookup_failure_stops_before_browser() {
    let mut store = MockConfigStore::new();
    store
        .expect_secret()
        .returning(|_, _| Err(anyhow!("secrets \"sonarqube-access\" is forbidden")));
    // no expectations: launching would panic
    let launcher = MockLauncher::new();
    let settings = fast_settings();
    let snapshots = Snapshots::disabled();

    let err = Orchestrator {
        store: &store,
        launcher: &launcher,
        settings: &settings,
        snapshots: &snapshots,
    }
    .run(&Sonarqube, "tools", KubeBackend::Default)
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SetupError>(),
        Some(SetupError::Lookup { .. })
    ));
}

#[tokio::test]
async fn missing_credentials_stop_before_browser() {
    let (store, _) = store_for(&[("SONARQUBE_USER", "admin")], "SONARQUBE_URL");
    let launcher = MockLauncher::new();
    let settings = fast_settings();
    let snapshots = Snapshots::disabled();

    let err = Orchestrator {
        store: &store,
        launcher: &launcher,
        settings: &settings,
        snapshots: &snapshots,
    }
    .run(&Sonarqube, "tools", KubeBackend::Default)
    .await
    .unwrap_err();

    match err.downcast_ref::<SetupError>() {
        Some(SetupError::MissingField {
            resource, field, ..
        }) => {
            assert_eq!(*resource, Resource::Secret);
            assert_eq!(field, "SONARQUBE_PASSWORD");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn persist_failure_is_fatal() {
    let mut store = MockConfigStore::new();
    store.expect_secret().returning(|name, _| {
        Ok(secret(
            name,
            &[("SONARQUBE_USER", "admin"), ("SONARQUBE_PASSWORD", "admin")],
        ))
    });
    store
        .expect_config_map()
        .returning(|name, _| Ok(config_map(name, &[("SONARQUBE_URL", "http://sonarqube:9000")])));
    store
        .expect_replace_secret()
        .times(1)
        .returning(|_, _, _| Err(anyhow!("the object has been modified")));
    let rec = Recorder::default();
    let launcher = launcher_with(scripted_session(&rec, None));
    let settings = fast_settings();
    let snapshots = Snapshots::disabled();

    let err = Orchestrator {
        store: &store,
        launcher: &launcher,
        settings: &settings,
        snapshots: &snapshots,
    }
    .run(&Sonarqube, "tools", KubeBackend::Default)
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SetupError>(),
        Some(SetupError::Persist { .. })
    ));
    assert_eq!(rec.closed(), 1);
}

#[tokio::test]
async fn empty_password_stops_before_browser() {
    let (store, written) = store_for(
        &[("SONARQUBE_USER", "admin"), ("SONARQUBE_PASSWORD", "")],
        "SONARQUBE_URL",
    );
    // no expectations: launching would panic
    let launcher = MockLauncher::new();
    let settings = fast_settings();
    let snapshots = Snapshots::disabled();

    let err = Orchestrator {
        store: &store,
        launcher: &launcher,
        settings: &settings,
        snapshots: &snapshots,
    }
    .run(&Sonarqube, "tools", KubeBackend::Default)
    .await
    .unwrap_err();

    match err.downcast_ref::<SetupError>() {
        Some(SetupError::MissingField { field, .. }) => assert_eq!(field, "SONARQUBE_PASSWORD"),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(written.lock().unwrap().is_empty());
}
