// Shared fixtures for the unit tests below.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use serde_json::{json, Value};

use crate::configparser::{Settings, TimingSettings};
use crate::provision::session::{MockLauncher, MockWebSession};
use crate::provision::WebSession;

mod orchestrator;

pub const ENCRYPTED: &str = "{DESede}encrypted==";
pub const TOKEN: &str = "squ_0123456789abcdef";

pub fn secret(name: &str, data: &[(&str, &str)]) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("tools".to_string()),
            resource_version: Some("42".to_string()),
            ..Default::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| (k.to_string(), ByteString(v.as_bytes().to_vec())))
                .collect(),
        ),
        ..Default::default()
    }
}

pub fn config_map(name: &str, data: &[(&str, &str)]) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        ),
        ..Default::default()
    }
}

pub fn string_data(secret: &Secret) -> BTreeMap<String, String> {
    secret
        .data
        .iter()
        .flatten()
        .map(|(k, v)| (k.clone(), String::from_utf8(v.0.clone()).unwrap()))
        .collect()
}

/// Settings with every wait set to zero.
pub fn fast_settings() -> Settings {
    Settings {
        timing: TimingSettings {
            settle_ms: 0,
            retry_delay_ms: 0,
            readiness_timeout_ms: 0,
        },
        ..Default::default()
    }
}

/// What a scripted session saw, for assertions after the run.
#[derive(Default, Clone)]
pub struct Recorder {
    pub typed: Arc<Mutex<Vec<String>>>,
    pub visited: Arc<Mutex<Vec<String>>>,
    pub closed: Arc<AtomicUsize>,
}

impl Recorder {
    pub fn typed(&self) -> Vec<String> {
        self.typed.lock().unwrap().clone()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

/// A session where every interaction succeeds, except focusing `fail_focus`.
pub fn scripted_session(rec: &Recorder, fail_focus: Option<&'static str>) -> MockWebSession {
    let mut session = MockWebSession::new();

    let visited = rec.visited.clone();
    session.expect_goto().returning(move |url| {
        visited.lock().unwrap().push(url.to_string());
        Ok(())
    });
    session.expect_wait_for().returning(|_, _| Ok(()));
    session.expect_focus().returning(move |selector| match fail_focus {
        Some(f) if f == selector => Err(anyhow!("no node found for {selector}")),
        _ => Ok(()),
    });
    let typed = rec.typed.clone();
    session.expect_type_text().returning(move |text| {
        typed.lock().unwrap().push(text.to_string());
        Ok(())
    });
    session.expect_press_key().returning(|_| Ok(()));
    session.expect_click().returning(|_| Ok(()));
    session.expect_evaluate().returning(|script| Ok(page_script(script)));
    let closed = rec.closed.clone();
    session.expect_close().times(1).returning(move || {
        closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    session
}

// canned answers for the scripts the wizards run
fn page_script(script: &str) -> Value {
    if script.contains("input[name=password]") && script.contains(".value") {
        json!(ENCRYPTED)
    } else if script.contains("code.text-success") {
        json!(TOKEN)
    } else if script.contains("e.click(); return true;") {
        json!(true)
    } else if script.contains("innerText") {
        json!("Welcome")
    } else {
        Value::Null
    }
}

pub fn launcher_with(session: MockWebSession) -> MockLauncher {
    let mut launcher = MockLauncher::new();
    launcher
        .expect_launch()
        .times(1)
        .return_once(move || Ok(Box::new(session) as Box<dyn WebSession>));
    launcher
}
