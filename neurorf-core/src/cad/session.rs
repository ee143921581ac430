//! # CAD Session
//!
//! The small surface the HFSS manager drives. `MockSession` is the only
//! backend: it records every action in order and returns descriptors that
//! say nothing was built in HFSS.

use crate::error::{self, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;

pub const DEFAULT_PROJECT: &str = "NeuroRF_project";

/// One entry of a session's action log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRecord {
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    pub result: String,
}

/// What a geometry or port call produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Descriptor {
    pub name: String,
    pub params: Value,
    pub built_in_hfss: bool,
}

/// Session backend trait
pub trait CadSession: Send {
    fn connect(&mut self) -> Result<()>;
    fn add_dipole(&mut self, params: &Value) -> Result<Descriptor>;
    fn add_patch(&mut self, params: &Value) -> Result<Descriptor>;
    fn assign_port(&mut self, target: &Descriptor, params: &Value) -> Result<Descriptor>;
    fn create_setup(&mut self, name: &str, params: &Value) -> Result<Descriptor>;
    fn analyze(&mut self) -> Result<Value>;
    fn export_report(&mut self, report: &str, target: &Path) -> Result<Value>;
    fn close(&mut self) -> Result<()>;
    fn is_connected(&self) -> bool;
    fn is_mock(&self) -> bool;
    fn log(&self) -> &[ActionRecord];
}

/// In-process session that only documents actions
#[derive(Debug, Clone, Default)]
pub struct MockSession {
    project: String,
    connected: bool,
    log: Vec<ActionRecord>,
}

impl MockSession {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            connected: false,
            log: Vec::new(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    fn record(&mut self, action: &'static str, params: Option<Value>, result: impl Into<String>) {
        self.log.push(ActionRecord {
            action,
            params,
            result: result.into(),
        });
    }

    fn ensure_connected(&self, action: &'static str) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(error::cad_session_failed("session is not connected")
                .with_operation("cad::session")
                .with_context("action", action)
                .with_context("project", self.project.clone()))
        }
    }
}

impl CadSession for MockSession {
    fn connect(&mut self) -> Result<()> {
        self.connected = true;
        self.record("connect", None, "mock session");
        Ok(())
    }

    fn add_dipole(&mut self, params: &Value) -> Result<Descriptor> {
        self.ensure_connected("add_dipole")?;
        self.record("add_dipole", Some(params.clone()), "mock geometry");
        Ok(Descriptor {
            name: "dipole_1".into(),
            params: params.clone(),
            built_in_hfss: false,
        })
    }

    fn add_patch(&mut self, params: &Value) -> Result<Descriptor> {
        self.ensure_connected("add_patch")?;
        self.record("add_patch", Some(params.clone()), "mock geometry");
        Ok(Descriptor {
            name: "patch_1".into(),
            params: params.clone(),
            built_in_hfss: false,
        })
    }

    fn assign_port(&mut self, target: &Descriptor, params: &Value) -> Result<Descriptor> {
        self.ensure_connected("assign_port")?;
        self.record(
            "assign_port",
            Some(params.clone()),
            format!("port1 on {}", target.name),
        );
        Ok(Descriptor {
            name: "port1".into(),
            params: params.clone(),
            built_in_hfss: false,
        })
    }

    fn create_setup(&mut self, name: &str, params: &Value) -> Result<Descriptor> {
        self.ensure_connected("create_setup")?;
        self.record("create_setup", Some(params.clone()), name);
        Ok(Descriptor {
            name: name.to_string(),
            params: params.clone(),
            built_in_hfss: false,
        })
    }

    fn analyze(&mut self) -> Result<Value> {
        self.ensure_connected("analyze")?;
        self.record("analyze", None, "mock_solved");
        Ok(json!({ "status": "mock_solved" }))
    }

    fn export_report(&mut self, report: &str, target: &Path) -> Result<Value> {
        self.ensure_connected("export_report")?;
        let path = target.display().to_string();
        self.record(
            "export_report",
            Some(json!({ "report": report, "path": path })),
            "not exported",
        );
        Ok(json!({ "report": report, "path": path, "exported": false }))
    }

    fn close(&mut self) -> Result<()> {
        if self.connected {
            self.connected = false;
            self.record("close", None, "mock session closed");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn is_mock(&self) -> bool {
        true
    }

    fn log(&self) -> &[ActionRecord] {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_actions_are_logged_in_order() {
        let mut session = MockSession::new(DEFAULT_PROJECT);
        session.connect().unwrap();

        let dipole = session.add_dipole(&json!({ "length_m": 0.06 })).unwrap();
        assert!(!dipole.built_in_hfss);
        session.assign_port(&dipole, &json!({ "impedance": 50 })).unwrap();
        session.create_setup("Setup1", &json!({ "frequency_hz": 2.4e9 })).unwrap();
        assert_eq!(session.analyze().unwrap()["status"], "mock_solved");
        let report = session.export_report("S11", Path::new("out/S11.csv")).unwrap();
        assert_eq!(report["exported"], false);
        session.close().unwrap();

        let actions: Vec<&str> = session.log().iter().map(|r| r.action).collect();
        assert_eq!(
            actions,
            vec![
                "connect",
                "add_dipole",
                "assign_port",
                "create_setup",
                "analyze",
                "export_report",
                "close"
            ]
        );
        assert_eq!(session.log()[2].result, "port1 on dipole_1");
    }

    #[test]
    fn test_operations_require_connection() {
        let mut session = MockSession::new("p");
        let err = session.add_patch(&json!({})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CadSessionFailed);
        assert_eq!(err.context_value("action"), Some("add_patch"));
        assert!(session.log().is_empty());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut session = MockSession::new("p");
        session.connect().unwrap();
        session.close().unwrap();
        session.close().unwrap();
        assert!(!session.is_connected());
        assert_eq!(session.log().len(), 2);
    }
}
