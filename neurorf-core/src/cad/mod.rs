//! # HFSS Manager
//!
//! Turns antenna designs and the model's ordered task list into CAD
//! actions. Only the mock session exists; asking for pyaedt is recorded
//! but never changes what gets built.
//!
//! The manager owns its session and closes it when dropped, so a design
//! run cannot leak an open session on an early return.

pub mod session;

pub use session::{ActionRecord, CadSession, Descriptor, MockSession, DEFAULT_PROJECT};

use crate::antenna::{Antenna, AntennaKind};
use crate::error::{self, Result};
use crate::response::Task;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::Path;
use tracing::{debug, info, warn};

/// Frequency assumed by the mock solver when a model carries none
pub const DEFAULT_SIM_FREQUENCY_HZ: f64 = 1.0e9;

/// Port impedance used when an excitation task gives no params
pub const DEFAULT_PORT_IMPEDANCE_OHM: f64 = 50.0;

/// Category a task's `action` string falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Geometry,
    Excitation,
    Boundary,
    Setup,
    Solve,
    Export,
    Unknown,
}

impl TaskAction {
    pub fn from_action(action: &str) -> Self {
        match action {
            "create_substrate" | "create_patch" | "create_dipole" | "model" | "create_geometry" => {
                TaskAction::Geometry
            }
            "assign_excitation" | "assign_port" | "excitation" => TaskAction::Excitation,
            "assign_boundary" | "assign_perfect_e" | "boundary_conditions" => TaskAction::Boundary,
            "create_setup" | "analysis_setup" | "setup_analysis" => TaskAction::Setup,
            "analyze" | "solve" => TaskAction::Solve,
            "export_report" | "postprocess" => TaskAction::Export,
            _ => TaskAction::Unknown,
        }
    }
}

/// Descriptor of a model handed to the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuiltModel {
    #[serde(rename = "type")]
    pub kind: AntennaKind,
    pub name: String,
    pub params: Value,
    pub built_in_hfss: bool,
    pub note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskLogEntry {
    pub id: Value,
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of interpreting an ordered task list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskExecution {
    pub status: TaskStatus,
    pub log: Vec<TaskLogEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub status: String,
    pub resonant_freq_hz: f64,
    pub input_impedance_ohm: f64,
    pub gain_dbi: f64,
}

/// Owns a CAD session for the duration of a design run
pub struct HfssManager<S: CadSession = MockSession> {
    project: String,
    non_graphical: bool,
    pyaedt_requested: bool,
    /// Last model built; excitation tasks attach their port to it
    model: Option<Descriptor>,
    session: S,
}

impl HfssManager<MockSession> {
    /// Open a connected mock session
    pub fn open(project: Option<&str>, non_graphical: bool, use_pyaedt: bool) -> Result<Self> {
        let project = project.unwrap_or(DEFAULT_PROJECT);
        if use_pyaedt {
            warn!(project, "pyaedt requested but no HFSS backend is available, using mock session");
        }
        Self::with_session(MockSession::new(project), project, non_graphical, use_pyaedt)
    }
}

impl<S: CadSession> HfssManager<S> {
    pub fn with_session(
        mut session: S,
        project: &str,
        non_graphical: bool,
        use_pyaedt: bool,
    ) -> Result<Self> {
        session.connect()?;
        info!(project, non_graphical, mock = session.is_mock(), "CAD session opened");
        Ok(Self {
            project: project.to_string(),
            non_graphical,
            pyaedt_requested: use_pyaedt,
            model: None,
            session,
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn non_graphical(&self) -> bool {
        self.non_graphical
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Hand the antenna geometry to the session
    pub fn build_model(&mut self, antenna: &Antenna) -> Result<BuiltModel> {
        let params = antenna.design_params().to_value();
        let descriptor = match antenna {
            Antenna::Dipole(_) => self.session.add_dipole(&params)?,
            Antenna::Patch(_) => self.session.add_patch(&params)?,
        };

        let note = if descriptor.built_in_hfss {
            "Real HFSS build executed (details omitted)."
        } else if self.pyaedt_requested {
            "Mock build; pyaedt requested but not available."
        } else {
            "Mock build; pyaedt not available."
        };

        debug!(antenna = antenna.name(), name = descriptor.name.as_str(), "Model built");

        let built = BuiltModel {
            kind: antenna.kind(),
            name: descriptor.name.clone(),
            params,
            built_in_hfss: descriptor.built_in_hfss,
            note: note.to_string(),
        };
        self.model = Some(descriptor);
        Ok(built)
    }

    /// Interpret tasks in order. Unknown actions are logged, never fatal.
    pub fn apply_tasks(&mut self, tasks: &[Task]) -> TaskExecution {
        let mut status = TaskStatus::Ok;
        let mut log = Vec::with_capacity(tasks.len());

        for task in tasks {
            let id = task.get("id").cloned().unwrap_or(Value::Null);
            let action = task.get("action").and_then(Value::as_str);
            let empty = Map::new();
            let params = task.get("params").and_then(Value::as_object).unwrap_or(&empty);

            let category = action.map(TaskAction::from_action).unwrap_or(TaskAction::Unknown);
            let params_text = Value::Object(params.clone()).to_string();

            let outcome = match category {
                TaskAction::Geometry => Ok(format!("Geometry created: {}", params_text)),
                TaskAction::Excitation => self.assign_excitation(params),
                TaskAction::Boundary => Ok(format!("Boundary assigned: {}", params_text)),
                TaskAction::Setup => self
                    .session
                    .create_setup("Setup1", &Value::Object(params.clone()))
                    .map(|_| format!("Setup created: {}", params_text)),
                TaskAction::Solve => self
                    .session
                    .analyze()
                    .map(|_| "Simulation executed (Mock)".to_string()),
                TaskAction::Export => self
                    .session
                    .export_report("S11", Path::new("S11.csv"))
                    .map(|_| "Data exported (S11.csv)".to_string()),
                TaskAction::Unknown => {
                    debug!(action = action.unwrap_or("<none>"), "Unknown task action");
                    Ok(format!("Unknown action '{}'", action.unwrap_or("<none>")))
                }
            };

            let entry = match outcome {
                Ok(result) => TaskLogEntry {
                    id,
                    action: action.map(String::from),
                    result: Some(result),
                    error: None,
                },
                Err(e) => {
                    warn!(error = %e, "Task failed");
                    status = TaskStatus::Error;
                    TaskLogEntry {
                        id,
                        action: action.map(String::from),
                        result: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            log.push(entry);
        }

        TaskExecution { status, log }
    }

    /// Attach a port to the last built model
    fn assign_excitation(&mut self, params: &Map<String, Value>) -> Result<String> {
        let target = self.model.as_ref().ok_or_else(|| {
            error::cad_session_failed("no model built to attach a port to")
                .with_operation("cad::assign_excitation")
        })?;

        let port_params = if params.is_empty() {
            json!({"type": "lumped_port", "impedance_ohm": DEFAULT_PORT_IMPEDANCE_OHM})
        } else {
            Value::Object(params.clone())
        };
        let port = self.session.assign_port(target, &port_params)?;
        Ok(format!("Excitation assigned: {} on {}: {}", port.name, target.name, port_params))
    }

    /// Mock solve over a built model
    pub fn run_simulation(&self, built: &BuiltModel) -> SimulationResult {
        let frequency = built
            .params
            .get("frequency_hz")
            .and_then(Value::as_f64)
            .or_else(|| {
                built
                    .params
                    .get("frequency_hz_list")
                    .and_then(Value::as_array)
                    .and_then(|list| list.first())
                    .and_then(Value::as_f64)
            })
            .filter(|f| *f != 0.0)
            .unwrap_or(DEFAULT_SIM_FREQUENCY_HZ);

        SimulationResult {
            status: "mock".into(),
            resonant_freq_hz: frequency,
            input_impedance_ohm: 73.0,
            gain_dbi: 2.15,
        }
    }

    pub fn close(&mut self) -> Result<()> {
        self.session.close()
    }
}

impl<S: CadSession> Drop for HfssManager<S> {
    fn drop(&mut self) {
        if self.session.is_connected() {
            if let Err(e) = self.session.close() {
                warn!(error = %e, project = self.project.as_str(), "Failed to close CAD session");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task(value: Value) -> Task {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_action_categories() {
        assert_eq!(TaskAction::from_action("create_geometry"), TaskAction::Geometry);
        assert_eq!(TaskAction::from_action("assign_port"), TaskAction::Excitation);
        assert_eq!(TaskAction::from_action("boundary_conditions"), TaskAction::Boundary);
        assert_eq!(TaskAction::from_action("setup_analysis"), TaskAction::Setup);
        assert_eq!(TaskAction::from_action("solve"), TaskAction::Solve);
        assert_eq!(TaskAction::from_action("postprocess"), TaskAction::Export);
        assert_eq!(TaskAction::from_action("Solve"), TaskAction::Unknown);
    }

    #[test]
    fn test_build_model_dipole() {
        let mut hfss = HfssManager::open(None, true, false).unwrap();
        let antenna = Antenna::new(AntennaKind::Dipole, 2.4e9).unwrap();
        let built = hfss.build_model(&antenna).unwrap();

        assert_eq!(built.kind, AntennaKind::Dipole);
        assert!(!built.built_in_hfss);
        assert_eq!(built.note, "Mock build; pyaedt not available.");
        assert_eq!(built.params["frequency_hz"], json!(2.4e9));
        assert_eq!(hfss.project(), DEFAULT_PROJECT);
        assert_eq!(hfss.session().log()[1].action, "add_dipole");
    }

    #[test]
    fn test_build_model_patch_with_pyaedt_requested() {
        let mut hfss = HfssManager::open(Some("wifi"), true, true).unwrap();
        let antenna = Antenna::new(AntennaKind::Patch, 5e9).unwrap();
        let built = hfss.build_model(&antenna).unwrap();

        assert_eq!(built.kind, AntennaKind::Patch);
        assert!(!built.built_in_hfss);
        assert!(built.note.contains("pyaedt requested"));
        assert_eq!(hfss.session().log()[1].action, "add_patch");
    }

    #[test]
    fn test_apply_tasks_in_order() {
        let mut hfss = HfssManager::open(None, true, false).unwrap();
        hfss.build_model(&Antenna::new(AntennaKind::Dipole, 1e9).unwrap()).unwrap();
        let tasks = vec![
            task(json!({"id": 1, "action": "model", "params": {"w": 1}})),
            task(json!({"id": 2, "action": "assign_port"})),
            task(json!({"id": 3, "action": "assign_boundary"})),
            task(json!({"id": 4, "action": "analysis_setup", "params": {"f": 2}})),
            task(json!({"id": 5, "action": "solve"})),
            task(json!({"id": 6, "action": "export_report"})),
            task(json!({"id": 7, "action": "make_coffee"})),
            task(json!({"id": 8})),
        ];

        let exec = hfss.apply_tasks(&tasks);
        assert_eq!(exec.status, TaskStatus::Ok);
        assert_eq!(exec.log.len(), 8);

        let results: Vec<&str> = exec.log.iter().map(|e| e.result.as_deref().unwrap()).collect();
        assert_eq!(results[0], r#"Geometry created: {"w":1}"#);
        assert_eq!(
            results[1],
            r#"Excitation assigned: port1 on dipole_1: {"impedance_ohm":50.0,"type":"lumped_port"}"#
        );
        assert_eq!(results[2], "Boundary assigned: {}");
        assert_eq!(results[3], r#"Setup created: {"f":2}"#);
        assert_eq!(results[4], "Simulation executed (Mock)");
        assert_eq!(results[5], "Data exported (S11.csv)");
        assert_eq!(results[6], "Unknown action 'make_coffee'");
        assert_eq!(results[7], "Unknown action '<none>'");
        assert_eq!(exec.log[0].id, json!(1));
        assert_eq!(exec.log[7].action, None);

        let actions: Vec<&str> = hfss.session().log().iter().map(|r| r.action).collect();
        assert_eq!(
            actions,
            ["connect", "add_dipole", "assign_port", "create_setup", "analyze", "export_report"]
        );
    }

    #[test]
    fn test_excitation_uses_task_params_on_last_model() {
        let mut hfss = HfssManager::open(None, true, false).unwrap();
        hfss.build_model(&Antenna::new(AntennaKind::Patch, 2.4e9).unwrap()).unwrap();
        let exec = hfss.apply_tasks(&[task(json!({
            "id": 1,
            "action": "assign_excitation",
            "params": {"type": "wave_port"}
        }))]);

        assert_eq!(exec.status, TaskStatus::Ok);
        let record = hfss.session().log().last().unwrap();
        assert_eq!(record.action, "assign_port");
        assert_eq!(record.params, Some(json!({"type": "wave_port"})));
        assert_eq!(record.result, "port1 on patch_1");
    }

    #[test]
    fn test_excitation_without_model_fails() {
        let mut hfss = HfssManager::open(None, true, false).unwrap();
        let exec = hfss.apply_tasks(&[
            task(json!({"id": 1, "action": "assign_port"})),
            task(json!({"id": 2, "action": "solve"})),
        ]);

        assert_eq!(exec.status, TaskStatus::Error);
        assert!(exec.log[0].error.as_deref().unwrap().contains("no model built"));
        assert_eq!(exec.log[1].result.as_deref(), Some("Simulation executed (Mock)"));
    }

    #[test]
    fn test_run_simulation_frequency_sources() {
        let hfss = HfssManager::open(None, true, false).unwrap();
        let mut built = BuiltModel {
            kind: AntennaKind::Dipole,
            name: "dipole_1".into(),
            params: json!({"frequency_hz": 433e6}),
            built_in_hfss: false,
            note: String::new(),
        };
        let sim = hfss.run_simulation(&built);
        assert_eq!(sim.status, "mock");
        assert_eq!(sim.resonant_freq_hz, 433e6);
        assert_eq!(sim.input_impedance_ohm, 73.0);
        assert_eq!(sim.gain_dbi, 2.15);

        built.params = json!({"frequency_hz_list": [868e6, 915e6]});
        assert_eq!(hfss.run_simulation(&built).resonant_freq_hz, 868e6);

        built.params = json!({});
        assert_eq!(hfss.run_simulation(&built).resonant_freq_hz, DEFAULT_SIM_FREQUENCY_HZ);
    }

    /// Mock session that reports `close` through a shared flag
    struct TrackedSession {
        inner: MockSession,
        closed: std::sync::Arc<std::sync::atomic::AtomicBool>,
    }

    impl CadSession for TrackedSession {
        fn connect(&mut self) -> Result<()> {
            self.inner.connect()
        }
        fn add_dipole(&mut self, params: &Value) -> Result<Descriptor> {
            self.inner.add_dipole(params)
        }
        fn add_patch(&mut self, params: &Value) -> Result<Descriptor> {
            self.inner.add_patch(params)
        }
        fn assign_port(&mut self, target: &Descriptor, params: &Value) -> Result<Descriptor> {
            self.inner.assign_port(target, params)
        }
        fn create_setup(&mut self, name: &str, params: &Value) -> Result<Descriptor> {
            self.inner.create_setup(name, params)
        }
        fn analyze(&mut self) -> Result<Value> {
            self.inner.analyze()
        }
        fn export_report(&mut self, report: &str, target: &Path) -> Result<Value> {
            self.inner.export_report(report, target)
        }
        fn close(&mut self) -> Result<()> {
            self.closed.store(true, std::sync::atomic::Ordering::SeqCst);
            self.inner.close()
        }
        fn is_connected(&self) -> bool {
            self.inner.is_connected()
        }
        fn is_mock(&self) -> bool {
            true
        }
        fn log(&self) -> &[ActionRecord] {
            self.inner.log()
        }
    }

    #[test]
    fn test_session_closed_on_drop() {
        let closed = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let session = TrackedSession {
            inner: MockSession::new("p"),
            closed: closed.clone(),
        };
        {
            let hfss = HfssManager::with_session(session, "p", true, false).unwrap();
            assert!(hfss.session().is_connected());
        }
        assert!(closed.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn test_failed_task_marks_execution_error() {
        let mut hfss = HfssManager::open(None, true, false).unwrap();
        hfss.close().unwrap();
        let exec = hfss.apply_tasks(&[
            task(json!({"id": 1, "action": "model"})),
            task(json!({"id": 2, "action": "solve"})),
        ]);
        assert_eq!(exec.status, TaskStatus::Error);
        assert!(exec.log[0].error.is_none());
        assert!(exec.log[1].error.as_deref().unwrap().contains("not connected"));
    }
}
