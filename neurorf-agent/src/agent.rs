//! Agent implementation - orchestrates request -> LLM -> antennas -> CAD

use neurorf_core::cad::{BuiltModel, HfssManager, SimulationResult, TaskAction, TaskExecution};
use neurorf_core::{
    Antenna, AntennaKind, ChatMessage, CompletionRequest, DesignParams, DesignPrompt, Error,
    IntentParser, LlmProvider, ModelResponse, PerformanceEstimate, ProviderError, Result,
    Settings, Task, UsageTracker,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Configuration for the agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Sampling temperature sent with every completion
    pub temperature: f32,
    pub max_tokens: Option<usize>,
    /// Used when a run does not say whether pyaedt is wanted
    pub use_pyaedt: bool,
    /// CAD project name; the session default when unset
    pub project: Option<String>,
    pub non_graphical: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            temperature: neurorf_core::config::DEFAULT_TEMPERATURE,
            max_tokens: None,
            use_pyaedt: false,
            project: None,
            non_graphical: true,
        }
    }
}

impl AgentConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            temperature: settings.temperature,
            use_pyaedt: settings.use_pyaedt,
            ..Self::default()
        }
    }
}

/// Everything produced for one antenna
#[derive(Debug, Clone, Serialize)]
pub struct AntennaReport {
    #[serde(rename = "type")]
    pub name: &'static str,
    pub params: DesignParams,
    /// Closed-form figures computed before any solve
    pub estimate: PerformanceEstimate,
    pub built: BuiltModel,
    pub task_execution: TaskExecution,
    pub simulation: SimulationResult,
}

/// Result of a design run
#[derive(Debug, Clone, Serialize)]
pub struct DesignResult {
    pub request: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub spec_from_llm: ModelResponse,
    pub antennas: Vec<AntennaReport>,
}

impl DesignResult {
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::serialization_failed("failed to serialize design result")
                .with_operation("agent::run_design")
                .set_source(e)
        })
    }
}

/// The agent orchestrator
pub struct Agent<P: LlmProvider> {
    provider: P,
    parser: IntentParser,
    config: AgentConfig,
    usage: UsageTracker,
}

impl<P: LlmProvider> Agent<P> {
    /// Create a new agent with default configuration
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, AgentConfig::default())
    }

    /// Create a new agent with custom configuration
    pub fn with_config(provider: P, config: AgentConfig) -> Self {
        Self {
            provider,
            parser: IntentParser::new(),
            config,
            usage: UsageTracker::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Token usage accumulated over all runs
    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    /// Run one design request end to end.
    ///
    /// Any provider or validation failure aborts the run; nothing is built
    /// from a partial or invalid model answer.
    pub async fn run_design(
        &mut self,
        request: &str,
        request_id: Option<&str>,
        use_pyaedt: Option<bool>,
    ) -> Result<DesignResult> {
        let intent = self.parser.parse(request);
        debug!(
            frequencies = intent.frequencies_hz.len(),
            hint = ?intent.antenna_type,
            "Parsed design request"
        );

        let prompt = DesignPrompt::new(&intent).with_request_id(request_id);
        let spec = self.request_spec(&prompt).await?;

        let kind = AntennaKind::from_type_str(spec.antenna_type());
        let antennas = Antenna::for_frequencies(kind, spec.frequencies_hz())?;
        info!(
            antenna_type = spec.antenna_type(),
            %kind,
            antennas = antennas.len(),
            tasks = spec.tasks().len(),
            "Model response validated"
        );

        let use_pyaedt = use_pyaedt.unwrap_or(self.config.use_pyaedt);
        let mut hfss = HfssManager::open(
            self.config.project.as_deref(),
            self.config.non_graphical,
            use_pyaedt,
        )?;

        let mut reports = Vec::with_capacity(antennas.len());
        for antenna in &antennas {
            let params = antenna.design_params();
            let tasks = enrich_tasks(spec.tasks(), &params, spec.frequencies_hz());

            let built = hfss.build_model(antenna)?;
            let task_execution = hfss.apply_tasks(&tasks);
            let simulation = hfss.run_simulation(&built);

            debug!(
                antenna = antenna.name(),
                frequency_hz = antenna.frequency_hz(),
                status = ?task_execution.status,
                "Antenna processed"
            );

            reports.push(AntennaReport {
                name: antenna.name(),
                params,
                estimate: antenna.estimate(),
                built,
                task_execution,
                simulation,
            });
        }

        Ok(DesignResult {
            request: request.to_string(),
            request_id: request_id.map(String::from),
            spec_from_llm: spec,
            antennas: reports,
        })
    }

    /// Ask the provider for the JSON design and validate it
    async fn request_spec(&mut self, prompt: &DesignPrompt<'_>) -> Result<ModelResponse> {
        let mut completion_request = CompletionRequest::new(vec![
            ChatMessage::system(prompt.system()),
            ChatMessage::user(prompt.render()),
        ])
        .with_temperature(self.config.temperature)
        .with_json_mode(true);
        if let Some(max) = self.config.max_tokens {
            completion_request = completion_request.with_max_tokens(max);
        }

        info!(provider = self.provider.name(), "Requesting design from LLM");
        let response = self.provider.complete(completion_request).await?;
        self.usage.track(&response.model, &response.usage);

        let content = response
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)?;
        debug!(chars = content.len(), finish_reason = ?response.finish_reason, "LLM responded");

        ModelResponse::from_reply(&content)
    }
}

/// Per-antenna copy of the task list.
///
/// Geometry actions get the antenna's design parameters under
/// `params.geometry`; setup actions get `params.frequency_hz_list`.
pub fn enrich_tasks(tasks: &[Task], params: &DesignParams, frequencies_hz: &[f64]) -> Vec<Task> {
    tasks
        .iter()
        .map(|task| {
            let mut task = task.clone();
            let category = task
                .get("action")
                .and_then(Value::as_str)
                .map(TaskAction::from_action)
                .unwrap_or(TaskAction::Unknown);

            let addition = match category {
                TaskAction::Geometry => Some(("geometry", params.to_value())),
                TaskAction::Setup => Some(("frequency_hz_list", Value::from(frequencies_hz.to_vec()))),
                _ => None,
            };

            if let Some((key, value)) = addition {
                let entry = task
                    .entry("params")
                    .or_insert_with(|| Value::Object(Map::new()));
                if !entry.is_object() {
                    *entry = Value::Object(Map::new());
                }
                if let Value::Object(map) = entry {
                    map.insert(key.to_string(), value);
                }
            }
            task
        })
        .collect()
}
