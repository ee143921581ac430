//! # NeuroRF Core
//!
//! Building blocks for turning a natural-language antenna request into a
//! validated design and a CAD workflow.
//!
//! ## Core Concepts
//! - **Response**: strict validation of the model's JSON answer
//! - **Intent / Prompt**: request parsing and the chain-of-thought prompt
//! - **Provider**: trait-based LLM communication (Gemini, OpenAI-compatible)
//! - **Antenna**: closed-form dipole and patch designs
//! - **CAD**: HFSS manager over a mock session
//! - **Config**: dotenv loading and environment settings

pub mod error;
pub mod response;
pub mod intent;
pub mod prompt;
pub mod provider;
pub mod physics;
pub mod materials;
pub mod antenna;
pub mod cad;
pub mod config;

pub use error::{Error, ErrorKind, ErrorStatus, Result};
pub use response::{extract_json_object, ModelResponse, RawResponse, Task};
pub use intent::{DesignIntent, IntentParser};
pub use prompt::{DesignPrompt, SYSTEM_PROMPT};
pub use provider::{
    LlmProvider, ProviderConfig, ProviderType, ProviderError,
    ChatMessage, Role, CompletionRequest, CompletionResponse,
    FinishReason, Usage, UsageTracker,
    GeminiProvider, OpenAIProvider,
};
pub use antenna::{Antenna, AntennaKind, DesignParams, Dipole, Patch, PerformanceEstimate};
pub use cad::{
    BuiltModel, CadSession, HfssManager, MockSession,
    SimulationResult, TaskAction, TaskExecution, TaskStatus,
};
pub use config::{env_info, load_env, EnvVarInfo, Overrides, Settings};
