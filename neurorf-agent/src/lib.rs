//! # NeuroRF Agent
//!
//! The agent runs one design request end to end:
//! 1. Parse the request for frequencies and an antenna hint
//! 2. Build the chain-of-thought prompt
//! 3. Ask the LLM for a JSON design (JSON mode, no retries)
//! 4. Validate the answer strictly; any violation aborts the run
//! 5. Build one antenna per frequency and drive the CAD workflow
//!
//! The LLM decides the design, the antenna models and CAD manager carry it out.

mod agent;

pub use agent::{enrich_tasks, Agent, AgentConfig, AntennaReport, DesignResult};
