//! # Design Prompt
//!
//! Builds the chain-of-thought prompt sent to the generative text service.
//! The prompt pins down the JSON contract enforced by [`crate::response`]:
//! `antenna_type`, `frequencies_hz` and an ordered `tasks` workflow.

use crate::intent::DesignIntent;

/// One step of the modelling workflow the model is asked to enumerate
#[derive(Debug, Clone, Copy)]
pub struct WorkflowStep {
    pub name: &'static str,
    pub description: &'static str,
}

pub const WORKFLOW: &[WorkflowStep] = &[
    WorkflowStep {
        name: "model",
        description: "create geometry with parameters",
    },
    WorkflowStep {
        name: "excitation",
        description: "apply feed/excitation (port, type, amplitude, phase)",
    },
    WorkflowStep {
        name: "boundary_conditions",
        description: "apply BCs (radiation, symmetry, perfect conductor)",
    },
    WorkflowStep {
        name: "analysis_setup",
        description: "set frequency sweep / solver settings / convergence criteria",
    },
    WorkflowStep {
        name: "solve",
        description: "run analysis",
    },
    WorkflowStep {
        name: "postprocess",
        description: "extract S-parameters, fields, gain, and export results (publish)",
    },
];

pub const SYSTEM_PROMPT: &str = "You are an expert antenna engineer. \
    You answer with a single JSON object and nothing else.";

/// Prompt builder for a single design request
pub struct DesignPrompt<'a> {
    intent: &'a DesignIntent,
    request_id: Option<&'a str>,
}

impl<'a> DesignPrompt<'a> {
    pub fn new(intent: &'a DesignIntent) -> Self {
        Self {
            intent,
            request_id: None,
        }
    }

    /// Render the prompt for an intent in one call
    pub fn build(intent: &DesignIntent, request_id: Option<&str>) -> String {
        DesignPrompt::new(intent).with_request_id(request_id).render()
    }

    pub fn with_request_id(mut self, request_id: Option<&'a str>) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn system(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    /// Render the user prompt
    pub fn render(&self) -> String {
        let mut out = String::new();

        if let Some(id) = self.request_id {
            out.push_str(&format!("Request-ID: {}\n", id));
        }

        out.push_str(
            "You are an expert antenna engineer. Provide a very short chain-of-thought \
             (one or two sentences),\n",
        );
        out.push_str("then output a final JSON object only. The JSON MUST contain the following keys:\n");
        out.push_str("  - 'antenna_type' (string),\n");
        out.push_str("  - 'frequencies_hz' (array of numbers),\n");
        out.push_str("  - 'tasks' (an ordered array of task objects),\n");
        out.push_str(
            "    where each task object is { 'id': <int>, 'name': <string>, \
             'action': <string>, 'params': <object> }\n",
        );
        out.push_str("  - optional 'notes' string.\n\n");

        out.push_str(
            "The 'tasks' array should enumerate the full modelling workflow required \
             for this problem. Typical tasks include:\n",
        );
        for (i, step) in WORKFLOW.iter().enumerate() {
            out.push_str(&format!("  {}) {}: {}\n", i + 1, step.name, step.description));
        }
        out.push('\n');

        out.push_str(&format!("User request: {}\n", self.intent.raw));

        if !self.intent.frequencies_hz.is_empty() {
            let freqs: Vec<String> = self
                .intent
                .frequencies_hz
                .iter()
                .map(|f| format!("{}", f))
                .collect();
            out.push_str(&format!("Frequencies mentioned (Hz): {}\n", freqs.join(", ")));
        }
        if let Some(kind) = self.intent.antenna_type {
            out.push_str(&format!("Antenna family mentioned: {}\n", kind));
        }
        out.push('\n');

        out.push_str(
            "For each task provide an 'action' string the CAD manager can interpret \
             and a 'params' object with relevant numeric parameters.\n",
        );
        out.push_str("Return ONLY the JSON (no markdown, no code fences).");

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::IntentParser;

    #[test]
    fn test_prompt_contract_keys() {
        let intent = IntentParser::new().parse("I need a Bluetooth antenna.");
        let prompt = DesignPrompt::new(&intent).render();

        assert!(prompt.contains("'antenna_type' (string)"));
        assert!(prompt.contains("'frequencies_hz' (array of numbers)"));
        assert!(prompt.contains("'tasks' (an ordered array of task objects)"));
        assert!(prompt.contains("User request: I need a Bluetooth antenna."));
        assert!(prompt.ends_with("Return ONLY the JSON (no markdown, no code fences)."));
        assert!(!prompt.contains("Request-ID"));
        assert!(!prompt.contains("Frequencies mentioned"));
    }

    #[test]
    fn test_prompt_lists_workflow_in_order() {
        let intent = IntentParser::new().parse("patch at 2.4 GHz");
        let prompt = DesignPrompt::new(&intent).render();

        let positions: Vec<usize> = WORKFLOW
            .iter()
            .map(|s| prompt.find(&format!(") {}:", s.name)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.contains("Frequencies mentioned (Hz): 2400000000"));
        assert!(prompt.contains("Antenna family mentioned: patch"));
    }

    #[test]
    fn test_request_id_is_first_line() {
        let intent = IntentParser::new().parse("dipole");
        let prompt = DesignPrompt::build(&intent, Some("req-7"));
        assert_eq!(prompt.lines().next(), Some("Request-ID: req-7"));
    }
}
