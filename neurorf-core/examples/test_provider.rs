//! Example: Send the design prompt to a real model and validate the answer
//!
//! Run with:
//!   # Use Gemini (GOOGLE_API_KEY from env or .env):
//!   cargo run --example test_provider
//!
//!   # Use OpenAI:
//!   OPENAI_API_KEY=sk-xxx cargo run --example test_provider -- --openai
//!
//!   # Just output the prompt:
//!   cargo run --example test_provider -- --prompt-only

use neurorf_core::config::{self, Overrides, Settings};
use neurorf_core::{
    ChatMessage, CompletionRequest, DesignPrompt, GeminiProvider,
    IntentParser, LlmProvider, ModelResponse, OpenAIProvider, ProviderType,
};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let use_openai = args.iter().any(|arg| arg == "--openai");
    let prompt_only = args.iter().any(|arg| arg == "--prompt-only");

    let intent = IntentParser::new().parse("Design a microstrip patch antenna for 2.4 GHz WiFi");
    let prompt = DesignPrompt::new(&intent).with_request_id(Some("example-1"));

    if prompt_only {
        println!("=== SYSTEM PROMPT ===\n{}\n", prompt.system());
        println!("=== USER PROMPT ===\n{}", prompt.render());
        return Ok(());
    }

    config::load_env(None)?;
    let overrides = Overrides {
        provider: use_openai.then_some(ProviderType::OpenAI),
        model: None,
    };
    let settings = Settings::from_env_with(&overrides)?;

    let request = CompletionRequest::new(vec![
        ChatMessage::system(prompt.system()),
        ChatMessage::user(prompt.render()),
    ])
    .with_temperature(settings.temperature)
    .with_json_mode(true);

    let response = match settings.provider {
        ProviderType::Gemini => GeminiProvider::new(settings.provider_config())?.complete(request).await?,
        ProviderType::OpenAI => OpenAIProvider::new(settings.provider_config())?.complete(request).await?,
    };

    println!("Model: {}", response.model);
    println!("Tokens: {}", response.usage.total_tokens);

    let content = response.content.unwrap_or_default();
    println!("\n=== RAW RESPONSE ===\n{}\n", content);

    match ModelResponse::from_reply(&content) {
        Ok(spec) => {
            println!("Valid response: {} at {:?} Hz", spec.antenna_type(), spec.frequencies_hz());
            println!("Tasks: {}", spec.tasks().len());
        }
        Err(e) => println!("Invalid response: {:?}", e),
    }

    Ok(())
}
