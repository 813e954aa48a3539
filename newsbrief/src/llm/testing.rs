// In-process provider for engine and orchestrator tests.
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::{LlmProvider, LlmRequest, LlmResponse, SummarizeRequest};

pub(crate) enum ChatBehavior {
    Fail,
    Reply(String),
    /// Echo the raw summary back as the first bullet of the requested style
    WellFormed,
}

pub(crate) struct StubProvider {
    /// Models absent from the map fail
    summaries: HashMap<String, String>,
    chat: ChatBehavior,
    /// Summarize calls whose input contains the key sleep first
    delays: Vec<(String, Duration)>,
    calls: Mutex<Vec<String>>,
    inputs: Mutex<Vec<String>>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self {
            summaries: HashMap::new(),
            chat: ChatBehavior::Fail,
            delays: Vec::new(),
            calls: Mutex::new(Vec::new()),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn with_summary(mut self, model: &str, text: &str) -> Self {
        self.summaries.insert(model.to_string(), text.to_string());
        self
    }

    pub fn with_chat(mut self, chat: ChatBehavior) -> Self {
        self.chat = chat;
        self
    }

    pub fn with_delay(mut self, input_contains: &str, delay: Duration) -> Self {
        self.delays.push((input_contains.to_string(), delay));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

fn well_formed_reply(request: &LlmRequest) -> String {
    let system = &request.messages[0].content;
    let user = &request.messages[1].content;
    let raw = user.rsplit("Raw Summary: ").next().unwrap_or_default();

    if system.contains("CEO") {
        format!(
            "• Headline: Executive headline\n• Why it matters: {}\n• Strategic implication: Plan accordingly.",
            raw
        )
    } else {
        format!(
            "• What happened: {}\n• Why it's interesting: It is new.\n• What this unlocks: More builders.",
            raw
        )
    }
}

#[async_trait::async_trait]
impl LlmProvider for StubProvider {
    async fn summarize(&self, request: SummarizeRequest) -> Result<String> {
        self.calls.lock().unwrap().push(format!("summarize:{}", request.model));
        self.inputs.lock().unwrap().push(request.inputs.clone());

        let delay = self
            .delays
            .iter()
            .find(|(needle, _)| request.inputs.contains(needle.as_str()))
            .map(|(_, d)| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.summaries.get(&request.model) {
            Some(text) => Ok(text.clone()),
            None => anyhow::bail!("model {} is unavailable", request.model),
        }
    }

    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.calls.lock().unwrap().push(format!("generate:{}", request.model));

        let content = match &self.chat {
            ChatBehavior::Fail => anyhow::bail!("LLM API error 503 Service Unavailable"),
            ChatBehavior::Reply(text) => text.clone(),
            ChatBehavior::WellFormed => well_formed_reply(&request),
        };

        Ok(LlmResponse {
            content,
            model: request.model,
        })
    }
}
