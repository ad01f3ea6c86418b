//! Scripted gateway and fixtures shared by use case tests

use crate::ports::agent_gateway::AgentGateway;
use crate::ports::progress::ProgressNotifier;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use udc_domain::{
    AgentCallResult, AgentId, AgentRole, AgentRoster, AgentSpec, CallErrorKind, ConversionResult,
    GateKind, GateVerdict, Message, PromptSet, prompt::REQUIRED_KEYS,
};

/// One canned reply
#[derive(Debug, Clone)]
pub enum Step {
    Reply(String),
    Fail(CallErrorKind, String),
    Delayed(Duration, String),
}

pub fn approve() -> Step {
    Step::Reply("<isvalid>true</isvalid><invalid_msg>looks right</invalid_msg>".to_string())
}

pub fn reject(reason: &str) -> Step {
    Step::Reply(format!("<isvalid>false</isvalid><invalid_msg>{reason}</invalid_msg>"))
}

pub fn output(payload: &str) -> Step {
    Step::Reply(format!("Here is the result:\n<output>{payload}</output>"))
}

/// `step`'s reply, answered after `delay`
pub fn delayed(step: Step, delay: Duration) -> Step {
    match step {
        Step::Reply(text) | Step::Delayed(_, text) => Step::Delayed(delay, text),
        fail => fail,
    }
}

pub fn timeout() -> Step {
    Step::Fail(CallErrorKind::Unreachable, "request timed out".to_string())
}

/// Gateway answering from per-agent scripts and logging every call
#[derive(Default)]
pub struct ScriptedGateway {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    calls: Mutex<Vec<(String, Vec<Message>)>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, agent: &str, steps: Vec<Step>) -> Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.entry(agent.to_string()).or_default().extend(steps);
        }
        self
    }

    /// Agent ids in call order
    pub fn called(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn calls_to(&self, agent: &str) -> usize {
        self.called().iter().filter(|id| *id == agent).count()
    }

    /// Most calls ever outstanding at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// User message of the `n`-th call to `agent`
    pub fn request_to(&self, agent: &str, n: usize) -> Option<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == agent)
            .nth(n)
            .and_then(|(_, messages)| messages.last().map(|m| m.content.clone()))
    }
}

#[async_trait]
impl AgentGateway for ScriptedGateway {
    async fn send(&self, agent: &AgentSpec, messages: &[Message]) -> AgentCallResult {
        self.calls
            .lock()
            .unwrap()
            .push((agent.id.to_string(), messages.to_vec()));
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(agent.id.as_str())
            .and_then(|s| s.pop_front());

        let result = match step {
            Some(Step::Reply(text)) => {
                AgentCallResult::success(agent.id.clone(), text, Duration::from_millis(5))
            }
            Some(Step::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                AgentCallResult::success(agent.id.clone(), text, delay)
            }
            Some(Step::Fail(kind, message)) => {
                AgentCallResult::failure(agent.id.clone(), kind, message, Duration::from_millis(5))
            }
            None => panic!("no scripted reply left for {}", agent.id),
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Progress notifier collecting events as strings
#[derive(Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressNotifier for RecordingProgress {
    fn on_gate_start(&self, gate: GateKind, panel_size: usize) {
        self.events.lock().unwrap().push(format!("start {gate} {panel_size}"));
    }

    fn on_agent_complete(&self, _gate: Option<GateKind>, agent: &AgentId, success: bool) {
        self.events.lock().unwrap().push(format!("agent {agent} {success}"));
    }

    fn on_gate_complete(&self, verdict: &GateVerdict) {
        self.events
            .lock()
            .unwrap()
            .push(format!("done {} {}", verdict.gate, verdict.final_approved));
    }

    fn on_attempt_start(&self, attempt: usize, max_attempts: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("attempt {attempt}/{max_attempts}"));
    }

    fn on_run_complete(&self, result: &ConversionResult) {
        self.events
            .lock()
            .unwrap()
            .push(format!("finished {}", result.succeeded));
    }
}

pub fn agent(role: AgentRole, index: usize) -> AgentSpec {
    AgentSpec::new(AgentId::for_role(role, index), format!("{role}-{index}"), role)
        .with_model("test-model")
}

pub fn roster(verifiers: usize, validators: usize) -> AgentRoster {
    AgentRoster::new(
        (0..verifiers).map(|i| agent(AgentRole::Verify, i)).collect(),
        agent(AgentRole::Convert, 0),
        (0..validators).map(|i| agent(AgentRole::Validate, i)).collect(),
    )
}

pub fn prompts() -> PromptSet {
    REQUIRED_KEYS
        .iter()
        .fold(PromptSet::new(), |set, key| set.with(key, format!("{key}: {{<!--Data-->}}")))
        .with(
            "conversion-request",
            "Attempt {<!--RunIndex-->}\nNotes: {<!--PreviousConversionNotes-->}\n{<!--Data-->}",
        )
        .with("validation-request", "Input {<!--Data-->}\nOutput {<!--Output-->}")
}
