//! Mock ports shared by the use case tests

use crate::ports::evaluation_logger::{EvaluationEvent, EvaluationLogger};
use crate::ports::model_invoker::{InvocationReply, InvokerError, ModelInvoker, ModelPrompt};
use crate::ports::project_store::{ProjectStore, StoreError};
use async_trait::async_trait;
use stagegate_domain::{ProjectSnapshot, TokenUsage};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub(crate) fn backends(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

/// What a scripted backend does when invoked
#[derive(Debug, Clone)]
pub(crate) enum Script {
    Reply { content: String, cost: f64 },
    Fail(String),
    /// Replies after sleeping
    Delayed { delay: Duration, content: String },
    /// Never answers within a test's lifetime
    Hang,
}

impl Script {
    pub(crate) fn reply(content: &str, cost: f64) -> Self {
        Script::Reply {
            content: content.to_string(),
            cost,
        }
    }
}

/// Mock invoker answering per backend id
pub(crate) struct ScriptedInvoker {
    scripts: HashMap<String, Script>,
    /// Backend ids in invocation order
    pub(crate) calls: Mutex<Vec<String>>,
}

impl ScriptedInvoker {
    pub(crate) fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with(mut self, backend_id: &str, script: Script) -> Self {
        self.scripts.insert(backend_id.to_string(), script);
        self
    }
}

#[async_trait]
impl ModelInvoker for ScriptedInvoker {
    async fn invoke(
        &self,
        _prompt: &ModelPrompt,
        backend_id: &str,
        _temperature: f64,
        _max_tokens: u32,
    ) -> Result<InvocationReply, InvokerError> {
        self.calls.lock().unwrap().push(backend_id.to_string());
        let script = self.scripts.get(backend_id).cloned();
        match script {
            Some(Script::Reply { content, cost }) => Ok(InvocationReply {
                content,
                usage: TokenUsage::new(100, 50),
                cost,
                model: format!("{}-model", backend_id),
            }),
            Some(Script::Fail(e)) => Err(InvokerError::RequestFailed(e)),
            Some(Script::Delayed { delay, content }) => {
                tokio::time::sleep(delay).await;
                Ok(InvocationReply {
                    content,
                    usage: TokenUsage::new(100, 50),
                    cost: 0.0,
                    model: format!("{}-model", backend_id),
                })
            }
            Some(Script::Hang) => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(InvokerError::Timeout)
            }
            None => Err(InvokerError::BackendUnavailable(backend_id.to_string())),
        }
    }
}

/// Mock project store keeping documents in memory
#[derive(Default)]
pub(crate) struct InMemoryProjectStore {
    pub(crate) projects: Mutex<HashMap<String, ProjectSnapshot>>,
    pub(crate) saves: Mutex<usize>,
}

impl InMemoryProjectStore {
    pub(crate) fn with_project(project: ProjectSnapshot) -> Self {
        let store = Self::default();
        store
            .projects
            .lock()
            .unwrap()
            .insert(project.id.clone(), project);
        store
    }

    pub(crate) fn get(&self, id: &str) -> Option<ProjectSnapshot> {
        self.projects.lock().unwrap().get(id).cloned()
    }

    pub(crate) fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn load(&self, project_id: &str) -> Result<ProjectSnapshot, StoreError> {
        self.get(project_id)
            .ok_or_else(|| StoreError::NotFound(project_id.to_string()))
    }

    async fn save(&self, project: &ProjectSnapshot) -> Result<(), StoreError> {
        *self.saves.lock().unwrap() += 1;
        self.projects
            .lock()
            .unwrap()
            .insert(project.id.clone(), project.clone());
        Ok(())
    }
}

/// Logger recording event types
#[derive(Default)]
pub(crate) struct RecordingLogger {
    pub(crate) events: Mutex<Vec<(&'static str, serde_json::Value)>>,
}

impl RecordingLogger {
    pub(crate) fn types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

impl EvaluationLogger for RecordingLogger {
    fn log(&self, event: EvaluationEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type, event.payload));
    }
}
