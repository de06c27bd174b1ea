//! Scripted adapter for exercising the pipeline without a backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::providers::{
    CompletionResponse, ProviderAdapter, ProviderError, ProviderRequest, TokenUsage,
};

/// Adapter that replays a fixed sequence of reply texts.
///
/// Each `invoke` records the request, bumps the call counter, and pops
/// the next scripted reply. An exhausted script or a `failing` adapter
/// returns a backend invocation error.
pub(crate) struct ScriptedAdapter {
    name: &'static str,
    replies: Mutex<VecDeque<String>>,
    last_request: Mutex<Option<ProviderRequest>>,
    calls: AtomicUsize,
    fail: bool,
}

impl ScriptedAdapter {
    pub(crate) fn new(name: &'static str, replies: &[&str]) -> Self {
        Self {
            name,
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            last_request: Mutex::new(None),
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    /// Adapter whose every call fails with a backend error.
    pub(crate) fn failing(name: &'static str) -> Self {
        Self {
            fail: true,
            ..Self::new(name, &[])
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_request(&self) -> Option<ProviderRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    async fn invoke(&self, request: ProviderRequest) -> Result<CompletionResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);

        if self.fail {
            return Err(ProviderError::invocation("scripted", "scripted failure"));
        }

        let text = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::invocation("script_exhausted", "no reply scripted"))?;

        Ok(CompletionResponse {
            text,
            model: "scripted-model".to_string(),
            usage: TokenUsage::default(),
            finish_reason: "stop".to_string(),
        })
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
