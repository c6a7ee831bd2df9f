//! In-process provider fakes shared by the orchestration tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::auth::TokenExchange;
use crate::core::{GenerationOutcome, ImageGenerate, PollStatus, ProviderId, TextLookup};
use crate::error::{Result, ServiceError, UpstreamFailure};
use crate::models::{AccessToken, AsyncHandle, ContentQuery, PosterImage, RawProviderResponse};

/// Token exchange that counts calls and hands out numbered tokens
pub struct CountingExchange {
    provider: ProviderId,
    pub calls: AtomicU32,
    delay: Duration,
    lifetime: chrono::Duration,
    failures: Mutex<VecDeque<ServiceError>>,
}

impl CountingExchange {
    pub fn new(provider: ProviderId) -> Self {
        Self {
            provider,
            calls: AtomicU32::new(0),
            delay: Duration::from_millis(0),
            lifetime: chrono::Duration::minutes(30),
            failures: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_lifetime(mut self, lifetime: chrono::Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn failing_once(self, error: ServiceError) -> Self {
        self.failures.lock().unwrap().push_back(error);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenExchange for CountingExchange {
    fn provider(&self) -> ProviderId {
        self.provider
    }

    async fn exchange(&self) -> Result<AccessToken> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(AccessToken::new(format!("token-{}", n), Utc::now() + self.lifetime))
    }
}

/// Text adapter answering from a script, recording the tokens it saw
pub struct ScriptedLookup {
    provider: ProviderId,
    script: Mutex<VecDeque<Result<String>>>,
    pub tokens_seen: Mutex<Vec<Option<String>>>,
}

impl ScriptedLookup {
    pub fn new(provider: ProviderId, script: Vec<Result<String>>) -> Self {
        Self {
            provider,
            script: Mutex::new(script.into()),
            tokens_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(provider: ProviderId, text: &str) -> Self {
        Self::new(provider, vec![Ok(text.to_string())])
    }

    pub fn calls(&self) -> usize {
        self.tokens_seen.lock().unwrap().len()
    }
}

#[async_trait]
impl TextLookup for ScriptedLookup {
    fn provider(&self) -> ProviderId {
        self.provider
    }

    async fn lookup(
        &self,
        _query: &ContentQuery,
        token: Option<&AccessToken>,
    ) -> Result<RawProviderResponse> {
        self.tokens_seen
            .lock()
            .unwrap()
            .push(token.map(|t| t.value().to_string()));

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(RawProviderResponse::new(self.provider, text)),
            Some(Err(e)) => Err(e),
            None => Err(ServiceError::upstream(
                self.provider,
                UpstreamFailure::Status,
                "script exhausted",
            )),
        }
    }
}

/// Image adapter with a scripted submit outcome and status sequence
pub struct ScriptedGenerator {
    provider: ProviderId,
    outcome: Mutex<Option<Result<GenerationOutcome>>>,
    statuses: Mutex<VecDeque<Result<PollStatus>>>,
    pub prompts: Mutex<Vec<String>>,
    pub checks: AtomicU32,
}

impl ScriptedGenerator {
    pub fn sync(provider: ProviderId, image: PosterImage) -> Self {
        Self::with_outcome(provider, Ok(GenerationOutcome::Sync(image)), Vec::new())
    }

    /// Async job answering `statuses` in order, then pending forever
    pub fn polling(provider: ProviderId, statuses: Vec<Result<PollStatus>>) -> Self {
        let handle = AsyncHandle {
            provider,
            job_id: "op-123".to_string(),
        };
        Self::with_outcome(provider, Ok(GenerationOutcome::Async(handle)), statuses)
    }

    pub fn with_outcome(
        provider: ProviderId,
        outcome: Result<GenerationOutcome>,
        statuses: Vec<Result<PollStatus>>,
    ) -> Self {
        Self {
            provider,
            outcome: Mutex::new(Some(outcome)),
            statuses: Mutex::new(statuses.into()),
            prompts: Mutex::new(Vec::new()),
            checks: AtomicU32::new(0),
        }
    }

    /// `pending` checks reporting not-done, then done with `image`
    pub fn pending_then_done(provider: ProviderId, pending: usize, image: PosterImage) -> Self {
        let mut statuses: Vec<Result<PollStatus>> =
            (0..pending).map(|_| Ok(PollStatus::Pending)).collect();
        statuses.push(Ok(PollStatus::Done(Some(image))));
        Self::polling(provider, statuses)
    }

    pub fn checks(&self) -> u32 {
        self.checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerate for ScriptedGenerator {
    fn provider(&self) -> ProviderId {
        self.provider
    }

    async fn generate(
        &self,
        prompt: &str,
        _token: Option<&AccessToken>,
    ) -> Result<GenerationOutcome> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.outcome
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(ServiceError::malformed(self.provider, "submitted twice")))
    }

    async fn check_status(
        &self,
        _handle: &AsyncHandle,
        _token: Option<&AccessToken>,
    ) -> Result<PollStatus> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(PollStatus::Pending))
    }
}

pub fn sample_image() -> PosterImage {
    PosterImage::base64("image/jpeg", "aGVsbG8=")
}

/// Async generator whose provider calls hang for `stall`
pub struct StallingGenerator {
    provider: ProviderId,
    stall: Duration,
    stall_on_submit: bool,
    pub checks: AtomicU32,
}

impl StallingGenerator {
    /// Submits at once, then every status check hangs
    pub fn on_check(provider: ProviderId, stall: Duration) -> Self {
        Self {
            provider,
            stall,
            stall_on_submit: false,
            checks: AtomicU32::new(0),
        }
    }

    /// The submit call itself hangs
    pub fn on_submit(provider: ProviderId, stall: Duration) -> Self {
        Self {
            stall_on_submit: true,
            ..Self::on_check(provider, stall)
        }
    }

    pub fn handle(&self) -> AsyncHandle {
        AsyncHandle {
            provider: self.provider,
            job_id: "op-stalled".to_string(),
        }
    }
}

#[async_trait]
impl ImageGenerate for StallingGenerator {
    fn provider(&self) -> ProviderId {
        self.provider
    }

    async fn generate(
        &self,
        _prompt: &str,
        _token: Option<&AccessToken>,
    ) -> Result<GenerationOutcome> {
        if self.stall_on_submit {
            tokio::time::sleep(self.stall).await;
        }
        Ok(GenerationOutcome::Async(self.handle()))
    }

    async fn check_status(
        &self,
        _handle: &AsyncHandle,
        _token: Option<&AccessToken>,
    ) -> Result<PollStatus> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.stall).await;
        Ok(PollStatus::Pending)
    }
}
