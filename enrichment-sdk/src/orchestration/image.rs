//! Poster generation orchestration

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::polling::{timed_out, until_deadline, JobPoller, PollPolicy};
use super::with_access_token;
use crate::auth::TokenManager;
use crate::core::{Clock, GenerationOutcome, ImageGenerate, ProviderId, SystemClock};
use crate::error::{Result, TimeoutCause};
use crate::models::{GenerationJob, JobStatus, PosterImage, PosterRequest};
use crate::util::generate_request_id;

/// Outcome of a successful poster generation
#[derive(Debug, Clone)]
pub struct PosterGeneration {
    pub provider: ProviderId,
    pub prompt: String,
    pub image: PosterImage,
    /// Terminal job snapshot
    pub job: GenerationJob,
}

pub struct ImageGenerationOrchestrator {
    adapter: Arc<dyn ImageGenerate>,
    tokens: Arc<TokenManager>,
    clock: Arc<dyn Clock>,
    policy: PollPolicy,
}

impl ImageGenerationOrchestrator {
    pub fn new(adapter: Arc<dyn ImageGenerate>, tokens: Arc<TokenManager>) -> Self {
        Self {
            adapter,
            tokens,
            clock: Arc::new(SystemClock),
            policy: PollPolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn provider(&self) -> ProviderId {
        self.adapter.provider()
    }

    /// Caller hint verbatim, otherwise the adapter's own phrasing
    pub fn compose_prompt(&self, request: &PosterRequest) -> String {
        match request.image_hint() {
            Some(hint) => hint.to_string(),
            None => self.adapter.synthesize_prompt(request),
        }
    }

    /// Generate a poster, polling async providers until `deadline` at most
    pub async fn generate(
        &self,
        request: PosterRequest,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<PosterGeneration> {
        let request = request.validate()?;
        let provider = self.adapter.provider();
        let prompt = self.compose_prompt(&request);
        let adapter = self.adapter.as_ref();

        log::info!("Generating poster for '{}' via {}", request.title, provider);

        let mut job = GenerationJob::submitted(generate_request_id(), provider, self.clock.now());

        let submit = with_access_token(&self.tokens, provider, |token| {
            let prompt = prompt.as_str();
            async move { adapter.generate(prompt, token.as_ref()).await }
        });
        let outcome = match until_deadline(self.clock.as_ref(), deadline, submit).await {
            Some(outcome) => outcome?,
            None => return Err(timed_out(&mut job, TimeoutCause::Deadline)),
        };

        let image = match outcome {
            GenerationOutcome::Sync(image) => {
                job.status = JobStatus::Done;
                job.result = Some(image.clone());
                image
            }
            GenerationOutcome::Async(handle) => {
                job.id = handle.job_id.clone();
                JobPoller::new(adapter, &self.tokens, self.clock.as_ref(), self.policy)
                    .run(&handle, &mut job, deadline)
                    .await?
            }
        };

        Ok(PosterGeneration {
            provider,
            prompt,
            image,
            job,
        })
    }
}
