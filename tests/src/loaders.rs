use async_trait::async_trait;
use skillkit_kernel::{
    BoxError, InstructionsLoader, ResourcesLoader, SkillContext, SkillInstructions,
    SkillResources,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Loader that serves fixed Level-2 and Level-3 payloads and counts how often it is asked.
///
/// Clones share the counters.
#[derive(Debug, Clone, Default)]
pub struct CountingLoader {
    instructions: SkillInstructions,
    resources: SkillResources,
    delay: Option<Duration>,
    instruction_calls: Arc<AtomicUsize>,
    resource_calls: Arc<AtomicUsize>,
}

impl CountingLoader {
    pub fn new(instructions: SkillInstructions, resources: SkillResources) -> Self {
        Self {
            instructions,
            resources,
            ..Default::default()
        }
    }

    /// Sleep this long before answering, to widen race windows.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn instruction_calls(&self) -> usize {
        self.instruction_calls.load(Ordering::SeqCst)
    }

    pub fn resource_calls(&self) -> usize {
        self.resource_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl InstructionsLoader for CountingLoader {
    async fn load_instructions(
        &self,
        _ctx: &SkillContext,
        _skill_id: &str,
    ) -> Result<SkillInstructions, BoxError> {
        self.instruction_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Ok(self.instructions.clone())
    }
}

#[async_trait]
impl ResourcesLoader for CountingLoader {
    async fn load_resources(
        &self,
        _ctx: &SkillContext,
        _skill_id: &str,
    ) -> Result<SkillResources, BoxError> {
        self.resource_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Ok(self.resources.clone())
    }
}
