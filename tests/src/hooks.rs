use async_trait::async_trait;
use parking_lot::Mutex;
use skillkit_kernel::{BoxError, LifecycleHook, LoadConfig, SkillContext};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared, ordered record of lifecycle calls.
///
/// Entries look like `load:<id>` and `unload:<id>`; every hook created from the same log
/// appends to it, so tests can assert activation order across a dependency graph.
#[derive(Debug, Clone, Default)]
pub struct LoadLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl LoadLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook for `skill_id` that records into this log.
    pub fn hook(&self, skill_id: &str) -> RecordingHook {
        RecordingHook {
            skill_id: skill_id.to_string(),
            log: self.clone(),
            fail_load: Arc::new(AtomicBool::new(false)),
            fail_unload: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Ids whose load hook ran, in call order.
    pub fn loads(&self) -> Vec<String> {
        self.with_prefix("load:")
    }

    /// Ids whose unload hook ran, in call order.
    pub fn unloads(&self) -> Vec<String> {
        self.with_prefix("unload:")
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn push(&self, entry: String) {
        self.entries.lock().push(entry);
    }

    fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter_map(|e| e.strip_prefix(prefix).map(str::to_string))
            .collect()
    }
}

/// Lifecycle hook that records calls and can be told to fail.
///
/// Clones share the failure switches, so a test can keep a handle after moving the hook into
/// a skill builder.
#[derive(Debug, Clone)]
pub struct RecordingHook {
    skill_id: String,
    log: LoadLog,
    fail_load: Arc<AtomicBool>,
    fail_unload: Arc<AtomicBool>,
}

impl RecordingHook {
    /// Make subsequent `on_load` calls fail. A failing call is still recorded.
    pub fn set_fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `on_unload` calls fail. A failing call is still recorded.
    pub fn set_fail_unload(&self, fail: bool) {
        self.fail_unload.store(fail, Ordering::SeqCst);
    }

    pub fn failing_load(self) -> Self {
        self.set_fail_load(true);
        self
    }
}

#[async_trait]
impl LifecycleHook for RecordingHook {
    async fn on_load(&self, _ctx: &SkillContext, _config: &LoadConfig) -> Result<(), BoxError> {
        self.log.push(format!("load:{}", self.skill_id));
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(format!("injected load failure in {}", self.skill_id).into());
        }
        Ok(())
    }

    async fn on_unload(&self, _ctx: &SkillContext) -> Result<(), BoxError> {
        self.log.push(format!("unload:{}", self.skill_id));
        if self.fail_unload.load(Ordering::SeqCst) {
            return Err(format!("injected unload failure in {}", self.skill_id).into());
        }
        Ok(())
    }
}
