//! Named recurring jobs.
//!
//! At most one timer exists per job name: scheduling a name that is already
//! running aborts the old timer before the new one is spawned, under the same
//! lock. Manual runs are spawned next to the timers and never awaited by the caller.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use ab_core::{Error, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::job::{BlogJob, GenerateOptions};
use crate::logging::Logger;

pub const BLOG_GENERATION_JOB: &str = "blogGeneration";

pub type JobTask = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Interval such as `30s`, `15m`, `6h`, `1d` or `1h30m`. A bare number is seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

/// Longest accepted interval (365 days).
const MAX_INTERVAL_SECS: u64 = 365 * 86400;

impl FromStr for HumanDuration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_number = false;

        for c in s.trim().chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
                continue;
            }
            if c.is_whitespace() {
                continue;
            }
            let num: u64 = current_number
                .parse()
                .map_err(|_| Error::Schedule(format!("Invalid interval expression: {}", s)))?;
            let unit = match c {
                's' => 1,
                'm' => 60,
                'h' => 3600,
                'd' => 86400,
                _ => return Err(Error::Schedule(format!("Invalid duration unit: {}", c))),
            };
            total_seconds = num
                .checked_mul(unit)
                .and_then(|seconds| total_seconds.checked_add(seconds))
                .ok_or_else(|| Error::Schedule(format!("Interval too large: {}", s)))?;
            current_number.clear();
            has_number = true;
        }

        if !current_number.is_empty() {
            let seconds = current_number
                .parse::<u64>()
                .map_err(|_| Error::Schedule(format!("Invalid interval expression: {}", s)))?;
            total_seconds = total_seconds
                .checked_add(seconds)
                .ok_or_else(|| Error::Schedule(format!("Interval too large: {}", s)))?;
            has_number = true;
        }

        if !has_number {
            return Err(Error::Schedule(format!("Invalid interval expression: {:?}", s)));
        }
        if total_seconds == 0 {
            return Err(Error::Schedule("Interval must be greater than zero".to_string()));
        }
        if total_seconds > MAX_INTERVAL_SECS {
            return Err(Error::Schedule(format!("Interval too large: {}", s)));
        }
        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut secs = self.0.as_secs();
        for (unit, size) in [("d", 86400), ("h", 3600), ("m", 60)] {
            if secs >= size {
                write!(f, "{}{}", secs / size, unit)?;
                secs %= size;
            }
        }
        if secs > 0 || self.0.as_secs() == 0 {
            write!(f, "{}s", secs)?;
        }
        Ok(())
    }
}

/// Immediate answer to a "run now" request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub success: bool,
    pub message: String,
}

#[derive(Default)]
struct Registry {
    tasks: HashMap<String, JobTask>,
    timers: HashMap<String, JoinHandle<()>>,
}

/// Owns every job timer. Dropping the scheduler aborts them.
#[derive(Default)]
pub struct Scheduler {
    registry: Mutex<Registry>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("scheduled", &self.scheduled_jobs())
            .finish()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register_job(&self, name: impl Into<String>, task: JobTask) {
        self.registry().tasks.insert(name.into(), task);
    }

    /// Starts running `name` every `every`, replacing any timer already running under that name.
    /// The first run happens one interval from now.
    pub fn schedule_job(&self, name: &str, every: Duration) -> Result<()> {
        if every.is_zero() {
            return Err(Error::Schedule("Interval must be greater than zero".to_string()));
        }

        let mut registry = self.registry();
        let task = registry
            .tasks
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Job {}", name)))?;

        if let Some(previous) = registry.timers.remove(name) {
            previous.abort();
            tracing::info!("Stopped previous schedule for job: {}", name);
        }

        let log = Logger::new().with_prefix(format!("[{}]", name));
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                log.info("Running scheduled job");
                if let Err(e) = task().await {
                    log.error(&format!("Scheduled run failed: {}", e));
                }
            }
        });
        registry.timers.insert(name.to_string(), handle);
        tracing::info!("⏰ Scheduled job {} every {}", name, HumanDuration(every));
        Ok(())
    }

    pub fn stop_job(&self, name: &str) -> bool {
        match self.registry().timers.remove(name) {
            Some(handle) => {
                handle.abort();
                tracing::info!("Stopped job: {}", name);
                true
            }
            None => false,
        }
    }

    pub fn stop_all(&self) {
        for (name, handle) in self.registry().timers.drain() {
            handle.abort();
            tracing::info!("Stopped job: {}", name);
        }
    }

    pub fn is_scheduled(&self, name: &str) -> bool {
        self.registry().timers.contains_key(name)
    }

    pub fn scheduled_jobs(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry().timers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Runs a registered job once in the background, outside its schedule.
    pub fn spawn_job(&self, name: &str) -> Result<JoinHandle<()>> {
        let task = self
            .registry()
            .tasks
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Job {}", name)))?;

        let log = Logger::new().with_prefix(format!("[{}]", name)).with_prefix("[manual]");
        Ok(tokio::spawn(async move {
            log.info("Running job now");
            match task().await {
                Ok(()) => log.info("Manual run finished"),
                Err(e) => log.error(&format!("Manual run failed: {}", e)),
            }
        }))
    }

    pub fn run_job_now(&self, name: &str) -> Acknowledgement {
        match self.spawn_job(name) {
            Ok(_) => Acknowledgement {
                success: true,
                message: format!("Job {} started", name),
            },
            Err(e) => Acknowledgement {
                success: false,
                message: e.to_string(),
            },
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop_all();
    }
}

/// Periodic generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub enabled: bool,
    pub interval: String,
    pub options: GenerateOptions,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: "6h".to_string(),
            options: GenerateOptions::default(),
        }
    }
}

/// One pipeline run per invocation; a failure envelope becomes an `Err` for the scheduler to log.
pub fn blog_generation_task(job: Arc<BlogJob>, options: GenerateOptions) -> JobTask {
    Arc::new(move || {
        let job = job.clone();
        let options = options.clone();
        async move {
            let log = Logger::new().with_prefix(format!("[{}]", BLOG_GENERATION_JOB));
            let outcome = job.generate_and_publish_with(&options, &log).await;
            if outcome.success {
                Ok(())
            } else {
                Err(Error::Generation(outcome.error.unwrap_or(outcome.message)))
            }
        }
        .boxed()
    })
}

/// Registers the generation job and, when enabled, schedules it.
/// Returns whether a timer was started; an invalid interval is logged and nothing is scheduled.
pub fn start_scheduler(scheduler: &Scheduler, job: Arc<BlogJob>, config: &ScheduleConfig) -> bool {
    scheduler.register_job(BLOG_GENERATION_JOB, blog_generation_task(job, config.options.clone()));

    if !config.enabled {
        tracing::info!("Scheduler disabled");
        return false;
    }

    let every = match config.interval.parse::<HumanDuration>() {
        Ok(every) => every,
        Err(e) => {
            tracing::error!("Not starting scheduler: {}", e);
            return false;
        }
    };

    match scheduler.schedule_job(BLOG_GENERATION_JOB, every.0) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Not starting scheduler: {}", e);
            false
        }
    }
}
