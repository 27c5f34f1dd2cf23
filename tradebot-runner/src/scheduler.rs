//! Named-job background scheduler.
//!
//! A plain thread, not an async runtime: cycles are seconds of blocking work
//! every half hour or more, so a runtime buys nothing. Jobs are registered
//! under a name, run once on the next tick and then on their own interval.
//! Job errors are logged and the schedule keeps going; only a stop request
//! ends the loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tradebot_core::data::Interval;
use tracing::{error, info};

/// Tick granularity; bounds both job-start latency and stop latency.
const TICK: Duration = Duration::from_millis(50);

/// Parse scheduling shorthand ("30m", "1h", "1d", bare hours) to a duration.
pub fn parse_every(s: &str) -> anyhow::Result<Duration> {
    let interval: Interval = s
        .parse()
        .map_err(|e: String| anyhow::anyhow!("bad schedule interval: {e}"))?;
    Ok(Duration::from_secs(interval.seconds()))
}

struct Job {
    name: String,
    every: Duration,
    next_run: Instant,
    task: Box<dyn FnMut() -> anyhow::Result<()> + Send>,
}

/// Fixed-tick scheduler over a named-job registry. Jobs can be added and
/// removed while the worker thread is running.
#[derive(Default)]
pub struct Scheduler {
    jobs: Arc<Mutex<Vec<Job>>>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `task` under `name`, replacing any existing job with that
    /// name. The first run happens on the next tick, then every `every`.
    pub fn add<F>(&self, name: impl Into<String>, every: Duration, task: F)
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        let name = name.into();
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        jobs.retain(|j| j.name != name);
        jobs.push(Job {
            name,
            every,
            next_run: Instant::now(),
            task: Box::new(task),
        });
    }

    /// Drop the job named `name`. Returns whether it existed.
    pub fn remove(&self, name: &str) -> bool {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        let before = jobs.len();
        jobs.retain(|j| j.name != name);
        jobs.len() < before
    }

    /// Registered job names, in registration order.
    pub fn job_names(&self) -> Vec<String> {
        self.jobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|j| j.name.clone())
            .collect()
    }

    /// Spawn the tick loop. Calling `start` on a running scheduler is a
    /// no-op.
    pub fn start(&mut self) {
        if self.worker.is_some() {
            return;
        }
        self.stop.store(false, Ordering::Relaxed);
        let jobs = Arc::clone(&self.jobs);
        let stop = Arc::clone(&self.stop);

        self.worker = Some(thread::spawn(move || {
            info!("scheduler started");
            while !stop.load(Ordering::Relaxed) {
                {
                    let mut jobs = jobs.lock().unwrap_or_else(|e| e.into_inner());
                    let now = Instant::now();
                    for job in jobs.iter_mut() {
                        if now < job.next_run {
                            continue;
                        }
                        if let Err(e) = (job.task)() {
                            error!(job = %job.name, error = %e, "scheduled job failed");
                        }
                        job.next_run = Instant::now() + job.every;
                    }
                }
                thread::sleep(TICK);
            }
            info!("scheduler stopping");
        }));
    }

    /// Request a stop and wait for the worker to finish its current tick.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn parse_every_accepts_the_shorthand() {
        assert_eq!(parse_every("30m").unwrap(), Duration::from_secs(1800));
        assert_eq!(parse_every("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_every("1d").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_every("2").unwrap(), Duration::from_secs(7200));
        assert!(parse_every("nope").is_err());
    }

    #[test]
    fn job_runs_promptly_and_repeats() {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&runs);
        let mut scheduler = Scheduler::new();
        scheduler.add("counter", Duration::from_millis(30), move || {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });
        scheduler.start();
        thread::sleep(Duration::from_millis(200));
        scheduler.stop();
        assert!(runs.load(Ordering::Relaxed) >= 2);
    }

    #[test]
    fn a_failing_job_does_not_kill_the_schedule() {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&runs);
        let mut scheduler = Scheduler::new();
        scheduler.add("boom", Duration::from_millis(20), move || {
            counter.fetch_add(1, Ordering::Relaxed);
            anyhow::bail!("boom")
        });
        scheduler.start();
        thread::sleep(Duration::from_millis(150));
        scheduler.stop();
        assert!(runs.load(Ordering::Relaxed) >= 2);
    }

    #[test]
    fn jobs_are_listed_replaced_and_removed_by_name() {
        let scheduler = Scheduler::new();
        scheduler.add("monitor", Duration::from_secs(60), || Ok(()));
        scheduler.add("retrain", Duration::from_secs(3600), || Ok(()));
        assert_eq!(scheduler.job_names(), vec!["monitor", "retrain"]);

        // re-adding replaces rather than duplicating
        scheduler.add("monitor", Duration::from_secs(30), || Ok(()));
        assert_eq!(scheduler.job_names().len(), 2);

        assert!(scheduler.remove("monitor"));
        assert!(!scheduler.remove("monitor"));
        assert_eq!(scheduler.job_names(), vec!["retrain"]);
    }

    #[test]
    fn removed_job_stops_running() {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&runs);
        let mut scheduler = Scheduler::new();
        scheduler.add("counter", Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });
        scheduler.start();
        thread::sleep(Duration::from_millis(100));
        scheduler.remove("counter");
        thread::sleep(Duration::from_millis(60));
        let frozen = runs.load(Ordering::Relaxed);
        thread::sleep(Duration::from_millis(100));
        scheduler.stop();
        assert_eq!(runs.load(Ordering::Relaxed), frozen);
    }

    #[test]
    fn stop_is_prompt_even_with_a_long_interval() {
        let mut scheduler = Scheduler::new();
        scheduler.add("hourly", Duration::from_secs(3600), || Ok(()));
        scheduler.start();
        let started = Instant::now();
        thread::sleep(Duration::from_millis(20));
        scheduler.stop();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!scheduler.is_running());
    }
}
