/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum concurrently processed requests (default: `4`).
    pub concurrency: usize,
    /// Standalone worker poll interval in seconds (default: `2`).
    pub poll_interval_secs: u64,
    /// How long shutdown waits for in-flight requests, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            poll_interval_secs: 2,
            shutdown_timeout_secs: 30,
        }
    }
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `WORKER_CONCURRENCY`        | `4`     |
    /// | `WORKER_POLL_INTERVAL_SECS` | `2`     |
    /// | `SHUTDOWN_TIMEOUT_SECS`     | `30`    |
    pub fn from_env() -> Self {
        let concurrency: usize = std::env::var("WORKER_CONCURRENCY")
            .unwrap_or_else(|_| "4".into())
            .parse()
            .expect("WORKER_CONCURRENCY must be a valid usize");

        let poll_interval_secs: u64 = std::env::var("WORKER_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("WORKER_POLL_INTERVAL_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            concurrency,
            poll_interval_secs,
            shutdown_timeout_secs,
        }
    }
}
