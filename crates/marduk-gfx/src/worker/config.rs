/// Environment variable overriding [`WorkerConfig::queue_capacity`].
pub const QUEUE_CAPACITY_ENV: &str = "MARDUK_GFX_QUEUE_CAPACITY";

/// Context worker configuration.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WorkerConfig {
    /// Number of commands that may wait in the queue before producers block.
    pub queue_capacity: u16,

    /// OS thread name of the worker; shows up in logs and debuggers.
    pub thread_name: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            thread_name: "marduk-gfx".to_string(),
        }
    }
}

impl WorkerConfig {
    pub fn with_queue_capacity(mut self, capacity: u16) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Applies [`QUEUE_CAPACITY_ENV`] if set. Unparsable or zero values are
    /// logged and ignored.
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(QUEUE_CAPACITY_ENV) {
            Ok(raw) => self.with_capacity_override(&raw),
            Err(_) => self,
        }
    }

    fn with_capacity_override(mut self, raw: &str) -> Self {
        match raw.trim().parse::<u16>() {
            Ok(capacity) if capacity > 0 => {
                log::debug!("{QUEUE_CAPACITY_ENV}={capacity}");
                self.queue_capacity = capacity;
            }
            _ => log::warn!("ignoring invalid {QUEUE_CAPACITY_ENV} value {raw:?}"),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = WorkerConfig::default();
        assert_eq!(c.queue_capacity, 256);
        assert_eq!(c.thread_name, "marduk-gfx");
    }

    #[test]
    fn capacity_override_accepts_valid_values_only() {
        let base = WorkerConfig::default().with_queue_capacity(8);
        assert_eq!(base.clone().with_capacity_override(" 32 ").queue_capacity, 32);
        assert_eq!(base.clone().with_capacity_override("0").queue_capacity, 8);
        assert_eq!(base.clone().with_capacity_override("70000").queue_capacity, 8);
        assert_eq!(base.with_capacity_override("many").queue_capacity, 8);
    }
}
