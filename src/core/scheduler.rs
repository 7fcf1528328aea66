use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info};

use crate::core::cache::ResultCache;

/// Periodic removal of expired cache entries. Dropping the handle does not stop
/// the job; call `shutdown`.
pub struct CacheSweeper {
    sched: JobScheduler,
}

impl CacheSweeper {
    pub async fn start<V>(cache: Arc<ResultCache<V>>, every: Duration) -> Result<Self, anyhow::Error>
    where
        V: Clone + Send + Sync + 'static,
    {
        let sched = JobScheduler::new().await?;

        sched
            .add(Job::new_repeated_async(every, move |_uuid, _l| {
                let cache = cache.clone();
                Box::pin(async move {
                    let removed = cache.purge_expired();
                    if removed > 0 {
                        debug!(removed, remaining = cache.len(), "Swept expired cache entries");
                    }
                })
            })?)
            .await?;

        sched.start().await?;
        info!(interval_secs = every.as_secs(), "Cache sweeper started");
        Ok(Self { sched })
    }

    pub async fn shutdown(mut self) -> Result<(), anyhow::Error> {
        self.sched.shutdown().await?;
        info!("Cache sweeper stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_sweeper_removes_expired_entries() {
        let cache = Arc::new(ResultCache::new());
        cache.set("stale", 1_u8, Duration::ZERO);
        cache.set("fresh", 2_u8, Duration::from_secs(3600));

        let sweeper = CacheSweeper::start(cache.clone(), Duration::from_secs(1))
            .await
            .unwrap();

        let mut swept = false;
        for _ in 0..50 {
            if cache.len() == 1 {
                swept = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        sweeper.shutdown().await.unwrap();

        assert!(swept, "expired entry was never swept");
        assert_eq!(cache.get("fresh"), Some(2));
    }
}
