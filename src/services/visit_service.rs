// src/services/visit_service.rs
// DOCUMENTATION: IP visit logger
// PURPOSE: Record who hit the IP endpoint, with a per-IP rate limit

use crate::db::IpVisitRepository;
use crate::errors::AppError;
use crate::models::{IpVisit, IpVisitResponse, NewIpVisit, MAX_VISIT_LIMIT};
use crate::services::LocalClock;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use sqlx::SqlitePool;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Limiter checks between two sweeps of idle per-IP entries
pub const LIMITER_SWEEP_EVERY: usize = 256;

#[derive(Clone)]
pub struct VisitService {
    pool: SqlitePool,
    clock: LocalClock,
    limiter: Arc<DefaultKeyedRateLimiter<String>>,
    checks: Arc<AtomicUsize>,
}

impl VisitService {
    /// `per_minute` of 0 is treated as 1
    pub fn new(pool: SqlitePool, clock: LocalClock, per_minute: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));
        Self {
            pool,
            clock,
            limiter: Arc::new(RateLimiter::keyed(quota)),
            checks: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Drop limiter entries whose quota has fully replenished
    /// DOCUMENTATION: Keys come from client headers, so the map is swept
    /// every LIMITER_SWEEP_EVERY checks to keep it bounded by recent traffic
    pub fn sweep_limiter(&self) {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        log::debug!(
            "Rate limiter sweep: {} -> {} tracked IPs",
            before,
            self.limiter.len()
        );
    }

    /// Rate-limit, store the visit and report the running count for the IP
    pub async fn record_visit(&self, visit: NewIpVisit) -> Result<IpVisitResponse, AppError> {
        if (self.checks.fetch_add(1, Ordering::Relaxed) + 1) % LIMITER_SWEEP_EVERY == 0 {
            self.sweep_limiter();
        }

        if self.limiter.check_key(&visit.ip).is_err() {
            log::warn!("Rate limit exceeded for {}", visit.ip);
            return Err(AppError::RateLimitExceeded);
        }

        let visited_at = self.clock.now_string();
        let stored = IpVisitRepository::record(&self.pool, &visit, &visited_at).await?;
        let visit_count = IpVisitRepository::count_for_ip(&self.pool, &stored.ip).await?;

        log::info!("Visit from {} ({} total)", stored.ip, visit_count);

        Ok(IpVisitResponse {
            ip: stored.ip,
            visited_at: stored.visited_at,
            visit_count,
        })
    }

    pub async fn recent_visits(&self, limit: i64) -> Result<Vec<IpVisit>, AppError> {
        IpVisitRepository::recent(&self.pool, limit.clamp(1, MAX_VISIT_LIMIT)).await
    }
}
