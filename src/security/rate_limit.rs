//! Fixed-window request throttling, kept in memory for the lifetime of
//! the server. Windows are dropped from the cache once they run out.

use crate::config::{Limit, RateLimits};
use crate::errors::{AppError, AppResult};
use moka::Expiry;
use moka::sync::Cache;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const MAX_TRACKED: u64 = 100_000;

type WindowKey = (String, String);

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

#[derive(Debug)]
struct Slot {
    len: Duration,
    window: Mutex<Window>,
}

/// A slot lives as long as the window it was opened for.
struct WindowExpiry;

impl Expiry<WindowKey, Arc<Slot>> for WindowExpiry {
    fn expire_after_create(
        &self,
        _key: &WindowKey,
        slot: &Arc<Slot>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(slot.len)
    }
}

#[derive(Debug)]
pub struct RateLimiter {
    limits: RateLimits,
    windows: Cache<WindowKey, Arc<Slot>>,
}

impl RateLimiter {
    pub fn new(limits: RateLimits) -> Self {
        Self {
            limits,
            windows: Cache::builder()
                .max_capacity(MAX_TRACKED)
                .expire_after(WindowExpiry)
                .build(),
        }
    }

    /// Count one hit of the named limit for `key` (user id or client ip).
    pub fn hit(&self, name: &str, key: &str) -> AppResult<()> {
        let limit = self.limits.get(name);
        self.hit_at(name, key, limit, Instant::now())
            .map_err(|retry_after| AppError::RateLimited {
                message: limit_message(name, retry_after),
                retry_after,
            })
    }

    /// Login throttling: per e-mail and ip, then per ip over the hour.
    pub fn hit_login(&self, email: &str, ip: &str) -> AppResult<()> {
        let now = Instant::now();
        let per_account = format!("{}|{ip}", email.to_lowercase());

        self.hit_at("login", &per_account, self.limits.login, now)
            .map_err(|retry_after| AppError::RateLimited {
                message: limit_message("login", retry_after),
                retry_after,
            })?;
        self.hit_at("login_hourly", ip, self.limits.login_hourly, now)
            .map_err(|retry_after| AppError::RateLimited {
                message: limit_message("login_hourly", retry_after),
                retry_after,
            })
    }

    /// Err carries the seconds until the window resets.
    fn hit_at(&self, name: &str, key: &str, limit: Limit, now: Instant) -> Result<(), u64> {
        let window_len = Duration::from_secs(limit.per_seconds);
        let slot = self
            .windows
            .get_with((name.to_string(), key.to_string()), || {
                Arc::new(Slot {
                    len: window_len,
                    window: Mutex::new(Window {
                        started: now,
                        hits: 0,
                    }),
                })
            });
        let mut w = match slot.window.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if now.duration_since(w.started) >= window_len {
            *w = Window {
                started: now,
                hits: 0,
            };
        }

        if w.hits >= limit.max {
            let elapsed = now.duration_since(w.started);
            let remaining = window_len.saturating_sub(elapsed).as_secs().max(1);
            return Err(remaining);
        }

        w.hits += 1;
        Ok(())
    }

    #[cfg(test)]
    fn tracked(&self) -> u64 {
        self.windows.run_pending_tasks();
        self.windows.entry_count()
    }
}

fn limit_message(name: &str, retry_after: u64) -> String {
    match name {
        "login" => format!("Too many login attempts. Please try again in {retry_after} seconds."),
        "login_hourly" => "Account temporarily locked. Please try again later.".into(),
        "upload" => "Too many upload requests. Please wait before uploading more files.".into(),
        "report_generation" => {
            "Report generation limit reached. Please wait before generating more reports.".into()
        }
        "export" => "Export limit reached. Please wait before exporting more data.".into(),
        _ => "Too many requests. Please try again later.".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: u32) -> RateLimiter {
        RateLimiter::new(RateLimits {
            api: Limit::per_minute(max),
            ..RateLimits::default()
        })
    }

    #[test]
    fn blocks_after_max_hits() {
        let rl = limiter(3);
        for _ in 0..3 {
            rl.hit("api", "user:1").unwrap();
        }
        match rl.hit("api", "user:1") {
            Err(AppError::RateLimited { retry_after, .. }) => {
                assert!(retry_after >= 1 && retry_after <= 60)
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
    }

    #[test]
    fn keys_are_independent() {
        let rl = limiter(1);
        rl.hit("api", "user:1").unwrap();
        rl.hit("api", "user:2").unwrap();
        assert!(rl.hit("api", "user:1").is_err());
    }

    #[test]
    fn window_resets() {
        let rl = limiter(1);
        let limit = Limit::per_minute(1);
        let t0 = Instant::now();
        assert!(rl.hit_at("api", "ip", limit, t0).is_ok());
        assert!(rl.hit_at("api", "ip", limit, t0 + Duration::from_secs(30)).is_err());
        assert!(rl.hit_at("api", "ip", limit, t0 + Duration::from_secs(61)).is_ok());
    }

    #[test]
    fn expired_windows_are_dropped() {
        let rl = RateLimiter::new(RateLimits {
            api: Limit {
                max: 1,
                per_seconds: 1,
            },
            ..RateLimits::default()
        });
        rl.hit("api", "10.0.0.9").unwrap();
        assert!(rl.hit("api", "10.0.0.9").is_err());
        assert_eq!(rl.tracked(), 1);

        std::thread::sleep(Duration::from_millis(2500));
        let key = ("api".to_string(), "10.0.0.9".to_string());
        assert!(!rl.windows.contains_key(&key));
        assert_eq!(rl.tracked(), 0);
        rl.hit("api", "10.0.0.9").unwrap();
    }

    #[test]
    fn login_uses_account_and_ip_windows() {
        let rl = RateLimiter::new(RateLimits::default());
        for _ in 0..5 {
            rl.hit_login("Admin@Sakip.go.id", "10.0.0.1").unwrap();
        }
        let err = rl.hit_login("admin@sakip.go.id", "10.0.0.1").unwrap_err();
        assert!(err.to_string().starts_with("Too many login attempts"));
        // another account from the same ip still passes
        rl.hit_login("other@sakip.go.id", "10.0.0.1").unwrap();
    }
}
