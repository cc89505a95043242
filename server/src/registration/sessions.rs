use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

use super::{RegistrationState, StepFlow};

/// Upper bound on how often idle sessions are swept.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Entry {
    state: RegistrationState,
    last_touched: Instant,
}

/// In-memory registration flows keyed by session id.
///
/// Cloning yields another handle to the same map. Every mutation runs a
/// synchronous closure under the write lock, so a session is never observed
/// half-updated. Reads and writes count as activity; sessions left idle are
/// dropped by [`evict_idle`](Self::evict_idle).
#[derive(Clone, Default)]
pub struct RegistrationSessions {
    inner: Arc<RwLock<HashMap<Uuid, Entry>>>,
}

impl RegistrationSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, flow: StepFlow) -> (Uuid, RegistrationState) {
        let id = Uuid::new_v4();
        let state = RegistrationState::new(flow);
        let entry = Entry {
            state: state.clone(),
            last_touched: Instant::now(),
        };
        self.inner.write().await.insert(id, entry);
        info!(session_id = %id, ?flow, "Registration session started");
        (id, state)
    }

    pub async fn get(&self, id: Uuid) -> Option<RegistrationState> {
        let mut sessions = self.inner.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_touched = Instant::now();
        Some(entry.state.clone())
    }

    /// Applies `f` to the session and returns the resulting state, or `None`
    /// when no session has that id.
    pub async fn update<F>(&self, id: Uuid, f: F) -> Option<RegistrationState>
    where
        F: FnOnce(&mut RegistrationState),
    {
        let mut sessions = self.inner.write().await;
        let entry = sessions.get_mut(&id)?;
        let before = entry.state.current_step();
        f(&mut entry.state);
        entry.last_touched = Instant::now();
        debug!(
            session_id = %id,
            from = %before,
            to = %entry.state.current_step(),
            "Registration session updated"
        );
        Some(entry.state.clone())
    }

    pub async fn remove(&self, id: Uuid) -> Option<RegistrationState> {
        let removed = self.inner.write().await.remove(&id).map(|entry| entry.state);
        if removed.is_some() {
            info!(session_id = %id, "Registration session closed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Drops sessions untouched for longer than `ttl`. Returns how many went.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = now.duration_since(entry.last_touched) <= ttl;
            if !keep {
                debug!(session_id = %id, "Registration session expired");
            }
            keep
        });
        before - sessions.len()
    }

    /// Sweeps idle sessions in the background until the runtime shuts down.
    pub fn spawn_sweeper(&self, ttl: Duration) -> JoinHandle<()> {
        let sessions = self.clone();
        let period = ttl.min(MAX_SWEEP_INTERVAL).max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let evicted = sessions.evict_idle(ttl).await;
                if evicted > 0 {
                    let active = sessions.len().await;
                    info!(evicted, active, "Expired idle registration sessions");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::Step;

    #[tokio::test]
    async fn test_create_and_fetch_session() {
        let sessions = RegistrationSessions::new();
        let (id, state) = sessions.create(StepFlow::WithPayment).await;

        assert_eq!(state.current_step(), Step::SelectTicket);
        assert_eq!(sessions.get(id).await, Some(state));
        assert_eq!(sessions.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_is_shared_between_handles() {
        let sessions = RegistrationSessions::new();
        let other = sessions.clone();
        let (id, _) = sessions.create(StepFlow::Standard).await;

        let updated = other.update(id, RegistrationState::next_step).await;
        assert_eq!(
            updated.map(|s| s.current_step()),
            Some(Step::RegistrationForm)
        );
        assert_eq!(
            sessions.get(id).await.map(|s| s.current_step()),
            Some(Step::RegistrationForm)
        );
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let sessions = RegistrationSessions::new();
        let missing = Uuid::new_v4();

        assert!(sessions.get(missing).await.is_none());
        assert!(sessions.update(missing, RegistrationState::reset).await.is_none());
        assert!(sessions.remove(missing).await.is_none());
    }

    #[tokio::test]
    async fn test_remove_session() {
        let sessions = RegistrationSessions::new();
        let (id, _) = sessions.create(StepFlow::Standard).await;

        assert!(sessions.remove(id).await.is_some());
        assert_eq!(sessions.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evict_idle_keeps_active_sessions() {
        let ttl = Duration::from_secs(30 * 60);
        let sessions = RegistrationSessions::new();
        let (abandoned, _) = sessions.create(StepFlow::Standard).await;
        let (active, _) = sessions.create(StepFlow::Standard).await;

        time::advance(Duration::from_secs(20 * 60)).await;
        sessions.update(active, RegistrationState::next_step).await;
        assert_eq!(sessions.evict_idle(ttl).await, 0);

        time::advance(Duration::from_secs(15 * 60)).await;
        assert_eq!(sessions.evict_idle(ttl).await, 1);
        assert_eq!(sessions.len().await, 1);
        assert!(sessions.get(active).await.is_some());
        assert!(sessions.get(abandoned).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_expires_abandoned_sessions() {
        let ttl = Duration::from_secs(30);
        let sessions = RegistrationSessions::new();
        let sweeper = sessions.spawn_sweeper(ttl);
        sessions.create(StepFlow::WithPayment).await;

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(sessions.len().await, 1);

        time::sleep(ttl * 2).await;
        assert_eq!(sessions.len().await, 0);

        sweeper.abort();
    }
}
