use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::ChatSession;
use crate::connector::api::Container;
use crate::domain::DomainError;

pub const DEFAULT_MAX_SESSIONS: usize = 256;
pub const DEFAULT_SESSION_IDLE_TTL: Duration = Duration::from_secs(60 * 60);

struct SessionEntry {
    session: Arc<Mutex<ChatSession>>,
    last_used: Instant,
}

/// Process-wide session table. Each session sits behind its own mutex so
/// turns within one session run one at a time.
///
/// Every session holds its own copy of the dataset, so the table is bounded:
/// sessions idle longer than the TTL are dropped, and past the cap the least
/// recently used one goes.
pub struct WebState {
    container: Container,
    sessions: RwLock<HashMap<String, SessionEntry>>,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl WebState {
    pub fn new(container: Container) -> Self {
        Self::with_limits(container, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE_TTL)
    }

    pub fn with_limits(container: Container, max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            container,
            sessions: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
            idle_ttl,
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub async fn create_session(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let session = Arc::new(Mutex::new(self.container.new_session()));

        let mut sessions = self.sessions.write().await;
        self.evict(&mut sessions);
        sessions.insert(
            id.clone(),
            SessionEntry {
                session,
                last_used: Instant::now(),
            },
        );
        info!("Created session {} ({} active)", id, sessions.len());
        id
    }

    pub async fn session(&self, id: &str) -> Result<Arc<Mutex<ChatSession>>, DomainError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(id)
            .filter(|entry| entry.last_used.elapsed() <= self.idle_ttl)
            .ok_or_else(|| DomainError::not_found(format!("Unknown session: {}", id)))?;
        entry.last_used = Instant::now();
        Ok(entry.session.clone())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Makes room for one more session.
    fn evict(&self, sessions: &mut HashMap<String, SessionEntry>) {
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_used.elapsed() <= self.idle_ttl);

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                }
                None => break,
            }
        }

        if sessions.len() < before {
            debug!("Evicted {} session(s)", before - sessions.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::SessionSettings;
    use crate::connector::adapter::ScriptedChatClient;
    use crate::connector::api::ContainerConfig;

    async fn container() -> Container {
        let config = ContainerConfig {
            base_url: None,
            model: None,
            api_key: None,
            data_file: None,
            hf_dataset: None,
            seed: 42,
            settings: SessionSettings::default(),
        };
        Container::with_client(config, Arc::new(ScriptedChatClient::new()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_cap_evicts_least_recently_used() {
        let state = WebState::with_limits(container().await, 2, DEFAULT_SESSION_IDLE_TTL);

        let first = state.create_session().await;
        let second = state.create_session().await;
        // Touch the first so the second becomes the oldest.
        state.session(&first).await.unwrap();
        let third = state.create_session().await;

        assert_eq!(state.session_count().await, 2);
        assert!(state.session(&first).await.is_ok());
        assert!(state.session(&second).await.unwrap_err().is_not_found());
        assert!(state.session(&third).await.is_ok());
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let state = WebState::with_limits(container().await, 8, Duration::from_millis(1));

        let id = state.create_session().await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(state.session(&id).await.unwrap_err().is_not_found());
        state.create_session().await;
        assert_eq!(state.session_count().await, 1);
    }
}
