//! WebSocket Session Management

use std::time::{Duration, Instant};

/// Per-connection state owned by the connection task
#[derive(Debug)]
pub struct SessionState {
    pub user_id: i64,
    pub session_id: String,
    pub sequence: u64,
    pub last_heartbeat: Instant,
}

impl SessionState {
    pub fn new(session_id: String, user_id: i64) -> Self {
        Self {
            user_id,
            session_id,
            sequence: 0,
            last_heartbeat: Instant::now(),
        }
    }

    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    pub fn heartbeat(&mut self) {
        self.last_heartbeat = Instant::now();
    }

    pub fn is_alive(&self, timeout: Duration) -> bool {
        self.last_heartbeat.elapsed() < timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_increments() {
        let mut session = SessionState::new("s".into(), 1);
        assert_eq!(session.next_sequence(), 1);
        assert_eq!(session.next_sequence(), 2);
    }

    #[test]
    fn test_liveness() {
        let mut session = SessionState::new("s".into(), 1);
        session.last_heartbeat = Instant::now() - Duration::from_secs(90);
        assert!(!session.is_alive(Duration::from_secs(60)));

        session.heartbeat();
        assert!(session.is_alive(Duration::from_secs(60)));
    }
}
