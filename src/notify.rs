//! Transient notifications
//!
//! Toasts raised after API calls. Each lives for [`TOAST_TTL_MS`] and is then
//! dropped by [`ToastQueue::expire`].

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

/// How long a toast stays visible
pub const TOAST_TTL_MS: i64 = 3_200;

/// Toast flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

/// One notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: String,
    pub kind: ToastKind,
    pub text: String,
    pub raised_at: DateTime<Utc>,
}

impl Toast {
    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        self.raised_at + ttl
    }
}

/// Ordered queue of live toasts, oldest first
#[derive(Debug, Clone)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
    ttl: Duration,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::with_ttl(Duration::milliseconds(TOAST_TTL_MS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            toasts: Vec::new(),
            ttl,
        }
    }

    /// Raise a toast now; returns its id
    pub fn push(&mut self, kind: ToastKind, text: impl Into<String>) -> String {
        self.push_at(kind, text, Utc::now())
    }

    /// Raise a toast at a given time; returns its id
    pub fn push_at(&mut self, kind: ToastKind, text: impl Into<String>, now: DateTime<Utc>) -> String {
        let toast = Toast {
            id: Uuid::new_v4().to_string(),
            kind,
            text: text.into(),
            raised_at: now,
        };
        match kind {
            ToastKind::Success => tracing::info!(text = %toast.text, "Toast"),
            ToastKind::Error => tracing::warn!(text = %toast.text, "Toast"),
        }
        let id = toast.id.clone();
        self.toasts.push(toast);
        id
    }

    pub fn success(&mut self, text: impl Into<String>) -> String {
        self.push(ToastKind::Success, text)
    }

    pub fn error(&mut self, text: impl Into<String>) -> String {
        self.push(ToastKind::Error, text)
    }

    /// Drop toasts whose time is up; returns how many were removed
    pub fn expire(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.toasts.len();
        let ttl = self.ttl;
        self.toasts.retain(|t| t.expires_at(ttl) > now);
        before - self.toasts.len()
    }

    /// Remove one toast early
    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    /// Toasts still visible at `now`
    pub fn active(&self, now: DateTime<Utc>) -> Vec<&Toast> {
        self.toasts
            .iter()
            .filter(|t| t.expires_at(self.ttl) > now)
            .collect()
    }

    /// Every queued toast, expired or not
    pub fn all(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Empty the queue, returning what was in it
    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_toasts_expire_after_ttl() {
        let mut queue = ToastQueue::new();
        queue.push_at(ToastKind::Success, "Patient added", t0());
        queue.push_at(ToastKind::Error, "Error deleting patient: gone", t0() + Duration::seconds(2));

        let just_before = t0() + Duration::milliseconds(3_199);
        assert_eq!(queue.active(just_before).len(), 2);

        let at_ttl = t0() + Duration::milliseconds(3_200);
        assert_eq!(queue.expire(at_ttl), 1);
        assert_eq!(queue.all()[0].kind, ToastKind::Error);

        assert_eq!(queue.expire(t0() + Duration::seconds(10)), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ids_are_unique_and_dismissable() {
        let mut queue = ToastQueue::new();
        let a = queue.success("one");
        let b = queue.error("two");
        assert_ne!(a, b);

        assert!(queue.dismiss(&a));
        assert!(!queue.dismiss(&a));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain()[0].id, b);
        assert!(queue.is_empty());
    }
}
