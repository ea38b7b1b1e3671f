use crate::state::messages::UiEvent;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::mpsc;

pub const TOAST_TIMEOUT: Duration = Duration::from_secs(4);
const MAX_VISIBLE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// Transient notifications. Each push arms a timer that later sends
/// `UiEvent::ToastExpired(id)` back to the UI loop.
#[derive(Debug, Default)]
pub struct Toasts {
    next_id: u64,
    items: VecDeque<Toast>,
    expiry: Option<mpsc::Sender<UiEvent>>,
}

impl Toasts {
    pub fn with_expiry(expiry: mpsc::Sender<UiEvent>) -> Self {
        Self { expiry: Some(expiry), ..Default::default() }
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Info, message)
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Error, message)
    }

    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push_back(Toast { id, kind, message: message.into() });
        if let Some(tx) = &self.expiry {
            schedule_expiry(id, tx.clone());
        }
        id
    }

    /// Returns false when `id` was already gone.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.id != id);
        self.items.len() != before
    }

    /// Newest toasts, oldest first, capped at what fits on screen.
    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter().skip(self.items.len().saturating_sub(MAX_VISIBLE))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn schedule_expiry(id: u64, tx: mpsc::Sender<UiEvent>) {
    // Outside a runtime (unit tests) toasts simply stay until removed.
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        return;
    };
    handle.spawn(async move {
        tokio::time::sleep(TOAST_TIMEOUT).await;
        let _ = tx.send(UiEvent::ToastExpired(id)).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_removal_is_by_id() {
        let mut toasts = Toasts::default();
        let a = toasts.info("loading teams");
        let b = toasts.error("request failed");
        assert_ne!(a, b);
        assert_eq!(toasts.len(), 2);

        assert!(toasts.remove(a));
        assert!(!toasts.remove(a));
        let left: Vec<_> = toasts.visible().map(|t| t.kind).collect();
        assert_eq!(left, vec![ToastKind::Error]);
    }

    #[test]
    fn only_the_newest_are_visible() {
        let mut toasts = Toasts::default();
        for i in 0..6 {
            toasts.info(format!("toast {i}"));
        }
        let shown: Vec<_> = toasts.visible().map(|t| t.message.as_str()).collect();
        assert_eq!(shown, vec!["toast 2", "toast 3", "toast 4", "toast 5"]);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_event_fires_after_timeout() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut toasts = Toasts::with_expiry(tx);
        let id = toasts.success("logged in");

        tokio::time::advance(TOAST_TIMEOUT + Duration::from_millis(10)).await;
        match rx.recv().await {
            Some(UiEvent::ToastExpired(expired)) => assert_eq!(expired, id),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(toasts.remove(id));
        assert!(toasts.is_empty());
    }
}
