// ── Confirmation gate ──
//
// Suspends a destructive action until the user answers a prompt. The
// presenter receives a cloneable responder; whichever path resolves first
// (confirm, cancel, dismiss) wins and every later call is a no-op.

use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tracing::debug;

/// How a prompt was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirmed,
    Cancelled,
    /// Closed without an explicit answer (backdrop, Esc).
    Dismissed,
}

impl Decision {
    pub fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// What to ask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub text: String,
}

impl ConfirmPrompt {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }

    /// Prompt for unbinding a stored credential from a running service.
    pub fn unbind(credential: &str, service: &str) -> Self {
        Self::new(
            format!("Unbind {credential}?"),
            format!(
                "The {credential} will be removed and the {service} stops until a new one is saved."
            ),
        )
    }
}

/// Handle a presenter uses to answer. Clones share one resolution slot.
#[derive(Debug, Clone)]
pub struct ConfirmResponder {
    slot: Arc<Mutex<Option<oneshot::Sender<Decision>>>>,
}

impl ConfirmResponder {
    pub fn confirm(&self) -> bool {
        self.resolve(Decision::Confirmed)
    }

    pub fn cancel(&self) -> bool {
        self.resolve(Decision::Cancelled)
    }

    pub fn dismiss(&self) -> bool {
        self.resolve(Decision::Dismissed)
    }

    pub fn is_resolved(&self) -> bool {
        self.take_slot_ref(|slot| slot.is_none())
    }

    /// Returns `false` if the prompt was already resolved.
    fn resolve(&self, decision: Decision) -> bool {
        let Some(sender) = self.take_slot_ref(Option::take) else {
            return false;
        };
        debug!(?decision, "confirmation resolved");
        sender.send(decision).is_ok()
    }

    fn take_slot_ref<R>(&self, f: impl FnOnce(&mut Option<oneshot::Sender<Decision>>) -> R) -> R {
        let mut guard = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

/// A surface that can show a prompt and later answer through the responder.
pub trait ConfirmPresenter: Send + Sync {
    fn present(&self, prompt: &ConfirmPrompt, responder: ConfirmResponder);
}

/// Awaitable side of an open prompt.
#[derive(Debug)]
pub struct PendingConfirmation {
    rx: oneshot::Receiver<Decision>,
}

impl PendingConfirmation {
    /// Resolves as `Cancelled` if every responder is dropped unanswered.
    pub async fn wait(self) -> Decision {
        self.rx.await.unwrap_or(Decision::Cancelled)
    }
}

pub struct ConfirmationGate;

impl ConfirmationGate {
    /// Open a prompt without presenting it.
    pub fn open() -> (PendingConfirmation, ConfirmResponder) {
        let (tx, rx) = oneshot::channel();
        (
            PendingConfirmation { rx },
            ConfirmResponder {
                slot: Arc::new(Mutex::new(Some(tx))),
            },
        )
    }

    /// Present `prompt` and wait for the answer.
    pub async fn confirm<P: ConfirmPresenter + ?Sized>(presenter: &P, prompt: &ConfirmPrompt) -> Decision {
        let (pending, responder) = Self::open();
        presenter.present(prompt, responder);
        pending.wait().await
    }
}
