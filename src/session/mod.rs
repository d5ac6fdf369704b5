//! Session ownership.
//!
//! [`SessionHandle`] is the single owner of the current [`Session`]. It is
//! passed explicitly to whoever needs it; observers (the cart actor, the auto
//! sync task) subscribe to a `watch` channel to see logins and logouts.

mod error;
mod store;

pub use error::*;
pub use store::*;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::domain::{Identity, Session};

#[derive(Clone)]
pub struct SessionHandle {
    sender: Arc<watch::Sender<Session>>,
    store: Option<SessionFile>,
}

impl SessionHandle {
    pub fn new(initial: Session, store: Option<SessionFile>) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
            store,
        }
    }

    /// Starts from the persisted session if one exists, otherwise as guest.
    ///
    /// An unreadable session file is logged and treated as a guest session.
    #[instrument(skip(store))]
    pub fn restore(store: Option<SessionFile>) -> Self {
        let initial = match store.as_ref().map(SessionFile::load) {
            Some(Ok(Some(session))) => {
                info!(session = ?session, "Restored persisted session");
                session
            }
            Some(Err(e)) => {
                warn!(error = %e, "Ignoring unreadable session file");
                Session::Guest
            }
            Some(Ok(None)) | None => Session::Guest,
        };
        Self::new(initial, store)
    }

    pub fn current(&self) -> Session {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.sender.subscribe()
    }

    #[instrument(fields(user_id = identity.id, role = %identity.role), skip(self, identity, token))]
    pub fn login(&self, identity: Identity, token: impl Into<String>) {
        info!("Session started");
        self.replace(Session::authenticated(identity, token));
    }

    #[instrument(skip(self))]
    pub fn logout(&self) {
        info!("Session ended");
        self.replace(Session::Guest);
    }

    /// Drops the session after the server rejected its token.
    #[instrument(skip(self))]
    pub fn deauthenticate(&self, reason: &str) {
        warn!("Session rejected by server, logging out");
        self.replace(Session::Guest);
    }

    fn replace(&self, session: Session) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&session) {
                warn!(error = %e, "Failed to persist session");
            }
        }
        self.sender.send_replace(session);
    }
}
