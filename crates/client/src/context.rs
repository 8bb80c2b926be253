//! Session context owned by the application root.
//!
//! Pairs the in-memory [`Session`] with its persisted store and is the only
//! writer of that store. Everything else (the guard, dashboards, the CLI)
//! receives a reference to it instead of reaching into global state.

use thiserror::Error;

use voxgate_auth::{
    reduce, resolve, settle, AuthError, Decision, Role, Route, Session, SessionEvent,
    SessionGrant, Transition,
};

use crate::gateway::AuthGateway;
use crate::store::{SessionStore, StoreError};

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("a login attempt is already in progress")]
    InFlight,

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The login succeeded but the session could not be written to disk.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug)]
pub struct SessionContext<S: SessionStore> {
    session: Session,
    store: S,
}

impl<S: SessionStore> SessionContext<S> {
    /// Build the context from whatever the store holds (startup/reload).
    pub fn rehydrate(store: S) -> Result<Self, StoreError> {
        let session = store.load_session()?;
        match session.grant() {
            Some(grant) => {
                tracing::debug!(username = %grant.username, role = %grant.role, "restored session")
            }
            None => tracing::debug!("no stored session"),
        }
        Ok(Self { session, store })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a credential submission. Returns `false` if it was ignored
    /// because an attempt is already running (or the user is signed in).
    pub fn submit(&mut self) -> bool {
        !reduce(&mut self.session, SessionEvent::Submitted).is_ignored()
    }

    /// Feed the gateway's answer to the reducer and apply its store effect.
    pub fn complete(
        &mut self,
        result: Result<SessionGrant, AuthError>,
    ) -> Result<Transition, StoreError> {
        let event = match result {
            Ok(grant) => SessionEvent::Succeeded(grant),
            Err(err) => SessionEvent::Failed(err),
        };
        let transition = reduce(&mut self.session, event);
        self.apply(&transition)?;
        Ok(transition)
    }

    /// Run a full login: submit, one gateway call, resolution.
    ///
    /// On success the returned role's home path is where the guard will send
    /// the user next.
    pub async fn login<G>(
        &mut self,
        gateway: &G,
        username: &str,
        password: &str,
    ) -> Result<Role, LoginError>
    where
        G: AuthGateway + ?Sized,
    {
        if !self.submit() {
            return Err(LoginError::InFlight);
        }

        let result = gateway.authenticate(username, password).await;
        let failure = match &result {
            Ok(grant) => grant.check().err(),
            Err(err) => Some(err.clone()),
        };

        match self.complete(result)? {
            Transition::Persist(grant) => {
                tracing::info!(username = %grant.username, role = %grant.role, "signed in");
                Ok(grant.role)
            }
            _ => {
                let err = failure.unwrap_or_else(|| AuthError::malformed("Login was not accepted"));
                tracing::info!(%username, error = %err, "login failed");
                Err(err.into())
            }
        }
    }

    /// Sign out: forget the session in memory and on disk.
    ///
    /// Ignored while a login is in flight. Safe to call repeatedly. If the
    /// store cannot be cleared the in-memory session is left as it was, so a
    /// reload never brings back a session that memory already dropped.
    pub fn logout(&mut self) -> Result<(), StoreError> {
        let previous = self.session.clone();
        let transition = reduce(&mut self.session, SessionEvent::LoggedOut);
        if transition.is_ignored() {
            tracing::debug!("logout ignored while a login is in flight");
        }
        if let Err(err) = self.apply(&transition) {
            tracing::warn!(error = %err, "could not clear stored session; still signed in");
            self.session = previous;
            return Err(err);
        }
        Ok(())
    }

    pub fn resolve(&self, path: &str) -> Decision {
        resolve(path, &self.session)
    }

    /// The view the client shows after navigating to `path`.
    pub fn navigate(&self, path: &str) -> Route {
        let decision = self.resolve(path);
        if decision.is_unauthorized(path) {
            tracing::debug!(requested = path, to = decision.location(), "navigation redirected");
        }
        settle(path, &self.session)
    }

    fn apply(&self, transition: &Transition) -> Result<(), StoreError> {
        match transition {
            Transition::Persist(grant) => self.store.save(grant),
            Transition::Clear => self.store.clear(),
            Transition::Applied | Transition::Ignored => Ok(()),
        }
    }
}
