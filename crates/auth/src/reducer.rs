//! Session lifecycle state machine.
//!
//! ```text
//! idle|failed            --submit-->   authenticating
//! authenticating         --success-->  authenticated   (persist grant)
//! authenticating         --failure-->  failed
//! idle|failed|authenticated --logout--> idle           (clear store)
//! ```
//!
//! Any other event/state pair is ignored. The reducer performs no IO: it
//! updates the in-memory [`Session`] and tells the caller which store effect
//! to apply through the returned [`Transition`].

use crate::{AuthError, Session, SessionGrant, SessionStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Credentials were submitted; a gateway call is about to start.
    Submitted,
    /// The gateway produced a session.
    Succeeded(SessionGrant),
    /// The gateway call failed.
    Failed(AuthError),
    LoggedOut,
}

impl SessionEvent {
    fn name(&self) -> &'static str {
        match self {
            SessionEvent::Submitted => "submit",
            SessionEvent::Succeeded(_) => "success",
            SessionEvent::Failed(_) => "failure",
            SessionEvent::LoggedOut => "logout",
        }
    }
}

/// Outcome of feeding one event to the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Transition {
    /// The event is not valid in the current state; nothing changed.
    Ignored,
    /// State changed; the store is untouched.
    Applied,
    /// State changed; write the grant to the store.
    Persist(SessionGrant),
    /// State changed; remove every session key from the store.
    Clear,
}

impl Transition {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Transition::Ignored)
    }
}

/// Apply `event` to `session`.
pub fn reduce(session: &mut Session, event: SessionEvent) -> Transition {
    let from = session.status;
    let name = event.name();

    let transition = match (from, event) {
        (SessionStatus::Idle | SessionStatus::Failed, SessionEvent::Submitted) => {
            session.status = SessionStatus::Authenticating;
            session.error = None;
            Transition::Applied
        }
        (SessionStatus::Authenticating, SessionEvent::Succeeded(grant)) => {
            if let Err(err) = grant.check() {
                fail(session, err)
            } else {
                session.grant = Some(grant.clone());
                session.status = SessionStatus::Authenticated;
                session.error = None;
                Transition::Persist(grant)
            }
        }
        (SessionStatus::Authenticating, SessionEvent::Failed(err)) => fail(session, err),
        (
            SessionStatus::Idle | SessionStatus::Failed | SessionStatus::Authenticated,
            SessionEvent::LoggedOut,
        ) => {
            *session = Session::empty();
            Transition::Clear
        }
        _ => Transition::Ignored,
    };

    if transition.is_ignored() {
        tracing::debug!(state = %from, event = name, "session event ignored");
    } else {
        tracing::debug!(from = %from, to = %session.status, event = name, "session transition");
    }

    transition
}

fn fail(session: &mut Session, err: AuthError) -> Transition {
    session.grant = None;
    session.status = SessionStatus::Failed;
    session.error = Some(err.user_message());
    Transition::Applied
}
