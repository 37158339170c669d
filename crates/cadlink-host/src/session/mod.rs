//! Session lifecycle
//!
//! A [`SessionContext`] owns the single live connection to the host
//! application. It moves through `Unopened -> Open -> Closed` exactly once,
//! and the connection is released on every exit path: normal return, early
//! return, error propagation, or unwinding.

mod scope;

use uuid::Uuid;

use crate::host::{Application, Connection, HostError, HostResult};

pub use scope::{DocumentScope, DocumentSource};

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, no connection attempted yet
    Unopened,
    /// Holding a live connection
    Open,
    /// Connection released (or never acquired); terminal
    Closed,
}

/// Scoped owner of a host connection
pub struct SessionContext<'a> {
    id: Uuid,
    application: &'a dyn Application,
    state: SessionState,
    connection: Option<Box<dyn Connection>>,
}

impl<'a> SessionContext<'a> {
    /// Create an unopened session for the given host
    pub fn new(application: &'a dyn Application) -> Self {
        Self {
            id: Uuid::new_v4(),
            application,
            state: SessionState::Unopened,
            connection: None,
        }
    }

    /// Session identifier (for log correlation)
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Connect to the host
    ///
    /// A failed connection moves the session straight to `Closed`.
    pub fn open(&mut self) -> HostResult<&mut dyn Connection> {
        match self.state {
            SessionState::Closed => return Err(HostError::AlreadyClosed),
            SessionState::Open => return Err(HostError::AlreadyOpen),
            SessionState::Unopened => {}
        }

        match self.application.connect() {
            Ok(connection) => {
                tracing::info!(
                    "Session {} connected to '{}'",
                    self.id,
                    self.application.name()
                );
                self.state = SessionState::Open;
                Ok(self.connection.insert(connection).as_mut())
            }
            Err(e) => {
                tracing::warn!(
                    "Session {} failed to connect to '{}': {}",
                    self.id,
                    self.application.name(),
                    e
                );
                self.state = SessionState::Closed;
                Err(e)
            }
        }
    }

    /// Borrow the live connection
    pub fn connection(&mut self) -> HostResult<&mut dyn Connection> {
        match self.connection.as_mut() {
            Some(connection) => Ok(connection.as_mut()),
            None if self.state == SessionState::Closed => Err(HostError::AlreadyClosed),
            None => Err(HostError::NotConnected),
        }
    }

    /// Release the connection
    ///
    /// The session is `Closed` afterwards even if the host reports an error
    /// while disconnecting. Closing an already closed session is a no-op.
    pub fn close(&mut self) -> HostResult<()> {
        self.state = SessionState::Closed;
        match self.connection.take() {
            Some(mut connection) => {
                tracing::info!("Session {} released its connection", self.id);
                connection.disconnect()
            }
            None => Ok(()),
        }
    }

    /// Open the session, run `body` against the connection, then close it
    ///
    /// The connection is released before an error from `body` is returned.
    /// When `body` succeeds but disconnecting fails, the disconnect error is
    /// returned instead.
    pub fn run<T, E, F>(mut self, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn Connection) -> Result<T, E>,
        E: From<HostError>,
    {
        let result = body(self.open()?);
        let closed = self.close();

        match (result, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                tracing::warn!("Session {} failed to disconnect: {}", self.id, close_err);
                Err(e)
            }
        }
    }
}

impl Drop for SessionContext<'_> {
    fn drop(&mut self) {
        if self.state == SessionState::Open
            && let Err(e) = self.close()
        {
            tracing::warn!("Session {} failed to disconnect on drop: {}", self.id, e);
        }
    }
}

/// Run `body` inside a fresh session for `application`
pub fn with_session<T, E, F>(application: &dyn Application, body: F) -> Result<T, E>
where
    F: FnOnce(&mut dyn Connection) -> Result<T, E>,
    E: From<HostError>,
{
    SessionContext::new(application).run(body)
}
