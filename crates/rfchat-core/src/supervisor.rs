//! Connection Supervisor
//!
//! Keeps the chat alive for the lifetime of the process:
//! - Announces `[DISCONNECTED]` and prepares the endpoint at the start of every run
//! - Acquires a link (discovery or advertisement + accept) and hands it to a session
//! - Retries lookups that found nothing, restarts the run on any other failure
//! - Stops only when the shutdown future (operator interrupt) resolves

use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use crate::config::ChatConfig;
use crate::endpoint::{Endpoint, Role};
use crate::error::{ChatError, ChatResult};
use crate::pump::LineInput;
use crate::session::SessionManager;
use crate::signal::DisconnectSignal;
use crate::status::{emit_status, Status};

// ----------------------------------------------------------------------------
// Supervisor State
// ----------------------------------------------------------------------------

/// Lifecycle state of the supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Discovering,
    Advertising,
    AwaitingConnection,
    Connected,
    Disconnected,
    Terminating,
}

/// Counters kept across runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorStats {
    /// Runs started from idle (the first one included)
    pub runs: u64,
    /// Sessions that reached teardown
    pub sessions: u64,
    /// Acquisition attempts retried without restarting the run
    pub retries: u64,
}

// ----------------------------------------------------------------------------
// Connection Supervisor
// ----------------------------------------------------------------------------

/// Outer retry loop around link acquisition and sessions
pub struct ConnectionSupervisor<E, I, O> {
    endpoint: E,
    config: ChatConfig,
    signal: DisconnectSignal,
    input: LineInput<I>,
    output: O,
    state: SupervisorState,
    stats: SupervisorStats,
}

impl<E, I, O> ConnectionSupervisor<E, I, O>
where
    E: Endpoint,
    I: AsyncRead + Unpin,
    O: AsyncWrite + Unpin,
{
    pub fn new(endpoint: E, config: ChatConfig, input: I, output: O) -> Self {
        Self {
            endpoint,
            config,
            signal: DisconnectSignal::new(),
            input: LineInput::new(input),
            output,
            state: SupervisorState::Idle,
            stats: SupervisorStats::default(),
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn stats(&self) -> SupervisorStats {
        self.stats
    }

    /// Run until `shutdown` resolves.
    ///
    /// Shutdown wins in every phase, including the middle of a session; in-flight
    /// pumps are dropped without teardown. The configuration is checked once up
    /// front; after that only [`ChatError::Interrupted`] ends the loop early.
    pub async fn run_until<F>(&mut self, shutdown: F) -> ChatResult<SupervisorStats>
    where
        F: Future<Output = ()>,
    {
        self.config.validate()?;

        let result = tokio::select! {
            biased;
            _ = shutdown => {
                info!("Interrupted; shutting down");
                Ok(())
            }
            result = self.run_forever() => result,
        };

        self.transition(SupervisorState::Terminating);
        result.map(|_| self.stats)
    }

    async fn run_forever(&mut self) -> ChatResult<()> {
        loop {
            self.stats.runs += 1;
            let error = match self.run_once().await {
                Ok(never) => match never {},
                Err(error) => error,
            };

            // Descriptor and config problems were ruled out before the first
            // run; anything a collaborator reports later is treated as transient.
            if matches!(error, ChatError::Interrupted) {
                return Err(error);
            }
            debug!("Restarting after {:?} error: {}", error.kind(), error);
            pause(self.config.retry_delay).await;
        }
    }

    /// One run from idle. Only returns on an error that needs a fresh start.
    async fn run_once(&mut self) -> ChatResult<Infallible> {
        self.transition(SupervisorState::Idle);
        emit_status(&mut self.output, Status::Disconnected).await?;

        let (opening, acquiring) = match self.endpoint.role() {
            Role::Client => (SupervisorState::Discovering, SupervisorState::Discovering),
            Role::Server => (SupervisorState::Advertising, SupervisorState::AwaitingConnection),
        };

        self.transition(opening);
        self.endpoint.open().await?;

        loop {
            self.transition(acquiring);
            let (link, peer) = match self.endpoint.acquire().await {
                Ok(acquired) => acquired,
                Err(error) if error.retry_in_place() => {
                    debug!("{}", error);
                    self.stats.retries += 1;
                    pause(self.config.retry_delay).await;
                    continue;
                }
                Err(error) => return Err(error),
            };

            self.transition(SupervisorState::Connected);
            info!("Connected to {}", peer);

            SessionManager::new(&self.config, &mut self.signal, &mut self.input, &mut self.output)
                .run(link)
                .await;

            self.stats.sessions += 1;
            self.transition(SupervisorState::Disconnected);
        }
    }

    fn transition(&mut self, next: SupervisorState) {
        if self.state != next {
            debug!("Supervisor {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}

/// Wait between retries. A zero delay still yields so that shutdown is observed.
async fn pause(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
}
