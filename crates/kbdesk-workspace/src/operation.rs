//! Lifecycle of one user-triggered asynchronous request.
//!
//! An [`Operation`] moves `Idle → Pending → Succeeded | Failed`. Submission is
//! split in two phases so the caller can await the service without holding
//! the view:
//!
//! 1. [`Operation::begin`] enters `Pending` synchronously and hands out a
//!    [`Ticket`] carrying the submission's sequence number.
//! 2. [`Operation::settle`] applies the outcome only if the ticket is still
//!    current. A ticket invalidated by a superseding submission or by
//!    [`Operation::reset`] yields [`Settlement::Stale`] and changes nothing.
//!
//! There is no retry and no timeout here. A failed operation accepts a new
//! submission immediately.

use std::fmt;

use tracing::{debug, info, warn};

use kbdesk_core::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationStatus {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Pending => write!(f, "pending"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// What `begin` does when the operation is already pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResubmitPolicy {
    /// Refuse the new submission; the in-flight one continues.
    #[default]
    Reject,
    /// Accept the new submission; the in-flight one's settlement is discarded.
    Supersede,
}

/// Identity of a submission, redeemed at settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    seq: u64,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Result of redeeming a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Succeeded,
    Failed,
    /// The ticket was no longer current; the outcome was dropped.
    Stale,
}

impl Settlement {
    pub fn is_applied(&self) -> bool {
        !matches!(self, Self::Stale)
    }
}

/// A request accepted into `Pending`, ready to send.
#[derive(Debug, Clone)]
pub struct Submission<R> {
    pub ticket: Ticket,
    pub request: R,
}

/// State of an operation. Result and error live inside the variants, so a
/// settled operation carries exactly one of them.
#[derive(Debug)]
pub enum OperationState<I, O> {
    Idle,
    Pending { input: I },
    Succeeded { input: I, result: O },
    Failed { input: I, error: Error },
}

#[derive(Debug)]
pub struct Operation<I, O> {
    name: &'static str,
    policy: ResubmitPolicy,
    seq: u64,
    state: OperationState<I, O>,
}

impl<I, O> Operation<I, O> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            policy: ResubmitPolicy::default(),
            seq: 0,
            state: OperationState::Idle,
        }
    }

    pub fn with_policy(mut self, policy: ResubmitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn policy(&self) -> ResubmitPolicy {
        self.policy
    }

    pub fn state(&self) -> &OperationState<I, O> {
        &self.state
    }

    pub fn status(&self) -> OperationStatus {
        match self.state {
            OperationState::Idle => OperationStatus::Idle,
            OperationState::Pending { .. } => OperationStatus::Pending,
            OperationState::Succeeded { .. } => OperationStatus::Succeeded,
            OperationState::Failed { .. } => OperationStatus::Failed,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, OperationState::Pending { .. })
    }

    /// Whether `begin` would accept a submission right now.
    pub fn can_submit(&self) -> bool {
        !self.is_pending() || self.policy == ResubmitPolicy::Supersede
    }

    pub fn input(&self) -> Option<&I> {
        match &self.state {
            OperationState::Idle => None,
            OperationState::Pending { input }
            | OperationState::Succeeded { input, .. }
            | OperationState::Failed { input, .. } => Some(input),
        }
    }

    pub fn result(&self) -> Option<&O> {
        match &self.state {
            OperationState::Succeeded { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match &self.state {
            OperationState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Whether `ticket` would be applied by `settle`.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.is_pending() && ticket.seq == self.seq
    }

    /// Enter `Pending` with `input`.
    ///
    /// Fails with [`Error::InFlight`] when pending under
    /// [`ResubmitPolicy::Reject`]; the state is left untouched.
    pub fn begin(&mut self, input: I) -> Result<Ticket> {
        if self.is_pending() {
            match self.policy {
                ResubmitPolicy::Reject => {
                    debug!(op = self.name, seq = self.seq, "Submission rejected, already pending");
                    return Err(Error::InFlight(self.name.to_string()));
                }
                ResubmitPolicy::Supersede => {
                    debug!(op = self.name, seq = self.seq, "Superseding in-flight submission");
                }
            }
        }

        self.seq += 1;
        self.state = OperationState::Pending { input };
        debug!(op = self.name, seq = self.seq, "Operation pending");
        Ok(Ticket { seq: self.seq })
    }

    /// Apply the outcome of the submission identified by `ticket`.
    pub fn settle(&mut self, ticket: Ticket, outcome: Result<O>) -> Settlement {
        if !self.is_current(ticket) {
            debug!(
                op = self.name,
                seq = ticket.seq,
                current = self.seq,
                "Discarding stale settlement"
            );
            return Settlement::Stale;
        }

        let input = match std::mem::replace(&mut self.state, OperationState::Idle) {
            OperationState::Pending { input } => input,
            other => {
                self.state = other;
                return Settlement::Stale;
            }
        };

        match outcome {
            Ok(result) => {
                info!(op = self.name, seq = ticket.seq, success = true, "Operation succeeded");
                self.state = OperationState::Succeeded { input, result };
                Settlement::Succeeded
            }
            Err(error) => {
                warn!(op = self.name, seq = ticket.seq, error = %error, "Operation failed");
                self.state = OperationState::Failed { input, error };
                Settlement::Failed
            }
        }
    }

    /// Return to `Idle`, invalidating any outstanding ticket.
    pub fn reset(&mut self) {
        if self.is_pending() {
            debug!(op = self.name, seq = self.seq, "Cancelling pending operation");
        }
        self.seq += 1;
        self.state = OperationState::Idle;
    }
}
