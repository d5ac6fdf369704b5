use std::collections::VecDeque;

use super::{CartError, SyncOutcome};
use crate::domain::Order;
use crate::messages::ServiceResponse;

pub(crate) type SyncWaiter = ServiceResponse<SyncOutcome, CartError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RemoteKind {
    Fetch,
    Sync,
    Checkout,
}

/// A remote cart call waiting for (or holding) the single outstanding slot.
#[derive(Debug)]
pub(crate) enum RemoteJob {
    /// `issued_revision` is the cart revision when the newest caller issued
    /// the fetch; a response is stale if the revision moved since.
    Fetch {
        issued_revision: u64,
        waiters: Vec<SyncWaiter>,
    },
    Sync {
        waiters: Vec<SyncWaiter>,
    },
    /// `synced_first` is set once a sync has been put ahead of this checkout.
    Checkout {
        respond_to: ServiceResponse<Order, CartError>,
        synced_first: bool,
    },
}

impl RemoteJob {
    pub(crate) fn kind(&self) -> RemoteKind {
        match self {
            RemoteJob::Fetch { .. } => RemoteKind::Fetch,
            RemoteJob::Sync { .. } => RemoteKind::Sync,
            RemoteJob::Checkout { .. } => RemoteKind::Checkout,
        }
    }

    pub(crate) fn cancel(self) {
        match self {
            RemoteJob::Fetch { waiters, .. } | RemoteJob::Sync { waiters } => {
                resolve(waiters, SyncOutcome::Cancelled);
            }
            RemoteJob::Checkout { respond_to, .. } => {
                let _ = respond_to.send(Err(CartError::Cancelled));
            }
        }
    }
}

pub(crate) fn resolve(waiters: Vec<SyncWaiter>, outcome: SyncOutcome) {
    for waiter in waiters {
        let _ = waiter.send(Ok(outcome.clone()));
    }
}

/// Serializes remote cart calls: at most one is in flight, the rest wait in
/// issue order.
///
/// A fetch or sync issued while one of the same kind is still queued joins
/// the queued call instead of adding another. Checkouts never merge.
#[derive(Debug, Default)]
pub(crate) struct RemoteQueue {
    next_ticket: u64,
    in_flight: Option<(u64, RemoteJob)>,
    pending: VecDeque<RemoteJob>,
}

impl RemoteQueue {
    pub(crate) fn enqueue_fetch(&mut self, revision: u64, waiter: SyncWaiter) {
        let queued = self.pending.iter_mut().find_map(|job| match job {
            RemoteJob::Fetch {
                issued_revision,
                waiters,
            } => Some((issued_revision, waiters)),
            _ => None,
        });
        match queued {
            Some((issued_revision, waiters)) => {
                *issued_revision = revision;
                waiters.push(waiter);
            }
            None => self.pending.push_back(RemoteJob::Fetch {
                issued_revision: revision,
                waiters: vec![waiter],
            }),
        }
    }

    pub(crate) fn enqueue_sync(&mut self, waiter: SyncWaiter) {
        let queued = self.pending.iter_mut().find_map(|job| match job {
            RemoteJob::Sync { waiters } => Some(waiters),
            _ => None,
        });
        match queued {
            Some(waiters) => waiters.push(waiter),
            None => self.pending.push_back(RemoteJob::Sync {
                waiters: vec![waiter],
            }),
        }
    }

    pub(crate) fn enqueue_checkout(&mut self, respond_to: ServiceResponse<Order, CartError>) {
        self.pending.push_back(RemoteJob::Checkout {
            respond_to,
            synced_first: false,
        });
    }

    /// Puts a job back at the head of the queue, ahead of everything waiting.
    pub(crate) fn push_front(&mut self, job: RemoteJob) {
        self.pending.push_front(job);
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Next job to dispatch, if the slot is free.
    pub(crate) fn pop_next(&mut self) -> Option<RemoteJob> {
        if self.is_busy() {
            return None;
        }
        self.pending.pop_front()
    }

    /// Occupies the slot and returns the ticket the completion must carry.
    pub(crate) fn start(&mut self, job: RemoteJob) -> u64 {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.in_flight = Some((ticket, job));
        ticket
    }

    /// Frees the slot if `ticket` names the call in flight.
    pub(crate) fn finish(&mut self, ticket: u64) -> Option<RemoteJob> {
        match &self.in_flight {
            Some((current, _)) if *current == ticket => {
                self.in_flight.take().map(|(_, job)| job)
            }
            _ => None,
        }
    }

    pub(crate) fn has_pending(&self, kind: RemoteKind) -> bool {
        self.pending.iter().any(|job| job.kind() == kind)
    }

    pub(crate) fn checkout_outstanding(&self) -> bool {
        let in_flight = matches!(&self.in_flight, Some((_, RemoteJob::Checkout { .. })));
        in_flight || self.has_pending(RemoteKind::Checkout)
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.pending.len() + usize::from(self.in_flight.is_some())
    }

    /// Answers every queued and in-flight caller with a cancellation.
    pub(crate) fn cancel_all(&mut self) {
        if let Some((_, job)) = self.in_flight.take() {
            job.cancel();
        }
        for job in self.pending.drain(..) {
            job.cancel();
        }
    }
}
