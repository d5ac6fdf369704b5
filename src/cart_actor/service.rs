use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};

use super::remote_queue::{resolve, RemoteJob, RemoteKind, RemoteQueue, SyncWaiter};
use super::{CartError, SyncOutcome};
use crate::cart_machine::{transition, CartOperation};
use crate::clients::CartClient;
use crate::domain::{
    ArtworkId, CartSnapshot, CartState, CheckoutStatus, NewLineItem, Order, Role, Session,
    SyncStatus,
};
use crate::messages::{CartRequest, RemoteCompletion, ServiceResponse};
use crate::remote::{ApiError, StorefrontApi};
use crate::session::SessionHandle;

/// Macro for clean error response handling
macro_rules! send_error {
    ($respond_to:expr, $error:expr) => {{
        let _ = $respond_to.send(Err($error));
        return;
    }};
}

/// Owns the cart of one storefront session.
///
/// Local mutations are applied as soon as their message is handled, even
/// while a remote call is outstanding. Remote calls run on spawned tasks and
/// report back through `completions`; [`RemoteQueue`] keeps at most one of
/// them in flight. Every local mutation bumps `revision`, which is how fetch
/// responses overtaken by local edits are recognised as stale.
///
/// `synced_revision` is the revision the server is known to hold. A checkout
/// is only sent when it matches `revision`; otherwise a sync goes first.
pub struct CartService<A: StorefrontApi> {
    receiver: mpsc::Receiver<CartRequest>,
    completions_tx: mpsc::UnboundedSender<RemoteCompletion>,
    completions: mpsc::UnboundedReceiver<RemoteCompletion>,
    api: Arc<A>,
    session: SessionHandle,
    session_rx: watch::Receiver<Session>,
    active_identity: Option<(u64, Role)>,
    state: CartState,
    revision: u64,
    synced_revision: Option<u64>,
    sync_dispatch_revision: u64,
    remote: RemoteQueue,
    observers: watch::Sender<CartState>,
}

impl<A: StorefrontApi> CartService<A> {
    pub fn new(buffer_size: usize, api: Arc<A>, session: SessionHandle) -> (Self, CartClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let (observers, state_rx) = watch::channel(CartState::default());
        let mut session_rx = session.subscribe();
        let active_identity = session_rx.borrow_and_update().identity().map(|i| i.key());

        let service = Self {
            receiver,
            completions_tx,
            completions,
            api,
            session,
            session_rx,
            active_identity,
            state: CartState::default(),
            revision: 0,
            synced_revision: None,
            sync_dispatch_revision: 0,
            remote: RemoteQueue::default(),
            observers,
        };
        let client = CartClient::new(sender, state_rx);
        (service, client)
    }

    #[instrument(name = "cart_service", skip(self))]
    pub async fn run(mut self) {
        info!("CartService starting");
        let mut session_open = true;

        loop {
            tokio::select! {
                msg = self.receiver.recv() => match msg {
                    Some(CartRequest::Shutdown) | None => {
                        info!("CartService shutting down");
                        break;
                    }
                    Some(msg) => self.handle_request(msg),
                },
                Some(completion) = self.completions.recv() => {
                    self.handle_completion(completion);
                }
                changed = self.session_rx.changed(), if session_open => match changed {
                    Ok(()) => self.handle_session_change(),
                    Err(_) => {
                        warn!("Session handle dropped, no longer watching logins");
                        session_open = false;
                    }
                },
            }
        }

        self.remote.cancel_all();
        info!("CartService stopped");
    }

    fn handle_request(&mut self, msg: CartRequest) {
        self.observe_session();
        match msg {
            CartRequest::Add { item, respond_to } => self.handle_add(item, respond_to),
            CartRequest::UpdateQuantity {
                artwork_id,
                quantity,
                respond_to,
            } => self.handle_update_quantity(artwork_id, quantity, respond_to),
            CartRequest::Remove {
                artwork_id,
                respond_to,
            } => self.handle_remove(artwork_id, respond_to),
            CartRequest::Clear { respond_to } => {
                debug!("Processing clear request");
                self.apply_local(CartOperation::Clear);
                let _ = respond_to.send(Ok(self.state.clone()));
            }
            CartRequest::Snapshot { respond_to } => {
                let _ = respond_to.send(Ok(self.state.clone()));
            }
            CartRequest::FetchCart { respond_to } => self.handle_fetch_cart(respond_to),
            CartRequest::SyncCart { respond_to } => self.handle_sync_cart(respond_to),
            CartRequest::Checkout { respond_to } => self.handle_checkout(respond_to),
            CartRequest::OrderHistory { respond_to } => self.handle_order_history(respond_to),
            CartRequest::Shutdown => {}
            #[cfg(test)]
            CartRequest::PendingRemoteCalls { respond_to } => {
                let _ = respond_to.send(Ok(self.remote.outstanding()));
            }
        }
    }

    // =========================================================================
    // Local mutations
    // =========================================================================

    #[instrument(
        fields(artwork_id = item.artwork_id, price = item.unit_price),
        skip(self, item, respond_to)
    )]
    fn handle_add(&mut self, item: NewLineItem, respond_to: ServiceResponse<CartState, CartError>) {
        debug!("Processing add request");
        self.apply_local(CartOperation::Add(item));
        info!(total = self.state.total(), lines = self.state.items().len(), "Item added");
        let _ = respond_to.send(Ok(self.state.clone()));
    }

    #[instrument(skip(self, respond_to))]
    fn handle_update_quantity(
        &mut self,
        artwork_id: ArtworkId,
        quantity: i64,
        respond_to: ServiceResponse<CartState, CartError>,
    ) {
        debug!("Processing update_quantity request");
        self.apply_local(CartOperation::UpdateQuantity {
            artwork_id,
            quantity,
        });
        let _ = respond_to.send(Ok(self.state.clone()));
    }

    #[instrument(skip(self, respond_to))]
    fn handle_remove(
        &mut self,
        artwork_id: ArtworkId,
        respond_to: ServiceResponse<CartState, CartError>,
    ) {
        debug!("Processing remove request");
        self.apply_local(CartOperation::Remove(artwork_id));
        let _ = respond_to.send(Ok(self.state.clone()));
    }

    /// Runs a local operation through the pure transition. Only an actual
    /// change of the lines counts as a mutation for staleness purposes.
    fn apply_local(&mut self, operation: CartOperation) {
        let name = operation.name();
        let next = transition(self.state.clone(), operation);
        if next.items() != self.state.items() {
            self.revision += 1;
            debug!(operation = name, revision = self.revision, "Cart mutated");
        }
        self.state = next;
        self.publish();
    }

    fn publish(&self) {
        self.observers.send_replace(self.state.clone());
    }

    // =========================================================================
    // Remote calls
    // =========================================================================

    #[instrument(skip(self, respond_to))]
    fn handle_fetch_cart(&mut self, respond_to: ServiceResponse<SyncOutcome, CartError>) {
        debug!("Processing fetch_cart request");
        if !self.session_rx.borrow().is_customer() {
            send_error!(respond_to, CartError::NotPermitted);
        }
        self.remote.enqueue_fetch(self.revision, respond_to);
        self.pump();
    }

    #[instrument(skip(self, respond_to))]
    fn handle_sync_cart(&mut self, respond_to: ServiceResponse<SyncOutcome, CartError>) {
        debug!("Processing sync_cart request");
        if !self.session_rx.borrow().is_customer() {
            send_error!(respond_to, CartError::NotPermitted);
        }
        if self.state.is_empty() {
            debug!("Cart is empty, nothing to sync");
            let _ = respond_to.send(Ok(SyncOutcome::Skipped));
            return;
        }
        self.remote.enqueue_sync(respond_to);
        self.pump();
    }

    #[instrument(
        fields(lines = self.state.items().len(), total = self.state.total()),
        skip(self, respond_to)
    )]
    fn handle_checkout(&mut self, respond_to: ServiceResponse<Order, CartError>) {
        debug!("Processing checkout request");
        if !self.session_rx.borrow().is_customer() {
            send_error!(respond_to, CartError::NotPermitted);
        }
        if self.state.is_empty() {
            warn!("Checkout rejected: cart is empty");
            send_error!(respond_to, CartError::EmptyCart);
        }
        if self.remote.checkout_outstanding() {
            warn!("Checkout rejected: another checkout is outstanding");
            send_error!(respond_to, CartError::CheckoutInProgress);
        }
        self.state.checkout_status = CheckoutStatus::Pending;
        self.publish();
        self.remote.enqueue_checkout(respond_to);
        self.pump();
    }

    /// Read-only, so it bypasses the remote queue. A rejected token still
    /// tears the session down.
    #[instrument(skip(self, respond_to))]
    fn handle_order_history(&mut self, respond_to: ServiceResponse<Vec<Order>, CartError>) {
        debug!("Processing order_history request");
        let Some(token) = self.session_rx.borrow().customer_token().map(str::to_owned) else {
            send_error!(respond_to, CartError::NotPermitted);
        };
        let api = Arc::clone(&self.api);
        let session = self.session.clone();

        tokio::spawn(async move {
            let result = api.list_orders(&token).await;
            if let Err(ApiError::Unauthorized(reason)) = &result {
                session.deauthenticate(reason);
            }
            match &result {
                Ok(orders) => info!(order_count = orders.len(), "Order history loaded"),
                Err(e) => error!(error = %e, "Order history failed"),
            }
            let _ = respond_to.send(result.map_err(CartError::from));
        });
    }

    /// Dispatches queued calls while the slot is free. Calls that can be
    /// answered without the network are resolved here and the loop moves on.
    fn pump(&mut self) {
        while let Some(job) = self.remote.pop_next() {
            let token = self.session_rx.borrow().customer_token().map(str::to_owned);
            let Some(token) = token else {
                debug!("Session no longer allows cart calls");
                match job {
                    RemoteJob::Fetch { waiters, .. } | RemoteJob::Sync { waiters } => {
                        resolve(waiters, SyncOutcome::Failed(CartError::NotPermitted));
                    }
                    RemoteJob::Checkout { respond_to, .. } => {
                        self.state.checkout_status = CheckoutStatus::Failed {
                            message: CartError::NotPermitted.to_string(),
                        };
                        self.publish();
                        let _ = respond_to.send(Err(CartError::NotPermitted));
                    }
                }
                continue;
            };

            match job {
                RemoteJob::Fetch { .. } => self.dispatch_fetch(job, token),
                RemoteJob::Sync { waiters } if self.state.is_empty() => {
                    debug!("Cart emptied before sync was sent");
                    resolve(waiters, SyncOutcome::Skipped);
                }
                RemoteJob::Sync { .. } => self.dispatch_sync(job, token),
                RemoteJob::Checkout { respond_to, .. } if self.state.is_empty() => {
                    warn!("Cart emptied before checkout was sent");
                    self.state.checkout_status = CheckoutStatus::Failed {
                        message: CartError::EmptyCart.to_string(),
                    };
                    self.publish();
                    let _ = respond_to.send(Err(CartError::EmptyCart));
                }
                RemoteJob::Checkout { .. } if self.synced_revision == Some(self.revision) => {
                    self.dispatch_checkout(job, token)
                }
                RemoteJob::Checkout {
                    respond_to,
                    synced_first: false,
                } => {
                    debug!(revision = self.revision, "Pushing cart before checkout");
                    self.remote.push_front(RemoteJob::Checkout {
                        respond_to,
                        synced_first: true,
                    });
                    self.remote.push_front(RemoteJob::Sync { waiters: Vec::new() });
                }
                RemoteJob::Checkout { respond_to, .. } => {
                    warn!("Cart could not be synced before checkout");
                    self.state.checkout_status = CheckoutStatus::Failed {
                        message: CartError::NotSynced.to_string(),
                    };
                    self.publish();
                    let _ = respond_to.send(Err(CartError::NotSynced));
                }
            }
        }
    }

    fn dispatch_fetch(&mut self, job: RemoteJob, token: String) {
        let ticket = self.remote.start(job);
        self.mark_syncing();
        let api = Arc::clone(&self.api);
        let completions = self.completions_tx.clone();
        debug!(ticket, "Fetching remote cart");

        tokio::spawn(async move {
            let result = api.get_cart(&token).await;
            let _ = completions.send(RemoteCompletion::Fetched { ticket, result });
        });
    }

    fn dispatch_sync(&mut self, job: RemoteJob, token: String) {
        // Snapshot at dispatch time so a sync queued behind a fetch pushes the
        // fetched lines.
        let items = self.state.items().to_vec();
        self.sync_dispatch_revision = self.revision;
        let ticket = self.remote.start(job);
        self.mark_syncing();
        let api = Arc::clone(&self.api);
        let completions = self.completions_tx.clone();
        debug!(ticket, lines = items.len(), "Pushing cart to remote");

        tokio::spawn(async move {
            let result = api.sync_cart(&token, &items).await;
            let _ = completions.send(RemoteCompletion::Synced { ticket, result });
        });
    }

    fn dispatch_checkout(&mut self, job: RemoteJob, token: String) {
        let ticket = self.remote.start(job);
        let api = Arc::clone(&self.api);
        let completions = self.completions_tx.clone();
        info!(ticket, total = self.state.total(), "Requesting checkout");

        tokio::spawn(async move {
            let result = api.checkout(&token).await;
            let _ = completions.send(RemoteCompletion::CheckedOut { ticket, result });
        });
    }

    fn mark_syncing(&mut self) {
        self.state.sync_status = SyncStatus::Syncing;
        self.publish();
    }

    // =========================================================================
    // Completions
    // =========================================================================

    #[instrument(fields(ticket = completion.ticket()), skip(self, completion))]
    fn handle_completion(&mut self, completion: RemoteCompletion) {
        self.observe_session();
        let Some(job) = self.remote.finish(completion.ticket()) else {
            debug!("Ignoring completion of a cancelled call");
            return;
        };

        match (job, completion) {
            (
                RemoteJob::Fetch {
                    issued_revision,
                    waiters,
                },
                RemoteCompletion::Fetched { result, .. },
            ) => self.complete_fetch(issued_revision, waiters, result),
            (RemoteJob::Sync { waiters }, RemoteCompletion::Synced { result, .. }) => {
                self.complete_sync(waiters, result)
            }
            (
                RemoteJob::Checkout { respond_to, .. },
                RemoteCompletion::CheckedOut { result, .. },
            ) => {
                self.complete_checkout(respond_to, result)
            }
            (job, completion) => {
                error!(
                    job = ?job.kind(),
                    completion = ?completion,
                    "Completion does not match the call in flight"
                );
                job.cancel();
            }
        }

        self.pump();
    }

    fn complete_fetch(
        &mut self,
        issued_revision: u64,
        waiters: Vec<SyncWaiter>,
        result: Result<CartSnapshot, ApiError>,
    ) {
        match result {
            Err(ApiError::Unauthorized(reason)) => {
                resolve(waiters, SyncOutcome::Failed(CartError::Unauthorized(reason.clone())));
                self.handle_unauthorized(&reason);
            }
            _ if self.remote.has_pending(RemoteKind::Fetch) => {
                debug!("Fetch superseded by a newer fetch");
                resolve(waiters, SyncOutcome::Superseded);
            }
            Ok(_) if issued_revision != self.revision => {
                info!(
                    issued_revision,
                    current_revision = self.revision,
                    "Discarding stale fetch response"
                );
                self.state.sync_status = SyncStatus::Idle;
                self.publish();
                resolve(waiters, SyncOutcome::Stale);
            }
            Ok(snapshot) => {
                info!(
                    lines = snapshot.items.len(),
                    total = snapshot.total,
                    "Cart replaced from remote"
                );
                let mut next = transition(self.state.clone(), CartOperation::Replace(snapshot));
                next.sync_status = SyncStatus::Idle;
                self.state = next;
                self.synced_revision = Some(self.revision);
                self.publish();
                resolve(waiters, SyncOutcome::Applied);
            }
            Err(e) => {
                error!(error = %e, "Fetch failed, keeping local cart");
                self.record_sync_failure(waiters, e);
            }
        }
    }

    fn complete_sync(&mut self, waiters: Vec<SyncWaiter>, result: Result<(), ApiError>) {
        let superseded = self.remote.has_pending(RemoteKind::Sync);
        match result {
            Err(ApiError::Unauthorized(reason)) => {
                resolve(waiters, SyncOutcome::Failed(CartError::Unauthorized(reason.clone())));
                self.handle_unauthorized(&reason);
            }
            Ok(()) => {
                // The server holds this payload whether or not a newer sync follows.
                self.synced_revision = Some(self.sync_dispatch_revision);
                if superseded {
                    debug!("Sync superseded by a newer sync");
                    resolve(waiters, SyncOutcome::Superseded);
                    return;
                }
                info!(revision = self.sync_dispatch_revision, "Cart synced");
                self.state.sync_status = SyncStatus::Idle;
                self.publish();
                resolve(waiters, SyncOutcome::Applied);
            }
            Err(_) if superseded => {
                debug!("Sync superseded by a newer sync");
                resolve(waiters, SyncOutcome::Superseded);
            }
            Err(e) => {
                error!(error = %e, "Sync failed, keeping local cart");
                self.record_sync_failure(waiters, e);
            }
        }
    }

    fn record_sync_failure(&mut self, waiters: Vec<SyncWaiter>, e: ApiError) {
        let e = CartError::from(e);
        self.state.sync_status = SyncStatus::Error {
            message: e.to_string(),
        };
        self.publish();
        resolve(waiters, SyncOutcome::Failed(e));
    }

    fn complete_checkout(
        &mut self,
        respond_to: ServiceResponse<Order, CartError>,
        result: Result<Order, ApiError>,
    ) {
        match result {
            Ok(order) => {
                info!(order_id = order.order_id, total = order.total_amount, "Checkout completed");
                let mut next = transition(self.state.clone(), CartOperation::Clear);
                next.checkout_status = CheckoutStatus::Idle;
                self.state = next;
                self.revision += 1;
                self.publish();
                let _ = respond_to.send(Ok(order));
            }
            Err(e) => {
                error!(error = %e, "Checkout failed, cart left unchanged");
                let unauthorized = match &e {
                    ApiError::Unauthorized(reason) => Some(reason.clone()),
                    _ => None,
                };
                let e = CartError::from(e);
                self.state.checkout_status = CheckoutStatus::Failed {
                    message: e.to_string(),
                };
                self.publish();
                let _ = respond_to.send(Err(e));
                if let Some(reason) = unauthorized {
                    self.handle_unauthorized(&reason);
                }
            }
        }
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// The server rejected the token: end the session, which destroys the cart.
    fn handle_unauthorized(&mut self, reason: &str) {
        warn!(%reason, "Remote cart rejected the session token");
        self.session.deauthenticate(reason);
        self.active_identity = self.session_rx.borrow_and_update().identity().map(|i| i.key());
        self.reset("session rejected");
    }

    /// Applies a session change the `run` loop has not picked up yet, so a
    /// request never acts on a session the cart has not adjusted to.
    fn observe_session(&mut self) {
        if self.session_rx.has_changed().unwrap_or(false) {
            self.handle_session_change();
        }
    }

    #[instrument(skip(self))]
    fn handle_session_change(&mut self) {
        let key = self.session_rx.borrow_and_update().identity().map(|i| i.key());
        if key == self.active_identity {
            return;
        }
        let previous = std::mem::replace(&mut self.active_identity, key);
        match previous {
            Some(_) => self.reset("session ended"),
            None => info!("Session started, keeping guest cart"),
        }
    }

    fn reset(&mut self, reason: &'static str) {
        info!(reason, "Resetting cart");
        self.remote.cancel_all();
        self.state = CartState::default();
        self.revision += 1;
        self.synced_revision = None;
        self.publish();
    }
}
