//! Background reconciliation with the remote cart.
//!
//! Mirrors what the storefront's cart page does: pull the server cart when a
//! customer session begins, and push the cart whenever its lines change.
//! Calls are fired on their own tasks; the cart actor serializes them.

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn, Instrument};

use crate::cart_actor::SyncOutcome;
use crate::clients::CartClient;
use crate::domain::{CartLineItem, Role, Session};

#[instrument(name = "auto_sync", skip_all)]
pub async fn run(cart: CartClient, mut session: watch::Receiver<Session>) {
    info!("Auto sync starting");
    let mut state = cart.subscribe();
    let mut last_items: Vec<CartLineItem> = state.borrow_and_update().items().to_vec();
    let mut customer = customer_key(&session.borrow_and_update());
    if customer.is_some() {
        spawn_fetch(&cart);
    }
    let mut session_open = true;

    loop {
        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let items = state.borrow_and_update().items().to_vec();
                if items == last_items {
                    continue;
                }
                last_items = items;
                if customer.is_some() && !last_items.is_empty() {
                    spawn_sync(&cart);
                }
            }
            changed = session.changed(), if session_open => {
                if changed.is_err() {
                    session_open = false;
                    continue;
                }
                let next = customer_key(&session.borrow_and_update());
                let started = next.is_some() && next != customer;
                customer = next;
                if started {
                    spawn_fetch(&cart);
                }
            }
        }
    }

    info!("Auto sync stopped");
}

fn customer_key(session: &Session) -> Option<(u64, Role)> {
    session
        .identity()
        .filter(|_| session.is_customer())
        .map(|identity| identity.key())
}

fn spawn_fetch(cart: &CartClient) {
    let cart = cart.clone();
    tokio::spawn(
        async move {
            match cart.fetch_cart().await {
                Ok(outcome) => log_outcome(&outcome),
                Err(e) => warn!(error = %e, "Fetch request failed"),
            }
        }
        .instrument(tracing::info_span!("auto_fetch")),
    );
}

fn spawn_sync(cart: &CartClient) {
    let cart = cart.clone();
    tokio::spawn(
        async move {
            match cart.sync_cart().await {
                Ok(outcome) => log_outcome(&outcome),
                Err(e) => warn!(error = %e, "Sync request failed"),
            }
        }
        .instrument(tracing::info_span!("auto_sync_push")),
    );
}

fn log_outcome(outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::Failed(e) => warn!(error = %e, "Remote cart call failed"),
        other => debug!(outcome = ?other, "Remote cart call finished"),
    }
}
