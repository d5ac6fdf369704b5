//! Pure cart state transitions.
//!
//! [`transition`] is the only code that changes cart lines. It performs no I/O
//! and knows nothing about sessions or the remote cart; the cart actor layers
//! the asynchronous orchestration on top of it.

mod actions;

pub use actions::*;

use crate::domain::{CartLineItem, CartState};

/// Applies one operation and returns the resulting state.
///
/// After every local mutation `total` equals the sum of `unit_price * quantity`
/// over the remaining lines. `Replace` takes the server's total verbatim.
pub fn transition(mut state: CartState, operation: CartOperation) -> CartState {
    match operation {
        CartOperation::Add(item) => {
            match state
                .items
                .iter_mut()
                .find(|line| line.artwork_id == item.artwork_id)
            {
                Some(line) => line.quantity = line.quantity.saturating_add(1),
                None => state.items.push(CartLineItem::from(item)),
            }
        }
        CartOperation::UpdateQuantity {
            artwork_id,
            quantity,
        } => {
            let clamped = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);
            if clamped == 0 {
                state.items.retain(|line| line.artwork_id != artwork_id);
            } else if let Some(line) = state
                .items
                .iter_mut()
                .find(|line| line.artwork_id == artwork_id)
            {
                line.quantity = clamped;
            }
        }
        CartOperation::Remove(artwork_id) => {
            state.items.retain(|line| line.artwork_id != artwork_id);
        }
        CartOperation::Clear => state.items.clear(),
        CartOperation::Replace(snapshot) => {
            state.items = snapshot.items;
            state.total = snapshot.total;
            return state;
        }
    }
    state.recompute_total();
    state
}
