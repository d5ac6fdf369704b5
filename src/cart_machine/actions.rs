use crate::domain::{ArtworkId, CartSnapshot, NewLineItem};

/// State transitions the cart understands.
///
/// Every variant except [`CartOperation::Replace`] is a local mutation issued by
/// the presentation layer. `Replace` installs the authoritative contents
/// returned by the remote cart.
#[derive(Debug, Clone, PartialEq)]
pub enum CartOperation {
    /// Adds one unit of an artwork, appending a new line if it is not present yet.
    Add(NewLineItem),
    /// Sets the quantity of an existing line.
    ///
    /// # Arguments
    /// * `quantity` - Requested quantity; negative values are clamped to zero
    ///   and zero removes the line
    UpdateQuantity { artwork_id: ArtworkId, quantity: i64 },
    /// Removes a line if present.
    Remove(ArtworkId),
    /// Empties the cart.
    Clear,
    /// Replaces items and total wholesale with server values.
    Replace(CartSnapshot),
}

impl CartOperation {
    pub fn name(&self) -> &'static str {
        match self {
            CartOperation::Add(_) => "add",
            CartOperation::UpdateQuantity { .. } => "update_quantity",
            CartOperation::Remove(_) => "remove",
            CartOperation::Clear => "clear",
            CartOperation::Replace(_) => "replace",
        }
    }
}
