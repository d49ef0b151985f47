//! Cart commands.

pub mod carts;
pub mod lines;

use merchant_cart::CartError;

/// Log the outcome of a failed mutation before handing the error back.
///
/// A persistence failure still changed the in-memory cart, but this process
/// exits right after, so the change is lost; say so explicitly.
fn report(err: CartError) -> CartError {
    if err.mutation_retained() {
        tracing::warn!("Cart was updated but could not be saved; the change will not survive this command");
    }
    err
}
