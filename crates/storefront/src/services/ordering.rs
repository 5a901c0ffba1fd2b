//! Order placement service.

use chrono::{DateTime, Utc};
use fast_pizza_core::{Cart, FieldErrors, Order, OrderId, OrderSubmission};
use tracing::instrument;

use crate::error::Result;
use crate::restaurant::RestaurantApi;

/// What happened to an order submission.
#[derive(Debug)]
pub enum CreateOrderOutcome {
    /// Nothing to order; the form was not looked at.
    EmptyCart,
    /// Field errors to show next to the inputs. The restaurant was not called.
    Invalid(FieldErrors),
    /// The restaurant accepted the order and the cart was cleared.
    Placed(Order),
}

/// Places orders and upgrades them to priority.
pub struct OrderingService<'a, A> {
    api: &'a A,
}

impl<'a, A: RestaurantApi> OrderingService<'a, A> {
    /// Create a new ordering service.
    #[must_use]
    pub const fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Submit an order for the given cart.
    ///
    /// An empty cart, either the visitor's or the submitted snapshot,
    /// short-circuits before validation. Invalid fields come back as
    /// [`CreateOrderOutcome::Invalid`]. On success the cart is cleared.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Submission` for a malformed cart snapshot or
    /// position, and `AppError::Restaurant` when the restaurant rejects or
    /// fails the request.
    #[instrument(skip(self, cart, submission), fields(cart_lines = cart.items().len()))]
    pub async fn create_order(
        &self,
        cart: &mut Cart,
        submission: OrderSubmission,
        now: DateTime<Utc>,
    ) -> Result<CreateOrderOutcome> {
        if cart.is_empty() {
            return Ok(CreateOrderOutcome::EmptyCart);
        }
        let snapshot = Cart::from_snapshot(&submission.cart)
            .map_err(fast_pizza_core::SubmissionError::from)?;
        if snapshot.is_empty() {
            return Ok(CreateOrderOutcome::EmptyCart);
        }

        let errors = submission.validate();
        if !errors.is_empty() {
            tracing::debug!(invalid = %errors, "Order form rejected");
            return Ok(CreateOrderOutcome::Invalid(errors));
        }

        let new_order = submission.into_new_order(now)?;
        let order = self.api.create_order(&new_order).await?;
        cart.clear();

        Ok(CreateOrderOutcome::Placed(order))
    }

    /// Mark an order as priority.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Restaurant` when the update fails; the order is
    /// left as it was.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn prioritize(&self, id: &OrderId) -> Result<()> {
        self.api.update_order_priority(id).await?;
        Ok(())
    }
}
