use std::sync::Arc;

use tracing::{debug, trace};

use crate::errors::Result;
use crate::storage::{LinkStore, ViewCharge};

/// Charges views through the store's atomic conditional increment
///
/// The ceiling is re-checked by the store at update time, not taken from an
/// earlier evaluation, so two readers racing for the last slot cannot both
/// win.
#[derive(Clone)]
pub struct ViewAccountant {
    store: Arc<dyn LinkStore>,
}

impl ViewAccountant {
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self { store }
    }

    pub async fn charge_view(&self, id: &str) -> Result<ViewCharge> {
        let charge = self.store.conditional_increment_view(id).await?;
        match charge {
            ViewCharge::Charged(count) => trace!("View charged for '{}': {}", id, count),
            ViewCharge::LimitReached => debug!("View limit reached for '{}' at charge time", id),
            ViewCharge::NotFound => debug!("Link '{}' vanished before charge", id),
        }
        Ok(charge)
    }
}
