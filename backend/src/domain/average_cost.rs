//! Aggregate Maintainer for a bootcamp's `averageCost`.
//!
//! After every course write the mean tuition of the bootcamp's courses is
//! recomputed, rounded up to a multiple of ten, and stored on the bootcamp.
//! Recomputation never fails its caller: problems are logged and the stored
//! value is left as it was. Recomputations for one bootcamp run one at a
//! time so the last write reflects the latest course set.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tracing::{info, warn};

use super::course::BOOTCAMP_FIELD;
use super::ports::DocumentStore;
use super::query::Filter;
use super::{Collection, DocumentId};

/// Bootcamp field written by the maintainer.
pub const AVERAGE_COST_FIELD: &str = "averageCost";

const TUITION_FIELD: &str = "tuition";

/// Largest magnitude an `f64` holds exactly as an integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Round `mean` up to the nearest multiple of ten.
///
/// Returns `None` when `mean` is not finite or too large to store as an
/// integer.
///
/// # Examples
/// ```
/// use devcamper::domain::round_up_to_ten;
///
/// assert_eq!(round_up_to_ten(1566.67), Some(1570));
/// assert_eq!(round_up_to_ten(1250.0), Some(1250));
/// assert_eq!(round_up_to_ten(f64::NAN), None);
/// ```
#[must_use]
#[expect(clippy::float_arithmetic, reason = "a mean tuition is fractional")]
pub fn round_up_to_ten(mean: f64) -> Option<i64> {
    let tens = (mean / 10.0).ceil();
    if !tens.is_finite() || tens.abs() > MAX_EXACT_INTEGER / 10.0 {
        return None;
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "whole and inside the exact integer range"
    )]
    let whole_tens = tens as i64;
    whole_tens.checked_mul(10)
}

type LockMap = HashMap<DocumentId, Arc<tokio::sync::Mutex<()>>>;

/// Keeps `averageCost` in step with a bootcamp's courses.
pub struct AverageCostMaintainer<S: ?Sized> {
    store: Arc<S>,
    locks: Arc<Mutex<LockMap>>,
}

impl<S: ?Sized> Clone for AverageCostMaintainer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<S> AverageCostMaintainer<S>
where
    S: DocumentStore + ?Sized,
{
    /// Create a maintainer over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Recompute and store the average cost of `bootcamp_id`.
    ///
    /// Returns the value written, or `None` when nothing was written.
    pub async fn recompute(&self, bootcamp_id: DocumentId) -> Option<i64> {
        let lock = self.lock_for(bootcamp_id);
        let written = {
            let _guard = lock.lock().await;
            self.recompute_locked(bootcamp_id).await
        };
        self.release(bootcamp_id, lock);
        written
    }

    async fn recompute_locked(&self, bootcamp_id: DocumentId) -> Option<i64> {
        let filter = Filter::field_equals(BOOTCAMP_FIELD, bootcamp_id);
        let mean = match self
            .store
            .average(Collection::Courses, &filter, TUITION_FIELD)
            .await
        {
            Ok(Some(mean)) => mean,
            Ok(None) => {
                info!(%bootcamp_id, "no courses remain; average cost left unchanged");
                return None;
            }
            Err(error) => {
                warn!(%bootcamp_id, %error, "average cost aggregation failed");
                return None;
            }
        };

        let Some(cost) = round_up_to_ten(mean) else {
            warn!(%bootcamp_id, mean, "average cost is not a storable number");
            return None;
        };
        match self
            .store
            .set_field(
                Collection::Bootcamps,
                bootcamp_id,
                AVERAGE_COST_FIELD,
                Value::from(cost),
            )
            .await
        {
            Ok(true) => {
                info!(%bootcamp_id, average_cost = cost, "average cost updated");
                Some(cost)
            }
            Ok(false) => {
                warn!(%bootcamp_id, "bootcamp missing; average cost not stored");
                None
            }
            Err(error) => {
                warn!(%bootcamp_id, %error, "failed to store average cost");
                None
            }
        }
    }

    fn lock_for(&self, bootcamp_id: DocumentId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(bootcamp_id).or_default())
    }

    fn release(&self, bootcamp_id: DocumentId, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one held here: nobody else is waiting.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&bootcamp_id);
        }
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
