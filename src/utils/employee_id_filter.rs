use std::sync::{PoisonError, RwLock};

use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use once_cell::sync::Lazy;

use crate::store::PrincipalStore;

/// Expected capacity and false-positive rate.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static EMPLOYEE_ID_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

#[inline]
fn normalize(employee_id: &str) -> String {
    employee_id.trim().to_lowercase()
}

/// `false` means the employee id is definitely free; `true` means ask the store.
pub fn might_exist(employee_id: &str) -> bool {
    EMPLOYEE_ID_FILTER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains(&normalize(employee_id))
}

pub fn insert(employee_id: &str) {
    EMPLOYEE_ID_FILTER
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .add(&normalize(employee_id));
}

pub fn remove(employee_id: &str) {
    EMPLOYEE_ID_FILTER
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&normalize(employee_id));
}

/// Loads every existing employee id, `batch_size` per write lock.
pub async fn warmup_employee_id_filter(
    store: &dyn PrincipalStore,
    batch_size: usize,
) -> Result<()> {
    let codes = store
        .employee_codes()
        .await
        .map_err(|e| anyhow!("employee id fetch failed: {}", e))?;

    for batch in codes.chunks(batch_size.max(1)) {
        let mut filter = EMPLOYEE_ID_FILTER
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for code in batch {
            filter.add(&normalize(code));
        }
    }

    log::info!("Employee id filter warmup complete: {} ids", codes.len());
    Ok(())
}
