use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use crate::model::ProductRecord;

/// Short-lived in-process cache for the read-mostly product listing so the
/// public catalog endpoint does not hit the database on every request.
#[derive(Debug)]
pub struct ProductCache {
    listings: Cache<(), Arc<Vec<ProductRecord>>>,
}

impl ProductCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

    pub fn new(ttl: Duration) -> Self {
        Self {
            listings: Cache::builder().time_to_live(ttl).max_capacity(1).build(),
        }
    }

    pub fn get(&self) -> Option<Arc<Vec<ProductRecord>>> {
        self.listings.get(&())
    }

    pub fn store(&self, products: Vec<ProductRecord>) -> Arc<Vec<ProductRecord>> {
        let shared = Arc::new(products);
        self.listings.insert((), shared.clone());
        shared
    }

    /// Drops the cached listing, e.g. after a purchase bumps a counter.
    pub fn invalidate(&self) {
        self.listings.invalidate(&());
    }
}

impl Default for ProductCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}
