//! Scratch pool for job systems that extract several collections at once.
//!
//! Each job leases an `Extractor` for the duration of one extraction and
//! hands it back on drop. A lease is exclusive, so two jobs never share one
//! scratch buffer. Extractors are created on demand and reused forever.

use parking_lot::Mutex;

use crate::extract::Extractor;
use crate::sort::SortKey;

/// A pool of extractors shared between threads.
#[derive(Debug, Default)]
pub struct ScratchPool {
    idle: Mutex<Vec<Extractor>>,
    sort_key: SortKey,
}

impl ScratchPool {
    /// An empty pool whose extractors sort by `sort_key`.
    #[must_use]
    pub fn new(sort_key: SortKey) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            sort_key,
        }
    }

    /// A pool with `count` extractors allocated up front.
    #[must_use]
    pub fn with_prewarmed(count: usize, sort_key: SortKey) -> Self {
        let idle = (0..count)
            .map(|_| Extractor::new().with_sort_key(sort_key))
            .collect();
        Self {
            idle: Mutex::new(idle),
            sort_key,
        }
    }

    /// Takes an idle extractor, allocating one if none is free.
    pub fn acquire(&self) -> ScratchLease<'_> {
        let pooled = self.idle.lock().pop();
        let extractor = pooled.unwrap_or_else(|| {
            tracing::debug!("scratch pool empty, allocating an extractor");
            Extractor::new().with_sort_key(self.sort_key)
        });
        ScratchLease {
            pool: self,
            extractor,
        }
    }

    /// Extractors waiting to be leased.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    fn release(&self, extractor: Extractor) {
        self.idle.lock().push(extractor);
    }
}

/// Exclusive use of one extractor. Returned to the pool when dropped.
pub struct ScratchLease<'a> {
    pool: &'a ScratchPool,
    extractor: Extractor,
}

impl std::ops::Deref for ScratchLease<'_> {
    type Target = Extractor;

    fn deref(&self) -> &Self::Target {
        &self.extractor
    }
}

impl std::ops::DerefMut for ScratchLease<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.extractor
    }
}

impl Drop for ScratchLease<'_> {
    fn drop(&mut self) {
        // Zero capacity: the placeholder owns no scratch memory.
        let extractor = std::mem::replace(&mut self.extractor, Extractor::with_capacity(0));
        self.pool.release(extractor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_core::ParticleCollection;
    use cinder_shared::{Vec3, MAX_PARTICLES_PER_SYSTEM};

    use crate::visibility::VisibilityScalars;

    #[test]
    fn test_lease_returns_to_pool() {
        let pool = ScratchPool::with_prewarmed(2, SortKey::CreationTime);
        assert_eq!(pool.idle_count(), 2);

        {
            let a = pool.acquire();
            let _b = pool.acquire();
            assert_eq!(pool.idle_count(), 0);
            assert_eq!(a.sort_key(), SortKey::CreationTime);
            assert_eq!(a.capacity(), MAX_PARTICLES_PER_SYSTEM);
        }
        assert_eq!(pool.idle_count(), 2);
    }

    #[test]
    fn test_empty_pool_allocates() {
        let pool = ScratchPool::new(SortKey::CameraDistance);
        {
            let mut lease = pool.acquire();
            let collection = ParticleCollection::with_capacity(8).expect("valid settings");
            let list = lease.generate_index_list(
                &collection,
                Vec3::ZERO,
                &VisibilityScalars::NONE,
                true,
            );
            assert!(list.is_empty());
        }
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn test_concurrent_leases() {
        let pool = ScratchPool::new(SortKey::CameraDistance);

        std::thread::scope(|scope| {
            for worker in 0..4_u8 {
                let pool = &pool;
                scope.spawn(move || {
                    let mut collection =
                        ParticleCollection::with_capacity(32).expect("valid settings");
                    collection.begin_step(0.1, false);
                    let slots = collection.allocate(10 + usize::from(worker));
                    for i in slots {
                        collection.attributes_mut().position[i] = Vec3::new(i as f32, 0.0, 0.0);
                    }

                    let mut lease = pool.acquire();
                    let list = lease.generate_index_list(
                        &collection,
                        Vec3::ZERO,
                        &VisibilityScalars::NONE,
                        true,
                    );
                    assert_eq!(list.len(), 10 + usize::from(worker));
                    assert_eq!(list[0].index, 0);
                });
            }
        });

        assert!(pool.idle_count() >= 1);
        assert!(pool.idle_count() <= 4);
    }
}
