//! # Render Order Sorting
//!
//! Binary-heap sort over the extractor's scratch buffer.
//!
//! ```text
//!   heapify (max-heap)  ->  swap root to the end  ->  sift down  ->  repeat
//! ```
//!
//! Ascending by key, in place, no allocation. The order of equal keys is
//! whatever the heap produces. NaN keys sort after every number.

use std::cmp::Ordering;

use cinder_shared::Vec3;

/// Which value a render record is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Squared distance to the camera.
    #[default]
    CameraDistance,
    /// Creation timestamp, oldest first.
    CreationTime,
}

impl SortKey {
    /// Key for a particle at `position` created at `creation_time`.
    #[inline]
    #[must_use]
    pub fn key(self, position: Vec3, camera: Vec3, creation_time: f32) -> f32 {
        match self {
            Self::CameraDistance => position.distance_squared(camera),
            Self::CreationTime => creation_time,
        }
    }
}

/// Anything the heap sort can order.
pub trait SortKeyed {
    /// The value records are ordered by.
    fn sort_key(&self) -> f32;
}

/// Total order on keys with every NaN after every number.
#[inline]
fn key_order(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

/// Sorts `items` ascending by key.
pub fn heap_sort<T: SortKeyed>(items: &mut [T]) {
    let len = items.len();
    if len < 2 {
        return;
    }

    for root in (0..len / 2).rev() {
        sift_down(items, root, len);
    }
    for end in (1..len).rev() {
        items.swap(0, end);
        sift_down(items, 0, end);
    }
}

fn sift_down<T: SortKeyed>(items: &mut [T], mut root: usize, end: usize) {
    loop {
        let mut child = 2 * root + 1;
        if child >= end {
            return;
        }
        if child + 1 < end
            && key_order(items[child].sort_key(), items[child + 1].sort_key()) == Ordering::Less
        {
            child += 1;
        }
        if key_order(items[root].sort_key(), items[child].sort_key()) != Ordering::Less {
            return;
        }
        items.swap(root, child);
        root = child;
    }
}

/// True if `items` is in ascending key order.
#[must_use]
pub fn is_sorted_by_key<T: SortKeyed>(items: &[T]) -> bool {
    items
        .windows(2)
        .all(|pair| key_order(pair[0].sort_key(), pair[1].sort_key()) != Ordering::Greater)
}
