//! # Cinder Render
//!
//! Turns a particle collection's live buffers into render-ready, ordered
//! records for one draw call.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     EXTRACTION PIPELINE                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Live buffers ─┬─> Visibility ─> View cull ─> Heap sort       │
//! │  Prev buffers ─┘   (interpolated when drawing between steps)  │
//! │                                  ↓                            │
//! │                     Fixed scratch (RenderRecord slice)        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! - The collection is only read
//! - No allocations per extraction
//! - At most `active_count()` records per list
//!
//! ## Example
//!
//! ```rust
//! use cinder_core::ParticleCollection;
//! use cinder_render::{Extractor, View, VisibilityScalars};
//! use cinder_shared::Vec3;
//!
//! let mut collection = ParticleCollection::with_capacity(16).expect("valid settings");
//! collection.begin_step(0.1, false);
//! collection.allocate(3);
//!
//! let mut extractor = Extractor::with_capacity(16);
//! let view = View::looking(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
//! let list = extractor.get_render_list(&collection, &view, &VisibilityScalars::NONE, true);
//! assert_eq!(list.len(), 3);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cull;
pub mod extended;
pub mod extract;
pub mod interpolation;
pub mod record;
pub mod scratch;
pub mod sort;
pub mod visibility;

pub use cull::{Plane, ViewCull};
pub use extended::ExtendedFields;
pub use extract::{Extractor, View};
pub use interpolation::InterpolationFrame;
pub use record::{ExtendedRenderRecord, RenderRecord};
pub use scratch::{ScratchLease, ScratchPool};
pub use sort::{heap_sort, is_sorted_by_key, SortKey, SortKeyed};
pub use visibility::VisibilityScalars;
