//! Real-time 3D debug-draw overlay: a geometry pool with a temporal
//! lifecycle engine.
//!
//! Transient shapes (spheres, boxes, lines, arrows, grids, frusta) are
//! drawn for a duration in seconds, deduplicated by the geometry of the
//! call, culled against the active camera frusta, and batched into dense
//! per-mesh instance buffers. Thread-safe with one-frame latency.
//!
//! # Architecture
//!
//! - [`DebugDrawer`] — Thread-safe context (store as a shared resource);
//!   carries every `draw_*` method plus the frame-driving calls
//! - [`GeometryPool`] — Entry storage: add-or-update, culling, expiration,
//!   batch fill
//! - [`RenderSink`] — The boundary to the host renderer; receives the
//!   batched [`InstanceData`]/[`LineVertex`] buffers each frame
//! - [`ScopedConfig`] — Per-thread RAII draw-style override (thickness,
//!   sphere density, plane sizing)
//!
//! # Usage
//!
//! ```ignore
//! // Setup (once)
//! let drawer = Arc::new(DebugDrawer::new());
//!
//! // From any thread, any time:
//! drawer.draw_sphere(enemy_pos, 0.5, colors::RED, 0.0);
//! drawer.draw_arrow(from, to, colors::GREEN, 0.25, false, 2.0);
//! {
//!     let scoped = drawer.scoped_config();
//!     scoped.set_thickness(0.05);
//!     drawer.draw_line(a, b, colors::YELLOW, 0.0); // volumetric
//! }
//!
//! // Each physics tick:
//! drawer.physics_process_start(fixed_delta);
//! // ... physics code may draw ...
//! drawer.physics_process_end(fixed_delta);
//!
//! // Each rendered frame:
//! drawer.process(delta, &views, &mut my_render_sink);
//! ```

pub mod colors;
mod config;
mod container;
mod draw_api;
mod drawer;
mod entry;
pub mod geometry;
mod math;
mod pool;
mod render;
mod scope_config;
mod stats;

pub use config::DebugDrawConfig;
pub use container::{FrameBuffers, GeometryContainer, ViewData, ViewSet};
pub use draw_api::PointType;
pub use drawer::DebugDrawer;
pub use entry::{DelayedRendererInstance, DelayedRendererLine, InstanceType, ProcessType};
pub use math::{Aabb, Frustum, Plane, SphereBounds};
pub use pool::{DistanceCullingData, GeometryPool, MIN_BOUNDS_SIZE};
pub use render::{InstanceBuffers, InstanceData, LineVertex, RenderSink};
pub use scope_config::{ScopeConfigData, ScopeConfigStore, ScopedConfig};
pub use stats::RenderStats;
