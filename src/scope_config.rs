//! Per-thread stacks of draw-style overrides.
//!
//! A [`ScopedConfig`] guard pushes a copy of the calling thread's current
//! config (or the global default) and pops it on drop, so every exit path of
//! the calling scope releases it. Stacks are keyed by thread id plus a
//! monotonically increasing guard id: releasing out of order or from another
//! thread cannot touch anyone else's slot, and the guard itself is `!Send`.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Mutex, RwLock};

/// Style overrides applied to `draw_*` calls while a scope is active.
///
/// Shared as an immutable snapshot behind `Arc`; a child scope copies its
/// parent's values at creation and never observes later parent mutations.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeConfigData {
    /// Line thickness in world units. `0.0` draws wireframe lines,
    /// anything above switches to the volumetric instance variants.
    pub thickness: f32,
    /// Brightness boost of volumetric shape centers, `0.0..=1.0`.
    pub center_brightness: f32,
    /// Use the high-detail sphere mesh.
    pub hd_sphere: bool,
    /// Side length of drawn planes; `None` derives it from the active
    /// camera's far plane.
    pub plane_size: Option<f32>,
}

impl Default for ScopeConfigData {
    fn default() -> Self {
        Self {
            thickness: 0.0,
            center_brightness: 0.0,
            hd_sphere: false,
            plane_size: None,
        }
    }
}

type Stack = Vec<(u64, Arc<ScopeConfigData>)>;

/// Owner of the per-thread scope stacks and the global default config.
pub struct ScopeConfigStore {
    default_config: RwLock<Arc<ScopeConfigData>>,
    stacks: Mutex<HashMap<ThreadId, Stack>>,
    next_guard_id: AtomicU64,
}

impl ScopeConfigStore {
    pub fn new(default_config: ScopeConfigData) -> Self {
        Self {
            default_config: RwLock::new(Arc::new(default_config)),
            stacks: Mutex::new(HashMap::new()),
            next_guard_id: AtomicU64::new(1),
        }
    }

    /// Push a new scope for the calling thread, seeded from its current
    /// effective config, and return the guard that owns it.
    pub fn scoped(&self) -> ScopedConfig<'_> {
        let parent = self.scoped_config_for_current_thread();
        let data = Arc::new((*parent).clone());
        let guard_id = self.next_guard_id.fetch_add(1, Ordering::Relaxed);
        let thread_id = thread::current().id();

        self.stacks
            .lock()
            .entry(thread_id)
            .or_default()
            .push((guard_id, data));

        ScopedConfig {
            store: self,
            thread_id,
            guard_id,
            _not_send: PhantomData,
        }
    }

    /// The youngest live scope of the calling thread, or the global default.
    pub fn scoped_config_for_current_thread(&self) -> Arc<ScopeConfigData> {
        let thread_id = thread::current().id();
        if let Some(stack) = self.stacks.lock().get(&thread_id) {
            if let Some((_, data)) = stack.last() {
                return data.clone();
            }
        }
        self.default_config.read().clone()
    }

    pub fn default_config(&self) -> Arc<ScopeConfigData> {
        self.default_config.read().clone()
    }

    pub fn set_default_config(&self, config: ScopeConfigData) {
        *self.default_config.write() = Arc::new(config);
    }

    /// Drop every live scope on every thread (teardown).
    pub fn clear_scoped_configs(&self) {
        self.stacks.lock().clear();
    }

    fn unregister(&self, thread_id: ThreadId, guard_id: u64) {
        let mut stacks = self.stacks.lock();
        let Some(stack) = stacks.get_mut(&thread_id) else {
            return;
        };
        if let Some(pos) = stack.iter().rposition(|(id, _)| *id == guard_id) {
            if pos != stack.len() - 1 {
                log::warn!("scope config {guard_id} released out of LIFO order");
            }
            stack.remove(pos);
        }
        if stack.is_empty() {
            stacks.remove(&thread_id);
        }
    }

    /// Replace the guard's snapshot with a mutated copy (copy-on-write, so
    /// snapshots already resolved by in-flight draw calls are unaffected).
    fn update(&self, thread_id: ThreadId, guard_id: u64, f: impl FnOnce(&mut ScopeConfigData)) {
        let mut stacks = self.stacks.lock();
        let Some(stack) = stacks.get_mut(&thread_id) else {
            return;
        };
        if let Some(slot) = stack.iter_mut().find(|(id, _)| *id == guard_id) {
            let mut data = (*slot.1).clone();
            f(&mut data);
            slot.1 = Arc::new(data);
        }
    }

    fn read(&self, thread_id: ThreadId, guard_id: u64) -> Arc<ScopeConfigData> {
        let stacks = self.stacks.lock();
        stacks
            .get(&thread_id)
            .and_then(|stack| stack.iter().find(|(id, _)| *id == guard_id))
            .map(|(_, data)| data.clone())
            .unwrap_or_else(|| self.default_config.read().clone())
    }
}

impl Default for ScopeConfigStore {
    fn default() -> Self {
        Self::new(ScopeConfigData::default())
    }
}

/// RAII handle to one pushed scope. Dropping it (on any exit path) pops
/// exactly its own slot.
pub struct ScopedConfig<'a> {
    store: &'a ScopeConfigStore,
    thread_id: ThreadId,
    guard_id: u64,
    // Pin the guard to its creating thread.
    _not_send: PhantomData<*const ()>,
}

impl ScopedConfig<'_> {
    /// Set the line thickness, clamped to `0.0..=100.0`.
    pub fn set_thickness(&self, value: f32) -> &Self {
        let value = if value.is_finite() {
            value.clamp(0.0, 100.0)
        } else {
            0.0
        };
        self.store
            .update(self.thread_id, self.guard_id, |d| d.thickness = value);
        self
    }

    pub fn thickness(&self) -> f32 {
        self.store.read(self.thread_id, self.guard_id).thickness
    }

    /// Set the center brightness, clamped to `0.0..=1.0`.
    pub fn set_center_brightness(&self, value: f32) -> &Self {
        let value = if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.store.update(self.thread_id, self.guard_id, |d| {
            d.center_brightness = value;
        });
        self
    }

    pub fn center_brightness(&self) -> f32 {
        self.store
            .read(self.thread_id, self.guard_id)
            .center_brightness
    }

    pub fn set_hd_sphere(&self, value: bool) -> &Self {
        self.store
            .update(self.thread_id, self.guard_id, |d| d.hd_sphere = value);
        self
    }

    pub fn is_hd_sphere(&self) -> bool {
        self.store.read(self.thread_id, self.guard_id).hd_sphere
    }

    pub fn set_plane_size(&self, value: Option<f32>) -> &Self {
        let value = value.filter(|v| v.is_finite() && *v > 0.0);
        self.store
            .update(self.thread_id, self.guard_id, |d| d.plane_size = value);
        self
    }

    pub fn plane_size(&self) -> Option<f32> {
        self.store.read(self.thread_id, self.guard_id).plane_size
    }
}

impl Drop for ScopedConfig<'_> {
    fn drop(&mut self) {
        self.store.unregister(self.thread_id, self.guard_id);
    }
}
