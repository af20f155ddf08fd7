//! Scene-held state for 3D scatter objects: the renderer seam, the
//! per-series object registry and the shared picking-id counter.

use crate::ir::RenderParams;
use crate::layout::SceneLayout;
use anyhow::Result;
use std::collections::HashMap;

/// Picking ids handed to each renderer object.
pub const PICK_IDS_PER_OBJECT: usize = 4;

/// A renderer-side object that can be updated in place.
pub trait RenderObject {
    fn update(&mut self, params: &RenderParams) -> Result<()>;
}

/// The rendering backend a scene draws through.
pub trait Renderer {
    type Object: RenderObject;

    fn create_scatter_line(&mut self, params: &RenderParams) -> Result<Self::Object>;

    /// Schedule or perform a redraw. `object` is the series that triggered
    /// it, if it has a renderer object.
    fn redraw(&mut self, layout: &SceneLayout, object: Option<&SceneObject<Self::Object>>);
}

/// A renderer object plus the bookkeeping the scene keeps for it.
#[derive(Debug)]
pub struct SceneObject<O> {
    pub handle: O,
    pub uid: String,
    pub visible: bool,
    /// High bits of the picking-id counter at creation.
    pub group_id: u64,
    pub trace_type: String,
    pub pick_ids: [u8; PICK_IDS_PER_OBJECT],
}

/// Renderer objects keyed by series uid. At most one object per uid.
#[derive(Debug)]
pub struct ObjectRegistry<O> {
    objects: HashMap<String, SceneObject<O>>,
    object_count: u64,
}

impl<O> Default for ObjectRegistry<O> {
    fn default() -> Self {
        Self {
            objects: HashMap::new(),
            object_count: 0,
        }
    }
}

impl<O> ObjectRegistry<O> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, uid: &str) -> Option<&SceneObject<O>> {
        self.objects.get(uid)
    }

    pub fn get_mut(&mut self, uid: &str) -> Option<&mut SceneObject<O>> {
        self.objects.get_mut(uid)
    }

    /// Insert or replace the object for `object.uid`, returning the old one.
    pub fn upsert(&mut self, object: SceneObject<O>) -> Option<SceneObject<O>> {
        self.objects.insert(object.uid.clone(), object)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Total picking ids drawn so far. Never decreases.
    pub fn object_count(&self) -> u64 {
        self.object_count
    }

    /// Draw the next four picking ids. Each is the counter modulo 256, so
    /// ids repeat once the counter wraps.
    pub fn next_picking_ids(&mut self) -> [u8; PICK_IDS_PER_OBJECT] {
        let mut ids = [0u8; PICK_IDS_PER_OBJECT];
        for id in ids.iter_mut() {
            *id = (self.object_count % 256) as u8;
            self.object_count += 1;
        }
        ids
    }

    /// Group of the most recently drawn picking id.
    pub fn current_group_id(&self) -> u64 {
        self.object_count.saturating_sub(1) >> 8
    }
}

/// A 3D scene: its renderer and the objects drawn through it.
pub struct Scene<R: Renderer> {
    pub registry: ObjectRegistry<R::Object>,
    renderer: R,
}

impl<R: Renderer> Scene<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            registry: ObjectRegistry::new(),
            renderer,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Redraw after the series `uid` changed.
    pub fn update(&mut self, layout: &SceneLayout, uid: Option<&str>) {
        let object = uid.and_then(|uid| self.registry.get(uid));
        self.renderer.redraw(layout, object);
    }
}
