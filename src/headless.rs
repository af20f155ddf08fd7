//! In-memory renderer that records what it was asked to draw.

use crate::ir::RenderParams;
use crate::layout::SceneLayout;
use crate::scene::{RenderObject, Renderer, SceneObject};
use anyhow::Result;
use std::cell::RefCell;
use std::rc::Rc;

/// One call made against a [`HeadlessRenderer`] or one of its objects.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Create { pick_ids: Option<[u8; 4]>, points: usize },
    Update { pick_ids: Option<[u8; 4]>, points: usize },
    Redraw { uid: Option<String>, visible: Option<bool> },
}

/// Call log shared between the renderer and the objects it creates, so
/// in-place updates land in the same sequence as creates and redraws.
type CallLog = Rc<RefCell<Vec<RenderCall>>>;

/// The latest parameters drawn for one series.
#[derive(Debug, Clone)]
pub struct HeadlessObject {
    pub params: RenderParams,
    /// Number of in-place updates since creation.
    pub revision: u32,
    log: CallLog,
}

impl RenderObject for HeadlessObject {
    fn update(&mut self, params: &RenderParams) -> Result<()> {
        self.log.borrow_mut().push(RenderCall::Update {
            pick_ids: params.pick_ids,
            points: params.position.len(),
        });
        self.params = params.clone();
        self.revision += 1;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    log: CallLog,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every create, update and redraw so far, in order.
    pub fn calls(&self) -> Vec<RenderCall> {
        self.log.borrow().clone()
    }

    fn count(&self, pred: impl Fn(&RenderCall) -> bool) -> usize {
        self.log.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn count_creates(&self) -> usize {
        self.count(|c| matches!(c, RenderCall::Create { .. }))
    }

    pub fn count_updates(&self) -> usize {
        self.count(|c| matches!(c, RenderCall::Update { .. }))
    }

    pub fn count_redraws(&self) -> usize {
        self.count(|c| matches!(c, RenderCall::Redraw { .. }))
    }
}

impl Renderer for HeadlessRenderer {
    type Object = HeadlessObject;

    fn create_scatter_line(&mut self, params: &RenderParams) -> Result<HeadlessObject> {
        self.log.borrow_mut().push(RenderCall::Create {
            pick_ids: params.pick_ids,
            points: params.position.len(),
        });
        Ok(HeadlessObject {
            params: params.clone(),
            revision: 0,
            log: Rc::clone(&self.log),
        })
    }

    fn redraw(&mut self, _layout: &SceneLayout, object: Option<&SceneObject<HeadlessObject>>) {
        self.log.borrow_mut().push(RenderCall::Redraw {
            uid: object.map(|o| o.uid.clone()),
            visible: object.map(|o| o.visible),
        });
    }
}
