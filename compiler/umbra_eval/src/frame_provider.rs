//! Cached factory for frames.
//!
//! Class frames are created once per closed type (type arguments included)
//! and reused by every activation and call on that type. The other kinds are
//! created fresh on every request.

use std::cell::RefCell;

use rustc_hash::FxHashMap;
use umbra_ir::SymbolId;
use umbra_runtime::{ObjectRef, RuntimeType};

use crate::frame::FrameRef;

#[derive(Default)]
pub struct FrameProvider {
    class_frames: RefCell<FxHashMap<RuntimeType, FrameRef>>,
}

impl FrameProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// The class frame of `ty`, created on first request.
    pub fn class_frame(&self, ty: &RuntimeType) -> FrameRef {
        if let Some(frame) = self.class_frames.borrow().get(ty) {
            return frame.clone();
        }
        tracing::debug!(ty = %ty, "creating class frame");
        let frame = FrameRef::class(ty.clone());
        self.class_frames
            .borrow_mut()
            .insert(ty.clone(), frame.clone());
        frame
    }

    pub fn instance_frame(&self, class: &FrameRef, instance: &ObjectRef) -> FrameRef {
        FrameRef::instance(class, instance)
    }

    pub fn method_frame(
        &self,
        parent: &FrameRef,
        method: SymbolId,
        type_args: Vec<RuntimeType>,
    ) -> FrameRef {
        FrameRef::method(parent, method, type_args)
    }

    pub fn scope_frame(&self, parent: &FrameRef) -> FrameRef {
        FrameRef::scope(parent)
    }

    /// Number of distinct closed types with a class frame.
    pub fn class_frame_count(&self) -> usize {
        self.class_frames.borrow().len()
    }
}
