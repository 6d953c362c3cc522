//! Frame backend interface.

use crate::pipeline::PipelineState;

/// Per-frame render state.
pub unsafe trait Pipeline {
  /// Apply `state` to the default framebuffer of size `size` and clear what it asks to clear.
  unsafe fn start_frame(&mut self, size: [u32; 2], state: &PipelineState);
}
