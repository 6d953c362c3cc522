use crate::gl33::{state::DepthTest, GL33};
use gl::{self, types::*};
use otome::{backend::pipeline::Pipeline, pipeline::PipelineState};

unsafe impl Pipeline for GL33 {
  unsafe fn start_frame(&mut self, size: [u32; 2], state: &PipelineState) {
    let mut st = self.state.borrow_mut();

    let [x, y, w, h] = state.viewport.rect(size);
    st.set_viewport([x as GLint, y as GLint, w as GLint, h as GLint]);

    let mut clear_buffer_bits = 0;

    if let Some(clear_color) = state.clear_color {
      st.set_clear_color(clear_color);
      clear_buffer_bits |= gl::COLOR_BUFFER_BIT;
    }

    if let Some(clear_depth) = state.clear_depth {
      st.set_clear_depth(clear_depth);
      clear_buffer_bits |= gl::DEPTH_BUFFER_BIT;
    }

    let depth_test = if state.depth_test {
      DepthTest::On
    } else {
      DepthTest::Off
    };
    st.set_depth_test(depth_test);

    if clear_buffer_bits != 0 {
      gl::Clear(clear_buffer_bits);
    }
  }
}
