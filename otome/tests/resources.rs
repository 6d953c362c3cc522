use otome::context::GraphicsContext;
use otome::geometry::{GeometryError, Mode, VertexLayout};
use otome::headless::{Call, Headless, LiveObjects, UniformValue};
use otome::pipeline::PipelineState;
use otome::shader::types::{Mat33, Mat44, Vec2, Vec3, Vec4};
use otome::shader::{Program, ProgramError, Stage, StageError, StageType, UniformType};
use otome::texture::{FilterMode, PixelFormat, Texture, TextureError};

const VS: &str = r#"
layout (location = 0) in vec3 aPos;

out vec3 fPos;

uniform mat4 uProjection;
uniform mat4 uView;
uniform mat4 uTransform;

void main() {
  fPos = aPos;
  gl_Position = uProjection * uView * uTransform * vec4(aPos, 1.0);
}
"#;

const FS: &str = r#"
in vec3 fPos;

out vec4 color;

void main() {
  color = vec4(fPos * 0.5 + 0.5, 1.0);
}
"#;

const FS_TIMED: &str = r#"
in vec3 fPos;

out vec4 color;

uniform float uTime;
uniform vec2 uResolution;
uniform float uOptimizedOut;

void main() {
  color = vec4(fPos * sin(uTime), uResolution.x);
}
"#;

const FS_EVERY_KIND: &str = r#"
in vec3 fPos;

out vec4 color;

uniform bool uFlag;
uniform int uCount;
uniform ivec2 uCell;
uniform ivec3 uVoxel;
uniform ivec4 uRect;
uniform vec4 uTint;
uniform mat3 uNormal;

void main() {
  vec3 n = uNormal * fPos;
  float k = uFlag ? float(uCount + uCell.x + uVoxel.y + uRect.z) : 0.0;
  color = uTint * vec4(n, k);
}
"#;

fn triangle(ctx: &mut Headless) -> otome::geometry::Geometry<Headless> {
  ctx
    .new_geometry()
    .set_vertices(vec![-0.5, -0.5, 0., 0.5, -0.5, 0., 0., 0.5, 0.])
    .set_layout(VertexLayout::interleaved(&[(0, 3)]).unwrap())
    .build()
    .unwrap()
}

#[test]
fn uniform_table_holds_exactly_the_active_uniforms() {
  let mut ctx = Headless::new();
  let program = Program::from_strings(&mut ctx, VS, FS).unwrap();
  let uniforms = program.uniforms();

  assert_eq!(uniforms.len(), 3);
  for name in ["uProjection", "uView", "uTransform"] {
    assert_eq!(uniforms.get(name).map(|e| e.ty), Some(UniformType::M44));
  }

  let locations: std::collections::HashSet<_> = uniforms.iter().map(|(_, e)| e.location).collect();
  assert_eq!(locations.len(), 3);
}

#[test]
fn optimized_out_uniforms_are_not_in_the_table() {
  let mut ctx = Headless::new();
  let program = Program::from_strings(&mut ctx, VS, FS_TIMED).unwrap();
  let uniforms = program.uniforms();

  assert_eq!(uniforms.len(), 5);
  assert!(uniforms.contains("uTime"));
  assert!(uniforms.contains("uResolution"));
  assert!(!uniforms.contains("uOptimizedOut"));
}

#[test]
fn end_to_end_identity_upload_bind_and_draw() {
  let mut ctx = Headless::new();
  let mut program = Program::from_strings(&mut ctx, VS, FS).unwrap();
  let geometry = triangle(&mut ctx);

  assert_eq!(program.uniforms().len(), 3);
  assert!(program.upload("uProjection", Mat44::IDENTITY));

  program.bind();
  geometry.draw();

  let location = program.uniforms().location("uProjection").unwrap();
  assert_eq!(
    ctx.current_uniform(location),
    Some(UniformValue::Mat44(Mat44::IDENTITY.0))
  );
  assert!(ctx.calls().contains(&Call::DrawArrays {
    mode: Mode::Triangle,
    count: 3
  }));
  assert!(ctx.violations().is_empty(), "{:?}", ctx.violations());
}

#[test]
fn unknown_uniform_upload_is_a_noop() {
  let mut ctx = Headless::new();
  let mut program = Program::from_strings(&mut ctx, VS, FS_TIMED).unwrap();

  assert!(program.upload("uTime", 1.5f32));
  assert!(program.upload("uResolution", Vec2::new(1., 1.)));
  let before = ctx.uniform_values();
  let calls_before = ctx.calls().len();

  assert!(!program.upload("uDoesNotExist", 3f32));
  assert!(!program.upload("uOptimizedOut", 3f32));
  assert!(!program.upload("uTime[0]", Vec3::new(0., 0., 0.)));

  assert_eq!(ctx.uniform_values(), before);
  assert_eq!(ctx.calls().len(), calls_before);
  assert!(ctx.violations().is_empty());
}

#[test]
fn stages_are_released_after_link() {
  let mut ctx = Headless::new();
  let program = Program::from_strings(&mut ctx, VS, FS).unwrap();

  assert_eq!(
    ctx.live(),
    LiveObjects {
      programs: 1,
      ..LiveObjects::default()
    }
  );

  let calls = ctx.calls();
  let detached = calls
    .iter()
    .filter(|c| matches!(c, Call::DetachShader { .. }))
    .count();
  let deleted = calls
    .iter()
    .filter(|c| matches!(c, Call::DeleteShader(_)))
    .count();
  assert_eq!((detached, deleted), (2, 2));

  program.destroy();
  assert_eq!(ctx.live(), LiveObjects::default());
}

#[test]
fn compile_error_carries_the_driver_log() {
  let mut ctx = Headless::new();
  let src = "void main() {\n#error broken on purpose\n}\n";

  match Stage::new(&mut ctx, StageType::FragmentShader, src) {
    Err(StageError::CompilationFailed(ty, log)) => {
      assert_eq!(ty, StageType::FragmentShader);
      assert_eq!(log, "0:2(1): error: #error broken on purpose");
    }
    _ => panic!("compilation should fail"),
  }

  assert_eq!(ctx.live(), LiveObjects::default());
}

#[test]
fn link_error_releases_everything() {
  let mut ctx = Headless::new();
  let fs = "in vec2 fMissing;\nout vec4 color;\nvoid main() { color = vec4(fMissing, 0.0, 1.0); }";

  match Program::from_strings(&mut ctx, VS, fs) {
    Err(ProgramError::LinkFailed(log)) => assert!(log.contains("fMissing")),
    _ => panic!("link should fail"),
  }

  assert_eq!(ctx.live(), LiveObjects::default());
  assert!(ctx
    .calls()
    .iter()
    .any(|c| matches!(c, Call::DeleteProgram(_))));
}

#[test]
fn stage_order_is_checked() {
  let mut ctx = Headless::new();
  let vertex = Stage::new(&mut ctx, StageType::VertexShader, VS).unwrap();
  let fragment = Stage::new(&mut ctx, StageType::FragmentShader, FS).unwrap();

  let err = Program::from_stages(&mut ctx, fragment, vertex).err();
  assert_eq!(
    err,
    Some(ProgramError::StageMismatch {
      expected: StageType::VertexShader,
      found: StageType::FragmentShader
    })
  );
  assert_eq!(ctx.live(), LiveObjects::default());
}

#[test]
fn geometry_create_then_destroy_leaves_no_slot_enabled() {
  let mut ctx = Headless::new();
  let geometry = ctx
    .new_geometry()
    .set_vertices(vec![0.; 7 * 4])
    .set_indices([3, 0, 2, 3, 1, 0])
    .set_layout(VertexLayout::interleaved(&[(0, 4), (1, 3)]).unwrap())
    .build()
    .unwrap();

  assert_eq!(ctx.enabled_attribute_slots(), 2);
  assert_eq!(geometry.vertex_count(), 4);
  assert_eq!(geometry.index_count(), Some(6));

  geometry.destroy();

  assert_eq!(ctx.enabled_attribute_slots(), 0);
  assert_eq!(ctx.live(), LiveObjects::default());
}

#[test]
fn indexed_draw_uses_index_count() {
  let mut ctx = Headless::new();
  let program = Program::from_strings(&mut ctx, VS, FS).unwrap();
  let geometry = ctx
    .new_geometry()
    .set_vertices(vec![0.; 3 * 4])
    .set_indices([0, 1, 1, 2, 2, 3, 3, 0])
    .set_layout(VertexLayout::interleaved(&[(0, 3)]).unwrap())
    .set_mode(Mode::Line)
    .build()
    .unwrap();

  program.bind();
  geometry.draw();

  assert_eq!(
    ctx.calls().last(),
    Some(&Call::DrawElements {
      mode: Mode::Line,
      count: 8
    })
  );
}

#[test]
fn geometry_input_is_validated_before_allocating() {
  let mut ctx = Headless::new();
  let layout = VertexLayout::interleaved(&[(0, 3)]).unwrap();

  let err = ctx
    .new_geometry()
    .set_vertices(vec![0.; 7])
    .set_layout(layout.clone())
    .build()
    .err();
  assert_eq!(
    err,
    Some(GeometryError::VertexDataMismatch {
      len: 7,
      floats_per_vertex: 3
    })
  );

  let err = ctx
    .new_geometry()
    .set_vertices(vec![0.; 9])
    .set_indices([0, 1, 3])
    .set_layout(layout)
    .build()
    .err();
  assert_eq!(
    err,
    Some(GeometryError::IndexOutOfBounds {
      index: 3,
      vertex_count: 3
    })
  );

  let err = ctx.new_geometry().set_vertices(vec![0.; 9]).build().err();
  assert_eq!(err, Some(GeometryError::NoLayout));

  assert!(ctx.calls().is_empty());
}

#[test]
fn out_of_memory_is_a_resource_error_and_leaks_nothing() {
  // room for the vertices, not for the indices
  let mut ctx = Headless::with_memory_budget(40);

  let err = ctx
    .new_geometry()
    .set_vertices(vec![0.; 9])
    .set_indices([0, 1, 2])
    .set_layout(VertexLayout::interleaved(&[(0, 3)]).unwrap())
    .build()
    .err();

  assert!(matches!(err, Some(GeometryError::ResourceError(_))));
  assert_eq!(ctx.live(), LiveObjects::default());
  assert_eq!(ctx.enabled_attribute_slots(), 0);
  assert_eq!(ctx.memory_used(), 0);
}

#[test]
fn texture_lifecycle() {
  let mut ctx = Headless::new();
  let texels = vec![255u8; 2 * 2 * 4];
  let texture = Texture::new(
    &mut ctx,
    [2, 2],
    PixelFormat::RGBA,
    FilterMode::Nearest,
    &texels,
  )
  .unwrap();

  assert!(ctx.calls().iter().any(|c| matches!(
    c,
    Call::TexImage2D {
      width: 2,
      height: 2,
      format: PixelFormat::RGBA,
      filter: FilterMode::Nearest,
      ..
    }
  )));
  assert!(ctx
    .calls()
    .iter()
    .any(|c| matches!(c, Call::GenerateMipmap(_))));

  texture.bind(1);
  assert!(ctx.bound_texture(1).is_some());

  texture.unbind();
  assert_eq!(ctx.bound_texture(0), None);

  texture.destroy();
  assert_eq!(ctx.live(), LiveObjects::default());
  assert_eq!(ctx.bound_texture(1), None);
}

#[test]
fn texture_errors() {
  let mut ctx = Headless::with_memory_budget(8);

  let err = Texture::new(&mut ctx, [2, 2], PixelFormat::RGB, FilterMode::Linear, &[0; 11]).err();
  assert_eq!(
    err,
    Some(TextureError::SizeMismatch {
      expected: 12,
      found: 11
    })
  );

  let err = Texture::new(&mut ctx, [2, 2], PixelFormat::RGB, FilterMode::Linear, &[0; 12]).err();
  assert!(matches!(err, Some(TextureError::ResourceError(_))));
  assert_eq!(ctx.live(), LiveObjects::default());
}

#[test]
fn drawing_after_the_program_is_gone_is_reported() {
  let mut ctx = Headless::new();
  let program = Program::from_strings(&mut ctx, VS, FS).unwrap();
  let geometry = triangle(&mut ctx);

  program.bind();
  program.destroy();
  geometry.draw();

  assert_eq!(ctx.violations().len(), 1);
}

#[test]
fn frame_start_clears_and_sets_viewport() {
  let mut ctx = Headless::new();
  ctx.start_frame([640, 480], &PipelineState::default());

  assert_eq!(
    ctx.calls(),
    vec![
      Call::Viewport([0, 0, 640, 480]),
      Call::Clear {
        color: true,
        depth: true
      }
    ]
  );
}

#[test]
fn every_uniform_kind_reaches_the_driver() {
  let mut ctx = Headless::new();
  let mut program = Program::from_strings(&mut ctx, VS, FS_EVERY_KIND).unwrap();
  let normal = Mat33::<f32>::from([[1., 0., 0.], [0., 2., 0.], [0., 0., 3.]]);

  assert!(program.upload("uFlag", true));
  assert!(program.upload("uCount", 7i32));
  assert!(program.upload("uCell", Vec2::new(1i32, 2)));
  assert!(program.upload("uVoxel", Vec3::new(1i32, 2, 3)));
  assert!(program.upload("uRect", Vec4::new(1i32, 2, 3, 4)));
  assert!(program.upload("uTint", Vec4::new(0.5f32, 0.25, 1., 1.)));
  assert!(program.upload("uNormal", normal));
  program.bind();

  let value = |name: &str| {
    let location = program.uniforms().location(name).unwrap();
    ctx.current_uniform(location)
  };

  assert_eq!(value("uFlag"), Some(UniformValue::Bool(true)));
  assert_eq!(value("uCount"), Some(UniformValue::Int(7)));
  assert_eq!(value("uCell"), Some(UniformValue::IVec2([1, 2])));
  assert_eq!(value("uVoxel"), Some(UniformValue::IVec3([1, 2, 3])));
  assert_eq!(value("uRect"), Some(UniformValue::IVec4([1, 2, 3, 4])));
  assert_eq!(value("uTint"), Some(UniformValue::Vec4([0.5, 0.25, 1., 1.])));
  assert_eq!(
    value("uNormal"),
    Some(UniformValue::Mat33([1., 0., 0., 0., 2., 0., 0., 0., 3.]))
  );
  assert!(ctx.violations().is_empty(), "{:?}", ctx.violations());
}
