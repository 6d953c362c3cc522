//! Just enough GLSL reading to stand in for a driver compiler.
//!
//! Global `uniform`, `in` and `out` declarations are collected; function bodies are skipped. A
//! uniform is considered _used_ when its name appears anywhere besides its declaration, which is
//! roughly what a real compiler’s dead-code elimination ends up with.

use std::collections::HashMap;

/// A global declaration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Declared {
  pub(crate) name: String,
  pub(crate) ty: String,
  pub(crate) array: bool,
  pub(crate) used: bool,
}

/// Globals of a compiled stage.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Declarations {
  pub(crate) uniforms: Vec<Declared>,
  pub(crate) inputs: Vec<Declared>,
  pub(crate) outputs: Vec<Declared>,
}

const SKIPPED_QUALIFIERS: &[&str] = &[
  "flat",
  "smooth",
  "noperspective",
  "centroid",
  "invariant",
  "highp",
  "mediump",
  "lowp",
];

/// Compile a stage, returning its globals or an error log.
pub(crate) fn compile(src: &str) -> Result<Declarations, String> {
  let src = strip_comments(src);

  for (i, line) in src.lines().enumerate() {
    let line = line.trim();
    if line.starts_with("#error") {
      return Err(format!("0:{}(1): error: {}", i + 1, line));
    }
  }

  check_balance(&src)?;

  let code: String = src
    .lines()
    .filter(|line| !line.trim_start().starts_with('#'))
    .collect::<Vec<_>>()
    .join("\n");

  if !code.contains("main") {
    return Err("0:0(0): error: no function with name 'main'".to_owned());
  }

  let usage = identifier_count(&code);
  let mut decls = Declarations::default();

  for statement in global_statements(&code) {
    let (storage, ty, names) = match parse_declaration(&statement) {
      Some(parsed) => parsed,
      None => continue,
    };

    let target = match storage {
      "uniform" => &mut decls.uniforms,
      "in" => &mut decls.inputs,
      "out" => &mut decls.outputs,
      _ => continue,
    };

    for (name, array) in names {
      let used = usage.get(name.as_str()).copied().unwrap_or(0) > 1;
      target.push(Declared {
        name,
        ty: ty.to_owned(),
        array,
        used,
      });
    }
  }

  Ok(decls)
}

fn strip_comments(src: &str) -> String {
  let mut out = String::with_capacity(src.len());
  let mut chars = src.chars().peekable();

  while let Some(c) = chars.next() {
    let next = chars.peek().copied();

    match (c, next) {
      ('/', Some('/')) => {
        for c in chars.by_ref() {
          if c == '\n' {
            out.push('\n');
            break;
          }
        }
      }

      ('/', Some('*')) => {
        chars.next();
        let mut prev = ' ';

        for c in chars.by_ref() {
          // keep line numbers stable
          if c == '\n' {
            out.push('\n');
          }

          if prev == '*' && c == '/' {
            break;
          }

          prev = c;
        }
      }

      _ => out.push(c),
    }
  }

  out
}

fn check_balance(src: &str) -> Result<(), String> {
  let mut stack = Vec::new();

  for (i, line) in src.lines().enumerate() {
    for c in line.chars() {
      match c {
        '{' | '(' | '[' => stack.push(c),
        '}' | ')' | ']' => {
          let open = match c {
            '}' => '{',
            ')' => '(',
            _ => '[',
          };

          if stack.pop() != Some(open) {
            return Err(format!(
              "0:{}(1): error: syntax error, unexpected '{}'",
              i + 1,
              c
            ));
          }
        }
        _ => (),
      }
    }
  }

  if stack.is_empty() {
    Ok(())
  } else {
    Err(format!(
      "0:{}(1): error: syntax error, unexpected end of file",
      src.lines().count()
    ))
  }
}

fn identifier_count(code: &str) -> HashMap<&str, usize> {
  let mut count = HashMap::new();

  for ident in code
    .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
    .filter(|s| !s.is_empty())
  {
    *count.entry(ident).or_insert(0) += 1;
  }

  count
}

// Statements at global scope; anything inside braces is dropped, and so is whatever precedes a
// brace (function signatures, block names).
fn global_statements(code: &str) -> Vec<String> {
  let mut statements = Vec::new();
  let mut current = String::new();
  let mut depth = 0usize;

  for c in code.chars() {
    match c {
      '{' => {
        depth += 1;
        current.clear();
      }

      '}' => {
        depth = depth.saturating_sub(1);
        current.clear();
      }

      ';' if depth == 0 => {
        let statement = current.trim();
        if !statement.is_empty() {
          statements.push(statement.to_owned());
        }
        current.clear();
      }

      _ if depth == 0 => current.push(c),
      _ => (),
    }
  }

  statements
}

fn parse_declaration(statement: &str) -> Option<(&str, &str, Vec<(String, bool)>)> {
  let mut rest = statement.trim();

  if rest.starts_with("layout") {
    let close = rest.find(')')?;
    rest = &rest[close + 1..];
  }

  let mut tokens = rest
    .split_whitespace()
    .filter(|t| !SKIPPED_QUALIFIERS.contains(t));

  let storage = tokens.next()?;
  let ty = tokens.next()?;
  let names = tokens.collect::<Vec<_>>().join(" ");

  let names = names
    .split(',')
    .filter_map(|decl| {
      let decl = decl.split('=').next()?.trim();
      let (name, array) = match decl.find('[') {
        Some(i) => (decl[..i].trim(), true),
        None => (decl, false),
      };

      if name.is_empty() {
        None
      } else {
        Some((name.to_owned(), array))
      }
    })
    .collect();

  Some((storage, ty, names))
}

#[cfg(test)]
mod tests {
  use super::*;

  const VS: &str = r#"
layout (location = 0) in vec3 aPos;
layout (location = 1) in vec2 aTexCoord;

out vec2 fTexCoord;

uniform mat4 uProjection;
uniform mat4 uView, uTransform;
uniform float uUnused; // never read

void main() {
  fTexCoord = aTexCoord;
  gl_Position = uProjection * uView * uTransform * vec4(aPos, 1.0);
}
"#;

  #[test]
  fn collects_globals() {
    let decls = compile(VS).unwrap();

    let uniforms: Vec<_> = decls.uniforms.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(uniforms, ["uProjection", "uView", "uTransform", "uUnused"]);
    assert!(decls.uniforms.iter().all(|u| u.ty == "mat4" || u.name == "uUnused"));

    let inputs: Vec<_> = decls.inputs.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(inputs, ["aPos", "aTexCoord"]);

    assert_eq!(decls.outputs.len(), 1);
    assert_eq!(decls.outputs[0].ty, "vec2");
  }

  #[test]
  fn unused_uniforms_are_flagged() {
    let decls = compile(VS).unwrap();

    for u in &decls.uniforms {
      assert_eq!(u.used, u.name != "uUnused", "{}", u.name);
    }
  }

  #[test]
  fn arrays_and_qualifiers() {
    let src = "flat out int fIndex;\nuniform highp vec2 uOffsets[4];\nvoid main() { fIndex = int(uOffsets[0].x); }";
    let decls = compile(src).unwrap();

    assert_eq!(decls.outputs[0].name, "fIndex");
    assert!(decls.uniforms[0].array);
    assert_eq!(decls.uniforms[0].name, "uOffsets");
    assert!(decls.uniforms[0].used);
  }

  #[test]
  fn error_directive_fails_with_line() {
    let log = compile("void main() {}\n#error nope\n").unwrap_err();
    assert_eq!(log, "0:2(1): error: #error nope");
  }

  #[test]
  fn unbalanced_braces_fail() {
    assert!(compile("void main() {\n").is_err());
    assert!(compile("void main() { }}\n").is_err());
  }

  #[test]
  fn missing_main_fails() {
    assert!(compile("uniform float uTime;\n").is_err());
  }

  #[test]
  fn comments_are_ignored() {
    let src = "/* uniform float uGhost; */\n// uniform float uGhost2;\nvoid main() {}";
    let decls = compile(src).unwrap();

    assert!(decls.uniforms.is_empty());
  }
}
