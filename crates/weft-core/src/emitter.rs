//! Generator: element forest → JSX-like markup text.
//!
//! Output is deterministic: the same forest always produces byte-identical
//! markup, and generated markup parses back into a structurally equal
//! forest (ids aside). Style bags render before other props; a style bag
//! with a single entry stays inline, larger bags pretty-print across lines.

use crate::model::{ComponentIndex, Element, ElementKind, PropValue, ValueBag};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

/// Render a forest as markup, each root starting at `indent_level`
/// (2 spaces per level).
#[must_use]
pub fn generate(elements: &[Element], indent_level: usize) -> String {
    elements
        .iter()
        .map(|el| generate_element(el, indent_level))
        .collect::<Vec<_>>()
        .join("\n")
}

fn generate_element(el: &Element, depth: usize) -> String {
    let pad = indent(depth);
    match &el.kind {
        ElementKind::Text { text } => format!("{pad}{text}"),
        ElementKind::Markup { tag } => {
            let attrs = render_attrs(el);
            match el.child_slice() {
                [] => format!("{pad}<{tag}{attrs}></{tag}>"),
                children => {
                    let body = generate(children, depth + 1);
                    format!("{pad}<{tag}{attrs}>\n{body}\n{pad}</{tag}>")
                }
            }
        }
        ElementKind::Component { name } => {
            let attrs = render_attrs(el);
            match el.child_slice() {
                [] => format!("{pad}<{name}{attrs} />"),
                children => {
                    let body = generate(children, depth + 1);
                    format!("{pad}<{name}{attrs}>\n{body}\n{pad}</{name}>")
                }
            }
        }
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

// ─── Attributes ─────────────────────────────────────────────────────────

fn render_attrs(el: &Element) -> String {
    let mut out = String::new();

    if !el.styles.is_empty() {
        if el.styles.len() == 1 {
            let _ = write!(out, " style={{{}}}", inline_map(&el.styles));
        } else {
            let entries = el
                .styles
                .iter()
                .map(|(k, v)| format!("    \"{k}\": {}", render_value(v)))
                .collect::<Vec<_>>()
                .join(",\n");
            let _ = write!(out, " style={{{{\n{entries}\n  }}}}");
        }
    }

    for (key, value) in el.props.iter() {
        match value {
            PropValue::Str(s) => {
                let _ = write!(out, " {key}=\"{}\"", escape_attribute(s));
            }
            PropValue::Bool(true) => {
                let _ = write!(out, " {key}");
            }
            // A false flag renders as nothing at all.
            PropValue::Bool(false) => {}
            other => {
                let _ = write!(out, " {key}={{{}}}", render_value(other));
            }
        }
    }

    out
}

/// A value in expression position, JSON-shaped.
fn render_value(value: &PropValue) -> String {
    match value {
        PropValue::Str(s) => {
            // serde_json handles quoting and escapes.
            serde_json::to_string(s).unwrap_or_default()
        }
        PropValue::Num(n) => format_num(*n),
        PropValue::Bool(b) => b.to_string(),
        PropValue::Map(bag) => inline_map(bag),
    }
}

/// `{"k":v,"k2":v2}` with no interior spacing.
fn inline_map(bag: &ValueBag) -> String {
    let body = bag
        .iter()
        .map(|(k, v)| format!("\"{k}\":{}", render_value(v)))
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{body}}}")
}

/// Trim trailing zeros: whole numbers render without a decimal point.
fn format_num(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn escape_attribute(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ─── Whole-file generation ──────────────────────────────────────────────

/// Render a forest as the body of a component return: a single root as-is,
/// multiple roots wrapped in a fragment, an empty forest as `null`.
#[must_use]
pub fn generate_return_body(elements: &[Element], indent_level: usize) -> String {
    let pad = indent(indent_level);
    match elements {
        [] => format!("{pad}null"),
        [only] => generate_element(only, indent_level),
        many => {
            let body = generate(many, indent_level + 1);
            format!("{pad}<>\n{body}\n{pad}</>")
        }
    }
}

/// Generate a complete component source file: synthesized imports, then a
/// default-exported function returning the rendered forest.
#[must_use]
pub fn generate_component_file(
    component_name: &str,
    elements: &[Element],
    index: &ComponentIndex,
    target_path: Option<&str>,
) -> String {
    let names = collect_component_names(elements);
    let imports = generate_imports(&names, index, target_path);

    let mut out = String::new();
    for import in &imports {
        let _ = writeln!(out, "{import}");
    }
    if !imports.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "export default function {component_name}() {{");
    let _ = writeln!(out, "  return (");
    let _ = writeln!(out, "{}", generate_return_body(elements, 2));
    let _ = writeln!(out, "  )");
    let _ = writeln!(out, "}}");
    out
}

/// Every distinct component referenced in the forest, by importable base
/// name (`Card.Header` needs `Card`), sorted.
pub fn collect_component_names(elements: &[Element]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    fn walk(elements: &[Element], names: &mut BTreeSet<String>) {
        for el in elements {
            if let ElementKind::Component { name } = &el.kind {
                let base = name.split('.').next().unwrap_or(name);
                names.insert(base.to_string());
            }
            walk(el.child_slice(), names);
        }
    }
    walk(elements, &mut names);
    names
}

/// Components referenced in the forest that the index does not know.
/// Generation still proceeds — these just get no import.
pub fn unresolved_components(elements: &[Element], index: &ComponentIndex) -> Vec<String> {
    collect_component_names(elements)
        .into_iter()
        .filter(|name| !index.contains_key(name))
        .collect()
}

/// Synthesize import statements for the given component names: one
/// statement per source file, named imports sorted within each statement,
/// whole statements sorted lexically. Unknown components are skipped with
/// a warning.
pub fn generate_imports(
    names: &BTreeSet<String>,
    index: &ComponentIndex,
    target_path: Option<&str>,
) -> Vec<String> {
    // Group export names by the file they come from.
    let mut by_path: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for name in names {
        match index.get(name) {
            Some(entry) => {
                by_path
                    .entry(entry.path.as_str())
                    .or_default()
                    .insert(entry.export_name.as_str());
            }
            None => log::warn!("component `{name}` not in index, skipping import"),
        }
    }

    let mut statements: Vec<String> = by_path
        .into_iter()
        .map(|(path, exports)| {
            let stripped = strip_extension(path);
            let import_path = match target_path {
                Some(target) => relative_import_path(target, stripped),
                None => format!("@/{stripped}"),
            };
            let list = exports.into_iter().collect::<Vec<_>>().join(", ");
            format!("import {{ {list} }} from '{import_path}'")
        })
        .collect();
    statements.sort();
    statements
}

fn strip_extension(path: &str) -> &str {
    for ext in [".tsx", ".ts", ".jsx", ".js"] {
        if let Some(stripped) = path.strip_suffix(ext) {
            return stripped;
        }
    }
    path
}

/// Relative import path from one source file to another, with `../`
/// up-levels and a `./` prefix for same-directory imports.
fn relative_import_path(from_file: &str, to_file: &str) -> String {
    let from_dir: Vec<&str> = {
        let mut parts: Vec<&str> = from_file.split('/').collect();
        parts.pop();
        parts
    };
    let to_parts: Vec<&str> = to_file.split('/').collect();

    let common = from_dir
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = from_dir.len() - common;
    let down = to_parts[common..].join("/");
    if ups == 0 {
        format!("./{down}")
    } else {
        format!("{}{down}", "../".repeat(ups))
    }
}
