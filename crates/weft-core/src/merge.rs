//! Source merge: write an edited canvas forest back into an existing
//! component file.
//!
//! The deterministic strategy replaces exactly the returned markup
//! expression and reconciles the import block; everything else in the file
//! — hooks, handlers, comments, helpers — is preserved byte-for-byte. The
//! alternate strategy hands the whole file plus a rendered snapshot to an
//! injected [`SnapshotMerge`] implementation.

use crate::emitter::{collect_component_names, generate_imports, generate_return_body};
use crate::error::{MergeError, SnapshotMergeError};
use crate::model::{ComponentIndex, Element};
use crate::source::{find_return_site, scan_imports};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Inputs to the deterministic merge.
#[derive(Debug)]
pub struct MergeOptions<'a> {
    /// Current contents of the target file.
    pub source: &'a str,
    /// Project-relative path of the target file (for relative imports and
    /// error reporting).
    pub path: &'a str,
    /// The edited forest to write back.
    pub elements: &'a [Element],
    pub index: &'a ComponentIndex,
}

/// Replace the component's returned markup and refresh component imports,
/// preserving the rest of the file verbatim. Fails closed: when no return
/// expression can be located, the caller gets an error and the file stays
/// untouched.
pub fn merge_into_existing_file(opts: &MergeOptions<'_>) -> Result<String, MergeError> {
    let site = find_return_site(opts.source).ok_or_else(|| MergeError::TargetNotFound {
        path: opts.path.to_string(),
    })?;

    let names = collect_component_names(opts.elements);
    let new_imports = generate_imports(&names, opts.index, Some(opts.path));
    let scan = scan_imports(opts.source);

    // Stale component imports: anything pointing at an indexed component
    // file, or at a components directory. The whole index counts, not just
    // components still on the canvas — a removed component's import must go.
    let component_paths: BTreeSet<String> = opts
        .index
        .values()
        .map(|e| strip_source_extension(&e.path).to_string())
        .collect();
    let removals: Vec<_> = scan
        .imports
        .iter()
        .filter(|import| {
            let normalized = import.source.strip_prefix("@/").unwrap_or(&import.source);
            component_paths.contains(normalized) || import.source.contains("/components/")
        })
        .collect();

    // The return site sits after the import block, so replace it first and
    // earlier offsets stay valid.
    let base_units = site.indent.len() / 2;
    let replacement = format!(
        "(\n{}\n{})",
        generate_return_body(opts.elements, base_units + 1),
        site.indent
    );
    let mut out = String::with_capacity(opts.source.len() + replacement.len());
    out.push_str(&opts.source[..site.span.start]);
    out.push_str(&replacement);
    out.push_str(&opts.source[site.span.end..]);

    // Delete stale imports back-to-front, each with its trailing newline.
    let mut insert_offset = scan.insert_offset;
    for import in removals.iter().rev() {
        let mut span = import.span.clone();
        if out.as_bytes().get(span.end) == Some(&b'\n') {
            span.end += 1;
        }
        if insert_offset >= span.end {
            insert_offset -= span.end - span.start;
        } else if insert_offset > span.start {
            insert_offset = span.start;
        }
        out.replace_range(span, "");
    }

    if !new_imports.is_empty() {
        let block = new_imports.join("\n");
        let at_line_start =
            insert_offset == 0 || out.as_bytes().get(insert_offset - 1) == Some(&b'\n');
        let text = if at_line_start {
            format!("{block}\n")
        } else {
            format!("\n{block}")
        };
        out.insert_str(insert_offset, &text);
    }

    Ok(out)
}

fn strip_source_extension(path: &str) -> &str {
    for ext in [".tsx", ".ts", ".jsx", ".js"] {
        if let Some(stripped) = path.strip_suffix(ext) {
            return stripped;
        }
    }
    path
}

// ─── Alternate merge strategy ───────────────────────────────────────────

/// Everything an alternate merge implementation gets to work with.
#[derive(Debug, Clone)]
pub struct SnapshotMergeRequest {
    /// The target file as it currently exists.
    pub original_source: String,
    /// The edited forest rendered as markup.
    pub rendered_snapshot: String,
    /// Project-relative path of the target file.
    pub file_path: String,
    /// Import statements the edited markup needs.
    pub component_imports: Vec<String>,
    /// Prop name → mock value for any state bindings the canvas showed.
    pub mock_bindings: serde_json::Map<String, serde_json::Value>,
}

/// A pluggable, context-aware merge strategy. Implementations receive the
/// original source and the rendered snapshot and return the full new file
/// contents; the editor decides per save which strategy runs.
#[async_trait]
pub trait SnapshotMerge: Send + Sync {
    async fn merge(&self, request: &SnapshotMergeRequest) -> Result<String, SnapshotMergeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ComponentIndexEntry;
    use pretty_assertions::assert_eq;

    fn index_with(entries: &[(&str, &str)]) -> ComponentIndex {
        entries
            .iter()
            .map(|(name, path)| {
                (
                    name.to_string(),
                    ComponentIndexEntry {
                        path: path.to_string(),
                        export_name: name.to_string(),
                        props: Default::default(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn replaces_only_the_return_expression() {
        let src = "\
import { useState } from 'react'

export default function Page() {
  const [count, setCount] = useState(0)
  // increments on click
  return (
    <div>old</div>
  )
}
";
        let forest = vec![Element::markup("section")];
        let merged = merge_into_existing_file(&MergeOptions {
            source: src,
            path: "src/pages/Page.tsx",
            elements: &forest,
            index: &ComponentIndex::new(),
        })
        .unwrap();

        assert!(merged.contains("const [count, setCount] = useState(0)"));
        assert!(merged.contains("// increments on click"));
        assert!(merged.contains("import { useState } from 'react'"));
        assert!(merged.contains("  return (\n    <section></section>\n  )"));
        assert!(!merged.contains("old"));
    }

    #[test]
    fn refreshes_component_imports() {
        let src = "\
import { useState } from 'react'
import { OldCard } from '@/src/components/OldCard'

export default function Page() {
  return (
    <OldCard />
  )
}
";
        let index = index_with(&[
            ("Button", "src/components/Button.tsx"),
            ("OldCard", "src/components/OldCard.tsx"),
        ]);
        let forest = vec![Element::component("Button")];
        let merged = merge_into_existing_file(&MergeOptions {
            source: src,
            path: "src/pages/Page.tsx",
            elements: &forest,
            index: &index,
        })
        .unwrap();

        assert!(merged.contains("import { useState } from 'react'"));
        assert!(merged.contains("import { Button } from '../components/Button'"));
        assert!(!merged.contains("OldCard"));
    }

    #[test]
    fn removed_component_loses_its_import_outside_components_dirs() {
        let src = "\
import { Card } from '@/src/ui/Card'

export default function Page() {
  return (
    <Card />
  )
}
";
        // Card is indexed under src/ui, no `/components/` segment anywhere.
        let index = index_with(&[("Card", "src/ui/Card.tsx")]);
        let forest = vec![Element::markup("div")];
        let merged = merge_into_existing_file(&MergeOptions {
            source: src,
            path: "src/pages/Page.tsx",
            elements: &forest,
            index: &index,
        })
        .unwrap();

        assert!(!merged.contains("Card"));
        assert!(merged.contains("<div></div>"));
    }

    #[test]
    fn fails_closed_without_a_return() {
        let err = merge_into_existing_file(&MergeOptions {
            source: "export const layout = { width: 10 }\n",
            path: "src/layout.ts",
            elements: &[],
            index: &ComponentIndex::new(),
        })
        .unwrap_err();
        assert!(matches!(err, MergeError::TargetNotFound { .. }));
    }

    #[test]
    fn arrow_component_gets_wrapped_body() {
        let src = "export const Chip = () => <span>x</span>\n";
        let forest = vec![Element::markup("div")];
        let merged = merge_into_existing_file(&MergeOptions {
            source: src,
            path: "src/Chip.tsx",
            elements: &forest,
            index: &ComponentIndex::new(),
        })
        .unwrap();
        assert_eq!(merged, "export const Chip = () => (\n  <div></div>\n)\n");
    }

    #[test]
    fn multiple_roots_merge_as_fragment() {
        let src = "function App() {\n  return <div>old</div>\n}\n";
        let forest = vec![Element::markup("header"), Element::markup("main")];
        let merged = merge_into_existing_file(&MergeOptions {
            source: src,
            path: "src/App.tsx",
            elements: &forest,
            index: &ComponentIndex::new(),
        })
        .unwrap();
        assert!(merged.contains("  return (\n    <>\n      <header></header>\n      <main></main>\n    </>\n  )"));
    }
}
