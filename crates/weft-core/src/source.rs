//! Lexical scanner over component source files.
//!
//! The merge engine treats target files as text, not syntax trees: it only
//! needs to locate two regions — the leading import block and the returned
//! markup expression — and everything else is preserved byte-for-byte.
//! The scanner understands comments, string literals, and template
//! literals (including `${}` interpolations), so braces inside them never
//! confuse the depth tracking.

use std::ops::Range;

/// One import statement in the leading import block.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportStatement {
    /// Byte span of the whole statement, including a trailing `;`.
    pub span: Range<usize>,
    /// The module specifier, e.g. `@/components/Button`.
    pub source: String,
}

/// The leading import block of a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportScan {
    pub imports: Vec<ImportStatement>,
    /// Where new imports go: right after the last leading import, or after
    /// any leading directives (`'use client'`) when there are none.
    pub insert_offset: usize,
}

/// The returned markup expression of the first component function.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSite {
    /// Byte span of the returned expression (parens included, `;` excluded).
    pub span: Range<usize>,
    /// Leading whitespace of the line holding the `return` (or arrow body),
    /// used to indent the replacement.
    pub indent: String,
}

// ─── Scanner ────────────────────────────────────────────────────────────

/// Cursor over source bytes that can skip trivia and whole literals.
struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str, pos: usize) -> Self {
        Self { src, pos }
    }

    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos.min(self.src.len())..]
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        loop {
            while !self.at_end() && self.bytes()[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.rest().starts_with("//") {
                match self.rest().find('\n') {
                    Some(n) => self.pos += n + 1,
                    None => self.pos = self.src.len(),
                }
            } else if self.rest().starts_with("/*") {
                match self.rest().find("*/") {
                    Some(n) => self.pos += n + 2,
                    None => self.pos = self.src.len(),
                }
            } else {
                return;
            }
        }
    }

    /// Skip a string or template literal. The cursor sits on the opening
    /// quote. Template interpolations are skipped with brace balancing.
    fn skip_string(&mut self) {
        let quote = self.bytes()[self.pos];
        self.pos += 1;
        while !self.at_end() {
            let b = self.bytes()[self.pos];
            if b == b'\\' {
                self.pos += 2;
                continue;
            }
            if b == quote {
                self.pos += 1;
                return;
            }
            if quote == b'`' && self.rest().starts_with("${") {
                self.pos += 2;
                let mut depth = 1usize;
                while !self.at_end() && depth > 0 {
                    match self.bytes()[self.pos] {
                        b'{' => {
                            depth += 1;
                            self.pos += 1;
                        }
                        b'}' => {
                            depth -= 1;
                            self.pos += 1;
                        }
                        b'"' | b'\'' | b'`' => self.skip_string(),
                        _ => self.pos += 1,
                    }
                }
                continue;
            }
            self.pos += 1;
        }
    }

    /// Advance to the next significant (non-trivia, non-literal) byte and
    /// return its position and value.
    fn next_significant(&mut self) -> Option<(usize, u8)> {
        loop {
            self.skip_trivia();
            if self.at_end() {
                return None;
            }
            let b = self.bytes()[self.pos];
            if matches!(b, b'"' | b'\'' | b'`') {
                self.skip_string();
                continue;
            }
            let pos = self.pos;
            self.pos += 1;
            return Some((pos, b));
        }
    }

    /// Whether a keyword starts exactly at `pos` with identifier boundaries
    /// on both sides.
    fn keyword_at(&self, pos: usize, kw: &str) -> bool {
        if !self.src[pos..].starts_with(kw) {
            return false;
        }
        let before_ok = pos == 0 || !is_ident_byte(self.bytes()[pos - 1]);
        let after = pos + kw.len();
        let after_ok = after >= self.src.len() || !is_ident_byte(self.bytes()[after]);
        before_ok && after_ok
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

// ─── Imports ────────────────────────────────────────────────────────────

/// Scan the leading import block: directives and comments may interleave,
/// the block ends at the first statement that is not an import.
pub fn scan_imports(src: &str) -> ImportScan {
    let mut scanner = Scanner::new(src, 0);
    let mut imports = Vec::new();
    let mut after_directives = 0;

    loop {
        scanner.skip_trivia();
        if scanner.at_end() {
            break;
        }
        let b = scanner.bytes()[scanner.pos];

        // Leading directive: 'use client', "use strict", ...
        if imports.is_empty() && matches!(b, b'"' | b'\'') {
            scanner.skip_string();
            if scanner.rest().starts_with(';') {
                scanner.pos += 1;
            }
            after_directives = scanner.pos;
            continue;
        }

        if !scanner.keyword_at(scanner.pos, "import") {
            break;
        }
        let start = scanner.pos;
        scanner.pos += "import".len();

        // Every import declaration ends with its module specifier string.
        let mut source = None;
        loop {
            scanner.skip_trivia();
            if scanner.at_end() {
                break;
            }
            match scanner.bytes()[scanner.pos] {
                b'"' | b'\'' => {
                    let str_start = scanner.pos;
                    scanner.skip_string();
                    source = Some(src[str_start + 1..scanner.pos - 1].to_string());
                    break;
                }
                // `import(...)` is a call expression, not a declaration.
                b'(' => break,
                _ => scanner.pos += 1,
            }
        }
        let Some(source) = source else { break };

        if scanner.rest().starts_with(';') {
            scanner.pos += 1;
        }
        imports.push(ImportStatement {
            span: start..scanner.pos,
            source,
        });
    }

    ImportScan {
        insert_offset: last_offset(&imports, after_directives),
        imports,
    }
}

fn last_offset(imports: &[ImportStatement], after_directives: usize) -> usize {
    imports
        .last()
        .map(|i| i.span.end)
        .unwrap_or(after_directives)
}

// ─── Return expression ──────────────────────────────────────────────────

/// Find the returned expression of the first component function in the
/// file: a `function` declaration's top-level `return`, an arrow function's
/// block `return`, or an arrow function's expression body.
pub fn find_return_site(src: &str) -> Option<ReturnSite> {
    for candidate in function_candidates(src) {
        let site = match candidate {
            Candidate::Function(pos) => function_return(src, pos),
            Candidate::Arrow(pos) => arrow_return(src, pos),
        };
        if site.is_some() {
            return site;
        }
    }
    None
}

enum Candidate {
    /// Position of a `function` keyword.
    Function(usize),
    /// Position just after a `=>` token.
    Arrow(usize),
}

fn function_candidates(src: &str) -> Vec<Candidate> {
    let mut scanner = Scanner::new(src, 0);
    let mut out = Vec::new();
    while let Some((pos, b)) = scanner.next_significant() {
        if b == b'f' && scanner.keyword_at(pos, "function") {
            out.push(Candidate::Function(pos));
            scanner.pos = pos + "function".len();
        } else if b == b'=' && src[pos..].starts_with("=>") {
            scanner.pos = pos + 2;
            out.push(Candidate::Arrow(scanner.pos));
        }
    }
    out
}

/// From a `function` keyword: find the body `{`, then a top-level `return`.
fn function_return(src: &str, kw_pos: usize) -> Option<ReturnSite> {
    let mut scanner = Scanner::new(src, kw_pos + "function".len());
    let mut depth = 0usize;
    // Skip name and parameter list to the body brace.
    loop {
        let (_, b) = scanner.next_significant()?;
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b'{' if depth == 0 => break,
            _ => {}
        }
    }
    block_return(src, scanner.pos)
}

/// From just after `=>`: block body or expression body.
fn arrow_return(src: &str, after_arrow: usize) -> Option<ReturnSite> {
    let mut scanner = Scanner::new(src, after_arrow);
    scanner.skip_trivia();
    if scanner.at_end() {
        return None;
    }
    if scanner.bytes()[scanner.pos] == b'{' {
        return block_return(src, scanner.pos + 1);
    }
    let start = scanner.pos;
    let end = expression_end(src, start);
    if end <= start {
        return None;
    }
    Some(ReturnSite {
        span: start..end,
        indent: line_indent(src, start),
    })
}

/// Scan a `{`-delimited body (cursor just inside) for a `return` at depth 0
/// of that body.
fn block_return(src: &str, body_start: usize) -> Option<ReturnSite> {
    let mut scanner = Scanner::new(src, body_start);
    let mut depth = 0usize;
    while let Some((pos, b)) = scanner.next_significant() {
        match b {
            b'{' | b'(' | b'[' => depth += 1,
            b'}' | b')' | b']' => {
                if depth == 0 {
                    return None; // body closed without a return
                }
                depth -= 1;
            }
            b'r' if depth == 0 && scanner.keyword_at(pos, "return") => {
                scanner.pos = pos + "return".len();
                scanner.skip_trivia();
                let start = scanner.pos;
                let end = expression_end(src, start);
                if end <= start {
                    return None;
                }
                return Some(ReturnSite {
                    span: start..end,
                    indent: line_indent(src, pos),
                });
            }
            _ => {}
        }
    }
    None
}

/// End of the expression starting at `start`: the first `;` or `,` at
/// depth 0, or the brace that closes the surrounding body. Trailing
/// whitespace is excluded.
fn expression_end(src: &str, start: usize) -> usize {
    let mut scanner = Scanner::new(src, start);
    let mut depth = 0usize;
    let mut end = src.len();
    while let Some((pos, b)) = scanner.next_significant() {
        match b {
            b'{' | b'(' | b'[' => depth += 1,
            b'}' | b')' | b']' => {
                if depth == 0 {
                    end = pos;
                    break;
                }
                depth -= 1;
            }
            b';' | b',' if depth == 0 => {
                end = pos;
                break;
            }
            _ => {}
        }
    }
    src[start..end].trim_end().len() + start
}

/// Pull the returned markup text out of a component file, with the
/// wrapping parens stripped — this is what feeds the markup parser when an
/// existing file is opened on the canvas.
pub fn extract_return_markup(src: &str) -> Option<&str> {
    let site = find_return_site(src)?;
    let expr = src[site.span].trim();
    if expr.starts_with('(') && expr.ends_with(')') && parens_match(expr) {
        return Some(expr[1..expr.len() - 1].trim());
    }
    Some(expr)
}

/// Whether the first `(` of `expr` closes at its final byte.
fn parens_match(expr: &str) -> bool {
    let mut scanner = Scanner::new(expr, 0);
    let mut depth = 0usize;
    while let Some((pos, b)) = scanner.next_significant() {
        match b {
            b'(' | b'{' | b'[' => depth += 1,
            b')' | b'}' | b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return pos == expr.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

/// Leading whitespace of the line containing `pos`.
fn line_indent(src: &str, pos: usize) -> String {
    let line_start = src[..pos].rfind('\n').map(|n| n + 1).unwrap_or(0);
    src[line_start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scans_leading_imports() {
        let src = "import { A } from '@/a'\nimport B from './b';\n\nconst x = 1\n";
        let scan = scan_imports(src);
        assert_eq!(scan.imports.len(), 2);
        assert_eq!(scan.imports[0].source, "@/a");
        assert_eq!(scan.imports[1].source, "./b");
        assert_eq!(&src[scan.imports[1].span.clone()], "import B from './b';");
        assert_eq!(scan.insert_offset, scan.imports[1].span.end);
    }

    #[test]
    fn directives_stay_above_insert_offset() {
        let src = "'use client'\n\nconst x = 1\n";
        let scan = scan_imports(src);
        assert!(scan.imports.is_empty());
        assert_eq!(scan.insert_offset, "'use client'".len());
    }

    #[test]
    fn multiline_imports_scan_whole_statement() {
        let src = "import {\n  A,\n  B,\n} from '@/components/ui'\nexport const z = 2\n";
        let scan = scan_imports(src);
        assert_eq!(scan.imports.len(), 1);
        assert_eq!(scan.imports[0].source, "@/components/ui");
    }

    #[test]
    fn import_like_text_in_comments_is_ignored() {
        let src = "// import nothing from 'nowhere'\nimport { A } from 'a'\nlet x = 1\n";
        let scan = scan_imports(src);
        assert_eq!(scan.imports.len(), 1);
        assert_eq!(scan.imports[0].source, "a");
    }

    #[test]
    fn finds_function_declaration_return() {
        let src = "function Page() {\n  const x = 1\n  return (\n    <div>{x}</div>\n  )\n}\n";
        let site = find_return_site(src).unwrap();
        assert_eq!(&src[site.span.clone()], "(\n    <div>{x}</div>\n  )");
        assert_eq!(site.indent, "  ");
    }

    #[test]
    fn finds_arrow_block_return() {
        let src = "const Page = () => {\n  return <span>hi</span>;\n}\n";
        let site = find_return_site(src).unwrap();
        assert_eq!(&src[site.span.clone()], "<span>hi</span>");
    }

    #[test]
    fn finds_arrow_expression_body() {
        let src = "export const Page = () => (\n  <div />\n)\n";
        let site = find_return_site(src).unwrap();
        assert_eq!(&src[site.span.clone()], "(\n  <div />\n)");
    }

    #[test]
    fn nested_returns_are_not_the_target() {
        let src =
            "function Page() {\n  const f = () => {\n    if (x) { return null }\n  }\n  return <div />\n}\n";
        let site = find_return_site(src).unwrap();
        assert_eq!(&src[site.span.clone()], "<div />");
    }

    #[test]
    fn braces_in_strings_do_not_confuse_depth() {
        let src = "function Page() {\n  const s = \"}}}{\"\n  const t = `a${'}'}b`\n  return <div />\n}\n";
        let site = find_return_site(src).unwrap();
        assert_eq!(&src[site.span.clone()], "<div />");
    }

    #[test]
    fn extracts_markup_without_wrapping_parens() {
        let src = "function Page() {\n  return (\n    <div>hi</div>\n  )\n}\n";
        assert_eq!(extract_return_markup(src), Some("<div>hi</div>"));

        let bare = "function Page() {\n  return <div />\n}\n";
        assert_eq!(extract_return_markup(bare), Some("<div />"));
    }

    #[test]
    fn no_function_means_no_site() {
        assert!(find_return_site("const x = 1\nexport default x\n").is_none());
    }
}
