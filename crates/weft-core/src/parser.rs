//! Parser for JSX-like markup → element forest.
//!
//! Built on `winnow` 0.7 token primitives over a `&mut &str` cursor.
//! Classification is purely syntactic: lowercase tag names become markup
//! elements, capitalized or dotted names become component references, and
//! non-whitespace text runs become text leaves. Dynamic constructs the
//! canvas cannot represent (expression containers, spread attributes,
//! non-literal attribute values) degrade silently; malformed syntax aborts
//! the whole parse.

use crate::error::ParseError;
use crate::model::{Element, PropValue, ValueBag};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// Parse a markup string into a forest of elements. Every element gets a
/// freshly minted id — identity never survives a reparse.
#[must_use = "parsing result should be used"]
pub fn parse(input: &str) -> Result<Vec<Element>, ParseError> {
    let mut rest = input;
    let full = input.len();
    let nodes = parse_siblings(&mut rest, full, true)?;
    if rest.starts_with("</") {
        return Err(err("unexpected closing tag", full, rest));
    }
    Ok(nodes)
}

fn err(message: &str, full: usize, rest: &str) -> ParseError {
    ParseError::new(message, full - rest.len())
}

/// Parse sibling nodes until EOF (top level) or a closing tag (`</`).
/// At the top level a fragment's children splice into the sibling list;
/// nested fragments are dynamic constructs the canvas drops.
fn parse_siblings(rest: &mut &str, full: usize, top_level: bool) -> Result<Vec<Element>, ParseError> {
    let mut out = Vec::new();
    loop {
        if rest.is_empty() || rest.starts_with("</") {
            return Ok(out);
        }
        if rest.starts_with('<') {
            match parse_node(rest, full)? {
                Parsed::One(el) => out.push(el),
                Parsed::Fragment(children) => {
                    if top_level {
                        out.extend(children);
                    } else {
                        log::debug!("dropping nested fragment");
                    }
                }
            }
        } else if rest.starts_with('{') {
            // Expression container — dynamic content the canvas cannot hold.
            skip_braced(rest, full)?;
        } else {
            // Text run up to the next element or expression container.
            let end = rest.find(['<', '{']).unwrap_or(rest.len());
            let run = &rest[..end];
            *rest = &rest[end..];
            let trimmed = run.trim();
            if !trimmed.is_empty() {
                out.push(Element::text(decode_entities(trimmed)));
            }
        }
    }
}

enum Parsed {
    One(Element),
    Fragment(Vec<Element>),
}

/// Parse one `<...>` node. The cursor sits on `<`.
fn parse_node(rest: &mut &str, full: usize) -> Result<Parsed, ParseError> {
    *rest = &rest[1..]; // '<'
    skip_ws(rest);

    // Fragment: <> ... </>
    if rest.starts_with('>') {
        *rest = &rest[1..];
        let children = parse_siblings(rest, full, false)?;
        expect_closing(rest, full, "")?;
        return Ok(Parsed::Fragment(children));
    }

    let name = parse_tag_name(rest)
        .map_err(|_| err("expected tag name", full, rest))?;
    let is_component = name.contains('.')
        || name.chars().next().is_some_and(|c| c.is_ascii_uppercase());

    let mut props = ValueBag::new();
    let mut styles = ValueBag::new();

    // Attributes, up to `>` or `/>`.
    let self_closing = loop {
        skip_ws(rest);
        if rest.starts_with("/>") {
            *rest = &rest[2..];
            break true;
        }
        if rest.starts_with('>') {
            *rest = &rest[1..];
            break false;
        }
        if rest.is_empty() {
            return Err(err("unterminated opening tag", full, rest));
        }
        if rest.starts_with('{') {
            // Spread attribute — dropped.
            skip_braced(rest, full)?;
            continue;
        }
        let attr = parse_attr_name(rest)
            .map_err(|_| err("expected attribute name", full, rest))?;
        skip_ws(rest);

        let value = if rest.starts_with('=') {
            *rest = &rest[1..];
            skip_ws(rest);
            if rest.starts_with('"') || rest.starts_with('\'') {
                Some(PropValue::Str(parse_quoted(rest, full)?))
            } else if rest.starts_with('{') {
                let inner = skip_braced(rest, full)?;
                parse_literal(inner.trim())
            } else {
                return Err(err("expected attribute value", full, rest));
            }
        } else {
            // Bare attribute shorthand.
            Some(PropValue::Bool(true))
        };

        match value {
            Some(PropValue::Map(bag)) if attr == "style" => styles = *bag,
            Some(_) if attr == "style" => {
                // A style that is not an object literal cannot round-trip.
                log::debug!("dropping non-object style attribute");
            }
            Some(v) => props.insert(attr, v),
            None => log::debug!("dropping non-literal attribute `{attr}`"),
        }
    };

    let children = if self_closing {
        Vec::new()
    } else {
        let children = parse_siblings(rest, full, false)?;
        expect_closing(rest, full, &name)?;
        children
    };

    let el = if is_component {
        Element {
            children: if children.is_empty() { None } else { Some(children) },
            props,
            styles,
            ..Element::component(name)
        }
    } else {
        Element {
            children: Some(children),
            props,
            styles,
            ..Element::markup(name)
        }
    };
    Ok(Parsed::One(el))
}

/// Consume `</name>`, verifying the name matches the open tag.
fn expect_closing(rest: &mut &str, full: usize, open: &str) -> Result<(), ParseError> {
    if !rest.starts_with("</") {
        return Err(err("unclosed element", full, rest));
    }
    *rest = &rest[2..];
    skip_ws(rest);
    let name = parse_tag_name(rest).unwrap_or_default();
    skip_ws(rest);
    if !rest.starts_with('>') {
        return Err(err("malformed closing tag", full, rest));
    }
    *rest = &rest[1..];
    if name != open {
        return Err(err("mismatched closing tag", full, rest));
    }
    Ok(())
}

// ─── Low-level parsers ──────────────────────────────────────────────────

fn skip_ws(input: &mut &str) {
    *input = input.trim_start();
}

fn parse_identifier<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_' || c == '$').parse_next(input)
}

/// A tag name, possibly dotted (`Card.Header`).
fn parse_tag_name(input: &mut &str) -> ModalResult<String> {
    let mut name = parse_identifier.parse_next(input)?.to_string();
    while input.starts_with('.') {
        *input = &input[1..];
        let part = parse_identifier.parse_next(input)?;
        name.push('.');
        name.push_str(part);
    }
    Ok(name)
}

fn parse_attr_name(input: &mut &str) -> ModalResult<String> {
    take_while(1.., |c: char| c.is_alphanumeric() || matches!(c, '_' | '-' | ':'))
        .map(str::to_string)
        .parse_next(input)
}

/// A quoted attribute string. The cursor sits on the opening quote.
fn parse_quoted(rest: &mut &str, full: usize) -> Result<String, ParseError> {
    let quote = rest.as_bytes()[0] as char;
    *rest = &rest[1..];
    let body: &str = take_till::<_, _, ContextError>(0.., quote)
        .parse_next(rest)
        .unwrap_or_default();
    if !rest.starts_with(quote) {
        return Err(err("unterminated string", full, rest));
    }
    let body = decode_entities(body);
    *rest = &rest[1..];
    Ok(body)
}

/// Decode the entities the generator emits, so escape→parse is lossless.
fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// Consume a `{ ... }` span with balanced braces (quote-aware) and return
/// the inner text. The cursor sits on the opening brace.
fn skip_braced<'a>(rest: &mut &'a str, full: usize) -> Result<&'a str, ParseError> {
    let start = *rest;
    let bytes = start.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    *rest = &start[i + 1..];
                    return Ok(&start[1..i]);
                }
            }
            q @ (b'"' | b'\'' | b'`') => {
                // Skip the string body, honoring escapes.
                i += 1;
                while i < bytes.len() && bytes[i] != q {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                if i >= bytes.len() {
                    return Err(err("unterminated string", full, &start[start.len()..]));
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(err("unterminated expression", full, &start[start.len()..]))
}

// ─── Literal values ─────────────────────────────────────────────────────

/// Parse an expression span as a literal value. Anything that is not a
/// string, number, boolean, or flat object literal comes back as `None`
/// and the attribute is dropped.
fn parse_literal(s: &str) -> Option<PropValue> {
    match s {
        "true" => return Some(PropValue::Bool(true)),
        "false" => return Some(PropValue::Bool(false)),
        _ => {}
    }
    if let Ok(n) = s.parse::<f64>() {
        return Some(PropValue::Num(n));
    }
    if let Some(inner) = quoted_literal(s) {
        return Some(PropValue::Str(inner.to_string()));
    }
    if s.starts_with('{') && s.ends_with('}') {
        return parse_object_literal(&s[1..s.len() - 1]).map(PropValue::from);
    }
    None
}

/// `"..."` or `'...'` with no interior quote of the same kind.
fn quoted_literal(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    if s.len() >= 2
        && matches!(bytes[0], b'"' | b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        let inner = &s[1..s.len() - 1];
        if !inner.contains(bytes[0] as char) {
            return Some(inner);
        }
    }
    None
}

/// Parse the body of an object literal (`key: value, ...`). Entries with
/// non-literal values are skipped; a body that is not key/value shaped at
/// all yields `None`.
fn parse_object_literal(body: &str) -> Option<ValueBag> {
    let mut bag = ValueBag::new();
    let mut rest = body;
    loop {
        skip_ws(&mut rest);
        while rest.starts_with(',') {
            rest = &rest[1..];
            skip_ws(&mut rest);
        }
        if rest.is_empty() {
            return Some(bag);
        }

        let key = if rest.starts_with('"') || rest.starts_with('\'') {
            let quote = rest.as_bytes()[0] as char;
            rest = &rest[1..];
            let k: &str = take_till::<_, _, ContextError>(0.., quote)
                .parse_next(&mut rest)
                .ok()?;
            if !rest.starts_with(quote) {
                return None;
            }
            rest = &rest[1..];
            k.to_string()
        } else {
            parse_identifier.parse_next(&mut rest).ok()?.to_string()
        };

        skip_ws(&mut rest);
        if !rest.starts_with(':') {
            return None;
        }
        rest = &rest[1..];
        skip_ws(&mut rest);

        let span = take_entry_span(&mut rest)?;
        if let Some(value) = parse_literal(span.trim()) {
            bag.insert(key, value);
        }
    }
}

/// The value span of one object entry: up to the next top-level comma.
fn take_entry_span<'a>(rest: &mut &'a str) -> Option<&'a str> {
    let bytes = rest.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' | b'[' | b'(' => depth += 1,
            b'}' | b']' | b')' => depth = depth.checked_sub(1)?,
            b',' if depth == 0 => break,
            q @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() && bytes[i] != q {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                if i >= bytes.len() {
                    return None;
                }
            }
            _ => {}
        }
        i += 1;
    }
    let span = &rest[..i];
    *rest = &rest[i..];
    Some(span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classifies_markup_and_components() {
        let forest = parse(r#"<div><Button label="go" /><span>hi</span></div>"#).unwrap();
        assert_eq!(forest.len(), 1);
        let root = &forest[0];
        assert_eq!(root.label(), "div");
        let kids = root.child_slice();
        assert!(kids[0].is_component());
        assert_eq!(kids[0].label(), "Button");
        assert_eq!(kids[0].props.get("label"), Some(&PropValue::Str("go".into())));
        assert_eq!(kids[1].label(), "span");
        assert_eq!(kids[1].child_slice()[0].label(), "#text");
    }

    #[test]
    fn dotted_names_are_components() {
        let forest = parse("<Card.Header>hi</Card.Header>").unwrap();
        assert!(forest[0].is_component());
        assert_eq!(forest[0].label(), "Card.Header");
    }

    #[test]
    fn style_objects_split_from_props() {
        let forest =
            parse(r#"<div style={{ width: 200, background: "blue" }} id="box" />"#).unwrap();
        let el = &forest[0];
        assert_eq!(el.styles.get("width"), Some(&PropValue::Num(200.0)));
        assert_eq!(el.styles.get("background"), Some(&PropValue::Str("blue".into())));
        assert_eq!(el.props.get("id"), Some(&PropValue::Str("box".into())));
        assert_eq!(el.props.get("style"), None);
    }

    #[test]
    fn literal_expression_attributes() {
        let forest = parse(r#"<Input count={3} active={true} label={"x"} />"#).unwrap();
        let el = &forest[0];
        assert_eq!(el.props.get("count"), Some(&PropValue::Num(3.0)));
        assert_eq!(el.props.get("active"), Some(&PropValue::Bool(true)));
        assert_eq!(el.props.get("label"), Some(&PropValue::Str("x".into())));
    }

    #[test]
    fn bare_attribute_is_true() {
        let forest = parse("<input disabled />").unwrap();
        assert_eq!(forest[0].props.get("disabled"), Some(&PropValue::Bool(true)));
    }

    #[test]
    fn dynamic_constructs_degrade_silently() {
        let forest = parse(
            r#"<div onClick={handleClick} {...rest}>{items.map(render)}<span>kept</span></div>"#,
        )
        .unwrap();
        let root = &forest[0];
        assert!(root.props.is_empty());
        assert_eq!(root.child_slice().len(), 1);
        assert_eq!(root.child_slice()[0].label(), "span");
    }

    #[test]
    fn whitespace_text_runs_are_dropped() {
        let forest = parse("<div>\n  <span>a</span>\n  \n</div>").unwrap();
        assert_eq!(forest[0].child_slice().len(), 1);
    }

    #[test]
    fn top_level_fragment_splices_roots() {
        let forest = parse("<>\n<div />\n<Button />\n</>").unwrap();
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].label(), "div");
        assert_eq!(forest[1].label(), "Button");
    }

    #[test]
    fn empty_input_is_empty_forest() {
        assert_eq!(parse("").unwrap(), vec![]);
        assert_eq!(parse("   \n ").unwrap(), vec![]);
    }

    #[test]
    fn mismatched_close_is_an_error() {
        let e = parse("<div><span></div></span>").unwrap_err();
        assert!(e.message.contains("mismatched") || e.message.contains("unclosed"), "{e}");
    }

    #[test]
    fn unclosed_element_is_an_error() {
        assert!(parse("<div><span>").is_err());
        assert!(parse("<div").is_err());
    }

    #[test]
    fn fresh_ids_every_parse() {
        let a = parse("<div />").unwrap();
        let b = parse("<div />").unwrap();
        assert_ne!(a[0].id, b[0].id);
    }
}
