//! Integration tests: parse → generate → re-parse round-trip.
//!
//! Ids are freshly minted on every parse, so equality here is structural:
//! kinds, props, styles, and child order must survive; generated text must
//! reach a fixed point after one cycle.

use weft_core::emitter::generate;
use weft_core::model::PropValue;
use weft_core::parser::parse;
use weft_core::tree::{collect_ids, same_shape};

// ─── Helpers ─────────────────────────────────────────────────────────────

/// Parse, generate, re-parse: the two forests must have the same shape and
/// the second generation must be byte-identical to the first.
fn assert_roundtrip_stable(input: &str) {
    let forest1 = parse(input).expect("first parse failed");
    let text1 = generate(&forest1, 0);
    let forest2 = parse(&text1).expect("re-parse failed");

    assert!(
        same_shape(&forest1, &forest2),
        "shape changed after round-trip.\nOriginal:\n{input}\nGenerated:\n{text1}"
    );
    let text2 = generate(&forest2, 0);
    assert_eq!(text1, text2, "generation did not reach a fixed point");
}

// ─── Round-trip scenarios ────────────────────────────────────────────────

#[test]
fn roundtrip_landing_section() {
    assert_roundtrip_stable(
        r##"<section style={{ padding: 32, background: "#f5f5f5" }} id="hero">
  <h1>Welcome</h1>
  <Button label="Get started" size="lg" />
  <Card.Body>
    <p>Build pages visually.</p>
  </Card.Body>
</section>"##,
    );
}

#[test]
fn roundtrip_multiple_roots() {
    assert_roundtrip_stable("<>\n  <header>top</header>\n  <main>body</main>\n</>");
}

#[test]
fn roundtrip_single_style_entry() {
    assert_roundtrip_stable(r#"<div style={{ width: 200 }}>x</div>"#);
}

#[test]
fn roundtrip_numeric_and_boolean_props() {
    assert_roundtrip_stable(r#"<Slider min={0} max={1.5} step={0.25} disabled />"#);
}

// ─── Degradation ─────────────────────────────────────────────────────────

#[test]
fn dynamic_parts_are_gone_after_one_cycle() {
    let input = r#"<div onClick={() => track("hit")} data-test="keep">
  {items.map((i) => <Row key={i} />)}
  <span>static</span>
</div>"#;
    let forest = parse(input).unwrap();
    let text = generate(&forest, 0);

    assert!(!text.contains("onClick"));
    assert!(!text.contains("items.map"));
    assert!(text.contains(r#"data-test="keep""#));
    assert!(text.contains("<span>"));

    // Once degraded, the output is stable.
    assert_roundtrip_stable(&text);
}

#[test]
fn string_props_survive_escaping_cycle() {
    let mut el = weft_core::model::Element::component("Badge");
    el.props.insert("label", "a < b & \"c\"");
    let text = generate(&[el.clone()], 0);
    assert!(text.contains("&lt;"));

    let back = parse(&text).unwrap();
    assert_eq!(
        back[0].props.get("label"),
        Some(&PropValue::Str("a < b & \"c\"".into()))
    );
    assert_roundtrip_stable(&text);
}

// ─── Identity ────────────────────────────────────────────────────────────

#[test]
fn every_parse_mints_distinct_ids() {
    let input = "<div><span>a</span><span>b</span></div>";
    let a = parse(input).unwrap();
    let b = parse(input).unwrap();
    let ids_a = collect_ids(&a);
    let ids_b = collect_ids(&b);
    assert_eq!(ids_a.len(), 3);
    for id in &ids_a {
        assert!(!ids_b.contains(id));
    }
}

#[test]
fn ids_unique_within_a_forest() {
    let forest = parse("<div><p>a</p><p>b</p><p>c</p></div>").unwrap();
    let mut ids = collect_ids(&forest);
    let before = ids.len();
    ids.sort_by_key(|id| id.as_str().to_string());
    ids.dedup();
    assert_eq!(ids.len(), before);
}
