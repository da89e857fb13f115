//! End-to-end footprint conversion tests.
//!
//! Feed complete EasyEDA payload envelopes through the decoder and the
//! `.kicad_mod` writer and check the rendered document.

use jlc2kicad::easyeda::ComponentPayload;
use jlc2kicad::footprint::decoders::decode_component;
use jlc2kicad::footprint::writer::render;
use jlc2kicad::report::Reporter;

fn payload(shapes: &[&str]) -> ComponentPayload {
    let shape_json: Vec<String> = shapes.iter().map(|s| format!("\"{s}\"")).collect();
    let json = format!(
        r#"{{
            "success": true,
            "result": {{
                "title": "R0603",
                "dataStr": {{
                    "head": {{ "x": 4000, "y": 3000, "c_para": {{ "link": "https://example.com" }} }},
                    "shape": [{}]
                }}
            }}
        }}"#,
        shape_json.join(",")
    );
    ComponentPayload::from_json(&json).expect("payload should parse")
}

fn convert(shapes: &[&str]) -> (String, Reporter) {
    let payload = payload(shapes);
    let mut report = Reporter::new();
    let name = payload.result.footprint_name(&mut report);
    let footprint = decode_component(&payload.result, &name, "", &mut report);
    (render(&footprint), report)
}

#[test]
fn smd_pad_fixture_renders_as_top_layer_oval() {
    let (text, report) = convert(&["PAD~OVAL~4000~3000~10~10~1~1~5~0~0"]);
    assert!(report.is_clean(), "warnings: {:?}", report.warnings());
    assert!(text.contains("(attr smd)"));
    assert!(text.contains("(pad \"1\" smd oval (at 0 0)"));
    assert!(text.contains("(layers F.Cu F.Paste F.Mask)"));
    // 10 mil on each axis.
    assert!(text.contains("(size 2.540005 2.540005)"));
}

#[test]
fn multilayer_pad_lifts_mount_type() {
    let (text, _) = convert(&["PAD~ELLIPSE~4000~3000~10~10~11~1~5~0~0"]);
    assert!(text.contains("(attr through_hole)"));
    assert!(text.contains("thru_hole circle"));
    // Through-hole drill is twice the radius field.
    assert!(text.contains("(drill 2.540005)"));
}

#[test]
fn origin_translation_and_placeholder_texts() {
    let (text, _) = convert(&["TRACK~1~3~4000 3000 4010 3000~id1"]);
    // The first track endpoint coincides with the declared origin.
    assert!(text.contains("(fp_line (start 0 0)"));
    assert!(text.contains("(fp_text reference \"REF**\""));
    assert!(text.contains("(fp_text value \"R0603\""));
    assert!(text.contains("(fp_text user \"${REFERENCE}\""));
    assert!(text.contains("(layer F.Fab)"));
}

#[test]
fn unknown_tag_warns_and_continues() {
    let (text, report) = convert(&[
        "WIDGET~1~2~3",
        "TRACK~1~3~4000 3000 4010 3000~id1",
    ]);
    assert_eq!(report.warnings().len(), 1);
    assert!(text.contains("(fp_line"));
}

#[test]
fn silkscreen_circle_on_layer_100_is_skipped() {
    let (text, report) = convert(&["CIRCLE~4005~3005~2~1~100~id9"]);
    assert!(report.is_clean());
    assert!(!text.contains("fp_circle"));
}

#[test]
fn hole_renders_as_npth_pad() {
    let (text, _) = convert(&["HOLE~4000~3000~2~id4"]);
    assert!(text.contains("np_thru_hole circle"));
    // Diameter is twice the radius field, in mm.
    assert!(text.contains("(drill 1.016002)"));
}

#[test]
fn via_only_warns() {
    let (text, report) = convert(&["VIA~1~4000~3000~2~~1~id5"]);
    assert_eq!(report.warnings().len(), 1);
    assert!(!text.contains("(pad"));
}

#[test]
fn document_is_balanced() {
    let (text, _) = convert(&[
        "TRACK~1~3~4000 3000 4010 3000~id1",
        "PAD~RECT~4010~3010~10~6~2~2~0~0~0",
    ]);
    let opens = text.matches('(').count();
    let closes = text.matches(')').count();
    assert_eq!(opens, closes);
}

#[test]
fn tags_carry_name_and_supplier_part() {
    let json = r#"{
        "success": true,
        "result": {
            "title": "R0603",
            "dataStr": {
                "head": { "x": 4000, "y": 3000, "c_para": { "Supplier Part": "C23630" } },
                "shape": ["TRACK~1~3~4000 3000 4010 3000~id1"]
            }
        }
    }"#;
    let payload = ComponentPayload::from_json(json).expect("payload should parse");
    let mut report = Reporter::new();
    let name = payload.result.footprint_name(&mut report);
    let footprint = decode_component(&payload.result, &name, "", &mut report);
    let text = render(&footprint);
    assert!(text.contains("(tags \"R0603 footprint C23630\")"));

    // Without a supplier id the tags fall back to the bare name.
    let (text, _) = convert(&["TRACK~1~3~4000 3000 4010 3000~id1"]);
    assert!(text.contains("(tags \"R0603 footprint\")"));
}
