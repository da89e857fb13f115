//! Shape-record decoders for the footprint pipeline.
//!
//! One decoder per recognized tag. The dispatcher isolates per-record
//! failures: an unknown tag or a malformed record drops that single
//! primitive with a warning and the rest of the document continues.

use serde::Deserialize;

use crate::easyeda::{ComponentResult, ConvertError, ConvertResult, ShapeRecord};
use crate::geometry::{mil_to_mm, EllipticalArc, PathCommand, Point};
use crate::report::Reporter;

use super::{
    Arc, Circle, Drill, Footprint, Hole, Layer, Line, ModelReference, Pad, PadKind, PadLayers,
    PadShape, Polygon, Primitive, Text, TextKind,
};

/// Decode-time context shared by all footprint decoders.
#[derive(Debug, Clone)]
pub struct Context {
    /// Declared document origin in raw EasyEDA units.
    pub origin: Point,
    /// Path string written into the footprint's 3-D model reference.
    pub model_path: String,
}

/// Converts a component payload into a finalized footprint document.
#[must_use]
pub fn decode_component(
    result: &ComponentResult,
    name: &str,
    model_path: &str,
    report: &mut Reporter,
) -> Footprint {
    let mut footprint = Footprint::new(name);
    footprint.tags = match result.data_str.head.c_para.get("Supplier Part") {
        Some(id) if !id.is_empty() => format!("{name} footprint {id}"),
        _ => format!("{name} footprint"),
    };
    let origin = Point::new(result.data_str.head.x, result.data_str.head.y);
    footprint.set_origin(origin);

    let context = Context {
        origin,
        model_path: model_path.to_string(),
    };

    for line in &result.data_str.shape {
        dispatch(line, &mut footprint, &context, report);
    }

    footprint.finalize();
    footprint
}

/// Routes one raw shape record to its decoder.
pub fn dispatch(line: &str, footprint: &mut Footprint, context: &Context, report: &mut Reporter) {
    let Some(record) = ShapeRecord::parse(line) else {
        return;
    };

    let outcome = match record.tag {
        "TRACK" => decode_track(&record, footprint, report),
        "PAD" => decode_pad(&record, footprint, report),
        "ARC" => decode_arc(&record, footprint, report),
        "CIRCLE" => decode_circle(&record, footprint, report),
        "SOLIDREGION" => decode_solid_region(&record, footprint, report),
        "SVGNODE" => decode_svg_node(&record, footprint, context),
        "VIA" => {
            report.warn(
                "VIA not supported. Vias are often added for heat dissipation; \
                 check the datasheet if needed.",
            );
            Ok(())
        }
        "RECT" => decode_rect(&record, footprint, report),
        "HOLE" => decode_hole(&record, footprint),
        "TEXT" => decode_text(&record, footprint, report),
        other => {
            report.warn(format!("footprint: unhandled record tag '{other}'"));
            Ok(())
        }
    };

    if let Err(err) = outcome {
        report.warn(format!("footprint: skipping record: {err}"));
    }
}

/// Maps a raw layer code, falling back to the front silkscreen.
fn layer_or_default(code: &str, report: &mut Reporter) -> Layer {
    Layer::from_code(code).unwrap_or_else(|| {
        report.warn(format!("no layer correspondence for code '{code}'"));
        Layer::FSilkS
    })
}

/// Splits a whitespace-separated coordinate list into mm points.
fn parse_points(raw: &str) -> ConvertResult<Vec<Point>> {
    let values: Vec<f64> = raw
        .split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| ConvertError::parse("TRACK", format!("bad coordinate '{token}'")))
        })
        .collect::<ConvertResult<_>>()?;
    Ok(values
        .chunks_exact(2)
        .map(|pair| Point::new(mil_to_mm(pair[0]), mil_to_mm(pair[1])))
        .collect())
}

fn decode_track(
    record: &ShapeRecord,
    footprint: &mut Footprint,
    report: &mut Reporter,
) -> ConvertResult<()> {
    let width = mil_to_mm(record.float(0)?);
    let layer_code = record.field(1)?;

    // Some schema variants slot an extra field before the point list; the
    // list is at index 2 normally, index 3 otherwise.
    let points = match parse_points(record.field(2)?) {
        Ok(points) if !points.is_empty() => points,
        _ => parse_points(record.field(3)?)?,
    };
    if points.len() < 2 {
        return Err(ConvertError::parse("TRACK", "point list has fewer than 2 points"));
    }

    let layer = layer_or_default(layer_code, report);
    for pair in points.windows(2) {
        footprint.push(Primitive::Line(Line {
            start: pair[0],
            end: pair[1],
            width,
            layer,
        }));
    }
    Ok(())
}

fn decode_pad(
    record: &ShapeRecord,
    footprint: &mut Footprint,
    report: &mut Reporter,
) -> ConvertResult<()> {
    let shape = match record.field(0)? {
        "OVAL" => PadShape::Oval,
        "RECT" => PadShape::Rect,
        "ELLIPSE" => PadShape::Circle,
        "POLYGON" => PadShape::Custom,
        other => {
            report.warn(format!("pad: unknown shape '{other}', using oval"));
            PadShape::Oval
        }
    };

    let at = Point::new(mil_to_mm(record.float(1)?), mil_to_mm(record.float(2)?));
    let size = (mil_to_mm(record.float(3)?), mil_to_mm(record.float(4)?));
    let layer_code = record.field(5)?;
    let number = record.field(6)?.to_string();
    let drill_radius = mil_to_mm(record.float(7)?);

    // Circular pads carry no rotation field worth reading.
    let rotation = if shape == PadShape::Circle {
        0.0
    } else {
        record.float(9).unwrap_or(0.0)
    };

    let (kind, layers) = match layer_code {
        "1" => (PadKind::Smd, PadLayers::SmdTop),
        "2" => (PadKind::Smd, PadLayers::SmdBottom),
        "11" => (PadKind::ThroughHole, PadLayers::ThroughHole),
        other => {
            return Err(ConvertError::parse(
                "PAD",
                format!("unknown layer code '{other}' for pad '{number}'"),
            ));
        }
    };

    let drill = match kind {
        // SMD drills are nominal.
        PadKind::Smd => Drill::Round(1.0),
        PadKind::ThroughHole => {
            let diameter = drill_radius * 2.0;
            let offset = record
                .field(11)
                .ok()
                .and_then(|f| f.parse::<f64>().ok())
                .map_or(0.0, mil_to_mm);
            if shape == PadShape::Oval && offset != 0.0 {
                // Align the slot's long axis with the pad's short axis; the
                // XOR swaps the axes when the two disagree.
                if (diameter < offset) ^ (size.0 > size.1) {
                    Drill::Oblong(diameter, offset)
                } else {
                    Drill::Oblong(offset, diameter)
                }
            } else {
                Drill::Round(diameter)
            }
        }
    };

    let outline = if shape == PadShape::Custom {
        record
            .field(8)?
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<f64>()
                    .map_err(|_| ConvertError::parse("PAD", format!("bad outline value '{token}'")))
            })
            .collect::<ConvertResult<Vec<f64>>>()?
            .chunks_exact(2)
            .map(|pair| {
                // Outline points are absolute; store them pad-relative.
                Point::new(mil_to_mm(pair[0]) - at.x, mil_to_mm(pair[1]) - at.y)
            })
            .collect()
    } else {
        Vec::new()
    };

    footprint.push(Primitive::Pad(Pad {
        number,
        kind,
        shape,
        at,
        size,
        rotation,
        drill,
        layers,
        outline,
    }));
    Ok(())
}

fn decode_arc(
    record: &ShapeRecord,
    footprint: &mut Footprint,
    report: &mut Reporter,
) -> ConvertResult<()> {
    let width = mil_to_mm(record.float(0)?);
    let layer = layer_or_default(record.field(1)?, report);

    // The SVG path sits at index 2, or 3 in schema variants that insert an
    // extra field before it.
    let path = [record.field(2)?, record.field(3).unwrap_or_default()]
        .into_iter()
        .find(|f| f.starts_with('M'))
        .ok_or_else(|| ConvertError::parse("ARC", "no SVG path field found"))?;

    let commands = crate::geometry::parse_path(path)?;
    let [PathCommand::MoveTo(start), PathCommand::Arc {
        rx,
        ry,
        x_rotation,
        large_arc,
        sweep,
        end,
    }] = commands[..]
    else {
        return Err(ConvertError::parse("ARC", "expected an 'M ... A ...' path"));
    };

    let arc = EllipticalArc::from_endpoints(
        start.mil_to_mm(),
        end.mil_to_mm(),
        mil_to_mm(rx),
        mil_to_mm(ry),
        x_rotation,
        large_arc,
        sweep,
    )?;

    footprint.push(Primitive::Arc(Arc {
        center: arc.center,
        start: start.mil_to_mm(),
        angle: arc.sweep_angle.to_degrees(),
        width,
        layer,
    }));
    Ok(())
}

fn decode_circle(
    record: &ShapeRecord,
    footprint: &mut Footprint,
    report: &mut Reporter,
) -> ConvertResult<()> {
    // Layer code 100 draws rings on pads; those are not wanted in the
    // footprint.
    if record.field(4)? == "100" {
        return Ok(());
    }

    footprint.push(Primitive::Circle(Circle {
        center: Point::new(mil_to_mm(record.float(0)?), mil_to_mm(record.float(1)?)),
        radius: mil_to_mm(record.float(2)?),
        width: mil_to_mm(record.float(3)?),
        layer: layer_or_default(record.field(4)?, report),
    }));
    Ok(())
}

fn decode_solid_region(
    record: &ShapeRecord,
    footprint: &mut Footprint,
    report: &mut Reporter,
) -> ConvertResult<()> {
    let layer_code = record.field(0)?;

    let path = record
        .fields
        .iter()
        .copied()
        .find(|f| f.starts_with('M'))
        .ok_or_else(|| ConvertError::parse("SOLIDREGION", "no SVG path field found"))?;

    // Non-plated regions cut through the board regardless of the declared
    // layer.
    let kind = record.fields.iter().copied().find(|f| {
        matches!(*f, "solid" | "npth" | "cutout")
    });
    let layer = match kind {
        Some("npth" | "cutout") => Layer::EdgeCuts,
        _ => layer_or_default(layer_code, report),
    };

    let commands = crate::geometry::parse_path(path)?;
    let points: Vec<Point> = crate::geometry::expand_path(&commands)?
        .into_iter()
        .map(Point::mil_to_mm)
        .collect();
    if points.len() < 3 {
        return Err(ConvertError::parse("SOLIDREGION", "outline has fewer than 3 points"));
    }

    footprint.push(Primitive::Polygon(Polygon {
        points,
        width: 0.0,
        layer,
    }));
    Ok(())
}

/// The JSON attribute object carried by an SVGNODE record.
#[derive(Debug, Deserialize)]
struct SvgNode {
    attrs: SvgNodeAttrs,
}

#[derive(Debug, Deserialize)]
struct SvgNodeAttrs {
    #[allow(dead_code)]
    uuid: String,
    #[serde(default)]
    c_origin: String,
    #[serde(default)]
    z: String,
    #[serde(default)]
    c_rotation: String,
}

fn decode_svg_node(
    record: &ShapeRecord,
    footprint: &mut Footprint,
    context: &Context,
) -> ConvertResult<()> {
    let node: SvgNode = serde_json::from_str(record.field(0)?)
        .map_err(|e| ConvertError::parse("SVGNODE", format!("bad attribute JSON: {e}")))?;

    let mut origin = node.attrs.c_origin.split(',').map(str::trim);
    let x: f64 = origin
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| ConvertError::parse("SVGNODE", "missing model origin X"))?;
    let y: f64 = origin
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| ConvertError::parse("SVGNODE", "missing model origin Y"))?;
    let z: f64 = node.attrs.z.parse().unwrap_or(0.0);

    let mut rotate = node
        .attrs
        .c_rotation
        .split(',')
        .map(|v| -v.trim().parse::<f64>().unwrap_or(0.0));
    let rotation = (
        rotate.next().unwrap_or(0.0),
        rotate.next().unwrap_or(0.0),
        rotate.next().unwrap_or(0.0),
    );

    // Without a transcoded model on disk there is nothing to reference;
    // the anchor is still parsed so malformed records get reported.
    if context.model_path.is_empty() {
        return Ok(());
    }

    // Model offsets use the viewer's coordinate space: raw units / 100,
    // relative to the document origin, Y flipped.
    footprint.push(Primitive::Model(ModelReference {
        path: context.model_path.clone(),
        at: (
            (x - context.origin.x) / 100.0,
            -(y - context.origin.y) / 100.0,
            z / 100.0,
        ),
        rotate: rotation,
    }));
    Ok(())
}

fn decode_rect(
    record: &ShapeRecord,
    footprint: &mut Footprint,
    report: &mut Reporter,
) -> ConvertResult<()> {
    let x = mil_to_mm(record.float(0)?);
    let y = mil_to_mm(record.float(1)?);
    let dx = mil_to_mm(record.float(2)?);
    let dy = mil_to_mm(record.float(3)?);
    let layer = layer_or_default(record.field(4)?, report);

    // Zero stroke width means a filled region; nonzero draws an outline.
    let width = record
        .field(5)
        .ok()
        .and_then(|f| f.parse::<f64>().ok())
        .map_or(0.0, mil_to_mm);

    footprint.push(Primitive::Polygon(Polygon {
        points: vec![
            Point::new(x, y),
            Point::new(x + dx, y),
            Point::new(x + dx, y + dy),
            Point::new(x, y + dy),
        ],
        width,
        layer,
    }));
    Ok(())
}

fn decode_hole(record: &ShapeRecord, footprint: &mut Footprint) -> ConvertResult<()> {
    footprint.push(Primitive::Hole(Hole {
        at: Point::new(mil_to_mm(record.float(0)?), mil_to_mm(record.float(1)?)),
        diameter: mil_to_mm(record.float(2)?) * 2.0,
    }));
    Ok(())
}

fn decode_text(
    record: &ShapeRecord,
    footprint: &mut Footprint,
    report: &mut Reporter,
) -> ConvertResult<()> {
    footprint.push(Primitive::Text(Text {
        kind: TextKind::User,
        at: Point::new(mil_to_mm(record.float(1)?), mil_to_mm(record.float(2)?)),
        text: record.field(8)?.to_string(),
        layer: layer_or_default(record.field(7)?, report),
    }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> Context {
        Context {
            origin: Point::new(0.0, 0.0),
            model_path: "models/TEST.wrl".to_string(),
        }
    }

    fn decode_one(line: &str) -> (Footprint, Reporter) {
        let mut footprint = Footprint::new("TEST");
        let mut report = Reporter::new();
        dispatch(line, &mut footprint, &context(), &mut report);
        (footprint, report)
    }

    #[test]
    fn oval_smd_pad_fixture() {
        let (fp, report) = decode_one("PAD~OVAL~0~0~10~10~1~1~5~0~0");
        assert!(report.is_clean());

        let [Primitive::Pad(pad)] = fp.primitives() else {
            panic!("expected one pad, got {:?}", fp.primitives());
        };
        assert_eq!(pad.number, "1");
        assert_eq!(pad.kind, PadKind::Smd);
        assert_eq!(pad.shape, PadShape::Oval);
        assert_eq!(pad.layers, PadLayers::SmdTop);
        assert!((pad.at.x).abs() < 1e-9 && (pad.at.y).abs() < 1e-9);
        assert!((pad.size.0 - mil_to_mm(10.0)).abs() < 1e-9);
        assert_eq!(pad.drill, Drill::Round(1.0));
    }

    #[test]
    fn through_hole_pad_drill() {
        // Layer 11, drill radius 5 mil -> round drill of 10 mil.
        let (fp, _) = decode_one("PAD~ELLIPSE~0~0~20~20~11~2~5~~0");
        let [Primitive::Pad(pad)] = fp.primitives() else {
            panic!("expected one pad");
        };
        assert_eq!(pad.kind, PadKind::ThroughHole);
        assert_eq!(pad.shape, PadShape::Circle);
        assert!((pad.rotation).abs() < f64::EPSILON);
        let Drill::Round(d) = pad.drill else {
            panic!("expected round drill");
        };
        assert!((d - mil_to_mm(10.0)).abs() < 1e-9);
    }

    #[test]
    fn oblong_drill_axis_rule() {
        // Oval pad wider than tall, drill diameter 10 mil < offset 20 mil:
        // the slot's long axis follows the pad's long axis.
        let (fp, _) = decode_one("PAD~OVAL~0~0~40~20~11~3~5~~0~id~20");
        let [Primitive::Pad(pad)] = fp.primitives() else {
            panic!("expected one pad");
        };
        let Drill::Oblong(w, h) = pad.drill else {
            panic!("expected oblong drill, got {:?}", pad.drill);
        };
        assert!((w - mil_to_mm(20.0)).abs() < 1e-9);
        assert!((h - mil_to_mm(10.0)).abs() < 1e-9);
    }

    #[test]
    fn unknown_pad_layer_is_skipped() {
        let (fp, report) = decode_one("PAD~OVAL~0~0~10~10~9~1~5~0~0");
        assert!(fp.primitives().is_empty());
        assert_eq!(report.warnings().len(), 1);
    }

    #[test]
    fn track_becomes_line_segments() {
        let (fp, report) = decode_one("TRACK~1~3~~0 0 10 0 10 10~id");
        assert!(report.is_clean());
        assert_eq!(fp.primitives().len(), 2);
        let Primitive::Line(line) = &fp.primitives()[1] else {
            panic!("expected line");
        };
        assert!((line.end.y - mil_to_mm(10.0)).abs() < 1e-9);
        assert_eq!(line.layer, Layer::FSilkS);
    }

    #[test]
    fn arc_record_derives_center() {
        // Semicircle from (0,0) to (20,0), radius 10 mil.
        let (fp, report) = decode_one("ARC~1~3~M 0 0 A 10 10 0 0 1 20 0~~id");
        assert!(report.is_clean(), "warnings: {:?}", report.warnings());
        let [Primitive::Arc(arc)] = fp.primitives() else {
            panic!("expected one arc, got {:?}", fp.primitives());
        };
        assert!((arc.center.x - mil_to_mm(10.0)).abs() < 1e-6);
        assert!((arc.center.y).abs() < 1e-6);
        assert!((arc.angle - 180.0).abs() < 1e-6);
    }

    #[test]
    fn unknown_tag_never_aborts() {
        let mut footprint = Footprint::new("TEST");
        let mut report = Reporter::new();
        dispatch("MYSTERY~1~2~3", &mut footprint, &context(), &mut report);
        dispatch("HOLE~0~0~10", &mut footprint, &context(), &mut report);
        assert_eq!(report.warnings().len(), 1);
        assert_eq!(footprint.primitives().len(), 1);
    }

    #[test]
    fn short_pad_record_is_dropped_not_fatal() {
        let (fp, report) = decode_one("PAD~OVAL~0~0");
        assert!(fp.primitives().is_empty());
        assert_eq!(report.warnings().len(), 1);
    }

    #[test]
    fn solid_region_rejects_unsupported_commands() {
        let (fp, report) = decode_one("SOLIDREGION~10~~M 0 0 C 1 1 2 2 3 3 Z~solid~id");
        assert!(fp.primitives().is_empty());
        assert!(report.warnings()[0].contains("unsupported path command"));
    }

    #[test]
    fn solid_region_expands_arcs() {
        let (fp, report) =
            decode_one("SOLIDREGION~10~~M 0 0 L 40 0 A 20 20 0 0 1 0 0 Z~solid~id");
        assert!(report.is_clean(), "warnings: {:?}", report.warnings());
        let [Primitive::Polygon(poly)] = fp.primitives() else {
            panic!("expected one polygon");
        };
        assert_eq!(poly.layer, Layer::EdgeCuts);
        assert!(poly.points.len() >= 10);
        assert!((poly.width).abs() < f64::EPSILON);
    }

    #[test]
    fn svg_node_model_reference() {
        let line = r#"SVGNODE~{"gId":"g1","attrs":{"uuid":"abc123","c_origin":"400,300","z":"2.5","c_rotation":"0,0,90"}}"#;
        let mut footprint = Footprint::new("TEST");
        let mut report = Reporter::new();
        let context = Context {
            origin: Point::new(390.0, 310.0),
            model_path: "models/TEST.wrl".to_string(),
        };
        dispatch(line, &mut footprint, &context, &mut report);
        assert!(report.is_clean(), "warnings: {:?}", report.warnings());

        let [Primitive::Model(model)] = footprint.primitives() else {
            panic!("expected model reference");
        };
        assert_eq!(model.path, "models/TEST.wrl");
        assert!((model.at.0 - 0.1).abs() < 1e-9);
        assert!((model.at.1 - 0.1).abs() < 1e-9);
        assert!((model.at.2 - 0.025).abs() < 1e-9);
        assert!((model.rotate.2 - -90.0).abs() < 1e-9);
    }

    #[test]
    fn svg_node_without_model_emits_nothing() {
        let line = r#"SVGNODE~{"gId":"g1","attrs":{"uuid":"abc123","c_origin":"400,300","z":"2.5","c_rotation":"0,0,90"}}"#;
        let mut footprint = Footprint::new("TEST");
        let mut report = Reporter::new();
        let context = Context {
            origin: Point::new(390.0, 310.0),
            model_path: String::new(),
        };
        dispatch(line, &mut footprint, &context, &mut report);
        assert!(report.is_clean(), "warnings: {:?}", report.warnings());
        assert!(footprint.primitives().is_empty());
    }

    #[test]
    fn rect_zero_width_is_filled() {
        let (fp, _) = decode_one("RECT~0~0~40~20~3~0~id");
        let [Primitive::Polygon(poly)] = fp.primitives() else {
            panic!("expected polygon");
        };
        assert_eq!(poly.points.len(), 4);
        assert!((poly.width).abs() < f64::EPSILON);
    }
}
