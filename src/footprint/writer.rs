//! `.kicad_mod` s-expression serialization.

use std::fmt::Write as _;

use super::{Drill, Footprint, Pad, PadShape, Primitive};

/// Formats a coordinate, trimming trailing zeros like the KiCad tooling.
fn fmt(value: f64) -> String {
    // Snap sub-micrometre noise from the unit conversion.
    let rounded = (value * 1_000_000.0).round() / 1_000_000.0;
    let mut text = format!("{rounded:.6}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

/// Renders a finalized footprint as `.kicad_mod` text.
#[must_use]
pub fn render(footprint: &Footprint) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "(module \"{}\" (layer F.Cu) (tedit 0)", footprint.name);
    let _ = writeln!(out, "  (descr \"{}\")", footprint.description);
    let _ = writeln!(out, "  (tags \"{}\")", footprint.tags);
    let _ = writeln!(out, "  (attr {})", footprint.mount_type().as_str());

    for primitive in footprint.primitives() {
        render_primitive(&mut out, primitive);
    }

    out.push_str(")\n");
    out
}

fn render_primitive(out: &mut String, primitive: &Primitive) {
    match primitive {
        Primitive::Line(line) => {
            let _ = writeln!(
                out,
                "  (fp_line (start {} {}) (end {} {}) (layer {}) (width {}))",
                fmt(line.start.x),
                fmt(line.start.y),
                fmt(line.end.x),
                fmt(line.end.y),
                line.layer.as_str(),
                fmt(line.width),
            );
        }
        Primitive::Arc(arc) => {
            // fp_arc names the center "start" and the arc start "end".
            let _ = writeln!(
                out,
                "  (fp_arc (start {} {}) (end {} {}) (angle {}) (layer {}) (width {}))",
                fmt(arc.center.x),
                fmt(arc.center.y),
                fmt(arc.start.x),
                fmt(arc.start.y),
                fmt(arc.angle),
                arc.layer.as_str(),
                fmt(arc.width),
            );
        }
        Primitive::Circle(circle) => {
            let _ = writeln!(
                out,
                "  (fp_circle (center {} {}) (end {} {}) (layer {}) (width {}))",
                fmt(circle.center.x),
                fmt(circle.center.y),
                fmt(circle.center.x + circle.radius),
                fmt(circle.center.y),
                circle.layer.as_str(),
                fmt(circle.width),
            );
        }
        Primitive::Polygon(polygon) => {
            let points: Vec<String> = polygon
                .points
                .iter()
                .map(|p| format!("(xy {} {})", fmt(p.x), fmt(p.y)))
                .collect();
            let _ = writeln!(
                out,
                "  (fp_poly (pts {}) (layer {}) (width {}))",
                points.join(" "),
                polygon.layer.as_str(),
                fmt(polygon.width),
            );
        }
        Primitive::Text(text) => {
            let _ = writeln!(
                out,
                "  (fp_text {} \"{}\" (at {} {}) (layer {})",
                text.kind.as_str(),
                text.text,
                fmt(text.at.x),
                fmt(text.at.y),
                text.layer.as_str(),
            );
            out.push_str("    (effects (font (size 1 1) (thickness 0.15)))\n  )\n");
        }
        Primitive::Pad(pad) => render_pad(out, pad),
        Primitive::Hole(hole) => {
            let _ = writeln!(
                out,
                "  (pad \"\" np_thru_hole circle (at {} {}) (size {} {}) (drill {}) (layers *.Cu *.Mask))",
                fmt(hole.at.x),
                fmt(hole.at.y),
                fmt(hole.diameter),
                fmt(hole.diameter),
                fmt(hole.diameter),
            );
        }
        Primitive::Model(model) => {
            let _ = writeln!(out, "  (model \"{}\"", model.path);
            let _ = writeln!(
                out,
                "    (at (xyz {} {} {}))",
                fmt(model.at.0),
                fmt(model.at.1),
                fmt(model.at.2)
            );
            out.push_str("    (scale (xyz 1 1 1))\n");
            let _ = writeln!(
                out,
                "    (rotate (xyz {} {} {}))\n  )",
                fmt(model.rotate.0),
                fmt(model.rotate.1),
                fmt(model.rotate.2)
            );
        }
    }
}

fn render_pad(out: &mut String, pad: &Pad) {
    let kind = match pad.kind {
        super::PadKind::Smd => "smd",
        super::PadKind::ThroughHole => "thru_hole",
    };

    let at = if pad.rotation.abs() < f64::EPSILON {
        format!("(at {} {})", fmt(pad.at.x), fmt(pad.at.y))
    } else {
        format!(
            "(at {} {} {})",
            fmt(pad.at.x),
            fmt(pad.at.y),
            fmt(pad.rotation)
        )
    };

    let drill = match (pad.kind, pad.drill) {
        // SMD drills are nominal and not written out.
        (super::PadKind::Smd, _) => String::new(),
        (super::PadKind::ThroughHole, Drill::Round(d)) => format!(" (drill {})", fmt(d)),
        (super::PadKind::ThroughHole, Drill::Oblong(w, h)) => {
            format!(" (drill oval {} {})", fmt(w), fmt(h))
        }
    };

    let _ = write!(
        out,
        "  (pad \"{}\" {} {} {} (size {} {}){} (layers {})",
        pad.number,
        kind,
        pad.shape.as_str(),
        at,
        fmt(pad.size.0),
        fmt(pad.size.1),
        drill,
        pad.layers.as_str(),
    );

    if pad.shape == PadShape::Custom && !pad.outline.is_empty() {
        let points: Vec<String> = pad
            .outline
            .iter()
            .map(|p| format!("(xy {} {})", fmt(p.x), fmt(p.y)))
            .collect();
        let _ = write!(
            out,
            "\n    (primitives (gr_poly (pts {}) (width 0)))\n  )",
            points.join(" ")
        );
    } else {
        out.push(')');
    }
    out.push('\n');
}
