//! Symbol shape-record decoders.
//!
//! Symbol coordinates are raw mil values relative to the document head
//! origin; decoding subtracts the origin, converts to mm and negates Y
//! (schematic Y points up). Field lists are indexed after empty tokens
//! are filtered out.

use tracing::debug;

use crate::easyeda::{ComponentResult, ConvertError, ConvertResult, ShapeRecord};
use crate::geometry::{self, EllipticalArc, PathCommand, Point};
use crate::report::Reporter;
use crate::symbol::{ElectricalType, Justify, StrokeStyle, SymbolPrimitive, SymbolUnit};

/// Shared decode state for one symbol unit.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    /// Document head origin in raw mil units.
    pub origin: Point,
}

impl Context {
    /// Converts a raw coordinate pair into local mm coordinates.
    fn to_local(&self, x: f64, y: f64) -> Point {
        Point::new(
            geometry::mil_to_mm(x - self.origin.x),
            -geometry::mil_to_mm(y - self.origin.y),
        )
    }
}

/// Decodes one symbol unit from a component payload.
#[must_use]
pub fn decode_unit(result: &ComponentResult, report: &mut Reporter) -> SymbolUnit {
    let context = Context {
        origin: Point::new(result.data_str.head.x, result.data_str.head.y),
    };
    let mut unit = SymbolUnit::new();
    for line in &result.data_str.shape {
        dispatch(line, &mut unit, &context, report);
    }
    unit
}

/// Routes one raw record line to its decoder.
///
/// Recoverable decode failures are reported as warnings; the record is
/// skipped and decoding continues.
pub fn dispatch(line: &str, unit: &mut SymbolUnit, context: &Context, report: &mut Reporter) {
    let Some(record) = ShapeRecord::parse(line) else {
        return;
    };
    debug!(tag = record.tag, "decoding symbol record");
    let outcome = match record.tag {
        "R" => decode_rectangle(&record, unit, context),
        "E" => decode_circle(&record, unit, context),
        "P" => decode_pin(&record, unit, context, report),
        "T" => decode_text(&record, unit, context),
        "PL" => decode_polyline(&record, unit, context, false),
        "PG" => decode_polygon(&record, unit, context),
        "PT" => decode_path_polygon(&record, unit, context),
        "A" => decode_arc(&record, unit, context),
        "AR" => decode_arrowhead(&record, unit, context),
        other => {
            report.warn(format!("symbol: record '{other}' is not supported, skipped"));
            Ok(())
        }
    };
    if let Err(err) = outcome {
        if err.is_recoverable() {
            report.warn(err.to_string());
        } else {
            report.error(err.to_string());
        }
    }
}

fn require<'a>(record: &ShapeRecord<'_>, fields: &[&'a str], index: usize) -> ConvertResult<&'a str> {
    fields.get(index).copied().ok_or_else(|| {
        ConvertError::parse(
            record.tag,
            format!("expected at least {} fields, got {}", index + 1, fields.len()),
        )
    })
}

fn require_float(record: &ShapeRecord<'_>, fields: &[&str], index: usize) -> ConvertResult<f64> {
    let raw = require(record, fields, index)?;
    raw.parse::<f64>().map_err(|_| {
        ConvertError::parse(record.tag, format!("field {index} is not a number: '{raw}'"))
    })
}

/// Parses a `NNpt` font size into mm, falling back when absent.
fn font_size(fields: &[&str], index: usize, default: f64) -> f64 {
    fields
        .get(index)
        .and_then(|raw| raw.replace("pt", "").parse::<f64>().ok())
        .map_or(default, geometry::mil_to_mm)
}

fn decode_rectangle(
    record: &ShapeRecord<'_>,
    unit: &mut SymbolUnit,
    context: &Context,
) -> ConvertResult<()> {
    let fields = record.fields_nonempty();
    let x1 = require_float(record, &fields, 0)?;
    let y1 = require_float(record, &fields, 1)?;
    let width = require_float(record, &fields, 4)?;
    let length = require_float(record, &fields, 5)?;
    let style = match fields.get(8).copied() {
        Some("1") => StrokeStyle::Dash,
        Some("2") => StrokeStyle::Dot,
        _ => StrokeStyle::Default,
    };
    unit.push(SymbolPrimitive::Rectangle {
        start: context.to_local(x1, y1),
        end: context.to_local(x1 + width, y1 + length),
        style,
    });
    Ok(())
}

fn decode_circle(
    record: &ShapeRecord<'_>,
    unit: &mut SymbolUnit,
    context: &Context,
) -> ConvertResult<()> {
    let fields = record.fields_nonempty();
    let x = require_float(record, &fields, 0)?;
    let y = require_float(record, &fields, 1)?;
    let radius = require_float(record, &fields, 2)?;
    unit.push(SymbolPrimitive::Circle {
        center: context.to_local(x, y),
        radius: geometry::mil_to_mm(radius),
    });
    Ok(())
}

fn decode_pin(
    record: &ShapeRecord<'_>,
    unit: &mut SymbolUnit,
    context: &Context,
    report: &mut Reporter,
) -> ConvertResult<()> {
    let fields = record.fields_nonempty();
    let electrical = ElectricalType::from_code(require(record, &fields, 1)?);
    let number = require(record, &fields, 2)?.to_string();
    let name = fields.get(13).copied().unwrap_or_default().to_string();

    let x = require_float(record, &fields, 3)?;
    let y = require_float(record, &fields, 4)?;
    let at = context.to_local(x, y);

    let rotation = fields
        .get(5)
        .and_then(|raw| raw.parse::<i32>().ok())
        .map_or(180, |r| ((r + 180).rem_euclid(360)) as u16);

    // The pin stem is an SVG path with a single horizontal or vertical
    // segment; its displacement gives the pin length.
    let stem = fields.get(8).copied().unwrap_or_default();
    let segment = match rotation {
        0 | 180 => stem.rsplit('h').next(),
        90 | 270 => stem.rsplit('v').next(),
        _ => None,
    };
    let length = match segment.and_then(|raw| raw.trim().parse::<f64>().ok()) {
        Some(value) => geometry::mil_to_mm(value.abs()),
        None => {
            report.warn(format!(
                "symbol: pin {number} '{name}' has no usable stem path, using default length"
            ));
            2.54
        }
    };

    // Visibility flags ride behind a "^^" separator; any nonzero value
    // switches the whole symbol to visible names/numbers.
    if visibility_flag(fields.get(9)) {
        unit.pin_names_shown = true;
    }
    if visibility_flag(fields.get(17)) {
        unit.pin_numbers_shown = true;
    }

    let name_size = font_size(&fields, 16, 1.0);
    let number_size = font_size(&fields, 24, 1.0);

    unit.push(SymbolPrimitive::Pin {
        electrical,
        number,
        name,
        at,
        rotation,
        length,
        name_size,
        number_size,
    });
    Ok(())
}

fn visibility_flag(field: Option<&&str>) -> bool {
    field
        .and_then(|raw| raw.split("^^").nth(1))
        .is_some_and(|flag| flag != "0")
}

fn decode_text(
    record: &ShapeRecord<'_>,
    unit: &mut SymbolUnit,
    context: &Context,
) -> ConvertResult<()> {
    let fields = record.fields_nonempty();
    let x = require_float(record, &fields, 1)?;
    let y = require_float(record, &fields, 2)?;
    // Symbol text angles are stored in tenths of a degree.
    let rotation = fields
        .get(3)
        .and_then(|raw| raw.parse::<i32>().ok())
        .map_or(1800, |r| ((r + 180).rem_euclid(360)) * 10);
    let size = font_size(&fields, 6, 15.0);
    let text = fields.get(11).copied().unwrap_or_default().to_string();
    let justify = match fields.get(13).copied() {
        Some("end") => Justify::Right,
        _ => Justify::Left,
    };
    unit.push(SymbolPrimitive::Text {
        at: context.to_local(x, y),
        rotation,
        text,
        font_size: size,
        justify,
    });
    Ok(())
}

fn parse_point_pairs(
    record: &ShapeRecord<'_>,
    raw: &str,
    context: &Context,
) -> ConvertResult<Vec<Point>> {
    let values: Vec<f64> = raw
        .split([' ', ','])
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<f64>().map_err(|_| {
                ConvertError::parse(record.tag, format!("invalid coordinate '{t}'"))
            })
        })
        .collect::<ConvertResult<_>>()?;
    Ok(values
        .chunks_exact(2)
        .map(|pair| context.to_local(pair[0], pair[1]))
        .collect())
}

fn decode_polyline(
    record: &ShapeRecord<'_>,
    unit: &mut SymbolUnit,
    context: &Context,
    close: bool,
) -> ConvertResult<()> {
    let raw = require(record, &record.fields_nonempty(), 0)?;
    let mut points = parse_point_pairs(record, raw, context)?;
    if points.is_empty() {
        return Err(ConvertError::parse(record.tag, "no points in record"));
    }
    if close {
        points.push(points[0]);
    }
    unit.push(SymbolPrimitive::Polyline {
        points,
        filled: close,
    });
    Ok(())
}

fn decode_polygon(
    record: &ShapeRecord<'_>,
    unit: &mut SymbolUnit,
    context: &Context,
) -> ConvertResult<()> {
    decode_polyline(record, unit, context, true)
}

/// Path-shaped polygon (triangles and similar): strips the SVG command
/// letters and treats the remaining coordinates as a closed polygon.
fn decode_path_polygon(
    record: &ShapeRecord<'_>,
    unit: &mut SymbolUnit,
    context: &Context,
) -> ConvertResult<()> {
    let raw = require(record, &record.fields_nonempty(), 0)?;
    let cleaned: String = raw
        .chars()
        .map(|c| if matches!(c, 'M' | 'L' | 'Z' | 'C') { ' ' } else { c })
        .collect();
    let mut points = parse_point_pairs(record, &cleaned, context)?;
    if points.is_empty() {
        return Err(ConvertError::parse(record.tag, "no points in record"));
    }
    points.push(points[0]);
    unit.push(SymbolPrimitive::Polyline {
        points,
        filled: true,
    });
    Ok(())
}

fn decode_arc(
    record: &ShapeRecord<'_>,
    unit: &mut SymbolUnit,
    context: &Context,
) -> ConvertResult<()> {
    let raw = require(record, &record.fields_nonempty(), 0)?;
    let commands = geometry::parse_path(raw)?;
    let [PathCommand::MoveTo(start), PathCommand::Arc {
        rx,
        ry,
        x_rotation,
        large_arc,
        sweep,
        end,
    }] = commands.as_slice()
    else {
        return Err(ConvertError::parse(record.tag, "expected a move followed by one arc"));
    };
    // Solve in raw coordinates so the midpoint lands on the true ellipse,
    // then convert the three anchor points.
    let arc = EllipticalArc::from_endpoints(*start, *end, *rx, *ry, *x_rotation, *large_arc, *sweep)?;
    let mid = arc.midpoint();
    unit.push(SymbolPrimitive::Arc {
        start: context.to_local(start.x, start.y),
        mid: context.to_local(mid.x, mid.y),
        end: context.to_local(end.x, end.y),
    });
    Ok(())
}

/// Arrowheads carry their outline as an SVG path in field 5.
fn decode_arrowhead(
    record: &ShapeRecord<'_>,
    unit: &mut SymbolUnit,
    context: &Context,
) -> ConvertResult<()> {
    let fields = record.fields_nonempty();
    let raw = require(record, &fields, 5)?;
    let cleaned: String = raw
        .chars()
        .map(|c| if matches!(c, 'M' | 'L' | 'Z') { ' ' } else { c })
        .collect();
    let mut points = parse_point_pairs(record, &cleaned, context)?;
    if points.is_empty() {
        // An empty outline is dropped without complaint.
        return Ok(());
    }
    points.push(points[0]);
    unit.push(SymbolPrimitive::Polyline {
        points,
        filled: true,
    });
    Ok(())
}
