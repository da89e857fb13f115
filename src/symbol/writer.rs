//! Symbol s-expression rendering.
//!
//! Produces one `(symbol "NAME" ...)` record block, indented for
//! insertion into a `.kicad_sym` library container.

use std::fmt::Write as _;

use crate::symbol::{Symbol, SymbolPrimitive};

/// Formats a coordinate, trimming trailing zeros.
fn fmt(value: f64) -> String {
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

fn push_property(
    out: &mut String,
    key: &str,
    value: &str,
    id: usize,
    at: (f64, f64),
    italic: bool,
    hide: bool,
) {
    let italic = if italic { " italic" } else { "" };
    let hide = if hide { " hide" } else { "" };
    let _ = writeln!(
        out,
        "    (property \"{key}\" \"{value}\" (id {id}) (at {} {} 0)",
        fmt(at.0),
        fmt(at.1)
    );
    let _ = writeln!(out, "      (effects (font (size 1.27 1.27){italic}){hide})");
    out.push_str("    )\n");
}

/// Renders a symbol document as one library record block.
///
/// The block is indented two spaces and ends with a newline, matching
/// the layout the library container expects between header and footer.
#[must_use]
pub fn render(symbol: &Symbol) -> String {
    let mut out = String::new();

    let pin_names = if symbol.pin_names_shown() { "" } else { " (pin_names hide)" };
    let pin_numbers = if symbol.pin_numbers_shown() { "" } else { " (pin_numbers hide)" };
    let _ = writeln!(
        out,
        "  (symbol \"{}\"{pin_names}{pin_numbers} (in_bom yes) (on_board yes)",
        symbol.name
    );

    push_property(&mut out, "Reference", &symbol.reference_prefix, 0, (0.0, 1.27), false, false);
    push_property(&mut out, "Value", &symbol.name, 1, (0.0, -2.54), false, false);
    push_property(&mut out, "Footprint", &symbol.footprint, 2, (0.0, -10.16), true, true);
    // The datasheet property carries a justify clause the others lack.
    let _ = writeln!(
        out,
        "    (property \"Datasheet\" \"{}\" (id 3) (at -2.286 0.127 0)",
        symbol.datasheet
    );
    out.push_str("      (effects (font (size 1.27 1.27)) (justify left) hide)\n    )\n");
    push_property(&mut out, "ki_keywords", &symbol.keywords, 4, (0.0, 0.0), false, true);
    push_property(&mut out, "LCSC", &symbol.keywords, 5, (0.0, 0.0), false, true);
    for (index, (key, value)) in symbol.value_attributes.iter().enumerate() {
        push_property(&mut out, key, value, 6 + index, (0.0, 0.0), false, true);
    }

    for (index, unit) in symbol.units.iter().enumerate() {
        let _ = writeln!(out, "    (symbol \"{}_{index}_1\"", symbol.name);
        for primitive in unit.primitives() {
            render_primitive(&mut out, primitive);
        }
        out.push_str("    )\n");
    }

    out.push_str("  )\n");
    out
}

fn render_primitive(out: &mut String, primitive: &SymbolPrimitive) {
    match primitive {
        SymbolPrimitive::Rectangle { start, end, style } => {
            let _ = writeln!(
                out,
                "      (rectangle (start {} {}) (end {} {})\n        \
                 (stroke (width 0) (type {}) (color 0 0 0 0))\n        \
                 (fill (type background))\n      )",
                fmt(start.x),
                fmt(start.y),
                fmt(end.x),
                fmt(end.y),
                style.as_str(),
            );
        }
        SymbolPrimitive::Circle { center, radius } => {
            let _ = writeln!(
                out,
                "      (circle (center {} {}) (radius {})\n        \
                 (stroke (width 0) (type default) (color 0 0 0 0))\n        \
                 (fill (type background))\n      )",
                fmt(center.x),
                fmt(center.y),
                fmt(*radius),
            );
        }
        SymbolPrimitive::Pin {
            electrical,
            number,
            name,
            at,
            rotation,
            length,
            name_size,
            number_size,
        } => {
            let _ = writeln!(
                out,
                "      (pin {} line (at {} {} {rotation}) (length {})\n        \
                 (name \"{name}\" (effects (font (size {} {}))))\n        \
                 (number \"{number}\" (effects (font (size {} {}))))\n      )",
                electrical.as_str(),
                fmt(at.x),
                fmt(at.y),
                fmt(*length),
                fmt(*name_size),
                fmt(*name_size),
                fmt(*number_size),
                fmt(*number_size),
            );
        }
        SymbolPrimitive::Text {
            at,
            rotation,
            text,
            font_size,
            justify,
        } => {
            let _ = writeln!(
                out,
                "      (text \"{text}\" (at {} {} {rotation})\n        \
                 (effects (font (size {} {})) (justify {} bottom))\n      )",
                fmt(at.x),
                fmt(at.y),
                fmt(*font_size),
                fmt(*font_size),
                justify.as_str(),
            );
        }
        SymbolPrimitive::Polyline { points, filled } => {
            out.push_str("      (polyline\n        (pts\n");
            for point in points {
                let _ = writeln!(out, "          (xy {} {})", fmt(point.x), fmt(point.y));
            }
            let fill = if *filled { "background" } else { "none" };
            let _ = writeln!(
                out,
                "        )\n        (stroke (width 0) (type default) (color 0 0 0 0))\n        \
                 (fill (type {fill}))\n      )"
            );
        }
        SymbolPrimitive::Arc { start, mid, end } => {
            let _ = writeln!(
                out,
                "      (arc (start {} {}) (mid {} {}) (end {} {})\n        \
                 (stroke (width 0) (type default) (color 0 0 0 0))\n        \
                 (fill (type none))\n      )",
                fmt(start.x),
                fmt(start.y),
                fmt(mid.x),
                fmt(mid.y),
                fmt(end.x),
                fmt(end.y),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::symbol::{ElectricalType, Justify, StrokeStyle, SymbolUnit};

    fn sample_symbol() -> Symbol {
        let mut symbol = Symbol::new("LM358");
        symbol.reference_prefix = "U".to_string();
        symbol.footprint = "footprint:SOIC-8".to_string();
        symbol.datasheet = "https://example.com/lm358.pdf".to_string();
        symbol.keywords = "C7950".to_string();
        let mut unit = SymbolUnit::new();
        unit.push(SymbolPrimitive::Rectangle {
            start: Point::new(0.0, 0.0),
            end: Point::new(12.7, -10.16),
            style: StrokeStyle::Default,
        });
        unit.push(SymbolPrimitive::Pin {
            electrical: ElectricalType::Input,
            number: "1".to_string(),
            name: "IN+".to_string(),
            at: Point::new(-2.54, -2.54),
            rotation: 0,
            length: 2.54,
            name_size: 1.0,
            number_size: 1.0,
        });
        symbol.units.push(unit);
        symbol
    }

    #[test]
    fn block_shape_is_container_ready() {
        let block = render(&sample_symbol());
        assert!(block.starts_with("  (symbol \"LM358\" (pin_names hide) (pin_numbers hide)"));
        assert!(block.ends_with("  )\n"));
        assert!(block.contains("(symbol \"LM358_0_1\""));
    }

    #[test]
    fn properties_carry_stable_ids() {
        let mut symbol = sample_symbol();
        symbol
            .value_attributes
            .push(("Resistance".to_string(), "10k".to_string()));
        let block = render(&symbol);
        assert!(block.contains("(property \"Reference\" \"U\" (id 0)"));
        assert!(block.contains("(property \"Value\" \"LM358\" (id 1)"));
        assert!(block.contains("(property \"Footprint\" \"footprint:SOIC-8\" (id 2)"));
        assert!(block.contains("(property \"Datasheet\" \"https://example.com/lm358.pdf\" (id 3)"));
        assert!(block.contains("(property \"ki_keywords\" \"C7950\" (id 4)"));
        assert!(block.contains("(property \"LCSC\" \"C7950\" (id 5)"));
        assert!(block.contains("(property \"Resistance\" \"10k\" (id 6)"));
    }

    #[test]
    fn shown_pin_names_drop_the_hide_clause() {
        let mut symbol = sample_symbol();
        symbol.units[0].pin_names_shown = true;
        let block = render(&symbol);
        assert!(!block.contains("(pin_names hide)"));
        assert!(block.contains("(pin_numbers hide)"));
    }

    #[test]
    fn pin_renders_position_and_fonts() {
        let block = render(&sample_symbol());
        assert!(block.contains("(pin input line (at -2.54 -2.54 0) (length 2.54)"));
        assert!(block.contains("(name \"IN+\" (effects (font (size 1 1))))"));
    }

    #[test]
    fn text_rotation_is_emitted_verbatim() {
        let mut symbol = sample_symbol();
        symbol.units[0].push(SymbolPrimitive::Text {
            at: Point::new(1.0, 2.0),
            rotation: 1800,
            text: "note".to_string(),
            font_size: 1.27,
            justify: Justify::Right,
        });
        let block = render(&symbol);
        assert!(block.contains("(text \"note\" (at 1 2 1800)"));
        assert!(block.contains("(justify right bottom)"));
    }
}
