//! KiCad symbol document model.
//!
//! A schematic symbol is decoded from its own shape-record payload (one
//! payload per unit for multi-unit parts) and rendered as one named record
//! block for the `.kicad_sym` library container.

pub mod decoders;
pub mod writer;

use crate::geometry::Point;

/// Stroke styles for symbol outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeStyle {
    /// Solid stroke.
    #[default]
    Default,
    /// Dashed stroke.
    Dash,
    /// Dotted stroke.
    Dot,
}

impl StrokeStyle {
    /// Returns the KiCad stroke type keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dash => "dash",
            Self::Dot => "dot",
        }
    }
}

/// Electrical pin types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElectricalType {
    /// No declared direction.
    #[default]
    Unspecified,
    /// Input pin.
    Input,
    /// Output pin.
    Output,
    /// Bidirectional pin.
    Bidirectional,
    /// Power input pin.
    PowerIn,
}

impl ElectricalType {
    /// Maps the EasyEDA electrical-type code.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "1" => Self::Input,
            "2" => Self::Output,
            "3" => Self::Bidirectional,
            "4" => Self::PowerIn,
            _ => Self::Unspecified,
        }
    }

    /// Returns the KiCad pin type keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::Input => "input",
            Self::Output => "output",
            Self::Bidirectional => "bidirectional",
            Self::PowerIn => "power_in",
        }
    }
}

/// Horizontal text justification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    /// Left justified.
    #[default]
    Left,
    /// Right justified.
    Right,
}

impl Justify {
    /// Returns the KiCad justify keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// A decoded symbol drawing primitive, in mm with Y pointing up.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolPrimitive {
    /// A rectangle with background fill.
    Rectangle {
        /// One corner.
        start: Point,
        /// Opposite corner.
        end: Point,
        /// Stroke style.
        style: StrokeStyle,
    },
    /// A circle with background fill.
    Circle {
        /// Center.
        center: Point,
        /// Radius in mm.
        radius: f64,
    },
    /// A pin.
    Pin {
        /// Electrical type.
        electrical: ElectricalType,
        /// Pin number.
        number: String,
        /// Pin name.
        name: String,
        /// Connection point.
        at: Point,
        /// Orientation in degrees (0, 90, 180, 270).
        rotation: u16,
        /// Pin length in mm.
        length: f64,
        /// Name font size in mm.
        name_size: f64,
        /// Number font size in mm.
        number_size: f64,
    },
    /// Free text.
    Text {
        /// Anchor position.
        at: Point,
        /// Rotation in tenths of a degree (symbol text convention).
        rotation: i32,
        /// Text content.
        text: String,
        /// Font size in mm.
        font_size: f64,
        /// Justification.
        justify: Justify,
    },
    /// An open or closed polyline.
    Polyline {
        /// Points in order; closed polylines repeat the first point last.
        points: Vec<Point>,
        /// Whether the shape gets a background fill.
        filled: bool,
    },
    /// An arc given by start, midpoint and end.
    Arc {
        /// Start point.
        start: Point,
        /// Point halfway along the sweep.
        mid: Point,
        /// End point.
        end: Point,
    },
}

/// One symbol unit: a named sub-symbol with its drawing primitives.
#[derive(Debug, Clone, Default)]
pub struct SymbolUnit {
    primitives: Vec<SymbolPrimitive>,
    pin_names_shown: bool,
    pin_numbers_shown: bool,
}

impl SymbolUnit {
    /// Creates an empty unit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a primitive.
    pub fn push(&mut self, primitive: SymbolPrimitive) {
        self.primitives.push(primitive);
    }

    /// Returns the primitives in decode order.
    #[must_use]
    pub fn primitives(&self) -> &[SymbolPrimitive] {
        &self.primitives
    }
}

/// A complete symbol document.
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Symbol name (sanitised component title).
    pub name: String,
    /// Reference designator prefix (e.g. "R", "U").
    pub reference_prefix: String,
    /// Linked footprint as `lib:name`.
    pub footprint: String,
    /// Datasheet link.
    pub datasheet: String,
    /// Keyword string (the vendor part number).
    pub keywords: String,
    /// Extra `(type, value)` properties (Resistance, Capacitance, ...).
    pub value_attributes: Vec<(String, String)>,
    /// Decoded units in order.
    pub units: Vec<SymbolUnit>,
}

impl Symbol {
    /// Creates an empty symbol document.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference_prefix: "U".to_string(),
            footprint: String::new(),
            datasheet: String::new(),
            keywords: String::new(),
            value_attributes: Vec::new(),
            units: Vec::new(),
        }
    }

    /// True when at least one decoded pin asked for visible names.
    #[must_use]
    pub fn pin_names_shown(&self) -> bool {
        self.units.iter().any(|u| u.pin_names_shown)
    }

    /// True when at least one decoded pin asked for visible numbers.
    #[must_use]
    pub fn pin_numbers_shown(&self) -> bool {
        self.units.iter().any(|u| u.pin_numbers_shown)
    }
}
