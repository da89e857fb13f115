//! KiCad footprint document model.
//!
//! A [`Footprint`] accumulates decoded primitives plus a running bounding
//! box while the dispatcher walks the shape records, then is finalized
//! exactly once: every primitive is translated so the declared origin maps
//! to (0,0) and the silkscreen reference/value placeholders are appended
//! relative to the final bounding box.

pub mod decoders;
pub mod writer;

use crate::geometry::{mil_to_mm, Point};

/// KiCad layer identifiers used by converted footprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layer {
    /// Front copper.
    FCu,
    /// Back copper.
    BCu,
    /// Front silkscreen.
    #[default]
    FSilkS,
    /// Back silkscreen.
    BSilkS,
    /// Front paste.
    FPaste,
    /// Back paste.
    BPaste,
    /// Front solder mask.
    FMask,
    /// Back solder mask.
    BMask,
    /// Board outline.
    EdgeCuts,
    /// Front fabrication.
    FFab,
}

impl Layer {
    /// Maps an EasyEDA layer code to a KiCad layer.
    ///
    /// Codes 100 and 101 are editor-internal overlays that land on the
    /// front silkscreen. Unknown codes return `None`; callers fall back to
    /// `F.SilkS` with a warning.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::FCu),
            "2" => Some(Self::BCu),
            "3" | "100" | "101" => Some(Self::FSilkS),
            "4" => Some(Self::BSilkS),
            "5" => Some(Self::FPaste),
            "6" => Some(Self::BPaste),
            "7" => Some(Self::FMask),
            "8" => Some(Self::BMask),
            "10" => Some(Self::EdgeCuts),
            "12" => Some(Self::FFab),
            _ => None,
        }
    }

    /// Returns the KiCad layer name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FCu => "F.Cu",
            Self::BCu => "B.Cu",
            Self::FSilkS => "F.SilkS",
            Self::BSilkS => "B.SilkS",
            Self::FPaste => "F.Paste",
            Self::BPaste => "B.Paste",
            Self::FMask => "F.Mask",
            Self::BMask => "B.Mask",
            Self::EdgeCuts => "Edge.Cuts",
            Self::FFab => "F.Fab",
        }
    }
}

/// The layer set a pad connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadLayers {
    /// Front SMD pad: `F.Cu F.Paste F.Mask`.
    SmdTop,
    /// Back SMD pad: `B.Cu B.Paste B.Mask`.
    SmdBottom,
    /// Plated through-hole: `*.Cu *.Mask`.
    ThroughHole,
    /// Non-plated hole: `*.Cu *.Mask`.
    NonPlated,
}

impl PadLayers {
    /// Returns the KiCad layer list for this pad class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SmdTop => "F.Cu F.Paste F.Mask",
            Self::SmdBottom => "B.Cu B.Paste B.Mask",
            Self::ThroughHole | Self::NonPlated => "*.Cu *.Mask",
        }
    }
}

/// Copper pad shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadShape {
    /// Oval/oblong pad.
    Oval,
    /// Rectangular pad.
    Rect,
    /// Circular pad.
    Circle,
    /// Custom pad: an anchor with a polygon outline.
    Custom,
}

impl PadShape {
    /// Returns the KiCad shape keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Oval => "oval",
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Custom => "custom",
        }
    }
}

/// Drill geometry for through-hole pads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Drill {
    /// Round drill with the given diameter.
    Round(f64),
    /// Oblong drill with the given width and height.
    Oblong(f64, f64),
}

/// Whether a pad mounts on the surface or through the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadKind {
    /// Surface-mount pad.
    Smd,
    /// Plated through-hole pad.
    ThroughHole,
}

/// A decoded pad in target (mm) coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Pad {
    /// Pad number/designator.
    pub number: String,
    /// Surface-mount or through-hole.
    pub kind: PadKind,
    /// Copper shape.
    pub shape: PadShape,
    /// Pad center.
    pub at: Point,
    /// Pad size (width, height) in mm.
    pub size: (f64, f64),
    /// Rotation in degrees.
    pub rotation: f64,
    /// Drill geometry. SMD pads carry a nominal round drill of 1.
    pub drill: Drill,
    /// Layer set.
    pub layers: PadLayers,
    /// Custom outline points relative to the pad center (Custom shape only).
    pub outline: Vec<Point>,
}

/// A straight line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// Start point in mm.
    pub start: Point,
    /// End point in mm.
    pub end: Point,
    /// Stroke width in mm.
    pub width: f64,
    /// Target layer.
    pub layer: Layer,
}

/// An arc in center form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    /// Arc center in mm.
    pub center: Point,
    /// Arc start point in mm.
    pub start: Point,
    /// Swept angle in degrees, positive clockwise in board coordinates.
    pub angle: f64,
    /// Stroke width in mm.
    pub width: f64,
    /// Target layer.
    pub layer: Layer,
}

/// A circle outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center in mm.
    pub center: Point,
    /// Radius in mm.
    pub radius: f64,
    /// Stroke width in mm.
    pub width: f64,
    /// Target layer.
    pub layer: Layer,
}

/// A polygon outline or filled region.
///
/// Zero stroke width renders as a filled region; nonzero width as an
/// outlined shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Polygon points in mm.
    pub points: Vec<Point>,
    /// Stroke width in mm (0 = filled).
    pub width: f64,
    /// Target layer.
    pub layer: Layer,
}

/// Text kinds rendered into a footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// The reference designator placeholder.
    Reference,
    /// The value label.
    Value,
    /// Free user text.
    User,
}

impl TextKind {
    /// Returns the KiCad `fp_text` kind keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Value => "value",
            Self::User => "user",
        }
    }
}

/// A text item.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    /// Text kind.
    pub kind: TextKind,
    /// Anchor position in mm.
    pub at: Point,
    /// Text content.
    pub text: String,
    /// Target layer.
    pub layer: Layer,
}

/// A non-plated hole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hole {
    /// Hole center in mm.
    pub at: Point,
    /// Hole diameter in mm.
    pub diameter: f64,
}

/// A 3-D model reference attached to the footprint.
///
/// Offsets are in the KiCad model coordinate space (raw EasyEDA units
/// divided by 100), already relative to the document origin, so
/// finalization must not translate them again.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReference {
    /// Path to the model file as written into the footprint.
    pub path: String,
    /// Offset (x, y, z).
    pub at: (f64, f64, f64),
    /// Rotation (x, y, z) in degrees.
    pub rotate: (f64, f64, f64),
}

/// A decoded footprint primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Line segment.
    Line(Line),
    /// Pad.
    Pad(Pad),
    /// Arc.
    Arc(Arc),
    /// Circle.
    Circle(Circle),
    /// Polygon.
    Polygon(Polygon),
    /// Text.
    Text(Text),
    /// Non-plated hole.
    Hole(Hole),
    /// 3-D model reference.
    Model(ModelReference),
}

impl Primitive {
    /// Translates the primitive by `(dx, dy)` millimetres.
    ///
    /// Model references live in their own coordinate space and are left
    /// untouched.
    fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Self::Line(line) => {
                line.start = line.start.translated(dx, dy);
                line.end = line.end.translated(dx, dy);
            }
            Self::Pad(pad) => pad.at = pad.at.translated(dx, dy),
            Self::Arc(arc) => {
                arc.center = arc.center.translated(dx, dy);
                arc.start = arc.start.translated(dx, dy);
            }
            Self::Circle(circle) => circle.center = circle.center.translated(dx, dy),
            Self::Polygon(polygon) => {
                for point in &mut polygon.points {
                    *point = point.translated(dx, dy);
                }
            }
            Self::Text(text) => text.at = text.at.translated(dx, dy),
            Self::Hole(hole) => hole.at = hole.at.translated(dx, dy),
            Self::Model(_) => {}
        }
    }

    /// Visits every absolute X/Y position the primitive carries.
    fn for_each_position(&self, mut visit: impl FnMut(Point)) {
        match self {
            Self::Line(line) => {
                visit(line.start);
                visit(line.end);
            }
            Self::Pad(pad) => visit(pad.at),
            Self::Arc(arc) => {
                visit(arc.start);
                visit(arc.center);
            }
            Self::Circle(circle) => visit(circle.center),
            Self::Polygon(polygon) => {
                for point in &polygon.points {
                    visit(*point);
                }
            }
            Self::Text(text) => visit(text.at),
            Self::Hole(hole) => visit(hole.at),
            Self::Model(_) => {}
        }
    }
}

/// Mount-type classification derived from the decoded pads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MountType {
    /// No through-hole pad present.
    #[default]
    Smd,
    /// At least one plated through-hole pad present.
    ThroughHole,
}

impl MountType {
    /// Returns the KiCad `attr` keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Smd => "smd",
            Self::ThroughHole => "through_hole",
        }
    }
}

/// Sentinel magnitude for the inverted bounding-box range.
const BBOX_SENTINEL: f64 = 10_000.0;

/// An axis-aligned bounding box, widened point by point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Smallest X seen.
    pub min_x: f64,
    /// Smallest Y seen.
    pub min_y: f64,
    /// Largest X seen.
    pub max_x: f64,
    /// Largest Y seen.
    pub max_y: f64,
}

impl Default for BoundingBox {
    /// An inverted range that any real point will collapse.
    fn default() -> Self {
        Self {
            min_x: BBOX_SENTINEL,
            min_y: BBOX_SENTINEL,
            max_x: -BBOX_SENTINEL,
            max_y: -BBOX_SENTINEL,
        }
    }
}

impl BoundingBox {
    /// Widens the box to include `point`.
    pub fn widen(&mut self, point: Point) {
        self.min_x = self.min_x.min(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
    }

    /// Translates the box by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.min_x += dx;
        self.min_y += dy;
        self.max_x += dx;
        self.max_y += dy;
    }

    /// Returns the box center.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// A complete footprint document.
#[derive(Debug, Clone)]
pub struct Footprint {
    /// Footprint name.
    pub name: String,
    /// Description written into the footprint.
    pub description: String,
    /// Keyword tags written into the footprint.
    pub tags: String,
    primitives: Vec<Primitive>,
    bbox: BoundingBox,
    origin: Point,
    mount: MountType,
    finalized: bool,
}

impl Footprint {
    /// Creates an empty footprint document.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: format!("{name} footprint"),
            tags: String::new(),
            name,
            primitives: Vec::new(),
            bbox: BoundingBox::default(),
            origin: Point::default(),
            mount: MountType::Smd,
            finalized: false,
        }
    }

    /// Sets the declared document origin in raw EasyEDA units.
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Appends a decoded primitive, widening the bounding box and lifting
    /// the mount type when a through-hole pad arrives.
    pub fn push(&mut self, primitive: Primitive) {
        primitive.for_each_position(|point| self.bbox.widen(point));
        if let Primitive::Pad(pad) = &primitive {
            if pad.kind == PadKind::ThroughHole {
                self.mount = MountType::ThroughHole;
            }
        }
        self.primitives.push(primitive);
    }

    /// Normalizes the document: translates everything so the origin maps to
    /// (0,0) and appends the reference/value placeholder text.
    ///
    /// Must be called exactly once, after all records are decoded.
    pub fn finalize(&mut self) {
        debug_assert!(!self.finalized, "footprint finalized twice");
        self.finalized = true;

        let dx = -mil_to_mm(self.origin.x);
        let dy = -mil_to_mm(self.origin.y);
        for primitive in &mut self.primitives {
            primitive.translate(dx, dy);
        }
        self.bbox.translate(dx, dy);

        let center = self.bbox.center();
        self.primitives.push(Primitive::Text(Text {
            kind: TextKind::Reference,
            at: Point::new(center.x, self.bbox.min_y - 2.0),
            text: "REF**".to_string(),
            layer: Layer::FSilkS,
        }));
        self.primitives.push(Primitive::Text(Text {
            kind: TextKind::User,
            at: center,
            text: "${REFERENCE}".to_string(),
            layer: Layer::FFab,
        }));
        self.primitives.push(Primitive::Text(Text {
            kind: TextKind::Value,
            at: Point::new(center.x, self.bbox.max_y + 2.0),
            text: self.name.clone(),
            layer: Layer::FFab,
        }));
    }

    /// Returns the decoded primitives in order.
    #[must_use]
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Returns the current bounding box.
    #[must_use]
    pub const fn bounding_box(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Returns the derived mount type.
    #[must_use]
    pub const fn mount_type(&self) -> MountType {
        self.mount
    }
}
