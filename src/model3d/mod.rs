//! 3-D model transcoding.
//!
//! EasyEDA serves component models as an OBJ-like text: `newmtl` material
//! blocks followed by a global vertex list and `usemtl` face sections.
//! The parser turns that into a typed scene; the writer renders the scene
//! as a VRML 2.0 (`.wrl`) file KiCad can display.

pub mod parser;
pub mod writer;

/// A vertex in KiCad model space (0.1 inch units).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

/// Surface material carried by a face section.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Material {
    /// Ambient reflectivity (unused by the writer, kept for fidelity).
    pub ambient: [f64; 3],
    /// Diffuse color.
    pub diffuse: [f64; 3],
    /// Specular color.
    pub specular: [f64; 3],
    /// Dissolve factor, written as VRML transparency.
    pub transparency: f64,
}

/// One face section: a material, its local vertex pool and faces.
///
/// Faces index into `points` (0-based, local to the group).
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeGroup {
    /// Material applied to every face of the group.
    pub material: Material,
    /// Vertices referenced by the group, in first-use order.
    pub points: Vec<Point3>,
    /// Faces as local point indices.
    pub faces: Vec<Vec<usize>>,
}

/// A parsed model scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    /// Face sections in source order.
    pub shapes: Vec<ShapeGroup>,
}
