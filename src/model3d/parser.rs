//! OBJ-like model text parser.

use std::collections::HashMap;

use tracing::debug;

use crate::easyeda::{ConvertError, ConvertResult};
use crate::model3d::{Material, Point3, Scene, ShapeGroup};

/// Scale divisor from source units to KiCad model units.
const MODEL_SCALE: f64 = 2.54;

fn parse_float(tag: &str, raw: &str) -> ConvertResult<f64> {
    raw.parse::<f64>()
        .map_err(|_| ConvertError::parse(tag, format!("invalid number '{raw}'")))
}

fn parse_triplet(tag: &str, tokens: &[&str]) -> ConvertResult<[f64; 3]> {
    if tokens.len() < 3 {
        return Err(ConvertError::parse(
            tag,
            format!("expected 3 components, got {}", tokens.len()),
        ));
    }
    Ok([
        parse_float(tag, tokens[0])?,
        parse_float(tag, tokens[1])?,
        parse_float(tag, tokens[2])?,
    ])
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Parses the material table (`newmtl` .. `endmtl` blocks).
fn parse_materials(text: &str) -> ConvertResult<HashMap<String, Material>> {
    let mut materials = HashMap::new();
    let mut current: Option<(String, Material)> = None;

    for line in text.lines() {
        let line = line.trim();
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("newmtl") => {
                let id = tokens.next().ok_or_else(|| {
                    ConvertError::parse("newmtl", "material block without a name")
                })?;
                current = Some((id.to_string(), Material::default()));
            }
            Some("endmtl") => {
                if let Some((id, material)) = current.take() {
                    materials.insert(id, material);
                }
            }
            Some(key @ ("Ka" | "Kd" | "Ks")) => {
                if let Some((_, material)) = current.as_mut() {
                    let triplet = parse_triplet(key, &tokens.collect::<Vec<_>>())?;
                    match key {
                        "Ka" => material.ambient = triplet,
                        "Kd" => material.diffuse = triplet,
                        _ => material.specular = triplet,
                    }
                }
            }
            Some("d") => {
                if let Some((_, material)) = current.as_mut() {
                    let raw = tokens
                        .next()
                        .ok_or_else(|| ConvertError::parse("d", "missing dissolve value"))?;
                    material.transparency = parse_float("d", raw)?;
                }
            }
            _ => {}
        }
    }
    Ok(materials)
}

/// Parses the global vertex list, scaled and rounded to 4 decimals.
fn parse_vertices(text: &str) -> ConvertResult<Vec<Point3>> {
    let mut vertices = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("v ") {
            let triplet = parse_triplet("v", &rest.split_whitespace().collect::<Vec<_>>())?;
            vertices.push(Point3 {
                x: round4(triplet[0] / MODEL_SCALE),
                y: round4(triplet[1] / MODEL_SCALE),
                z: round4(triplet[2] / MODEL_SCALE),
            });
        }
    }
    Ok(vertices)
}

/// A face vertex token is `N` or `N//M`; only the vertex index matters.
fn face_index(token: &str) -> ConvertResult<usize> {
    let vertex = token.split("//").next().unwrap_or(token);
    vertex
        .parse::<usize>()
        .map_err(|_| ConvertError::parse("f", format!("invalid face index '{token}'")))
}

/// Parses a complete model text into a scene.
///
/// Each `usemtl` section re-indexes the vertices it touches into a local
/// 0-based pool ordered by first use. The last point of every pool is
/// duplicated once, matching the layout established model viewers expect
/// from this exporter lineage.
///
/// # Errors
///
/// Returns [`ConvertError::Parse`] on malformed numbers, a face section
/// referencing an unknown material, or an out-of-range vertex index.
pub fn parse(text: &str) -> ConvertResult<Scene> {
    let materials = parse_materials(text)?;
    let vertices = parse_vertices(text)?;
    debug!(
        materials = materials.len(),
        vertices = vertices.len(),
        "parsed model preamble"
    );

    let mut scene = Scene::default();
    for section in text.split("usemtl").skip(1) {
        let mut lines = section.lines();
        let material_id = lines.next().unwrap_or_default().trim();
        let material = *materials.get(material_id).ok_or_else(|| {
            ConvertError::parse("usemtl", format!("unknown material '{material_id}'"))
        })?;

        let mut local: HashMap<usize, usize> = HashMap::new();
        let mut points: Vec<Point3> = Vec::new();
        let mut faces: Vec<Vec<usize>> = Vec::new();

        for line in lines {
            let line = line.trim();
            let Some(rest) = line.strip_prefix("f ") else {
                continue;
            };
            let mut face = Vec::new();
            for token in rest.split_whitespace() {
                let global = face_index(token)?;
                let slot = match local.get(&global) {
                    Some(slot) => *slot,
                    None => {
                        let vertex = *vertices.get(global - 1).ok_or_else(|| {
                            ConvertError::parse(
                                "f",
                                format!("face references missing vertex {global}"),
                            )
                        })?;
                        let slot = points.len();
                        local.insert(global, slot);
                        points.push(vertex);
                        slot
                    }
                };
                face.push(slot);
            }
            faces.push(face);
        }

        if let Some(last) = points.last().copied() {
            points.insert(points.len() - 1, last);
        }

        scene.shapes.push(ShapeGroup {
            material,
            points,
            faces,
        });
    }
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
newmtl mat1
Ka 0 0 0
Kd 0.8 0.1 0.1
Ks 0.5 0.5 0.5
d 1
endmtl
v 2.54 0 0
v 0 2.54 0
v 0 0 2.54
v 2.54 2.54 2.54
usemtl mat1
f 1//1 2//2 3//3
f 3//3 2//2 4//4
";

    #[test]
    fn vertices_scale_and_round() {
        let scene = parse(SAMPLE).unwrap();
        let shape = &scene.shapes[0];
        assert_eq!(shape.points[0], Point3 { x: 1.0, y: 0.0, z: 0.0 });
        assert_eq!(shape.points[1], Point3 { x: 0.0, y: 1.0, z: 0.0 });
    }

    #[test]
    fn faces_reindex_by_first_use() {
        let scene = parse(SAMPLE).unwrap();
        let shape = &scene.shapes[0];
        assert_eq!(shape.faces, vec![vec![0, 1, 2], vec![2, 1, 3]]);
    }

    #[test]
    fn last_point_is_duplicated() {
        let scene = parse(SAMPLE).unwrap();
        let points = &scene.shapes[0].points;
        // 4 distinct vertices plus the duplicated final one.
        assert_eq!(points.len(), 5);
        assert_eq!(points[3], points[4]);
    }

    #[test]
    fn material_colors_are_read() {
        let scene = parse(SAMPLE).unwrap();
        let material = scene.shapes[0].material;
        assert_eq!(material.diffuse, [0.8, 0.1, 0.1]);
        assert_eq!(material.specular, [0.5, 0.5, 0.5]);
        assert!((material.transparency - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unknown_material_is_an_error() {
        let text = "v 0 0 0\nusemtl ghost\nf 1 1 1\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, ConvertError::Parse { .. }));
    }

    #[test]
    fn out_of_range_vertex_is_an_error() {
        let text = "newmtl m\nendmtl\nv 0 0 0\nusemtl m\nf 1 2 3\n";
        assert!(parse(text).is_err());
    }
}
