//! VRML 2.0 scene rendering.

use std::fmt::Write as _;

use crate::model3d::Scene;

/// File header every generated `.wrl` starts with.
pub const WRL_HEADER: &str = "#VRML V2.0 utf8\n#created by jlc2kicad from the JLCPCB component library\n";

fn fmt(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    let mut text = format!("{rounded:.4}");
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

fn fmt_triplet(triplet: [f64; 3]) -> String {
    format!("{} {} {}", fmt(triplet[0]), fmt(triplet[1]), fmt(triplet[2]))
}

/// Renders a scene as VRML text.
#[must_use]
pub fn render(scene: &Scene) -> String {
    let mut out = String::from(WRL_HEADER);
    for shape in &scene.shapes {
        let _ = writeln!(
            out,
            "Shape {{\n  appearance Appearance {{\n    material Material {{\n      \
             diffuseColor {}\n      specularColor {}\n      ambientIntensity 0.2\n      \
             transparency {}\n      shininess 0.5\n    }}\n  }}",
            fmt_triplet(shape.material.diffuse),
            fmt_triplet(shape.material.specular),
            fmt(shape.material.transparency),
        );
        out.push_str("  geometry IndexedFaceSet {\n    ccw TRUE\n    solid FALSE\n");
        out.push_str("    coord DEF co Coordinate {\n      point [\n        ");
        let points: Vec<String> = shape
            .points
            .iter()
            .map(|p| format!("{} {} {}", fmt(p.x), fmt(p.y), fmt(p.z)))
            .collect();
        out.push_str(&points.join(", "));
        out.push_str("\n      ]\n    }\n    coordIndex [\n      ");
        for face in &shape.faces {
            for index in face {
                let _ = write!(out, "{index},");
            }
            out.push_str("-1,");
        }
        out.push_str("\n    ]\n  }\n}\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model3d::{Material, Point3, ShapeGroup};

    fn sample_scene() -> Scene {
        Scene {
            shapes: vec![ShapeGroup {
                material: Material {
                    ambient: [0.0; 3],
                    diffuse: [0.8, 0.1, 0.1],
                    specular: [0.5, 0.5, 0.5],
                    transparency: 0.0,
                },
                points: vec![
                    Point3 { x: 0.0, y: 0.0, z: 0.0 },
                    Point3 { x: 1.0, y: 0.0, z: 0.0 },
                    Point3 { x: 0.0, y: 1.0, z: 0.0 },
                ],
                faces: vec![vec![0, 1, 2]],
            }],
        }
    }

    #[test]
    fn header_declares_vrml2() {
        let text = render(&sample_scene());
        assert!(text.starts_with("#VRML V2.0 utf8\n"));
    }

    #[test]
    fn faces_terminate_with_minus_one() {
        let text = render(&sample_scene());
        assert!(text.contains("0,1,2,-1,"));
    }

    #[test]
    fn material_block_carries_colors() {
        let text = render(&sample_scene());
        assert!(text.contains("diffuseColor 0.8 0.1 0.1"));
        assert!(text.contains("specularColor 0.5 0.5 0.5"));
        assert!(text.contains("ambientIntensity 0.2"));
        assert!(text.contains("shininess 0.5"));
    }

    #[test]
    fn empty_scene_is_header_only() {
        let text = render(&Scene::default());
        assert_eq!(text, WRL_HEADER);
    }
}
