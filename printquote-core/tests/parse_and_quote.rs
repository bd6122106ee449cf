//! End-to-end tests: STL bytes in, geometry and quotes out.

use approx::assert_relative_eq;
use printquote_core::{
    estimate, parse_stl, Cart, Catalogs, Dimensions, Mesh, ModelError, OrderDraft, PrintParameters,
    ViewportPhase, ViewportState,
};

/// Triangles of an outward-wound cube with one corner at `origin`.
fn cube_triangles(size: f32, origin: [f32; 3]) -> Vec<[[f32; 3]; 3]> {
    let half = size / 2.0;
    Mesh::cube(size)
        .triangles
        .iter()
        .map(|t| {
            let mut tri = [[0.0; 3]; 3];
            for (out, v) in tri.iter_mut().zip(&t.vertices) {
                *out = [
                    v.position.x + half + origin[0],
                    v.position.y + half + origin[1],
                    v.position.z + half + origin[2],
                ];
            }
            tri
        })
        .collect()
}

fn binary_stl(triangles: &[[[f32; 3]; 3]]) -> Vec<u8> {
    let mut data = b"binary test part".to_vec();
    data.resize(80, 0);
    data.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
    for triangle in triangles {
        data.extend_from_slice(&[0u8; 12]);
        for vertex in triangle {
            for c in vertex {
                data.extend_from_slice(&c.to_le_bytes());
            }
        }
        data.extend_from_slice(&0u16.to_le_bytes());
    }
    data
}

fn ascii_stl(triangles: &[[[f32; 3]; 3]]) -> String {
    let mut text = String::from("solid part\n");
    for triangle in triangles {
        text.push_str("  facet normal 0 0 0\n    outer loop\n");
        for v in triangle {
            text.push_str(&format!("      vertex {:e} {:e} {:e}\n", v[0], v[1], v[2]));
        }
        text.push_str("    endloop\n  endfacet\n");
    }
    text.push_str("endsolid part\n");
    text
}

#[test]
fn empty_binary_model_is_degenerate_not_an_error() {
    let model = parse_stl(&binary_stl(&[])).unwrap();
    assert_eq!(model.dimensions(), Dimensions::new(0.0, 0.0, 0.0));
    assert_eq!(model.volume(), 0.0);
    assert!(model.is_empty());
}

#[test]
fn single_flat_triangle() {
    let model = parse_stl(&binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]])).unwrap();
    assert_eq!(model.volume(), 0.0);
    assert_eq!(model.dimensions(), Dimensions::new(1.0, 1.0, 0.0));
}

#[test]
fn binary_cube_volume_and_dimensions() {
    let model = parse_stl(&binary_stl(&cube_triangles(10.0, [5.0, 5.0, 0.0]))).unwrap();
    assert_eq!(model.triangle_count(), 12);
    assert_eq!(model.volume(), 1000.0);
    assert_eq!(model.dimensions(), Dimensions::new(10.0, 10.0, 10.0));
}

#[test]
fn ascii_and_binary_agree() {
    let triangles = cube_triangles(12.5, [-3.0, 40.0, 1.0]);
    let ascii = parse_stl(ascii_stl(&triangles).as_bytes()).unwrap();
    let binary = parse_stl(&binary_stl(&triangles)).unwrap();
    assert_eq!(ascii.summary(), binary.summary());
    assert_relative_eq!(ascii.volume(), 1953.0);
}

#[test]
fn short_buffer_is_truncated() {
    for len in [1usize, 40, 83] {
        let err = parse_stl(&vec![0u8; len]).unwrap_err();
        assert_eq!(
            err,
            ModelError::Truncated {
                expected: 84,
                actual: len
            }
        );
    }
}

#[test]
fn ascii_without_facets_falls_back_to_binary() {
    let err = parse_stl(b"solid nothing here\nendsolid\n").unwrap_err();
    assert!(matches!(err, ModelError::Truncated { .. }));
}

#[test]
fn quote_upload_into_cart() {
    let catalogs = Catalogs::builtin();
    let bytes = binary_stl(&cube_triangles(50.0, [0.0, 0.0, 0.0]));
    let mut draft = OrderDraft::from_upload("Bracket.STL", &bytes).unwrap();
    assert_eq!(draft.estimate(&catalogs).price, 20);

    let mut cart = Cart::new();
    cart.add(draft.freeze(&catalogs));

    let petg = catalogs.materials.get("petg").unwrap();
    draft.params.select_material(petg);
    draft.params.set_quantity(2);
    cart.add(draft.freeze(&catalogs));

    // 10 + 68.2 * 0.25 = 27.05, twice
    assert_eq!(cart.lines()[1].estimate.price, 54);
    assert_eq!(cart.lines()[1].params.color_name, "Clear");
    assert_eq!(cart.lines()[0].material_name, "PLA");
    assert_eq!(cart.total_price(), 74);
    assert_eq!(cart.total_hours(), 5);
}

#[test]
fn estimate_is_deterministic() {
    let catalogs = Catalogs::builtin();
    let model = parse_stl(&binary_stl(&cube_triangles(33.3, [1.0, 2.0, 3.0]))).unwrap();
    let params = PrintParameters {
        scale_percent: 135,
        infill_percent: 65,
        quantity: 4,
        quality_id: "high".to_string(),
        ..PrintParameters::default()
    };
    let a = estimate(model.summary(), &params, &catalogs.materials, &catalogs.qualities);
    let b = estimate(model.summary(), &params, &catalogs.materials, &catalogs.qualities);
    assert_eq!(a, b);
    assert_eq!(a.weight_grams.to_bits(), b.weight_grams.to_bits());
}

#[test]
fn viewport_displays_parsed_model() {
    let model = parse_stl(&binary_stl(&cube_triangles(10.0, [100.0, 0.0, 0.0]))).unwrap();
    let mut viewport = ViewportState::new(640, 480);
    viewport.load(&model);
    assert_eq!(viewport.phase(), ViewportPhase::Loaded);
    let frame = viewport.frame().unwrap();
    assert_eq!(frame.mesh.len(), 12);
}
