//! STL parser for binary and ASCII formats
//!
//! ```text
//! binary: UINT8[80] header | UINT32 triangle count | count x 50-byte records
//!         record = REAL32[3] normal | REAL32[3] x 3 vertices | UINT16 attribute
//! ascii:  solid ... vertex x y z ... endsolid
//! ```

use nalgebra::Point3;
use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take},
    character::complete::{char, digit0, digit1, multispace1, one_of},
    combinator::{map_res, opt, recognize},
    multi::count,
    number::complete::{le_f32, le_u32},
    sequence::{preceded, tuple},
    IResult,
};
use tracing::{debug, info};

use crate::error::{ModelError, ModelResult};
use crate::model::ParsedModel;

/// Bytes of free-form header before the triangle count.
pub const HEADER_LEN: usize = 80;

/// Header plus the little-endian triangle count.
pub const PREAMBLE_LEN: usize = HEADER_LEN + 4;

/// Normal, three vertices and the attribute word.
pub const RECORD_LEN: usize = 50;

/// Encoding chosen by [`detect_encoding`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    Binary,
}

/// Pick the encoding of an STL buffer.
///
/// ASCII requires the first 80 bytes to be 7-bit, the header to start with
/// `solid` (any case) and the raw buffer to contain both `facet` and
/// `vertex`. Binary files whose header happens to read "solid" fail the
/// last check and fall through to the binary reader.
pub fn detect_encoding(data: &[u8]) -> Encoding {
    let header = &data[..data.len().min(HEADER_LEN)];
    if !header.is_ascii() {
        return Encoding::Binary;
    }

    let solid = b"solid";
    if header.len() < solid.len() || !header[..solid.len()].eq_ignore_ascii_case(solid) {
        return Encoding::Binary;
    }

    if contains_bytes(data, b"facet") && contains_bytes(data, b"vertex") {
        Encoding::Ascii
    } else {
        debug!("header starts with \"solid\" but body has no facets, reading as binary");
        Encoding::Binary
    }
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> ModelResult<ParsedModel> {
    if data.is_empty() {
        return Err(ModelError::unsupported("empty buffer"));
    }

    let encoding = detect_encoding(data);
    debug!(?encoding, bytes = data.len(), "detected STL encoding");

    let points = match encoding {
        Encoding::Ascii => parse_ascii_stl(&String::from_utf8_lossy(data))?,
        Encoding::Binary => parse_binary_stl(data)?,
    };

    let model = ParsedModel::from_points(points);
    info!(
        triangles = model.triangle_count(),
        volume = model.volume(),
        x = model.dimensions().x,
        y = model.dimensions().y,
        z = model.dimensions().z,
        "parsed STL model"
    );
    Ok(model)
}

/// Parse a binary STL file into a flat vertex list
///
/// The whole record block is length-checked before any record is read, so a
/// short buffer fails with [`ModelError::Truncated`] and nothing is returned.
pub fn parse_binary_stl(data: &[u8]) -> ModelResult<Vec<Point3<f64>>> {
    if data.len() < PREAMBLE_LEN {
        return Err(ModelError::Truncated {
            expected: PREAMBLE_LEN as u64,
            actual: data.len(),
        });
    }

    let (_, triangle_count) = preamble(data).map_err(|_| truncated(PREAMBLE_LEN as u64, data))?;
    let expected = PREAMBLE_LEN as u64 + RECORD_LEN as u64 * u64::from(triangle_count);
    if expected > data.len() as u64 {
        return Err(truncated(expected, data));
    }

    let body = &data[PREAMBLE_LEN..];
    let (_, records) = count(record, triangle_count as usize)(body)
        .map_err(|_: nom::Err<nom::error::Error<&[u8]>>| truncated(expected, data))?;

    Ok(records.into_iter().flatten().collect())
}

fn truncated(expected: u64, data: &[u8]) -> ModelError {
    ModelError::Truncated {
        expected,
        actual: data.len(),
    }
}

fn preamble(input: &[u8]) -> IResult<&[u8], u32> {
    preceded(take(HEADER_LEN), le_u32)(input)
}

fn record(input: &[u8]) -> IResult<&[u8], [Point3<f64>; 3]> {
    // Skip normal (12 bytes)
    let (input, _) = take(12usize)(input)?;
    let (input, v1) = binary_vertex(input)?;
    let (input, v2) = binary_vertex(input)?;
    let (input, v3) = binary_vertex(input)?;
    // Skip attribute byte count (2 bytes)
    let (input, _) = take(2usize)(input)?;
    Ok((input, [v1, v2, v3]))
}

fn binary_vertex(input: &[u8]) -> IResult<&[u8], Point3<f64>> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, Point3::new(f64::from(x), f64::from(y), f64::from(z))))
}

/// Parse an ASCII STL file into a flat vertex list
///
/// Only `vertex x y z` lines are harvested, in order; facet and loop
/// nesting is not checked. A vertex count that does not split into whole
/// triangles is rejected.
pub fn parse_ascii_stl(input: &str) -> ModelResult<Vec<Point3<f64>>> {
    let mut points = Vec::new();
    let mut rest = input;

    while let Some(start) = rest.find(|c: char| c == 'v' || c == 'V') {
        rest = &rest[start..];
        match vertex_line(rest) {
            Ok((next, point)) => {
                points.push(point);
                rest = next;
            }
            // 'v' and 'V' are one byte wide
            Err(_) => rest = &rest[1..],
        }
    }

    if points.len() % 3 != 0 {
        return Err(ModelError::unsupported(format!(
            "ASCII STL has {} vertices, not a whole number of triangles",
            points.len()
        )));
    }

    debug!(vertices = points.len(), "harvested ASCII STL vertices");
    Ok(points)
}

fn vertex_line(input: &str) -> IResult<&str, Point3<f64>> {
    let (input, _) = tag_no_case("vertex")(input)?;
    let (input, x) = preceded(multispace1, coordinate)(input)?;
    let (input, y) = preceded(multispace1, coordinate)(input)?;
    let (input, z) = preceded(multispace1, coordinate)(input)?;
    Ok((input, Point3::new(x, y, z)))
}

/// Signed decimal with optional fraction and exponent: `-1`, `.5`, `+2.5e-3`.
fn coordinate(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            alt((recognize(tuple((digit0, char('.'), digit1))), digit1)),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        str::parse::<f64>,
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn binary_stl(header: &[u8], triangles: &[[[f32; 3]; 3]]) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data[..header.len()].copy_from_slice(header);
        data.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
        for triangle in triangles {
            data.extend_from_slice(&[0u8; 12]);
            for vertex in triangle {
                for c in vertex {
                    data.extend_from_slice(&c.to_le_bytes());
                }
            }
            data.extend_from_slice(&[0u8; 2]);
        }
        data
    }

    #[test]
    fn test_detection_scans_raw_bytes() {
        let mut data = b"SOLID t\n facet normal 0 0 1\n".to_vec();
        data.extend_from_slice(&[0xff, 0xfe]);
        data.extend_from_slice(b"\n vertex 0 0 0\n");
        assert_eq!(detect_encoding(&data), Encoding::Ascii);

        assert_eq!(detect_encoding(b"soli"), Encoding::Binary);
        assert_eq!(detect_encoding(b"solid only\n facets"), Encoding::Binary);
    }

    #[test]
    fn test_parse_binary_header() {
        let mut data = vec![0u8; 84];
        // Set triangle count to 0
        data[80..84].copy_from_slice(&0u32.to_le_bytes());

        let points = parse_binary_stl(&data).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_binary_single_triangle() {
        let data = binary_stl(b"", &[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
        assert_eq!(data.len(), PREAMBLE_LEN + RECORD_LEN);
        let points = parse_binary_stl(&data).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_binary_reads_fractional_coordinates() {
        let data = binary_stl(b"", &[[[1.5, -2.25, 3.0], [0.0; 3], [0.0; 3]]]);
        let points = parse_binary_stl(&data).unwrap();
        assert_relative_eq!(points[0].y, -2.25);
    }

    #[test]
    fn test_binary_short_preamble_is_truncated() {
        let err = parse_binary_stl(&[0u8; 40]).unwrap_err();
        assert_eq!(
            err,
            ModelError::Truncated {
                expected: 84,
                actual: 40
            }
        );
    }

    #[test]
    fn test_binary_count_past_end_is_truncated() {
        let mut data = binary_stl(b"", &[[[0.0; 3]; 3]]);
        data[80..84].copy_from_slice(&2u32.to_le_bytes());
        let err = parse_binary_stl(&data).unwrap_err();
        assert_eq!(
            err,
            ModelError::Truncated {
                expected: 184,
                actual: 134
            }
        );
    }

    #[test]
    fn test_binary_huge_count_does_not_overflow() {
        let mut data = vec![0u8; 84];
        data[80..84].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            parse_binary_stl(&data),
            Err(ModelError::Truncated { .. })
        ));
    }

    #[test]
    fn test_binary_trailing_bytes_ignored() {
        let mut data = binary_stl(b"", &[[[0.0; 3]; 3]]);
        data.extend_from_slice(b"trailing");
        assert_eq!(parse_binary_stl(&data).unwrap().len(), 3);
    }

    #[test]
    fn test_ascii_vertices_in_order() {
        let text = "solid t\n facet normal 0 0 1\n  outer loop\n   vertex 0 0 0\n   vertex 1.5 0 0\n   vertex 0 -2e1 +3.25E-1\n  endloop\n endfacet\nendsolid t\n";
        let points = parse_ascii_stl(text).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], Point3::new(1.5, 0.0, 0.0));
        assert_relative_eq!(points[2].y, -20.0);
        assert_relative_eq!(points[2].z, 0.325);
    }

    #[test]
    fn test_ascii_keyword_case_and_leading_dot() {
        let points = parse_ascii_stl("VERTEX .5 -.5 1\nVertex\t1\t2\t3\nvertex 4 5 6").unwrap();
        assert_eq!(points[0], Point3::new(0.5, -0.5, 1.0));
        assert_eq!(points[1], Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_ascii_skips_incomplete_vertex_lines() {
        let points = parse_ascii_stl("vertex 1 2\nvertices\nvertex 1 2 3\nvertex 4 5 6\nvertex 7 8 9").unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_ascii_partial_triangle_rejected() {
        let err = parse_ascii_stl("vertex 1 2 3\nvertex 4 5 6").unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_detects_ascii() {
        let text = b"solid cube\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\n";
        assert_eq!(detect_encoding(text), Encoding::Ascii);
        assert_eq!(detect_encoding(b"SOLID x facet vertex"), Encoding::Ascii);
    }

    #[test]
    fn test_binary_with_solid_header_stays_binary() {
        let data = binary_stl(b"solid exported by CAD", &[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
        assert_eq!(detect_encoding(&data), Encoding::Binary);
        let model = parse_stl(&data).unwrap();
        assert_eq!(model.triangle_count(), 1);
    }

    #[test]
    fn test_high_bytes_in_header_force_binary() {
        let mut data = b"solid facet vertex".to_vec();
        data.push(0xff);
        assert_eq!(detect_encoding(&data), Encoding::Binary);
    }

    #[test]
    fn test_empty_buffer_unsupported() {
        assert!(matches!(
            parse_stl(&[]),
            Err(ModelError::UnsupportedFormat { .. })
        ));
    }
}
