use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Error, ErrorKind, Read};
use std::path::Path;
use vesselshot_mesh::{Triangle, TriangleMesh, Vector3};

const HEADER_LEN: usize = 80;
// Normal, three corners and the attribute byte count.
const FACET_LEN: usize = 4 * 3 * 4 + 2;

fn invalid_data(msg: String) -> Error {
    Error::new(ErrorKind::InvalidData, msg)
}

fn read_vector<T: Read>(f: &mut T) -> std::io::Result<Vector3> {
    Ok(Vector3 {
        x: f.read_f32::<LittleEndian>()?,
        y: f.read_f32::<LittleEndian>()?,
        z: f.read_f32::<LittleEndian>()?,
    })
}

fn read_binary<T: Read>(f: &mut T) -> std::io::Result<Vec<Triangle>> {
    // The 80 byte header has no agreed structure; exporters put their name or
    // the word "solid" in it, so it is skipped.
    let mut header = [0u8; HEADER_LEN];
    f.read_exact(&mut header)?;

    let n_triangles = f.read_u32::<LittleEndian>()? as usize;

    let mut data = Vec::<Triangle>::with_capacity(n_triangles);
    for _ in 0..n_triangles {
        // The stored normal is frequently zero or stale after editing. Winding
        // order is authoritative, so the normal is recomputed downstream.
        let _normal = read_vector(f)?;
        data.push(Triangle {
            p0: read_vector(f)?,
            p1: read_vector(f)?,
            p2: read_vector(f)?,
        });
        let _attribute_byte_count = f.read_u16::<LittleEndian>()?;
    }
    Ok(data)
}

fn parse_ascii(text: &str) -> std::io::Result<Vec<Triangle>> {
    let mut triangles = Vec::new();
    let mut corners: Vec<Vector3> = Vec::with_capacity(3);
    for (line_no, line) in text.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("vertex") => {
                let mut coord = || -> std::io::Result<f32> {
                    let token = tokens.next().ok_or_else(|| {
                        invalid_data(format!("line {}: vertex needs 3 coordinates", line_no + 1))
                    })?;
                    token.parse::<f32>().map_err(|e| {
                        invalid_data(format!("line {}: bad coordinate '{}': {}", line_no + 1, token, e))
                    })
                };
                let v = Vector3::new(coord()?, coord()?, coord()?);
                corners.push(v);
            }
            Some("endloop") => {
                if corners.len() != 3 {
                    return Err(invalid_data(format!(
                        "line {}: facet has {} vertices, expected 3",
                        line_no + 1,
                        corners.len()
                    )));
                }
                triangles.push(Triangle {
                    p0: corners[0],
                    p1: corners[1],
                    p2: corners[2],
                });
                corners.clear();
            }
            Some("endsolid") => {
                if !corners.is_empty() {
                    return Err(invalid_data(format!(
                        "line {}: solid ends inside an unfinished facet",
                        line_no + 1
                    )));
                }
                return Ok(triangles);
            }
            _ => (),
        }
    }
    Err(invalid_data(format!(
        "ASCII STL ends without endsolid after {} facets",
        triangles.len()
    )))
}

/// Facet count announced right after the binary header, if there is room
/// for one.
fn declared_facets(data: &[u8]) -> Option<usize> {
    let mut count = data.get(HEADER_LEN..HEADER_LEN + 4)?;
    count.read_u32::<LittleEndian>().ok().map(|n| n as usize)
}

/// A binary file's facet count pins down its exact size. Anything else that
/// starts with `solid` is text; the rest is a damaged binary file.
pub fn parse_stl<M: TriangleMesh>(data: &[u8]) -> std::io::Result<M> {
    let declared = declared_facets(data);
    let expected_len = declared
        .and_then(|n| n.checked_mul(FACET_LEN))
        .and_then(|n| n.checked_add(HEADER_LEN + 4));
    let triangles = if expected_len == Some(data.len()) {
        read_binary(&mut std::io::Cursor::new(data))?
    } else if data.trim_ascii_start().starts_with(b"solid") {
        let text = std::str::from_utf8(data)
            .map_err(|e| invalid_data(format!("ASCII STL is not valid UTF-8: {}", e)))?;
        parse_ascii(text)?
    } else {
        return Err(match declared {
            Some(n) => invalid_data(format!(
                "binary STL declares {} facets but holds {} bytes",
                n,
                data.len()
            )),
            None => invalid_data(format!("{} bytes is too short for a binary STL", data.len())),
        });
    };
    Ok(M::from_triangles(triangles))
}

pub fn read_stl<M: TriangleMesh, P: AsRef<Path>>(p: P) -> std::io::Result<M> {
    let data = std::fs::read(p)?;
    parse_stl(&data)
}

pub trait StlReader: Read {
    fn read_stl<M: TriangleMesh>(&mut self) -> std::io::Result<M>;
}

impl<T: Read> StlReader for T {
    fn read_stl<M: TriangleMesh>(&mut self) -> std::io::Result<M> {
        let mut data = Vec::new();
        self.read_to_end(&mut data)?;
        parse_stl(&data)
    }
}
