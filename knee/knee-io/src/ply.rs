//! PLY (Polygon File Format) exchange for bone surfaces.
//!
//! The fitting backend consumes and produces dense vertex lists in PLY.
//! Positions are written as doubles: sub-millimeter fidelity matters for
//! the downstream gap measurements.
//!
//! # Example
//!
//! ```no_run
//! use knee_io::{load_ply, save_ply};
//!
//! let mesh = load_ply("femur.ply").unwrap();
//! save_ply(&mesh, "femur_out.ply").unwrap();
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use knee_types::BoneMesh;
use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
    ScalarType,
};
use ply_rs::writer::Writer;

use crate::error::{IoError, IoResult};

/// Loads a bone mesh from a PLY file.
///
/// Supports ASCII and binary variants; faces are fan-triangulated when a
/// polygon has more than three vertices. The correspondence table is not
/// part of the exchange format and comes back empty.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid PLY, or the
/// vertex element is missing.
pub fn load_ply<P: AsRef<Path>>(path: P) -> IoResult<BoneMesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let header = parser
        .read_header(&mut reader)
        .map_err(|e| IoError::invalid_content(format!("failed to parse PLY header: {e}")))?;
    let payload = parser
        .read_payload(&mut reader, &header)
        .map_err(|e| IoError::invalid_content(format!("failed to read PLY payload: {e}")))?;

    let mut mesh = BoneMesh::new();

    let vertex_elements = payload
        .get("vertex")
        .ok_or_else(|| IoError::invalid_content("PLY file has no vertex element"))?;
    mesh.vertices.reserve(vertex_elements.len());
    for element in vertex_elements {
        let x = get_float_property(element, "x")
            .ok_or_else(|| IoError::invalid_content("vertex missing x property"))?;
        let y = get_float_property(element, "y")
            .ok_or_else(|| IoError::invalid_content("vertex missing y property"))?;
        let z = get_float_property(element, "z")
            .ok_or_else(|| IoError::invalid_content("vertex missing z property"))?;
        mesh.vertices.push(Point3::new(x, y, z));
    }

    if let Some(face_elements) = payload.get("face") {
        mesh.faces.reserve(face_elements.len());
        for element in face_elements {
            let indices = get_index_list(element);
            if indices.len() >= 3 {
                #[allow(clippy::cast_possible_truncation)]
                for i in 1..indices.len() - 1 {
                    mesh.faces
                        .push([indices[0] as u32, indices[i] as u32, indices[i + 1] as u32]);
                }
            }
        }
    }

    Ok(mesh)
}

/// Saves a bone mesh to an ASCII PLY file with double-precision positions.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_ply<P: AsRef<Path>>(mesh: &BoneMesh, path: P) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = Encoding::Ascii;
    ply.header
        .comments
        .push("Generated by knee-io".to_string());

    let mut vertex_def = ElementDef::new("vertex".to_string());
    for name in ["x", "y", "z"] {
        vertex_def.properties.add(PropertyDef::new(
            name.to_string(),
            PropertyType::Scalar(ScalarType::Double),
        ));
    }
    vertex_def.count = mesh.vertices.len();
    ply.header.elements.add(vertex_def);

    let mut face_def = ElementDef::new("face".to_string());
    face_def.properties.add(PropertyDef::new(
        "vertex_indices".to_string(),
        PropertyType::List(ScalarType::UChar, ScalarType::Int),
    ));
    face_def.count = mesh.faces.len();
    ply.header.elements.add(face_def);

    let mut vertex_elements = Vec::with_capacity(mesh.vertices.len());
    for v in &mesh.vertices {
        let mut element = DefaultElement::new();
        element.insert("x".to_string(), Property::Double(v.x));
        element.insert("y".to_string(), Property::Double(v.y));
        element.insert("z".to_string(), Property::Double(v.z));
        vertex_elements.push(element);
    }
    ply.payload.insert("vertex".to_string(), vertex_elements);

    let mut face_elements = Vec::with_capacity(mesh.faces.len());
    for &[i0, i1, i2] in &mesh.faces {
        let mut element = DefaultElement::new();
        #[allow(clippy::cast_possible_wrap)]
        let indices = vec![i0 as i32, i1 as i32, i2 as i32];
        element.insert("vertex_indices".to_string(), Property::ListInt(indices));
        face_elements.push(element);
    }
    ply.payload.insert("face".to_string(), face_elements);

    let ply_writer = Writer::new();
    ply_writer
        .write_ply(&mut writer, &mut ply)
        .map_err(|e| IoError::invalid_content(format!("failed to write PLY: {e}")))?;

    Ok(())
}

/// Extracts a scalar coordinate from a PLY vertex element.
fn get_float_property(element: &DefaultElement, key: &str) -> Option<f64> {
    match element.get(key)? {
        Property::Float(v) => Some(f64::from(*v)),
        Property::Double(v) => Some(*v),
        _ => None,
    }
}

/// Extracts the vertex index list from a PLY face element.
fn get_index_list(element: &DefaultElement) -> Vec<usize> {
    for key in &["vertex_indices", "vertex_index"] {
        if let Some(prop) = element.get(*key) {
            return match prop {
                Property::ListInt(v) =>
                {
                    #[allow(clippy::cast_sign_loss)]
                    v.iter().map(|&i| i as usize).collect()
                }
                Property::ListUInt(v) => v.iter().map(|&i| i as usize).collect(),
                Property::ListUChar(v) => v.iter().map(|&i| i as usize).collect(),
                Property::ListUShort(v) => v.iter().map(|&i| i as usize).collect(),
                _ => continue,
            };
        }
    }
    Vec::new()
}
