// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::io::Write;
use std::path::Path;

use ndarray::{Array2, ShapeBuilder};

use crate::error::{GatoError, Result};

/// Supported file formats for array I/O.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    /// NumPy .npy format.
    Npy,
    /// MATLAB .mat format (Level 5).
    Mat,
}

/// Infer file format from extension.
pub fn infer_format(path: &Path) -> Result<FileFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("npy") => Ok(FileFormat::Npy),
        Some("mat") => Ok(FileFormat::Mat),
        Some(ext) => Err(GatoError::UnsupportedFileFormat(ext.to_string())),
        None => Err(GatoError::UnsupportedFileFormat(
            "(no extension)".to_string(),
        )),
    }
}

/// Load a 2D array from a .npy file, promoting f32 to f64.
pub fn load_npy(path: &Path) -> Result<Array2<f64>> {
    match ndarray_npy::read_npy::<_, Array2<f64>>(path) {
        Ok(arr) => Ok(arr),
        Err(_) => {
            let arr32: Array2<f32> = ndarray_npy::read_npy(path)
                .map_err(|e| GatoError::UnsupportedDtype(format!("{}", e)))?;
            Ok(arr32.mapv(|v| v as f64))
        }
    }
}

/// Save a 2D array to a .npy file.
pub fn save_npy(path: &Path, arr: &Array2<f64>) -> Result<()> {
    ndarray_npy::write_npy(path, arr)
        .map_err(|e| GatoError::Other(format!("npy write error: {}", e)))
}

/// Load a 2D array variable from a .mat file.
///
/// MAT files store data in column-major order; the result is in standard
/// (row-major) layout.
pub fn load_mat(path: &Path, variable_name: &str) -> Result<Array2<f64>> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    let mat = matfile::MatFile::parse(&mut reader)
        .map_err(|e| GatoError::Other(format!("MAT parse error: {}", e)))?;

    let array = mat
        .find_by_name(variable_name)
        .ok_or_else(|| GatoError::MatVariableNotFound {
            expected: variable_name.to_string(),
            available: mat.arrays().iter().map(|a| a.name().to_string()).collect(),
        })?;

    let data: Vec<f64> = match array.data() {
        matfile::NumericData::Double { real, imag: _ } => real.clone(),
        matfile::NumericData::Single { real, imag: _ } => real.iter().map(|&v| v as f64).collect(),
        _ => {
            return Err(GatoError::UnsupportedDtype(
                "MAT file array is not f64 or f32".to_string(),
            ))
        }
    };

    let size = array.size();
    if size.len() != 2 {
        return Err(GatoError::ShapeMismatch {
            expected: vec![0, 0],
            got: size.to_vec(),
        });
    }

    let arr = Array2::from_shape_vec((size[0], size[1]).f(), data)
        .map_err(|e| GatoError::Other(format!("shape error: {}", e)))?;
    Ok(arr.as_standard_layout().to_owned())
}

/// Save a 2D array to a .mat file (Level 5, uncompressed, one variable).
///
/// The `matfile` crate only reads, so the writer is implemented here.
pub fn save_mat(path: &Path, arr: &Array2<f64>, var_name: &str) -> Result<()> {
    let (nrows, ncols) = arr.dim();
    // Column-major element order.
    let data: Vec<f64> = arr.t().iter().copied().collect();

    let file = std::fs::File::create(path)?;
    let mut w = std::io::BufWriter::new(file);

    // 128-byte header: 116 bytes text, 8 bytes subsystem offset, version,
    // endian indicator.
    let mut text = [b' '; 116];
    let desc = b"MATLAB 5.0 MAT-file, created by gato";
    text[..desc.len()].copy_from_slice(desc);
    w.write_all(&text)?;
    w.write_all(&[0u8; 8])?;
    w.write_all(&0x0100u16.to_le_bytes())?;
    w.write_all(b"IM")?;

    let mut dims = Vec::with_capacity(8);
    dims.extend_from_slice(&(nrows as i32).to_le_bytes());
    dims.extend_from_slice(&(ncols as i32).to_le_bytes());

    let mut real = Vec::with_capacity(data.len() * 8);
    for v in &data {
        real.extend_from_slice(&v.to_le_bytes());
    }

    // miMATRIX payload: array flags (miUINT32, mxDOUBLE_CLASS), dimensions
    // (miINT32), name (miINT8), real part (miDOUBLE).
    let mut flags = Vec::with_capacity(8);
    flags.extend_from_slice(&6u32.to_le_bytes());
    flags.extend_from_slice(&0u32.to_le_bytes());

    let mut matrix = Vec::new();
    push_element(&mut matrix, MI_UINT32, &flags);
    push_element(&mut matrix, MI_INT32, &dims);
    push_element(&mut matrix, MI_INT8, var_name.as_bytes());
    push_element(&mut matrix, MI_DOUBLE, &real);

    w.write_all(&MI_MATRIX.to_le_bytes())?;
    w.write_all(&(matrix.len() as u32).to_le_bytes())?;
    w.write_all(&matrix)?;
    w.flush()?;
    Ok(())
}

const MI_INT8: u32 = 1;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_DOUBLE: u32 = 9;
const MI_MATRIX: u32 = 14;

/// Append a tagged data element, padded to an 8-byte boundary.
fn push_element(buf: &mut Vec<u8>, data_type: u32, payload: &[u8]) {
    buf.extend_from_slice(&data_type.to_le_bytes());
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(payload);
    let padded = payload.len().div_ceil(8) * 8;
    buf.resize(buf.len() + padded - payload.len(), 0);
}

/// Save a 2D array, inferring the format from the extension.
pub fn save_array(path: &Path, arr: &Array2<f64>, var_name: &str) -> Result<()> {
    match infer_format(path)? {
        FileFormat::Npy => save_npy(path, arr),
        FileFormat::Mat => save_mat(path, arr, var_name),
    }
}

/// Load `(N, 5)` unstructured grid coordinates, inferring the format from
/// the extension. MAT files must hold a variable named `coordinates`.
pub fn load_coordinates(path: &Path) -> Result<Array2<f64>> {
    let arr = match infer_format(path)? {
        FileFormat::Npy => load_npy(path)?,
        FileFormat::Mat => load_mat(path, "coordinates")?,
    };
    if arr.ncols() != 5 {
        return Err(GatoError::ShapeMismatch {
            expected: vec![arr.nrows(), 5],
            got: arr.shape().to_vec(),
        });
    }
    Ok(arr)
}
