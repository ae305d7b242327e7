//! NetCDF data loading functionality.
//!
//! This module reads a NetCDF file into memory at startup. Every numeric
//! variable is read as `f64` through the C library's type conversion, CF
//! decoded (`_FillValue` / `missing_value` to NaN, then `scale_factor` and
//! `add_offset`) and stored as `f32`.

use ndarray::{Array, IxDyn};
use netcdf::{Attribute, Variable as NetCDFVariable};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{IsobarError, Result};
use crate::logging::log_data_load_stats;
use crate::state::{AppState, AttributeValue, Dimension, Metadata, Variable};

/// Type alias for the NetCDF loading result to simplify the complex return type
pub type LoadResult = Result<(Metadata, HashMap<String, Array<f32, IxDyn>>)>;

/// Load a NetCDF file into memory and create the application state
pub fn load_netcdf(path: &Path, config: Config) -> Result<AppState> {
    let start = Instant::now();
    let (metadata, data) = load_netcdf_file(path)?;

    let state = AppState::new(config, metadata, data);
    state.validate()?;

    let var_names = state.data_variable_names();
    let var_names: Vec<&str> = var_names.iter().map(String::as_str).collect();
    let mut dims: Vec<String> = state
        .metadata
        .dimensions
        .values()
        .map(|d| format!("{}={}", d.name, d.size))
        .collect();
    dims.sort();

    log_data_load_stats(
        &path.display().to_string(),
        &var_names,
        &dims.join(", "),
        state.data_memory_bytes(),
        start.elapsed(),
    );

    Ok(state)
}

/// Load a NetCDF file into memory, returning metadata and data
pub fn load_netcdf_file(path: &Path) -> LoadResult {
    if !path.exists() {
        return Err(IsobarError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    let file = netcdf::open(path)?;
    info!("Opened NetCDF file: {}", path.display());

    let mut metadata = Metadata::default();
    for attr in file.attributes() {
        metadata
            .global_attributes
            .insert(attr.name().to_string(), convert_attribute(&attr)?);
    }

    for dim in file.dimensions() {
        let name = dim.name().to_string();
        metadata.dimensions.insert(
            name.clone(),
            Dimension {
                name,
                size: dim.len(),
                is_unlimited: dim.is_unlimited(),
            },
        );
    }
    debug!(
        variables = file.variables().count(),
        dimensions = metadata.dimensions.len(),
        "Reading NetCDF contents"
    );

    let mut data = HashMap::new();
    for var in file.variables() {
        let Some((variable, values)) = read_variable(&var)? else {
            continue;
        };

        if metadata.dimensions.contains_key(&variable.name) && variable.dimensions.len() == 1 {
            metadata
                .coordinates
                .insert(variable.name.clone(), values.clone());
        }

        let values: Vec<f32> = values.into_iter().map(|v| v as f32).collect();
        let array = Array::from_shape_vec(IxDyn(&variable.shape), values)?;
        data.insert(variable.name.clone(), array);
        metadata.variables.insert(variable.name.clone(), variable);
    }

    // Dimensions without a coordinate variable get index coordinates
    for (name, dim) in &metadata.dimensions {
        if !metadata.coordinates.contains_key(name) {
            warn!("Created default coordinates for dimension: {}", name);
            metadata
                .coordinates
                .insert(name.clone(), (0..dim.size).map(|i| i as f64).collect());
        }
    }

    Ok((metadata, data))
}

/// Read one variable's metadata and CF decoded values.
///
/// Returns `Ok(None)` for variables the C library cannot convert to numbers.
fn read_variable(var: &NetCDFVariable) -> Result<Option<(Variable, Vec<f64>)>> {
    let name = var.name().to_string();

    let mut raw = match var.get_values::<f64, _>(..) {
        Ok(values) => values,
        Err(e) => {
            warn!(variable = %name, error = %e, "Skipping non-numeric variable");
            return Ok(None);
        }
    };

    let mut attributes = HashMap::new();
    for attr in var.attributes() {
        attributes.insert(attr.name().to_string(), convert_attribute(&attr)?);
    }

    let variable = Variable {
        name,
        dimensions: var.dimensions().iter().map(|d| d.name().to_string()).collect(),
        shape: var.dimensions().iter().map(|d| d.len()).collect(),
        attributes,
        dtype: format!("{:?}", var.vartype()),
    };

    decode_cf_values(&mut raw, &variable);

    Ok(Some((variable, raw)))
}

/// Apply CF masking and scaling in place.
///
/// Values equal to `_FillValue` or any `missing_value` become NaN, then
/// `value * scale_factor + add_offset` is applied.
pub fn decode_cf_values(values: &mut [f64], var: &Variable) {
    let mut sentinels = Vec::new();
    for name in ["_FillValue", "missing_value"] {
        match var.attributes.get(name) {
            Some(AttributeValue::Number(v)) => sentinels.push(*v),
            Some(AttributeValue::NumberArray(vs)) => sentinels.extend_from_slice(vs),
            _ => {}
        }
    }

    let scale = var.attribute_number("scale_factor").unwrap_or(1.0);
    let offset = var.attribute_number("add_offset").unwrap_or(0.0);

    for value in values.iter_mut() {
        let missing = sentinels
            .iter()
            .any(|s| *s == *value || (s.is_nan() && value.is_nan()));
        *value = if missing {
            f64::NAN
        } else {
            *value * scale + offset
        };
    }
}

/// Convert a NetCDF attribute to our AttributeValue enum
fn convert_attribute(attr: &Attribute) -> Result<AttributeValue> {
    use netcdf::AttributeValue as Nc;

    fn numbers<T: Copy + Into<f64>>(values: Vec<T>) -> AttributeValue {
        AttributeValue::NumberArray(values.into_iter().map(Into::into).collect())
    }

    let value = match attr.value()? {
        Nc::Str(s) => AttributeValue::Text(s),
        Nc::Strs(s) => AttributeValue::Text(s.join(", ")),
        Nc::Uchar(v) => AttributeValue::Number(v.into()),
        Nc::Schar(v) => AttributeValue::Number(v.into()),
        Nc::Ushort(v) => AttributeValue::Number(v.into()),
        Nc::Short(v) => AttributeValue::Number(v.into()),
        Nc::Uint(v) => AttributeValue::Number(v.into()),
        Nc::Int(v) => AttributeValue::Number(v.into()),
        Nc::Ulonglong(v) => AttributeValue::Number(v as f64),
        Nc::Longlong(v) => AttributeValue::Number(v as f64),
        Nc::Float(v) => AttributeValue::Number(v.into()),
        Nc::Double(v) => AttributeValue::Number(v),
        Nc::Uchars(v) => numbers(v),
        Nc::Schars(v) => numbers(v),
        Nc::Ushorts(v) => numbers(v),
        Nc::Shorts(v) => numbers(v),
        Nc::Uints(v) => numbers(v),
        Nc::Ints(v) => numbers(v),
        Nc::Ulonglongs(v) => {
            AttributeValue::NumberArray(v.into_iter().map(|x| x as f64).collect())
        }
        Nc::Longlongs(v) => AttributeValue::NumberArray(v.into_iter().map(|x| x as f64).collect()),
        Nc::Floats(v) => numbers(v),
        Nc::Doubles(v) => AttributeValue::NumberArray(v),
        #[allow(unreachable_patterns)]
        other => AttributeValue::Text(format!("{:?}", other)),
    };
    Ok(value)
}
