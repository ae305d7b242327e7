//! Application state management for isobar.
//!
//! This module defines the shared state that is passed to all handlers:
//! the in-memory dataset (metadata, coordinates and decoded variable arrays)
//! together with the configuration it was loaded with.

use ndarray::{Array, IxDyn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{IsobarError, Result};

/// Metadata about a NetCDF dimension
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimension {
    /// Name of the dimension
    pub name: String,
    /// Size of the dimension
    pub size: usize,
    /// Whether this dimension is unlimited
    pub is_unlimited: bool,
}

/// Metadata about a NetCDF variable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    /// Name of the variable
    pub name: String,
    /// Dimensions of the variable
    pub dimensions: Vec<String>,
    /// Shape of the variable (dimension sizes)
    pub shape: Vec<usize>,
    /// Variable attributes
    pub attributes: HashMap<String, AttributeValue>,
    /// Data type as string
    pub dtype: String,
}

impl Variable {
    /// Text value of an attribute, if present and textual
    pub fn attribute_text(&self, name: &str) -> Option<&str> {
        match self.attributes.get(name) {
            Some(AttributeValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Scalar numeric value of an attribute; single-element arrays count too
    pub fn attribute_number(&self, name: &str) -> Option<f64> {
        match self.attributes.get(name) {
            Some(AttributeValue::Number(n)) => Some(*n),
            Some(AttributeValue::NumberArray(v)) if v.len() == 1 => Some(v[0]),
            _ => None,
        }
    }
}

/// Possible attribute values in NetCDF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// String attribute
    Text(String),
    /// Numeric attribute (stored as f64 for simplicity)
    Number(f64),
    /// Array of numbers
    NumberArray(Vec<f64>),
}

/// Complete metadata for a NetCDF file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// File-level attributes
    pub global_attributes: HashMap<String, AttributeValue>,
    /// Dimensions in the file
    pub dimensions: HashMap<String, Dimension>,
    /// Variables in the file, coordinate variables included
    pub variables: HashMap<String, Variable>,
    /// Coordinate values per dimension
    pub coordinates: HashMap<String, Vec<f64>>,
}

/// The main application state shared across all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// File metadata
    pub metadata: Metadata,
    /// Loaded data arrays, CF decoded (missing values are NaN)
    pub data: HashMap<String, Array<f32, IxDyn>>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(
        config: Config,
        metadata: Metadata,
        data: HashMap<String, Array<f32, IxDyn>>,
    ) -> Self {
        Self {
            config,
            metadata,
            data,
        }
    }

    /// Create a new AppState wrapped in an Arc for shared ownership
    pub fn new_shared(
        config: Config,
        metadata: Metadata,
        data: HashMap<String, Array<f32, IxDyn>>,
    ) -> Arc<Self> {
        Arc::new(Self::new(config, metadata, data))
    }

    /// Get a variable's data array with error handling
    pub fn get_variable_checked(&self, name: &str) -> Result<&Array<f32, IxDyn>> {
        self.data
            .get(name)
            .ok_or_else(|| IsobarError::VariableNotFound {
                name: name.to_string(),
            })
    }

    /// Get coordinate values for a dimension
    pub fn get_coordinate(&self, name: &str) -> Option<&Vec<f64>> {
        self.metadata.coordinates.get(name)
    }

    /// Get coordinate values for a dimension with error handling
    pub fn get_coordinate_checked(&self, name: &str) -> Result<&Vec<f64>> {
        self.metadata
            .coordinates
            .get(name)
            .ok_or_else(|| IsobarError::not_found(format!("Coordinate not found: {}", name)))
    }

    /// Get variable metadata
    pub fn get_variable_metadata(&self, name: &str) -> Option<&Variable> {
        self.metadata.variables.get(name)
    }

    /// Get variable metadata with error handling
    pub fn get_variable_metadata_checked(&self, name: &str) -> Result<&Variable> {
        self.metadata
            .variables
            .get(name)
            .ok_or_else(|| IsobarError::VariableNotFound {
                name: name.to_string(),
            })
    }

    /// Check if a variable exists
    pub fn has_variable(&self, name: &str) -> bool {
        self.metadata.variables.contains_key(name)
    }

    /// Names of the variables that can be rendered (data variables, not coordinates)
    pub fn data_variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .data
            .keys()
            .filter(|name| !self.metadata.dimensions.contains_key(*name))
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Approximate number of bytes held by the loaded arrays
    pub fn data_memory_bytes(&self) -> usize {
        self.data
            .values()
            .map(|array| array.len() * std::mem::size_of::<f32>())
            .sum()
    }

    /// Validate that the application state is consistent and ready for use
    pub fn validate(&self) -> Result<()> {
        if self.metadata.variables.is_empty() {
            return Err(IsobarError::not_found("No variables found in the NetCDF file"));
        }

        for (var_name, var) in &self.metadata.variables {
            for dim_name in &var.dimensions {
                if !self.metadata.dimensions.contains_key(dim_name) {
                    return Err(IsobarError::not_found(format!(
                        "Variable {} references non-existent dimension {}",
                        var_name, dim_name
                    )));
                }
            }

            if let Some(data) = self.data.get(var_name) {
                if data.shape() != var.shape.as_slice() {
                    return Err(IsobarError::not_found(format!(
                        "Variable {} has inconsistent shape between metadata ({:?}) and data ({:?})",
                        var_name,
                        var.shape,
                        data.shape()
                    )));
                }
            }
        }

        for (dim_name, dim) in &self.metadata.dimensions {
            match self.metadata.coordinates.get(dim_name) {
                Some(coords) if coords.len() == dim.size => {}
                Some(coords) => {
                    return Err(IsobarError::not_found(format!(
                        "Coordinate {} has {} values but the dimension has size {}",
                        dim_name,
                        coords.len(),
                        dim.size
                    )));
                }
                None => {
                    return Err(IsobarError::not_found(format!(
                        "Coordinate values for dimension {} not found",
                        dim_name
                    )));
                }
            }
        }

        Ok(())
    }
}
