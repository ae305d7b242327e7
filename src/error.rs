//! Error types for the isobar application.
//!
//! Every failure a request can hit maps onto one variant here, and each
//! variant knows the HTTP status it is reported with.

use axum::http::StatusCode;
use thiserror::Error;

/// The main error type for isobar operations.
#[derive(Error, Debug)]
pub enum IsobarError {
    /// NetCDF file operation errors
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid request parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// The requested parameter is not a variable of the dataset
    #[error("Unknown parameter: {name}")]
    VariableNotFound { name: String },

    /// Data not found errors (time not present, empty slice, ...)
    #[error("Data not found: {message}")]
    DataNotFound { message: String },

    /// Interpolation errors
    #[error("Interpolation error: {message}")]
    Interpolation { message: String },

    /// Image generation errors
    #[error("Image generation error: {message}")]
    ImageGeneration { message: String },

    /// Array shape errors
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server errors
    #[error("Server error: {message}")]
    Server { message: String },
}

impl IsobarError {
    /// Shorthand for an [`IsobarError::InvalidParameter`].
    pub fn invalid(param: &str, message: impl Into<String>) -> Self {
        IsobarError::InvalidParameter {
            param: param.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for an [`IsobarError::DataNotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        IsobarError::DataNotFound {
            message: message.into(),
        }
    }

    /// HTTP status used when this error terminates a request.
    pub fn status_code(&self) -> StatusCode {
        match self {
            IsobarError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            IsobarError::VariableNotFound { .. } | IsobarError::DataNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convenience type alias for Results with IsobarError
pub type Result<T> = std::result::Result<T, IsobarError>;
