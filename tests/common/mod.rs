//! Common test utilities for isobar.
//!
//! This module provides shared utilities for testing the isobar server.

#![allow(dead_code)]

pub mod assertions;
pub mod http_client;
pub mod image_utils;
pub mod server;
pub mod test_data;
