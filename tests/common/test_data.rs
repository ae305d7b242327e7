//! Test data generation utilities.
//!
//! Writes small NetCDF files with known values so image pixels can be
//! checked against the data they were drawn from.

use std::path::Path;

use netcdf::Error;
type Result<T> = std::result::Result<T, Error>;

/// Longitudes of the global ocean grid: 0..350 every 10 degrees
pub const OCEAN_LONS: usize = 36;
/// Latitudes of the global ocean grid: 80..-80 every 10 degrees (north first)
pub const OCEAN_LATS: usize = 17;
/// Fill value marking land cells
pub const FILL_VALUE: f32 = -999.0;

/// Latitude indices of the land box (10N..10S)
const LAND_ROWS: std::ops::RangeInclusive<usize> = 7..=9;
/// Longitude indices of the land box (180E..200E)
const LAND_COLS: std::ops::RangeInclusive<usize> = 18..=20;

/// Sea surface temperature at a grid cell, `None` over land.
///
/// Rises by one per longitude step and by ten per time step.
pub fn ocean_sst(t: usize, lat: usize, lon: usize) -> Option<f32> {
    if LAND_ROWS.contains(&lat) && LAND_COLS.contains(&lon) {
        None
    } else {
        Some(lon as f32 + 10.0 * t as f32)
    }
}

/// Creates a global NetCDF file shaped like an ocean model output.
///
/// * `sst(time, lat, lon)`: see [`ocean_sst`], with `_FillValue` over land
/// * `current(time, depth, lat, lon)`: constant 1.0 on a single depth level
/// * `bathymetry(lat, lon)`: no time axis, deeper to the south
///
/// Time steps are 2022-03-01T00:00Z and 2022-03-02T00:00Z.
pub fn create_global_ocean_nc(path: &Path) -> Result<()> {
    let mut file = netcdf::create(path)?;

    file.add_dimension("time", 2)?;
    file.add_dimension("depth", 1)?;
    file.add_dimension("lat", OCEAN_LATS)?;
    file.add_dimension("lon", OCEAN_LONS)?;

    file.add_attribute("title", "Global Ocean Test Data")?;
    file.add_attribute("institution", "isobar test suite")?;
    file.add_attribute("Conventions", "CF-1.8")?;

    let lon_values: Vec<f64> = (0..OCEAN_LONS).map(|i| i as f64 * 10.0).collect();
    let lat_values: Vec<f64> = (0..OCEAN_LATS).map(|i| 80.0 - i as f64 * 10.0).collect();
    let time_values: Vec<f64> = vec![0.0, 24.0];

    {
        let mut var = file.add_variable::<f64>("lon", &["lon"])?;
        var.put_attribute("units", "degrees_east")?;
        var.put_attribute("axis", "X")?;
        var.put_values(&lon_values, ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("lat", &["lat"])?;
        var.put_attribute("units", "degrees_north")?;
        var.put_attribute("standard_name", "latitude")?;
        var.put_values(&lat_values, ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("time", &["time"])?;
        var.put_attribute("units", "hours since 2022-03-01 00:00:00")?;
        var.put_attribute("calendar", "standard")?;
        var.put_values(&time_values, ..)?;
    }
    {
        let mut var = file.add_variable::<f32>("depth", &["depth"])?;
        var.put_attribute("units", "m")?;
        var.put_attribute("positive", "down")?;
        var.put_values(&[5.0f32], ..)?;
    }

    let mut sst_values = Vec::with_capacity(2 * OCEAN_LATS * OCEAN_LONS);
    for t in 0..2 {
        for lat in 0..OCEAN_LATS {
            for lon in 0..OCEAN_LONS {
                sst_values.push(ocean_sst(t, lat, lon).unwrap_or(FILL_VALUE));
            }
        }
    }
    {
        let mut var = file.add_variable::<f32>("sst", &["time", "lat", "lon"])?;
        var.put_attribute("units", "degC")?;
        var.put_attribute("long_name", "Sea Surface Temperature")?;
        var.put_attribute("_FillValue", FILL_VALUE)?;
        var.put_values(&sst_values, ..)?;
    }

    let current_values = vec![1.0f32; 2 * OCEAN_LATS * OCEAN_LONS];
    {
        let mut var = file.add_variable::<f32>("current", &["time", "depth", "lat", "lon"])?;
        var.put_attribute("units", "m s-1")?;
        var.put_values(&current_values, ..)?;
    }

    let bathymetry_values: Vec<f32> = (0..OCEAN_LATS)
        .flat_map(|lat| std::iter::repeat(-100.0 * lat as f32).take(OCEAN_LONS))
        .collect();
    {
        let mut var = file.add_variable::<f32>("bathymetry", &["lat", "lon"])?;
        var.put_attribute("units", "m")?;
        var.put_values(&bathymetry_values, ..)?;
    }

    Ok(())
}
