//! Great-circle distance between two WGS84 positions.
//!
//! Uses the haversine formula on a spherical Earth. Good to a few tenths of a
//! percent, which is plenty for "how far is that aircraft from the antenna".

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance in kilometres between `(lat1, lon1)` and `(lat2, lon2)`, in degrees.
///
/// NaN in any coordinate gives NaN.
///
/// # Example
/// ```
/// use flight_dash_lib::geo::distance;
///
/// let quarter = distance(0.0, 0.0, 0.0, 90.0);
/// assert!((quarter - 10_007.5).abs() < 0.1);
/// ```
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1) = (lat1.to_radians(), lon1.to_radians());
    let (lat2, lon2) = (lat2.to_radians(), lon2.to_radians());

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
