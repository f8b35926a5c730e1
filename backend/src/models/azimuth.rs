//! Azimuth conventions.
//!
//! The engine works in the true north-clockwise convention. Some dome
//! controllers report a mirrored "vendor" azimuth that has to be converted
//! before it reaches the engine.

use qtty::Degrees;

/// Convert a vendor-reported dome azimuth to the true convention.
///
/// `true = (360 - vendor) mod 360`, always in `[0, 360)`.
///
/// # Examples
///
/// ```
/// use dome_vignetting::models::true_azimuth_from_vendor;
/// use qtty::Degrees;
///
/// assert_eq!(true_azimuth_from_vendor(Degrees::new(90.0)).value(), 270.0);
/// assert_eq!(true_azimuth_from_vendor(Degrees::new(0.0)).value(), 0.0);
/// ```
pub fn true_azimuth_from_vendor(vendor: Degrees) -> Degrees {
    (Degrees::new(360.0) - vendor).wrap_pos()
}

/// Inverse of [`true_azimuth_from_vendor`]; the mapping is its own inverse.
pub fn vendor_azimuth_from_true(true_az: Degrees) -> Degrees {
    true_azimuth_from_vendor(true_az)
}
