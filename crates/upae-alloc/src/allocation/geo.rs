use super::domain::Coordinates;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GeoError {
    #[error("invalid coordinate (lat {lat}, lng {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },
}

impl Coordinates {
    /// Both components must be finite and inside the usual degree ranges.
    pub fn validate(&self) -> Result<(), GeoError> {
        let in_range = self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng);

        if in_range {
            Ok(())
        } else {
            Err(GeoError::InvalidCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

/// Great-circle distance between two coordinates.
pub struct DistanceEstimator;

impl DistanceEstimator {
    /// Haversine distance in kilometres.
    pub fn km(from: Coordinates, to: Coordinates) -> Result<f64, GeoError> {
        from.validate()?;
        to.validate()?;

        let phi1 = from.lat.to_radians();
        let phi2 = to.lat.to_radians();
        let d_phi = (to.lat - from.lat).to_radians();
        let d_lambda = (to.lng - from.lng).to_radians();

        let h = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        let central_angle = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());

        Ok((EARTH_RADIUS_KM * central_angle).max(0.0))
    }
}
