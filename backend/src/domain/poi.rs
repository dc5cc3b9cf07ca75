//! Point-of-interest entities.
//!
//! [`PointOfInterest`] is a stored row; [`NewPoi`] is a validated candidate
//! that has not been assigned an identifier yet.

/// Storage-assigned POI identifier.
pub type PoiId = i64;

/// Validation errors raised when building a [`NewPoi`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoiValidationError {
    /// Name is empty once trimmed.
    #[error("poi name must not be empty")]
    EmptyName,
    /// Latitude is NaN or infinite.
    #[error("poi latitude must be a finite number")]
    NonFiniteLatitude,
    /// Longitude is NaN or infinite.
    #[error("poi longitude must be a finite number")]
    NonFiniteLongitude,
}

/// A persisted point of interest.
///
/// ## Invariants
/// - `name` is non-empty.
/// - `latitude` and `longitude` are finite.
#[derive(Debug, Clone, PartialEq)]
pub struct PointOfInterest {
    id: PoiId,
    candidate: NewPoi,
}

impl PointOfInterest {
    /// Attach a storage identifier to a validated candidate.
    #[must_use]
    pub const fn new(id: PoiId, candidate: NewPoi) -> Self {
        Self { id, candidate }
    }

    /// Validate raw column values read back from storage.
    ///
    /// # Errors
    /// Returns [`PoiValidationError`] when a stored row breaks the invariants.
    pub fn try_from_parts(
        id: PoiId,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self, PoiValidationError> {
        Ok(Self::new(id, NewPoi::try_new(name, latitude, longitude)?))
    }

    /// Storage identifier.
    #[must_use]
    pub const fn id(&self) -> PoiId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.candidate.name()
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.candidate.latitude()
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.candidate.longitude()
    }
}

/// A validated POI awaiting insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPoi {
    name: String,
    latitude: f64,
    longitude: f64,
}

impl NewPoi {
    /// Validate and build a candidate.
    ///
    /// # Errors
    /// Returns [`PoiValidationError`] for a blank name or non-finite
    /// coordinates.
    ///
    /// # Examples
    /// ```
    /// use poi_backend::domain::{NewPoi, PoiValidationError};
    ///
    /// let poi = NewPoi::try_new("Seoul Station", 37.5547, 126.9706).expect("valid poi");
    /// assert_eq!(poi.name(), "Seoul Station");
    /// assert_eq!(
    ///     NewPoi::try_new("  ", 37.5, 127.0),
    ///     Err(PoiValidationError::EmptyName)
    /// );
    /// ```
    pub fn try_new(
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self, PoiValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PoiValidationError::EmptyName);
        }
        if !latitude.is_finite() {
            return Err(PoiValidationError::NonFiniteLatitude);
        }
        if !longitude.is_finite() {
            return Err(PoiValidationError::NonFiniteLongitude);
        }
        Ok(Self {
            name,
            latitude,
            longitude,
        })
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}
