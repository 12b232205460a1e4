#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLon(f64, f64);

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        LatLon(lat, lon)
    }

    /// Both halves have to be present; POIs hidden upstream ship without coordinates.
    pub fn from_poi(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        match (lat, lon) {
            (Some(lat), Some(lon)) => Some(LatLon(lat, lon)),
            _ => None,
        }
    }

    /// `lat`/`lon` attribute values, shortest decimal that reads back to the same f64.
    pub fn to_gpx(self) -> (String, String) {
        (self.0.to_string(), self.1.to_string())
    }
}
