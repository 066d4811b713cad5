//! Approximate centroids of the Philippine administrative regions

use serde::Serialize;

/// A region centroid in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Centroid {
    pub lat: f64,
    pub lon: f64,
    pub name: &'static str,
}

/// Geographic centre of the country, used for unknown region codes
pub const PH_CENTER: Centroid = Centroid {
    lat: 12.8797,
    lon: 121.7740,
    name: "Philippines",
};

const REGION_CENTROIDS: [(&str, Centroid); 17] = [
    ("NCR", Centroid { lat: 14.5995, lon: 120.9842, name: "National Capital Region" }),
    ("CAR", Centroid { lat: 17.3513, lon: 121.1719, name: "Cordillera Administrative Region" }),
    ("REGION I", Centroid { lat: 16.0832, lon: 120.6200, name: "Ilocos Region" }),
    ("REGION II", Centroid { lat: 16.9754, lon: 121.8107, name: "Cagayan Valley" }),
    ("REGION III", Centroid { lat: 15.4828, lon: 120.7120, name: "Central Luzon" }),
    ("REGION IV-A", Centroid { lat: 14.1008, lon: 121.0794, name: "CALABARZON" }),
    ("REGION IV-B", Centroid { lat: 12.8797, lon: 121.7740, name: "MIMAROPA" }),
    ("REGION V", Centroid { lat: 13.4210, lon: 123.4137, name: "Bicol Region" }),
    ("REGION VI", Centroid { lat: 10.7202, lon: 122.5621, name: "Western Visayas" }),
    ("REGION VII", Centroid { lat: 9.8500, lon: 123.8907, name: "Central Visayas" }),
    ("REGION VIII", Centroid { lat: 11.2543, lon: 124.9936, name: "Eastern Visayas" }),
    ("REGION IX", Centroid { lat: 7.8527, lon: 123.0311, name: "Zamboanga Peninsula" }),
    ("REGION X", Centroid { lat: 8.0202, lon: 124.6857, name: "Northern Mindanao" }),
    ("REGION XI", Centroid { lat: 7.1907, lon: 125.4553, name: "Davao Region" }),
    ("REGION XII", Centroid { lat: 6.2707, lon: 124.6857, name: "SOCCSKSARGEN" }),
    ("REGION XIII", Centroid { lat: 8.8017, lon: 125.7407, name: "Caraga" }),
    ("BARMM", Centroid { lat: 6.9568, lon: 124.2421, name: "Bangsamoro Autonomous Region" }),
];

/// Centroid for a region code, or [`PH_CENTER`] when the code is unknown.
/// Lookup ignores case and surrounding whitespace.
pub fn centroid(region_code: &str) -> Centroid {
    let code = region_code.trim();
    REGION_CENTROIDS
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(code))
        .map(|(_, c)| *c)
        .unwrap_or(PH_CENTER)
}

/// Every known region code
pub fn region_codes() -> impl Iterator<Item = &'static str> {
    REGION_CENTROIDS.iter().map(|(code, _)| *code)
}
