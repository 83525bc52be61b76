//! GeoJSON state boundaries for the choropleth view.
//!
//! The boundary document is optional: every failure here (no URL configured,
//! network error, malformed JSON) degrades to "no map" and the callers fall
//! back to a plain bar chart.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::{DEFAULT_GEOJSON_NAME_KEY, StatePurchase};
use crate::error::AppError;

const URL_ENV: &str = "SILVER_GEOJSON_URL";
const NAME_KEY_ENV: &str = "SILVER_GEOJSON_NAME_KEY";
const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Number of shade buckets used when colouring states.
pub const SHADE_LEVELS: u8 = 5;

/// One named feature with its exterior rings as `(lon, lat)` pairs.
#[derive(Debug, Clone)]
pub struct GeoFeature {
    pub name: String,
    pub rings: Vec<Vec<(f64, f64)>>,
}

impl GeoFeature {
    /// `(min_lon, min_lat, max_lon, max_lat)`, or `None` for an empty geometry.
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        let mut points = self.rings.iter().flatten();
        let &(x, y) = points.next()?;
        Some(points.fold((x, y, x, y), |(x0, y0, x1, y1), &(x, y)| {
            (x0.min(x), y0.min(y), x1.max(x), y1.max(y))
        }))
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeoBoundaries {
    pub features: Vec<GeoFeature>,
}

impl GeoBoundaries {
    /// Bounding box over all features.
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.features
            .iter()
            .filter_map(GeoFeature::bbox)
            .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
    }
}

#[derive(Debug)]
pub struct GeoClient {
    client: Client,
    url: String,
    name_key: String,
}

impl GeoClient {
    /// Build a client from an explicit URL or `SILVER_GEOJSON_URL` (.env aware).
    pub fn from_env(url_override: Option<String>, name_key_override: Option<String>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let url = url_override
            .or_else(|| std::env::var(URL_ENV).ok())
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AppError::new(2, format!("No GeoJSON URL configured (pass --geojson-url or set {URL_ENV}).")))?;
        let name_key = name_key_override
            .or_else(|| std::env::var(NAME_KEY_ENV).ok())
            .unwrap_or_else(|| DEFAULT_GEOJSON_NAME_KEY.to_string());

        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, url, name_key })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn fetch_boundaries(&self) -> Result<GeoBoundaries, AppError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| AppError::new(4, format!("GeoJSON request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("GeoJSON request failed with status {}.", resp.status()),
            ));
        }

        let body: Value = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse GeoJSON response: {e}")))?;

        let boundaries = parse_boundaries(&body, &self.name_key)?;
        info!(url = %self.url, features = boundaries.features.len(), "fetched state boundaries");
        Ok(boundaries)
    }

    /// Fetch, logging and swallowing any failure.
    pub fn fetch_boundaries_best_effort(&self) -> Option<GeoBoundaries> {
        match self.fetch_boundaries() {
            Ok(b) => Some(b),
            Err(err) => {
                warn!(url = %self.url, "map unavailable, falling back to bar chart: {err}");
                None
            }
        }
    }
}

/// Resolve boundaries when a URL is configured; `None` otherwise or on failure.
pub fn load_boundaries(url_override: Option<String>, name_key_override: Option<String>) -> Option<GeoBoundaries> {
    match GeoClient::from_env(url_override, name_key_override) {
        Ok(client) => client.fetch_boundaries_best_effort(),
        Err(err) => {
            info!("{err}");
            None
        }
    }
}

/// Extract named `Polygon` / `MultiPolygon` features from a FeatureCollection.
///
/// Features without the name property or with other geometry types are skipped.
pub fn parse_boundaries(doc: &Value, name_key: &str) -> Result<GeoBoundaries, AppError> {
    let features = doc
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::new(4, "GeoJSON has no `features` array."))?;

    let mut out = Vec::with_capacity(features.len());
    for feature in features {
        let Some(name) = feature
            .get("properties")
            .and_then(|p| p.get(name_key))
            .and_then(Value::as_str)
        else {
            continue;
        };
        let Some(geometry) = feature.get("geometry") else {
            continue;
        };

        let coords = geometry.get("coordinates");
        let rings = match geometry.get("type").and_then(Value::as_str) {
            Some("Polygon") => coords.and_then(exterior_ring).into_iter().collect(),
            Some("MultiPolygon") => coords
                .and_then(Value::as_array)
                .map(|polys| polys.iter().filter_map(exterior_ring).collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        if rings.is_empty() {
            continue;
        }

        out.push(GeoFeature {
            name: name.trim().to_string(),
            rings,
        });
    }

    Ok(GeoBoundaries { features: out })
}

fn exterior_ring(polygon: &Value) -> Option<Vec<(f64, f64)>> {
    let ring = polygon.as_array()?.first()?.as_array()?;
    let points: Vec<(f64, f64)> = ring
        .iter()
        .filter_map(|pt| {
            let pt = pt.as_array()?;
            Some((pt.first()?.as_f64()?, pt.get(1)?.as_f64()?))
        })
        .collect();
    if points.len() < 3 { None } else { Some(points) }
}

/// One map cell: a boundary feature joined with its purchase quantity.
#[derive(Debug, Clone)]
pub struct ChoroplethCell {
    pub name: String,
    /// `None` renders as "No Data".
    pub quantity_kg: Option<f64>,
    /// `0..SHADE_LEVELS`, darker = more; `None` when there is no data.
    pub shade: Option<u8>,
    pub rings: Vec<Vec<(f64, f64)>>,
}

#[derive(Debug, Clone)]
pub struct ChoroplethLayer {
    pub cells: Vec<ChoroplethCell>,
    /// States with purchase data but no boundary feature.
    pub unmatched_states: Vec<String>,
    pub max_kg: f64,
}

/// Join boundary features with state purchases by name.
pub fn join_choropleth(boundaries: &GeoBoundaries, states: &[StatePurchase]) -> ChoroplethLayer {
    let max_kg = states.iter().map(|s| s.quantity_kg).fold(0.0, f64::max);

    let cells: Vec<ChoroplethCell> = boundaries
        .features
        .iter()
        .map(|feature| {
            let quantity_kg = states
                .iter()
                .find(|s| same_state(&s.state, &feature.name))
                .map(|s| s.quantity_kg);
            ChoroplethCell {
                name: feature.name.clone(),
                quantity_kg,
                shade: quantity_kg.map(|q| shade_for(q, max_kg)),
                rings: feature.rings.clone(),
            }
        })
        .collect();

    let unmatched_states = states
        .iter()
        .filter(|s| !boundaries.features.iter().any(|f| same_state(&s.state, &f.name)))
        .map(|s| s.state.clone())
        .collect();

    ChoroplethLayer {
        cells,
        unmatched_states,
        max_kg,
    }
}

/// Bucket `value` into `0..SHADE_LEVELS` relative to `max`.
pub fn shade_for(value: f64, max: f64) -> u8 {
    if !(max > 0.0) || !(value > 0.0) {
        return 0;
    }
    let bucket = (value / max * SHADE_LEVELS as f64).floor() as u8;
    bucket.min(SHADE_LEVELS - 1)
}

fn same_state(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().replace(" and ", " & ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "st_nm": "Goa" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[73.7, 15.0], [74.3, 15.0], [74.3, 15.8], [73.7, 15.0]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": { "st_nm": "Jammu and Kashmir" },
                    "geometry": {
                        "type": "MultiPolygon",
                        "coordinates": [
                            [[[74.0, 33.0], [76.0, 33.0], [76.0, 35.0], [74.0, 33.0]]],
                            [[[77.0, 34.0], [78.0, 34.0], [78.0, 36.0], [77.0, 34.0]]]
                        ]
                    }
                },
                { "type": "Feature", "properties": {}, "geometry": null },
                {
                    "type": "Feature",
                    "properties": { "st_nm": "Point" },
                    "geometry": { "type": "Point", "coordinates": [1.0, 2.0] }
                }
            ]
        })
    }

    #[test]
    fn parses_polygons_and_multipolygons() {
        let b = parse_boundaries(&doc(), "st_nm").unwrap();
        assert_eq!(b.features.len(), 2);
        assert_eq!(b.features[0].name, "Goa");
        assert_eq!(b.features[0].rings.len(), 1);
        assert_eq!(b.features[1].rings.len(), 2);
        assert_eq!(b.bbox(), Some((73.7, 15.0, 78.0, 36.0)));
    }

    #[test]
    fn missing_features_array_is_an_error() {
        let err = parse_boundaries(&json!({"type": "Feature"}), "st_nm").unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn join_matches_names_and_reports_gaps() {
        let b = parse_boundaries(&doc(), "st_nm").unwrap();
        let states = vec![
            StatePurchase::new("goa", 1900.0),
            StatePurchase::new("Jammu & Kashmir", 500.0),
            StatePurchase::new("Kerala", 9200.0),
        ];
        let layer = join_choropleth(&b, &states);
        assert_eq!(layer.max_kg, 9200.0);
        assert_eq!(layer.cells[0].quantity_kg, Some(1900.0));
        assert_eq!(layer.cells[0].shade, Some(1));
        assert_eq!(layer.cells[1].quantity_kg, Some(500.0));
        assert_eq!(layer.unmatched_states, vec!["Kerala".to_string()]);
    }

    #[test]
    fn shade_buckets_are_bounded() {
        assert_eq!(shade_for(0.0, 100.0), 0);
        assert_eq!(shade_for(100.0, 100.0), SHADE_LEVELS - 1);
        assert_eq!(shade_for(59.0, 100.0), 2);
        assert_eq!(shade_for(10.0, 0.0), 0);
    }

    #[test]
    fn blank_url_is_a_config_error_and_degrades_to_none() {
        // A blank override wins over SILVER_GEOJSON_URL.
        let err = GeoClient::from_env(Some("   ".to_string()), None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(load_boundaries(Some(String::new()), None).is_none());
    }
}
