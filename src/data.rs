//! GeoJSON data model for people and their purchase years

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors reading a feature collection from disk
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read GeoJSON file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse GeoJSON: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// GeoJSON point geometry, `[longitude, latitude]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
}

impl Geometry {
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Geometry::Point {
            coordinates: [longitude, latitude],
        }
    }

    pub fn coordinates(&self) -> [f64; 2] {
        match self {
            Geometry::Point { coordinates } => *coordinates,
        }
    }
}

/// Properties attached to each person
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonProperties {
    #[serde(
        rename = "purchaseYear",
        default,
        deserialize_with = "lenient_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub purchase_year: Option<i32>,

    /// Any other properties edited into the dataset
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accepts `2019`, `2019.0` and `"2019"`; anything else reads as no year
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(year_from_value))
}

fn year_from_value(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|year| i32::try_from(year).ok())
            .or_else(|| n.as_f64().and_then(whole_year)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i32>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_year))
        }
        _ => None,
    }
}

fn whole_year(year: f64) -> Option<i32> {
    let in_range = year >= f64::from(i32::MIN) && year <= f64::from(i32::MAX);
    (year.fract() == 0.0 && in_range).then_some(year as i32)
}

/// GeoJSON allows `"properties": null`
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum FeatureTag {
    #[default]
    Feature,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum CollectionTag {
    #[default]
    FeatureCollection,
}

/// One person on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonFeature {
    #[serde(rename = "type", default)]
    kind: FeatureTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub geometry: Geometry,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: PersonProperties,
}

impl PersonFeature {
    pub fn new(longitude: f64, latitude: f64, purchase_year: Option<i32>) -> Self {
        Self {
            kind: FeatureTag::Feature,
            id: None,
            geometry: Geometry::point(longitude, latitude),
            properties: PersonProperties {
                purchase_year,
                extra: Map::new(),
            },
        }
    }

    pub fn coordinates(&self) -> [f64; 2] {
        self.geometry.coordinates()
    }

    pub fn purchase_year(&self) -> Option<i32> {
        self.properties.purchase_year
    }
}

/// An ordered set of people
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeopleFeatureCollection {
    #[serde(rename = "type", default)]
    kind: CollectionTag,
    pub features: Vec<PersonFeature>,
}

impl PeopleFeatureCollection {
    pub fn new(features: Vec<PersonFeature>) -> Self {
        Self {
            kind: CollectionTag::FeatureCollection,
            features,
        }
    }

    /// Concatenate collections, keeping their order
    pub fn concat<I>(collections: I) -> Self
    where
        I: IntoIterator<Item = PeopleFeatureCollection>,
    {
        Self::new(
            collections
                .into_iter()
                .flat_map(|collection| collection.features)
                .collect(),
        )
    }

    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "a1",
                "geometry": { "type": "Point", "coordinates": [-79.38, 43.65] },
                "properties": { "purchaseYear": 2017, "name": "Ada" }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [2.35, 48.85] },
                "properties": {}
            }
        ]
    }"#;

    #[test]
    fn test_parse_page() {
        let collection = PeopleFeatureCollection::from_json(PAGE).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.features[0].purchase_year(), Some(2017));
        assert_eq!(collection.features[0].coordinates(), [-79.38, 43.65]);
        assert_eq!(collection.features[1].purchase_year(), None);
    }

    #[test]
    fn test_extra_properties_preserved() {
        let collection = PeopleFeatureCollection::from_json(PAGE).unwrap();
        let json = collection.to_json_pretty().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["id"], "a1");
        assert_eq!(value["features"][0]["properties"]["name"], "Ada");
        assert_eq!(value["features"][0]["properties"]["purchaseYear"], 2017);
        assert!(value["features"][1]["properties"]
            .get("purchaseYear")
            .is_none());
    }

    #[test]
    fn test_missing_properties_defaults() {
        let json = r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]}}"#;
        let feature: PersonFeature = serde_json::from_str(json).unwrap();
        assert_eq!(feature.purchase_year(), None);
        assert_eq!(feature.coordinates(), [1.0, 2.0]);
    }

    fn year_of(properties: &str) -> Option<i32> {
        let json = format!(
            r#"{{"type":"Feature","geometry":{{"type":"Point","coordinates":[1,2]}},"properties":{}}}"#,
            properties
        );
        let feature: PersonFeature = serde_json::from_str(&json).unwrap();
        feature.purchase_year()
    }

    #[test]
    fn test_year_written_loosely() {
        assert_eq!(year_of(r#"{"purchaseYear": "2019"}"#), Some(2019));
        assert_eq!(year_of(r#"{"purchaseYear": " 2019 "}"#), Some(2019));
        assert_eq!(year_of(r#"{"purchaseYear": 2019.0}"#), Some(2019));
        assert_eq!(year_of(r#"{"purchaseYear": "2019.0"}"#), Some(2019));
    }

    #[test]
    fn test_unusable_year_is_neutral() {
        assert_eq!(year_of(r#"{"purchaseYear": "soon"}"#), None);
        assert_eq!(year_of(r#"{"purchaseYear": 2019.5}"#), None);
        assert_eq!(year_of(r#"{"purchaseYear": null}"#), None);
        assert_eq!(year_of(r#"{"purchaseYear": true}"#), None);
        assert_eq!(year_of(r#"{"purchaseYear": [2019]}"#), None);
        assert_eq!(year_of(r#"{"purchaseYear": 1e12}"#), None);
    }

    #[test]
    fn test_null_properties() {
        assert_eq!(year_of("null"), None);
    }

    #[test]
    fn test_odd_year_does_not_spoil_page() {
        let json = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"purchaseYear":"2016"}},
            {"type":"Feature","geometry":{"type":"Point","coordinates":[1,1]},"properties":null},
            {"type":"Feature","geometry":{"type":"Point","coordinates":[2,2]},"properties":{"purchaseYear":2018}}]}"#;
        let collection = PeopleFeatureCollection::from_slice(json.as_bytes()).unwrap();
        let years: Vec<Option<i32>> = collection.features.iter().map(|f| f.purchase_year()).collect();
        assert_eq!(years, vec![Some(2016), None, Some(2018)]);
    }

    #[test]
    fn test_non_point_geometry_rejected() {
        let json = r#"{"type":"FeatureCollection","features":[{"type":"Feature",
            "geometry":{"type":"LineString","coordinates":[[1,2],[3,4]]},"properties":{}}]}"#;
        assert!(PeopleFeatureCollection::from_json(json).is_err());
    }

    #[test]
    fn test_concat_keeps_order() {
        let first = PeopleFeatureCollection::new(vec![
            PersonFeature::new(0.0, 0.0, Some(2015)),
            PersonFeature::new(1.0, 1.0, Some(2016)),
        ]);
        let second = PeopleFeatureCollection::new(vec![PersonFeature::new(2.0, 2.0, None)]);
        let merged = PeopleFeatureCollection::concat(vec![first, second]);
        let years: Vec<Option<i32>> = merged.features.iter().map(|f| f.purchase_year()).collect();
        assert_eq!(years, vec![Some(2015), Some(2016), None]);
    }
}
