//! Conversion of flat records into a GeoJSON `FeatureCollection`.
//!
//! Feature ids are 32-bit MurmurHash3 digests of the record's `alertID`.
//! Some upstream alert ids are numeric strings too large for the vector tile
//! encoder's varint ids, so the raw id is kept as a property and the hash is
//! used as the feature id. The algorithm, seed and input encoding (UTF-8
//! bytes, seed 0) must not change: cached tiles and clients key on these ids.

use serde_json::Value;

use crate::geometry::geometry_coordinates;
use crate::logging::{self, Component};
use crate::model::{DataEntry, FIELD_ALERT_ID, Feature, FeatureCollection, GEOMETRY_PREFIX};

const MURMUR_C1: u32 = 0xcc9e_2d51;
const MURMUR_C2: u32 = 0x1b87_3593;

/// MurmurHash3 (x86, 32-bit) of `key`.
pub fn murmur3_32(key: &[u8], seed: u32) -> u32 {
    let mut h = seed;
    let mut blocks = key.chunks_exact(4);

    for block in blocks.by_ref() {
        let mut k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        k = k.wrapping_mul(MURMUR_C1).rotate_left(15).wrapping_mul(MURMUR_C2);
        h ^= k;
        h = h.rotate_left(13).wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut k = 0u32;
        for (i, byte) in tail.iter().enumerate() {
            k ^= (*byte as u32) << (8 * i);
        }
        k = k.wrapping_mul(MURMUR_C1).rotate_left(15).wrapping_mul(MURMUR_C2);
        h ^= k;
    }

    h ^= key.len() as u32;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Feature id for an alert identifier.
pub fn feature_id(alert_id: &str) -> u32 {
    murmur3_32(alert_id.as_bytes(), 0)
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Builds one feature per entry.
///
/// `g__`-prefixed keys feed the geometry (`g__type` → `type`,
/// `g__coordinates` → `coordinates`, parsed when given as JSON text); every
/// other key, `alertID` included, is copied into `properties`.
pub fn transform_to_geojson(data: &[DataEntry]) -> FeatureCollection {
    let features = data.iter().map(to_feature).collect();
    FeatureCollection::new(features)
}

fn to_feature(entry: &DataEntry) -> Feature {
    let mut feature = Feature::empty();

    for (key, value) in entry {
        if key == FIELD_ALERT_ID {
            feature.id = id_text(value).map(|id| feature_id(&id));
            feature.properties.insert(key.clone(), value.clone());
            continue;
        }

        match key.strip_prefix(GEOMETRY_PREFIX) {
            Some("type") => {
                feature.geometry.kind = value.as_str().map(String::from);
            }
            Some("coordinates") => {
                feature.geometry.coordinates = match value {
                    Value::Null => None,
                    _ => geometry_coordinates(entry).ok(),
                };
            }
            Some(other) => {
                logging::debug(
                    Component::GeoJson,
                    None,
                    &format!("ignoring unknown geometry field g__{}", other),
                );
            }
            None => {
                feature.properties.insert(key.clone(), value.clone());
            }
        }
    }

    feature
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<DataEntry> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_murmur3_reference_vectors() {
        assert_eq!(murmur3_32(b"", 0), 0);
        assert_eq!(murmur3_32(b"", 1), 0x514e_28b7);
        assert_eq!(murmur3_32(b"test", 0), 0xba6b_d213);
        assert_eq!(murmur3_32(b"Hello, world!", 1234), 0xfaf6_cdb3);
        assert_eq!(
            murmur3_32(b"The quick brown fox jumps over the lazy dog", 0),
            0x2e4f_f723
        );
    }

    #[test]
    fn test_feature_per_entry_with_geometry_split_out() {
        let data = rows(json!([
            {
                "alertID": "202311001",
                "g__type": "Point",
                "g__coordinates": "[-54.2, 3.1]",
                "territory": "Upper River"
            },
            { "name": "no alert id" }
        ]));

        let collection = transform_to_geojson(&data);
        assert_eq!(collection.features.len(), data.len());

        let first = &collection.features[0];
        assert_eq!(first.geometry.kind.as_deref(), Some("Point"));
        assert_eq!(first.geometry.coordinates, Some(json!([-54.2, 3.1])));
        assert_eq!(first.properties["alertID"], "202311001");
        assert_eq!(first.properties["territory"], "Upper River");
        assert!(!first.properties.contains_key("g__type"));
        assert_eq!(first.id, Some(feature_id("202311001")));

        assert_eq!(collection.features[1].id, None);
    }

    #[test]
    fn test_ids_are_stable_across_calls() {
        let data = rows(json!([{ "alertID": "98765432109876543210" }]));
        let a = transform_to_geojson(&data);
        let b = transform_to_geojson(&data);
        assert_eq!(a.features[0].id, b.features[0].id);
        assert!(a.features[0].id.is_some());
    }

    #[test]
    fn test_numeric_alert_id_hashes_its_text() {
        let data = rows(json!([{ "alertID": 42 }]));
        let collection = transform_to_geojson(&data);
        assert_eq!(collection.features[0].id, Some(feature_id("42")));
    }

    #[test]
    fn test_bad_coordinates_are_left_empty() {
        let data = rows(json!([{ "g__type": "Point", "g__coordinates": "[1," }]));
        assert!(geometry_coordinates(&data[0]).is_err());
        let collection = transform_to_geojson(&data);
        assert_eq!(collection.features.len(), 1);
        assert_eq!(collection.features[0].geometry.coordinates, None);
    }

    #[test]
    fn test_comma_separated_coordinates_become_an_array() {
        let data = rows(json!([{ "g__type": "Point", "g__coordinates": "-54.2, 3.1" }]));
        let collection = transform_to_geojson(&data);
        assert_eq!(collection.features[0].geometry.coordinates, Some(json!([-54.2, 3.1])));
    }

    #[test]
    fn test_properties_keep_record_column_order() {
        let data: Vec<DataEntry> = serde_json::from_str(
            r#"[{"zeta":1,"g__type":"Point","g__coordinates":"[1,2]","alpha":2,"alertID":"a"}]"#,
        )
        .unwrap();
        let collection = transform_to_geojson(&data);
        let names: Vec<&str> = collection.features[0]
            .properties
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "alertID"]);
    }

    #[test]
    fn test_serializes_as_geojson() {
        let data = rows(json!([{ "alertID": "a1", "g__type": "Point", "g__coordinates": [1, 2] }]));
        let json = serde_json::to_value(transform_to_geojson(&data)).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["type"], "Feature");
        assert_eq!(json["features"][0]["geometry"]["type"], "Point");
        assert!(json["features"][0]["id"].is_u64());
    }
}
