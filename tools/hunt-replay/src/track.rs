use std::path::Path;

use anyhow::{Context, Result};
use geojson::GeoJson;
use yessplora_core::hunt::LocationSample;

/// Accuracy reported for replayed fixes, in meters
const REPLAY_ACCURACY_M: f64 = 5.0;

/// Read every position in a GeoJSON file, in file order
pub fn read_track(path: &Path, interval_ms: i64) -> Result<Vec<LocationSample>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read track file: {}", path.display()))?;

    let geojson: GeoJson = content
        .parse()
        .with_context(|| format!("Failed to parse GeoJSON from: {}", path.display()))?;

    Ok(track_positions(geojson, interval_ms))
}

fn track_positions(geojson: GeoJson, interval_ms: i64) -> Vec<LocationSample> {
    let mut positions = Vec::new();
    match geojson {
        GeoJson::Geometry(geom) => collect_positions(geom.value, &mut positions),
        GeoJson::Feature(feature) => {
            if let Some(geom) = feature.geometry {
                collect_positions(geom.value, &mut positions);
            }
        }
        GeoJson::FeatureCollection(fc) => {
            for geom in fc.features.into_iter().filter_map(|f| f.geometry) {
                collect_positions(geom.value, &mut positions);
            }
        }
    }

    positions
        .into_iter()
        .zip(0i64..)
        .map(|((lon, lat), i)| LocationSample::new(lat, lon, REPLAY_ACCURACY_M, i * interval_ms))
        .collect()
}

/// Append (lon, lat) pairs. Areas are not tracks and are ignored.
fn collect_positions(value: geojson::Value, out: &mut Vec<(f64, f64)>) {
    let push = |out: &mut Vec<(f64, f64)>, coord: &[f64]| {
        if let [lon, lat, ..] = coord {
            out.push((*lon, *lat));
        }
    };

    match value {
        geojson::Value::Point(coord) => push(out, coord.as_slice()),
        geojson::Value::MultiPoint(coords) | geojson::Value::LineString(coords) => {
            coords.iter().for_each(|c| push(out, c.as_slice()));
        }
        geojson::Value::MultiLineString(lines) => {
            lines.iter().flatten().for_each(|c| push(out, c.as_slice()));
        }
        geojson::Value::GeometryCollection(geoms) => {
            for geom in geoms {
                collect_positions(geom.value, out);
            }
        }
        _ => log::warn!("Ignoring non-track geometry"),
    }
}
