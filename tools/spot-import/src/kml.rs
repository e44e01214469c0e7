use anyhow::{Context, Result, bail};
use roxmltree::{Document, Node};
use yessplora_spots::SpotDraft;

/// A named KML point.
#[derive(Debug, Clone, PartialEq)]
pub struct Placemark {
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Placemark {
    /// The description doubles as the task text
    pub fn into_draft(self) -> SpotDraft {
        SpotDraft::new(self.name, self.latitude, self.longitude)
            .with_task(self.description.clone())
            .with_description(self.description)
    }
}

/// Every placemark with a `Point`, at any folder depth, in document order.
/// Placemarks without a point (paths, polygons) are skipped.
pub fn read_placemarks(xml: &str) -> Result<Vec<Placemark>> {
    let doc = Document::parse(xml)?;

    let mut placemarks = Vec::new();
    for node in doc.descendants().filter(|n| n.has_tag_name("Placemark")) {
        let Some(point) = child(node, "Point") else {
            log::debug!("Skipping placemark without a point");
            continue;
        };

        let name = child_text(node, "name").unwrap_or_default();
        let coordinates = child_text(point, "coordinates")
            .with_context(|| format!("Placemark {name:?} has no coordinates"))?;
        let (longitude, latitude) = parse_coordinates(&coordinates)
            .with_context(|| format!("Placemark {name:?} has bad coordinates"))?;

        placemarks.push(Placemark {
            name,
            description: child_text(node, "description").unwrap_or_default(),
            latitude,
            longitude,
        });
    }

    Ok(placemarks)
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn child_text(node: Node, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|n| n.text())
        .map(|text| text.trim().to_string())
}

/// KML order is `lon,lat[,alt]`
fn parse_coordinates(text: &str) -> Result<(f64, f64)> {
    let mut parts = text.trim().split(',').map(str::trim);
    let (Some(lon), Some(lat)) = (parts.next(), parts.next()) else {
        bail!("expected lon,lat[,alt] but found {text:?}");
    };
    Ok((lon.parse()?, lat.parse()?))
}
