//! World manifests
//!
//! Static seed lists of world-anchored entities: collectibles, interactive
//! zones, background photographs and closing quotes. They can be authored
//! as JSON (`camelCase`, discriminated by a `type` field) and are validated
//! when loaded. The defaults reproduce the shipped story.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure while loading a level or entity manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} manifest is empty")]
    Empty(&'static str),
    #[error("duplicate id {id:?} in {list} manifest")]
    DuplicateId { list: &'static str, id: String },
    #[error("entry {id:?} is invalid: {reason}")]
    Invalid { id: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectibleKind {
    Star,
    Memory,
    Heart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Wind,
    Gravity,
    Bounce,
    Slow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoSide {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectibleSpec {
    pub id: String,
    pub world_x: f64,
    pub world_y: f64,
    #[serde(rename = "type")]
    pub kind: CollectibleKind,
}

/// Axis-aligned rectangle centered on (`world_x`, `world_y`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSpec {
    pub id: String,
    pub world_x: f64,
    pub world_y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(rename = "type")]
    pub kind: ZoneKind,
    pub strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoSpec {
    pub id: String,
    pub world_x: f64,
    pub world_y: f64,
    pub image_url: String,
    pub title: String,
    pub text: String,
    pub side: PhotoSide,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSpec {
    pub id: String,
    pub text: String,
    pub world_x: f64,
    pub world_y: f64,
}

/// Every world-anchored entity of one experience
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldManifest {
    #[serde(default)]
    pub collectibles: Vec<CollectibleSpec>,
    #[serde(default)]
    pub zones: Vec<ZoneSpec>,
    #[serde(default)]
    pub photos: Vec<PhotoSpec>,
    #[serde(default)]
    pub quotes: Vec<QuoteSpec>,
}

impl WorldManifest {
    /// Parse and validate a JSON manifest
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let manifest: WorldManifest = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Ids unique per list; coordinates finite; boxes have positive size
    pub fn validate(&self) -> Result<(), ManifestError> {
        unique_ids("collectibles", self.collectibles.iter().map(|c| c.id.as_str()))?;
        unique_ids("zones", self.zones.iter().map(|z| z.id.as_str()))?;
        unique_ids("photos", self.photos.iter().map(|p| p.id.as_str()))?;
        unique_ids("quotes", self.quotes.iter().map(|q| q.id.as_str()))?;

        for c in &self.collectibles {
            finite(&c.id, &[c.world_x, c.world_y])?;
        }
        for z in &self.zones {
            finite(&z.id, &[z.world_x, z.world_y, z.strength])?;
            positive(&z.id, z.width, z.height)?;
            if z.strength < 0.0 {
                return Err(ManifestError::Invalid {
                    id: z.id.clone(),
                    reason: format!("strength {} must be >= 0", z.strength),
                });
            }
        }
        for p in &self.photos {
            finite(&p.id, &[p.world_x, p.world_y])?;
            positive(&p.id, p.width, p.height)?;
        }
        for q in &self.quotes {
            finite(&q.id, &[q.world_x, q.world_y])?;
        }
        Ok(())
    }
}

fn unique_ids<'a>(
    list: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), ManifestError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ManifestError::DuplicateId {
                list,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

fn finite(id: &str, values: &[f64]) -> Result<(), ManifestError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ManifestError::Invalid {
            id: id.to_string(),
            reason: "coordinates must be finite".into(),
        })
    }
}

fn positive(id: &str, width: f64, height: f64) -> Result<(), ManifestError> {
    if width > 0.0 && height > 0.0 {
        Ok(())
    } else {
        Err(ManifestError::Invalid {
            id: id.to_string(),
            reason: format!("size {width}x{height} must be positive"),
        })
    }
}

/// Numeric suffix of an id like `p7` or `s3`, used as an animation phase
pub fn id_number(id: &str) -> Option<u32> {
    let digits: String = id.chars().skip_while(|c| !c.is_ascii_digit()).collect();
    digits.parse().ok()
}

impl Default for WorldManifest {
    fn default() -> Self {
        Self {
            collectibles: default_collectibles(),
            zones: default_zones(),
            photos: default_photos(),
            quotes: default_quotes(),
        }
    }
}

fn collectible(id: &str, world_x: f64, world_y: f64, kind: CollectibleKind) -> CollectibleSpec {
    CollectibleSpec {
        id: id.into(),
        world_x,
        world_y,
        kind,
    }
}

pub fn default_collectibles() -> Vec<CollectibleSpec> {
    use CollectibleKind::*;
    vec![
        collectible("s1", 500.0, 150.0, Star),
        collectible("m1", 1200.0, 200.0, Memory),
        collectible("h1", 2000.0, 180.0, Heart),
        collectible("s2", 2800.0, 220.0, Star),
        collectible("m2", 3600.0, 160.0, Memory),
        collectible("h2", 4400.0, 190.0, Heart),
        collectible("s3", 5200.0, 170.0, Star),
    ]
}

fn zone(id: &str, x: f64, y: f64, w: f64, h: f64, kind: ZoneKind, strength: f64) -> ZoneSpec {
    ZoneSpec {
        id: id.into(),
        world_x: x,
        world_y: y,
        width: w,
        height: h,
        kind,
        strength,
    }
}

pub fn default_zones() -> Vec<ZoneSpec> {
    use ZoneKind::*;
    vec![
        zone("w1", 800.0, 200.0, 200.0, 300.0, Wind, 1.0),
        zone("g1", 2200.0, 250.0, 150.0, 250.0, Gravity, 1.5),
        zone("b1", 3800.0, 200.0, 180.0, 280.0, Bounce, 2.0),
        zone("s1", 4800.0, 220.0, 200.0, 300.0, Slow, 0.5),
    ]
}

pub fn default_photos() -> Vec<PhotoSpec> {
    const STORY: [(f64, f64, &str, &str); 12] = [
        (
            400.0,
            200.0,
            "Né au Sri Lanka",
            "Une enfance marquée par la violence et l’instabilité dès la naissance.",
        ),
        (
            1100.0,
            280.0,
            "Père décédé - 3 ans",
            "Une perte précoce qui a laissé un vide profond et durable",
        ),
        (
            1800.0,
            200.0,
            "3 ans de prison",
            "Une période sombre, faite d’enfermement et de survie",
        ),
        (
            2500.0,
            260.0,
            "Évasion vers l'Inde",
            "Une fuite risquée, guidée par l’instinct de vivre libre",
        ),
        (3200.0, 200.0, "France - 2014", "Un nouveau départ, sans repères mais plein d’espoir"),
        (
            3900.0,
            270.0,
            "Apprentissage du français",
            "Un combat quotidien pour comprendre, parler et s’intégrer",
        ),
        (
            4600.0,
            200.0,
            "Loin de ma mère",
            "La séparation, car elle devait travailler pour subvenir aux besoins",
        ),
        (
            5300.0,
            250.0,
            "Vivre tout seul",
            "Grandir trop vite, apprendre à se débrouiller sans soutien",
        ),
        (
            6000.0,
            200.0,
            "Perdu à l'université",
            "Désorientation, mauvaises décisions et perte de sens",
        ),
        (
            6700.0,
            260.0,
            "Se reprendre en main",
            "Prise de conscience et volonté de changer de trajectoire",
        ),
        (
            7400.0,
            200.0,
            "Reconstruction",
            "Bâtir une stabilité, une identité et une confiance retrouvée",
        ),
        (
            8100.0,
            240.0,
            "Alternance au FCSM",
            "Un rêve d’enfant devenu réalité : travailler dans le football",
        ),
    ];

    STORY
        .iter()
        .enumerate()
        .map(|(i, &(world_x, world_y, title, text))| PhotoSpec {
            id: format!("p{}", i + 1),
            world_x,
            world_y,
            image_url: format!("/images/oli{}.jpg", i + 1),
            title: title.into(),
            text: text.into(),
            side: if i % 2 == 0 { PhotoSide::Left } else { PhotoSide::Right },
            width: 280.0,
            height: 210.0,
        })
        .collect()
}

pub fn default_quotes() -> Vec<QuoteSpec> {
    const QUOTES: [(&str, f64, f64); 10] = [
        ("Ton passé ne définit pas ton futur", 8600.0, 180.0),
        ("Chaque obstacle est une opportunité", 9000.0, 280.0),
        ("La résilience est ton super-pouvoir", 9400.0, 200.0),
        ("Crois en tes rêves, même les plus fous", 9800.0, 260.0),
        ("Tu es plus fort que tu ne le penses", 10_200.0, 220.0),
        ("L'échec n'est qu'une étape vers la réussite", 10_600.0, 190.0),
        ("Ose rêver grand, ose agir maintenant", 11_000.0, 270.0),
        ("Ta différence est ta plus grande force", 11_400.0, 210.0),
        ("Chaque jour est une nouvelle chance", 11_800.0, 240.0),
        ("N'abandonne jamais, jamais, jamais", 12_200.0, 200.0),
    ];

    QUOTES
        .iter()
        .enumerate()
        .map(|(i, &(text, world_x, world_y))| QuoteSpec {
            id: format!("q{}", i + 1),
            text: text.into(),
            world_x,
            world_y,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let manifest = WorldManifest::default();
        manifest.validate().unwrap();
        assert_eq!(manifest.collectibles.len(), 7);
        assert_eq!(manifest.zones.len(), 4);
        assert_eq!(manifest.photos.len(), 12);
        assert_eq!(manifest.quotes.len(), 10);
    }

    #[test]
    fn test_photo_sides_alternate() {
        let photos = default_photos();
        assert_eq!(photos[0].side, PhotoSide::Left);
        assert_eq!(photos[1].side, PhotoSide::Right);
        assert_eq!(photos[11].image_url, "/images/oli12.jpg");
        assert_eq!(photos[11].world_x, 8100.0);
    }

    #[test]
    fn test_json_tagged_by_type() {
        let json = r#"{
            "collectibles": [{"id": "s1", "worldX": 10, "worldY": 20, "type": "star"}],
            "zones": [{"id": "w1", "worldX": 1, "worldY": 2, "width": 10, "height": 10,
                       "type": "wind", "strength": 1}]
        }"#;
        let manifest = WorldManifest::from_json(json).unwrap();
        assert_eq!(manifest.collectibles[0].kind, CollectibleKind::Star);
        assert_eq!(manifest.zones[0].kind, ZoneKind::Wind);
        assert!(manifest.photos.is_empty());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let json = r#"{"zones": [{"id": "x", "worldX": 1, "worldY": 2, "width": 10,
                        "height": 10, "type": "tornado", "strength": 1}]}"#;
        assert!(matches!(WorldManifest::from_json(json), Err(ManifestError::Json(_))));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut manifest = WorldManifest::default();
        manifest.collectibles.push(manifest.collectibles[0].clone());
        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::DuplicateId { list: "collectibles", .. })
        ));
    }

    #[test]
    fn test_zero_sized_zone_rejected() {
        let mut manifest = WorldManifest::default();
        manifest.zones[0].width = 0.0;
        assert!(matches!(manifest.validate(), Err(ManifestError::Invalid { .. })));
    }

    #[test]
    fn test_id_number() {
        assert_eq!(id_number("p12"), Some(12));
        assert_eq!(id_number("s3"), Some(3));
        assert_eq!(id_number("none"), None);
    }
}
