//! Scene persistence
//!
//! A scene saves as an ordered array of item records; the array order is the
//! paint order. Loading replaces the scene's items, resolving each record's
//! source by name. Records whose source can't be found are skipped.

use crate::error::SceneError;
use crate::item::SceneItem;
use crate::scene::Scene;
use crate::source::SourceResolver;
use crate::types::ItemTransform;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const ITEMS_KEY: &str = "items";

/// Serialized 2-vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2Data {
    pub x: f32,
    pub y: f32,
}

impl Vec2Data {
    fn one() -> Self {
        Vec2::ONE.into()
    }
}

impl Default for Vec2Data {
    fn default() -> Self {
        Vec2::ZERO.into()
    }
}

impl From<Vec2> for Vec2Data {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Vec2Data> for Vec2 {
    fn from(v: Vec2Data) -> Self {
        Vec2::new(v.x, v.y)
    }
}

fn default_visible() -> bool {
    true
}

/// Saved state of one scene item
///
/// Missing fields load as a freshly added item would have them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneItemData {
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub rot: f64,
    #[serde(default)]
    pub origin: Vec2Data,
    #[serde(default)]
    pub pos: Vec2Data,
    #[serde(default = "Vec2Data::one")]
    pub scale: Vec2Data,
}

impl SceneItemData {
    fn from_item(item: &SceneItem) -> Self {
        let t = item.transform();
        Self {
            name: item.name().to_string(),
            visible: item.visible(),
            rot: f64::from(t.rot),
            origin: t.origin.into(),
            pos: t.pos.into(),
            scale: t.scale.into(),
        }
    }

    fn apply_to(&self, item: &SceneItem) {
        let applied = item.set_transform(ItemTransform {
            pos: self.pos.into(),
            scale: self.scale.into(),
            origin: self.origin.into(),
            rot: self.rot as f32,
        });
        if !applied {
            log::warn!("item '{}' has an out of range transform, keeping defaults", self.name);
        }
        item.set_visible(self.visible);
    }
}

#[derive(Serialize, Deserialize)]
struct SceneData {
    items: Vec<SceneItemData>,
}

/// Outcome of loading a scene
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Number of items added
    pub loaded: usize,
    /// Names of sources that couldn't be resolved, in record order
    pub skipped: Vec<String>,
}

impl LoadSummary {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

impl Scene {
    /// Item records in paint order
    pub fn save(&self) -> Vec<SceneItemData> {
        let mut records = Vec::with_capacity(self.item_count());
        self.inner().walk(|item| {
            records.push(SceneItemData::from_item(item));
            true
        });
        records
    }

    /// Scene settings object: `{"items": [...]}`
    pub fn save_settings(&self) -> Result<Value, SceneError> {
        let data = SceneData { items: self.save() };
        Ok(serde_json::to_value(data)?)
    }

    pub fn to_json(&self) -> Result<String, SceneError> {
        let data = SceneData { items: self.save() };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Replace the scene's items with the given records
    ///
    /// Records whose source can't be resolved or added are logged and
    /// skipped; the rest still load, in order.
    pub fn load(&self, records: &[SceneItemData], resolver: &dyn SourceResolver) -> LoadSummary {
        self.remove_all();

        let mut summary = LoadSummary::default();
        for record in records {
            match self.add_by_name(&record.name, resolver) {
                Ok(item) => {
                    record.apply_to(&item);
                    summary.loaded += 1;
                }
                Err(err) => {
                    log::warn!("[scene '{}'] {}, skipping item", self.name(), err);
                    summary.skipped.push(record.name.clone());
                }
            }
        }

        log::debug!(
            "scene '{}' loaded {} items ({} skipped)",
            self.name(),
            summary.loaded,
            summary.skipped.len()
        );
        summary
    }

    /// Load from a settings object produced by [`Scene::save_settings`]
    ///
    /// Records are decoded before anything changes: malformed data returns
    /// [`SceneError::InvalidData`] and leaves the scene as it was. A settings
    /// object without an `items` array loads as an empty scene.
    pub fn load_settings(
        &self,
        settings: &Value,
        resolver: &dyn SourceResolver,
    ) -> Result<LoadSummary, SceneError> {
        let records = match settings.get(ITEMS_KEY) {
            Some(items) => Vec::<SceneItemData>::deserialize(items)?,
            None => Vec::new(),
        };
        Ok(self.load(&records, resolver))
    }

    /// Load from a JSON settings string
    ///
    /// Same rules as [`Scene::load_settings`]; text that isn't JSON also
    /// leaves the scene untouched.
    pub fn load_json(
        &self,
        json: &str,
        resolver: &dyn SourceResolver,
    ) -> Result<LoadSummary, SceneError> {
        let settings: Value = serde_json::from_str(json)?;
        self.load_settings(&settings, resolver)
    }
}
