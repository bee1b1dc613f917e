//! Industries placed on the map

use anyhow::{bail, Result};

use super::objects::{IndustryObject, ObjectManager};
use super::types::{IndustryId, ObjectId, TilePos, MAX_INDUSTRIES};

/// An industry in the simulation
#[derive(Debug, Clone)]
pub struct Industry {
    pub id: IndustryId,
    pub object_id: ObjectId,
    pub origin: TilePos,
    /// Construction progress; `None` once the industry is finished
    pub construction_progress: Option<u8>,
}

impl Industry {
    pub fn is_under_construction(&self) -> bool {
        self.construction_progress.is_some()
    }

    pub fn object<'a>(&self, objects: &'a ObjectManager) -> Option<&'a IndustryObject> {
        objects.industry(self.object_id)
    }
}

/// Fixed-capacity table of industries indexed by [`IndustryId`]
#[derive(Debug, Clone, Default)]
pub struct IndustryManager {
    industries: Vec<Option<Industry>>,
}

impl IndustryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a finished industry in the first free slot
    pub fn add(&mut self, object_id: ObjectId, origin: TilePos) -> Result<IndustryId> {
        let index = match self.industries.iter().position(Option::is_none) {
            Some(index) => index,
            None if self.industries.len() < MAX_INDUSTRIES => {
                self.industries.push(None);
                self.industries.len() - 1
            }
            None => bail!("Industry table is full"),
        };
        let id = IndustryId(index as u8);
        self.industries[index] = Some(Industry {
            id,
            object_id,
            origin,
            construction_progress: None,
        });
        Ok(id)
    }

    pub fn get(&self, id: IndustryId) -> Option<&Industry> {
        self.industries.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: IndustryId) -> Option<&mut Industry> {
        self.industries.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Industry> {
        self.industries.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
