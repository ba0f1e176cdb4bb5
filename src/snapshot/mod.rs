//! Board snapshots: manifest plus assets.
//!
//! A snapshot is how every replica gets an identical board before
//! networking starts. It holds a JSON manifest (one record per object,
//! tagged by `type`) and the bytes of every asset the manifest references,
//! keyed by path. The archive itself is bincode-encoded; on the wire it
//! travels as base64 inside `get_game_state`.
//!
//! ## Load order
//!
//! Records reference each other by id, so loading runs in three passes:
//!
//! 1. images
//! 2. holders and hands (their decks name images)
//! 3. buttons and dice (buttons name holders, hands and images)
//!
//! Within a pass, manifest order is kept. A reference to an id that is not
//! loaded yet is an `UnknownId` error.

use std::collections::{BTreeMap, BTreeSet};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{ObjectId, Rect, Result, Rotation, TableError, World};
use crate::objects::{BoardObject, ButtonAction, Dice, Image, ObjectKind};

/// One object in the manifest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectRecord {
    Image {
        id: ObjectId,
        rect: Rect,
        z_index: i64,
        #[serde(default)]
        rotation: Rotation,
        draggable: bool,
        rotatable: bool,
        front_path: String,
        #[serde(default)]
        back_path: Option<String>,
        is_front: bool,
    },
    Holder {
        id: ObjectId,
        rect: Rect,
        z_index: i64,
        deck: Vec<ObjectId>,
    },
    PlayerHand {
        id: ObjectId,
        rect: Rect,
        z_index: i64,
        #[serde(default)]
        owner: String,
        deck: Vec<ObjectId>,
    },
    ShuffleButton {
        id: ObjectId,
        rect: Rect,
        z_index: i64,
        holder_id: ObjectId,
    },
    RetrieveButton {
        id: ObjectId,
        rect: Rect,
        z_index: i64,
        holder_id: ObjectId,
        images_to_retrieve: Vec<ObjectId>,
    },
    SitButton {
        id: ObjectId,
        rect: Rect,
        z_index: i64,
        hand_id: ObjectId,
        #[serde(default = "visible")]
        render: bool,
    },
    Dice {
        id: ObjectId,
        rect: Rect,
        z_index: i64,
        #[serde(default)]
        rotation: Rotation,
        draggable: bool,
        rotatable: bool,
        faces: Vec<String>,
        current_face: usize,
    },
}

fn visible() -> bool {
    true
}

impl ObjectRecord {
    #[must_use]
    pub fn id(&self) -> ObjectId {
        match self {
            ObjectRecord::Image { id, .. }
            | ObjectRecord::Holder { id, .. }
            | ObjectRecord::PlayerHand { id, .. }
            | ObjectRecord::ShuffleButton { id, .. }
            | ObjectRecord::RetrieveButton { id, .. }
            | ObjectRecord::SitButton { id, .. }
            | ObjectRecord::Dice { id, .. } => *id,
        }
    }

    /// Load pass this record belongs to.
    fn pass(&self) -> u8 {
        match self {
            ObjectRecord::Image { .. } => 0,
            ObjectRecord::Holder { .. } | ObjectRecord::PlayerHand { .. } => 1,
            _ => 2,
        }
    }

    /// Describe a live object.
    #[must_use]
    pub fn capture(obj: &BoardObject) -> Self {
        let (id, rect, z_index) = (obj.id, obj.rect, obj.z_index);
        match &obj.kind {
            ObjectKind::Image(image) => ObjectRecord::Image {
                id,
                rect,
                z_index,
                rotation: obj.rotation,
                draggable: obj.draggable,
                rotatable: obj.rotatable,
                front_path: image.front_path.clone(),
                back_path: image.back_path.clone(),
                is_front: image.is_front,
            },
            ObjectKind::Dice(dice) => ObjectRecord::Dice {
                id,
                rect,
                z_index,
                rotation: obj.rotation,
                draggable: obj.draggable,
                rotatable: obj.rotatable,
                faces: dice.faces.clone(),
                current_face: dice.current_face,
            },
            ObjectKind::Holder(holder) => ObjectRecord::Holder { id, rect, z_index, deck: holder.to_vec() },
            ObjectKind::Hand(hand) => ObjectRecord::PlayerHand {
                id,
                rect,
                z_index,
                owner: hand.owner.clone(),
                deck: hand.to_vec(),
            },
            ObjectKind::Button(button) => match &button.action {
                ButtonAction::Shuffle { holder } => ObjectRecord::ShuffleButton { id, rect, z_index, holder_id: *holder },
                ButtonAction::Retrieve { holder, images } => ObjectRecord::RetrieveButton {
                    id,
                    rect,
                    z_index,
                    holder_id: *holder,
                    images_to_retrieve: images.clone(),
                },
                ButtonAction::Sit { hand } => ObjectRecord::SitButton {
                    id,
                    rect,
                    z_index,
                    hand_id: *hand,
                    render: obj.render,
                },
            },
        }
    }

    /// Build the object and register it, wiring container membership.
    fn load_into(&self, world: &mut World) -> Result<()> {
        match self {
            ObjectRecord::Image {
                id,
                rect,
                z_index,
                rotation,
                draggable,
                rotatable,
                front_path,
                back_path,
                is_front,
            } => {
                let mut image = match back_path {
                    Some(back) => Image::two_sided(front_path.clone(), back.clone()),
                    None => Image::single(front_path.clone()),
                };
                image.set_front(*is_front);
                let obj = BoardObject::image(*id, *rect, image)
                    .with_flags(*draggable, *rotatable)
                    .with_z_index(*z_index)
                    .with_rotation(*rotation);
                world.register(obj)
            }
            ObjectRecord::Dice {
                id,
                rect,
                z_index,
                rotation,
                draggable,
                rotatable,
                faces,
                current_face,
            } => {
                let mut dice = Dice::new(faces.clone());
                dice.set_face(*current_face);
                let obj = BoardObject::dice(*id, *rect, dice)
                    .with_flags(*draggable, *rotatable)
                    .with_z_index(*z_index)
                    .with_rotation(*rotation);
                world.register(obj)
            }
            ObjectRecord::Holder { id, rect, z_index, deck } => {
                world.register(BoardObject::holder(*id, *rect).with_z_index(*z_index))?;
                for image in deck {
                    world.add_to_holder(*id, *image)?;
                }
                Ok(())
            }
            ObjectRecord::PlayerHand { id, rect, z_index, owner, deck } => {
                world.register(BoardObject::hand(*id, *rect, owner.clone()).with_z_index(*z_index))?;
                for (index, image) in deck.iter().enumerate() {
                    world.add_to_hand(*id, *image, index)?;
                }
                Ok(())
            }
            ObjectRecord::ShuffleButton { id, rect, z_index, holder_id } => {
                world.holder(*holder_id)?;
                let action = ButtonAction::Shuffle { holder: *holder_id };
                world.register(BoardObject::button(*id, *rect, action).with_z_index(*z_index))
            }
            ObjectRecord::RetrieveButton {
                id,
                rect,
                z_index,
                holder_id,
                images_to_retrieve,
            } => {
                world.holder(*holder_id)?;
                for image in images_to_retrieve {
                    world.image(*image)?;
                }
                let action = ButtonAction::Retrieve {
                    holder: *holder_id,
                    images: images_to_retrieve.clone(),
                };
                world.register(BoardObject::button(*id, *rect, action).with_z_index(*z_index))
            }
            ObjectRecord::SitButton { id, rect, z_index, hand_id, render } => {
                world.hand(*hand_id)?;
                let action = ButtonAction::Sit { hand: *hand_id };
                let mut obj = BoardObject::button(*id, *rect, action).with_z_index(*z_index);
                obj.render = *render;
                world.register(obj)
            }
        }
    }

    /// Asset paths the record references.
    fn asset_paths(&self) -> Vec<&str> {
        match self {
            ObjectRecord::Image { front_path, back_path, .. } => {
                std::iter::once(front_path.as_str()).chain(back_path.as_deref()).collect()
            }
            ObjectRecord::Dice { faces, .. } => faces.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

/// Every object on the board.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub objects: Vec<ObjectRecord>,
}

impl Manifest {
    /// Describe every object in registration order.
    #[must_use]
    pub fn capture(world: &World) -> Self {
        Self {
            objects: world.iter().map(ObjectRecord::capture).collect(),
        }
    }

    /// Build a world in the three-pass load order.
    pub fn build_world(&self, local_name: &str) -> Result<World> {
        let mut world = World::new(local_name);
        for pass in 0..3 {
            for record in self.objects.iter().filter(|r| r.pass() == pass) {
                record.load_into(&mut world)?;
            }
        }
        world.restart_z_counter();
        Ok(world)
    }

    /// Every asset path referenced, deduplicated and sorted.
    #[must_use]
    pub fn asset_paths(&self) -> BTreeSet<String> {
        self.objects
            .iter()
            .flat_map(ObjectRecord::asset_paths)
            .map(str::to_string)
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Where exported asset bytes come from.
pub trait AssetSource {
    fn fetch(&self, path: &str) -> Option<Vec<u8>>;
}

impl AssetSource for BTreeMap<String, Vec<u8>> {
    fn fetch(&self, path: &str) -> Option<Vec<u8>> {
        self.get(path).cloned()
    }
}

/// Manifest plus asset bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotArchive {
    /// The manifest as JSON.
    pub manifest: String,
    /// Asset bytes keyed by the path records use.
    pub assets: BTreeMap<String, Vec<u8>>,
}

impl SnapshotArchive {
    /// Capture a world together with every asset it references.
    pub fn export(world: &World, assets: &dyn AssetSource) -> Result<Self> {
        let manifest = Manifest::capture(world);
        let mut bytes = BTreeMap::new();
        for path in manifest.asset_paths() {
            let data = assets
                .fetch(&path)
                .ok_or_else(|| TableError::Snapshot(format!("missing asset {path}")))?;
            bytes.insert(path, data);
        }
        debug!(objects = manifest.objects.len(), assets = bytes.len(), "archive built");
        Ok(Self {
            manifest: manifest.to_json()?,
            assets: bytes,
        })
    }

    pub fn manifest(&self) -> Result<Manifest> {
        Manifest::from_json(&self.manifest)
    }

    /// Build a world for `local_name` from the archive.
    pub fn load(&self, local_name: &str) -> Result<World> {
        let manifest = self.manifest()?;
        if let Some(missing) = manifest.asset_paths().into_iter().find(|p| !self.assets.contains_key(p)) {
            return Err(TableError::Snapshot(format!("archive lacks asset {missing}")));
        }
        manifest.build_world(local_name)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Wire form used by `get_game_state`.
    pub fn to_base64(&self) -> Result<String> {
        Ok(STANDARD.encode(self.to_bytes()?))
    }

    pub fn from_base64(encoded: &str) -> Result<Self> {
        Self::from_bytes(&STANDARD.decode(encoded)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets() -> BTreeMap<String, Vec<u8>> {
        ["f.png", "b.png", "d1.png", "d2.png"]
            .iter()
            .map(|p| (p.to_string(), p.as_bytes().to_vec()))
            .collect()
    }

    fn world() -> World {
        let mut w = World::new("alice");
        for i in 0..3 {
            w.register(
                BoardObject::image(ObjectId(i), Rect::new(10 * i as i32, 0, 50, 70), Image::two_sided("f.png", "b.png"))
                    .with_z_index(i as i64),
            )
            .unwrap();
        }
        w.register(BoardObject::holder(ObjectId(3), Rect::new(200, 0, 60, 80))).unwrap();
        w.register(BoardObject::hand(ObjectId(4), Rect::new(0, 300, 400, 100), "alice")).unwrap();
        w.register(BoardObject::button(ObjectId(5), Rect::new(0, 0, 40, 20), ButtonAction::Shuffle { holder: ObjectId(3) }))
            .unwrap();
        w.register(
            BoardObject::dice(ObjectId(6), Rect::new(0, 0, 40, 40), Dice::new(vec!["d1.png".into(), "d2.png".into()]))
                .with_z_index(9),
        )
        .unwrap();
        w.add_to_holder(ObjectId(3), ObjectId(1)).unwrap();
        w.add_to_holder(ObjectId(3), ObjectId(0)).unwrap();
        w.add_to_hand(ObjectId(4), ObjectId(2), 0).unwrap();
        w
    }

    #[test]
    fn test_manifest_type_tags() {
        let manifest = Manifest::capture(&world());
        let value: serde_json::Value = serde_json::from_str(&manifest.to_json().unwrap()).unwrap();
        let tags: Vec<_> = value["objects"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["type"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(tags, vec!["image", "image", "image", "holder", "player_hand", "shuffle_button", "dice"]);
    }

    #[test]
    fn test_load_restores_membership() {
        let archive = SnapshotArchive::export(&world(), &assets()).unwrap();
        let loaded = archive.load("bob").unwrap();

        assert_eq!(loaded.holder(ObjectId(3)).unwrap().to_vec(), vec![ObjectId(1), ObjectId(0)]);
        assert_eq!(loaded.hand(ObjectId(4)).unwrap().to_vec(), vec![ObjectId(2)]);
        assert!(!loaded.resolve(ObjectId(0)).unwrap().render);
        // bob is not the hand owner
        assert!(!loaded.image(ObjectId(2)).unwrap().is_front);
    }

    #[test]
    fn test_z_counter_restarts_above_max() {
        let archive = SnapshotArchive::export(&world(), &assets()).unwrap();
        let mut loaded = archive.load("alice").unwrap();
        assert_eq!(loaded.next_z(), 10);
    }

    #[test]
    fn test_load_order_independent_of_manifest_order() {
        let mut manifest = Manifest::capture(&world());
        manifest.objects.reverse();
        let archive = SnapshotArchive {
            manifest: manifest.to_json().unwrap(),
            assets: assets(),
        };
        let loaded = archive.load("alice").unwrap();
        assert_eq!(loaded.len(), 7);
    }

    #[test]
    fn test_dangling_reference_fails() {
        let manifest = Manifest {
            objects: vec![ObjectRecord::Holder {
                id: ObjectId(1),
                rect: Rect::new(0, 0, 10, 10),
                z_index: 0,
                deck: vec![ObjectId(42)],
            }],
        };
        assert!(matches!(manifest.build_world("alice"), Err(TableError::UnknownId(ObjectId(42)))));
    }

    #[test]
    fn test_missing_asset() {
        let mut partial = assets();
        partial.remove("d2.png");
        let err = SnapshotArchive::export(&world(), &partial).unwrap_err();
        assert!(matches!(err, TableError::Snapshot(_)));
    }

    #[test]
    fn test_base64_wire_form() {
        let archive = SnapshotArchive::export(&world(), &assets()).unwrap();
        let encoded = archive.to_base64().unwrap();
        assert_eq!(SnapshotArchive::from_base64(&encoded).unwrap(), archive);
        assert!(SnapshotArchive::from_base64("***").is_err());
    }
}
