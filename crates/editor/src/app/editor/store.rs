use std::fmt;
use std::sync::Arc;

use editor_engine::{point_in_rect, Bitmap, DecodeTicket, Rect};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub(crate) struct BlockId(pub(crate) u64);

impl BlockId {
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<u64>().ok().map(Self)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub(crate) struct EntityId(pub(crate) u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum BlockKind {
    Block,
    Collision,
}

impl BlockKind {
    pub(crate) const CHOICES: &'static str = "block, collision";

    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw {
            "block" => Some(Self::Block),
            "collision" => Some(Self::Collision),
            _ => None,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Collision => "collision",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum BlockColor {
    #[default]
    Red,
    Blue,
}

impl BlockColor {
    pub(crate) const CHOICES: &'static str = "red, blue";

    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw {
            "red" => Some(Self::Red),
            "blue" => Some(Self::Blue),
            _ => None,
        }
    }

    pub(crate) fn rgba(self) -> [u8; 4] {
        match self {
            Self::Red => [255, 0, 0, 255],
            Self::Blue => [0, 0, 255, 255],
        }
    }
}

/// Texture attached to a block. A pending texture hides the block until its
/// decode completes; a failed decode falls back to the block color.
#[derive(Debug, Clone, Default)]
pub(crate) enum TextureState {
    #[default]
    None,
    Pending(DecodeTicket),
    Loaded(Arc<Bitmap>),
}

impl TextureState {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pending(_) => "pending",
            Self::Loaded(_) => "loaded",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Block {
    pub(crate) id: BlockId,
    pub(crate) name: String,
    pub(crate) rect: Rect,
    pub(crate) kind: BlockKind,
    pub(crate) controllable: bool,
    pub(crate) camera_locked: bool,
    pub(crate) color: BlockColor,
    pub(crate) texture: TextureState,
}

impl Block {
    pub(crate) fn is_collision(&self) -> bool {
        self.kind == BlockKind::Collision
    }
}

/// Validated output of the block creation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewBlock {
    pub(crate) name: String,
    pub(crate) rect: Rect,
    pub(crate) kind: BlockKind,
    pub(crate) color: BlockColor,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct BlockPatch {
    pub(crate) name: Option<String>,
    pub(crate) x: Option<i32>,
    pub(crate) y: Option<i32>,
    pub(crate) w: Option<i32>,
    pub(crate) h: Option<i32>,
}

impl BlockPatch {
    pub(crate) fn moved_to(x: i32, y: i32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    fn apply_to(self, block: &mut Block) -> bool {
        let before = (block.name.clone(), block.rect);
        if let Some(name) = self.name {
            block.name = name;
        }
        block.rect.x = self.x.unwrap_or(block.rect.x);
        block.rect.y = self.y.unwrap_or(block.rect.y);
        block.rect.w = self.w.unwrap_or(block.rect.w);
        block.rect.h = self.h.unwrap_or(block.rect.h);
        before != (block.name.clone(), block.rect)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum EntityKind {
    Player,
    Enemy,
}

impl EntityKind {
    pub(crate) const CHOICES: &'static str = "player, enemy";

    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw {
            "player" => Some(Self::Player),
            "enemy" => Some(Self::Enemy),
            _ => None,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Enemy => "enemy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum MovementType {
    Random,
    Static,
    Timed,
}

impl MovementType {
    pub(crate) const CHOICES: &'static str = "random, static, timed";

    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw {
            "random" => Some(Self::Random),
            "static" => Some(Self::Static),
            "timed" => Some(Self::Timed),
            _ => None,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Static => "static",
            Self::Timed => "timed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    pub(crate) const CHOICES: &'static str = "up, down, left, right";

    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Stored but never simulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct EntityRecord {
    pub(crate) id: EntityId,
    pub(crate) name: String,
    #[serde(rename = "type")]
    pub(crate) kind: EntityKind,
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) w: i32,
    pub(crate) h: i32,
    pub(crate) movement: Option<MovementType>,
    pub(crate) health: Option<u32>,
    pub(crate) attack_damage: Option<u32>,
    pub(crate) direction: Option<Facing>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewEntity {
    pub(crate) name: String,
    pub(crate) rect: Rect,
    pub(crate) kind: EntityKind,
    pub(crate) movement: Option<MovementType>,
    pub(crate) health: Option<u32>,
    pub(crate) attack_damage: Option<u32>,
    pub(crate) direction: Option<Facing>,
}

/// Ordered block collection plus everything else the editor edits.
///
/// Collection order is draw order. Every visible mutation bumps `revision`,
/// which is how the scene notices it has to re-run camera follow and redraw.
/// Operations naming an id that is not present do nothing and report `false`.
#[derive(Debug, Default)]
pub(crate) struct SceneStore {
    blocks: Vec<Block>,
    entities: Vec<EntityRecord>,
    next_block_id: u64,
    next_entity_id: u64,
    selected: Option<BlockId>,
    background: Option<Arc<Bitmap>>,
    pending_background: Option<DecodeTicket>,
    revision: u64,
}

impl SceneStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub(crate) fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub(crate) fn add_block(&mut self, form: NewBlock) -> BlockId {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        info!(
            id = id.0,
            name = %form.name,
            kind = form.kind.as_str(),
            x = form.rect.x,
            y = form.rect.y,
            w = form.rect.w,
            h = form.rect.h,
            "block_created"
        );
        self.blocks.push(Block {
            id,
            name: form.name,
            rect: form.rect,
            kind: form.kind,
            controllable: false,
            camera_locked: false,
            color: form.color,
            texture: TextureState::None,
        });
        self.touch();
        id
    }

    pub(crate) fn update_block(&mut self, id: BlockId, patch: BlockPatch) -> bool {
        let Some(block) = self.block_mut(id) else {
            debug!(id = id.0, "update_block_missing");
            return false;
        };
        if patch.apply_to(block) {
            self.touch();
        }
        true
    }

    pub(crate) fn delete_block(&mut self, id: BlockId) -> bool {
        let Some(index) = self.blocks.iter().position(|block| block.id == id) else {
            debug!(id = id.0, "delete_block_missing");
            return false;
        };
        self.blocks.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        info!(id = id.0, "block_deleted");
        self.touch();
        true
    }

    pub(crate) fn set_controllable(&mut self, id: BlockId, controllable: bool) -> bool {
        let Some(block) = self.block_mut(id) else {
            debug!(id = id.0, "set_controllable_missing");
            return false;
        };
        if block.controllable != controllable {
            block.controllable = controllable;
            self.touch();
        }
        true
    }

    /// Locking one block unlocks every other block in the same call.
    pub(crate) fn set_camera_locked(&mut self, id: BlockId, locked: bool) -> bool {
        if self.block(id).is_none() {
            debug!(id = id.0, "set_camera_locked_missing");
            return false;
        }
        let mut changed = false;
        for block in &mut self.blocks {
            let next = if block.id == id {
                locked
            } else {
                block.camera_locked && !locked
            };
            if block.camera_locked != next {
                block.camera_locked = next;
                changed = true;
            }
        }
        if changed {
            info!(id = id.0, locked, "camera_lock_changed");
            self.touch();
        }
        true
    }

    pub(crate) fn camera_locked_block(&self) -> Option<&Block> {
        self.blocks.iter().find(|block| block.camera_locked)
    }

    pub(crate) fn set_texture_pending(&mut self, id: BlockId, ticket: DecodeTicket) -> bool {
        let Some(block) = self.block_mut(id) else {
            debug!(id = id.0, "set_texture_missing");
            return false;
        };
        block.texture = TextureState::Pending(ticket);
        self.touch();
        true
    }

    /// Applies a finished decode to whichever block still waits on `ticket`.
    /// `None` means the decode failed and the block goes back to its color.
    pub(crate) fn complete_texture(
        &mut self,
        ticket: DecodeTicket,
        bitmap: Option<Arc<Bitmap>>,
    ) -> bool {
        let Some(block) = self
            .blocks
            .iter_mut()
            .find(|block| matches!(block.texture, TextureState::Pending(pending) if pending == ticket))
        else {
            return false;
        };
        block.texture = match bitmap {
            Some(bitmap) => TextureState::Loaded(bitmap),
            None => TextureState::None,
        };
        debug!(id = block.id.0, ticket = ticket.0, texture = block.texture.label(), "texture_applied");
        self.touch();
        true
    }

    pub(crate) fn background(&self) -> Option<&Arc<Bitmap>> {
        self.background.as_ref()
    }

    /// The previous background stays visible until the new one decodes.
    pub(crate) fn set_background_pending(&mut self, ticket: DecodeTicket) {
        self.pending_background = Some(ticket);
    }

    pub(crate) fn complete_background(
        &mut self,
        ticket: DecodeTicket,
        bitmap: Option<Arc<Bitmap>>,
    ) -> bool {
        if self.pending_background != Some(ticket) {
            return false;
        }
        self.pending_background = None;
        if let Some(bitmap) = bitmap {
            info!(
                width = bitmap.width(),
                height = bitmap.height(),
                "background_applied"
            );
            self.background = Some(bitmap);
            self.touch();
        }
        true
    }

    pub(crate) fn selected(&self) -> Option<BlockId> {
        self.selected
    }

    /// Selecting an id that is not present leaves the selection unchanged.
    pub(crate) fn select(&mut self, id: Option<BlockId>) -> bool {
        if let Some(id) = id {
            if self.block(id).is_none() {
                debug!(id = id.0, "select_missing");
                return false;
            }
        }
        if self.selected != id {
            self.selected = id;
            self.touch();
        }
        true
    }

    /// First block in collection order whose rectangle contains the point.
    pub(crate) fn hit_test(&self, x: i32, y: i32) -> Option<BlockId> {
        self.blocks
            .iter()
            .find(|block| point_in_rect(&block.rect, x, y))
            .map(|block| block.id)
    }

    pub(crate) fn add_entity(&mut self, form: NewEntity) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        info!(id = id.0, name = %form.name, kind = form.kind.as_str(), "entity_created");
        self.entities.push(EntityRecord {
            id,
            name: form.name,
            kind: form.kind,
            x: form.rect.x,
            y: form.rect.y,
            w: form.rect.w,
            h: form.rect.h,
            movement: form.movement,
            health: form.health,
            attack_damage: form.attack_damage,
            direction: form.direction,
        });
        id
    }

    pub(crate) fn entities(&self) -> &[EntityRecord] {
        &self.entities
    }

    fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|block| block.id == id)
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
