use std::path::Path;

use editor_engine::{ConsoleCommandSpec, ConsoleReply};
use serde::Serialize;

use super::forms::{parse_block_form, parse_entity_form, BLOCK_FORM_USAGE, ENTITY_FORM_USAGE};
use super::store::{BlockColor, BlockId, BlockKind, EntityRecord};
use super::EditorScene;

pub(crate) const EDITOR_COMMANDS: &[ConsoleCommandSpec] = &[
    ConsoleCommandSpec {
        name: "block",
        usage: BLOCK_FORM_USAGE,
        summary: "Create a block",
    },
    ConsoleCommandSpec {
        name: "entity",
        usage: ENTITY_FORM_USAGE,
        summary: "Create an entity record",
    },
    ConsoleCommandSpec {
        name: "background",
        usage: "background <path>",
        summary: "Load a .jpg/.jpeg/.png as the tiled background",
    },
    ConsoleCommandSpec {
        name: "texture",
        usage: "texture <block_id> <path>",
        summary: "Load a .jpg/.jpeg/.png onto a block",
    },
    ConsoleCommandSpec {
        name: "list",
        usage: "list",
        summary: "List blocks",
    },
    ConsoleCommandSpec {
        name: "entities",
        usage: "entities",
        summary: "List entity records",
    },
    ConsoleCommandSpec {
        name: "select",
        usage: "select <block_id|none>",
        summary: "Select a block",
    },
    ConsoleCommandSpec {
        name: "controllable",
        usage: "controllable <block_id> <on|off>",
        summary: "Toggle keyboard control",
    },
    ConsoleCommandSpec {
        name: "camlock",
        usage: "camlock <block_id> <on|off>",
        summary: "Toggle camera follow (one block at a time)",
    },
    ConsoleCommandSpec {
        name: "delete",
        usage: "delete <block_id>",
        summary: "Delete a block",
    },
    ConsoleCommandSpec {
        name: "dump",
        usage: "dump",
        summary: "Print the scene as JSON",
    },
];

#[derive(Serialize)]
struct SceneDump<'a> {
    viewport_offset: [i32; 2],
    selected: Option<BlockId>,
    blocks: Vec<BlockDump<'a>>,
    entities: &'a [EntityRecord],
}

#[derive(Serialize)]
struct BlockDump<'a> {
    id: BlockId,
    name: &'a str,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    #[serde(rename = "type")]
    kind: BlockKind,
    color: BlockColor,
    controllable: bool,
    camera_locked: bool,
    texture: &'static str,
}

impl EditorScene {
    pub(super) fn run_command(&mut self, name: &str, args: &[String]) -> ConsoleReply {
        match name {
            "block" => self.command_block(args),
            "entity" => self.command_entity(args),
            "background" => self.command_background(args),
            "texture" => self.command_texture(args),
            "list" => self.command_list(),
            "entities" => self.command_entities(),
            "select" => self.command_select(args),
            "controllable" => self.command_flag(args, "controllable"),
            "camlock" => self.command_flag(args, "camlock"),
            "delete" => self.command_delete(args),
            "dump" => self.command_dump(),
            _ => ConsoleReply::error(format!("unknown command '{name}'")),
        }
    }

    fn command_block(&mut self, args: &[String]) -> ConsoleReply {
        match parse_block_form(args) {
            Ok(form) => {
                let name = form.name.clone();
                let id = self.store.add_block(form);
                ConsoleReply::ok(format!("created block {id} '{name}'"))
            }
            Err(errors) => ConsoleReply::errors(errors.messages()),
        }
    }

    fn command_entity(&mut self, args: &[String]) -> ConsoleReply {
        match parse_entity_form(args) {
            Ok(form) => {
                let name = form.name.clone();
                let id = self.store.add_entity(form);
                ConsoleReply::ok(format!("created entity {id} '{name}'"))
            }
            Err(errors) => ConsoleReply::errors(errors.messages()),
        }
    }

    fn command_background(&mut self, args: &[String]) -> ConsoleReply {
        let [path] = args else {
            return usage_error("background <path>");
        };
        self.request_background(Path::new(path));
        ConsoleReply::ok(format!("loading background {path}"))
    }

    fn command_texture(&mut self, args: &[String]) -> ConsoleReply {
        let [id, path] = args else {
            return usage_error("texture <block_id> <path>");
        };
        let id = match self.known_block(id) {
            Ok(id) => id,
            Err(reply) => return reply,
        };
        self.request_texture(id, Path::new(path));
        ConsoleReply::ok(format!("loading texture {path} for block {id}"))
    }

    fn command_list(&self) -> ConsoleReply {
        let blocks = self.store.blocks();
        if blocks.is_empty() {
            return ConsoleReply::ok("no blocks");
        }
        let selected = self.store.selected();
        ConsoleReply::lines(
            blocks
                .iter()
                .map(|block| {
                    let mut flags = Vec::new();
                    if block.controllable {
                        flags.push("controllable");
                    }
                    if block.camera_locked {
                        flags.push("camlock");
                    }
                    if selected == Some(block.id) {
                        flags.push("selected");
                    }
                    format!(
                        "{} '{}' at ({}, {}) {}x{} {} [{}] texture={}",
                        block.id,
                        block.name,
                        block.rect.x,
                        block.rect.y,
                        block.rect.w,
                        block.rect.h,
                        block.kind.as_str(),
                        flags.join(","),
                        block.texture.label()
                    )
                })
                .collect(),
        )
    }

    fn command_entities(&self) -> ConsoleReply {
        let entities = self.store.entities();
        if entities.is_empty() {
            return ConsoleReply::ok("no entities");
        }
        ConsoleReply::lines(
            entities
                .iter()
                .map(|entity| {
                    let movement = entity.movement.map_or("-", |movement| movement.as_str());
                    let health = entity
                        .health
                        .map_or_else(|| "-".to_string(), |value| value.to_string());
                    let attack = entity
                        .attack_damage
                        .map_or_else(|| "-".to_string(), |value| value.to_string());
                    let direction = entity.direction.map_or("-", |facing| facing.as_str());
                    format!(
                        "{} '{}' {} at ({}, {}) {}x{} movement={movement} health={health} attack={attack} direction={direction}",
                        entity.id,
                        entity.name,
                        entity.kind.as_str(),
                        entity.x,
                        entity.y,
                        entity.w,
                        entity.h,
                    )
                })
                .collect(),
        )
    }

    fn command_select(&mut self, args: &[String]) -> ConsoleReply {
        let [target] = args else {
            return usage_error("select <block_id|none>");
        };
        if target == "none" {
            self.store.select(None);
            return ConsoleReply::ok("selection cleared");
        }
        match self.known_block(target) {
            Ok(id) => {
                self.store.select(Some(id));
                ConsoleReply::ok(format!("selected block {id}"))
            }
            Err(reply) => reply,
        }
    }

    fn command_flag(&mut self, args: &[String], flag: &'static str) -> ConsoleReply {
        let usage = if flag == "camlock" {
            "camlock <block_id> <on|off>"
        } else {
            "controllable <block_id> <on|off>"
        };
        let [id, state] = args else {
            return usage_error(usage);
        };
        let on = match state.as_str() {
            "on" => true,
            "off" => false,
            _ => return usage_error(usage),
        };
        let id = match self.known_block(id) {
            Ok(id) => id,
            Err(reply) => return reply,
        };
        if flag == "camlock" {
            self.store.set_camera_locked(id, on);
        } else {
            self.store.set_controllable(id, on);
        }
        ConsoleReply::ok(format!(
            "{flag} {} for block {id}",
            if on { "on" } else { "off" }
        ))
    }

    fn command_delete(&mut self, args: &[String]) -> ConsoleReply {
        let [id] = args else {
            return usage_error("delete <block_id>");
        };
        let id = match self.known_block(id) {
            Ok(id) => id,
            Err(reply) => return reply,
        };
        if self.pointer.dragged == Some(id) {
            self.release_pointer();
        }
        self.store.delete_block(id);
        ConsoleReply::ok(format!("deleted block {id}"))
    }

    fn command_dump(&self) -> ConsoleReply {
        let offset = self.mapper.offset();
        let dump = SceneDump {
            viewport_offset: [offset.x, offset.y],
            selected: self.store.selected(),
            blocks: self
                .store
                .blocks()
                .iter()
                .map(|block| BlockDump {
                    id: block.id,
                    name: &block.name,
                    x: block.rect.x,
                    y: block.rect.y,
                    w: block.rect.w,
                    h: block.rect.h,
                    kind: block.kind,
                    color: block.color,
                    controllable: block.controllable,
                    camera_locked: block.camera_locked,
                    texture: block.texture.label(),
                })
                .collect(),
            entities: self.store.entities(),
        };
        match serde_json::to_string_pretty(&dump) {
            Ok(json) => ConsoleReply::lines(json.lines().map(ToString::to_string).collect()),
            Err(error) => ConsoleReply::error(format!("failed to serialize scene: {error}")),
        }
    }

    fn known_block(&self, raw: &str) -> Result<BlockId, ConsoleReply> {
        let Some(id) = BlockId::parse(raw) else {
            return Err(ConsoleReply::error(format!("invalid block id '{raw}'")));
        };
        if self.store.block(id).is_none() {
            return Err(ConsoleReply::error(format!("no block with id {id}")));
        }
        Ok(id)
    }
}

fn usage_error(usage: &str) -> ConsoleReply {
    ConsoleReply::error(format!("usage: {usage}"))
}
