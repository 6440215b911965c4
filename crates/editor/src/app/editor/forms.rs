use editor_engine::Rect;
use thiserror::Error;

use super::store::{
    BlockColor, BlockKind, EntityKind, Facing, MovementType, NewBlock, NewEntity,
};

pub(crate) const BLOCK_FORM_USAGE: &str = "block <name> <x> <y> <width> <height> <block|collision> <red|blue>";
pub(crate) const ENTITY_FORM_USAGE: &str = "entity <name> <x> <y> <width> <height> <player|enemy> [movement=random|static|timed] [health=<n>] [attack=<n>] [direction=up|down|left|right]";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum FieldError {
    #[error("{field}: is required")]
    Missing { field: &'static str },
    #[error("{field}: expected an integer, got {value:?}")]
    NotInteger { field: &'static str, value: String },
    #[error("{field}: expected a positive number, got {value:?}")]
    NotPositive { field: &'static str, value: String },
    #[error("{field}: expected one of {choices}, got {value:?}")]
    NotOneOf {
        field: &'static str,
        choices: &'static str,
        value: String,
    },
    #[error("{field}: expected a non-negative integer, got {value:?}")]
    NotCount { field: &'static str, value: String },
    #[error("{field}: {origin} + {field} must stay within the pixel range")]
    FarEdgeOutOfRange {
        field: &'static str,
        origin: &'static str,
    },
    #[error("unexpected argument {value:?}")]
    Unexpected { value: String },
}

/// Every failing field of one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} invalid field(s)", .0.len())]
pub(crate) struct FormErrors(Vec<FieldError>);

impl FormErrors {
    fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub(crate) fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.fields().iter().map(ToString::to_string).collect()
    }

    fn into_result<T>(self, value: Option<T>) -> Result<T, FormErrors> {
        match value {
            Some(value) if self.0.is_empty() => Ok(value),
            _ => Err(self),
        }
    }
}

/// Positional fields shared by both forms.
struct Placement {
    name: Option<String>,
    x: Option<i32>,
    y: Option<i32>,
    w: Option<i32>,
    h: Option<i32>,
}

impl Placement {
    fn parse(args: &[String], errors: &mut FormErrors) -> Self {
        let name = match args.first().map(|raw| raw.trim()) {
            Some(name) if !name.is_empty() => Some(name.to_string()),
            _ => {
                errors.push(FieldError::Missing { field: "name" });
                None
            }
        };
        let x = integer_field(args.get(1), "x", errors);
        let y = integer_field(args.get(2), "y", errors);
        let w = size_field(args.get(3), "width", errors);
        let h = size_field(args.get(4), "height", errors);
        Self {
            name,
            x,
            y,
            w: far_edge_in_range(x, w, ("x", "width"), errors),
            h: far_edge_in_range(y, h, ("y", "height"), errors),
        }
    }

    fn into_parts(self) -> Option<(String, Rect)> {
        Some((
            self.name?,
            Rect::new(self.x?, self.y?, self.w?, self.h?),
        ))
    }
}

pub(crate) fn parse_block_form(args: &[String]) -> Result<NewBlock, FormErrors> {
    let mut errors = FormErrors::default();
    let placement = Placement::parse(args, &mut errors);
    let kind = choice_field(args.get(5), "type", BlockKind::CHOICES, BlockKind::parse, &mut errors);
    let color = choice_field(args.get(6), "color", BlockColor::CHOICES, BlockColor::parse, &mut errors);
    for extra in args.iter().skip(7) {
        errors.push(FieldError::Unexpected {
            value: extra.clone(),
        });
    }

    let parsed = placement.into_parts().and_then(|(name, rect)| {
        Some(NewBlock {
            name,
            rect,
            kind: kind?,
            color: color?,
        })
    });
    errors.into_result(parsed)
}

pub(crate) fn parse_entity_form(args: &[String]) -> Result<NewEntity, FormErrors> {
    let mut errors = FormErrors::default();
    let placement = Placement::parse(args, &mut errors);
    let kind = choice_field(args.get(5), "type", EntityKind::CHOICES, EntityKind::parse, &mut errors);

    let mut movement = None;
    let mut health = None;
    let mut attack_damage = None;
    let mut direction = None;
    for option in args.iter().skip(6) {
        match option.split_once('=') {
            Some(("movement", value)) => {
                movement = choice_field(
                    Some(&value.to_string()),
                    "movement",
                    MovementType::CHOICES,
                    MovementType::parse,
                    &mut errors,
                );
            }
            Some(("health", value)) => health = count_field(value, "health", &mut errors),
            Some(("attack", value)) => attack_damage = count_field(value, "attack", &mut errors),
            Some(("direction", value)) => {
                direction = choice_field(
                    Some(&value.to_string()),
                    "direction",
                    Facing::CHOICES,
                    Facing::parse,
                    &mut errors,
                );
            }
            _ => errors.push(FieldError::Unexpected {
                value: option.clone(),
            }),
        }
    }

    let parsed = placement.into_parts().and_then(|(name, rect)| {
        Some(NewEntity {
            name,
            rect,
            kind: kind?,
            movement,
            health,
            attack_damage,
            direction,
        })
    });
    errors.into_result(parsed)
}

fn integer_field(raw: Option<&String>, field: &'static str, errors: &mut FormErrors) -> Option<i32> {
    let Some(raw) = raw else {
        errors.push(FieldError::Missing { field });
        return None;
    };
    match raw.trim().parse::<i32>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::NotInteger {
                field,
                value: raw.clone(),
            });
            None
        }
    }
}

/// Positive number; fractional sizes round up to whole pixels.
fn size_field(raw: Option<&String>, field: &'static str, errors: &mut FormErrors) -> Option<i32> {
    let Some(raw) = raw else {
        errors.push(FieldError::Missing { field });
        return None;
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 && value <= i32::MAX as f64 => {
            Some(value.ceil() as i32)
        }
        _ => {
            errors.push(FieldError::NotPositive {
                field,
                value: raw.clone(),
            });
            None
        }
    }
}

/// Keeps `size` only when `origin + size` is still a pixel coordinate.
fn far_edge_in_range(
    origin: Option<i32>,
    size: Option<i32>,
    (origin_field, field): (&'static str, &'static str),
    errors: &mut FormErrors,
) -> Option<i32> {
    match (origin, size) {
        (Some(origin), Some(size)) if origin.checked_add(size).is_none() => {
            errors.push(FieldError::FarEdgeOutOfRange {
                field,
                origin: origin_field,
            });
            None
        }
        _ => size,
    }
}

fn choice_field<T>(
    raw: Option<&String>,
    field: &'static str,
    choices: &'static str,
    parse: fn(&str) -> Option<T>,
    errors: &mut FormErrors,
) -> Option<T> {
    let Some(raw) = raw else {
        errors.push(FieldError::Missing { field });
        return None;
    };
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        errors.push(FieldError::NotOneOf {
            field,
            choices,
            value: raw.clone(),
        });
    }
    parsed
}

fn count_field(raw: &str, field: &'static str, errors: &mut FormErrors) -> Option<u32> {
    match raw.trim().parse::<u32>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::NotCount {
                field,
                value: raw.to_string(),
            });
            None
        }
    }
}
