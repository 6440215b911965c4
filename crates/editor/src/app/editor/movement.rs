use editor_engine::{overlaps, KeyStates, Rect};

use super::store::{BlockId, BlockPatch, SceneStore};

const UP_KEYS: &[&str] = &["w", "arrowup"];
const LEFT_KEYS: &[&str] = &["a", "arrowleft"];
const DOWN_KEYS: &[&str] = &["s", "arrowdown"];
const RIGHT_KEYS: &[&str] = &["d", "arrowright"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Up,
    Left,
    Down,
    Right,
}

/// One direction per tick; when several are held, up > left > down > right.
pub(crate) fn held_direction(keys: &KeyStates) -> Option<Direction> {
    [
        (UP_KEYS, Direction::Up),
        (LEFT_KEYS, Direction::Left),
        (DOWN_KEYS, Direction::Down),
        (RIGHT_KEYS, Direction::Right),
    ]
    .into_iter()
    .find(|(names, _)| keys.any_down(names))
    .map(|(_, direction)| direction)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SceneBounds {
    pub(crate) width: i32,
    pub(crate) height: i32,
}

/// Next rectangle for a block moving one step, or `None` when the move is
/// rejected or changes nothing.
///
/// The collision test runs against the unclamped destination; the committed
/// position is clamped to `[0, bounds]` on the moving axis.
pub(crate) fn step_rect(
    rect: Rect,
    direction: Direction,
    step: i32,
    bounds: SceneBounds,
    obstacles: &[Rect],
) -> Option<Rect> {
    let (tentative, clamped) = match direction {
        Direction::Up => {
            let y = rect.y.saturating_sub(step);
            (Rect { y, ..rect }, Rect { y: y.max(0), ..rect })
        }
        Direction::Left => {
            let x = rect.x.saturating_sub(step);
            (Rect { x, ..rect }, Rect { x: x.max(0), ..rect })
        }
        Direction::Down => {
            let y = rect.y.saturating_add(step);
            (Rect { y, ..rect }, Rect { y: y.min(bounds.height), ..rect })
        }
        Direction::Right => {
            let x = rect.x.saturating_add(step);
            (Rect { x, ..rect }, Rect { x: x.min(bounds.width), ..rect })
        }
    };

    if obstacles.iter().any(|obstacle| overlaps(&tentative, obstacle)) {
        return None;
    }
    (clamped != rect).then_some(clamped)
}

/// Moves every controllable block one step. Obstacles are all collision
/// blocks as they stood when the tick began, the mover included, so a
/// controllable collision block only moves once a step clears its own footprint.
pub(crate) fn apply_movement(
    store: &mut SceneStore,
    direction: Direction,
    step: i32,
    bounds: SceneBounds,
) -> usize {
    let obstacles: Vec<Rect> = store
        .blocks()
        .iter()
        .filter(|block| block.is_collision())
        .map(|block| block.rect)
        .collect();
    let movers: Vec<(BlockId, Rect)> = store
        .blocks()
        .iter()
        .filter(|block| block.controllable)
        .map(|block| (block.id, block.rect))
        .collect();

    let mut moved = 0;
    for (id, rect) in movers {
        if let Some(next) = step_rect(rect, direction, step, bounds, &obstacles) {
            store.update_block(id, BlockPatch::moved_to(next.x, next.y));
            moved += 1;
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::editor::store::{BlockColor, BlockKind, NewBlock};

    const BOUNDS: SceneBounds = SceneBounds {
        width: 2000,
        height: 2000,
    };

    fn add(store: &mut SceneStore, rect: Rect, kind: BlockKind) -> BlockId {
        store.add_block(NewBlock {
            name: "b".to_string(),
            rect,
            kind,
            color: BlockColor::Red,
        })
    }

    fn keys(held: &[&str]) -> KeyStates {
        let mut keys = KeyStates::default();
        for key in held {
            keys.set(key, true);
        }
        keys
    }

    #[test]
    fn precedence_is_up_left_down_right() {
        assert_eq!(held_direction(&keys(&[])), None);
        assert_eq!(held_direction(&keys(&["d", "s"])), Some(Direction::Down));
        assert_eq!(held_direction(&keys(&["d", "a", "s"])), Some(Direction::Left));
        assert_eq!(held_direction(&keys(&["d", "w", "a"])), Some(Direction::Up));
        assert_eq!(held_direction(&keys(&["arrowright"])), Some(Direction::Right));
    }

    #[test]
    fn left_at_origin_stays_put() {
        assert_eq!(
            step_rect(Rect::new(0, 0, 10, 10), Direction::Left, 5, BOUNDS, &[]),
            None
        );
        assert_eq!(
            step_rect(Rect::new(3, 0, 10, 10), Direction::Left, 5, BOUNDS, &[]),
            Some(Rect::new(0, 0, 10, 10))
        );
    }

    #[test]
    fn down_and_right_clamp_to_scene_size() {
        assert_eq!(
            step_rect(Rect::new(0, 1998, 10, 10), Direction::Down, 5, BOUNDS, &[]),
            Some(Rect::new(0, 2000, 10, 10))
        );
        assert_eq!(
            step_rect(Rect::new(2000, 0, 10, 10), Direction::Right, 5, BOUNDS, &[]),
            None
        );
    }

    #[test]
    fn collision_rejects_whole_step_without_sliding() {
        let wall = Rect::new(100, 0, 100, 100);
        assert_eq!(
            step_rect(Rect::new(48, 0, 50, 50), Direction::Right, 5, BOUNDS, &[wall]),
            None
        );
        assert_eq!(
            step_rect(Rect::new(48, 0, 50, 50), Direction::Left, 5, BOUNDS, &[wall]),
            Some(Rect::new(43, 0, 50, 50))
        );
    }

    #[test]
    fn overlapping_block_can_leave_an_obstacle() {
        let wall = Rect::new(0, 0, 100, 100);
        assert_eq!(
            step_rect(Rect::new(98, 10, 10, 10), Direction::Right, 5, BOUNDS, &[wall]),
            Some(Rect::new(103, 10, 10, 10))
        );
    }

    #[test]
    fn collision_uses_unclamped_destination() {
        let wall = Rect::new(-20, 0, 10, 10);
        assert_eq!(
            step_rect(Rect::new(2, 0, 10, 10), Direction::Left, 15, BOUNDS, &[wall]),
            None
        );
    }

    #[test]
    fn only_controllable_blocks_move() {
        let mut store = SceneStore::new();
        let mover = add(&mut store, Rect::new(10, 10, 10, 10), BlockKind::Block);
        let idle = add(&mut store, Rect::new(50, 50, 10, 10), BlockKind::Block);
        store.set_controllable(mover, true);

        assert_eq!(apply_movement(&mut store, Direction::Down, 5, BOUNDS), 1);
        assert_eq!(store.block(mover).expect("mover").rect.y, 15);
        assert_eq!(store.block(idle).expect("idle").rect.y, 50);
    }

    #[test]
    fn controllable_collision_block_is_blocked_by_its_own_footprint() {
        let mut store = SceneStore::new();
        let mover = add(&mut store, Rect::new(10, 10, 10, 10), BlockKind::Collision);
        store.set_controllable(mover, true);
        assert_eq!(apply_movement(&mut store, Direction::Right, 5, BOUNDS), 0);
        assert_eq!(store.block(mover).expect("mover").rect.x, 10);

        // A step at least as long as the block clears its old footprint.
        let small = add(&mut store, Rect::new(100, 100, 4, 4), BlockKind::Collision);
        store.set_controllable(mover, false);
        store.set_controllable(small, true);
        assert_eq!(apply_movement(&mut store, Direction::Down, 5, BOUNDS), 1);
        assert_eq!(store.block(small).expect("small").rect.y, 105);
    }

    #[test]
    fn steps_near_the_pixel_range_saturate() {
        assert_eq!(
            step_rect(Rect::new(i32::MIN + 2, 0, 10, 10), Direction::Left, 5, BOUNDS, &[]),
            Some(Rect::new(0, 0, 10, 10))
        );
        assert_eq!(
            step_rect(Rect::new(0, i32::MAX - 2, 10, 10), Direction::Down, 5, BOUNDS, &[]),
            Some(Rect::new(0, 2000, 10, 10))
        );
    }

    #[test]
    fn controllable_block_halts_before_collision_block() {
        let mut store = SceneStore::new();
        let a = add(&mut store, Rect::new(0, 0, 50, 100), BlockKind::Block);
        add(&mut store, Rect::new(100, 0, 100, 100), BlockKind::Collision);
        store.set_controllable(a, true);

        for _ in 0..40 {
            apply_movement(&mut store, Direction::Right, 5, BOUNDS);
        }
        assert_eq!(store.block(a).expect("a").rect.x, 50);

        apply_movement(&mut store, Direction::Left, 5, BOUNDS);
        assert_eq!(store.block(a).expect("a").rect.x, 45);
    }
}
