//! Live targets and their hit bookkeeping.

use aim_trainer_core::{Point, Shape, TargetColor, TargetId, TargetSpawn};

/// Clickable target spawned as part of a wave.
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    id: TargetId,
    shape: Shape,
    color: TargetColor,
    hovered: bool,
}

impl Target {
    fn from_spawn(id: TargetId, spawn: &TargetSpawn) -> Self {
        Self {
            id,
            shape: Shape::Circle {
                center: spawn.center,
                diameter: spawn.diameter,
            },
            color: spawn.color,
            hovered: false,
        }
    }

    /// Identifier assigned when the target spawned.
    #[must_use]
    pub const fn id(&self) -> TargetId {
        self.id
    }

    /// Geometry of the target.
    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    /// Appearance assigned when the target spawned.
    #[must_use]
    pub const fn color(&self) -> TargetColor {
        self.color
    }

    /// Whether the pointer was over the target during the latest frame.
    #[must_use]
    pub const fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Reports whether the point lies within the target's bounds.
    #[must_use]
    pub fn is_hit_by(&self, point: Point) -> bool {
        self.shape.contains(point)
    }
}

/// Targets currently shown on the play field, in spawn order.
#[derive(Clone, Debug, Default)]
pub struct TargetList {
    targets: Vec<Target>,
    next_id: u32,
}

impl TargetList {
    /// Live targets in spawn order.
    #[must_use]
    pub fn as_slice(&self) -> &[Target] {
        &self.targets
    }

    /// Number of live targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Reports whether no target is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Discards the live targets and spawns a fresh wave.
    ///
    /// Returns the number of discarded targets.
    pub(crate) fn replace_wave(&mut self, spawns: &[TargetSpawn]) -> usize {
        let discarded = self.clear();
        self.targets.reserve(spawns.len());
        for spawn in spawns {
            let id = TargetId::new(self.next_id);
            self.next_id = self.next_id.wrapping_add(1);
            self.targets.push(Target::from_spawn(id, spawn));
        }
        discarded
    }

    /// Discards every live target, returning how many were removed.
    pub(crate) fn clear(&mut self) -> usize {
        let count = self.targets.len();
        self.targets.clear();
        count
    }

    pub(crate) fn update_hover(&mut self, pointer: Point) {
        for target in &mut self.targets {
            target.hovered = target.is_hit_by(pointer);
        }
    }

    /// Removes the most recently spawned target under `point`.
    ///
    /// Later targets are drawn on top, so they take the click.
    pub(crate) fn take_hit(&mut self, point: Point) -> Option<TargetId> {
        let index = self.targets.iter().rposition(|target| target.is_hit_by(point))?;
        Some(self.targets.remove(index).id)
    }
}
