#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What occupies one lattice cell, reduced to the classes movement planning
/// distinguishes. Hosts map their own block palette onto these.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Material {
    Air,
    /// Generic collidable block. Infinite hardness means unbreakable.
    Solid { hardness: f32 },
    Water,
    Lava,
    Fire,
    PowderSnow,
    Cobweb,
    /// Collidable, slows walking.
    SoulSand,
    /// Collidable, slippery.
    Ice,
    /// Openable barrier: passable at a traversal surcharge when permitted.
    Door,
    Gate,
}

impl Material {
    pub const STONE: Material = Material::Solid { hardness: 1.5 };
    pub const DIRT: Material = Material::Solid { hardness: 0.5 };
    pub const BEDROCK: Material = Material::Solid {
        hardness: f32::INFINITY,
    };

    /// Whether the cell has a collision volume an agent cannot share.
    pub fn blocks_movement(self) -> bool {
        matches!(
            self,
            Material::Solid { .. }
                | Material::SoulSand
                | Material::Ice
                | Material::Door
                | Material::Gate
        )
    }

    /// Whether an agent can stand on top of this cell.
    pub fn supports_standing(self) -> bool {
        self.blocks_movement()
    }

    pub fn is_fluid(self) -> bool {
        matches!(self, Material::Water | Material::Lava)
    }

    pub fn is_openable(self) -> bool {
        matches!(self, Material::Door | Material::Gate)
    }

    /// Break effort for destructible cells; infinite for unbreakable ones,
    /// zero for cells with nothing to break.
    pub fn hardness(self) -> f32 {
        match self {
            Material::Solid { hardness } => hardness,
            Material::SoulSand | Material::Ice => 0.5,
            Material::Door => 3.0,
            Material::Gate => 2.0,
            Material::Cobweb => 4.0,
            Material::Air
            | Material::Water
            | Material::Lava
            | Material::Fire
            | Material::PowderSnow => 0.0,
        }
    }

    /// Whether mining through this cell is possible at all. Fluids are not
    /// breakable, nor are infinite-hardness solids.
    pub fn is_breakable(self) -> bool {
        if self.is_fluid() {
            return false;
        }
        match self {
            Material::Air | Material::Fire | Material::PowderSnow => false,
            other => other.hardness().is_finite(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bedrock_is_not_breakable() {
        assert!(Material::STONE.is_breakable());
        assert!(!Material::BEDROCK.is_breakable());
        assert!(!Material::Water.is_breakable());
    }

    #[test]
    fn openable_barriers_collide_by_default() {
        assert!(Material::Door.blocks_movement());
        assert!(Material::Gate.blocks_movement());
        assert!(!Material::Cobweb.blocks_movement());
    }
}
