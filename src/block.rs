//! Block states: `(name, properties)`, per spec.md §3.
use std::sync::OnceLock;

use crate::nbt::Compound;
use crate::resource::ResourceLocation;

/// `(name, properties)`: two states are equal iff both the name and the
/// properties match; absent properties are not equal to an empty compound.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockState {
    name: ResourceLocation,
    properties: Option<Compound>,
}

impl BlockState {
    pub fn new(name: ResourceLocation, properties: Option<Compound>) -> Self {
        Self { name, properties }
    }

    pub fn name(&self) -> &ResourceLocation {
        &self.name
    }

    pub fn properties(&self) -> Option<&Compound> {
        self.properties.as_ref()
    }

    /// True iff this is `minecraft:air`, `minecraft:cave_air`, or
    /// `minecraft:void_air`.
    pub fn is_air(&self) -> bool {
        self.name.namespace() == "minecraft"
            && matches!(self.name.path(), "air" | "cave_air" | "void_air")
    }

    /// The process-wide fallback state: `minecraft:air` with no properties.
    pub fn default_state() -> &'static BlockState {
        static DEFAULT: OnceLock<BlockState> = OnceLock::new();
        DEFAULT.get_or_init(|| BlockState {
            name: ResourceLocation::parse("minecraft:air").expect("valid literal"),
            properties: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_variants_are_recognised() {
        for path in ["air", "cave_air", "void_air"] {
            let s = BlockState::new(ResourceLocation::parse(&format!("minecraft:{path}")).unwrap(), None);
            assert!(s.is_air());
        }
    }

    #[test]
    fn non_air_block_is_not_air() {
        let s = BlockState::new(ResourceLocation::parse("minecraft:stone").unwrap(), None);
        assert!(!s.is_air());
    }

    #[test]
    fn other_namespace_air_path_is_not_air() {
        let s = BlockState::new(ResourceLocation::parse("modded:air").unwrap(), None);
        assert!(!s.is_air());
    }

    #[test]
    fn absent_properties_are_not_equal_to_empty_compound() {
        let a = BlockState::new(ResourceLocation::parse("minecraft:stone").unwrap(), None);
        let b = BlockState::new(ResourceLocation::parse("minecraft:stone").unwrap(), Some(Compound::new()));
        assert_ne!(a, b);
    }

    #[test]
    fn default_state_is_air() {
        assert!(BlockState::default_state().is_air());
    }
}
