//! Material lists: what a player needs to build a schematic.

use serde::{Deserialize, Serialize};

use crate::model::Schematic;

/// Blocks with no item form; they never appear in a material list.
const ITEMLESS_BLOCKS: &[&str] = &[
    "minecraft:fire",
    "minecraft:soul_fire",
    "minecraft:nether_portal",
    "minecraft:end_portal",
    "minecraft:end_gateway",
    "minecraft:moving_piston",
    "minecraft:piston_head",
    "minecraft:bubble_column",
];

/// Blocks that are lit rather than placed.
const IGNITED_BLOCKS: &[&str] = &["minecraft:fire", "minecraft:nether_portal"];

const IGNITER: &str = "minecraft:flint_and_steel";

/// One line of a material list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub count: usize,
}

/// Counts the materials needed for `schematic`.
///
/// Properties are ignored, so every orientation of a block counts
/// together. Air and blocks without an item are left out; fire or a nether
/// portal adds one flint and steel. Sorted by count, then name.
pub fn material_list(schematic: &Schematic) -> Vec<Material> {
    let counts = schematic.block_counts();
    let needs_igniter = IGNITED_BLOCKS.iter().any(|b| counts.contains_key(*b));

    let mut materials: Vec<Material> = counts
        .into_iter()
        .filter(|(name, _)| !is_air_name(name) && !ITEMLESS_BLOCKS.contains(&name.as_str()))
        .map(|(name, count)| Material { name, count })
        .collect();

    if needs_igniter {
        match materials.iter_mut().find(|m| m.name == IGNITER) {
            Some(existing) => existing.count += 1,
            None => materials.push(Material {
                name: IGNITER.to_string(),
                count: 1,
            }),
        }
    }

    materials.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    materials
}

fn is_air_name(name: &str) -> bool {
    matches!(
        name,
        "minecraft:air" | "minecraft:cave_air" | "minecraft:void_air"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SchematicBuilder;

    #[test]
    fn test_counts_sorted_by_count_then_name() {
        let schematic = SchematicBuilder::new((3, 2, 1))
            .block((0, 0, 0), "stone")
            .block((1, 0, 0), "oak_stairs[facing=east]")
            .block((2, 0, 0), "oak_stairs[facing=west]")
            .block((0, 1, 0), "dirt")
            .build()
            .unwrap();

        let list = material_list(&schematic);
        let names: Vec<_> = list.iter().map(|m| (m.name.as_str(), m.count)).collect();
        assert_eq!(
            names,
            [
                ("minecraft:oak_stairs", 2),
                ("minecraft:dirt", 1),
                ("minecraft:stone", 1),
            ]
        );
    }

    #[test]
    fn test_fire_needs_flint_and_steel() {
        let schematic = SchematicBuilder::new((2, 1, 1))
            .block((0, 0, 0), "netherrack")
            .block((1, 0, 0), "fire[age=0]")
            .build()
            .unwrap();

        let list = material_list(&schematic);
        assert!(list.iter().all(|m| m.name != "minecraft:fire"));
        assert!(list.contains(&Material {
            name: "minecraft:flint_and_steel".to_string(),
            count: 1,
        }));
    }

    #[test]
    fn test_empty_schematic() {
        let schematic = SchematicBuilder::new((1, 1, 1)).build().unwrap();
        assert!(material_list(&schematic).is_empty());
    }
}
