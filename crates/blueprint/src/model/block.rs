//! Block type descriptors.
//!
//! A [`BlockTypeId`] names a block and its variant properties (orientation,
//! connection flags and so on). The textual form is `name[key=value,...]`,
//! with the default `minecraft:` namespace elided:
//!
//! ```text
//! stone
//! oak_stairs[facing=east,half=bottom]
//! examplemod:crate[axis=x]
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::position::{Direction, Rotation};

/// Namespace implied when a descriptor has none.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

const AIR_NAMES: [&str; 3] = ["minecraft:air", "minecraft:cave_air", "minecraft:void_air"];

/// Error parsing a block descriptor string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDescriptorError {
    #[error("empty block name")]
    EmptyName,

    #[error("unbalanced property brackets")]
    UnbalancedBrackets,

    #[error("property {0:?} is not of the form key=value")]
    BadProperty(String),

    #[error("property {0:?} declared twice")]
    DuplicateProperty(String),
}

/// Opaque, comparable identifier of a block type plus its variant state.
///
/// Properties are kept sorted by key so that two descriptors naming the same
/// state always compare equal regardless of input order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockTypeId {
    name: String,
    properties: Vec<(String, String)>,
}

impl BlockTypeId {
    /// Creates a descriptor with no properties.
    pub fn new(name: &str) -> Self {
        Self {
            name: qualify(name),
            properties: Vec::new(),
        }
    }

    /// The canonical air block.
    pub fn air() -> Self {
        Self::new("air")
    }

    /// Returns a copy with `key` set to `value`.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_property(key.into(), value.into());
        self
    }

    /// Fully qualified block name, e.g. `minecraft:stone`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block name with the default namespace elided.
    pub fn short_name(&self) -> &str {
        self.name
            .strip_prefix(DEFAULT_NAMESPACE)
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(&self.name)
    }

    pub fn properties(&self) -> &[(String, String)] {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|i| self.properties[i].1.as_str())
    }

    pub fn is_air(&self) -> bool {
        AIR_NAMES.contains(&self.name.as_str())
    }

    /// Same block, ignoring variant properties.
    pub fn same_block(&self, other: &BlockTypeId) -> bool {
        self.name == other.name
    }

    /// Returns this block rotated about the vertical axis.
    ///
    /// Orientation properties (`facing`, `horizontal_facing`, `rotation`,
    /// `axis`) and side connection flags (`north`/`east`/`south`/`west`) are
    /// rotated; every other property is copied unchanged.
    pub fn rotated(&self, rotation: Rotation) -> BlockTypeId {
        if rotation == Rotation::None || self.properties.is_empty() {
            return self.clone();
        }

        let turns = rotation.quarter_turns();
        let mut properties = Vec::with_capacity(self.properties.len());

        for (key, value) in &self.properties {
            let (key, value) = match key.as_str() {
                "facing" | "horizontal_facing" => {
                    let value = match Direction::from_name(value) {
                        Some(dir) => rotation.rotate_direction(dir).name().to_string(),
                        None => value.clone(),
                    };
                    (key.clone(), value)
                }
                "rotation" => {
                    let value = match value.parse::<usize>() {
                        Ok(r) if r < 16 => ((r + 4 * turns) % 16).to_string(),
                        _ => value.clone(),
                    };
                    (key.clone(), value)
                }
                "axis" if turns % 2 == 1 => {
                    let value = match value.as_str() {
                        "x" => "z".to_string(),
                        "z" => "x".to_string(),
                        _ => value.clone(),
                    };
                    (key.clone(), value)
                }
                side => match Direction::from_name(side) {
                    Some(dir) if dir.is_horizontal() => {
                        (rotation.rotate_direction(dir).name().to_string(), value.clone())
                    }
                    _ => (key.clone(), value.clone()),
                },
            };
            properties.push((key, value));
        }

        properties.sort();
        BlockTypeId {
            name: self.name.clone(),
            properties,
        }
    }

    fn set_property(&mut self, key: String, value: String) {
        match self.properties.binary_search_by(|(k, _)| k.cmp(&key)) {
            Ok(i) => self.properties[i].1 = value,
            Err(i) => self.properties.insert(i, (key, value)),
        }
    }
}

fn qualify(name: &str) -> String {
    if name.contains(':') {
        name.to_string()
    } else {
        format!("{DEFAULT_NAMESPACE}:{name}")
    }
}

impl fmt::Display for BlockTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())?;
        if !self.properties.is_empty() {
            f.write_str("[")?;
            for (i, (key, value)) in self.properties.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{key}={value}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

impl FromStr for BlockTypeId {
    type Err = ParseDescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, props) = match s.find('[') {
            Some(start) => {
                let rest = &s[start + 1..];
                let body = rest
                    .strip_suffix(']')
                    .ok_or(ParseDescriptorError::UnbalancedBrackets)?;
                if body.contains('[') || body.contains(']') {
                    return Err(ParseDescriptorError::UnbalancedBrackets);
                }
                (&s[..start], body)
            }
            None if s.contains(']') => return Err(ParseDescriptorError::UnbalancedBrackets),
            None => (s, ""),
        };

        if name.is_empty() || name.ends_with(':') {
            return Err(ParseDescriptorError::EmptyName);
        }

        let mut block = BlockTypeId::new(name);
        for prop in props.split(',').filter(|p| !p.trim().is_empty()) {
            let (key, value) = prop
                .split_once('=')
                .ok_or_else(|| ParseDescriptorError::BadProperty(prop.to_string()))?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                return Err(ParseDescriptorError::BadProperty(prop.to_string()));
            }
            if block.property(key).is_some() {
                return Err(ParseDescriptorError::DuplicateProperty(key.to_string()));
            }
            block.set_property(key.to_string(), value.to_string());
        }

        Ok(block)
    }
}

impl TryFrom<String> for BlockTypeId {
    type Error = ParseDescriptorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BlockTypeId> for String {
    fn from(value: BlockTypeId) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format() {
        let block: BlockTypeId = "oak_stairs[half=bottom,facing=east]".parse().unwrap();
        assert_eq!(block.name(), "minecraft:oak_stairs");
        assert_eq!(block.property("facing"), Some("east"));
        // properties come back sorted
        assert_eq!(block.to_string(), "oak_stairs[facing=east,half=bottom]");

        let modded: BlockTypeId = "examplemod:crate".parse().unwrap();
        assert_eq!(modded.to_string(), "examplemod:crate");
    }

    #[test]
    fn test_namespace_is_implied() {
        let a: BlockTypeId = "stone".parse().unwrap();
        let b: BlockTypeId = "minecraft:stone".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<BlockTypeId>(), Err(ParseDescriptorError::EmptyName));
        assert_eq!(
            "stone[facing=east".parse::<BlockTypeId>(),
            Err(ParseDescriptorError::UnbalancedBrackets)
        );
        assert!(matches!(
            "stone[facing]".parse::<BlockTypeId>(),
            Err(ParseDescriptorError::BadProperty(_))
        ));
        assert!(matches!(
            "stone[a=1,a=2]".parse::<BlockTypeId>(),
            Err(ParseDescriptorError::DuplicateProperty(_))
        ));
    }

    #[test]
    fn test_air_variants() {
        assert!(BlockTypeId::air().is_air());
        assert!(BlockTypeId::new("cave_air").is_air());
        assert!(!BlockTypeId::new("stone").is_air());
    }

    #[test]
    fn test_rotate_facing() {
        let chest = BlockTypeId::new("chest").with_property("facing", "north");
        assert_eq!(
            chest.rotated(Rotation::Clockwise90).property("facing"),
            Some("east")
        );
        assert_eq!(
            chest.rotated(Rotation::Counterclockwise90).property("facing"),
            Some("west")
        );
        let up = BlockTypeId::new("piston").with_property("facing", "up");
        assert_eq!(up.rotated(Rotation::Clockwise180), up);
    }

    #[test]
    fn test_rotate_sixteenths_and_axis() {
        let sign = BlockTypeId::new("oak_sign").with_property("rotation", "14");
        assert_eq!(
            sign.rotated(Rotation::Clockwise90).property("rotation"),
            Some("2")
        );

        let log = BlockTypeId::new("oak_log").with_property("axis", "x");
        assert_eq!(log.rotated(Rotation::Clockwise90).property("axis"), Some("z"));
        assert_eq!(log.rotated(Rotation::Clockwise180).property("axis"), Some("x"));
    }

    #[test]
    fn test_rotate_connections() {
        let fence = BlockTypeId::new("oak_fence")
            .with_property("north", "true")
            .with_property("east", "false")
            .with_property("south", "false")
            .with_property("west", "false");
        let rotated = fence.rotated(Rotation::Clockwise90);
        assert_eq!(rotated.property("east"), Some("true"));
        assert_eq!(rotated.property("north"), Some("false"));
    }

    #[test]
    fn test_full_turn_is_identity() {
        let stairs: BlockTypeId = "oak_stairs[facing=south,shape=straight]".parse().unwrap();
        let mut rotated = stairs.clone();
        for _ in 0..4 {
            rotated = rotated.rotated(Rotation::Clockwise90);
        }
        assert_eq!(rotated, stairs);
    }
}
