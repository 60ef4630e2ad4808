use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entity kinds managed through the wizards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Quest,
    Mission,
    Chapter,
    Nft,
    GeoNft,
    NftCollection,
    GeoNftCollection,
    Wallet,
    Plugin,
    Holon,
    Runtime,
    Library,
    Oapp,
    InventoryItem,
}

impl EntityKind {
    /// Get all entity kinds.
    pub fn all() -> Vec<EntityKind> {
        vec![
            EntityKind::Quest,
            EntityKind::Mission,
            EntityKind::Chapter,
            EntityKind::Nft,
            EntityKind::GeoNft,
            EntityKind::NftCollection,
            EntityKind::GeoNftCollection,
            EntityKind::Wallet,
            EntityKind::Plugin,
            EntityKind::Holon,
            EntityKind::Runtime,
            EntityKind::Library,
            EntityKind::Oapp,
            EntityKind::InventoryItem,
        ]
    }

    /// Stable identifier used on the command line and in stored records.
    pub fn slug(&self) -> &'static str {
        match self {
            EntityKind::Quest => "quest",
            EntityKind::Mission => "mission",
            EntityKind::Chapter => "chapter",
            EntityKind::Nft => "nft",
            EntityKind::GeoNft => "geo-nft",
            EntityKind::NftCollection => "nft-collection",
            EntityKind::GeoNftCollection => "geo-nft-collection",
            EntityKind::Wallet => "wallet",
            EntityKind::Plugin => "plugin",
            EntityKind::Holon => "holon",
            EntityKind::Runtime => "runtime",
            EntityKind::Library => "library",
            EntityKind::Oapp => "oapp",
            EntityKind::InventoryItem => "inventory-item",
        }
    }

    /// Name shown in prompts ("What is the name of the Geo-NFT ...").
    pub fn display_name(&self) -> &'static str {
        match self {
            EntityKind::Quest => "Quest",
            EntityKind::Mission => "Mission",
            EntityKind::Chapter => "Chapter",
            EntityKind::Nft => "NFT",
            EntityKind::GeoNft => "Geo-NFT",
            EntityKind::NftCollection => "NFT Collection",
            EntityKind::GeoNftCollection => "Geo-NFT Collection",
            EntityKind::Wallet => "Wallet",
            EntityKind::Plugin => "Plugin",
            EntityKind::Holon => "Holon",
            EntityKind::Runtime => "Runtime",
            EntityKind::Library => "Library",
            EntityKind::Oapp => "OAPP",
            EntityKind::InventoryItem => "Inventory Item",
        }
    }

    /// Kinds this kind may depend on, in the order the creation wizard offers them.
    pub fn dependency_kinds(&self) -> &'static [EntityKind] {
        match self {
            EntityKind::Oapp => &[
                EntityKind::Runtime,
                EntityKind::Library,
                EntityKind::Plugin,
                EntityKind::Holon,
                EntityKind::Quest,
                EntityKind::Nft,
                EntityKind::GeoNft,
                EntityKind::InventoryItem,
            ],
            EntityKind::Mission => &[EntityKind::Chapter, EntityKind::Quest],
            EntityKind::Chapter => &[EntityKind::Quest],
            EntityKind::Quest => &[
                EntityKind::Quest,
                EntityKind::Nft,
                EntityKind::GeoNft,
                EntityKind::InventoryItem,
            ],
            EntityKind::NftCollection => &[EntityKind::Nft],
            EntityKind::GeoNftCollection => &[EntityKind::GeoNft],
            EntityKind::Plugin => &[EntityKind::Runtime, EntityKind::Library],
            EntityKind::Library => &[EntityKind::Library],
            EntityKind::Holon => &[EntityKind::Holon],
            EntityKind::Nft
            | EntityKind::GeoNft
            | EntityKind::Wallet
            | EntityKind::Runtime
            | EntityKind::InventoryItem => &[],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    /// Accepts slugs, plural forms and a few legacy spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        let singular = normalized.strip_suffix('s').unwrap_or(normalized.as_str());
        let kind = match singular {
            "quest" => EntityKind::Quest,
            "mission" => EntityKind::Mission,
            "chapter" => EntityKind::Chapter,
            "nft" => EntityKind::Nft,
            "geo-nft" | "geonft" => EntityKind::GeoNft,
            "nft-collection" | "collection" => EntityKind::NftCollection,
            "geo-nft-collection" | "geo-collection" => EntityKind::GeoNftCollection,
            "wallet" => EntityKind::Wallet,
            "plugin" => EntityKind::Plugin,
            "holon" => EntityKind::Holon,
            "runtime" => EntityKind::Runtime,
            "library" | "librarie" | "lib" => EntityKind::Library,
            "oapp" => EntityKind::Oapp,
            "inventory-item" | "inventory" => EntityKind::InventoryItem,
            _ => {
                let valid: Vec<&str> = EntityKind::all().iter().map(|k| k.slug()).collect();
                return Err(format!(
                    "Unknown entity kind '{}'. Valid kinds: {}",
                    s,
                    valid.join(", ")
                ));
            }
        };
        Ok(kind)
    }
}
