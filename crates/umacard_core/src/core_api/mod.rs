mod corpus;
mod engine;
mod error;
pub mod outfit_catalog;
pub mod skill_catalog;

pub use corpus::{
    Corpus, SKILL_DATA_FILE, SKILL_META_FILE, SKILL_NAMES_FILE, SkillNameEntry, UMAS_FILE,
};
pub use engine::{Engine, SourceKind};
pub use error::{CoreError, CoreErrorCode};
pub use outfit_catalog::{CharacterEntry, OutfitCatalog};
pub use skill_catalog::{SkillCatalog, SkillEntry};
