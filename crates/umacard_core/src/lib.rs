pub mod card;
pub mod core_api;
pub mod invariants;
pub mod layout;
pub mod ocr;
pub mod png;
pub mod reader;
pub mod record;
pub mod resolver;
