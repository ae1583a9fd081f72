use std::path::Path;

use log::{debug, warn};
use serde_json::Value as JsonValue;

use crate::card;
use crate::invariants::{InvariantManager, Operation};
use crate::ocr::{self, OcrHorseData};
use crate::png;
use crate::record::{self, CanonicalRecord};
use crate::resolver::Resolver;

use super::corpus::Corpus;
use super::error::{CoreError, CoreErrorCode};

/// Where an imported record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Json,
    Card,
}

impl SourceKind {
    /// PNG signature means a card; anything else is treated as JSON.
    pub fn detect(bytes: &[u8]) -> Self {
        if png::has_signature(bytes) {
            Self::Card
        } else {
            Self::Json
        }
    }
}

/// Corpus plus the lookup tables built from it. Every import path ends in
/// [`record::validate`] followed by an invariant repair.
#[derive(Debug, Clone)]
pub struct Engine {
    corpus: Corpus,
    resolver: Resolver,
}

impl Engine {
    pub fn new(corpus: Corpus) -> Self {
        let resolver = Resolver::new(&corpus);
        debug!(
            "engine ready: {} skills, {} skill names, {} epithets",
            corpus.skills.len(),
            resolver.skill_name_count(),
            resolver.epithet_count()
        );
        Self { corpus, resolver }
    }

    pub fn load_from_dir(data_dir: &Path) -> Result<Self, CoreError> {
        Corpus::load_from_dir(data_dir).map(Self::new)
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn invariants(&self) -> InvariantManager<'_> {
        InvariantManager::new(&self.corpus.skills, &self.resolver)
    }

    pub fn open_bytes<B: AsRef<[u8]>>(
        &self,
        bytes: B,
        hint: Option<SourceKind>,
    ) -> Result<CanonicalRecord, CoreError> {
        let bytes = bytes.as_ref();
        match hint.unwrap_or_else(|| SourceKind::detect(bytes)) {
            SourceKind::Card => self.import_card_bytes(bytes),
            SourceKind::Json => self.import_json_bytes(bytes),
        }
    }

    pub fn import_json_bytes(&self, bytes: &[u8]) -> Result<CanonicalRecord, CoreError> {
        let value: JsonValue = serde_json::from_slice(bytes).map_err(|e| {
            CoreError::new(CoreErrorCode::Parse, format!("input is not JSON: {e}"))
        })?;
        self.import_json_value(&value)
    }

    pub fn import_json_value(&self, value: &JsonValue) -> Result<CanonicalRecord, CoreError> {
        let record = record::validate(value, &self.corpus.skills)?;
        for (stat, v) in record.out_of_domain_stats() {
            warn!(
                "{} {v} is outside {}..={}",
                stat.key(),
                record::STAT_MIN,
                record::STAT_MAX
            );
        }
        Ok(self.invariants().repair(record)?)
    }

    /// A PNG without card data is `CardNotFound`, never `PayloadCorrupt`.
    pub fn import_card_bytes(&self, bytes: &[u8]) -> Result<CanonicalRecord, CoreError> {
        let Some(payload) = card::read_card(bytes)? else {
            return Err(CoreError::new(
                CoreErrorCode::CardNotFound,
                "image has no embedded card data",
            ));
        };
        debug!("card payload version {:?}", payload.version);
        self.import_json_value(&payload.horse)
    }

    pub fn import_ocr_text(&self, text: &str) -> Result<CanonicalRecord, CoreError> {
        let fields = ocr::parse_extraction_text(text)?;
        self.assemble_from_ocr(&fields)
    }

    pub fn assemble_from_ocr(&self, fields: &OcrHorseData) -> Result<CanonicalRecord, CoreError> {
        Ok(self
            .invariants()
            .apply_ocr_assembly(fields, &fields.skills)?)
    }

    pub fn apply(
        &self,
        record: &CanonicalRecord,
        op: Operation,
    ) -> Result<CanonicalRecord, CoreError> {
        Ok(self.invariants().apply(record, op)?)
    }

    pub fn export_json(&self, record: &CanonicalRecord) -> Result<String, CoreError> {
        serde_json::to_string_pretty(record).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Parse,
                format!("failed to serialize record: {e}"),
            )
        })
    }

    pub fn export_card(
        &self,
        record: &CanonicalRecord,
        portrait_png: &[u8],
    ) -> Result<Vec<u8>, CoreError> {
        Ok(card::write_card(portrait_png, record)?)
    }
}
