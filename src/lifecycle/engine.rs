//! The engine facade and its persistence seam.
//!
//! The engine performs no I/O of its own: it loads and saves documents
//! through the [`DocumentStore`] collaborator and leaves transmission to
//! the authority entirely to the caller. Lifecycle transitions on one
//! document must be serialized by the caller (e.g. a transactional
//! boundary or per-document lock); the engine does not lock — it fails
//! fast with [`NotaError::ConcurrencyConflict`] when the store observes a
//! stale version.

use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use super::transitions;
use crate::core::{
    Document, DocumentNumberSequence, DraftBuilder, LineItem, NotaError, Party,
};
use crate::tax::RateTable;

/// A document together with the version observed when it was loaded.
///
/// The version counter is owned by the persistence collaborator; the
/// engine passes it back unchanged on save so the store can detect
/// concurrent writers.
#[derive(Debug, Clone)]
pub struct VersionedDocument {
    /// Version at load time; 0 for documents not yet stored.
    pub version: u64,
    pub document: Document,
}

/// Persistence collaborator. The engine requests loads and emits saves;
/// it does not implement storage.
pub trait DocumentStore {
    fn load(&self, id: Uuid) -> Result<VersionedDocument, NotaError>;

    /// Save a document at the version observed on load. Implementations
    /// must reject stale versions with [`NotaError::ConcurrencyConflict`]
    /// rather than silently overwriting.
    fn save(&mut self, doc: VersionedDocument) -> Result<(), NotaError>;
}

/// Fixed issuing-context configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Jurisdiction (state) code embedded in generated keys.
    pub region_code: u8,
    /// Document model code.
    pub model: u8,
    /// Emission type digit.
    pub emission_type: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            region_code: 35,
            model: 55,
            emission_type: 1,
        }
    }
}

/// The fiscal engine: draft creation plus the named transitions, wired to
/// a store, a rate table and a gapless number sequence.
pub struct FiscalEngine<S: DocumentStore> {
    store: S,
    rates: RateTable,
    config: EngineConfig,
    sequence: DocumentNumberSequence,
}

impl<S: DocumentStore> FiscalEngine<S> {
    pub fn new(
        store: S,
        rates: RateTable,
        config: EngineConfig,
        sequence: DocumentNumberSequence,
    ) -> Self {
        Self {
            store,
            rates,
            config,
            sequence,
        }
    }

    /// Create a draft and persist it. Returns the new document's id.
    pub fn create_draft(
        &mut self,
        issuer: Party,
        recipient: Party,
        lines: Vec<LineItem>,
    ) -> Result<Uuid, NotaError> {
        let draft = DraftBuilder::new(issuer, recipient).lines(lines).build()?;
        let id = draft.id;
        self.store.save(VersionedDocument {
            version: 0,
            document: draft,
        })?;
        Ok(id)
    }

    /// Submit a draft: calculate taxes, assign the next gapless number and
    /// a random salt, generate the access key, persist.
    pub fn submit(&mut self, id: Uuid) -> Result<Document, NotaError> {
        let loaded = self.store.load(id)?;
        let issuance = transitions::issuance_for(
            &loaded.document,
            self.config.region_code,
            self.config.model,
            self.sequence.series(),
        )
        .emission_type(self.config.emission_type);

        let number = self.sequence.peek();
        let salt = rand::thread_rng().gen_range(0..=99_999_999u32);

        let submitted =
            transitions::submit(loaded.document, &self.rates, &issuance, number, salt)?;

        self.store.save(VersionedDocument {
            version: loaded.version,
            document: submitted.clone(),
        })?;
        // Consume the number only after the save succeeded, keeping the
        // sequence gapless across failed submissions.
        self.sequence.next_number();
        Ok(submitted)
    }

    /// Record an authority authorization protocol.
    pub fn authorize(
        &mut self,
        id: Uuid,
        protocol_number: impl Into<String>,
        protocol_date: Option<DateTime<Utc>>,
    ) -> Result<Document, NotaError> {
        self.transition(id, |doc| {
            transitions::authorize(doc, protocol_number, protocol_date)
        })
    }

    /// Record an authority rejection.
    pub fn reject(&mut self, id: Uuid, reason: impl Into<String>) -> Result<Document, NotaError> {
        self.transition(id, |doc| transitions::reject(doc, reason))
    }

    /// Cancel an authorized document.
    pub fn cancel(
        &mut self,
        id: Uuid,
        reason: impl Into<String>,
        protocol_number: impl Into<String>,
    ) -> Result<Document, NotaError> {
        self.transition(id, |doc| transitions::cancel(doc, reason, protocol_number))
    }

    /// Create the reversal of an authorized document as a new draft.
    /// Returns the new draft's id; route it through [`Self::submit`] and
    /// [`Self::authorize`] like any other document.
    pub fn reverse(&mut self, id: Uuid, reason: impl Into<String>) -> Result<Uuid, NotaError> {
        let loaded = self.store.load(id)?;
        let reversal = transitions::reverse(&loaded.document, reason)?;
        let reversal_id = reversal.id;
        self.store.save(VersionedDocument {
            version: 0,
            document: reversal,
        })?;
        Ok(reversal_id)
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn transition(
        &mut self,
        id: Uuid,
        op: impl FnOnce(Document) -> Result<Document, NotaError>,
    ) -> Result<Document, NotaError> {
        let loaded = self.store.load(id)?;
        let transitioned = op(loaded.document)?;
        self.store.save(VersionedDocument {
            version: loaded.version,
            document: transitioned.clone(),
        })?;
        Ok(transitioned)
    }
}

/// A map-backed store for tests and examples.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: std::collections::HashMap<Uuid, (u64, Document)>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for InMemoryStore {
    fn load(&self, id: Uuid) -> Result<VersionedDocument, NotaError> {
        self.documents
            .get(&id)
            .map(|(version, document)| VersionedDocument {
                version: *version,
                document: document.clone(),
            })
            .ok_or(NotaError::NotFound(id))
    }

    fn save(&mut self, doc: VersionedDocument) -> Result<(), NotaError> {
        let id = doc.document.id;
        match self.documents.get(&id) {
            None => {
                if doc.version != 0 {
                    return Err(NotaError::ConcurrencyConflict {
                        expected: doc.version,
                        stored: 0,
                    });
                }
                self.documents.insert(id, (1, doc.document));
                Ok(())
            }
            Some((stored, _)) => {
                if *stored != doc.version {
                    return Err(NotaError::ConcurrencyConflict {
                        expected: doc.version,
                        stored: *stored,
                    });
                }
                self.documents.insert(id, (doc.version + 1, doc.document));
                Ok(())
            }
        }
    }
}
