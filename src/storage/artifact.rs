//! Persistence of fitted pipeline components.
//!
//! Each fitted component is stored as its own named blob so that it can be
//! written or replaced independently:
//!
//! | name                 | contents                         |
//! |----------------------|----------------------------------|
//! | `vectorizer.bin`     | [`VectorizerState`]              |
//! | `classifier.bin`     | [`LogisticRegression`]           |
//! | `label_encoder.bin`  | [`LabelEncoder`]                 |
//!
//! Every blob is a bincode-encoded [`ArtifactEnvelope`]: a magic tag, the
//! artifact kind, a format version and a CRC32 of the payload. Any mismatch
//! on load is reported as [`SentimentError::ArtifactCorrupt`]; a blob that
//! does not exist is [`SentimentError::ArtifactMissing`].
//!
//! Writes go to a temporary name first and are renamed into place, so a
//! reader never observes a half-written artifact.

use std::io::Write;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::TweetNormalizer;
use crate::error::{Result, SentimentError};
use crate::ml::label::LabelEncoder;
use crate::ml::logistic::LogisticRegression;
use crate::ml::tfidf::{TfIdfVectorizer, VectorizerState};
use crate::pipeline::SentimentPipeline;
use crate::storage::traits::Storage;

pub const VECTORIZER_ARTIFACT: &str = "vectorizer.bin";
pub const CLASSIFIER_ARTIFACT: &str = "classifier.bin";
pub const LABEL_ENCODER_ARTIFACT: &str = "label_encoder.bin";

/// Tag at the start of every artifact envelope.
pub const ARTIFACT_MAGIC: [u8; 4] = *b"TWSA";

/// Version of the envelope and payload layout.
pub const FORMAT_VERSION: u32 = 1;

/// What an artifact blob contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Vectorizer,
    Classifier,
    LabelEncoder,
}

impl ArtifactKind {
    /// The storage name the kind is saved under.
    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::Vectorizer => VECTORIZER_ARTIFACT,
            ArtifactKind::Classifier => CLASSIFIER_ARTIFACT,
            ArtifactKind::LabelEncoder => LABEL_ENCODER_ARTIFACT,
        }
    }

    pub fn all() -> [ArtifactKind; 3] {
        [
            ArtifactKind::Vectorizer,
            ArtifactKind::Classifier,
            ArtifactKind::LabelEncoder,
        ]
    }
}

/// Self-describing wrapper around a serialized component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEnvelope {
    pub magic: [u8; 4],
    pub kind: ArtifactKind,
    pub format_version: u32,
    pub checksum: u32,
    pub payload: Vec<u8>,
}

impl ArtifactEnvelope {
    /// Serialize `value` and wrap it.
    pub fn wrap<T: Serialize>(kind: ArtifactKind, value: &T) -> Result<Self> {
        let payload = bincode::serialize(value).map_err(|e| {
            SentimentError::storage(format!("Failed to serialize {}: {e}", kind.file_name()))
        })?;

        Ok(ArtifactEnvelope {
            magic: ARTIFACT_MAGIC,
            kind,
            format_version: FORMAT_VERSION,
            checksum: crc32fast::hash(&payload),
            payload,
        })
    }

    /// Encode the envelope itself.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| SentimentError::storage(format!("Failed to encode artifact: {e}")))
    }

    /// Decode and verify an envelope of the expected kind.
    pub fn from_bytes(name: &str, expected: ArtifactKind, bytes: &[u8]) -> Result<Self> {
        let envelope: ArtifactEnvelope = bincode::deserialize(bytes)
            .map_err(|e| SentimentError::corrupt(name, format!("undecodable envelope: {e}")))?;

        if envelope.magic != ARTIFACT_MAGIC {
            return Err(SentimentError::corrupt(name, "bad magic tag"));
        }
        if envelope.kind != expected {
            return Err(SentimentError::corrupt(
                name,
                format!("expected {expected:?} artifact, found {:?}", envelope.kind),
            ));
        }
        if envelope.format_version != FORMAT_VERSION {
            return Err(SentimentError::corrupt(
                name,
                format!(
                    "unsupported format version {} (expected {FORMAT_VERSION})",
                    envelope.format_version
                ),
            ));
        }
        let actual = crc32fast::hash(&envelope.payload);
        if actual != envelope.checksum {
            return Err(SentimentError::corrupt(
                name,
                format!(
                    "checksum mismatch (stored {:08x}, computed {actual:08x})",
                    envelope.checksum
                ),
            ));
        }

        Ok(envelope)
    }

    /// Deserialize the payload.
    pub fn unwrap_payload<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        bincode::deserialize(&self.payload)
            .map_err(|e| SentimentError::corrupt(name, format!("undecodable payload: {e}")))
    }
}

/// Reads and writes the fitted components in a [`Storage`] backend.
#[derive(Debug, Clone)]
pub struct ArtifactStore<S: Storage> {
    storage: S,
}

impl<S: Storage> ArtifactStore<S> {
    pub fn new(storage: S) -> Self {
        ArtifactStore { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Whether every artifact needed for a pipeline is present.
    pub fn is_complete(&self) -> bool {
        ArtifactKind::all()
            .iter()
            .all(|kind| self.storage.file_exists(kind.file_name()))
    }

    /// Names of the artifacts that are absent.
    pub fn missing(&self) -> Vec<&'static str> {
        ArtifactKind::all()
            .iter()
            .map(|kind| kind.file_name())
            .filter(|name| !self.storage.file_exists(name))
            .collect()
    }

    /// Save the vectorizer's counts and vocabulary.
    pub fn save_vectorizer(&self, vectorizer: &TfIdfVectorizer) -> Result<()> {
        self.write(ArtifactKind::Vectorizer, &vectorizer.to_state()?)
    }

    /// Load a vectorizer, rebuilding it around a fresh [`TweetNormalizer`].
    pub fn load_vectorizer(&self) -> Result<TfIdfVectorizer> {
        let name = ArtifactKind::Vectorizer.file_name();
        let state: VectorizerState = self.read(ArtifactKind::Vectorizer)?;
        let normalizer = Arc::new(TweetNormalizer::new()?);
        TfIdfVectorizer::from_state(state, normalizer)
            .map_err(|e| SentimentError::corrupt(name, e.to_string()))
    }

    pub fn save_classifier(&self, classifier: &LogisticRegression) -> Result<()> {
        if !classifier.is_fitted() {
            return Err(SentimentError::NotFitted("classifier"));
        }
        self.write(ArtifactKind::Classifier, classifier)
    }

    pub fn load_classifier(&self) -> Result<LogisticRegression> {
        let name = ArtifactKind::Classifier.file_name();
        let classifier: LogisticRegression = self.read(ArtifactKind::Classifier)?;
        classifier
            .validate()
            .map_err(|e| SentimentError::corrupt(name, e.to_string()))?;
        Ok(classifier)
    }

    pub fn save_label_encoder(&self, encoder: &LabelEncoder) -> Result<()> {
        self.write(ArtifactKind::LabelEncoder, encoder)
    }

    pub fn load_label_encoder(&self) -> Result<LabelEncoder> {
        let name = ArtifactKind::LabelEncoder.file_name();
        let encoder: LabelEncoder = self.read(ArtifactKind::LabelEncoder)?;
        encoder
            .validate()
            .map_err(|e| SentimentError::corrupt(name, e.to_string()))?;
        Ok(encoder)
    }

    /// Save all three components of a fitted pipeline.
    pub fn save_pipeline(&self, pipeline: &SentimentPipeline) -> Result<()> {
        let (vectorizer, classifier, encoder) = pipeline.parts()?;
        self.save_vectorizer(vectorizer)?;
        self.save_classifier(classifier)?;
        self.save_label_encoder(encoder)?;
        self.storage.sync()?;
        log::info!("saved pipeline artifacts");
        Ok(())
    }

    /// Load all three components and check that their shapes agree.
    pub fn load_pipeline(&self) -> Result<SentimentPipeline> {
        let vectorizer = self.load_vectorizer()?;
        let classifier = self.load_classifier()?;
        let encoder = self.load_label_encoder()?;
        log::debug!(
            "loaded artifacts: {} features, {} classes",
            vectorizer.vocabulary_size(),
            encoder.len()
        );
        SentimentPipeline::from_parts(vectorizer, classifier, encoder)
    }

    /// Remove every artifact this store manages.
    pub fn clear(&self) -> Result<()> {
        for kind in ArtifactKind::all() {
            self.storage.delete_file(kind.file_name())?;
        }
        Ok(())
    }

    fn write<T: Serialize>(&self, kind: ArtifactKind, value: &T) -> Result<()> {
        let name = kind.file_name();
        let bytes = ArtifactEnvelope::wrap(kind, value)?.to_bytes()?;
        let temp_name = format!("{name}.tmp");

        let mut output = self.storage.create_output(&temp_name)?;
        output.write_all(&bytes)?;
        output.close()?;
        drop(output);

        self.storage.rename_file(&temp_name, name)?;
        log::debug!("wrote {name} ({} bytes)", bytes.len());
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, kind: ArtifactKind) -> Result<T> {
        let name = kind.file_name();
        if !self.storage.file_exists(name) {
            return Err(SentimentError::missing(name));
        }

        let bytes = self.storage.open_input(name)?.read_all()?;
        ArtifactEnvelope::from_bytes(name, kind, &bytes)?.unwrap_payload(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    fn store() -> ArtifactStore<MemoryStorage> {
        ArtifactStore::new(MemoryStorage::new())
    }

    #[test]
    fn test_label_encoder_round_trip() {
        let store = store();
        let encoder = LabelEncoder::fit(&["positive", "negative"]).unwrap();

        store.save_label_encoder(&encoder).unwrap();
        assert_eq!(store.load_label_encoder().unwrap(), encoder);
        assert_eq!(store.storage().list_files().unwrap(), vec![LABEL_ENCODER_ARTIFACT]);
    }

    #[test]
    fn test_missing_artifact() {
        let store = store();
        let err = store.load_classifier().unwrap_err();
        assert!(matches!(err, SentimentError::ArtifactMissing { ref name } if name == CLASSIFIER_ARTIFACT));
        assert!(err.is_io_error());
        assert!(!store.is_complete());
        assert_eq!(store.missing().len(), 3);
    }

    #[test]
    fn test_checksum_mismatch() {
        let store = store();
        let encoder = LabelEncoder::fit(&["a", "b"]).unwrap();
        store.save_label_encoder(&encoder).unwrap();

        let mut bytes = store.storage().get(LABEL_ENCODER_ARTIFACT).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        store.storage().put(LABEL_ENCODER_ARTIFACT, bytes);

        let err = store.load_label_encoder().unwrap_err();
        assert!(matches!(err, SentimentError::ArtifactCorrupt { ref reason, .. } if reason.contains("checksum")));
    }

    #[test]
    fn test_wrong_kind() {
        let store = store();
        let encoder = LabelEncoder::fit(&["a", "b"]).unwrap();
        let bytes = ArtifactEnvelope::wrap(ArtifactKind::LabelEncoder, &encoder)
            .unwrap()
            .to_bytes()
            .unwrap();
        store.storage().put(CLASSIFIER_ARTIFACT, bytes);

        let err = store.load_classifier().unwrap_err();
        assert!(matches!(err, SentimentError::ArtifactCorrupt { ref name, ref reason }
            if name == CLASSIFIER_ARTIFACT && reason.contains("LabelEncoder")));
    }

    #[test]
    fn test_bad_magic_and_version() {
        let encoder = LabelEncoder::fit(&["a"]).unwrap();
        let mut envelope = ArtifactEnvelope::wrap(ArtifactKind::LabelEncoder, &encoder).unwrap();

        envelope.magic = *b"NOPE";
        let err = ArtifactEnvelope::from_bytes("x", ArtifactKind::LabelEncoder, &envelope.to_bytes().unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("bad magic"));

        envelope.magic = ARTIFACT_MAGIC;
        envelope.format_version = FORMAT_VERSION + 1;
        let err = ArtifactEnvelope::from_bytes("x", ArtifactKind::LabelEncoder, &envelope.to_bytes().unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("format version"));
    }

    #[test]
    fn test_truncated_blob() {
        let store = store();
        store.storage().put(LABEL_ENCODER_ARTIFACT, vec![b'T', b'W']);
        let err = store.load_label_encoder().unwrap_err();
        assert!(matches!(err, SentimentError::ArtifactCorrupt { .. }));
    }

    #[test]
    fn test_invalid_label_encoder_payload() {
        #[derive(Serialize)]
        struct Raw {
            classes: Vec<String>,
        }
        let store = store();
        let raw = Raw {
            classes: vec!["b".into(), "a".into()],
        };
        let bytes = ArtifactEnvelope::wrap(ArtifactKind::LabelEncoder, &raw)
            .unwrap()
            .to_bytes()
            .unwrap();
        store.storage().put(LABEL_ENCODER_ARTIFACT, bytes);

        let err = store.load_label_encoder().unwrap_err();
        assert!(matches!(err, SentimentError::ArtifactCorrupt { .. }));
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let store = store();
        store
            .save_label_encoder(&LabelEncoder::fit(&["x"]).unwrap())
            .unwrap();
        assert!(store
            .storage()
            .list_files()
            .unwrap()
            .iter()
            .all(|name| !name.ends_with(".tmp")));
    }
}
