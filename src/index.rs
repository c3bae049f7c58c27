//! Document indexing and vector index persistence.
//!
//! [`DocumentIndexer`] splits a source document into overlapping chunks,
//! embeds each chunk through the configured [`Embedder`], and persists
//! the result under a directory key. The persisted store is a single
//! SQLite file; vectors are stored as little-endian `f32` BLOBs.
//!
//! Lifecycle: an index is built once from a source document if absent,
//! else loaded read-only. The build is all-or-nothing: rows are written
//! to a temporary file which is atomically renamed into place only after
//! every row is committed. Rebuilding requires deleting the persisted
//! directory.

use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::chunking::split_text;
use crate::document::read_document;
use crate::embedding::Embedder;
use crate::error::IndexError;

/// Persisted store filename inside the index directory.
const INDEX_FILE: &str = "index.db";
/// Temporary filename used during the all-or-nothing build commit.
const INDEX_TMP_FILE: &str = "index.db.tmp";
/// Persisted schema version.
const SCHEMA_VERSION: &str = "1";

/// A bounded contiguous slice of a source document used as a retrieval unit.
///
/// Immutable once created. The id is stable, derived from the source path
/// and the chunk's byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    /// Stable identifier: `<source>:<start offset>`.
    pub id: String,
    /// Position of this chunk in original document order.
    pub seq: usize,
    /// Chunk text.
    pub text: String,
    /// Source document path the chunk came from.
    pub source: String,
    /// Byte offset of the chunk start in the source text.
    pub start: usize,
    /// Byte offset one past the chunk end in the source text.
    pub end: usize,
}

/// Summary statistics of a persisted index, for display.
#[derive(Debug, Clone)]
pub struct IndexStats {
    /// Number of chunks in the index.
    pub chunk_count: usize,
    /// Embedding vector dimensionality.
    pub dimension: usize,
    /// Embedding model the index was built with.
    pub embedding_model: String,
    /// Source document path recorded at build time.
    pub source: String,
}

/// In-memory vector index: chunks plus their embedding vectors, in
/// original document order.
///
/// Immutable after construction; safe to share across sessions behind
/// an `Arc`.
#[derive(Debug)]
pub struct VectorIndex {
    chunks: Vec<DocumentChunk>,
    vectors: Vec<Vec<f32>>,
    embedding_model: String,
    dimension: usize,
}

impl VectorIndex {
    /// Number of chunks in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` if the index holds no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embedding vector dimensionality.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embedding model the index was built with.
    #[must_use]
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    /// Iterates over `(chunk, vector)` pairs in original document order.
    pub fn entries(&self) -> impl Iterator<Item = (&DocumentChunk, &[f32])> {
        self.chunks
            .iter()
            .zip(self.vectors.iter().map(Vec::as_slice))
    }

    /// Loads a persisted index from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::SourceNotFound`] if no store file exists,
    /// [`IndexError::ModelMismatch`] if `expected_model` disagrees with
    /// the model recorded at build time, or [`IndexError::Storage`] on
    /// read failures.
    pub fn load(dir: &Path, expected_model: &str) -> Result<Self, IndexError> {
        let db_path = dir.join(INDEX_FILE);
        if !db_path.exists() {
            return Err(IndexError::SourceNotFound { path: db_path });
        }

        let conn = Connection::open(&db_path)?;
        let persisted_model = read_meta(&conn, "embedding_model")?;
        if persisted_model != expected_model {
            return Err(IndexError::ModelMismatch {
                persisted: persisted_model,
                configured: expected_model.to_string(),
            });
        }

        let dimension: usize =
            read_meta(&conn, "dimension")?
                .parse()
                .map_err(|e| IndexError::Build {
                    message: format!("corrupt dimension metadata: {e}"),
                })?;

        let mut stmt = conn.prepare(
            "SELECT c.seq, c.id, c.source, c.start_offset, c.end_offset, c.text, e.vector
             FROM chunks c JOIN embeddings e ON e.seq = c.seq
             ORDER BY c.seq",
        )?;
        let rows = stmt.query_map([], |row| {
            let seq: i64 = row.get(0)?;
            let id: String = row.get(1)?;
            let source: String = row.get(2)?;
            let start: i64 = row.get(3)?;
            let end: i64 = row.get(4)?;
            let text: String = row.get(5)?;
            let blob: Vec<u8> = row.get(6)?;
            Ok((seq, id, source, start, end, text, blob))
        })?;

        let mut chunks = Vec::new();
        let mut vectors = Vec::new();
        for row in rows {
            let (seq, id, source, start, end, text, blob) = row?;
            chunks.push(DocumentChunk {
                id,
                seq: row_offset(seq, "seq")?,
                text,
                source,
                start: row_offset(start, "start_offset")?,
                end: row_offset(end, "end_offset")?,
            });
            vectors.push(blob_to_vec(&blob));
        }

        debug!(chunks = chunks.len(), dimension, "vector index loaded");
        Ok(Self {
            chunks,
            vectors,
            embedding_model: persisted_model,
            dimension,
        })
    }

    /// Whether a persisted index exists under `dir`.
    #[must_use]
    pub fn exists(dir: &Path) -> bool {
        dir.join(INDEX_FILE).exists()
    }

    /// Reads summary statistics from a persisted index without loading
    /// chunk content or checking the configured embedding model.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::SourceNotFound`] if no store file exists,
    /// or [`IndexError::Storage`] on read failures.
    pub fn read_stats(dir: &Path) -> Result<IndexStats, IndexError> {
        let db_path = dir.join(INDEX_FILE);
        if !db_path.exists() {
            return Err(IndexError::SourceNotFound { path: db_path });
        }

        let conn = Connection::open(&db_path)?;
        let chunk_count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |r| r.get(0))?;
        let dimension: usize = read_meta(&conn, "dimension")?.parse().unwrap_or(0);

        Ok(IndexStats {
            chunk_count: usize::try_from(chunk_count).unwrap_or(0),
            dimension,
            embedding_model: read_meta(&conn, "embedding_model")?,
            source: read_meta(&conn, "source")?,
        })
    }
}

/// Builds or loads a persisted [`VectorIndex`] from a source document.
pub struct DocumentIndexer {
    embedder: Arc<dyn Embedder>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl DocumentIndexer {
    /// Creates a new indexer using the given embedder and chunk geometry.
    #[must_use]
    pub fn new(embedder: Arc<dyn Embedder>, chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            embedder,
            chunk_size,
            chunk_overlap,
        }
    }

    /// Builds a vector index from `source` and persists it under `dir`,
    /// or loads the existing persisted index if one is already there.
    ///
    /// Idempotent re-entry: an existing index is *not* re-validated
    /// against the source document's current content. Delete the
    /// directory to force a rebuild.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::SourceNotFound`] if the source document does
    /// not exist, [`IndexError::Build`] if embedding fails for any chunk
    /// (no partial index is left on disk), or [`IndexError::ModelMismatch`]
    /// when loading an index built with a different embedding model.
    pub async fn build_or_load(&self, source: &Path, dir: &Path) -> Result<VectorIndex, IndexError> {
        if dir.join(INDEX_FILE).exists() {
            info!(dir = %dir.display(), "loading existing vector index");
            return VectorIndex::load(dir, self.embedder.model_name());
        }
        self.build(source, dir).await
    }

    /// Builds the index unconditionally, failing if the target store
    /// file already exists.
    async fn build(&self, source: &Path, dir: &Path) -> Result<VectorIndex, IndexError> {
        let text = read_document(source)?;
        let spans = split_text(&text, self.chunk_size, self.chunk_overlap)?;
        let source_str = source.display().to_string();

        info!(
            source = %source_str,
            chunks = spans.len(),
            model = self.embedder.model_name(),
            "building vector index"
        );

        let mut chunks = Vec::with_capacity(spans.len());
        let mut vectors = Vec::with_capacity(spans.len());
        let mut dimension = 0usize;

        for (seq, span) in spans.into_iter().enumerate() {
            let vector = self
                .embedder
                .embed(&span.text)
                .await
                .map_err(|e| IndexError::Build {
                    message: format!("embedding chunk {seq} failed: {e}"),
                })?;

            if seq == 0 {
                dimension = vector.len();
            } else if vector.len() != dimension {
                return Err(IndexError::Build {
                    message: format!(
                        "inconsistent embedding dimension for chunk {seq}: \
                         got {}, expected {dimension}",
                        vector.len()
                    ),
                });
            }

            chunks.push(DocumentChunk {
                id: format!("{source_str}:{}", span.start),
                seq,
                text: span.text,
                source: source_str.clone(),
                start: span.start,
                end: span.end,
            });
            vectors.push(vector);
        }

        let index = VectorIndex {
            chunks,
            vectors,
            embedding_model: self.embedder.model_name().to_string(),
            dimension,
        };

        persist(&index, &source_str, self.chunk_size, self.chunk_overlap, dir)?;
        info!(dir = %dir.display(), chunks = index.len(), "vector index persisted");
        Ok(index)
    }
}

/// Writes the index to `dir` atomically: all rows are committed to a
/// temporary file which is then renamed over the final store path.
fn persist(
    index: &VectorIndex,
    source: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    dir: &Path,
) -> Result<(), IndexError> {
    std::fs::create_dir_all(dir)?;
    let tmp_path = dir.join(INDEX_TMP_FILE);
    if tmp_path.exists() {
        std::fs::remove_file(&tmp_path)?;
    }

    {
        let mut conn = Connection::open(&tmp_path)?;
        conn.execute_batch(
            "CREATE TABLE meta (key TEXT PRIMARY KEY, value TEXT NOT NULL);
             CREATE TABLE chunks (
                 seq          INTEGER PRIMARY KEY,
                 id           TEXT NOT NULL UNIQUE,
                 source       TEXT NOT NULL,
                 start_offset INTEGER NOT NULL,
                 end_offset   INTEGER NOT NULL,
                 text         TEXT NOT NULL
             );
             CREATE TABLE embeddings (
                 seq    INTEGER PRIMARY KEY REFERENCES chunks(seq),
                 vector BLOB NOT NULL
             );",
        )?;

        let tx = conn.transaction()?;
        for (key, value) in [
            ("schema_version", SCHEMA_VERSION.to_string()),
            ("embedding_model", index.embedding_model.clone()),
            ("dimension", index.dimension.to_string()),
            ("source", source.to_string()),
            ("chunk_size", chunk_size.to_string()),
            ("chunk_overlap", chunk_overlap.to_string()),
        ] {
            tx.execute("INSERT INTO meta (key, value) VALUES (?1, ?2)", (key, value))?;
        }

        for (chunk, vector) in index.entries() {
            tx.execute(
                "INSERT INTO chunks (seq, id, source, start_offset, end_offset, text)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (
                    i64::try_from(chunk.seq).unwrap_or(i64::MAX),
                    &chunk.id,
                    &chunk.source,
                    i64::try_from(chunk.start).unwrap_or(i64::MAX),
                    i64::try_from(chunk.end).unwrap_or(i64::MAX),
                    &chunk.text,
                ),
            )?;
            tx.execute(
                "INSERT INTO embeddings (seq, vector) VALUES (?1, ?2)",
                (
                    i64::try_from(chunk.seq).unwrap_or(i64::MAX),
                    vec_to_blob(vector),
                ),
            )?;
        }
        tx.commit()?;
    }

    std::fs::rename(&tmp_path, dir.join(INDEX_FILE))?;
    Ok(())
}

/// Converts a persisted row integer, rejecting values outside `usize`.
fn row_offset(value: i64, column: &str) -> Result<usize, IndexError> {
    usize::try_from(value).map_err(|_| IndexError::Build {
        message: format!("corrupt chunk row: {column} = {value}"),
    })
}

/// Reads a single value from the meta table.
fn read_meta(conn: &Connection, key: &str) -> Result<String, IndexError> {
    Ok(conn.query_row("SELECT value FROM meta WHERE key = ?1", [key], |r| {
        r.get(0)
    })?)
}

/// Encodes a float vector as little-endian bytes for BLOB storage.
fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decodes a BLOB back into a float vector.
fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
