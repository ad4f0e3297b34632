//! Artifact persistence for the tabforge training service.
//!
//! Everything a job produces (dataset, model, evaluation, training
//! arguments, status journal, metadata) is an artifact keyed by
//! `(token, kind)`. The [`ArtifactStore`] trait abstracts the physical
//! storage so the pipeline can be tested against an in-memory fake; the
//! filesystem backend is the production implementation.

pub mod artifact;
pub mod fs;
pub mod journal;
pub mod mem;

pub use artifact::{read_bin, read_json, write_bin, write_json};
pub use artifact::{ArtifactKind, ArtifactStore, StoreError};
pub use fs::FsStore;
pub use journal::StatusJournal;
pub use mem::MemStore;
