//! One dataset, ready to browse
//!
//! Binds a record store, the shared path resolver and the dataset's schema
//! descriptor so callers can walk projects, sessions and entries without
//! threading all three through every call.

use std::sync::Arc;

use crate::config::{Config, Dataset};
use crate::derive::{self, Entry, Project, Session};
use crate::descriptor::SchemaDescriptor;
use crate::error::{Error, Result};
use crate::resolver::PathResolver;
use crate::store::{Record, RecordSource, SqliteRecordStore};

pub struct Browser<S: RecordSource> {
    store: S,
    resolver: Arc<PathResolver>,
    descriptor: SchemaDescriptor,
}

impl<S: RecordSource> Browser<S> {
    pub fn new(store: S, resolver: Arc<PathResolver>, descriptor: SchemaDescriptor) -> Result<Self> {
        descriptor.validate()?;
        Ok(Self {
            store,
            resolver,
            descriptor,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn descriptor(&self) -> &SchemaDescriptor {
        &self.descriptor
    }

    /// Canonical project path of a raw working directory
    pub fn canonicalize(&self, path: &str) -> String {
        self.resolver.resolve(path)
    }

    pub fn projects(&self) -> Result<Vec<Project>> {
        derive::list_projects(&self.store, &self.resolver)
    }

    pub fn sessions(&self, project_path: &str) -> Result<Vec<Session>> {
        derive::list_sessions(&self.store, &self.resolver, project_path, &self.descriptor)
    }

    pub fn entries(&self, project_path: &str, session_id: &str) -> Result<Vec<Entry>> {
        derive::list_entries(
            &self.store,
            &self.resolver,
            project_path,
            session_id,
            &self.descriptor,
        )
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<Entry>> {
        derive::recent_entries(&self.store, &self.resolver, limit)
    }

    pub fn records(&self, ids: &[String]) -> Result<Vec<Record>> {
        self.store.records_by_ids(ids)
    }
}

impl Browser<SqliteRecordStore> {
    /// Open the configured database for `dataset`, read-only.
    pub fn open(config: &Config, dataset: Dataset, resolver: Arc<PathResolver>) -> Result<Self> {
        config.validate_dataset(dataset)?;
        let path = config.database_path(dataset).ok_or_else(|| {
            Error::Config(format!("no database configured for {}", dataset.as_str()))
        })?;

        let store = SqliteRecordStore::open(&path)?;
        let descriptor = config.descriptor(dataset);
        if descriptor.include_file_path && !store.has_file_path() {
            tracing::warn!(
                dataset = dataset.as_str(),
                path = %path.display(),
                "database has no filepath column, sessions will not be split by file"
            );
        }

        tracing::debug!(dataset = dataset.as_str(), path = %path.display(), "opened record store");
        Self::new(store, resolver, descriptor)
    }
}
