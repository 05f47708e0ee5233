pub mod browser;
pub mod cli;
pub mod config;
pub mod derive;
pub mod descriptor;
pub mod error;
pub mod probe;
pub mod resolver;
pub mod store;

pub use browser::Browser;
pub use config::{Config, Dataset};
pub use derive::{Entry, Project, Session};
pub use descriptor::{EntryOrder, SchemaDescriptor};
pub use error::{Error, Result};
pub use probe::{AncestryProbe, GitProbe, ProbeError};
pub use resolver::{PathCache, PathResolver};
pub use store::{Record, RecordSource, SqliteRecordStore};
