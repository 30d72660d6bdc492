//! Local State Config

use std::path::PathBuf;

use clap::Args;

use crate::storage::FileCartStore;

/// Where the client keeps state between runs.
#[derive(Debug, Args)]
pub struct StateConfig {
    /// JSON file holding the guest cart id
    #[arg(long, env = "SOUNDCART_STATE_FILE", default_value = ".soundcart.json")]
    pub state_file: PathBuf,
}

impl StateConfig {
    /// Anonymous cart store backed by the state file.
    #[must_use]
    pub fn store(&self) -> FileCartStore {
        FileCartStore::new(self.state_file.clone())
    }
}
