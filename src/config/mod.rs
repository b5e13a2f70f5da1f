mod manager;
mod settings;

pub use manager::{ConfigFile, ConfigManager, DtlConfig};
pub use settings::{
    AMBIGUOUS_PATHS_VAR, CONTAINER_SCAN_LIMIT_VAR, DOCUMENTS_FOLDER_VAR, Overrides,
    PARTIAL_MATCHING_VAR, PREFERRED_CONTAINERS_VAR, SCRATCH_DIR_VAR, Settings, TIMEOUT_VAR,
    mask_secret,
};
