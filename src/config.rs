/// Configuration constants for the Reward Cloud API
pub mod api {
    use std::time::Duration;

    /// Base path for the API
    pub const BASE_PATH: &str = "/api";

    /// Token issuance endpoint
    pub const TOKEN: &str = "token";

    pub const ORGANISATIONS: &str = "organisations";
    pub const TEAMS: &str = "teams";
    pub const PROJECTS: &str = "projects";
    pub const ENVIRONMENTS: &str = "environments";
    pub const STATES: &str = "states";
    pub const DATA_TRANSFER_DATA_TYPES: &str = "data_transfer_data_types";
    pub const EXPORTED_DATAS: &str = "exported_datas";
    pub const ENVIRONMENT_ACCESSES: &str = "environment_accesses";
    pub const ENVIRONMENT_ACCESS_FRONTENDS: &str = "environment_access_frontends";
    pub const ENVIRONMENT_ACCESS_BACKENDS: &str = "environment_access_backends";
    pub const ENVIRONMENT_ACCESS_DEV_TOOLS: &str = "environment_access_dev_tools";
    pub const ENVIRONMENT_ACCESS_MAILHOGS: &str = "environment_access_mailhogs";
    pub const ENVIRONMENT_ACCESS_DATABASES: &str = "environment_access_databases";

    /// User agent sent with every request
    pub const USER_AGENT: &str = "reward-cloud-cli";

    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
}

/// Long-running operation polling
pub mod poll {
    use std::time::Duration;

    /// Fixed interval between environment state checks
    pub const INTERVAL: Duration = Duration::from_secs(3);

    /// State name (case-insensitive) that ends a watch
    pub const TERMINAL_STATE: &str = "running";

    /// Data transfer type names used by exports
    pub const DATATYPE_DATABASE: &str = "Database";
    pub const DATATYPE_MEDIA: &str = "Media";
}

/// Local file layout
pub mod paths {
    /// Parent application directory under $HOME
    pub const PARENT_DIR: &str = ".reward";

    /// Plugin configuration directory under the parent directory
    pub const PLUGINS_DIR: &str = "plugins.conf.d";

    /// Application name (directory under the plugins directory)
    pub const APP_NAME: &str = "cloud";

    /// Context configuration file name
    pub const CONFIG_FILE: &str = "config.yml";

    /// Cache directory name under the app directory
    pub const CACHE_DIR: &str = ".cache";

    /// Token cache file name under the cache directory
    pub const TOKEN_FILE: &str = "token";
}

/// Environment variable names
pub mod env {
    pub const ENDPOINT: &str = "REWARD_CLOUD_ENDPOINT";
    pub const ID: &str = "REWARD_CLOUD_ID";
    pub const PASSWORD: &str = "REWARD_CLOUD_PASSWORD";
    pub const TOKEN_FILE: &str = "REWARD_CLOUD_TOKEN_FILE";
    pub const CONFIG_FILE: &str = "REWARD_CLOUD_CONFIG_FILE";
    pub const APP_DIR: &str = "REWARD_CLOUD_APP_DIR";
}

/// Default values for CLI
pub mod defaults {
    /// Default API endpoint (host only, https is implied)
    pub const ENDPOINT: &str = "dev.rewardcloud.itg.cloud";

    /// Default log level
    pub const LOG_LEVEL: &str = "info";
}
