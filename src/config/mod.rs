mod env_vars;
mod upload_config;

pub use upload_config::{load_config, UploadConfig};

pub use env_vars::{expand_path, normalize_path_for_os, parse_unix_env_vars, parse_windows_env_vars};
