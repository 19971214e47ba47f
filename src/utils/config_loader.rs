use dotenvy::dotenv;
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use std::{env, fs};
use thiserror::Error;

#[allow(clippy::enum_variant_names)]
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Pattern error: {0}")]
    PatternError(#[from] regex::Error),
    #[error("Error loading config: {0}")]
    ConfigError(String),
}

pub trait ConfigLoaderSync {
    type SectionType;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError>;
}

/// Read a TOML file, expanding `${VAR}` references from the environment (and `.env`) first.
pub fn load_from_file_sync<T: DeserializeOwned>(file_name: String) -> Result<T, LoadConfigError> {
    dotenv().ok();
    let contents = fs::read_to_string(file_name)?;
    load_from_str(&contents)
}

pub fn load_from_str<T: DeserializeOwned>(contents: &str) -> Result<T, LoadConfigError> {
    load_from_str_with(contents, |name| env::var(name).ok())
}

/// Like [`load_from_str`], resolving `${VAR}` through `lookup` instead of the process environment.
pub fn load_from_str_with<T: DeserializeOwned>(
    contents: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<T, LoadConfigError> {
    let contents = expand_vars_with(contents, lookup)?;
    let config: T = toml::from_str(&contents)?;
    Ok(config)
}

/// Replace every `${VAR}` that `lookup` resolves; unresolved references are left as written.
pub fn expand_vars_with(raw_config: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<String, LoadConfigError> {
    let re = Regex::new(r"\$\{([a-zA-Z_][0-9a-zA-Z_]*)\}")?;
    Ok(re
        .replace_all(raw_config, |caps: &Captures| match lookup(&caps[1]) {
            Some(val) => val,
            None => caps[0].to_string(),
        })
        .to_string())
}
