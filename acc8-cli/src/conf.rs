//! Application configuration, read from an optional YAML file.
use std::{fs, path::Path};

use acc8::prelude::Acc8Conf;
use acc8_compiler::CompilerConf;
use serde::Deserialize;

use crate::error::AppError;

/// Top level of the configuration file.
///
/// ```yaml
/// verbose: false
/// compiler:
///   show_cst: true
///   show_tables: true
/// vm:
///   max_steps: 100000
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConf {
    pub verbose: bool,
    pub compiler: CompilerConf,
    pub vm: Acc8Conf,
}

impl AppConf {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_config() {
        let conf: AppConf = serde_yaml::from_str("compiler:\n  show_cst: true\nvm:\n  max_steps: 50\n").unwrap();
        assert!(!conf.verbose);
        assert!(conf.compiler.show_cst);
        // Unspecified fields keep their defaults.
        assert!(conf.compiler.show_symbols);
        assert_eq!(conf.vm.max_steps, Some(50));
    }
}
