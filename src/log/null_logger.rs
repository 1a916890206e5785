//! Backend used when the `logging` feature is off. Nothing is written anywhere, but the `log`
//! max level still tracks the configuration so filtered-out macros stay cheap.

use log::LevelFilter;

use crate::log::LogConfiguration;

impl LogConfiguration {
    /// Sets the `log` max level to the most verbose level any filter allows.
    pub(in crate::log) fn set_config(&mut self) {
        let module_level = self
            .module_configurations
            .values()
            .map(|module_config| module_config.level)
            .max()
            .unwrap_or(LevelFilter::Off);
        log::set_max_level(self.global_log_level.max(module_level));
    }
}
