use std::collections::BTreeMap;

use crate::config::ProjectSettings;
use crate::platform::Device;

/// Named values substituted into rendered template files.
///
/// Built once per run and passed read-only through the pipeline. Every name
/// is always present; values that do not apply (an unknown platform's device
/// bytes, the kernel path of a downloaded kernel) are empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVariables {
    values: BTreeMap<&'static str, String>,
}

impl TemplateVariables {
    /// Variable names, in the order they are listed in diagnostics.
    pub const NAMES: [&'static str; 11] = [
        "project_name",
        "assembler",
        "compiler",
        "emulator",
        "debugger",
        "platform",
        "key",
        "fat",
        "privileged",
        "upgrade_ext",
        "kernel_path",
    ];

    /// Derive the variables for `project_name` from merged settings.
    #[must_use]
    pub fn new(project_name: &str, settings: &ProjectSettings) -> Self {
        let device = Device::lookup(&settings.platform);
        let hex = |byte: Option<u8>| byte.map(|b| format!("{b:02X}")).unwrap_or_default();

        let values = BTreeMap::from([
            ("project_name", project_name.to_string()),
            ("assembler", settings.assembler.clone()),
            ("compiler", settings.compiler.clone()),
            ("emulator", settings.emulator.clone()),
            ("debugger", settings.debugger.clone()),
            ("platform", settings.platform.clone()),
            ("key", hex(device.map(Device::key))),
            ("fat", hex(device.map(Device::fat))),
            ("privileged", hex(device.map(Device::privileged))),
            (
                "upgrade_ext",
                device.map(Device::upgrade_ext).unwrap_or_default().to_string(),
            ),
            (
                "kernel_path",
                settings
                    .kernel_source
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
        ]);
        Self { values }
    }

    /// Look up a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// All variables, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }
}
