//! Batch dump configuration and the `project.toml` manifest written next
//! to dumped units.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::disassembler::{Disassembly, OutputOptions};
use crate::error::{Result, ScdError};
use crate::rdt::RdtFile;

pub const MANIFEST_FILE: &str = "project.toml";

/// Settings read from a `--config` TOML file. Missing keys keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpConfig {
    pub output_dir: Option<PathBuf>,
    pub show_addresses: bool,
    pub dump_hex: bool,
    pub dump_code: bool,
    pub unit_extension_hex: String,
    pub unit_extension_code: String,
}

impl Default for DumpConfig {
    fn default() -> Self {
        DumpConfig {
            output_dir: None,
            show_addresses: false,
            dump_hex: true,
            dump_code: true,
            unit_extension_hex: "hex".to_string(),
            unit_extension_code: "txt".to_string(),
        }
    }
}

impl DumpConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        debug!("loaded dump config from {}", path.display());
        DumpConfig::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: DumpConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.dump_hex && !self.dump_code {
            return Err(ScdError::Config(
                "both dump_hex and dump_code are off, nothing to write".to_string(),
            ));
        }
        for ext in [&self.unit_extension_hex, &self.unit_extension_code] {
            if ext.is_empty() || ext.contains(['/', '\\', '.']) {
                return Err(ScdError::Config(format!(
                    "invalid unit file extension {:?}",
                    ext
                )));
            }
        }
        if self.dump_hex && self.dump_code && self.unit_extension_hex == self.unit_extension_code
        {
            return Err(ScdError::Config(format!(
                "hex and code listings would both be written as .{}",
                self.unit_extension_hex
            )));
        }
        Ok(())
    }

    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            show_addresses: self.show_addresses,
            dump_hex: self.dump_hex,
            dump_code: self.dump_code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitEntry {
    pub name: String,
    pub instructions: usize,
    pub hex_file: Option<PathBuf>,
    pub code_file: Option<PathBuf>,
}

/// Contents of `project.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub source: Option<PathBuf>,
    pub init_script_offset: u32,
    pub execute_script_offset: u32,
    pub units: Vec<UnitEntry>,
}

/// Write every unit to `dir` as `<name>.<ext>` listings plus a
/// `project.toml` manifest describing them.
pub fn write_units(
    rdt: &RdtFile,
    disassembly: &Disassembly,
    config: &DumpConfig,
    dir: &Path,
    source: Option<&Path>,
) -> Result<ProjectManifest> {
    config.validate()?;
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let options = config.output_options();
    let mut units = Vec::new();
    for unit in disassembly.units() {
        let mut entry = UnitEntry {
            name: unit.name.clone(),
            instructions: unit.len(),
            hex_file: None,
            code_file: None,
        };
        if config.dump_hex {
            let file = PathBuf::from(format!("{}.{}", unit.name, config.unit_extension_hex));
            fs::write(dir.join(&file), unit.render_hex(&options))?;
            entry.hex_file = Some(file);
        }
        if config.dump_code {
            let file = PathBuf::from(format!("{}.{}", unit.name, config.unit_extension_code));
            fs::write(dir.join(&file), unit.render_code(&options)?)?;
            entry.code_file = Some(file);
        }
        units.push(entry);
    }

    let manifest = ProjectManifest {
        source: source.map(Path::to_path_buf),
        init_script_offset: rdt.offsets.init_script,
        execute_script_offset: rdt.offsets.execute_script,
        units,
    };

    let mut writer = fs::File::create(dir.join(MANIFEST_FILE))?;
    let serialized = toml::to_string_pretty(&manifest)?;
    writer.write_all(serialized.as_bytes())?;

    info!(
        "wrote {} units to {}",
        manifest.units.len(),
        dir.display()
    );
    Ok(manifest)
}
