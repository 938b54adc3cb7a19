use crate::error::{Result, ScdError};
use crate::instruction::Instruction;
use crate::rdt::RdtFile;
use crate::script::ScriptStream;
use indexmap::IndexMap;
use log::debug;
use std::collections::HashSet;
use std::fmt::Write;

pub const INIT_UNIT: &str = "init.scd";

/// Name of the `n`th function unit of a room script
pub fn unit_name(n: usize) -> String {
    format!("sub{}.scd", n)
}

/// Output mode options for unit rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    /// Prefix every line with the instruction's program counter
    pub show_addresses: bool,
    /// Produce the raw hex listing
    pub dump_hex: bool,
    /// Produce the call-style listing
    pub dump_code: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        OutputOptions {
            show_addresses: false,
            dump_hex: true,
            dump_code: true,
        }
    }
}

/// A named run of instructions in increasing program counter order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassembledUnit {
    pub name: String,
    pub instructions: Vec<Instruction>,
}

impl DisassembledUnit {
    pub fn new(name: impl Into<String>) -> Self {
        DisassembledUnit {
            name: name.into(),
            instructions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn program_counters(&self) -> Vec<usize> {
        self.instructions.iter().map(|i| i.program_counter).collect()
    }

    /// One line per instruction: its bytes as lowercase hex pairs
    pub fn render_hex(&self, options: &OutputOptions) -> String {
        let mut out = String::new();
        for instruction in &self.instructions {
            push_address(&mut out, instruction, options);
            out.push_str(&instruction.hex());
            out.push('\n');
        }
        out
    }

    /// One line per instruction: `Name(params);`
    pub fn render_code(&self, options: &OutputOptions) -> Result<String> {
        let mut out = String::new();
        for instruction in &self.instructions {
            push_address(&mut out, instruction, options);
            out.push_str(&instruction.call()?);
            out.push('\n');
        }
        Ok(out)
    }
}

fn push_address(out: &mut String, instruction: &Instruction, options: &OutputOptions) {
    if options.show_addresses {
        let _ = write!(out, "{:04x}: ", instruction.program_counter);
    }
}

/// Group a room script into `sub0.scd`, `sub1.scd`, ... units.
///
/// A new unit opens at every recorded function start above 0 and every
/// other instruction joins the unit currently open. Unit numbers count
/// boundaries, so when the first instruction already sits on a boundary
/// the first unit is `sub1.scd`. Units without instructions are not kept.
pub fn split(stream: &ScriptStream) -> IndexMap<String, DisassembledUnit> {
    let starts: HashSet<usize> = stream
        .function_starts()
        .iter()
        .copied()
        .filter(|&pc| pc > 0)
        .collect();

    let mut units = IndexMap::new();
    let mut index = 0;
    let mut current = DisassembledUnit::new(unit_name(index));

    for instruction in stream.iter() {
        if starts.contains(&instruction.program_counter) {
            if !current.is_empty() {
                units.insert(current.name.clone(), current);
            }
            index += 1;
            current = DisassembledUnit::new(unit_name(index));
        }
        current.instructions.push(instruction.clone());
    }
    if !current.is_empty() {
        units.insert(current.name.clone(), current);
    }

    debug!(
        "split {} instructions into {} units",
        stream.len(),
        units.len()
    );
    units
}

/// The init script as one unit, however many functions it declares
pub fn init_unit(stream: &ScriptStream) -> DisassembledUnit {
    DisassembledUnit {
        name: INIT_UNIT.to_string(),
        instructions: stream.iter().cloned().collect(),
    }
}

/// Every unit of one container in display order: `init.scd`, then the
/// room script's units in numeric order.
#[derive(Debug, Clone, Default)]
pub struct Disassembly {
    units: IndexMap<String, DisassembledUnit>,
}

impl Disassembly {
    pub fn new(rdt: &RdtFile) -> Self {
        Disassembly::from_streams(&rdt.init_script, &rdt.room_script)
    }

    pub fn from_streams(init: &ScriptStream, room: &ScriptStream) -> Self {
        let mut units = IndexMap::new();
        let init = init_unit(init);
        units.insert(init.name.clone(), init);
        units.extend(split(room));
        Disassembly { units }
    }

    pub fn get(&self, name: &str) -> Option<&DisassembledUnit> {
        self.units.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(|k| k.as_str())
    }

    pub fn units(&self) -> impl Iterator<Item = &DisassembledUnit> {
        self.units.values()
    }

    /// The named unit alone, or every unit in display order
    pub fn select(&self, name: Option<&str>) -> Result<Vec<&DisassembledUnit>> {
        match name {
            Some(name) => {
                let unit = self
                    .get(name)
                    .ok_or_else(|| ScdError::UnknownUnit(name.to_string()))?;
                Ok(vec![unit])
            }
            None => Ok(self.units().collect()),
        }
    }

    /// One line per unit: name and instruction count
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for unit in self.units() {
            let _ = writeln!(out, "{:<12}{:>6}", unit.name, unit.len());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Console listing of `units`: a `; name` line, the hex listing, a blank
/// line, the call listing, then a blank line after each unit.
pub fn render_units(units: &[&DisassembledUnit], options: &OutputOptions) -> Result<String> {
    let mut out = String::new();
    for unit in units {
        let _ = writeln!(out, "; {}", unit.name);
        if options.dump_hex {
            out.push_str(&unit.render_hex(options));
        }
        if options.dump_code {
            if options.dump_hex {
                out.push('\n');
            }
            out.push_str(&unit.render_code(options)?);
        }
        out.push('\n');
    }
    Ok(out)
}
