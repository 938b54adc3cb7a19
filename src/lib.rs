#![crate_name = "scdasm"]

#[macro_use]
extern crate lazy_static;

pub mod config;
pub mod disassembler;
pub mod error;
pub mod instruction;
pub mod layouts;
pub mod opcode_tables;
pub mod rdt;
pub mod script;
pub mod section;

pub use disassembler::{render_units, split, DisassembledUnit, Disassembly, OutputOptions};
pub use error::{Result, ScdError};
pub use instruction::{decode, Instruction};
pub use rdt::{load, load_file, RdtFile};
pub use script::{decode_stream, ScriptStream};


/*
Container layout (all little-endian)

0x00  8 x u8    counts: sprites, cameras, models, items, doors, rooms,
                reverb, sprite max
0x08  23 x u32  resource offsets; index 16 is the init script, index 17
                the execute (room) script
0x64  ...       resources

Script stream

0x00  u16 x n   function offsets, n = first / 2
first ...       function bodies, each a run of opcode-tagged records
                ending at EvtEnd (0x01) or at the next function
*/
