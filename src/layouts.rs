//! Binary record layouts for script instructions.
//!
//! Every record starts with its opcode byte; a layout lists the fields that
//! follow it, in order, with their width and signedness. All multi-byte
//! fields are little-endian and nothing is padded. A layout may be shorter
//! than its opcode's record (CALC leaves its last byte unread), never longer.

use crate::error::{Result, ScdError};
use std::fmt::Write;

/// Width and signedness of one record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    I8,
    U16,
    I16,
    /// Run of unsigned bytes, rendered as `[a,b,c]`
    Bytes(usize),
    /// Three signed 16-bit values, rendered as `[x, y, z]`
    Vec3I16,
    /// Three unsigned 16-bit values, rendered as `[x, y, z]`
    Vec3U16,
}

impl FieldKind {
    pub const fn size(&self) -> usize {
        match self {
            FieldKind::U8 | FieldKind::I8 => 1,
            FieldKind::U16 | FieldKind::I16 => 2,
            FieldKind::Bytes(n) => *n,
            FieldKind::Vec3I16 | FieldKind::Vec3U16 => 6,
        }
    }
}

/// A named field inside a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn u8(name: &'static str) -> Self {
        Field {
            name,
            kind: FieldKind::U8,
        }
    }

    pub const fn i8(name: &'static str) -> Self {
        Field {
            name,
            kind: FieldKind::I8,
        }
    }

    pub const fn u16(name: &'static str) -> Self {
        Field {
            name,
            kind: FieldKind::U16,
        }
    }

    pub const fn i16(name: &'static str) -> Self {
        Field {
            name,
            kind: FieldKind::I16,
        }
    }

    pub const fn bytes(name: &'static str, len: usize) -> Self {
        Field {
            name,
            kind: FieldKind::Bytes(len),
        }
    }

    pub const fn vec3(name: &'static str) -> Self {
        Field {
            name,
            kind: FieldKind::Vec3I16,
        }
    }

    pub const fn uvec3(name: &'static str) -> Self {
        Field {
            name,
            kind: FieldKind::Vec3U16,
        }
    }
}

pub type Layout = &'static [Field];

/// Total bytes a layout reads, opcode included
pub fn layout_size(layout: &[Field]) -> usize {
    1 + layout.iter().map(|f| f.kind.size()).sum::<usize>()
}

/// Sequential little-endian reader over a record whose length was checked
/// against its layout up front.
struct FieldReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        // skip the opcode
        FieldReader { bytes, pos: 1 }
    }

    fn u8(&mut self) -> u8 {
        let v = self.bytes[self.pos];
        self.pos += 1;
        v
    }

    fn u16(&mut self) -> u16 {
        let v = u16::from_le_bytes([self.bytes[self.pos], self.bytes[self.pos + 1]]);
        self.pos += 2;
        v
    }

    fn take(&mut self, n: usize) -> &'a [u8] {
        let v = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        v
    }
}

/// Render a record through its layout as `Name=value, Name=value, ...`.
pub fn render_fields(layout: &[Field], record: &[u8]) -> Result<String> {
    let needed = layout_size(layout);
    if record.len() < needed {
        return Err(ScdError::TruncatedRecord {
            opcode: record.first().copied().unwrap_or(0),
            expected: needed,
            actual: record.len(),
        });
    }

    let mut reader = FieldReader::new(record);
    let mut out = String::new();
    for (i, field) in layout.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        // write! into a String cannot fail
        let _ = match field.kind {
            FieldKind::U8 => write!(out, "{}={}", field.name, reader.u8()),
            FieldKind::I8 => write!(out, "{}={}", field.name, reader.u8() as i8),
            FieldKind::U16 => write!(out, "{}={}", field.name, reader.u16()),
            FieldKind::I16 => write!(out, "{}={}", field.name, reader.u16() as i16),
            FieldKind::Bytes(n) => {
                let data = reader.take(n);
                write!(out, "{}={}", field.name, format_array(data))
            }
            FieldKind::Vec3I16 => {
                let (x, y, z) = (reader.u16() as i16, reader.u16() as i16, reader.u16() as i16);
                write!(out, "{}=[{}, {}, {}]", field.name, x, y, z)
            }
            FieldKind::Vec3U16 => {
                let (x, y, z) = (reader.u16(), reader.u16(), reader.u16());
                write!(out, "{}=[{}, {}, {}]", field.name, x, y, z)
            }
        };
    }
    Ok(out)
}

/// Fallback rendering: every byte after the opcode as `paramN=value`.
pub fn render_ordinal(record: &[u8]) -> String {
    record
        .iter()
        .skip(1)
        .enumerate()
        .map(|(i, b)| format!("param{}={}", i + 1, b))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_array(data: &[u8]) -> String {
    let items = data.iter().map(|b| b.to_string()).collect::<Vec<_>>();
    format!("[{}]", items.join(","))
}

// Control flow

pub const EVT_EXEC: Layout = &[
    Field::u8("ThreadNum"),
    Field::u8("ExOpcode"),
    Field::u8("Event"),
];

/// Shared by IF_START and ELSE_START
pub const BLOCK_START: Layout = &[Field::u8("Dummy"), Field::u16("BlockLength")];

pub const SLEEP: Layout = &[Field::u8("Dummy"), Field::u16("Count")];

pub const FOR_START: Layout = &[
    Field::u8("Dummy"),
    Field::u16("BlockLength"),
    Field::u16("Count"),
];

/// Shared by WHILE_START and DO_START; field meaning is not known
pub const LOOP_START: Layout = &[Field::u8("param1"), Field::u16("param2")];

pub const SWITCH: Layout = &[Field::u8("VarId"), Field::u16("BlockLength")];

pub const CASE: Layout = &[
    Field::u8("Dummy"),
    Field::u16("BlockLength"),
    Field::u16("Value"),
];

pub const GOTO: Layout = &[
    Field::i8("IfElseCounter"),
    Field::i8("LoopLevel"),
    Field::u8("Unknown"),
    Field::i16("Offset"),
];

pub const GOSUB: Layout = &[Field::u8("Event")];

// Flags and variables

pub const CHECK_BIT: Layout = &[
    Field::u8("BitArray"),
    Field::u8("BitNumber"),
    Field::u8("Value"),
];

// Operation: 0 clear, 1 set, 7 flip
pub const SET_BIT: Layout = &[
    Field::u8("BitArray"),
    Field::u8("BitNumber"),
    Field::u8("Operation"),
];

pub const COMPARE: Layout = &[
    Field::u8("Dummy"),
    Field::u8("VarId"),
    Field::u8("Operation"),
    Field::i16("Value"),
];

pub const SAVE: Layout = &[Field::u8("VarId"), Field::i16("Value")];

pub const COPY: Layout = &[Field::u8("DestVarId"), Field::u8("SourceVarId")];

pub const CALC: Layout = &[
    Field::u8("Dummy"),
    Field::u8("Operation"),
    Field::u8("VarId"),
    Field::u8("Value"),
];

pub const CALC2: Layout = &[
    Field::u8("Operation"),
    Field::u8("VarId"),
    Field::u8("SourceVarId"),
];

// Camera

pub const CUT_CHG: Layout = &[Field::u8("CameraId")];

pub const CUT_AUTO: Layout = &[Field::u8("FlagOn")];

// Trigger areas

pub const AOT_SET: Layout = &[
    Field::u8("Aot"),
    Field::u8("Id"),
    Field::u8("Type"),
    Field::u8("Floor"),
    Field::u8("Super"),
    Field::i16("X"),
    Field::i16("Z"),
    Field::i16("Width"),
    Field::i16("Depth"),
    Field::bytes("Data", 6),
];

pub const AOT_SET_4P: Layout = &[
    Field::u8("Aot"),
    Field::u8("Id"),
    Field::u8("Type"),
    Field::u8("Floor"),
    Field::u8("Super"),
    Field::i16("X1"),
    Field::i16("Z1"),
    Field::i16("X2"),
    Field::i16("Z2"),
    Field::i16("X3"),
    Field::i16("Z3"),
    Field::i16("X4"),
    Field::i16("Z4"),
    Field::bytes("Data", 6),
];

pub const AOT_RESET: Layout = &[
    Field::u8("Aot"),
    Field::u8("Id"),
    Field::u8("Type"),
    Field::bytes("Data", 6),
];

pub const DOOR_AOT_SET: Layout = &[
    Field::u8("Aot"),
    Field::u8("Id"),
    Field::u8("Type"),
    Field::u8("Floor"),
    Field::u8("Super"),
    Field::i16("X"),
    Field::i16("Z"),
    Field::i16("Width"),
    Field::i16("Depth"),
    Field::i16("NextX"),
    Field::i16("NextY"),
    Field::i16("NextZ"),
    Field::i16("NextDir"),
    Field::u8("Stage"),
    Field::u8("Room"),
    Field::u8("Camera"),
    Field::u8("NextFloor"),
    Field::u8("TextureType"),
    Field::u8("DoorType"),
    Field::u8("KnockType"),
    Field::u8("KeyId"),
    Field::u8("KeyType"),
    Field::u8("Free"),
];

pub const DOOR_AOT_SET_4P: Layout = &[
    Field::u8("Aot"),
    Field::u8("Id"),
    Field::u8("Type"),
    Field::u8("Floor"),
    Field::u8("Super"),
    Field::i16("X1"),
    Field::i16("Z1"),
    Field::i16("X2"),
    Field::i16("Z2"),
    Field::i16("X3"),
    Field::i16("Z3"),
    Field::i16("X4"),
    Field::i16("Z4"),
    Field::i16("NextX"),
    Field::i16("NextY"),
    Field::i16("NextZ"),
    Field::i16("NextDir"),
    Field::u8("Stage"),
    Field::u8("Room"),
    Field::u8("Camera"),
    Field::u8("NextFloor"),
    Field::u8("TextureType"),
    Field::u8("DoorType"),
    Field::u8("KnockType"),
    Field::u8("KeyId"),
    Field::u8("KeyType"),
    Field::u8("Free"),
];

pub const ITEM_AOT_SET: Layout = &[
    Field::u8("Aot"),
    Field::u8("Id"),
    Field::u8("Type"),
    Field::u8("Floor"),
    Field::u8("Super"),
    Field::i16("X"),
    Field::i16("Z"),
    Field::i16("Width"),
    Field::i16("Depth"),
    Field::u16("ItemId"),
    Field::u16("Amount"),
    Field::u16("ItemPickedIndex"),
    Field::u8("Md1ModelId"),
    Field::u8("Act"),
];

pub const ITEM_AOT_SET_4P: Layout = &[
    Field::u8("Aot"),
    Field::u8("Id"),
    Field::u8("Type"),
    Field::u8("Floor"),
    Field::u8("Super"),
    Field::i16("X1"),
    Field::i16("Z1"),
    Field::i16("X2"),
    Field::i16("Z2"),
    Field::i16("X3"),
    Field::i16("Z3"),
    Field::i16("X4"),
    Field::i16("Z4"),
    Field::u16("ItemId"),
    Field::u16("Amount"),
    Field::u16("ItemPickedIndex"),
    Field::u8("Md1ModelId"),
    Field::u8("Act"),
];

// Models and work entities

pub const OBJ_MODEL_SET: Layout = &[
    Field::u8("ObjectIndex"),
    Field::u8("ObjectId"),
    Field::u8("Counter"),
    Field::u8("Wait"),
    Field::u8("Num"),
    Field::u8("Floor"),
    Field::u8("Flag0"),
    Field::u16("Type"),
    Field::u16("Flag1"),
    Field::i16("Attribute"),
    Field::vec3("Position"),
    Field::vec3("Direction"),
    Field::vec3("Offset"),
    Field::uvec3("Dimensions"),
];

pub const DOOR_MODEL_SET: Layout = &[
    Field::u8("Index"),
    Field::u8("Id"),
    Field::u8("Type"),
    Field::u8("Flag"),
    Field::u8("ModelNumber"),
    Field::u16("Unknown0"),
    Field::u16("Unknown1"),
    Field::vec3("Position"),
    Field::vec3("Direction"),
];

pub const WORK_SET: Layout = &[Field::u8("Component"), Field::u8("Index")];

pub const POS_SET: Layout = &[
    Field::u8("Dummy"),
    Field::i16("X"),
    Field::i16("Y"),
    Field::i16("Z"),
];

pub const MEMBER_SET: Layout = &[Field::u8("MemberIndex"), Field::u16("Value")];

pub const MEMBER_CMP: Layout = &[
    Field::u8("Unknown0"),
    Field::u8("MemberIndex"),
    Field::u8("CompareOperation"),
    Field::i16("Value"),
];

pub const SCA_ID_SET: Layout = &[Field::u8("Id"), Field::u16("Flag")];

pub const SCE_EM_SET: Layout = &[
    Field::u8("Dummy"),
    Field::u8("Aot"),
    Field::u8("Id"),
    Field::u8("Type"),
    Field::u8("Status"),
    Field::u8("Floor"),
    Field::u8("SoundFlag"),
    Field::u8("ModelType"),
    Field::i8("EmSetFlag"),
    Field::i16("X"),
    Field::i16("Y"),
    Field::i16("Z"),
    Field::u16("DirY"),
    Field::u16("Motion"),
    Field::u16("CtrFlag"),
];

// Effect sprites

pub const SCE_ESPR_ON: Layout = &[
    Field::u8("Dummy"),
    Field::u8("Id"),
    Field::u8("Type"),
    Field::u16("Work"),
    Field::i16("Unknown1"),
    Field::i16("X"),
    Field::i16("Y"),
    Field::i16("Z"),
    Field::u16("DirY"),
];

pub const SCE_ESPR_KILL: Layout = &[
    Field::u8("Id"),
    Field::u8("Type"),
    Field::u8("WorkComponent"),
    Field::u8("WorkIndex"),
];

pub const SCE_ESPR_CONTROL: Layout = &[
    Field::u8("Id"),
    Field::u8("Type"),
    Field::u8("Action"),
    Field::u8("WorkComponent"),
    Field::u8("WorkIndex"),
];

pub const SCE_ESPR3D_ON: Layout = &[
    Field::u8("Dummy"),
    Field::u16("Unknown0"),
    Field::u16("Work"),
    Field::u16("Unknown1"),
    Field::vec3("Vector1"),
    Field::vec3("Vector2"),
    Field::u16("DirY"),
];

// Player control

pub const PLC_MOTION: Layout = &[
    Field::u8("Action"),
    Field::u8("MoveNumber"),
    Field::u8("SceneFlag"),
];

pub const PLC_DEST: Layout = &[
    Field::u8("Dummy"),
    Field::u8("Action"),
    Field::u8("FlagNumber"),
    Field::i16("DestX"),
    Field::i16("DestZ"),
];

// The trailing pair is signed on disk but always shown as raw bytes
pub const PLC_NECK: Layout = &[
    Field::u8("Operation"),
    Field::i16("NeckX"),
    Field::i16("NeckY"),
    Field::i16("NeckZ"),
    Field::bytes("Unknown", 2),
];

// Operation: 0 OR, 1 set, 2 XOR
pub const PLC_FLAG: Layout = &[Field::u8("Operation"), Field::u16("Flag")];

pub const PLC_ROT: Layout = &[Field::u8("Index"), Field::i16("Value")];

// Sound

pub const SCE_BGM_CONTROL: Layout = &[
    Field::u8("Id"),
    Field::u8("Operation"),
    Field::u8("Type"),
    Field::u8("LeftVolume"),
    Field::u8("RightVolume"),
];

pub const XA_ON: Layout = &[Field::u8("Channel"), Field::i16("Id")];

// Visual effects

pub const MIZU_DIV_SET: Layout = &[Field::u8("MizuDivMax")];

pub const KAGE_SET: Layout = &[
    Field::u8("WorkSetComponent"),
    Field::u8("WorkSetIndex"),
    Field::bytes("Color", 3),
    Field::i16("HalfX"),
    Field::i16("HalfZ"),
    Field::i16("OffsetX"),
    Field::i16("OffsetZ"),
];
