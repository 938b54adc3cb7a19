use crate::error::{Result, ScdError};
use crate::layouts::{self, Layout};
use std::collections::HashMap;

// Opcodes the decoder treats specially
pub const EVT_END: u8 = 0x01;
pub const SLEEP: u8 = 0x09;
pub const SLEEPING: u8 = 0x0a;

/// Static description of one script opcode
#[derive(Debug, Clone, Copy)]
pub struct OpcodeDescriptor {
    pub opcode: u8,
    pub name: &'static str,
    /// Total record length in bytes, opcode included
    pub size: usize,
    /// Named field layout; `None` renders every byte as `paramN`
    pub layout: Option<Layout>,
}

const fn op(opcode: u8, name: &'static str, size: usize) -> OpcodeDescriptor {
    OpcodeDescriptor {
        opcode,
        name,
        size,
        layout: None,
    }
}

const fn op_with(opcode: u8, name: &'static str, size: usize, layout: Layout) -> OpcodeDescriptor {
    OpcodeDescriptor {
        opcode,
        name,
        size,
        layout: Some(layout),
    }
}

/// The closed opcode table. Gaps (27, 28, 30, 31, 56, 69, 73, 74, 79, 85,
/// 86, 112..=121 and everything past 123) are invalid opcodes.
pub const DESCRIPTORS: &[OpcodeDescriptor] = &[
    op(0x00, "NoOp", 1),
    op(0x01, "EvtEnd", 1),
    op(0x02, "EvtNext", 1),
    op(0x03, "EvtChain", 4),
    op_with(0x04, "EvtExec", 4, layouts::EVT_EXEC),
    op(0x05, "EvtKill", 2),
    op_with(0x06, "IfStart", 4, layouts::BLOCK_START),
    op_with(0x07, "ElseStart", 4, layouts::BLOCK_START),
    op(0x08, "EndIf", 1),
    op_with(0x09, "Sleep", 4, layouts::SLEEP),
    op(0x0a, "Sleeping", 3),
    op(0x0b, "Wsleep", 1),
    op(0x0c, "Wsleeping", 1),
    op_with(0x0d, "ForStart", 6, layouts::FOR_START),
    op(0x0e, "ForEnd", 2),
    op_with(0x0f, "WhileStart", 4, layouts::LOOP_START),
    op(0x10, "WhileEnd", 2),
    op_with(0x11, "DoStart", 4, layouts::LOOP_START),
    op(0x12, "DoEnd", 2),
    op_with(0x13, "Switch", 4, layouts::SWITCH),
    op_with(0x14, "Case", 6, layouts::CASE),
    op(0x15, "Default", 2),
    op(0x16, "EndSwitch", 2),
    op_with(0x17, "Goto", 6, layouts::GOTO),
    op_with(0x18, "Gosub", 2, layouts::GOSUB),
    op(0x19, "GosubReturn", 2),
    op(0x1a, "Break", 2),
    op(0x1d, "WorkCopy", 4),
    op(0x20, "NoOp2", 1),
    op_with(0x21, "CheckBit", 4, layouts::CHECK_BIT),
    op_with(0x22, "SetBit", 4, layouts::SET_BIT),
    op_with(0x23, "Compare", 6, layouts::COMPARE),
    op_with(0x24, "Save", 4, layouts::SAVE),
    op_with(0x25, "Copy", 3, layouts::COPY),
    op_with(0x26, "Calc", 6, layouts::CALC),
    op_with(0x27, "Calc2", 4, layouts::CALC2),
    op(0x28, "SceRnd", 1),
    op_with(0x29, "CutChg", 2, layouts::CUT_CHG),
    op(0x2a, "CutOld", 1),
    op(0x2b, "MessageOn", 6),
    op_with(0x2c, "AotSet", 20, layouts::AOT_SET),
    op_with(0x2d, "ObjModelSet", 38, layouts::OBJ_MODEL_SET),
    op_with(0x2e, "WorkSet", 3, layouts::WORK_SET),
    op(0x2f, "SpeedSet", 4),
    op(0x30, "AddSpeed", 1),
    op(0x31, "AddAspeed", 1),
    op_with(0x32, "PosSet", 8, layouts::POS_SET),
    op(0x33, "DirSet", 8),
    op_with(0x34, "MemberSet", 4, layouts::MEMBER_SET),
    op(0x35, "MemberSet2", 3),
    op(0x36, "SeOn", 12),
    op_with(0x37, "ScaIdSet", 4, layouts::SCA_ID_SET),
    op(0x39, "DirCk", 8),
    op_with(0x3a, "SceEsprOn", 16, layouts::SCE_ESPR_ON),
    op_with(0x3b, "DoorAotSet", 32, layouts::DOOR_AOT_SET),
    op_with(0x3c, "CutAuto", 2, layouts::CUT_AUTO),
    op(0x3d, "MemberCopy", 3),
    op_with(0x3e, "MemberCmp", 6, layouts::MEMBER_CMP),
    op_with(0x3f, "PlcMotion", 4, layouts::PLC_MOTION),
    op_with(0x40, "PlcDest", 8, layouts::PLC_DEST),
    op_with(0x41, "PlcNeck", 10, layouts::PLC_NECK),
    op(0x42, "PlcRet", 1),
    op_with(0x43, "PlcFlag", 4, layouts::PLC_FLAG),
    op_with(0x44, "SceEmSet", 22, layouts::SCE_EM_SET),
    op_with(0x46, "AotReset", 10, layouts::AOT_RESET),
    op(0x47, "AotOn", 2),
    op(0x48, "SuperSet", 16),
    op(0x4b, "CutReplace", 3),
    op_with(0x4c, "SceEsprKill", 5, layouts::SCE_ESPR_KILL),
    op_with(0x4d, "DoorModelSet", 22, layouts::DOOR_MODEL_SET),
    op_with(0x4e, "ItemAotSet", 22, layouts::ITEM_AOT_SET),
    op(0x50, "SceTrgCk", 4),
    op_with(0x51, "SceBgmControl", 6, layouts::SCE_BGM_CONTROL),
    op_with(0x52, "SceEsprControl", 6, layouts::SCE_ESPR_CONTROL),
    op(0x53, "SceFadeSet", 6),
    op_with(0x54, "SceEspr3dOn", 22, layouts::SCE_ESPR3D_ON),
    op(0x57, "SceBgmTblSet", 8),
    op_with(0x58, "PlcRot", 4, layouts::PLC_ROT),
    op_with(0x59, "XaOn", 4, layouts::XA_ON),
    op(0x5a, "WeaponChg", 2),
    op(0x5b, "PlcCnt", 2),
    op(0x5c, "SceShakeOn", 3),
    op_with(0x5d, "MizuDivSet", 2, layouts::MIZU_DIV_SET),
    op(0x5e, "KeepItemCk", 2),
    op(0x5f, "XaVol", 2),
    op_with(0x60, "KageSet", 14, layouts::KAGE_SET),
    op(0x61, "CutBeSet", 4),
    op(0x62, "SceItemLost", 2),
    op(0x63, "PlcGunEff", 1),
    op(0x64, "SceEsprOn2", 16),
    op(0x65, "SceEsprKill2", 2),
    op(0x66, "PlcStop", 1),
    op_with(0x67, "AotSet4P", 28, layouts::AOT_SET_4P),
    op_with(0x68, "DoorAotSet4P", 40, layouts::DOOR_AOT_SET_4P),
    op_with(0x69, "ItemAotSet4P", 30, layouts::ITEM_AOT_SET_4P),
    op(0x6a, "LightPosSet", 6),
    op(0x6b, "LightKidoSet", 4),
    op(0x6c, "RbjReset", 1),
    op(0x6d, "SceScrMove", 4),
    op(0x6e, "PartsSet", 6),
    op(0x6f, "MovieOn", 2),
    op(0x7a, "ScePartsBomb", 16),
    op(0x7b, "ScePartsDown", 16),
];

lazy_static! {
    pub static ref CATALOG: HashMap<u8, OpcodeDescriptor> = {
        let mut m = HashMap::new();
        for d in DESCRIPTORS {
            m.insert(d.opcode, *d);
        }
        m
    };
}

/// Look up an opcode, `None` if it is not part of the table
pub fn descriptor(opcode: u8) -> Option<&'static OpcodeDescriptor> {
    CATALOG.get(&opcode)
}

fn known(opcode: u8) -> Result<&'static OpcodeDescriptor> {
    descriptor(opcode).ok_or(ScdError::UnknownOpcode {
        opcode,
        offset: None,
    })
}

/// Record length in bytes for an opcode, opcode byte included
pub fn size_of(opcode: u8) -> Result<usize> {
    Ok(known(opcode)?.size)
}

pub fn name_of(opcode: u8) -> Result<&'static str> {
    Ok(known(opcode)?.name)
}

/// Render the parameter list of a raw record (opcode first).
pub fn signature(raw: &[u8]) -> Result<String> {
    match raw.first() {
        Some(opcode) => signature_for(*opcode, raw),
        None => Err(ScdError::TruncatedRecord {
            opcode: 0,
            expected: 1,
            actual: 0,
        }),
    }
}

/// Render a record's parameters as the given opcode.
///
/// The record must be exactly as long as the opcode's size. Opcodes with a
/// named layout render `Name=value` pairs; the rest list every byte after
/// the first as `param1=.., param2=..`. The first byte is never read, so a
/// SLEEPING view renders the same whatever its leading dummy byte holds.
pub fn signature_for(opcode: u8, raw: &[u8]) -> Result<String> {
    let desc = known(opcode)?;
    if raw.len() != desc.size {
        return Err(ScdError::TruncatedRecord {
            opcode,
            expected: desc.size,
            actual: raw.len(),
        });
    }

    match desc.layout {
        Some(layout) => layouts::render_fields(layout, raw),
        None => Ok(layouts::render_ordinal(raw)),
    }
}
