// .rdt room container

use std::fmt::Display;
use std::fmt::Error;
use std::fmt::Formatter;
use std::fs;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use log::{debug, info};

use crate::error::{Result, ScdError};
use crate::script::{decode_stream, ScriptStream};
use crate::section::SectionReader;

pub const HEADER_SIZE: usize = 8;
pub const OFFSET_COUNT: usize = 23;
/// Header counts followed by the offset table
pub const FIXED_SIZE: usize = HEADER_SIZE + OFFSET_COUNT * 4;

fn get_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Eight one-byte counts at the start of the container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RdtHeader {
    pub num_sprites: u8,
    pub num_cameras: u8,
    pub num_models: u8,
    pub num_items: u8,
    pub num_doors: u8,
    pub num_rooms: u8,
    pub num_reverb: u8,
    /// Most .pri sprites used by any one camera
    pub sprite_max: u8,
}

impl RdtHeader {
    pub fn new(bytes: &[u8; FIXED_SIZE]) -> RdtHeader {
        RdtHeader {
            num_sprites: bytes[0],
            num_cameras: bytes[1],
            num_models: bytes[2],
            num_items: bytes[3],
            num_doors: bytes[4],
            num_rooms: bytes[5],
            num_reverb: bytes[6],
            sprite_max: bytes[7],
        }
    }
}

impl Display for RdtHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), Error> {
        write!(
            f,
            "
Sprites:     {}
Cameras:     {}
Models:      {}
Items:       {}
Doors:       {}
Rooms:       {}
Reverb:      {}
Sprite max:  {}
",
            self.num_sprites,
            self.num_cameras,
            self.num_models,
            self.num_items,
            self.num_doors,
            self.num_rooms,
            self.num_reverb,
            self.sprite_max
        )
    }
}

/// Byte offsets of the container's sub-resources, in file order. Only the
/// two script offsets are followed; a zero offset means the resource is
/// absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RdtOffsets {
    pub room_sound: u32,
    pub room_vab_header: u32,
    pub room_vab_data: u32,
    pub enemy_vab_header: u32,
    pub enemy_vab_data: u32,
    pub ota: u32,
    pub collision_data: u32,
    pub camera_position: u32,
    pub camera_switches: u32,
    pub lights: u32,
    pub items: u32,
    pub floor_sound: u32,
    pub blocks: u32,
    pub lang1: u32,
    pub lang2: u32,
    pub scroll_texture: u32,
    pub init_script: u32,
    pub execute_script: u32,
    pub sprite_animations: u32,
    pub sprite_animations_offset: u32,
    pub sprite_image: u32,
    pub model_image: u32,
    pub rbj: u32,
}

impl RdtOffsets {
    pub fn new(bytes: &[u8; FIXED_SIZE]) -> RdtOffsets {
        let at = |i: usize| get_u32(bytes, HEADER_SIZE + i * 4);
        RdtOffsets {
            room_sound: at(0),
            room_vab_header: at(1),
            room_vab_data: at(2),
            enemy_vab_header: at(3),
            enemy_vab_data: at(4),
            ota: at(5),
            collision_data: at(6),
            camera_position: at(7),
            camera_switches: at(8),
            lights: at(9),
            items: at(10),
            floor_sound: at(11),
            blocks: at(12),
            lang1: at(13),
            lang2: at(14),
            scroll_texture: at(15),
            init_script: at(16),
            execute_script: at(17),
            sprite_animations: at(18),
            sprite_animations_offset: at(19),
            sprite_image: at(20),
            model_image: at(21),
            rbj: at(22),
        }
    }

    /// Every offset with its display name, in file order
    pub fn named(&self) -> [(&'static str, u32); OFFSET_COUNT] {
        [
            ("RoomSound", self.room_sound),
            ("RoomVabHeader", self.room_vab_header),
            ("RoomVabData", self.room_vab_data),
            ("EnemyVabHeader", self.enemy_vab_header),
            ("EnemyVabData", self.enemy_vab_data),
            ("Ota", self.ota),
            ("CollisionData", self.collision_data),
            ("CameraPosition", self.camera_position),
            ("CameraSwitches", self.camera_switches),
            ("Lights", self.lights),
            ("Items", self.items),
            ("FloorSound", self.floor_sound),
            ("Blocks", self.blocks),
            ("Lang1", self.lang1),
            ("Lang2", self.lang2),
            ("ScrollTexture", self.scroll_texture),
            ("InitScript", self.init_script),
            ("ExecuteScript", self.execute_script),
            ("SpriteAnimations", self.sprite_animations),
            ("SpriteAnimationsOffset", self.sprite_animations_offset),
            ("SpriteImage", self.sprite_image),
            ("ModelImage", self.model_image),
            ("Rbj", self.rbj),
        ]
    }
}

impl Display for RdtOffsets {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), Error> {
        for (name, offset) in self.named() {
            writeln!(f, "{:<24}{:#010x}", name, offset)?;
        }
        Ok(())
    }
}

/// A loaded container: its fixed tables and both decoded scripts
#[derive(Debug, Clone)]
pub struct RdtFile {
    pub header: RdtHeader,
    pub offsets: RdtOffsets,
    /// Runs once when the room loads
    pub init_script: ScriptStream,
    /// Runs while the room is active
    pub room_script: ScriptStream,
}

/// Read only the header counts and the offset table. Neither script is
/// decoded, so this works on containers whose scripts are damaged.
pub fn read_tables<R: Read + Seek>(source: &mut R, length: u64) -> Result<(RdtHeader, RdtOffsets)> {
    let mut fixed = [0u8; FIXED_SIZE];
    let mut section = SectionReader::new(source, 0, length);
    section.seek(SeekFrom::Start(0))?;
    section.read_exact(&mut fixed)?;

    let header = RdtHeader::new(&fixed);
    let offsets = RdtOffsets::new(&fixed);
    debug!("rdt header: {:?}", header);
    debug!(
        "init script at {:#x}, execute script at {:#x}",
        offsets.init_script, offsets.execute_script
    );
    Ok((header, offsets))
}

pub fn read_tables_bytes(data: &[u8]) -> Result<(RdtHeader, RdtOffsets)> {
    let mut cursor = Cursor::new(data);
    read_tables(&mut cursor, data.len() as u64)
}

/// Read a container from the first `length` bytes of `source`.
pub fn load<R: Read + Seek>(source: &mut R, length: u64) -> Result<RdtFile> {
    let (header, offsets) = read_tables(source, length)?;

    let init_script = load_script(source, length, offsets.init_script, "init")?;
    let room_script = load_script(source, length, offsets.execute_script, "execute")?;
    info!(
        "loaded {} init and {} room instructions",
        init_script.len(),
        room_script.len()
    );

    Ok(RdtFile {
        header,
        offsets,
        init_script,
        room_script,
    })
}

// A script runs from its offset to the end of the file
fn load_script<R: Read + Seek>(
    source: &mut R,
    length: u64,
    offset: u32,
    which: &str,
) -> Result<ScriptStream> {
    let start = offset as u64;
    if start >= length {
        return Err(ScdError::Format(format!(
            "{} script offset {:#x} is outside a {} byte file",
            which, offset, length
        )));
    }
    let mut section = SectionReader::new(source, start, length - start);
    let section_len = section.len();
    decode_stream(&mut section, section_len)
}

pub fn load_bytes(data: &[u8]) -> Result<RdtFile> {
    let mut cursor = Cursor::new(data);
    load(&mut cursor, data.len() as u64)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let data = fs::read(path)?;
    debug!("read {} bytes from {}", data.len(), path.display());
    Ok(data)
}

/// Read a whole container file into memory and decode it
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<RdtFile> {
    load_bytes(&read_file(path.as_ref())?)
}

/// Header counts and offsets of a container file, scripts untouched
pub fn read_tables_file<P: AsRef<Path>>(path: P) -> Result<(RdtHeader, RdtOffsets)> {
    read_tables_bytes(&read_file(path.as_ref())?)
}

/// The `--info` text: header counts, a blank line, then the offset table
pub fn describe(header: &RdtHeader, offsets: &RdtOffsets) -> String {
    format!("{}\n{}", header, offsets)
}
