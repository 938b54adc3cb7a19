use scdasm::config::{self, DumpConfig, ProjectManifest, MANIFEST_FILE};
use scdasm::opcode_tables::size_of;
use scdasm::rdt::{self, FIXED_SIZE, OFFSET_COUNT};
use scdasm::{render_units, Disassembly, OutputOptions, ScdError};
use std::fs;
use std::io::{Cursor, ErrorKind};
use std::path::PathBuf;
use test_log::test;

/// Build a room container with the given scripts placed right after the
/// fixed tables. Unused offsets are filled with recognisable values.
fn build_rdt(init: &[u8], room: &[u8]) -> Vec<u8> {
    let mut data = vec![3, 4, 5, 6, 7, 8, 9, 10];
    let init_at = FIXED_SIZE as u32;
    let room_at = init_at + init.len() as u32;
    for i in 0..OFFSET_COUNT as u32 {
        let offset = match i {
            16 => init_at,
            17 => room_at,
            _ => 0x1000 + i,
        };
        data.extend_from_slice(&offset.to_le_bytes());
    }
    assert_eq!(data.len(), FIXED_SIZE);
    data.extend_from_slice(init);
    data.extend_from_slice(room);
    data
}

fn scratch_dir(name: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("scdasm-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

const INIT: &[u8] = &[
    0x04, 0x00, 0x06, 0x00, // two functions
    0x0b, 0x01, // Wsleep, EvtEnd
    0x29, 0x02, 0x01, // CutChg 2, EvtEnd
];

const ROOM: &[u8] = &[
    0x06, 0x00, 0x0c, 0x00, 0x0e, 0x00, // three functions
    0x09, 0x0a, 0x05, 0x00, 0x02, 0x01, // Sleep 5, EvtNext, EvtEnd
    0x42, 0x01, // PlcRet, EvtEnd
    0x22, 0x01, 0x02, 0x01, 0x01, // SetBit, EvtEnd
];

#[test]
fn test_load_header_and_offsets() {
    let data = build_rdt(INIT, ROOM);
    let rdt = rdt::load_bytes(&data).unwrap();

    assert_eq!(rdt.header.num_sprites, 3);
    assert_eq!(rdt.header.sprite_max, 10);
    assert_eq!(rdt.offsets.room_sound, 0x1000);
    assert_eq!(rdt.offsets.rbj, 0x1000 + 22);
    assert_eq!(rdt.offsets.init_script, 100);
    assert_eq!(rdt.offsets.execute_script, 100 + INIT.len() as u32);

    let info = format!("{}{}", rdt.header, rdt.offsets);
    assert!(info.contains("Cameras:     4"));
    assert!(info.contains("InitScript"));
    assert!(info.contains("0x00000064"));
}

#[test]
fn test_tables_read_without_decoding_scripts() {
    // the room script declares no functions, so a full load fails
    let data = build_rdt(INIT, &[0x00, 0x00, 0x01]);
    assert!(matches!(rdt::load_bytes(&data), Err(ScdError::Format(_))));

    let (header, offsets) = rdt::read_tables_bytes(&data).unwrap();
    assert_eq!(header.num_cameras, 4);
    assert_eq!(offsets.execute_script, 100 + INIT.len() as u32);

    let info = rdt::describe(&header, &offsets);
    assert!(info.starts_with("\nSprites:     3\n"));
    assert!(info.contains("Sprite max:  10\n\nRoomSound"));
    assert_eq!(info.lines().filter(|l| l.starts_with("Rbj")).count(), 1);
    assert!(info.ends_with("0x00001016\n"));

    assert!(matches!(
        rdt::read_tables_bytes(&data[..FIXED_SIZE - 1]),
        Err(ScdError::Io(_))
    ));
}

#[test]
fn test_load_both_scripts() {
    let data = build_rdt(INIT, ROOM);
    let mut cursor = Cursor::new(data.clone());
    let rdt = rdt::load(&mut cursor, data.len() as u64).unwrap();

    assert_eq!(rdt.init_script.function_starts(), &[0, 2]);
    assert_eq!(rdt.init_script.program_counters(), vec![0, 1, 2, 4]);

    assert_eq!(rdt.room_script.function_starts(), &[0, 6, 8]);
    assert_eq!(
        rdt.room_script.program_counters(),
        vec![0, 1, 4, 5, 6, 7, 8, 12]
    );

    for instruction in rdt.init_script.iter().chain(rdt.room_script.iter()) {
        assert_eq!(instruction.len(), size_of(instruction.opcode).unwrap());
    }
}

#[test]
fn test_disassembly_units() {
    let data = build_rdt(INIT, ROOM);
    let rdt = rdt::load_bytes(&data).unwrap();
    let disassembly = Disassembly::new(&rdt);
    let options = OutputOptions::default();

    let names: Vec<_> = disassembly.names().collect();
    assert_eq!(names, vec!["init.scd", "sub0.scd", "sub1.scd", "sub2.scd"]);

    let init = disassembly.get("init.scd").unwrap();
    assert_eq!(
        init.render_code(&options).unwrap(),
        "Wsleep();\nEvtEnd();\nCutChg(CameraId=2);\nEvtEnd();\n"
    );

    let sub0 = disassembly.get("sub0.scd").unwrap();
    assert_eq!(
        sub0.render_hex(&options),
        "09 0a 05 00\n0a 05 00\n02\n01\n"
    );

    let sub2 = disassembly.get("sub2.scd").unwrap();
    assert_eq!(
        sub2.render_code(&options).unwrap(),
        "SetBit(BitArray=1, BitNumber=2, Operation=1);\nEvtEnd();\n"
    );
}

#[test]
fn test_listing_and_unit_selection() {
    let rdt = rdt::load_bytes(&build_rdt(INIT, ROOM)).unwrap();
    let disassembly = Disassembly::new(&rdt);

    assert_eq!(
        disassembly.listing(),
        "init.scd         4\nsub0.scd         4\nsub1.scd         2\nsub2.scd         2\n"
    );

    let all = disassembly.select(None).unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0].name, "init.scd");

    let one = disassembly.select(Some("sub1.scd")).unwrap();
    assert_eq!(one.len(), 1);
    assert_eq!(
        render_units(&one, &OutputOptions::default()).unwrap(),
        "; sub1.scd\n42\n01\n\nPlcRet();\nEvtEnd();\n\n"
    );

    let code_only = OutputOptions {
        dump_hex: false,
        ..OutputOptions::default()
    };
    assert_eq!(
        render_units(&one, &code_only).unwrap(),
        "; sub1.scd\nPlcRet();\nEvtEnd();\n\n"
    );

    match disassembly.select(Some("sub9.scd")) {
        Err(ScdError::UnknownUnit(name)) => assert_eq!(name, "sub9.scd"),
        other => panic!("expected UnknownUnit, got {:?}", other.map(|u| u.len())),
    }
}

#[test]
fn test_two_functions_with_descending_offsets() {
    let room = [0x04, 0x00, 0x02, 0x00, 0x01];
    let data = build_rdt(&[0x02, 0x00, 0x01], &room);
    let rdt = rdt::load_bytes(&data).unwrap();

    assert_eq!(rdt.room_script.function_starts(), &[0, 1]);
    let disassembly = Disassembly::new(&rdt);
    let sub0 = disassembly.get("sub0.scd").unwrap();
    assert_eq!(sub0.len(), 1);
    assert_eq!(sub0.instructions[0].call().unwrap(), "EvtEnd();");
    assert!(disassembly.get("sub1.scd").is_some());
}

#[test]
fn test_zero_function_script_rejected() {
    let data = build_rdt(INIT, &[0x00, 0x00, 0x01]);
    assert!(matches!(rdt::load_bytes(&data), Err(ScdError::Format(_))));
}

#[test]
fn test_truncated_container() {
    let data = build_rdt(INIT, ROOM);
    match rdt::load_bytes(&data[..50]) {
        Err(ScdError::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
        other => panic!("expected Io error, got {:?}", other.map(|r| r.header)),
    }
}

#[test]
fn test_script_offset_outside_file() {
    let mut data = build_rdt(INIT, ROOM);
    // execute script offset is entry 17
    let at = 8 + 17 * 4;
    data[at..at + 4].copy_from_slice(&0xffffu32.to_le_bytes());
    assert!(matches!(rdt::load_bytes(&data), Err(ScdError::Format(_))));
}

#[test]
fn test_unknown_opcode_aborts_load() {
    let data = build_rdt(INIT, &[0x02, 0x00, 0x1c, 0x01]);
    assert!(matches!(
        rdt::load_bytes(&data),
        Err(ScdError::UnknownOpcode {
            opcode: 0x1c,
            offset: Some(2)
        })
    ));
}

#[test]
fn test_load_file_and_write_units() {
    let dir = scratch_dir("dump");
    fs::create_dir_all(&dir).unwrap();
    let input = dir.join("room1000.rdt");
    fs::write(&input, build_rdt(INIT, ROOM)).unwrap();

    let rdt = rdt::load_file(&input).unwrap();
    let disassembly = Disassembly::new(&rdt);
    let out = dir.join("out");
    let manifest =
        config::write_units(&rdt, &disassembly, &DumpConfig::default(), &out, Some(input.as_path())).unwrap();

    assert_eq!(manifest.units.len(), 4);
    assert_eq!(
        fs::read_to_string(out.join("sub1.scd.txt")).unwrap(),
        "PlcRet();\nEvtEnd();\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("sub1.scd.hex")).unwrap(),
        "42\n01\n"
    );

    let text = fs::read_to_string(out.join(MANIFEST_FILE)).unwrap();
    let parsed: ProjectManifest = toml::from_str(&text).unwrap();
    assert_eq!(parsed, manifest);
    assert_eq!(parsed.init_script_offset, 100);
    assert_eq!(parsed.units[0].name, "init.scd");
    assert_eq!(parsed.units[0].instructions, 4);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_code_only_dump() {
    let dir = scratch_dir("code-only");
    let rdt = rdt::load_bytes(&build_rdt(INIT, ROOM)).unwrap();
    let disassembly = Disassembly::new(&rdt);
    let config = DumpConfig::from_toml_str(
        "dump_hex = false\nshow_addresses = true\nunit_extension_code = \"scd.txt\"",
    );
    assert!(matches!(config, Err(ScdError::Config(_))));

    let config = DumpConfig::from_toml_str("dump_hex = false\nshow_addresses = true").unwrap();
    let manifest = config::write_units(&rdt, &disassembly, &config, &dir, None).unwrap();
    assert!(manifest.units.iter().all(|u| u.hex_file.is_none()));
    assert_eq!(
        fs::read_to_string(dir.join("sub1.scd.txt")).unwrap(),
        "0006: PlcRet();\n0007: EvtEnd();\n"
    );
    assert!(!dir.join("sub1.scd.hex").exists());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_dump_config_defaults_and_errors() {
    let config = DumpConfig::from_toml_str("").unwrap();
    assert_eq!(config, DumpConfig::default());
    assert_eq!(config.output_options(), OutputOptions::default());

    let config = DumpConfig::from_toml_str("output_dir = \"dump\"\nunit_extension_hex = \"bin\"").unwrap();
    assert_eq!(config.output_dir, Some(PathBuf::from("dump")));
    assert_eq!(config.unit_extension_hex, "bin");

    assert!(matches!(
        DumpConfig::from_toml_str("dump_hex = false\ndump_code = false"),
        Err(ScdError::Config(_))
    ));
    assert!(matches!(
        DumpConfig::from_toml_str("dump_hex = \"yes\""),
        Err(ScdError::Config(_))
    ));
    assert!(matches!(
        DumpConfig::from_toml_str("unit_extension_code = \"hex\""),
        Err(ScdError::Config(_))
    ));
}
