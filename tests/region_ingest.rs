//! Builds a small in-memory `.mca` file by hand and ingests it through
//! [`ooze::region`], exercising the region file layout and `LevelBuilder` of
//! spec.md §4.6/§6.5 end-to-end.
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use ooze::nbt::Compound;
use ooze::region::{LevelBuilder, RegionDirectoryLoader};

fn write_region_file(dir: &std::path::Path, region_x: i32, region_z: i32, chunks: &[(i32, i32, Vec<u8>)]) {
    let mut location_table = [0u8; 4096];
    let mut body = Vec::new();
    let mut next_sector = 1u32;

    for (cx, cz, nbt) in chunks {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(nbt).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut chunk_bytes = Vec::new();
        let length = (compressed.len() + 1) as u32;
        chunk_bytes.extend_from_slice(&length.to_be_bytes());
        chunk_bytes.push(2); // zlib
        chunk_bytes.extend_from_slice(&compressed);
        chunk_bytes.resize(chunk_bytes.len().div_ceil(4096) * 4096, 0);
        let sector_count = (chunk_bytes.len() / 4096) as u8;

        let index = ((cx & 31) | ((cz & 31) << 5)) as usize;
        location_table[index * 4..index * 4 + 3].copy_from_slice(&next_sector.to_be_bytes()[1..]);
        location_table[index * 4 + 3] = sector_count;

        body.extend_from_slice(&chunk_bytes);
        next_sector += sector_count as u32;
    }

    let mut file = location_table.to_vec();
    file.extend_from_slice(&body);
    std::fs::write(dir.join(format!("r.{region_x}.{region_z}.mca")), file).unwrap();
}

fn legacy_chunk_nbt(x: i32, z: i32) -> Vec<u8> {
    let mut section = Compound::new();
    section.insert("Y", fastnbt::Value::Byte(0));
    section.insert("Blocks", fastnbt::Value::ByteArray(vec![1i8; 4096].into())); // all stone

    let mut level = Compound::new();
    level.insert("xPos", fastnbt::Value::Int(x));
    level.insert("zPos", fastnbt::Value::Int(z));
    level.insert("Sections", fastnbt::Value::List(vec![fastnbt::Value::Compound(section.into_map())]));

    let mut root = Compound::new();
    root.insert("DataVersion", fastnbt::Value::Int(1343));
    root.insert("Level", fastnbt::Value::Compound(level.into_map()));
    root.write().unwrap()
}

#[test]
fn level_builder_ingests_a_rect_of_chunks_from_a_region_directory() {
    let _ = env_logger::try_init();
    let dir = std::env::temp_dir().join(format!("ooze-ingest-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    write_region_file(
        &dir,
        0,
        0,
        &[
            (0, 0, legacy_chunk_nbt(0, 0)),
            (1, 0, legacy_chunk_nbt(1, 0)),
        ],
    );

    let mut loader = RegionDirectoryLoader::new(&dir);
    let level = LevelBuilder::new(&mut loader).add_rect(0, 0, 1, 0).build().unwrap();

    assert_eq!(level.chunk_count(), 2);
    for cx in 0..2 {
        let got = level.block_at(cx * 16, 0, 0).unwrap();
        assert_eq!(got.name().to_string(), "minecraft:stone");
    }

    loader.close().unwrap();
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn absent_chunk_coordinates_are_skipped_without_error() {
    let _ = env_logger::try_init();
    let dir = std::env::temp_dir().join(format!("ooze-ingest-test-absent-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    write_region_file(&dir, 0, 0, &[(0, 0, legacy_chunk_nbt(0, 0))]);

    let mut loader = RegionDirectoryLoader::new(&dir);
    let level = LevelBuilder::new(&mut loader).add_chunk(0, 0).add_chunk(5, 5).build().unwrap();

    assert_eq!(level.chunk_count(), 1);
    std::fs::remove_dir_all(&dir).ok();
}
