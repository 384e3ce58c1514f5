#![no_main]

use libfuzzer_sys::fuzz_target;
use simp_core::{
    image::parse_instructions, validate_data_address, validate_io_address, Decoder,
    MachineImage, SimConfig, Simulator,
};

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    let mut raw = [0_u8; 8];
    raw.copy_from_slice(&data[..8]);
    let word = u64::from_be_bytes(raw);
    let instruction = Decoder::decode(word);
    let _ = instruction.disassemble();

    let addr = i64::from_be_bytes(raw);
    let _ = validate_data_address(addr);
    let _ = validate_io_address(addr);

    let text = String::from_utf8_lossy(&data[8..]);
    let _ = parse_instructions(&text);

    let instructions = data[8..]
        .chunks(6)
        .map(|chunk| chunk.iter().fold(0_u64, |acc, b| (acc << 8) | u64::from(*b)))
        .collect();
    let image = MachineImage {
        instructions,
        ..MachineImage::default()
    };
    let config = SimConfig {
        max_cycles: 2048,
        ..SimConfig::default()
    };
    let _ = Simulator::new(config, &image).run();
});
