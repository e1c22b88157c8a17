#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Split arbitrary text into work / hash / difficulty and validate.
    // Needs at least 8 bytes for the difficulty; the rest is text.
    if data.len() < 8 {
        return;
    }
    let difficulty = u64::from_le_bytes([
        data[0], data[1], data[2], data[3], data[4], data[5], data[6], data[7],
    ]);
    let text = String::from_utf8_lossy(&data[8..]);
    let split = text.char_indices().nth(16).map(|(i, _)| i).unwrap_or(text.len());
    let (work, hash) = text.split_at(split);

    // Must never panic regardless of input.
    let _ = powdist_work::validate_work(work, hash, Some(difficulty));
    let _ = powdist_work::validate_work(work, hash, None);
});
