//! Minimal readers for power-supply sysfs files.

use std::{fs, io, path::Path};

/// Read a `KEY=value` uevent-style file into pairs. Lines without a `=`
/// are skipped.
pub fn read_key_values(path: &Path) -> io::Result<Vec<(String, String)>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect())
}

/// Read a gauge register dump (`0xNN=0xVV` per line) and return the value
/// of register `0x0a`, the flags register. `None` if the register is not
/// in the dump or its value does not parse.
pub fn read_flags_register(path: &Path) -> io::Result<Option<u32>> {
    let contents = fs::read_to_string(path)?;
    for line in contents.lines() {
        if let Some((key, value)) = line.split_once('=') {
            if key == "0x0a" {
                let value = value.trim().trim_start_matches("0x");
                return Ok(u32::from_str_radix(value, 16).ok());
            }
        }
    }
    Ok(None)
}

/// Read the first line of a file, e.g. the charger mode.
pub fn read_first_line(path: &Path) -> io::Result<String> {
    let contents = fs::read_to_string(path)?;
    Ok(contents.lines().next().unwrap_or_default().to_string())
}
