use crate::block::Block;
use crate::encoding;
use crate::error::{LedgerError, Result};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Encode a block in its wire form (compact canonical JSON).
pub fn to_json(block: &Block) -> Result<String> {
    encoding::to_string(block)
}

/// Decode a block from JSON without checking its fingerprint.
pub fn from_json(json: &str) -> Result<Block> {
    Ok(serde_json::from_str(json)?)
}

/// Write a block followed by a newline.
pub fn write_block<W: Write>(mut writer: W, block: &Block) -> Result<()> {
    encoding::to_writer(&mut writer, block)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read one block and check its integrity.
pub fn read_block<R: Read>(reader: R) -> Result<Block> {
    let block: Block = serde_json::from_reader(reader)?;
    ensure_intact(&block)?;
    Ok(block)
}

/// Store a block as a JSON file.
pub fn save_block(path: &Path, block: &Block) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let f = fs::File::create(path)?;
    write_block(std::io::BufWriter::new(f), block)?;
    debug!(path = %path.display(), index = block.index, "block saved");
    Ok(())
}

/// Load a block from a JSON file, failing with `Corruption` if it was altered.
pub fn load_block(path: &Path) -> Result<Block> {
    let data = fs::read(path)?;
    read_block(data.as_slice())
}

fn ensure_intact(block: &Block) -> Result<()> {
    if !block.verify() {
        warn!(index = block.index, hash = %block.hash, "block integrity check failed");
        return Err(LedgerError::Corruption(format!(
            "block integrity check failed: {}",
            block.hash
        )));
    }
    Ok(())
}
