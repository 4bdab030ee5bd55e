/// Test utilities for building EVTX headers and event trees
use byteorder::{LittleEndian, WriteBytesExt};
use evtx_flatten::{EventTree, FlatRecord};
use serde_json::Value;

/// Size of one EVTX chunk
#[allow(dead_code)]
pub const CHUNK_LEN: usize = 0x10000;

/// Builder for the EVTX file header block (128 header bytes, zero padded)
pub struct EvtxHeaderBuilder {
    magic: [u8; 8],
    next_record_id: u64,
    minor_version: u16,
    major_version: u16,
    chunk_count: u16,
    header_block_size: u16,
    flags: u32,
}

#[allow(dead_code)]
impl EvtxHeaderBuilder {
    /// Version 3.1 header, one chunk, clean
    pub fn new() -> Self {
        Self {
            magic: *b"ElfFile\0",
            next_record_id: 1,
            minor_version: 1,
            major_version: 3,
            chunk_count: 1,
            header_block_size: 4096,
            flags: 0,
        }
    }

    pub fn magic(mut self, magic: &[u8; 8]) -> Self {
        self.magic = *magic;
        self
    }

    pub fn version(mut self, major: u16, minor: u16) -> Self {
        self.major_version = major;
        self.minor_version = minor;
        self
    }

    pub fn next_record_id(mut self, id: u64) -> Self {
        self.next_record_id = id;
        self
    }

    pub fn chunk_count(mut self, count: u16) -> Self {
        self.chunk_count = count;
        self
    }

    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Build and return the header bytes
    pub fn build(self) -> Vec<u8> {
        let mut data = Vec::with_capacity(128);
        data.extend_from_slice(&self.magic);
        data.write_u64::<LittleEndian>(0).unwrap(); // first chunk
        data.write_u64::<LittleEndian>(self.chunk_count.saturating_sub(1) as u64)
            .unwrap(); // last chunk
        data.write_u64::<LittleEndian>(self.next_record_id).unwrap();
        data.write_u32::<LittleEndian>(128).unwrap(); // header size
        data.write_u16::<LittleEndian>(self.minor_version).unwrap();
        data.write_u16::<LittleEndian>(self.major_version).unwrap();
        data.write_u16::<LittleEndian>(self.header_block_size).unwrap();
        data.write_u16::<LittleEndian>(self.chunk_count).unwrap();
        data.resize(120, 0);
        data.write_u32::<LittleEndian>(self.flags).unwrap();
        data.write_u32::<LittleEndian>(0).unwrap(); // checksum
        data.resize(self.header_block_size as usize, 0);
        data
    }

    /// Header block followed by one chunk that does not carry the chunk signature
    pub fn build_with_corrupt_chunk(self) -> Vec<u8> {
        let mut data = self.chunk_count(1).build();
        let mut chunk = vec![0xAB; CHUNK_LEN];
        chunk[0..8].copy_from_slice(b"NotChnk\0");
        data.extend_from_slice(&chunk);
        data
    }
}

impl Default for EvtxHeaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Event tree from a JSON literal
#[allow(dead_code)]
pub fn tree(value: Value) -> EventTree {
    EventTree::from(value)
}

/// Successful source items, as a decoder would yield them
#[allow(dead_code)]
pub fn source(values: Vec<Value>) -> Vec<evtx_flatten::Result<EventTree>> {
    values.into_iter().map(|v| Ok(tree(v))).collect()
}

/// Flat record from `(path, value)` pairs
#[allow(dead_code)]
pub fn record(pairs: &[(&str, &str)]) -> FlatRecord {
    pairs.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_creates_valid_header() {
        let data = EvtxHeaderBuilder::new().build();
        assert_eq!(data.len(), 4096);
        assert_eq!(&data[0..8], b"ElfFile\0");
        assert_eq!(data[36], 0x01); // Minor version
        assert_eq!(data[38], 0x03); // Major version
        assert_eq!(data[40..42], [0x00, 0x10]); // Header block size
        assert_eq!(data[42], 0x01); // Chunk count
    }
}
