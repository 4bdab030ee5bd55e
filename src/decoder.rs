//! EVTX file header inspection and record decoding.
//!
//! Binary XML decoding is left to the `evtx` crate; this module validates the
//! file header up front and turns each decoded record into an [`EventTree`].

use byteorder::{LittleEndian, ReadBytesExt};
use evtx::EvtxParser;
use serde_json::{Map, Value};
use std::io::Cursor;

use crate::error::{Error, Result};
use crate::flatten::PATH_SEPARATOR;
use crate::models::EventTree;

pub const EVTX_MAGIC: &[u8; 8] = b"ElfFile\0";
pub const FILE_HEADER_LEN: usize = 128;
pub const SUPPORTED_MAJOR_VERSION: u16 = 3;

const EVENT_ROOT: &str = "Event";
const ATTRIBUTES_KEY: &str = "#attributes";
const TEXT_KEY: &str = "#text";
const NAMESPACE_ATTRIBUTE: &str = "xmlns";

const FLAG_DIRTY: u32 = 0x1;
const FLAG_FULL: u32 = 0x2;

/// Fixed 128-byte header at the start of every EVTX file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvtxHeader {
    pub first_chunk: u64,
    pub last_chunk: u64,
    pub next_record_id: u64,
    pub header_size: u32,
    pub minor_version: u16,
    pub major_version: u16,
    pub header_block_size: u16,
    pub chunk_count: u16,
    pub flags: u32,
}

impl EvtxHeader {
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < FILE_HEADER_LEN {
            return Err(Error::InvalidFormat(format!(
                "file is {} bytes, shorter than the {}-byte header",
                data.len(),
                FILE_HEADER_LEN
            )));
        }
        if &data[0..8] != EVTX_MAGIC {
            return Err(Error::InvalidFormat("missing ElfFile signature".to_string()));
        }

        let mut cursor = Cursor::new(&data[8..]);
        let first_chunk = cursor.read_u64::<LittleEndian>()?;
        let last_chunk = cursor.read_u64::<LittleEndian>()?;
        let next_record_id = cursor.read_u64::<LittleEndian>()?;
        let header_size = cursor.read_u32::<LittleEndian>()?;
        let minor_version = cursor.read_u16::<LittleEndian>()?;
        let major_version = cursor.read_u16::<LittleEndian>()?;
        let header_block_size = cursor.read_u16::<LittleEndian>()?;
        let chunk_count = cursor.read_u16::<LittleEndian>()?;

        let mut cursor = Cursor::new(&data[120..124]);
        let flags = cursor.read_u32::<LittleEndian>()?;

        if major_version != SUPPORTED_MAJOR_VERSION {
            return Err(Error::InvalidFormat(format!(
                "unsupported version {}.{}",
                major_version, minor_version
            )));
        }

        Ok(Self {
            first_chunk,
            last_chunk,
            next_record_id,
            header_size,
            minor_version,
            major_version,
            header_block_size,
            chunk_count,
            flags,
        })
    }

    /// File was not closed cleanly; the header counters may be stale.
    pub fn is_dirty(&self) -> bool {
        self.flags & FLAG_DIRTY != 0
    }

    pub fn is_full(&self) -> bool {
        self.flags & FLAG_FULL != 0
    }
}

/// Decodes the records of an in-memory EVTX file.
pub struct EvtxDecoder {
    parser: EvtxParser<Cursor<Vec<u8>>>,
}

impl EvtxDecoder {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let parser = EvtxParser::from_buffer(data)
            .map_err(|e| Error::InvalidFormat(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Decoded records in file order. A record that fails to decode yields
    /// `Error::Decode` and iteration continues with the next one.
    pub fn records(&mut self) -> impl Iterator<Item = Result<EventTree>> + '_ {
        self.parser.records_json_value().map(|record| {
            record
                .map(|r| event_tree(r.data))
                .map_err(|e| Error::Decode(e.to_string()))
        })
    }
}

/// Convert one record as rendered by `evtx` into an event tree.
///
/// The XML-to-JSON encoding is undone so that paths follow element names:
/// - the single `Event` root is unwrapped (its `xmlns` declaration is dropped);
/// - `#attributes` entries become children of the element that carries them;
/// - `#text` becomes the value of the element itself, and that element's
///   attributes are emitted next to it as `Element.Attribute`.
///
/// `{"System": {"EventID": {"#attributes": {"Qualifiers": 16384}, "#text": 7036}}}`
/// therefore flattens to `System.EventID = 7036` and
/// `System.EventID.Qualifiers = 16384`.
pub fn event_tree(value: Value) -> EventTree {
    let (value, is_event_root) = match value {
        Value::Object(map) if map.len() == 1 && map.contains_key(EVENT_ROOT) => (
            map.into_iter()
                .next()
                .map(|(_, inner)| inner)
                .unwrap_or(Value::Null),
            true,
        ),
        other => (other, false),
    };

    match value {
        Value::Object(map) => EventTree::Node(element_fields(map, is_event_root)),
        other => EventTree::from(other),
    }
}

fn element_fields(map: Map<String, Value>, is_event_root: bool) -> Vec<(String, EventTree)> {
    let mut fields = Vec::with_capacity(map.len());

    for (key, value) in map {
        match value {
            Value::Object(attributes) if key == ATTRIBUTES_KEY => {
                for (name, attribute) in attributes {
                    if is_event_root && name == NAMESPACE_ATTRIBUTE {
                        continue;
                    }
                    fields.push((name, EventTree::from(attribute)));
                }
            }
            Value::Object(element) if element.contains_key(TEXT_KEY) => {
                let mut text = Value::Null;
                let mut rest = Map::new();
                for (child_key, child) in element {
                    if child_key == TEXT_KEY {
                        text = child;
                    } else {
                        rest.insert(child_key, child);
                    }
                }

                fields.push((key.clone(), EventTree::from(text)));
                for (name, child) in element_fields(rest, false) {
                    fields.push((format!("{}{}{}", key, PATH_SEPARATOR, name), child));
                }
            }
            Value::Object(element) => {
                fields.push((key, EventTree::Node(element_fields(element, false))));
            }
            other => fields.push((key, EventTree::from(other))),
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use serde_json::json;

    /// Shape of `EvtxParser::records_json_value` output with default settings
    fn rendered_record() -> Value {
        json!({
            "Event": {
                "#attributes": {"xmlns": "http://schemas.microsoft.com/win/2004/08/events/event"},
                "System": {
                    "Provider": {"#attributes": {"Name": "Service Control Manager", "Guid": "{555908d1}"}},
                    "EventID": {"#attributes": {"Qualifiers": 16384}, "#text": 7036},
                    "Level": 4,
                    "TimeCreated": {"#attributes": {"SystemTime": "2016-07-08T18:12:51.681640Z"}},
                    "EventRecordID": 1,
                    "Security": null
                },
                "EventData": {"param1": "Windows Update", "param2": "running"}
            }
        })
    }

    #[test]
    fn test_event_tree_strips_xml_encoding() {
        let record = flatten(event_tree(rendered_record())).unwrap();

        let mut paths: Vec<_> = record.paths().collect();
        paths.sort();
        assert_eq!(
            paths,
            vec![
                "EventData.param1",
                "EventData.param2",
                "System.EventID",
                "System.EventID.Qualifiers",
                "System.EventRecordID",
                "System.Level",
                "System.Provider.Guid",
                "System.Provider.Name",
                "System.Security",
                "System.TimeCreated.SystemTime",
            ]
        );
        assert_eq!(record.get("System.EventID"), Some("7036"));
        assert_eq!(record.get("System.EventID.Qualifiers"), Some("16384"));
        assert_eq!(record.get("System.Provider.Name"), Some("Service Control Manager"));
        assert_eq!(record.get("System.Security"), Some(""));
    }

    #[test]
    fn test_event_tree_keeps_non_event_roots() {
        let record = flatten(event_tree(json!({"Other": {"#text": "x"}, "Extra": 1}))).unwrap();
        assert_eq!(record.get("Other"), Some("x"));
        assert_eq!(record.get("Extra"), Some("1"));
    }

    #[test]
    fn test_nested_xmlns_is_kept() {
        let record = flatten(event_tree(json!({
            "Event": {"UserData": {"LogFileCleared": {"#attributes": {"xmlns": "urn:x"}, "SubjectUserName": "bob"}}}
        })))
        .unwrap();
        assert_eq!(record.get("UserData.LogFileCleared.xmlns"), Some("urn:x"));
        assert_eq!(record.get("UserData.LogFileCleared.SubjectUserName"), Some("bob"));
    }

    fn header_bytes(major: u16, flags: u32) -> Vec<u8> {
        let mut data = vec![0u8; FILE_HEADER_LEN];
        data[0..8].copy_from_slice(EVTX_MAGIC);
        data[24] = 42; // next record id
        data[32] = 128; // header size
        data[36] = 1; // minor
        data[38..40].copy_from_slice(&major.to_le_bytes());
        data[42] = 2; // chunk count
        data[120..124].copy_from_slice(&flags.to_le_bytes());
        data
    }

    #[test]
    fn test_parse_header() {
        let header = EvtxHeader::parse(&header_bytes(3, FLAG_DIRTY)).unwrap();
        assert_eq!(header.major_version, 3);
        assert_eq!(header.minor_version, 1);
        assert_eq!(header.next_record_id, 42);
        assert_eq!(header.header_size, 128);
        assert_eq!(header.chunk_count, 2);
        assert!(header.is_dirty());
        assert!(!header.is_full());
    }

    #[test]
    fn test_reject_other_major_version() {
        assert!(matches!(
            EvtxHeader::parse(&header_bytes(2, 0)),
            Err(Error::InvalidFormat(_))
        ));
    }
}
