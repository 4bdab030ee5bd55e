//! High-level API for reading EVTX files.

use crate::converter::{Conversion, Converter};
use crate::decoder::{EvtxDecoder, EvtxHeader};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A reader for EVTX files that flattens every event into a [`Conversion`].
///
/// # Examples
///
/// ```no_run
/// use evtx_flatten::EvtxReader;
///
/// let reader = EvtxReader::from_file("Security.evtx")?;
/// let conversion = reader.read_all()?;
///
/// println!("{} columns", conversion.schema().len());
/// # Ok::<(), evtx_flatten::Error>(())
/// ```
pub struct EvtxReader {
    data: Vec<u8>,
    header: EvtxHeader,
    converter: Converter,
}

impl EvtxReader {
    /// Create a new EVTX reader from a file path.
    ///
    /// # Errors
    ///
    /// Returns `Error::InputUnavailable` if the file cannot be read and
    /// `Error::InvalidFormat` if it does not start with an EVTX header.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_converter(read_file(path.as_ref())?, Converter::new())
    }

    /// Create a new EVTX reader from raw bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::with_converter(data, Converter::new())
    }

    fn with_converter(data: Vec<u8>, converter: Converter) -> Result<Self> {
        let header = EvtxHeader::parse(&data)?;
        Ok(Self {
            data,
            header,
            converter,
        })
    }

    pub fn header(&self) -> &EvtxHeader {
        &self.header
    }

    /// `(major, minor)` format version from the file header.
    pub fn version(&self) -> (u16, u16) {
        (self.header.major_version, self.header.minor_version)
    }

    /// Decode and flatten every record, then compute the column schema.
    ///
    /// Records that fail to decode are skipped and counted in
    /// [`ConversionStats::records_skipped`](crate::ConversionStats).
    pub fn read_all(self) -> Result<Conversion> {
        let mut decoder = EvtxDecoder::from_bytes(self.data)?;
        Ok(self.converter.convert(decoder.records()))
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let input_unavailable = |source| Error::InputUnavailable {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(input_unavailable)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data).map_err(input_unavailable)?;
    Ok(data)
}

/// Builder for configuring EVTX reading options.
///
/// # Examples
///
/// ```no_run
/// use evtx_flatten::EvtxReaderBuilder;
///
/// let reader = EvtxReaderBuilder::new()
///     .max_depth(32)
///     .from_file("System.evtx")?;
/// let conversion = reader.read_all()?;
/// # Ok::<(), evtx_flatten::Error>(())
/// ```
pub struct EvtxReaderBuilder {
    max_depth: Option<usize>,
}

impl EvtxReaderBuilder {
    pub fn new() -> Self {
        Self { max_depth: None }
    }

    /// Records nested deeper than this are skipped as malformed.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    fn converter(&self) -> Converter {
        match self.max_depth {
            Some(depth) => Converter::builder().max_depth(depth).build(),
            None => Converter::new(),
        }
    }

    /// Build a reader from a file path.
    pub fn from_file<P: AsRef<Path>>(self, path: P) -> Result<EvtxReader> {
        EvtxReader::with_converter(read_file(path.as_ref())?, self.converter())
    }

    /// Build a reader from raw bytes.
    pub fn from_bytes(self, data: Vec<u8>) -> Result<EvtxReader> {
        EvtxReader::with_converter(data, self.converter())
    }
}

impl Default for EvtxReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
