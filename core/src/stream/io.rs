//! Normalized I/O for sources and recovered-stream sinks.

use std::io::{self, Cursor, Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::types::{MuxError, SourceId};

/// Canonical input abstraction
pub enum SourceInput {
    Reader(Box<dyn Read + Send>),
    File(PathBuf),
    Memory(Vec<u8>),
}

impl SourceInput {
    pub fn describe(&self) -> String {
        match self {
            SourceInput::Reader(_) => "reader".into(),
            SourceInput::File(p) => p.display().to_string(),
            SourceInput::Memory(b) => format!("memory ({} bytes)", b.len()),
        }
    }
}

/// Canonical output abstraction
pub enum OutputSink {
    Writer(Box<dyn Write + Send>),
    File(PathBuf),
    Memory(SharedBuffer),
}

/// Normalize a source input into a boxed reader.
pub fn open_input(id: SourceId, src: SourceInput) -> Result<Box<dyn Read + Send>, MuxError> {
    let reader: Box<dyn Read + Send> = match src {
        SourceInput::Reader(r) => r,
        SourceInput::File(p) => {
            let file = std::fs::File::open(&p)
                .map_err(|error| MuxError::SourceUnavailable { id, error })?;
            Box::new(file)
        }
        SourceInput::Memory(b) => Box::new(Cursor::new(b)),
    };
    Ok(reader)
}

/// Normalize an output sink into a boxed writer.
pub fn open_output(id: SourceId, sink: OutputSink) -> Result<Box<dyn Write + Send>, MuxError> {
    let writer: Box<dyn Write + Send> = match sink {
        OutputSink::Writer(w) => w,
        OutputSink::File(p) => {
            let file = std::fs::File::create(&p).map_err(|error| MuxError::Persist { id, error })?;
            Box::new(file)
        }
        OutputSink::Memory(buf) => Box::new(buf),
    };
    Ok(writer)
}

/// In-memory sink that stays readable after the writer is consumed.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        match self.buf.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .buf
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "shared buffer poisoned"))?;
        guard.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Read up to `len` bytes, stopping early only at end of input.
///
/// An empty frame means the input is exhausted. A short, non-empty frame is
/// the last one.
pub fn read_frame<R: Read + ?Sized>(r: &mut R, len: usize) -> io::Result<Bytes> {
    let mut buf = vec![0u8; len];
    let mut off = 0;

    while off < len {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    buf.truncate(off);
    Ok(Bytes::from(buf))
}
