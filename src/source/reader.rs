//! Blocking line sources over `BufRead` and files

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::constants::DEFAULT_READER_CAPACITY;
use crate::source::Encoding;
use crate::{Error, Result};

/// Decoded lines of a blocking reader
///
/// Lines are split on `\n` bytes before decoding, with one trailing `\r`
/// removed. A UTF-8 byte order mark at the start of the source is dropped.
#[derive(Debug)]
pub struct ReaderLines<R> {
    reader: R,
    encoding: Encoding,
    buffer: Vec<u8>,
    first: bool,
    done: bool,
}

impl<R: BufRead> ReaderLines<R> {
    pub fn new(reader: R, encoding: Encoding) -> Self {
        Self {
            reader,
            encoding,
            buffer: Vec::new(),
            first: true,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for ReaderLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.buffer.clear();
        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                let mut line = self.buffer.as_slice();
                if let Some(rest) = line.strip_suffix(b"\n") {
                    line = rest.strip_suffix(b"\r").unwrap_or(rest);
                }
                if self.first {
                    self.first = false;
                    line = self.encoding.strip_bom(line);
                }
                Some(Ok(self.encoding.decode(line).into_owned()))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Open `path` as a buffered line source
pub fn open_file(path: &Path, encoding: Encoding) -> Result<ReaderLines<BufReader<File>>> {
    let file = File::open(path)
        .map_err(|e| Error::io(format!("Failed to open {}", path.display()), e))?;
    debug!("Opened {} ({})", path.display(), encoding);

    Ok(ReaderLines::new(
        BufReader::with_capacity(DEFAULT_READER_CAPACITY, file),
        encoding,
    ))
}
