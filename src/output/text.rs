//! Plain-text group listing.
//!
//! ```text
//! Duplicate files with hash 2d711642b726b04401627ca9fbac32f5c8530fb1903cc4db02258717921a4881:
//!     /data/a.txt
//!     /data/b.txt
//! ```

use std::io::{self, Write};

use crate::duplicates::{Duplicates, GroupKey};

/// Text formatter over a finished result.
#[derive(Debug)]
pub struct TextOutput<'a> {
    duplicates: &'a Duplicates,
}

impl<'a> TextOutput<'a> {
    /// Wrap a result for printing.
    #[must_use]
    pub fn new(duplicates: &'a Duplicates) -> Self {
        Self { duplicates }
    }

    /// Write every group, sorted by key.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for (key, files) in self.duplicates.sorted() {
            match key {
                GroupKey::Digest(ref digest) => {
                    writeln!(writer, "Duplicate files with hash {}:", digest)?;
                }
                GroupKey::Size(size) => {
                    writeln!(
                        writer,
                        "Files with size {} bytes ({}):",
                        size,
                        bytesize::ByteSize::b(size)
                    )?;
                }
            }
            for file in files {
                writeln!(writer, "    {}", file.display())?;
            }
        }
        writer.flush()
    }
}
