//! Positioned file I/O
//!
//! Every read and write names its own absolute position. No operation depends
//! on (or moves) a shared seek cursor.

use std::fs::File;
use std::io;

use super::offset::FilePos;

#[cfg(not(any(unix, windows)))]
compile_error!("unsupported OS");

/// The open database file
#[derive(Debug)]
pub struct DbFile {
    file: File,
}

impl DbFile {
    pub fn new(file: File) -> Self {
        Self { file }
    }

    /// Current file length in bytes (end-of-file is where records are appended)
    pub fn len(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Fill `buf` from `pos`, failing with `UnexpectedEof` on a short file
    pub fn read_exact_at(&self, buf: &mut [u8], pos: FilePos) -> io::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;

            self.file.read_exact_at(buf, pos.get())
        }

        #[cfg(windows)]
        {
            use std::os::windows::fs::FileExt;

            let mut done = 0;
            while done < buf.len() {
                match self.file.seek_read(&mut buf[done..], pos.get() + done as u64) {
                    Ok(0) => {
                        return Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "failed to fill whole buffer",
                        ))
                    }
                    Ok(n) => done += n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => return Err(e),
                }
            }
            Ok(())
        }
    }

    /// Write all of `buf` at `pos`
    pub fn write_all_at(&self, buf: &[u8], pos: FilePos) -> io::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;

            self.file.write_all_at(buf, pos.get())
        }

        #[cfg(windows)]
        {
            use std::os::windows::fs::FileExt;

            let mut done = 0;
            while done < buf.len() {
                match self.file.seek_write(&buf[done..], pos.get() + done as u64) {
                    Ok(0) => {
                        return Err(io::Error::new(
                            io::ErrorKind::WriteZero,
                            "failed to write whole buffer",
                        ))
                    }
                    Ok(n) => done += n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => return Err(e),
                }
            }
            Ok(())
        }
    }

    /// Flush file data to stable storage
    pub fn sync(&self) -> io::Result<()> {
        self.file.sync_data()
    }
}
