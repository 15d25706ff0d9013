use std::fs::File;
use std::io;
use std::io::Read;

use indicatif::{ProgressBar, ProgressStyle};

/// A progress bar that moves along with the read position of a file.
pub struct FileProgress {
    inner: File,
    progress: ProgressBar,
}

impl FileProgress {
    pub fn new(file: File) -> io::Result<Self> {
        let metadata = file.metadata()?;
        let progress = ProgressBar::new(metadata.len());
        progress.set_style(ProgressStyle::default_bar().template("{bar} {bytes}/{total_bytes}"));

        Ok(FileProgress {
            inner: file,
            progress,
        })
    }
}

impl Read for FileProgress {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n_read = self.inner.read(buf)?;
        self.progress.inc(n_read as u64);
        Ok(n_read)
    }
}

impl Drop for FileProgress {
    fn drop(&mut self) {
        self.progress.finish();
    }
}
