// Text normalization — the canonical token stream fed to the spam vectorizer.

pub mod normalize;
pub mod stopwords;

use std::io::{self, BufRead};

/// Read one line, replacing invalid UTF-8 with U+FFFD instead of failing.
///
/// Returns `None` at end of input. The trailing `\n` / `\r\n` is removed.
pub fn read_line_lossy<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
