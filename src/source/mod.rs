//! URL source
//!
//! Produces a lazy sequence of URLs, one per non-blank line, from a file, a
//! piped stream, or any iterator of lines. The sequence is capped at a limit
//! and never pulls a line beyond what the cap needs.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Lazy, capped iterator over URL strings
///
/// Lines are trimmed and blank lines are skipped; the cap counts URLs, not
/// raw lines. Read errors are yielded as `Err` and end nothing by
/// themselves, so the caller decides whether to stop.
pub struct UrlSource<L> {
    lines: L,
    remaining: usize,
}

impl<L> UrlSource<L>
where
    L: Iterator<Item = io::Result<String>>,
{
    /// Wraps an iterator of lines, yielding at most `limit` URLs
    pub fn from_lines(lines: L, limit: usize) -> Self {
        Self {
            lines,
            remaining: limit,
        }
    }
}

impl<R: BufRead> UrlSource<io::Lines<R>> {
    /// Reads URLs from a buffered reader such as locked stdin
    pub fn from_reader(reader: R, limit: usize) -> Self {
        Self::from_lines(reader.lines(), limit)
    }
}

impl UrlSource<io::Lines<BufReader<File>>> {
    /// Opens a URL list file
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened.
    pub fn open(path: &Path, limit: usize) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file), limit))
    }
}

impl<L> Iterator for UrlSource<L>
where
    L: Iterator<Item = io::Result<String>>,
{
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        loop {
            match self.lines.next()? {
                Ok(line) => {
                    let url = line.trim();
                    if url.is_empty() {
                        continue;
                    }
                    self.remaining -= 1;
                    return Some(Ok(url.to_string()));
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::{Cursor, Write};
    use std::rc::Rc;
    use tempfile::NamedTempFile;

    /// Line iterator that counts how many lines were pulled from it
    struct CountingLines {
        inner: std::vec::IntoIter<String>,
        pulled: Rc<Cell<usize>>,
    }

    impl Iterator for CountingLines {
        type Item = io::Result<String>;

        fn next(&mut self) -> Option<Self::Item> {
            let line = self.inner.next()?;
            self.pulled.set(self.pulled.get() + 1);
            Some(Ok(line))
        }
    }

    fn counting(lines: &[&str]) -> (CountingLines, Rc<Cell<usize>>) {
        let pulled = Rc::new(Cell::new(0));
        let iter = CountingLines {
            inner: lines
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .into_iter(),
            pulled: Rc::clone(&pulled),
        };
        (iter, pulled)
    }

    #[test]
    fn test_limit_stops_pulling_lines() {
        let lines: Vec<String> = (0..10).map(|i| format!("https://e{}.test/", i)).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let (iter, pulled) = counting(&refs);

        let urls: Vec<String> = UrlSource::from_lines(iter, 3)
            .collect::<io::Result<_>>()
            .unwrap();

        assert_eq!(urls.len(), 3);
        assert_eq!(urls[2], "https://e2.test/");
        assert_eq!(pulled.get(), 3);
    }

    #[test]
    fn test_trims_and_skips_blank_lines() {
        let input = "  https://a.test/  \n\n   \nhttps://b.test/\r\n";
        let urls: Vec<String> = UrlSource::from_reader(Cursor::new(input), 10)
            .collect::<io::Result<_>>()
            .unwrap();

        assert_eq!(urls, vec!["https://a.test/", "https://b.test/"]);
    }

    #[test]
    fn test_blank_lines_do_not_count_towards_limit() {
        let (iter, pulled) = counting(&[
            "",
            "https://a.test/",
            " ",
            "https://b.test/",
            "https://c.test/",
        ]);
        let urls: Vec<String> = UrlSource::from_lines(iter, 2)
            .collect::<io::Result<_>>()
            .unwrap();

        assert_eq!(urls, vec!["https://a.test/", "https://b.test/"]);
        assert_eq!(pulled.get(), 4);
    }

    #[test]
    fn test_open_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "https://a.test/").unwrap();
        writeln!(file, "https://b.test/").unwrap();
        file.flush().unwrap();

        let urls: Vec<String> = UrlSource::open(file.path(), 1000)
            .unwrap()
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(urls.len(), 2);
    }

    #[test]
    fn test_open_missing_file() {
        assert!(UrlSource::open(Path::new("/nonexistent/urls.txt"), 10).is_err());
    }

    #[test]
    fn test_read_error_is_yielded() {
        let lines = vec![
            Ok("https://a.test/".to_string()),
            Err(io::Error::new(io::ErrorKind::InvalidData, "bad utf-8")),
        ];
        let mut source = UrlSource::from_lines(lines.into_iter(), 10);

        assert!(matches!(source.next(), Some(Ok(_))));
        assert!(matches!(source.next(), Some(Err(_))));
        assert!(source.next().is_none());
    }
}
