use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, info, warn};

/// Configuration for lesson sheet loading
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Whether a read failure is an error or an empty sheet
    pub fail_fast: bool,
    /// Buffer size for async reading (default: 8KB)
    pub buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            buffer_size: 8192,
        }
    }
}

/// Where the raw sheet text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonSource {
    Path(PathBuf),
    Stdin,
}

impl FromStr for LessonSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == "-" {
            LessonSource::Stdin
        } else {
            LessonSource::Path(PathBuf::from(s))
        })
    }
}

impl fmt::Display for LessonSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LessonSource::Path(path) => write!(f, "{}", path.display()),
            LessonSource::Stdin => f.write_str("<stdin>"),
        }
    }
}

/// Statistics for one load
#[derive(Debug, Clone)]
pub struct ReadStats {
    pub source: String,
    pub lines_read: u64,
    pub bytes_read: u64,
    pub duration_ms: u64,
    pub read_error: Option<String>,
}

/// Async loader for the raw sheet text
pub struct LessonReader {
    config: ReaderConfig,
}

impl LessonReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Load the whole sheet, rows joined with `\n`.
    ///
    /// Without `fail_fast`, an unreadable source yields the rows read so far
    /// (possibly none) and the error in `ReadStats::read_error`.
    pub async fn read_source(&self, source: &LessonSource) -> Result<(String, ReadStats)> {
        match source {
            LessonSource::Path(path) => self.read_path(path).await,
            LessonSource::Stdin => self.read_stream(tokio::io::stdin(), source).await,
        }
    }

    /// Load a sheet from an already-open byte stream, labelled by `source`
    pub async fn read_stream<R>(
        &self,
        stream: R,
        source: &LessonSource,
    ) -> Result<(String, ReadStats)>
    where
        R: AsyncRead + Unpin,
    {
        let reader = BufReader::with_capacity(self.config.buffer_size, stream);
        let start_time = std::time::Instant::now();
        self.read_rows(reader, source.to_string(), start_time).await
    }

    pub async fn read_path(&self, path: &Path) -> Result<(String, ReadStats)> {
        let start_time = std::time::Instant::now();
        debug!("Opening lesson sheet: {}", path.display());

        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) => {
                let error_msg = format!("Failed to open lesson sheet {}: {}", path.display(), e);
                let source = path.display().to_string();
                return self.fail(error_msg, source, 0, 0, start_time, String::new());
            }
        };

        let reader = BufReader::with_capacity(self.config.buffer_size, file);
        self.read_rows(reader, path.display().to_string(), start_time).await
    }

    async fn read_rows<R>(
        &self,
        reader: R,
        source: String,
        start_time: std::time::Instant,
    ) -> Result<(String, ReadStats)>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut rows: Vec<String> = Vec::new();
        let mut byte_count = 0u64;

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    byte_count += line.len() as u64 + 1;
                    rows.push(line);
                }
                Ok(None) => break,
                Err(e) => {
                    let error_msg = format!(
                        "Read error in {} at line {}: {}",
                        source,
                        rows.len() + 1,
                        e
                    );
                    let line_count = rows.len() as u64;
                    let partial = rows.join("\n");
                    return self.fail(
                        error_msg,
                        source,
                        line_count,
                        byte_count,
                        start_time,
                        partial,
                    );
                }
            }
        }

        let stats = ReadStats {
            source,
            lines_read: rows.len() as u64,
            bytes_read: byte_count,
            duration_ms: start_time.elapsed().as_millis() as u64,
            read_error: None,
        };

        info!(
            "Loaded {}: {} lines, {} bytes in {}ms",
            stats.source, stats.lines_read, stats.bytes_read, stats.duration_ms
        );
        Ok((rows.join("\n"), stats))
    }

    fn fail(
        &self,
        error_msg: String,
        source: String,
        lines_read: u64,
        bytes_read: u64,
        start_time: std::time::Instant,
        partial: String,
    ) -> Result<(String, ReadStats)> {
        warn!("{}", error_msg);

        if self.config.fail_fast {
            return Err(anyhow::anyhow!(error_msg));
        }

        let stats = ReadStats {
            source,
            lines_read,
            bytes_read,
            duration_ms: start_time.elapsed().as_millis() as u64,
            read_error: Some(error_msg),
        };
        Ok((partial, stats))
    }
}

/// Load a sheet from a path with default configuration
pub async fn read_lesson_async<P: AsRef<Path>>(path: P) -> Result<String> {
    let reader = LessonReader::new(ReaderConfig::default());
    let (text, _stats) = reader.read_path(path.as_ref()).await?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::fs;

    async fn create_test_file(dir: &Path, name: &str, content: &[u8]) -> Result<PathBuf> {
        let file_path = dir.join(name);
        fs::write(&file_path, content).await?;
        Ok(file_path)
    }

    #[tokio::test]
    async fn test_read_crlf_sheet() {
        let temp_dir = TempDir::new().unwrap();
        let reader = LessonReader::new(ReaderConfig::default());

        let file_path = create_test_file(
            temp_dir.path(),
            "sheet.csv",
            b"type,a,b\r\nTEXT,Intro,Hello\r\nDIALOGUE,Mike,Hi\r\n",
        )
        .await
        .unwrap();

        let (text, stats) = reader.read_path(&file_path).await.unwrap();

        assert_eq!(text, "type,a,b\nTEXT,Intro,Hello\nDIALOGUE,Mike,Hi");
        assert_eq!(stats.lines_read, 3);
        assert!(stats.bytes_read > 0);
        assert!(stats.read_error.is_none());
    }

    #[tokio::test]
    async fn test_read_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let reader = LessonReader::new(ReaderConfig::default());

        let file_path = create_test_file(temp_dir.path(), "empty.csv", b"").await.unwrap();
        let (text, stats) = reader.read_path(&file_path).await.unwrap();

        assert_eq!(text, "");
        assert_eq!(stats.lines_read, 0);
        assert!(stats.read_error.is_none());
    }

    #[tokio::test]
    async fn test_read_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let reader = LessonReader::new(ReaderConfig::default());

        let (text, stats) = reader
            .read_path(&temp_dir.path().join("missing.csv"))
            .await
            .unwrap();

        assert_eq!(text, "");
        assert!(stats.read_error.is_some());
    }

    #[tokio::test]
    async fn test_read_nonexistent_file_fail_fast() {
        let temp_dir = TempDir::new().unwrap();
        let config = ReaderConfig {
            fail_fast: true,
            ..Default::default()
        };
        let reader = LessonReader::new(config);

        let result = reader.read_path(&temp_dir.path().join("missing.csv")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalid_utf8_keeps_rows_read_so_far() {
        let temp_dir = TempDir::new().unwrap();
        let reader = LessonReader::new(ReaderConfig::default());

        let content = b"header\nTEXT,A,B\n\xFF\xFE\n";
        let file_path = create_test_file(temp_dir.path(), "bad.csv", content)
            .await
            .unwrap();
        let (text, stats) = reader.read_path(&file_path).await.unwrap();

        assert_eq!(text, "header\nTEXT,A,B");
        assert_eq!(stats.lines_read, 2);
        assert!(stats.read_error.is_some());
    }

    #[tokio::test]
    async fn test_read_stdin_style_stream() {
        let reader = LessonReader::new(ReaderConfig::default());
        let piped: &[u8] = b"type,a,b\r\nDIALOGUE,Mike,\"Hi, John\"\r\n";

        let (text, stats) = reader
            .read_stream(piped, &LessonSource::Stdin)
            .await
            .unwrap();

        assert_eq!(text, "type,a,b\nDIALOGUE,Mike,\"Hi, John\"");
        assert_eq!(stats.source, "<stdin>");
        assert_eq!(stats.lines_read, 2);
        assert!(stats.read_error.is_none());
    }

    #[tokio::test]
    async fn test_invalid_utf8_stream_fail_fast() {
        let config = ReaderConfig {
            fail_fast: true,
            ..Default::default()
        };
        let reader = LessonReader::new(config);
        let piped: &[u8] = b"header\n\xFF\n";

        let result = reader.read_stream(piped, &LessonSource::Stdin).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_source_from_str() {
        assert_eq!("-".parse::<LessonSource>().unwrap(), LessonSource::Stdin);
        assert_eq!(
            "sheet.csv".parse::<LessonSource>().unwrap(),
            LessonSource::Path(PathBuf::from("sheet.csv"))
        );
    }
}
