//! 라인 소스 -- 로그 파일을 비동기로 읽어 물리 라인을 채널로 보냅니다.
//!
//! UTF-8이 아닌 바이트는 대체 문자로 바꾸고, 줄 끝의 `\r\n`/`\n`은
//! 제거합니다. 최대 길이를 넘는 라인은 문자 경계에서 잘라 경고를 남깁니다.

use std::path::{Path, PathBuf};

use metrics::counter;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use gclog_core::metrics as m;

use crate::error::IngestError;
use crate::preprocess::RawLine;

/// 파일 라인 소스
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    max_line_length: usize,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, max_line_length: usize) -> Self {
        Self {
            path: path.into(),
            max_line_length,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 파일 끝이나 취소까지 라인을 보냅니다. 보낸 라인 수를 반환합니다.
    pub async fn run(
        self,
        tx: mpsc::Sender<RawLine>,
        cancel: CancellationToken,
    ) -> Result<u64, IngestError> {
        let file = File::open(&self.path)
            .await
            .map_err(|e| IngestError::Source {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;
        info!(path = %self.path.display(), "reading gc log");
        read_lines(BufReader::new(file), &tx, &cancel, self.max_line_length).await
    }
}

/// 리더에서 라인을 읽어 채널로 보냅니다. 라인 번호는 1부터 매깁니다.
pub async fn read_lines<R>(
    mut reader: R,
    tx: &mpsc::Sender<RawLine>,
    cancel: &CancellationToken,
    max_line_length: usize,
) -> Result<u64, IngestError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut number = 0usize;

    loop {
        buf.clear();
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(lines = number, "line source cancelled");
                break;
            }
            read = reader.read_until(b'\n', &mut buf) => read?,
        };
        if read == 0 {
            break;
        }

        number += 1;
        let text = decode_line(&buf, max_line_length, number);
        tx.send(RawLine::new(text, number))
            .await
            .map_err(|_| IngestError::Channel("line receiver dropped".to_owned()))?;
    }

    debug!(lines = number, "line source finished");
    Ok(number as u64)
}

/// 줄 끝을 제거하고 최대 길이로 자릅니다.
fn decode_line(bytes: &[u8], max_line_length: usize, number: usize) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    let mut text = String::from_utf8_lossy(bytes).into_owned();

    if text.len() > max_line_length {
        let mut cut = max_line_length;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        warn!(
            line = number,
            length = text.len(),
            max_line_length,
            "line exceeds maximum length, truncating"
        );
        counter!(m::INGEST_LINES_TRUNCATED_TOTAL).increment(1);
        text.truncate(cut);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(input: &'static [u8], max: usize) -> Vec<RawLine> {
        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let sent = read_lines(input, &tx, &cancel, max).await.unwrap();
        drop(tx);
        let mut lines = Vec::new();
        while let Some(line) = rx.recv().await {
            lines.push(line);
        }
        assert_eq!(sent as usize, lines.len());
        lines
    }

    #[tokio::test]
    async fn strips_line_endings_and_numbers_lines() {
        let lines = collect(b"first\r\nsecond\n\nlast", 1024).await;
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "", "last"]);
        assert_eq!(lines[3].number, 4);
    }

    #[tokio::test]
    async fn long_line_is_truncated_on_char_boundary() {
        // '가'는 3바이트
        let lines = collect("가가가\n".as_bytes(), 4).await;
        assert_eq!(lines[0].text, "가");
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced() {
        let lines = collect(b"ok\xff\n", 1024).await;
        assert_eq!(lines[0].text, "ok\u{fffd}");
    }

    #[tokio::test]
    async fn cancelled_source_stops_immediately() {
        let (tx, _rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let sent = read_lines(&b"a\nb\n"[..], &tx, &cancel, 1024).await.unwrap();
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn missing_file_is_a_source_error() {
        let (tx, _rx) = mpsc::channel(1);
        let err = FileSource::new("/nonexistent/gc.log", 1024)
            .run(tx, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Source { .. }));
    }
}
