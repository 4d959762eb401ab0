pub mod demo;

use std::io::{ErrorKind, Read, Write};
use std::time::Instant;

use log::debug;

use crate::error::Result;
use crate::output::ProgressRenderer;

/// 読み込みチャンクサイズ（64 KiB）。一部のネットワークファイルシステムは
/// 大きな read に失敗することがあるため、小さめに読んで描画側を間引く
const CHUNK_SIZE: usize = 64 * 1024;

/// 再描画する境界。コピー済みバイト数が 1 MiB 境界を跨いだときだけ描画する
const RENDER_BOUNDARY_SHIFT: u32 = 20;

/// 1 ファイル分の転送状態。ファイルごとに作り直す
pub struct TransferState {
    filename: String,
    bytes_copied: u64,
    /// 0 はサイズ不明（FIFO・ソケットなど）
    total_size: u64,
    started: Instant,
}

impl TransferState {
    pub fn new(filename: impl Into<String>, total_size: u64) -> Self {
        Self {
            filename: filename.into(),
            bytes_copied: 0,
            total_size,
            started: Instant::now(),
        }
    }

    pub fn advance(&mut self, n: u64) {
        self.bytes_copied += n;
    }

    pub fn bytes_copied(&self) -> u64 {
        self.bytes_copied
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

/// 転送ループ。出力先とプログレス描画器を所有し、
/// ファイルを 1 つずつ順番に処理する
pub struct TransferLoop<W: Write, E: Write> {
    sink: W,
    renderer: ProgressRenderer<E>,
}

impl<W: Write, E: Write> TransferLoop<W, E> {
    pub fn new(sink: W, renderer: ProgressRenderer<E>) -> Self {
        Self { sink, renderer }
    }

    /// source の内容をすべて sink へコピーする。
    /// 成否にかかわらず最終位置を描画し、改行でバーを確定させる
    pub fn transfer<R: Read>(
        &mut self,
        filename: &str,
        mut source: R,
        total_size: u64,
    ) -> Result<()> {
        let mut state = TransferState::new(filename, total_size);
        debug!("transfer start: {} ({} bytes)", filename, total_size);

        // 1 バイトも動く前にバーを出しておく。ETA の起点もここ
        self.render(&state)?;

        let mut buffer = vec![0u8; CHUNK_SIZE];
        let outcome = self.copy_chunks(&mut source, &mut buffer, &mut state);

        // 最後の読み込みが境界に乗るとは限らないため、最終位置を必ず描画する
        self.render(&state)?;
        self.renderer.finish()?;

        debug!(
            "transfer end: {} ({} bytes copied)",
            filename,
            state.bytes_copied()
        );
        outcome
    }

    /// 模擬転送モード。実ファイルに触れずにバーだけを動かす
    pub fn run_demo(&mut self) -> Result<()> {
        demo::run(&mut self.renderer)
    }

    fn copy_chunks<R: Read>(
        &mut self,
        source: &mut R,
        buffer: &mut [u8],
        state: &mut TransferState,
    ) -> Result<()> {
        loop {
            let nread = match source.read(buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            // チャンク全体を書き切ってから位置を進める。
            // 書き切れなければ（WriteZero 含め）このファイルは失敗
            self.sink.write_all(&buffer[..nread])?;

            let previous = state.bytes_copied();
            state.advance(nread as u64);
            if state.bytes_copied() >> RENDER_BOUNDARY_SHIFT > previous >> RENDER_BOUNDARY_SHIFT {
                self.render(state)?;
            }
        }
        self.sink.flush()?;
        Ok(())
    }

    fn render(&mut self, state: &TransferState) -> Result<()> {
        self.renderer.update(
            &state.filename,
            state.bytes_copied,
            state.total_size,
            state.elapsed_secs(),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source;
    use std::fs;
    use std::io::{self, Cursor};
    use tempfile::TempDir;

    fn test_loop() -> TransferLoop<Vec<u8>, Vec<u8>> {
        TransferLoop::new(Vec::new(), ProgressRenderer::new(Vec::new(), 40))
    }

    /// 指定バイト数まで受け付けた後に失敗する書き込み先
    struct FailingSink {
        written: Vec<u8>,
        capacity: usize,
    }

    impl Write for FailingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written.len() + buf.len() > self.capacity {
                return Err(io::Error::new(io::ErrorKind::Other, "sink full"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// 一定量を返した後に失敗する読み込み元
    struct FailingSource {
        remaining: usize,
    }

    impl Read for FailingSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "read failed"));
            }
            let n = self.remaining.min(buf.len());
            buf[..n].fill(0xAB);
            self.remaining -= n;
            Ok(n)
        }
    }

    #[test]
    fn test_transfer_copies_all_bytes() -> crate::error::Result<()> {
        // チャンク境界を跨ぐサイズで内容が欠けないことを確認する
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let mut transfer_loop = test_loop();

        transfer_loop.transfer("input.bin", Cursor::new(data.clone()), data.len() as u64)?;

        assert_eq!(transfer_loop.sink, data);
        Ok(())
    }

    #[test]
    fn test_transfer_empty_source() -> crate::error::Result<()> {
        let mut transfer_loop = test_loop();

        transfer_loop.transfer("empty", Cursor::new(Vec::new()), 0)?;

        assert!(transfer_loop.sink.is_empty());
        Ok(())
    }

    #[test]
    fn test_transfer_from_file() -> crate::error::Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");
        fs::write(&path, b"file contents")?;

        let (file, size) = source::open_path(&path)?;
        let mut transfer_loop = test_loop();
        transfer_loop.transfer("input.txt", file, size)?;

        assert_eq!(transfer_loop.sink, b"file contents");
        Ok(())
    }

    #[test]
    fn test_transfer_surfaces_read_error() {
        let mut transfer_loop = test_loop();

        let result = transfer_loop.transfer("bad", FailingSource { remaining: 1000 }, 5000);

        assert!(result.is_err());
        // 失敗前に読めた分は書き込まれている
        assert_eq!(transfer_loop.sink.len(), 1000);
    }

    #[test]
    fn test_transfer_surfaces_write_error() {
        let sink = FailingSink {
            written: Vec::new(),
            capacity: 10,
        };
        let mut transfer_loop =
            TransferLoop::new(sink, ProgressRenderer::new(Vec::new(), 40));

        let result =
            transfer_loop.transfer("big", Cursor::new(vec![0u8; 100_000]), 100_000);

        assert!(result.is_err());
    }

    #[test]
    fn test_failed_file_does_not_block_the_next() -> crate::error::Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.txt");
        fs::write(&good, b"data")?;
        let missing = temp_dir.path().join("missing.txt");

        let mut transfer_loop = test_loop();
        let mut failed = false;
        for path in [&missing, &good] {
            let result = source::open_path(path).and_then(|(file, size)| {
                transfer_loop.transfer(&path.to_string_lossy(), file, size)
            });
            if result.is_err() {
                failed = true;
            }
        }

        // 1 つ目の失敗を報告しつつ 2 つ目は完走する
        assert!(failed);
        assert_eq!(transfer_loop.sink, b"data");
        Ok(())
    }

    #[test]
    fn test_state_starts_at_zero_per_file() {
        let state = TransferState::new("a", 100);
        assert_eq!(state.bytes_copied(), 0);

        let mut state = TransferState::new("b", 100);
        state.advance(60);
        state.advance(40);
        assert_eq!(state.bytes_copied(), 100);
    }
}
