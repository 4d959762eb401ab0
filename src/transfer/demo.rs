use std::io::Write;
use std::thread;
use std::time::Duration;

use log::debug;

use super::TransferState;
use crate::error::Result;
use crate::output::ProgressRenderer;

/// デモ転送が模擬するファイルの総サイズ
const DEMO_TOTAL_SIZE: u64 = 5_000_000_000;
/// 1 秒ごとの進行量
const DEMO_STEP: u64 = 456_789_012;
/// デモで表示するファイル名
const DEMO_FILENAME: &str = "/some/example/filename.xyz";

/// ファイルコピーを模擬してバーを動かす。動作確認用
pub fn run<E: Write>(renderer: &mut ProgressRenderer<E>) -> Result<()> {
    debug!("demo transfer start");
    let mut state = TransferState::new(DEMO_FILENAME, DEMO_TOTAL_SIZE);

    renderer.update(DEMO_FILENAME, 0, DEMO_TOTAL_SIZE, 0)?;
    while state.bytes_copied() < DEMO_TOTAL_SIZE {
        thread::sleep(Duration::from_secs(1));
        state.advance(DEMO_STEP);
        renderer.update(
            DEMO_FILENAME,
            state.bytes_copied(),
            DEMO_TOTAL_SIZE,
            state.elapsed_secs(),
        )?;
    }
    renderer.finish()?;
    Ok(())
}
