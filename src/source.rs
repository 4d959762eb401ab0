use std::fs::File;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Result, VcatError};

/// 標準入力を表す引数。ファイル名 "-" を開きたいときは "./-" を使う
const STDIN_ARG: &str = "-";
/// 模擬転送モードを起動する特別なパス
const DEMO_PATH: &str = "/.xyzzy";
/// 標準入力の表示名
pub const STDIN_NAME: &str = "<stdin>";

/// コマンドライン引数 1 つ分の転送元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// 標準入力（"-"）
    Stdin,
    /// 模擬転送モード
    Demo,
    /// 通常のファイルパス
    Path(PathBuf),
}

impl Source {
    pub fn classify(arg: &str) -> Self {
        match arg {
            STDIN_ARG => Source::Stdin,
            DEMO_PATH => Source::Demo,
            _ => Source::Path(PathBuf::from(arg)),
        }
    }
}

/// ファイルを開き、(ハンドル, 総サイズ) を返す。サイズ 0 は「不明」を意味する
pub fn open_path(path: &Path) -> Result<(File, u64)> {
    let metadata = std::fs::metadata(path).map_err(|e| VcatError::OpenFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    if metadata.is_dir() {
        return Err(VcatError::IsDirectory(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|e| VcatError::OpenFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!("opened {} ({} bytes)", path.display(), metadata.len());
    Ok((file, metadata.len()))
}

/// 標準入力を複製して開く。リダイレクトされた通常ファイルであれば
/// 実サイズが取れる。FIFO やソケットではサイズ不明（0）になり、
/// バーは縮退表示になる
pub fn open_stdin() -> Result<(File, u64)> {
    let file = duplicate_stdin()?;
    let size = match file.metadata() {
        Ok(m) if m.is_file() => m.len(),
        _ => 0,
    };
    debug!("opened {} ({} bytes)", STDIN_NAME, size);
    Ok((file, size))
}

#[cfg(unix)]
fn duplicate_stdin() -> Result<File> {
    use std::os::fd::AsFd;

    let fd = std::io::stdin().as_fd().try_clone_to_owned()?;
    Ok(File::from(fd))
}

#[cfg(windows)]
fn duplicate_stdin() -> Result<File> {
    use std::os::windows::io::AsHandle;

    let handle = std::io::stdin().as_handle().try_clone_to_owned()?;
    Ok(File::from(handle))
}
