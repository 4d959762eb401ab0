mod cli;
mod error;
mod output;
mod source;
mod transfer;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use crossterm::tty::IsTty;

use cli::Cli;
use error::{Result, VcatError};
use output::{term, ProgressRenderer};
use source::Source;
use transfer::TransferLoop;

fn main() -> ExitCode {
    // ロガーの初期化
    env_logger::init();

    // コマンドライン引数のパース
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// 起動時の前提条件を確認してから引数を順番に処理する。
/// 戻り値はすべてのファイルが成功したかどうか
fn run(cli: Cli) -> Result<bool> {
    // 出力はリダイレクト先、診断ストリームはターミナルでなければならない
    if io::stdout().is_tty() {
        return Err(VcatError::StdoutIsTty);
    }
    if !io::stderr().is_tty() {
        return Err(VcatError::StderrNotTty);
    }
    let width = initial_width()?;

    let renderer = ProgressRenderer::new(io::stderr(), width);
    let mut transfer_loop = TransferLoop::new(io::stdout().lock(), renderer);

    let mut failed = false;
    for arg in &cli.files {
        let result = match Source::classify(arg) {
            Source::Demo => transfer_loop.run_demo(),
            Source::Stdin => source::open_stdin()
                .and_then(|(file, size)| transfer_loop.transfer(source::STDIN_NAME, file, size)),
            Source::Path(path) => source::open_path(&path)
                .and_then(|(file, size)| transfer_loop.transfer(arg, file, size)),
        };
        if let Err(e) = result {
            report_failure(arg, &e);
            failed = true;
        }
    }

    Ok(!failed)
}

/// 起動時のターミナル幅を検証付きで取得する
fn initial_width() -> Result<u16> {
    let (width, _rows) = crossterm::terminal::size()?;
    if !term::is_valid_width(width) {
        return Err(VcatError::InvalidWidth {
            width,
            max: term::MAX_WIDTH,
        });
    }
    Ok(width)
}

/// ファイル単位の失敗を 1 行で報告する
fn report_failure(arg: &str, error: &VcatError) {
    match error {
        // パス入りのメッセージはそのまま出す
        VcatError::OpenFailed { .. } | VcatError::IsDirectory(_) => eprintln!("{}", error),
        _ => eprintln!("{}: {}", arg, error),
    }
}
