use std::io::{self, Write};

use crate::output::term::{self, TerminalFrame};

/// 残り時間がこの秒数以上なら 99:99 を表示する
const ETA_CEILING_SECS: u64 = 6000;

/// プログレスバーの描画器。診断ストリーム（通常は stderr）の同じ行に
/// ステータスを上書き描画し続け、転送の最後に改行で確定させる
pub struct ProgressRenderer<W: Write> {
    out: W,
    frame: TerminalFrame,
}

impl<W: Write> ProgressRenderer<W> {
    pub fn new(out: W, initial_width: u16) -> Self {
        Self {
            out,
            frame: TerminalFrame::new(initial_width),
        }
    }

    /// 現在の転送位置でステータス行を描画する。
    /// ターミナル幅が取得できない・範囲外の場合は何もせず、
    /// 直前のフレームを画面に残す
    pub fn update(
        &mut self,
        filename: &str,
        bytes_copied: u64,
        total_size: u64,
        elapsed_secs: u64,
    ) -> io::Result<()> {
        match term::query_width() {
            Some(width) => self.render_at(width, filename, bytes_copied, total_size, elapsed_secs),
            None => Ok(()),
        }
    }

    /// 転送終了。最後のフレームを改行で確定させる
    pub fn finish(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.out.flush()
    }

    fn render_at(
        &mut self,
        width: u16,
        filename: &str,
        bytes_copied: u64,
        total_size: u64,
        elapsed_secs: u64,
    ) -> io::Result<()> {
        // 幅が変わった場合、縮小で行末に残った文字を消してから描き直す
        if self.frame.advance(width) {
            self.out.write_all(term::CLEAR_TO_END.as_bytes())?;
        }
        let line = compose(filename, bytes_copied, total_size, elapsed_secs, width);
        self.out.write_all(line.as_bytes())?;
        self.out.flush()
    }
}

/// 1 フレーム分のステータス行を組み立てる。
/// 戻り値はエスケープシーケンスを含み、行頭復帰 + 色リセットで終わる
fn compose(
    filename: &str,
    bytes_copied: u64,
    total_size: u64,
    elapsed_secs: u64,
    width: u16,
) -> String {
    let width = width as usize;
    let percentage = percentage(bytes_copied, total_size);
    let (minutes, seconds) = eta(bytes_copied, total_size, elapsed_secs);
    let trailer = trailer(minutes, seconds, percentage);

    // " /path/to/filename     [ETA 00:00]   0%" の形にセルを埋める。
    // トレーラを先に測り、残り（先頭の余白 1 桁 + 区切り 1 桁を引いた分）を
    // ファイル名に割り当てる
    let mut cells: Vec<char> = vec![' '; width];
    let trailer_len = trailer.chars().count().min(width);
    let filename_len = width as isize - trailer_len as isize - 2;
    if filename_len > 0 {
        let fitted = fit_filename(filename, filename_len as usize + 1);
        for (i, ch) in fitted.chars().enumerate() {
            cells[1 + i] = ch;
        }
    }
    for (i, ch) in trailer.chars().take(trailer_len).enumerate() {
        cells[width - trailer_len + i] = ch;
    }

    let crossover = crossover(bytes_copied, total_size, width);
    let mut line = String::with_capacity(width + 32);
    line.push_str(term::COLOR_DONE);
    for (i, ch) in cells.iter().enumerate() {
        if i == crossover {
            line.push_str(term::COLOR_REMAINING);
        }
        line.push(*ch);
    }
    // 改行せず行頭へ戻り、次のフレームで同じ行を上書きする
    line.push('\r');
    line.push_str(term::COLOR_RESET);
    line
}

/// 進捗率（%）。サイズ不明（0）のときと転送完了後は 100
fn percentage(bytes_copied: u64, total_size: u64) -> u64 {
    if total_size > 0 && bytes_copied < total_size {
        100 * bytes_copied / total_size
    } else {
        100
    }
}

/// 残り時間の見積もり（分, 秒）。(99, 99) は「算出不能」。
/// 転送開始からの平均スループットで線形外挿する
fn eta(bytes_copied: u64, total_size: u64, elapsed_secs: u64) -> (u64, u64) {
    if bytes_copied >= total_size {
        return (0, 0);
    }
    if bytes_copied == 0 {
        return (99, 99);
    }
    let remaining = elapsed_secs * (total_size - bytes_copied) / bytes_copied + 1;
    if remaining < ETA_CEILING_SECS {
        (remaining / 60, remaining % 60)
    } else {
        (99, 99)
    }
}

/// 背景色が「転送済み」から「残り」へ切り替わる桁位置。
/// サイズ不明のときは width（＝切り替えなし）
fn crossover(bytes_copied: u64, total_size: u64, width: usize) -> usize {
    if total_size > 0 {
        (width as u64 * bytes_copied / total_size) as usize
    } else {
        width
    }
}

/// ステータス行の右端に置くトレーラ
fn trailer(minutes: u64, seconds: u64, percentage: u64) -> String {
    format!("[ETA {:>2}:{:02}] {:>3}%", minutes, seconds, percentage)
}

/// ファイル名をフィールドに収める。収まらない間は先頭のパス要素を
/// 区切り文字ごと取り除き、それでも収まらなければ末尾を切り詰める。
/// 戻り値の文字数は常に max 未満
fn fit_filename(name: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let mut rest = name;
    while rest.chars().count() >= max {
        match rest.find('/') {
            Some(i) => rest = &rest[i + 1..],
            None => break,
        }
    }
    if rest.chars().count() >= max {
        rest.chars().take(max - 1).collect()
    } else {
        rest.to_string()
    }
}
