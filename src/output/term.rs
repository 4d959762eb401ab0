use crossterm::terminal;

/// 描画対象とするターミナル幅の上限
pub const MAX_WIDTH: u16 = 9999;

/// カーソル位置から画面末尾までを消去
pub const CLEAR_TO_END: &str = "\x1b[0J";
/// 転送済み領域の開始色（明るい白前景 + 緑背景）
pub const COLOR_DONE: &str = "\x1b[1;37;42m";
/// 残り領域への切り替え（背景を青へ）
pub const COLOR_REMAINING: &str = "\x1b[44m";
/// 色指定のリセット
pub const COLOR_RESET: &str = "\x1b[0m";

/// 幅が描画可能な範囲 [1, MAX_WIDTH] に収まっているか
pub fn is_valid_width(width: u16) -> bool {
    (1..=MAX_WIDTH).contains(&width)
}

/// 現在のターミナル幅を取得する。取得できない場合や範囲外の場合は None
pub fn query_width() -> Option<u16> {
    match terminal::size() {
        Ok((columns, _rows)) if is_valid_width(columns) => Some(columns),
        _ => None,
    }
}

/// 直前に描画したフレームのターミナル幅。
/// ウィンドウのリサイズ検出に使う
#[derive(Debug, Clone, Copy)]
pub struct TerminalFrame {
    width: u16,
}

impl TerminalFrame {
    pub fn new(initial_width: u16) -> Self {
        Self {
            width: initial_width,
        }
    }

    /// 新しい幅を取り込む。直前のフレームから変化していれば true
    pub fn advance(&mut self, width: u16) -> bool {
        let changed = self.width != width;
        self.width = width;
        changed
    }
}
