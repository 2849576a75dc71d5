//! デバウンス書き込みスケジューラ
//!
//! 編集のたびに「保留中の書き込み」を論理タイムスタンプ付きで登録し、
//! 一定時間新しい編集が来なければフラッシュを指示する。
//! キャンセル＆再スケジュール方式（デバウンス窓内はlast-writer-wins）。
//!
//! タイマー自体は持たない純粋な状態機械。WASM側はgloo_timersで、
//! テストとCLIは手動でクロックを進めて駆動する。

/// デフォルトのデバウンス遅延（ミリ秒）
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// デバウンス状態機械
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay_ms: u64,
    /// 保留中の編集の期限（編集時刻 + delay）
    deadline_ms: Option<u64>,
    /// 編集ごとに増える論理シーケンス番号
    seq: u64,
    /// フラッシュ済みシーケンス番号
    flushed_seq: u64,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            deadline_ms: None,
            seq: 0,
            flushed_seq: 0,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// 編集を記録する。既存の保留はキャンセルされ期限が引き直される
    pub fn record_edit(&mut self, now_ms: u64) -> u64 {
        self.seq += 1;
        self.deadline_ms = Some(now_ms + self.delay_ms);
        self.seq
    }

    /// 期限到達ならフラッシュすべきシーケンス番号を返す
    ///
    /// 返り値のseqに対応する「最新状態」を書き込むのは呼び出し側の責務。
    pub fn poll(&mut self, now_ms: u64) -> Option<u64> {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                self.flushed_seq = self.seq;
                Some(self.seq)
            }
            _ => None,
        }
    }

    /// 保留中の書き込みがあるか
    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// 保留を即時フラッシュ扱いにする（編集モード終了・終了処理用）
    pub fn flush_now(&mut self) -> Option<u64> {
        if self.deadline_ms.take().is_some() {
            self.flushed_seq = self.seq;
            Some(self.seq)
        } else {
            None
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_edit_no_flush() {
        let mut d = Debouncer::new(500);
        assert_eq!(d.poll(10_000), None);
        assert!(!d.is_pending());
    }

    #[test]
    fn test_single_edit_flushes_after_delay() {
        let mut d = Debouncer::new(500);
        d.record_edit(1000);
        assert_eq!(d.poll(1400), None);
        assert_eq!(d.poll(1500), Some(1));
        // 二重フラッシュしない
        assert_eq!(d.poll(1600), None);
    }

    #[test]
    fn test_rapid_edits_coalesce_into_one_flush() {
        let mut d = Debouncer::new(500);
        d.record_edit(1000);
        d.record_edit(1100);
        d.record_edit(1200);

        // 最初の編集から500ms経っても、最後の編集からは経っていない
        assert_eq!(d.poll(1500), None);

        // 最後の編集の期限でちょうど1回フラッシュ、seqは最終編集のもの
        assert_eq!(d.poll(1700), Some(3));
        assert_eq!(d.poll(2500), None);
    }

    #[test]
    fn test_edit_after_flush_schedules_again() {
        let mut d = Debouncer::new(500);
        d.record_edit(1000);
        assert_eq!(d.poll(1500), Some(1));
        d.record_edit(2000);
        assert_eq!(d.poll(2500), Some(2));
    }

    #[test]
    fn test_flush_now() {
        let mut d = Debouncer::new(500);
        assert_eq!(d.flush_now(), None);
        d.record_edit(1000);
        assert_eq!(d.flush_now(), Some(1));
        assert!(!d.is_pending());
        assert_eq!(d.poll(1500), None);
    }
}
