//! Progress reported by FFmpeg on its `-progress` channel.

use serde::Serialize;

/// Snapshot of an FFmpeg run, emitted once per `progress=` block.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FfmpegProgress {
    pub frame: u64,
    /// Output position in milliseconds
    pub out_time_ms: i64,
    /// Output position as FFmpeg printed it (HH:MM:SS.micro)
    pub out_time: String,
    /// Multiple of realtime; 0 when FFmpeg reports N/A
    pub speed: f64,
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Output position in seconds.
    pub fn out_time_secs(&self) -> f64 {
        self.out_time_ms as f64 / 1000.0
    }

    /// Completed share of `total_secs`, clamped to 0..=100.
    pub fn percentage(&self, total_secs: f64) -> f64 {
        if total_secs <= 0.0 {
            return 0.0;
        }
        (self.out_time_secs() / total_secs * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_clamps() {
        let progress = FfmpegProgress {
            out_time_ms: 5000,
            ..Default::default()
        };

        assert!((progress.percentage(10.0) - 50.0).abs() < 0.01);
        assert!((progress.percentage(2.0) - 100.0).abs() < 0.01);
        assert_eq!(progress.percentage(0.0), 0.0);
    }
}
