//! Diagnostic counters.
//!
//! Nothing here affects the simulation. Counters exist so silent
//! degradation (dropped spawns, culled particles, clipped batches) can be
//! observed from the outside.

/// What happened during the most recent frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Particles alive after the frame.
    pub live: u32,
    /// Particles inserted this frame.
    pub spawned: u32,
    /// Spawn requests dropped because the pool was full.
    pub dropped: u32,
    /// Particles removed because their life ran out.
    pub expired: u32,
    /// Particles removed early because their alpha fell below the cull level.
    pub culled: u32,
    /// Particles removed because they left the margin-expanded frame.
    pub escaped: u32,
    /// Render instances emitted in the grouped view.
    pub batched: u32,
    /// Visible particles left out of the view by batch limits.
    pub omitted: u32,
}

impl FrameStats {
    /// Total removals this frame.
    #[must_use]
    pub const fn removed(&self) -> u32 {
        self.expired + self.culled + self.escaped
    }
}

/// Running totals since the engine was created or last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Frames simulated (degenerate frames are not counted).
    pub frames: u64,
    /// Frames skipped because the frame had no area.
    pub skipped_frames: u64,
    /// Particles spawned.
    pub spawned: u64,
    /// Spawn requests dropped on a full pool.
    pub dropped: u64,
    /// Particles removed for any reason.
    pub removed: u64,
    /// Highest live count observed.
    pub peak_live: u32,
}

impl EngineStats {
    /// Folds one frame into the totals.
    pub fn accumulate(&mut self, frame: &FrameStats) {
        self.frames += 1;
        self.spawned += u64::from(frame.spawned);
        self.dropped += u64::from(frame.dropped);
        self.removed += u64::from(frame.removed());
        self.peak_live = self.peak_live.max(frame.live);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate() {
        let mut totals = EngineStats::default();
        totals.accumulate(&FrameStats {
            live: 4,
            spawned: 3,
            dropped: 1,
            expired: 1,
            culled: 1,
            escaped: 1,
            ..Default::default()
        });
        totals.accumulate(&FrameStats {
            live: 2,
            spawned: 1,
            ..Default::default()
        });

        assert_eq!(totals.frames, 2);
        assert_eq!(totals.spawned, 4);
        assert_eq!(totals.dropped, 1);
        assert_eq!(totals.removed, 3);
        assert_eq!(totals.peak_live, 4);
    }
}
