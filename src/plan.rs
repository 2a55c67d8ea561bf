//! Chunk planning: turn a total duration into split boundaries.
//!
//! Pure arithmetic, no I/O. The extractor materializes the plan; the
//! planner only decides where the cuts go.

/// One planned segment, `[start, end)` in seconds.
///
/// `index` is 0-based and assigned in temporal order. Chunk file names use
/// `index + 1` so the first file on disk reads `_part001`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub index: usize,
    pub start: f64,
    pub end: f64,
}

impl Interval {
    /// Segment length in seconds.
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Ordered, contiguous split boundaries for one recording.
///
/// Invariants: intervals are contiguous (`plan[i].end == plan[i+1].start`),
/// start at 0, and cover the recording except a possibly dropped short tail.
/// An empty plan means the recording is below the minimum length and must be
/// short-circuited by the caller, not treated as an empty transcript.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChunkPlan {
    intervals: Vec<Interval>,
}

impl ChunkPlan {
    pub fn new(intervals: Vec<Interval>) -> Self {
        Self { intervals }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }
}

/// Compute split boundaries for a recording of `total_duration` seconds.
///
/// Policy:
/// - below `min_length`: empty plan (caller short-circuits)
/// - below `chunk_length`: a single interval spanning the whole file
/// - otherwise: `chunk_length`-sized intervals, last one truncated to the
///   total duration and dropped entirely if shorter than `min_length`
pub fn plan(total_duration: f64, chunk_length: f64, min_length: f64) -> ChunkPlan {
    if total_duration < min_length {
        return ChunkPlan::default();
    }

    if total_duration < chunk_length {
        return ChunkPlan::new(vec![Interval {
            index: 0,
            start: 0.0,
            end: total_duration,
        }]);
    }

    let candidates = (total_duration / chunk_length).ceil() as usize;
    let mut intervals = Vec::with_capacity(candidates);
    for index in 0..candidates {
        let start = index as f64 * chunk_length;
        let end = (start + chunk_length).min(total_duration);
        intervals.push(Interval { index, start, end });
    }

    // Never leave a sub-min_length trailing fragment
    if let Some(last) = intervals.last()
        && last.length() < min_length
    {
        intervals.pop();
    }

    ChunkPlan::new(intervals)
}
