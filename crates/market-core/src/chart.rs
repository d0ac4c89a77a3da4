//! Rolling per-symbol price history.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Maximum number of points kept per symbol.
pub const CHART_CAPACITY: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Milliseconds since the Unix epoch.
    pub time: i64,
    pub price: f64,
}

/// Bounded, time-ordered sequence of [`ChartPoint`]s.
///
/// Invariants: `len() <= CHART_CAPACITY` and times are strictly increasing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ChartPoint>", into = "Vec<ChartPoint>")]
pub struct ChartHistory {
    points: VecDeque<ChartPoint>,
}

impl ChartHistory {
    pub fn new() -> Self {
        ChartHistory {
            points: VecDeque::with_capacity(CHART_CAPACITY),
        }
    }

    /// Build a history from existing points. Points that would break time
    /// ordering are dropped and only the newest `CHART_CAPACITY` are kept.
    pub fn from_points(points: impl IntoIterator<Item = ChartPoint>) -> Self {
        let mut history = ChartHistory::new();
        for point in points {
            if history.last().map_or(true, |last| point.time > last.time) {
                history.points.push_back(point);
                if history.points.len() > CHART_CAPACITY {
                    history.points.pop_front();
                }
            }
        }
        history
    }

    /// Append a point stamped `time`, evicting the oldest point once full.
    ///
    /// If `time` is not after the current last point (clock did not move or
    /// stepped back), the point is stamped one millisecond after it instead.
    /// Returns the point actually stored.
    pub fn push(&mut self, time: i64, price: f64) -> ChartPoint {
        let time = match self.last() {
            Some(last) if time <= last.time => last.time + 1,
            _ => time,
        };
        let point = ChartPoint { time, price };

        if self.points.len() == CHART_CAPACITY {
            self.points.pop_front();
        }
        self.points.push_back(point);
        point
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&ChartPoint> {
        self.points.front()
    }

    pub fn last(&self) -> Option<&ChartPoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChartPoint> {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<ChartPoint> {
        self.points.iter().copied().collect()
    }
}

impl From<Vec<ChartPoint>> for ChartHistory {
    fn from(points: Vec<ChartPoint>) -> Self {
        ChartHistory::from_points(points)
    }
}

impl From<ChartHistory> for Vec<ChartPoint> {
    fn from(history: ChartHistory) -> Self {
        history.points.into()
    }
}
