//! Polyline of geographical points.

use crate::error::{GeometryError, Result};
use crate::geometry::Point;
use crate::utils;

/// A broken line on the Earth surface, possibly at depth.
///
/// Adjacent duplicate points are removed at construction and the 2D
/// projection of the sequence must not cross itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    points: Vec<Point>,
}

/// Removes adjacent duplicates, keeping the first occurrence.
pub fn clean_points(points: &[Point]) -> Vec<Point> {
    let mut result: Vec<Point> = Vec::with_capacity(points.len());
    for point in points {
        if result.last() != Some(point) {
            result.push(*point);
        }
    }
    result
}

impl Line {
    pub fn new(points: Vec<Point>) -> Result<Self> {
        let points = clean_points(&points);
        if points.is_empty() {
            return Err(GeometryError::EmptyLine);
        }
        let lons: Vec<f64> = points.iter().map(|p| p.longitude).collect();
        let lats: Vec<f64> = points.iter().map(|p| p.latitude).collect();
        if utils::line_intersects_itself(&lons, &lats, false)? {
            return Err(GeometryError::SelfIntersectingLine);
        }
        Ok(Line { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total length along the segments, in km, depth differences included.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance(&pair[1]))
            .sum()
    }

    /// Overall orientation of the line: the circular mean of the segment
    /// azimuths weighted by segment length, in [0, 360) degrees.
    pub fn average_azimuth(&self) -> Result<f64> {
        if self.points.len() < 2 {
            return Err(GeometryError::ShortLine);
        }
        if self.points.len() == 2 {
            return Ok(self.points[0].azimuth(&self.points[1]));
        }
        let mut azimuths = Vec::with_capacity(self.points.len() - 1);
        let mut lengths = Vec::with_capacity(self.points.len() - 1);
        for pair in self.points.windows(2) {
            azimuths.push(pair[0].azimuth(&pair[1]));
            lengths.push(pair[0].horizontal_distance(&pair[1]));
        }
        Ok(utils::azimuths_weighted_mean(&azimuths, &lengths))
    }

    /// Resamples the line into points spaced by `section_length` km along
    /// its path, original first point kept.
    ///
    /// Spacing is measured along the resampled path, not the original one:
    /// each original segment is walked starting from the last resampled
    /// point, so original vertices do not survive except the first one.
    pub fn resample(&self, section_length: f64) -> Line {
        if self.points.len() < 2 {
            return self.clone();
        }
        let mut resampled = vec![self.points[0]];
        for point in &self.points[1..] {
            let last = *resampled.last().unwrap();
            let section = last.equally_spaced_points(point, section_length);
            resampled.extend_from_slice(&section[1..]);
        }
        Line { points: resampled }
    }

    /// Resamples the line to exactly `num_points` points spaced uniformly
    /// in arc length along the original path, endpoints preserved.
    pub fn resample_to_num_points(&self, num_points: usize) -> Result<Line> {
        if self.points.len() < 2 {
            return Err(GeometryError::ShortLine);
        }
        debug_assert!(num_points >= 2);
        let section_length = self.length() / (num_points - 1) as f64;
        let mut resampled = vec![self.points[0]];
        let mut segment = 0usize;
        let mut accumulated = 0.0;
        let mut last_segment_length = 0.0;
        for i in 0..num_points - 1 {
            let target = (i + 1) as f64 * section_length;
            while target > accumulated && segment < self.points.len() - 1 {
                last_segment_length = self.points[segment].distance(&self.points[segment + 1]);
                accumulated += last_segment_length;
                segment += 1;
            }
            let p1 = self.points[segment - 1];
            let p2 = self.points[segment];
            let offset = target - (accumulated - last_segment_length);
            let next_point = if offset < 1e-5 {
                p1
            } else {
                p1.equally_spaced_points(&p2, offset)[1]
            };
            resampled.push(next_point);
        }
        Ok(Line { points: resampled })
    }
}
