//! Per-pixel raster math over the area of interest.
//!
//! A [`Raster`] holds `f32` measurements with `NaN` as no-data. A [`Mask`]
//! holds a tri-state per pixel: `Some(true)` change, `Some(false)` measured
//! without change, `None` no-data. Every operation returns a fresh value;
//! nothing aliases its inputs.

use crate::error::{Result, WatchError};
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Raster
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    values: Array2<f32>,
}

impl Raster {
    pub fn new(values: Array2<f32>) -> Self {
        Self { values }
    }

    /// Build from row-major values.
    pub fn from_shape_vec(height: usize, width: usize, values: Vec<f32>) -> Result<Self> {
        let values = Array2::from_shape_vec((height, width), values)
            .map_err(|e| WatchError::DetectionCompute(format!("bad raster shape: {e}")))?;
        Ok(Self { values })
    }

    pub fn filled(height: usize, width: usize, value: f32) -> Self {
        Self {
            values: Array2::from_elem((height, width), value),
        }
    }

    /// `(height, width)`
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.values.get((row, col)).copied()
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        if let Some(v) = self.values.get_mut((row, col)) {
            *v = value;
        }
    }

    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// Smallest and largest valid value, `None` when everything is no-data.
    pub fn valid_range(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// `self - other`, pixel by pixel. No-data on either side stays no-data.
    pub fn subtract(&self, other: &Raster) -> Result<Raster> {
        ensure_same_shape(self.shape(), other.shape())?;
        let values = Zip::from(&self.values)
            .and(&other.values)
            .map_collect(|&a, &b| a - b);
        Ok(Raster { values })
    }

    /// `(a - b) / (a + b)`. A zero denominator yields no-data.
    pub fn normalized_difference(a: &Raster, b: &Raster) -> Result<Raster> {
        ensure_same_shape(a.shape(), b.shape())?;
        let values = Zip::from(&a.values).and(&b.values).map_collect(|&a, &b| {
            let sum = a + b;
            if sum == 0.0 {
                f32::NAN
            } else {
                (a - b) / sum
            }
        });
        Ok(Raster { values })
    }

    pub fn greater_than(&self, threshold: f32) -> Mask {
        self.compare(|v| v > threshold)
    }

    pub fn less_than(&self, threshold: f32) -> Mask {
        self.compare(|v| v < threshold)
    }

    fn compare(&self, pred: impl Fn(f32) -> bool) -> Mask {
        Mask {
            cells: self
                .values
                .map(|&v| if v.is_nan() { None } else { Some(pred(v)) }),
        }
    }

    /// Per-pixel median over a stack of equally shaped rasters, skipping
    /// no-data. A pixel with no valid sample in any layer is no-data.
    /// Returns `None` for an empty stack.
    pub fn median(layers: &[Raster]) -> Result<Option<Raster>> {
        let Some(first) = layers.first() else {
            return Ok(None);
        };
        for layer in &layers[1..] {
            ensure_same_shape(first.shape(), layer.shape())?;
        }
        let mut samples: Vec<f32> = Vec::with_capacity(layers.len());
        let values = Array2::from_shape_fn(first.shape(), |idx| {
            samples.clear();
            samples.extend(
                layers
                    .iter()
                    .map(|l| l.values[idx])
                    .filter(|v| !v.is_nan()),
            );
            median_of(&mut samples)
        });
        Ok(Some(Raster { values }))
    }
}

fn median_of(samples: &mut [f32]) -> f32 {
    if samples.is_empty() {
        return f32::NAN;
    }
    samples.sort_by(|a, b| a.total_cmp(b));
    let mid = samples.len() / 2;
    if samples.len() % 2 == 1 {
        samples[mid]
    } else {
        (samples[mid - 1] + samples[mid]) / 2.0
    }
}

fn ensure_same_shape(a: (usize, usize), b: (usize, usize)) -> Result<()> {
    if a != b {
        return Err(WatchError::DetectionCompute(format!(
            "raster grids differ: {}x{} vs {}x{}",
            a.0, a.1, b.0, b.1
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Mask
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    cells: Array2<Option<bool>>,
}

impl Mask {
    pub fn new(cells: Array2<Option<bool>>) -> Self {
        Self { cells }
    }

    /// A fully measured mask whose true pixels are exactly `positions`.
    pub fn from_positions(height: usize, width: usize, positions: &[(usize, usize)]) -> Self {
        let mut cells = Array2::from_elem((height, width), Some(false));
        for &(r, c) in positions {
            if let Some(cell) = cells.get_mut((r, c)) {
                *cell = Some(true);
            }
        }
        Self { cells }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.cells.dim()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        self.cells.get((row, col)).copied().flatten()
    }

    pub fn cells(&self) -> &Array2<Option<bool>> {
        &self.cells
    }

    pub fn count_true(&self) -> usize {
        self.cells.iter().filter(|c| **c == Some(true)).count()
    }

    pub fn valid_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Row-major `(row, col)` of every true pixel.
    pub fn true_positions(&self) -> Vec<(usize, usize)> {
        self.cells
            .indexed_iter()
            .filter(|(_, c)| **c == Some(true))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Turn every `false` into no-data so only candidate pixels keep support.
    pub fn self_mask(&self) -> Mask {
        Mask {
            cells: self.cells.map(|c| match c {
                Some(true) => Some(true),
                _ => None,
            }),
        }
    }

    /// Logical AND. A pixel is true only when both inputs are true there;
    /// it is no-data when either side lacks data and neither side is a
    /// measured `false`.
    pub fn and(&self, other: &Mask) -> Result<Mask> {
        ensure_same_shape(self.shape(), other.shape())?;
        let cells = Zip::from(&self.cells)
            .and(&other.cells)
            .map_collect(|&a, &b| match (a, b) {
                (Some(true), Some(true)) => Some(true),
                (Some(false), _) | (_, Some(false)) => Some(false),
                _ => None,
            });
        Ok(Mask { cells })
    }

    /// Majority filter over a circular neighbourhood of `radius_px` pixels.
    ///
    /// Neighbour offsets satisfy `dx² + dy² <= radius²`. No-data neighbours
    /// do not vote, a no-data centre stays no-data, and a tie resolves to
    /// `false`.
    pub fn focal_mode(&self, radius_px: f64) -> Mask {
        let offsets = circle_offsets(radius_px);
        let (h, w) = self.shape();
        let cells = Array2::from_shape_fn((h, w), |(r, c)| {
            self.cells[(r, c)]?;
            let (mut yes, mut no) = (0usize, 0usize);
            for &(dr, dc) in &offsets {
                let rr = r as isize + dr;
                let cc = c as isize + dc;
                if rr < 0 || cc < 0 || rr >= h as isize || cc >= w as isize {
                    continue;
                }
                match self.cells[(rr as usize, cc as usize)] {
                    Some(true) => yes += 1,
                    Some(false) => no += 1,
                    None => {}
                }
            }
            Some(yes > no)
        });
        Mask { cells }
    }
}

fn circle_offsets(radius_px: f64) -> Vec<(isize, isize)> {
    let radius = radius_px.max(0.0);
    let reach = radius.floor() as isize;
    let r2 = radius * radius;
    let mut offsets = Vec::new();
    for dr in -reach..=reach {
        for dc in -reach..=reach {
            if ((dr * dr + dc * dc) as f64) <= r2 {
                offsets.push((dr, dc));
            }
        }
    }
    offsets
}

// ---------------------------------------------------------------------------
// On-disk band encoding
// ---------------------------------------------------------------------------

/// JSON band layout shared by the local archive and the asset store:
/// row-major values with `null` for no-data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandFile {
    pub width: usize,
    pub height: usize,
    pub values: Vec<Option<f32>>,
}

impl BandFile {
    pub fn from_raster(raster: &Raster) -> Self {
        let (height, width) = raster.shape();
        Self {
            width,
            height,
            values: raster
                .values
                .iter()
                .map(|&v| if v.is_nan() { None } else { Some(v) })
                .collect(),
        }
    }

    pub fn from_mask(mask: &Mask) -> Self {
        let (height, width) = mask.shape();
        Self {
            width,
            height,
            values: mask
                .cells
                .iter()
                .map(|c| c.map(|b| if b { 1.0 } else { 0.0 }))
                .collect(),
        }
    }

    pub fn into_raster(self) -> Result<Raster> {
        let values = self
            .values
            .into_iter()
            .map(|v| v.unwrap_or(f32::NAN))
            .collect();
        Raster::from_shape_vec(self.height, self.width, values)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
