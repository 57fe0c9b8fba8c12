//! Luminance-ordered flood traversal, the "sort" effect.
//!
//! Starting from one coordinate, the traversal repeatedly expands the darkest
//! pixel it has discovered but not yet visited, moving through 4-connected
//! neighbours. Each pixel is stamped, in visiting order, with a colour from a
//! linear ramp across the 24-bit colour cube, so the output image is a map of
//! *when* each pixel was reached.
//!
//! Pixels are marked visited when they are discovered, not when they are
//! popped, so nothing enters the frontier twice.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bitvec::{bitvec, vec::BitVec};

use crate::error::PixmoshError;
use crate::types::{PixelBuffer, Rgba8, CHANNEL_MAX};

/// The largest 24-bit colour; the ramp spans `0..=COLOUR_CUBE_MAX`.
const COLOUR_CUBE_MAX: u32 = 0x00FF_FFFF;

//==================================================================================
// 1. Frontier
//==================================================================================

/// A discovered pixel waiting in the frontier.
///
/// Ordering is inverted for `BinaryHeap`: the lowest luminance is the greatest
/// entry, and among equal luminances the earliest discovery wins.
#[derive(Debug, Clone, Copy)]
struct FrontierEntry {
    lum: f64,
    seq: u64,
    x: usize,
    y: usize,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .lum
            .total_cmp(&self.lum)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

/// Transient state of a single traversal.
struct FloodState<'a> {
    image: &'a PixelBuffer,
    visited: BitVec,
    frontier: BinaryHeap<FrontierEntry>,
    next_seq: u64,
}

impl<'a> FloodState<'a> {
    fn new(image: &'a PixelBuffer) -> Self {
        Self {
            image,
            visited: bitvec![0; image.len()],
            frontier: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Marks `(x, y)` visited and queues it if it has not been seen yet.
    fn discover(&mut self, x: usize, y: usize) {
        let idx = self.image.index(x, y);
        if self.visited[idx] {
            return;
        }
        self.visited.set(idx, true);
        self.frontier.push(FrontierEntry {
            lum: self.image.get(x, y).luminance(),
            seq: self.next_seq,
            x,
            y,
        });
        self.next_seq += 1;
    }

    fn discover_neighbours(&mut self, x: usize, y: usize) {
        if x > 0 {
            self.discover(x - 1, y);
        }
        if x + 1 < self.image.width() {
            self.discover(x + 1, y);
        }
        if y > 0 {
            self.discover(x, y - 1);
        }
        if y + 1 < self.image.height() {
            self.discover(x, y + 1);
        }
    }
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Returns every reachable coordinate in visiting order, starting with `start`.
///
/// An empty image yields an empty order.
pub fn traverse(
    image: &PixelBuffer,
    start: (usize, usize),
) -> Result<Vec<(usize, usize)>, PixmoshError> {
    if image.is_empty() {
        return Ok(Vec::new());
    }
    let (sx, sy) = start;
    if sx >= image.width() || sy >= image.height() {
        return Err(PixmoshError::StartOutOfBounds {
            x: sx,
            y: sy,
            width: image.width(),
            height: image.height(),
        });
    }

    let mut state = FloodState::new(image);
    let mut order = Vec::with_capacity(image.len());

    let start_idx = image.index(sx, sy);
    state.visited.set(start_idx, true);
    order.push(start);
    state.discover_neighbours(sx, sy);

    while let Some(entry) = state.frontier.pop() {
        order.push((entry.x, entry.y));
        state.discover_neighbours(entry.x, entry.y);
    }

    log::debug!(
        "sort traverse: visited {} of {} pixels from ({}, {})",
        order.len(),
        image.len(),
        sx,
        sy
    );
    Ok(order)
}

/// The ramp colour of the `index`-th visited pixel out of `total`.
pub fn ramp_colour(index: usize, total: usize) -> Rgba8 {
    let step = f64::from(COLOUR_CUBE_MAX) / total as f64;
    let c = (index as f64 * step).floor() as u32;
    Rgba8::new((c >> 16) as u8, (c >> 8) as u8, c as u8, CHANNEL_MAX)
}

/// Renders the traversal from `start` as a visiting-order colour ramp.
///
/// Pixels the traversal never reaches keep the zeroed background.
pub fn sort_image(image: &PixelBuffer, start: (usize, usize)) -> Result<PixelBuffer, PixmoshError> {
    let order = traverse(image, start)?;
    let total = image.len();
    let mut out = PixelBuffer::new(image.width(), image.height());
    for (i, &(x, y)) in order.iter().enumerate() {
        out.set(x, y, ramp_colour(i, total));
    }
    Ok(out)
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
