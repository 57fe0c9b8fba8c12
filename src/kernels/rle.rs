//! This module contains the pure kernels for Run-Length Encoding (RLE) whole
//! pixel buffers, decoding them, and perturbing run lengths with seeded noise.
//!
//! The representation is two parallel sequences: `lengths[i]` repetitions of
//! `colours[i]`. A run closes whenever any of the four channels changes, so
//! freshly encoded runs are maximal and every length is at least 1. Noise may
//! later drive lengths to zero; zero-length runs are kept so that the run list
//! keeps its shape, and they simply decode to nothing.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::PixmoshError;
use crate::types::{PixelBuffer, Rgba8};

//==================================================================================
// 1. Run-Length Buffer
//==================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLengthBuffer {
    width: usize,
    height: usize,
    lengths: Vec<usize>,
    colours: Vec<Rgba8>,
}

impl RunLengthBuffer {
    /// Assembles a run list from its parts.
    ///
    /// # Panics
    /// If `lengths` and `colours` differ in length.
    pub fn from_parts(lengths: Vec<usize>, colours: Vec<Rgba8>, width: usize, height: usize) -> Self {
        assert_eq!(
            lengths.len(),
            colours.len(),
            "run lengths and colours must be parallel sequences"
        );
        Self {
            width,
            height,
            lengths,
            colours,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn colours(&self) -> &[Rgba8] {
        &self.colours
    }

    pub fn run_count(&self) -> usize {
        self.lengths.len()
    }

    /// The number of pixels the runs currently describe.
    pub fn total_length(&self) -> usize {
        self.lengths.iter().sum()
    }

    /// Expands the runs back into a `width x height` buffer.
    ///
    /// If the runs describe more pixels than the image holds the excess is cut
    /// from the end; if they describe fewer, the final colour is repeated. An
    /// empty run list decodes to an empty `0x0` image.
    pub fn decode(&self) -> PixelBuffer {
        let Some(&last) = self.colours.last() else {
            return PixelBuffer::default();
        };
        let target = self.width * self.height;
        let mut out = Vec::with_capacity(target);
        for (&len, &colour) in self.lengths.iter().zip(&self.colours) {
            out.extend(std::iter::repeat(colour).take(len));
            if out.len() >= target {
                break;
            }
        }
        if out.len() != target {
            log::debug!(
                "rle decode: runs cover {} of {} pixels, adjusting",
                out.len(),
                target
            );
        }
        out.resize(target, last);
        PixelBuffer::from_pixels(out, self.width, self.height)
    }

    /// Splits every run that crosses a row boundary so that each row owns its runs.
    ///
    /// Total length is unchanged. A buffer produced by [`encode_rows`] is already
    /// aligned and comes back identical.
    pub fn align_to_rows(&mut self) {
        if self.width == 0 {
            return;
        }
        let w = self.width;
        let mut lengths = Vec::with_capacity(self.lengths.len());
        let mut colours = Vec::with_capacity(self.colours.len());
        let mut pos = 0usize;
        for (&len, &colour) in self.lengths.iter().zip(&self.colours) {
            if len == 0 {
                lengths.push(0);
                colours.push(colour);
                continue;
            }
            let mut remaining = len;
            while remaining > 0 {
                let take = remaining.min(w - pos % w);
                lengths.push(take);
                colours.push(colour);
                pos += take;
                remaining -= take;
            }
        }
        self.lengths = lengths;
        self.colours = colours;
    }

    /// Perturbs every run length by an independent `Normal(0, stddev)` sample.
    ///
    /// Samples are truncated toward zero and negative lengths clamp to zero. The
    /// total is then forced back to `width * height`: the run that first pushes
    /// the running total past it is cut by the excess and all later runs are
    /// zeroed, while a shortfall is added to the last run.
    pub fn add_noise<R: Rng + ?Sized>(&mut self, stddev: f64, rng: &mut R) -> Result<(), PixmoshError> {
        let dist = normal(stddev)?;
        let target = self.width * self.height;
        let mut total = 0usize;
        let mut overflowed = false;

        for len in self.lengths.iter_mut() {
            if overflowed {
                *len = 0;
                continue;
            }
            let mut perturbed = perturb(*len, &dist, rng);
            total = total.saturating_add(perturbed);
            if total > target {
                perturbed -= total - target;
                total = target;
                overflowed = true;
            }
            *len = perturbed;
        }

        if total < target {
            if let Some(last) = self.lengths.last_mut() {
                *last += target - total;
            }
        }
        log::debug!(
            "rle add_noise: stddev={} runs={} total={}",
            stddev,
            self.lengths.len(),
            self.total_length()
        );
        Ok(())
    }

    /// Row-local variant of [`add_noise`](Self::add_noise).
    ///
    /// Runs are first aligned to rows. Each row's run group is found by
    /// accumulating lengths until they reach `width`, before any of that row is
    /// mutated. Within the row every run is perturbed, a run that would push the
    /// row past `width` is zeroed, and whatever is left is added to the row's
    /// last run, so every row again sums to exactly `width`.
    pub fn add_noise_rows<R: Rng + ?Sized>(
        &mut self,
        stddev: f64,
        rng: &mut R,
    ) -> Result<(), PixmoshError> {
        let dist = normal(stddev)?;
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }
        self.align_to_rows();

        let w = self.width;
        let mut start = 0usize;
        for row in 0..self.height {
            // 1. Discover the row's run group from the unmutated lengths.
            let mut end = start;
            let mut row_len = 0usize;
            while row_len < w && end < self.lengths.len() {
                row_len += self.lengths[end];
                end += 1;
            }
            if end == start {
                log::warn!("rle add_noise_rows: runs exhausted at row {}", row);
                break;
            }

            // 2. Perturb, refusing any run that would overflow the row.
            row_len = 0;
            for len in &mut self.lengths[start..end] {
                let perturbed = perturb(*len, &dist, rng);
                if row_len + perturbed > w {
                    *len = 0;
                } else {
                    row_len += perturbed;
                    *len = perturbed;
                }
            }

            // 3. Renormalise; row_len <= w by construction.
            self.lengths[end - 1] += w - row_len;
            start = end;
        }
        Ok(())
    }
}

//==================================================================================
// 2. Private Helpers
//==================================================================================

fn normal(stddev: f64) -> Result<Normal<f64>, PixmoshError> {
    if !stddev.is_finite() || stddev < 0.0 {
        return Err(PixmoshError::InvalidNoise(format!(
            "standard deviation must be finite and non-negative, got {}",
            stddev
        )));
    }
    Normal::new(0.0, stddev).map_err(|e| PixmoshError::InvalidNoise(e.to_string()))
}

fn perturb<R: Rng + ?Sized>(len: usize, dist: &Normal<f64>, rng: &mut R) -> usize {
    // `as i64` saturates, so huge samples stay representable.
    let offset = dist.sample(rng) as i64;
    (len as i64).saturating_add(offset).max(0) as usize
}

fn encode_impl(image: &PixelBuffer, reset_each_row: bool) -> RunLengthBuffer {
    let mut lengths = Vec::new();
    let mut colours = Vec::new();
    let pixels = image.pixels();

    if let Some((&first, rest)) = pixels.split_first() {
        let mut current = first;
        let mut run = 1usize;
        for (offset, &px) in rest.iter().enumerate() {
            let row_start = reset_each_row && (offset + 1) % image.width() == 0;
            if px != current || row_start {
                lengths.push(run);
                colours.push(current);
                current = px;
                run = 1;
            } else {
                run += 1;
            }
        }
        lengths.push(run);
        colours.push(current);
    }

    log::debug!(
        "rle encode: {}x{} -> {} runs",
        image.width(),
        image.height(),
        lengths.len()
    );
    RunLengthBuffer::from_parts(lengths, colours, image.width(), image.height())
}

//==================================================================================
// 3. Public API
//==================================================================================

/// Encodes the flattened pixel sequence in one left-to-right pass.
///
/// Runs may continue across row ends. An empty image encodes to an empty run list.
pub fn encode(image: &PixelBuffer) -> RunLengthBuffer {
    encode_impl(image, false)
}

/// Like [`encode`], but a run is also closed at the start of every row.
pub fn encode_rows(image: &PixelBuffer) -> RunLengthBuffer {
    encode_impl(image, true)
}

pub fn decode(runs: &RunLengthBuffer) -> PixelBuffer {
    runs.decode()
}

//==================================================================================
// 4. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);
    const BLUE: Rgba8 = Rgba8::new(0, 0, 255, 255);

    fn striped(width: usize, height: usize) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| {
            if (x / 3 + y) % 2 == 0 {
                RED
            } else {
                BLUE
            }
        })
    }

    fn assert_rows_closed(runs: &RunLengthBuffer) {
        let w = runs.width();
        let mut pos = 0;
        for &len in runs.lengths() {
            if len > 0 {
                assert!(pos % w + len <= w, "run of {} at {} crosses a row", len, pos);
            }
            pos += len;
        }
        assert_eq!(pos, w * runs.height());
    }

    #[test]
    fn test_uniform_2x2_is_single_run() {
        let image = PixelBuffer::filled(2, 2, RED);
        let runs = encode(&image);
        assert_eq!(runs.lengths(), &[4]);
        assert_eq!(runs.colours(), &[RED]);
        assert_eq!(runs.decode(), image);
    }

    #[test]
    fn test_single_pixel() {
        let px = Rgba8::new(1, 2, 3, 4);
        let runs = encode(&PixelBuffer::filled(1, 1, px));
        assert_eq!(runs.lengths(), &[1]);
        assert_eq!(runs.colours(), &[px]);
    }

    #[test]
    fn test_roundtrip_is_exact_and_runs_are_maximal() {
        let image = striped(10, 7);
        let runs = encode(&image);
        assert_eq!(runs.decode(), image);
        assert_eq!(runs.total_length(), 70);
        assert!(runs.lengths().iter().all(|&l| l >= 1));
        assert!(runs.colours().windows(2).all(|pair| pair[0] != pair[1]));
    }

    #[test]
    fn test_alpha_alone_breaks_a_run() {
        let image = PixelBuffer::from_pixels(
            vec![RED, RED, Rgba8::new(255, 0, 0, 254), RED],
            4,
            1,
        );
        assert_eq!(encode(&image).lengths(), &[2, 1, 1]);
    }

    #[test]
    fn test_encode_rows_resets_at_row_starts() {
        let image = PixelBuffer::filled(3, 2, BLUE);
        let runs = encode_rows(&image);
        assert_eq!(runs.lengths(), &[3, 3]);
        assert_eq!(runs.decode(), image);

        let striped_runs = encode_rows(&striped(7, 5));
        assert_rows_closed(&striped_runs);
        assert_eq!(striped_runs.decode(), striped(7, 5));
    }

    #[test]
    fn test_decode_pads_and_truncates() {
        let short = RunLengthBuffer::from_parts(vec![1, 1], vec![RED, BLUE], 2, 2);
        assert_eq!(short.decode().pixels(), &[RED, BLUE, BLUE, BLUE]);

        let long = RunLengthBuffer::from_parts(vec![3, 5], vec![RED, BLUE], 2, 2);
        assert_eq!(long.decode().pixels(), &[RED, RED, RED, BLUE]);
    }

    #[test]
    fn test_empty_runs_decode_to_empty_image() {
        let runs = RunLengthBuffer::from_parts(vec![], vec![], 4, 4);
        let image = runs.decode();
        assert!(image.is_empty());
        assert_eq!((image.width(), image.height()), (0, 0));
        assert_eq!(encode(&PixelBuffer::new(0, 0)).run_count(), 0);
    }

    #[test]
    fn test_align_to_rows_splits_spanning_runs() {
        let mut runs = encode(&PixelBuffer::filled(3, 2, RED));
        assert_eq!(runs.lengths(), &[6]);
        runs.align_to_rows();
        assert_eq!(runs.lengths(), &[3, 3]);
        assert_eq!(runs.colours(), &[RED, RED]);
    }

    #[test]
    fn test_add_noise_preserves_total() {
        for seed in 0..20u64 {
            for stddev in [0.5, 3.0, 40.0] {
                let mut runs = encode(&striped(16, 9));
                let mut rng = StdRng::seed_from_u64(seed);
                runs.add_noise(stddev, &mut rng).unwrap();
                assert_eq!(runs.total_length(), 16 * 9, "seed {} stddev {}", seed, stddev);
                let decoded = runs.decode();
                assert_eq!((decoded.width(), decoded.height()), (16, 9));
            }
        }
    }

    #[test]
    fn test_add_noise_is_reproducible() {
        let mut a = encode(&striped(12, 12));
        let mut b = a.clone();
        a.add_noise(5.0, &mut StdRng::seed_from_u64(7)).unwrap();
        b.add_noise(5.0, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_stddev_is_identity() {
        let original = encode(&striped(9, 4));
        let mut runs = original.clone();
        runs.add_noise(0.0, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(runs, original);
    }

    #[test]
    fn test_add_noise_cuts_overflowing_run_and_zeroes_the_rest() {
        let colours = vec![RED, BLUE, RED, BLUE];
        let mut runs = RunLengthBuffer::from_parts(vec![2, 3, 4, 1], colours.clone(), 2, 2);
        runs.add_noise(0.0, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(runs.lengths(), &[2, 2, 0, 0]);
        assert_eq!(runs.colours(), colours.as_slice());
        assert_eq!(runs.decode().pixels(), &[RED, RED, BLUE, BLUE]);
    }

    #[test]
    fn test_add_noise_gives_shortfall_to_last_run() {
        let mut runs = RunLengthBuffer::from_parts(vec![1, 1], vec![RED, BLUE], 2, 2);
        runs.add_noise(0.0, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(runs.lengths(), &[1, 3]);
    }

    #[test]
    fn test_huge_stddev_saturates_instead_of_overflowing() {
        let image = striped(8, 4);
        for seed in 0..16u64 {
            let mut runs = encode(&image);
            runs.add_noise(1e20, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(runs.total_length(), 32, "seed {}", seed);

            // Every sample is astronomically large: the first positive one takes
            // the whole image, or the last run absorbs it if none is positive.
            let dist = Normal::new(0.0, 1e20).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let samples: Vec<f64> = (0..runs.run_count()).map(|_| dist.sample(&mut rng)).collect();
            let winner = samples
                .iter()
                .position(|&s| s >= 1e6)
                .unwrap_or(runs.run_count() - 1);
            let mut expected = vec![0; runs.run_count()];
            expected[winner] = 32;
            assert_eq!(runs.lengths(), expected.as_slice(), "seed {}", seed);

            let mut rows = encode(&image);
            rows.add_noise_rows(1e20, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert_rows_closed(&rows);
        }
    }

    #[test]
    fn test_add_noise_rows_preserves_each_row() {
        for seed in 0..20u64 {
            for stddev in [1.0, 4.0, 25.0] {
                let mut runs = encode_rows(&striped(11, 6));
                runs.add_noise_rows(stddev, &mut StdRng::seed_from_u64(seed)).unwrap();
                assert_rows_closed(&runs);
            }
        }
    }

    #[test]
    fn test_add_noise_rows_handles_runs_spanning_rows() {
        let mut runs = encode(&PixelBuffer::filled(2, 2, RED));
        runs.add_noise_rows(3.0, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_rows_closed(&runs);
        assert_eq!(runs.decode(), PixelBuffer::filled(2, 2, RED));
    }

    #[test]
    fn test_invalid_stddev_is_rejected() {
        let mut runs = encode(&striped(4, 4));
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            runs.add_noise(-1.0, &mut rng),
            Err(PixmoshError::InvalidNoise(_))
        ));
        assert!(matches!(
            runs.add_noise_rows(f64::NAN, &mut rng),
            Err(PixmoshError::InvalidNoise(_))
        ));
    }
}
