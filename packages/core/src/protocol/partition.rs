// Разбиение шифртекста на каналы

use crate::error::{CryptoError, Result};
use rand_core::{CryptoRng, RngCore};
use rand_distr::{Distribution, StandardNormal};

/// Split `data` into exactly `partitions` contiguous chunks, in order.
///
/// Each size is drawn around `remaining / remaining_partitions` with a
/// Gaussian whose three standard deviations equal a third of that mean, then
/// clamped to the band. The last chunk absorbs the remainder, so sizes are
/// not uniform but always sum to `data.len()`.
pub fn split_uniform<'a, R: CryptoRng + RngCore>(
    data: &'a [u8],
    partitions: usize,
    rng: &mut R,
) -> Result<Vec<&'a [u8]>> {
    if partitions == 0 {
        return Err(CryptoError::InvalidInput(
            "Partition count must be at least 1".to_string(),
        ));
    }

    let mut out = Vec::with_capacity(partitions);
    let mut position = 0usize;
    for i in 0..partitions {
        let remaining = data.len() - position;
        let wanted = remaining / (partitions - i);
        let max_range = wanted / 3;

        let mut size = gaussian_size(rng, wanted, max_range);
        if size > remaining || i == partitions - 1 {
            size = remaining;
        }

        out.push(&data[position..position + size]);
        position += size;
    }
    Ok(out)
}

/// Value with ~99% chance to fall naturally in `mean ± max_range`, clamped otherwise.
fn gaussian_size<R: CryptoRng + RngCore>(rng: &mut R, mean: usize, max_range: usize) -> usize {
    let z: f64 = StandardNormal.sample(rng);
    let mean_f = mean as f64;
    let range_f = max_range as f64;

    let value = (z * range_f) / 3.0 + mean_f;
    value.clamp(mean_f - range_f, mean_f + range_f).max(0.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_concatenation_restores_input() {
        let mut rng = StdRng::seed_from_u64(1);
        for len in [0usize, 1, 7, 100, 1040, 4099] {
            let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            for partitions in 1..=16 {
                let chunks = split_uniform(&data, partitions, &mut rng).unwrap();
                assert_eq!(chunks.len(), partitions);
                assert_eq!(chunks.concat(), data);
            }
        }
    }

    #[test]
    fn test_sizes_stay_in_band() {
        let mut rng = StdRng::seed_from_u64(2);
        let data = vec![0u8; 9000];
        let chunks = split_uniform(&data, 9, &mut rng).unwrap();

        // the first chunk is drawn around 1000 ± 333
        assert!(chunks[0].len() >= 667 && chunks[0].len() <= 1333);
        assert_eq!(chunks.iter().map(|c| c.len()).sum::<usize>(), 9000);
    }

    #[test]
    fn test_sizes_vary() {
        let mut rng = StdRng::seed_from_u64(3);
        let data = vec![0u8; 8000];
        let chunks = split_uniform(&data, 8, &mut rng).unwrap();
        let first = chunks[0].len();
        assert!(chunks.iter().any(|c| c.len() != first));
    }

    #[test]
    fn test_zero_partitions_rejected() {
        let mut rng = StdRng::seed_from_u64(4);
        assert!(split_uniform(b"abc", 0, &mut rng).is_err());
    }
}
