//! Zonal grading — luminance weights, per-zone recoloring, and the blend.

pub mod balance;
pub mod weights;
pub mod zones;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Smallest slice a rayon worker is handed; keeps tiny images off the pool.
#[cfg(feature = "parallel")]
const PAR_MIN_LEN: usize = 4096;

/// Run `f(index, element)` over every element of `dst`.
pub(crate) fn for_each_indexed<T, F>(dst: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync + Send,
{
    #[cfg(feature = "parallel")]
    dst.par_iter_mut()
        .with_min_len(PAR_MIN_LEN)
        .enumerate()
        .for_each(|(i, v)| f(i, v));

    #[cfg(not(feature = "parallel"))]
    dst.iter_mut().enumerate().for_each(|(i, v)| f(i, v));
}

/// Run `f(pixel_index, pixel)` over `dst` split into `channels`-sized pixels.
pub(crate) fn for_each_pixel_mut<F>(dst: &mut [u8], channels: usize, f: F)
where
    F: Fn(usize, &mut [u8]) + Sync + Send,
{
    #[cfg(feature = "parallel")]
    dst.par_chunks_exact_mut(channels)
        .with_min_len(PAR_MIN_LEN)
        .enumerate()
        .for_each(|(i, px)| f(i, px));

    #[cfg(not(feature = "parallel"))]
    dst.chunks_exact_mut(channels)
        .enumerate()
        .for_each(|(i, px)| f(i, px));
}
