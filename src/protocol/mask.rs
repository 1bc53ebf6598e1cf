#![allow(
    clippy::cast_ptr_alignment,
    clippy::ptr_as_ptr,
    clippy::cast_possible_wrap
)]

/// XORs `payload` in place with `key[i % 4]`, `i` counted from the start of the slice.
///
/// Masking is its own inverse: applying the same key twice restores the input.
pub fn mask(payload: &mut [u8], key: [u8; 4]) {
    #[cfg(all(target_arch = "x86_64", feature = "simd_masking"))]
    if is_x86_feature_detected!("avx2") {
        // SAFETY: avx2 support was just checked
        unsafe { mask_avx2(payload, key) };
        return;
    }

    mask_words(payload, key);
}

#[cfg(all(target_arch = "x86_64", feature = "simd_masking"))]
#[target_feature(enable = "avx2")]
unsafe fn mask_avx2(payload: &mut [u8], key: [u8; 4]) {
    use std::arch::x86_64::{
        __m256i, _mm256_loadu_si256, _mm256_set1_epi32, _mm256_storeu_si256, _mm256_xor_si256,
    };

    let mut blocks = payload.chunks_exact_mut(32);
    let key256 = _mm256_set1_epi32(i32::from_le_bytes(key));
    for block in &mut blocks {
        let ptr = block.as_mut_ptr() as *mut __m256i;
        // SAFETY: `block` is exactly 32 bytes and the loads/stores are unaligned
        unsafe { _mm256_storeu_si256(ptr, _mm256_xor_si256(_mm256_loadu_si256(ptr), key256)) };
    }

    // 32 is a multiple of 4, so the tail starts at key offset 0
    mask_words(blocks.into_remainder(), key);
}

fn mask_words(payload: &mut [u8], key: [u8; 4]) {
    let mut words = payload.chunks_exact_mut(4);
    for word in &mut words {
        for (b, k) in word.iter_mut().zip(key) {
            *b ^= k;
        }
    }
    for (b, k) in words.into_remainder().iter_mut().zip(key) {
        *b ^= k;
    }
}
