use rand::prelude::*;

/// Constant-intensity frame.
pub fn uniform_u8(width: usize, height: usize, value: u8) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    vec![value; width * height]
}

/// Dark frame with one bright axis-aligned block.
pub fn bright_block_u8(
    width: usize,
    height: usize,
    (x0, y0, bw, bh): (usize, usize, usize, usize),
    value: u8,
) -> Vec<u8> {
    assert!(x0 + bw <= width && y0 + bh <= height, "block must fit the frame");
    let mut img = vec![0u8; width * height];
    for y in y0..y0 + bh {
        img[y * width + x0..y * width + x0 + bw].fill(value);
    }
    img
}

/// Uniform noise from a seeded generator.
pub fn noise_u8(width: usize, height: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..width * height).map(|_| rng.gen()).collect()
}
