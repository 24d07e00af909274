//! The Fletcher-32 flavour AMD uses for PSP and BIOS directory checksums.
//!
//! Words are little-endian u16. Both accumulators start at 0xFFFF and are
//! folded (`low16 + high16`) after every word once the byte index is past
//! 255, and always after the final word. An odd trailing byte is treated as
//! the low half of a zero-padded final word.

const SEED: u64 = 0xffff;
const FOLD_AFTER: usize = 0xff;

#[inline]
fn fold(value: u64) -> u64 {
	(value & 0xffff) + (value >> 16)
}

pub fn fletcher32(data: &[u8]) -> u32 {
	let mut c0 = SEED;
	let mut c1 = SEED;
	let count = data.len();
	for (i, word) in data.chunks(2).enumerate() {
		let index = i * 2;
		let low = u64::from(word[0]);
		let high = word.get(1).copied().map(u64::from).unwrap_or(0);
		c0 += low | (high << 8);
		c1 += c0;
		if index > FOLD_AFTER || index + 2 >= count {
			c0 = fold(c0);
			c1 = fold(c1);
		}
	}
	((c1 << 16) | c0) as u32
}
