/// Per-row null flags; bit `i` of the bitmap marks storage column `i` as
/// absent. A row written without a bitmap has no nulls.
pub struct NullBitmap<'a> {
    bits: Option<&'a [u8]>,
}

impl<'a> NullBitmap<'a> {
    pub fn new(bits: Option<&'a [u8]>) -> Self {
        Self { bits }
    }

    #[inline]
    pub fn is_null(&self, idx: usize) -> bool {
        match self.bits.and_then(|b| b.get(idx / 8)) {
            Some(byte) => byte & (1 << (idx % 8)) != 0,
            None => false,
        }
    }
}
