//! Request chunking.

/// Splits `items` into consecutive slices of at most `size` elements.
///
/// A `size` of zero is treated as one.
#[must_use]
pub fn chunk<T>(items: &[T], size: usize) -> Vec<&[T]> {
    items.chunks(size.max(1)).collect()
}
