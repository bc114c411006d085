//! Resizable typed value streams used as vertex storage.
//!
//! An [`AttributeStream`] is a dense, growable sequence of one numeric
//! type. Geometries keep one stream per vertex attribute (interleaved `xy`,
//! `z`, `m`, `id`) and per-path bookkeeping (path starts, path flags).
//!
//! The bulk copy [`AttributeStream::write_range`] supports forward and
//! reversed copies. A reversed copy moves whole groups of `stride`
//! consecutive values, so an interleaved `xy` stream is reversed with
//! `stride = 2` while keeping each `(x, y)` pair in order. Copies inside one
//! stream, with possibly overlapping ranges, go through
//! [`AttributeStream::write_range_within`] which has `memmove` semantics.
use std::fmt::Debug;

use smallvec::SmallVec;

use crate::error::{GeometryError, Result};

/// Numeric element types that can be stored in an [`AttributeStream`].
pub trait AttributeValue: Copy + Default + Debug + PartialOrd {
    /// Structural equality; floating types treat `NaN == NaN`.
    fn same(self, other: Self) -> bool;
    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_integer_value {
    ($($t:ty),*) => {
        $(
            impl AttributeValue for $t {
                #[inline]
                fn same(self, other: Self) -> bool {
                    self == other
                }
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
                #[inline]
                fn from_f64(value: f64) -> Self {
                    value.round() as $t
                }
            }
        )*
    };
}

macro_rules! impl_float_value {
    ($($t:ty),*) => {
        $(
            impl AttributeValue for $t {
                #[inline]
                fn same(self, other: Self) -> bool {
                    self == other || (self.is_nan() && other.is_nan())
                }
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $t
                }
            }
        )*
    };
}

impl_integer_value!(i8, i16, i32, i64);
impl_float_value!(f32, f64);

/// A resizable sequence of values of one numeric type.
#[derive(Debug, Clone, Default)]
pub struct AttributeStream<T: AttributeValue> {
    buffer: Vec<T>,
}

pub type AttributeStreamOfInt8 = AttributeStream<i8>;
pub type AttributeStreamOfInt16 = AttributeStream<i16>;
pub type AttributeStreamOfInt32 = AttributeStream<i32>;
pub type AttributeStreamOfInt64 = AttributeStream<i64>;
pub type AttributeStreamOfFloat = AttributeStream<f32>;
pub type AttributeStreamOfDbl = AttributeStream<f64>;

impl<T: AttributeValue> AttributeStream<T> {
    /// Create a stream of `size` default (zero) values.
    pub fn new(size: usize) -> Self {
        Self::with_value(size, T::default())
    }

    /// Create a stream of `size` copies of `fill`.
    pub fn with_value(size: usize, fill: T) -> Self {
        AttributeStream {
            buffer: vec![fill; size],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    pub fn read(&self, index: usize) -> T {
        self.buffer[index]
    }

    #[inline]
    pub fn write(&mut self, index: usize, value: T) {
        self.buffer[index] = value;
    }

    /// Append one value.
    #[inline]
    pub fn add(&mut self, value: T) {
        self.buffer.push(value);
    }

    /// Resize, filling new slots with the default value.
    pub fn resize(&mut self, new_size: usize) {
        self.buffer.resize(new_size, T::default());
    }

    /// Resize, filling new slots with `fill`.
    pub fn resize_with_value(&mut self, new_size: usize, fill: T) {
        self.buffer.resize(new_size, fill);
    }

    /// Overwrite `count` values starting at `start` with `value`.
    pub fn set_range(&mut self, value: T, start: usize, count: usize) {
        self.buffer[start..start + count]
            .iter_mut()
            .for_each(|v| *v = value);
    }

    /// Insert `count` copies of `value` before `start`.
    pub fn insert_range(&mut self, start: usize, value: T, count: usize) {
        self.buffer
            .splice(start..start, std::iter::repeat(value).take(count));
    }

    /// Remove `count` values starting at `start`.
    pub fn erase_range(&mut self, start: usize, count: usize) {
        self.buffer.drain(start..start + count);
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.buffer
    }

    /// Copy `count` values of `src`, starting at `src_start`, into this
    /// stream at `dst_start`.
    ///
    /// With `forward` the values keep their order. Otherwise the source
    /// range is split into groups of `stride` values and the groups are
    /// written in reverse order (each group keeps its inner order); a
    /// `stride` of 0 or 1 reverses single values. The source position thus
    /// steps back one whole group at a time, so a reversed copy keeps
    /// vertices intact when `stride` is the component count.
    ///
    /// The destination grows when `dst_start + count` exceeds its size. The
    /// call fails, without touching the destination, when the source range
    /// exceeds `src`, or when a reversed copy's `count` is not a multiple of
    /// the stride.
    pub fn write_range(
        &mut self,
        dst_start: usize,
        count: usize,
        src: &AttributeStream<T>,
        src_start: usize,
        forward: bool,
        stride: usize,
    ) -> Result<()> {
        let stride = check_range(self.size(), dst_start, count, src.size(), src_start, forward, stride)?;
        if count == 0 {
            return Ok(());
        }
        self.reserve_destination(dst_start, count);
        let source = &src.buffer[src_start..src_start + count];
        if forward {
            self.buffer[dst_start..dst_start + count].copy_from_slice(source);
        } else {
            write_reversed(&mut self.buffer[dst_start..dst_start + count], source, stride);
        }
        Ok(())
    }

    /// Same as [`write_range`](Self::write_range) with this stream as the
    /// source. Overlapping ranges are handled like `memmove`; the source
    /// values are never clobbered before they are read.
    pub fn write_range_within(
        &mut self,
        dst_start: usize,
        count: usize,
        src_start: usize,
        forward: bool,
        stride: usize,
    ) -> Result<()> {
        let stride = check_range(self.size(), dst_start, count, self.size(), src_start, forward, stride)?;
        if count == 0 {
            return Ok(());
        }
        self.reserve_destination(dst_start, count);
        if forward {
            self.buffer
                .copy_within(src_start..src_start + count, dst_start);
        } else {
            let source: SmallVec<[T; 32]> =
                SmallVec::from_slice(&self.buffer[src_start..src_start + count]);
            write_reversed(&mut self.buffer[dst_start..dst_start + count], &source, stride);
        }
        Ok(())
    }

    fn reserve_destination(&mut self, dst_start: usize, count: usize) {
        if self.size() < dst_start + count {
            self.resize(dst_start + count);
        }
    }
}

fn check_range(
    dst_size: usize,
    dst_start: usize,
    count: usize,
    src_size: usize,
    src_start: usize,
    forward: bool,
    stride: usize,
) -> Result<usize> {
    let stride = stride.max(1);
    if !forward && count % stride != 0 {
        return Err(GeometryError::invalid_argument(format!(
            "reversed copy of {count} values is not a multiple of stride {stride}"
        )));
    }
    if src_start.checked_add(count).map_or(true, |end| end > src_size) {
        return Err(GeometryError::invalid_argument(format!(
            "source range {src_start}..{src_start}+{count} exceeds source size {src_size}"
        )));
    }
    if dst_start > dst_size {
        return Err(GeometryError::invalid_argument(format!(
            "destination start {dst_start} is beyond destination size {dst_size}"
        )));
    }
    Ok(stride)
}

fn write_reversed<T: Copy>(dst: &mut [T], src: &[T], stride: usize) {
    debug_assert_eq!(dst.len(), src.len());
    for (dst_group, src_group) in dst.chunks_mut(stride).zip(src.chunks(stride).rev()) {
        dst_group.copy_from_slice(src_group);
    }
}

/// Structural equality; floating streams treat `NaN == NaN`.
impl<T: AttributeValue> PartialEq for AttributeStream<T> {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size()
            && self
                .buffer
                .iter()
                .zip(other.buffer.iter())
                .all(|(a, b)| a.same(*b))
    }
}

impl<T: AttributeValue> From<Vec<T>> for AttributeStream<T> {
    fn from(buffer: Vec<T>) -> Self {
        AttributeStream { buffer }
    }
}

impl<T: AttributeValue> std::iter::FromIterator<T> for AttributeStream<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        AttributeStream {
            buffer: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(start: i32, n: i32) -> AttributeStreamOfInt32 {
        (start..start + n).collect()
    }

    #[test]
    fn forward_copy() {
        let a = sequence(-2, 10);
        let mut b = AttributeStreamOfInt32::new(6);
        b.write_range(0, 6, &a, 3, true, 0).unwrap();
        assert_eq!(b.as_slice(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn reversed_copy() {
        let a = sequence(-2, 10);
        let mut b = AttributeStreamOfInt32::new(6);
        b.write_range(0, 6, &a, 3, false, 1).unwrap();
        assert_eq!(b.as_slice(), &[6, 5, 4, 3, 2, 1]);

        // Stride 0 behaves like single value groups.
        let mut c = AttributeStreamOfInt32::new(3);
        c.write_range(0, 3, &a, 0, false, 0).unwrap();
        assert_eq!(c.as_slice(), &[0, -1, -2]);
    }

    #[test]
    fn reversed_copy_keeps_groups() {
        let xy: AttributeStreamOfDbl = vec![0., 1., 2., 3., 4., 5.].into();
        let mut out = AttributeStreamOfDbl::new(0);
        out.write_range(0, 6, &xy, 0, false, 2).unwrap();
        assert_eq!(out.as_slice(), &[4., 5., 2., 3., 0., 1.]);

        let err = out.write_range(0, 5, &xy, 0, false, 2);
        assert!(matches!(err, Err(GeometryError::InvalidArgument { .. })));
    }

    #[test]
    fn copy_grows_destination() {
        let a = sequence(0, 4);
        let mut b = AttributeStreamOfInt32::with_value(2, 9);
        b.write_range(2, 4, &a, 0, true, 1).unwrap();
        assert_eq!(b.as_slice(), &[9, 9, 0, 1, 2, 3]);
    }

    #[test]
    fn self_copy_forward_overlapping() {
        let mut target = sequence(10, 10);
        target.write_range_within(1, 5, 3, true, 1).unwrap();
        assert_eq!(
            target.as_slice(),
            &[10, 13, 14, 15, 16, 17, 16, 17, 18, 19]
        );

        let mut target = sequence(10, 10);
        target.write_range_within(4, 5, 2, true, 1).unwrap();
        assert_eq!(
            target.as_slice(),
            &[10, 11, 12, 13, 12, 13, 14, 15, 16, 19]
        );
    }

    #[test]
    fn self_copy_reversed_overlapping() {
        let mut target = sequence(10, 10);
        target.write_range_within(2, 4, 0, false, 1).unwrap();
        assert_eq!(
            target.as_slice(),
            &[10, 11, 13, 12, 11, 10, 16, 17, 18, 19]
        );
    }

    #[test]
    fn illegal_source_range() {
        let a = sequence(-2, 10);
        let mut b = AttributeStreamOfInt32::with_value(5, 0);
        let err = b.write_range(0, 5, &a, 7, true, 0);
        assert!(matches!(err, Err(GeometryError::InvalidArgument { .. })));
        // Nothing was written.
        assert_eq!(b.as_slice(), &[0; 5]);

        let err = b.write_range_within(0, 3, 4, true, 1);
        assert!(err.is_err());
    }

    #[test]
    fn typed_streams() {
        let mut bytes = AttributeStreamOfInt8::with_value(3, 1);
        bytes.add(4);
        assert_eq!(bytes.size(), 4);
        assert_eq!(bytes.read(3), 4);

        let mut words = AttributeStreamOfInt16::new(2);
        words.write(1, -7);
        assert_eq!(words.as_slice(), &[0, -7]);

        let mut longs = AttributeStreamOfInt64::new(0);
        longs.insert_range(0, 5, 3);
        longs.erase_range(1, 1);
        assert_eq!(longs.as_slice(), &[5, 5]);

        let mut floats = AttributeStreamOfFloat::with_value(2, f32::NAN);
        floats.resize_with_value(4, 1.5);
        floats.set_range(2.5, 0, 1);
        assert_eq!(floats.read(0), 2.5);
        assert!(floats.read(1).is_nan());
        assert_eq!(floats.read(3), 1.5);
    }

    #[test]
    fn nan_aware_equality() {
        let a = AttributeStreamOfDbl::with_value(3, f64::NAN);
        let b = AttributeStreamOfDbl::with_value(3, f64::NAN);
        assert_eq!(a, b);
        assert_ne!(a, AttributeStreamOfDbl::new(3));
    }
}
