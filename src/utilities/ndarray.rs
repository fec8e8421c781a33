//! This submodule contains the index arithmetic for the crate's flat multi-dimensional arrays.
//!
//!
use std::ops::Index;

/// This struct provides the index-conversion for going between a 1D index and an N-dimensional index.
///
/// Indexing is implemented such that the leftmost index varies the fastest.
/// In 2D this is equivalent to column-major ordering. So, given a set of dimensions:
/// $$
/// (n_{1}, n_{2}, ..., n_{N})
/// $$
/// The linear index $j$ of a multi-dimensional index $(i_{1}, i_{2}, ..., i_{N})$ is given by:
/// $$
/// j = i_{1} + n_{1} i_{2} + n_{1}n_{2}i_{3} + ... + n_{1}n_{2}...n_{N-1}i_{N}
/// $$
/// This is the layout of both the sample and coefficient arrays: a contiguous
/// run of the flat array walks the first axis with every other index held
/// fixed, which is what the axis sweeps rely on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridIndexer<const N: usize> {
    /// Dimensions of the N-dimensional array
    dims: [usize; N],
    /// Stride of each axis in the flat array
    strides: [usize; N],
}
//..................................................................................................

impl<const N: usize> GridIndexer<N> {
    pub fn new(dims: &[usize; N]) -> Self {
        debug_assert!(dims.iter().all(|&d| d > 0));

        let mut strides = [1usize; N];
        for i in 1..N {
            strides[i] = strides[i - 1] * dims[i - 1];
        }
        GridIndexer {
            dims: *dims,
            strides,
        }
    }

    pub fn dims(&self) -> &[usize; N] {
        &self.dims
    }
    //..............................................................................................

    pub fn stride(&self, axis: usize) -> usize {
        self.strides[axis]
    }
    //..............................................................................................

    /// Total number of entries addressed by this indexer.
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }
    //..............................................................................................

    pub fn lin_index(&self, indices: &[usize; N]) -> usize {
        let mut idx = 0usize;
        for i in 0..N {
            debug_assert!(indices[i] < self.dims[i]);
            idx += indices[i] * self.strides[i];
        }
        idx
    }
    //..............................................................................................

    pub fn tuple_index(&self, idx: usize) -> [usize; N] {
        debug_assert!(idx < self.len());

        let mut out = [0; N];
        let mut rem = idx;
        for i in 0..N {
            out[i] = rem % self.dims[i];
            rem /= self.dims[i];
        }
        out
    }
    //..............................................................................................
}
//..................................................................................................

/// Read-only view of a flat slice as an N-dimensional array.
///
/// Indexing is provided by [GridIndexer]
pub struct GridView<'a, T, const N: usize> {
    data: &'a [T],
    indexer: GridIndexer<N>,
}
//..................................................................................................

impl<'a, T, const N: usize> GridView<'a, T, N> {
    pub fn new(data: &'a [T], dims: &[usize; N]) -> Self {
        let indexer = GridIndexer::new(dims);
        debug_assert!(data.len() >= indexer.len());

        GridView { data, indexer }
    }

    pub fn indexer(&self) -> &GridIndexer<N> {
        &self.indexer
    }
}
//..................................................................................................

impl<'a, T, const N: usize> Index<&[usize; N]> for GridView<'a, T, N> {
    type Output = T;

    fn index(&self, index_tuple: &[usize; N]) -> &Self::Output {
        &self.data[self.indexer.lin_index(index_tuple)]
    }
}
//..................................................................................................
