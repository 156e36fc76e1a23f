/// Row-major grid geometry: strides per axis and the flat offsets of a cell's 2^d vertices.
pub(crate) struct Lattice {
    size: Vec<usize>,
    strides: Vec<usize>,
    hypercube_offsets: Vec<usize>,
}

impl Lattice {
    pub fn new(size: &[usize]) -> Self {
        let strides = Self::calc_strides(size);

        Self {
            size: size.to_vec(),
            hypercube_offsets: Self::calc_hypercube_offsets(&strides),
            strides,
        }
    }

    fn calc_strides(size: &[usize]) -> Vec<usize> {
        let d = size.len();
        let mut strides = vec![0; d];
        strides[d - 1] = 1usize;

        for i in (0..d - 1).rev() {
            strides[i] = strides[i + 1] * size[i + 1];
        }

        strides
    }

    fn calc_hypercube_offsets(strides: &[usize]) -> Vec<usize> {
        let n: usize = 1 << strides.len();
        let mut offsets = vec![0; n];

        for (i, offset) in offsets.iter_mut().enumerate() {
            for (d, stride) in strides.iter().enumerate() {
                *offset += stride * ((i >> d) & 0x1);
            }
        }

        offsets
    }

    pub fn hypercube_offsets(&self) -> &[usize] {
        &self.hypercube_offsets
    }

    pub fn flat_index(&self, index: &[usize]) -> usize {
        debug_assert!(index.iter().zip(&self.size).all(|(i, s)| i < s));

        index
            .iter()
            .zip(self.strides.iter())
            .map(|(i, s)| i * s)
            .sum()
    }
}
