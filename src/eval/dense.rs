//! Dense numeric tensor storage and contraction kernels.
//!
//! Tensors are contiguous row-major arrays of length `dim^rank`. All
//! index plumbing in the public API is 1-based; this module converts to
//! 0-based offsets at its boundary.

use crate::core::error::EvalError;
use crate::core::index::{IndexSeq, Permutation};
use crate::tensor::SpaceKind;

const MAX_RANK: usize = 16;

/// A dense numeric tensor with runtime dimension and rank.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseTensor {
    dim: usize,
    rank: usize,
    data: Vec<f64>,
}

/// Iterate all multi-indices of a `dim^rank` tensor in row-major order.
fn for_each_index(dim: usize, rank: usize, mut body: impl FnMut(&[usize])) {
    let mut index = vec![0usize; rank];
    loop {
        body(&index);
        // odometer increment, last index fastest
        let mut pos = rank;
        loop {
            if pos == 0 {
                return;
            }
            pos -= 1;
            index[pos] += 1;
            if index[pos] < dim {
                break;
            }
            index[pos] = 0;
        }
    }
}

impl DenseTensor {
    /// Allocate a zero-filled tensor.
    ///
    /// # Errors
    /// `DimOutOfRange` for dimension zero, `RankOutOfRange` for ranks the
    /// kernel does not support.
    pub fn new(dim: usize, rank: usize) -> Result<DenseTensor, EvalError> {
        if dim == 0 {
            return Err(EvalError::DimOutOfRange { dim, op: "allocate" });
        }
        if rank > MAX_RANK {
            return Err(EvalError::RankOutOfRange { rank, op: "allocate" });
        }
        Ok(DenseTensor {
            dim,
            rank,
            data: vec![0.0; dim.pow(rank as u32)],
        })
    }

    /// Wrap existing row-major storage.
    ///
    /// # Errors
    /// `DomainError` when the data length is not `dim^rank`.
    pub fn from_data(dim: usize, rank: usize, data: Vec<f64>) -> Result<DenseTensor, EvalError> {
        let mut tensor = DenseTensor::new(dim, rank)?;
        if data.len() != tensor.data.len() {
            return Err(EvalError::domain(format!(
                "expected {} entries for dim {dim} rank {rank}, got {}",
                tensor.data.len(),
                data.len()
            )));
        }
        tensor.data = data;
        Ok(tensor)
    }

    /// A rank-0 tensor holding a single value.
    ///
    /// # Errors
    /// `DimOutOfRange` for dimension zero.
    pub fn scalar(dim: usize, value: f64) -> Result<DenseTensor, EvalError> {
        let mut tensor = DenseTensor::new(dim, 0)?;
        tensor.data[0] = value;
        Ok(tensor)
    }

    /// The Kronecker delta.
    ///
    /// # Errors
    /// `DimOutOfRange` for dimension zero.
    pub fn delta(dim: usize) -> Result<DenseTensor, EvalError> {
        let mut tensor = DenseTensor::new(dim, 2)?;
        for i in 0..dim {
            tensor.data[i * dim + i] = 1.0;
        }
        Ok(tensor)
    }

    /// The even-rank identity: 1 where the first half of the indices
    /// equals the second half.
    ///
    /// # Errors
    /// `RankOutOfRange` for odd rank, `DimOutOfRange` for dimension zero.
    pub fn identity(dim: usize, rank: usize) -> Result<DenseTensor, EvalError> {
        if rank == 0 || rank % 2 != 0 {
            return Err(EvalError::RankOutOfRange { rank, op: "identity" });
        }
        let mut tensor = DenseTensor::new(dim, rank)?;
        let half = rank / 2;
        let data = &mut tensor.data;
        let mut offset = 0usize;
        for_each_index(dim, rank, |index| {
            if index[..half] == index[half..] {
                data[offset] = 1.0;
            }
            offset += 1;
        });
        Ok(tensor)
    }

    /// One of the four canonical rank-4 projectors.
    ///
    /// # Errors
    /// `DimOutOfRange` for dimension zero.
    pub fn projector(space: SpaceKind, dim: usize) -> Result<DenseTensor, EvalError> {
        let mut tensor = DenseTensor::new(dim, 4)?;
        let d = dim as f64;
        let mut offset = 0usize;
        let data = &mut tensor.data;
        for_each_index(dim, 4, |index| {
            let (i, j, k, l) = (index[0], index[1], index[2], index[3]);
            let up = f64::from(u8::from(i == k && j == l));
            let lo = f64::from(u8::from(i == l && j == k));
            let tr = f64::from(u8::from(i == j && k == l));
            data[offset] = match space {
                // P_sym = 1/2 (otimesu + otimesl)
                SpaceKind::Sym => 0.5 * (up + lo),
                // P_skew = 1/2 (otimesu - otimesl)
                SpaceKind::Skew => 0.5 * (up - lo),
                // P_vol = 1/d otimes(I, I)
                SpaceKind::Vol => tr / d,
                // P_dev = P_sym - P_vol
                SpaceKind::Dev => 0.5 * (up + lo) - tr / d,
            };
            offset += 1;
        });
        Ok(tensor)
    }

    /// Spatial dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of indices.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// The row-major storage.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// The single value of a rank-0 tensor.
    pub fn as_scalar(&self) -> Option<f64> {
        if self.rank == 0 { Some(self.data[0]) } else { None }
    }

    fn offset(&self, index: &[usize]) -> usize {
        index.iter().fold(0, |acc, &i| acc * self.dim + i)
    }

    /// Entry at a 0-based multi-index.
    pub fn get(&self, index: &[usize]) -> f64 {
        self.data[self.offset(index)]
    }

    /// Set the entry at a 0-based multi-index.
    pub fn set(&mut self, index: &[usize], value: f64) {
        let offset = self.offset(index);
        self.data[offset] = value;
    }

    /// Elementwise sum.
    ///
    /// # Errors
    /// `DomainError` on shape mismatch.
    pub fn add(&self, other: &DenseTensor) -> Result<DenseTensor, EvalError> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    /// Elementwise difference.
    ///
    /// # Errors
    /// `DomainError` on shape mismatch.
    pub fn sub(&self, other: &DenseTensor) -> Result<DenseTensor, EvalError> {
        self.zip_with(other, "sub", |a, b| a - b)
    }

    fn zip_with(
        &self,
        other: &DenseTensor,
        op: &str,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<DenseTensor, EvalError> {
        if self.dim != other.dim || self.rank != other.rank {
            return Err(EvalError::domain(format!(
                "{op}: shape ({}, {}) vs ({}, {})",
                self.dim, self.rank, other.dim, other.rank
            )));
        }
        let mut result = self.clone();
        for (slot, &value) in result.data.iter_mut().zip(other.data.iter()) {
            *slot = f(*slot, value);
        }
        Ok(result)
    }

    /// Scale in place by a factor.
    pub fn scale(&mut self, factor: f64) {
        for slot in &mut self.data {
            *slot *= factor;
        }
    }

    /// Scaled copy.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> DenseTensor {
        let mut result = self.clone();
        result.scale(factor);
        result
    }

    /// Permute indices: entry `i_1..i_r` of the result is entry
    /// `i_{p(1)}..i_{p(r)}` of the operand (1-based permutation).
    ///
    /// # Errors
    /// `DomainError` when the permutation length differs from the rank.
    pub fn permute(&self, perm: &Permutation) -> Result<DenseTensor, EvalError> {
        if perm.len() != self.rank {
            return Err(EvalError::domain(format!(
                "permute: permutation length {} vs rank {}",
                perm.len(),
                self.rank
            )));
        }
        let mut result = DenseTensor::new(self.dim, self.rank)?;
        let mut source = vec![0usize; self.rank];
        let mut offset = 0usize;
        let perm = perm.as_slice();
        for_each_index(self.dim, self.rank, |index| {
            for (slot, &p) in source.iter_mut().zip(perm.iter()) {
                *slot = index[p - 1];
            }
            result.data[offset] = self.data[self.offset(&source)];
            offset += 1;
        });
        Ok(result)
    }

    /// Contraction over matching 1-based index sequences. Free indices of
    /// `self` come first in the result.
    ///
    /// # Errors
    /// `DomainError` on invalid sequences or mismatched dimensions.
    pub fn inner_product(
        &self,
        lhs_idx: &IndexSeq,
        other: &DenseTensor,
        rhs_idx: &IndexSeq,
    ) -> Result<DenseTensor, EvalError> {
        if self.dim != other.dim {
            return Err(EvalError::domain(format!(
                "inner_product: dim {} vs {}",
                self.dim, other.dim
            )));
        }
        if lhs_idx.len() != rhs_idx.len() {
            return Err(EvalError::domain(
                "inner_product: contraction sequences differ in length".to_owned(),
            ));
        }
        lhs_idx
            .validate(self.rank, "inner_product")
            .map_err(|e| EvalError::domain(e.to_string()))?;
        rhs_idx
            .validate(other.rank, "inner_product")
            .map_err(|e| EvalError::domain(e.to_string()))?;

        let contracted = lhs_idx.len();
        let lhs_free: Vec<usize> = (0..self.rank)
            .filter(|i| !lhs_idx.as_slice().contains(&(i + 1)))
            .collect();
        let rhs_free: Vec<usize> = (0..other.rank)
            .filter(|i| !rhs_idx.as_slice().contains(&(i + 1)))
            .collect();
        let out_rank = lhs_free.len() + rhs_free.len();
        let mut result = DenseTensor::new(self.dim, out_rank)?;

        let mut lhs_index = vec![0usize; self.rank];
        let mut rhs_index = vec![0usize; other.rank];
        let mut offset = 0usize;
        let dim = self.dim;
        for_each_index(dim, out_rank, |free| {
            for (slot, &axis) in free[..lhs_free.len()].iter().zip(lhs_free.iter()) {
                lhs_index[axis] = *slot;
            }
            for (slot, &axis) in free[lhs_free.len()..].iter().zip(rhs_free.iter()) {
                rhs_index[axis] = *slot;
            }
            let mut sum = 0.0;
            for_each_index(dim, contracted, |bound| {
                for ((&value, &lpos), &rpos) in bound
                    .iter()
                    .zip(lhs_idx.as_slice().iter())
                    .zip(rhs_idx.as_slice().iter())
                {
                    lhs_index[lpos - 1] = value;
                    rhs_index[rpos - 1] = value;
                }
                sum += self.data[self.offset(&lhs_index)] * other.data[other.offset(&rhs_index)];
            });
            result.data[offset] = sum;
            offset += 1;
        });
        Ok(result)
    }

    /// Tensor product with explicit 1-based result positions for both
    /// operands' indices.
    ///
    /// # Errors
    /// `DomainError` on invalid positions or mismatched dimensions.
    pub fn outer_product(
        &self,
        lhs_pos: &IndexSeq,
        other: &DenseTensor,
        rhs_pos: &IndexSeq,
    ) -> Result<DenseTensor, EvalError> {
        if self.dim != other.dim {
            return Err(EvalError::domain(format!(
                "outer_product: dim {} vs {}",
                self.dim, other.dim
            )));
        }
        let rank = self.rank + other.rank;
        if lhs_pos.len() != self.rank || rhs_pos.len() != other.rank {
            return Err(EvalError::domain(
                "outer_product: position sequences must cover the operand ranks".to_owned(),
            ));
        }
        let mut result = DenseTensor::new(self.dim, rank)?;
        let mut lhs_index = vec![0usize; self.rank];
        let mut rhs_index = vec![0usize; other.rank];
        let mut offset = 0usize;
        for_each_index(self.dim, rank, |index| {
            for (slot, &pos) in lhs_index.iter_mut().zip(lhs_pos.as_slice().iter()) {
                *slot = index[pos - 1];
            }
            for (slot, &pos) in rhs_index.iter_mut().zip(rhs_pos.as_slice().iter()) {
                *slot = index[pos - 1];
            }
            result.data[offset] =
                self.data[self.offset(&lhs_index)] * other.data[other.offset(&rhs_index)];
            offset += 1;
        });
        Ok(result)
    }

    /// Trace of a rank-2 tensor.
    ///
    /// # Errors
    /// `DomainError` for other ranks.
    pub fn trace(&self) -> Result<f64, EvalError> {
        if self.rank != 2 {
            return Err(EvalError::domain(format!(
                "trace: rank {} (requires 2)",
                self.rank
            )));
        }
        Ok((0..self.dim).map(|i| self.data[i * self.dim + i]).sum())
    }

    /// Transpose of a rank-2 tensor.
    ///
    /// # Errors
    /// `DomainError` for other ranks.
    pub fn transpose(&self) -> Result<DenseTensor, EvalError> {
        self.permute(&Permutation::transpose())
            .map_err(|_| EvalError::domain(format!("transpose: rank {}", self.rank)))
    }

    /// Frobenius norm over all entries.
    pub fn norm(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Full self-contraction (sum of squared entries).
    pub fn dot(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum()
    }

    /// Determinant of a rank-2 tensor, dimensions 1 to 3.
    ///
    /// # Errors
    /// `DomainError` for other ranks, `DimOutOfRange` above dimension 3.
    pub fn det(&self) -> Result<f64, EvalError> {
        if self.rank != 2 {
            return Err(EvalError::domain(format!(
                "det: rank {} (requires 2)",
                self.rank
            )));
        }
        let m = &self.data;
        match self.dim {
            1 => Ok(m[0]),
            2 => Ok(m[0] * m[3] - m[1] * m[2]),
            3 => Ok(m[0] * (m[4] * m[8] - m[5] * m[7]) - m[1] * (m[3] * m[8] - m[5] * m[6])
                + m[2] * (m[3] * m[7] - m[4] * m[6])),
            dim => Err(EvalError::DimOutOfRange { dim, op: "det" }),
        }
    }

    /// Inverse of a rank-2 tensor, dimensions 1 to 3.
    ///
    /// # Errors
    /// `DomainError` for singular operands or other ranks,
    /// `DimOutOfRange` above dimension 3.
    pub fn inverse(&self) -> Result<DenseTensor, EvalError> {
        let determinant = self.det()?;
        if determinant == 0.0 {
            return Err(EvalError::domain("inverse: singular tensor".to_owned()));
        }
        let m = &self.data;
        let inv_det = 1.0 / determinant;
        let data = match self.dim {
            1 => vec![inv_det],
            2 => vec![
                m[3] * inv_det,
                -m[1] * inv_det,
                -m[2] * inv_det,
                m[0] * inv_det,
            ],
            3 => {
                // adjugate transpose
                vec![
                    (m[4] * m[8] - m[5] * m[7]) * inv_det,
                    (m[2] * m[7] - m[1] * m[8]) * inv_det,
                    (m[1] * m[5] - m[2] * m[4]) * inv_det,
                    (m[5] * m[6] - m[3] * m[8]) * inv_det,
                    (m[0] * m[8] - m[2] * m[6]) * inv_det,
                    (m[2] * m[3] - m[0] * m[5]) * inv_det,
                    (m[3] * m[7] - m[4] * m[6]) * inv_det,
                    (m[1] * m[6] - m[0] * m[7]) * inv_det,
                    (m[0] * m[4] - m[1] * m[3]) * inv_det,
                ]
            }
            dim => return Err(EvalError::DimOutOfRange { dim, op: "inverse" }),
        };
        DenseTensor::from_data(self.dim, 2, data)
    }

    /// The sym/skew/vol/dev part of a rank-2 tensor.
    ///
    /// # Errors
    /// `DomainError` for other ranks.
    pub fn part(&self, space: SpaceKind) -> Result<DenseTensor, EvalError> {
        if self.rank != 2 {
            return Err(EvalError::domain(format!(
                "part: rank {} (requires 2)",
                self.rank
            )));
        }
        let transposed = self.transpose()?;
        match space {
            SpaceKind::Sym => {
                let mut result = self.add(&transposed)?;
                result.scale(0.5);
                Ok(result)
            }
            SpaceKind::Skew => {
                let mut result = self.sub(&transposed)?;
                result.scale(0.5);
                Ok(result)
            }
            SpaceKind::Vol => {
                let mut result = DenseTensor::delta(self.dim)?;
                result.scale(self.trace()? / self.dim as f64);
                Ok(result)
            }
            SpaceKind::Dev => {
                let sym = self.part(SpaceKind::Sym)?;
                let vol = self.part(SpaceKind::Vol)?;
                sym.sub(&vol)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn delta_trace_is_dim() {
        let delta = DenseTensor::delta(3).unwrap();
        assert!(close(delta.trace().unwrap(), 3.0));
        assert!(close(delta.det().unwrap(), 1.0));
    }

    #[test]
    fn matrix_product_via_inner() {
        // [[1,2],[3,4]] . [[5,6],[7,8]] = [[19,22],[43,50]]
        let a = DenseTensor::from_data(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = DenseTensor::from_data(2, 2, vec![5.0, 6.0, 7.0, 8.0]).unwrap();
        let c = a
            .inner_product(&IndexSeq::from([2]), &b, &IndexSeq::from([1]))
            .unwrap();
        assert_eq!(c.data(), &[19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn inverse_of_3x3() {
        let a = DenseTensor::from_data(
            3,
            2,
            vec![2.0, 0.0, 0.0, 0.0, 4.0, 0.0, 0.0, 0.0, 8.0],
        )
        .unwrap();
        let inv = a.inverse().unwrap();
        assert!(close(inv.get(&[0, 0]), 0.5));
        assert!(close(inv.get(&[1, 1]), 0.25));
        assert!(close(inv.get(&[2, 2]), 0.125));
    }

    #[test]
    fn projector_sym_projects() {
        let x = DenseTensor::from_data(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let p = DenseTensor::projector(SpaceKind::Sym, 2).unwrap();
        let projected = p
            .inner_product(&IndexSeq::from([3, 4]), &x, &IndexSeq::from([1, 2]))
            .unwrap();
        let expected = x.part(SpaceKind::Sym).unwrap();
        for (a, b) in projected.data().iter().zip(expected.data().iter()) {
            assert!(close(*a, *b));
        }
    }

    #[test]
    fn vol_plus_dev_is_sym() {
        let x = DenseTensor::from_data(3, 2, (1..=9).map(f64::from).collect()).unwrap();
        let sym = x.part(SpaceKind::Sym).unwrap();
        let recombined = x
            .part(SpaceKind::Vol)
            .unwrap()
            .add(&x.part(SpaceKind::Dev).unwrap())
            .unwrap();
        for (a, b) in sym.data().iter().zip(recombined.data().iter()) {
            assert!(close(*a, *b));
        }
    }

    #[test]
    fn identity_rank4_absorbs() {
        let x = DenseTensor::from_data(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let id4 = DenseTensor::identity(2, 4).unwrap();
        let absorbed = id4
            .inner_product(&IndexSeq::from([3, 4]), &x, &IndexSeq::from([1, 2]))
            .unwrap();
        assert_eq!(absorbed.data(), x.data());
    }
}
