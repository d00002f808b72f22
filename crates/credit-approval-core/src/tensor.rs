use crate::dtype::Float;
use crate::error::{PipelineError, PipelineResult};
use crate::shape::Shape;

use std::fmt;

/// Dense numeric array used for feature matrices (`[rows, features]`) and label vectors (`[rows]`).
///
/// Stores data in a flat contiguous `Vec<T>` with row-major layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T: Float> {
    data: Vec<T>,
    shape: Shape,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl<T: Float> Tensor<T> {
    /// Create a tensor from raw data and shape.
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> PipelineResult<Self> {
        let s = Shape::new(shape);
        if data.len() != s.numel() {
            return Err(PipelineError::ShapeMismatch {
                expected: s.to_vec(),
                got: vec![data.len()],
            });
        }
        Ok(Tensor { data, shape: s })
    }

    /// Create a 1-D tensor from a slice.
    pub fn from_slice(data: &[T]) -> Self {
        Tensor {
            data: data.to_vec(),
            shape: Shape::new(vec![data.len()]),
        }
    }

    /// Create a 2-D tensor from rows of equal length.
    pub fn from_vec2d(data: &[Vec<T>]) -> PipelineResult<Self> {
        if data.is_empty() {
            return Ok(Tensor {
                data: Vec::new(),
                shape: Shape::new(vec![0, 0]),
            });
        }
        let rows = data.len();
        let cols = data[0].len();
        if let Some(bad) = data.iter().find(|r| r.len() != cols) {
            return Err(PipelineError::ShapeMismatch {
                expected: vec![cols],
                got: vec![bad.len()],
            });
        }
        let flat: Vec<T> = data.iter().flat_map(|r| r.iter().copied()).collect();
        Tensor::new(flat, vec![rows, cols])
    }

    /// Build a `[rows, columns.len()]` matrix from column vectors of equal length.
    pub fn from_columns(columns: &[Vec<T>]) -> PipelineResult<Self> {
        let cols = columns.len();
        let rows = columns.first().map_or(0, Vec::len);
        let mut data = vec![T::ZERO; rows * cols];
        for (j, column) in columns.iter().enumerate() {
            if column.len() != rows {
                return Err(PipelineError::ShapeMismatch {
                    expected: vec![rows],
                    got: vec![column.len()],
                });
            }
            for (i, &v) in column.iter().enumerate() {
                data[i * cols + j] = v;
            }
        }
        Tensor::new(data, vec![rows, cols])
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn shape_vec(&self) -> Vec<usize> {
        self.shape.to_vec()
    }

    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    fn offset(&self, indices: &[usize]) -> PipelineResult<usize> {
        if indices.len() != self.ndim() {
            return Err(PipelineError::InvalidOperation(format!(
                "expected {} indices, got {}",
                self.ndim(),
                indices.len()
            )));
        }
        let mut offset = 0;
        for (axis, &idx) in indices.iter().enumerate() {
            let size = self.shape.dim(axis)?;
            if idx >= size {
                return Err(PipelineError::IndexOutOfBounds { index: idx, axis, size });
            }
            offset = offset * size + idx;
        }
        Ok(offset)
    }

    /// Element at a multi-dimensional index.
    pub fn get(&self, indices: &[usize]) -> PipelineResult<T> {
        self.offset(indices).map(|o| self.data[o])
    }

    fn require_matrix(&self, op: &str) -> PipelineResult<(usize, usize)> {
        if self.ndim() != 2 {
            return Err(PipelineError::InvalidOperation(format!(
                "{}() requires a 2D tensor, got {}D",
                op,
                self.ndim()
            )));
        }
        Ok((self.shape.dim(0)?, self.shape.dim(1)?))
    }

    /// Borrow row `i` of a 2D tensor.
    pub fn row_slice(&self, i: usize) -> PipelineResult<&[T]> {
        let (rows, cols) = self.require_matrix("row_slice")?;
        if i >= rows {
            return Err(PipelineError::IndexOutOfBounds { index: i, axis: 0, size: rows });
        }
        Ok(&self.data[i * cols..(i + 1) * cols])
    }

    /// Extract a column from a 2D tensor.
    pub fn col(&self, j: usize) -> PipelineResult<Tensor<T>> {
        let (rows, cols) = self.require_matrix("col")?;
        if j >= cols {
            return Err(PipelineError::IndexOutOfBounds { index: j, axis: 1, size: cols });
        }
        let data: Vec<T> = (0..rows).map(|i| self.data[i * cols + j]).collect();
        Ok(Tensor::from_slice(&data))
    }

    /// Gather the given rows (first axis) in order. Works for vectors and matrices.
    pub fn select_rows(&self, indices: &[usize]) -> PipelineResult<Tensor<T>> {
        let rows = self.shape.dim(0)?;
        let width: usize = self.shape.dims()[1..].iter().product();
        let mut data = Vec::with_capacity(indices.len() * width);
        for &i in indices {
            if i >= rows {
                return Err(PipelineError::IndexOutOfBounds { index: i, axis: 0, size: rows });
            }
            data.extend_from_slice(&self.data[i * width..(i + 1) * width]);
        }
        let mut shape = self.shape_vec();
        shape[0] = indices.len();
        Tensor::new(data, shape)
    }

    // ─── Element-wise & Reductions ──────────────────────────────────────────

    pub fn apply<F: Fn(T) -> T>(&self, f: F) -> Tensor<T> {
        Tensor {
            data: self.data.iter().map(|&x| f(x)).collect(),
            shape: self.shape.clone(),
        }
    }

    pub fn min_all(&self) -> PipelineResult<T> {
        self.data
            .iter()
            .copied()
            .reduce(T::min)
            .ok_or_else(|| PipelineError::InvalidOperation("min of empty tensor".into()))
    }

    pub fn max_all(&self) -> PipelineResult<T> {
        self.data
            .iter()
            .copied()
            .reduce(T::max)
            .ok_or_else(|| PipelineError::InvalidOperation("max of empty tensor".into()))
    }
}

impl<T: Float> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.require_matrix("fmt") {
            Ok((rows, cols)) => {
                writeln!(f, "[")?;
                for i in 0..rows {
                    let row: Vec<String> = self.data[i * cols..(i + 1) * cols]
                        .iter()
                        .map(|v| format!("{:.4}", v))
                        .collect();
                    writeln!(f, "  [{}],", row.join(", "))?;
                }
                write!(f, "]")
            }
            Err(_) => {
                let items: Vec<String> = self.data.iter().map(|v| format!("{:.4}", v)).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec2d() {
        let t: Tensor<f64> = Tensor::from_vec2d(&[
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
        ])
        .unwrap();
        assert_eq!(t.shape_vec(), vec![2, 3]);
        assert_eq!(t.get(&[1, 2]).unwrap(), 6.0);
    }

    #[test]
    fn test_from_vec2d_ragged() {
        let r: PipelineResult<Tensor<f64>> = Tensor::from_vec2d(&[vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(r, Err(PipelineError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_from_columns() {
        let t: Tensor<f64> =
            Tensor::from_columns(&[vec![1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0]]).unwrap();
        assert_eq!(t.shape_vec(), vec![3, 2]);
        assert_eq!(t.row_slice(1).unwrap(), &[2.0, 20.0]);
        assert_eq!(t.col(1).unwrap().data(), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let t: Tensor<f64> = Tensor::new(vec![0.0; 4], vec![2, 2]).unwrap();
        assert!(matches!(
            t.get(&[2, 0]),
            Err(PipelineError::IndexOutOfBounds { index: 2, axis: 0, size: 2 })
        ));
    }

    #[test]
    fn test_select_rows() {
        let x: Tensor<f64> = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![3, 2]).unwrap();
        let picked = x.select_rows(&[2, 0]).unwrap();
        assert_eq!(picked.shape_vec(), vec![2, 2]);
        assert_eq!(picked.data(), &[5.0, 6.0, 1.0, 2.0]);

        let y: Tensor<f64> = Tensor::from_slice(&[0.0, 1.0, 1.0]);
        assert_eq!(y.select_rows(&[1, 2]).unwrap().data(), &[1.0, 1.0]);
        assert!(y.select_rows(&[3]).is_err());
    }

    #[test]
    fn test_reductions() {
        let t: Tensor<f64> = Tensor::from_slice(&[3.0, -1.0, 4.0]);
        assert_eq!(t.min_all().unwrap(), -1.0);
        assert_eq!(t.max_all().unwrap(), 4.0);
        assert!(Tensor::<f64>::from_slice(&[]).min_all().is_err());
    }
}
