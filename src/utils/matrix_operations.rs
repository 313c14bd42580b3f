use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

/// Operations over matrices represented as `Vec`s of row `Vec`s, used mostly
/// by the Dense layer which stores its weights as a
/// `inputs_amount x outputs_amount` matrix.
pub trait MatrixOperations {
    /// The number type of the matrix.
    type Item;

    /// Multiplies the transposed matrix with the given vector, that is,
    /// `result[col] = sum over rows of against[row] * self[row][col]`.
    fn dot_product(&self, against: &Vec<Self::Item>) -> Vec<Self::Item>;

    /// Adds both matrices element-wise.
    fn add(&self, against: &Self) -> Self;

    /// Swaps the rows and columns of the matrix.
    fn transpose(&self) -> Self;

    /// The amount of columns of the matrix.
    fn get_width(&self) -> usize;

    /// The amount of rows of the matrix.
    fn get_height(&self) -> usize;
}

impl MatrixOperations for Vec<Vec<f32>> {
    type Item = f32;

    fn dot_product(&self, against: &Vec<f32>) -> Vec<f32> {
        let width = self.get_width();
        let height = self.get_height();
        assert_eq!(height, against.len());

        let mut result = vec![0.0_f32; width];

        for row in 0..height {
            for col in 0..width {
                result[col] += against[row] * self[row][col];
            }
        }

        result
    }

    fn add(&self, against: &Self) -> Self {
        self.par_iter()
            .zip(against)
            .map(|(a, b)| a.iter().zip(b).map(|(x, y)| x + y).collect())
            .collect()
    }

    fn transpose(&self) -> Self {
        let width = self.get_width();
        let height = self.get_height();
        let mut transposed: Vec<Vec<f32>> = vec![vec![0.0_f32; height]; width];

        for (i, row) in self.iter().enumerate() {
            assert_eq!(width, row.len());
            for (j, col) in row.iter().enumerate() {
                transposed[j][i] = *col;
            }
        }

        transposed
    }

    fn get_width(&self) -> usize {
        self[0].len()
    }

    fn get_height(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::MatrixOperations;

    #[test]
    fn should_multiply_matrix_and_vector() {
        let matrix: Vec<Vec<f32>> = vec![vec![0.1, 0.7], vec![2.5, 1.2], vec![0.4, 3.3]];
        let vector: Vec<f32> = vec![0.2, 0.6, 0.8];

        let expected: Vec<f32> = vec![
            vector[0] * matrix[0][0] + vector[1] * matrix[1][0] + vector[2] * matrix[2][0],
            vector[0] * matrix[0][1] + vector[1] * matrix[1][1] + vector[2] * matrix[2][1],
        ];

        assert_eq!(matrix.dot_product(&vector), expected);
    }

    #[test]
    fn should_add_matrices() {
        let a: Vec<Vec<f32>> = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let b: Vec<Vec<f32>> = vec![vec![0.5, 0.5], vec![-1.0, 1.0]];

        assert_eq!(a.add(&b), vec![vec![1.5, 2.5], vec![2.0, 5.0]]);
    }

    #[test]
    fn should_transpose_matrices() {
        let matrix: Vec<Vec<f32>> = vec![vec![0.3, 1.8], vec![4.1, 7.2], vec![0.6, 5.4]];
        let transposed: Vec<Vec<f32>> = vec![vec![0.3, 4.1, 0.6], vec![1.8, 7.2, 5.4]];

        assert_eq!(matrix.transpose(), transposed);
    }
}
