use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

/// Element-wise operations over plain `Vec`s of numbers, used by the layers
/// when combining activations, biases and gradients.
pub trait VectorOperations {
    /// The number type of the vector.
    type Item;

    /// Adds both vectors element-wise.
    fn add(&self, against: &Vec<Self::Item>) -> Vec<Self::Item>;

    /// Subtracts `against` from `self` element-wise.
    fn subtract(&self, against: &Vec<Self::Item>) -> Vec<Self::Item>;

    /// Subtracts a single number from every element.
    fn subtract_number(&self, number: Self::Item) -> Vec<Self::Item>;

    /// Multiplies both vectors element-wise.
    fn multiply(&self, against: &Vec<Self::Item>) -> Vec<Self::Item>;

    /// Multiplies every element by a single factor.
    fn multiply_number(&self, factor: Self::Item) -> Vec<Self::Item>;

    /// Divides every element by a single factor.
    fn divide_number(&self, factor: Self::Item) -> Vec<Self::Item>;
}

impl VectorOperations for Vec<f32> {
    type Item = f32;

    fn add(&self, against: &Vec<f32>) -> Vec<f32> {
        self.par_iter()
            .zip(against)
            .map(|(a, b)| a + b)
            .collect::<Vec<f32>>()
    }

    fn subtract(&self, against: &Vec<f32>) -> Vec<f32> {
        self.par_iter()
            .zip(against)
            .map(|(a, b)| a - b)
            .collect::<Vec<f32>>()
    }

    fn subtract_number(&self, number: f32) -> Vec<f32> {
        self.par_iter().map(|x| x - number).collect::<Vec<f32>>()
    }

    fn multiply(&self, against: &Vec<f32>) -> Vec<f32> {
        self.par_iter()
            .zip(against)
            .map(|(a, b)| a * b)
            .collect::<Vec<f32>>()
    }

    fn multiply_number(&self, factor: f32) -> Vec<f32> {
        self.par_iter().map(|x| x * factor).collect::<Vec<f32>>()
    }

    fn divide_number(&self, factor: f32) -> Vec<f32> {
        self.par_iter().map(|x| x / factor).collect::<Vec<f32>>()
    }
}

#[cfg(test)]
mod tests {
    use super::VectorOperations;

    #[test]
    fn should_operate_element_wise() {
        let a: Vec<f32> = vec![1.0, 2.0, 3.0];
        let b: Vec<f32> = vec![0.5, 1.5, -1.0];

        assert_eq!(a.add(&b), vec![1.5, 3.5, 2.0]);
        assert_eq!(a.subtract(&b), vec![0.5, 0.5, 4.0]);
        assert_eq!(a.multiply(&b), vec![0.5, 3.0, -3.0]);
    }

    #[test]
    fn should_operate_against_single_numbers() {
        let a: Vec<f32> = vec![2.0, 4.0, 8.0];

        assert_eq!(a.subtract_number(2.0), vec![0.0, 2.0, 6.0]);
        assert_eq!(a.multiply_number(0.5), vec![1.0, 2.0, 4.0]);
        assert_eq!(a.divide_number(4.0), vec![0.5, 1.0, 2.0]);
    }
}
