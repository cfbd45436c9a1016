pub mod linalg;

pub use linalg::{
    DenseRealMatrix, LeastSquaresSolution, LinalgError, SymmetricEigen, gram_matrix,
    pseudo_inverse_symmetric, solve_least_squares, symmetric_eigen,
};
