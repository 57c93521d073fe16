pub mod constraints;
pub mod error;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod objective;
pub mod player;
pub mod solve;
pub mod solver;
pub mod solver_factory;
pub mod solvers;
pub mod validate;
