pub mod first_order;
pub mod nonlinear;
pub mod partitioned;
pub mod second_order;

pub use first_order::FirstOrderSystem;
pub use nonlinear::NonlinearSystem;
pub use partitioned::{FirstOrderState, Partials, PartitionedSystem, SecondOrderState};
pub use second_order::SecondOrderSystem;
