pub mod check;
pub mod publish;
pub mod stacks;
pub mod uid;
