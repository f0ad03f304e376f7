pub mod models;
pub mod pool;
pub mod predicates;

#[cfg(test)]
pub mod fixtures;
