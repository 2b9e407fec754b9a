pub mod eigen;
pub mod geometry;
