mod feedback;

pub use feedback::*;
