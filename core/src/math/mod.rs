pub mod interp;
pub mod smoothing;

pub use interp::interp_rectilinear;
pub use smoothing::kaiser_smooth;
