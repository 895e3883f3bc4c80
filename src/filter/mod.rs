//! Temporal filtering: zero-phase FIR design and application.
//!
//! `design` builds Hamming-windowed sinc kernels for the high-pass and
//! low-pass cutoffs; `apply` runs the overlap-add convolution along the
//! temporal axis of a 4-D series, one voxel time course at a time.

pub mod apply;
pub mod design;

pub use apply::{filter_1d, filter_time_axis};
pub use design::{
    auto_filter_length, auto_trans_bandwidth, design_highpass, design_lowpass, firwin, hamming,
};
