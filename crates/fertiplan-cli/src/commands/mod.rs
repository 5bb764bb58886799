pub mod calibration;
pub mod recommend;
