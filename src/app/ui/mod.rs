mod controls;
mod panels;
pub(in crate::app) mod status;
