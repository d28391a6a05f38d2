pub(in crate::app) mod build;
pub(in crate::app) mod interaction;
mod view;
