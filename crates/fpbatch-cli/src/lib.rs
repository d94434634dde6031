//! Shared pieces of the fpbatch command line tools

pub mod output;
