/*-------------------------------------------------------------------------------------------------
  Core Modules
-------------------------------------------------------------------------------------------------*/

pub mod config;
pub mod datetime;
pub mod errors;
pub mod filter;
pub mod json;
pub mod ranges;
pub mod resolve;
pub mod sync;
pub mod unifi;
