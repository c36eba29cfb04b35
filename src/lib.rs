//! revibe: device inventory, AI sustainability analysis and e-waste advice,
//! laid out as a hexagon (domain, ports, adapters, use cases).

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
