//! Identification Provider Implementations
//!
//! | Provider | Role | Upload |
//! |----------|------|--------|
//! | PlantIdProvider | Primary | JSON, base64 image |
//! | PlantNetProvider | Secondary | multipart |
//! | NullIdentificationProvider | Disabled slot | none |

pub mod helpers;
pub mod null;
pub mod plant_id;
pub mod plant_net;

pub use null::NullIdentificationProvider;
pub use plant_id::PlantIdProvider;
pub use plant_net::PlantNetProvider;

pub use flora_domain::ports::IdentificationProvider;
