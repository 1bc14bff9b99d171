pub mod agent;
pub mod bond;
pub mod particle;

pub use agent::ConverterAgent;
pub use bond::Bond;
pub use particle::Particle;
