pub mod location;
pub mod normalize;
pub mod pricing;
